//! Pixel primitives shared by the built-in tools.

use crate::raster::{Raster, TRANSPARENT};
use image::Rgba;

/// Fills a `size x size` square roughly centered on `(x, y)`.
pub fn stamp(raster: &mut Raster, x: i64, y: i64, size: u32, color: Rgba<u8>) {
    let size = i64::from(size.max(1));
    let origin_x = x - (size - 1) / 2;
    let origin_y = y - (size - 1) / 2;
    for dy in 0..size {
        for dx in 0..size {
            raster.put(origin_x + dx, origin_y + dy, color);
        }
    }
}

/// Stamps every point of a path.
pub fn stamp_path(raster: &mut Raster, points: &[(i64, i64)], size: u32, color: Rgba<u8>) {
    for &(x, y) in points {
        stamp(raster, x, y, size, color);
    }
}

/// Bresenham line from `from` to `to`, both ends included.
pub fn line(from: (i64, i64), to: (i64, i64)) -> Vec<(i64, i64)> {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut points = Vec::with_capacity((dx.max(-dy) + 1) as usize);

    loop {
        points.push((x, y));
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// Midpoint circle outline around `center`.
pub fn circle(center: (i64, i64), radius: i64) -> Vec<(i64, i64)> {
    let (cx, cy) = center;
    if radius <= 0 {
        return vec![center];
    }
    let mut points = Vec::new();
    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;
    while x >= y {
        for (px, py) in [
            (x, y),
            (y, x),
            (-y, x),
            (-x, y),
            (-x, -y),
            (-y, -x),
            (y, -x),
            (x, -y),
        ] {
            points.push((cx + px, cy + py));
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
    points.sort_unstable();
    points.dedup();
    points
}

/// Outline of the axis-aligned rectangle spanned by two corners.
pub fn rectangle(a: (i64, i64), b: (i64, i64)) -> Vec<(i64, i64)> {
    let (x0, x1) = (a.0.min(b.0), a.0.max(b.0));
    let (y0, y1) = (a.1.min(b.1), a.1.max(b.1));
    let mut points = Vec::new();
    for x in x0..=x1 {
        points.push((x, y0));
        if y1 != y0 {
            points.push((x, y1));
        }
    }
    for y in (y0 + 1)..y1 {
        points.push((x0, y));
        if x1 != x0 {
            points.push((x1, y));
        }
    }
    points
}

/// 4-connected flood fill of the region sharing the exact color at `(x, y)`.
///
/// Returns `None` when the seed is outside the raster or already has `color`.
pub fn flood_fill(source: &Raster, x: i64, y: i64, color: Rgba<u8>) -> Option<Raster> {
    let target = source.get(x, y)?;
    if target == color {
        return None;
    }

    let mut filled = source.clone();
    let mut stack = vec![(x, y)];
    while let Some((px, py)) = stack.pop() {
        if filled.get(px, py) != Some(target) {
            continue;
        }
        filled.put(px, py, color);
        stack.push((px - 1, py));
        stack.push((px + 1, py));
        stack.push((px, py - 1));
        stack.push((px, py + 1));
    }
    Some(filled)
}

/// Copy of `source` translated by `(dx, dy)`; uncovered pixels are transparent.
pub fn shifted(source: &Raster, dx: i64, dy: i64) -> Raster {
    let mut out = Raster::new(source.width(), source.height());
    for y in 0..i64::from(source.height()) {
        for x in 0..i64::from(source.width()) {
            if let Some(pixel) = source.get(x, y) {
                if pixel != TRANSPARENT {
                    out.put(x + dx, y + dy, pixel);
                }
            }
        }
    }
    out
}
