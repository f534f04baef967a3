use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A fully transparent pixel.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Fixed-size straight-alpha RGBA pixel buffer.
///
/// Rasters held by a [`crate::layer::Layer`] are shared through [`RasterRef`] and
/// never mutated in place; an edit produces a new raster that replaces the old
/// reference in its frame.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PackedRaster", into = "PackedRaster")]
pub struct Raster {
    pixels: RgbaImage,
}

/// Reference-counted immutable raster, shared between frames and history.
pub type RasterRef = Arc<Raster>;

impl Raster {
    /// Creates a fully transparent raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn into_ref(self) -> RasterRef {
        Arc::new(self)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the raster.
    pub fn get(&self, x: i64, y: i64) -> Option<Rgba<u8>> {
        self.in_bounds(x, y)
            .then(|| *self.pixels.get_pixel(x as u32, y as u32))
    }

    /// Writes a pixel, silently ignoring coordinates outside the raster.
    pub fn put(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        if self.in_bounds(x, y) {
            self.pixels.put_pixel(x as u32, y as u32, color);
        }
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width()) && y < i64::from(self.height())
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p[3] == 0)
    }

    /// Source-over composites `src` onto `self` with a global opacity in `[0, 1]`.
    ///
    /// Only the overlapping region is touched when dimensions differ.
    pub fn draw(&mut self, src: &Raster, opacity: f32) {
        let w = self.width().min(src.width());
        let h = self.height().min(src.height());
        for y in 0..h {
            for x in 0..w {
                let top = *src.pixels.get_pixel(x, y);
                let base = self.pixels.get_pixel_mut(x, y);
                *base = blend(*base, top, opacity);
            }
        }
    }

    /// Copies `src` over `self` without blending.
    pub fn copy_from(&mut self, src: &Raster) {
        if self.dimensions() == src.dimensions() {
            self.pixels.copy_from_slice(src.as_raw());
        } else {
            self.clear();
            let w = self.width().min(src.width());
            let h = self.height().min(src.height());
            for y in 0..h {
                for x in 0..w {
                    self.pixels.put_pixel(x, y, *src.pixels.get_pixel(x, y));
                }
            }
        }
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Straight-alpha source-over blend of `top` onto `base`.
pub fn blend(base: Rgba<u8>, top: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    if top[3] == 0 || opacity <= 0.0 {
        return base;
    }
    if opacity >= 1.0 && top[3] == 255 {
        return top;
    }

    let top_a = (f32::from(top[3]) / 255.0) * opacity.min(1.0);
    let base_a = f32::from(base[3]) / 255.0;
    let out_a = top_a + base_a * (1.0 - top_a);
    if out_a <= 0.0 {
        return TRANSPARENT;
    }

    let channel = |i: usize| {
        let t = f32::from(top[i]) / 255.0;
        let b = f32::from(base[i]) / 255.0;
        let c = (t * top_a + b * base_a * (1.0 - top_a)) / out_a;
        (c * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Packs a pixel as `0xRRGGBBAA`.
pub fn pack(pixel: Rgba<u8>) -> u32 {
    u32::from_be_bytes(pixel.0)
}

pub fn unpack(packed: u32) -> Rgba<u8> {
    Rgba(packed.to_be_bytes())
}

/// Serialized form of a raster: one packed `u32` per pixel, row-major.
#[derive(Serialize, Deserialize)]
struct PackedRaster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl From<Raster> for PackedRaster {
    fn from(raster: Raster) -> Self {
        Self {
            width: raster.width(),
            height: raster.height(),
            pixels: raster.pixels.pixels().map(|p| pack(*p)).collect(),
        }
    }
}

impl TryFrom<PackedRaster> for Raster {
    type Error = String;

    fn try_from(packed: PackedRaster) -> Result<Self, Self::Error> {
        let expected = packed.width as usize * packed.height as usize;
        if packed.pixels.len() != expected {
            return Err(format!(
                "raster {}x{} carries {} pixels, expected {}",
                packed.width,
                packed.height,
                packed.pixels.len(),
                expected
            ));
        }
        let bytes = packed
            .pixels
            .into_iter()
            .flat_map(|p| p.to_be_bytes())
            .collect::<Vec<u8>>();
        RgbaImage::from_raw(packed.width, packed.height, bytes)
            .map(Raster::from_image)
            .ok_or_else(|| "raster buffer size mismatch".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn test_blend_fast_paths() {
        assert_eq!(blend(RED, TRANSPARENT, 1.0), RED);
        assert_eq!(blend(RED, BLUE, 1.0), BLUE);
        assert_eq!(blend(RED, BLUE, 0.0), RED);
    }

    #[test]
    fn test_blend_half_opacity_over_transparent() {
        let out = blend(TRANSPARENT, BLUE, 0.5);
        assert_eq!(out, Rgba([0, 0, 255, 128]));
    }

    #[test]
    fn test_blend_half_opacity_over_opaque() {
        let out = blend(RED, BLUE, 0.5);
        assert_eq!(out[3], 255);
        assert_eq!(out[0], 128);
        assert_eq!(out[2], 128);
    }

    #[test]
    fn test_out_of_bounds_access_is_ignored() {
        let mut raster = Raster::new(2, 2);
        raster.put(-1, 0, RED);
        raster.put(2, 1, RED);
        assert!(raster.is_blank());
        assert_eq!(raster.get(-1, 0), None);
        assert_eq!(raster.get(1, 1), Some(TRANSPARENT));
    }

    #[test]
    fn test_pack_layout() {
        assert_eq!(pack(Rgba([0x12, 0x34, 0x56, 0x78])), 0x1234_5678);
        assert_eq!(unpack(0x1234_5678), Rgba([0x12, 0x34, 0x56, 0x78]));
    }

    #[test]
    fn test_serialization_is_exact() {
        let mut raster = Raster::new(3, 2);
        raster.put(0, 0, RED);
        raster.put(2, 1, Rgba([1, 2, 3, 4]));
        let json = serde_json::to_string(&raster).unwrap();
        let restored: Raster = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, raster);
    }

    #[test]
    fn test_deserialize_rejects_wrong_pixel_count() {
        let json = r#"{"width":2,"height":2,"pixels":[0,0,0]}"#;
        assert!(serde_json::from_str::<Raster>(json).is_err());
    }
}
