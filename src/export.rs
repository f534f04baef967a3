use crate::document::Document;
use crate::raster::Raster;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to encode export: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// The active frame only
    #[default]
    Frame,
    /// Every frame, left to right
    Spritesheet,
}

/// Flattens the visible layers of one frame at full opacity. Layers missing
/// that frame are skipped.
pub fn flatten_frame(document: &Document, frame: usize) -> Raster {
    let mut output = Raster::new(document.width(), document.height());
    for layer in document.layers().iter().filter(|layer| layer.is_visible()) {
        if let Some(raster) = layer.frame(frame) {
            output.draw(raster, 1.0);
        }
    }
    output
}

/// Longest side an exported image may have at a scale above 1.
pub const MAX_EXPORT_SIDE: u32 = 8192;

/// Largest usable scale no greater than `scale` that keeps a sheet of `cells`
/// frames within `MAX_EXPORT_SIDE`. Never below 1.
fn fit_scale(document: &Document, cells: u32, scale: u32) -> u32 {
    let scale = if scale == 0 {
        log::warn!("Export scale 0 is invalid, using 1");
        1
    } else {
        scale
    };

    let longest = (u64::from(document.width()) * u64::from(cells))
        .max(u64::from(document.height()))
        .max(1);
    let limit = u32::try_from(u64::from(MAX_EXPORT_SIDE) / longest)
        .unwrap_or(u32::MAX)
        .max(1);
    if scale > limit {
        log::warn!("Export scale {} is too large, using {}", scale, limit);
        limit
    } else {
        scale
    }
}

/// Renders the document as an image at an integer `scale`, nearest-neighbor.
///
/// Never fails: a document without layers or frames yields a transparent
/// image of the requested geometry. A scale of 0 is treated as 1, and a scale
/// that would push the image past `MAX_EXPORT_SIDE` is lowered to fit.
pub fn export(document: &Document, mode: ExportMode, scale: u32) -> RgbaImage {
    let frames: Vec<usize> = match mode {
        ExportMode::Frame => vec![document.active_frame_index()],
        ExportMode::Spritesheet => (0..document.frame_count().max(1)).collect(),
    };
    let cells = u32::try_from(frames.len()).unwrap_or(u32::MAX);
    let scale = fit_scale(document, cells, scale);

    let cell_width = document.width().saturating_mul(scale);
    let cell_height = document.height().saturating_mul(scale);
    let mut sheet = RgbaImage::new(cell_width.saturating_mul(cells), cell_height);
    for (slot, &frame) in frames.iter().enumerate() {
        let flat = flatten_frame(document, frame);
        let cell = if scale == 1 {
            flat.image().clone()
        } else {
            imageops::resize(flat.image(), cell_width, cell_height, FilterType::Nearest)
        };
        imageops::replace(&mut sheet, &cell, slot as i64 * i64::from(cell_width), 0);
    }
    sheet
}

/// `export` encoded as PNG bytes, ready to hand to a download or a file.
pub fn export_png(document: &Document, mode: ExportMode, scale: u32) -> Result<Vec<u8>, ExportError> {
    let image = export(document, mode, scale);
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_frame_export_scales_each_pixel_to_a_block() {
        let mut document = Document::new(2, 2);
        let mut raster = document.blank_raster();
        raster.put(1, 0, Rgba([9, 9, 9, 255]));
        document.set_raster(0, 0, raster.into_ref()).unwrap();

        let image = export(&document, ExportMode::Frame, 3);
        assert_eq!(image.dimensions(), (6, 6));
        for y in 0..3 {
            for x in 3..6 {
                assert_eq!(image.get_pixel(x, y).0, [9, 9, 9, 255]);
            }
        }
        assert_eq!(image.get_pixel(2, 0).0[3], 0);
        assert_eq!(image.get_pixel(3, 3).0[3], 0);
    }

    #[test]
    fn test_hidden_layers_are_left_out() {
        let mut document = Document::new(1, 1);
        let mut raster = document.blank_raster();
        raster.put(0, 0, Rgba([1, 1, 1, 255]));
        document.set_raster(0, 0, raster.into_ref()).unwrap();
        document.set_layer_hidden(0, true).unwrap();
        assert_eq!(export(&document, ExportMode::Frame, 1).get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_zero_scale_is_clamped() {
        let document = Document::new(3, 2);
        assert_eq!(export(&document, ExportMode::Frame, 0).dimensions(), (3, 2));
    }

    #[test]
    fn test_oversized_scale_is_lowered_to_fit() {
        let document = Document::new(64, 1);
        let image = export(&document, ExportMode::Frame, 1 << 27);
        assert_eq!(image.dimensions(), (MAX_EXPORT_SIDE, 128));

        let document = Document::new(64, 64);
        assert_eq!(fit_scale(&document, 1, 1 << 27), 128);
        assert_eq!(fit_scale(&document, 4, u32::MAX), 32);
        assert_eq!(fit_scale(&Document::new(10_000, 1), 1, 3), 1);
    }

    #[test]
    fn test_png_has_signature() {
        let document = Document::new(2, 2);
        let bytes = export_png(&document, ExportMode::Spritesheet, 2).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
