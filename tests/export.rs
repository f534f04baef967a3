use sprite_paint::document::Document;
use sprite_paint::export::{ExportMode, export, export_png};
use image::Rgba;

const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Two layers, three frames, 4x4
fn animated_document() -> Document {
    let mut document = Document::new(4, 4);
    document.add_layer();
    document.add_frame();
    document.add_frame();
    document
}

#[test]
fn test_spritesheet_geometry() {
    let document = animated_document();
    assert_eq!(document.layers().len(), 2);
    assert_eq!(document.frame_count(), 3);

    let sheet = export(&document, ExportMode::Spritesheet, 2);
    assert_eq!(sheet.dimensions(), (24, 8));
}

#[test]
fn test_spritesheet_places_frames_left_to_right() {
    let mut document = animated_document();
    let mut raster = document.blank_raster();
    raster.put(0, 0, GREEN);
    document.set_raster(0, 2, raster.into_ref()).unwrap();

    let sheet = export(&document, ExportMode::Spritesheet, 2);
    // Frame 2 starts at x = 2 * 4 * 2.
    for (x, y) in [(16, 0), (17, 0), (16, 1), (17, 1)] {
        assert_eq!(*sheet.get_pixel(x, y), GREEN);
    }
    assert_eq!(sheet.get_pixel(0, 0).0[3], 0);
    assert_eq!(sheet.get_pixel(18, 0).0[3], 0);
}

#[test]
fn test_frame_export_uses_active_frame() {
    let mut document = animated_document();
    let mut raster = document.blank_raster();
    raster.put(3, 3, GREEN);
    document.set_raster(1, 1, raster.into_ref()).unwrap();

    document.select_frame(1).unwrap();
    let image = export(&document, ExportMode::Frame, 1);
    assert_eq!(image.dimensions(), (4, 4));
    assert_eq!(*image.get_pixel(3, 3), GREEN);

    document.select_frame(0).unwrap();
    assert_eq!(export(&document, ExportMode::Frame, 1).get_pixel(3, 3).0[3], 0);
}

#[test]
fn test_export_is_deterministic() {
    let document = animated_document();
    let first = export_png(&document, ExportMode::Spritesheet, 4).unwrap();
    let second = export_png(&document, ExportMode::Spritesheet, 4).unwrap();
    assert_eq!(first, second);

    let decoded = image::load_from_memory(&first).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (48, 16));
}
