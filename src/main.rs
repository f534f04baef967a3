#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    use sprite_paint::{EditorConfig, FileStore, PaintApp, PersistenceAdapter};
    use std::path::PathBuf;
    use std::sync::Arc;

    env_logger::init();

    let data_dir = std::env::var_os("SPRITE_PAINT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".sprite_paint"));
    let config = EditorConfig::load_or_default(data_dir.join("config.json"));
    let persistence = PersistenceAdapter::new(Arc::new(FileStore::new(&data_dir)), &config.storage_key);
    log::info!("Storing documents in {}", data_dir.display());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Sprite Paint",
        native_options,
        Box::new(|cc| Ok(Box::new(PaintApp::new(cc, config, persistence)))),
    )
}

// The web build embeds `PaintApp` from the library.
#[cfg(target_arch = "wasm32")]
fn main() {}
