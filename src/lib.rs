#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod config;
pub mod document;
pub mod export;
pub mod input;
pub mod layer;
pub mod raster;
pub mod renderer;
pub mod state;
pub mod tools;
pub mod util;

pub use app::PaintApp;
pub use command::{Command, CommandHistory, HistoryEntry};
pub use config::EditorConfig;
pub use document::Document;
pub use export::{ExportMode, export, export_png};
pub use input::{GestureEvent, GesturePhase, GestureResponse, GestureTarget, route_gesture};
pub use layer::Layer;
pub use raster::Raster;
pub use renderer::Renderer;
pub use state::{EditorContext, FileStore, MemoryStore, PersistenceAdapter, ViewState};
pub use tools::{Tool, ToolRegistry};
