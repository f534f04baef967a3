use crate::command::CommandHistory;
use crate::raster::Raster;
use egui::{Color32, Pos2};

/// How the compositor treats the preview buffer for the active layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewMode {
    /// Preview is drawn on top of the active frame
    #[default]
    Overlay,
    /// Preview holds a complete candidate frame and is drawn instead of it
    Replace,
}

/// Pointer tracking for the gesture in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureTrack {
    /// Tool id requested by the gesture's down target, if any
    pub request: Option<String>,
    pub pointer_down: bool,
    pub start: Pos2,
    pub prev: Pos2,
    pub current: Pos2,
}

impl GestureTrack {
    pub fn begin(&mut self, position: Pos2, request: Option<String>) {
        self.request = request;
        self.pointer_down = true;
        self.start = position;
        self.prev = position;
        self.current = position;
    }

    /// Shifts current into prev and records the new position.
    pub fn advance(&mut self, position: Pos2) {
        self.prev = self.current;
        self.current = position;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Maps a document-space position to the pixel it falls in.
pub fn pixel_at(position: Pos2) -> (i64, i64) {
    (position.x.floor() as i64, position.y.floor() as i64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    pub playing: bool,
    pub fps: f32,
    /// Time of the last frame advance, in seconds
    pub last_tick: f64,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            playing: false,
            fps: 8.0,
            last_tick: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModalFlags {
    pub new_canvas: bool,
    pub export: bool,
}

/// Ephemeral editing state. Never persisted.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Scratch buffer the compositor stages each source in
    pub temp: Raster,
    /// The displayable image produced by the last render
    pub composite_output: Raster,
    /// Uncommitted live edit of the active layer
    pub preview: Raster,
    pub preview_mode: PreviewMode,
    pub gesture: GestureTrack,
    pub onion_skinning: bool,
    pub playback: Playback,
    pub history: CommandHistory,
    pub modals: ModalFlags,
    pub primary_color: Color32,
    /// Brush edge length in pixels, 1 to 10
    pub brush_size: u32,
    pub(crate) render_requested: bool,
    render_count: u64,
}

pub const MAX_BRUSH_SIZE: u32 = 10;

impl ViewState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            temp: Raster::new(width, height),
            composite_output: Raster::new(width, height),
            preview: Raster::new(width, height),
            preview_mode: PreviewMode::Overlay,
            gesture: GestureTrack::default(),
            onion_skinning: false,
            playback: Playback::default(),
            history: CommandHistory::new(),
            modals: ModalFlags::default(),
            primary_color: Color32::BLACK,
            brush_size: 1,
            render_requested: true,
            render_count: 0,
        }
    }

    /// Reallocates every scratch buffer for a new canvas size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.temp = Raster::new(width, height);
        self.composite_output = Raster::new(width, height);
        self.preview = Raster::new(width, height);
        self.preview_mode = PreviewMode::Overlay;
    }

    /// Drops any uncommitted edit.
    pub fn clear_preview(&mut self) {
        self.preview.clear();
        self.preview_mode = PreviewMode::Overlay;
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = size.clamp(1, MAX_BRUSH_SIZE);
    }

    pub fn primary_rgba(&self) -> image::Rgba<u8> {
        image::Rgba(self.primary_color.to_srgba_unmultiplied())
    }

    /// Number of render passes performed so far.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub(crate) fn note_render(&mut self) {
        self.render_count += 1;
        self.render_requested = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playback.playing
    }
}
