use crate::config::EditorConfig;
use crate::document::Document;
use crate::raster::Raster;
use crate::state::{PreviewMode, ViewState};

/// The compositor: flattens the visible document state into
/// `ViewState::composite_output`.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderer {
    /// How many preceding frames onion skinning shows
    onion_skin_frames: usize,
    onion_skin_opacity: f32,
    /// Composite every full-opacity source twice
    redundant_draws: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Renderer {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            onion_skin_frames: config.onion_skin_frames,
            onion_skin_opacity: config.onion_skin_opacity.clamp(0.0, 1.0),
            redundant_draws: config.redundant_draws,
        }
    }

    /// Renders the current frame into the view's output buffer.
    ///
    /// Pure in the document and view state: calling it twice without changes in
    /// between produces identical output. Missing frames are skipped.
    pub fn render(&self, document: &Document, view: &mut ViewState) {
        let playing = view.is_playing();
        let ViewState {
            temp,
            composite_output,
            preview,
            preview_mode,
            onion_skinning,
            ..
        } = view;

        temp.clear();
        composite_output.clear();

        let active_layer = document.active_layer_index();
        let active_frame = document.active_frame_index();
        let passes = if self.redundant_draws { 2 } else { 1 };

        for (index, layer) in document.layers().iter().enumerate() {
            if layer.hidden {
                continue;
            }
            let is_active = index == active_layer;

            if is_active && *onion_skinning && !playing {
                // Farthest first so nearer frames sit on top.
                for back in (1..=self.onion_skin_frames).rev() {
                    let frame = active_frame as i64 - back as i64;
                    if let Some(raster) = layer.frame_signed(frame) {
                        stage(temp, composite_output, raster, self.onion_skin_opacity);
                    }
                }
            }

            for _ in 0..passes {
                if is_active && *preview_mode == PreviewMode::Replace {
                    stage(temp, composite_output, preview, 1.0);
                } else {
                    if let Some(raster) = layer.frame(active_frame) {
                        stage(temp, composite_output, raster, 1.0);
                    }
                    if is_active {
                        stage(temp, composite_output, preview, 1.0);
                    }
                }
            }
        }

        view.note_render();
    }
}

/// Copies `source` into the scratch buffer, then blends the scratch buffer
/// onto the output.
fn stage(temp: &mut Raster, output: &mut Raster, source: &Raster, opacity: f32) {
    temp.copy_from(source);
    output.draw(temp, opacity);
}
