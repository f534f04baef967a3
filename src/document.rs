use crate::layer::Layer;
use crate::raster::{Raster, RasterRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_WIDTH: u32 = 64;
pub const DEFAULT_HEIGHT: u32 = 64;
pub const DEFAULT_TOOL: &str = "pencil";

/// Errors raised when a document edit or a loaded document would break the
/// document invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Invalid canvas dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Document has no layers")]
    NoLayers,

    #[error("Document has no frames")]
    NoFrames,

    #[error("Layer index {0} is out of range")]
    LayerOutOfRange(usize),

    #[error("Frame index {0} is out of range")]
    FrameOutOfRange(usize),

    #[error("Cannot remove the last layer")]
    LastLayer,

    #[error("Cannot remove the last frame")]
    LastFrame,

    #[error("Layer {layer} has {found} frames, expected {expected}")]
    FrameCountMismatch {
        layer: usize,
        expected: usize,
        found: usize,
    },

    #[error("Raster at layer {layer}, frame {frame} does not match the canvas size")]
    DimensionMismatch { layer: usize, frame: usize },
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// The active layer/frame pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub layer: usize,
    pub frame: usize,
}

impl Selection {
    pub fn new(layer: usize, frame: usize) -> Self {
        Self { layer, frame }
    }
}

/// Layer stack, frame count and selection captured together so structural
/// edits can be undone exactly. Rasters are shared, not copied.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub layers: Vec<Layer>,
    pub frame_count: usize,
    pub selection: Selection,
}

/// The persisted artwork.
///
/// Invariants, checked by [`Document::validate`] and preserved by every method:
/// at least one layer and one frame, every layer holds exactly `frame_count`
/// rasters of `width x height`, and the active indices are in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    width: u32,
    height: u32,
    frame_count: usize,
    layers: Vec<Layer>,
    active_layer_index: usize,
    active_frame_index: usize,
    tool: String,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Document {
    /// Creates a blank canvas with one layer and one frame.
    ///
    /// Zero dimensions are bumped to 1 so the invariants always hold.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            frame_count: 1,
            layers: vec![Layer::new("Layer 1", width, height, 1)],
            active_layer_index: 0,
            active_frame_index: 0,
            tool: DEFAULT_TOOL.to_string(),
        }
    }

    /// Checks every document invariant.
    pub fn validate(&self) -> DocumentResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DocumentError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.layers.is_empty() {
            return Err(DocumentError::NoLayers);
        }
        if self.frame_count == 0 {
            return Err(DocumentError::NoFrames);
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.frames.len() != self.frame_count {
                return Err(DocumentError::FrameCountMismatch {
                    layer: i,
                    expected: self.frame_count,
                    found: layer.frames.len(),
                });
            }
            for (f, raster) in layer.frames.iter().enumerate() {
                if raster.dimensions() != (self.width, self.height) {
                    return Err(DocumentError::DimensionMismatch { layer: i, frame: f });
                }
            }
        }
        if self.active_layer_index >= self.layers.len() {
            return Err(DocumentError::LayerOutOfRange(self.active_layer_index));
        }
        if self.active_frame_index >= self.frame_count {
            return Err(DocumentError::FrameOutOfRange(self.active_frame_index));
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn active_layer_index(&self) -> usize {
        self.active_layer_index
    }

    pub fn active_frame_index(&self) -> usize {
        self.active_frame_index
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.layers.get(self.active_layer_index)
    }

    pub fn selection(&self) -> Selection {
        Selection::new(self.active_layer_index, self.active_frame_index)
    }

    pub fn set_selection(&mut self, selection: Selection) -> DocumentResult<()> {
        if selection.layer >= self.layers.len() {
            return Err(DocumentError::LayerOutOfRange(selection.layer));
        }
        if selection.frame >= self.frame_count {
            return Err(DocumentError::FrameOutOfRange(selection.frame));
        }
        self.active_layer_index = selection.layer;
        self.active_frame_index = selection.frame;
        Ok(())
    }

    pub fn select_layer(&mut self, index: usize) -> DocumentResult<()> {
        self.set_selection(Selection::new(index, self.active_frame_index))
    }

    pub fn select_frame(&mut self, index: usize) -> DocumentResult<()> {
        self.set_selection(Selection::new(self.active_layer_index, index))
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn set_tool(&mut self, tool: &str) {
        self.tool = tool.to_string();
    }

    pub fn raster(&self, layer: usize, frame: usize) -> Option<&RasterRef> {
        self.layers.get(layer).and_then(|l| l.frame(frame))
    }

    /// The raster tools draw into.
    pub fn active_raster(&self) -> Option<&RasterRef> {
        self.raster(self.active_layer_index, self.active_frame_index)
    }

    /// Replaces one frame's raster, returning the previous one.
    pub fn set_raster(
        &mut self,
        layer: usize,
        frame: usize,
        raster: RasterRef,
    ) -> DocumentResult<RasterRef> {
        if raster.dimensions() != (self.width, self.height) {
            return Err(DocumentError::DimensionMismatch { layer, frame });
        }
        let target = self
            .layers
            .get_mut(layer)
            .ok_or(DocumentError::LayerOutOfRange(layer))?;
        target
            .set_frame(frame, raster)
            .ok_or(DocumentError::FrameOutOfRange(frame))
    }

    pub fn blank_raster(&self) -> Raster {
        Raster::new(self.width, self.height)
    }

    /// Inserts a blank layer above the active one and makes it active.
    pub fn add_layer(&mut self) -> usize {
        let name = format!("Layer {}", self.layers.len() + 1);
        let index = self.active_layer_index + 1;
        self.layers.insert(
            index,
            Layer::new(&name, self.width, self.height, self.frame_count),
        );
        self.active_layer_index = index;
        index
    }

    pub fn remove_layer(&mut self, index: usize) -> DocumentResult<Layer> {
        if index >= self.layers.len() {
            return Err(DocumentError::LayerOutOfRange(index));
        }
        if self.layers.len() == 1 {
            return Err(DocumentError::LastLayer);
        }
        let removed = self.layers.remove(index);
        if self.active_layer_index > index || self.active_layer_index >= self.layers.len() {
            self.active_layer_index = self.active_layer_index.saturating_sub(1);
        }
        Ok(removed)
    }

    /// Moves a layer to a new paint-order position; the active index follows
    /// the layer that was active.
    pub fn move_layer(&mut self, from: usize, to: usize) -> DocumentResult<()> {
        let len = self.layers.len();
        if from >= len {
            return Err(DocumentError::LayerOutOfRange(from));
        }
        if to >= len {
            return Err(DocumentError::LayerOutOfRange(to));
        }
        let active_id = self.layers[self.active_layer_index].id;
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        if let Some(index) = self.layers.iter().position(|l| l.id == active_id) {
            self.active_layer_index = index;
        }
        Ok(())
    }

    pub fn set_layer_hidden(&mut self, index: usize, hidden: bool) -> DocumentResult<()> {
        let layer = self
            .layers
            .get_mut(index)
            .ok_or(DocumentError::LayerOutOfRange(index))?;
        layer.hidden = hidden;
        Ok(())
    }

    /// Inserts a blank frame after the active frame in every layer and makes it active.
    pub fn add_frame(&mut self) -> usize {
        let index = self.active_frame_index + 1;
        let blank = self.blank_raster().into_ref();
        for layer in &mut self.layers {
            layer.frames.insert(index, blank.clone());
        }
        self.frame_count += 1;
        self.active_frame_index = index;
        index
    }

    /// Copies the active frame of every layer right after itself and makes the
    /// copy active.
    pub fn duplicate_frame(&mut self) -> usize {
        let source = self.active_frame_index;
        for layer in &mut self.layers {
            let copy = layer.frames[source].clone();
            layer.frames.insert(source + 1, copy);
        }
        self.frame_count += 1;
        self.active_frame_index = source + 1;
        source + 1
    }

    pub fn remove_frame(&mut self, index: usize) -> DocumentResult<()> {
        if index >= self.frame_count {
            return Err(DocumentError::FrameOutOfRange(index));
        }
        if self.frame_count == 1 {
            return Err(DocumentError::LastFrame);
        }
        for layer in &mut self.layers {
            layer.frames.remove(index);
        }
        self.frame_count -= 1;
        if self.active_frame_index > index || self.active_frame_index >= self.frame_count {
            self.active_frame_index = self.active_frame_index.saturating_sub(1);
        }
        Ok(())
    }

    pub fn timeline(&self) -> Timeline {
        Timeline {
            layers: self.layers.clone(),
            frame_count: self.frame_count,
            selection: self.selection(),
        }
    }

    /// Restores a captured layer stack. The timeline must have been taken from
    /// a document of the same dimensions.
    pub fn restore_timeline(&mut self, timeline: &Timeline) {
        self.layers = timeline.layers.clone();
        self.frame_count = timeline.frame_count;
        self.active_layer_index = timeline.selection.layer;
        self.active_frame_index = timeline.selection.frame;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn painted(doc: &Document) -> RasterRef {
        let mut raster = doc.blank_raster();
        raster.put(0, 0, Rgba([255, 0, 0, 255]));
        raster.into_ref()
    }

    #[test]
    fn test_default_document_is_valid() {
        let doc = Document::default();
        assert_eq!(doc.width(), 64);
        assert_eq!(doc.frame_count(), 1);
        assert_eq!(doc.layers().len(), 1);
        assert_eq!(doc.tool(), "pencil");
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_add_frame_keeps_layers_in_step() {
        let mut doc = Document::new(4, 4);
        doc.add_layer();
        doc.add_frame();
        doc.add_frame();
        assert_eq!(doc.frame_count(), 3);
        assert!(doc.layers().iter().all(|l| l.frame_count() == 3));
        assert_eq!(doc.active_frame_index(), 2);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_remove_last_layer_and_frame_refused() {
        let mut doc = Document::new(4, 4);
        assert_eq!(doc.remove_layer(0), Err(DocumentError::LastLayer));
        assert_eq!(doc.remove_frame(0), Err(DocumentError::LastFrame));
        assert_eq!(doc.remove_frame(3), Err(DocumentError::FrameOutOfRange(3)));
    }

    #[test]
    fn test_remove_layer_below_active_shifts_selection() {
        let mut doc = Document::new(4, 4);
        doc.add_layer();
        doc.add_layer();
        assert_eq!(doc.active_layer_index(), 2);
        doc.remove_layer(0).unwrap();
        assert_eq!(doc.active_layer_index(), 1);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_move_layer_follows_active() {
        let mut doc = Document::new(4, 4);
        doc.add_layer();
        let active_id = doc.active_layer().unwrap().id;
        doc.move_layer(1, 0).unwrap();
        assert_eq!(doc.active_layer_index(), 0);
        assert_eq!(doc.active_layer().unwrap().id, active_id);
    }

    #[test]
    fn test_duplicate_frame_shares_raster() {
        let mut doc = Document::new(4, 4);
        let raster = painted(&doc);
        doc.set_raster(0, 0, raster.clone()).unwrap();
        doc.duplicate_frame();
        assert_eq!(doc.frame_count(), 2);
        assert_eq!(doc.raster(0, 1), Some(&raster));
    }

    #[test]
    fn test_set_raster_rejects_wrong_size() {
        let mut doc = Document::new(4, 4);
        let wrong = Raster::new(3, 4).into_ref();
        assert_eq!(
            doc.set_raster(0, 0, wrong),
            Err(DocumentError::DimensionMismatch { layer: 0, frame: 0 })
        );
    }

    #[test]
    fn test_timeline_round_trip() {
        let mut doc = Document::new(4, 4);
        let before = doc.timeline();
        doc.add_layer();
        doc.add_frame();
        doc.restore_timeline(&before);
        assert_eq!(doc.timeline(), before);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_persisted_field_names() {
        let doc = Document::new(2, 2);
        let value = serde_json::to_value(&doc).unwrap();
        for key in [
            "width",
            "height",
            "frameCount",
            "layers",
            "activeLayerIndex",
            "activeFrameIndex",
            "tool",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["layers"][0].get("hidden").is_some());
        assert!(value["layers"][0].get("frames").is_some());
    }
}
