use crate::raster::{Raster, RasterRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A unique identifier for a layer, stable across reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One layer of the document: a sequence of frame rasters in animation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub id: LayerId,
    /// Display name of the layer
    #[serde(default)]
    pub name: String,
    /// Hidden layers are skipped by the compositor and by export
    pub hidden: bool,
    /// One raster per document frame
    pub frames: Vec<RasterRef>,
}

impl Layer {
    /// Creates a visible layer with `frame_count` blank frames.
    pub fn new(name: &str, width: u32, height: u32, frame_count: usize) -> Self {
        let blank = Raster::new(width, height).into_ref();
        Self {
            id: LayerId::new(),
            name: name.to_string(),
            hidden: false,
            frames: vec![blank; frame_count],
        }
    }

    pub fn frame(&self, index: usize) -> Option<&RasterRef> {
        self.frames.get(index)
    }

    /// Frame lookup with a signed index, for onion-skin lookback.
    pub fn frame_signed(&self, index: i64) -> Option<&RasterRef> {
        usize::try_from(index).ok().and_then(|i| self.frames.get(i))
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Replaces the raster at `index`, returning the previous one.
    pub fn set_frame(&mut self, index: usize, raster: RasterRef) -> Option<RasterRef> {
        self.frames
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, raster))
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
    }
}
