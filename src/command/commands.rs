use crate::document::{Document, DocumentResult};
use serde::{Deserialize, Serialize};

/// Structural edits to the layer stack and timeline.
///
/// Pixel edits are committed by tools; everything that changes the shape of the
/// document goes through a `Command` so it lands in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Insert a blank layer above the active one
    AddLayer,
    RemoveLayer(usize),
    /// Move a layer to another paint-order position
    MoveLayer { from: usize, to: usize },
    ToggleLayerVisibility(usize),
    /// Insert a blank frame after the active one
    AddFrame,
    /// Copy the active frame right after itself
    DuplicateFrame,
    RemoveFrame(usize),
}

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Command::AddLayer => "add layer",
            Command::RemoveLayer(_) => "remove layer",
            Command::MoveLayer { .. } => "move layer",
            Command::ToggleLayerVisibility(_) => "toggle layer",
            Command::AddFrame => "add frame",
            Command::DuplicateFrame => "duplicate frame",
            Command::RemoveFrame(_) => "remove frame",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Command::AddLayer | Command::AddFrame => "plus.svg",
            Command::RemoveLayer(_) | Command::RemoveFrame(_) => "trash.svg",
            Command::MoveLayer { .. } => "move.svg",
            Command::ToggleLayerVisibility(_) => "eye.svg",
            Command::DuplicateFrame => "copy.svg",
        }
    }

    /// Applies the command. On error the document is left untouched.
    pub fn apply(&self, document: &mut Document) -> DocumentResult<()> {
        match self {
            Command::AddLayer => {
                document.add_layer();
            }
            Command::RemoveLayer(index) => {
                document.remove_layer(*index)?;
            }
            Command::MoveLayer { from, to } => document.move_layer(*from, *to)?,
            Command::ToggleLayerVisibility(index) => {
                let hidden = document
                    .layer(*index)
                    .map(|layer| layer.hidden)
                    .ok_or(crate::document::DocumentError::LayerOutOfRange(*index))?;
                document.set_layer_hidden(*index, !hidden)?;
            }
            Command::AddFrame => {
                document.add_frame();
            }
            Command::DuplicateFrame => {
                document.duplicate_frame();
            }
            Command::RemoveFrame(index) => document.remove_frame(*index)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_visibility_flips() {
        let mut document = Document::new(2, 2);
        Command::ToggleLayerVisibility(0).apply(&mut document).unwrap();
        assert!(document.layers()[0].hidden);
        Command::ToggleLayerVisibility(0).apply(&mut document).unwrap();
        assert!(!document.layers()[0].hidden);
    }

    #[test]
    fn test_out_of_range_toggle_is_rejected() {
        let mut document = Document::new(2, 2);
        assert!(Command::ToggleLayerVisibility(4).apply(&mut document).is_err());
    }
}
