use super::{Command, CommandResult};
use crate::document::{Document, Selection, Timeline};
use crate::raster::RasterRef;

/// What a history entry changed, captured as full before/after snapshots.
///
/// Rasters are shared through `Arc`, so a snapshot costs one pointer per
/// frame rather than a pixel copy.
#[derive(Debug, Clone)]
pub enum Change {
    /// One frame's raster was replaced
    Pixels {
        layer: usize,
        frame: usize,
        before: RasterRef,
        after: RasterRef,
    },
    /// The layer stack or frame count changed
    Timeline { before: Timeline, after: Timeline },
}

/// One committed edit
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Human readable action, e.g. "pencil" or "add frame"
    pub action: String,
    /// Icon shown next to the action in the history list
    pub icon: String,
    pub change: Change,
    pub selection_before: Selection,
    pub selection_after: Selection,
}

impl HistoryEntry {
    pub fn pixels(
        action: &str,
        icon: &str,
        selection: Selection,
        before: RasterRef,
        after: RasterRef,
    ) -> Self {
        Self {
            action: action.to_owned(),
            icon: icon.to_owned(),
            change: Change::Pixels {
                layer: selection.layer,
                frame: selection.frame,
                before,
                after,
            },
            selection_before: selection,
            selection_after: selection,
        }
    }

    pub fn timeline(action: &str, icon: &str, before: Timeline, after: Timeline) -> Self {
        Self {
            action: action.to_owned(),
            icon: icon.to_owned(),
            selection_before: before.selection,
            selection_after: after.selection,
            change: Change::Timeline { before, after },
        }
    }

    /// Puts the document back into the state before this entry.
    fn revert(&self, document: &mut Document) {
        match &self.change {
            Change::Pixels {
                layer,
                frame,
                before,
                ..
            } => {
                if let Err(err) = document.set_raster(*layer, *frame, before.clone()) {
                    log::error!("Undo of '{}' failed: {}", self.action, err);
                }
            }
            Change::Timeline { before, .. } => document.restore_timeline(before),
        }
        restore_selection(document, self.selection_before);
    }

    /// Reapplies this entry's change.
    fn apply(&self, document: &mut Document) {
        match &self.change {
            Change::Pixels {
                layer,
                frame,
                after,
                ..
            } => {
                if let Err(err) = document.set_raster(*layer, *frame, after.clone()) {
                    log::error!("Redo of '{}' failed: {}", self.action, err);
                }
            }
            Change::Timeline { after, .. } => document.restore_timeline(after),
        }
        restore_selection(document, self.selection_after);
    }
}

fn restore_selection(document: &mut Document, selection: Selection) {
    if let Err(err) = document.set_selection(selection) {
        log::error!("Could not restore selection {:?}: {}", selection, err);
    }
}

/// Linear, position-addressed undo/redo stack.
///
/// Entries `[0, position)` are applied to the document; entries at and past
/// `position` are redoable until the next push discards them.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: Vec<HistoryEntry>,
    position: usize,
    limit: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    /// Creates a new empty history with no practical size limit
    pub fn new() -> Self {
        Self::with_limit(usize::MAX)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            position: 0,
            limit: limit.max(1),
        }
    }

    /// Records an edit that has already been applied to the document.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.position);
        self.entries.push(entry);
        if self.entries.len() > self.limit {
            self.entries.remove(0);
        }
        self.position = self.entries.len();
    }

    /// Execute a structural command and record it if it succeeds
    pub fn execute(&mut self, command: Command, document: &mut Document) -> CommandResult {
        let before = document.timeline();
        command.apply(document)?;
        let after = document.timeline();
        self.push(HistoryEntry::timeline(
            command.label(),
            command.icon(),
            before,
            after,
        ));
        Ok(())
    }

    /// Undo the entry below the current position. Returns false at the bottom.
    pub fn undo(&mut self, document: &mut Document) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        self.entries[self.position].revert(document);
        true
    }

    /// Redo the entry at the current position. Returns false at the top.
    pub fn redo(&mut self, document: &mut Document) -> bool {
        let Some(entry) = self.entries.get(self.position) else {
            return false;
        };
        entry.apply(document);
        self.position += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position < self.entries.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear the command history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn paint(document: &mut Document, history: &mut CommandHistory, x: i64) {
        let selection = document.selection();
        let before = document.active_raster().unwrap().clone();
        let mut raster = (*before).clone();
        raster.put(x, 0, Rgba([255, 255, 255, 255]));
        let after = raster.into_ref();
        document
            .set_raster(selection.layer, selection.frame, after.clone())
            .unwrap();
        history.push(HistoryEntry::pixels("pencil", "pencil.svg", selection, before, after));
    }

    #[test]
    fn test_undo_at_bottom_is_noop() {
        let mut document = Document::new(4, 4);
        let mut history = CommandHistory::new();
        assert!(!history.undo(&mut document));
        assert!(!history.redo(&mut document));
        assert_eq!(history.position(), 0);
    }

    #[test]
    fn test_push_after_undo_truncates() {
        let mut document = Document::new(4, 4);
        let mut history = CommandHistory::new();
        paint(&mut document, &mut history, 0);
        paint(&mut document, &mut history, 1);
        paint(&mut document, &mut history, 2);
        history.undo(&mut document);
        history.undo(&mut document);
        paint(&mut document, &mut history, 3);
        assert_eq!(history.len(), 2);
        assert_eq!(history.position(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut document = Document::new(4, 4);
        let mut history = CommandHistory::with_limit(2);
        paint(&mut document, &mut history, 0);
        paint(&mut document, &mut history, 1);
        paint(&mut document, &mut history, 2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.position(), 2);
        assert!(history.undo(&mut document));
        assert!(history.undo(&mut document));
        assert!(!history.undo(&mut document));
        // The first stroke fell off the stack and stays applied.
        let raster = document.active_raster().unwrap();
        assert_eq!(raster.get(0, 0), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(raster.get(1, 0), Some(Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_execute_records_structural_command() {
        let mut document = Document::new(4, 4);
        let mut history = CommandHistory::new();
        history.execute(Command::AddFrame, &mut document).unwrap();
        assert_eq!(document.frame_count(), 2);
        assert_eq!(history.entries()[0].action, "add frame");
        history.undo(&mut document);
        assert_eq!(document.frame_count(), 1);
        assert_eq!(document.active_frame_index(), 0);
    }

    #[test]
    fn test_rejected_command_is_not_recorded() {
        let mut document = Document::new(4, 4);
        let mut history = CommandHistory::new();
        assert!(history.execute(Command::RemoveLayer(0), &mut document).is_err());
        assert!(history.is_empty());
    }
}
