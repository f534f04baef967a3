use crate::command::HistoryEntry;
use crate::document::Document;
use crate::state::{GestureTrack, PreviewMode, ViewState, pixel_at};

pub mod draw;
mod eraser;
mod eye_dropper;
mod fill;
mod move_tool;
mod pencil;
mod shape;

pub use eraser::EraserTool;
pub use eye_dropper::EyeDropperTool;
pub use fill::FillTool;
pub use move_tool::MoveTool;
pub use pencil::PencilTool;
pub use shape::{Shape, ShapeTool};

/// Names of the built-in tools, in toolbar order.
pub const BUILTIN_TOOLS: [&str; 8] = [
    "pencil",
    "eraser",
    "line",
    "circle",
    "square",
    "fill",
    "eye-dropper",
    "move",
];

/// What a tool sees while a gesture is in progress: the document it may commit
/// to and the view state holding the preview buffer and pointer track.
pub struct ToolContext<'a> {
    pub document: &'a mut Document,
    pub view: &'a mut ViewState,
}

impl<'a> ToolContext<'a> {
    pub fn new(document: &'a mut Document, view: &'a mut ViewState) -> Self {
        Self { document, view }
    }

    pub fn gesture(&self) -> &GestureTrack {
        &self.view.gesture
    }

    pub fn start_pixel(&self) -> (i64, i64) {
        pixel_at(self.view.gesture.start)
    }

    pub fn prev_pixel(&self) -> (i64, i64) {
        pixel_at(self.view.gesture.prev)
    }

    pub fn current_pixel(&self) -> (i64, i64) {
        pixel_at(self.view.gesture.current)
    }

    /// Loads a copy of the active frame into the preview and switches the
    /// compositor to draw it in place of the frame.
    pub fn begin_replace_preview(&mut self) {
        if let Some(active) = self.document.active_raster() {
            self.view.preview.copy_from(active);
            self.view.preview_mode = PreviewMode::Replace;
        }
    }

    /// Merges the preview into the active frame and records it in history.
    ///
    /// Returns false, and records nothing, when the commit would not change a
    /// single pixel. The preview is cleared either way.
    pub fn commit_preview(&mut self, action: &str, icon: &str) -> bool {
        let selection = self.document.selection();
        let Some(before) = self.document.active_raster().cloned() else {
            self.view.clear_preview();
            return false;
        };

        let after = match self.view.preview_mode {
            PreviewMode::Overlay => {
                if self.view.preview.is_blank() {
                    self.view.clear_preview();
                    return false;
                }
                let mut merged = (*before).clone();
                merged.draw(&self.view.preview, 1.0);
                merged
            }
            PreviewMode::Replace => self.view.preview.clone(),
        };
        self.view.clear_preview();

        if after == *before {
            return false;
        }

        let after = after.into_ref();
        if let Err(err) = self
            .document
            .set_raster(selection.layer, selection.frame, after.clone())
        {
            log::error!("Commit of '{}' failed: {}", action, err);
            return false;
        }
        self.view
            .history
            .push(HistoryEntry::pixels(action, icon, selection, before, after));
        true
    }
}

/// Hover handlers get read-only access to the document; they can only touch
/// the preview buffer and other view state.
pub struct HoverContext<'a> {
    pub document: &'a Document,
    pub view: &'a mut ViewState,
}

impl<'a> HoverContext<'a> {
    pub fn new(document: &'a Document, view: &'a mut ViewState) -> Self {
        Self { document, view }
    }

    pub fn current_pixel(&self) -> (i64, i64) {
        pixel_at(self.view.gesture.current)
    }
}

/// The contract every tool satisfies. `start`, `resume` and `end` map to the
/// down, drag and up phases of a gesture.
pub trait Tool: Send {
    /// Identifier the tool is registered and persisted under
    fn name(&self) -> &'static str;

    /// Icon recorded in history entries
    fn icon(&self) -> &'static str;

    fn start(&mut self, ctx: &mut ToolContext<'_>);

    fn resume(&mut self, ctx: &mut ToolContext<'_>);

    fn end(&mut self, ctx: &mut ToolContext<'_>);

    /// Pointer moved with no button held. Default: no feedback.
    fn hover(&mut self, _ctx: &mut HoverContext<'_>) {}
}

/// Dispatch table from tool identifier to handler.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    pub fn empty() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry holding the eight built-in tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(PencilTool));
        registry.register(Box::new(EraserTool));
        registry.register(Box::new(ShapeTool::new(Shape::Line)));
        registry.register(Box::new(ShapeTool::new(Shape::Circle)));
        registry.register(Box::new(ShapeTool::new(Shape::Square)));
        registry.register(Box::new(FillTool));
        registry.register(Box::new(EyeDropperTool));
        registry.register(Box::new(MoveTool::default()));
        registry
    }

    /// Adds a tool, replacing and returning any tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Option<Box<dyn Tool>> {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => Some(std::mem::replace(&mut self.tools[index], tool)),
            None => {
                self.tools.push(tool);
                None
            }
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Tool + 'static)> {
        self.tools
            .iter_mut()
            .find(|t| t.name() == name)
            .map(|t| t.as_mut())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.iter().map(|t| t.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stamp;

    impl Tool for Stamp {
        fn name(&self) -> &'static str {
            "stamp"
        }
        fn icon(&self) -> &'static str {
            "stamp.svg"
        }
        fn start(&mut self, _ctx: &mut ToolContext<'_>) {}
        fn resume(&mut self, _ctx: &mut ToolContext<'_>) {}
        fn end(&mut self, _ctx: &mut ToolContext<'_>) {}
    }

    #[test]
    fn test_builtins_registered_in_order() {
        let registry = ToolRegistry::with_builtins();
        assert_eq!(registry.names().collect::<Vec<_>>(), BUILTIN_TOOLS);
    }

    #[test]
    fn test_register_adds_and_replaces() {
        let mut registry = ToolRegistry::with_builtins();
        assert!(registry.register(Box::new(Stamp)).is_none());
        assert!(registry.contains("stamp"));
        assert!(registry.register(Box::new(Stamp)).is_some());
        assert_eq!(registry.names().count(), BUILTIN_TOOLS.len() + 1);
        assert!(registry.get_mut("spray").is_none());
    }

    #[test]
    fn test_commit_without_changes_records_nothing() {
        let mut document = Document::new(4, 4);
        let mut view = ViewState::new(4, 4);
        let mut ctx = ToolContext::new(&mut document, &mut view);
        assert!(!ctx.commit_preview("pencil", "pencil.svg"));
        ctx.begin_replace_preview();
        assert!(!ctx.commit_preview("move", "move.svg"));
        assert!(view.history.is_empty());
    }
}
