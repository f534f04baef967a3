use super::draw;
use super::{Tool, ToolContext};
use crate::raster::RasterRef;
use crate::state::PreviewMode;

/// Drags the whole active frame. Pixels pushed off the canvas are lost on commit.
#[derive(Debug, Clone, Default)]
pub struct MoveTool {
    /// Frame contents when the drag started
    origin: Option<RasterRef>,
}

impl Tool for MoveTool {
    fn name(&self) -> &'static str {
        "move"
    }

    fn icon(&self) -> &'static str {
        "move.svg"
    }

    fn start(&mut self, ctx: &mut ToolContext<'_>) {
        ctx.view.clear_preview();
        self.origin = ctx.document.active_raster().cloned();
        ctx.begin_replace_preview();
    }

    fn resume(&mut self, ctx: &mut ToolContext<'_>) {
        let Some(origin) = &self.origin else {
            return;
        };
        let (sx, sy) = ctx.start_pixel();
        let (cx, cy) = ctx.current_pixel();
        ctx.view.preview = draw::shifted(origin, cx - sx, cy - sy);
        ctx.view.preview_mode = PreviewMode::Replace;
    }

    fn end(&mut self, ctx: &mut ToolContext<'_>) {
        self.origin = None;
        ctx.commit_preview(self.name(), self.icon());
    }
}
