use super::draw;
use super::{HoverContext, Tool, ToolContext};

/// Freehand drawing with a square brush in the primary color.
#[derive(Debug, Clone, Copy, Default)]
pub struct PencilTool;

impl Tool for PencilTool {
    fn name(&self) -> &'static str {
        "pencil"
    }

    fn icon(&self) -> &'static str {
        "pencil.svg"
    }

    fn start(&mut self, ctx: &mut ToolContext<'_>) {
        ctx.view.clear_preview();
        let (x, y) = ctx.current_pixel();
        let color = ctx.view.primary_rgba();
        draw::stamp(&mut ctx.view.preview, x, y, ctx.view.brush_size, color);
    }

    fn resume(&mut self, ctx: &mut ToolContext<'_>) {
        // Connect samples so fast strokes have no gaps.
        let points = draw::line(ctx.prev_pixel(), ctx.current_pixel());
        let color = ctx.view.primary_rgba();
        draw::stamp_path(&mut ctx.view.preview, &points, ctx.view.brush_size, color);
    }

    fn end(&mut self, ctx: &mut ToolContext<'_>) {
        ctx.commit_preview(self.name(), self.icon());
    }

    fn hover(&mut self, ctx: &mut HoverContext<'_>) {
        ctx.view.clear_preview();
        let (x, y) = ctx.current_pixel();
        let color = ctx.view.primary_rgba();
        draw::stamp(&mut ctx.view.preview, x, y, ctx.view.brush_size, color);
    }
}
