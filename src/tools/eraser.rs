use super::draw;
use super::{HoverContext, Tool, ToolContext};
use crate::raster::TRANSPARENT;
use image::Rgba;

/// Translucent white square shown under the pointer while hovering.
const CURSOR: Rgba<u8> = Rgba([255, 255, 255, 128]);

/// Clears pixels of the active frame. Works on a full copy of the frame held
/// in the preview so the erased result is visible before it is committed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EraserTool;

impl Tool for EraserTool {
    fn name(&self) -> &'static str {
        "eraser"
    }

    fn icon(&self) -> &'static str {
        "eraser.svg"
    }

    fn start(&mut self, ctx: &mut ToolContext<'_>) {
        ctx.view.clear_preview();
        ctx.begin_replace_preview();
        let (x, y) = ctx.current_pixel();
        draw::stamp(&mut ctx.view.preview, x, y, ctx.view.brush_size, TRANSPARENT);
    }

    fn resume(&mut self, ctx: &mut ToolContext<'_>) {
        let points = draw::line(ctx.prev_pixel(), ctx.current_pixel());
        draw::stamp_path(&mut ctx.view.preview, &points, ctx.view.brush_size, TRANSPARENT);
    }

    fn end(&mut self, ctx: &mut ToolContext<'_>) {
        ctx.commit_preview(self.name(), self.icon());
    }

    fn hover(&mut self, ctx: &mut HoverContext<'_>) {
        ctx.view.clear_preview();
        let (x, y) = ctx.current_pixel();
        draw::stamp(&mut ctx.view.preview, x, y, ctx.view.brush_size, CURSOR);
    }
}
