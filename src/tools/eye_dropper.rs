use super::{Tool, ToolContext};
use egui::Color32;

/// Picks the primary color from the active frame. Never commits.
#[derive(Debug, Clone, Copy, Default)]
pub struct EyeDropperTool;

impl EyeDropperTool {
    fn pick(ctx: &mut ToolContext<'_>) {
        let (x, y) = ctx.current_pixel();
        if let Some(pixel) = ctx.document.active_raster().and_then(|r| r.get(x, y)) {
            let [r, g, b, a] = pixel.0;
            ctx.view.primary_color = Color32::from_rgba_unmultiplied(r, g, b, a);
        }
    }
}

impl Tool for EyeDropperTool {
    fn name(&self) -> &'static str {
        "eye-dropper"
    }

    fn icon(&self) -> &'static str {
        "eye-dropper.svg"
    }

    fn start(&mut self, ctx: &mut ToolContext<'_>) {
        ctx.view.clear_preview();
        Self::pick(ctx);
    }

    fn resume(&mut self, ctx: &mut ToolContext<'_>) {
        Self::pick(ctx);
    }

    fn end(&mut self, _ctx: &mut ToolContext<'_>) {}
}
