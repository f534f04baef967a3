use super::draw;
use super::{Tool, ToolContext};
use crate::state::PreviewMode;

/// Bucket fill of the contiguous same-colored region under the pointer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillTool;

impl Tool for FillTool {
    fn name(&self) -> &'static str {
        "fill"
    }

    fn icon(&self) -> &'static str {
        "fill.svg"
    }

    fn start(&mut self, ctx: &mut ToolContext<'_>) {
        ctx.view.clear_preview();
        let (x, y) = ctx.current_pixel();
        let color = ctx.view.primary_rgba();
        let filled = ctx
            .document
            .active_raster()
            .and_then(|raster| draw::flood_fill(raster, x, y, color));
        if let Some(filled) = filled {
            ctx.view.preview = filled;
            ctx.view.preview_mode = PreviewMode::Replace;
        }
    }

    fn resume(&mut self, _ctx: &mut ToolContext<'_>) {}

    fn end(&mut self, ctx: &mut ToolContext<'_>) {
        ctx.commit_preview(self.name(), self.icon());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::state::ViewState;
    use egui::{Color32, Pos2};

    #[test]
    fn test_fill_whole_blank_canvas() {
        let mut document = Document::new(3, 3);
        let mut view = ViewState::new(3, 3);
        view.primary_color = Color32::RED;
        let mut tool = FillTool;

        view.gesture.begin(Pos2::new(1.0, 1.0), None);
        tool.start(&mut ToolContext::new(&mut document, &mut view));
        tool.end(&mut ToolContext::new(&mut document, &mut view));

        let raster = document.active_raster().unwrap();
        assert!(raster.image().pixels().all(|p| p.0 == [255, 0, 0, 255]));
    }

    #[test]
    fn test_fill_outside_canvas_is_noop() {
        let mut document = Document::new(3, 3);
        let mut view = ViewState::new(3, 3);
        let mut tool = FillTool;

        view.gesture.begin(Pos2::new(-4.0, 1.0), None);
        tool.start(&mut ToolContext::new(&mut document, &mut view));
        tool.end(&mut ToolContext::new(&mut document, &mut view));
        assert!(view.history.is_empty());
    }
}
