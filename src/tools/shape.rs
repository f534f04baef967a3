use super::draw;
use super::{Tool, ToolContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Line,
    /// Circle centered on the gesture start, through the current point
    Circle,
    /// Rectangle outline with the start and current points as corners
    Square,
}

/// Rubber-band shape tools: the preview is redrawn from the start point to the
/// current point on every drag and committed on release.
#[derive(Debug, Clone, Copy)]
pub struct ShapeTool {
    shape: Shape,
}

impl ShapeTool {
    pub fn new(shape: Shape) -> Self {
        Self { shape }
    }

    fn redraw(&self, ctx: &mut ToolContext<'_>) {
        let from = ctx.start_pixel();
        let to = ctx.current_pixel();
        let points = match self.shape {
            Shape::Line => draw::line(from, to),
            Shape::Circle => {
                let dx = (to.0 - from.0) as f64;
                let dy = (to.1 - from.1) as f64;
                draw::circle(from, dx.hypot(dy).round() as i64)
            }
            Shape::Square => draw::rectangle(from, to),
        };
        let color = ctx.view.primary_rgba();
        ctx.view.clear_preview();
        draw::stamp_path(&mut ctx.view.preview, &points, ctx.view.brush_size, color);
    }
}

impl Tool for ShapeTool {
    fn name(&self) -> &'static str {
        match self.shape {
            Shape::Line => "line",
            Shape::Circle => "circle",
            Shape::Square => "square",
        }
    }

    fn icon(&self) -> &'static str {
        match self.shape {
            Shape::Line => "line.svg",
            Shape::Circle => "circle.svg",
            Shape::Square => "square.svg",
        }
    }

    fn start(&mut self, ctx: &mut ToolContext<'_>) {
        self.redraw(ctx);
    }

    fn resume(&mut self, ctx: &mut ToolContext<'_>) {
        self.redraw(ctx);
    }

    fn end(&mut self, ctx: &mut ToolContext<'_>) {
        ctx.commit_preview(self.name(), self.icon());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::state::ViewState;
    use egui::Pos2;

    #[test]
    fn test_line_preview_tracks_pointer() {
        let mut document = Document::new(8, 8);
        let mut view = ViewState::new(8, 8);
        let mut tool = ShapeTool::new(Shape::Line);

        view.gesture.begin(Pos2::new(0.0, 0.0), None);
        tool.start(&mut ToolContext::new(&mut document, &mut view));
        view.gesture.advance(Pos2::new(7.0, 0.0));
        tool.resume(&mut ToolContext::new(&mut document, &mut view));
        view.gesture.advance(Pos2::new(0.0, 7.0));
        tool.resume(&mut ToolContext::new(&mut document, &mut view));

        // Only the latest rubber band survives.
        assert_eq!(view.preview.get(7, 0).unwrap()[3], 0);
        assert_eq!(view.preview.get(0, 7).unwrap()[3], 255);

        tool.end(&mut ToolContext::new(&mut document, &mut view));
        assert_eq!(view.history.entries()[0].action, "line");
    }

    #[test]
    fn test_square_commits_outline() {
        let mut document = Document::new(8, 8);
        let mut view = ViewState::new(8, 8);
        let mut tool = ShapeTool::new(Shape::Square);

        view.gesture.begin(Pos2::new(1.0, 1.0), None);
        tool.start(&mut ToolContext::new(&mut document, &mut view));
        view.gesture.advance(Pos2::new(4.0, 4.0));
        tool.resume(&mut ToolContext::new(&mut document, &mut view));
        tool.end(&mut ToolContext::new(&mut document, &mut view));

        let raster = document.active_raster().unwrap();
        assert_eq!(raster.get(1, 4).unwrap()[3], 255);
        assert_eq!(raster.get(2, 2).unwrap()[3], 0);
    }
}
