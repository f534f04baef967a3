use super::{CANVAS_TARGET, GestureEvent, GesturePhase, GestureResponse};
use crate::state::EditorContext;
use crate::tools::{HoverContext, ToolContext};

#[derive(Debug, Clone, Copy)]
enum Phase {
    Start,
    Resume,
    End,
}

/// Routes one gesture event to the matching handler.
///
/// Moves continue an open gesture whatever the reported buttons, so they only
/// ever touch the preview. A leave while the pointer is down means the up
/// event was lost and ends the gesture.
pub fn route_gesture(ctx: &mut EditorContext, event: &GestureEvent) -> GestureResponse {
    let pointer_down = ctx.view.gesture.pointer_down;
    match event.phase {
        GesturePhase::Down => ctx.on_gesture_down(event),
        GesturePhase::Move if pointer_down => ctx.on_gesture_drag(event),
        GesturePhase::Move => ctx.on_gesture_hover(event),
        GesturePhase::Up => ctx.on_gesture_end(event),
        GesturePhase::Leave if pointer_down => ctx.on_gesture_end(event),
        GesturePhase::Leave => ctx.on_gesture_leave(event),
    }
}

impl EditorContext {
    /// Resolves a target id to a registered tool name.
    fn resolve_tool(&self, id: &str) -> String {
        if id == CANVAS_TARGET {
            self.document.tool().to_owned()
        } else {
            id.to_owned()
        }
    }

    fn invoke(&mut self, id: &str, phase: Phase) {
        let name = self.resolve_tool(id);
        let Some(tool) = self.tools.get_mut(&name) else {
            log::debug!("No tool registered for '{}'", name);
            return;
        };
        let mut tool_ctx = ToolContext::new(&mut self.document, &mut self.view);
        match phase {
            Phase::Start => tool.start(&mut tool_ctx),
            Phase::Resume => tool.resume(&mut tool_ctx),
            Phase::End => tool.end(&mut tool_ctx),
        }
    }

    pub fn on_gesture_down(&mut self, event: &GestureEvent) -> GestureResponse {
        if self.view.is_playing() {
            return GestureResponse::default();
        }
        let request = event.target.request.clone().filter(|id| !id.is_empty());
        self.view.gesture.begin(event.position, request.clone());
        if let Some(id) = request {
            self.invoke(&id, Phase::Start);
        }
        self.request_render();
        GestureResponse::default()
    }

    pub fn on_gesture_drag(&mut self, event: &GestureEvent) -> GestureResponse {
        if self.view.is_playing() {
            return GestureResponse::default();
        }
        self.view.gesture.advance(event.position);
        if let Some(id) = self.view.gesture.request.clone() {
            self.invoke(&id, Phase::Resume);
        }
        self.request_render();
        GestureResponse {
            prevent_default: !event.target.text_input,
        }
    }

    pub fn on_gesture_end(&mut self, event: &GestureEvent) -> GestureResponse {
        if self.view.is_playing() {
            return GestureResponse::default();
        }
        if let Some(id) = self.view.gesture.request.clone() {
            self.invoke(&id, Phase::End);
        }
        self.view.gesture.reset();
        self.autosave.schedule(event.time);
        self.request_render();
        GestureResponse::default()
    }

    /// Pointer movement with nothing held. Only preview feedback may change.
    pub fn on_gesture_hover(&mut self, event: &GestureEvent) -> GestureResponse {
        if self.view.is_playing() {
            return GestureResponse::default();
        }
        self.view.gesture.advance(event.position);

        match event.target.hover.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => {
                let name = self.resolve_tool(id);
                match self.tools.get_mut(&name) {
                    Some(tool) => {
                        tool.hover(&mut HoverContext::new(&self.document, &mut self.view));
                    }
                    None => log::debug!("No hover handler for '{}'", name),
                }
            }
            // Off the canvas: drop any cursor left behind.
            None => self.view.clear_preview(),
        }
        self.request_render();
        GestureResponse::default()
    }

    /// Pointer left the surface with nothing held.
    pub fn on_gesture_leave(&mut self, _event: &GestureEvent) -> GestureResponse {
        if self.view.is_playing() {
            return GestureResponse::default();
        }
        self.view.clear_preview();
        self.request_render();
        GestureResponse::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::input::GestureTarget;
    use egui::Pos2;

    fn context() -> EditorContext {
        EditorContext::new(EditorConfig {
            canvas_width: 8,
            canvas_height: 8,
            ..EditorConfig::default()
        })
    }

    #[test]
    fn test_drag_prevents_default_except_on_text_input() {
        let mut ctx = context();
        route_gesture(&mut ctx, &GestureEvent::down(Pos2::new(1.0, 1.0), GestureTarget::canvas(), 0.0));
        let response = route_gesture(
            &mut ctx,
            &GestureEvent::drag(Pos2::new(2.0, 1.0), GestureTarget::canvas(), 0.1),
        );
        assert!(response.prevent_default);

        let text = GestureTarget {
            text_input: true,
            ..GestureTarget::none()
        };
        let response = route_gesture(&mut ctx, &GestureEvent::drag(Pos2::new(3.0, 1.0), text, 0.2));
        assert!(!response.prevent_default);
    }

    #[test]
    fn test_buttonless_move_during_gesture_commits_nothing() {
        let mut ctx = context();
        let before = ctx.document.clone();
        route_gesture(&mut ctx, &GestureEvent::down(Pos2::new(1.0, 1.0), GestureTarget::canvas(), 0.0));
        route_gesture(&mut ctx, &GestureEvent::hover(Pos2::new(2.0, 1.0), GestureTarget::canvas(), 0.1));

        assert!(ctx.view.gesture.pointer_down);
        assert!(ctx.view.history.is_empty());
        assert_eq!(ctx.document, before);
        assert!(!ctx.autosave.is_pending());
        assert!(!ctx.view.preview.is_blank());

        route_gesture(&mut ctx, &GestureEvent::up(Pos2::new(2.0, 1.0), GestureTarget::canvas(), 0.2));
        assert_eq!(ctx.view.history.len(), 1);
        assert!(ctx.autosave.is_pending());
    }

    #[test]
    fn test_unknown_request_is_noop() {
        let mut ctx = context();
        let target = GestureTarget::tool("lasso");
        route_gesture(&mut ctx, &GestureEvent::down(Pos2::new(1.0, 1.0), target.clone(), 0.0));
        route_gesture(&mut ctx, &GestureEvent::drag(Pos2::new(4.0, 4.0), target.clone(), 0.1));
        route_gesture(&mut ctx, &GestureEvent::up(Pos2::new(4.0, 4.0), target, 0.2));
        assert!(ctx.view.history.is_empty());
        assert!(ctx.document.active_raster().unwrap().is_blank());
    }

    #[test]
    fn test_explicit_tool_target_overrides_selection() {
        let mut ctx = context();
        let target = GestureTarget::tool("square");
        route_gesture(&mut ctx, &GestureEvent::down(Pos2::new(1.0, 1.0), target.clone(), 0.0));
        route_gesture(&mut ctx, &GestureEvent::drag(Pos2::new(5.0, 5.0), target.clone(), 0.1));
        route_gesture(&mut ctx, &GestureEvent::up(Pos2::new(5.0, 5.0), target, 0.2));
        assert_eq!(ctx.view.history.entries()[0].action, "square");
        assert_eq!(ctx.document.tool(), "pencil");
    }
}
