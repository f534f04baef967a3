use egui::{Context, PointerButton, Pos2, Rect};

mod router;
pub use router::route_gesture;

/// Target id that stands for "whatever tool the document has selected".
pub const CANVAS_TARGET: &str = "canvas";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Down,
    /// Pointer moved, with or without a button held
    Move,
    Up,
    /// Pointer left the surface
    Leave,
}

/// What the element under the pointer declares about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureTarget {
    /// Tool id a press on this element requests
    pub request: Option<String>,
    /// Tool id that receives hover feedback over this element
    pub hover: Option<String>,
    /// Text inputs keep the platform's default gesture behavior
    pub text_input: bool,
}

impl GestureTarget {
    pub fn canvas() -> Self {
        Self {
            request: Some(CANVAS_TARGET.to_owned()),
            hover: Some(CANVAS_TARGET.to_owned()),
            text_input: false,
        }
    }

    /// A target bound to one specific tool rather than the selected one.
    pub fn tool(name: &str) -> Self {
        Self {
            request: Some(name.to_owned()),
            hover: Some(name.to_owned()),
            text_input: false,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// One normalized pointer or touch event, positioned in document pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    pub position: Pos2,
    pub phase: GesturePhase,
    /// Whether a button or touch is held; only meaningful for `Move`
    pub buttons_held: bool,
    pub target: GestureTarget,
    /// Seconds on the clock from `util::time`
    pub time: f64,
}

impl GestureEvent {
    pub fn down(position: Pos2, target: GestureTarget, time: f64) -> Self {
        Self {
            position,
            phase: GesturePhase::Down,
            buttons_held: true,
            target,
            time,
        }
    }

    pub fn drag(position: Pos2, target: GestureTarget, time: f64) -> Self {
        Self {
            position,
            phase: GesturePhase::Move,
            buttons_held: true,
            target,
            time,
        }
    }

    pub fn hover(position: Pos2, target: GestureTarget, time: f64) -> Self {
        Self {
            position,
            phase: GesturePhase::Move,
            buttons_held: false,
            target,
            time,
        }
    }

    pub fn up(position: Pos2, target: GestureTarget, time: f64) -> Self {
        Self {
            position,
            phase: GesturePhase::Up,
            buttons_held: false,
            target,
            time,
        }
    }

    pub fn leave(position: Pos2, time: f64) -> Self {
        Self {
            position,
            phase: GesturePhase::Leave,
            buttons_held: false,
            target: GestureTarget::none(),
            time,
        }
    }
}

/// What the host should do with the platform event after dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureResponse {
    /// Suppress the platform's default gesture handling (scrolling, pull-to-refresh)
    pub prevent_default: bool,
}

/// Converts raw egui pointer input into `GestureEvent`s over the canvas.
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Option<Rect>,
    /// Document size in pixels
    canvas_size: (u32, u32),
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records where the canvas was painted this frame and how many document
    /// pixels it shows.
    pub fn set_canvas(&mut self, rect: Rect, width: u32, height: u32) {
        self.canvas_rect = Some(rect);
        self.canvas_size = (width, height);
    }

    /// Maps a screen position into document pixel space.
    pub fn to_document(&self, pos: Pos2) -> Pos2 {
        let Some(rect) = self.canvas_rect else {
            return pos;
        };
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return pos;
        }
        let (width, height) = self.canvas_size;
        Pos2::new(
            (pos.x - rect.min.x) / rect.width() * width as f32,
            (pos.y - rect.min.y) / rect.height() * height as f32,
        )
    }

    fn target_at(&self, pos: Pos2) -> GestureTarget {
        match self.canvas_rect {
            Some(rect) if rect.contains(pos) => GestureTarget::canvas(),
            _ => GestureTarget::none(),
        }
    }

    /// Collects this frame's gesture events, in the order they should be routed.
    pub fn process_input(&mut self, ctx: &Context, time: f64) -> Vec<GestureEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let pointer = &input.pointer;
            let held = pointer.button_down(PointerButton::Primary);

            if pointer.button_pressed(PointerButton::Primary) {
                if let Some(pos) = pointer.interact_pos() {
                    events.push(GestureEvent::down(
                        self.to_document(pos),
                        self.target_at(pos),
                        time,
                    ));
                }
            }

            match pointer.hover_pos() {
                Some(pos) => {
                    if Some(pos) != self.last_pointer_pos {
                        events.push(GestureEvent {
                            position: self.to_document(pos),
                            phase: GesturePhase::Move,
                            buttons_held: held,
                            target: self.target_at(pos),
                            time,
                        });
                    }
                    self.last_pointer_pos = Some(pos);
                }
                None => {
                    if let Some(last) = self.last_pointer_pos.take() {
                        events.push(GestureEvent::leave(self.to_document(last), time));
                    }
                }
            }

            if pointer.button_released(PointerButton::Primary) {
                if let Some(pos) = pointer.interact_pos().or(self.last_pointer_pos) {
                    events.push(GestureEvent::up(
                        self.to_document(pos),
                        self.target_at(pos),
                        time,
                    ));
                }
            }
        });

        events
    }
}
