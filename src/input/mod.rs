use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

mod cursor;
mod router;
pub use router::route_event;

/// Seconds and screen points within which a second press counts as a double click.
const DOUBLE_CLICK_TIME: f64 = 0.4;
const DOUBLE_CLICK_DISTANCE: f32 = 6.0;

/// Input delivered to the engine. Positions are canvas-local, in the
/// configured display origin; the router converts them to buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Mouse button was pressed
    PointerDown {
        pos: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
        /// 2 for the second press of a double click.
        click_count: u32,
    },
    /// Mouse moved (with or without buttons pressed)
    PointerMove { pos: Pos2, modifiers: Modifiers },
    /// Mouse button was released
    PointerUp {
        pos: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    },
    KeyDown { key: Key, modifiers: Modifiers },
    /// Timer message from the host's scheduler (airbrush).
    Tick,
}

impl InputEvent {
    /// Primary-button press with no modifiers.
    pub fn down(pos: Pos2) -> Self {
        InputEvent::PointerDown {
            pos,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
            click_count: 1,
        }
    }

    pub fn moved(pos: Pos2) -> Self {
        InputEvent::PointerMove {
            pos,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn up(pos: Pos2) -> Self {
        InputEvent::PointerUp {
            pos,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: Key) -> Self {
        InputEvent::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Same event with its position passed through `f`.
    pub fn map_pos(self, f: impl Fn(Pos2) -> Pos2) -> Self {
        match self {
            InputEvent::PointerDown {
                pos,
                button,
                modifiers,
                click_count,
            } => InputEvent::PointerDown {
                pos: f(pos),
                button,
                modifiers,
                click_count,
            },
            InputEvent::PointerMove { pos, modifiers } => InputEvent::PointerMove { pos: f(pos), modifiers },
            InputEvent::PointerUp { pos, button, modifiers } => InputEvent::PointerUp {
                pos: f(pos),
                button,
                modifiers,
            },
            other => other,
        }
    }

    /// Same event with `modifiers` held.
    pub fn with_modifiers(self, held: Modifiers) -> Self {
        match self {
            InputEvent::PointerDown { pos, button, click_count, .. } => InputEvent::PointerDown {
                pos,
                button,
                modifiers: held,
                click_count,
            },
            InputEvent::PointerMove { pos, .. } => InputEvent::PointerMove { pos, modifiers: held },
            InputEvent::PointerUp { pos, button, .. } => InputEvent::PointerUp {
                pos,
                button,
                modifiers: held,
            },
            InputEvent::KeyDown { key, .. } => InputEvent::KeyDown { key, modifiers: held },
            InputEvent::Tick => InputEvent::Tick,
        }
    }
}

/// Handles converting raw egui input into canvas [`InputEvent`]s
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    /// Time and screen position of the previous press, for double clicks.
    last_press: Option<(f64, Pos2)>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process this frame's egui input. `canvas_rect` is where the canvas
    /// image is shown on screen and `zoom` its scale. Presses outside the
    /// canvas are dropped; releases always pass so gestures can end.
    pub fn process_input(&mut self, ctx: &Context, canvas_rect: Rect, zoom: f32) -> Vec<InputEvent> {
        let zoom = zoom.max(f32::EPSILON);
        let to_canvas = |p: Pos2| Pos2::ZERO + (p - canvas_rect.min) / zoom;
        let mut events = Vec::new();

        ctx.input(|input| {
            if let Some(pos) = input.pointer.hover_pos() {
                if Some(pos) != self.last_pointer_pos {
                    events.push(InputEvent::PointerMove {
                        pos: to_canvas(pos),
                        modifiers: input.modifiers,
                    });
                }
                self.last_pointer_pos = Some(pos);
            }

            for event in &input.events {
                match event {
                    egui::Event::PointerButton {
                        pos,
                        button,
                        pressed: true,
                        modifiers,
                    } => {
                        if !canvas_rect.contains(*pos) {
                            continue;
                        }
                        let click_count = self.click_count(input.time, *pos);
                        events.push(InputEvent::PointerDown {
                            pos: to_canvas(*pos),
                            button: *button,
                            modifiers: *modifiers,
                            click_count,
                        });
                    }
                    egui::Event::PointerButton {
                        pos,
                        button,
                        pressed: false,
                        modifiers,
                    } => events.push(InputEvent::PointerUp {
                        pos: to_canvas(*pos),
                        button: *button,
                        modifiers: *modifiers,
                    }),
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        modifiers,
                        ..
                    } => events.push(InputEvent::KeyDown {
                        key: *key,
                        modifiers: *modifiers,
                    }),
                    _ => {}
                }
            }
        });

        events
    }

    fn click_count(&mut self, time: f64, pos: Pos2) -> u32 {
        let double = matches!(
            self.last_press,
            Some((t, p)) if time - t <= DOUBLE_CLICK_TIME && p.distance(pos) <= DOUBLE_CLICK_DISTANCE
        );
        // A third press starts over rather than counting as another double click.
        self.last_press = if double { None } else { Some((time, pos)) };
        if double { 2 } else { 1 }
    }
}
