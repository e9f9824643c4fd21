use egui::{Key, Modifiers, PointerButton, Pos2};
use log::debug;

use crate::selection::{Handle, HandleSet, Hit};
use crate::state::EditorContext;
use crate::state::context::{PointerTarget, TextDrag};
use crate::tools::{PointerEvent, Tool, ToolKind};

use super::InputEvent;

impl EditorContext {
    /// Routes one input event and settles the editor state.
    pub fn handle_event(&mut self, event: &InputEvent) {
        route_event(self, event);
    }
}

/// Routes input events to the floating object or the active tool based on
/// the current editor state.
///
/// Only the primary button drives gestures. While a selection floats, a press
/// outside it does nothing: the selection stays locked until it is committed.
pub fn route_event(ctx: &mut EditorContext, event: &InputEvent) {
    match *event {
        InputEvent::PointerDown {
            pos,
            button: PointerButton::Primary,
            modifiers,
            click_count,
        } => {
            let event = to_buffer(ctx, pos, modifiers, click_count);
            pointer_down(ctx, &event);
        }
        InputEvent::PointerMove { pos, modifiers } => {
            let event = to_buffer(ctx, pos, modifiers, 1);
            pointer_move(ctx, &event);
        }
        InputEvent::PointerUp {
            pos,
            button: PointerButton::Primary,
            modifiers,
        } => {
            let event = to_buffer(ctx, pos, modifiers, 1);
            pointer_up(ctx, &event);
        }
        InputEvent::PointerDown { .. } | InputEvent::PointerUp { .. } => {}
        InputEvent::KeyDown { key, modifiers } => key_down(ctx, key, modifiers),
        InputEvent::Tick => {
            if ctx.tool.wants_ticks() {
                ctx.tool.tick(&mut ctx.workspace);
            }
        }
    }
    ctx.settle_state();
}

fn to_buffer(ctx: &EditorContext, pos: Pos2, modifiers: Modifiers, click_count: u32) -> PointerEvent {
    let ws = &ctx.workspace;
    PointerEvent {
        pos: ws.config.display_origin.to_buffer(pos, ws.canvas.height()),
        modifiers,
        click_count,
    }
}

fn pointer_down(ctx: &mut EditorContext, event: &PointerEvent) {
    ctx.workspace.last_pointer = Some(event.pos);
    let size = ctx.workspace.config.handle_size;
    let rotate_offset = ctx.workspace.config.rotate_handle_offset;

    if let Some(selection) = ctx.workspace.selection.as_mut() {
        ctx.pointer = Some(match selection.hit(event.pos, size, rotate_offset) {
            Some(Hit::Handle(handle)) => {
                selection.begin_handle(handle, event.pos);
                PointerTarget::Selection
            }
            Some(Hit::Body) => {
                selection.begin_move(event.pos);
                PointerTarget::Selection
            }
            None => {
                debug!("Press outside the locked selection ignored");
                PointerTarget::Nothing
            }
        });
        return;
    }

    if let Some(text) = ctx.workspace.text_box.as_ref() {
        let handles = HandleSet {
            rect: text.rect(),
            rotation: 0.0,
            size,
            rotate_offset,
        };
        let target = match handles.hit(event.pos) {
            Some(Handle::Rotate) => {
                if ctx.convert_text_to_selection() {
                    if let Some(selection) = ctx.workspace.selection.as_mut() {
                        selection.begin_handle(Handle::Rotate, event.pos);
                    }
                    PointerTarget::Selection
                } else {
                    PointerTarget::Nothing
                }
            }
            Some(handle) => {
                ctx.text_drag = Some(TextDrag::Resizing { handle });
                PointerTarget::TextBox
            }
            None if handles.body_contains(event.pos) => {
                ctx.text_drag = Some(TextDrag::Moving { last: event.pos });
                PointerTarget::TextBox
            }
            None => {
                debug!("Press outside the text box commits it");
                ctx.commit_pending();
                PointerTarget::Nothing
            }
        };
        ctx.pointer = Some(target);
        return;
    }

    ctx.tool.on_pointer_down(event, &mut ctx.workspace);
    ctx.pointer = Some(PointerTarget::Tool);
}

fn pointer_move(ctx: &mut EditorContext, event: &PointerEvent) {
    ctx.workspace.last_pointer = Some(event.pos);
    match ctx.pointer {
        Some(PointerTarget::Selection) => drag_selection(ctx, event),
        Some(PointerTarget::TextBox) => drag_text(ctx, event.pos),
        Some(PointerTarget::Tool) => ctx.tool.on_pointer_move(event, &mut ctx.workspace),
        // Hover: only cursor feedback, which is computed on demand.
        Some(PointerTarget::Nothing) | None => {}
    }
}

fn pointer_up(ctx: &mut EditorContext, event: &PointerEvent) {
    ctx.workspace.last_pointer = Some(event.pos);
    match ctx.pointer.take() {
        Some(PointerTarget::Selection) => {
            drag_selection(ctx, event);
            if let Some(selection) = ctx.workspace.selection.as_mut() {
                selection.end_gesture();
            }
        }
        Some(PointerTarget::TextBox) => {
            drag_text(ctx, event.pos);
            ctx.text_drag = None;
        }
        Some(PointerTarget::Tool) => ctx.tool.on_pointer_up(event, &mut ctx.workspace),
        Some(PointerTarget::Nothing) | None => {}
    }
}

fn drag_selection(ctx: &mut EditorContext, event: &PointerEvent) {
    let ws = &mut ctx.workspace;
    if let Some(selection) = ws.selection.as_mut() {
        selection.drag_to(&mut ws.canvas, event.pos, event.constrain());
        ws.canvas.request_redraw();
    }
}

fn drag_text(ctx: &mut EditorContext, pos: Pos2) {
    let min_size = ctx.workspace.config.min_text_box;
    let Some(text) = ctx.workspace.text_box.as_mut() else {
        return;
    };
    match &mut ctx.text_drag {
        Some(TextDrag::Moving { last }) => {
            text.translate(pos - *last);
            *last = pos;
        }
        Some(TextDrag::Resizing { handle }) => {
            let rect = handle.resize_rect(text.rect(), pos, min_size);
            text.set_rect(rect);
        }
        None => return,
    }
    ctx.workspace.canvas.request_redraw();
}

fn key_down(ctx: &mut EditorContext, key: Key, modifiers: Modifiers) {
    let editing_text = ctx.workspace.text_box.is_some();
    match key {
        Key::Escape => ctx.escape(),
        Key::Enter if editing_text => {
            ctx.commit_pending();
        }
        // The host's text widget owns every other key.
        _ if editing_text => {}
        Key::Delete | Key::Backspace => {
            ctx.delete_selection();
        }
        _ if modifiers.command => match key {
            Key::C => {
                ctx.copy();
            }
            Key::X => {
                ctx.cut();
            }
            Key::V => {
                ctx.paste();
            }
            Key::A => {
                ctx.select_all();
            }
            _ => {}
        },
        _ if modifiers.is_none() => {
            if let Some(kind) = ToolKind::from_shortcut(key) {
                ctx.select_tool(kind);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::{CommitLog, actions};
    use crate::config::EngineConfig;
    use crate::state::EditorState;

    fn context() -> (EditorContext, CommitLog) {
        let log = CommitLog::new();
        let ctx = EditorContext::new(100, 100, EngineConfig::default(), log.clone());
        (ctx, log)
    }

    fn drag(ctx: &mut EditorContext, from: Pos2, to: Pos2) {
        ctx.handle_event(&InputEvent::down(from));
        ctx.handle_event(&InputEvent::moved(to));
        ctx.handle_event(&InputEvent::up(to));
    }

    #[test]
    fn pencil_drag_commits_a_draw() {
        let (mut ctx, log) = context();
        drag(&mut ctx, Pos2::new(10.0, 10.0), Pos2::new(60.0, 10.0));
        assert_eq!(log.actions(), vec![actions::DRAW.to_owned()]);
        assert_eq!(ctx.canvas().pixel(30, 10).map(|p| p[0]), Some(0));
        assert_eq!(ctx.state(), EditorState::Idle);
    }

    #[test]
    fn secondary_button_is_ignored() {
        let (mut ctx, log) = context();
        ctx.handle_event(&InputEvent::PointerDown {
            pos: Pos2::new(5.0, 5.0),
            button: PointerButton::Secondary,
            modifiers: Modifiers::NONE,
            click_count: 1,
        });
        assert_eq!(ctx.state(), EditorState::Idle);
        assert!(log.is_empty());
    }

    #[test]
    fn state_is_dragging_during_a_stroke() {
        let (mut ctx, _) = context();
        ctx.handle_event(&InputEvent::down(Pos2::new(10.0, 10.0)));
        assert_eq!(ctx.state(), EditorState::Dragging { tool: ToolKind::Pencil });
        ctx.handle_event(&InputEvent::up(Pos2::new(10.0, 10.0)));
        assert_eq!(ctx.state(), EditorState::Idle);
    }

    #[test]
    fn locked_selection_ignores_outside_presses() {
        let (mut ctx, log) = context();
        ctx.handle_event(&InputEvent::key(Key::S));
        drag(&mut ctx, Pos2::new(10.0, 10.0), Pos2::new(30.0, 30.0));
        let rect = ctx.selection().map(|s| s.rect());
        assert!(matches!(ctx.state(), EditorState::LockedSelection { transform: None }));

        // A new marquee gesture outside does nothing.
        drag(&mut ctx, Pos2::new(70.0, 70.0), Pos2::new(90.0, 90.0));
        assert_eq!(ctx.selection().map(|s| s.rect()), rect);
        assert!(log.is_empty());

        ctx.handle_event(&InputEvent::key(Key::Escape));
        assert!(ctx.selection().is_none());
        assert_eq!(ctx.state(), EditorState::Idle);
        assert!(log.is_empty());
    }

    #[test]
    fn shortcuts_are_ignored_while_editing_text() {
        let (mut ctx, _) = context();
        ctx.handle_event(&InputEvent::key(Key::T));
        drag(&mut ctx, Pos2::new(10.0, 10.0), Pos2::new(80.0, 40.0));
        assert!(ctx.text_box().is_some());
        ctx.handle_event(&InputEvent::key(Key::P));
        assert_eq!(ctx.active_tool(), ToolKind::Text);

        ctx.handle_event(&InputEvent::key(Key::Enter));
        assert!(ctx.text_box().is_none());
        ctx.handle_event(&InputEvent::key(Key::P));
        assert_eq!(ctx.active_tool(), ToolKind::Pencil);
    }

    #[test]
    fn press_outside_text_commits_without_a_new_box() {
        let (mut ctx, log) = context();
        ctx.handle_event(&InputEvent::key(Key::T));
        drag(&mut ctx, Pos2::new(10.0, 10.0), Pos2::new(80.0, 40.0));
        if let Some(text) = ctx.text_box_mut() {
            text.set_text("Hi");
        }
        drag(&mut ctx, Pos2::new(20.0, 60.0), Pos2::new(90.0, 95.0));
        assert!(ctx.text_box().is_none());
        assert_eq!(log.actions(), vec![actions::TEXT.to_owned()]);
        assert_eq!(ctx.state(), EditorState::Idle);
    }

    #[test]
    fn text_box_moves_with_its_body() {
        let (mut ctx, _) = context();
        ctx.handle_event(&InputEvent::key(Key::T));
        drag(&mut ctx, Pos2::new(10.0, 10.0), Pos2::new(80.0, 40.0));
        ctx.handle_event(&InputEvent::down(Pos2::new(40.0, 25.0)));
        assert_eq!(
            ctx.state(),
            EditorState::LockedText {
                transform: Some(crate::selection::TransformKind::Moving),
            }
        );
        ctx.handle_event(&InputEvent::moved(Pos2::new(45.0, 35.0)));
        ctx.handle_event(&InputEvent::up(Pos2::new(45.0, 35.0)));
        assert_eq!(ctx.text_rect().map(|r| r.min), Some(Pos2::new(15.0, 20.0)));
    }

    #[test]
    fn bottom_left_origin_is_flipped_once() {
        let config = EngineConfig {
            display_origin: crate::config::DisplayOrigin::BottomLeft,
            ..EngineConfig::default()
        };
        let mut ctx = EditorContext::new(100, 100, config, CommitLog::new());
        ctx.handle_event(&InputEvent::moved(Pos2::new(10.0, 90.0)));
        assert_eq!(ctx.last_pointer(), Some(Pos2::new(10.0, 10.0)));
    }
}
