use egui::Pos2;

use crate::selection::{Cursor, HandleSet, Hit};
use crate::state::EditorContext;

impl EditorContext {
    /// Hover feedback for a canvas-local display position. Pure: the model is
    /// not touched.
    pub fn cursor_at(&self, pos: Pos2) -> Cursor {
        let ws = &self.workspace;
        let pos = ws.config.display_origin.to_buffer(pos, ws.canvas.height());
        let (size, rotate_offset) = (ws.config.handle_size, ws.config.rotate_handle_offset);

        if let Some(selection) = &ws.selection {
            return match selection.hit(pos, size, rotate_offset) {
                Some(Hit::Handle(handle)) => handle.cursor(selection.rotation()),
                Some(Hit::Body) => Cursor::Move,
                None => Cursor::Crosshair,
            };
        }
        if let Some(text) = &ws.text_box {
            let handles = HandleSet {
                rect: text.rect(),
                rotation: 0.0,
                size,
                rotate_offset,
            };
            if let Some(handle) = handles.hit(pos) {
                return handle.cursor(0.0);
            }
            if handles.body_contains(pos) {
                return Cursor::Move;
            }
        }
        Cursor::Crosshair
    }
}
