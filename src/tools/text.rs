use egui::{Color32, Pos2, Rect};
use image::RgbaImage;

use crate::raster::{Path, draw};
use crate::state::Workspace;
use crate::text::TextBox;

use super::{PointerEvent, Tool, ToolKind};

/// Drags out a text box. Editing and committing the box is handled by the
/// router and the host's text widget.
#[derive(Debug, Clone, Default)]
pub struct TextTool {
    drag: Option<(Pos2, Pos2)>,
}

impl TextTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn deactivate(&mut self, _ws: &mut Workspace) {
        self.drag = None;
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, _ws: &mut Workspace) {
        self.drag = Some((event.pos, event.pos));
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        if let Some((_, current)) = &mut self.drag {
            *current = event.pos;
            ws.canvas.request_redraw();
        }
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        let Some((start, _)) = self.drag.take() else {
            return;
        };
        let rect = Rect::from_two_pos(start, event.pos);
        let font = ws.settings.font.clone();
        ws.text_box = TextBox::new(rect, font, ws.settings.foreground, ws.config.min_text_box);
        if ws.text_box.is_some() {
            log::info!("Text box opened at {:?}", rect);
        }
        ws.canvas.request_redraw();
    }

    fn is_busy(&self) -> bool {
        self.drag.is_some()
    }

    fn cancel(&mut self) {
        self.drag = None;
    }

    fn preview(&self, img: &mut RgbaImage) {
        if let Some((a, b)) = self.drag {
            let outline = Path::rect(Rect::from_two_pos(a, b));
            draw::stroke_path(img, &outline, 1.0, draw::rgba(Color32::GRAY));
        }
    }
}
