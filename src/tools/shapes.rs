use image::RgbaImage;

use crate::shape::{Shape, ShapeKind};
use crate::state::Workspace;

use super::{PointerEvent, Tool, ToolKind};

/// Line, rectangle, ellipse and rounded rectangle: anchor on press, commit on release.
#[derive(Debug, Clone)]
pub struct ShapeTool {
    kind: ShapeKind,
    draft: Option<Shape>,
}

impl ShapeTool {
    pub fn new(kind: ShapeKind) -> Self {
        Self { kind, draft: None }
    }

    pub fn draft(&self) -> Option<&Shape> {
        self.draft.as_ref()
    }
}

impl Tool for ShapeTool {
    fn kind(&self) -> ToolKind {
        match self.kind {
            ShapeKind::Line => ToolKind::Line,
            ShapeKind::Rectangle => ToolKind::Rectangle,
            ShapeKind::Ellipse => ToolKind::Ellipse,
            ShapeKind::RoundedRectangle => ToolKind::RoundedRectangle,
        }
    }

    fn deactivate(&mut self, _ws: &mut Workspace) {
        self.draft = None;
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        self.draft = Some(Shape {
            kind: self.kind,
            anchor: event.pos,
            current: event.pos,
            style: ws.settings.shape_style,
            width: ws.width_for(ws.config.pencil_multiplier),
            foreground: ws.settings.foreground,
            background: ws.settings.background,
            corner_ratio: ws.config.rounded_corner_ratio,
        });
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        if let Some(draft) = &mut self.draft {
            draft.update(event.pos, event.constrain());
            ws.canvas.request_redraw();
        }
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        let Some(mut draft) = self.draft.take() else {
            return;
        };
        draft.update(event.pos, event.constrain());
        if draft.is_degenerate() {
            log::debug!("{:?} without extent, skipped", self.kind);
            return;
        }
        ws.canvas.composite_over(|img| draft.render(img));
        ws.commit(self.kind.action_name());
    }

    fn is_busy(&self) -> bool {
        self.draft.is_some()
    }

    fn cancel(&mut self) {
        self.draft = None;
    }

    fn preview(&self, img: &mut RgbaImage) {
        if let Some(draft) = &self.draft {
            draft.render(img);
        }
    }
}
