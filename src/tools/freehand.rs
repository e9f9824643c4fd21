use image::RgbaImage;

use crate::commit::actions;
use crate::state::Workspace;
use crate::stroke::Stroke;

use super::{PointerEvent, Tool, ToolKind};

/// Pencil, brush and eraser: one stroke per drag.
#[derive(Debug, Clone)]
pub struct FreehandTool {
    kind: ToolKind,
    stroke: Option<Stroke>,
}

impl FreehandTool {
    pub fn new(kind: ToolKind) -> Self {
        debug_assert!(matches!(kind, ToolKind::Pencil | ToolKind::Brush | ToolKind::Eraser));
        Self { kind, stroke: None }
    }

    pub fn stroke(&self) -> Option<&Stroke> {
        self.stroke.as_ref()
    }

    fn end_stroke(&mut self, ws: &mut Workspace) {
        let Some(stroke) = self.stroke.take() else {
            return;
        };
        if stroke.is_empty() {
            return;
        }
        ws.canvas.composite_over(|img| stroke.render(img));
        log::debug!("{} stroke with {} points", self.kind.name(), stroke.points().len());
        ws.commit(if self.kind == ToolKind::Eraser { actions::ERASE } else { actions::DRAW });
    }
}

impl Tool for FreehandTool {
    fn kind(&self) -> ToolKind {
        self.kind
    }

    fn deactivate(&mut self, ws: &mut Workspace) {
        self.end_stroke(ws);
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        let (color, multiplier) = match self.kind {
            ToolKind::Brush => (ws.settings.foreground, ws.config.brush_multiplier),
            ToolKind::Eraser => (ws.settings.background, ws.config.eraser_multiplier),
            _ => (ws.settings.foreground, ws.config.pencil_multiplier),
        };
        let mut stroke = Stroke::new(color, ws.width_for(multiplier));
        stroke.add_point(event.pos);
        self.stroke = Some(stroke);
        ws.canvas.request_redraw();
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        if let Some(stroke) = &mut self.stroke {
            stroke.add_point(event.pos);
            ws.canvas.request_redraw();
        }
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        if let Some(stroke) = &mut self.stroke {
            stroke.add_point(event.pos);
        }
        self.end_stroke(ws);
    }

    fn is_busy(&self) -> bool {
        self.stroke.is_some()
    }

    fn cancel(&mut self) {
        self.stroke = None;
    }

    fn preview(&self, img: &mut RgbaImage) {
        if let Some(stroke) = &self.stroke {
            stroke.render(img);
        }
    }
}

#[cfg(test)]
mod tests {
    use egui::{Color32, Pos2};
    use image::Rgba;

    use super::*;
    use crate::config::EngineConfig;
    use crate::tools::testing::workspace;

    #[test]
    fn width_scales_with_the_tool() {
        let (mut ws, _) = workspace(50, 50, EngineConfig::default());
        ws.settings.size = 2.0;
        for (kind, width) in [(ToolKind::Pencil, 2.0), (ToolKind::Brush, 5.0), (ToolKind::Eraser, 6.0)] {
            let mut tool = FreehandTool::new(kind);
            tool.on_pointer_down(&PointerEvent::new(Pos2::new(10.0, 10.0)), &mut ws);
            assert_eq!(tool.stroke().map(Stroke::width), Some(width), "{kind:?}");
            tool.cancel();
        }
    }

    #[test]
    fn eraser_paints_the_background_color() {
        let (mut ws, log) = workspace(50, 50, EngineConfig::default());
        ws.settings.foreground = Color32::BLUE;
        ws.settings.background = Color32::RED;
        let mut tool = FreehandTool::new(ToolKind::Eraser);
        tool.on_pointer_down(&PointerEvent::new(Pos2::new(10.0, 20.0)), &mut ws);
        assert_eq!(tool.stroke().map(Stroke::color), Some(Color32::RED));
        tool.on_pointer_move(&PointerEvent::new(Pos2::new(30.0, 20.0)), &mut ws);
        tool.on_pointer_up(&PointerEvent::new(Pos2::new(40.0, 20.0)), &mut ws);

        assert_eq!(ws.canvas.pixel(25, 20), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(log.actions(), vec![actions::ERASE.to_owned()]);
    }

    #[test]
    fn finishing_early_drops_the_stroke() {
        let (mut ws, log) = workspace(50, 50, EngineConfig::default());
        let mut tool = FreehandTool::new(ToolKind::Pencil);
        tool.on_pointer_down(&PointerEvent::new(Pos2::new(10.0, 10.0)), &mut ws);
        tool.on_pointer_move(&PointerEvent::new(Pos2::new(30.0, 10.0)), &mut ws);
        Tool::finish(&mut tool, &mut ws);
        assert!(!tool.is_busy());
        assert!(log.is_empty());
        assert_eq!(ws.canvas.pixel(20, 10), Some(Rgba([255, 255, 255, 255])));
    }
}
