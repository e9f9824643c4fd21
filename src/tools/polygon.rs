use egui::{Color32, Pos2};
use image::RgbaImage;

use crate::commit::actions;
use crate::raster::{Path, draw};
use crate::shape::{ShapeStyle, constrain_line, draw_styled};
use crate::state::Workspace;

use super::{PointerEvent, Tool, ToolKind};

/// Click to add vertices, double-click to close and commit.
#[derive(Debug, Clone)]
pub struct PolygonTool {
    points: Vec<Pos2>,
    dragging: bool,
    style: ShapeStyle,
    width: f32,
    foreground: Color32,
    background: Color32,
}

impl PolygonTool {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            dragging: false,
            style: ShapeStyle::Outline,
            width: 1.0,
            foreground: Color32::BLACK,
            background: Color32::WHITE,
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    fn close(&mut self, ws: &mut Workspace) {
        let points = std::mem::take(&mut self.points);
        if points.len() < 2 {
            log::debug!("Polygon with {} points closed, nothing drawn", points.len());
            return;
        }
        let path = Path::polygon(points);
        let (style, width, fg, bg) = (self.style, self.width, self.foreground, self.background);
        ws.canvas.composite_over(|img| draw_styled(img, &path, style, width, fg, bg));
        ws.commit(actions::POLYGON);
    }
}

impl Default for PolygonTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for PolygonTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Polygon
    }

    fn deactivate(&mut self, _ws: &mut Workspace) {
        self.cancel();
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        if event.click_count >= 2 {
            // The first press of the double click already placed the last vertex.
            self.dragging = false;
            self.close(ws);
            return;
        }
        if self.points.is_empty() {
            self.style = ws.settings.shape_style;
            self.width = ws.width_for(ws.config.pencil_multiplier);
            self.foreground = ws.settings.foreground;
            self.background = ws.settings.background;
        }
        self.points.push(event.pos);
        self.dragging = true;
        ws.canvas.request_redraw();
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        if !self.dragging {
            return;
        }
        let n = self.points.len();
        let previous = (n >= 2).then(|| self.points[n - 2]);
        if let Some(last) = self.points.last_mut() {
            *last = match previous {
                Some(anchor) if event.constrain() => constrain_line(anchor, event.pos),
                _ => event.pos,
            };
        }
        ws.canvas.request_redraw();
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        self.on_pointer_move(event, ws);
        self.dragging = false;
    }

    fn is_busy(&self) -> bool {
        !self.points.is_empty()
    }

    fn cancel(&mut self) {
        self.points.clear();
        self.dragging = false;
    }

    fn preview(&self, img: &mut RgbaImage) {
        draw::stroke_points(img, &self.points, self.width, draw::rgba(self.foreground));
    }
}
