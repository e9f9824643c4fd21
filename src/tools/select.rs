use egui::{Color32, Pos2, Rect};
use image::RgbaImage;

use crate::raster::{Path, draw};
use crate::selection::FloatingSelection;
use crate::shape::constrain_square;
use crate::state::Workspace;

use super::{PointerEvent, Tool, ToolKind};

const MARQUEE_COLOR: Color32 = Color32::from_rgb(30, 144, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    Rect,
    FreeForm,
}

/// The capture gesture of the two selection tools. Once a selection floats,
/// pointer input goes to it instead (see the input router).
#[derive(Debug, Clone)]
pub struct SelectTool {
    mode: SelectMode,
    start: Option<Pos2>,
    current: Pos2,
    lasso: Vec<Pos2>,
}

impl SelectTool {
    pub fn new(mode: SelectMode) -> Self {
        Self {
            mode,
            start: None,
            current: Pos2::ZERO,
            lasso: Vec::new(),
        }
    }

    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    /// Outline of the capture in progress.
    pub fn marquee(&self) -> Option<Path> {
        let start = self.start?;
        Some(match self.mode {
            SelectMode::Rect => Path::rect(Rect::from_two_pos(start, self.current)),
            SelectMode::FreeForm => Path::polygon(self.lasso.clone()),
        })
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        match self.mode {
            SelectMode::Rect => ToolKind::RectSelect,
            SelectMode::FreeForm => ToolKind::FreeFormSelect,
        }
    }

    fn deactivate(&mut self, _ws: &mut Workspace) {
        self.cancel();
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, _ws: &mut Workspace) {
        self.start = Some(event.pos);
        self.current = event.pos;
        self.lasso = vec![event.pos];
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        let Some(start) = self.start else {
            return;
        };
        self.current = if event.constrain() && self.mode == SelectMode::Rect {
            constrain_square(start, event.pos)
        } else {
            event.pos
        };
        if self.lasso.last() != Some(&event.pos) {
            self.lasso.push(event.pos);
        }
        ws.canvas.request_redraw();
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        self.on_pointer_move(event, ws);
        let Some(marquee) = self.marquee() else {
            return;
        };
        self.cancel();
        let captured = match self.mode {
            SelectMode::Rect => FloatingSelection::capture_rect(&ws.canvas, marquee.bounds()),
            SelectMode::FreeForm => FloatingSelection::capture_path(&ws.canvas, marquee),
        };
        match captured {
            Some(selection) => {
                log::info!("Selection floating at {:?}", selection.rect());
                ws.selection = Some(selection);
            }
            None => log::debug!("Empty selection gesture ignored"),
        }
        ws.canvas.request_redraw();
    }

    fn is_busy(&self) -> bool {
        self.start.is_some()
    }

    fn cancel(&mut self) {
        self.start = None;
        self.lasso.clear();
    }

    fn preview(&self, img: &mut RgbaImage) {
        if let Some(path) = self.marquee() {
            draw::stroke_path(img, &path, 1.0, draw::rgba(MARQUEE_COLOR));
        }
    }
}
