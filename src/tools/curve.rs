use egui::Pos2;
use image::RgbaImage;

use crate::commit::actions;
use crate::raster::{Path, draw};
use crate::shape::constrain_line;
use crate::state::Workspace;

use super::{PointerEvent, Tool, ToolKind};

/// Where the curve gesture is. Only the final release touches the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurvePhase {
    Idle,
    /// Dragging out the chord between the two end points.
    BaseLine { start: Pos2, end: Pos2 },
    /// Chord fixed; the next press places the first control point.
    AwaitControl1 { start: Pos2, end: Pos2 },
    Control1 { start: Pos2, end: Pos2, c1: Pos2 },
    AwaitControl2 { start: Pos2, end: Pos2, c1: Pos2 },
    Control2 { start: Pos2, end: Pos2, c1: Pos2, c2: Pos2 },
}

#[derive(Debug, Clone)]
pub struct CurveTool {
    phase: CurvePhase,
    width: f32,
    color: egui::Color32,
}

impl CurveTool {
    pub fn new() -> Self {
        Self {
            phase: CurvePhase::Idle,
            width: 1.0,
            color: egui::Color32::BLACK,
        }
    }

    pub fn phase(&self) -> CurvePhase {
        self.phase
    }

    fn path(&self) -> Option<Path> {
        match self.phase {
            CurvePhase::Idle => None,
            CurvePhase::BaseLine { start, end } | CurvePhase::AwaitControl1 { start, end } => {
                Some(Path::polyline(vec![start, end]))
            }
            CurvePhase::Control1 { start, end, c1 } | CurvePhase::AwaitControl2 { start, end, c1 } => {
                Some(Path::cubic(start, c1, c1, end))
            }
            CurvePhase::Control2 { start, end, c1, c2 } => Some(Path::cubic(start, c1, c2, end)),
        }
    }
}

impl Default for CurveTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for CurveTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Curve
    }

    fn deactivate(&mut self, _ws: &mut Workspace) {
        if self.phase != CurvePhase::Idle {
            log::debug!("Discarding unfinished curve in {:?}", self.phase);
        }
        self.phase = CurvePhase::Idle;
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        let p = event.pos;
        self.phase = match self.phase {
            CurvePhase::Idle => {
                self.width = ws.width_for(ws.config.pencil_multiplier);
                self.color = ws.settings.foreground;
                CurvePhase::BaseLine { start: p, end: p }
            }
            CurvePhase::AwaitControl1 { start, end } => CurvePhase::Control1 { start, end, c1: p },
            CurvePhase::AwaitControl2 { start, end, c1 } => CurvePhase::Control2 { start, end, c1, c2: p },
            // A press while already dragging (lost release): keep the phase.
            other => other,
        };
        ws.canvas.request_redraw();
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        let p = event.pos;
        match &mut self.phase {
            CurvePhase::BaseLine { start, end } => {
                *end = if event.constrain() { constrain_line(*start, p) } else { p };
            }
            CurvePhase::Control1 { c1, .. } => *c1 = p,
            CurvePhase::Control2 { c2, .. } => *c2 = p,
            _ => return,
        }
        ws.canvas.request_redraw();
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        self.on_pointer_move(event, ws);
        self.phase = match self.phase {
            CurvePhase::BaseLine { start, end } if start == end => {
                log::debug!("Curve chord has no length, discarded");
                CurvePhase::Idle
            }
            CurvePhase::BaseLine { start, end } => CurvePhase::AwaitControl1 { start, end },
            CurvePhase::Control1 { start, end, c1 } => CurvePhase::AwaitControl2 { start, end, c1 },
            CurvePhase::Control2 { .. } => {
                if let Some(path) = self.path() {
                    let (width, color) = (self.width, draw::rgba(self.color));
                    ws.canvas.composite_over(|img| draw::stroke_path(img, &path, width, color));
                    ws.commit(actions::CURVE);
                }
                CurvePhase::Idle
            }
            other => other,
        };
    }

    fn is_busy(&self) -> bool {
        self.phase != CurvePhase::Idle
    }

    fn cancel(&mut self) {
        self.phase = CurvePhase::Idle;
    }

    fn preview(&self, img: &mut RgbaImage) {
        if let Some(path) = self.path() {
            draw::stroke_path(img, &path, self.width, draw::rgba(self.color));
        }
    }
}
