use std::f32::consts::TAU;

use egui::{Pos2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::commit::actions;
use crate::config::EngineConfig;
use crate::raster::draw;
use crate::state::Workspace;

use super::{PointerEvent, Tool, ToolKind};

/// Sprays dots around the pointer on every tick while the button is held.
/// The whole spray session is one commit.
#[derive(Debug, Clone)]
pub struct AirbrushTool {
    rng: StdRng,
    /// Pointer position while held.
    spraying: Option<Pos2>,
    sprayed: bool,
}

impl AirbrushTool {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            spraying: None,
            sprayed: false,
        }
    }

    /// One burst: `size * dots_per_size` points within `size * radius_per_size`
    /// of `center`.
    fn scatter(&mut self, center: Pos2, size: f32, config: &EngineConfig) -> Vec<Pos2> {
        let size = size.max(1.0);
        let count = size as u32 * config.airbrush_dots_per_size;
        let radius = size * config.airbrush_radius_per_size;
        // sqrt of a uniform sample keeps the disk density even instead of center-heavy
        (0..count)
            .map(|_| {
                let r = self.rng.r#gen::<f32>().sqrt() * radius;
                let theta = self.rng.gen_range(0.0..TAU);
                center + Vec2::angled(theta) * r
            })
            .collect()
    }

    fn spray(&mut self, ws: &mut Workspace) {
        let Some(center) = self.spraying else {
            return;
        };
        let color = draw::rgba(ws.settings.foreground);
        let dots: Vec<(i32, i32)> = self
            .scatter(center, ws.settings.size, &ws.config)
            .into_iter()
            .map(|p| (p.x.floor() as i32, p.y.floor() as i32))
            .collect();
        ws.canvas.composite_over(|img| {
            for (x, y) in dots {
                draw::paint(img, x, y, color);
            }
        });
        self.sprayed = true;
    }

    fn end_spray(&mut self, ws: &mut Workspace) {
        self.spraying = None;
        if std::mem::take(&mut self.sprayed) {
            ws.commit(actions::AIRBRUSH);
        }
    }
}

impl Default for AirbrushTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for AirbrushTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Airbrush
    }

    fn activate(&mut self, ws: &mut Workspace) {
        if let Some(seed) = ws.config.airbrush_seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
    }

    fn deactivate(&mut self, ws: &mut Workspace) {
        self.end_spray(ws);
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        self.spraying = Some(event.pos);
        self.spray(ws);
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, _ws: &mut Workspace) {
        if self.spraying.is_some() {
            self.spraying = Some(event.pos);
        }
    }

    fn on_pointer_up(&mut self, _event: &PointerEvent, ws: &mut Workspace) {
        self.end_spray(ws);
    }

    fn tick(&mut self, ws: &mut Workspace) {
        self.spray(ws);
    }

    fn wants_ticks(&self) -> bool {
        self.spraying.is_some()
    }

    fn is_busy(&self) -> bool {
        self.spraying.is_some()
    }

    fn cancel(&mut self) {
        self.spraying = None;
        self.sprayed = false;
    }

    fn finish(&mut self, ws: &mut Workspace) {
        self.end_spray(ws);
    }
}
