use egui::Color32;

use crate::commit::actions;
use crate::fill::{FillParams, flood_fill};
use crate::raster::draw;
use crate::state::Workspace;

use super::{PointerEvent, Tool, ToolKind};

/// Single-click tools: nothing to finish, nothing to preview.
macro_rules! click_tool {
    ($name:ident, $kind:expr) => {
        impl Tool for $name {
            fn kind(&self) -> ToolKind {
                $kind
            }

            fn deactivate(&mut self, _ws: &mut Workspace) {}

            fn on_pointer_down(&mut self, event: &PointerEvent, ws: &mut Workspace) {
                self.click(event, ws);
            }

            fn on_pointer_move(&mut self, _event: &PointerEvent, _ws: &mut Workspace) {}

            fn on_pointer_up(&mut self, _event: &PointerEvent, _ws: &mut Workspace) {}

            fn is_busy(&self) -> bool {
                false
            }

            fn cancel(&mut self) {}
        }
    };
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FillTool;

impl FillTool {
    fn click(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        let params = FillParams {
            noop_tolerance: ws.config.fill_noop_tolerance,
            match_tolerance: ws.config.fill_match_tolerance,
        };
        let (x, y) = (event.pos.x.floor() as i64, event.pos.y.floor() as i64);
        let color = draw::rgba(ws.settings.foreground);
        if flood_fill(&mut ws.canvas, x, y, color, params) > 0 {
            ws.commit(actions::FILL);
        }
    }
}

click_tool!(FillTool, ToolKind::Fill);

/// Samples a canvas pixel into the foreground color, or the background
/// color with the alternate modifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorPickerTool;

impl ColorPickerTool {
    fn click(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        let (x, y) = (event.pos.x.floor() as i64, event.pos.y.floor() as i64);
        let Some(px) = ws.canvas.pixel(x, y) else {
            log::debug!("Color pick at ({x}, {y}) is outside the canvas");
            return;
        };
        let color = Color32::from_rgba_unmultiplied(px[0], px[1], px[2], px[3]);
        if event.alternate() {
            ws.settings.background = color;
        } else {
            ws.settings.foreground = color;
        }
        log::info!("Picked {:?}", color);
    }
}

click_tool!(ColorPickerTool, ToolKind::ColorPicker);

/// Doubles the view zoom, or halves it with the alternate modifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagnifierTool;

impl MagnifierTool {
    fn click(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        let zoom = if event.alternate() { ws.zoom / 2.0 } else { ws.zoom * 2.0 };
        ws.set_zoom(zoom);
        ws.canvas.request_redraw();
        log::debug!("Zoom {}", ws.zoom);
    }
}

click_tool!(MagnifierTool, ToolKind::Magnifier);

#[cfg(test)]
mod tests {
    use egui::{Modifiers, Pos2};
    use image::Rgba;

    use super::*;
    use crate::config::EngineConfig;
    use crate::tools::testing::workspace;

    fn alt_click(pos: Pos2) -> PointerEvent {
        PointerEvent {
            modifiers: Modifiers::ALT,
            ..PointerEvent::new(pos)
        }
    }

    #[test]
    fn picker_sets_foreground_or_background() {
        let (mut ws, log) = workspace(50, 50, EngineConfig::default());
        let _ = ws.canvas.composite_over(|img| img.put_pixel(5, 6, Rgba([10, 20, 30, 255])));
        let mut picker = ColorPickerTool;

        picker.on_pointer_down(&PointerEvent::new(Pos2::new(5.5, 6.5)), &mut ws);
        assert_eq!(ws.settings.foreground, Color32::from_rgb(10, 20, 30));

        picker.on_pointer_down(&PointerEvent::new(Pos2::new(40.0, 40.0)), &mut ws);
        assert_eq!(ws.settings.foreground, Color32::WHITE);
        picker.on_pointer_down(&alt_click(Pos2::new(5.0, 6.0)), &mut ws);
        assert_eq!(ws.settings.background, Color32::from_rgb(10, 20, 30));
        assert_eq!(ws.settings.foreground, Color32::WHITE);
        assert!(log.is_empty());
    }

    #[test]
    fn picker_outside_the_canvas_changes_nothing() {
        let (mut ws, _) = workspace(50, 50, EngineConfig::default());
        let before = ws.settings.clone();
        ColorPickerTool.on_pointer_down(&PointerEvent::new(Pos2::new(-1.0, 10.0)), &mut ws);
        ColorPickerTool.on_pointer_down(&alt_click(Pos2::new(10.0, 50.0)), &mut ws);
        assert_eq!(ws.settings, before);
    }

    #[test]
    fn magnifier_doubles_and_halves_within_limits() {
        let (mut ws, log) = workspace(50, 50, EngineConfig::default());
        let mut magnifier = MagnifierTool;
        let at = Pos2::new(10.0, 10.0);
        assert_eq!(ws.zoom, 1.0);

        magnifier.on_pointer_down(&PointerEvent::new(at), &mut ws);
        assert_eq!(ws.zoom, 2.0);
        for _ in 0..5 {
            magnifier.on_pointer_down(&PointerEvent::new(at), &mut ws);
        }
        assert_eq!(ws.zoom, 8.0);

        magnifier.on_pointer_down(&alt_click(at), &mut ws);
        assert_eq!(ws.zoom, 4.0);
        for _ in 0..5 {
            magnifier.on_pointer_down(&alt_click(at), &mut ws);
        }
        assert_eq!(ws.zoom, 1.0);
        assert!(log.is_empty());
    }
}
