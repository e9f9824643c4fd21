#![allow(dead_code)]

use canvas_paint::{CommitLog, EditorContext, EngineConfig, InputEvent};
use egui::Pos2;
use image::{Rgba, RgbaImage};

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub fn editor(width: u32, height: u32) -> (EditorContext, CommitLog) {
    editor_with(width, height, EngineConfig::default())
}

pub fn editor_with(width: u32, height: u32, config: EngineConfig) -> (EditorContext, CommitLog) {
    let log = CommitLog::new();
    (EditorContext::new(width, height, config, log.clone()), log)
}

/// White image with `color` painted over `[x0, x1) x [y0, y1)`.
pub fn patch(width: u32, height: u32, (x0, y0, x1, y1): (u32, u32, u32, u32), color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
            color
        } else {
            WHITE
        }
    })
}

pub fn load(ctx: &mut EditorContext, image: &RgbaImage) {
    ctx.load(image.as_raw(), image.width(), image.height());
}

pub fn drag(ctx: &mut EditorContext, from: Pos2, to: Pos2) {
    ctx.handle_event(&InputEvent::down(from));
    ctx.handle_event(&InputEvent::moved(to));
    ctx.handle_event(&InputEvent::up(to));
}

pub fn click(ctx: &mut EditorContext, at: Pos2) {
    ctx.handle_event(&InputEvent::down(at));
    ctx.handle_event(&InputEvent::up(at));
}
