//! Frame composition: what the host shows for the current editor state.
//!
//! The canvas is never modified here. Previews, the floating selection and
//! the live text are drawn into a copy; overlay geometry is returned in buffer
//! coordinates for the host to paint with its own primitives.
use egui::{ColorImage, Pos2, Rect};
use image::RgbaImage;
use log::debug;

use crate::raster::draw;
use crate::selection::{Handle, HandleSet};
use crate::state::EditorContext;
use crate::tools::Tool;

#[derive(Debug, Clone)]
pub struct Frame {
    /// Canvas with every in-progress pixel overlay applied.
    pub image: RgbaImage,
    /// Corners of the floating selection (rotated) or of the text box,
    /// clockwise from top-left.
    pub outline: Option<[Pos2; 4]>,
    pub handles: Vec<(Handle, Pos2)>,
    pub text_rect: Option<Rect>,
    pub zoom: f32,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(
            [self.image.width() as usize, self.image.height() as usize],
            self.image.as_raw(),
        )
    }

    /// Maps a buffer point to the screen, given where the canvas is drawn.
    pub fn to_screen(&self, canvas_rect: Rect, p: Pos2) -> Pos2 {
        canvas_rect.min + p.to_vec2() * self.zoom
    }
}

/// Composes the display frame for `ctx`.
pub fn compose(ctx: &EditorContext) -> Frame {
    let ws = &ctx.workspace;
    let (size, rotate_offset) = (ws.config.handle_size, ws.config.rotate_handle_offset);
    let mut image = ws.canvas.image().clone();
    ctx.tool.preview(&mut image);

    let mut outline = None;
    let mut handles = Vec::new();

    if let Some(selection) = &ws.selection {
        selection.render(&mut image);
        let set = selection.handles(size, rotate_offset);
        outline = Some(set.outline());
        handles = set.positions().to_vec();
    }

    let text_rect = ws.text_box.as_ref().map(|text| text.rect());
    if let Some(text) = &ws.text_box {
        match text.render(&ws.fonts) {
            Ok(rendered) => draw::draw_image(&mut image, &rendered, text.rect().min, 0.0),
            Err(err) => debug!("No live text preview: {err}"),
        }
        let set = HandleSet {
            rect: text.rect(),
            rotation: 0.0,
            size,
            rotate_offset,
        };
        outline = Some(set.outline());
        handles = set.positions().to_vec();
    }

    Frame {
        image,
        outline,
        handles,
        text_rect,
        zoom: ws.zoom,
    }
}

impl EditorContext {
    /// The display frame for the current state.
    pub fn render(&self) -> Frame {
        compose(self)
    }
}

#[cfg(test)]
mod tests {
    use egui::Key;
    use image::Rgba;

    use super::*;
    use crate::commit::NullSink;
    use crate::config::EngineConfig;
    use crate::input::InputEvent;

    #[test]
    fn idle_frame_is_the_canvas() {
        let ctx = EditorContext::new(30, 20, EngineConfig::default(), NullSink);
        let frame = ctx.render();
        assert_eq!(frame.image.as_raw(), ctx.canvas().image().as_raw());
        assert!(frame.outline.is_none());
        assert!(frame.handles.is_empty());
        assert_eq!(frame.to_color_image().size, [30, 20]);
    }

    #[test]
    fn shape_preview_stays_out_of_the_canvas() {
        let mut ctx = EditorContext::new(50, 50, EngineConfig::default(), NullSink);
        ctx.handle_event(&InputEvent::key(Key::R));
        ctx.handle_event(&InputEvent::down(Pos2::new(10.0, 10.0)));
        ctx.handle_event(&InputEvent::moved(Pos2::new(40.0, 40.0)));

        let frame = ctx.render();
        assert_ne!(frame.image.as_raw(), ctx.canvas().image().as_raw());
        assert_eq!(ctx.canvas().pixel(10, 10), Some(Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn floating_selection_has_nine_handles() {
        let mut ctx = EditorContext::new(50, 50, EngineConfig::default(), NullSink);
        ctx.select_all();
        let frame = ctx.render();
        assert_eq!(frame.handles.len(), 9);
        assert_eq!(
            frame.outline,
            Some([
                Pos2::new(0.0, 0.0),
                Pos2::new(50.0, 0.0),
                Pos2::new(50.0, 50.0),
                Pos2::new(0.0, 50.0),
            ])
        );
        assert_eq!(frame.text_rect, None);
    }
}
