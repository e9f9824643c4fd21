//! Edits that act on the whole floating selection or the whole canvas. They
//! are reachable from keyboard shortcuts and from the command queue.
use egui::{Pos2, Rect, Vec2};
use image::RgbaImage;
use log::{debug, info, warn};

use crate::commit::actions;
use crate::raster::{WHITE, draw};
use crate::selection::{Clipboard, FloatingSelection};
use crate::selection::clipboard::{decode_png, encode_png};
use crate::tools::{Tool, ToolKind};

use super::EditorContext;

impl EditorContext {
    /// Puts the floating selection, as displayed, on the clipboard.
    pub fn copy(&mut self) -> bool {
        let ws = &mut self.workspace;
        let Some(selection) = &ws.selection else {
            debug!("Copy without a selection ignored");
            return false;
        };
        let image = displayed_pixels(selection);
        match encode_png(&image).and_then(|png| ws.clipboard.put_image(png)) {
            Ok(()) => {
                info!("Copied {}x{} pixels", image.width(), image.height());
                true
            }
            Err(err) => {
                warn!("Copy failed: {err}");
                false
            }
        }
    }

    /// Copy, then delete the selection.
    pub fn cut(&mut self) -> bool {
        if !self.copy() {
            return false;
        }
        self.remove_selection(actions::CUT)
    }

    /// Drops the floating selection, leaving its source area white.
    pub fn delete_selection(&mut self) -> bool {
        self.remove_selection(actions::DELETE_SELECTION)
    }

    fn remove_selection(&mut self, action: &str) -> bool {
        let Some(selection) = self.workspace.selection.take() else {
            return false;
        };
        if selection.delete(&mut self.workspace.canvas) {
            self.workspace.commit(action);
        }
        self.workspace.canvas.request_redraw();
        self.settle_state();
        true
    }

    /// Floats the clipboard bitmap at the last pointer position, kept inside
    /// the canvas. A clipboard without a decodable bitmap is a no-op.
    pub fn paste(&mut self) -> bool {
        let payload = match self.workspace.clipboard.get_image() {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("Paste with an empty clipboard ignored");
                return false;
            }
            Err(err) => {
                warn!("Paste failed: {err}");
                return false;
            }
        };
        let image = match decode_png(&payload) {
            Ok(image) => image,
            Err(err) => {
                warn!("Paste ignored: {err}");
                return false;
            }
        };
        self.commit_pending();
        self.select_tool(ToolKind::RectSelect);
        let min = self.paste_origin(image.width(), image.height());
        info!("Pasted {}x{} at {:?}", image.width(), image.height(), min);
        self.set_selection(FloatingSelection::detached(image, min, actions::PASTE));
        true
    }

    fn paste_origin(&self, width: u32, height: u32) -> Pos2 {
        let canvas = &self.workspace.canvas;
        let center = self
            .workspace
            .last_pointer
            .unwrap_or_else(|| Pos2::new(canvas.width() as f32 / 2.0, canvas.height() as f32 / 2.0));
        let place = |c: f32, size: u32, limit: u32| {
            let max = (limit as f32 - size as f32).max(0.0);
            (c - size as f32 / 2.0).round().clamp(0.0, max)
        };
        Pos2::new(
            place(center.x, width, canvas.width()),
            place(center.y, height, canvas.height()),
        )
    }

    /// Floats the whole canvas as a rectangle selection.
    pub fn select_all(&mut self) -> bool {
        self.commit_pending();
        self.select_tool(ToolKind::RectSelect);
        self.tool.finish(&mut self.workspace);
        let canvas = &self.workspace.canvas;
        let bounds = Rect::from_min_size(Pos2::ZERO, Vec2::new(canvas.width() as f32, canvas.height() as f32));
        match FloatingSelection::capture_rect(canvas, bounds) {
            Some(selection) => {
                self.set_selection(selection);
                true
            }
            None => false,
        }
    }

    /// Exact quarter turn of the floating selection.
    pub fn rotate_selection(&mut self, clockwise: bool) -> bool {
        let ws = &mut self.workspace;
        let Some(selection) = ws.selection.as_mut() else {
            return false;
        };
        selection.rotate_quarter(&mut ws.canvas, clockwise);
        ws.canvas.request_redraw();
        true
    }

    pub fn scale_selection(&mut self, factor: f32) -> bool {
        let ws = &mut self.workspace;
        let Some(selection) = ws.selection.as_mut() else {
            return false;
        };
        selection.scale(&mut ws.canvas, factor);
        ws.canvas.request_redraw();
        true
    }

    /// Renders the text box into a floating selection so it can be moved,
    /// resized and rotated. An empty box stays as it is.
    pub fn convert_text_to_selection(&mut self) -> bool {
        let Some(text) = self.workspace.text_box.as_ref() else {
            return false;
        };
        if text.is_empty() {
            debug!("Empty text box not converted");
            return false;
        }
        let image = match text.render(&self.workspace.fonts) {
            Ok(image) => image,
            Err(err) => {
                warn!("Text not converted: {err}");
                return false;
            }
        };
        let min = text.rect().min;
        self.workspace.text_box = None;
        self.text_drag = None;
        self.select_tool(ToolKind::RectSelect);
        info!("Text converted to a selection at {:?}", min);
        self.set_selection(FloatingSelection::detached(image, min, actions::TEXT));
        true
    }

    /// Paints the whole canvas white.
    pub fn clear_canvas(&mut self) {
        self.commit_pending();
        self.tool.finish(&mut self.workspace);
        self.workspace
            .canvas
            .composite_over(|img| img.pixels_mut().for_each(|px| *px = WHITE));
        self.workspace.commit(actions::CLEAR_CANVAS);
        self.settle_state();
    }

    /// Resizes the canvas (clamped to the configured limits), anchored top-left.
    pub fn resize_canvas(&mut self, width: u32, height: u32) -> bool {
        self.commit_pending();
        self.tool.finish(&mut self.workspace);
        let ws = &mut self.workspace;
        let before = (ws.canvas.width(), ws.canvas.height());
        ws.canvas.resize(width, height, &ws.config);
        let changed = before != (ws.canvas.width(), ws.canvas.height());
        if changed {
            ws.commit(actions::RESIZE_CANVAS);
        }
        self.settle_state();
        changed
    }
}

/// The selection's pixels with its rotation applied, cropped to the rotated bounds.
fn displayed_pixels(selection: &FloatingSelection) -> RgbaImage {
    if selection.rotation() == 0.0 {
        return selection.image().clone();
    }
    let outline = selection.handles(0.0, 0.0).outline();
    let bounds = Rect::from_points(&outline);
    let mut out = RgbaImage::new(bounds.width().ceil().max(1.0) as u32, bounds.height().ceil().max(1.0) as u32);
    let origin = selection.rect().min - bounds.min.to_vec2();
    draw::draw_image(&mut out, selection.image(), origin, selection.rotation());
    out
}
