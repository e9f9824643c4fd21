//! Floating selections: capture, move, resize, rotate and commit.

use std::f32::consts::FRAC_PI_2;

use egui::{Pos2, Rect, Vec2};
use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::commit::actions;
use crate::raster::{Path, RasterBuffer, WHITE, draw};

pub mod clipboard;
pub mod handles;

pub use clipboard::{Clipboard, MemoryClipboard};
#[cfg(not(target_arch = "wasm32"))]
pub use clipboard::SystemClipboard;
pub use handles::{Cursor, Handle, HandleSet, ResizeDirection};

const ROTATE_SNAP: f32 = std::f32::consts::PI / 12.0;

/// What a pointer-down on a floating selection landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Handle(Handle),
    Body,
}

/// The gesture a floating selection is currently going through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Moving,
    Resizing(Handle),
    Rotating,
}

/// The canvas area a selection was lifted from.
#[derive(Debug, Clone, PartialEq)]
struct Source {
    rect: Rect,
    path: Option<Path>,
}

#[derive(Debug, Clone)]
enum Gesture {
    Moving {
        last: Pos2,
    },
    /// Resampling always starts from these, never from the previous drag step.
    Resizing {
        handle: Handle,
        start_rect: Rect,
        start_image: RgbaImage,
        start_path: Option<Path>,
    },
    Rotating {
        start_angle: f32,
        start_rotation: f32,
    },
}

/// Captured pixels held off-canvas until committed.
///
/// `rect` is the un-rotated bounding box and always has the size of `image`.
/// Rotation is only applied when the selection is drawn or committed.
#[derive(Debug, Clone)]
pub struct FloatingSelection {
    image: RgbaImage,
    rect: Rect,
    path: Option<Path>,
    rotation: f32,
    source: Option<Source>,
    source_cleared: bool,
    dirty: bool,
    gesture: Option<Gesture>,
    /// Action name used when the selection is committed.
    action: &'static str,
}

impl FloatingSelection {
    /// Lifts an axis-aligned region. `None` if it lies outside the canvas.
    pub fn capture_rect(canvas: &RasterBuffer, rect: Rect) -> Option<Self> {
        let (x, y, w, h) = draw::pixel_bounds(rect, canvas.width(), canvas.height())?;
        let image = draw::crop(canvas.image(), x as i32, y as i32, w, h);
        let rect = Rect::from_min_size(Pos2::new(x as f32, y as f32), Vec2::new(w as f32, h as f32));
        log::debug!("Captured rect selection {:?}", rect);
        Some(Self::lifted(image, rect, None))
    }

    /// Lifts the pixels under a closed path; pixels outside it stay transparent.
    pub fn capture_path(canvas: &RasterBuffer, mut path: Path) -> Option<Self> {
        if path.len() < 3 {
            return None;
        }
        path.close();
        let (x, y, w, h) = draw::pixel_bounds(path.bounds(), canvas.width(), canvas.height())?;
        let image = draw::crop_masked(canvas.image(), &path, x as i32, y as i32, w, h);
        let rect = Rect::from_min_size(Pos2::new(x as f32, y as f32), Vec2::new(w as f32, h as f32));
        log::debug!("Captured free-form selection {:?} ({} points)", rect, path.len());
        Some(Self::lifted(image, rect, Some(path)))
    }

    fn lifted(image: RgbaImage, rect: Rect, path: Option<Path>) -> Self {
        Self {
            image,
            rect,
            path: path.clone(),
            rotation: 0.0,
            source: Some(Source { rect, path }),
            source_cleared: false,
            dirty: false,
            gesture: None,
            action: actions::MOVE_SELECTION,
        }
    }

    /// A selection with no canvas source, e.g. pasted pixels or converted text.
    /// It always writes its pixels on commit, under `action`.
    pub fn detached(image: RgbaImage, min: Pos2, action: &'static str) -> Self {
        let rect = Rect::from_min_size(min, Vec2::new(image.width() as f32, image.height() as f32));
        Self {
            image,
            rect,
            path: None,
            rotation: 0.0,
            source: None,
            source_cleared: true,
            dirty: true,
            gesture: None,
            action,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Whether committing would change the canvas.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn source_cleared(&self) -> bool {
        self.source_cleared
    }

    pub fn action(&self) -> &'static str {
        self.action
    }

    pub fn transform_kind(&self) -> Option<TransformKind> {
        self.gesture.as_ref().map(|g| match g {
            Gesture::Moving { .. } => TransformKind::Moving,
            Gesture::Resizing { handle, .. } => TransformKind::Resizing(*handle),
            Gesture::Rotating { .. } => TransformKind::Rotating,
        })
    }

    pub fn handles(&self, size: f32, rotate_offset: f32) -> HandleSet {
        HandleSet {
            rect: self.rect,
            rotation: self.rotation,
            size,
            rotate_offset,
        }
    }

    /// Handles first, then the body. `None` means the point is outside.
    pub fn hit(&self, point: Pos2, size: f32, rotate_offset: f32) -> Option<Hit> {
        let handles = self.handles(size, rotate_offset);
        if let Some(handle) = handles.hit(point) {
            return Some(Hit::Handle(handle));
        }
        let inside = match &self.path {
            Some(path) => path.contains(handles::to_local(point, self.rect.center(), self.rotation)),
            None => handles.body_contains(point),
        };
        inside.then_some(Hit::Body)
    }

    pub fn begin_move(&mut self, pointer: Pos2) {
        self.gesture = Some(Gesture::Moving { last: pointer });
    }

    pub fn begin_handle(&mut self, handle: Handle, pointer: Pos2) {
        self.gesture = Some(match handle {
            Handle::Rotate => Gesture::Rotating {
                start_angle: handles::angle_around(self.rect.center(), pointer),
                start_rotation: self.rotation,
            },
            handle => Gesture::Resizing {
                handle,
                start_rect: self.rect,
                start_image: self.image.clone(),
                start_path: self.path.clone(),
            },
        });
    }

    /// Applies the current gesture for a pointer drag to `pointer`.
    pub fn drag_to(&mut self, canvas: &mut RasterBuffer, pointer: Pos2, constrain: bool) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        let gesture = match gesture {
            Gesture::Moving { last } => {
                let delta = pointer - last;
                if delta != Vec2::ZERO {
                    self.clear_source(canvas);
                    self.rect = self.rect.translate(delta);
                    if let Some(path) = &mut self.path {
                        path.translate(delta);
                    }
                    self.dirty = true;
                }
                Gesture::Moving { last: pointer }
            }
            Gesture::Resizing {
                handle,
                start_rect,
                start_image,
                start_path,
            } => {
                self.resize_from(handle, start_rect, &start_image, start_path.as_ref(), pointer, canvas);
                Gesture::Resizing {
                    handle,
                    start_rect,
                    start_image,
                    start_path,
                }
            }
            Gesture::Rotating {
                start_angle,
                start_rotation,
            } => {
                let turned = handles::normalize_angle(handles::angle_around(self.rect.center(), pointer) - start_angle);
                let mut rotation = start_rotation + turned;
                if constrain {
                    rotation = (rotation / ROTATE_SNAP).round() * ROTATE_SNAP;
                }
                if rotation != self.rotation {
                    self.clear_source(canvas);
                    self.rotation = handles::normalize_angle(rotation);
                    self.dirty = true;
                }
                Gesture::Rotating {
                    start_angle,
                    start_rotation,
                }
            }
        };
        self.gesture = Some(gesture);
    }

    fn resize_from(
        &mut self,
        handle: Handle,
        start_rect: Rect,
        start_image: &RgbaImage,
        start_path: Option<&Path>,
        pointer: Pos2,
        canvas: &mut RasterBuffer,
    ) {
        let center = start_rect.center();
        let local = handles::to_local(pointer, center, self.rotation);
        let resized = handle.resize_rect(start_rect, local, 1.0);
        let width = resized.width().round().max(1.0);
        let height = resized.height().round().max(1.0);
        let rounded = Rect::from_min_size(resized.min, Vec2::new(width, height));
        let mut rect = align_fixed_side(handle, resized, rounded);

        // The opposite side stays put on screen even when the selection is rotated.
        if self.rotation != 0.0 {
            let fixed = opposite(handle).local_position(start_rect, 0.0);
            let before = handles::to_world(fixed, center, self.rotation);
            let after = handles::to_world(fixed, rect.center(), self.rotation);
            rect = rect.translate(before - after);
        }

        if rect == self.rect {
            return;
        }
        self.clear_source(canvas);
        self.image = imageops::resize(start_image, width as u32, height as u32, FilterType::Triangle);
        self.path = start_path.map(|p| {
            let mut p = p.clone();
            p.map_rect(start_rect, rect);
            p
        });
        self.rect = rect;
        self.dirty = true;
    }

    /// Ends the current drag. Returns whether a gesture was active.
    pub fn end_gesture(&mut self) -> bool {
        self.gesture.take().is_some()
    }

    /// Whites out the source area, once.
    pub fn clear_source(&mut self, canvas: &mut RasterBuffer) {
        if self.source_cleared {
            return;
        }
        self.source_cleared = true;
        let Some(source) = &self.source else {
            return;
        };
        log::debug!("Clearing selection source {:?}", source.rect);
        canvas.composite_over(|img| match &source.path {
            Some(path) => draw::clear_path(img, path, WHITE),
            None => draw::clear_rect(img, source.rect, WHITE),
        });
    }

    /// Draws the selection (with its rotation) onto `img`.
    pub fn render(&self, img: &mut RgbaImage) {
        draw::draw_image(img, &self.image, self.rect.min, self.rotation);
    }

    /// Composites the selection into the canvas. Returns `false` and leaves the
    /// canvas untouched when the selection was never changed.
    pub fn commit(mut self, canvas: &mut RasterBuffer) -> bool {
        if !self.dirty {
            log::debug!("Selection unchanged, nothing to commit");
            return false;
        }
        self.clear_source(canvas);
        canvas.composite_over(|img| self.render(img));
        log::info!("Committed selection at {:?} (rotation {:.3})", self.rect, self.rotation);
        true
    }

    /// Drops the floating pixels, leaving the source area white.
    /// Returns whether the canvas changed.
    pub fn delete(mut self, canvas: &mut RasterBuffer) -> bool {
        self.clear_source(canvas);
        self.source.is_some()
    }

    /// Exact quarter turn around the bounding-box center.
    pub fn rotate_quarter(&mut self, canvas: &mut RasterBuffer, clockwise: bool) {
        self.clear_source(canvas);
        let center = self.rect.center();
        self.image = if clockwise {
            imageops::rotate90(&self.image)
        } else {
            imageops::rotate270(&self.image)
        };
        if let Some(path) = &mut self.path {
            path.rotate_about(center, if clockwise { FRAC_PI_2 } else { -FRAC_PI_2 });
        }
        self.rect = Rect::from_center_size(center, Vec2::new(self.image.width() as f32, self.image.height() as f32));
        self.dirty = true;
    }

    /// Resamples the floating image by `factor`, keeping the center.
    pub fn scale(&mut self, canvas: &mut RasterBuffer, factor: f32) {
        if !(factor.is_finite() && factor > 0.0) {
            log::warn!("Ignoring invalid scale factor {factor}");
            return;
        }
        self.clear_source(canvas);
        let width = (self.image.width() as f32 * factor).round().max(1.0);
        let height = (self.image.height() as f32 * factor).round().max(1.0);
        self.image = imageops::resize(&self.image, width as u32, height as u32, FilterType::Nearest);
        let rect = Rect::from_center_size(self.rect.center(), Vec2::new(width, height));
        if let Some(path) = &mut self.path {
            path.map_rect(self.rect, rect);
        }
        self.rect = rect;
        self.dirty = true;
    }
}

fn opposite(handle: Handle) -> Handle {
    match handle {
        Handle::TopLeft => Handle::BottomRight,
        Handle::Top => Handle::Bottom,
        Handle::TopRight => Handle::BottomLeft,
        Handle::Right => Handle::Left,
        Handle::BottomRight => Handle::TopLeft,
        Handle::Bottom => Handle::Top,
        Handle::BottomLeft => Handle::TopRight,
        Handle::Left => Handle::Right,
        Handle::Rotate => Handle::Rotate,
    }
}

/// Shifts `rounded` so the side opposite `handle` matches `exact`.
fn align_fixed_side(handle: Handle, exact: Rect, rounded: Rect) -> Rect {
    let fixed = opposite(handle);
    let delta = fixed.local_position(exact, 0.0) - fixed.local_position(rounded, 0.0);
    // Only the axes the handle drags need correcting.
    let delta = match handle {
        Handle::Top | Handle::Bottom => Vec2::new(0.0, delta.y),
        Handle::Left | Handle::Right => Vec2::new(delta.x, 0.0),
        _ => delta,
    };
    rounded.translate(delta)
}
