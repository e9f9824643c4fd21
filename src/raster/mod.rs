use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use image::{Rgba, RgbaImage};

use crate::config::{EngineConfig, MAX_CANVAS_DIM};

pub mod draw;
pub mod path;

pub use path::Path;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// The canvas pixels: one flat, row-major RGBA8 buffer.
///
/// Mutations go through [`RasterBuffer::composite_over`], which draws into a
/// copy and swaps it in, so the previous image is always available to the
/// caller for free.
#[derive(Debug, Clone)]
pub struct RasterBuffer {
    image: RgbaImage,
    version: u64,
    redraw_requested: bool,
}

impl RasterBuffer {
    /// Blank white surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::from_pixel(width.max(1), height.max(1), WHITE))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image,
            version: 0,
            redraw_requested: true,
        }
    }

    /// Builds a surface from document bytes.
    ///
    /// Accepts raw RGBA of exactly `width * height * 4` bytes or any encoded
    /// image the `image` crate can decode. Anything else yields a blank white
    /// surface of the requested size, at most [`MAX_CANVAS_DIM`] per side.
    pub fn from_bytes(bytes: &[u8], width: u32, height: u32) -> Self {
        Self::from_bytes_limited(bytes, width, height, MAX_CANVAS_DIM)
    }

    /// Like [`RasterBuffer::from_bytes`], with the decoded or blank surface
    /// limited to `max_dim` per side. Raw bytes are taken at their own size.
    pub fn from_bytes_limited(bytes: &[u8], width: u32, height: u32, max_dim: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        if bytes.len() as u64 == u64::from(width) * u64::from(height) * 4 {
            if let Some(image) = RgbaImage::from_raw(width, height, bytes.to_vec()) {
                return Self::from_image(image);
            }
        }
        let max_dim = max_dim.max(1);
        if width > max_dim || height > max_dim {
            log::warn!("Canvas {width}x{height} exceeds {max_dim} per side, clamping");
        }
        let (width, height) = (width.min(max_dim), height.min(max_dim));
        match image::load_from_memory(bytes) {
            Ok(decoded) => {
                let decoded = decoded.to_rgba8();
                log::info!("Loaded {}x{} image into {}x{} canvas", decoded.width(), decoded.height(), width, height);
                let mut surface = Self::new(width, height);
                surface.image = anchored_copy(&decoded, width, height);
                surface
            }
            Err(err) => {
                log::warn!("Undecodable canvas bytes ({} bytes): {}; using a blank canvas", bytes.len(), err);
                Self::new(width, height)
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Pixel at integer buffer coordinates, if in bounds.
    pub fn pixel(&self, x: i64, y: i64) -> Option<Rgba<u8>> {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return None;
        }
        Some(*self.image.get_pixel(x as u32, y as u32))
    }

    /// Full copy of the pixel bytes, as handed to the document on commit.
    pub fn snapshot(&self) -> Vec<u8> {
        self.image.as_raw().clone()
    }

    /// Changes the canvas size, keeping the overlapping region anchored
    /// top-left and filling new area white. Dimensions are clamped to the
    /// configured limits.
    pub fn resize(&mut self, width: u32, height: u32, config: &EngineConfig) {
        let width = config.clamp_dim(width);
        let height = config.clamp_dim(height);
        if width == self.width() && height == self.height() {
            return;
        }
        log::info!("Resizing canvas {}x{} -> {}x{}", self.width(), self.height(), width, height);
        let resized = anchored_copy(&self.image, width, height);
        self.replace(resized);
    }

    /// Draws into a copy of the current pixels and swaps the copy in.
    /// Returns the image that was replaced.
    pub fn composite_over(&mut self, op: impl FnOnce(&mut RgbaImage)) -> RgbaImage {
        let mut next = self.image.clone();
        op(&mut next);
        self.replace(next)
    }

    /// Swaps in a whole new image. Returns the old one.
    pub fn replace(&mut self, image: RgbaImage) -> RgbaImage {
        self.version += 1;
        self.redraw_requested = true;
        std::mem::replace(&mut self.image, image)
    }

    /// Bumped on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Returns whether a redraw was requested since the last call.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    pub fn content_hash(&self) -> u64 {
        content_hash(self.image.as_raw(), self.width(), self.height())
    }
}

pub fn content_hash(bytes: &[u8], width: u32, height: u32) -> u64 {
    let mut hasher = DefaultHasher::new();
    width.hash(&mut hasher);
    height.hash(&mut hasher);
    bytes.hash(&mut hasher);
    hasher.finish()
}

/// Copies `src` into a new white image of the given size, anchored top-left.
fn anchored_copy(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(width, height, WHITE);
    let w = width.min(src.width());
    let h = height.min(src.height());
    for y in 0..h {
        for x in 0..w {
            out.put_pixel(x, y, *src.get_pixel(x, y));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_surface_is_white() {
        let surface = RasterBuffer::new(800, 600);
        assert_eq!(surface.as_bytes().len(), 800 * 600 * 4);
        assert!(surface.as_bytes().iter().all(|b| *b == 255));
    }

    #[test]
    fn resize_keeps_top_left_and_clamps() {
        let config = EngineConfig::default();
        let mut surface = RasterBuffer::new(100, 100);
        let _ = surface.composite_over(|img| img.put_pixel(0, 0, Rgba([1, 2, 3, 255])));
        surface.resize(10, 20_000, &config);
        assert_eq!((surface.width(), surface.height()), (50, 8192));
        assert_eq!(surface.pixel(0, 0), Some(Rgba([1, 2, 3, 255])));
        assert_eq!(surface.pixel(49, 8191), Some(WHITE));
        assert_eq!(surface.as_bytes().len(), 50 * 8192 * 4);
    }

    #[test]
    fn composite_over_returns_previous_image() {
        let mut surface = RasterBuffer::new(60, 60);
        let before_version = surface.version();
        let old = surface.composite_over(|img| img.put_pixel(5, 5, Rgba([0, 0, 0, 255])));
        assert_eq!(*old.get_pixel(5, 5), WHITE);
        assert_eq!(surface.pixel(5, 5), Some(Rgba([0, 0, 0, 255])));
        assert!(surface.version() > before_version);
        assert!(surface.take_redraw_request());
        assert!(!surface.take_redraw_request());
    }

    #[test]
    fn garbage_bytes_fall_back_to_white() {
        let surface = RasterBuffer::from_bytes(&[1, 2, 3], 64, 64);
        assert_eq!((surface.width(), surface.height()), (64, 64));
        assert_eq!(surface.pixel(10, 10), Some(WHITE));
    }

    #[test]
    fn oversized_fallback_is_clamped() {
        let surface = RasterBuffer::from_bytes(b"not an image", 1_000_000, 1);
        assert_eq!((surface.width(), surface.height()), (MAX_CANVAS_DIM, 1));
        let surface = RasterBuffer::from_bytes_limited(b"not an image", 300, 40, 100);
        assert_eq!((surface.width(), surface.height()), (100, 40));
        assert_eq!(surface.pixel(99, 39), Some(WHITE));
    }

    #[test]
    fn out_of_bounds_pixel_is_none() {
        let surface = RasterBuffer::new(60, 60);
        assert_eq!(surface.pixel(-1, 0), None);
        assert_eq!(surface.pixel(60, 0), None);
    }
}
