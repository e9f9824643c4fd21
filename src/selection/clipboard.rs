use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use parking_lot::Mutex;

use crate::error::{EngineError, EngineResult};

/// Opaque put/get of a lossless bitmap (PNG bytes).
pub trait Clipboard {
    fn put_image(&mut self, png: Vec<u8>) -> EngineResult<()>;

    /// `Ok(None)` when the clipboard holds nothing image-like.
    fn get_image(&mut self) -> EngineResult<Option<Vec<u8>>>;
}

/// Process-local clipboard; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts arbitrary bytes on the clipboard, as another application might.
    pub fn set_raw(&self, bytes: Vec<u8>) {
        *self.slot.lock() = Some(bytes);
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }
}

impl Clipboard for MemoryClipboard {
    fn put_image(&mut self, png: Vec<u8>) -> EngineResult<()> {
        self.set_raw(png);
        Ok(())
    }

    fn get_image(&mut self) -> EngineResult<Option<Vec<u8>>> {
        Ok(self.slot.lock().clone())
    }
}

/// The operating system clipboard. Images travel as RGBA through arboard and
/// are re-encoded to PNG at this boundary.
#[cfg(not(target_arch = "wasm32"))]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClipboard {
    pub fn new() -> EngineResult<Self> {
        let inner = arboard::Clipboard::new().map_err(|err| EngineError::Clipboard(err.to_string()))?;
        Ok(Self { inner })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clipboard for SystemClipboard {
    fn put_image(&mut self, png: Vec<u8>) -> EngineResult<()> {
        let image = decode_png(&png)?;
        let data = arboard::ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: std::borrow::Cow::Owned(image.into_raw()),
        };
        self.inner
            .set_image(data)
            .map_err(|err| EngineError::Clipboard(err.to_string()))
    }

    fn get_image(&mut self) -> EngineResult<Option<Vec<u8>>> {
        let data = match self.inner.get_image() {
            Ok(data) => data,
            Err(arboard::Error::ContentNotAvailable) => return Ok(None),
            Err(err) => return Err(EngineError::Clipboard(err.to_string())),
        };
        let Some(image) = RgbaImage::from_raw(data.width as u32, data.height as u32, data.bytes.into_owned()) else {
            return Err(EngineError::EmptyClipboard);
        };
        encode_png(&image).map(Some)
    }
}

pub fn encode_png(image: &RgbaImage) -> EngineResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub fn decode_png(bytes: &[u8]) -> EngineResult<RgbaImage> {
    if bytes.is_empty() {
        return Err(EngineError::EmptyClipboard);
    }
    Ok(image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn png_keeps_alpha() {
        let mut img = RgbaImage::new(3, 3);
        img.put_pixel(1, 1, Rgba([10, 20, 30, 255]));
        let decoded = decode_png(&encode_png(&img).unwrap()).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn clones_share_contents() {
        let mut a = MemoryClipboard::new();
        let mut b = a.clone();
        assert!(b.get_image().unwrap().is_none());
        a.put_image(vec![1, 2, 3]).unwrap();
        assert_eq!(b.get_image().unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn garbage_is_not_a_bitmap() {
        assert!(decode_png(b"not a png").is_err());
        assert!(matches!(decode_png(&[]), Err(EngineError::EmptyClipboard)));
    }
}
