//! Text boxes and glyph rasterization.
//!
//! The engine owns the box geometry, the font and the commit; typing into the
//! box is left to the host's text widget, which writes through
//! [`TextBox::set_text`].

use std::collections::BTreeMap;
use std::fmt;

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use egui::{Color32, Rect};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    pub name: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            name: "Ubuntu-Light".to_owned(),
            size: 24.0,
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

/// Named fonts available to the text tool.
#[derive(Clone, Default)]
pub struct FontBook {
    fonts: BTreeMap<String, FontArc>,
    fallback: Option<String>,
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBook")
            .field("fonts", &self.fonts.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fonts bundled with egui.
    pub fn builtin() -> Self {
        let mut book = Self::new();
        for (name, data) in egui::FontDefinitions::default().font_data {
            if let Err(err) = book.insert(&name, data.font.to_vec()) {
                log::warn!("Skipping bundled font {name}: {err}");
            }
        }
        if book.fonts.contains_key("Ubuntu-Light") {
            book.fallback = Some("Ubuntu-Light".to_owned());
        }
        book
    }

    /// Registers a TrueType/OpenType font. The first font added becomes the fallback.
    pub fn insert(&mut self, name: &str, bytes: Vec<u8>) -> EngineResult<()> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| EngineError::InvalidFont(e.to_string()))?;
        self.fonts.insert(name.to_owned(), font);
        if self.fallback.is_none() {
            self.fallback = Some(name.to_owned());
        }
        Ok(())
    }

    /// Looks a font up by name, falling back to the default font.
    pub fn get(&self, name: &str) -> EngineResult<&FontArc> {
        self.fonts
            .get(name)
            .or_else(|| self.fallback.as_ref().and_then(|f| self.fonts.get(f)))
            .ok_or_else(|| EngineError::MissingFont(name.to_owned()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }
}

/// A laid out line: glyphs with their pen x position, and the line width.
struct Line {
    glyphs: Vec<(GlyphId, f32)>,
    width: f32,
}

/// Greedy word wrap at `max_width`; explicit newlines always break.
fn layout(font: &FontArc, size: f32, text: &str, max_width: f32) -> Vec<Line> {
    let scaled = font.as_scaled(size);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = Line { glyphs: Vec::new(), width: 0.0 };
        let mut prev: Option<GlyphId> = None;
        for word in paragraph.split_inclusive(' ') {
            let word_width: f32 = word.chars().map(|c| scaled.h_advance(font.glyph_id(c))).sum();
            if !line.glyphs.is_empty() && line.width + word_width > max_width {
                lines.push(std::mem::replace(&mut line, Line { glyphs: Vec::new(), width: 0.0 }));
                prev = None;
            }
            for c in word.chars() {
                let id = font.glyph_id(c);
                if let Some(p) = prev {
                    line.width += scaled.kern(p, id);
                }
                line.glyphs.push((id, line.width));
                line.width += scaled.h_advance(id);
                prev = Some(id);
            }
        }
        lines.push(line);
    }
    lines
}

/// Renders `text` into a transparent `width`×`height` image, clipped to it.
pub fn rasterize(font: &FontArc, spec: &FontSpec, text: &str, color: Color32, width: u32, height: u32) -> RgbaImage {
    let size = spec.size.max(1.0);
    let scaled = font.as_scaled(size);
    let ascent = scaled.ascent();
    let line_height = scaled.height() + scaled.line_gap();
    let mut coverage = vec![0.0f32; width as usize * height as usize];
    let mut cover = |x: i32, y: i32, c: f32| {
        if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
            let idx = y as usize * width as usize + x as usize;
            coverage[idx] = coverage[idx].max(c);
        }
    };

    for (i, line) in layout(font, size, text, width as f32).iter().enumerate() {
        let baseline = ascent + i as f32 * line_height;
        for &(id, x) in &line.glyphs {
            let glyph = id.with_scale_and_position(size, point(x, baseline));
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, c| {
                let mut cx = bounds.min.x + px as f32;
                let cy = bounds.min.y + py as f32;
                if spec.italic {
                    cx += (baseline - cy) * 0.2;
                }
                let (ix, iy) = (cx.round() as i32, cy.round() as i32);
                cover(ix, iy, c);
                if spec.bold {
                    cover(ix + 1, iy, c);
                }
            });
        }
        if spec.underline && line.width > 0.0 {
            let y = baseline + size * 0.1;
            let half = (size * 0.06).max(1.0) * 0.5;
            for uy in (y - half).floor() as i32..(y + half).ceil() as i32 {
                for ux in 0..line.width.ceil() as i32 {
                    cover(ux, uy, 1.0);
                }
            }
        }
    }

    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let mut out = RgbaImage::new(width, height);
    for (i, c) in coverage.into_iter().enumerate() {
        if c > 0.001 {
            let alpha = (a as f32 * c.min(1.0)).round() as u8;
            out.put_pixel(i as u32 % width, i as u32 / width, Rgba([r, g, b, alpha]));
        }
    }
    out
}

/// An editable text insertion rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    rect: Rect,
    text: String,
    font: FontSpec,
    color: Color32,
}

impl TextBox {
    /// Returns `None` when the box is smaller than `min_size` on either axis.
    pub fn new(rect: Rect, font: FontSpec, color: Color32, min_size: f32) -> Option<Self> {
        if rect.width() < min_size || rect.height() < min_size {
            log::debug!("Text box {:?} below minimum size {min_size}, discarded", rect.size());
            return None;
        }
        Some(Self {
            rect,
            text: String::new(),
            font,
            color,
        })
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn translate(&mut self, delta: egui::Vec2) {
        self.rect = self.rect.translate(delta);
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn set_font(&mut self, font: FontSpec) {
        self.font = font;
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The box contents as a transparent image the size of the box.
    pub fn render(&self, fonts: &FontBook) -> EngineResult<RgbaImage> {
        let font = fonts.get(&self.font.name)?;
        let width = self.rect.width().round().max(1.0) as u32;
        let height = self.rect.height().round().max(1.0) as u32;
        Ok(rasterize(font, &self.font, &self.text, self.color, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn bbox() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(120.0, 40.0))
    }

    #[test]
    fn tiny_box_is_discarded() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(30.0, 9.0));
        assert!(TextBox::new(rect, FontSpec::default(), Color32::BLACK, 10.0).is_none());
        assert!(TextBox::new(bbox(), FontSpec::default(), Color32::BLACK, 10.0).is_some());
    }

    #[test]
    fn builtin_fonts_resolve_with_fallback() {
        let fonts = FontBook::builtin();
        assert!(fonts.get("Hack").is_ok());
        assert!(fonts.get("No Such Font").is_ok());
        assert!(matches!(FontBook::new().get("Hack"), Err(EngineError::MissingFont(_))));
    }

    #[test]
    fn rendering_puts_ink_inside_the_box_only() {
        let fonts = FontBook::builtin();
        let mut text = TextBox::new(bbox(), FontSpec::default(), Color32::BLACK, 10.0).unwrap();
        text.set_text("Hello");
        let img = text.render(&fonts).unwrap();
        assert_eq!((img.width(), img.height()), (120, 40));
        assert!(img.pixels().any(|p| p[3] > 128 && p[0] == 0));
    }

    #[test]
    fn bold_covers_more_pixels() {
        let fonts = FontBook::builtin();
        let font = fonts.get("Hack").unwrap();
        let regular = FontSpec::default();
        let bold = FontSpec { bold: true, ..FontSpec::default() };
        let count = |spec: &FontSpec| {
            rasterize(font, spec, "Wall", Color32::BLACK, 120, 40)
                .pixels()
                .filter(|p| p[3] > 0)
                .count()
        };
        assert!(count(&bold) > count(&regular));
    }

    #[test]
    fn long_text_wraps_to_next_line() {
        let fonts = FontBook::builtin();
        let font = fonts.get("Hack").unwrap();
        let lines = layout(font, 24.0, "wrap these words please", 80.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().skip(1).all(|l| l.glyphs.first().map(|g| g.1) == Some(0.0)));
    }
}
