//! Shape geometry and styled drawing for the line, box, ellipse and polygon tools.

use std::f32::consts::FRAC_PI_4;

use egui::{Color32, Pos2, Rect, Vec2};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::raster::{Path, draw};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShapeStyle {
    /// Stroke only, in the foreground color.
    #[default]
    Outline,
    /// Background-colored interior under a foreground stroke.
    FilledWithOutline,
    /// Foreground-colored interior, no stroke.
    FilledNoOutline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Line,
    Rectangle,
    Ellipse,
    RoundedRectangle,
}

impl ShapeKind {
    pub fn action_name(self) -> &'static str {
        match self {
            ShapeKind::Line => "Line",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Ellipse => "Ellipse",
            ShapeKind::RoundedRectangle => "Rounded Rectangle",
        }
    }
}

/// Snaps `current` so the line from `anchor` is a multiple of 45°.
pub fn constrain_line(anchor: Pos2, current: Pos2) -> Pos2 {
    let d = current - anchor;
    if d == Vec2::ZERO {
        return current;
    }
    let octant = (d.y.atan2(d.x) / FRAC_PI_4).round();
    let angle = octant * FRAC_PI_4;
    let (sin, cos) = angle.sin_cos();
    // Unit steps along the snapped direction, so whole-pixel input stays whole.
    let delta = d.x.abs().max(d.y.abs());
    anchor + Vec2::new(cos.round(), sin.round()) * delta
}

/// Makes the box spanned by `anchor` and `current` square, keeping the
/// direction of the drag on each axis.
pub fn constrain_square(anchor: Pos2, current: Pos2) -> Pos2 {
    let d = current - anchor;
    let delta = d.x.abs().max(d.y.abs());
    let sign = |v: f32| if v < 0.0 { -1.0 } else { 1.0 };
    anchor + Vec2::new(sign(d.x) * delta, sign(d.y) * delta)
}

/// Fills and strokes a closed path according to `style`.
pub fn draw_styled(
    img: &mut RgbaImage,
    path: &Path,
    style: ShapeStyle,
    width: f32,
    foreground: Color32,
    background: Color32,
) {
    match style {
        ShapeStyle::Outline => draw::stroke_path(img, path, width, draw::rgba(foreground)),
        ShapeStyle::FilledWithOutline => {
            draw::fill_path(img, path, draw::rgba(background));
            draw::stroke_path(img, path, width, draw::rgba(foreground));
        }
        ShapeStyle::FilledNoOutline => draw::fill_path(img, path, draw::rgba(foreground)),
    }
}

/// Anchor and current point of a shape drag, with the style it will be drawn in.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub anchor: Pos2,
    pub current: Pos2,
    pub style: ShapeStyle,
    pub width: f32,
    pub foreground: Color32,
    pub background: Color32,
    pub corner_ratio: f32,
}

impl Shape {
    /// Moves the free end, applying the constrain modifier if held.
    pub fn update(&mut self, pos: Pos2, constrain: bool) {
        self.current = match (constrain, self.kind) {
            (false, _) => pos,
            (true, ShapeKind::Line) => constrain_line(self.anchor, pos),
            (true, _) => constrain_square(self.anchor, pos),
        };
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_two_pos(self.anchor, self.current)
    }

    pub fn is_degenerate(&self) -> bool {
        self.anchor == self.current
    }

    pub fn path(&self) -> Path {
        let rect = self.bounds();
        match self.kind {
            ShapeKind::Line => Path::polyline(vec![self.anchor, self.current]),
            ShapeKind::Rectangle => Path::rect(rect),
            ShapeKind::Ellipse => Path::ellipse(rect),
            ShapeKind::RoundedRectangle => {
                let radius = rect.width().min(rect.height()) * self.corner_ratio;
                Path::rounded_rect(rect, radius)
            }
        }
    }

    pub fn render(&self, img: &mut RgbaImage) {
        let path = self.path();
        match self.kind {
            // Lines have no interior: every style strokes in the foreground.
            ShapeKind::Line => draw::stroke_path(img, &path, self.width, draw::rgba(self.foreground)),
            _ => draw_styled(img, &path, self.style, self.width, self.foreground, self.background),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;
    use image::Rgba;

    #[test]
    fn constrained_line_snaps_to_axes_and_diagonals() {
        let a = pos2(10.0, 10.0);
        assert_eq!(constrain_line(a, pos2(30.0, 12.0)), pos2(30.0, 10.0));
        assert_eq!(constrain_line(a, pos2(12.0, 40.0)), pos2(10.0, 40.0));
        assert_eq!(constrain_line(a, pos2(-5.0, 9.0)), pos2(-5.0, 10.0));
        assert_eq!(constrain_line(a, pos2(20.0, 18.0)), pos2(20.0, 20.0));
        assert_eq!(constrain_line(a, pos2(0.0, 21.0)), pos2(-1.0, 21.0));
    }

    #[test]
    fn constrained_box_is_square_and_keeps_sign() {
        assert_eq!(constrain_square(pos2(0.0, 0.0), pos2(-10.0, 4.0)), pos2(-10.0, 10.0));
        assert_eq!(constrain_square(pos2(5.0, 5.0), pos2(8.0, -5.0)), pos2(15.0, -5.0));
    }

    fn shape(kind: ShapeKind, style: ShapeStyle) -> Shape {
        Shape {
            kind,
            anchor: pos2(2.0, 2.0),
            current: pos2(18.0, 18.0),
            style,
            width: 1.0,
            foreground: Color32::RED,
            background: Color32::BLUE,
            corner_ratio: 0.25,
        }
    }

    #[test]
    fn styles_choose_fill_and_stroke_colors() {
        let white = Rgba([255, 255, 255, 255]);

        let mut img = RgbaImage::from_pixel(20, 20, white);
        shape(ShapeKind::Rectangle, ShapeStyle::Outline).render(&mut img);
        assert_eq!(*img.get_pixel(10, 10), white);
        assert_eq!(*img.get_pixel(10, 2), Rgba([255, 0, 0, 255]));

        let mut img = RgbaImage::from_pixel(20, 20, white);
        shape(ShapeKind::Rectangle, ShapeStyle::FilledWithOutline).render(&mut img);
        assert_eq!(*img.get_pixel(10, 10), Rgba([0, 0, 255, 255]));
        assert_eq!(*img.get_pixel(10, 2), Rgba([255, 0, 0, 255]));

        let mut img = RgbaImage::from_pixel(20, 20, white);
        shape(ShapeKind::Ellipse, ShapeStyle::FilledNoOutline).render(&mut img);
        assert_eq!(*img.get_pixel(10, 10), Rgba([255, 0, 0, 255]));
        assert_eq!(*img.get_pixel(2, 2), white);
    }

    #[test]
    fn rounded_corners_use_a_quarter_of_the_short_side() {
        let white = Rgba([255, 255, 255, 255]);
        let mut img = RgbaImage::from_pixel(20, 20, white);
        shape(ShapeKind::RoundedRectangle, ShapeStyle::FilledNoOutline).render(&mut img);
        // radius 4: the corner pixel is outside, the edge midpoint inside
        assert_eq!(*img.get_pixel(2, 2), white);
        assert_eq!(*img.get_pixel(10, 2), Rgba([255, 0, 0, 255]));
    }
}
