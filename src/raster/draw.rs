//! Software rasterization primitives over an RGBA8 buffer.
//!
//! Nothing here is antialiased: every pixel is either written or left alone,
//! which keeps fills and color picking exact.

use egui::emath::Rot2;
use egui::{Color32, Pos2, Rect, Vec2};
use image::{Rgba, RgbaImage};

use super::path::Path;

pub fn rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

/// Source-over blend of `src` onto `dst` (both unpremultiplied).
pub fn blend(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        return src;
    }
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}

/// Writes one pixel, blending when the color is translucent. Out of bounds is ignored.
pub fn paint(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if color[3] == 255 {
        img.put_pixel(x, y, color);
    } else {
        let below = *img.get_pixel(x, y);
        img.put_pixel(x, y, blend(below, color));
    }
}

/// Overwrites one pixel, alpha included. Out of bounds is ignored.
pub fn put(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && x < img.width() as i32 && y < img.height() as i32 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

pub fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let line = end - start;
    let len_sq = line.length_sq();
    if len_sq == 0.0 {
        return point.distance(start);
    }
    let t = ((point - start).dot(line) / len_sq).clamp(0.0, 1.0);
    point.distance(start + line * t)
}

/// One-pixel line: every pixel the segment passes through.
fn hairline(img: &mut RgbaImage, a: Pos2, b: Pos2, color: Rgba<u8>) {
    let d = b - a;
    let steps = d.x.abs().max(d.y.abs()).ceil().max(1.0) as i32;
    let mut last = None;
    for i in 0..=steps {
        let p = a + d * (i as f32 / steps as f32);
        let px = (p.x.floor() as i32, p.y.floor() as i32);
        // Translucent colors must not be blended twice on the same pixel.
        if last != Some(px) {
            paint(img, px.0, px.1, color);
            last = Some(px);
        }
    }
}

/// Thick segment with round caps: every pixel whose center is within
/// `width / 2` of the segment.
pub fn stroke_segment(img: &mut RgbaImage, a: Pos2, b: Pos2, width: f32, color: Rgba<u8>) {
    if width <= 1.0 {
        hairline(img, a, b, color);
        return;
    }
    let r = width * 0.5;
    let x0 = (a.x.min(b.x) - r).floor() as i32;
    let x1 = (a.x.max(b.x) + r).ceil() as i32;
    let y0 = (a.y.min(b.y) - r).floor() as i32;
    let y1 = (a.y.max(b.y) + r).ceil() as i32;
    for y in y0.max(0)..y1.min(img.height() as i32) {
        for x in x0.max(0)..x1.min(img.width() as i32) {
            let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
            if distance_to_segment(center, a, b) <= r {
                paint(img, x, y, color);
            }
        }
    }
}

/// Strokes consecutive points; a single point leaves a dot.
pub fn stroke_points(img: &mut RgbaImage, points: &[Pos2], width: f32, color: Rgba<u8>) {
    match points {
        [] => {}
        [p] => stroke_segment(img, *p, *p, width, color),
        _ => {
            for pair in points.windows(2) {
                stroke_segment(img, pair[0], pair[1], width, color);
            }
        }
    }
}

pub fn stroke_path(img: &mut RgbaImage, path: &Path, width: f32, color: Rgba<u8>) {
    if path.len() == 1 {
        stroke_points(img, path.points(), width, color);
        return;
    }
    for (a, b) in path.segments() {
        stroke_segment(img, a, b, width, color);
    }
}

/// Fills the interior of a closed path (even-odd, pixel centers).
pub fn fill_path(img: &mut RgbaImage, path: &Path, color: Rgba<u8>) {
    for_each_covered(path, img.width(), img.height(), |x, y| paint(img, x, y, color));
}

/// Like [`fill_path`] but overwrites alpha too.
pub fn clear_path(img: &mut RgbaImage, path: &Path, color: Rgba<u8>) {
    for_each_covered(path, img.width(), img.height(), |x, y| put(img, x, y, color));
}

fn for_each_covered(path: &Path, width: u32, height: u32, mut f: impl FnMut(i32, i32)) {
    let bounds = path.bounds();
    if !bounds.is_positive() {
        return;
    }
    let y0 = (bounds.min.y.floor() as i32).max(0);
    let y1 = (bounds.max.y.ceil() as i32).min(height as i32);
    for y in y0..y1 {
        for (start, end) in path.row_spans(y) {
            for x in start.max(0)..end.min(width as i32) {
                f(x, y);
            }
        }
    }
}

/// Integer pixel bounds of `rect`, clipped to a `width`×`height` buffer.
pub fn pixel_bounds(rect: Rect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let x0 = (rect.min.x.round() as i64).clamp(0, width as i64) as u32;
    let y0 = (rect.min.y.round() as i64).clamp(0, height as i64) as u32;
    let x1 = (rect.max.x.round() as i64).clamp(0, width as i64) as u32;
    let y1 = (rect.max.y.round() as i64).clamp(0, height as i64) as u32;
    (x1 > x0 && y1 > y0).then_some((x0, y0, x1 - x0, y1 - y0))
}

/// Overwrites an axis-aligned region, alpha included.
pub fn clear_rect(img: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    if let Some((x, y, w, h)) = pixel_bounds(rect, img.width(), img.height()) {
        for yy in y..y + h {
            for xx in x..x + w {
                img.put_pixel(xx, yy, color);
            }
        }
    }
}

/// Composites `src` with its top-left corner at `origin`, rotated by
/// `rotation` radians around the center of its destination rectangle.
///
/// Sampling is nearest-neighbour, so a zero rotation at an integer origin
/// copies pixels exactly.
pub fn draw_image(dst: &mut RgbaImage, src: &RgbaImage, origin: Pos2, rotation: f32) {
    let size = Vec2::new(src.width() as f32, src.height() as f32);
    let dest = Rect::from_min_size(origin, size);
    if rotation == 0.0 {
        let ox = origin.x.round() as i32;
        let oy = origin.y.round() as i32;
        for (sx, sy, px) in src.enumerate_pixels() {
            if px[3] > 0 {
                paint(dst, ox + sx as i32, oy + sy as i32, *px);
            }
        }
        return;
    }

    let center = dest.center();
    let rot = Rot2::from_angle(rotation);
    let inverse = rot.inverse();
    let mut bounds = Rect::NOTHING;
    for corner in [dest.left_top(), dest.right_top(), dest.right_bottom(), dest.left_bottom()] {
        bounds.extend_with(center + rot * (corner - center));
    }
    let x0 = (bounds.min.x.floor() as i32).max(0);
    let y0 = (bounds.min.y.floor() as i32).max(0);
    let x1 = (bounds.max.x.ceil() as i32).min(dst.width() as i32);
    let y1 = (bounds.max.y.ceil() as i32).min(dst.height() as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            let p = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
            let local = center + inverse * (p - center);
            let sx = (local.x - dest.min.x).floor();
            let sy = (local.y - dest.min.y).floor();
            if sx < 0.0 || sy < 0.0 || sx >= size.x || sy >= size.y {
                continue;
            }
            let px = *src.get_pixel(sx as u32, sy as u32);
            if px[3] > 0 {
                paint(dst, x, y, px);
            }
        }
    }
}

/// Copies the pixels of `rect` out of `src`; pixels outside `src` stay transparent.
pub fn crop(src: &RgbaImage, x: i32, y: i32, width: u32, height: u32) -> RgbaImage {
    let mut out = RgbaImage::new(width, height);
    for oy in 0..height {
        for ox in 0..width {
            let sx = x + ox as i32;
            let sy = y + oy as i32;
            if sx >= 0 && sy >= 0 && (sx as u32) < src.width() && (sy as u32) < src.height() {
                out.put_pixel(ox, oy, *src.get_pixel(sx as u32, sy as u32));
            }
        }
    }
    out
}

/// Copies the region under `path` into a buffer sized to `(x, y, width, height)`;
/// everything outside the path is transparent.
pub fn crop_masked(src: &RgbaImage, path: &Path, x: i32, y: i32, width: u32, height: u32) -> RgbaImage {
    let mut out = RgbaImage::new(width, height);
    for oy in 0..height as i32 {
        for (start, end) in path.row_spans(y + oy) {
            for sx in start.max(x)..end.min(x + width as i32) {
                let sy = y + oy;
                if sx >= 0 && sy >= 0 && (sx as u32) < src.width() && (sy as u32) < src.height() {
                    out.put_pixel((sx - x) as u32, oy as u32, *src.get_pixel(sx as u32, sy as u32));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn white(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn hairline_touches_every_pixel_between_endpoints() {
        let mut img = white(10, 10);
        stroke_segment(&mut img, pos2(0.5, 0.5), pos2(9.5, 0.5), 1.0, RED);
        for x in 0..10 {
            assert_eq!(*img.get_pixel(x, 0), RED);
        }
        assert_eq!(*img.get_pixel(0, 1), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn thick_segment_respects_radius() {
        let mut img = white(20, 20);
        stroke_segment(&mut img, pos2(10.0, 10.0), pos2(10.0, 10.0), 6.0, RED);
        assert_eq!(*img.get_pixel(10, 10), RED);
        assert_eq!(*img.get_pixel(12, 10), RED);
        assert_eq!(*img.get_pixel(16, 10), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn rotated_draw_by_zero_is_an_exact_copy() {
        let mut src = RgbaImage::new(3, 2);
        src.put_pixel(0, 0, RED);
        src.put_pixel(2, 1, Rgba([0, 0, 255, 255]));
        let mut dst = white(10, 10);
        draw_image(&mut dst, &src, pos2(4.0, 5.0), 0.0);
        assert_eq!(*dst.get_pixel(4, 5), RED);
        assert_eq!(*dst.get_pixel(6, 6), Rgba([0, 0, 255, 255]));
        // transparent source pixels leave the destination alone
        assert_eq!(*dst.get_pixel(5, 5), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn half_turn_mirrors_the_image() {
        let mut src = RgbaImage::new(4, 4);
        src.put_pixel(0, 0, RED);
        let mut dst = white(4, 4);
        draw_image(&mut dst, &src, pos2(0.0, 0.0), std::f32::consts::PI);
        assert_eq!(*dst.get_pixel(3, 3), RED);
        assert_eq!(*dst.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn blend_half_alpha_over_white() {
        let out = blend(Rgba([255, 255, 255, 255]), Rgba([0, 0, 0, 128]));
        assert!(out[0] > 120 && out[0] < 135);
        assert_eq!(out[3], 255);
    }

    #[test]
    fn crop_masked_is_transparent_outside_path() {
        let src = RgbaImage::from_pixel(10, 10, RED);
        let tri = Path::polygon(vec![pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(0.0, 10.0)]);
        let out = crop_masked(&src, &tri, 0, 0, 10, 10);
        assert_eq!(*out.get_pixel(1, 1), RED);
        assert_eq!(out.get_pixel(9, 9)[3], 0);
    }
}
