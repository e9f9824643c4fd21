use egui::emath::Rot2;
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Ordered point list plus a closed flag.
///
/// Curves are flattened into line segments when the path is built, so every
/// raster operation only has to deal with polylines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    points: Vec<Pos2>,
    closed: bool,
}

impl Path {
    pub fn new(points: Vec<Pos2>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn polygon(points: Vec<Pos2>) -> Self {
        Self::new(points, true)
    }

    pub fn polyline(points: Vec<Pos2>) -> Self {
        Self::new(points, false)
    }

    pub fn rect(rect: Rect) -> Self {
        Self::polygon(vec![
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
        ])
    }

    /// Ellipse inscribed in `rect`.
    pub fn ellipse(rect: Rect) -> Self {
        let center = rect.center();
        let rx = rect.width() * 0.5;
        let ry = rect.height() * 0.5;
        // Roughly one vertex every two pixels of circumference.
        let perimeter = std::f32::consts::TAU * ((rx * rx + ry * ry) * 0.5).sqrt();
        let segments = ((perimeter / 2.0).ceil() as usize).clamp(16, 2048);
        let points = (0..segments)
            .map(|i| {
                let a = i as f32 / segments as f32 * std::f32::consts::TAU;
                Pos2::new(center.x + rx * a.cos(), center.y + ry * a.sin())
            })
            .collect();
        Self::polygon(points)
    }

    /// Rectangle with quarter-circle corners of `radius`.
    pub fn rounded_rect(rect: Rect, radius: f32) -> Self {
        let r = radius.min(rect.width() * 0.5).min(rect.height() * 0.5).max(0.0);
        if r <= 0.0 {
            return Self::rect(rect);
        }
        let arc_steps = ((r * std::f32::consts::FRAC_PI_2 / 2.0).ceil() as usize).clamp(4, 256);
        let corners = [
            // center of the arc, start angle
            (Pos2::new(rect.max.x - r, rect.min.y + r), -std::f32::consts::FRAC_PI_2),
            (Pos2::new(rect.max.x - r, rect.max.y - r), 0.0),
            (Pos2::new(rect.min.x + r, rect.max.y - r), std::f32::consts::FRAC_PI_2),
            (Pos2::new(rect.min.x + r, rect.min.y + r), std::f32::consts::PI),
        ];
        let mut points = Vec::with_capacity(4 * (arc_steps + 1));
        for (center, start) in corners {
            for i in 0..=arc_steps {
                let a = start + i as f32 / arc_steps as f32 * std::f32::consts::FRAC_PI_2;
                points.push(Pos2::new(center.x + r * a.cos(), center.y + r * a.sin()));
            }
        }
        Self::polygon(points)
    }

    /// Cubic Bézier from `p0` to `p3` with control points `c1`, `c2`.
    pub fn cubic(p0: Pos2, c1: Pos2, c2: Pos2, p3: Pos2) -> Self {
        let hull = p0.distance(c1) + c1.distance(c2) + c2.distance(p3);
        let steps = ((hull / 2.0).ceil() as usize).clamp(8, 1024);
        let points = (0..=steps)
            .map(|i| {
                let t = i as f32 / steps as f32;
                let u = 1.0 - t;
                let v = p0.to_vec2() * (u * u * u)
                    + c1.to_vec2() * (3.0 * u * u * t)
                    + c2.to_vec2() * (3.0 * u * t * t)
                    + p3.to_vec2() * (t * t * t);
                v.to_pos2()
            })
            .collect();
        Self::polyline(points)
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn push(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Rect {
        let mut rect = Rect::NOTHING;
        for p in &self.points {
            rect.extend_with(*p);
        }
        rect
    }

    /// Line segments of the path, including the closing one.
    pub fn segments(&self) -> impl Iterator<Item = (Pos2, Pos2)> + '_ {
        let n = self.points.len();
        let count = if self.closed && n > 2 { n } else { n.saturating_sub(1) };
        (0..count).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    pub fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    /// Maps the path so that `from` lands on `to` (independent x/y scale).
    pub fn map_rect(&mut self, from: Rect, to: Rect) {
        let sx = if from.width() > 0.0 { to.width() / from.width() } else { 1.0 };
        let sy = if from.height() > 0.0 { to.height() / from.height() } else { 1.0 };
        for p in &mut self.points {
            p.x = to.min.x + (p.x - from.min.x) * sx;
            p.y = to.min.y + (p.y - from.min.y) * sy;
        }
    }

    pub fn rotate_about(&mut self, center: Pos2, angle: f32) {
        let rot = Rot2::from_angle(angle);
        for p in &mut self.points {
            *p = center + rot * (*p - center);
        }
    }

    /// Even-odd containment test.
    pub fn contains(&self, p: Pos2) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        let mut inside = false;
        let n = self.points.len();
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Horizontal pixel spans covered by the closed path on pixel row `row`.
    ///
    /// A pixel belongs to a span when its center lies inside the path
    /// (even-odd). Each span is `(first_column, end_column_exclusive)`.
    pub fn row_spans(&self, row: i32) -> Vec<(i32, i32)> {
        if self.points.len() < 3 {
            return Vec::new();
        }
        let y = row as f32 + 0.5;
        let n = self.points.len();
        let mut xs = Vec::new();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let (lo, hi) = if a.y < b.y { (a, b) } else { (b, a) };
            if y < lo.y || y >= hi.y || lo.y == hi.y {
                continue;
            }
            let t = (y - lo.y) / (hi.y - lo.y);
            xs.push(lo.x + t * (hi.x - lo.x));
        }
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        xs.chunks_exact(2)
            .filter_map(|pair| {
                let start = (pair[0] - 0.5).ceil() as i32;
                let end = (pair[1] - 0.5).ceil() as i32;
                (end > start).then_some((start, end))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn rect_spans_cover_exact_pixels() {
        let path = Path::rect(Rect::from_min_max(pos2(0.0, 0.0), pos2(10.0, 10.0)));
        assert_eq!(path.row_spans(0), vec![(0, 10)]);
        assert_eq!(path.row_spans(9), vec![(0, 10)]);
        assert!(path.row_spans(10).is_empty());
    }

    #[test]
    fn contains_uses_even_odd() {
        let tri = Path::polygon(vec![pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(0.0, 10.0)]);
        assert!(tri.contains(pos2(2.0, 2.0)));
        assert!(!tri.contains(pos2(8.0, 8.0)));
    }

    #[test]
    fn closed_path_segments_wrap_around() {
        let path = Path::rect(Rect::from_min_max(pos2(0.0, 0.0), pos2(4.0, 4.0)));
        assert_eq!(path.segments().count(), 4);
        let open = Path::polyline(vec![pos2(0.0, 0.0), pos2(4.0, 0.0), pos2(4.0, 4.0)]);
        assert_eq!(open.segments().count(), 2);
    }

    #[test]
    fn map_rect_scales_and_moves() {
        let mut path = Path::rect(Rect::from_min_max(pos2(0.0, 0.0), pos2(10.0, 10.0)));
        path.map_rect(
            Rect::from_min_max(pos2(0.0, 0.0), pos2(10.0, 10.0)),
            Rect::from_min_max(pos2(5.0, 5.0), pos2(25.0, 15.0)),
        );
        assert_eq!(path.bounds(), Rect::from_min_max(pos2(5.0, 5.0), pos2(25.0, 15.0)));
    }

    #[test]
    fn cubic_hits_its_endpoints() {
        let curve = Path::cubic(pos2(0.0, 0.0), pos2(0.0, 10.0), pos2(10.0, 10.0), pos2(10.0, 0.0));
        assert_eq!(curve.points().first(), Some(&pos2(0.0, 0.0)));
        let last = *curve.points().last().unwrap();
        assert!(last.distance(pos2(10.0, 0.0)) < 1e-4);
        assert!(!curve.is_closed());
    }
}
