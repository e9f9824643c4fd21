use egui::{Color32, Pos2};
use image::RgbaImage;

use crate::raster::draw;

/// Extra samples inserted between two drag points so fast pointer motion
/// never leaves gaps: one sample every two pixels, at least one.
pub fn interpolate(from: Pos2, to: Pos2) -> impl Iterator<Item = Pos2> {
    let steps = ((from.distance(to) / 2.0) as usize).max(1);
    (1..=steps).map(move |i| from.lerp(to, i as f32 / steps as f32))
}

/// An in-progress freehand stroke. Point order is insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
}

impl Stroke {
    pub fn new(color: Color32, width: f32) -> Self {
        Self {
            points: Vec::new(),
            color,
            width,
        }
    }

    /// Adds a point, filling the gap from the previous one.
    pub fn add_point(&mut self, point: Pos2) {
        match self.points.last().copied() {
            None => self.points.push(point),
            Some(last) if last == point => {}
            Some(last) => self.points.extend(interpolate(last, point)),
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn render(&self, img: &mut RgbaImage) {
        draw::stroke_points(img, &self.points, self.width, draw::rgba(self.color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn interpolation_fills_gaps() {
        let mut stroke = Stroke::new(Color32::BLACK, 1.0);
        stroke.add_point(pos2(0.0, 0.0));
        stroke.add_point(pos2(10.0, 0.0));
        // 10px apart -> 5 samples after the first point
        assert_eq!(stroke.points().len(), 6);
        assert_eq!(stroke.points().last(), Some(&pos2(10.0, 0.0)));
        for pair in stroke.points().windows(2) {
            assert!(pair[0].distance(pair[1]) <= 2.0 + f32::EPSILON);
        }
    }

    #[test]
    fn short_hop_adds_one_sample() {
        let mut stroke = Stroke::new(Color32::BLACK, 1.0);
        stroke.add_point(pos2(0.0, 0.0));
        stroke.add_point(pos2(1.0, 1.0));
        assert_eq!(stroke.points(), &[pos2(0.0, 0.0), pos2(1.0, 1.0)]);
    }

    #[test]
    fn repeated_point_is_ignored() {
        let mut stroke = Stroke::new(Color32::BLACK, 1.0);
        stroke.add_point(pos2(3.0, 3.0));
        stroke.add_point(pos2(3.0, 3.0));
        assert_eq!(stroke.points().len(), 1);
    }
}
