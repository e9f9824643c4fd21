use std::f32::consts::{FRAC_PI_4, PI};

use egui::emath::Rot2;
use egui::{Color32, CursorIcon, Pos2, Rect, Vec2};

pub const HANDLE_COLOR: Color32 = Color32::from_rgb(30, 144, 255);

/// One of the nine control points around a floating selection or text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    Rotate,
}

impl Handle {
    /// Rotate first so it wins when it overlaps a resize handle on small selections.
    pub const ALL: [Handle; 9] = [
        Handle::Rotate,
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Right,
        Handle::BottomRight,
        Handle::Bottom,
        Handle::BottomLeft,
        Handle::Left,
    ];

    /// Position in the selection's un-rotated frame.
    pub fn local_position(self, rect: Rect, rotate_offset: f32) -> Pos2 {
        let c = rect.center();
        match self {
            Handle::TopLeft => rect.left_top(),
            Handle::Top => Pos2::new(c.x, rect.min.y),
            Handle::TopRight => rect.right_top(),
            Handle::Right => Pos2::new(rect.max.x, c.y),
            Handle::BottomRight => rect.right_bottom(),
            Handle::Bottom => Pos2::new(c.x, rect.max.y),
            Handle::BottomLeft => rect.left_bottom(),
            Handle::Left => Pos2::new(rect.min.x, c.y),
            Handle::Rotate => Pos2::new(c.x, rect.min.y - rotate_offset),
        }
    }

    /// Which edges this handle drags: (left, right, top, bottom).
    fn edges(self) -> (bool, bool, bool, bool) {
        match self {
            Handle::TopLeft => (true, false, true, false),
            Handle::Top => (false, false, true, false),
            Handle::TopRight => (false, true, true, false),
            Handle::Right => (false, true, false, false),
            Handle::BottomRight => (false, true, false, true),
            Handle::Bottom => (false, false, false, true),
            Handle::BottomLeft => (true, false, false, true),
            Handle::Left => (true, false, false, false),
            Handle::Rotate => (false, false, false, false),
        }
    }

    /// The new rect when this handle is dragged to `local` (un-rotated frame).
    /// The opposite edge or corner stays put and the result is at least
    /// `min_size` on both axes.
    pub fn resize_rect(self, rect: Rect, local: Pos2, min_size: f32) -> Rect {
        let (left, right, top, bottom) = self.edges();
        let mut r = rect;
        if left {
            r.min.x = local.x.min(rect.max.x - min_size);
        }
        if right {
            r.max.x = local.x.max(rect.min.x + min_size);
        }
        if top {
            r.min.y = local.y.min(rect.max.y - min_size);
        }
        if bottom {
            r.max.y = local.y.max(rect.min.y + min_size);
        }
        r
    }

    /// Direction of the handle from the rect center, in radians (screen space, y down).
    fn angle(self) -> Option<f32> {
        let octant = match self {
            Handle::Right => 0.0,
            Handle::BottomRight => 1.0,
            Handle::Bottom => 2.0,
            Handle::BottomLeft => 3.0,
            Handle::Left => 4.0,
            Handle::TopLeft => 5.0,
            Handle::Top => 6.0,
            Handle::TopRight => 7.0,
            Handle::Rotate => return None,
        };
        Some(octant * FRAC_PI_4)
    }

    /// Cursor for hovering this handle on a selection rotated by `rotation`.
    pub fn cursor(self, rotation: f32) -> Cursor {
        let Some(angle) = self.angle() else {
            return Cursor::Rotate;
        };
        let octant = ((angle + rotation) / FRAC_PI_4).round().rem_euclid(4.0) as u8;
        Cursor::Resize(match octant {
            0 => ResizeDirection::Horizontal,
            1 => ResizeDirection::NwSe,
            2 => ResizeDirection::Vertical,
            _ => ResizeDirection::NeSw,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    Horizontal,
    Vertical,
    NwSe,
    NeSw,
}

/// Hover feedback. Never affects model state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Crosshair,
    Move,
    Rotate,
    Resize(ResizeDirection),
}

impl Cursor {
    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Cursor::Crosshair => CursorIcon::Crosshair,
            Cursor::Move => CursorIcon::Move,
            Cursor::Rotate => CursorIcon::Grab,
            Cursor::Resize(ResizeDirection::Horizontal) => CursorIcon::ResizeHorizontal,
            Cursor::Resize(ResizeDirection::Vertical) => CursorIcon::ResizeVertical,
            Cursor::Resize(ResizeDirection::NwSe) => CursorIcon::ResizeNwSe,
            Cursor::Resize(ResizeDirection::NeSw) => CursorIcon::ResizeNeSw,
        }
    }
}

pub fn to_local(point: Pos2, center: Pos2, rotation: f32) -> Pos2 {
    if rotation == 0.0 {
        return point;
    }
    center + Rot2::from_angle(-rotation) * (point - center)
}

pub fn to_world(point: Pos2, center: Pos2, rotation: f32) -> Pos2 {
    if rotation == 0.0 {
        return point;
    }
    center + Rot2::from_angle(rotation) * (point - center)
}

/// Geometry of the handle set around one rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleSet {
    pub rect: Rect,
    pub rotation: f32,
    pub size: f32,
    pub rotate_offset: f32,
}

impl HandleSet {
    /// World-space handle centers (rotated around the rect center).
    pub fn positions(&self) -> [(Handle, Pos2); 9] {
        let center = self.rect.center();
        Handle::ALL.map(|h| (h, to_world(h.local_position(self.rect, self.rotate_offset), center, self.rotation)))
    }

    /// World-space corners of the rotated rect, clockwise from top-left.
    pub fn outline(&self) -> [Pos2; 4] {
        let center = self.rect.center();
        [self.rect.left_top(), self.rect.right_top(), self.rect.right_bottom(), self.rect.left_bottom()]
            .map(|p| to_world(p, center, self.rotation))
    }

    /// The handle under `point`, tested in the rect's local frame.
    pub fn hit(&self, point: Pos2) -> Option<Handle> {
        let local = to_local(point, self.rect.center(), self.rotation);
        Handle::ALL.into_iter().find(|h| {
            Rect::from_center_size(h.local_position(self.rect, self.rotate_offset), Vec2::splat(self.size))
                .contains(local)
        })
    }

    pub fn body_contains(&self, point: Pos2) -> bool {
        self.rect.contains(to_local(point, self.rect.center(), self.rotation))
    }
}

/// Angle of `point` around `center`, for the rotate gesture.
pub fn angle_around(center: Pos2, point: Pos2) -> f32 {
    let v = point - center;
    v.y.atan2(v.x)
}

/// Wraps an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let a = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if a <= -PI { a + 2.0 * PI } else { a }
}
