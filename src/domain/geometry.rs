// Pure collision shapes and tests. No state lives here.

/// Squared distance; avoids the sqrt for comparisons.
#[inline]
pub fn dist_sq(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x1 - x2;
    let dy = y1 - y2;
    dx * dx + dy * dy
}

#[inline]
pub fn dist(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    dist_sq(x1, y1, x2, y2).sqrt()
}

pub fn circles_overlap(ax: f32, ay: f32, ar: f32, bx: f32, by: f32, br: f32) -> bool {
    let r = ar + br;
    dist_sq(ax, ay, bx, by) < r * r
}

/// Wall segment between two endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Segment {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Axis-aligned bounds grown by `pad` on every side.
    pub fn bounds(&self, pad: f32) -> Rect {
        let min_x = self.x1.min(self.x2) - pad;
        let min_y = self.y1.min(self.y2) - pad;
        Rect {
            x: min_x,
            y: min_y,
            w: (self.x1 - self.x2).abs() + pad * 2.0,
            h: (self.y1 - self.y2).abs() + pad * 2.0,
        }
    }
}

pub fn closest_point_on_segment(px: f32, py: f32, seg: &Segment) -> (f32, f32) {
    let dx = seg.x2 - seg.x1;
    let dy = seg.y2 - seg.y1;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return (seg.x1, seg.y1);
    }
    let t = (((px - seg.x1) * dx + (py - seg.y1) * dy) / len_sq).clamp(0.0, 1.0);
    (seg.x1 + dx * t, seg.y1 + dy * t)
}

pub fn segment_distance(px: f32, py: f32, seg: &Segment) -> f32 {
    let (cx, cy) = closest_point_on_segment(px, py, seg);
    dist(px, py, cx, cy)
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }

    pub fn expanded(&self, pad: f32) -> Rect {
        Rect {
            x: self.x - pad,
            y: self.y - pad,
            w: self.w + pad * 2.0,
            h: self.h + pad * 2.0,
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.x + other.w
            && other.x <= self.x + self.w
            && self.y <= other.y + other.h
            && other.y <= self.y + self.h
    }
}

/// Overlap between a rotated ellipse and a circle.
///
/// The circle center is moved into the ellipse's frame and tested against the
/// ellipse grown by the circle radius on both axes. This over-reports slightly
/// near the tips, which is acceptable for hit tests.
#[allow(clippy::too_many_arguments)]
pub fn ellipse_circle_overlap(
    ex: f32,
    ey: f32,
    semi_major: f32,
    semi_minor: f32,
    angle: f32,
    cx: f32,
    cy: f32,
    r: f32,
) -> bool {
    let (sin, cos) = angle.sin_cos();
    let dx = cx - ex;
    let dy = cy - ey;
    let lx = dx * cos + dy * sin;
    let ly = -dx * sin + dy * cos;
    let a = semi_major + r;
    let b = semi_minor + r;
    if a <= 0.0 || b <= 0.0 {
        return false;
    }
    (lx * lx) / (a * a) + (ly * ly) / (b * b) <= 1.0
}

/// Collision shape of a mob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hitbox {
    Circle {
        x: f32,
        y: f32,
        r: f32,
    },
    Ellipse {
        x: f32,
        y: f32,
        semi_major: f32,
        semi_minor: f32,
        angle: f32,
    },
}

impl Hitbox {
    pub fn overlaps_circle(&self, cx: f32, cy: f32, r: f32) -> bool {
        match *self {
            Hitbox::Circle { x, y, r: own } => circles_overlap(x, y, own, cx, cy, r),
            Hitbox::Ellipse {
                x,
                y,
                semi_major,
                semi_minor,
                angle,
            } => ellipse_circle_overlap(x, y, semi_major, semi_minor, angle, cx, cy, r),
        }
    }
}
