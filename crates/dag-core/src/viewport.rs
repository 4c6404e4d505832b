//! View-port and transform math.
//!
//! The transform matrix `[a, b, c, d, e, f]` maps canvas coordinates to
//! coordinates local to the viewport rect:
//!
//! ```text
//! x' = a * x + c * y + e
//! y' = b * x + d * y + f
//! ```
//!
//! Client coordinates (what pointer events carry) are local coordinates
//! offset by the rect's `left` / `top`.

use serde::{Deserialize, Serialize};

pub type TransformMatrix = [f32; 6];

pub const IDENTITY_MATRIX: TransformMatrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Axis-aligned rectangle in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from two corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// AABB overlap. Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Smallest rect covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Grow on every side by `pad`.
    pub fn inflate(&self, pad: f32) -> Rect {
        Rect {
            x: self.x - pad,
            y: self.y - pad,
            width: self.width + pad * 2.0,
            height: self.height + pad * 2.0,
        }
    }
}

/// A measured DOM rect in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContainerRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ContainerRect {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Allowed range for the translation part (`e`, `f`) of the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetLimit {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl OffsetLimit {
    pub fn clamp(&self, matrix: TransformMatrix) -> TransformMatrix {
        let [a, b, c, d, e, f] = matrix;
        [
            a,
            b,
            c,
            d,
            clamp_range(e, self.min_x, self.max_x),
            clamp_range(f, self.min_y, self.max_y),
        ]
    }
}

/// Clamp that tolerates an inverted range by snapping to its midpoint.
fn clamp_range(v: f32, min: f32, max: f32) -> f32 {
    if min > max {
        (min + max) / 2.0
    } else {
        v.clamp(min, max)
    }
}

pub fn transform_point(x: f32, y: f32, m: &TransformMatrix) -> Point {
    Point::new(m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
}

/// Inverse of `transform_point`. A singular matrix maps everything to the origin.
pub fn reverse_transform_point(x: f32, y: f32, m: &TransformMatrix) -> Point {
    let det = m[0] * m[3] - m[1] * m[2];
    if det == 0.0 {
        return Point::default();
    }
    let dx = x - m[4];
    let dy = y - m[5];
    Point::new((m[3] * dx - m[2] * dy) / det, (m[0] * dy - m[1] * dx) / det)
}

/// Convert a client-space movement into a canvas-space movement.
pub fn point_delta_by_client_delta(dx: f32, dy: f32, m: &TransformMatrix) -> Point {
    let det = m[0] * m[3] - m[1] * m[2];
    if det == 0.0 {
        return Point::default();
    }
    Point::new((m[3] * dx - m[2] * dy) / det, (m[0] * dy - m[1] * dx) / det)
}

/// Step function used for auto-scrolling while dragging near the container
/// edge: `-step` before `start + margin`, `step` past `end - margin`, else 0.
pub fn edge_scroll_delta(start: f32, end: f32, value: f32, margin: f32, step: f32) -> f32 {
    if value < start + margin {
        -step
    } else if value > end - margin {
        step
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPort {
    pub rect: Option<ContainerRect>,
    pub visible_rect: Option<ContainerRect>,
    pub transform_matrix: TransformMatrix,
}

impl Default for ViewPort {
    fn default() -> Self {
        Self {
            rect: None,
            visible_rect: None,
            transform_matrix: IDENTITY_MATRIX,
        }
    }
}

impl ViewPort {
    /// Geometry operations are no-ops until the first layout measurement.
    pub fn is_complete(&self) -> bool {
        self.rect.is_some()
    }

    /// Current zoom factor along x.
    pub fn scale(&self) -> f32 {
        self.transform_matrix[0]
    }

    /// Client point → point local to `rect`.
    pub fn relative_point(&self, client_x: f32, client_y: f32) -> Option<Point> {
        let rect = self.rect?;
        Some(Point::new(client_x - rect.left, client_y - rect.top))
    }

    /// Client point → canvas point.
    pub fn real_point_from_client(&self, client_x: f32, client_y: f32) -> Option<Point> {
        let local = self.relative_point(client_x, client_y)?;
        Some(reverse_transform_point(
            local.x,
            local.y,
            &self.transform_matrix,
        ))
    }

    /// Canvas rect → rect local to the viewport.
    pub fn to_screen_rect(&self, r: &Rect) -> Rect {
        let a = transform_point(r.x, r.y, &self.transform_matrix);
        let b = transform_point(r.right(), r.bottom(), &self.transform_matrix);
        Rect::from_corners(a, b)
    }

    /// The part of the canvas currently visible, in canvas coordinates.
    pub fn visible_area(&self) -> Option<Rect> {
        let rect = self.rect?;
        let a = reverse_transform_point(0.0, 0.0, &self.transform_matrix);
        let b = reverse_transform_point(rect.width, rect.height, &self.transform_matrix);
        Some(Rect::from_corners(a, b))
    }

    pub fn with_matrix(self, transform_matrix: TransformMatrix) -> Self {
        Self {
            transform_matrix,
            ..self
        }
    }

    pub fn pan(self, dx: f32, dy: f32) -> Self {
        let [a, b, c, d, e, f] = self.transform_matrix;
        self.with_matrix([a, b, c, d, e + dx, f + dy])
    }

    /// Scale by `scale` around `anchor` (local coordinates).
    pub fn zoom(self, scale: f32, anchor: Point) -> Self {
        let [a, b, c, d, e, f] = self.transform_matrix;
        self.with_matrix([
            a * scale,
            b * scale,
            c * scale,
            d * scale,
            anchor.x + (e - anchor.x) * scale,
            anchor.y + (f - anchor.y) * scale,
        ])
    }

    /// Like `zoom`, but the resulting zoom factor stays in `[min, max]`.
    pub fn zoom_clamped(self, scale: f32, anchor: Point, min: f32, max: f32) -> Self {
        let current = self.scale();
        if current <= 0.0 {
            return self;
        }
        let target = (current * scale).clamp(min, max);
        self.zoom(target / current, anchor)
    }

    /// Set the zoom factor to `value` around the viewport center.
    pub fn zoom_to(self, value: f32, min: f32, max: f32) -> Self {
        let anchor = match self.rect {
            Some(r) => Point::new(r.width / 2.0, r.height / 2.0),
            None => Point::default(),
        };
        let current = self.scale();
        if current <= 0.0 {
            return self;
        }
        self.zoom_clamped(value / current, anchor, min, max)
    }

    /// Translate so that the local point `(x, y)` lands at `position`, or at
    /// the viewport center when no position is given. With `align_center`
    /// unset, points already inside the viewport leave it untouched.
    pub fn scroll_into_view(self, x: f32, y: f32, align_center: bool, position: Option<Point>) -> Self {
        let Some(rect) = self.rect else {
            return self;
        };
        if !align_center && x >= 0.0 && x <= rect.width && y >= 0.0 && y <= rect.height {
            return self;
        }
        let target = position.unwrap_or(Point::new(rect.width / 2.0, rect.height / 2.0));
        self.pan(target.x - x, target.y - y)
    }

    /// Zoom and translate so the canvas area fits inside the viewport,
    /// centered, with `padding` local units around it.
    pub fn focus_area(self, area: &Rect, padding: f32, min: f32, max: f32) -> Self {
        let Some(rect) = self.rect else {
            return self;
        };
        let avail_w = (rect.width - padding * 2.0).max(1.0);
        let avail_h = (rect.height - padding * 2.0).max(1.0);
        let scale_w = if area.width > 0.0 { avail_w / area.width } else { max };
        let scale_h = if area.height > 0.0 { avail_h / area.height } else { max };
        let scale = scale_w.min(scale_h).clamp(min, max);
        let center = area.center();
        self.with_matrix([
            scale,
            0.0,
            0.0,
            scale,
            rect.width / 2.0 - center.x * scale,
            rect.height / 2.0 - center.y * scale,
        ])
    }

    /// Translation bounds that keep `content` (canvas space) from scrolling
    /// further than `padding` local units out of view.
    pub fn offset_limit(&self, content: &Rect, padding: f32) -> Option<OffsetLimit> {
        let rect = self.rect?;
        let [a, _, _, d, _, _] = self.transform_matrix;
        Some(OffsetLimit {
            min_x: padding - content.right() * a,
            max_x: rect.width - padding - content.x * a,
            min_y: padding - content.bottom() * d,
            max_y: rect.height - padding - content.y * d,
        })
    }
}
