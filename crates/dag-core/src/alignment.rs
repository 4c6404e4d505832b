//! Alignment guides shown while dragging nodes.
//!
//! Every dragged rect is compared with every reference rect on each axis
//! (left/center/right against left/center/right, and the same for
//! top/middle/bottom). Close matches produce a guide line, and the drag
//! offset snaps to the nearest one.

use crate::viewport::Rect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "axis", rename_all = "camelCase")]
pub enum Line {
    /// A vertical guide at `x`, spanning `y1..y2`.
    Vertical { x: f32, y1: f32, y2: f32 },
    /// A horizontal guide at `y`, spanning `x1..x2`.
    Horizontal { y: f32, x1: f32, x2: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Guide distance in canvas units for the given zoom.
pub fn threshold_for_zoom(zoom: f32) -> f32 {
    if zoom > 0.3 { 2.0 } else { 5.0 }
}

fn anchors_x(r: &Rect) -> [f32; 3] {
    [r.x, r.x + r.width / 2.0, r.right()]
}

fn anchors_y(r: &Rect) -> [f32; 3] {
    [r.y, r.y + r.height / 2.0, r.bottom()]
}

/// Guide lines between `dragged` and `others` within `threshold`.
pub fn alignment_lines(dragged: &[Rect], others: &[Rect], threshold: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    for d in dragged {
        for o in others {
            for dx in anchors_x(d) {
                for ox in anchors_x(o) {
                    if (dx - ox).abs() < threshold {
                        lines.push(Line::Vertical {
                            x: ox,
                            y1: d.y.min(o.y),
                            y2: d.bottom().max(o.bottom()),
                        });
                    }
                }
            }
            for dy in anchors_y(d) {
                for oy in anchors_y(o) {
                    if (dy - oy).abs() < threshold {
                        lines.push(Line::Horizontal {
                            y: oy,
                            x1: d.x.min(o.x),
                            x2: d.right().max(o.right()),
                        });
                    }
                }
            }
        }
    }
    lines
}

/// Offset along `axis` that snaps `dragged` onto the closest guide, or 0.
pub fn auto_align_displacement(lines: &[Line], dragged: &[Rect], axis: Axis) -> f32 {
    let mut best: Option<f32> = None;
    for line in lines {
        let target = match (axis, line) {
            (Axis::X, Line::Vertical { x, .. }) => *x,
            (Axis::Y, Line::Horizontal { y, .. }) => *y,
            _ => continue,
        };
        for d in dragged {
            let anchors = match axis {
                Axis::X => anchors_x(d),
                Axis::Y => anchors_y(d),
            };
            for a in anchors {
                let delta = target - a;
                if best.is_none_or(|b| delta.abs() < b.abs()) {
                    best = Some(delta);
                }
            }
        }
    }
    best.unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn near_left_edges_produce_vertical_guide() {
        let dragged = [Rect::new(101.0, 300.0, 50.0, 20.0)];
        let others = [Rect::new(100.0, 0.0, 80.0, 40.0)];
        let lines = alignment_lines(&dragged, &others, 2.0);
        assert_eq!(
            lines,
            vec![Line::Vertical {
                x: 100.0,
                y1: 0.0,
                y2: 320.0
            }]
        );
        assert_eq!(auto_align_displacement(&lines, &dragged, Axis::X), -1.0);
        assert_eq!(auto_align_displacement(&lines, &dragged, Axis::Y), 0.0);
    }

    #[test]
    fn far_rects_produce_nothing() {
        let dragged = [Rect::new(0.0, 0.0, 10.0, 10.0)];
        let others = [Rect::new(500.0, 500.0, 33.0, 33.0)];
        assert!(alignment_lines(&dragged, &others, 5.0).is_empty());
    }

    #[test]
    fn threshold_depends_on_zoom() {
        assert_eq!(threshold_for_zoom(1.0), 2.0);
        assert_eq!(threshold_for_zoom(0.2), 5.0);
    }
}
