//! Editor state: the history-wrapped graph plus every piece of transient
//! gesture state (behavior, drag overlay, select box, connect gesture).
//!
//! `GraphState` is cheap to clone. Reducers that leave it untouched must
//! return the input, so [`GraphState::ptr_eq`] can tell "nothing happened"
//! without a deep comparison.

use crate::history::History;
use dag_core::alignment::Line;
use dag_core::{GraphModel, Id, NodePlacement, Point, Rect, Size, ViewPort};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// The single active interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Behavior {
    #[default]
    Default,
    Dragging,
    Panning,
    MultiSelect,
    Connecting,
    AddingNode,
}

/// Snapshot of one node taken when a drag or resize starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DummyNode {
    pub id: Id,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DummyNode {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Drag/resize preview overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DummyNodes {
    pub nodes: Vec<DummyNode>,
    pub dx: f32,
    pub dy: f32,
    pub d_width: f32,
    pub d_height: f32,
    pub is_visible: bool,
    #[serde(rename = "alignedDX")]
    pub aligned_dx: Option<f32>,
    #[serde(rename = "alignedDY")]
    pub aligned_dy: Option<f32>,
}

impl DummyNodes {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Overlay rects with the current offset applied.
    pub fn moved_rects(&self) -> Vec<Rect> {
        self.nodes
            .iter()
            .map(|n| Rect::new(n.x + self.dx, n.y + self.dy, n.width, n.height))
            .collect()
    }

    /// Final positions for a drag commit. Snapped offsets win.
    pub fn drag_placements(&self) -> impl Iterator<Item = NodePlacement> + '_ {
        let dx = self.aligned_dx.unwrap_or(self.dx);
        let dy = self.aligned_dy.unwrap_or(self.dy);
        self.nodes.iter().map(move |n| NodePlacement {
            id: n.id,
            x: n.x + dx,
            y: n.y + dy,
            size: None,
        })
    }

    /// Final geometry for a resize commit. Sizes never drop below zero.
    pub fn resize_placements(&self) -> impl Iterator<Item = NodePlacement> + '_ {
        self.nodes.iter().map(|n| NodePlacement {
            id: n.id,
            x: n.x + self.dx,
            y: n.y + self.dy,
            size: Some(Size {
                width: (n.width + self.d_width).max(0.0),
                height: (n.height + self.d_height).max(0.0),
            }),
        })
    }
}

/// Marquee box in viewport-local coordinates. Width and height may be
/// negative while dragging up or left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectBoxPosition {
    pub start_x: f32,
    pub start_y: f32,
    pub width: f32,
    pub height: f32,
}

impl SelectBoxPosition {
    pub fn rect(&self) -> Rect {
        Rect::from_corners(
            Point::new(self.start_x, self.start_y),
            Point::new(self.start_x + self.width, self.start_y + self.height),
        )
    }
}

/// An in-progress connect gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectState {
    pub source_node: Id,
    pub source_port: Option<Id>,
    /// Pointer that started the gesture.
    pub pointer_id: Option<i32>,
    /// Canvas position of the loose end.
    pub moving_point: Option<Point>,
    pub target_node: Option<Id>,
    pub target_port: Option<Id>,
}

#[derive(Debug, Clone)]
pub struct GraphState {
    pub data: History,
    pub viewport: ViewPort,
    pub behavior: Behavior,
    pub dummy_nodes: Arc<DummyNodes>,
    pub alignment_lines: Arc<[Line]>,
    pub active_keys: Arc<BTreeSet<String>>,
    pub select_box: SelectBoxPosition,
    pub connect_state: Option<Arc<ConnectState>>,
}

impl Default for GraphState {
    fn default() -> Self {
        Self::new(GraphModel::new())
    }
}

impl GraphState {
    pub fn new(model: GraphModel) -> Self {
        Self {
            data: History::new(model),
            viewport: ViewPort::default(),
            behavior: Behavior::Default,
            dummy_nodes: Arc::default(),
            alignment_lines: Arc::from(Vec::new()),
            active_keys: Arc::default(),
            select_box: SelectBoxPosition::default(),
            connect_state: None,
        }
    }

    /// Shorthand for the current graph snapshot.
    pub fn present(&self) -> &GraphModel {
        self.data.present()
    }

    /// True when `other` is the same state: shared storage for every
    /// `Arc` field and equal values for the small copy fields.
    pub fn ptr_eq(&self, other: &GraphState) -> bool {
        self.data.ptr_eq(&other.data)
            && self.viewport == other.viewport
            && self.behavior == other.behavior
            && Arc::ptr_eq(&self.dummy_nodes, &other.dummy_nodes)
            && Arc::ptr_eq(&self.alignment_lines, &other.alignment_lines)
            && Arc::ptr_eq(&self.active_keys, &other.active_keys)
            && self.select_box == other.select_box
            && match (&self.connect_state, &other.connect_state) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
    }

    /// Replace the present snapshot without recording history.
    pub fn with_present(self, model: GraphModel) -> Self {
        Self {
            data: self.data.replace_present(model),
            ..self
        }
    }

    /// Push `next` as a recorded change. `past_mapper` cleans the snapshot
    /// that goes onto the undo stack.
    pub fn with_history(self, next: GraphModel, past_mapper: impl FnOnce(&GraphModel) -> GraphModel) -> Self {
        Self {
            data: self.data.push_with(next, past_mapper),
            ..self
        }
    }

    pub fn with_viewport(self, viewport: ViewPort) -> Self {
        Self { viewport, ..self }
    }

    /// Drop the overlay and guides, keeping identity if already clear.
    pub fn clear_overlay(self) -> Self {
        let dummy_nodes = if *self.dummy_nodes == DummyNodes::default() {
            self.dummy_nodes
        } else {
            Arc::default()
        };
        let alignment_lines = if self.alignment_lines.is_empty() {
            self.alignment_lines
        } else {
            Arc::from(Vec::new())
        };
        Self {
            dummy_nodes,
            alignment_lines,
            ..self
        }
    }
}
