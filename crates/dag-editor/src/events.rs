//! Typed editor events.
//!
//! Raw platform input is normalized into a `RawInput` and attached to the
//! event. Reducers only read coordinates, modifiers, the pointer id and the
//! key name from it.
//!
//! JSON form: `{ "source": "node", "event": { "type": "dragStart", ... } }`.

use dag_core::{ContainerRect, Edge, GraphData, GraphModel, Id, Node, Point};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Modifier keys held during an input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Any modifier that turns a click into a multi-select.
    pub fn is_multi_select(&self) -> bool {
        self.ctrl || self.meta || self.shift
    }
}

/// A normalized pointer or keyboard input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawInput {
    pub client_x: f32,
    pub client_y: f32,
    pub pointer_id: Option<i32>,
    pub key: Option<String>,
    pub modifiers: Modifiers,
}

impl RawInput {
    pub fn pointer(client_x: f32, client_y: f32) -> Self {
        Self {
            client_x,
            client_y,
            ..Self::default()
        }
    }

    pub fn key(key: &str) -> Self {
        Self {
            key: Some(key.to_owned()),
            ..Self::default()
        }
    }

    pub fn with_pointer_id(mut self, id: i32) -> Self {
        self.pointer_id = Some(id);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Lower-cased key name, as tracked in the active-key set.
    pub fn key_name(&self) -> Option<String> {
        self.key.as_deref().map(str::to_lowercase)
    }
}

/// Data transform applied by `CanvasEvent::UpdateData`.
#[derive(Clone)]
pub struct Updater(Arc<dyn Fn(&GraphModel) -> GraphModel>);

impl Updater {
    pub fn new(f: impl Fn(&GraphModel) -> GraphModel + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn apply(&self, model: &GraphModel) -> GraphModel {
        (self.0)(model)
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Updater(..)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CanvasEvent {
    Click { raw: RawInput },
    DoubleClick { raw: RawInput },
    MouseDown { raw: RawInput },
    MouseUp { raw: RawInput },
    MouseMove { raw: RawInput },
    MouseOver { raw: RawInput },
    MouseOut { raw: RawInput },
    ContextMenu { raw: RawInput },
    KeyDown { raw: RawInput },
    KeyUp { raw: RawInput },
    /// Insert clipboard content. `position` is a client point for the first node.
    Paste {
        data: GraphData,
        #[serde(default)]
        position: Option<Point>,
    },
    Delete,
    Undo,
    Redo,
    SelectStart { raw: RawInput },
    SelectMove { dx: f32, dy: f32 },
    SelectEnd,
    UpdateNodeSelectionBySelectBox,
    ResetSelection,
    /// Exclusively select a node, or a port on it.
    Navigate {
        node: Id,
        #[serde(default)]
        port: Option<Id>,
    },
    ViewportResize {
        rect: ContainerRect,
        #[serde(default)]
        visible_rect: Option<ContainerRect>,
    },
    SetData { data: GraphModel },
    #[serde(skip)]
    UpdateData { updater: Updater, should_record: bool },
    ResetUndoStack,
    /// Canvas pan gesture.
    DragStart { raw: RawInput },
    Drag { dx: f32, dy: f32 },
    DragEnd,
    /// `anchor` is a client point; the viewport center when absent.
    Zoom {
        scale: f32,
        #[serde(default)]
        anchor: Option<Point>,
    },
    ZoomTo { value: f32 },
    ZoomToFit,
    ResetViewport,
    /// Bring a canvas point to `position` (local), or to the center.
    ScrollIntoView {
        x: f32,
        y: f32,
        #[serde(default)]
        position: Option<Point>,
    },
    DraggingNodeFromItemPanelStart,
    DraggingNodeFromItemPanel { node: Node },
    DraggingNodeFromItemPanelEnd {
        #[serde(default)]
        node: Option<Node>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NodeEvent {
    Click { node: Id, raw: RawInput },
    ContextMenu { node: Id, raw: RawInput },
    DragStart {
        node: Id,
        raw: RawInput,
        #[serde(default)]
        is_multi_select: bool,
    },
    /// One move frame. `dx`/`dy` are client-space deltas since the last frame.
    Drag {
        raw: RawInput,
        dx: f32,
        dy: f32,
        #[serde(default)]
        is_visible: bool,
    },
    DragEnd {
        #[serde(default)]
        is_drag_canceled: bool,
    },
    ResizingStart { node: Id },
    /// Accumulated canvas-space deltas since resizing started.
    Resizing {
        dx: f32,
        dy: f32,
        d_width: f32,
        d_height: f32,
    },
    ResizingEnd,
    PointerEnter { node: Id, raw: RawInput },
    PointerLeave { node: Id, raw: RawInput },
    Add { node: Node },
    Centralize { nodes: Vec<Id> },
    Locate {
        nodes: Vec<Id>,
        #[serde(default)]
        position: Option<Point>,
    },
    SelectAll,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EdgeEvent {
    Click { edge: Id, raw: RawInput },
    DoubleClick { edge: Id, raw: RawInput },
    ContextMenu { edge: Id, raw: RawInput },
    MouseEnter { edge: Id, raw: RawInput },
    MouseLeave { edge: Id, raw: RawInput },
    MouseDown { edge: Id, raw: RawInput },
    MouseUp { edge: Id, raw: RawInput },
    MouseMove { edge: Id, raw: RawInput },
    MouseOver { edge: Id, raw: RawInput },
    MouseOut { edge: Id, raw: RawInput },
    Add { edge: Edge },
    ConnectStart {
        node: Id,
        #[serde(default)]
        port: Option<Id>,
        raw: RawInput,
    },
    ConnectMove { raw: RawInput },
    /// The pointer is over a valid target.
    ConnectAttach {
        node: Id,
        #[serde(default)]
        port: Option<Id>,
    },
    ConnectDetach,
    ConnectEnd {
        #[serde(default)]
        is_cancel: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MinimapEvent {
    Click { raw: RawInput },
    PanStart { raw: RawInput },
    /// Canvas-space delta of the minimap window.
    Pan { dx: f32, dy: f32 },
    PanEnd,
}

/// Every event that flows through the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", content = "event", rename_all = "camelCase")]
pub enum GraphEvent {
    Canvas(CanvasEvent),
    Node(NodeEvent),
    Edge(EdgeEvent),
    Minimap(MinimapEvent),
    /// Extension events; every built-in reducer passes them through.
    Custom { name: String, payload: Value },
}

impl From<CanvasEvent> for GraphEvent {
    fn from(e: CanvasEvent) -> Self {
        GraphEvent::Canvas(e)
    }
}

impl From<NodeEvent> for GraphEvent {
    fn from(e: NodeEvent) -> Self {
        GraphEvent::Node(e)
    }
}

impl From<EdgeEvent> for GraphEvent {
    fn from(e: EdgeEvent) -> Self {
        GraphEvent::Edge(e)
    }
}

impl From<MinimapEvent> for GraphEvent {
    fn from(e: MinimapEvent) -> Self {
        GraphEvent::Minimap(e)
    }
}
