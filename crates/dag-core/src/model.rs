//! Plain records of the graph: nodes, ports, edges and groups.
//!
//! These are the flat shapes of the JSON exchange layout. The persistent
//! aggregate that owns them lives in [`crate::graph`].

use crate::id::{Id, IdKind};
use crate::state::ItemState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;

/// A connection point on a node. Ids are unique within the owning node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub id: Id,
    #[serde(default)]
    pub state: ItemState,
    /// Position hint as a ratio of the node size: `[0.5, 1.0]` is bottom center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Port {
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            state: ItemState::default(),
            position: None,
            name: None,
            data: None,
        }
    }

    pub fn at(mut self, rx: f32, ry: f32) -> Self {
        self.position = Some([rx, ry]);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: Id,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// Render-variant tag, resolved through the shape registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default)]
    pub state: ItemState,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub ports: SmallVec<[Port; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Node {
    pub fn new(id: impl Into<Id>, x: f32, y: f32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width: None,
            height: None,
            shape: None,
            state: ItemState::default(),
            ports: SmallVec::new(),
            name: None,
            data: None,
        }
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_shape(mut self, shape: &str) -> Self {
        self.shape = Some(shape.to_owned());
        self
    }

    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    pub fn with_state(mut self, state: ItemState) -> Self {
        self.state = state;
        self
    }

    pub fn port(&self, id: Id) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == id)
    }

    pub fn port_index(&self, id: Id) -> Option<usize> {
        self.ports.iter().position(|p| p.id == id)
    }

    /// Same node with `f` applied to every port state.
    pub(crate) fn map_port_states(&self, f: impl Fn(ItemState) -> ItemState) -> Option<Node> {
        if self.ports.iter().all(|p| f(p.state) == p.state) {
            return None;
        }
        let mut next = self.clone();
        for port in next.ports.iter_mut() {
            port.state = f(port.state);
        }
        Some(next)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: Id,
    pub source: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port_id: Option<Id>,
    pub target: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port_id: Option<Id>,
    #[serde(default)]
    pub state: ItemState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Edge {
    pub fn new(id: impl Into<Id>, source: impl Into<Id>, target: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            source_port_id: None,
            target: target.into(),
            target_port_id: None,
            state: ItemState::default(),
            shape: None,
            data: None,
        }
    }

    pub fn with_ports(mut self, source_port: impl Into<Id>, target_port: impl Into<Id>) -> Self {
        self.source_port_id = Some(source_port.into());
        self.target_port_id = Some(target_port.into());
        self
    }

    pub fn with_state(mut self, state: ItemState) -> Self {
        self.state = state;
        self
    }

    /// Whether either endpoint is `node`.
    pub fn touches(&self, node: Id) -> bool {
        self.source == node || self.target == node
    }
}

/// Display-only container around a set of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Id,
    pub nodes: Vec<Id>,
    #[serde(default)]
    pub padding: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Group {
    pub fn new(id: impl Into<Id>, nodes: Vec<Id>) -> Self {
        Self {
            id: id.into(),
            nodes,
            padding: 0.0,
            shape: None,
            data: None,
        }
    }
}

/// The JSON exchange layout: `{ nodes, edges, groups? }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
}

impl GraphData {
    /// Give fresh ids to every node and edge whose id is `taken`.
    ///
    /// Edge endpoints and group members follow their renamed nodes; ids
    /// that are not taken are kept as they are.
    pub fn reissue_ids(&self, node_taken: impl Fn(Id) -> bool, edge_taken: impl Fn(Id) -> bool) -> GraphData {
        let mut remap = HashMap::new();
        let nodes = self
            .nodes
            .iter()
            .map(|n| {
                let mut node = n.clone();
                if node_taken(n.id) {
                    node.id = Id::fresh(IdKind::Node);
                    remap.insert(n.id, node.id);
                }
                node
            })
            .collect();
        let renamed = |id: Id| remap.get(&id).copied().unwrap_or(id);
        let edges = self
            .edges
            .iter()
            .map(|e| Edge {
                id: if edge_taken(e.id) { Id::fresh(IdKind::Edge) } else { e.id },
                source: renamed(e.source),
                target: renamed(e.target),
                ..e.clone()
            })
            .collect();
        let groups = self
            .groups
            .iter()
            .map(|g| Group {
                nodes: g.nodes.iter().copied().map(renamed).collect(),
                ..g.clone()
            })
            .collect();
        GraphData { nodes, edges, groups }
    }
}
