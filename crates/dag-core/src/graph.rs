//! The persistent graph aggregate.
//!
//! `GraphModel` is an immutable snapshot. Every update returns a new model
//! that shares untouched nodes, edges and groups with the receiver through
//! `Arc`, so history can keep many snapshots cheaply. An update that changes
//! nothing returns a model that is [`GraphModel::ptr_eq`] to the receiver.

use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::id::Id;
use crate::model::{Edge, GraphData, Group, Node};
use crate::state::ItemState;
use crate::viewport::{Rect, Size};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// New position (and optionally size) for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePlacement {
    pub id: Id,
    pub x: f32,
    pub y: f32,
    pub size: Option<Size>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct GraphModel {
    nodes: Arc<IndexMap<Id, Arc<Node>>>,
    edges: Arc<IndexMap<Id, Arc<Edge>>>,
    groups: Arc<Vec<Group>>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Exchange layout ─────────────────────────────────────────────────

    /// Build from the exchange layout, rejecting duplicate ids and edges
    /// into missing nodes.
    pub fn from_data(data: GraphData) -> Result<Self> {
        let mut nodes = IndexMap::with_capacity(data.nodes.len());
        for node in data.nodes {
            let mut ports = HashSet::new();
            for port in &node.ports {
                if !ports.insert(port.id) {
                    return Err(GraphError::DuplicatePort {
                        node: node.id,
                        port: port.id,
                    });
                }
            }
            let id = node.id;
            if nodes.insert(id, Arc::new(node)).is_some() {
                return Err(GraphError::DuplicateNode(id));
            }
        }
        let mut edges = IndexMap::with_capacity(data.edges.len());
        for edge in data.edges {
            for end in [edge.source, edge.target] {
                if !nodes.contains_key(&end) {
                    return Err(GraphError::DanglingEdge {
                        edge: edge.id,
                        node: end,
                    });
                }
            }
            let id = edge.id;
            if edges.insert(id, Arc::new(edge)).is_some() {
                return Err(GraphError::DuplicateEdge(id));
            }
        }
        Ok(Self {
            nodes: Arc::new(nodes),
            edges: Arc::new(edges),
            groups: Arc::new(data.groups),
        })
    }

    pub fn to_data(&self) -> GraphData {
        GraphData {
            nodes: self.nodes.values().map(|n| (**n).clone()).collect(),
            edges: self.edges.values().map(|e| (**e).clone()).collect(),
            groups: (*self.groups).clone(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let data: GraphData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_data())?)
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Whether both models share the same storage (no update happened).
    pub fn ptr_eq(&self, other: &GraphModel) -> bool {
        Arc::ptr_eq(&self.nodes, &other.nodes)
            && Arc::ptr_eq(&self.edges, &other.edges)
            && Arc::ptr_eq(&self.groups, &other.groups)
    }

    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.get(&id).map(Arc::as_ref)
    }

    pub fn edge(&self, id: Id) -> Option<&Edge> {
        self.edges.get(&id).map(Arc::as_ref)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().map(Arc::as_ref)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values().map(Arc::as_ref)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn selected_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|n| n.state.is_selected())
    }

    /// Bounding box of the nodes accepted by `filter`.
    pub fn bounding_rect(&self, config: &GraphConfig, filter: impl Fn(&Node) -> bool) -> Option<Rect> {
        self.nodes()
            .filter(|n| filter(n))
            .map(|n| config.node_rect(n))
            .reduce(|acc, r| acc.union(&r))
    }

    /// Bounding box of every node.
    pub fn content_area(&self, config: &GraphConfig) -> Option<Rect> {
        self.bounding_rect(config, |_| true)
    }

    /// Member bounding box grown by the group padding.
    pub fn group_rect(&self, group: &Group, config: &GraphConfig) -> Option<Rect> {
        group
            .nodes
            .iter()
            .filter_map(|id| self.node(*id))
            .map(|n| config.node_rect(n))
            .reduce(|acc, r| acc.union(&r))
            .map(|r| r.inflate(group.padding))
    }

    // ─── Updates ─────────────────────────────────────────────────────────

    /// Insert or replace a node.
    /// Copy of `data` re-keyed so none of its node or edge ids clash with
    /// this model.
    pub fn reissue_colliding(&self, data: &GraphData) -> GraphData {
        data.reissue_ids(|id| self.nodes.contains_key(&id), |id| self.edges.contains_key(&id))
    }

    pub fn insert_node(&self, node: Node) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.nodes).insert(node.id, Arc::new(node));
        next
    }

    /// Insert or replace an edge. Edges into missing nodes are refused.
    pub fn insert_edge(&self, edge: Edge) -> Self {
        if !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target) {
            log::debug!("refusing dangling edge {}", edge.id);
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.edges).insert(edge.id, Arc::new(edge));
        next
    }

    pub fn insert_group(&self, group: Group) -> Self {
        let mut next = self.clone();
        let groups = Arc::make_mut(&mut next.groups);
        match groups.iter_mut().find(|g| g.id == group.id) {
            Some(slot) => *slot = group,
            None => groups.push(group),
        }
        next
    }

    /// Apply `f` to a copy of the node. Missing ids and no-op edits return
    /// the receiver unchanged.
    pub fn update_node(&self, id: Id, f: impl FnOnce(&mut Node)) -> Self {
        let Some(old) = self.nodes.get(&id) else {
            return self.clone();
        };
        let mut node = (**old).clone();
        f(&mut node);
        if node == **old {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.nodes).insert(id, Arc::new(node));
        next
    }

    pub fn update_node_state(&self, id: Id, f: impl FnOnce(ItemState) -> ItemState) -> Self {
        self.update_node(id, |n| n.state = f(n.state))
    }

    pub fn update_edge(&self, id: Id, f: impl FnOnce(&mut Edge)) -> Self {
        let Some(old) = self.edges.get(&id) else {
            return self.clone();
        };
        let mut edge = (**old).clone();
        f(&mut edge);
        if edge == **old {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.edges).insert(id, Arc::new(edge));
        next
    }

    pub fn update_edge_state(&self, id: Id, f: impl FnOnce(ItemState) -> ItemState) -> Self {
        self.update_edge(id, |e| e.state = f(e.state))
    }

    pub fn update_port(&self, node: Id, port: Id, f: impl FnOnce(ItemState) -> ItemState) -> Self {
        self.update_node(node, |n| {
            if let Some(p) = n.ports.iter_mut().find(|p| p.id == port) {
                p.state = f(p.state);
            }
        })
    }

    /// Move (and optionally resize) several nodes at once.
    pub fn update_nodes_position_and_size(
        &self,
        placements: impl IntoIterator<Item = NodePlacement>,
    ) -> Self {
        let mut next = self.clone();
        for p in placements {
            let Some(old) = next.nodes.get(&p.id) else {
                continue;
            };
            let mut node = (**old).clone();
            node.x = p.x;
            node.y = p.y;
            if let Some(size) = p.size {
                node.width = Some(size.width);
                node.height = Some(size.height);
            }
            if node != **old {
                Arc::make_mut(&mut next.nodes).insert(p.id, Arc::new(node));
            }
        }
        next
    }

    /// Keep the nodes and edges the predicates accept. Edges touching a
    /// removed node are removed too, and group memberships are pruned.
    pub fn delete_items(
        &self,
        keep_node: impl Fn(&Node) -> bool,
        keep_edge: impl Fn(&Edge) -> bool,
    ) -> Self {
        let removed: HashSet<Id> = self
            .nodes()
            .filter(|n| !keep_node(n))
            .map(|n| n.id)
            .collect();
        let survives = |e: &Edge| keep_edge(e) && !removed.contains(&e.source) && !removed.contains(&e.target);
        let edges_removed = self.edges().any(|e| !survives(e));
        if removed.is_empty() && !edges_removed {
            return self.clone();
        }

        let mut next = self.clone();
        if !removed.is_empty() {
            Arc::make_mut(&mut next.nodes).retain(|id, _| !removed.contains(id));
            if self.groups.iter().any(|g| g.nodes.iter().any(|n| removed.contains(n))) {
                let groups = Arc::make_mut(&mut next.groups);
                for group in groups.iter_mut() {
                    group.nodes.retain(|n| !removed.contains(n));
                }
                groups.retain(|g| !g.nodes.is_empty());
            }
        }
        if edges_removed {
            Arc::make_mut(&mut next.edges).retain(|_, e| survives(&**e));
        }
        next
    }

    /// Select exactly the nodes `pred` accepts. Every other node and every
    /// edge gets `CONNECTED_TO_SELECTED` or `UNCONNECTED_TO_SELECTED`
    /// depending on whether it touches a selected node.
    pub fn select_nodes(&self, pred: impl Fn(&Node) -> bool) -> Self {
        let selected: HashSet<Id> = self.nodes().filter(|n| pred(n)).map(|n| n.id).collect();
        if selected.is_empty() {
            return self.unselect_all();
        }
        let mut neighbours = HashSet::new();
        for edge in self.edges() {
            if selected.contains(&edge.source) {
                neighbours.insert(edge.target);
            }
            if selected.contains(&edge.target) {
                neighbours.insert(edge.source);
            }
        }
        let with_nodes = self.map_nodes(|node| {
            let relation = if selected.contains(&node.id) {
                ItemState::SELECTED
            } else if neighbours.contains(&node.id) {
                ItemState::CONNECTED_TO_SELECTED
            } else {
                ItemState::UNCONNECTED_TO_SELECTED
            };
            let state = node.state.with_selection(relation);
            (state != node.state).then(|| Node {
                state,
                ..node.clone()
            })
        });
        with_nodes.map_edges(|edge| {
            let relation = if selected.contains(&edge.source) || selected.contains(&edge.target) {
                ItemState::CONNECTED_TO_SELECTED
            } else {
                ItemState::UNCONNECTED_TO_SELECTED
            };
            let state = edge.state.with_selection(relation);
            (state != edge.state).then(|| Edge {
                state,
                ..edge.clone()
            })
        })
    }

    /// Clear selection and selection relations on nodes, ports and edges.
    pub fn unselect_all(&self) -> Self {
        self.map_nodes(|node| {
            let state = node.state.unselected();
            match node.map_port_states(ItemState::unselected) {
                Some(mut changed) => {
                    changed.state = state;
                    Some(changed)
                }
                None => (state != node.state).then(|| Node {
                    state,
                    ..node.clone()
                }),
            }
        })
        .map_edges(|edge| {
            let state = edge.state.unselected();
            (state != edge.state).then(|| Edge {
                state,
                ..edge.clone()
            })
        })
    }

    /// Rebuild the node map only if `f` reports a change for some node.
    fn map_nodes(&self, mut f: impl FnMut(&Node) -> Option<Node>) -> Self {
        let mut next = self.clone();
        for (i, node) in self.nodes.values().enumerate() {
            if let Some(changed) = f(node) {
                Arc::make_mut(&mut next.nodes)[i] = Arc::new(changed);
            }
        }
        next
    }

    fn map_edges(&self, mut f: impl FnMut(&Edge) -> Option<Edge>) -> Self {
        let mut next = self.clone();
        for (i, edge) in self.edges.values().enumerate() {
            if let Some(changed) = f(edge) {
                Arc::make_mut(&mut next.edges)[i] = Arc::new(changed);
            }
        }
        next
    }
}

impl TryFrom<GraphData> for GraphModel {
    type Error = GraphError;

    fn try_from(data: GraphData) -> Result<Self> {
        Self::from_data(data)
    }
}

impl From<GraphModel> for GraphData {
    fn from(model: GraphModel) -> Self {
        model.to_data()
    }
}
