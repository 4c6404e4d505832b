//! Connect gesture: drawing a new edge from a node (or port) to a target.

use super::ReducerContext;
use crate::events::{EdgeEvent, GraphEvent, RawInput};
use crate::state::{ConnectState, GraphState};
use dag_core::{Edge, Features, GraphModel, Id, IdKind, ItemState};
use std::sync::Arc;

pub fn connect_reducer(state: GraphState, event: &GraphEvent, ctx: &ReducerContext) -> GraphState {
    let GraphEvent::Edge(event) = event else {
        return state;
    };
    match event {
        EdgeEvent::ConnectStart { node, port, raw } => start(state, *node, *port, raw),
        EdgeEvent::ConnectMove { raw } => {
            let Some(current) = state.connect_state.as_deref() else {
                return state;
            };
            let Some(point) = state.viewport.real_point_from_client(raw.client_x, raw.client_y) else {
                return state;
            };
            if current.moving_point == Some(point) {
                return state;
            }
            let next = ConnectState {
                moving_point: Some(point),
                ..current.clone()
            };
            GraphState {
                connect_state: Some(Arc::new(next)),
                ..state
            }
        }
        EdgeEvent::ConnectAttach { node, port } => retarget(state, Some(*node), *port),
        EdgeEvent::ConnectDetach => retarget(state, None, None),
        EdgeEvent::ConnectEnd { is_cancel } => end(state, *is_cancel, ctx),
        _ => state,
    }
}

fn set_connecting(model: &GraphModel, node: Id, port: Option<Id>, on: bool) -> GraphModel {
    let Some(port) = port else {
        return model.clone();
    };
    model.update_port(node, port, |s| {
        if on {
            s.with(ItemState::CONNECTING)
        } else {
            s.without(ItemState::CONNECTING)
        }
    })
}

fn start(state: GraphState, node: Id, port: Option<Id>, raw: &RawInput) -> GraphState {
    if state.present().node(node).is_none() {
        return state;
    }
    let connect = ConnectState {
        source_node: node,
        source_port: port,
        pointer_id: raw.pointer_id,
        moving_point: state.viewport.real_point_from_client(raw.client_x, raw.client_y),
        target_node: None,
        target_port: None,
    };
    let next = set_connecting(state.present(), node, port, true);
    GraphState {
        connect_state: Some(Arc::new(connect)),
        ..state.with_present(next)
    }
}

fn retarget(state: GraphState, node: Option<Id>, port: Option<Id>) -> GraphState {
    let Some(current) = state.connect_state.as_deref() else {
        return state;
    };
    if current.target_node == node && current.target_port == port {
        return state;
    }
    if let Some(id) = node
        && state.present().node(id).is_none()
    {
        return state;
    }
    let next = ConnectState {
        target_node: node,
        target_port: port,
        ..current.clone()
    };
    GraphState {
        connect_state: Some(Arc::new(next)),
        ..state
    }
}

/// Finish the gesture. An attached, uncancelled connection becomes a new
/// edge with one history entry.
fn end(state: GraphState, is_cancel: bool, ctx: &ReducerContext) -> GraphState {
    let Some(current) = state.connect_state.clone() else {
        return state;
    };
    let cleared = set_connecting(state.present(), current.source_node, current.source_port, false);
    let state = GraphState {
        connect_state: None,
        ..state
    };
    match current.target_node {
        Some(target) if !is_cancel && ctx.has(Features::ADD_NEW_EDGES) => {
            let mut edge = Edge::new(Id::fresh(IdKind::Edge), current.source_node, target);
            edge.source_port_id = current.source_port;
            edge.target_port_id = current.target_port;
            log::debug!("connect {} -> {}", current.source_node, target);
            let next = cleared.insert_edge(edge);
            if next.ptr_eq(&cleared) {
                return state.with_present(cleared);
            }
            let past = cleared.clone();
            state.with_history(next, move |_| past)
        }
        _ => state.with_present(cleared),
    }
}
