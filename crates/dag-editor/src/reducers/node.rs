//! Node reducer: drag and resize overlays, hover activation, adding nodes
//! and centering the viewport on nodes.

use super::ReducerContext;
use crate::events::{CanvasEvent, GraphEvent, NodeEvent, RawInput};
use crate::state::{Behavior, DummyNode, DummyNodes, GraphState};
use dag_core::alignment::{self, Axis};
use dag_core::viewport::{edge_scroll_delta, point_delta_by_client_delta, transform_point};
use dag_core::{Features, GraphConfig, GraphModel, Id, ItemState, Node, Point, Rect, hit};
use std::collections::HashSet;
use std::sync::Arc;

pub fn node_reducer(state: GraphState, event: &GraphEvent, ctx: &ReducerContext) -> GraphState {
    match event {
        GraphEvent::Node(event) => match event {
            NodeEvent::ResizingStart { node } => resize_start(state, *node, ctx),
            NodeEvent::Resizing {
                dx,
                dy,
                d_width,
                d_height,
            } => {
                if state.dummy_nodes.is_empty() {
                    return state;
                }
                let overlay = DummyNodes {
                    dx: *dx,
                    dy: *dy,
                    d_width: *d_width,
                    d_height: *d_height,
                    ..(*state.dummy_nodes).clone()
                };
                GraphState {
                    dummy_nodes: Arc::new(overlay),
                    ..state
                }
            }
            NodeEvent::ResizingEnd => resize_end(state),
            NodeEvent::DragStart {
                node,
                is_multi_select,
                ..
            } => drag_start(state, *node, *is_multi_select, ctx),
            NodeEvent::Drag {
                raw,
                dx,
                dy,
                is_visible,
            } => drag(state, raw, *dx, *dy, *is_visible, ctx),
            NodeEvent::DragEnd { is_drag_canceled } => drag_end(state, *is_drag_canceled),
            NodeEvent::PointerEnter { node, raw } => pointer_enter(state, *node, raw, ctx),
            NodeEvent::PointerLeave { node, .. } => match state.behavior {
                Behavior::Default | Behavior::Connecting => {
                    let next = state
                        .present()
                        .update_node_state(*node, |s| s.without(ItemState::ACTIVATED));
                    state.with_present(next)
                }
                _ => state,
            },
            NodeEvent::Add { node } if ctx.has(Features::ADD_NEW_NODES) => {
                let next = state.present().insert_node(node.clone());
                state.with_history(next, GraphModel::clone)
            }
            NodeEvent::Centralize { nodes } => locate(state, nodes, true, None, ctx),
            NodeEvent::Locate { nodes, position } => locate(state, nodes, false, *position, ctx),
            _ => state,
        },
        GraphEvent::Canvas(CanvasEvent::DraggingNodeFromItemPanel { node }) => {
            if !ctx.has(Features::AUTO_ALIGN) {
                return state;
            }
            let dragged = [ctx.graph_config.node_rect(node)];
            let lines = guides(&state, &dragged, &HashSet::new(), ctx);
            GraphState {
                alignment_lines: Arc::from(lines),
                ..state
            }
        }
        GraphEvent::Canvas(CanvasEvent::DraggingNodeFromItemPanelEnd { node }) => {
            let state = state.clear_overlay();
            match node {
                Some(node) if ctx.has(Features::ADD_NEW_NODES) => {
                    let node = Node {
                        state: ItemState::SELECTED,
                        ..node.clone()
                    };
                    let next = state.present().unselect_all().insert_node(node);
                    state.with_history(next, GraphModel::unselect_all)
                }
                _ => state,
            }
        }
        _ => state,
    }
}

fn dummy(node: &Node, config: &GraphConfig) -> DummyNode {
    let size = config.node_size(node);
    DummyNode {
        id: node.id,
        x: node.x,
        y: node.y,
        width: size.width,
        height: size.height,
    }
}

fn selected_dummies(model: &GraphModel, config: &GraphConfig) -> Vec<DummyNode> {
    model.selected_nodes().map(|n| dummy(n, config)).collect()
}

fn resize_start(state: GraphState, node: Id, ctx: &ReducerContext) -> GraphState {
    if !ctx.has(Features::NODE_RESIZABLE) {
        return state;
    }
    let model = state.present();
    let mut nodes = selected_dummies(model, &ctx.graph_config);
    if nodes.iter().all(|d| d.id != node)
        && let Some(target) = model.node(node)
    {
        nodes = vec![dummy(target, &ctx.graph_config)];
    }
    if nodes.is_empty() {
        return state;
    }
    GraphState {
        dummy_nodes: Arc::new(DummyNodes {
            nodes,
            is_visible: true,
            ..DummyNodes::default()
        }),
        ..state
    }
}

fn resize_end(state: GraphState) -> GraphState {
    if state.dummy_nodes.is_empty() {
        return state;
    }
    let next = state
        .present()
        .update_nodes_position_and_size(state.dummy_nodes.resize_placements());
    state
        .with_history(next, GraphModel::unselect_all)
        .clear_overlay()
}

/// Snapshot the nodes that will move. Without a multi-select gesture, an
/// unselected target collapses the selection onto itself.
fn drag_start(state: GraphState, node: Id, is_multi_select: bool, ctx: &ReducerContext) -> GraphState {
    if !ctx.has(Features::NODE_DRAGGABLE) {
        return state;
    }
    let Some(target) = state.present().node(node) else {
        return state;
    };
    let config = &ctx.graph_config;
    let (model, nodes) = if is_multi_select {
        let model = state
            .present()
            .select_nodes(|n| n.id == node || n.state.is_selected());
        let nodes = selected_dummies(&model, config);
        (model, nodes)
    } else if !target.state.is_selected() {
        let nodes = vec![dummy(target, config)];
        (state.present().select_nodes(|n| n.id == node), nodes)
    } else {
        (state.present().clone(), selected_dummies(state.present(), config))
    };
    GraphState {
        dummy_nodes: Arc::new(DummyNodes {
            nodes,
            ..DummyNodes::default()
        }),
        ..state.with_present(model)
    }
}

/// One drag frame: accumulate the offset, auto-scroll near the container
/// edge and snap to alignment guides.
fn drag(state: GraphState, raw: &RawInput, dx: f32, dy: f32, is_visible: bool, ctx: &ReducerContext) -> GraphState {
    if !state.viewport.is_complete() || state.dummy_nodes.is_empty() {
        return state;
    }
    let settings = &ctx.settings;
    let mut viewport = state.viewport;
    let (mut scroll_x, mut scroll_y) = (0.0, 0.0);
    if ctx.has(Features::EDGE_AUTO_SCROLL)
        && let Some(area) = viewport.visible_rect.or(viewport.rect)
    {
        let (step, margin) = (settings.auto_scroll_step, settings.auto_scroll_margin);
        scroll_x = edge_scroll_delta(area.left, area.right(), raw.client_x, margin, step);
        scroll_y = edge_scroll_delta(area.top, area.bottom(), raw.client_y, margin, step);
        if scroll_x != 0.0 || scroll_y != 0.0 {
            viewport = viewport.pan(-scroll_x, -scroll_y);
        }
    }
    let delta = point_delta_by_client_delta(dx + scroll_x, dy + scroll_y, &viewport.transform_matrix);

    let mut overlay = DummyNodes {
        dx: state.dummy_nodes.dx + delta.x,
        dy: state.dummy_nodes.dy + delta.y,
        is_visible,
        ..(*state.dummy_nodes).clone()
    };
    let mut lines = state.alignment_lines.clone();
    if ctx.has(Features::AUTO_ALIGN) {
        let moved = overlay.moved_rects();
        let dragged_ids: HashSet<Id> = overlay.nodes.iter().map(|n| n.id).collect();
        let found = guides(&state, &moved, &dragged_ids, ctx);
        if found.is_empty() {
            overlay.aligned_dx = None;
            overlay.aligned_dy = None;
        } else {
            overlay.aligned_dx = Some(overlay.dx + alignment::auto_align_displacement(&found, &moved, Axis::X));
            overlay.aligned_dy = Some(overlay.dy + alignment::auto_align_displacement(&found, &moved, Axis::Y));
        }
        lines = Arc::from(found);
    }
    GraphState {
        viewport,
        dummy_nodes: Arc::new(overlay),
        alignment_lines: lines,
        ..state
    }
}

/// Guide lines between `dragged` and on-screen nodes. Skipped when too
/// many nodes are visible.
fn guides(state: &GraphState, dragged: &[Rect], exclude: &HashSet<Id>, ctx: &ReducerContext) -> Vec<alignment::Line> {
    let config = &ctx.graph_config;
    let rendered = hit::rendered_nodes(state.present(), config, &state.viewport);
    if rendered.len() >= ctx.settings.auto_align_threshold {
        return Vec::new();
    }
    let others: Vec<Rect> = rendered
        .into_iter()
        .filter(|n| !exclude.contains(&n.id))
        .map(|n| config.node_rect(n))
        .collect();
    let threshold = alignment::threshold_for_zoom(state.viewport.scale());
    alignment::alignment_lines(dragged, &others, threshold)
}

/// Commit the overlay: one history entry, selection cleared.
fn drag_end(state: GraphState, is_drag_canceled: bool) -> GraphState {
    if is_drag_canceled || state.dummy_nodes.is_empty() {
        return state.clear_overlay();
    }
    let next = state
        .present()
        .update_nodes_position_and_size(state.dummy_nodes.drag_placements())
        .unselect_all();
    log::debug!("drag commit of {} nodes", state.dummy_nodes.nodes.len());
    state
        .with_history(next, GraphModel::unselect_all)
        .clear_overlay()
}

/// Hover activation. While connecting, only the pointer that started the
/// connection may activate nodes.
fn pointer_enter(state: GraphState, node: Id, raw: &RawInput, ctx: &ReducerContext) -> GraphState {
    if !ctx.has(Features::NODE_HOVER_ACTIVATE) {
        return state;
    }
    match state.behavior {
        Behavior::Connecting => {
            let initiator = state.connect_state.as_ref().and_then(|c| c.pointer_id);
            if raw.pointer_id != initiator {
                return state;
            }
        }
        Behavior::Default => {}
        _ => return state,
    }
    let next = state
        .present()
        .update_node_state(node, |s| s.with(ItemState::ACTIVATED));
    state.with_present(next)
}

/// Scroll one node into view (its center, or its origin), or frame several.
fn locate(
    state: GraphState,
    nodes: &[Id],
    centralize: bool,
    position: Option<Point>,
    ctx: &ReducerContext,
) -> GraphState {
    if !state.viewport.is_complete() || nodes.is_empty() {
        return state;
    }
    let config = &ctx.graph_config;
    let viewport = if let [id] = nodes {
        let Some(node) = state.present().node(*id) else {
            return state;
        };
        let size = config.node_size(node);
        let (x, y) = if centralize {
            (node.x + size.width / 2.0, node.y + size.height / 2.0)
        } else {
            (node.x, node.y)
        };
        let local = transform_point(x, y, &state.viewport.transform_matrix);
        state.viewport.scroll_into_view(local.x, local.y, true, position)
    } else {
        let wanted: HashSet<Id> = nodes.iter().copied().collect();
        let Some(area) = state
            .present()
            .bounding_rect(config, |n| wanted.contains(&n.id))
        else {
            return state;
        };
        let s = &ctx.settings;
        state
            .viewport
            .focus_area(&area, s.boundary_padding, s.min_zoom, s.max_zoom)
    };
    state.with_viewport(viewport)
}
