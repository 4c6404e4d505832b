//! Selection reducer: click selection, marquee/lasso selection, select-all
//! and programmatic navigation.

use super::ReducerContext;
use crate::events::{CanvasEvent, GraphEvent, NodeEvent, RawInput};
use crate::state::{Behavior, GraphState, SelectBoxPosition};
use dag_core::{Features, GraphModel, Id, ItemState, hit};
use std::collections::HashSet;

pub fn selection_reducer(state: GraphState, event: &GraphEvent, ctx: &ReducerContext) -> GraphState {
    let lasso = ctx.has(Features::LASSO_SELECT);
    match event {
        GraphEvent::Canvas(event) => match event {
            CanvasEvent::Click { .. } | CanvasEvent::ContextMenu { .. } | CanvasEvent::ResetSelection => {
                let next = state.present().unselect_all();
                state.with_present(next)
            }
            CanvasEvent::SelectStart { raw } => {
                let Some(point) = state.viewport.relative_point(raw.client_x, raw.client_y) else {
                    return state;
                };
                let next = state.present().unselect_all();
                GraphState {
                    select_box: SelectBoxPosition {
                        start_x: point.x,
                        start_y: if lasso { 0.0 } else { point.y },
                        width: 0.0,
                        height: 0.0,
                    },
                    ..state.with_present(next)
                }
            }
            CanvasEvent::SelectMove { dx, dy } => {
                if state.behavior != Behavior::MultiSelect {
                    return state;
                }
                let b = state.select_box;
                let height = if lasso {
                    state.viewport.rect.map_or(b.height, |r| r.height)
                } else {
                    b.height + dy
                };
                GraphState {
                    select_box: SelectBoxPosition {
                        width: b.width + dx,
                        height,
                        ..b
                    },
                    ..state
                }
            }
            CanvasEvent::SelectEnd => {
                let next = select_by_box(state.present(), &state, ctx);
                GraphState {
                    select_box: SelectBoxPosition::default(),
                    ..state.with_present(next)
                }
            }
            CanvasEvent::UpdateNodeSelectionBySelectBox => {
                if state.behavior != Behavior::MultiSelect {
                    return state;
                }
                let next = select_by_box(state.present(), &state, ctx);
                state.with_present(next)
            }
            CanvasEvent::Navigate { node, port } => {
                let cleared = state.present().unselect_all();
                let next = match port {
                    Some(port) => cleared.update_port(*node, *port, |s| s.with(ItemState::SELECTED)),
                    None => cleared.select_nodes(|n| n.id == *node),
                };
                state.with_present(next)
            }
            _ => state,
        },
        GraphEvent::Node(event) => match event {
            NodeEvent::Click { node, raw } if ctx.has(Features::CLICK_NODE_TO_SELECT) => {
                click(state, *node, raw, false)
            }
            NodeEvent::ContextMenu { node, raw } if ctx.has(Features::CLICK_NODE_TO_SELECT) => {
                click(state, *node, raw, true)
            }
            NodeEvent::SelectAll => {
                let next = state.present().select_nodes(|_| true);
                state.with_present(next)
            }
            _ => state,
        },
        _ => state,
    }
}

/// Plain click selects exactly the node; a modifier click toggles it in the
/// current selection. A context menu on a selected node keeps the selection.
fn click(state: GraphState, node: Id, raw: &RawInput, context_menu: bool) -> GraphState {
    let Some(target) = state.present().node(node) else {
        return state;
    };
    let was_selected = target.state.is_selected();
    if context_menu && was_selected {
        return state;
    }
    let next = if raw.modifiers.is_multi_select() {
        state
            .present()
            .select_nodes(|n| if n.id == node { !was_selected } else { n.state.is_selected() })
    } else {
        state.present().select_nodes(|n| n.id == node)
    };
    state.with_present(next)
}

/// Select every node whose screen rect intersects the marquee.
fn select_by_box(model: &GraphModel, state: &GraphState, ctx: &ReducerContext) -> GraphModel {
    let hits: HashSet<Id> = hit::hit_test_rect(
        model,
        &ctx.graph_config,
        &state.viewport.transform_matrix,
        &state.select_box.rect(),
    )
    .into_iter()
    .collect();
    model.select_nodes(|n| hits.contains(&n.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Modifiers;
    use crate::reducers::test_support::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> Id {
        Id::intern(s)
    }

    fn selected(state: &GraphState) -> Vec<&str> {
        let mut ids: Vec<&str> = state.present().selected_nodes().map(|n| n.id.as_str()).collect();
        ids.sort();
        ids
    }

    fn click_node(state: GraphState, node: &str, modifiers: Modifiers) -> GraphState {
        selection_reducer(
            state,
            &NodeEvent::Click {
                node: id(node),
                raw: RawInput::default().with_modifiers(modifiers),
            }
            .into(),
            &ctx(),
        )
    }

    #[test]
    fn click_selects_exclusively_and_modifier_toggles() {
        let state = click_node(state(), "a", Modifiers::default());
        assert_eq!(selected(&state), vec!["a"]);
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        let state = click_node(state, "c", ctrl);
        assert_eq!(selected(&state), vec!["a", "c"]);
        let state = click_node(state, "a", ctrl);
        assert_eq!(selected(&state), vec!["c"]);
        let state = click_node(state, "b", Modifiers::default());
        assert_eq!(selected(&state), vec!["b"]);
    }

    #[test]
    fn marquee_selects_intersecting_nodes() {
        let state = state();
        let mut state = selection_reducer(
            state,
            &CanvasEvent::SelectStart {
                raw: RawInput::pointer(150.0, 10.0),
            }
            .into(),
            &ctx_with(Features::default_features()),
        );
        state.behavior = Behavior::MultiSelect;
        let state = selection_reducer(
            state,
            &CanvasEvent::SelectMove { dx: 300.0, dy: 20.0 }.into(),
            &ctx_with(Features::default_features()),
        );
        assert_eq!(state.select_box.width, 300.0);
        assert_eq!(state.select_box.height, 20.0);
        let state = selection_reducer(state, &CanvasEvent::SelectEnd.into(), &ctx());
        assert_eq!(selected(&state), vec!["b", "c"]);
        assert_eq!(state.select_box, SelectBoxPosition::default());
    }

    #[test]
    fn lasso_uses_full_height_band() {
        let mut state = selection_reducer(
            state(),
            &CanvasEvent::SelectStart {
                raw: RawInput::pointer(150.0, 300.0),
            }
            .into(),
            &ctx(),
        );
        assert_eq!(state.select_box.start_y, 0.0);
        state.behavior = Behavior::MultiSelect;
        let state = selection_reducer(state, &CanvasEvent::SelectMove { dx: 100.0, dy: 5.0 }.into(), &ctx());
        assert_eq!(state.select_box.height, 600.0);
    }

    #[test]
    fn select_move_outside_multiselect_is_identity() {
        let state = state();
        let next = selection_reducer(state.clone(), &CanvasEvent::SelectMove { dx: 1.0, dy: 1.0 }.into(), &ctx());
        assert!(next.ptr_eq(&state));
    }

    #[test]
    fn navigate_to_port_selects_only_port() {
        let state = state();
        let with_port = state
            .present()
            .update_node(id("a"), |n| n.ports.push(dag_core::Port::new("out")));
        let state = state.with_present(with_port.select_nodes(|n| n.id == id("b")));
        let next = selection_reducer(
            state,
            &CanvasEvent::Navigate {
                node: id("a"),
                port: Some(id("out")),
            }
            .into(),
            &ctx(),
        );
        assert!(selected(&next).is_empty());
        assert!(next.present().node(id("a")).unwrap().ports[0].state.is_selected());
    }

    #[test]
    fn select_all_and_reset() {
        let state = selection_reducer(state(), &NodeEvent::SelectAll.into(), &ctx());
        assert_eq!(selected(&state), vec!["a", "b", "c"]);
        let state = selection_reducer(state, &CanvasEvent::ResetSelection.into(), &ctx());
        assert!(selected(&state).is_empty());
    }
}
