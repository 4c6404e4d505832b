//! Edge reducer: hover activation, selection, edit mode and adding edges.

use super::ReducerContext;
use crate::events::{EdgeEvent, GraphEvent};
use crate::state::GraphState;
use dag_core::{Features, GraphModel, ItemState};

pub fn edge_reducer(state: GraphState, event: &GraphEvent, ctx: &ReducerContext) -> GraphState {
    let GraphEvent::Edge(event) = event else {
        return state;
    };
    match event {
        // Replaces every facet: an edge being edited is nothing else.
        EdgeEvent::DoubleClick { edge, .. } if ctx.has(Features::EDIT_EDGE) => {
            let next = state
                .present()
                .update_edge_state(*edge, |_| ItemState::EDITING);
            state.with_present(next)
        }
        EdgeEvent::MouseEnter { edge, .. } if ctx.has(Features::EDGE_HOVER_ACTIVATE) => {
            let next = state
                .present()
                .update_edge_state(*edge, |s| s.with(ItemState::ACTIVATED));
            state.with_present(next)
        }
        EdgeEvent::MouseLeave { edge, .. } => {
            let next = state
                .present()
                .update_edge_state(*edge, |s| s.without(ItemState::ACTIVATED));
            state.with_present(next)
        }
        EdgeEvent::Click { edge, .. } | EdgeEvent::ContextMenu { edge, .. } => {
            if state.present().edge(*edge).is_none() {
                return state;
            }
            let next = state
                .present()
                .unselect_all()
                .update_edge_state(*edge, |s| s.with(ItemState::SELECTED));
            state.with_present(next)
        }
        EdgeEvent::Add { edge } if ctx.has(Features::ADD_NEW_EDGES) => {
            let next = state.present().insert_edge(edge.clone());
            state.with_history(next, GraphModel::clone)
        }
        _ => state,
    }
}
