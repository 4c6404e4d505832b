//! Canvas reducer: clipboard, delete, undo/redo, key tracking and bulk data
//! replacement.

use super::ReducerContext;
use crate::events::{CanvasEvent, GraphEvent, RawInput};
use crate::state::GraphState;
use dag_core::{Features, GraphData, GraphModel, ItemState, Point};
use std::sync::Arc;

pub fn canvas_reducer(state: GraphState, event: &GraphEvent, ctx: &ReducerContext) -> GraphState {
    let GraphEvent::Canvas(event) = event else {
        return state;
    };
    match event {
        CanvasEvent::Paste { data, position } => paste(state, data, *position, ctx),
        CanvasEvent::Delete => delete(state, ctx),
        CanvasEvent::Undo if ctx.has(Features::UNDO_STACK) => GraphState {
            data: state.data.undo(),
            ..state
        },
        CanvasEvent::Redo if ctx.has(Features::UNDO_STACK) => GraphState {
            data: state.data.redo(),
            ..state
        },
        CanvasEvent::KeyDown { raw } => key_down(state, raw),
        CanvasEvent::KeyUp { raw } => key_up(state, raw),
        CanvasEvent::SetData { data } => GraphState {
            data: state.data.reset(data.clone()),
            ..state
        },
        CanvasEvent::UpdateData {
            updater,
            should_record,
        } => {
            let next = updater.apply(state.present());
            if *should_record {
                state.with_history(next, GraphModel::clone)
            } else {
                state.with_present(next)
            }
        }
        CanvasEvent::ResetUndoStack => {
            let present = state.present().clone();
            GraphState {
                data: state.data.reset(present),
                ..state
            }
        }
        _ => state,
    }
}

/// Insert clipboard content as the new, exclusive selection.
///
/// With a cursor position, every pasted node moves by the offset that puts
/// the first node exactly under the cursor. Ids already present in the
/// model are reissued.
fn paste(state: GraphState, data: &GraphData, position: Option<Point>, ctx: &ReducerContext) -> GraphState {
    if !ctx.has(Features::ADD_NEW_NODES) || !state.viewport.is_complete() {
        return state;
    }
    let data = &state.present().reissue_colliding(data);
    let offset = position
        .and_then(|p| state.viewport.real_point_from_client(p.x, p.y))
        .zip(data.nodes.first())
        .map(|(target, anchor)| Point::new(target.x - anchor.x, target.y - anchor.y))
        .unwrap_or_default();

    let mut next = state.present().unselect_all();
    for node in &data.nodes {
        let mut node = node.clone();
        node.x += offset.x;
        node.y += offset.y;
        node.state = ItemState::SELECTED;
        next = next.insert_node(node);
    }
    for edge in &data.edges {
        next = next.insert_edge(edge.clone());
    }
    log::debug!("paste {} nodes, {} edges", data.nodes.len(), data.edges.len());
    state.with_history(next, GraphModel::clone)
}

/// Remove the selected nodes and edges, and every edge touching a removed
/// node. Survivors end up unselected.
fn delete(state: GraphState, ctx: &ReducerContext) -> GraphState {
    if !ctx.has(Features::DELETE) {
        return state;
    }
    let next = state
        .present()
        .delete_items(|n| !n.state.is_selected(), |e| !e.state.is_selected())
        .unselect_all();
    state.with_history(next, GraphModel::unselect_all)
}

fn key_down(state: GraphState, raw: &RawInput) -> GraphState {
    let Some(key) = raw.key_name() else {
        return state;
    };
    if state.active_keys.contains(&key) {
        return state;
    }
    let mut keys = (*state.active_keys).clone();
    keys.insert(key);
    GraphState {
        active_keys: Arc::new(keys),
        ..state
    }
}

fn key_up(state: GraphState, raw: &RawInput) -> GraphState {
    let Some(key) = raw.key_name() else {
        return state;
    };
    if !state.active_keys.contains(&key) {
        return state;
    }
    let mut keys = (*state.active_keys).clone();
    keys.remove(&key);
    GraphState {
        active_keys: Arc::new(keys),
        ..state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Updater;
    use crate::reducers::test_support::*;
    use dag_core::{Edge, Id, Node};
    use pretty_assertions::assert_eq;

    fn run(state: GraphState, event: CanvasEvent) -> GraphState {
        canvas_reducer(state, &GraphEvent::Canvas(event), &ctx())
    }

    fn select(state: GraphState, ids: &[&str]) -> GraphState {
        let ids: Vec<Id> = ids.iter().map(|s| Id::intern(s)).collect();
        let next = state.present().select_nodes(|n| ids.contains(&n.id));
        state.with_present(next)
    }

    #[test]
    fn paste_puts_anchor_under_cursor() {
        let state = select(state(), &["a"]);
        let clip = GraphData {
            nodes: vec![Node::new("x", 0.0, 0.0), Node::new("y", 30.0, 10.0)],
            edges: vec![Edge::new("xy", "x", "y")],
            groups: vec![],
        };
        let next = run(
            state,
            CanvasEvent::Paste {
                data: clip,
                position: Some(Point::new(100.0, 50.0)),
            },
        );
        let model = next.present();
        let x = model.node(Id::intern("x")).unwrap();
        assert_eq!((x.x, x.y), (100.0, 50.0));
        assert!(x.state.is_selected());
        let y = model.node(Id::intern("y")).unwrap();
        assert_eq!((y.x, y.y), (130.0, 60.0));
        assert!(!model.node(Id::intern("a")).unwrap().state.is_selected());
        assert!(model.edge(Id::intern("xy")).is_some());
        assert_eq!(next.data.past().len(), 1);
    }

    #[test]
    fn paste_reissues_colliding_ids() {
        let clip = GraphData {
            nodes: vec![Node::new("a", 0.0, 0.0).sized(10.0, 10.0), Node::new("z", 20.0, 0.0)],
            edges: vec![Edge::new("ab", "a", "z")],
            groups: vec![],
        };
        let next = run(
            state(),
            CanvasEvent::Paste {
                data: clip,
                position: None,
            },
        );
        let model = next.present();
        assert_eq!(model.node_count(), 5);
        assert_eq!(model.edge_count(), 2);
        let original = model.node(Id::intern("a")).unwrap();
        assert_eq!((original.width, original.height), (Some(100.0), Some(40.0)));
        assert_eq!(model.edge(Id::intern("ab")).unwrap().target, Id::intern("b"));

        let pasted: Vec<_> = model.selected_nodes().map(|n| n.id).collect();
        assert_eq!(pasted.len(), 2);
        assert!(!pasted.contains(&Id::intern("a")));
        assert!(pasted.contains(&Id::intern("z")));
        let copy = model.edges().find(|e| e.id != Id::intern("ab")).unwrap();
        assert_eq!((copy.source, copy.target), (pasted[0], Id::intern("z")));
    }

    #[test]
    fn paste_needs_a_measured_viewport() {
        let state = GraphState::default();
        let next = run(
            state.clone(),
            CanvasEvent::Paste {
                data: GraphData::default(),
                position: None,
            },
        );
        assert!(next.ptr_eq(&state));
    }

    #[test]
    fn delete_removes_selection_and_incident_edges() {
        let state = select(state(), &["a"]);
        let next = run(state, CanvasEvent::Delete);
        let model = next.present();
        assert!(model.node(Id::intern("a")).is_none());
        assert_eq!(model.edge_count(), 0);
        assert!(model.nodes().all(|n| n.state.is_empty()));
        assert!(next.data.can_undo());
        assert!(next.data.past()[0].nodes().all(|n| !n.state.is_selected()));
    }

    #[test]
    fn delete_in_readonly_mode_is_identity() {
        let state = select(state(), &["a", "b"]);
        let ro = ctx_with(Features::data_readonly_mode());
        let next = canvas_reducer(state.clone(), &GraphEvent::Canvas(CanvasEvent::Delete), &ro);
        assert!(next.ptr_eq(&state));
        assert_eq!(next.present(), state.present());
    }

    #[test]
    fn repeated_key_down_is_identity() {
        let once = run(state(), CanvasEvent::KeyDown { raw: RawInput::key("a") });
        let twice = run(once.clone(), CanvasEvent::KeyDown { raw: RawInput::key("A") });
        assert!(twice.ptr_eq(&once));
        assert_eq!(once.active_keys.iter().collect::<Vec<_>>(), vec!["a"]);

        let released = run(twice, CanvasEvent::KeyUp { raw: RawInput::key("a") });
        assert!(released.active_keys.is_empty());
    }

    #[test]
    fn update_data_records_on_request() {
        let move_a = Updater::new(|m: &GraphModel| m.update_node(Id::intern("a"), |n| n.x = 7.0));
        let silent = run(
            state(),
            CanvasEvent::UpdateData {
                updater: move_a.clone(),
                should_record: false,
            },
        );
        assert!(!silent.data.can_undo());
        let recorded = run(
            state(),
            CanvasEvent::UpdateData {
                updater: move_a,
                should_record: true,
            },
        );
        assert!(recorded.data.can_undo());
        assert_eq!(recorded.present().node(Id::intern("a")).unwrap().x, 7.0);
    }

    #[test]
    fn set_data_resets_history() {
        let state = run(select(state(), &["a"]), CanvasEvent::Delete);
        assert!(state.data.can_undo());
        let next = run(
            state,
            CanvasEvent::SetData {
                data: GraphModel::new(),
            },
        );
        assert!(!next.data.can_undo());
        assert_eq!(next.present().node_count(), 0);
    }
}
