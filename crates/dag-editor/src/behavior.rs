//! Behavior state machine: which gesture is active.
//!
//! Start events switch to their gesture, end events return to `Default`,
//! everything else keeps the current behavior. A start while another
//! gesture is active simply switches: the last start wins.

use crate::events::{CanvasEvent, EdgeEvent, GraphEvent, NodeEvent};
use crate::reducers::ReducerContext;
use crate::state::{Behavior, GraphState};
use dag_core::Features;

pub fn next_behavior(current: Behavior, event: &GraphEvent) -> Behavior {
    match event {
        GraphEvent::Node(NodeEvent::DragStart { .. }) => Behavior::Dragging,
        GraphEvent::Edge(EdgeEvent::ConnectStart { .. }) => Behavior::Connecting,
        GraphEvent::Canvas(CanvasEvent::SelectStart { .. }) => Behavior::MultiSelect,
        GraphEvent::Canvas(CanvasEvent::DragStart { .. }) => Behavior::Panning,
        GraphEvent::Canvas(CanvasEvent::DraggingNodeFromItemPanelStart) => Behavior::AddingNode,
        GraphEvent::Node(NodeEvent::DragEnd { .. })
        | GraphEvent::Edge(EdgeEvent::ConnectEnd { .. })
        | GraphEvent::Canvas(CanvasEvent::SelectEnd)
        | GraphEvent::Canvas(CanvasEvent::DragEnd)
        | GraphEvent::Canvas(CanvasEvent::DraggingNodeFromItemPanelEnd { .. }) => Behavior::Default,
        _ => current,
    }
}

pub fn behavior_reducer(state: GraphState, event: &GraphEvent, ctx: &ReducerContext) -> GraphState {
    // Node drags stay inert when nodes are not draggable.
    if let GraphEvent::Node(NodeEvent::DragStart { .. }) = event
        && !ctx.has(Features::NODE_DRAGGABLE)
    {
        return state;
    }
    let behavior = next_behavior(state.behavior, event);
    if behavior == state.behavior {
        return state;
    }
    log::debug!("behavior {:?} -> {behavior:?}", state.behavior);
    GraphState { behavior, ..state }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RawInput;
    use dag_core::Id;
    use pretty_assertions::assert_eq;

    fn drag_start() -> GraphEvent {
        NodeEvent::DragStart {
            node: Id::intern("n"),
            raw: RawInput::default(),
            is_multi_select: false,
        }
        .into()
    }

    #[test]
    fn transition_table() {
        let cases: Vec<(GraphEvent, Behavior)> = vec![
            (drag_start(), Behavior::Dragging),
            (
                EdgeEvent::ConnectStart {
                    node: Id::intern("n"),
                    port: None,
                    raw: RawInput::default(),
                }
                .into(),
                Behavior::Connecting,
            ),
            (CanvasEvent::SelectStart { raw: RawInput::default() }.into(), Behavior::MultiSelect),
            (CanvasEvent::DragStart { raw: RawInput::default() }.into(), Behavior::Panning),
            (CanvasEvent::DraggingNodeFromItemPanelStart.into(), Behavior::AddingNode),
        ];
        for (event, expected) in cases {
            assert_eq!(next_behavior(Behavior::Default, &event), expected, "{event:?}");
        }

        let ends: Vec<GraphEvent> = vec![
            NodeEvent::DragEnd { is_drag_canceled: false }.into(),
            EdgeEvent::ConnectEnd { is_cancel: true }.into(),
            CanvasEvent::SelectEnd.into(),
            CanvasEvent::DragEnd.into(),
            CanvasEvent::DraggingNodeFromItemPanelEnd { node: None }.into(),
        ];
        for event in ends {
            assert_eq!(next_behavior(Behavior::Dragging, &event), Behavior::Default, "{event:?}");
        }
    }

    #[test]
    fn unrelated_events_keep_behavior() {
        assert_eq!(
            next_behavior(Behavior::Panning, &CanvasEvent::Undo.into()),
            Behavior::Panning
        );
    }

    #[test]
    fn last_start_wins() {
        let b = next_behavior(Behavior::Default, &drag_start());
        let b = next_behavior(b, &CanvasEvent::DragStart { raw: RawInput::default() }.into());
        assert_eq!(b, Behavior::Panning);
    }

    #[test]
    fn node_drag_start_needs_draggable_nodes() {
        let ctx = ReducerContext {
            features: Features::default_features() - Features::NODE_DRAGGABLE,
            ..ReducerContext::default()
        };
        let state = GraphState::default();
        let next = behavior_reducer(state.clone(), &drag_start(), &ctx);
        assert!(next.ptr_eq(&state));
        assert_eq!(next.behavior, Behavior::Default);
    }

    #[test]
    fn redundant_start_keeps_identity() {
        let ctx = ReducerContext::default();
        let state = behavior_reducer(GraphState::default(), &drag_start(), &ctx);
        assert_eq!(state.behavior, Behavior::Dragging);
        let again = behavior_reducer(state.clone(), &drag_start(), &ctx);
        assert!(again.ptr_eq(&state));
    }
}
