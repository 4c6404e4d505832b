//! Reducer pipeline.
//!
//! Each reducer folds one event into the state and returns the next state.
//! Events a reducer does not handle come back untouched, so a full pass over
//! an unknown event leaves the state [`GraphState::ptr_eq`] to its input.

pub mod canvas;
pub mod connect;
pub mod edge;
pub mod node;
pub mod selection;
pub mod viewport;

use crate::behavior::behavior_reducer;
use crate::events::GraphEvent;
use crate::state::GraphState;
use dag_core::{EditorSettings, Features, GraphConfig};
use std::sync::Arc;

/// Read-only configuration handed to every reducer.
#[derive(Debug, Clone, Default)]
pub struct ReducerContext {
    pub graph_config: Arc<GraphConfig>,
    pub features: Features,
    pub settings: EditorSettings,
}

impl ReducerContext {
    pub fn has(&self, feature: Features) -> bool {
        self.features.contains(feature)
    }
}

pub type BuiltinReducer = fn(GraphState, &GraphEvent, &ReducerContext) -> GraphState;

/// The built-in reducers in application order.
pub const BUILTIN_REDUCERS: [(&str, BuiltinReducer); 7] = [
    ("behavior", behavior_reducer),
    ("viewport", viewport::viewport_reducer),
    ("node", node::node_reducer),
    ("edge", edge::edge_reducer),
    ("canvas", canvas::canvas_reducer),
    ("connect", connect::connect_reducer),
    ("selection", selection::selection_reducer),
];

/// A consumer-supplied step in the pipeline.
pub trait Reducer {
    fn reduce(&self, state: GraphState, event: &GraphEvent, ctx: &ReducerContext) -> GraphState;
}

impl<F> Reducer for F
where
    F: Fn(GraphState, &GraphEvent, &ReducerContext) -> GraphState,
{
    fn reduce(&self, state: GraphState, event: &GraphEvent, ctx: &ReducerContext) -> GraphState {
        self(state, event, ctx)
    }
}

/// Built-in reducers wrapped by optional middleware.
#[derive(Default)]
pub struct ReducerPipeline {
    before: Vec<Box<dyn Reducer>>,
    after: Vec<Box<dyn Reducer>>,
}

impl ReducerPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `reducer` before the built-ins.
    pub fn with_before(mut self, reducer: impl Reducer + 'static) -> Self {
        self.before.push(Box::new(reducer));
        self
    }

    /// Run `reducer` after the built-ins.
    pub fn with_after(mut self, reducer: impl Reducer + 'static) -> Self {
        self.after.push(Box::new(reducer));
        self
    }

    pub fn reduce(&self, state: GraphState, event: &GraphEvent, ctx: &ReducerContext) -> GraphState {
        let mut state = state;
        for r in &self.before {
            state = r.reduce(state, event, ctx);
        }
        for (name, reducer) in BUILTIN_REDUCERS {
            let prev = state.clone();
            state = reducer(state, event, ctx);
            if !state.ptr_eq(&prev) {
                log::trace!("{name} reducer changed state");
            }
        }
        for r in &self.after {
            state = r.reduce(state, event, ctx);
        }
        state
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::events::{CanvasEvent, EdgeEvent, MinimapEvent, NodeEvent, RawInput};
    use dag_core::Id;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn unknown_events_pass_through_every_builtin() {
        let state = state();
        let event = GraphEvent::Custom {
            name: "plugin".into(),
            payload: serde_json::Value::Null,
        };
        for (name, reducer) in BUILTIN_REDUCERS {
            let next = reducer(state.clone(), &event, &ctx());
            assert!(next.ptr_eq(&state), "{name} reducer changed state");
        }
    }

    #[test]
    fn unhandled_events_leave_other_reducers_alone() {
        let a = Id::intern("a");
        let ab = Id::intern("ab");
        let raw = RawInput::pointer(10.0, 10.0);
        let cases: Vec<(GraphEvent, Vec<&str>)> = vec![
            (MinimapEvent::Pan { dx: 10.0, dy: 0.0 }.into(), vec!["viewport"]),
            (MinimapEvent::PanStart { raw: raw.clone() }.into(), vec![]),
            (MinimapEvent::PanEnd.into(), vec![]),
            (MinimapEvent::Click { raw: raw.clone() }.into(), vec![]),
            (NodeEvent::PointerEnter { node: a, raw: raw.clone() }.into(), vec!["node"]),
            (NodeEvent::PointerLeave { node: a, raw: raw.clone() }.into(), vec![]),
            (EdgeEvent::MouseMove { edge: ab, raw: raw.clone() }.into(), vec![]),
            (EdgeEvent::MouseOver { edge: ab, raw: raw.clone() }.into(), vec![]),
            (CanvasEvent::MouseMove { raw: raw.clone() }.into(), vec![]),
            (CanvasEvent::MouseOut { raw }.into(), vec![]),
        ];
        let ctx = ctx_with(Features::default_features());
        let state = state();
        for (event, handlers) in &cases {
            for (name, reducer) in BUILTIN_REDUCERS {
                let next = reducer(state.clone(), event, &ctx);
                assert_eq!(
                    !next.ptr_eq(&state),
                    handlers.contains(&name),
                    "{name} reducer on {event:?}"
                );
            }
        }
    }

    #[test]
    fn middleware_wraps_builtins() {
        let order = Rc::new(Cell::new(0u8));
        let (o1, o2) = (order.clone(), order.clone());
        let pipeline = ReducerPipeline::new()
            .with_before(move |s: GraphState, _: &GraphEvent, _: &ReducerContext| {
                assert_eq!(o1.get(), 0);
                o1.set(1);
                s
            })
            .with_after(move |s: GraphState, _: &GraphEvent, _: &ReducerContext| {
                assert_eq!(o2.get(), 1);
                o2.set(2);
                s
            });
        let state = state();
        let next = pipeline.reduce(state.clone(), &GraphEvent::Canvas(CanvasEvent::SelectEnd), &ctx());
        assert_eq!(order.get(), 2);
        assert_eq!(next.behavior, state.behavior);
    }
}
