//! Props API: the programmatic face of the editor.
//!
//! `GraphEditor` owns the current `GraphState`, the reducer pipeline and the
//! event channel. Every method is a thin wrapper that triggers an event on
//! the channel; the editor's own subscription (always the first one) folds
//! it through the pipeline, so external subscribers observe events after
//! the state has been updated.

use crate::channel::{EventChannel, Subscription};
use crate::events::{CanvasEvent, EdgeEvent, GraphEvent, NodeEvent, RawInput, Updater};
use crate::reducers::{ReducerContext, ReducerPipeline};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::state::GraphState;
use dag_core::{Edge, Features, GraphData, GraphModel, Id, ItemState, Node, Point};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

type ChangeListener = Rc<dyn Fn(&GraphState, &GraphState)>;

struct Store {
    state: GraphState,
    pipeline: ReducerPipeline,
    ctx: ReducerContext,
}

pub struct GraphEditor {
    store: Rc<RefCell<Store>>,
    listeners: Rc<RefCell<Vec<ChangeListener>>>,
    channel: Rc<EventChannel>,
    clipboard: RefCell<Option<GraphData>>,
    _subscription: Subscription,
}

impl GraphEditor {
    /// An editor with default features, settings and shapes.
    pub fn new(model: GraphModel) -> Self {
        Self::with_context(model, ReducerContext::default(), ReducerPipeline::new())
    }

    pub fn with_context(model: GraphModel, ctx: ReducerContext, pipeline: ReducerPipeline) -> Self {
        let mut state = GraphState::new(model);
        state.data = state.data.with_limit(ctx.settings.history_limit);
        let channel = Rc::new(EventChannel::new(ctx.settings.max_nesting));
        let store = Rc::new(RefCell::new(Store { state, pipeline, ctx }));
        let listeners: Rc<RefCell<Vec<ChangeListener>>> = Rc::default();

        let subscription = {
            let store = store.clone();
            let listeners = listeners.clone();
            channel.subscribe(move |event| {
                let (prev, next) = {
                    let s = store.borrow();
                    let prev = s.state.clone();
                    let next = s.pipeline.reduce(prev.clone(), event, &s.ctx);
                    (prev, next)
                };
                if next.ptr_eq(&prev) {
                    return;
                }
                store.borrow_mut().state = next.clone();
                // Listeners may dispatch again; release every borrow first.
                let snapshot: Vec<ChangeListener> = listeners.borrow().clone();
                for listener in snapshot {
                    listener(&next, &prev);
                }
            })
        };

        Self {
            store,
            listeners,
            channel,
            clipboard: RefCell::new(None),
            _subscription: subscription,
        }
    }

    // ─── Plumbing ────────────────────────────────────────────────────────

    pub fn get_event_channel(&self) -> Rc<EventChannel> {
        self.channel.clone()
    }

    /// Trigger `event` on the channel.
    pub fn dispatch(&self, event: impl Into<GraphEvent>) {
        self.channel.trigger(event.into());
    }

    /// Called with `(next, prev)` after every dispatch that changed the state.
    pub fn on_change(&self, listener: impl Fn(&GraphState, &GraphState) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> GraphState {
        self.store.borrow().state.clone()
    }

    pub fn features(&self) -> Features {
        self.store.borrow().ctx.features
    }

    /// Switch capabilities at runtime (e.g. into read-only mode).
    pub fn set_features(&self, features: Features) {
        self.store.borrow_mut().ctx.features = features;
    }

    pub fn context(&self) -> ReducerContext {
        self.store.borrow().ctx.clone()
    }

    // ─── Data ────────────────────────────────────────────────────────────

    pub fn get_data(&self) -> GraphModel {
        self.store.borrow().state.present().clone()
    }

    /// Replace the whole graph and reset the undo stack.
    pub fn set_data(&self, model: GraphModel) {
        self.dispatch(CanvasEvent::SetData { data: model });
    }

    /// Transform the present graph, optionally as an undoable step.
    pub fn update_data(&self, f: impl Fn(&GraphModel) -> GraphModel + 'static, should_record: bool) {
        self.dispatch(CanvasEvent::UpdateData {
            updater: Updater::new(f),
            should_record,
        });
    }

    pub fn reset_undo_stack(&self) {
        self.dispatch(CanvasEvent::ResetUndoStack);
    }

    pub fn add_node(&self, node: Node) {
        self.dispatch(NodeEvent::Add { node });
    }

    pub fn add_edge(&self, edge: Edge) {
        self.dispatch(EdgeEvent::Add { edge });
    }

    // ─── Edit ────────────────────────────────────────────────────────────

    pub fn delete(&self) {
        self.dispatch(CanvasEvent::Delete);
    }

    pub fn undo(&self) {
        self.dispatch(CanvasEvent::Undo);
    }

    pub fn redo(&self) {
        self.dispatch(CanvasEvent::Redo);
    }

    pub fn can_undo(&self) -> bool {
        self.store.borrow().state.data.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.store.borrow().state.data.can_redo()
    }

    /// Copy the selected nodes and the edges between them.
    ///
    /// The result carries fresh ids and sits `paste_spacing` down and right
    /// of the originals, so pasting it without a cursor fans out.
    pub fn copy(&self) -> GraphData {
        let spacing = self.store.borrow().ctx.settings.paste_spacing;
        let model = self.get_data();
        let selection = GraphData {
            nodes: model.selected_nodes().cloned().collect(),
            edges: model
                .edges()
                .filter(|e| {
                    let selected = |id| model.node(id).is_some_and(|n| n.state.is_selected());
                    selected(e.source) && selected(e.target)
                })
                .cloned()
                .collect(),
            groups: Vec::new(),
        };
        let copied = duplicate(&selection, spacing);
        log::debug!("copy {} nodes, {} edges", copied.nodes.len(), copied.edges.len());
        *self.clipboard.borrow_mut() = Some(copied.clone());
        copied
    }

    /// Paste `data`, placing its first node at the client `position` if given.
    pub fn paste(&self, data: GraphData, position: Option<Point>) {
        self.dispatch(CanvasEvent::Paste { data, position });
    }

    /// Paste what the last `copy` stored. The clipboard then moves on by
    /// another spacing step with fresh ids.
    pub fn paste_clipboard(&self, position: Option<Point>) {
        let Some(data) = self.clipboard.borrow().clone() else {
            return;
        };
        let spacing = self.store.borrow().ctx.settings.paste_spacing;
        *self.clipboard.borrow_mut() = Some(duplicate(&data, spacing));
        self.paste(data, position);
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Exclusively select the given nodes.
    pub fn select_nodes(&self, ids: &[Id]) {
        let ids = ids.to_vec();
        self.update_data(move |m| m.select_nodes(|n| ids.contains(&n.id)), false);
    }

    pub fn select_all(&self) {
        self.dispatch(NodeEvent::SelectAll);
    }

    pub fn reset_selection(&self) {
        self.dispatch(CanvasEvent::ResetSelection);
    }

    /// Exclusively select a node, or a port on it.
    pub fn navigate(&self, node: Id, port: Option<Id>) {
        self.dispatch(CanvasEvent::Navigate { node, port });
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    /// Center the canvas point `(x, y)` in the viewport.
    pub fn scroll_into_view(&self, x: f32, y: f32) {
        self.dispatch(CanvasEvent::ScrollIntoView { x, y, position: None });
    }

    /// Zoom by `scale` around the viewport center.
    pub fn zoom(&self, scale: f32) {
        self.dispatch(CanvasEvent::Zoom { scale, anchor: None });
    }

    pub fn zoom_to(&self, value: f32) {
        self.dispatch(CanvasEvent::ZoomTo { value });
    }

    pub fn zoom_to_fit(&self) {
        self.dispatch(CanvasEvent::ZoomToFit);
    }

    pub fn reset_viewport(&self) {
        self.dispatch(CanvasEvent::ResetViewport);
    }

    /// Center one node, or frame several.
    pub fn centralize(&self, nodes: Vec<Id>) {
        self.dispatch(NodeEvent::Centralize { nodes });
    }

    /// Bring one node's position to `position` (or the center), or frame several.
    pub fn locate(&self, nodes: Vec<Id>, position: Option<Point>) {
        self.dispatch(NodeEvent::Locate { nodes, position });
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Track the key, then run its shortcut when keyboard shortcuts are on.
    pub fn handle_key_down(&self, raw: RawInput) -> Option<ShortcutAction> {
        let key = raw.key.clone();
        let modifiers = raw.modifiers;
        self.dispatch(CanvasEvent::KeyDown { raw });
        if !self.features().contains(Features::KEYBOARD_SHORTCUTS) {
            return None;
        }
        let action = ShortcutMap::resolve(key.as_deref()?, &modifiers)?;
        log::debug!("shortcut {action:?}");
        let step = self.store.borrow().ctx.settings.zoom_step;
        match action {
            ShortcutAction::Delete => self.delete(),
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::SelectAll => self.select_all(),
            ShortcutAction::Copy => {
                self.copy();
            }
            ShortcutAction::Paste => self.paste_clipboard(None),
            ShortcutAction::ZoomIn => self.zoom(1.0 + step),
            ShortcutAction::ZoomOut => self.zoom(1.0 / (1.0 + step)),
            ShortcutAction::ZoomToFit => self.zoom_to_fit(),
            ShortcutAction::Deselect => self.reset_selection(),
        }
        Some(action)
    }

    pub fn handle_key_up(&self, raw: RawInput) {
        self.dispatch(CanvasEvent::KeyUp { raw });
    }
}

/// Re-issue ids (remapping edge endpoints) and shift every node by `spacing`.
fn duplicate(data: &GraphData, spacing: f32) -> GraphData {
    let fresh = data.reissue_ids(|_| true, |_| true);
    let nodes: Vec<Node> = fresh
        .nodes
        .into_iter()
        .map(|n| Node {
            x: n.x + spacing,
            y: n.y + spacing,
            state: ItemState::empty(),
            ..n
        })
        .collect();
    let copied: HashSet<Id> = nodes.iter().map(|n| n.id).collect();
    let edges = fresh
        .edges
        .into_iter()
        .filter(|e| copied.contains(&e.source) && copied.contains(&e.target))
        .map(|e| Edge {
            state: ItemState::empty(),
            ..e
        })
        .collect();
    GraphData {
        nodes,
        edges,
        groups: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn editor() -> GraphEditor {
        let model = GraphModel::new()
            .insert_node(Node::new("a", 0.0, 0.0).sized(100.0, 40.0))
            .insert_node(Node::new("b", 200.0, 0.0).sized(100.0, 40.0))
            .insert_node(Node::new("c", 400.0, 0.0).sized(100.0, 40.0))
            .insert_edge(Edge::new("ab", "a", "b"));
        GraphEditor::new(model)
    }

    #[test]
    fn on_change_skips_identity_dispatches() {
        let editor = editor();
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        editor.on_change(move |next, prev| {
            assert!(!next.ptr_eq(prev));
            seen.set(seen.get() + 1);
        });
        editor.reset_selection();
        assert_eq!(calls.get(), 0);
        editor.select_all();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn copy_remaps_ids_and_offsets() {
        let editor = editor();
        editor.select_nodes(&[Id::intern("a"), Id::intern("b")]);
        let copied = editor.copy();
        assert_eq!(copied.nodes.len(), 2);
        assert_eq!(copied.edges.len(), 1);
        let ids: Vec<Id> = copied.nodes.iter().map(|n| n.id).collect();
        assert!(!ids.contains(&Id::intern("a")));
        let edge = &copied.edges[0];
        assert!(ids.contains(&edge.source) && ids.contains(&edge.target));
        assert_eq!((copied.nodes[0].x, copied.nodes[0].y), (50.0, 50.0));
        assert!(copied.nodes.iter().all(|n| n.state.is_empty()));
    }

    #[test]
    fn select_nodes_does_not_record() {
        let editor = editor();
        editor.select_nodes(&[Id::intern("c")]);
        assert!(!editor.can_undo());
        let data = editor.get_data();
        let selected: Vec<&str> = data.selected_nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(selected, vec!["c"]);
    }

    #[test]
    fn listener_may_dispatch() {
        let editor = Rc::new(editor());
        let weak = Rc::downgrade(&editor);
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        editor.on_change(move |next, _| {
            if next.present().selected_nodes().count() == 3
                && let Some(editor) = weak.upgrade()
            {
                flag.set(true);
                editor.reset_selection();
            }
        });
        editor.select_all();
        assert!(fired.get());
        assert_eq!(editor.get_data().selected_nodes().count(), 0);
    }
}
