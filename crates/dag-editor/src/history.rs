//! Undo/Redo history of graph snapshots.
//!
//! Every recordable change pushes the previous present onto `past` and
//! clears `future`. Snapshots are persistent `GraphModel`s, so an entry
//! costs a handful of `Arc` clones rather than a deep copy.
//!
//! Gestures (drag, resize) never push intermediate frames: reducers keep
//! the in-flight preview in the overlay and push once at commit.

use dag_core::GraphModel;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct History {
    /// Oldest first.
    past: Arc<Vec<GraphModel>>,
    present: GraphModel,
    /// Next redo last.
    future: Arc<Vec<GraphModel>>,
    /// Maximum undo depth. `None` = unbounded.
    max_depth: Option<usize>,
}

impl History {
    pub fn new(present: GraphModel) -> Self {
        Self {
            past: Arc::default(),
            present,
            future: Arc::default(),
            max_depth: None,
        }
    }

    pub fn with_limit(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self.trim();
        self
    }

    pub fn present(&self) -> &GraphModel {
        &self.present
    }

    pub fn past(&self) -> &[GraphModel] {
        &self.past
    }

    pub fn future(&self) -> &[GraphModel] {
        &self.future
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn ptr_eq(&self, other: &History) -> bool {
        self.present.ptr_eq(&other.present)
            && Arc::ptr_eq(&self.past, &other.past)
            && Arc::ptr_eq(&self.future, &other.future)
    }

    /// Record `next` as the new present.
    pub fn push(&self, next: GraphModel) -> Self {
        self.push_with(next, GraphModel::clone)
    }

    /// Record `next`, storing `past_mapper(present)` on the undo stack.
    /// Pushing the unchanged present is a no-op.
    pub fn push_with(&self, next: GraphModel, past_mapper: impl FnOnce(&GraphModel) -> GraphModel) -> Self {
        if next.ptr_eq(&self.present) {
            return self.clone();
        }
        let mut h = self.clone();
        Arc::make_mut(&mut h.past).push(past_mapper(&self.present));
        h.present = next;
        if !h.future.is_empty() {
            h.future = Arc::default();
        }
        h.trim();
        log::debug!("history push: {} undo / 0 redo", h.past.len());
        h
    }

    /// Replace the present without touching the stacks.
    pub fn replace_present(&self, present: GraphModel) -> Self {
        if present.ptr_eq(&self.present) {
            return self.clone();
        }
        Self {
            present,
            ..self.clone()
        }
    }

    pub fn undo(&self) -> Self {
        let Some(prev) = self.past.last() else {
            return self.clone();
        };
        let mut h = self.clone();
        h.present = prev.clone();
        Arc::make_mut(&mut h.past).pop();
        Arc::make_mut(&mut h.future).push(self.present.clone());
        log::debug!("undo: {} undo / {} redo", h.past.len(), h.future.len());
        h
    }

    pub fn redo(&self) -> Self {
        let Some(next) = self.future.last() else {
            return self.clone();
        };
        let mut h = self.clone();
        h.present = next.clone();
        Arc::make_mut(&mut h.future).pop();
        Arc::make_mut(&mut h.past).push(self.present.clone());
        log::debug!("redo: {} undo / {} redo", h.past.len(), h.future.len());
        h
    }

    /// Discard both stacks and seed the present.
    pub fn reset(&self, present: GraphModel) -> Self {
        Self {
            past: Arc::default(),
            present,
            future: Arc::default(),
            max_depth: self.max_depth,
        }
    }

    fn trim(&mut self) {
        if let Some(max) = self.max_depth
            && self.past.len() > max
        {
            let excess = self.past.len() - max;
            Arc::make_mut(&mut self.past).drain(..excess);
        }
    }
}
