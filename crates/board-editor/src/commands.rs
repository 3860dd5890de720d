//! Undo/redo history.
//!
//! Every undoable step is a full graph [`Snapshot`] taken *before* the step.
//! Discrete actions (connect, paste, delete, import) call [`History::record`]
//! up front. Continuous gestures (drag, resize) use **gesture batching**: the
//! snapshot is captured at gesture start and pushed at gesture end only when
//! the graph content actually changed, so one drag is one undo step.

use board_core::store::{GraphStore, Snapshot};

/// Bounded two-stack snapshot history.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Maximum undo depth; the oldest entries are dropped first.
    max_depth: usize,
    /// Graph captured at the start of the active gesture.
    gesture: Option<Snapshot>,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(128)),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            gesture: None,
        }
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // New action invalidates the redo branch
        self.redo_stack.clear();
    }

    /// Push the current graph as an undo point.
    pub fn record(&mut self, store: &GraphStore) {
        self.push_undo(store.snapshot());
    }

    /// Capture the graph at the start of a gesture. Nested calls keep the
    /// outermost capture.
    pub fn begin_gesture(&mut self, store: &GraphStore) {
        if self.gesture.is_none() {
            self.gesture = Some(store.snapshot());
        }
    }

    /// Close the active gesture. Returns whether an undo entry was pushed.
    pub fn end_gesture(&mut self, store: &GraphStore) -> bool {
        let Some(before) = self.gesture.take() else {
            return false;
        };
        if before.same_content(&store.snapshot()) {
            return false;
        }
        self.push_undo(before);
        true
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    /// Restore the most recent undo point. The current graph moves to redo.
    pub fn undo(&mut self, store: &mut GraphStore) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(store.snapshot());
        store.restore(&snapshot);
        true
    }

    pub fn redo(&mut self, store: &mut GraphStore) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(store.snapshot());
        store.restore(&snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.gesture = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::id::NodeId;
    use board_core::model::*;

    fn store_with(id: &str) -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node(Node::new(
            NodeId::intern(id),
            Point::default(),
            Payload::markdown(""),
        ));
        store
    }

    fn move_to(store: &mut GraphStore, id: &str, x: f32) {
        store.patch_node(NodeId::intern(id), &NodePatch::position(Point::new(x, 0.0)));
    }

    #[test]
    fn gesture_without_change_pushes_nothing() {
        let mut store = store_with("hist_idle");
        let mut history = History::new(10);
        history.begin_gesture(&store);
        store.patch_node(NodeId::intern("hist_idle"), &NodePatch::draggable(true));
        assert!(!history.end_gesture(&store));
        assert!(!history.can_undo());
    }

    #[test]
    fn gesture_collapses_to_one_entry() {
        let mut store = store_with("hist_drag");
        let mut history = History::new(10);
        history.begin_gesture(&store);
        for x in 1..=20 {
            move_to(&mut store, "hist_drag", x as f32);
        }
        assert!(history.end_gesture(&store));
        assert_eq!(history.undo_depth(), 1);
        history.undo(&mut store);
        assert_eq!(store.nodes()[0].position, Point::default());
    }

    #[test]
    fn depth_is_bounded() {
        let mut store = store_with("hist_bound");
        let mut history = History::new(3);
        for x in 0..5 {
            history.record(&store);
            move_to(&mut store, "hist_bound", x as f32 + 1.0);
        }
        assert_eq!(history.undo_depth(), 3);
        while history.undo(&mut store) {}
        // The two oldest states were trimmed.
        assert_eq!(store.nodes()[0].position, Point::new(2.0, 0.0));
    }

    #[test]
    fn new_record_clears_redo() {
        let mut store = store_with("hist_branch");
        let mut history = History::new(10);
        history.record(&store);
        move_to(&mut store, "hist_branch", 5.0);
        history.undo(&mut store);
        assert!(history.can_redo());
        history.record(&store);
        assert!(!history.can_redo());
    }
}
