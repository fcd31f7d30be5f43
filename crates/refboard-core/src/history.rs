//! Undo/redo history over element snapshots.

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::element::BoardElement;
use std::collections::VecDeque;
use std::sync::Arc;

/// An immutable copy of the full element collection.
///
/// Elements are shared with the live document until one of them is mutated.
pub type Snapshot = Arc<[Arc<BoardElement>]>;

/// Bounded list of snapshots with a pointer to the current one.
///
/// The list always holds at least one snapshot once [`History::reset`] has
/// been called; undo and redo move the pointer without adding entries.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<Snapshot>,
    pointer: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    /// Create a history holding a single empty snapshot.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(Snapshot::from(Vec::new()));
        Self {
            snapshots,
            pointer: 0,
            capacity: capacity.max(1),
        }
    }

    /// Drop everything and start over from `initial` (snapshot 0).
    pub fn reset(&mut self, initial: Snapshot) {
        self.snapshots.clear();
        self.snapshots.push_back(initial);
        self.pointer = 0;
    }

    /// Record a new snapshot after the current one.
    ///
    /// Any redo branch is discarded. At capacity the oldest snapshot is
    /// dropped so the length stays constant.
    pub fn save(&mut self, snapshot: Snapshot) {
        self.snapshots.truncate(self.pointer + 1);
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.pointer = self.snapshots.len() - 1;
        log::debug!(
            "History saved: {} of {} snapshots",
            self.pointer + 1,
            self.snapshots.len()
        );
    }

    /// Step back. Returns the snapshot to restore, if any.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.pointer -= 1;
        self.current()
    }

    /// Step forward. Returns the snapshot to restore, if any.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.pointer += 1;
        self.current()
    }

    /// Whether the pointer can move back.
    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    /// Whether the pointer can move forward.
    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.snapshots.len()
    }

    /// The snapshot the pointer is on.
    pub fn current(&self) -> Option<Snapshot> {
        self.snapshots.get(self.pointer).cloned()
    }

    /// Index of the current snapshot.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true before the first reset.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Maximum number of stored snapshots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use uuid::Uuid;

    fn snapshot_with(n: usize) -> Snapshot {
        (0..n)
            .map(|i| {
                Arc::new(BoardElement::new(
                    Uuid::nil(),
                    ElementKind::Rectangle,
                    i as f64,
                    0.0,
                ))
            })
            .collect()
    }

    #[test]
    fn test_new_history_has_one_snapshot() {
        let history = History::default();
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_pointer() {
        let mut history = History::default();
        history.reset(snapshot_with(0));
        history.save(snapshot_with(1));
        history.save(snapshot_with(2));

        assert_eq!(history.undo().unwrap().len(), 1);
        assert_eq!(history.undo().unwrap().len(), 0);
        assert!(history.undo().is_none());
        assert_eq!(history.redo().unwrap().len(), 1);
        assert_eq!(history.redo().unwrap().len(), 2);
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_save_truncates_redo_branch() {
        let mut history = History::default();
        history.save(snapshot_with(1));
        history.save(snapshot_with(2));
        history.undo();
        history.undo();
        history.save(snapshot_with(3));

        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.current().unwrap().len(), 3);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::with_capacity(50);
        for i in 0..49 {
            history.save(snapshot_with(i + 1));
        }
        assert_eq!(history.len(), 50);

        history.save(snapshot_with(100));
        assert_eq!(history.len(), 50);
        assert_eq!(history.pointer(), 49);

        // The original empty snapshot is gone; the oldest is now the first save.
        while history.can_undo() {
            history.undo();
        }
        assert_eq!(history.current().unwrap().len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut history = History::default();
        history.save(snapshot_with(1));
        history.reset(snapshot_with(3));
        assert_eq!(history.len(), 1);
        assert_eq!(history.pointer(), 0);
        assert_eq!(history.current().unwrap().len(), 3);
    }
}
