//! Selection of board elements.

use crate::element::ElementId;
use std::collections::HashSet;

/// The set of currently selected element ids.
///
/// Callers keep it a subset of the document's ids; the session prunes it on
/// delete and clears it on undo/redo. No ordering is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: HashSet<ElementId>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select an element. Without `append` the selection becomes `{id}`;
    /// with `append` the id's membership is toggled.
    pub fn select(&mut self, id: ElementId, append: bool) {
        if append {
            if !self.selected.remove(&id) {
                self.selected.insert(id);
            }
        } else {
            self.selected.clear();
            self.selected.insert(id);
        }
    }

    /// Replace the selection wholesale (box-select).
    pub fn set(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.selected = ids.into_iter().collect();
    }

    /// Select nothing.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop ids for which `exists` returns false.
    pub fn retain_existing(&mut self, exists: impl Fn(ElementId) -> bool) {
        self.selected.retain(|&id| exists(id));
    }

    /// Whether `id` is selected.
    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected ids in no particular order.
    pub fn ids(&self) -> Vec<ElementId> {
        self.selected.iter().copied().collect()
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_select_replaces() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.select(a, false);
        selection.select(b, false);
        assert_eq!(selection.ids(), vec![b]);
    }

    #[test]
    fn test_append_toggles() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.select(a, false);
        selection.select(b, true);
        assert_eq!(selection.len(), 2);

        selection.select(a, true);
        assert!(!selection.is_selected(a));
        assert!(selection.is_selected(b));
    }

    #[test]
    fn test_retain_existing() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.set([a, b]);
        selection.retain_existing(|id| id == a);
        assert_eq!(selection.ids(), vec![a]);
    }
}
