//! Element repository: the working copy of a board's elements.

use crate::element::{BoardElement, ElementId};
use crate::history::Snapshot;
use kurbo::Rect;
use std::sync::Arc;

/// The in-memory element collection of one board.
///
/// Elements are stored behind `Arc` so history snapshots share unchanged
/// elements. Mutable access goes through `Arc::make_mut`, which copies an
/// element only if a snapshot still holds it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardDocument {
    /// Elements in insertion order.
    elements: Vec<Arc<BoardElement>>,
}

impl BoardDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from loaded elements. Later duplicates of an id are dropped.
    pub fn from_elements(elements: impl IntoIterator<Item = BoardElement>) -> Self {
        let mut doc = Self::new();
        for element in elements {
            if !doc.insert(element) {
                log::warn!("Dropping element with duplicate id while loading");
            }
        }
        doc
    }

    /// Take a snapshot of the current content.
    pub fn snapshot(&self) -> Snapshot {
        self.elements.iter().cloned().collect()
    }

    /// Replace the whole content with a snapshot.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.elements = snapshot.to_vec();
    }

    /// Insert an element. Returns false if its id is already present.
    pub fn insert(&mut self, element: BoardElement) -> bool {
        if self.contains(element.id()) {
            return false;
        }
        self.elements.push(Arc::new(element));
        true
    }

    /// Remove every element whose id is listed. Returns the removed elements.
    pub fn remove_many(&mut self, ids: &[ElementId]) -> Vec<Arc<BoardElement>> {
        let mut removed = Vec::new();
        self.elements.retain(|el| {
            if ids.contains(&el.id()) {
                removed.push(Arc::clone(el));
                false
            } else {
                true
            }
        });
        removed
    }

    /// Whether an element with `id` exists.
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|el| el.id() == id)
    }

    /// Get an element by id.
    pub fn get(&self, id: ElementId) -> Option<&BoardElement> {
        self.elements
            .iter()
            .find(|el| el.id() == id)
            .map(|el| el.as_ref())
    }

    /// Get a mutable element by id, detaching it from any snapshot.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut BoardElement> {
        self.elements
            .iter_mut()
            .find(|el| el.id() == id)
            .map(Arc::make_mut)
    }

    /// Iterate elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BoardElement> {
        self.elements.iter().map(|el| el.as_ref())
    }

    /// Shared handles to every element, for handing off to async work.
    pub fn shared(&self) -> Vec<Arc<BoardElement>> {
        self.elements.clone()
    }

    /// All element ids in insertion order.
    pub fn ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(|el| el.id()).collect()
    }

    /// Existing elements among `ids`, in the order given. Unknown ids are skipped.
    pub fn resolve(&self, ids: &[ElementId]) -> Vec<&BoardElement> {
        ids.iter().filter_map(|&id| self.get(id)).collect()
    }

    /// Elements back to front. Equal z-indices keep insertion order.
    pub fn ordered_by_z(&self) -> Vec<&BoardElement> {
        let mut ordered: Vec<&BoardElement> = self.iter().collect();
        ordered.sort_by_key(|el| el.z_index);
        ordered
    }

    /// Highest z-index, or None for an empty document.
    pub fn max_z(&self) -> Option<i64> {
        self.iter().map(|el| el.z_index).max()
    }

    /// Lowest z-index, or None for an empty document.
    pub fn min_z(&self) -> Option<i64> {
        self.iter().map(|el| el.z_index).min()
    }

    /// z-index for an element placed above everything else.
    pub fn next_z(&self) -> i64 {
        self.max_z().map_or(0, |z| z.saturating_add(1))
    }

    /// Bounding box of all elements.
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(self.iter())
    }

    /// Bounding box of the listed elements.
    pub fn bounds_of(&self, ids: &[ElementId]) -> Option<Rect> {
        union_bounds(self.resolve(ids).into_iter())
    }

    /// Returns true if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Serialize the elements to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let elements: Vec<&BoardElement> = self.iter().collect();
        serde_json::to_string_pretty(&elements)
    }

    /// Deserialize elements from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let elements: Vec<BoardElement> = serde_json::from_str(json)?;
        Ok(Self::from_elements(elements))
    }
}

fn union_bounds<'a>(elements: impl Iterator<Item = &'a BoardElement>) -> Option<Rect> {
    elements.map(|el| el.bounds()).reduce(|acc, b| acc.union(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use uuid::Uuid;

    fn rect(x: f64, y: f64) -> BoardElement {
        BoardElement::new(Uuid::nil(), ElementKind::Rectangle, x, y).with_size(10.0, 10.0)
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut doc = BoardDocument::new();
        let el = rect(0.0, 0.0);
        assert!(doc.insert(el.clone()));
        assert!(!doc.insert(el));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_remove_many() {
        let a = rect(0.0, 0.0);
        let b = rect(10.0, 0.0);
        let (ida, idb) = (a.id(), b.id());
        let mut doc = BoardDocument::from_elements([a, b]);

        let removed = doc.remove_many(&[ida, Uuid::new_v4()]);
        assert_eq!(removed.len(), 1);
        assert_eq!(doc.ids(), vec![idb]);
    }

    #[test]
    fn test_snapshot_is_isolated_from_mutation() {
        let a = rect(0.0, 0.0);
        let id = a.id();
        let mut doc = BoardDocument::from_elements([a]);
        let snapshot = doc.snapshot();

        doc.get_mut(id).unwrap().position_x = 99.0;
        assert_eq!(snapshot[0].position_x, 0.0);

        doc.restore(&snapshot);
        assert_eq!(doc.get(id).unwrap().position_x, 0.0);
    }

    #[test]
    fn test_bounds() {
        let doc = BoardDocument::from_elements([rect(0.0, 0.0), rect(40.0, 20.0)]);
        assert_eq!(doc.bounds(), Some(Rect::new(0.0, 0.0, 50.0, 30.0)));
        assert_eq!(BoardDocument::new().bounds(), None);
    }

    #[test]
    fn test_ordered_by_z_is_stable() {
        let a = rect(0.0, 0.0).with_z_index(1);
        let b = rect(0.0, 0.0).with_z_index(0);
        let c = rect(0.0, 0.0).with_z_index(1);
        let ids = [a.id(), b.id(), c.id()];
        let doc = BoardDocument::from_elements([a, b, c]);

        let order: Vec<ElementId> = doc.ordered_by_z().iter().map(|el| el.id()).collect();
        assert_eq!(order, vec![ids[1], ids[0], ids[2]]);
        assert_eq!(doc.next_z(), 2);
    }

    #[test]
    fn test_json_roundtrip() {
        let doc = BoardDocument::from_elements([rect(1.0, 2.0), rect(3.0, 4.0)]);
        let json = doc.to_json().unwrap();
        let loaded = BoardDocument::from_json(&json).unwrap();
        assert_eq!(loaded, doc);
    }
}
