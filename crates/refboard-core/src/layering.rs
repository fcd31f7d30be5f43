//! Z-index reassignment for bring/send operations.
//!
//! z-index values only carry relative order; they need not be contiguous or
//! unique. Each function returns true if at least one listed element exists,
//! and never touches elements that are not listed.

use crate::document::BoardDocument;
use crate::element::ElementId;

/// Place the listed elements above everything, keeping their input order.
pub fn bring_to_front(doc: &mut BoardDocument, ids: &[ElementId]) -> bool {
    let targets = existing_unique(doc, ids);
    let Some(max) = doc.max_z() else {
        return false;
    };
    for (i, id) in targets.iter().enumerate() {
        if let Some(el) = doc.get_mut(*id) {
            el.z_index = max.saturating_add(1).saturating_add(i as i64);
            el.touch();
        }
    }
    !targets.is_empty()
}

/// Place the listed elements below everything, keeping their input order.
pub fn send_to_back(doc: &mut BoardDocument, ids: &[ElementId]) -> bool {
    let targets = existing_unique(doc, ids);
    let Some(min) = doc.min_z() else {
        return false;
    };
    let count = targets.len() as i64;
    for (i, id) in targets.iter().enumerate() {
        if let Some(el) = doc.get_mut(*id) {
            el.z_index = min.saturating_sub(count).saturating_add(i as i64);
            el.touch();
        }
    }
    !targets.is_empty()
}

/// Raise each listed element by one.
pub fn bring_forward(doc: &mut BoardDocument, ids: &[ElementId]) -> bool {
    shift(doc, ids, 1)
}

/// Lower each listed element by one.
pub fn send_backward(doc: &mut BoardDocument, ids: &[ElementId]) -> bool {
    shift(doc, ids, -1)
}

fn shift(doc: &mut BoardDocument, ids: &[ElementId], delta: i64) -> bool {
    let targets = existing_unique(doc, ids);
    for id in &targets {
        if let Some(el) = doc.get_mut(*id) {
            el.z_index = el.z_index.saturating_add(delta);
            el.touch();
        }
    }
    !targets.is_empty()
}

/// Ids that exist in the document, first occurrence only, in input order.
fn existing_unique(doc: &BoardDocument, ids: &[ElementId]) -> Vec<ElementId> {
    let mut out: Vec<ElementId> = Vec::with_capacity(ids.len());
    for &id in ids {
        if doc.contains(id) && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
