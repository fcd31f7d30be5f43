//! Alignment and distribution over a multi-element selection.
//!
//! Alignment needs at least two existing elements and distribution at least
//! three; below that every function is a silent no-op returning false.

use crate::document::BoardDocument;
use crate::element::{BoardElement, ElementId};

/// Minimum number of elements for alignment.
pub const MIN_ALIGN: usize = 2;
/// Minimum number of elements for distribution.
pub const MIN_DISTRIBUTE: usize = 3;

/// Alignment reference edge or center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Right,
    /// Horizontal centers on the mean center x.
    Center,
    Top,
    Bottom,
    /// Vertical centers on the mean center y.
    Middle,
}

/// Axis for distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn leading(self, el: &BoardElement) -> f64 {
        match self {
            Axis::Horizontal => el.position_x,
            Axis::Vertical => el.position_y,
        }
    }

    fn extent(self, el: &BoardElement) -> f64 {
        match self {
            Axis::Horizontal => el.width,
            Axis::Vertical => el.height,
        }
    }

    fn set_leading(self, el: &mut BoardElement, value: f64) {
        match self {
            Axis::Horizontal => el.position_x = value,
            Axis::Vertical => el.position_y = value,
        }
    }
}

/// Align the listed elements. Returns true if anything was aligned.
pub fn align(doc: &mut BoardDocument, ids: &[ElementId], alignment: Alignment) -> bool {
    let members = collect(doc, ids);
    if members.len() < MIN_ALIGN {
        return false;
    }

    let count = members.len() as f64;
    let reference = match alignment {
        Alignment::Left => members.iter().map(|m| m.x).fold(f64::INFINITY, f64::min),
        Alignment::Right => members
            .iter()
            .map(|m| m.x + m.width)
            .fold(f64::NEG_INFINITY, f64::max),
        Alignment::Center => members.iter().map(|m| m.x + m.width / 2.0).sum::<f64>() / count,
        Alignment::Top => members.iter().map(|m| m.y).fold(f64::INFINITY, f64::min),
        Alignment::Bottom => members
            .iter()
            .map(|m| m.y + m.height)
            .fold(f64::NEG_INFINITY, f64::max),
        Alignment::Middle => members.iter().map(|m| m.y + m.height / 2.0).sum::<f64>() / count,
    };

    for member in &members {
        let Some(el) = doc.get_mut(member.id) else {
            continue;
        };
        match alignment {
            Alignment::Left => el.position_x = reference,
            Alignment::Right => el.position_x = reference - el.width,
            Alignment::Center => el.position_x = reference - el.width / 2.0,
            Alignment::Top => el.position_y = reference,
            Alignment::Bottom => el.position_y = reference - el.height,
            Alignment::Middle => el.position_y = reference - el.height / 2.0,
        }
        el.touch();
    }
    true
}

/// Space the listed elements evenly along `axis`.
///
/// Elements are ordered by leading edge; the first and last stay put and
/// only the interior ones move, separated by equal gaps.
pub fn distribute(doc: &mut BoardDocument, ids: &[ElementId], axis: Axis) -> bool {
    let mut ordered: Vec<(ElementId, f64, f64)> = doc
        .resolve(&dedup(ids))
        .into_iter()
        .map(|el| (el.id(), axis.leading(el), axis.extent(el)))
        .collect();
    if ordered.len() < MIN_DISTRIBUTE {
        return false;
    }
    ordered.sort_by(|a, b| a.1.total_cmp(&b.1));

    let (_, first_lead, first_extent) = ordered[0];
    let (_, last_lead, _) = ordered[ordered.len() - 1];
    let interior = &ordered[1..ordered.len() - 1];

    let span = last_lead - (first_lead + first_extent);
    let interior_total: f64 = interior.iter().map(|(_, _, extent)| extent).sum();
    let gap = (span - interior_total) / (ordered.len() - 1) as f64;

    let mut cursor = first_lead + first_extent + gap;
    for &(id, _, extent) in interior {
        if let Some(el) = doc.get_mut(id) {
            axis.set_leading(el, cursor);
            el.touch();
        }
        cursor += extent + gap;
    }
    true
}

struct Member {
    id: ElementId,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

fn collect(doc: &BoardDocument, ids: &[ElementId]) -> Vec<Member> {
    doc.resolve(&dedup(ids))
        .into_iter()
        .map(|el| Member {
            id: el.id(),
            x: el.position_x,
            y: el.position_y,
            width: el.width,
            height: el.height,
        })
        .collect()
}

fn dedup(ids: &[ElementId]) -> Vec<ElementId> {
    let mut out: Vec<ElementId> = Vec::with_capacity(ids.len());
    for &id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
