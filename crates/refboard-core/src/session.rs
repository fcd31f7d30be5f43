//! Board session: the state container for editing one board.

use crate::align::{self, Alignment, Axis};
use crate::config::BoardConfig;
use crate::document::BoardDocument;
use crate::element::{
    BoardElement, BoardId, ContentPatch, ElementId, ElementKind, ElementPatch, Style,
};
use crate::history::History;
use crate::layering;
use crate::selection::Selection;
use crate::tools::{ToolKind, ToolManager, ToolTransition};
use crate::viewport::Viewport;
use kurbo::Vec2;
use std::collections::HashSet;
use std::sync::Arc;

/// Runtime state for one board being edited (not persisted).
///
/// A session is constructed explicitly per board; nothing is global. Every
/// mutating call except [`BoardSession::update`] records a history snapshot.
/// `update` is meant for per-frame gesture updates and is followed by a
/// [`BoardSession::checkpoint`] when the gesture ends.
#[derive(Debug, Clone)]
pub struct BoardSession {
    board_id: BoardId,
    /// Author stamped on new elements.
    user: Option<String>,
    document: BoardDocument,
    selection: Selection,
    tools: ToolManager,
    viewport: Viewport,
    history: History,
    config: BoardConfig,
}

impl BoardSession {
    /// Create a session for an empty board.
    ///
    /// Invalid zoom settings in `config` fall back to the defaults.
    pub fn new(board_id: BoardId, config: BoardConfig) -> Self {
        let config = config.normalized();
        let document = BoardDocument::new();
        let mut history = History::with_capacity(config.history_capacity);
        history.reset(document.snapshot());
        Self {
            board_id,
            user: None,
            document,
            selection: Selection::new(),
            tools: ToolManager::new(),
            viewport: Viewport::from_config(&config),
            history,
            config,
        }
    }

    /// Set the author recorded on elements created in this session.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Id of the board being edited.
    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Settings in effect for this session.
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// The current elements.
    pub fn document(&self) -> &BoardDocument {
        &self.document
    }

    /// Get an element by id.
    pub fn element(&self, id: ElementId) -> Option<&BoardElement> {
        self.document.get(id)
    }

    /// Shared handles to the current elements, cheap to hand to a save.
    pub fn shared_elements(&self) -> Vec<Arc<BoardElement>> {
        self.document.shared()
    }

    // --- Element repository ---

    /// Replace every element (board load). History restarts from this content.
    pub fn replace_all(&mut self, elements: Vec<BoardElement>) {
        self.document = BoardDocument::from_elements(elements);
        self.selection.clear();
        self.history.reset(self.document.snapshot());
        log::info!(
            "Loaded {} elements into board {}",
            self.document.len(),
            self.board_id
        );
    }

    /// Add an element. Returns None if an element with the same id exists.
    pub fn add(&mut self, mut element: BoardElement) -> Option<ElementId> {
        element.board_id = self.board_id;
        if element.created_by.is_none() {
            element.created_by = self.user.clone();
        }
        let id = element.id();
        if !self.document.insert(element) {
            log::warn!("Element {} already exists, not added", id);
            return None;
        }
        self.save_history();
        Some(id)
    }

    /// Create an element of `kind` at a position, stacked above everything.
    pub fn create(&mut self, kind: ElementKind, x: f64, y: f64) -> ElementId {
        let element =
            BoardElement::new(self.board_id, kind, x, y).with_z_index(self.document.next_z());
        let id = element.id();
        // Fresh ids cannot collide.
        let _ = self.add(element);
        id
    }

    /// Patch plain fields without recording history.
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        self.document
            .get_mut(id)
            .is_some_and(|el| el.apply_patch(patch))
    }

    /// Merge a content patch into an element.
    pub fn update_content(&mut self, id: ElementId, patch: &ContentPatch) -> bool {
        let Some(el) = self.document.get_mut(id) else {
            return false;
        };
        el.merge_content(patch);
        self.save_history();
        true
    }

    /// Merge a style patch into an element.
    pub fn update_style(&mut self, id: ElementId, patch: &Style) -> bool {
        let Some(el) = self.document.get_mut(id) else {
            return false;
        };
        el.merge_style(patch);
        self.save_history();
        true
    }

    /// Delete elements and drop them from the selection. Returns how many were removed.
    pub fn delete(&mut self, ids: &[ElementId]) -> usize {
        let removed = self.document.remove_many(ids);
        if removed.is_empty() {
            return 0;
        }
        let document = &self.document;
        self.selection.retain_existing(|id| document.contains(id));
        self.save_history();
        removed.len()
    }

    /// Delete the selected elements.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selection.ids();
        self.delete(&ids)
    }

    /// Clone the listed elements, offset them, stack them on top and select them.
    ///
    /// Returns the new ids in input order. Repeated ids are cloned once.
    pub fn duplicate(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        let mut next_z = self.document.next_z();
        let mut seen = HashSet::new();
        let unique: Vec<ElementId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        let originals: Vec<BoardElement> =
            self.document.resolve(&unique).into_iter().cloned().collect();

        let mut new_ids = Vec::with_capacity(originals.len());
        for mut copy in originals {
            copy.regenerate_id();
            copy.translate(offset);
            copy.z_index = next_z;
            copy.created_by = self.user.clone().or(copy.created_by);
            next_z = next_z.saturating_add(1);
            new_ids.push(copy.id());
            self.document.insert(copy);
        }

        if !new_ids.is_empty() {
            self.selection.set(new_ids.iter().copied());
            self.save_history();
        }
        new_ids
    }

    /// Record the current content, e.g. at the end of a drag.
    pub fn checkpoint(&mut self) {
        self.save_history();
    }

    // --- Selection ---

    /// Select an element; `append` toggles it in the current selection.
    /// Unknown ids are ignored.
    pub fn select(&mut self, id: ElementId, append: bool) {
        if self.document.contains(id) {
            self.selection.select(id, append);
        }
    }

    /// Select every element.
    pub fn select_all(&mut self) {
        self.selection.set(self.document.ids());
    }

    /// Clear the selection.
    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    /// Replace the selection (box-select). Unknown ids are dropped.
    pub fn set_selected_ids(&mut self, ids: &[ElementId]) {
        let existing: Vec<ElementId> = ids
            .iter()
            .copied()
            .filter(|&id| self.document.contains(id))
            .collect();
        self.selection.set(existing);
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected ids in no particular order.
    pub fn selected_ids(&self) -> Vec<ElementId> {
        self.selection.ids()
    }

    /// Selected elements that still exist.
    pub fn selected_elements(&self) -> Vec<&BoardElement> {
        self.document.resolve(&self.selection.ids())
    }

    // --- Tools ---

    /// The active tool.
    pub fn tool(&self) -> ToolKind {
        self.tools.current()
    }

    /// Switch tools; any tool other than select clears the selection.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tools.set_tool(tool) == ToolTransition::ClearSelection {
            self.selection.clear();
        }
    }

    // --- Viewport ---

    /// The current viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable viewport access for zoom and pan.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Fit every element into view.
    pub fn zoom_to_fit(&mut self) {
        self.viewport.zoom_to_fit(self.document.bounds());
    }

    /// Fit the selection into view, or everything if nothing is selected.
    pub fn zoom_to_selection(&mut self) {
        let bounds = self
            .document
            .bounds_of(&self.selection.ids())
            .or_else(|| self.document.bounds());
        self.viewport.zoom_to_fit(bounds);
    }

    /// Restore zoom 1 and no pan.
    pub fn reset_view(&mut self) {
        self.viewport.reset_view();
    }

    // --- Layering ---

    /// Stack the listed elements above everything.
    pub fn bring_to_front(&mut self, ids: &[ElementId]) -> bool {
        let changed = layering::bring_to_front(&mut self.document, ids);
        self.save_history_if(changed)
    }

    /// Stack the listed elements below everything.
    pub fn send_to_back(&mut self, ids: &[ElementId]) -> bool {
        let changed = layering::send_to_back(&mut self.document, ids);
        self.save_history_if(changed)
    }

    /// Raise each listed element by one.
    pub fn bring_forward(&mut self, ids: &[ElementId]) -> bool {
        let changed = layering::bring_forward(&mut self.document, ids);
        self.save_history_if(changed)
    }

    /// Lower each listed element by one.
    pub fn send_backward(&mut self, ids: &[ElementId]) -> bool {
        let changed = layering::send_backward(&mut self.document, ids);
        self.save_history_if(changed)
    }

    // --- Alignment ---

    /// Align the listed elements. No-op below two elements.
    pub fn align(&mut self, ids: &[ElementId], alignment: Alignment) -> bool {
        let changed = align::align(&mut self.document, ids, alignment);
        self.save_history_if(changed)
    }

    /// Align left edges to the leftmost one.
    pub fn align_left(&mut self, ids: &[ElementId]) -> bool {
        self.align(ids, Alignment::Left)
    }

    /// Align right edges to the rightmost one.
    pub fn align_right(&mut self, ids: &[ElementId]) -> bool {
        self.align(ids, Alignment::Right)
    }

    /// Align horizontal centers on their mean.
    pub fn align_center(&mut self, ids: &[ElementId]) -> bool {
        self.align(ids, Alignment::Center)
    }

    /// Align top edges to the topmost one.
    pub fn align_top(&mut self, ids: &[ElementId]) -> bool {
        self.align(ids, Alignment::Top)
    }

    /// Align bottom edges to the lowest one.
    pub fn align_bottom(&mut self, ids: &[ElementId]) -> bool {
        self.align(ids, Alignment::Bottom)
    }

    /// Align vertical centers on their mean.
    pub fn align_middle(&mut self, ids: &[ElementId]) -> bool {
        self.align(ids, Alignment::Middle)
    }

    /// Space the listed elements evenly. No-op below three elements.
    pub fn distribute(&mut self, ids: &[ElementId], axis: Axis) -> bool {
        let changed = align::distribute(&mut self.document, ids, axis);
        self.save_history_if(changed)
    }

    /// Space the listed elements evenly left to right.
    pub fn distribute_horizontal(&mut self, ids: &[ElementId]) -> bool {
        self.distribute(ids, Axis::Horizontal)
    }

    /// Space the listed elements evenly top to bottom.
    pub fn distribute_vertical(&mut self, ids: &[ElementId]) -> bool {
        self.distribute(ids, Axis::Vertical)
    }

    // --- History ---

    /// The undo history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Whether there is a snapshot to undo to.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether there is a snapshot to redo to.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restore the previous snapshot and clear the selection.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.document.restore(&snapshot);
        self.selection.clear();
        log::debug!("Undo to snapshot {}", self.history.pointer());
        true
    }

    /// Restore the next snapshot and clear the selection.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.document.restore(&snapshot);
        self.selection.clear();
        log::debug!("Redo to snapshot {}", self.history.pointer());
        true
    }

    fn save_history(&mut self) {
        self.history.save(self.document.snapshot());
    }

    fn save_history_if(&mut self, changed: bool) -> bool {
        if changed {
            self.save_history();
        }
        changed
    }
}
