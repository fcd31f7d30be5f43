//! Persistence collaborator interface.

mod memory;

pub use memory::{MemoryBoardStore, StoreOp};

use crate::element::{BoardElement, BoardId, ElementContent, ElementId, ElementPatch, Style};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

/// Storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The board or element does not exist. Callers may recover from this.
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future returned by store operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Board-level metadata kept by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardMeta {
    pub id: BoardId,
    pub project_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl BoardMeta {
    /// Metadata for a new board, stamped now.
    pub fn new(id: BoardId, project_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            project_id,
            name: name.into(),
            thumbnail_url: None,
            updated_at: Utc::now(),
        }
    }
}

/// Partial update of board metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardMetaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// A persisted board with its elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBoard {
    pub meta: BoardMeta,
    pub elements: Vec<BoardElement>,
}

/// Mutable fields sent with an update-by-id call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementFields {
    #[serde(flatten)]
    pub geometry: ElementPatch,
    pub content: ElementContent,
    pub style: Style,
    pub updated_at: DateTime<Utc>,
}

impl From<&BoardElement> for ElementFields {
    fn from(element: &BoardElement) -> Self {
        Self {
            geometry: element.as_patch(),
            content: element.content.clone(),
            style: element.style.clone(),
            updated_at: element.updated_at,
        }
    }
}

impl ElementFields {
    /// Write these fields onto a stored element.
    pub fn apply_to(&self, element: &mut BoardElement) {
        element.apply_patch(&self.geometry);
        element.content = self.content.clone();
        element.style = self.style.clone();
        element.updated_at = self.updated_at;
    }
}

/// Remote persistence for boards.
///
/// `update_element` must report a missing element as
/// [`StoreError::NotFound`]; `delete_element` must succeed for ids that are
/// already gone.
pub trait BoardStore: Send + Sync {
    /// Fetch board metadata and every element.
    fn fetch_board(&self, board_id: BoardId) -> BoxFuture<'_, StoreResult<StoredBoard>>;

    /// Update an existing element.
    fn update_element(
        &self,
        board_id: BoardId,
        element_id: ElementId,
        fields: &ElementFields,
    ) -> BoxFuture<'_, StoreResult<()>>;

    /// Create an element, keeping its client-generated id.
    fn create_element(
        &self,
        board_id: BoardId,
        element: &BoardElement,
    ) -> BoxFuture<'_, StoreResult<()>>;

    /// Delete an element.
    fn delete_element(
        &self,
        board_id: BoardId,
        element_id: ElementId,
    ) -> BoxFuture<'_, StoreResult<()>>;

    /// Store a preview image for the board. Returns its URL.
    fn upload_thumbnail(
        &self,
        board_id: BoardId,
        image: Vec<u8>,
    ) -> BoxFuture<'_, StoreResult<String>>;

    /// Update board metadata.
    fn update_board_meta(
        &self,
        board_id: BoardId,
        patch: &BoardMetaPatch,
    ) -> BoxFuture<'_, StoreResult<BoardMeta>>;
}
