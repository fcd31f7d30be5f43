//! Save reconciliation between a local session and the persisted board.
//!
//! A save diffs the current elements against the ids known to be on the
//! server after the last successful save:
//!
//! - ids that disappeared locally are deleted remotely,
//! - every current element is updated by id, falling back to a create when
//!   the server reports it as not found,
//! - a preview thumbnail is rendered and uploaded (best effort).
//!
//! Deletes and upserts run concurrently with no ordering and no transaction.
//! If any of them fails the cycle is reported as failed and the known server
//! ids are left untouched, so the next save retries everything.

use crate::config::BoardConfig;
use crate::element::{BoardElement, BoardId, ElementId};
use crate::session::BoardSession;
use crate::storage::{
    BoardMeta, BoardMetaPatch, BoardStore, BoxFuture, ElementFields, StoreError, StoredBoard,
};
use chrono::{DateTime, Utc};
use futures_util::future::{join, join_all};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Renders a preview image of the board.
pub trait PreviewRenderer: Send + Sync {
    /// Render the elements to an encoded image.
    fn render_preview(&self, elements: &[Arc<BoardElement>])
    -> BoxFuture<'_, Result<Vec<u8>, PreviewError>>;
}

/// Preview rendering failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Preview rendering failed: {0}")]
pub struct PreviewError(pub String);

/// Which remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOp {
    Delete,
    Update,
    Create,
}

/// A single failed remote call within a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    pub element_id: ElementId,
    pub op: SaveOp,
    pub error: StoreError,
}

/// Synchronization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Failed to load board: {0}")]
    Load(StoreError),
    #[error("Save failed: {} of {total} operations failed", .failures.len())]
    Partial {
        failures: Vec<SaveFailure>,
        total: usize,
    },
    #[error("Failed to update board metadata: {0}")]
    Meta(StoreError),
}

/// Result type for synchronization.
pub type SyncResult<T> = Result<T, SyncError>;

/// Summary of a successful save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub deleted: usize,
    pub updated: usize,
    pub created: usize,
    /// URL of the uploaded thumbnail, if one was produced.
    pub thumbnail_url: Option<String>,
}

/// Outcome of the most recent save.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    NeverSaved,
    Saved { at: DateTime<Utc> },
    Failed { at: DateTime<Utc>, failed: usize },
}

/// Tracks what the server holds and performs saves.
#[derive(Debug, Clone)]
pub struct Reconciler {
    board_id: BoardId,
    /// Element ids on the server as of the last successful save or load.
    server_ids: HashSet<ElementId>,
    /// Elements as of the last successful save or load.
    saved: Vec<Arc<BoardElement>>,
    status: SaveStatus,
}

enum Upserted {
    Updated,
    Created,
}

impl Reconciler {
    /// Reconciler for a board with nothing persisted yet.
    pub fn new(board_id: BoardId) -> Self {
        Self {
            board_id,
            server_ids: HashSet::new(),
            saved: Vec::new(),
            status: SaveStatus::NeverSaved,
        }
    }

    /// Reconciler seeded with the elements currently on the server.
    pub fn from_server(board_id: BoardId, elements: &[BoardElement]) -> Self {
        Self {
            board_id,
            server_ids: elements.iter().map(|el| el.id()).collect(),
            saved: elements.iter().cloned().map(Arc::new).collect(),
            status: SaveStatus::NeverSaved,
        }
    }

    /// Board this reconciler saves.
    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Element ids known to be on the server.
    pub fn server_ids(&self) -> &HashSet<ElementId> {
        &self.server_ids
    }

    /// Outcome of the most recent save.
    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    /// Whether `current` differs from what was last saved or loaded.
    pub fn has_unsaved_changes(&self, current: &[Arc<BoardElement>]) -> bool {
        if current.len() != self.saved.len() {
            return true;
        }
        current
            .iter()
            .zip(&self.saved)
            .any(|(a, b)| !Arc::ptr_eq(a, b) && a != b)
    }

    /// Fetch a board and build a session and reconciler for it.
    pub async fn open<S>(
        store: &S,
        board_id: BoardId,
        config: BoardConfig,
    ) -> SyncResult<(BoardSession, Reconciler, BoardMeta)>
    where
        S: BoardStore + ?Sized,
    {
        let StoredBoard { meta, elements } =
            store.fetch_board(board_id).await.map_err(SyncError::Load)?;
        let mut session = BoardSession::new(board_id, config);
        session.replace_all(elements);
        // Seed from the session so the freshly loaded board reads as saved.
        let reconciler = Self {
            board_id,
            server_ids: session.document().ids().into_iter().collect(),
            saved: session.shared_elements(),
            status: SaveStatus::NeverSaved,
        };
        Ok((session, reconciler, meta))
    }

    /// Push `elements` to the store.
    ///
    /// `elements` is an owned snapshot (see [`BoardSession::shared_elements`])
    /// so the session stays editable while the save is in flight.
    pub async fn save<S>(
        &mut self,
        store: &S,
        renderer: Option<&dyn PreviewRenderer>,
        elements: Vec<Arc<BoardElement>>,
    ) -> SyncResult<SaveReport>
    where
        S: BoardStore + ?Sized,
    {
        let board_id = self.board_id;
        let current_ids: HashSet<ElementId> = elements.iter().map(|el| el.id()).collect();
        let deleted: Vec<ElementId> = self
            .server_ids
            .difference(&current_ids)
            .copied()
            .collect();

        log::info!(
            "Saving board {}: {} elements, {} deletions",
            board_id,
            elements.len(),
            deleted.len()
        );

        let deletes = join_all(deleted.iter().map(|&id| async move {
            store
                .delete_element(board_id, id)
                .await
                .map_err(|error| SaveFailure {
                    element_id: id,
                    op: SaveOp::Delete,
                    error,
                })
        }));
        let upserts = join_all(
            elements
                .iter()
                .map(|el| upsert(store, board_id, el.as_ref())),
        );
        let (delete_results, upsert_results) = join(deletes, upserts).await;

        let total = delete_results.len() + upsert_results.len();
        let mut report = SaveReport::default();
        let mut failures = Vec::new();
        for result in delete_results {
            match result {
                Ok(()) => report.deleted += 1,
                Err(failure) => failures.push(failure),
            }
        }
        for result in upsert_results {
            match result {
                Ok(Upserted::Updated) => report.updated += 1,
                Ok(Upserted::Created) => report.created += 1,
                Err(failure) => failures.push(failure),
            }
        }

        if !failures.is_empty() {
            log::error!(
                "Save of board {} failed: {} of {} operations failed",
                board_id,
                failures.len(),
                total
            );
            self.status = SaveStatus::Failed {
                at: Utc::now(),
                failed: failures.len(),
            };
            return Err(SyncError::Partial { failures, total });
        }

        if let Some(renderer) = renderer.filter(|_| !elements.is_empty()) {
            report.thumbnail_url = upload_thumbnail(store, renderer, board_id, &elements).await;
        }

        self.server_ids = current_ids;
        self.saved = elements;
        self.status = SaveStatus::Saved { at: Utc::now() };
        log::info!(
            "Saved board {}: {} updated, {} created, {} deleted",
            board_id,
            report.updated,
            report.created,
            report.deleted
        );
        Ok(report)
    }

    /// Update board metadata such as the name.
    pub async fn update_board_meta<S>(
        &self,
        store: &S,
        patch: &BoardMetaPatch,
    ) -> SyncResult<BoardMeta>
    where
        S: BoardStore + ?Sized,
    {
        store
            .update_board_meta(self.board_id, patch)
            .await
            .map_err(SyncError::Meta)
    }
}

async fn upsert<S>(
    store: &S,
    board_id: BoardId,
    element: &BoardElement,
) -> Result<Upserted, SaveFailure>
where
    S: BoardStore + ?Sized,
{
    let id = element.id();
    let fields = ElementFields::from(element);
    match store.update_element(board_id, id, &fields).await {
        Ok(()) => Ok(Upserted::Updated),
        Err(StoreError::NotFound(_)) => {
            log::debug!("Element {} not on server, creating", id);
            store
                .create_element(board_id, element)
                .await
                .map(|()| Upserted::Created)
                .map_err(|error| SaveFailure {
                    element_id: id,
                    op: SaveOp::Create,
                    error,
                })
        }
        Err(error) => Err(SaveFailure {
            element_id: id,
            op: SaveOp::Update,
            error,
        }),
    }
}

/// Render and upload a preview. Failures are logged and swallowed.
async fn upload_thumbnail<S>(
    store: &S,
    renderer: &dyn PreviewRenderer,
    board_id: BoardId,
    elements: &[Arc<BoardElement>],
) -> Option<String>
where
    S: BoardStore + ?Sized,
{
    let image = match renderer.render_preview(elements).await {
        Ok(image) => image,
        Err(e) => {
            log::warn!("Thumbnail for board {} not rendered: {}", board_id, e);
            return None;
        }
    };
    match store.upload_thumbnail(board_id, image).await {
        Ok(url) => Some(url),
        Err(e) => {
            log::warn!("Thumbnail for board {} not uploaded: {}", board_id, e);
            None
        }
    }
}
