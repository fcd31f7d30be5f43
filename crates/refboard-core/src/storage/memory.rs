//! In-memory board store.

use super::{
    BoardMeta, BoardMetaPatch, BoardStore, BoxFuture, ElementFields, StoreError, StoreResult,
    StoredBoard,
};
use crate::element::{BoardElement, BoardId, ElementId};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

/// A call received by [`MemoryBoardStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Fetch(BoardId),
    Update(ElementId),
    Create(ElementId),
    Delete(ElementId),
    Thumbnail(BoardId),
    Meta(BoardId),
}

#[derive(Debug, Default)]
struct Inner {
    boards: HashMap<BoardId, StoredBoard>,
    thumbnails: HashMap<BoardId, Vec<u8>>,
    ops: Vec<StoreOp>,
}

/// In-memory store for tests and offline sessions.
#[derive(Debug, Default)]
pub struct MemoryBoardStore {
    inner: RwLock<Inner>,
}

impl MemoryBoardStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a board.
    pub fn insert_board(&self, meta: BoardMeta, elements: Vec<BoardElement>) -> StoreResult<()> {
        let mut inner = self.write()?;
        inner.boards.insert(meta.id, StoredBoard { meta, elements });
        Ok(())
    }

    /// Persisted elements of a board.
    pub fn elements(&self, board_id: BoardId) -> StoreResult<Vec<BoardElement>> {
        let inner = self.read()?;
        inner
            .boards
            .get(&board_id)
            .map(|board| board.elements.clone())
            .ok_or_else(|| StoreError::NotFound(board_id.to_string()))
    }

    /// Last uploaded thumbnail of a board.
    pub fn thumbnail(&self, board_id: BoardId) -> Option<Vec<u8>> {
        self.read().ok()?.thumbnails.get(&board_id).cloned()
    }

    /// Every call received so far.
    pub fn operations(&self) -> Vec<StoreOp> {
        self.read().map(|inner| inner.ops.clone()).unwrap_or_default()
    }

    /// Forget recorded calls.
    pub fn clear_operations(&self) {
        if let Ok(mut inner) = self.write() {
            inner.ops.clear();
        }
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Other(format!("Lock error: {}", e)))
    }
}

impl BoardStore for MemoryBoardStore {
    fn fetch_board(&self, board_id: BoardId) -> BoxFuture<'_, StoreResult<StoredBoard>> {
        Box::pin(async move {
            let mut inner = self.write()?;
            inner.ops.push(StoreOp::Fetch(board_id));
            inner
                .boards
                .get(&board_id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(board_id.to_string()))
        })
    }

    fn update_element(
        &self,
        board_id: BoardId,
        element_id: ElementId,
        fields: &ElementFields,
    ) -> BoxFuture<'_, StoreResult<()>> {
        let fields = fields.clone();
        Box::pin(async move {
            let mut inner = self.write()?;
            inner.ops.push(StoreOp::Update(element_id));
            let board = inner
                .boards
                .get_mut(&board_id)
                .ok_or_else(|| StoreError::NotFound(board_id.to_string()))?;
            let element = board
                .elements
                .iter_mut()
                .find(|el| el.id() == element_id)
                .ok_or_else(|| StoreError::NotFound(element_id.to_string()))?;
            fields.apply_to(element);
            Ok(())
        })
    }

    fn create_element(
        &self,
        board_id: BoardId,
        element: &BoardElement,
    ) -> BoxFuture<'_, StoreResult<()>> {
        let element = element.clone();
        Box::pin(async move {
            let mut inner = self.write()?;
            inner.ops.push(StoreOp::Create(element.id()));
            let board = inner
                .boards
                .get_mut(&board_id)
                .ok_or_else(|| StoreError::NotFound(board_id.to_string()))?;
            match board.elements.iter_mut().find(|el| el.id() == element.id()) {
                Some(existing) => *existing = element,
                None => board.elements.push(element),
            }
            Ok(())
        })
    }

    fn delete_element(
        &self,
        board_id: BoardId,
        element_id: ElementId,
    ) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            let mut inner = self.write()?;
            inner.ops.push(StoreOp::Delete(element_id));
            if let Some(board) = inner.boards.get_mut(&board_id) {
                board.elements.retain(|el| el.id() != element_id);
            }
            Ok(())
        })
    }

    fn upload_thumbnail(
        &self,
        board_id: BoardId,
        image: Vec<u8>,
    ) -> BoxFuture<'_, StoreResult<String>> {
        Box::pin(async move {
            let mut inner = self.write()?;
            inner.ops.push(StoreOp::Thumbnail(board_id));
            let url = format!("memory://boards/{}/thumbnail.png", board_id);
            inner.thumbnails.insert(board_id, image);
            if let Some(board) = inner.boards.get_mut(&board_id) {
                board.meta.thumbnail_url = Some(url.clone());
            }
            Ok(url)
        })
    }

    fn update_board_meta(
        &self,
        board_id: BoardId,
        patch: &BoardMetaPatch,
    ) -> BoxFuture<'_, StoreResult<BoardMeta>> {
        let patch = patch.clone();
        Box::pin(async move {
            let mut inner = self.write()?;
            inner.ops.push(StoreOp::Meta(board_id));
            let board = inner
                .boards
                .get_mut(&board_id)
                .ok_or_else(|| StoreError::NotFound(board_id.to_string()))?;
            if let Some(name) = patch.name {
                board.meta.name = name;
            }
            if let Some(url) = patch.thumbnail_url {
                board.meta.thumbnail_url = Some(url);
            }
            board.meta.updated_at = Utc::now();
            Ok(board.meta.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use uuid::Uuid;

    fn store_with_board() -> (MemoryBoardStore, BoardId) {
        let store = MemoryBoardStore::new();
        let board_id = Uuid::new_v4();
        store
            .insert_board(BoardMeta::new(board_id, Uuid::new_v4(), "Moodboard"), vec![])
            .unwrap();
        (store, board_id)
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let store = MemoryBoardStore::new();
        let result = store.fetch_board(Uuid::new_v4()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_missing_element_is_not_found() {
        let (store, board_id) = store_with_board();
        let el = BoardElement::new(board_id, ElementKind::Text, 0.0, 0.0);
        let result = store
            .update_element(board_id, el.id(), &ElementFields::from(&el))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_then_update() {
        let (store, board_id) = store_with_board();
        let mut el = BoardElement::new(board_id, ElementKind::Rectangle, 0.0, 0.0);
        store.create_element(board_id, &el).await.unwrap();

        el.position_x = 42.0;
        store
            .update_element(board_id, el.id(), &ElementFields::from(&el))
            .await
            .unwrap();

        let stored = store.elements(board_id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].position_x, 42.0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (store, board_id) = store_with_board();
        let el = BoardElement::new(board_id, ElementKind::Circle, 0.0, 0.0);
        store.create_element(board_id, &el).await.unwrap();

        store.delete_element(board_id, el.id()).await.unwrap();
        store.delete_element(board_id, el.id()).await.unwrap();
        assert!(store.elements(board_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_thumbnail_and_meta() {
        let (store, board_id) = store_with_board();
        let url = store.upload_thumbnail(board_id, vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.thumbnail(board_id), Some(vec![1, 2, 3]));

        let meta = store
            .update_board_meta(
                board_id,
                &BoardMetaPatch {
                    name: Some("Act II refs".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(meta.name, "Act II refs");
        assert_eq!(meta.thumbnail_url, Some(url));
        assert_eq!(
            store.operations(),
            vec![StoreOp::Thumbnail(board_id), StoreOp::Meta(board_id)]
        );
    }
}
