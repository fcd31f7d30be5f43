//! RefBoard Core Library
//!
//! Element model, editing session, undo history and save reconciliation for
//! reference boards. Rendering and input handling live in the embedding UI.

pub mod align;
pub mod command;
pub mod config;
pub mod document;
pub mod element;
pub mod history;
pub mod layering;
pub mod media;
pub mod selection;
pub mod session;
pub mod storage;
pub mod sync;
pub mod tools;
pub mod viewport;

pub use align::{Alignment, Axis};
pub use command::{BoardCommand, CommandOutcome};
pub use config::{BoardConfig, ConfigError};
pub use document::BoardDocument;
pub use element::{
    BoardElement, BoardId, ContentPatch, ElementContent, ElementId, ElementKind, ElementPatch,
    Style,
};
pub use history::{History, Snapshot};
pub use media::{MediaError, MediaFile, MediaKind, MediaUploader, insert_media};
pub use selection::Selection;
pub use session::BoardSession;
pub use storage::{BoardStore, MemoryBoardStore, StoreError};
pub use sync::{PreviewRenderer, Reconciler, SaveReport, SyncError};
pub use tools::{ToolKind, ToolManager};
pub use viewport::Viewport;
