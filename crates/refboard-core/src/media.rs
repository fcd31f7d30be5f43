//! Image and video insertion.
//!
//! The file is uploaded first; the element is only created once a URL is
//! available, so a failed upload leaves the board untouched.

use crate::element::{BoardElement, ElementContent, ElementId, ElementKind};
use crate::session::BoardSession;
use crate::storage::BoxFuture;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of media being inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Infer the kind from a MIME type.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let top = mime_type.split('/').next()?;
        match top.trim().to_ascii_lowercase().as_str() {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }

    /// Element kind created for this media.
    pub fn element_kind(self) -> ElementKind {
        match self {
            MediaKind::Image => ElementKind::Image,
            MediaKind::Video => ElementKind::Video,
        }
    }
}

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl MediaFile {
    /// Create a file from its name, MIME type and bytes.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// Media insertion errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Unsupported media type: {0}")]
    UnsupportedType(String),
    #[error("Invalid media dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Uploads media and returns a URL the board can reference.
pub trait MediaUploader: Send + Sync {
    fn upload(&self, file: MediaFile, kind: MediaKind) -> BoxFuture<'_, Result<String, MediaError>>;
}

/// Scale `width`x`height` down to fit a `max`x`max` box, keeping the aspect
/// ratio. Sizes already inside the box are returned unchanged.
pub fn fit_within(width: f64, height: f64, max: f64) -> (f64, f64) {
    if width <= max && height <= max {
        return (width, height);
    }
    let aspect = width / height;
    if aspect > 1.0 {
        // Wider than tall: fit to width
        (max, max / aspect)
    } else {
        (max * aspect, max)
    }
}

/// Upload `file` and add an image or video element for it to the session.
///
/// `source_size` is the intrinsic pixel size of the media. The element is
/// placed near the configured media origin with a small random offset so
/// repeated inserts do not stack exactly.
pub async fn insert_media<U>(
    session: &mut BoardSession,
    uploader: &U,
    file: MediaFile,
    source_size: (u32, u32),
) -> Result<ElementId, MediaError>
where
    U: MediaUploader + ?Sized,
{
    let (source_width, source_height) = source_size;
    if source_width == 0 || source_height == 0 {
        return Err(MediaError::InvalidDimensions {
            width: source_width,
            height: source_height,
        });
    }
    let kind = MediaKind::from_mime(&file.mime_type)
        .ok_or_else(|| MediaError::UnsupportedType(file.mime_type.clone()))?;

    let name = file.name.clone();
    let mime_type = file.mime_type.clone();
    log::info!("Uploading {} ({}, {} bytes)", name, mime_type, file.data.len());
    let url = uploader.upload(file, kind).await.map_err(|e| {
        log::error!("Upload of {} failed: {}", name, e);
        e
    })?;

    let config = session.config().clone();
    let (width, height) = fit_within(
        source_width as f64,
        source_height as f64,
        config.media_max_size,
    );
    let (x, y) = jittered(config.media_origin, config.media_jitter);

    let element = BoardElement::new(session.board_id(), kind.element_kind(), x, y)
        .with_size(width, height)
        .with_z_index(session.document().next_z())
        .with_content(ElementContent {
            url: Some(url),
            file_name: Some(name),
            mime_type: Some(mime_type),
            ..Default::default()
        });
    let id = element.id();
    // Fresh ids cannot collide.
    let _ = session.add(element);
    Ok(id)
}

fn jittered(origin: (f64, f64), jitter: f64) -> (f64, f64) {
    if jitter <= 0.0 {
        return origin;
    }
    let mut rng = rand::rng();
    (
        origin.0 + rng.random_range(-jitter..=jitter),
        origin.1 + rng.random_range(-jitter..=jitter),
    )
}
