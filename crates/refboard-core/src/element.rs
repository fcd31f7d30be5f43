//! Board element definitions.

use chrono::{DateTime, Utc};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// Unique identifier for a board.
pub type BoardId = Uuid;

/// Open key/value map of visual properties (colors, fonts, stroke...).
pub type Style = Map<String, Value>;

/// Fill color given to new sticky notes.
pub const STICKY_DEFAULT_COLOR: &str = "#fff59d";

/// The kind of an element. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Rectangle,
    Circle,
    Sticky,
    Image,
    Video,
    Frame,
}

impl ElementKind {
    /// Size given to a freshly created element of this kind.
    pub fn default_size(self) -> (f64, f64) {
        match self {
            ElementKind::Text => (200.0, 40.0),
            ElementKind::Rectangle => (150.0, 100.0),
            ElementKind::Circle => (100.0, 100.0),
            ElementKind::Sticky => (200.0, 200.0),
            ElementKind::Image | ElementKind::Video => (320.0, 180.0),
            ElementKind::Frame => (400.0, 300.0),
        }
    }
}

/// Type-specific payload of an element.
///
/// Media elements use `url`/`file_name`/`mime_type`, text and sticky
/// elements use `text`. Also used as a patch: `merge` only overwrites the
/// fields that are set on the other side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Partial content update.
pub type ContentPatch = ElementContent;

impl ElementContent {
    /// Content holding only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Merge a patch into this content.
    pub fn merge(&mut self, patch: &ContentPatch) {
        if let Some(text) = &patch.text {
            self.text = Some(text.clone());
        }
        if let Some(url) = &patch.url {
            self.url = Some(url.clone());
        }
        if let Some(file_name) = &patch.file_name {
            self.file_name = Some(file_name.clone());
        }
        if let Some(mime_type) = &patch.mime_type {
            self.mime_type = Some(mime_type.clone());
        }
    }
}

/// Plain field patch for an element.
///
/// Used for continuous gestures (drag, resize, rotate), so applying one does
/// not record history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl ElementPatch {
    /// Patch that moves an element.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            position_x: Some(x),
            position_y: Some(y),
            ..Self::default()
        }
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One visual object on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardElement {
    pub(crate) id: ElementId,
    /// Owning board (persistence back-reference only).
    pub board_id: BoardId,
    #[serde(rename = "type")]
    kind: ElementKind,
    pub position_x: f64,
    pub position_y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub z_index: i64,
    /// Interactive gestures must not move locked elements. Not enforced here.
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub content: ElementContent,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoardElement {
    /// Create an element of `kind` at the given position with its default size.
    pub fn new(board_id: BoardId, kind: ElementKind, x: f64, y: f64) -> Self {
        let (width, height) = kind.default_size();
        let now = Utc::now();
        let mut style = Style::new();
        if kind == ElementKind::Sticky {
            style.insert(
                "backgroundColor".to_string(),
                Value::String(STICKY_DEFAULT_COLOR.to_string()),
            );
        }
        Self {
            id: Uuid::new_v4(),
            board_id,
            kind,
            position_x: x,
            position_y: y,
            width,
            height,
            rotation: 0.0,
            z_index: 0,
            locked: false,
            content: ElementContent::default(),
            style,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the display size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the content payload.
    pub fn with_content(mut self, content: ElementContent) -> Self {
        self.content = content;
        self
    }

    /// Set the stacking order.
    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }

    /// Unique id of the element.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Kind of the element.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Give the element a fresh identity, as when it is duplicated.
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
        let now = Utc::now();
        self.created_at = now;
        self.updated_at = now;
    }

    /// Axis-aligned bounds, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position_x,
            self.position_y,
            self.position_x + self.width,
            self.position_y + self.height,
        )
    }

    /// Center of the element's bounds.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Move the element by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.position_x += delta.x;
        self.position_y += delta.y;
        self.touch();
    }

    /// Apply a plain field patch. Returns true if any field was set.
    pub fn apply_patch(&mut self, patch: &ElementPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        if let Some(x) = patch.position_x {
            self.position_x = x;
        }
        if let Some(y) = patch.position_y {
            self.position_y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(z) = patch.z_index {
            self.z_index = z;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        self.touch();
        true
    }

    /// Merge a content patch.
    pub fn merge_content(&mut self, patch: &ContentPatch) {
        self.content.merge(patch);
        self.touch();
    }

    /// Merge a style patch key by key. A `null` value removes the key.
    pub fn merge_style(&mut self, patch: &Style) {
        for (key, value) in patch {
            if value.is_null() {
                self.style.remove(key);
            } else {
                self.style.insert(key.clone(), value.clone());
            }
        }
        self.touch();
    }

    /// Full field set sent to the persistence layer on update.
    pub fn as_patch(&self) -> ElementPatch {
        ElementPatch {
            position_x: Some(self.position_x),
            position_y: Some(self.position_y),
            width: Some(self.width),
            height: Some(self.height),
            rotation: Some(self.rotation),
            z_index: Some(self.z_index),
            locked: Some(self.locked),
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn board() -> BoardId {
        Uuid::new_v4()
    }

    #[test]
    fn test_new_element_defaults() {
        let el = BoardElement::new(board(), ElementKind::Rectangle, 10.0, 20.0);
        assert_eq!(el.kind(), ElementKind::Rectangle);
        assert_eq!(el.bounds(), Rect::new(10.0, 20.0, 160.0, 120.0));
        assert!(!el.locked);
        assert!(el.style.is_empty());
    }

    #[test]
    fn test_sticky_gets_background() {
        let el = BoardElement::new(board(), ElementKind::Sticky, 0.0, 0.0);
        assert_eq!(el.style.get("backgroundColor"), Some(&json!(STICKY_DEFAULT_COLOR)));
    }

    #[test]
    fn test_apply_patch_only_sets_given_fields() {
        let mut el = BoardElement::new(board(), ElementKind::Circle, 0.0, 0.0);
        assert!(el.apply_patch(&ElementPatch::position(5.0, 6.0)));
        assert_eq!((el.position_x, el.position_y), (5.0, 6.0));
        assert_eq!((el.width, el.height), (100.0, 100.0));
        assert!(!el.apply_patch(&ElementPatch::default()));
    }

    #[test]
    fn test_merge_content_keeps_other_fields() {
        let mut el = BoardElement::new(board(), ElementKind::Image, 0.0, 0.0)
            .with_content(ElementContent {
                url: Some("https://cdn/a.png".into()),
                file_name: Some("a.png".into()),
                ..Default::default()
            });
        el.merge_content(&ContentPatch {
            file_name: Some("b.png".into()),
            ..Default::default()
        });
        assert_eq!(el.content.url.as_deref(), Some("https://cdn/a.png"));
        assert_eq!(el.content.file_name.as_deref(), Some("b.png"));
    }

    #[test]
    fn test_merge_style_null_removes_key() {
        let mut el = BoardElement::new(board(), ElementKind::Text, 0.0, 0.0);
        let patch: Style =
            serde_json::from_value(json!({ "color": "#000", "fontSize": 18 })).unwrap();
        el.merge_style(&patch);
        let patch: Style = serde_json::from_value(json!({ "color": null })).unwrap();
        el.merge_style(&patch);
        assert!(!el.style.contains_key("color"));
        assert_eq!(el.style.get("fontSize"), Some(&json!(18)));
    }

    #[test]
    fn test_serialized_type_field() {
        let el = BoardElement::new(board(), ElementKind::Video, 0.0, 0.0);
        let value = serde_json::to_value(&el).unwrap();
        assert_eq!(value["type"], json!("video"));
        let back: BoardElement = serde_json::from_value(value).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn test_regenerate_id() {
        let mut el = BoardElement::new(board(), ElementKind::Frame, 0.0, 0.0);
        let old = el.id();
        el.regenerate_id();
        assert_ne!(el.id(), old);
    }
}
