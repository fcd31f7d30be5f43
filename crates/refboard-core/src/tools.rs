//! Authoring tool modes.

use crate::element::ElementKind;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Text,
    Rectangle,
    Circle,
    Sticky,
    Image,
    Video,
    Frame,
}

impl ToolKind {
    /// The element kind this tool places on the board, if any.
    pub fn creates(self) -> Option<ElementKind> {
        match self {
            ToolKind::Select => None,
            ToolKind::Text => Some(ElementKind::Text),
            ToolKind::Rectangle => Some(ElementKind::Rectangle),
            ToolKind::Circle => Some(ElementKind::Circle),
            ToolKind::Sticky => Some(ElementKind::Sticky),
            ToolKind::Image => Some(ElementKind::Image),
            ToolKind::Video => Some(ElementKind::Video),
            ToolKind::Frame => Some(ElementKind::Frame),
        }
    }
}

/// What the caller must do to the selection after a tool change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolTransition {
    /// Leave the selection as it is.
    KeepSelection,
    /// Clear the selection.
    ClearSelection,
}

/// Tracks the current tool.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    current_tool: ToolKind,
}

impl ToolManager {
    /// Create a manager with the select tool active.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active tool.
    pub fn current(&self) -> ToolKind {
        self.current_tool
    }

    /// Switch tools. Any tool other than select clears the selection.
    pub fn set_tool(&mut self, tool: ToolKind) -> ToolTransition {
        if self.current_tool != tool {
            log::debug!("Tool changed: {:?} -> {:?}", self.current_tool, tool);
        }
        self.current_tool = tool;
        match tool {
            ToolKind::Select => ToolTransition::KeepSelection,
            _ => ToolTransition::ClearSelection,
        }
    }
}
