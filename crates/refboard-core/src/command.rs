//! Serializable editing commands and their dispatch onto a session.
//!
//! UI layers can drive a session either through its methods or by applying
//! [`BoardCommand`] values, which is convenient for replay and scripting.

use crate::align::{Alignment, Axis};
use crate::element::{BoardElement, ContentPatch, ElementId, ElementKind, ElementPatch, Style};
use crate::session::BoardSession;
use crate::tools::ToolKind;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// One editing operation on a board session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BoardCommand {
    Add { element: Box<BoardElement> },
    Create { kind: ElementKind, x: f64, y: f64 },
    Update { id: ElementId, patch: ElementPatch },
    UpdateContent { id: ElementId, patch: ContentPatch },
    UpdateStyle { id: ElementId, patch: Style },
    Delete { ids: Vec<ElementId> },
    Duplicate { ids: Vec<ElementId> },
    Checkpoint,
    Select { id: ElementId, append: bool },
    SelectAll,
    DeselectAll,
    SetSelection { ids: Vec<ElementId> },
    SetTool { tool: ToolKind },
    BringToFront { ids: Vec<ElementId> },
    SendToBack { ids: Vec<ElementId> },
    BringForward { ids: Vec<ElementId> },
    SendBackward { ids: Vec<ElementId> },
    Align { ids: Vec<ElementId>, alignment: Alignment },
    Distribute { ids: Vec<ElementId>, axis: Axis },
    Undo,
    Redo,
    SetZoom { zoom: f64 },
    ZoomIn,
    ZoomOut,
    Pan { dx: f64, dy: f64 },
    ResizeViewport { width: f64, height: f64 },
    ZoomToFit,
    ResetView,
}

/// Result of applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Nothing changed (unknown ids, guards, empty history).
    Unchanged,
    /// Session state changed.
    Changed,
    /// New elements were created.
    Created(Vec<ElementId>),
}

impl CommandOutcome {
    fn from_flag(changed: bool) -> Self {
        if changed {
            CommandOutcome::Changed
        } else {
            CommandOutcome::Unchanged
        }
    }
}

impl BoardSession {
    /// Apply a command to the session.
    pub fn apply(&mut self, command: BoardCommand) -> CommandOutcome {
        use BoardCommand::*;

        match command {
            Add { element } => match self.add(*element) {
                Some(id) => CommandOutcome::Created(vec![id]),
                None => CommandOutcome::Unchanged,
            },
            Create { kind, x, y } => CommandOutcome::Created(vec![self.create(kind, x, y)]),
            Update { id, patch } => CommandOutcome::from_flag(self.update(id, &patch)),
            UpdateContent { id, patch } => {
                CommandOutcome::from_flag(self.update_content(id, &patch))
            }
            UpdateStyle { id, patch } => CommandOutcome::from_flag(self.update_style(id, &patch)),
            Delete { ids } => CommandOutcome::from_flag(self.delete(&ids) > 0),
            Duplicate { ids } => {
                let created = self.duplicate(&ids);
                if created.is_empty() {
                    CommandOutcome::Unchanged
                } else {
                    CommandOutcome::Created(created)
                }
            }
            Checkpoint => {
                self.checkpoint();
                CommandOutcome::Changed
            }
            Select { id, append } => {
                self.select(id, append);
                CommandOutcome::Changed
            }
            SelectAll => {
                self.select_all();
                CommandOutcome::Changed
            }
            DeselectAll => {
                self.deselect_all();
                CommandOutcome::Changed
            }
            SetSelection { ids } => {
                self.set_selected_ids(&ids);
                CommandOutcome::Changed
            }
            SetTool { tool } => {
                self.set_tool(tool);
                CommandOutcome::Changed
            }
            BringToFront { ids } => CommandOutcome::from_flag(self.bring_to_front(&ids)),
            SendToBack { ids } => CommandOutcome::from_flag(self.send_to_back(&ids)),
            BringForward { ids } => CommandOutcome::from_flag(self.bring_forward(&ids)),
            SendBackward { ids } => CommandOutcome::from_flag(self.send_backward(&ids)),
            Align { ids, alignment } => CommandOutcome::from_flag(self.align(&ids, alignment)),
            Distribute { ids, axis } => CommandOutcome::from_flag(self.distribute(&ids, axis)),
            Undo => CommandOutcome::from_flag(self.undo()),
            Redo => CommandOutcome::from_flag(self.redo()),
            SetZoom { zoom } => {
                self.viewport_mut().set_zoom(zoom);
                CommandOutcome::Changed
            }
            ZoomIn => {
                self.viewport_mut().zoom_in();
                CommandOutcome::Changed
            }
            ZoomOut => {
                self.viewport_mut().zoom_out();
                CommandOutcome::Changed
            }
            Pan { dx, dy } => {
                self.viewport_mut().pan_by(Vec2::new(dx, dy));
                CommandOutcome::Changed
            }
            ResizeViewport { width, height } => {
                self.viewport_mut().set_size(width, height);
                CommandOutcome::Changed
            }
            ZoomToFit => {
                self.zoom_to_fit();
                CommandOutcome::Changed
            }
            ResetView => {
                self.reset_view();
                CommandOutcome::Changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_apply_create_and_undo() {
        let mut session = BoardSession::new(Uuid::new_v4(), BoardConfig::default());
        let outcome = session.apply(BoardCommand::Create {
            kind: ElementKind::Circle,
            x: 5.0,
            y: 5.0,
        });
        let CommandOutcome::Created(ids) = outcome else {
            panic!("expected created ids");
        };
        assert!(session.element(ids[0]).is_some());

        assert_eq!(session.apply(BoardCommand::Undo), CommandOutcome::Changed);
        assert!(session.document().is_empty());
        assert_eq!(session.apply(BoardCommand::Undo), CommandOutcome::Unchanged);
    }

    #[test]
    fn test_guards_report_unchanged() {
        let mut session = BoardSession::new(Uuid::new_v4(), BoardConfig::default());
        let id = session.create(ElementKind::Rectangle, 0.0, 0.0);
        let outcome = session.apply(BoardCommand::Align {
            ids: vec![id],
            alignment: Alignment::Left,
        });
        assert_eq!(outcome, CommandOutcome::Unchanged);
        assert_eq!(
            session.apply(BoardCommand::Duplicate { ids: vec![Uuid::new_v4()] }),
            CommandOutcome::Unchanged
        );
    }

    #[test]
    fn test_command_from_json() {
        let mut session = BoardSession::new(Uuid::new_v4(), BoardConfig::default());
        let id = session.create(ElementKind::Text, 0.0, 0.0);

        let command: BoardCommand = serde_json::from_value(json!({
            "op": "update_content",
            "id": id,
            "patch": { "text": "Scene 4" }
        }))
        .unwrap();
        session.apply(command);
        assert_eq!(
            session.element(id).unwrap().content.text.as_deref(),
            Some("Scene 4")
        );

        let command: BoardCommand =
            serde_json::from_value(json!({ "op": "set_zoom", "zoom": 10.0 })).unwrap();
        session.apply(command);
        assert!((session.viewport().zoom - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_viewport_then_fit() {
        let mut session = BoardSession::new(Uuid::new_v4(), BoardConfig::default());
        let id = session.create(ElementKind::Frame, 0.0, 0.0);
        session.apply(BoardCommand::ResizeViewport {
            width: 1300.0,
            height: 900.0,
        });
        assert_eq!(session.viewport().size, kurbo::Size::new(1300.0, 900.0));

        session.apply(BoardCommand::ZoomToFit);
        // Frame is 400x300 inside 1200x800 after padding.
        assert!((session.viewport().zoom - 2.6).abs() < 1e-9);
        let visible = session.viewport().visible_world_rect();
        let bounds = session.element(id).unwrap().bounds();
        assert!(visible.contains(bounds.origin()));
    }
}
