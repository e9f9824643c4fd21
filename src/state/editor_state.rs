//! The modal state of the editor.
//!
//! The state is derived from the workspace after every routed event (see
//! [`EditorContext::settle_state`](super::EditorContext::settle_state)) and
//! validated against the transition table below:
//!
//! ```text
//!            ┌────────────┐
//!      ┌─────►  Dragging  ├───────────────┐
//!      │     └─────┬──────┘               │
//! ┌────┴─┐         │              ┌───────▼────────┐
//! │ Idle ◄─────────┼──────────────┤ LockedSelection│◄─┐
//! └────┬─┘         │              └───────▲────────┘  │
//!      │     ┌─────▼──────┐               │           │
//!      └─────► LockedText ├───────────────┘           │
//!            └────────────┘  (text converted)         │
//! ```
//!
//! A locked state only ends by committing its floating object.
use serde::{Deserialize, Serialize};

use crate::selection::TransformKind;
use crate::tools::ToolKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditorState {
    /// No gesture and no floating object.
    #[default]
    Idle,
    /// A tool holds an unfinished gesture (a drag, a curve between phases,
    /// an open polygon).
    Dragging { tool: ToolKind },
    /// A floating selection owns pointer input until it is committed.
    LockedSelection {
        #[serde(skip)]
        transform: Option<TransformKind>,
    },
    /// A text box is being edited.
    LockedText {
        #[serde(skip)]
        transform: Option<TransformKind>,
    },
}

impl EditorState {
    /// Validates whether a transition to the new state is allowed
    pub fn can_transition_to(&self, new_state: &EditorState) -> bool {
        match (self, new_state) {
            // From Idle, we can go to any state
            (EditorState::Idle, _) => true,

            // A gesture ends, captures a selection or opens a text box
            (EditorState::Dragging { .. }, EditorState::Idle) => true,
            (EditorState::Dragging { .. }, EditorState::LockedSelection { .. }) => true,
            (EditorState::Dragging { .. }, EditorState::LockedText { .. }) => true,

            // Locked objects only leave through a commit
            (EditorState::LockedSelection { .. }, EditorState::LockedSelection { .. }) => true,
            (EditorState::LockedSelection { .. }, EditorState::Idle) => true,
            (EditorState::LockedText { .. }, EditorState::LockedText { .. }) => true,
            (EditorState::LockedText { .. }, EditorState::Idle) => true,
            (EditorState::LockedText { .. }, EditorState::LockedSelection { .. }) => true,

            // All other transitions are invalid
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorState::Idle => "Idle",
            EditorState::Dragging { .. } => "Dragging",
            EditorState::LockedSelection { .. } => "LockedSelection",
            EditorState::LockedText { .. } => "LockedText",
        }
    }

    /// Returns true if the editor is currently in an idle state
    pub fn is_idle(&self) -> bool {
        matches!(self, EditorState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, EditorState::Dragging { .. })
    }

    /// Returns true while a floating selection or text box holds the input
    pub fn is_locked(&self) -> bool {
        matches!(self, EditorState::LockedSelection { .. } | EditorState::LockedText { .. })
    }

    /// The tool whose gesture is in progress, if any
    pub fn dragging_tool(&self) -> Option<ToolKind> {
        match self {
            EditorState::Dragging { tool } => Some(*tool),
            _ => None,
        }
    }

    /// The transform being applied to the locked object, if any
    pub fn transform(&self) -> Option<TransformKind> {
        match self {
            EditorState::LockedSelection { transform } | EditorState::LockedText { transform } => *transform,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Handle;

    #[test]
    fn idle_reaches_everything() {
        let targets = [
            EditorState::Dragging { tool: ToolKind::Pencil },
            EditorState::LockedSelection { transform: None },
            EditorState::LockedText { transform: None },
        ];
        for target in targets {
            assert!(EditorState::Idle.can_transition_to(&target));
        }
    }

    #[test]
    fn locked_selection_cannot_start_a_drag() {
        let locked = EditorState::LockedSelection {
            transform: Some(TransformKind::Moving),
        };
        assert!(!locked.can_transition_to(&EditorState::Dragging { tool: ToolKind::RectSelect }));
        assert!(!locked.can_transition_to(&EditorState::LockedText { transform: None }));
        assert!(locked.can_transition_to(&EditorState::LockedSelection {
            transform: Some(TransformKind::Resizing(Handle::TopLeft)),
        }));
        assert!(locked.can_transition_to(&EditorState::Idle));
    }

    #[test]
    fn text_converts_to_selection() {
        let text = EditorState::LockedText { transform: None };
        assert!(text.can_transition_to(&EditorState::LockedSelection {
            transform: Some(TransformKind::Rotating),
        }));
        assert_eq!(text.name(), "LockedText");
        assert!(text.is_locked());
    }

    #[test]
    fn dragging_reports_its_tool() {
        let state = EditorState::Dragging { tool: ToolKind::Curve };
        assert_eq!(state.dragging_tool(), Some(ToolKind::Curve));
        assert!(!state.can_transition_to(&EditorState::Dragging { tool: ToolKind::Pencil }));
        assert_eq!(state.transform(), None);
    }
}
