//! Explicit command channel: menu items and other outer surfaces push
//! [`EditorCommand`]s, the engine drains them synchronously in FIFO order.
use std::collections::VecDeque;

use egui::Color32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shape::ShapeStyle;
use crate::text::FontSpec;
use crate::tools::ToolKind;

mod execute;

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur during command execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// The command cannot be executed in the current state
    #[error("{command} needs {needs}")]
    InvalidState {
        command: &'static str,
        needs: &'static str,
    },
    /// The command parameters are invalid
    #[error("Invalid parameters for {command}: {reason}")]
    InvalidParameters { command: &'static str, reason: String },
}

/// Commands that can be executed in the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorCommand {
    /// Change the active tool, committing whatever floats
    SelectTool(ToolKind),
    ClearCanvas,
    /// Resize the canvas; dimensions are clamped, never rejected
    ResizeCanvas { width: u32, height: u32 },
    SelectAll,
    Copy,
    Cut,
    Paste,
    DeleteSelection,
    /// Quarter turn of the floating selection
    RotateSelection { clockwise: bool },
    ScaleSelection(f32),
    ConvertTextToSelection,
    CommitPending,
    SetForeground(Color32),
    SetBackground(Color32),
    SetBaseSize(f32),
    SetShapeStyle(ShapeStyle),
    SetFont(FontSpec),
    SetZoom(f32),
}

impl EditorCommand {
    pub fn name(&self) -> &'static str {
        match self {
            EditorCommand::SelectTool(_) => "SelectTool",
            EditorCommand::ClearCanvas => "ClearCanvas",
            EditorCommand::ResizeCanvas { .. } => "ResizeCanvas",
            EditorCommand::SelectAll => "SelectAll",
            EditorCommand::Copy => "Copy",
            EditorCommand::Cut => "Cut",
            EditorCommand::Paste => "Paste",
            EditorCommand::DeleteSelection => "DeleteSelection",
            EditorCommand::RotateSelection { .. } => "RotateSelection",
            EditorCommand::ScaleSelection(_) => "ScaleSelection",
            EditorCommand::ConvertTextToSelection => "ConvertTextToSelection",
            EditorCommand::CommitPending => "CommitPending",
            EditorCommand::SetForeground(_) => "SetForeground",
            EditorCommand::SetBackground(_) => "SetBackground",
            EditorCommand::SetBaseSize(_) => "SetBaseSize",
            EditorCommand::SetShapeStyle(_) => "SetShapeStyle",
            EditorCommand::SetFont(_) => "SetFont",
            EditorCommand::SetZoom(_) => "SetZoom",
        }
    }
}

/// FIFO of commands waiting for [`EditorContext::process_commands`](crate::EditorContext::process_commands).
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: VecDeque<EditorCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: EditorCommand) {
        self.pending.push_back(command);
    }

    pub fn pop(&mut self) -> Option<EditorCommand> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
