use log::{debug, warn};

use crate::state::EditorContext;

use super::{CommandError, CommandResult, EditorCommand};

fn needs(done: bool, command: &EditorCommand, needs: &'static str) -> CommandResult {
    if done {
        Ok(())
    } else {
        Err(CommandError::InvalidState {
            command: command.name(),
            needs,
        })
    }
}

impl EditorContext {
    /// Queues a command for the next [`EditorContext::process_commands`].
    pub fn submit(&mut self, command: EditorCommand) {
        debug!("Queued {}", command.name());
        self.commands.push(command);
    }

    /// Drains the queue in order. A command that cannot run is logged and
    /// skipped. Returns how many commands ran successfully.
    pub fn process_commands(&mut self) -> usize {
        let mut done = 0;
        while let Some(command) = self.commands.pop() {
            match self.execute(&command) {
                Ok(()) => done += 1,
                Err(err) => warn!("Command skipped: {err}"),
            }
        }
        done
    }

    /// Runs one command right away.
    pub fn execute(&mut self, command: &EditorCommand) -> CommandResult {
        debug!("Executing {}", command.name());
        let result = match command {
            EditorCommand::SelectTool(kind) => {
                self.select_tool(*kind);
                Ok(())
            }
            EditorCommand::ClearCanvas => {
                self.clear_canvas();
                Ok(())
            }
            EditorCommand::ResizeCanvas { width, height } => {
                self.resize_canvas(*width, *height);
                Ok(())
            }
            EditorCommand::SelectAll => {
                self.select_all();
                Ok(())
            }
            EditorCommand::Copy => needs(self.copy(), command, "a floating selection"),
            EditorCommand::Cut => needs(self.cut(), command, "a floating selection"),
            EditorCommand::Paste => needs(self.paste(), command, "a bitmap on the clipboard"),
            EditorCommand::DeleteSelection => needs(self.delete_selection(), command, "a floating selection"),
            EditorCommand::RotateSelection { clockwise } => {
                needs(self.rotate_selection(*clockwise), command, "a floating selection")
            }
            EditorCommand::ScaleSelection(factor) => {
                if !(factor.is_finite() && *factor > 0.0) {
                    return Err(CommandError::InvalidParameters {
                        command: command.name(),
                        reason: format!("scale factor {factor}"),
                    });
                }
                needs(self.scale_selection(*factor), command, "a floating selection")
            }
            EditorCommand::ConvertTextToSelection => {
                needs(self.convert_text_to_selection(), command, "a text box with text")
            }
            EditorCommand::CommitPending => {
                self.commit_pending();
                Ok(())
            }
            EditorCommand::SetForeground(color) => {
                self.workspace.settings.foreground = *color;
                Ok(())
            }
            EditorCommand::SetBackground(color) => {
                self.workspace.settings.background = *color;
                Ok(())
            }
            EditorCommand::SetBaseSize(size) => {
                if !(size.is_finite() && *size > 0.0) {
                    return Err(CommandError::InvalidParameters {
                        command: command.name(),
                        reason: format!("base size {size}"),
                    });
                }
                self.workspace.settings.size = *size;
                Ok(())
            }
            EditorCommand::SetShapeStyle(style) => {
                self.workspace.settings.shape_style = *style;
                Ok(())
            }
            EditorCommand::SetFont(font) => {
                self.workspace.settings.font = font.clone();
                if let Some(text) = self.workspace.text_box.as_mut() {
                    text.set_font(font.clone());
                    self.workspace.canvas.request_redraw();
                }
                Ok(())
            }
            EditorCommand::SetZoom(zoom) => {
                self.set_zoom(*zoom);
                Ok(())
            }
        };
        self.settle_state();
        result
    }
}

#[cfg(test)]
mod tests {
    use egui::Color32;

    use super::*;
    use crate::commit::{CommitLog, actions};
    use crate::config::EngineConfig;
    use crate::shape::ShapeStyle;
    use crate::state::EditorState;
    use crate::tools::ToolKind;

    fn context() -> (EditorContext, CommitLog) {
        let log = CommitLog::new();
        (EditorContext::new(80, 60, EngineConfig::default(), log.clone()), log)
    }

    #[test]
    fn queued_commands_run_in_order() {
        let (mut ctx, log) = context();
        ctx.submit(EditorCommand::SetForeground(Color32::RED));
        ctx.submit(EditorCommand::SelectAll);
        ctx.submit(EditorCommand::RotateSelection { clockwise: true });
        ctx.submit(EditorCommand::CommitPending);
        assert_eq!(ctx.process_commands(), 4);
        assert_eq!(ctx.settings().foreground, Color32::RED);
        assert_eq!(ctx.active_tool(), ToolKind::RectSelect);
        assert_eq!(log.actions(), vec![actions::MOVE_SELECTION.to_owned()]);
        assert_eq!(ctx.state(), EditorState::Idle);
    }

    #[test]
    fn commands_without_a_target_are_skipped() {
        let (mut ctx, log) = context();
        ctx.submit(EditorCommand::Copy);
        ctx.submit(EditorCommand::DeleteSelection);
        ctx.submit(EditorCommand::ScaleSelection(2.0));
        ctx.submit(EditorCommand::SetShapeStyle(ShapeStyle::FilledNoOutline));
        assert_eq!(ctx.process_commands(), 1);
        assert!(log.is_empty());
        assert_eq!(ctx.settings().shape_style, ShapeStyle::FilledNoOutline);
    }

    #[test]
    fn invalid_parameters_are_reported() {
        let (mut ctx, _) = context();
        let err = ctx.execute(&EditorCommand::SetBaseSize(-1.0)).unwrap_err();
        assert!(matches!(err, CommandError::InvalidParameters { command: "SetBaseSize", .. }));
        assert_eq!(ctx.settings().size, 2.0);
    }

    #[test]
    fn resize_is_clamped_not_rejected() {
        let (mut ctx, _) = context();
        assert!(ctx.execute(&EditorCommand::ResizeCanvas { width: 0, height: 100_000 }).is_ok());
        assert_eq!((ctx.canvas().width(), ctx.canvas().height()), (50, 8192));
    }
}
