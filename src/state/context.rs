//! The editor context: one explicit value holding the canvas, the active tool
//! and the modal state, threaded through the input router and the command
//! queue.
//!
//! Every public entry point leaves the context in a settled state: the
//! [`EditorState`] always agrees with what is floating in the workspace.
use std::time::Duration;

use egui::{Pos2, Rect};
use log::{debug, error, info, warn};

use crate::command::CommandQueue;
use crate::commit::{CommitSink, actions};
use crate::config::{EngineConfig, ToolSettings};
use crate::document::Document;
use crate::error::StateTransitionError;
use crate::raster::{RasterBuffer, draw};
use crate::selection::{Clipboard, FloatingSelection, Handle, MemoryClipboard, TransformKind};
use crate::text::{FontBook, TextBox};
use crate::tools::{Tool, ToolKind, ToolType, new_tool};

use super::{EditorState, Workspace};

/// Receiver of the moves and the release that follow a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointerTarget {
    Selection,
    TextBox,
    Tool,
    /// The press was consumed (e.g. it committed a text box).
    Nothing,
}

/// An in-progress move or resize of the text box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TextDrag {
    Moving { last: Pos2 },
    Resizing { handle: Handle },
}

impl TextDrag {
    fn kind(self) -> TransformKind {
        match self {
            TextDrag::Moving { .. } => TransformKind::Moving,
            TextDrag::Resizing { handle } => TransformKind::Resizing(handle),
        }
    }
}

/// The main context for the paint editor.
#[derive(Debug)]
pub struct EditorContext {
    state: EditorState,
    pub(crate) workspace: Workspace,
    pub(crate) tool: ToolType,
    pub(crate) commands: CommandQueue,
    pub(crate) pointer: Option<PointerTarget>,
    pub(crate) text_drag: Option<TextDrag>,
    /// Version of the document the canvas was last synchronised with.
    seen_doc_version: Option<u64>,
}

impl EditorContext {
    /// Creates a context over a blank white canvas.
    pub fn new(width: u32, height: u32, config: EngineConfig, sink: impl CommitSink + 'static) -> Self {
        Self::with_canvas(RasterBuffer::new(width, height), config, Box::new(sink))
    }

    /// Creates a context over the document's current pixels.
    pub fn from_document(document: &Document, config: EngineConfig, sink: impl CommitSink + 'static) -> Self {
        let canvas = RasterBuffer::from_bytes_limited(
            document.pixels(),
            document.width(),
            document.height(),
            config.max_canvas_dim,
        );
        let mut ctx = Self::with_canvas(canvas, config, Box::new(sink));
        ctx.seen_doc_version = Some(document.version());
        ctx
    }

    fn with_canvas(canvas: RasterBuffer, config: EngineConfig, sink: Box<dyn CommitSink>) -> Self {
        info!("Editor created with a {}x{} canvas", canvas.width(), canvas.height());
        let mut workspace = Workspace::new(canvas, config, sink, Box::new(MemoryClipboard::new()));
        let mut tool = new_tool(ToolKind::default());
        tool.activate(&mut workspace);
        Self {
            state: EditorState::Idle,
            workspace,
            tool,
            commands: CommandQueue::new(),
            pointer: None,
            text_drag: None,
            seen_doc_version: None,
        }
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.workspace.clipboard = Box::new(clipboard);
        self
    }

    pub fn with_settings(mut self, settings: ToolSettings) -> Self {
        self.workspace.settings = settings;
        self
    }

    pub fn with_fonts(mut self, fonts: FontBook) -> Self {
        self.workspace.fonts = fonts;
        self
    }

    /// Attempts to transition to a new state.
    ///
    /// # Errors
    ///
    /// Returns `StateTransitionError::InvalidTransition` if the requested transition
    /// is not allowed from the current state.
    pub fn transition_to(&mut self, new_state: EditorState) -> Result<(), StateTransitionError> {
        if !self.state.can_transition_to(&new_state) {
            return Err(StateTransitionError::InvalidTransition {
                from: self.state.name(),
                to: new_state.name(),
            });
        }
        if self.state.name() != new_state.name() {
            debug!("State {} -> {}", self.state.name(), new_state.name());
        }
        self.state = new_state;
        Ok(())
    }

    /// Brings the modal state in line with the workspace.
    pub(crate) fn settle_state(&mut self) {
        let desired = self.derived_state();
        if desired == self.state {
            return;
        }
        if let Err(err) = self.transition_to(desired) {
            error!("{err}; following the workspace instead");
            self.state = desired;
        }
    }

    fn derived_state(&self) -> EditorState {
        let ws = &self.workspace;
        if let Some(selection) = &ws.selection {
            EditorState::LockedSelection {
                transform: selection.transform_kind(),
            }
        } else if ws.text_box.is_some() {
            EditorState::LockedText {
                transform: self.text_drag.map(TextDrag::kind),
            }
        } else if self.tool.is_busy() {
            EditorState::Dragging { tool: self.tool.kind() }
        } else {
            EditorState::Idle
        }
    }

    /// Switches the active tool. Any floating selection or text box is
    /// committed first and the old tool finishes or drops its gesture.
    pub fn select_tool(&mut self, kind: ToolKind) {
        if self.tool.kind() == kind {
            return;
        }
        self.commit_pending();
        self.tool.deactivate(&mut self.workspace);
        self.tool = new_tool(kind);
        self.tool.activate(&mut self.workspace);
        self.pointer = None;
        info!("Tool: {}", kind.name());
        self.settle_state();
    }

    /// Commits the floating selection and the text box, if any.
    /// Returns whether the canvas changed.
    pub fn commit_pending(&mut self) -> bool {
        let mut changed = false;
        if let Some(selection) = self.workspace.selection.take() {
            let action = selection.action();
            if selection.commit(&mut self.workspace.canvas) {
                self.workspace.commit(action);
                changed = true;
            }
            self.workspace.canvas.request_redraw();
        }
        if let Some(text) = self.workspace.text_box.take() {
            changed |= self.commit_text(text);
            self.workspace.canvas.request_redraw();
        }
        self.text_drag = None;
        if self.pointer == Some(PointerTarget::Selection) || self.pointer == Some(PointerTarget::TextBox) {
            self.pointer = Some(PointerTarget::Nothing);
        }
        self.settle_state();
        changed
    }

    fn commit_text(&mut self, text: TextBox) -> bool {
        if text.is_empty() {
            debug!("Empty text box discarded");
            return false;
        }
        let image = match text.render(&self.workspace.fonts) {
            Ok(image) => image,
            Err(err) => {
                warn!("Text not committed: {err}");
                return false;
            }
        };
        let origin = text.rect().min;
        self.workspace
            .canvas
            .composite_over(|img| draw::draw_image(img, &image, origin, 0.0));
        self.workspace.commit(actions::TEXT);
        true
    }

    /// Escape: ends the tool's gesture (committing anything it already drew)
    /// and commits whatever floats.
    pub fn escape(&mut self) {
        self.tool.finish(&mut self.workspace);
        if self.pointer.is_some() {
            self.pointer = Some(PointerTarget::Nothing);
        }
        self.commit_pending();
        self.workspace.canvas.request_redraw();
        self.settle_state();
    }

    /// Reloads the canvas when the document changed behind the engine's back
    /// (undo, redo, another editor). Returns whether a reload happened.
    ///
    /// The document echoing the engine's own last commit is recognised by its
    /// content hash and does not reload.
    pub fn sync_document(&mut self, document: &Document) -> bool {
        if self.seen_doc_version == Some(document.version()) {
            return false;
        }
        self.seen_doc_version = Some(document.version());
        if document.content_hash() == self.workspace.committed_hash() {
            debug!("Document v{} matches the canvas", document.version());
            return false;
        }
        info!("Document v{} changed outside the editor, reloading", document.version());
        let max_dim = self.workspace.config.max_canvas_dim;
        self.reload(RasterBuffer::from_bytes_limited(
            document.pixels(),
            document.width(),
            document.height(),
            max_dim,
        ));
        true
    }

    /// Replaces the canvas with `bytes` (raw RGBA or an encoded image).
    /// Undecodable bytes give a blank white canvas. Nothing is committed.
    pub fn load(&mut self, bytes: &[u8], width: u32, height: u32) {
        let max_dim = self.workspace.config.max_canvas_dim;
        self.reload(RasterBuffer::from_bytes_limited(bytes, width, height, max_dim));
    }

    fn reload(&mut self, canvas: RasterBuffer) {
        self.tool.cancel();
        self.pointer = None;
        self.text_drag = None;
        self.workspace.load_canvas(canvas);
        self.settle_state();
    }

    /// How soon the host should deliver the next tick, while a tool wants them.
    pub fn tick_interval(&self) -> Option<Duration> {
        self.tool
            .wants_ticks()
            .then(|| self.workspace.config.airbrush_interval())
    }

    /// Whether the display needs repainting since the last call.
    pub fn take_redraw_request(&mut self) -> bool {
        self.workspace.canvas.take_redraw_request()
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn active_tool(&self) -> ToolKind {
        self.tool.kind()
    }

    pub fn tool(&self) -> &ToolType {
        &self.tool
    }

    pub fn canvas(&self) -> &RasterBuffer {
        &self.workspace.canvas
    }

    pub fn config(&self) -> &EngineConfig {
        &self.workspace.config
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.workspace.settings
    }

    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.workspace.settings
    }

    pub fn selection(&self) -> Option<&FloatingSelection> {
        self.workspace.selection.as_ref()
    }

    pub fn text_box(&self) -> Option<&TextBox> {
        self.workspace.text_box.as_ref()
    }

    /// The host's text widget writes the edited string through this.
    pub fn text_box_mut(&mut self) -> Option<&mut TextBox> {
        let text = self.workspace.text_box.as_mut();
        if text.is_some() {
            self.workspace.canvas.request_redraw();
        }
        text
    }

    pub fn fonts(&self) -> &FontBook {
        &self.workspace.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.workspace.fonts
    }

    pub fn zoom(&self) -> f32 {
        self.workspace.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.workspace.set_zoom(zoom);
        self.workspace.canvas.request_redraw();
    }

    pub fn last_pointer(&self) -> Option<Pos2> {
        self.workspace.last_pointer
    }

    /// The text box rectangle, for placing the host's text widget.
    pub fn text_rect(&self) -> Option<Rect> {
        self.workspace.text_box.as_ref().map(TextBox::rect)
    }

    pub(crate) fn set_selection(&mut self, selection: FloatingSelection) {
        self.workspace.selection = Some(selection);
        self.workspace.canvas.request_redraw();
        self.settle_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::CommitLog;

    fn context() -> (EditorContext, CommitLog) {
        let log = CommitLog::new();
        let ctx = EditorContext::new(60, 60, EngineConfig::default(), log.clone());
        (ctx, log)
    }

    #[test]
    fn escape_mid_spray_commits_the_dots() {
        use crate::commit::actions;
        use crate::input::InputEvent;
        use egui::Key;

        let (mut ctx, log) = context();
        ctx.handle_event(&InputEvent::key(Key::A));
        ctx.handle_event(&InputEvent::down(Pos2::new(30.0, 30.0)));
        ctx.handle_event(&InputEvent::Tick);
        ctx.handle_event(&InputEvent::key(Key::Escape));
        assert_eq!(log.actions(), vec![actions::AIRBRUSH.to_owned()]);
        assert_eq!(ctx.workspace.committed_hash(), ctx.canvas().content_hash());
        assert_eq!(ctx.tick_interval(), None);

        // The release belongs to the swallowed press.
        ctx.handle_event(&InputEvent::up(Pos2::new(30.0, 30.0)));
        assert_eq!(log.len(), 1);
        assert_eq!(ctx.state(), EditorState::Idle);
    }

    #[test]
    fn starts_idle_with_the_pencil() {
        let (ctx, log) = context();
        assert_eq!(ctx.state(), EditorState::Idle);
        assert_eq!(ctx.active_tool(), ToolKind::Pencil);
        assert!(log.is_empty());
        assert_eq!(ctx.tick_interval(), None);
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let (mut ctx, _) = context();
        ctx.transition_to(EditorState::LockedSelection { transform: None }).unwrap();
        let err = ctx
            .transition_to(EditorState::Dragging { tool: ToolKind::Pencil })
            .unwrap_err();
        assert_eq!(
            err,
            StateTransitionError::InvalidTransition {
                from: "LockedSelection",
                to: "Dragging",
            }
        );
        // The workspace holds nothing, so settling repairs the state.
        ctx.settle_state();
        assert_eq!(ctx.state(), EditorState::Idle);
    }

    #[test]
    fn switching_tools_commits_a_moved_selection() {
        let (mut ctx, log) = context();
        ctx.select_tool(ToolKind::RectSelect);
        let mut selection = FloatingSelection::capture_rect(ctx.canvas(), Rect::from_min_max(Pos2::ZERO, Pos2::new(10.0, 10.0))).unwrap();
        selection.begin_move(Pos2::new(5.0, 5.0));
        selection.drag_to(&mut ctx.workspace.canvas, Pos2::new(25.0, 25.0), false);
        selection.end_gesture();
        ctx.set_selection(selection);
        assert!(ctx.state().is_locked());

        ctx.select_tool(ToolKind::Pencil);
        assert_eq!(ctx.state(), EditorState::Idle);
        assert!(ctx.selection().is_none());
        assert_eq!(log.actions(), vec![actions::MOVE_SELECTION.to_owned()]);
    }

    #[test]
    fn selecting_the_active_tool_keeps_the_selection() {
        let (mut ctx, _) = context();
        ctx.select_tool(ToolKind::RectSelect);
        let selection = FloatingSelection::capture_rect(ctx.canvas(), Rect::from_min_max(Pos2::ZERO, Pos2::new(10.0, 10.0))).unwrap();
        ctx.set_selection(selection);
        ctx.select_tool(ToolKind::RectSelect);
        assert!(ctx.selection().is_some());
    }

    #[test]
    fn document_echo_does_not_reload() {
        let document = Document::new(60, 60);
        let (mut ctx, _) = context();
        assert!(!ctx.sync_document(&document));
        // Same version again is ignored outright.
        assert!(!ctx.sync_document(&document));
    }

    #[test]
    fn foreign_document_bytes_reload_the_canvas() {
        let (mut ctx, _) = context();
        let mut pixels = vec![255u8; 60 * 60 * 4];
        pixels[0] = 0;
        let document = Document::from_bytes(&pixels, 60, 60);
        assert!(ctx.sync_document(&document));
        assert_eq!(ctx.canvas().as_bytes(), &pixels[..]);
    }

    #[test]
    fn empty_text_commit_is_a_no_op() {
        let (mut ctx, log) = context();
        let rect = Rect::from_min_max(Pos2::new(5.0, 5.0), Pos2::new(40.0, 30.0));
        let settings = ctx.settings().clone();
        ctx.workspace.text_box = TextBox::new(rect, settings.font, settings.foreground, 10.0);
        ctx.settle_state();
        assert!(matches!(ctx.state(), EditorState::LockedText { .. }));
        let before = ctx.canvas().snapshot();

        assert!(!ctx.commit_pending());
        assert!(ctx.text_box().is_none());
        assert!(log.is_empty());
        assert_eq!(ctx.canvas().snapshot(), before);
        assert_eq!(ctx.state(), EditorState::Idle);
    }
}
