use egui::Pos2;

use crate::commit::{Commit, CommitSink};
use crate::config::{EngineConfig, ToolSettings};
use crate::raster::RasterBuffer;
use crate::selection::{Clipboard, FloatingSelection};
use crate::text::{FontBook, TextBox};

/// Everything tools read and mutate: the canvas, the floating objects, the
/// user's settings and the outward-facing collaborators.
pub struct Workspace {
    pub canvas: RasterBuffer,
    pub settings: ToolSettings,
    pub config: EngineConfig,
    pub selection: Option<FloatingSelection>,
    pub text_box: Option<TextBox>,
    pub fonts: FontBook,
    pub zoom: f32,
    /// Last pointer position in buffer coordinates; paste centers here.
    pub last_pointer: Option<Pos2>,
    pub(crate) clipboard: Box<dyn Clipboard>,
    sink: Box<dyn CommitSink>,
    /// Hash of the bytes last loaded or committed.
    committed_hash: u64,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("canvas", &(self.canvas.width(), self.canvas.height()))
            .field("selection", &self.selection.as_ref().map(|s| s.rect()))
            .field("text_box", &self.text_box.as_ref().map(|t| t.rect()))
            .field("zoom", &self.zoom)
            .finish_non_exhaustive()
    }
}

impl Workspace {
    pub fn new(
        canvas: RasterBuffer,
        config: EngineConfig,
        sink: Box<dyn CommitSink>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let committed_hash = canvas.content_hash();
        Self {
            canvas,
            settings: ToolSettings::default(),
            zoom: config.min_zoom.max(1.0),
            config,
            selection: None,
            text_box: None,
            fonts: FontBook::builtin(),
            last_pointer: None,
            clipboard,
            sink,
            committed_hash,
        }
    }

    /// Emits the current canvas with `action` to the commit sink.
    pub fn commit(&mut self, action: &str) {
        self.emit(Some(action.to_owned()));
    }

    fn emit(&mut self, action: Option<String>) {
        self.committed_hash = self.canvas.content_hash();
        log::info!("Commit: {}", action.as_deref().unwrap_or("(untracked)"));
        self.sink.commit(Commit {
            pixels: self.canvas.snapshot(),
            width: self.canvas.width(),
            height: self.canvas.height(),
            action,
        });
    }

    pub fn committed_hash(&self) -> u64 {
        self.committed_hash
    }

    /// Replaces the canvas without emitting a commit.
    pub fn load_canvas(&mut self, canvas: RasterBuffer) {
        self.committed_hash = canvas.content_hash();
        self.canvas = canvas;
        self.canvas.request_redraw();
        self.selection = None;
        self.text_box = None;
    }

    /// Effective line width for the current base size.
    pub fn width_for(&self, multiplier: f32) -> f32 {
        (self.settings.size * multiplier).max(1.0)
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
    }
}
