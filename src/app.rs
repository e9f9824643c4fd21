use std::cell::RefCell;
use std::rc::Rc;

use egui::{Color32, Id, Rect, Sense, Stroke, TextEdit, TextureHandle, TextureOptions, Vec2};
use log::{info, warn};

use crate::command::EditorCommand;
use crate::commit::Commit;
use crate::config::{EngineConfig, ToolSettings};
use crate::document::Document;
use crate::input::{InputEvent, InputHandler};
use crate::render::Frame;
use crate::selection::handles::HANDLE_COLOR;
use crate::shape::ShapeStyle;
use crate::state::EditorContext;
use crate::tools::{ToolCategory, ToolKind};

const SETTINGS_KEY: &str = "canvas_paint_settings";
const DEFAULT_SIZE: (u32, u32) = (800, 600);

/// The eframe host: tool strip, menu bar, the canvas view and the text widget
/// over the active text box.
pub struct PaintApp {
    editor: EditorContext,
    /// Shared with the commit sink closure; undo and redo happen here.
    document: Rc<RefCell<Document>>,
    input: InputHandler,
    texture: Option<TextureHandle>,
    frame: Option<Frame>,
    /// Input time of the last airbrush tick.
    last_tick: f64,
    resize_to: (u32, u32),
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: EngineConfig) -> Self {
        let settings: ToolSettings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, SETTINGS_KEY))
            .unwrap_or_default();

        let document = Rc::new(RefCell::new(Document::new(DEFAULT_SIZE.0, DEFAULT_SIZE.1)));
        let sink_document = Rc::clone(&document);
        let sink = move |commit: Commit| {
            sink_document.borrow_mut().apply_commit(commit);
        };
        let editor = EditorContext::from_document(&document.borrow(), config, sink).with_settings(settings);
        let editor = with_system_clipboard(editor);

        Self {
            editor,
            document,
            input: InputHandler::new(),
            texture: None,
            frame: None,
            last_tick: 0.0,
            resize_to: DEFAULT_SIZE,
        }
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        let (can_undo, can_redo) = {
            let document = self.document.borrow();
            (document.can_undo(), document.can_redo())
        };
        let has_selection = self.editor.selection().is_some();
        let has_text = self.editor.text_box().is_some();

        ui.horizontal(|ui| {
            if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                self.document.borrow_mut().undo();
            }
            if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                self.document.borrow_mut().redo();
            }
            ui.separator();
            if ui.button("Clear").clicked() {
                self.editor.submit(EditorCommand::ClearCanvas);
            }
            if ui.button("Select All").clicked() {
                self.editor.submit(EditorCommand::SelectAll);
            }
            if ui.add_enabled(has_selection, egui::Button::new("Copy")).clicked() {
                self.editor.submit(EditorCommand::Copy);
            }
            if ui.add_enabled(has_selection, egui::Button::new("Cut")).clicked() {
                self.editor.submit(EditorCommand::Cut);
            }
            if ui.button("Paste").clicked() {
                self.editor.submit(EditorCommand::Paste);
            }
            ui.separator();
            ui.add_enabled_ui(has_selection, |ui| {
                if ui.button("⟲ 90°").clicked() {
                    self.editor.submit(EditorCommand::RotateSelection { clockwise: false });
                }
                if ui.button("⟳ 90°").clicked() {
                    self.editor.submit(EditorCommand::RotateSelection { clockwise: true });
                }
                if ui.button("×2").clicked() {
                    self.editor.submit(EditorCommand::ScaleSelection(2.0));
                }
                if ui.button("×½").clicked() {
                    self.editor.submit(EditorCommand::ScaleSelection(0.5));
                }
            });
            if ui.add_enabled(has_text, egui::Button::new("Text → Selection")).clicked() {
                self.editor.submit(EditorCommand::ConvertTextToSelection);
            }
            ui.separator();
            ui.add(egui::DragValue::new(&mut self.resize_to.0).prefix("w "));
            ui.add(egui::DragValue::new(&mut self.resize_to.1).prefix("h "));
            if ui.button("Resize").clicked() {
                let (width, height) = self.resize_to;
                self.editor.submit(EditorCommand::ResizeCanvas { width, height });
            }
        });
    }

    fn tool_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Tools");
        ui.separator();
        for category in [
            ToolCategory::Selection,
            ToolCategory::Drawing,
            ToolCategory::Shape,
            ToolCategory::Utility,
        ] {
            ui.label(format!("{category:?}"));
            for kind in ToolKind::ALL.into_iter().filter(|k| k.category() == category) {
                let label = format!("{} ({:?})", kind.name(), kind.shortcut());
                if ui.selectable_label(self.editor.active_tool() == kind, label).clicked() {
                    self.editor.submit(EditorCommand::SelectTool(kind));
                }
            }
            ui.add_space(4.0);
        }

        ui.separator();
        let mut settings = self.editor.settings().clone();
        ui.horizontal(|ui| {
            ui.label("Colors");
            ui.color_edit_button_srgba(&mut settings.foreground);
            ui.color_edit_button_srgba(&mut settings.background);
        });
        ui.add(egui::Slider::new(&mut settings.size, 1.0..=50.0).text("Size"));
        ui.label("Shape style");
        ui.radio_value(&mut settings.shape_style, ShapeStyle::Outline, "Outline");
        ui.radio_value(&mut settings.shape_style, ShapeStyle::FilledWithOutline, "Filled + outline");
        ui.radio_value(&mut settings.shape_style, ShapeStyle::FilledNoOutline, "Filled");

        ui.separator();
        let names: Vec<String> = self.editor.fonts().names().map(str::to_owned).collect();
        egui::ComboBox::from_label("Font")
            .selected_text(settings.font.name.clone())
            .show_ui(ui, |ui| {
                for name in names {
                    ui.selectable_value(&mut settings.font.name, name.clone(), name);
                }
            });
        ui.add(egui::Slider::new(&mut settings.font.size, 6.0..=144.0).text("Font size"));
        ui.checkbox(&mut settings.font.bold, "Bold");
        ui.checkbox(&mut settings.font.italic, "Italic");
        ui.checkbox(&mut settings.font.underline, "Underline");

        let current = self.editor.settings().clone();
        if settings.foreground != current.foreground {
            self.editor.submit(EditorCommand::SetForeground(settings.foreground));
        }
        if settings.background != current.background {
            self.editor.submit(EditorCommand::SetBackground(settings.background));
        }
        if settings.size != current.size {
            self.editor.submit(EditorCommand::SetBaseSize(settings.size));
        }
        if settings.shape_style != current.shape_style {
            self.editor.submit(EditorCommand::SetShapeStyle(settings.shape_style));
        }
        if settings.font != current.font {
            self.editor.submit(EditorCommand::SetFont(settings.font));
        }
    }

    fn canvas_view(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        if self.editor.take_redraw_request() || self.frame.is_none() {
            let frame = self.editor.render();
            let image = frame.to_color_image();
            match &mut self.texture {
                Some(texture) => texture.set(image, TextureOptions::NEAREST),
                None => self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST)),
            }
            self.frame = Some(frame);
        }
        let (Some(frame), Some(texture)) = (&self.frame, &self.texture) else {
            return;
        };

        let size = Vec2::new(frame.width() as f32, frame.height() as f32) * frame.zoom;
        let (canvas_rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
        let painter = ui.painter_at(canvas_rect);
        painter.image(
            texture.id(),
            canvas_rect,
            Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );

        if let Some(outline) = frame.outline {
            let points = outline.iter().map(|p| frame.to_screen(canvas_rect, *p)).collect();
            painter.add(egui::Shape::closed_line(points, Stroke::new(1.0, HANDLE_COLOR)));
        }
        let handle_size = self.editor.config().handle_size;
        for (_, p) in &frame.handles {
            let center = frame.to_screen(canvas_rect, *p);
            painter.rect_filled(Rect::from_center_size(center, Vec2::splat(handle_size)), 0.0, HANDLE_COLOR);
        }
        let text_rect = frame.text_rect.map(|r| {
            Rect::from_min_max(frame.to_screen(canvas_rect, r.min), frame.to_screen(canvas_rect, r.max))
        });

        // The engine takes display positions and applies the configured
        // origin itself, so egui's top-left positions need flipping first
        // when the origin is bottom-left. The flip is its own inverse.
        let origin = self.editor.config().display_origin;
        let height = self.editor.canvas().height();
        let to_display = |p| origin.to_buffer(p, height);
        let events = self.input.process_input(&ctx, canvas_rect, frame.zoom);
        if let Some(hover) = response.hover_pos() {
            let local = egui::Pos2::ZERO + (hover - canvas_rect.min) / frame.zoom;
            ctx.set_cursor_icon(self.editor.cursor_at(to_display(local)).cursor_icon());
        }

        if let Some(rect) = text_rect {
            self.text_widget(ui, rect);
        }
        for event in events {
            self.editor.handle_event(&event.map_pos(to_display));
        }
    }

    /// Native text editing over the box. The glyphs shown are the engine's
    /// own rasterization, so the widget's text is drawn transparent.
    fn text_widget(&mut self, ui: &mut egui::Ui, rect: Rect) {
        let Some(mut text) = self.editor.text_box().map(|t| t.text().to_owned()) else {
            return;
        };
        let id = Id::new("canvas_text_box");
        let response = ui.put(
            rect,
            TextEdit::multiline(&mut text)
                .id(id)
                .frame(false)
                .text_color(Color32::TRANSPARENT)
                .desired_width(rect.width()),
        );
        if !response.has_focus() && ui.memory(|m| m.focused().is_none()) {
            response.request_focus();
        }
        if response.changed() {
            if let Some(text_box) = self.editor.text_box_mut() {
                text_box.set_text(text);
            }
        }
    }

    fn schedule_ticks(&mut self, ctx: &egui::Context) {
        let Some(interval) = self.editor.tick_interval() else {
            return;
        };
        let now = ctx.input(|i| i.time);
        if now - self.last_tick >= interval.as_secs_f64() {
            self.last_tick = now;
            self.editor.handle_event(&InputEvent::Tick);
        }
        ctx.request_repaint_after(interval);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn with_system_clipboard(editor: EditorContext) -> EditorContext {
    match crate::selection::SystemClipboard::new() {
        Ok(clipboard) => {
            info!("Using the system clipboard");
            editor.with_clipboard(clipboard)
        }
        Err(err) => {
            warn!("{err}; copy and paste stay inside the app");
            editor
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn with_system_clipboard(editor: EditorContext) -> EditorContext {
    editor
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, SETTINGS_KEY, self.editor.settings());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("menu").show(ctx, |ui| self.menu_bar(ui));
        egui::SidePanel::left("tools").show(ctx, |ui| self.tool_panel(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| self.canvas_view(ui));
        });

        self.editor.process_commands();
        if self.editor.sync_document(&self.document.borrow()) {
            info!("Canvas follows the document");
        }
        self.schedule_ticks(ctx);
        if self.editor.take_redraw_request() {
            self.frame = None;
            ctx.request_repaint();
        }
    }
}
