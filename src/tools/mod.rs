use egui::{Key, Modifiers, Pos2};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::shape::ShapeKind;
use crate::state::Workspace;

mod airbrush;
mod curve;
mod freehand;
mod polygon;
mod select;
mod shapes;
mod text;
mod utility;

pub use airbrush::AirbrushTool;
pub use curve::{CurvePhase, CurveTool};
pub use freehand::FreehandTool;
pub use polygon::PolygonTool;
pub use select::{SelectMode, SelectTool};
pub use shapes::ShapeTool;
pub use text::TextTool;
pub use utility::{ColorPickerTool, FillTool, MagnifierTool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCategory {
    Selection,
    Drawing,
    Shape,
    Utility,
}

/// The sixteen tools. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    FreeFormSelect,
    RectSelect,
    #[default]
    Pencil,
    Brush,
    Eraser,
    Airbrush,
    Text,
    Line,
    Curve,
    Rectangle,
    Polygon,
    Ellipse,
    RoundedRectangle,
    Fill,
    ColorPicker,
    Magnifier,
}

impl ToolKind {
    pub const ALL: [ToolKind; 16] = [
        ToolKind::FreeFormSelect,
        ToolKind::RectSelect,
        ToolKind::Pencil,
        ToolKind::Brush,
        ToolKind::Eraser,
        ToolKind::Airbrush,
        ToolKind::Text,
        ToolKind::Line,
        ToolKind::Curve,
        ToolKind::Rectangle,
        ToolKind::Polygon,
        ToolKind::Ellipse,
        ToolKind::RoundedRectangle,
        ToolKind::Fill,
        ToolKind::ColorPicker,
        ToolKind::Magnifier,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::FreeFormSelect => "Free-Form Select",
            ToolKind::RectSelect => "Select",
            ToolKind::Pencil => "Pencil",
            ToolKind::Brush => "Brush",
            ToolKind::Eraser => "Eraser",
            ToolKind::Airbrush => "Airbrush",
            ToolKind::Text => "Text",
            ToolKind::Line => "Line",
            ToolKind::Curve => "Curve",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Polygon => "Polygon",
            ToolKind::Ellipse => "Ellipse",
            ToolKind::RoundedRectangle => "Rounded Rectangle",
            ToolKind::Fill => "Fill With Color",
            ToolKind::ColorPicker => "Pick Color",
            ToolKind::Magnifier => "Magnifier",
        }
    }

    pub fn category(self) -> ToolCategory {
        match self {
            ToolKind::FreeFormSelect | ToolKind::RectSelect => ToolCategory::Selection,
            ToolKind::Pencil | ToolKind::Brush | ToolKind::Eraser | ToolKind::Airbrush | ToolKind::Text => {
                ToolCategory::Drawing
            }
            ToolKind::Line
            | ToolKind::Curve
            | ToolKind::Rectangle
            | ToolKind::Polygon
            | ToolKind::Ellipse
            | ToolKind::RoundedRectangle => ToolCategory::Shape,
            ToolKind::Fill | ToolKind::ColorPicker | ToolKind::Magnifier => ToolCategory::Utility,
        }
    }

    /// Tools whose pointer-down goes through the floating-object rules.
    pub fn captures(self) -> bool {
        matches!(self, ToolKind::FreeFormSelect | ToolKind::RectSelect | ToolKind::Text)
    }

    pub fn shortcut(self) -> Key {
        match self {
            ToolKind::FreeFormSelect => Key::F,
            ToolKind::RectSelect => Key::S,
            ToolKind::Pencil => Key::P,
            ToolKind::Brush => Key::B,
            ToolKind::Eraser => Key::E,
            ToolKind::Airbrush => Key::A,
            ToolKind::Text => Key::T,
            ToolKind::Line => Key::L,
            ToolKind::Curve => Key::C,
            ToolKind::Rectangle => Key::R,
            ToolKind::Polygon => Key::G,
            ToolKind::Ellipse => Key::O,
            ToolKind::RoundedRectangle => Key::U,
            ToolKind::Fill => Key::K,
            ToolKind::ColorPicker => Key::I,
            ToolKind::Magnifier => Key::Z,
        }
    }

    pub fn from_shortcut(key: Key) -> Option<ToolKind> {
        Self::ALL.into_iter().find(|k| k.shortcut() == key)
    }
}

/// A pointer event in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pos: Pos2,
    pub modifiers: Modifiers,
    /// 2 for the second press of a double click.
    pub click_count: u32,
}

impl PointerEvent {
    pub fn new(pos: Pos2) -> Self {
        Self {
            pos,
            modifiers: Modifiers::NONE,
            click_count: 1,
        }
    }

    /// Shift: 45° lines, squares and circles.
    pub fn constrain(&self) -> bool {
        self.modifiers.shift
    }

    /// Option/Alt: the alternate direction or color.
    pub fn alternate(&self) -> bool {
        self.modifiers.alt
    }
}

/// Tool trait defines the interface for all tools.
///
/// Pointer handlers only run for the primary button. Tools mutate the
/// workspace directly and emit their own commits.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Called when the tool is selected.
    fn activate(&mut self, _ws: &mut Workspace) {}

    /// Called when another tool is selected. Finishes or discards any
    /// in-progress gesture.
    fn deactivate(&mut self, ws: &mut Workspace);

    fn on_pointer_down(&mut self, event: &PointerEvent, ws: &mut Workspace);

    fn on_pointer_move(&mut self, event: &PointerEvent, ws: &mut Workspace);

    fn on_pointer_up(&mut self, event: &PointerEvent, ws: &mut Workspace);

    /// Periodic timer message, delivered while [`Tool::wants_ticks`] is true.
    fn tick(&mut self, _ws: &mut Workspace) {}

    fn wants_ticks(&self) -> bool {
        false
    }

    /// Whether the tool holds an unfinished gesture.
    fn is_busy(&self) -> bool;

    /// Drops any unfinished gesture without touching the canvas.
    fn cancel(&mut self);

    /// Ends the gesture for Escape or a canvas-wide edit. A tool that has
    /// already written to the canvas commits what it wrote; the others
    /// drop their preview.
    fn finish(&mut self, _ws: &mut Workspace) {
        self.cancel();
    }

    /// Draws the in-progress gesture over a copy of the canvas.
    fn preview(&self, _img: &mut RgbaImage) {}
}

/// Enum representing all available tools, dispatched by variant.
#[derive(Debug, Clone)]
pub enum ToolType {
    Select(SelectTool),
    Freehand(FreehandTool),
    Airbrush(AirbrushTool),
    Text(TextTool),
    Shape(ShapeTool),
    Curve(CurveTool),
    Polygon(PolygonTool),
    Fill(FillTool),
    ColorPicker(ColorPickerTool),
    Magnifier(MagnifierTool),
}

macro_rules! dispatch {
    ($self:expr, $tool:ident => $body:expr) => {
        match $self {
            ToolType::Select($tool) => $body,
            ToolType::Freehand($tool) => $body,
            ToolType::Airbrush($tool) => $body,
            ToolType::Text($tool) => $body,
            ToolType::Shape($tool) => $body,
            ToolType::Curve($tool) => $body,
            ToolType::Polygon($tool) => $body,
            ToolType::Fill($tool) => $body,
            ToolType::ColorPicker($tool) => $body,
            ToolType::Magnifier($tool) => $body,
        }
    };
}

impl Tool for ToolType {
    fn kind(&self) -> ToolKind {
        dispatch!(self, tool => tool.kind())
    }

    fn activate(&mut self, ws: &mut Workspace) {
        dispatch!(self, tool => tool.activate(ws))
    }

    fn deactivate(&mut self, ws: &mut Workspace) {
        dispatch!(self, tool => tool.deactivate(ws))
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        dispatch!(self, tool => tool.on_pointer_down(event, ws))
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        dispatch!(self, tool => tool.on_pointer_move(event, ws))
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, ws: &mut Workspace) {
        dispatch!(self, tool => tool.on_pointer_up(event, ws))
    }

    fn tick(&mut self, ws: &mut Workspace) {
        dispatch!(self, tool => tool.tick(ws))
    }

    fn wants_ticks(&self) -> bool {
        dispatch!(self, tool => tool.wants_ticks())
    }

    fn is_busy(&self) -> bool {
        dispatch!(self, tool => tool.is_busy())
    }

    fn cancel(&mut self) {
        dispatch!(self, tool => tool.cancel())
    }

    fn finish(&mut self, ws: &mut Workspace) {
        dispatch!(self, tool => Tool::finish(tool, ws))
    }

    fn preview(&self, img: &mut RgbaImage) {
        dispatch!(self, tool => tool.preview(img))
    }
}

/// Factory function to create a new tool of the specified kind
pub fn new_tool(kind: ToolKind) -> ToolType {
    match kind {
        ToolKind::FreeFormSelect => ToolType::Select(SelectTool::new(SelectMode::FreeForm)),
        ToolKind::RectSelect => ToolType::Select(SelectTool::new(SelectMode::Rect)),
        ToolKind::Pencil | ToolKind::Brush | ToolKind::Eraser => ToolType::Freehand(FreehandTool::new(kind)),
        ToolKind::Airbrush => ToolType::Airbrush(AirbrushTool::new()),
        ToolKind::Text => ToolType::Text(TextTool::new()),
        ToolKind::Line => ToolType::Shape(ShapeTool::new(ShapeKind::Line)),
        ToolKind::Rectangle => ToolType::Shape(ShapeTool::new(ShapeKind::Rectangle)),
        ToolKind::Ellipse => ToolType::Shape(ShapeTool::new(ShapeKind::Ellipse)),
        ToolKind::RoundedRectangle => ToolType::Shape(ShapeTool::new(ShapeKind::RoundedRectangle)),
        ToolKind::Curve => ToolType::Curve(CurveTool::new()),
        ToolKind::Polygon => ToolType::Polygon(PolygonTool::new()),
        ToolKind::Fill => ToolType::Fill(FillTool),
        ToolKind::ColorPicker => ToolType::ColorPicker(ColorPickerTool),
        ToolKind::Magnifier => ToolType::Magnifier(MagnifierTool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_builds_the_matching_tool() {
        for kind in ToolKind::ALL {
            assert_eq!(new_tool(kind).kind(), kind);
        }
    }

    #[test]
    fn shortcuts_are_unique() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_shortcut(kind.shortcut()), Some(kind));
        }
    }

    #[test]
    fn categories_cover_the_sixteen_tools() {
        let count = |c| ToolKind::ALL.iter().filter(|k| k.category() == c).count();
        assert_eq!(count(ToolCategory::Selection), 2);
        assert_eq!(count(ToolCategory::Drawing), 5);
        assert_eq!(count(ToolCategory::Shape), 6);
        assert_eq!(count(ToolCategory::Utility), 3);
    }
}
