use std::fs;
use std::path::Path;
use std::time::Duration;

use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::shape::ShapeStyle;
use crate::text::FontSpec;

/// Largest canvas side accepted by default.
pub const MAX_CANVAS_DIM: u32 = 8192;

/// Where pointer coordinates coming from the event source have their origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DisplayOrigin {
    /// Same as the pixel buffer: y grows downwards.
    #[default]
    TopLeft,
    /// y grows upwards from the bottom edge of the canvas.
    BottomLeft,
}

impl DisplayOrigin {
    /// Converts a display point into buffer coordinates (origin top-left).
    pub fn to_buffer(self, pos: Pos2, canvas_height: u32) -> Pos2 {
        match self {
            DisplayOrigin::TopLeft => pos,
            DisplayOrigin::BottomLeft => Pos2::new(pos.x, canvas_height as f32 - pos.y),
        }
    }
}

/// Tunables of the editing engine.
///
/// Every field has a default, so a config file only needs to name the values
/// it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_canvas_dim: u32,
    pub max_canvas_dim: u32,

    /// Per-channel distance under which the fill color is considered equal to
    /// the clicked color (fill becomes a no-op).
    pub fill_noop_tolerance: u8,
    /// Per-channel distance under which a neighbour joins the filled region.
    pub fill_match_tolerance: u8,

    pub pencil_multiplier: f32,
    pub brush_multiplier: f32,
    pub eraser_multiplier: f32,

    pub airbrush_interval_ms: u64,
    pub airbrush_dots_per_size: u32,
    pub airbrush_radius_per_size: f32,
    pub airbrush_seed: Option<u64>,

    pub handle_size: f32,
    pub rotate_handle_offset: f32,
    pub min_text_box: f32,
    pub rounded_corner_ratio: f32,

    pub display_origin: DisplayOrigin,

    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_canvas_dim: 50,
            max_canvas_dim: MAX_CANVAS_DIM,
            fill_noop_tolerance: 1,
            fill_match_tolerance: 32,
            pencil_multiplier: 1.0,
            brush_multiplier: 2.5,
            eraser_multiplier: 3.0,
            airbrush_interval_ms: 40,
            airbrush_dots_per_size: 3,
            airbrush_radius_per_size: 2.0,
            airbrush_seed: None,
            handle_size: 8.0,
            rotate_handle_offset: 30.0,
            min_text_box: 10.0,
            rounded_corner_ratio: 0.25,
            display_origin: DisplayOrigin::TopLeft,
            min_zoom: 1.0,
            max_zoom: 8.0,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file. A missing file is not an error: defaults are used.
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> EngineResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn airbrush_interval(&self) -> Duration {
        Duration::from_millis(self.airbrush_interval_ms.max(1))
    }

    pub fn clamp_dim(&self, dim: u32) -> u32 {
        dim.clamp(self.min_canvas_dim, self.max_canvas_dim)
    }
}

/// User-facing tool options shared by all tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub foreground: Color32,
    pub background: Color32,
    /// Base size; each tool derives its effective width from it.
    pub size: f32,
    pub shape_style: ShapeStyle,
    pub font: FontSpec,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            foreground: Color32::BLACK,
            background: Color32::WHITE,
            size: 2.0,
            shape_style: ShapeStyle::Outline,
            font: FontSpec::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "fill_match_tolerance": 10 }"#).unwrap();
        assert_eq!(config.fill_match_tolerance, 10);
        assert_eq!(config.max_canvas_dim, 8192);
        assert_eq!(config.brush_multiplier, 2.5);
    }

    #[test]
    fn bottom_left_origin_flips_y() {
        let p = DisplayOrigin::BottomLeft.to_buffer(Pos2::new(3.0, 10.0), 100);
        assert_eq!(p, Pos2::new(3.0, 90.0));
        let q = DisplayOrigin::TopLeft.to_buffer(Pos2::new(3.0, 10.0), 100);
        assert_eq!(q, Pos2::new(3.0, 10.0));
    }

    #[test]
    fn clamp_dim_limits() {
        let config = EngineConfig::default();
        assert_eq!(config.clamp_dim(10), 50);
        assert_eq!(config.clamp_dim(100_000), 8192);
        assert_eq!(config.clamp_dim(640), 640);
    }

    #[test]
    fn save_and_load_file() {
        let path = std::env::temp_dir().join(format!("canvas_paint_config_{}.json", std::process::id()));
        let mut config = EngineConfig::default();
        config.airbrush_seed = Some(7);
        config.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
