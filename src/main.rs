#![warn(clippy::all, rust_2018_idioms)]

const CONFIG_ENV: &str = "CANVAS_PAINT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "canvas_paint.json";

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    use canvas_paint::{EngineConfig, PaintApp};
    use log::{info, warn};

    env_logger::init();

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let config = if std::path::Path::new(&path).exists() {
        EngineConfig::load(&path).unwrap_or_else(|err| {
            warn!("Ignoring {path}: {err}");
            EngineConfig::default()
        })
    } else {
        info!("No config at {path}, using defaults");
        EngineConfig::default()
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([400.0, 300.0])
            .with_title("Canvas Paint"),
        ..Default::default()
    };

    eframe::run_native(
        "Canvas Paint",
        options,
        Box::new(|cc| Ok(Box::new(PaintApp::new(cc, config)))),
    )
}

// The web build is started from JavaScript; nothing to do here.
#[cfg(target_arch = "wasm32")]
fn main() {
    let _ = (CONFIG_ENV, DEFAULT_CONFIG_PATH);
}
