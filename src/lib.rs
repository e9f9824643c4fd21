#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod commit;
pub mod config;
pub mod document;
pub mod error;
pub mod fill;
pub mod input;
pub mod raster;
pub mod render;
pub mod selection;
pub mod shape;
pub mod state;
pub mod stroke;
pub mod text;
pub mod tools;

pub use app::PaintApp;
pub use command::{CommandError, CommandQueue, EditorCommand};
pub use commit::{Commit, CommitLog, CommitSink, NullSink};
pub use config::{DisplayOrigin, EngineConfig, ToolSettings};
pub use document::Document;
pub use error::{EngineError, EngineResult};
pub use input::{InputEvent, InputHandler};
pub use raster::RasterBuffer;
pub use render::Frame;
pub use selection::{Clipboard, Cursor, FloatingSelection, MemoryClipboard};
pub use state::{EditorContext, EditorState, Workspace};
pub use tools::{Tool, ToolKind};
