mod editor_state;
pub mod context;
mod edit;
mod workspace;

pub use context::EditorContext;
pub use editor_state::EditorState;
pub use workspace::Workspace;
