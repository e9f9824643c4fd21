use thiserror::Error;

/// Errors raised inside the engine.
///
/// None of these reach the user as a failure: the public entry points log
/// them and skip the operation (see the router and the command queue).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to decode image data: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Clipboard holds no bitmap payload")]
    EmptyClipboard,

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("No font available for '{0}'")]
    MissingFont(String),

    #[error("Invalid font data: {0}")]
    InvalidFont(String),

    #[error("Failed to read or write config: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur during editor state transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateTransitionError {
    /// Attempted to transition between incompatible states
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}
