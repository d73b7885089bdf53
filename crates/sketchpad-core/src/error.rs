//! Error types for the sketchpad core.

use thiserror::Error;

/// Errors raised by the sketchpad core.
///
/// Empty history and a missing open gesture are not errors: those
/// operations are silent no-ops.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Sticker glyph must not be empty")]
    InvalidGlyph,
    #[error("Failed to parse config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for sketchpad core operations.
pub type Result<T> = std::result::Result<T, Error>;
