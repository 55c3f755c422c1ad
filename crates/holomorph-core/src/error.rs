//! Error types for the holomorph system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Landmark source error: {0}")]
    Source(String),

    #[error("Invalid hand frame: {0}")]
    InvalidFrame(String),

    #[error("Landmark count mismatch: expected {expected}, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Glyph rasterization error: {0}")]
    Raster(String),

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
