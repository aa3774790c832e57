use std::path::PathBuf;

/// Convenience result type used across painterly.
pub type PainterlyResult<T> = Result<T, PainterlyError>;

/// Top-level error taxonomy used by filter and pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum PainterlyError {
    /// An input raster path does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A brush stencil path does not exist.
    #[error("brush asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    /// Raster bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Brush sizes must be positive and even.
    #[error("invalid brush size: {0} (sizes must be positive even integers)")]
    InvalidBrushSize(u32),

    /// Invalid user-provided parameters or mismatched inputs.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while running a filter or pipeline stage.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing parameter files.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PainterlyError {
    /// Build a [`PainterlyError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PainterlyError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PainterlyError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`PainterlyError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
