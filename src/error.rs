//! Error type shared by every generation stage.

use thiserror::Error;

/// Errors raised by noise generation and its host-side collaborators
#[derive(Debug, Error)]
pub enum NoiseError {
    /// A static parameter was rejected before any work was dispatched
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The GPU substrate could not be created or failed during dispatch
    #[error("gpu dispatch failed: {0}")]
    Gpu(String),

    /// Writing a generated field to disk failed
    #[error("export failed: {0}")]
    Export(#[from] image::ImageError),

    #[error("settings file could not be read: {0}")]
    SettingsIo(#[from] std::io::Error),

    #[error("settings file is malformed: {0}")]
    SettingsFormat(#[from] serde_json::Error),
}

impl NoiseError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        NoiseError::InvalidParameter(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, NoiseError>;
