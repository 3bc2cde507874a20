//! Error types for sd-core
//!
//! Every failure of a deployment run surfaces as one of these variants. The
//! CLI turns any of them into a non-zero exit status.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for sd-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sd-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or incomplete deployment configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The user cancelled an interactive recovery menu
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// The local build directory is missing or not a directory
    #[error("Build folder not found: {}", .0.display())]
    BuildDirNotFound(PathBuf),

    /// The credential chain produced no usable credentials
    #[error("Failed to load AWS credentials: {0}")]
    Credentials(String),

    /// Unclassified object-store provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// A single object upload failed
    #[error("Failed to upload {key}: {message}")]
    Upload { key: String, message: String },

    /// CloudFront distribution creation failed
    #[error("CloudFront creation failed: {0}")]
    Distribution(String),

    /// Reading an answer from the terminal failed
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Whether the run ended because the user chose to stop
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }
}
