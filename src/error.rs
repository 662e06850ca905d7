use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during an upload pass
#[derive(Error, Debug)]
pub enum UploadError {
    /// Missing or invalid bucket, region, credentials or folder settings
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Source folder does not exist or is not a directory
    #[error("Source folder not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// Content pattern could not be compiled
    #[error("Invalid content pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Walking the source folder failed
    #[error("Failed to read {}: {message}", path.display())]
    Discovery { path: PathBuf, message: String },

    /// A single file failed to upload; the pass stops here
    #[error("Failed to upload {} to '{key}': {message}", path.display())]
    Transfer {
        path: PathBuf,
        key: String,
        message: String,
    },
}

impl UploadError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a transfer error from the storage client's error chain
    pub(crate) fn transfer(path: impl Into<PathBuf>, key: &str, error: &anyhow::Error) -> Self {
        Self::Transfer {
            path: path.into(),
            key: key.to_string(),
            message: format!("{:#}", error),
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(message) => {
                format!(
                    "Invalid configuration: {}\n\nPossible solutions:\n  \
                     1. Check DO_SPACES_REGION, DO_SPACES_BUCKET, DO_SPACES_KEY and DO_SPACES_SECRET\n  \
                     2. Put them in a .env file or export them in the pipeline step",
                    message
                )
            }
            Self::SourceNotFound { path } => {
                format!(
                    "Source folder not found: {}\n\nPossible solutions:\n  \
                     1. Check that the build step produced its output\n  \
                     2. Verify the folder exists: ls -la {}",
                    path.display(),
                    path.display()
                )
            }
            Self::Transfer { path, key, message } => {
                let lower = message.to_lowercase();
                let hint = if lower.contains("access denied") || lower.contains("forbidden") {
                    "  1. Check that the access key has write access to the bucket\n  \
                     2. Verify DO_SPACES_REGION matches the bucket's region"
                } else {
                    "  1. Check your network connection\n  \
                     2. Re-run the step; uploads are idempotent per key"
                };
                format!(
                    "Failed to upload {} to '{}': {}\n\nPossible solutions:\n{}",
                    path.display(),
                    key,
                    message,
                    hint
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for upload operations
pub type Result<T> = std::result::Result<T, UploadError>;
