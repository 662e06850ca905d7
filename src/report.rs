use std::fmt;
use std::path::Path;

use tracing::{Level, debug, error, info};

use crate::error::UploadError;

/// Something that happened during an upload pass
#[derive(Debug, Clone, Copy)]
pub enum UploadEvent<'a> {
    Started {
        source: &'a Path,
        target: &'a str,
        bucket: &'a str,
    },
    NoFiles {
        source: &'a Path,
        pattern: &'a str,
    },
    FileStarted {
        path: &'a Path,
        key: &'a str,
        content_type: Option<&'a str>,
    },
    FileProgress {
        path: &'a Path,
        loaded: u64,
        total: u64,
    },
    FileCompleted {
        path: &'a Path,
        key: &'a str,
        bytes: u64,
    },
    FileFailed {
        path: &'a Path,
        error: &'a UploadError,
    },
    Finished {
        files: usize,
        bytes: u64,
    },
}

impl fmt::Display for UploadEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started {
                source,
                target,
                bucket,
            } => write!(
                f,
                "Uploading files from {} to '{}' in bucket '{}'",
                source.display(),
                target,
                bucket
            ),
            Self::NoFiles { source, pattern } => write!(
                f,
                "No files found in {} matching '{}'",
                source.display(),
                pattern
            ),
            Self::FileStarted {
                path,
                key,
                content_type,
            } => {
                write!(f, "Uploading {} to {}", path.display(), key)?;
                if let Some(content_type) = content_type {
                    write!(f, " with content type {}", content_type)?;
                }
                Ok(())
            }
            Self::FileProgress {
                path,
                loaded,
                total,
            } => write!(
                f,
                "Uploading {}: {}",
                path.display(),
                format_progress(*loaded, *total)
            ),
            Self::FileCompleted { path, key, bytes } => write!(
                f,
                "Uploaded {} to {} ({})",
                path.display(),
                key,
                format_size(*bytes)
            ),
            // The error already names the file and key
            Self::FileFailed { error, .. } => write!(f, "{}", error),
            Self::Finished { files, bytes } => write!(
                f,
                "Upload completed: {} file(s), {}",
                files,
                format_size(*bytes)
            ),
        }
    }
}

/// Receives upload events as they happen
pub trait Reporter {
    fn report(&self, event: &UploadEvent<'_>);
}

/// Writes every event to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
    /// Per-chunk progress is chatty, so it stays below the default `info` filter
    pub fn level(event: &UploadEvent<'_>) -> Level {
        match event {
            UploadEvent::FileFailed { .. } => Level::ERROR,
            UploadEvent::FileProgress { .. } => Level::DEBUG,
            _ => Level::INFO,
        }
    }
}

impl Reporter for TracingReporter {
    fn report(&self, event: &UploadEvent<'_>) {
        match Self::level(event) {
            Level::ERROR => error!("{}", event),
            Level::DEBUG => debug!("{}", event),
            _ => info!("{}", event),
        }
    }
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Percentage of `total` transferred, floored to a whole number
pub fn progress_percent(loaded: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    (loaded.min(total) as u128 * 100 / total as u128) as u64
}

/// `transferred / total (pct%)` with readable sizes
pub fn format_progress(loaded: u64, total: u64) -> String {
    format!(
        "{} / {} ({:.1}%)",
        format_size(loaded),
        format_size(total),
        progress_percent(loaded, total) as f64
    )
}
