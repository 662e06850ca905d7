use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, UploadError};

/// Pattern used when none is given: every file below the source folder
pub const DEFAULT_PATTERN: &str = "**/*";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug)]
struct Rule {
    pattern: Pattern,
    exclude: bool,
}

/// Compiled content pattern
///
/// One glob per line, matched against the path relative to the source folder
/// using `/` separators. Lines starting with `!` exclude. The last matching line
/// decides, so later lines refine earlier ones.
#[derive(Debug)]
pub struct ContentPattern {
    rules: Vec<Rule>,
}

impl ContentPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut rules = Vec::new();

        for line in pattern.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (exclude, glob) = match line.strip_prefix('!') {
                Some(rest) => (true, rest.trim()),
                None => (false, line),
            };
            let glob = glob.trim_start_matches("./");

            let compiled = Pattern::new(glob).map_err(|e| UploadError::InvalidPattern {
                pattern: line.to_string(),
                message: e.to_string(),
            })?;
            rules.push(Rule {
                pattern: compiled,
                exclude,
            });
        }

        if rules.is_empty() {
            return Err(UploadError::InvalidPattern {
                pattern: pattern.to_string(),
                message: "pattern is empty".to_string(),
            });
        }

        Ok(Self { rules })
    }

    /// Check a `/`-separated path relative to the source folder
    pub fn matches(&self, relative: &str) -> bool {
        self.rules.iter().fold(false, |selected, rule| {
            if rule.pattern.matches_with(relative, MATCH_OPTIONS) {
                !rule.exclude
            } else {
                selected
            }
        })
    }
}

/// Find the regular files below `source_folder` selected by `pattern`
///
/// Results are absolute paths (when `source_folder` is) sorted by path, so the
/// upload order is stable between runs. Symlinks are followed and reported under
/// their link path; a link loop is a discovery error.
///
/// # Errors
///
/// Returns [`UploadError::SourceNotFound`] when the folder is missing,
/// [`UploadError::InvalidPattern`] for a malformed pattern and
/// [`UploadError::Discovery`] when the folder can't be walked.
pub fn find_files(source_folder: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !source_folder.is_dir() {
        return Err(UploadError::SourceNotFound {
            path: source_folder.to_path_buf(),
        });
    }

    let pattern = ContentPattern::new(pattern)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(source_folder)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| UploadError::Discovery {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source_folder.to_path_buf()),
            message: e.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(source_folder) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if pattern.matches(&relative) {
            files.push(entry.into_path());
        } else {
            debug!("Skipping {} (not selected by pattern)", relative);
        }
    }

    Ok(files)
}
