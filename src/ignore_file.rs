use crate::{
    error::{Error, Result},
    pattern::DEFAULT_IGNORE_PATTERNS,
};
use std::{fs, io::ErrorKind, path::Path};
use tracing::debug;

const IGNORE_FILE_HEADER: &str = "# Default ignore patterns for cbatch";

/// Extracts patterns from ignore-file text.
///
/// Lines are trimmed; blank lines and lines starting with `#` are dropped.
#[must_use]
pub fn parse_ignore_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Reads the user's ignore patterns. A missing file yields no patterns.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn read_ignore_file(path: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let patterns = parse_ignore_patterns(&content);
            debug!("Loaded {} patterns from {}", patterns.len(), path.display());
            Ok(patterns)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No ignore file at {}", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Writes an ignore file seeded with [`DEFAULT_IGNORE_PATTERNS`] unless one exists.
///
/// Returns `true` if the file was created.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_default_ignore_file(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    let mut content = String::from(IGNORE_FILE_HEADER);
    content.push('\n');
    for pattern in DEFAULT_IGNORE_PATTERNS {
        content.push_str(pattern);
        content.push('\n');
    }

    fs::write(path, content).map_err(|e| Error::io(path, e))?;
    Ok(true)
}
