use crate::{
    error::{Error, Result},
    token::estimate_tokens,
};
use std::fs;
use std::path::Path;

/// A file that survived filtering, with its text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    /// Path relative to the traversal root, `/`-separated
    pub relative_path: String,

    /// Full file content
    pub content: String,

    /// Word-count estimate of `content` alone
    pub token_count: usize,
}

impl FileData {
    /// Creates file data, estimating tokens from `content`.
    #[must_use]
    pub fn new(relative_path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let token_count = estimate_tokens(&content);
        Self {
            relative_path: relative_path.into(),
            content,
            token_count,
        }
    }

    /// Returns the number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// A file that was discovered and not excluded, but could not be read.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    /// Path relative to the traversal root
    pub relative_path: String,

    /// Why it was skipped
    pub reason: Error,
}

/// Reads a whole file as UTF-8 text.
///
/// # Errors
///
/// Returns an IO error if the file cannot be read, [`Error::Binary`] if it
/// contains NUL bytes, and [`Error::InvalidUtf8`] if it is not valid UTF-8.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;

    if memchr::memchr(0, &bytes).is_some() {
        return Err(Error::binary(path));
    }

    String::from_utf8(bytes).map_err(|_| Error::invalid_utf8(path))
}

/// Converts a root-relative path to the `/`-separated form patterns are matched against.
#[must_use]
pub(crate) fn normalize_relative(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
