use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the cbatch library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Template rendering error.
    #[error("Failed to render template '{template}': {message}")]
    Template {
        /// Template name
        template: String,
        /// Error message
        message: String,
    },

    /// Invalid run configuration.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// The configuration store is absent or lacks required structure.
    #[error("{path} not found or {reason}. Run 'cbatch init' to set up configuration.")]
    ConfigMissing {
        /// Path of the expected store
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// The configuration store could not be parsed or serialized.
    #[error("Malformed configuration store '{path}': {message}")]
    Store {
        /// Path of the store
        path: PathBuf,
        /// Parser or serializer message
        message: String,
    },

    /// Invalid UTF-8 encountered in file.
    #[error("Invalid UTF-8 encoding in file '{path}'. File may be binary or use unsupported encoding.")]
    InvalidUtf8 {
        /// Path to file with encoding issues
        path: PathBuf,
    },

    /// File content contains NUL bytes.
    #[error("File '{path}' looks binary (contains NUL bytes)")]
    Binary {
        /// Path to the binary file
        path: PathBuf,
    },

    /// Directory traversal failed for an entry.
    #[error("Failed to walk '{path}': {message}")]
    Walk {
        /// Path being visited, when known
        path: PathBuf,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a configuration-missing error.
    #[must_use]
    pub fn config_missing(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConfigMissing {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a store error.
    #[must_use]
    pub fn store(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Store {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Creates a template error.
    #[must_use]
    pub fn template(template: impl Into<String>, source: &tera::Error) -> Self {
        // tera nests the useful part (syntax position, missing variable) in `source`
        let mut message = source.to_string();
        let mut cause = std::error::Error::source(source);
        while let Some(inner) = cause {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            cause = inner.source();
        }

        Self::Template {
            template: template.into(),
            message,
        }
    }

    /// Creates an invalid UTF-8 error.
    #[must_use]
    pub fn invalid_utf8(path: impl Into<PathBuf>) -> Self {
        Self::InvalidUtf8 { path: path.into() }
    }

    /// Creates a binary content error.
    #[must_use]
    pub fn binary(path: impl Into<PathBuf>) -> Self {
        Self::Binary { path: path.into() }
    }

    /// Creates a walk error from a `walkdir` failure.
    #[must_use]
    pub fn walk(source: &walkdir::Error) -> Self {
        Self::Walk {
            path: source.path().map(PathBuf::from).unwrap_or_default(),
            message: source.to_string(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if the configuration store is missing or incomplete.
    #[must_use]
    pub const fn is_config_missing(&self) -> bool {
        matches!(self, Self::ConfigMissing { .. })
    }

    /// Returns true if this error describes a file that could not be read as text.
    #[must_use]
    pub const fn is_unreadable_file(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::InvalidUtf8 { .. } | Self::Binary { .. } | Self::Walk { .. }
        )
    }
}
