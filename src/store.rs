//! The persisted project configuration (`cbatch.toml`).
//!
//! ```toml
//! [General]
//! codebase_type = "FastAPI backend"
//! deployment_location = "AWS"
//!
//! [Summary]
//! input_token_estimate = 48213
//! updated_at = "2026-10-16 09:12:44"
//! ```

use crate::error::{Error, Result};
use serde::Serialize;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use toml::{Table, Value};

const GENERAL: &str = "General";
const SUMMARY: &str = "Summary";
const ESTIMATE_KEY: &str = "input_token_estimate";
const UPDATED_AT_KEY: &str = "updated_at";

/// One descriptive `key = value` entry from the `General` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderField {
    /// Key as stored, e.g. `codebase_type`
    pub key: String,
    /// Free-form value
    pub value: String,
}

impl HeaderField {
    /// Creates a new field.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Values written back after a refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Whitespace-word count of the last generated document
    pub input_token_estimate: Option<usize>,

    /// Local time of the last refresh
    pub updated_at: Option<String>,
}

impl Summary {
    fn from_table(table: &Table) -> Self {
        Self {
            input_token_estimate: table
                .get(ESTIMATE_KEY)
                .and_then(Value::as_integer)
                .and_then(|n| usize::try_from(n).ok()),
            updated_at: table
                .get(UPDATED_AT_KEY)
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// The project configuration store, loaded into an explicit value.
///
/// Tables and keys this crate does not manage are written back untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    path: PathBuf,
    document: Table,
    general: Vec<HeaderField>,
    summary: Summary,
}

impl ProjectConfig {
    /// Creates a fresh configuration with the given descriptive fields and an empty summary.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, general: Vec<HeaderField>) -> Self {
        Self {
            path: path.into(),
            document: Table::new(),
            general,
            summary: Summary::default(),
        }
    }

    /// Loads the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigMissing`] if the file does not exist, cannot be
    /// parsed, or has no `[General]` section, and an IO error if it cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::config_missing(path, "does not exist"));
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        let document: Table = toml::from_str(&raw).map_err(|e| {
            Error::config_missing(path, format!("is malformed ({})", e.message()))
        })?;

        let general = document
            .get(GENERAL)
            .and_then(Value::as_table)
            .ok_or_else(|| Error::config_missing(path, "[General] section is missing"))?
            .iter()
            .map(|(key, value)| HeaderField::new(key.as_str(), field_text(value)))
            .collect();

        let summary = document
            .get(SUMMARY)
            .and_then(Value::as_table)
            .map(Summary::from_table)
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            document,
            general,
            summary,
        })
    }

    /// Reads only the stored token estimate, if any.
    ///
    /// A missing or unparsable store yields `None`; the `[General]` section is not required.
    #[must_use]
    pub fn stored_estimate(path: impl AsRef<Path>) -> Option<usize> {
        let raw = fs::read_to_string(path).ok()?;
        let document: Table = toml::from_str(&raw).ok()?;
        let summary = document.get(SUMMARY)?.as_table()?;
        Summary::from_table(summary).input_token_estimate
    }

    /// Writes the store, replacing the file.
    ///
    /// Only the `General` fields and the two summary keys are rewritten.
    /// A `General` value that was not a string keeps its type while its
    /// text is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<()> {
        let mut document = self.document.clone();

        let previous = document.get(GENERAL).and_then(Value::as_table);
        let general: Table = self
            .general
            .iter()
            .map(|field| {
                let value = previous
                    .and_then(|table| table.get(&field.key))
                    .filter(|value| field_text(value) == field.value)
                    .cloned()
                    .unwrap_or_else(|| Value::String(field.value.clone()));
                (field.key.clone(), value)
            })
            .collect();
        document.insert(GENERAL.to_string(), Value::Table(general));

        let mut summary = document
            .get(SUMMARY)
            .and_then(Value::as_table)
            .cloned()
            .unwrap_or_default();
        match self.summary.input_token_estimate {
            Some(estimate) => {
                let estimate = i64::try_from(estimate).map_err(|e| Error::store(&self.path, e))?;
                summary.insert(ESTIMATE_KEY.to_string(), Value::Integer(estimate));
            }
            None => {
                summary.remove(ESTIMATE_KEY);
            }
        }
        match &self.summary.updated_at {
            Some(updated_at) => {
                summary.insert(UPDATED_AT_KEY.to_string(), Value::String(updated_at.clone()));
            }
            None => {
                summary.remove(UPDATED_AT_KEY);
            }
        }
        document.insert(SUMMARY.to_string(), Value::Table(summary));

        let raw = toml::to_string_pretty(&document).map_err(|e| Error::store(&self.path, e))?;
        fs::write(&self.path, raw).map_err(|e| Error::io(&self.path, e))
    }

    /// Returns the configuration with `estimate` recorded in the summary.
    #[must_use]
    pub fn with_estimate(mut self, estimate: usize) -> Self {
        self.summary.input_token_estimate = Some(estimate);
        self.summary.updated_at = Some(
            chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        );
        self
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Descriptive fields in file order.
    #[must_use]
    pub fn general(&self) -> &[HeaderField] {
        &self.general
    }

    /// The refresh summary.
    #[must_use]
    pub const fn summary(&self) -> &Summary {
        &self.summary
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
