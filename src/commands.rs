//! The three operations behind the `cbatch` subcommands.

use crate::{
    config::Config,
    error::Result,
    ignore_file::create_default_ignore_file,
    pipeline::{Pipeline, RefreshOutcome},
    store::{HeaderField, ProjectConfig},
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of `cbatch init`.
#[derive(Debug, Clone)]
pub struct InitOutcome {
    /// The store that was written
    pub store_file: PathBuf,
    /// The ignore file
    pub ignore_file: PathBuf,
    /// False if an ignore file already existed and was kept
    pub ignore_file_created: bool,
}

/// Writes a fresh store with `fields` and seeds the ignore file if absent.
///
/// An existing store is replaced, including its summary.
///
/// # Errors
///
/// Returns an error if either file cannot be written.
pub fn init(
    store_file: &Path,
    ignore_file: &Path,
    fields: Vec<HeaderField>,
) -> Result<InitOutcome> {
    ProjectConfig::new(store_file, fields).save()?;
    debug!("Saved project description to {}", store_file.display());

    let ignore_file_created = create_default_ignore_file(ignore_file)?;

    Ok(InitOutcome {
        store_file: store_file.to_path_buf(),
        ignore_file: ignore_file.to_path_buf(),
        ignore_file_created,
    })
}

/// Loads the store named by `config` and runs the refresh pipeline.
///
/// # Errors
///
/// Returns [`crate::Error::ConfigMissing`] if the store is absent or incomplete,
/// and any fatal pipeline error.
pub fn refresh(config: Config) -> Result<RefreshOutcome> {
    let project = ProjectConfig::load(&config.store_file)?;
    Pipeline::new(config)?.run(project)
}

/// Returns the operator-facing line describing the stored estimate.
#[must_use]
pub fn report_estimate(store_file: &Path) -> String {
    match ProjectConfig::stored_estimate(store_file) {
        Some(estimate) => format!(
            "Estimated input tokens (from {}): {estimate}",
            store_file.display()
        ),
        None => format!(
            "Token estimate not found in {}. Run 'cbatch update' first to generate the output and estimate tokens.",
            store_file.display()
        ),
    }
}
