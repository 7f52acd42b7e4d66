use crate::{
    assembler::{Assembler, Assembly},
    config::Config,
    error::{Error, Result},
    ignore_file::read_ignore_file,
    store::ProjectConfig,
    writer::write_document,
};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// What happened to the token estimate after a refresh.
#[derive(Debug, Clone)]
pub enum EstimateRecord {
    /// Written to the configuration store.
    Stored,
    /// The store could not be written; the document is still valid.
    NotStored(Error),
    /// Dry run: nothing was persisted.
    DryRun,
}

/// Result of a refresh run.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// The assembled document and its file lists
    pub assembly: Assembly,

    /// The configuration, with the new estimate recorded
    pub project: ProjectConfig,

    /// Whether the estimate reached the store
    pub estimate_record: EstimateRecord,

    /// Total execution time
    pub duration: Duration,
}

impl RefreshOutcome {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self, config: &Config) {
        let assembly = &self.assembly;
        let store = self.project.path().display();

        if matches!(self.estimate_record, EstimateRecord::DryRun) {
            println!("Dry run: {} was not written", config.output_file.display());
        } else {
            println!("Codebase structured output written to: {}", config.output_file.display());
        }

        match &self.estimate_record {
            EstimateRecord::Stored => {
                println!("Estimated input tokens: {} (updated in {store})", assembly.estimate);
            }
            EstimateRecord::NotStored(e) => {
                println!("Estimated input tokens: {}", assembly.estimate);
                println!(
                    "Warning: Could not update {store} ({e}) - run 'cbatch init' first if you want to track token estimates."
                );
            }
            EstimateRecord::DryRun => {
                println!("Estimated input tokens: {}", assembly.estimate);
            }
        }

        println!(
            "Files: {} included, {} excluded, {} unreadable ({:.2}s)",
            assembly.stats.included,
            assembly.stats.excluded,
            assembly.skipped.len(),
            self.duration.as_secs_f64()
        );

        for skipped in &assembly.skipped {
            println!("  skipped {}: {}", skipped.relative_path, skipped.reason);
        }
    }
}

/// Runs a refresh: assemble, write the document, record the estimate.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The run configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Executes the refresh for `project` and returns it with the new estimate.
    ///
    /// # Process
    ///
    /// 1. **Patterns**: built-in defaults merged with the ignore file
    /// 2. **Assemble**: walk, filter, read and render the document
    /// 3. **Write**: replace the output document (fatal on failure)
    /// 4. **Record**: save the estimate to the store (best-effort)
    ///
    /// # Errors
    ///
    /// Returns an error if the ignore file or a template cannot be read, or if
    /// the output document cannot be written.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cbatch::{Config, Pipeline, ProjectConfig};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder().root_dir(".").build()?;
    /// let project = ProjectConfig::load(&config.store_file)?;
    ///
    /// let outcome = Pipeline::new(config)?.run(project)?;
    /// println!("{} tokens", outcome.assembly.estimate);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, fields(root_dir = %self.config.root_dir.display()))]
    pub fn run(&self, project: ProjectConfig) -> Result<RefreshOutcome> {
        let start_time = Instant::now();

        let user_patterns = read_ignore_file(&self.config.ignore_file)?;
        let patterns = self.config.merge_policy.merge(&user_patterns);
        info!(
            "Using {} ignore patterns ({} from {})",
            patterns.len(),
            user_patterns.len(),
            self.config.ignore_file.display()
        );

        let assembly =
            Assembler::from_config(&self.config, &patterns)?.assemble(project.general())?;

        info!(
            "✓ Assembled {} files, {} tokens estimated",
            assembly.included.len(),
            assembly.estimate
        );
        if !assembly.skipped.is_empty() {
            warn!("{} files could not be read and were left out", assembly.skipped.len());
        }

        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping file writes");
            return Ok(RefreshOutcome {
                assembly,
                project,
                estimate_record: EstimateRecord::DryRun,
                duration: start_time.elapsed(),
            });
        }

        write_document(&self.config.output_file, &assembly.document)?;
        info!("✓ Wrote {}", self.config.output_file.display());

        let project = project.with_estimate(assembly.estimate);
        let estimate_record = match project.save() {
            Ok(()) => EstimateRecord::Stored,
            Err(e) => {
                warn!("Could not record token estimate: {}", e);
                EstimateRecord::NotStored(e)
            }
        };

        Ok(RefreshOutcome {
            assembly,
            project,
            estimate_record,
            duration: start_time.elapsed(),
        })
    }
}
