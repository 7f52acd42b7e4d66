use crate::error::{Error, Result};
use crate::pattern::{CONFIG_FILE, DEFAULT_OUTPUT_FILE, IGNORE_FILE, MatchOptions, MergePolicy};
use std::path::PathBuf;

/// Settings for one refresh run.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory to walk
    pub root_dir: PathBuf,

    /// Where the assembled document is written
    pub output_file: PathBuf,

    /// User-editable ignore patterns
    pub ignore_file: PathBuf,

    /// Configuration store receiving the token estimate
    pub store_file: PathBuf,

    /// How the ignore file combines with the built-in patterns
    pub merge_policy: MergePolicy,

    /// Glob evaluation options
    pub match_options: MatchOptions,

    /// Sort sections by relative path instead of walk order
    pub sort_files: bool,

    /// Emit the per-file token index before the file sections
    pub include_routes: bool,

    /// Tera template replacing the built-in document layout
    pub template_path: Option<PathBuf>,

    /// Assemble and report without writing anything
    pub dry_run: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use cbatch::Config;
    ///
    /// let config = Config::builder()
    ///     .root_dir(".")
    ///     .sort_files(true)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Root directory doesn't exist or is not a directory
    /// - Output path is a directory
    /// - Template path is set but is not a file
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.exists() {
            return Err(Error::config(format!(
                "Root directory does not exist: {}",
                self.root_dir.display()
            )));
        }

        if !self.root_dir.is_dir() {
            return Err(Error::config(format!(
                "Root path is not a directory: {}",
                self.root_dir.display()
            )));
        }

        if self.output_file.is_dir() {
            return Err(Error::config(format!(
                "Output path is a directory: {}",
                self.output_file.display()
            )));
        }

        if let Some(ref template_path) = self.template_path {
            if !template_path.is_file() {
                return Err(Error::config(format!(
                    "Template file does not exist: {}",
                    template_path.display()
                )));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            ignore_file: PathBuf::from(IGNORE_FILE),
            store_file: PathBuf::from(CONFIG_FILE),
            merge_policy: MergePolicy::default(),
            match_options: MatchOptions::default(),
            sort_files: false,
            include_routes: false,
            template_path: None,
            dry_run: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    output_file: Option<PathBuf>,
    ignore_file: Option<PathBuf>,
    store_file: Option<PathBuf>,
    merge_policy: Option<MergePolicy>,
    case_insensitive: Option<bool>,
    sort_files: bool,
    include_routes: bool,
    template_path: Option<PathBuf>,
    dry_run: bool,
}

impl ConfigBuilder {
    /// Sets the root directory to walk.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the output document path.
    #[must_use]
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Sets the ignore file path.
    #[must_use]
    pub fn ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_file = Some(path.into());
        self
    }

    /// Sets the configuration store path.
    #[must_use]
    pub fn store_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_file = Some(path.into());
        self
    }

    /// Sets how user patterns combine with the built-in ones.
    #[must_use]
    pub fn merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = Some(policy);
        self
    }

    /// Forces case-insensitive (or case-sensitive) pattern matching.
    ///
    /// When unset, the host convention applies.
    #[must_use]
    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = Some(enabled);
        self
    }

    /// Sorts file sections by relative path.
    #[must_use]
    pub fn sort_files(mut self, enabled: bool) -> Self {
        self.sort_files = enabled;
        self
    }

    /// Emits the per-file token index.
    #[must_use]
    pub fn include_routes(mut self, enabled: bool) -> Self {
        self.include_routes = enabled;
        self
    }

    /// Sets the path to an external template file.
    ///
    /// The template receives the same `ctx` value as the built-in one.
    #[must_use]
    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let defaults = Config::default();
        let match_options = self
            .case_insensitive
            .map_or(defaults.match_options, |case_insensitive| MatchOptions { case_insensitive });

        let config = Config {
            root_dir: self.root_dir.unwrap_or(defaults.root_dir),
            output_file: self.output_file.unwrap_or(defaults.output_file),
            ignore_file: self.ignore_file.unwrap_or(defaults.ignore_file),
            store_file: self.store_file.unwrap_or(defaults.store_file),
            merge_policy: self.merge_policy.unwrap_or(defaults.merge_policy),
            match_options,
            sort_files: self.sort_files,
            include_routes: self.include_routes,
            template_path: self.template_path,
            dry_run: self.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}
