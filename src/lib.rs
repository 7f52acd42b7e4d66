//! # cbatch
//!
//! Bundles a source tree into a single Markdown document for an LLM.
//!
//! ## Features
//!
//! - fnmatch-style ignore patterns, with a safe built-in default set
//! - Project description header kept in a small TOML store
//! - Whitespace-word token estimate recorded after every refresh
//! - Atomic replacement of the output document
//!
//! ## Quick Start
//!
//! ```no_run
//! use cbatch::{Config, refresh};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir(".")
//!     .output_file("codebatch.md")
//!     .build()?;
//!
//! let outcome = refresh(config)?;
//! println!("{} tokens", outcome.assembly.estimate);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! A refresh runs in four steps:
//! 1. **Patterns**: built-in defaults merged with `.cbatchignore`
//! 2. **Scanner**: walks the tree and reads every file that is not excluded
//! 3. **Template**: renders the header and file sections
//! 4. **Writer**: replaces the document and records the estimate in `cbatch.toml`

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod assembler;
mod commands;
mod config;
mod error;
mod file;
mod ignore_file;
mod pattern;
mod pipeline;
mod scanner;
mod store;
mod template;
mod token;
mod wizard;
mod writer;

pub use assembler::{assemble, Assembler, Assembly};
pub use commands::{init, refresh, report_estimate, InitOutcome};
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use file::{FileData, SkippedFile};
pub use ignore_file::{create_default_ignore_file, parse_ignore_patterns, read_ignore_file};
pub use pattern::{
    is_excluded, IgnoreMatcher, MatchOptions, MergePolicy, CONFIG_FILE, DEFAULT_IGNORE_PATTERNS,
    DEFAULT_OUTPUT_FILE, IGNORE_FILE,
};
pub use pipeline::{EstimateRecord, Pipeline, RefreshOutcome};
pub use scanner::ScanStats;
pub use store::{HeaderField, ProjectConfig, Summary};
pub use template::PREAMBLE;
pub use token::estimate_tokens;
pub use wizard::{collect_fields, FIELD_PROMPTS};
