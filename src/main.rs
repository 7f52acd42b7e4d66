use anyhow::Context;
use cbatch::{
    collect_fields, init, refresh, report_estimate, Config, MergePolicy, CONFIG_FILE,
    DEFAULT_OUTPUT_FILE, IGNORE_FILE,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "cbatch",
    version,
    author,
    about = "Bundle a codebase into one Markdown document for an LLM",
    long_about = "Bundle a codebase into one Markdown document for an LLM.\n\n\
    cbatch walks a directory, leaves out paths matching the ignore patterns, and writes \
    every remaining text file into a single document headed by a short project description. \
    A whitespace-word token estimate is recorded after each run.\n\n\
    USAGE EXAMPLES:\n  \
      # Describe the project and create .cbatchignore\n  \
      cbatch init\n\n  \
      # Bundle the current directory into codebatch.md\n  \
      cbatch update\n\n  \
      # Bundle ./src into a custom file, sorted, with a token index\n  \
      cbatch update ./src context.md --sort --routes\n\n  \
      # Show the estimate recorded by the last update\n  \
      cbatch tokens"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration store holding the project description and estimate
    #[arg(long, global = true, default_value = CONFIG_FILE, value_name = "FILE")]
    config: PathBuf,

    /// Ignore file with one pattern per line
    #[arg(long, global = true, default_value = IGNORE_FILE, value_name = "FILE")]
    ignore_file: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe the project and create the default ignore file
    Init,

    /// Regenerate the document and record its token estimate
    #[command(visible_alias = "refresh")]
    Update {
        /// Directory to bundle
        #[arg(default_value = ".", value_name = "ROOT")]
        root: PathBuf,

        /// Document to write
        #[arg(default_value = DEFAULT_OUTPUT_FILE, value_name = "OUTPUT")]
        output: PathBuf,

        /// Order file sections by relative path
        #[arg(long)]
        sort: bool,

        /// Add an index of files by token count
        #[arg(long)]
        routes: bool,

        /// Use only the ignore file, without the built-in patterns
        ///
        /// Secrets such as *.pem or .env are no longer excluded unless the
        /// ignore file lists them.
        #[arg(long)]
        no_default_ignores: bool,

        /// Match patterns case-insensitively (default on Windows)
        #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
        ignore_case: Option<bool>,

        /// Path to custom Tera template file
        ///
        /// The template receives `ctx.preamble`, `ctx.general`, `ctx.routes`
        /// and `ctx.files`, like the built-in layout.
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Dry run (don't write files)
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the token estimate recorded by the last update
    #[command(visible_alias = "report-estimate")]
    Tokens,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    match cli.command {
        Command::Init => run_init(&cli.config, &cli.ignore_file),
        Command::Update {
            root,
            output,
            sort,
            routes,
            no_default_ignores,
            ignore_case,
            template,
            dry_run,
        } => {
            let merge_policy = if no_default_ignores {
                MergePolicy::Replace
            } else {
                MergePolicy::Append
            };

            let mut builder = Config::builder()
                .root_dir(root)
                .output_file(output)
                .ignore_file(cli.ignore_file)
                .store_file(cli.config)
                .merge_policy(merge_policy)
                .sort_files(sort)
                .include_routes(routes)
                .dry_run(dry_run);

            if let Some(case_insensitive) = ignore_case {
                builder = builder.case_insensitive(case_insensitive);
            }

            if let Some(template_path) = template {
                builder = builder.template_path(template_path);
            }

            let config = builder.build().context("Failed to build configuration")?;

            match refresh(config.clone()) {
                Ok(outcome) => {
                    outcome.print_summary(&config);
                    Ok(())
                }
                Err(e) if e.is_config_missing() => {
                    println!("{e}");
                    Ok(())
                }
                Err(e) => Err(e).context("Update failed"),
            }
        }
        Command::Tokens => {
            println!("{}", report_estimate(&cli.config));
            Ok(())
        }
    }
}

fn run_init(store_file: &Path, ignore_file: &Path) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut prompts = std::io::stdout();

    let fields = collect_fields(&mut input, &mut prompts)
        .context("Failed to read project information")?;
    let outcome = init(store_file, ignore_file, fields).context("Initialization failed")?;

    println!("Configuration saved to {}", outcome.store_file.display());
    if outcome.ignore_file_created {
        println!("Created default ignore file: {}", outcome.ignore_file.display());
    } else {
        println!(
            "Ignore file already exists: {}. Keeping existing file.",
            outcome.ignore_file.display()
        );
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("cbatch=info"),
        1 => EnvFilter::new("cbatch=debug"),
        _ => EnvFilter::new("cbatch=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
