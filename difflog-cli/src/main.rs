//! difflog CLI - API surface diffs for Python modules
//!
//! Compares two versions of Python source and reports which public classes,
//! functions, attributes and arguments were added, removed or changed, flagging
//! changes that may break callers.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;
mod vcs;

use commands::{completions, diff, git, DiffOptions};
use config::DifflogConfig;
use output::{OutputConfig, OutputFormat};

/// Python API diffs with breaking-change detection.
#[derive(Parser)]
#[command(name = "difflog")]
#[command(author, version)]
#[command(about = "Python API diffs with breaking-change detection")]
#[command(propagate_version = true)]
#[command(next_help_heading = "Options")]
#[command(after_help = "Examples:
  difflog diff old/api.py new/api.py       Diff two files
  difflog git v1.2.0                       Diff changed files since a tag
  difflog git main HEAD --path src/pkg     Limit to a directory
  difflog --fail-on-breaking git main      Exit 1 on breaking changes")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Include `_private` members
    #[arg(long, global = true)]
    include_private: bool,

    /// Only report changes that may break callers
    #[arg(long, global = true)]
    breaking_only: bool,

    /// Exit with status 1 when a breaking change is reported
    #[arg(long, global = true)]
    fail_on_breaking: bool,

    /// Show detailed version information
    #[arg(long = "version-verbose")]
    version_verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two Python files
    Diff {
        /// Previous version of the module
        old_file: PathBuf,

        /// New version of the module
        new_file: PathBuf,
    },

    /// Diff every changed Python file between two git revisions
    Git {
        /// Base git ref (branch, commit, tag)
        base_ref: String,

        /// Head git ref (branch, commit, tag) - defaults to HEAD
        #[arg(default_value = "HEAD")]
        head_ref: String,

        /// Limit to these paths (repeatable)
        #[arg(short, long = "path")]
        paths: Vec<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: completions::Shell,

        /// Show installation instructions instead of generating completions
        #[arg(long)]
        instructions: bool,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

/// Print verbose version information
fn print_verbose_version() {
    use colored::Colorize;

    let platform = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    println!("difflog {}", env!("CARGO_PKG_VERSION"));
    println!("  {:<14} {}", "difflog-cli:".cyan(), env!("CARGO_PKG_VERSION"));
    println!("  {:<14} {}", "difflog-core:".cyan(), difflog_core::version());
    println!("  {:<14} {}", "Platform:".cyan(), platform);
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if cli.version_verbose {
        print_verbose_version();
        return Ok(ExitCode::SUCCESS);
    }

    setup_logging(cli.verbose, cli.quiet);

    let config = DifflogConfig::load(Path::new("."));

    // CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    let output_config = OutputConfig::auto_detect_with_color_override(format, config.use_color());
    colored::control::set_override(output_config.use_colors());

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        println!();
        return Ok(ExitCode::SUCCESS);
    };

    let options = DiffOptions {
        filter: config.visibility_filter(cli.include_private),
        breaking_only: cli.breaking_only,
    };

    let breaking = match command {
        Commands::Diff { old_file, new_file } => {
            diff::run(&old_file, &new_file, &options, output_config)?
        }
        Commands::Git {
            base_ref,
            head_ref,
            paths,
        } => git::run(&base_ref, &head_ref, &paths, &options, output_config)?,
        Commands::Completions {
            shell,
            instructions,
        } => {
            let mut cmd = Cli::command();
            completions::run(shell, instructions, &mut cmd, output_config)?;
            false
        }
    };

    if breaking && cli.fail_on_breaking {
        tracing::debug!("Breaking changes found, exiting with status 1");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
