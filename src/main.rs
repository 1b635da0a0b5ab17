use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use covmarks::cli;

/// covmarks — LCOV coverage reports as editor-style signals.
#[derive(Parser)]
#[command(name = "covmarks", version, about)]
struct Cli {
    /// Project root that relative report paths are resolved against.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-file and total line coverage for a report.
    Summary {
        /// Path to the LCOV report file.
        report: PathBuf,
    },

    /// Uncovered line ranges for one source file.
    Uncovered {
        /// Path to the LCOV report file.
        report: PathBuf,

        /// Source file path as written in the report.
        source_file: String,
    },

    /// Uncovered-line annotations per file.
    Annotations {
        /// Path to the LCOV report file.
        report: PathBuf,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Files whose line coverage sits below a threshold.
    Badges {
        /// Path to the LCOV report file.
        report: PathBuf,

        /// Coverage threshold percentage.
        #[arg(long, default_value_t = 80)]
        threshold: u8,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let out = match args.command {
        Commands::Summary { report } => cli::cmd_summary(&report, &args.root)?,
        Commands::Uncovered {
            report,
            source_file,
        } => cli::cmd_uncovered(&report, &source_file, &args.root)?,
        Commands::Annotations { report, json } => cli::cmd_annotations(&report, &args.root, json)?,
        Commands::Badges { report, threshold } => {
            cli::cmd_badges(&report, &args.root, threshold)?
        }
    };

    print!("{out}");
    Ok(())
}
