// msgcheck - check a recorded message run against timed expectations

mod check;
mod exit_codes;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use check::ReportTargets;
use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "msgcheck")]
#[command(about = "Check recorded output messages against timed expectations")]
#[command(version)]
struct Cli {
    /// Log engine decisions (candidate searches, commits) to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a record against an expectations file
    #[command(after_help = "\
Examples:
  msgcheck check -e expected.json -r record.json
  msgcheck check -e expected.json -r record.json -o report.xml -v
  msgcheck check -e expected.json -r record.json --json")]
    Check {
        /// Expectations JSON file
        #[arg(long, short = 'e')]
        expected: PathBuf,

        /// Recorded messages JSON file
        #[arg(long, short = 'r')]
        record: PathBuf,

        /// Write the XML report here
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON result to file
        #[arg(long)]
        json_output: Option<PathBuf>,

        /// Rank candidates field by field instead of by weighted sum
        #[arg(long)]
        lexicographic: bool,

        /// Display a table per pairing
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Run a check described by a TOML config file
    #[command(after_help = "\
Examples:
  msgcheck run suite.check.toml
  msgcheck run suite.check.toml --json -v")]
    Run {
        /// Path to the .check.toml config file
        config: PathBuf,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Display a table per pairing
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Validate a config and construct its inputs without matching
    Validate {
        /// Path to the .check.toml config file
        config: PathBuf,
    },
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = if debug {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match cli.command {
        Commands::Check { expected, record, output, json, json_output, lexicographic, verbose } => {
            let targets = ReportTargets { xml: output, json_file: json_output, json_stdout: json, tables: verbose };
            check::cmd_check(expected, record, lexicographic, targets)
        }
        Commands::Run { config, json, verbose } => check::cmd_run(config, json, verbose),
        Commands::Validate { config } => check::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}
