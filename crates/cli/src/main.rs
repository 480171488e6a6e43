// aiglist - reconcile AIG rosters against classroom lists

mod batch;
mod exit_codes;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use aiglist_io::IoError;
use aiglist_recon::ReconError;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{
    EXIT_EXTRACTION, EXIT_INVALID_CONFIG, EXIT_MISSING_ROSTER, EXIT_OUTPUT, EXIT_SUCCESS,
    EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "aiglist")]
#[command(about = "Merge AIG roster PDFs and Word lists into classroom workbooks")]
#[command(version)]
struct Cli {
    /// Only print errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// More log output (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile one set of inputs and write the output workbooks
    #[command(after_help = "\
Examples:
  aiglist run --roster class_lists.xlsx --pdf aig_roster.pdf --docx td_list.docx
  aiglist run --config aiglist.toml
  aiglist run --config aiglist.toml --out /tmp/out --json
  aiglist run --roster class_lists.xlsx --pdf aig_roster.pdf --strict")]
    Run {
        /// Run config (TOML); flags below override its values
        #[arg(long, short = 'c', env = "AIGLIST_CONFIG")]
        config: Option<PathBuf>,

        /// Class list workbook (one sheet per classroom)
        #[arg(long)]
        roster: Option<PathBuf>,

        /// AIG roster PDF
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Word document with a Name / Reading / Math table
        #[arg(long)]
        docx: Option<PathBuf>,

        /// Output directory (default: output)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Run name shown in reports
        #[arg(long)]
        name: Option<String>,

        /// Print the full report as JSON to stdout and write summary.json
        #[arg(long)]
        json: bool,

        /// Fail on unreadable sources, missing students, or skipped rows
        #[arg(long)]
        strict: bool,
    },

    /// Run every PDF × workbook combination found in a directory
    #[command(after_help = "\
Examples:
  aiglist batch ./input
  aiglist batch ./input --out ./results")]
    Batch {
        /// Directory holding *.pdf, *.xlsx and optionally *.docx inputs
        dir: PathBuf,

        /// Parent directory for the per-combination output folders
        #[arg(long, short = 'o', default_value = "output")]
        out: PathBuf,

        /// Fail a combination when one of its sources cannot be read
        #[arg(long)]
        strict: bool,
    },

    /// Validate a run config without running
    #[command(after_help = "\
Examples:
  aiglist validate aiglist.toml")]
    Validate {
        /// Path to the run config
        config: PathBuf,
    },
}

fn init_tracing(quiet: bool, verbose: u8) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("AIGLIST_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let result = match cli.command {
        Commands::Run { config, roster, pdf, docx, out, name, json, strict } => {
            run::cmd_run(run::RunArgs {
                config,
                roster,
                pdf,
                docx,
                out,
                name,
                json,
                strict,
                quiet: cli.quiet,
            })
        }
        Commands::Batch { dir, out, strict } => batch::cmd_batch(&dir, &out, strict, cli.quiet),
        Commands::Validate { config } => run::cmd_validate(&config),
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

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_CONFIG, msg)
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::new(EXIT_OUTPUT, msg)
    }

    /// Wrap an io error under `code`, carrying its install hint if any.
    pub fn from_io(err: IoError, code: u8) -> Self {
        let hint = err.hint().map(str::to_string);
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let code = match err {
            ReconError::MissingSource { .. } => EXIT_MISSING_ROSTER,
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        };
        Self::new(code, err.to_string())
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let code = match err {
            IoError::Open { .. } => EXIT_MISSING_ROSTER,
            IoError::ToolMissing { .. } | IoError::Extraction { .. } => EXIT_EXTRACTION,
            IoError::Output { .. } => EXIT_OUTPUT,
        };
        Self::from_io(err, code)
    }
}
