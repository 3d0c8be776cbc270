// licsync CLI - license registry reconciliation from the shell

mod check;
mod exit_codes;
mod load;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "licsync")]
#[command(about = "Reconcile facility license exports against the provider registry")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reconciliation and write the change workbook
    #[command(after_help = "\
Examples:
  licsync run --facilities facilities.csv --providers PROV.xlsx --out changes.xlsx
  licsync run --facilities facilities.csv --providers PROV.xlsx --out changes.xlsx --as-of 2025-08-01
  licsync run --facilities facilities.csv --providers providers.csv --out changes.xlsx --json
  RUST_LOG=debug licsync run --facilities facilities.csv --providers PROV.xlsx --out changes.xlsx")]
    Run {
        /// Facility registry export (CSV or XLSX)
        #[arg(long)]
        facilities: PathBuf,

        /// Provider registry export (XLSX workbook or CSV)
        #[arg(long)]
        providers: PathBuf,

        /// Path for the output workbook
        #[arg(long)]
        out: PathBuf,

        /// Column-map TOML; built-in defaults apply when omitted
        #[arg(long, env = "LICSYNC_CONFIG")]
        config: Option<PathBuf>,

        /// Reconciliation date (pinned to midnight); defaults to now
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<String>,

        /// Print the run summary as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Report input readiness without running a reconciliation
    #[command(after_help = "\
Examples:
  licsync check --facilities facilities.csv --providers PROV.xlsx
  licsync check --facilities facilities.csv --providers PROV.xlsx --config columns.toml --json")]
    Check {
        /// Facility registry export (CSV or XLSX)
        #[arg(long)]
        facilities: PathBuf,

        /// Provider registry export (XLSX workbook or CSV)
        #[arg(long)]
        providers: PathBuf,

        /// Column-map TOML; built-in defaults apply when omitted
        #[arg(long, env = "LICSYNC_CONFIG")]
        config: Option<PathBuf>,

        /// Print the readiness report as JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  licsync-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  licsync-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: licsync <command> [options]");
            eprintln!("       licsync --help for more information");
            Ok(())
        }
        Some(Commands::Run { facilities, providers, out, config, as_of, json }) => {
            run::cmd_run(facilities, providers, out, config, as_of, json)
        }
        Some(Commands::Check { facilities, providers, config, json }) => {
            check::cmd_check(facilities, providers, config, json)
        }
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
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
