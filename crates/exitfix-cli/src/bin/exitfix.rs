//! exitfix CLI Binary
//!
//! Rewrites Go error checks that end the program into single assertion calls.
//!
//! # Usage
//!
//! ```bash
//! # Fix every Go file below the current directory
//! exitfix .
//!
//! # Show what would change instead of writing
//! exitfix --diff ./cmd
//!
//! # Fix standard input
//! exitfix < main.go
//! ```

use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use exitfix_cli::cli::CliConfig;
use exitfix_cli::commands::{fix_command, FixArgs};
use exitfix_core::{FixesConfig, RuleRegistry};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "exitfix",
    version = env!("CARGO_PKG_VERSION"),
    about = "Rewrites Go error checks that call log.Fatal into exit.On calls"
)]
struct Cli {
    #[command(flatten)]
    fix: FixArgs,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,

    /// Set log level (overrides --verbose/--quiet)
    #[arg(long, value_enum)]
    log: Option<LogLevel>,

    /// Set log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn main() -> eyre::Result<()> {
    // Rule descriptions do not depend on configuration.
    let listing = RuleRegistry::builtin(&FixesConfig::default())?;
    let matches = Cli::command().after_help(listing.describe()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    setup_logging(cli.verbose, cli.quiet, cli.log, cli.log_format);

    let config = CliConfig::load(cli.config.as_deref())?;
    let registry = RuleRegistry::builtin(&config.fixes)?;
    let report = fix_command(&cli.fix, &config, &registry)?;
    info!(
        changed = report.changed,
        failed = report.failed,
        "finished"
    );

    let code = report.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn setup_logging(verbose: u8, quiet: bool, log_level: Option<LogLevel>, log_format: LogFormat) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if let Some(level) = log_level {
        EnvFilter::new(match level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    } else if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Standard output carries fixed source and diffs.
    let formatter = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true);

    match log_format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(formatter)
                .with(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(formatter.json())
                .with(filter)
                .init();
        }
    }
}
