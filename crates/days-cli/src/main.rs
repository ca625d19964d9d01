#![forbid(unsafe_code)]

mod cmd;
mod config;
mod output;
mod tui;

use anyhow::Context;
use clap::{Parser, Subcommand};
use days_core::SpecialDayStore;
use std::env;
use std::io;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "days: track birthdays, anniversaries and countdowns",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data file to use instead of the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    /// With no command, the interactive view starts.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Print all special days once",
        after_help = "EXAMPLES:\n    # Table for humans\n    days list\n\n    # Machine-readable\n    days list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        about = "Add a special day and save",
        after_help = "EXAMPLES:\n    # A birthday\n    days add --date 1990-05-17 --name mom --kind birth\n\n    # A countdown with a time of day\n    days add -d \"2030-01-01 09:30\" -n launch -k countdown"
    )]
    Add(cmd::add::AddArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DAYS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "days=debug,info"
        } else {
            "days=info,warn"
        })
    });

    let format = env::var("DAYS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let user = config::load_user_config()?;
    let config = config::resolve_config(user, cli.file);
    debug!(?config, "resolved configuration");

    let mut store = SpecialDayStore::open(&config.data_file).with_context(|| {
        format!("Failed to open data file {}", config.data_file.display())
    })?;
    let report = store.load_all().with_context(|| {
        format!("Failed to load data file {}", config.data_file.display())
    })?;
    debug!(?report, "load finished");

    match cli.command {
        None => tui::run_tui(&mut store, config.tick),
        Some(Commands::List(ref args)) => {
            cmd::list::run_list(args, &store, config.output.as_deref())
        }
        Some(Commands::Add(ref args)) => cmd::add::run_add(args, &mut store),
    }
}
