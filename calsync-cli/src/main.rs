mod commands;
mod render;
mod utils;

use anyhow::Result;
use calsync_core::DateRange;
use calsync_core::config::SyncConfig;
use calsync_core::direction::{Side, SyncDirection};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calsync")]
#[command(about = "Keep two calendars in sync")]
struct Cli {
    /// Log more (-v for debug, -vv for trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile both calendars
    Sync {
        /// Number of days to sync, starting today (default from config)
        #[arg(short, long)]
        days: Option<u32>,

        /// Sync events from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Sync events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Only show what would change
        #[arg(long)]
        dry_run: bool,

        /// both, a_to_b or b_to_a (default from config)
        #[arg(long)]
        direction: Option<SyncDirection>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current settings, or choose which side wins conflicts
    Config {
        /// Side whose version wins conflicts in two-way syncs (a or b)
        #[arg(long)]
        source: Option<Side>,
    },
    /// Show both calendars' events and the mapping size
    Status {
        /// Number of days to show, starting today (default from config)
        #[arg(short, long)]
        days: Option<u32>,

        /// Show events from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Show events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = SyncConfig::load()?;

    match cli.command {
        Commands::Sync {
            days,
            from,
            to,
            dry_run,
            direction,
            json,
        } => {
            let range = resolve_range(&config, days, from.as_deref(), to.as_deref())?;
            let args = commands::sync::SyncArgs {
                range,
                direction,
                dry_run,
                json,
                verbose: cli.verbose > 0,
            };
            commands::sync::run(&config, args).await
        }
        Commands::Config { source } => commands::config::run(&config, source),
        Commands::Status { days, from, to } => {
            let range = resolve_range(&config, days, from.as_deref(), to.as_deref())?;
            commands::status::run(&config, range).await
        }
    }
}

fn resolve_range(
    config: &SyncConfig,
    days: Option<u32>,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<DateRange> {
    let days = days.unwrap_or(config.window_days);
    if days == 0 {
        anyhow::bail!("--days must be at least 1");
    }
    Ok(DateRange::from_args(from, to, days)?)
}

/// Logs go to stderr so `--json` output stays clean.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "calsync_core=debug,calsync=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
