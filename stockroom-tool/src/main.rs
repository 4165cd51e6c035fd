mod commands;
mod config;
mod context;
mod error;
mod monitor;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use stockroom_core::ItemId;
use tracing_subscriber::EnvFilter;

use crate::config::{REMOTE_URL_ENV, load_config, resolve_settings};
use crate::context::AppContext;
use crate::error::ToolError;

const DEFAULT_LOG_FILTER: &str = "warn,stockroom=info,stockroom_core=info,stockroom_http=info";

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "Offline-first inventory that syncs when the remote comes back", long_about = None)]
struct Cli {
    /// Path to the local item store
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Base URL of the remote API (items live under <URL>/items)
    #[arg(long, global = true)]
    remote: Option<String>,

    /// Work against the local store only, without probing the remote.
    /// Not accepted by `sync` and `watch`.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the local inventory
    List,

    /// Add an item
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        quantity: i64,
    },

    /// Change an item's name and quantity
    Update {
        #[arg(long)]
        id: ItemId,

        #[arg(long)]
        name: String,

        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        quantity: i64,
    },

    /// Delete an item
    Delete {
        #[arg(long)]
        id: ItemId,
    },

    /// Push pending items and mirror the remote now
    Sync,

    /// Keep probing the remote and sync every time it comes back
    Watch {
        /// Seconds between probes
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },
}

impl Command {
    /// Name of a command that only makes sense against the remote.
    fn needs_remote(&self) -> Option<&'static str> {
        match self {
            Command::Sync => Some("sync"),
            Command::Watch { .. } => Some("watch"),
            _ => None,
        }
    }

    /// Commands that act on the inventory connect first, the way the app
    /// synced on startup. `sync` and `watch` manage connectivity themselves.
    fn connects_first(&self) -> bool {
        self.needs_remote().is_none()
    }
}

impl Cli {
    fn check_offline(&self) -> Result<(), ToolError> {
        match self.command.needs_remote() {
            Some(command) if self.offline => Err(ToolError::NeedsRemote(command)),
            _ => Ok(()),
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    cli.check_offline()?;

    let settings = resolve_settings(
        cli.remote,
        std::env::var(REMOTE_URL_ENV).ok(),
        cli.store,
        load_config(),
    );
    let mut ctx = AppContext::open(&settings)?;

    if !cli.offline && cli.command.connects_first() {
        if let Some(report) = ctx.connect().await? {
            commands::print_report(&report);
        }
    }

    match cli.command {
        Command::List => commands::list(&ctx)?,
        Command::Add { name, quantity } => commands::add(&mut ctx, name, quantity).await?,
        Command::Update { id, name, quantity } => {
            commands::update(&mut ctx, id, name, quantity).await?
        }
        Command::Delete { id } => commands::delete(&mut ctx, id).await?,
        Command::Sync => commands::sync(&mut ctx).await?,
        Command::Watch { interval } => {
            commands::watch(&mut ctx, Duration::from_secs(interval.max(1))).await?
        }
    }

    Ok(())
}
