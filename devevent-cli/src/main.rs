//! devevent CLI - manage developer events and bookings
//!
//! - `migrate`: apply the database schema
//! - `event`: create, update, show and list events
//! - `booking`: book an event, list and count bookings
//!
//! Records are printed as JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use devevent_store::config::DATABASE_URL_VAR;
use devevent_store::Config;

mod commands;
mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "devevent",
    author,
    version,
    about = "Developer event listings and bookings backed by PostgreSQL"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Database URL (overrides DATABASE_URL from the environment or .env)
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect and apply the schema
    Migrate,
    /// Create, update and read events
    Event(commands::event::EventArgs),
    /// Book events and read bookings
    Booking(commands::booking::BookingArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug }).ok();

    match run(cli).await {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<devevent_store::Error>() {
            Some(store_err) => {
                commands::report(store_err);
                std::process::exit(1);
            }
            None => Err(err),
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.database_url).context("invalid configuration")?;

    match cli.command {
        Commands::Migrate => commands::migrate::run_migrate(&config).await,
        Commands::Event(args) => commands::event::run_event(args, &config).await,
        Commands::Booking(args) => commands::booking::run_booking(args, &config).await,
    }
}

/// Store config from the environment, with `--database-url` taking precedence.
fn load_config(database_url: Option<String>) -> Result<Config, devevent_store::ConfigError> {
    Config::from_lookup(|key| {
        if key == DATABASE_URL_VAR {
            database_url.clone()
        } else {
            std::env::var(key).ok()
        }
    })
}
