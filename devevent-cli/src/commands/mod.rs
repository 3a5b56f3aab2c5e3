//! Command implementations

pub mod booking;
pub mod event;
pub mod migrate;

use anyhow::{Context, Result};
use devevent_store::{get_connection, AppState, Config};
use serde::Serialize;

/// Connect (running migrations on first connect) and build the services.
async fn connect(config: &Config) -> Result<AppState> {
    let pool = get_connection(config)
        .await
        .context("failed to connect to database")?;
    Ok(AppState::postgres(pool))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Print an operation error to stderr, one line per field violation.
pub fn report(err: &devevent_store::Error) {
    match err.validation() {
        Some(failure) => {
            for violation in failure.errors() {
                eprintln!("error: {}", violation);
            }
        }
        None => eprintln!("error: {}", err),
    }
}
