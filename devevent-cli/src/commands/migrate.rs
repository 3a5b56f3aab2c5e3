use anyhow::{Context, Result};
use devevent_store::{get_connection, Config};

/// Connecting applies the schema.
pub async fn run_migrate(config: &Config) -> Result<()> {
    get_connection(config)
        .await
        .context("failed to connect to database")?;
    println!("schema up to date");
    Ok(())
}
