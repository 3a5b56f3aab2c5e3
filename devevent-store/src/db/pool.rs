//! Database connection pool creation
//!
//! Uses sqlx PgPool with explicit connection limits. Callers normally go
//! through [`crate::connection::get_connection`], which caches the pool.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;

/// Pool options derived from `config`.
pub fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new().max_connections(config.max_connections)
}

/// Create a PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the connection fails.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&Config::new("postgres://localhost/devevent")?).await?;
/// ```
pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(max_connections = config.max_connections, "creating connection pool");
    pool_options(config).connect(&config.database_url).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_follows_config() {
        let config = Config::new("postgres://localhost/devevent")
            .unwrap()
            .with_max_connections(12);
        assert_eq!(pool_options(&config).get_max_connections(), 12);

        let default = Config::new("postgres://localhost/devevent").unwrap();
        assert_eq!(
            pool_options(&default).get_max_connections(),
            default.max_connections
        );
    }
}
