//! Process-wide connection management
//!
//! A [`ConnectionCache`] hands out one shared handle for the life of the
//! process. At most one connection attempt is in flight: callers that arrive
//! while an attempt is pending await that same attempt and all receive its
//! outcome. A failed attempt clears the in-flight marker, so the next call
//! starts a fresh one. Nothing is retried automatically.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use sqlx::PgPool;
use thiserror::Error;

use crate::config::Config;
use crate::db::{migrations, pool};

/// Connection attempt failure, shared by every caller awaiting the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to connect to database: {message}")]
pub struct ConnectionError {
    message: String,
}

impl ConnectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<sqlx::Error> for ConnectionError {
    fn from(e: sqlx::Error) -> Self {
        Self::new(e.to_string())
    }
}

type PendingConnect<C> = Shared<BoxFuture<'static, Result<C, ConnectionError>>>;

enum Slot<C> {
    Empty,
    Connecting { attempt: u64, pending: PendingConnect<C> },
    Ready(C),
}

struct State<C> {
    slot: Slot<C>,
    attempts: u64,
}

/// Single-initialization cache for a connection handle.
pub struct ConnectionCache<C> {
    state: Mutex<State<C>>,
}

impl<C> ConnectionCache<C> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(State {
                slot: Slot::Empty,
                attempts: 0,
            }),
        }
    }

    /// Number of connection attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.lock().attempts
    }

    /// Forget the cached handle and any pending attempt.
    pub fn reset(&self) {
        self.lock().slot = Slot::Empty;
    }

    fn lock(&self) -> MutexGuard<'_, State<C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> ConnectionCache<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Cached handle, if a connection has been established.
    pub fn cached(&self) -> Option<C> {
        match &self.lock().slot {
            Slot::Ready(conn) => Some(conn.clone()),
            _ => None,
        }
    }

    /// Return the cached handle, join the pending attempt, or start one with `connect`.
    ///
    /// `connect` is only invoked when no handle is cached and no attempt is
    /// pending.
    pub async fn get_or_connect<F, Fut>(&self, connect: F) -> Result<C, ConnectionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, ConnectionError>> + Send + 'static,
    {
        let (attempt, pending) = {
            let mut guard = self.lock();
            let state = &mut *guard;
            match &state.slot {
                Slot::Ready(conn) => return Ok(conn.clone()),
                Slot::Connecting { attempt, pending } => {
                    tracing::debug!(attempt, "joining in-flight connection attempt");
                    (*attempt, pending.clone())
                }
                Slot::Empty => {
                    state.attempts += 1;
                    let attempt = state.attempts;
                    tracing::debug!(attempt, "starting connection attempt");
                    let pending = connect().boxed().shared();
                    state.slot = Slot::Connecting {
                        attempt,
                        pending: pending.clone(),
                    };
                    (attempt, pending)
                }
            }
        };

        let result = pending.await;

        let mut state = self.lock();
        let current = matches!(&state.slot, Slot::Connecting { attempt: a, .. } if *a == attempt);
        if current {
            state.slot = match &result {
                Ok(conn) => Slot::Ready(conn.clone()),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "connection attempt failed; next call will retry");
                    Slot::Empty
                }
            };
        }

        result
    }
}

impl<C> Default for ConnectionCache<C> {
    fn default() -> Self {
        Self::new()
    }
}

static DATABASE: ConnectionCache<PgPool> = ConnectionCache::new();

/// Process-wide database handle.
///
/// The first successful call creates the pool and applies the schema; later
/// calls get the cached pool without touching the network.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let pool = get_connection(&config).await?;
/// ```
pub async fn get_connection(config: &Config) -> Result<PgPool, ConnectionError> {
    let config = config.clone();
    DATABASE
        .get_or_connect(move || async move {
            let pool = pool::create_pool(&config).await?;
            migrations::run(&pool).await?;
            tracing::info!(
                max_connections = config.max_connections,
                "database connection established"
            );
            Ok::<_, ConnectionError>(pool)
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Stand-in handle so the cache can be tested without a database.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Handle(usize);

    fn connector(
        calls: Arc<AtomicUsize>,
        fail: bool,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<Handle, ConnectionError>> {
        move || {
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(Duration::from_millis(50)).await;
                if fail {
                    Err(ConnectionError::new(format!("refused #{}", n)))
                } else {
                    Ok(Handle(n))
                }
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_attempt() {
        let cache = Arc::new(ConnectionCache::<Handle>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move { cache.get_or_connect(connector(calls, false)).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(Handle(1)));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.attempts(), 1);
        assert_eq!(cache.cached(), Some(Handle(1)));
    }

    #[tokio::test]
    async fn cached_handle_skips_connector() {
        let cache = ConnectionCache::<Handle>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .get_or_connect(connector(Arc::clone(&calls), false))
            .await
            .unwrap();
        let again = cache
            .get_or_connect(|| async { Err(ConnectionError::new("must not run")) })
            .await;

        assert_eq!(again, Ok(Handle(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_reaches_every_waiter_then_allows_retry() {
        let cache = Arc::new(ConnectionCache::<Handle>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move { cache.get_or_connect(connector(calls, true)).await })
            })
            .collect();

        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert_eq!(err.message(), "refused #1");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached(), None);

        let retried = cache
            .get_or_connect(connector(Arc::clone(&calls), false))
            .await;
        assert_eq!(retried, Ok(Handle(2)));
        assert_eq!(cache.attempts(), 2);
    }

    #[tokio::test]
    async fn reset_forces_reconnect() {
        let cache = ConnectionCache::<Handle>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .get_or_connect(connector(Arc::clone(&calls), false))
            .await
            .unwrap();
        cache.reset();
        let second = cache
            .get_or_connect(connector(Arc::clone(&calls), false))
            .await;

        assert_eq!(second, Ok(Handle(2)));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn get_connection_returns_same_pool() {
        let config = Config::from_env().expect("DATABASE_URL required");
        let first = get_connection(&config).await.expect("connect failed");
        let second = get_connection(&config).await.expect("connect failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&second)
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);
        assert_eq!(first.size(), second.size());
    }
}
