//! bb8 pool of `diesel-async` PostgreSQL connections shared by the
//! obstacle, comment, archive and role adapters.
//!
//! Checkout failures surface as [`PoolError::Checkout`], which every adapter
//! maps to its port's `Connection` variant.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

const DEFAULT_MAX_SIZE: u32 = 10;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures while building the pool or borrowing a connection from it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became available in time, or connecting failed.
    #[error("database connection unavailable: {message}")]
    Checkout { message: String },

    /// The pool could not be created.
    #[error("database pool could not be built: {message}")]
    Build { message: String },
}

impl PoolError {
    /// Checkout failure.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Build failure.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Pool sizing and the connection string.
///
/// ```
/// use obstacle_registry::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://registry:hunter2@db/obstacles").with_max_size(4);
/// assert_eq!(config.max_size(), 4);
/// assert_eq!(config.redacted_url(), "postgres://registry:***@db/obstacles");
/// ```
#[derive(Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    checkout_timeout: Duration,
}

impl std::fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolConfig")
            .field("database_url", &self.redacted_url())
            .field("max_size", &self.max_size)
            .field("checkout_timeout", &self.checkout_timeout)
            .finish()
    }
}

impl PoolConfig {
    /// Ten connections and a thirty second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Cap the number of open connections; zero is raised to one.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    /// How long a request waits for a free connection.
    #[must_use]
    pub fn with_checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    /// Maximum open connections.
    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Idle connections kept warm: two, or fewer for very small pools.
    pub fn min_idle(&self) -> u32 {
        self.max_size.min(2)
    }

    /// The connection string with any password masked, for logs.
    pub fn redacted_url(&self) -> String {
        let url = self.database_url.as_str();
        let Some((scheme, rest)) = url.split_once("://") else {
            return url.to_owned();
        };
        let Some((userinfo, host)) = rest.rsplit_once('@') else {
            return url.to_owned();
        };
        match userinfo.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
            None => url.to_owned(),
        }
    }
}

/// Shared async connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool and open the idle connections.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when the URL is unusable or the database
    /// refuses the initial connections.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);

        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle()))
            .connection_timeout(config.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner })
    }

    /// Borrow a connection.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Checkout`] when none frees up before the
    /// checkout timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_the_documented_sizing() {
        let config = PoolConfig::new("postgres://localhost/obstacles");

        assert_eq!(config.max_size(), 10);
        assert_eq!(config.min_idle(), 2);
        assert_eq!(config.checkout_timeout, Duration::from_secs(30));
    }

    #[rstest]
    #[case(0, 1, 1)]
    #[case(1, 1, 1)]
    #[case(25, 25, 2)]
    fn sizing_is_clamped(#[case] requested: u32, #[case] max: u32, #[case] idle: u32) {
        let config = PoolConfig::new("postgres://localhost/obstacles").with_max_size(requested);

        assert_eq!(config.max_size(), max);
        assert_eq!(config.min_idle(), idle);
    }

    #[rstest]
    #[case("postgres://registry:s3cret@db:5432/obstacles", "postgres://registry:***@db:5432/obstacles")]
    #[case("postgres://registry@db/obstacles", "postgres://registry@db/obstacles")]
    #[case("postgres://db/obstacles", "postgres://db/obstacles")]
    #[case("host=db user=registry", "host=db user=registry")]
    fn passwords_never_reach_logs(#[case] url: &str, #[case] expected: &str) {
        let config = PoolConfig::new(url);

        assert_eq!(config.redacted_url(), expected);
        assert!(!format!("{config:?}").contains("s3cret"));
    }

    #[rstest]
    fn errors_name_the_failure() {
        assert!(
            PoolError::checkout("timed out")
                .to_string()
                .contains("connection unavailable: timed out")
        );
        assert!(PoolError::build("bad url").to_string().contains("bad url"));
    }
}
