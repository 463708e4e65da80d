//! Database connection pool management.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use pantry_core::defaults::{DB_CONNECT_TIMEOUT_SECS, DB_IDLE_TIMEOUT_SECS, DB_MAX_CONNECTIONS};
use pantry_core::{Error, Result};

/// Pool configuration options.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of connections to maintain.
    pub min_connections: u32,
    /// Bounded wait for acquiring a connection.
    pub acquire_timeout: Duration,
    /// Idle connection timeout duration.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DB_MAX_CONNECTIONS,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(DB_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DB_IDLE_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of connections.
    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Set the minimum number of connections.
    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n;
        self
    }

    /// Set the acquire timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Read overrides from `DB_MAX_CONNECTIONS` / `DB_ACQUIRE_TIMEOUT_SECS`.
    ///
    /// Unset variables keep the defaults; malformed or zero values are a
    /// configuration error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(n) = positive_var(&lookup, "DB_MAX_CONNECTIONS")? {
            config.max_connections = u32::try_from(n).map_err(|_| {
                Error::Config(format!("DB_MAX_CONNECTIONS is too large: {}", n))
            })?;
        }
        if let Some(secs) = positive_var(&lookup, "DB_ACQUIRE_TIMEOUT_SECS")? {
            config.acquire_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

fn positive_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(Error::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}

/// Create a new PostgreSQL connection pool with default configuration.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::default()).await
}

/// Create a new PostgreSQL connection pool with custom configuration.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();

    info!(
        subsystem = "db",
        component = "pool",
        op = "create",
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        "Creating database connection pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "established",
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Database connection pool established"
    );
    Ok(pool)
}

/// Log current pool health metrics.
///
/// Warns when no idle connection is left (potential exhaustion).
pub fn log_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle();

    debug!(
        subsystem = "db",
        component = "pool",
        op = "metrics",
        pool_size = size,
        pool_idle = idle,
        "Pool health check"
    );

    if idle == 0 && size > 0 {
        warn!(
            subsystem = "db",
            component = "pool",
            pool_size = size,
            "Connection pool has no idle connections"
        );
    }
}
