use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoginError {
    /// Zero rows in the store. Distinct from `Store` so callers can tell an
    /// empty store (not retryable) from a transport failure (retryable).
    #[error("no login records found")]
    NoLogins,

    #[error("login store query failed: {0}")]
    Store(#[from] sqlx::Error),
}

/// Read side of the externally owned login-event store.
#[async_trait]
pub trait LoginStore: Send + Sync {
    /// Username of the most recently recorded login.
    async fn latest_username(&self) -> Result<String, LoginError>;
}

/// Postgres-backed store over the shared pool.
pub struct PgLoginStore {
    pool: PgPool,
}

impl PgLoginStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoginStore for PgLoginStore {
    async fn latest_username(&self) -> Result<String, LoginError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT username FROM logins ORDER BY login_time DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(username,)| username).ok_or(LoginError::NoLogins)
    }
}
