use crate::connection::{connect, run_migrations};
use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::{PgPool, Postgres, Transaction};

/// A scoped unit of work against the database.
///
/// Changes become visible only through `commit`. Dropping a session without
/// committing, on any exit path, rolls it back and returns the connection to
/// the pool.
pub type Session = Transaction<'static, Postgres>;

/// Process-wide factory for [`Session`]s, created once at startup.
#[derive(Debug, Clone)]
pub struct SessionProvider {
    pool: PgPool,
}

impl SessionProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the connection pool without touching the schema.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, DbError> {
        Ok(Self::new(connect(settings).await?))
    }

    /// Opens the connection pool and makes sure the schema exists.
    pub async fn init(settings: &DatabaseSettings) -> Result<Self, DbError> {
        let provider = Self::connect(settings).await?;
        run_migrations(&provider.pool).await?;
        tracing::info!(
            max_connections = settings.max_connections,
            "Database session provider ready."
        );
        Ok(provider)
    }

    pub async fn acquire_session(&self) -> Result<Session, DbError> {
        Ok(self.pool.begin().await?)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Waits for checked-out connections to be returned, then closes them all.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database session provider closed.");
    }
}
