use crate::error::DbError;
use crate::session::SessionProvider;
use async_trait::async_trait;
use core_types::{Advert, AdvertChanges, NewAdvert};
use sqlx::PgConnection;

/// Data access for adverts.
///
/// Every operation runs in its own session: it either commits as a whole or
/// leaves storage untouched. Returned adverts are snapshots; nothing is
/// cached between calls.
#[async_trait]
pub trait AdvertRepository: Send + Sync {
    /// `Ok(false)` when storage is unreachable.
    async fn health_check(&self) -> Result<bool, DbError>;

    /// Fails with [`DbError::NotFound`] if no advert has this id.
    async fn get(&self, id: i32) -> Result<Advert, DbError>;

    /// Stores a new advert and returns it with its generated `id` and
    /// `create_date`. Fails with [`DbError::Conflict`] if the header is taken.
    async fn create(&self, advert: &NewAdvert) -> Result<Advert, DbError>;

    /// Overwrites the provided fields and returns the advert as stored after
    /// the change.
    async fn update(&self, id: i32, changes: &AdvertChanges) -> Result<Advert, DbError>;

    async fn delete(&self, id: i32) -> Result<(), DbError>;

    /// Releases storage resources. Called once, on shutdown.
    async fn close(&self);
}

const ADVERT_COLUMNS: &str = "id, header, description, create_date, owner";

/// The PostgreSQL-backed [`AdvertRepository`].
#[derive(Debug, Clone)]
pub struct DbRepository {
    sessions: SessionProvider,
}

impl DbRepository {
    /// Creates a new `DbRepository` on top of a shared session provider.
    pub fn new(sessions: SessionProvider) -> Self {
        Self { sessions }
    }
}

async fn fetch_advert(
    conn: &mut PgConnection,
    id: i32,
    for_update: bool,
) -> Result<Advert, DbError> {
    let lock = if for_update { " FOR UPDATE" } else { "" };
    let query = format!("SELECT {ADVERT_COLUMNS} FROM adverts WHERE id = $1{lock}");
    sqlx::query_as::<_, Advert>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or(DbError::NotFound)
}

#[async_trait]
impl AdvertRepository for DbRepository {
    async fn health_check(&self) -> Result<bool, DbError> {
        match sqlx::query("SELECT 1").execute(self.sessions.pool()).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed.");
                Ok(false)
            }
        }
    }

    async fn get(&self, id: i32) -> Result<Advert, DbError> {
        let mut session = self.sessions.acquire_session().await?;
        let advert = fetch_advert(&mut session, id, false).await?;
        session.commit().await?;
        Ok(advert)
    }

    async fn create(&self, advert: &NewAdvert) -> Result<Advert, DbError> {
        advert.validate()?;

        let mut session = self.sessions.acquire_session().await?;
        let query = format!(
            "INSERT INTO adverts (header, description, owner) VALUES ($1, $2, $3) RETURNING {ADVERT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Advert>(&query)
            .bind(&advert.header)
            .bind(&advert.description)
            .bind(&advert.owner)
            .fetch_one(&mut *session)
            .await
            .map_err(DbError::from_write)?;
        session.commit().await.map_err(DbError::from_write)?;

        tracing::info!(advert_id = created.id, "Advert created.");
        Ok(created)
    }

    async fn update(&self, id: i32, changes: &AdvertChanges) -> Result<Advert, DbError> {
        changes.validate()?;

        let mut session = self.sessions.acquire_session().await?;
        let mut advert = fetch_advert(&mut session, id, true).await?;
        if changes.is_empty() {
            session.commit().await?;
            return Ok(advert);
        }

        changes.apply_to(&mut advert);
        sqlx::query("UPDATE adverts SET header = $2, description = $3, owner = $4 WHERE id = $1")
            .bind(id)
            .bind(&advert.header)
            .bind(&advert.description)
            .bind(&advert.owner)
            .execute(&mut *session)
            .await
            .map_err(DbError::from_write)?;

        // Read back what storage now holds rather than trusting the local copy.
        let updated = fetch_advert(&mut session, id, false).await?;
        session.commit().await.map_err(DbError::from_write)?;

        tracing::info!(advert_id = id, "Advert updated.");
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), DbError> {
        let mut session = self.sessions.acquire_session().await?;
        fetch_advert(&mut session, id, true).await?;
        sqlx::query("DELETE FROM adverts WHERE id = $1")
            .bind(id)
            .execute(&mut *session)
            .await?;
        session.commit().await?;

        tracing::info!(advert_id = id, "Advert deleted.");
        Ok(())
    }

    async fn close(&self) {
        self.sessions.close().await;
    }
}
