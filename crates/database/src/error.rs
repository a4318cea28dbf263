use core_types::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Database error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid advert: {0}")]
    Validation(#[from] ValidationError),

    #[error("Advert not found")]
    NotFound,

    #[error("advert already exists")]
    Conflict,

    #[error("No advert ids left to assign")]
    IdsExhausted,
}

impl DbError {
    /// Classifies an error raised by an INSERT/UPDATE or its commit.
    /// A unique violation can only come from the `header` index.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        let unique_violation = err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation());
        if unique_violation {
            DbError::Conflict
        } else {
            DbError::ConnectionError(err)
        }
    }
}
