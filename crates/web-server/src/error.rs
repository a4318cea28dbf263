use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    /// Malformed bodies, wrong JSON types and unknown fields all end up here.
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Not found")]
    RouteNotFound,
}

/// Converts our custom `AppError` into an HTTP response.
///
/// A missing advert answers 400, not 404; existing clients depend on it.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(DbError::NotFound) => {
                (StatusCode::BAD_REQUEST, DbError::NotFound.to_string())
            }
            AppError::Database(DbError::Conflict) => {
                (StatusCode::BAD_REQUEST, DbError::Conflict.to_string())
            }
            AppError::Database(DbError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::RouteNotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ValidationError;

    #[test]
    fn domain_errors_map_to_bad_request() {
        for err in [
            AppError::Database(DbError::NotFound),
            AppError::Database(DbError::Conflict),
            AppError::Database(DbError::Validation(ValidationError::TooLong {
                field: "header",
                max: 64,
                actual: 65,
            })),
            AppError::Validation("bad json".to_string()),
        ] {
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn internal_errors_are_hidden() {
        let err = AppError::Database(DbError::ConnectionConfigError(
            "database.url must be set.".to_string(),
        ));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unknown_routes_are_not_found() {
        assert_eq!(
            AppError::RouteNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
