use crate::error::AppError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

/// A JSON request body, decoded whatever `Content-Type` the client sent
/// (`curl -d` labels it `application/x-www-form-urlencoded`).
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            AppError::Validation(format!("Failed to parse the request body as JSON: {e}"))
        })
    }
}
