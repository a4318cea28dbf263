use crate::{error::AppError, extract::JsonBody, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_types::{Advert, AdvertChanges, NewAdvert};
use database::DbError;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub struct CreatedAdvert {
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct DeleteStatus {
    pub status: &'static str,
}

/// Only all-digit segments name an advert; anything else is an unknown route.
/// A digit string too large for the id column cannot exist, so it is simply
/// not found.
fn parse_advert_id(raw: &str) -> Result<i32, AppError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::RouteNotFound);
    }
    raw.parse().map_err(|_| AppError::Database(DbError::NotFound))
}

/// # GET /adverts/:advert_id
pub async fn get_advert(
    State(state): State<AppState>,
    Path(advert_id): Path<String>,
) -> Result<Json<Advert>, AppError> {
    let advert_id = parse_advert_id(&advert_id)?;
    let advert = state.db_repo.get(advert_id).await?;
    Ok(Json(advert))
}

/// # POST /adverts/
pub async fn create_advert(
    State(state): State<AppState>,
    JsonBody(new_advert): JsonBody<NewAdvert>,
) -> Result<Json<CreatedAdvert>, AppError> {
    let advert = state.db_repo.create(&new_advert).await?;
    Ok(Json(CreatedAdvert { id: advert.id }))
}

/// # PATCH /adverts/:advert_id
/// Returns the full record as stored after the update.
pub async fn update_advert(
    State(state): State<AppState>,
    Path(advert_id): Path<String>,
    JsonBody(changes): JsonBody<AdvertChanges>,
) -> Result<Json<Advert>, AppError> {
    let advert_id = parse_advert_id(&advert_id)?;
    let advert = state.db_repo.update(advert_id, &changes).await?;
    Ok(Json(advert))
}

/// # DELETE /adverts/:advert_id
pub async fn delete_advert(
    State(state): State<AppState>,
    Path(advert_id): Path<String>,
) -> Result<Json<DeleteStatus>, AppError> {
    let advert_id = parse_advert_id(&advert_id)?;
    state.db_repo.delete(advert_id).await?;
    Ok(Json(DeleteStatus { status: "success" }))
}

/// # GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.db_repo.health_check().await {
        Ok(true) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Ok(false) => unavailable(),
        Err(e) => {
            tracing::error!(error = ?e, "Health check failed.");
            unavailable()
        }
    }
}

fn unavailable() -> (StatusCode, Json<Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "status": "unavailable" })),
    )
}

pub async fn not_found() -> AppError {
    AppError::RouteNotFound
}
