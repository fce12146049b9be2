use crate::{
    errors::AppError,
    extractors::{MemeId, ValidatedJson},
    models::{Meme, MemeFilter, NewMeme},
    AppState,
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing;

/// Handler for GET /api/memes
pub async fn list_memes(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<MemeFilter>, QueryRejection>,
) -> Result<Json<Vec<Meme>>, AppError> {
    let Query(filter) = filter.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
    tracing::debug!(?filter, "Listing memes via handler");
    let memes = state.meme_repo.list_all(&filter).await?;
    tracing::info!("Handler successfully retrieved {} memes", memes.len());
    Ok(Json(memes))
}

/// Handler for GET /api/memes/{id}
pub async fn get_meme(
    State(state): State<Arc<AppState>>,
    MemeId(meme_id): MemeId,
) -> Result<Json<Meme>, AppError> {
    tracing::debug!(meme_id, "Fetching meme details via handler");
    match state.meme_repo.get_by_id(meme_id).await? {
        Some(meme) => Ok(Json(meme)),
        None => Err(AppError::MemeNotFound(meme_id)),
    }
}

/// Handler for POST /api/memes
pub async fn create_meme(
    State(state): State<Arc<AppState>>,
    ValidatedJson(new_meme): ValidatedJson<NewMeme>,
) -> Result<impl IntoResponse, AppError> {
    let meme = state.meme_repo.create(&new_meme).await?;
    tracing::info!(meme_id = meme.id, "Meme created successfully via handler");
    Ok((StatusCode::CREATED, Json(meme)))
}

/// Handler for PUT /api/memes/{id}
pub async fn update_meme(
    State(state): State<Arc<AppState>>,
    MemeId(meme_id): MemeId,
    ValidatedJson(replacement): ValidatedJson<NewMeme>,
) -> Result<Json<Meme>, AppError> {
    let meme = state
        .meme_repo
        .update(meme_id, &replacement)
        .await?
        .ok_or(AppError::MemeNotFound(meme_id))?;
    tracing::info!(meme_id, "Meme replaced successfully via handler");
    Ok(Json(meme))
}

/// Deletes the meme with the given ID.
pub async fn delete_meme(
    State(state): State<Arc<AppState>>,
    MemeId(meme_id): MemeId,
) -> Result<StatusCode, AppError> { // Return only status code on success
    tracing::debug!(meme_id, "Deleting meme via handler");
    if !state.meme_repo.delete(meme_id).await? {
        return Err(AppError::MemeNotFound(meme_id));
    }
    tracing::info!(meme_id, "Meme deleted successfully via handler");
    Ok(StatusCode::NO_CONTENT)
}

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
