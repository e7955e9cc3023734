//! Prediction lookup handlers

use axum::{extract::{Path, State}, Json};

use crate::{AppState, AppResult, AppError};
use crate::constants::is_known_location;
use crate::logic::QueryError;
use crate::models::{ClassificationResult, StreamKey};

/// Latest city-wide prediction
pub async fn general(
    State(state): State<AppState>,
) -> AppResult<Json<ClassificationResult>> {
    let result = state.query.latest_for(&StreamKey::General).await.map_err(|e| match e {
        QueryError::NotFound(_) => AppError::NotFound(
            "No general prediction data available for Samarinda.".to_string(),
        ),
        other => other.into(),
    })?;

    Ok(Json(result))
}

/// Latest prediction for one location
pub async fn location(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ClassificationResult>> {
    let key = known_location(slug)?;

    let result = state.query.latest_for(&key).await.map_err(|e| match e {
        QueryError::NotFound(_) => AppError::NotFound(format!(
            "No prediction data available for location {}.",
            key
        )),
        other => other.into(),
    })?;

    Ok(Json(result))
}

/// Fresh classification of tomorrow's forecast; never stored
pub async fn tomorrow(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ClassificationResult>> {
    let key = known_location(slug)?;
    let result = state.query.forecast(key.name()).await?;
    Ok(Json(result))
}

fn known_location(slug: String) -> AppResult<StreamKey> {
    if !is_known_location(&slug) {
        return Err(AppError::NotFound(format!("Unknown location {}.", slug)));
    }
    Ok(StreamKey::Location(slug))
}
