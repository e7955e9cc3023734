//! Batch trigger handler

use axum::{extract::{Query, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::logic::BatchReport;

#[derive(Debug, Deserialize, Default)]
pub struct TriggerParams {
    #[serde(default)]
    pub verbose: Option<String>,
}

impl TriggerParams {
    /// `true`, `1`, `yes` and `on` turn the report on; anything else is ignored
    pub fn is_verbose(&self) -> bool {
        self.verbose
            .as_deref()
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<BatchReport>,
}

/// Run one ingest batch over every stream
pub async fn trigger(
    State(state): State<AppState>,
    params: Option<Query<TriggerParams>>,
) -> (StatusCode, Json<TriggerResponse>) {
    // a malformed query string never blocks the batch
    let verbose = params.map(|Query(p)| p.is_verbose()).unwrap_or(false);
    let report = state.pipeline.run_once().await;

    let (code, status, error) = if report.success {
        (
            StatusCode::OK,
            Some("Data fetched and stored successfully".to_string()),
            None,
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
            Some(format!(
                "Ingest failed for {} of {} streams",
                report.failures(),
                report.outcomes.len()
            )),
        )
    };

    let response = TriggerResponse {
        status,
        error,
        report: verbose.then_some(report),
    };

    (code, Json(response))
}
