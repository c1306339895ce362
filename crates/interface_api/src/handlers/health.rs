//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_tables: Vec<String>,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        missing_tables: Vec::new(),
    })
}

/// Readiness check: the store answers and every table is provisioned
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let not_ready = |missing_tables: Vec<String>| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                missing_tables,
            }),
        )
    };

    let status = state.db.readiness().await.map_err(|e| {
        warn!(error = %e, "Readiness probe failed");
        not_ready(Vec::new())
    })?;

    if !status.is_complete() {
        return Err(not_ready(status.missing));
    }

    Ok(Json(HealthResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        missing_tables: Vec::new(),
    }))
}
