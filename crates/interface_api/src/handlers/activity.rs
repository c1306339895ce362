//! Activity log handlers

use axum::{
    extract::{Query, State},
    Json,
};
use domain_case::ActivityLogEntry;

use crate::dto::activity::ActivityListQuery;
use crate::{error::ApiError, AppState};

/// Most recent entries, newest first
pub async fn list_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityListQuery>,
) -> Result<Json<Vec<ActivityLogEntry>>, ApiError> {
    let log = &state.db.activity;
    let entries = match query.entity()? {
        Some(entity) => log.for_entity(entity, query.query().effective_limit()).await?,
        None => log.query(&query.query()).await?,
    };
    Ok(Json(entries))
}
