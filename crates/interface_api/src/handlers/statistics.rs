//! Statistics handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use domain_case::{
    ActionType, DailySnapshot, EntityRef, EntityType, InfractionStatistics, NewActivity,
    OfficerPerformance, Role, SeizureStatistics, ViolationStatistics, ViolatorCount,
};

use super::record_activity;
use crate::auth::Actor;
use crate::dto::statistics::{OfficerPerformanceQuery, TopViolatorsQuery};
use crate::dto::WindowQuery;
use crate::{error::ApiError, AppState};

pub async fn violation_statistics(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ViolationStatistics>, ApiError> {
    Ok(Json(state.db.statistics.violation_statistics(query.window()?).await?))
}

pub async fn seizure_statistics(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<SeizureStatistics>, ApiError> {
    Ok(Json(state.db.statistics.seizure_statistics(query.window()?).await?))
}

pub async fn infraction_statistics(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<InfractionStatistics>, ApiError> {
    Ok(Json(state.db.statistics.infraction_statistics(query.window()?).await?))
}

/// Per-officer counts, highest first
pub async fn officer_performance(
    State(state): State<AppState>,
    Query(query): Query<OfficerPerformanceQuery>,
) -> Result<Json<Vec<OfficerPerformance>>, ApiError> {
    let ranking = state
        .db
        .statistics
        .officer_performance(query.window()?, query.officer())
        .await?;
    Ok(Json(ranking))
}

pub async fn top_violators(
    State(state): State<AppState>,
    Query(query): Query<TopViolatorsQuery>,
) -> Result<Json<Vec<ViolatorCount>>, ApiError> {
    Ok(Json(
        state
            .db
            .statistics
            .top_violators(query.window()?, query.limit())
            .await?,
    ))
}

/// Recomputes and stores the snapshot for `date`
pub async fn save_daily_snapshot(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<DailySnapshot>, ApiError> {
    actor.require_role(&[Role::Supervisor])?;
    let snapshot = state.db.statistics.save_daily_snapshot(date).await?;

    let activity = NewActivity::new(
        actor.user_id,
        ActionType::Snapshot,
        format!("Saved daily statistics for {}", date),
    )
    .on(EntityRef::new(EntityType::Statistics, snapshot.id));
    record_activity(&state, &actor, activity).await;

    Ok(Json(snapshot))
}

pub async fn get_daily_snapshot(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<DailySnapshot>, ApiError> {
    Ok(Json(state.db.statistics.daily_snapshot(date).await?))
}
