//! Violation handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use core_kernel::ViolationId;
use domain_case::{EntityRef, EntityType, Violation, ViolationDetails};
use infra_db::UpdateOutcome;

use super::{record_created, record_updated};
use crate::auth::Actor;
use crate::dto::violation::{CreateViolationRequest, UpdateViolationRequest, ViolationListQuery};
use crate::{error::ApiError, AppState};

/// Records a new violation; the caller is the officer unless one is named
pub async fn create_violation(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateViolationRequest>,
) -> Result<(StatusCode, Json<Violation>), ApiError> {
    let violation = state
        .db
        .violations
        .create(request.into_domain(actor.user_id)?)
        .await?;
    let entity = EntityRef::new(EntityType::Violation, violation.id);
    record_created(&state, &actor, entity, &violation.violation_number).await;
    Ok((StatusCode::CREATED, Json(violation)))
}

/// Lists violations, most recent first
pub async fn list_violations(
    State(state): State<AppState>,
    Query(query): Query<ViolationListQuery>,
) -> Result<Json<Vec<Violation>>, ApiError> {
    Ok(Json(state.db.violations.list(&query.filter()?).await?))
}

pub async fn get_violation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Violation>, ApiError> {
    Ok(Json(state.db.violations.get(ViolationId::new(id)).await?))
}

/// A violation with its officer, seizures, infractions and evidence
pub async fn get_violation_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ViolationDetails>, ApiError> {
    Ok(Json(state.db.violations.details(ViolationId::new(id)).await?))
}

pub async fn update_violation(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateViolationRequest>,
) -> Result<Json<UpdateOutcome<Violation>>, ApiError> {
    let id = ViolationId::new(id);
    let outcome = state.db.violations.update(id, request.into_domain()?).await?;
    if let UpdateOutcome::Updated { after, .. } = &outcome {
        let entity = EntityRef::new(EntityType::Violation, id);
        record_updated(&state, &actor, entity, &after.violation_number, &outcome).await;
    }
    Ok(Json(outcome))
}
