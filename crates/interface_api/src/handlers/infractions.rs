//! Infraction handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use core_kernel::InfractionId;
use domain_case::{EntityRef, EntityType, Infraction};
use infra_db::UpdateOutcome;

use super::{record_created, record_updated};
use crate::auth::Actor;
use crate::dto::infraction::{CreateInfractionRequest, InfractionListQuery, UpdateInfractionRequest};
use crate::{error::ApiError, AppState};

pub async fn create_infraction(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateInfractionRequest>,
) -> Result<(StatusCode, Json<Infraction>), ApiError> {
    let infraction = state.db.infractions.create(request.into_domain()?).await?;
    let entity = EntityRef::new(EntityType::Infraction, infraction.id);
    record_created(&state, &actor, entity, &infraction.infraction_number).await;
    Ok((StatusCode::CREATED, Json(infraction)))
}

pub async fn list_infractions(
    State(state): State<AppState>,
    Query(query): Query<InfractionListQuery>,
) -> Result<Json<Vec<Infraction>>, ApiError> {
    Ok(Json(state.db.infractions.list(&query.filter()?).await?))
}

pub async fn get_infraction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Infraction>, ApiError> {
    Ok(Json(state.db.infractions.get(InfractionId::new(id)).await?))
}

/// Records court progress and disposition
pub async fn update_infraction(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateInfractionRequest>,
) -> Result<Json<UpdateOutcome<Infraction>>, ApiError> {
    let id = InfractionId::new(id);
    let outcome = state.db.infractions.update(id, request.into_domain()?).await?;
    if let UpdateOutcome::Updated { after, .. } = &outcome {
        let entity = EntityRef::new(EntityType::Infraction, id);
        record_updated(&state, &actor, entity, &after.infraction_number, &outcome).await;
    }
    Ok(Json(outcome))
}
