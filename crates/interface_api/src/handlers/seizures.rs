//! Seizure handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use core_kernel::SeizureId;
use domain_case::{EntityRef, EntityType, Seizure};
use infra_db::UpdateOutcome;

use super::{record_created, record_updated};
use crate::auth::Actor;
use crate::dto::seizure::{CreateSeizureRequest, SeizureListQuery, UpdateSeizureRequest};
use crate::{error::ApiError, AppState};

pub async fn create_seizure(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateSeizureRequest>,
) -> Result<(StatusCode, Json<Seizure>), ApiError> {
    let seizure = state.db.seizures.create(request.into_domain(actor.user_id)?).await?;
    let entity = EntityRef::new(EntityType::Seizure, seizure.id);
    record_created(&state, &actor, entity, &seizure.seizure_number).await;
    Ok((StatusCode::CREATED, Json(seizure)))
}

pub async fn list_seizures(
    State(state): State<AppState>,
    Query(query): Query<SeizureListQuery>,
) -> Result<Json<Vec<Seizure>>, ApiError> {
    Ok(Json(state.db.seizures.list(&query.filter()?).await?))
}

pub async fn get_seizure(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Seizure>, ApiError> {
    Ok(Json(state.db.seizures.get(SeizureId::new(id)).await?))
}

/// Updates a seizure; release fields are accepted only with a disposal status
pub async fn update_seizure(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateSeizureRequest>,
) -> Result<Json<UpdateOutcome<Seizure>>, ApiError> {
    let id = SeizureId::new(id);
    let outcome = state.db.seizures.update(id, request.into_domain()?).await?;
    if let UpdateOutcome::Updated { after, .. } = &outcome {
        let entity = EntityRef::new(EntityType::Seizure, id);
        record_updated(&state, &actor, entity, &after.seizure_number, &outcome).await;
    }
    Ok(Json(outcome))
}
