//! Evidence handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use core_kernel::EvidenceId;
use domain_case::{EntityRef, EntityType, Evidence};
use infra_db::UpdateOutcome;

use super::{record_created, record_updated};
use crate::auth::Actor;
use crate::dto::evidence::{CreateEvidenceRequest, EvidenceListQuery, UpdateEvidenceRequest};
use crate::{error::ApiError, AppState};

pub async fn create_evidence(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateEvidenceRequest>,
) -> Result<(StatusCode, Json<Evidence>), ApiError> {
    let evidence = state.db.evidence.create(request.into_domain(actor.user_id)?).await?;
    let entity = EntityRef::new(EntityType::Evidence, evidence.id);
    record_created(&state, &actor, entity, &evidence.evidence_number).await;
    Ok((StatusCode::CREATED, Json(evidence)))
}

/// Lists evidence; with `violation_id` alone, ordered by collection date
pub async fn list_evidence(
    State(state): State<AppState>,
    Query(query): Query<EvidenceListQuery>,
) -> Result<Json<Vec<Evidence>>, ApiError> {
    let filter = query.filter()?;
    let items = match filter.violation_id {
        Some(violation_id) if filter.status.is_none() && filter.evidence_type.is_none() => {
            state.db.evidence.list_by_violation(violation_id).await?
        }
        _ => state.db.evidence.list(&filter).await?,
    };
    Ok(Json(items))
}

pub async fn get_evidence(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Evidence>, ApiError> {
    Ok(Json(state.db.evidence.get(EvidenceId::new(id)).await?))
}

/// Updates custody details; a status change refreshes the violation's count
pub async fn update_evidence(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEvidenceRequest>,
) -> Result<Json<UpdateOutcome<Evidence>>, ApiError> {
    let id = EvidenceId::new(id);
    let outcome = state.db.evidence.update(id, request.into_domain()?).await?;
    if let UpdateOutcome::Updated { after, .. } = &outcome {
        let entity = EntityRef::new(EntityType::Evidence, id);
        record_updated(&state, &actor, entity, &after.evidence_number, &outcome).await;
    }
    Ok(Json(outcome))
}
