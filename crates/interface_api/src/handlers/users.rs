//! User handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use core_kernel::UserId;
use domain_case::{ActionType, EntityRef, EntityType, NewActivity, Role, User};
use infra_db::UpdateOutcome;

use super::{record_activity, record_created};
use crate::auth::Actor;
use crate::dto::user::{CreateUserRequest, UpdateUserRequest, UserListQuery};
use crate::{error::ApiError, AppState};

/// Provisions a user account
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    actor.require_role(&[Role::Admin])?;
    let user = state.db.users.create(request.into_domain()?).await?;
    record_created(&state, &actor, EntityRef::new(EntityType::User, user.id), &user.username).await;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Lists users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.db.users.list(&query.filter()?).await?))
}

/// Gets a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.db.users.get(UserId::new(id)).await?))
}

/// Updates a user; setting `is_active` to false deactivates the account
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UpdateOutcome<User>>, ApiError> {
    actor.require_role(&[Role::Admin])?;
    let outcome = state.db.users.update(UserId::new(id), request.into_domain()?).await?;

    if let UpdateOutcome::Updated { after, changes, .. } = &outcome {
        let entity = EntityRef::new(EntityType::User, after.id);
        let mut activity = NewActivity::updated(actor.user_id, entity, &after.username, changes);
        if changes.contains("is_active") && !after.is_active {
            activity.action_type = ActionType::Deactivate;
        }
        record_activity(&state, &actor, activity).await;
    }
    Ok(Json(outcome))
}
