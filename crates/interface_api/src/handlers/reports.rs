//! Report export handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Extension,
};
use domain_case::{ActionType, NewActivity, ViolationFilter};
use tracing::info;

use super::record_activity;
use crate::auth::Actor;
use crate::dto::WindowQuery;
use crate::export::write_violations_csv;
use crate::{error::ApiError, AppState};

/// Violations in the window as a CSV attachment
pub async fn export_violations(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<WindowQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let violations = state
        .db
        .violations
        .list(&ViolationFilter::within(query.window()?))
        .await?;

    let mut body = Vec::new();
    write_violations_csv(&violations, &mut body)?;
    info!(rows = violations.len(), "Violations exported");

    let activity = NewActivity::new(
        actor.user_id,
        ActionType::Export,
        format!("Exported {} violations", violations.len()),
    );
    record_activity(&state, &actor, activity).await;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"violations.csv\""),
        ],
        body,
    ))
}
