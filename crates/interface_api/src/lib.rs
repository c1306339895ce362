//! HTTP API Layer
//!
//! This crate exposes the case store to the user interface through a JSON
//! API built on Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each entity, statistics and reports
//! - **Middleware**: Authentication and request logging
//! - **DTOs**: Request objects that parse enumerated fields into domain types
//! - **Error Handling**: Consistent error bodies naming entity, field and retryability
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let db = Database::open(config.database(), config.report_timezone).await?;
//! let app = create_router(db, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;
pub mod export;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use infra_db::Database;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{
    activity, evidence, health, infractions, reports, seizures, statistics, users, violations,
};
use crate::middleware::{auth_middleware, request_log_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `db` - Opened and provisioned store
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(db: Database, config: ApiConfig) -> Router {
    let state = AppState { db, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let user_routes = Router::new()
        .route("/", post(users::create_user).get(users::list_users))
        .route("/:id", get(users::get_user).put(users::update_user));

    let violation_routes = Router::new()
        .route("/", post(violations::create_violation).get(violations::list_violations))
        .route("/:id", get(violations::get_violation).put(violations::update_violation))
        .route("/:id/details", get(violations::get_violation_details));

    let seizure_routes = Router::new()
        .route("/", post(seizures::create_seizure).get(seizures::list_seizures))
        .route("/:id", get(seizures::get_seizure).put(seizures::update_seizure));

    let infraction_routes = Router::new()
        .route("/", post(infractions::create_infraction).get(infractions::list_infractions))
        .route("/:id", get(infractions::get_infraction).put(infractions::update_infraction));

    let evidence_routes = Router::new()
        .route("/", post(evidence::create_evidence).get(evidence::list_evidence))
        .route("/:id", get(evidence::get_evidence).put(evidence::update_evidence));

    let statistics_routes = Router::new()
        .route("/violations", get(statistics::violation_statistics))
        .route("/seizures", get(statistics::seizure_statistics))
        .route("/infractions", get(statistics::infraction_statistics))
        .route("/officers", get(statistics::officer_performance))
        .route("/violators", get(statistics::top_violators))
        .route(
            "/daily/:date",
            get(statistics::get_daily_snapshot).post(statistics::save_daily_snapshot),
        );

    // Protected API routes
    let api_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/violations", violation_routes)
        .nest("/seizures", seizure_routes)
        .nest("/infractions", infraction_routes)
        .nest("/evidence", evidence_routes)
        .nest("/statistics", statistics_routes)
        .route("/activity", get(activity::list_activity))
        .route("/reports/violations.csv", get(reports::export_violations))
        .layer(axum_middleware::from_fn(request_log_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
