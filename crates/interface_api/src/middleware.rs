//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::auth::{validate_token, Actor};
use crate::AppState;

/// Header carrying the client address behind a proxy
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Authentication middleware
///
/// Validates the bearer token and stores the resolved [`Actor`] in the
/// request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            warn!("Missing or invalid Authorization header");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    match validate_token(token, &state.config.jwt_secret) {
        Ok(claims) => {
            let mut actor = Actor::from_claims(&claims);
            actor.ip_address = request
                .headers()
                .get(FORWARDED_FOR)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.split(',').next())
                .map(|ip| ip.trim().to_string());
            request.extensions_mut().insert(actor);
            Ok(next.run(request).await)
        }
        Err(e) => {
            warn!(error = %e, "Token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Request logging middleware
///
/// Logs method, URI, actor, status and duration of every API request.
pub async fn request_log_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_id = request
        .extensions()
        .get::<Actor>()
        .map(|a| a.user_id.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
