//! Router tests driving the API end to end against an in-memory store

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use core_kernel::UserId;
use domain_case::{ActionType, ActivityQuery, Role};
use interface_api::{auth::create_token, config::ApiConfig, create_router};
use serde_json::{json, Value};
use test_utils::{create_test_database, TestDatabase};
use tower::ServiceExt;

const SECRET: &str = "router-test-secret";

struct Harness {
    app: Router,
    store: TestDatabase,
    admin: UserId,
    officer: UserId,
}

impl Harness {
    async fn new() -> Self {
        let store = create_test_database().await;
        let admin = store.seed_user("admin", Role::Admin).await.id;
        let officer = store.seed_user("officer.two", Role::Officer).await.id;
        let config = ApiConfig {
            jwt_secret: SECRET.to_string(),
            ..ApiConfig::default()
        };
        let app = create_router(store.db.clone(), config);
        Self { app, store, admin, officer }
    }

    fn token(&self, user: UserId, role: Role) -> String {
        create_token(user, role, SECRET, 300).unwrap()
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(method, uri, token, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn send_raw(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }
}

fn violation_body(number: &str, severity: &str) -> Value {
    json!({
        "violation_number": number,
        "violator_name": "Lena Park",
        "violation_date": "2024-03-15T09:30:00Z",
        "violation_type": "traffic",
        "severity_level": severity,
        "location": "Harbor Bridge",
        "fine_amount": "150.00"
    })
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_is_public() {
        let h = Harness::new().await;
        let (status, body) = h.send(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = h.send(Method::GET, "/health/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn test_api_requires_token() {
        let h = Harness::new().await;
        let (status, _) = h.send(Method::GET, "/api/v1/violations", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = h
            .send(Method::GET, "/api/v1/violations", Some("not-a-token"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

mod violation_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_records_activity() {
        let h = Harness::new().await;
        let token = h.token(h.officer, Role::Officer);

        let (status, body) = h
            .send(Method::POST, "/api/v1/violations", Some(&token), Some(violation_body("API-1", "minor")))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["violation_number"], "API-1");
        assert_eq!(body["officer_id"], h.officer.get());

        let entries = h
            .store
            .db
            .activity
            .query(&ActivityQuery {
                actor: Some(h.officer),
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action_type, ActionType::Create);
    }

    #[tokio::test]
    async fn test_unknown_enum_value_names_field() {
        let h = Harness::new().await;
        let token = h.token(h.officer, Role::Officer);

        let (status, body) = h
            .send(Method::POST, "/api/v1/violations", Some(&token), Some(violation_body("API-2", "apocalyptic")))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["field"], "severity_level");
        assert_eq!(body["retryable"], true);
        assert_eq!(h.store.count_rows("violations").await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_number_conflicts() {
        let h = Harness::new().await;
        let token = h.token(h.officer, Role::Officer);

        let (first, _) = h
            .send(Method::POST, "/api/v1/violations", Some(&token), Some(violation_body("API-3", "minor")))
            .await;
        let (second, body) = h
            .send(Method::POST, "/api/v1/violations", Some(&token), Some(violation_body("API-3", "serious")))
            .await;

        assert_eq!(first, StatusCode::CREATED);
        assert_eq!(second, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");
    }

    #[tokio::test]
    async fn test_empty_update_is_unchanged() {
        let h = Harness::new().await;
        let token = h.token(h.officer, Role::Officer);
        let violation = h.store.seed_violation("API-4", h.officer).await;

        let (status, body) = h
            .send(
                Method::PUT,
                &format!("/api/v1/violations/{}", violation.id.get()),
                Some(&token),
                Some(json!({})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "unchanged");
    }

    #[tokio::test]
    async fn test_missing_violation_is_not_found() {
        let h = Harness::new().await;
        let token = h.token(h.officer, Role::Officer);
        let (status, body) = h
            .send(Method::GET, "/api/v1/violations/999", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["retryable"], false);
    }
}

mod seizure_tests {
    use super::*;

    #[tokio::test]
    async fn test_seizure_for_missing_violation_rejected() {
        let h = Harness::new().await;
        let token = h.token(h.officer, Role::Officer);

        let (status, body) = h
            .send(
                Method::POST,
                "/api/v1/seizures",
                Some(&token),
                Some(json!({
                    "seizure_number": "SZ-API-1",
                    "violation_id": 9999,
                    "item_description": "Laptop",
                    "item_quantity": 1,
                    "item_category": "other",
                    "seizure_date": "2024-03-15T10:00:00Z"
                })),
            )
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["field"], "violation_id");
        assert_eq!(h.store.count_rows("seizures").await, 0);
    }
}

mod authorization_tests {
    use super::*;

    fn user_body(username: &str) -> Value {
        json!({
            "username": username,
            "email": format!("{}@police.example", username),
            "password_hash": "opaque",
            "full_name": "New Analyst",
            "role": "analyst"
        })
    }

    #[tokio::test]
    async fn test_only_admin_provisions_users() {
        let h = Harness::new().await;

        let officer_token = h.token(h.officer, Role::Officer);
        let (status, body) = h
            .send(Method::POST, "/api/v1/users", Some(&officer_token), Some(user_body("analyst.a")))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let admin_token = h.token(h.admin, Role::Admin);
        let (status, body) = h
            .send(Method::POST, "/api/v1/users", Some(&admin_token), Some(user_body("analyst.a")))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_deactivation_is_logged_as_deactivate() {
        let h = Harness::new().await;
        let admin_token = h.token(h.admin, Role::Admin);

        let (status, body) = h
            .send(
                Method::PUT,
                &format!("/api/v1/users/{}", h.officer.get()),
                Some(&admin_token),
                Some(json!({ "is_active": false })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "updated");

        let entries = h.store.db.activity.query(&ActivityQuery::default()).await.unwrap();
        assert_eq!(entries[0].action_type, ActionType::Deactivate);
    }

    #[tokio::test]
    async fn test_snapshot_requires_supervisor() {
        let h = Harness::new().await;
        let officer_token = h.token(h.officer, Role::Officer);
        let (status, _) = h
            .send(Method::POST, "/api/v1/statistics/daily/2024-03-15", Some(&officer_token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let supervisor = h.store.seed_user("sgt.lee", Role::Supervisor).await.id;
        let token = h.token(supervisor, Role::Supervisor);
        let (status, body) = h
            .send(Method::POST, "/api/v1/statistics/daily/2024-03-15", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["date"], "2024-03-15");
        assert_eq!(body["total_violations"], 0);
    }
}

mod report_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_export_is_reported() {
        let h = Harness::new().await;
        let token = h.token(h.officer, Role::Officer);
        let (status, body) = h
            .send(Method::GET, "/api/v1/reports/violations.csv", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "No violations to export");
    }

    #[tokio::test]
    async fn test_export_writes_csv_and_logs() {
        let h = Harness::new().await;
        let token = h.token(h.officer, Role::Officer);
        h.store.seed_violation("CSV-1", h.officer).await;
        h.store.seed_violation("CSV-2", h.officer).await;

        let (status, bytes) = h
            .send_raw(Method::GET, "/api/v1/reports/violations.csv", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("id,violation_number,"));

        let entries = h.store.db.activity.query(&ActivityQuery::default()).await.unwrap();
        assert_eq!(entries[0].action_type, ActionType::Export);
    }
}
