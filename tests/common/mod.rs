use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use recruitment_pipeline::{
    database::{MemoryStore, PipelineStore},
    middleware::auth::Claims,
    pipeline::DEFAULT_QUALIFICATION_THRESHOLD,
    routes::{build_router, RouterSettings},
    AppState,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test_secret_key";

#[allow(dead_code)]
pub fn setup_app() -> Router {
    app_with_store(Arc::new(MemoryStore::new()))
}

pub fn app_with_store(store: Arc<dyn PipelineStore>) -> Router {
    let state = AppState::new(store, DEFAULT_QUALIFICATION_THRESHOLD);
    build_router(
        state,
        &RouterSettings {
            jwt_secret: JWT_SECRET.to_string(),
            public_rps: 1000,
            integration_rps: 1000,
        },
    )
}

#[allow(dead_code)]
pub fn token_for(role: &str) -> String {
    let claims = Claims {
        sub: format!("{}-user", role),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        role: Some(role.to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("encode token")
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<JsonValue>,
    token: Option<&str>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, body)
}

/// Applies to a fresh job and returns the application id.
pub async fn create_application(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/applications",
        Some(serde_json::json!({
            "candidate_id": uuid::Uuid::new_v4(),
            "job_id": uuid::Uuid::new_v4(),
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().expect("application id").to_string()
}

#[allow(dead_code)]
pub async fn complete_stage(app: &Router, id: &str, stage: &str, score: i32) -> JsonValue {
    let (status, body) = send(
        app,
        "PUT",
        &format!("/api/applications/{}/stages/{}", id, stage),
        Some(serde_json::json!({ "status": "completed", "score": score })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "completing {}: {}", stage, body);
    body
}
