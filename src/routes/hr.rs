use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use super::extract::ApiJson;
use crate::{
    dto::application_dto::{
        ApplicationListQuery, ApplicationResponse, StatusDictionaryEntry, StatusOverridePayload,
        StatusOverrideResponse,
    },
    error::Result,
    middleware::auth::Claims,
    models::application::ApplicationFilter,
    pipeline::OVERRIDE_PROGRESS,
    AppState,
};

pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let applications = state
        .application_service
        .list(ApplicationFilter {
            candidate_id: query.candidate_id,
            job_id: query.job_id,
            status: query.status,
        })
        .await?;
    let applications: Vec<ApplicationResponse> =
        applications.into_iter().map(ApplicationResponse::from).collect();
    Ok(Json(applications))
}

#[axum::debug_handler]
pub async fn override_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<StatusOverridePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (application, event) = state
        .application_service
        .override_status(id, payload.status, claims.sub, payload.reason)
        .await?;
    Ok(Json(StatusOverrideResponse {
        application: application.into(),
        event,
    }))
}

pub async fn list_overrides(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let events = state.application_service.list_overrides(id).await?;
    Ok(Json(events))
}

pub async fn resync_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.stage_tracker.resync_progress(id).await?;
    Ok(Json(ApplicationResponse::from(application)))
}

pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.application_service.dashboard().await?;
    Ok(Json(stats))
}

pub async fn status_dictionary() -> impl IntoResponse {
    let entries: Vec<StatusDictionaryEntry> = OVERRIDE_PROGRESS
        .iter()
        .map(|(status, progress_percentage)| StatusDictionaryEntry {
            status: *status,
            progress_percentage: *progress_percentage,
        })
        .collect();
    Json(entries)
}
