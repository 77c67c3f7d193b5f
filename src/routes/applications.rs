use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::extract::ApiJson;
use crate::{
    dto::application_dto::{
        ApplicationDetailResponse, ApplicationResponse, ApplyPayload, ResumeEvaluationResponse,
        ResumeUploadPayload, StageOutcomePayload, StageOutcomeResponse, StageResponse,
    },
    error::Result,
    models::application_stage::StageName,
    pipeline::STAGE_ORDER,
    services::stage_tracker::StageReport,
    AppState,
};

#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ApplyPayload>,
) -> Result<impl IntoResponse> {
    let (application, created) = state
        .application_service
        .apply(payload.candidate_id, payload.job_id)
        .await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApplicationResponse::from(application))))
}

pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let detail = state.application_service.get_detail(id).await?;
    Ok(Json(ApplicationDetailResponse {
        next_stage: detail.application.current_stage.stage(),
        application: detail.application.into(),
        stages: detail.stages.into_iter().map(StageResponse::from).collect(),
    }))
}

pub async fn list_stages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let stages = state.stage_tracker.list_stages(id).await?;
    let stages: Vec<StageResponse> = stages.into_iter().map(StageResponse::from).collect();
    Ok(Json(stages))
}

#[axum::debug_handler]
pub async fn record_stage_outcome(
    State(state): State<AppState>,
    Path((id, stage)): Path<(Uuid, String)>,
    ApiJson(payload): ApiJson<StageOutcomePayload>,
) -> Result<impl IntoResponse> {
    let stage_name: StageName = stage.parse()?;
    payload.validate()?;

    let result = state
        .stage_tracker
        .record_stage_outcome(
            id,
            stage_name,
            StageReport {
                status: payload.status,
                score: payload.score,
                feedback: payload.feedback,
            },
        )
        .await?;

    Ok(Json(StageOutcomeResponse {
        stage: result.stage.into(),
        progress_synced: result.application.is_some(),
        application: result.application.map(ApplicationResponse::from),
    }))
}

#[axum::debug_handler]
pub async fn complete_resume_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<ResumeUploadPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let evaluation = state
        .stage_tracker
        .complete_resume_upload(
            id,
            payload.resume_url,
            payload.qualification_score,
            payload.summary,
        )
        .await?;

    Ok(Json(ResumeEvaluationResponse {
        passed: evaluation.passed,
        threshold: state.stage_tracker.qualification_threshold(),
        stage: evaluation.stage.into(),
        application: evaluation.application.into(),
    }))
}

pub async fn list_candidate_applications(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let applications = state
        .application_service
        .list_for_candidate(candidate_id)
        .await?;
    let applications: Vec<ApplicationResponse> =
        applications.into_iter().map(ApplicationResponse::from).collect();
    Ok(Json(applications))
}

pub async fn pipeline_stages() -> impl IntoResponse {
    let stages: Vec<_> = STAGE_ORDER
        .iter()
        .enumerate()
        .map(|(position, stage)| json!({ "stage_name": stage, "position": position }))
        .collect();
    Json(json!({ "stages": stages }))
}
