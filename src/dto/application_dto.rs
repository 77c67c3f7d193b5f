use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{Application, ApplicationStatus, CurrentStage};
use crate::models::application_stage::{ApplicationStage, StageName, StageStatus};
use crate::models::status_override::StatusOverride;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyPayload {
    pub candidate_id: Uuid,
    pub job_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StageOutcomePayload {
    pub status: StageStatus,
    #[validate(range(min = 0, max = 100))]
    pub score: i32,
    #[validate(length(max = 4000))]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResumeUploadPayload {
    #[validate(url)]
    pub resume_url: String,
    #[validate(range(min = 0, max = 100))]
    pub qualification_score: i32,
    #[validate(length(min = 1, max = 8000))]
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StatusOverridePayload {
    pub status: ApplicationStatus,
    #[validate(length(min = 1, max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<ApplicationStatus>,
    pub job_id: Option<Uuid>,
    pub candidate_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub status: ApplicationStatus,
    pub current_stage: CurrentStage,
    pub progress_percentage: i32,
    pub qualification_score: Option<i32>,
    pub resume_url: Option<String>,
    pub resume_summary: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(a: Application) -> Self {
        Self {
            id: a.id,
            candidate_id: a.candidate_id,
            job_id: a.job_id,
            status: a.status,
            current_stage: a.current_stage,
            progress_percentage: a.progress_percentage,
            qualification_score: a.qualification_score,
            resume_url: a.resume_url,
            resume_summary: a.resume_summary,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageResponse {
    pub stage_name: StageName,
    pub position: usize,
    pub status: StageStatus,
    pub score: i32,
    pub feedback: Option<String>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ApplicationStage> for StageResponse {
    fn from(s: ApplicationStage) -> Self {
        Self {
            stage_name: s.stage_name,
            position: crate::pipeline::position(s.stage_name),
            status: s.status,
            score: s.score,
            feedback: s.feedback,
            completed_at: s.completed_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetailResponse {
    pub application: ApplicationResponse,
    /// `None` once every stage is done.
    pub next_stage: Option<StageName>,
    pub stages: Vec<StageResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageOutcomeResponse {
    pub stage: StageResponse,
    pub progress_synced: bool,
    pub application: Option<ApplicationResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeEvaluationResponse {
    pub passed: bool,
    pub threshold: i32,
    pub stage: StageResponse,
    pub application: ApplicationResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusOverrideResponse {
    pub application: ApplicationResponse,
    pub event: StatusOverride,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusDictionaryEntry {
    pub status: ApplicationStatus,
    pub progress_percentage: i32,
}
