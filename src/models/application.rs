use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use super::application_stage::StageName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    AptitudeTest,
    GroupDiscussion,
    TechnicalTest,
    HrRound,
    Completed,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Applied,
        ApplicationStatus::AptitudeTest,
        ApplicationStatus::GroupDiscussion,
        ApplicationStatus::TechnicalTest,
        ApplicationStatus::HrRound,
        ApplicationStatus::Completed,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::AptitudeTest => "aptitude_test",
            ApplicationStatus::GroupDiscussion => "group_discussion",
            ApplicationStatus::TechnicalTest => "technical_test",
            ApplicationStatus::HrRound => "hr_round",
            ApplicationStatus::Completed => "completed",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The next stage a candidate has to finish, or `Completed` once the last one is done.
/// Ordering follows the pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "pipeline_position", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CurrentStage {
    ResumeUpload,
    AptitudeTest,
    GroupDiscussion,
    TechnicalTest,
    HrRound,
    PersonalityTest,
    Completed,
}

impl CurrentStage {
    pub fn stage(self) -> Option<StageName> {
        match self {
            CurrentStage::ResumeUpload => Some(StageName::ResumeUpload),
            CurrentStage::AptitudeTest => Some(StageName::AptitudeTest),
            CurrentStage::GroupDiscussion => Some(StageName::GroupDiscussion),
            CurrentStage::TechnicalTest => Some(StageName::TechnicalTest),
            CurrentStage::HrRound => Some(StageName::HrRound),
            CurrentStage::PersonalityTest => Some(StageName::PersonalityTest),
            CurrentStage::Completed => None,
        }
    }
}

impl From<StageName> for CurrentStage {
    fn from(stage: StageName) -> Self {
        match stage {
            StageName::ResumeUpload => CurrentStage::ResumeUpload,
            StageName::AptitudeTest => CurrentStage::AptitudeTest,
            StageName::GroupDiscussion => CurrentStage::GroupDiscussion,
            StageName::TechnicalTest => CurrentStage::TechnicalTest,
            StageName::HrRound => CurrentStage::HrRound,
            StageName::PersonalityTest => CurrentStage::PersonalityTest,
        }
    }
}

impl fmt::Display for CurrentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage() {
            Some(stage) => f.write_str(stage.as_str()),
            None => f.write_str("completed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub status: ApplicationStatus,
    pub current_stage: CurrentStage,
    pub progress_percentage: i32,
    pub qualification_score: Option<i32>,
    pub resume_url: Option<String>,
    pub resume_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationFilter {
    pub candidate_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub status: Option<ApplicationStatus>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &Application) -> bool {
        self.candidate_id.map_or(true, |id| application.candidate_id == id)
            && self.job_id.map_or(true, |id| application.job_id == id)
            && self.status.map_or(true, |s| application.status == s)
    }
}

/// Fields captured when the resume stage is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDetails {
    pub resume_url: String,
    pub resume_summary: String,
    pub qualification_score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: i64,
    pub progress_sum: i64,
}
