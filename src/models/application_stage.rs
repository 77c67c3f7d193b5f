use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// One of the six fixed hiring steps. Variant order is pipeline order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "stage_name", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    ResumeUpload,
    AptitudeTest,
    GroupDiscussion,
    TechnicalTest,
    HrRound,
    PersonalityTest,
}

impl StageName {
    pub fn as_str(self) -> &'static str {
        match self {
            StageName::ResumeUpload => "resume_upload",
            StageName::AptitudeTest => "aptitude_test",
            StageName::GroupDiscussion => "group_discussion",
            StageName::TechnicalTest => "technical_test",
            StageName::HrRound => "hr_round",
            StageName::PersonalityTest => "personality_test",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::pipeline::STAGE_ORDER
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| Error::Validation(format!("Unknown stage name: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "stage_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl StageStatus {
    /// Terminal outcomes carry a `completed_at` stamp.
    pub fn is_final(self) -> bool {
        matches!(self, StageStatus::Completed | StageStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationStage {
    pub id: Uuid,
    pub application_id: Uuid,
    pub stage_name: StageName,
    pub status: StageStatus,
    pub score: i32,
    pub feedback: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome reported for a single stage by whatever ran it.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome {
    pub stage_name: StageName,
    pub status: StageStatus,
    pub score: i32,
    pub feedback: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}
