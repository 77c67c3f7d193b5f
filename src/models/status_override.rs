use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::application::ApplicationStatus;

/// A manual HR status change, kept alongside the tracker-derived fields it overwrote.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatusOverride {
    pub id: Uuid,
    pub application_id: Uuid,
    pub actor: String,
    pub previous_status: ApplicationStatus,
    pub new_status: ApplicationStatus,
    pub previous_progress: i32,
    pub new_progress: i32,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub actor: String,
    pub status: ApplicationStatus,
    pub progress_percentage: i32,
    pub reason: Option<String>,
}
