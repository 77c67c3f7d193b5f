use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{Application, ApplicationFilter, ResumeDetails, StatusCount};
use crate::models::application_stage::{ApplicationStage, StageOutcome};
use crate::models::status_override::{StatusChange, StatusOverride};

/// Stage row as persisted, plus the application when the progress sync applied.
#[derive(Debug, Clone)]
pub struct RecordedStage {
    pub stage: ApplicationStage,
    pub application: Option<Application>,
}

/// Persistence for applications and their stage rows.
///
/// Implementations keep the writes of a single call atomic: a stage upsert and
/// its progress sync land together or not at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PipelineStore: Send + Sync + 'static {
    /// Creates the application with one pending row per pipeline stage. Applying
    /// twice to the same job returns the existing application with `false`.
    async fn create_application(&self, candidate_id: Uuid, job_id: Uuid)
        -> Result<(Application, bool)>;

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>>;

    async fn list_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>>;

    /// Rows in pipeline order. Unknown applications yield an empty list.
    async fn list_stages(&self, application_id: Uuid) -> Result<Vec<ApplicationStage>>;

    /// Upserts the stage row and, when `sync` is set, re-derives the
    /// application's progress from its stage rows.
    async fn record_stage(
        &self,
        application_id: Uuid,
        outcome: &StageOutcome,
        sync: bool,
    ) -> Result<RecordedStage>;

    /// `record_stage` for the resume stage, storing the resume fields on the
    /// application in the same write.
    async fn record_resume_stage(
        &self,
        application_id: Uuid,
        outcome: &StageOutcome,
        details: &ResumeDetails,
        sync: bool,
    ) -> Result<(ApplicationStage, Application)>;

    /// Re-derives progress from the stage rows. Returns the application when it
    /// changed; rejected applications and backward moves are left alone.
    async fn sync_progress(&self, application_id: Uuid) -> Result<Option<Application>>;

    /// Writes the manual status and logs the override event.
    async fn apply_status_override(
        &self,
        application_id: Uuid,
        change: &StatusChange,
    ) -> Result<(Application, StatusOverride)>;

    async fn list_status_overrides(&self, application_id: Uuid) -> Result<Vec<StatusOverride>>;

    async fn status_counts(&self) -> Result<Vec<StatusCount>>;
}
