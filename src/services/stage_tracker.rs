use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::database::PipelineStore;
use crate::error::{Error, Result};
use crate::models::application::{Application, ResumeDetails};
use crate::models::application_stage::{ApplicationStage, StageName, StageOutcome, StageStatus};
use crate::pipeline;

/// What a stage component reports once the candidate is done with it.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub status: StageStatus,
    pub score: i32,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageOutcomeResult {
    pub stage: ApplicationStage,
    /// Present when the completion advanced the application.
    pub application: Option<Application>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeEvaluation {
    pub passed: bool,
    pub stage: ApplicationStage,
    pub application: Application,
}

#[derive(Clone)]
pub struct StageTracker {
    store: Arc<dyn PipelineStore>,
    qualification_threshold: i32,
}

impl StageTracker {
    pub fn new(store: Arc<dyn PipelineStore>, qualification_threshold: i32) -> Self {
        Self {
            store,
            qualification_threshold,
        }
    }

    pub fn qualification_threshold(&self) -> i32 {
        self.qualification_threshold
    }

    pub async fn list_stages(&self, application_id: Uuid) -> Result<Vec<ApplicationStage>> {
        self.store.list_stages(application_id).await
    }

    /// Checks the score and the application, and builds the row to persist.
    async fn prepare_outcome(
        &self,
        application_id: Uuid,
        stage_name: StageName,
        report: StageReport,
    ) -> Result<StageOutcome> {
        if !(0..=100).contains(&report.score) {
            return Err(Error::Validation(format!(
                "Score must be between 0 and 100, got {}",
                report.score
            )));
        }

        if self.store.get_application(application_id).await?.is_none() {
            return Err(Error::NotFound("Application not found".into()));
        }

        Ok(StageOutcome {
            stage_name,
            status: report.status,
            score: report.score,
            feedback: report.feedback,
            completed_at: report.status.is_final().then(Utc::now),
        })
    }

    pub async fn record_stage_outcome(
        &self,
        application_id: Uuid,
        stage_name: StageName,
        report: StageReport,
    ) -> Result<StageOutcomeResult> {
        let outcome = self.prepare_outcome(application_id, stage_name, report).await?;
        let sync = outcome.status == StageStatus::Completed;

        let recorded = self
            .store
            .record_stage(application_id, &outcome, sync)
            .await
            .map_err(|e| {
                tracing::error!(%application_id, stage = %stage_name, error = %e, "Failed to record stage outcome");
                e
            })?;

        match (sync, &recorded.application) {
            (true, Some(application)) => tracing::info!(
                %application_id,
                stage = %stage_name,
                current_stage = %application.current_stage,
                progress = application.progress_percentage,
                status = %application.status,
                "Stage completed, application advanced"
            ),
            (true, None) => tracing::warn!(
                %application_id,
                stage = %stage_name,
                "Stage completed but application was not advanced (earlier stage open, rejected, or already further along)"
            ),
            (false, _) => tracing::info!(
                %application_id,
                stage = %stage_name,
                status = ?outcome.status,
                "Stage outcome recorded"
            ),
        }

        Ok(StageOutcomeResult {
            stage: recorded.stage,
            application: recorded.application,
        })
    }

    /// Records the resume stage behind the qualification gate and stores the
    /// resume fields on the application in the same write.
    pub async fn complete_resume_upload(
        &self,
        application_id: Uuid,
        resume_url: String,
        qualification_score: i32,
        summary: String,
    ) -> Result<ResumeEvaluation> {
        let threshold = self.qualification_threshold;
        let passed = pipeline::qualification_passed(qualification_score, threshold);
        let report = StageReport {
            status: if passed {
                StageStatus::Completed
            } else {
                StageStatus::Failed
            },
            score: qualification_score,
            feedback: Some(pipeline::qualification_feedback(qualification_score, threshold)),
        };
        let outcome = self
            .prepare_outcome(application_id, StageName::ResumeUpload, report)
            .await?;

        let details = ResumeDetails {
            resume_url,
            resume_summary: summary,
            qualification_score,
        };
        let (stage, application) = self
            .store
            .record_resume_stage(application_id, &outcome, &details, passed)
            .await
            .map_err(|e| {
                tracing::error!(%application_id, error = %e, "Failed to record resume evaluation");
                e
            })?;

        if passed {
            tracing::info!(
                %application_id,
                score = qualification_score,
                current_stage = %application.current_stage,
                "Resume passed the qualification gate"
            );
        } else {
            tracing::warn!(
                %application_id,
                score = qualification_score,
                threshold,
                "Resume did not meet the qualification threshold"
            );
        }

        Ok(ResumeEvaluation {
            passed,
            stage,
            application,
        })
    }

    /// Re-derives the progress fields from the completed stages. Safe to run
    /// repeatedly; it never moves an application backward.
    pub async fn resync_progress(&self, application_id: Uuid) -> Result<Application> {
        let application = self
            .store
            .get_application(application_id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".into()))?;

        match self.store.sync_progress(application_id).await? {
            Some(updated) => {
                tracing::info!(
                    %application_id,
                    current_stage = %updated.current_stage,
                    "Progress resynchronised"
                );
                Ok(updated)
            }
            None => Ok(application),
        }
    }
}
