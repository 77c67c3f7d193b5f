use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::store::{PipelineStore, RecordedStage};
use crate::error::{Error, Result};
use crate::models::application::{
    Application, ApplicationFilter, ApplicationStatus, CurrentStage, ResumeDetails, StatusCount,
};
use crate::models::application_stage::{ApplicationStage, StageName, StageOutcome, StageStatus};
use crate::models::status_override::{StatusChange, StatusOverride};
use crate::pipeline::{ProgressUpdate, INITIAL_PROGRESS, STAGE_ORDER};

#[derive(Default)]
struct MemoryState {
    applications: HashMap<Uuid, Application>,
    stages: HashMap<(Uuid, StageName), ApplicationStage>,
    overrides: Vec<StatusOverride>,
}

impl MemoryState {
    fn upsert_stage(&mut self, application_id: Uuid, outcome: &StageOutcome) -> ApplicationStage {
        let now = Utc::now();
        self.stages
            .entry((application_id, outcome.stage_name))
            .and_modify(|row| {
                row.status = outcome.status;
                row.score = outcome.score;
                row.feedback = outcome.feedback.clone();
                row.completed_at = outcome.completed_at;
                row.updated_at = now;
            })
            .or_insert_with(|| ApplicationStage {
                id: Uuid::new_v4(),
                application_id,
                stage_name: outcome.stage_name,
                status: outcome.status,
                score: outcome.score,
                feedback: outcome.feedback.clone(),
                completed_at: outcome.completed_at,
                created_at: now,
                updated_at: now,
            })
            .clone()
    }

    fn sync_progress(&mut self, application_id: Uuid) -> Option<Application> {
        let stages: Vec<ApplicationStage> = STAGE_ORDER
            .iter()
            .filter_map(|stage| self.stages.get(&(application_id, *stage)).cloned())
            .collect();
        let update = ProgressUpdate::from_stages(&stages)?;

        let application = self.applications.get_mut(&application_id)?;
        if !update.applies_to(application) {
            return None;
        }
        application.current_stage = update.current_stage;
        application.progress_percentage = update.progress_percentage;
        application.status = update.status;
        application.updated_at = Utc::now();
        Some(application.clone())
    }
}

/// Process-local store. A single lock spans every write of a call.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found() -> Error {
    Error::NotFound("Application not found".into())
}

#[async_trait]
impl PipelineStore for MemoryStore {
    async fn create_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<(Application, bool)> {
        let mut state = self.state.lock().await;

        if let Some(existing) = state
            .applications
            .values()
            .find(|a| a.candidate_id == candidate_id && a.job_id == job_id)
        {
            return Ok((existing.clone(), false));
        }

        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4(),
            candidate_id,
            job_id,
            status: ApplicationStatus::Applied,
            current_stage: CurrentStage::ResumeUpload,
            progress_percentage: INITIAL_PROGRESS,
            qualification_score: None,
            resume_url: None,
            resume_summary: None,
            created_at: now,
            updated_at: now,
        };

        for stage_name in STAGE_ORDER {
            state.stages.insert(
                (application.id, stage_name),
                ApplicationStage {
                    id: Uuid::new_v4(),
                    application_id: application.id,
                    stage_name,
                    status: StageStatus::Pending,
                    score: 0,
                    feedback: None,
                    completed_at: None,
                    created_at: now,
                    updated_at: now,
                },
            );
        }
        state.applications.insert(application.id, application.clone());

        Ok((application, true))
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
        let state = self.state.lock().await;
        Ok(state.applications.get(&id).cloned())
    }

    async fn list_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>> {
        let state = self.state.lock().await;
        let mut applications: Vec<Application> = state
            .applications
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(applications)
    }

    async fn list_stages(&self, application_id: Uuid) -> Result<Vec<ApplicationStage>> {
        let state = self.state.lock().await;
        Ok(STAGE_ORDER
            .iter()
            .filter_map(|stage| state.stages.get(&(application_id, *stage)).cloned())
            .collect())
    }

    async fn record_stage(
        &self,
        application_id: Uuid,
        outcome: &StageOutcome,
        sync: bool,
    ) -> Result<RecordedStage> {
        let mut state = self.state.lock().await;
        if !state.applications.contains_key(&application_id) {
            return Err(not_found());
        }

        let stage = state.upsert_stage(application_id, outcome);
        let application = if sync {
            state.sync_progress(application_id)
        } else {
            None
        };
        Ok(RecordedStage { stage, application })
    }

    async fn record_resume_stage(
        &self,
        application_id: Uuid,
        outcome: &StageOutcome,
        details: &ResumeDetails,
        sync: bool,
    ) -> Result<(ApplicationStage, Application)> {
        let mut state = self.state.lock().await;
        let application = state
            .applications
            .get_mut(&application_id)
            .ok_or_else(not_found)?;
        application.resume_url = Some(details.resume_url.clone());
        application.resume_summary = Some(details.resume_summary.clone());
        application.qualification_score = Some(details.qualification_score);
        application.updated_at = Utc::now();
        let saved = application.clone();

        let stage = state.upsert_stage(application_id, outcome);
        let synced = if sync {
            state.sync_progress(application_id)
        } else {
            None
        };
        Ok((stage, synced.unwrap_or(saved)))
    }

    async fn sync_progress(&self, application_id: Uuid) -> Result<Option<Application>> {
        let mut state = self.state.lock().await;
        if !state.applications.contains_key(&application_id) {
            return Err(not_found());
        }
        Ok(state.sync_progress(application_id))
    }

    async fn apply_status_override(
        &self,
        application_id: Uuid,
        change: &StatusChange,
    ) -> Result<(Application, StatusOverride)> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let application = state
            .applications
            .get_mut(&application_id)
            .ok_or_else(not_found)?;

        let event = StatusOverride {
            id: Uuid::new_v4(),
            application_id,
            actor: change.actor.clone(),
            previous_status: application.status,
            new_status: change.status,
            previous_progress: application.progress_percentage,
            new_progress: change.progress_percentage,
            reason: change.reason.clone(),
            created_at: now,
        };
        application.status = change.status;
        application.progress_percentage = change.progress_percentage;
        application.updated_at = now;
        let application = application.clone();

        state.overrides.push(event.clone());
        Ok((application, event))
    }

    async fn list_status_overrides(&self, application_id: Uuid) -> Result<Vec<StatusOverride>> {
        let state = self.state.lock().await;
        Ok(state
            .overrides
            .iter()
            .filter(|e| e.application_id == application_id)
            .cloned()
            .collect())
    }

    async fn status_counts(&self) -> Result<Vec<StatusCount>> {
        let state = self.state.lock().await;
        Ok(ApplicationStatus::ALL
            .iter()
            .filter_map(|status| {
                let matching: Vec<&Application> = state
                    .applications
                    .values()
                    .filter(|a| a.status == *status)
                    .collect();
                if matching.is_empty() {
                    return None;
                }
                Some(StatusCount {
                    status: *status,
                    count: matching.len() as i64,
                    progress_sum: matching.iter().map(|a| a.progress_percentage as i64).sum(),
                })
            })
            .collect())
    }
}
