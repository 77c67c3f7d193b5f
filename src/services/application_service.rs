use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::database::PipelineStore;
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationFilter, ApplicationStatus};
use crate::models::application_stage::ApplicationStage;
use crate::models::status_override::{StatusChange, StatusOverride};
use crate::pipeline;

#[derive(Debug, Clone)]
pub struct ApplicationDetail {
    pub application: Application,
    pub stages: Vec<ApplicationStage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub applications_total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub average_progress: f64,
}

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn PipelineStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn PipelineStore>) -> Self {
        Self { store }
    }

    /// Returns the application and whether this call created it.
    pub async fn apply(&self, candidate_id: Uuid, job_id: Uuid) -> Result<(Application, bool)> {
        let (application, created) = self.store.create_application(candidate_id, job_id).await?;
        if created {
            tracing::info!(
                application_id = %application.id,
                %candidate_id,
                %job_id,
                "Application created"
            );
        }
        Ok((application, created))
    }

    pub async fn get(&self, id: Uuid) -> Result<Application> {
        self.store
            .get_application(id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".into()))
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<ApplicationDetail> {
        let application = self.get(id).await?;
        let stages = self.store.list_stages(id).await?;
        Ok(ApplicationDetail {
            application,
            stages,
        })
    }

    pub async fn list(&self, filter: ApplicationFilter) -> Result<Vec<Application>> {
        self.store.list_applications(&filter).await
    }

    pub async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>> {
        self.list(ApplicationFilter {
            candidate_id: Some(candidate_id),
            ..Default::default()
        })
        .await
    }

    /// Manual HR status change. The percentage comes from the fixed override
    /// table and the change is logged as an override event.
    pub async fn override_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        actor: String,
        reason: Option<String>,
    ) -> Result<(Application, StatusOverride)> {
        let change = StatusChange {
            actor,
            status,
            progress_percentage: pipeline::override_progress(status),
            reason,
        };
        let (application, event) = self.store.apply_status_override(id, &change).await?;
        tracing::info!(
            application_id = %id,
            actor = %event.actor,
            from = %event.previous_status,
            to = %event.new_status,
            "Application status overridden"
        );
        Ok((application, event))
    }

    pub async fn list_overrides(&self, id: Uuid) -> Result<Vec<StatusOverride>> {
        self.get(id).await?;
        self.store.list_status_overrides(id).await
    }

    pub async fn dashboard(&self) -> Result<DashboardStats> {
        let counts = self.store.status_counts().await?;

        let mut by_status: BTreeMap<String, i64> = ApplicationStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut total = 0i64;
        let mut progress_sum = 0i64;
        for row in counts {
            by_status.insert(row.status.as_str().to_string(), row.count);
            total += row.count;
            progress_sum += row.progress_sum;
        }

        let average_progress = if total > 0 {
            progress_sum as f64 / total as f64
        } else {
            0.0
        };

        Ok(DashboardStats {
            applications_total: total,
            by_status,
            average_progress,
        })
    }
}
