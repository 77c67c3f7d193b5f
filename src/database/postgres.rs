use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::store::{PipelineStore, RecordedStage};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationFilter, ResumeDetails, StatusCount};
use crate::models::application_stage::{ApplicationStage, StageOutcome};
use crate::models::status_override::{StatusChange, StatusOverride};
use crate::pipeline::{ProgressUpdate, STAGE_ORDER};

const APPLICATION_COLUMNS: &str = "id, candidate_id, job_id, status, current_stage, \
     progress_percentage, qualification_score, resume_url, resume_summary, created_at, updated_at";

const STAGE_COLUMNS: &str =
    "id, application_id, stage_name, status, score, feedback, completed_at, created_at, updated_at";

#[derive(Clone)]
pub struct PgPipelineStore {
    pool: PgPool,
}

impl PgPipelineStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Takes the row lock that serialises every stage write of one application.
async fn lock_application(conn: &mut PgConnection, application_id: Uuid) -> Result<Application> {
    sqlx::query_as::<_, Application>(&format!(
        "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1 FOR UPDATE"
    ))
    .bind(application_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| Error::NotFound("Application not found".into()))
}

async fn upsert_stage(
    conn: &mut PgConnection,
    application_id: Uuid,
    outcome: &StageOutcome,
) -> Result<ApplicationStage> {
    let stage = sqlx::query_as::<_, ApplicationStage>(&format!(
        r#"
        INSERT INTO application_stages (application_id, stage_name, status, score, feedback, completed_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (application_id, stage_name) DO UPDATE
        SET status = EXCLUDED.status,
            score = EXCLUDED.score,
            feedback = EXCLUDED.feedback,
            completed_at = EXCLUDED.completed_at,
            updated_at = NOW()
        RETURNING {STAGE_COLUMNS}
        "#
    ))
    .bind(application_id)
    .bind(outcome.stage_name)
    .bind(outcome.status)
    .bind(outcome.score)
    .bind(&outcome.feedback)
    .bind(outcome.completed_at)
    .fetch_one(conn)
    .await?;
    Ok(stage)
}

async fn sync_progress_in(
    conn: &mut PgConnection,
    application_id: Uuid,
) -> Result<Option<Application>> {
    let stages = sqlx::query_as::<_, ApplicationStage>(&format!(
        "SELECT {STAGE_COLUMNS} FROM application_stages WHERE application_id = $1"
    ))
    .bind(application_id)
    .fetch_all(&mut *conn)
    .await?;
    let Some(update) = ProgressUpdate::from_stages(&stages) else {
        return Ok(None);
    };

    // Enum comparison follows the declared pipeline order.
    let application = sqlx::query_as::<_, Application>(&format!(
        r#"
        UPDATE applications
        SET current_stage = $2, progress_percentage = $3, status = $4, updated_at = NOW()
        WHERE id = $1 AND status <> 'rejected' AND current_stage <= $2
        RETURNING {APPLICATION_COLUMNS}
        "#
    ))
    .bind(application_id)
    .bind(update.current_stage)
    .bind(update.progress_percentage)
    .bind(update.status)
    .fetch_optional(conn)
    .await?;
    Ok(application)
}

#[async_trait]
impl PipelineStore for PgPipelineStore {
    async fn create_application(
        &self,
        candidate_id: Uuid,
        job_id: Uuid,
    ) -> Result<(Application, bool)> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Application>(&format!(
            r#"
            INSERT INTO applications (candidate_id, job_id)
            VALUES ($1, $2)
            ON CONFLICT (candidate_id, job_id) DO NOTHING
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(candidate_id)
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(application) = inserted else {
            tx.rollback().await?;
            let existing = sqlx::query_as::<_, Application>(&format!(
                "SELECT {APPLICATION_COLUMNS} FROM applications WHERE candidate_id = $1 AND job_id = $2"
            ))
            .bind(candidate_id)
            .bind(job_id)
            .fetch_one(&self.pool)
            .await?;
            return Ok((existing, false));
        };

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO application_stages (application_id, stage_name) ");
        builder.push_values(STAGE_ORDER.iter(), |mut row, stage| {
            row.push_bind(application.id).push_bind(*stage);
        });
        builder.build().execute(&mut *tx).await?;

        tx.commit().await?;
        Ok((application, true))
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(application)
    }

    async fn list_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE TRUE"
        ));
        if let Some(candidate_id) = filter.candidate_id {
            builder.push(" AND candidate_id = ").push_bind(candidate_id);
        }
        if let Some(job_id) = filter.job_id {
            builder.push(" AND job_id = ").push_bind(job_id);
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        builder.push(" ORDER BY created_at DESC");

        let applications = builder
            .build_query_as::<Application>()
            .fetch_all(&self.pool)
            .await?;
        Ok(applications)
    }

    async fn list_stages(&self, application_id: Uuid) -> Result<Vec<ApplicationStage>> {
        let stages = sqlx::query_as::<_, ApplicationStage>(&format!(
            "SELECT {STAGE_COLUMNS} FROM application_stages WHERE application_id = $1 ORDER BY stage_name"
        ))
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(stages)
    }

    async fn record_stage(
        &self,
        application_id: Uuid,
        outcome: &StageOutcome,
        sync: bool,
    ) -> Result<RecordedStage> {
        let mut tx = self.pool.begin().await?;

        lock_application(&mut *tx, application_id).await?;
        let stage = upsert_stage(&mut *tx, application_id, outcome).await?;
        let application = if sync {
            sync_progress_in(&mut *tx, application_id).await?
        } else {
            None
        };

        tx.commit().await?;
        Ok(RecordedStage { stage, application })
    }

    async fn record_resume_stage(
        &self,
        application_id: Uuid,
        outcome: &StageOutcome,
        details: &ResumeDetails,
        sync: bool,
    ) -> Result<(ApplicationStage, Application)> {
        let mut tx = self.pool.begin().await?;

        lock_application(&mut *tx, application_id).await?;
        let saved = sqlx::query_as::<_, Application>(&format!(
            r#"
            UPDATE applications
            SET resume_url = $2, resume_summary = $3, qualification_score = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(application_id)
        .bind(&details.resume_url)
        .bind(&details.resume_summary)
        .bind(details.qualification_score)
        .fetch_one(&mut *tx)
        .await?;

        let stage = upsert_stage(&mut *tx, application_id, outcome).await?;
        let synced = if sync {
            sync_progress_in(&mut *tx, application_id).await?
        } else {
            None
        };

        tx.commit().await?;
        Ok((stage, synced.unwrap_or(saved)))
    }

    async fn sync_progress(&self, application_id: Uuid) -> Result<Option<Application>> {
        let mut tx = self.pool.begin().await?;
        lock_application(&mut *tx, application_id).await?;
        let application = sync_progress_in(&mut *tx, application_id).await?;
        tx.commit().await?;
        Ok(application)
    }

    async fn apply_status_override(
        &self,
        application_id: Uuid,
        change: &StatusChange,
    ) -> Result<(Application, StatusOverride)> {
        let mut tx = self.pool.begin().await?;

        let previous = lock_application(&mut *tx, application_id).await?;

        let application = sqlx::query_as::<_, Application>(&format!(
            r#"
            UPDATE applications
            SET status = $2, progress_percentage = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(application_id)
        .bind(change.status)
        .bind(change.progress_percentage)
        .fetch_one(&mut *tx)
        .await?;

        let event = sqlx::query_as::<_, StatusOverride>(
            r#"
            INSERT INTO status_overrides
                (application_id, actor, previous_status, new_status, previous_progress, new_progress, reason)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, application_id, actor, previous_status, new_status,
                      previous_progress, new_progress, reason, created_at
            "#,
        )
        .bind(application_id)
        .bind(&change.actor)
        .bind(previous.status)
        .bind(change.status)
        .bind(previous.progress_percentage)
        .bind(change.progress_percentage)
        .bind(&change.reason)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((application, event))
    }

    async fn list_status_overrides(&self, application_id: Uuid) -> Result<Vec<StatusOverride>> {
        let events = sqlx::query_as::<_, StatusOverride>(
            r#"
            SELECT id, application_id, actor, previous_status, new_status,
                   previous_progress, new_progress, reason, created_at
            FROM status_overrides
            WHERE application_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn status_counts(&self) -> Result<Vec<StatusCount>> {
        let counts = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT status, COUNT(*) AS count, COALESCE(SUM(progress_percentage), 0)::BIGINT AS progress_sum
            FROM applications
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }
}
