//! Stage ordering and the rules that derive an application's progress from it.
//!
//! Everything here is pure; the tracker and the stores apply these rules to
//! persisted rows.

use serde::Serialize;

use crate::models::application::{Application, ApplicationStatus, CurrentStage};
use crate::models::application_stage::{ApplicationStage, StageName, StageStatus};

/// The hiring pipeline, in the order a candidate walks through it.
pub const STAGE_ORDER: [StageName; 6] = [
    StageName::ResumeUpload,
    StageName::AptitudeTest,
    StageName::GroupDiscussion,
    StageName::TechnicalTest,
    StageName::HrRound,
    StageName::PersonalityTest,
];

pub const DEFAULT_QUALIFICATION_THRESHOLD: i32 = 75;

/// Progress shown for a fresh application before any stage is done.
pub const INITIAL_PROGRESS: i32 = 10;

/// Percentages HR overrides write for each status.
pub const OVERRIDE_PROGRESS: [(ApplicationStatus, i32); 7] = [
    (ApplicationStatus::Applied, INITIAL_PROGRESS),
    (ApplicationStatus::AptitudeTest, 30),
    (ApplicationStatus::GroupDiscussion, 50),
    (ApplicationStatus::TechnicalTest, 70),
    (ApplicationStatus::HrRound, 85),
    (ApplicationStatus::Completed, 100),
    (ApplicationStatus::Rejected, 0),
];

pub fn position(stage: StageName) -> usize {
    // STAGE_ORDER mirrors the enum declaration order.
    stage as usize
}

pub fn next_stage(stage: StageName) -> CurrentStage {
    STAGE_ORDER
        .get(position(stage) + 1)
        .map(|&next| CurrentStage::from(next))
        .unwrap_or(CurrentStage::Completed)
}

/// `round(100 * completed / 6)` using integer arithmetic.
pub fn progress_percentage(completed: usize) -> i32 {
    let total = STAGE_ORDER.len();
    let completed = completed.min(total);
    ((100 * completed + total / 2) / total) as i32
}

/// Application status after `stage` completes. Resume upload keeps the default.
pub fn status_after(stage: StageName) -> ApplicationStatus {
    match stage {
        StageName::ResumeUpload => ApplicationStatus::Applied,
        StageName::AptitudeTest => ApplicationStatus::AptitudeTest,
        StageName::GroupDiscussion => ApplicationStatus::GroupDiscussion,
        StageName::TechnicalTest => ApplicationStatus::TechnicalTest,
        StageName::HrRound => ApplicationStatus::HrRound,
        StageName::PersonalityTest => ApplicationStatus::Completed,
    }
}

/// Derived application fields written when a stage completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    pub current_stage: CurrentStage,
    pub progress_percentage: i32,
    pub status: ApplicationStatus,
}

impl ProgressUpdate {
    pub fn after(completed: StageName) -> Self {
        Self {
            current_stage: next_stage(completed),
            progress_percentage: progress_percentage(position(completed) + 1),
            status: status_after(completed),
        }
    }

    /// Progress derived from the stage rows: the application sits on the first
    /// stage that is not completed. `None` until the resume stage is completed.
    pub fn from_stages(stages: &[ApplicationStage]) -> Option<Self> {
        completed_prefix(stages).map(Self::after)
    }

    /// Rejected applications stay put and `current_stage` never moves backward.
    pub fn applies_to(&self, application: &Application) -> bool {
        application.status != ApplicationStatus::Rejected
            && self.current_stage >= application.current_stage
    }
}

/// The last stage of the unbroken run of completed stages at the start of the
/// pipeline. A completed stage after a gap does not count.
pub fn completed_prefix(stages: &[ApplicationStage]) -> Option<StageName> {
    STAGE_ORDER
        .iter()
        .copied()
        .take_while(|name| {
            stages
                .iter()
                .any(|s| s.stage_name == *name && s.status == StageStatus::Completed)
        })
        .last()
}

pub fn qualification_passed(score: i32, threshold: i32) -> bool {
    score >= threshold
}

pub fn qualification_feedback(score: i32, threshold: i32) -> String {
    if qualification_passed(score, threshold) {
        format!(
            "Qualification score {}% meets the {}% threshold. Proceed to the aptitude test.",
            score, threshold
        )
    } else {
        format!(
            "Qualification score {}% is below the {}% threshold required to continue.",
            score, threshold
        )
    }
}

pub fn override_progress(status: ApplicationStatus) -> i32 {
    OVERRIDE_PROGRESS
        .iter()
        .find(|(s, _)| *s == status)
        .map(|(_, pct)| *pct)
        .unwrap_or(INITIAL_PROGRESS)
}
