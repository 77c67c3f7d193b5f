pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::database::PipelineStore;
use crate::services::{application_service::ApplicationService, stage_tracker::StageTracker};

#[derive(Clone)]
pub struct AppState {
    pub stage_tracker: StageTracker,
    pub application_service: ApplicationService,
}

impl AppState {
    pub fn new(store: Arc<dyn PipelineStore>, qualification_threshold: i32) -> Self {
        let stage_tracker = StageTracker::new(store.clone(), qualification_threshold);
        let application_service = ApplicationService::new(store);

        Self {
            stage_tracker,
            application_service,
        }
    }
}
