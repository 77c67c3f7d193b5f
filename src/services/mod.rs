pub mod application_service;
pub mod stage_tracker;
