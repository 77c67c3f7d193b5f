pub mod application;
pub mod application_stage;
pub mod status_override;
