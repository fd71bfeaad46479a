pub mod app_state;
pub mod config;
pub mod errors;
pub mod identity;
pub mod invalidation;
pub mod telemetry;
