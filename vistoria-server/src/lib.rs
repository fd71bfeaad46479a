//! # Vistoria Server
//!
//! HTTP surface of the Vistoria image catalog: publishing, browsing and
//! searching generated images, with per-owner galleries and cache
//! invalidation fan-out for the rendering tier.

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
