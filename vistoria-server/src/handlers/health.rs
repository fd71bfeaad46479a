use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{Value, json};
use vistoria_core::catalog::ImageFilter;

use crate::infra::app_state::AppState;

/// Liveness plus a store round-trip.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let mut health = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    let status = match state.images.count(&ImageFilter::public(None)).await {
        Ok(public_images) => {
            health["checks"]["database"] = json!({
                "status": "healthy",
                "public_images": public_images,
            });
            StatusCode::OK
        }
        Err(err) => {
            health["status"] = json!("unhealthy");
            health["checks"]["database"] = json!({
                "status": "unhealthy",
                "error": err.kind(),
            });
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (status, Json(health))
}
