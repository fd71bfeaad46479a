pub mod v1;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
    routing::get,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use vistoria_core::api_routes;

use crate::{AppState, handlers::health::health_handler, infra::config::CorsConfig};

/// Create the main API router with all versions
pub fn create_api_router(state: AppState) -> Router<AppState> {
    Router::new().nest(api_routes::v1::ROOT, v1::create_v1_router(state))
}

/// Full application: health probe, versioned API and the shared layers.
pub fn create_app(state: AppState) -> Router {
    let cors_layer = if state.config().dev_mode {
        CorsLayer::permissive()
    } else {
        cors_from_config(&state.config().cors)
    };

    Router::new()
        .route("/health", get(health_handler))
        .merge(create_api_router(state.clone()))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_from_config(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|method| {
            Method::from_bytes(method.as_bytes())
                .inspect_err(|_| warn!(method, "ignoring invalid CORS method"))
                .ok()
        })
        .collect();

    let headers: Vec<HeaderName> = cors
        .allowed_headers
        .iter()
        .filter_map(|header| {
            HeaderName::from_bytes(header.as_bytes())
                .inspect_err(|_| warn!(header, "ignoring invalid CORS header"))
                .ok()
        })
        .collect();

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::list(methods))
        .allow_headers(AllowHeaders::list(headers));

    // Credentials cannot be combined with a wildcard origin.
    if cors.allow_credentials && !cors.allowed_origins.is_empty() {
        layer = layer.allow_credentials(true);
    }

    layer
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;
    use vistoria_core::testing::InMemoryCatalogStore;

    use super::*;
    use crate::infra::config::Config;

    fn app(config: Config) -> Router {
        let store = Arc::new(InMemoryCatalogStore::new());
        create_app(AppState::new(Arc::new(config), store.clone(), store))
    }

    #[test]
    fn invalid_cors_entries_are_skipped() {
        let cors = CorsConfig {
            allowed_methods: vec!["GET".into(), "NOT A METHOD".into()],
            allowed_headers: vec!["content-type".into(), "bad header".into()],
            ..CorsConfig::default()
        };
        // Must not panic on the invalid entries.
        let _layer = cors_from_config(&cors);
    }

    #[tokio::test]
    async fn preflight_allows_configured_origin() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(api_routes::v1::images::COLLECTION)
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app(Config::default()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn unknown_routes_are_404() {
        let request = Request::builder()
            .uri("/api/v1/nothing-here")
            .body(Body::empty())
            .unwrap();

        let response = app(Config::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
