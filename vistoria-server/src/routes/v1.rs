use axum::{Router, middleware, routing::get};
use vistoria_core::api_routes::{utils::relative, v1};

use crate::{
    AppState,
    handlers::{events, images, users},
    infra::identity::identity_middleware,
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Images
        .route(
            relative(v1::images::COLLECTION),
            get(images::list_public_images_handler).post(images::create_image_handler),
        )
        .route(
            relative(v1::images::ITEM),
            get(images::get_image_handler)
                .put(images::update_image_handler)
                .delete(images::delete_image_handler),
        )
        // Users
        .route(relative(v1::users::CURRENT), get(users::current_user_handler))
        .route(
            relative(v1::users::CURRENT_IMAGES),
            get(users::current_user_images_handler),
        )
        .route(relative(v1::users::IMAGES), get(users::user_images_handler))
        // Cache invalidation feed
        .route(
            relative(v1::events::INVALIDATIONS),
            get(events::invalidation_events_handler),
        )
        // Identity is optional here; protected handlers take `CurrentUser`.
        .layer(middleware::from_fn_with_state(state, identity_middleware))
}
