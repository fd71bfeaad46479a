use axum::{
    extract::{Path, State},
    response::Json,
};
use vistoria_core::ApiResponse;
use vistoria_model::{ImagePage, UserId, UserRecord};

use super::ListImagesQuery;
use crate::infra::{app_state::AppState, errors::AppResult, identity::CurrentUser};

/// The caller's internal record, provisioned on first sight.
pub async fn current_user_handler(
    CurrentUser(user): CurrentUser,
) -> Json<ApiResponse<UserRecord>> {
    Json(ApiResponse::success(user))
}

pub async fn current_user_images_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    query: ListImagesQuery,
) -> AppResult<Json<ApiResponse<ImagePage>>> {
    let request = query.into_page_request(&state.config().catalog);
    let page = state.catalog.list_user_images(user.id, request).await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn user_images_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: ListImagesQuery,
) -> AppResult<Json<ApiResponse<ImagePage>>> {
    let user_id: UserId = id.parse()?;
    let request = query.into_page_request(&state.config().catalog);
    let page = state.catalog.list_user_images(user_id, request).await?;
    Ok(Json(ApiResponse::success(page)))
}
