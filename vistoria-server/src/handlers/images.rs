use axum::{
    extract::{Path, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use vistoria_core::{
    ApiResponse, CatalogError,
    api_routes::views,
    catalog::{CreateImageRequest, DeleteImageRequest, UpdateImageRequest},
};
use vistoria_model::{ImageDraft, ImageId, ImageTransfer, PublicImagePage, normalize_upload};

use super::ListImagesQuery;
use crate::infra::{
    app_state::AppState,
    errors::AppResult,
    identity::{Caller, CurrentUser},
};

/// Carries the delete outcome alongside the redirect.
pub const OUTCOME_HEADER: &str = "x-vistoria-outcome";

#[derive(Debug, Deserialize)]
pub struct ImageMutationBody {
    pub image: ImageDraft,
    /// View the mutation came from; its cached rendering is invalidated.
    #[serde(default = "default_path")]
    pub path: String,
    /// Raw upload callback from the media service; its stored-asset fields
    /// and tags replace the ones in `image`.
    #[serde(default)]
    pub upload: Option<Value>,
}

impl ImageMutationBody {
    fn into_parts(self) -> AppResult<(ImageDraft, String)> {
        let Self {
            mut image,
            path,
            upload,
        } = self;
        if let Some(info) = upload {
            let asset = normalize_upload(&info)?;
            debug!(
                public_id = %asset.public_id,
                tagging = ?asset.tagging,
                tags = asset.tags.len(),
                "applying upload result"
            );
            asset.apply_to(&mut image.content);
        }
        Ok((image, path))
    }
}

fn default_path() -> String {
    views::HOME.to_string()
}

pub async fn list_public_images_handler(
    State(state): State<AppState>,
    query: ListImagesQuery,
) -> AppResult<Json<ApiResponse<PublicImagePage>>> {
    let request = query.into_page_request(&state.config().catalog);
    let page = state.catalog.list_public_images(request).await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn create_image_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<ImageMutationBody>,
) -> AppResult<(StatusCode, Json<ApiResponse<ImageTransfer>>)> {
    let (image, path) = body.into_parts()?;
    let image = state
        .catalog
        .create_image(CreateImageRequest {
            image,
            user_id: user.id,
            path,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(image))))
}

pub async fn get_image_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ImageTransfer>>> {
    let image_id: ImageId = id.parse()?;
    let image = state.catalog.get_image_by_id(image_id).await?;
    Ok(Json(ApiResponse::success(image)))
}

pub async fn update_image_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<ImageMutationBody>,
) -> AppResult<Json<ApiResponse<ImageTransfer>>> {
    let image_id: ImageId = id.parse()?;
    let (image, path) = body.into_parts()?;
    let image = state
        .catalog
        .update_image(UpdateImageRequest {
            image_id,
            image,
            user_id: user.id,
            path,
        })
        .await?;
    Ok(Json(ApiResponse::success(image)))
}

/// Always answers `303 See Other` to the home view; the outcome travels in
/// [`OUTCOME_HEADER`].
pub async fn delete_image_handler(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Response {
    let outcome = match (caller, id.parse::<ImageId>()) {
        (Caller::User(user), Ok(image_id)) => {
            let deleted = state
                .catalog
                .delete_image(DeleteImageRequest {
                    image_id,
                    user_id: user.id,
                })
                .await;
            return redirect_with_outcome(deleted.redirect_to, &deleted.outcome);
        }
        (Caller::Anonymous, _) => Err(CatalogError::Unauthorized(
            "authentication required".to_string(),
        )),
        (Caller::Unresolved(err), _) => Err(err),
        (_, Err(err)) => Err(CatalogError::from(err)),
    };
    debug!(id, "delete rejected before reaching the catalog");
    redirect_with_outcome(views::HOME, &outcome)
}

fn redirect_with_outcome(
    to: &str,
    outcome: &Result<(), CatalogError>,
) -> Response {
    let kind = match outcome {
        Ok(()) => "ok",
        Err(err) => err.kind(),
    };
    let mut response = Redirect::to(to).into_response();
    response.headers_mut().insert(
        HeaderName::from_static(OUTCOME_HEADER),
        HeaderValue::from_static(kind),
    );
    response
}
