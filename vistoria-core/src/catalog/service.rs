use std::{any::type_name_of_val, fmt, sync::Arc};

use chrono::Utc;
use tracing::{debug, error, info, warn};
use vistoria_model::{
    ImageDocument, ImageDraft, ImageId, ImagePage, ImageTransfer, PageRequest, PublicImagePage,
    UserId,
};

use crate::{
    api_routes::views,
    cache::{CacheInvalidator, mutation_paths},
    catalog::{
        query::{ImageFilter, ImageOrder, MAX_PAGE_SIZE, Pagination, SearchTerm},
        visibility::VisibilityState,
    },
    database::ports::{
        images::{ImageRepository, ImageUpdateDocument, NewImageDocument},
        users::UserRepository,
    },
    error::{CatalogError, Result},
};

#[derive(Debug, Clone)]
pub struct CreateImageRequest {
    pub image: ImageDraft,
    pub user_id: UserId,
    /// View that rendered the form; invalidated with the feed and profile.
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct UpdateImageRequest {
    pub image_id: ImageId,
    pub image: ImageDraft,
    pub user_id: UserId,
    pub path: String,
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteImageRequest {
    pub image_id: ImageId,
    pub user_id: UserId,
}

/// Result of a delete. The caller is sent to `redirect_to` whatever the
/// outcome.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub redirect_to: &'static str,
    pub outcome: Result<()>,
}

/// Image catalog operations over injected repository and cache ports.
#[derive(Clone)]
pub struct ImageCatalogService {
    images: Arc<dyn ImageRepository>,
    users: Arc<dyn UserRepository>,
    invalidator: Arc<dyn CacheInvalidator>,
    max_page_size: u32,
}

impl fmt::Debug for ImageCatalogService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageCatalogService")
            .field("images", &type_name_of_val(self.images.as_ref()))
            .field("users", &type_name_of_val(self.users.as_ref()))
            .field("invalidator", &type_name_of_val(self.invalidator.as_ref()))
            .field("max_page_size", &self.max_page_size)
            .finish()
    }
}

impl ImageCatalogService {
    pub fn new(
        images: Arc<dyn ImageRepository>,
        users: Arc<dyn UserRepository>,
        invalidator: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self {
            images,
            users,
            invalidator,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    pub async fn create_image(&self, request: CreateImageRequest) -> Result<ImageTransfer> {
        let user_id = request.user_id;
        self.create_image_inner(request)
            .await
            .inspect_err(|err| log_failure("create_image", err))
            .inspect(|image| info!(image_id = %image.id, %user_id, "image created"))
    }

    async fn create_image_inner(&self, request: CreateImageRequest) -> Result<ImageTransfer> {
        let CreateImageRequest {
            image,
            user_id,
            path,
        } = request;

        let author = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("user {user_id}")))?;

        let visibility = VisibilityState::on_create(image.is_public, Utc::now());
        debug_assert!(visibility.is_consistent());
        let document = self
            .images
            .insert(NewImageDocument {
                author: author.id,
                content: image.content,
                visibility,
            })
            .await?;

        self.invalidate(&path).await;
        Ok(ImageTransfer::with_author_id(document))
    }

    pub async fn update_image(&self, request: UpdateImageRequest) -> Result<ImageTransfer> {
        let image_id = request.image_id;
        self.update_image_inner(request)
            .await
            .inspect_err(|err| log_failure("update_image", err))
            .inspect(|image| info!(%image_id, is_public = image.is_public, "image updated"))
    }

    async fn update_image_inner(&self, request: UpdateImageRequest) -> Result<ImageTransfer> {
        let UpdateImageRequest {
            image_id,
            image,
            user_id,
            path,
        } = request;

        let existing = self.owned_image(image_id, user_id).await?;
        let visibility =
            VisibilityState::on_update(existing.shared_at, image.is_public, Utc::now());
        debug_assert!(visibility.is_consistent());

        let document = self
            .images
            .update(
                image_id,
                ImageUpdateDocument {
                    content: image.content,
                    visibility,
                },
            )
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("image {image_id}")))?;

        self.invalidate(&path).await;
        Ok(ImageTransfer::with_author_id(document))
    }

    /// Delete an image owned by the caller.
    ///
    /// Ownership is checked the same way as for updates.
    pub async fn delete_image(&self, request: DeleteImageRequest) -> DeleteOutcome {
        let DeleteImageRequest { image_id, user_id } = request;
        let outcome = self
            .delete_image_inner(image_id, user_id)
            .await
            .inspect_err(|err| log_failure("delete_image", err))
            .inspect(|_| info!(%image_id, "image deleted"));

        DeleteOutcome {
            redirect_to: views::HOME,
            outcome,
        }
    }

    async fn delete_image_inner(&self, image_id: ImageId, user_id: UserId) -> Result<()> {
        self.owned_image(image_id, user_id).await?;
        if !self.images.delete(image_id).await? {
            return Err(CatalogError::NotFound(format!("image {image_id}")));
        }
        self.invalidate(views::HOME).await;
        Ok(())
    }

    pub async fn get_image_by_id(&self, image_id: ImageId) -> Result<ImageTransfer> {
        self.images
            .find_with_author(image_id)
            .await
            .and_then(|found| {
                found.ok_or_else(|| CatalogError::NotFound(format!("image {image_id}")))
            })
            .map(|populated| ImageTransfer::with_author(populated.image, populated.author))
            .inspect_err(|err| log_failure("get_image_by_id", err))
    }

    /// Public feed, newest shares first.
    ///
    /// `total_shared` counts all public images regardless of the search.
    pub async fn list_public_images(&self, request: PageRequest) -> Result<PublicImagePage> {
        self.list_public_images_inner(request)
            .await
            .inspect_err(|err| log_failure("list_public_images", err))
    }

    async fn list_public_images_inner(&self, request: PageRequest) -> Result<PublicImagePage> {
        let pagination = self.pagination(&request)?;
        let filter = ImageFilter::public(SearchTerm::parse(request.search_query.as_deref()));
        let (data, total_pages) = self.page(&filter, pagination).await?;
        let total_shared = self.images.count(&filter.without_search()).await?;

        Ok(PublicImagePage {
            data,
            total_pages,
            total_shared,
        })
    }

    /// Images authored by `user_id`, private ones included, most recently
    /// updated first.
    pub async fn list_user_images(
        &self,
        user_id: UserId,
        request: PageRequest,
    ) -> Result<ImagePage> {
        self.list_user_images_inner(user_id, request)
            .await
            .inspect_err(|err| log_failure("list_user_images", err))
    }

    async fn list_user_images_inner(
        &self,
        user_id: UserId,
        request: PageRequest,
    ) -> Result<ImagePage> {
        let pagination = self.pagination(&request)?;
        let filter =
            ImageFilter::owner(user_id, SearchTerm::parse(request.search_query.as_deref()));
        let (data, total_pages) = self.page(&filter, pagination).await?;
        Ok(ImagePage { data, total_pages })
    }

    fn pagination(&self, request: &PageRequest) -> Result<Pagination> {
        Pagination::new(request.limit, request.page, self.max_page_size)
    }

    async fn page(
        &self,
        filter: &ImageFilter,
        pagination: Pagination,
    ) -> Result<(Vec<ImageTransfer>, u64)> {
        let rows = self
            .images
            .list(filter, ImageOrder::for_scope(filter.scope), pagination)
            .await?;
        let total = self.images.count(filter).await?;

        let data = rows
            .into_iter()
            .map(|row| ImageTransfer::with_author(row.image, row.author))
            .collect();
        Ok((data, pagination.total_pages(total)))
    }

    async fn owned_image(
        &self,
        image_id: ImageId,
        user_id: UserId,
    ) -> Result<ImageDocument> {
        let existing = self
            .images
            .find_by_id(image_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("image {image_id}")))?;

        if existing.author != user_id {
            return Err(CatalogError::Unauthorized(format!(
                "user {user_id} does not own image {image_id}"
            )));
        }
        Ok(existing)
    }

    async fn invalidate(&self, path_hint: &str) {
        let paths = mutation_paths(path_hint);
        match self.invalidator.invalidate(&paths).await {
            Ok(()) => debug!(?paths, "cached views invalidated"),
            Err(err) => warn!(error = %err, ?paths, "cache invalidation failed"),
        }
    }
}

fn log_failure(operation: &'static str, err: &CatalogError) {
    match err {
        CatalogError::StoreUnavailable(_) => {
            error!(operation, kind = err.kind(), error = %err, "catalog operation failed")
        }
        _ => warn!(operation, kind = err.kind(), error = %err, "catalog operation rejected"),
    }
}
