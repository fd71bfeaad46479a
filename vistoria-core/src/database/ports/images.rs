use async_trait::async_trait;
use vistoria_model::{AuthorSummary, ImageContent, ImageDocument, ImageId, UserId};

use crate::catalog::{ImageFilter, ImageOrder, Pagination, VisibilityState};
use crate::error::Result;

/// Image to persist. The store assigns the id and timestamps.
#[derive(Debug, Clone)]
pub struct NewImageDocument {
    pub author: UserId,
    pub content: ImageContent,
    pub visibility: VisibilityState,
}

/// Replacement content and visibility for an existing image.
/// Authorship is not part of an update.
#[derive(Debug, Clone)]
pub struct ImageUpdateDocument {
    pub content: ImageContent,
    pub visibility: VisibilityState,
}

/// An image with its author denormalized.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedImage {
    pub image: ImageDocument,
    pub author: AuthorSummary,
}

#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn insert(&self, image: NewImageDocument) -> Result<ImageDocument>;

    async fn find_by_id(&self, id: ImageId) -> Result<Option<ImageDocument>>;

    async fn find_with_author(&self, id: ImageId) -> Result<Option<PopulatedImage>>;

    /// Returns `None` when the image no longer exists.
    async fn update(
        &self,
        id: ImageId,
        update: ImageUpdateDocument,
    ) -> Result<Option<ImageDocument>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: ImageId) -> Result<bool>;

    async fn list(
        &self,
        filter: &ImageFilter,
        order: ImageOrder,
        pagination: Pagination,
    ) -> Result<Vec<PopulatedImage>>;

    async fn count(&self, filter: &ImageFilter) -> Result<u64>;
}
