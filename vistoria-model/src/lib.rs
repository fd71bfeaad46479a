//! Core data model definitions shared across Vistoria crates.
#![allow(missing_docs)]

pub mod error;
pub mod ids;
pub mod image;
pub mod page;
pub mod transfer;
pub mod upload;
pub mod user;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ImageId, UserId};
pub use image::{ImageContent, ImageDocument, ImageDraft, TransformationType};
pub use page::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, ImagePage, PageRequest, PublicImagePage,
};
pub use transfer::{AuthorField, IMAGE_TRANSFER_VERSION, ImageTransfer};
pub use upload::{TaggingMethod, UploadedAsset, normalize_upload};
pub use user::{AuthorSummary, UserProfile, UserRecord};
