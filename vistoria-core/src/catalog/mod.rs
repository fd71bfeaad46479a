//! Image catalog bounded context.
//!
//! Visibility rules and query building are pure and live in their own
//! modules; [`ImageCatalogService`] wires them to the repository ports.

pub mod query;
pub mod service;
pub mod visibility;

pub use query::{
    ImageFilter, ImageOrder, ImageScope, MAX_PAGE_SIZE, Pagination, SearchTerm,
};
pub use service::{
    CreateImageRequest, DeleteImageRequest, DeleteOutcome, ImageCatalogService,
    UpdateImageRequest,
};
pub use visibility::{VisibilityState, is_public_flag};
