pub mod events;
pub mod health;
pub mod images;
pub mod users;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use vistoria_model::PageRequest;

use crate::infra::{config::CatalogConfig, errors::AppError};

/// Listing query string: `?limit=&page=&query=`.
///
/// Extracts directly so malformed values are reported in the JSON error
/// envelope rather than as axum's plain-text rejection.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListImagesQuery {
    pub limit: Option<u32>,
    pub page: Option<u32>,
    #[serde(alias = "searchQuery")]
    pub query: Option<String>,
}

impl ListImagesQuery {
    pub fn into_page_request(self, catalog: &CatalogConfig) -> PageRequest {
        let mut request = PageRequest::default().with_limit(
            self.limit.unwrap_or(catalog.default_page_size),
        );
        if let Some(page) = self.page {
            request.page = page;
        }
        request.search_query = self.query;
        request
    }
}

impl<S> FromRequestParts<S> for ListImagesQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        Query::<ListImagesQuery>::from_request_parts(parts, state)
            .await
            .map(|Query(query)| query)
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))
    }
}
