use serde::{Deserialize, Serialize};

use crate::transfer::ImageTransfer;

pub const DEFAULT_PAGE_SIZE: u32 = 9;
pub const DEFAULT_PAGE: u32 = 1;

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

/// Page selection for catalog listings. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page_size")]
    pub limit: u32,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(
        default,
        rename = "query",
        alias = "searchQuery",
        skip_serializing_if = "Option::is_none"
    )]
    pub search_query: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            page: DEFAULT_PAGE,
            search_query: None,
        }
    }
}

impl PageRequest {
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePage {
    pub data: Vec<ImageTransfer>,
    pub total_pages: u64,
}

/// A page of the shared feed.
///
/// `total_shared` counts every public image and ignores the search query,
/// so it can back a global "images shared" figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicImagePage {
    pub data: Vec<ImageTransfer>,
    pub total_pages: u64,
    pub total_shared: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_query_parameters_fall_back_to_defaults() {
        let request: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.limit, 9);
        assert_eq!(request.page, 1);
    }

    #[test]
    fn search_query_accepts_both_spellings() {
        let short: PageRequest =
            serde_json::from_str(r#"{"query":"sunset"}"#).unwrap();
        let long: PageRequest =
            serde_json::from_str(r#"{"searchQuery":"sunset"}"#).unwrap();
        assert_eq!(short.search_query.as_deref(), Some("sunset"));
        assert_eq!(short, long);
    }
}
