//! Filter, ordering and pagination for catalog listings.
//!
//! These types are store-agnostic. The PostgreSQL adapter renders them into
//! SQL; the in-memory store evaluates them directly with
//! [`ImageFilter::matches`] and [`ImageOrder::compare`].

use std::cmp::Ordering;

use vistoria_model::{ImageDocument, UserId};

use crate::error::{CatalogError, Result};

/// Upper bound on a single page; larger requests are clamped.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Literal, case-insensitive search text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    folded: String,
}

impl SearchTerm {
    /// Returns `None` for an absent or blank query.
    pub fn parse(query: Option<&str>) -> Option<Self> {
        let trimmed = query?.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            raw: trimmed.to_string(),
            folded: trimmed.to_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.folded)
    }

    /// Pattern for `ILIKE $1 ESCAPE '\'` with LIKE metacharacters escaped.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.raw.len() + 2);
        pattern.push('%');
        for ch in self.raw.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }

    fn matches_document(&self, document: &ImageDocument) -> bool {
        let content = &document.content;
        self.matches(&content.title)
            || content.prompt.as_deref().is_some_and(|p| self.matches(p))
            || content.color.as_deref().is_some_and(|c| self.matches(c))
            || content.tags.iter().any(|tag| self.matches(tag))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageScope {
    Public,
    Owner(UserId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFilter {
    pub scope: ImageScope,
    pub search: Option<SearchTerm>,
}

impl ImageFilter {
    pub fn public(search: Option<SearchTerm>) -> Self {
        Self {
            scope: ImageScope::Public,
            search,
        }
    }

    pub fn owner(author: UserId, search: Option<SearchTerm>) -> Self {
        Self {
            scope: ImageScope::Owner(author),
            search,
        }
    }

    /// Same scope with the search dropped.
    pub fn without_search(&self) -> Self {
        Self {
            scope: self.scope,
            search: None,
        }
    }

    pub fn matches(&self, document: &ImageDocument) -> bool {
        let in_scope = match self.scope {
            ImageScope::Public => document.is_public,
            ImageScope::Owner(author) => document.author == author,
        };
        in_scope
            && self
                .search
                .as_ref()
                .is_none_or(|term| term.matches_document(document))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrder {
    /// `shared_at DESC NULLS LAST, updated_at DESC, id DESC`
    SharedThenUpdated,
    /// `updated_at DESC, id DESC`
    UpdatedOnly,
}

impl ImageOrder {
    pub fn for_scope(scope: ImageScope) -> Self {
        match scope {
            ImageScope::Public => ImageOrder::SharedThenUpdated,
            ImageScope::Owner(_) => ImageOrder::UpdatedOnly,
        }
    }

    pub fn compare(&self, a: &ImageDocument, b: &ImageDocument) -> Ordering {
        let updated = || {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        };
        match self {
            ImageOrder::SharedThenUpdated => {
                let shared = match (a.shared_at, b.shared_at) {
                    (Some(a), Some(b)) => b.cmp(&a),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                shared.then_with(updated)
            }
            ImageOrder::UpdatedOnly => updated(),
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            ImageOrder::SharedThenUpdated => {
                "i.shared_at DESC NULLS LAST, i.updated_at DESC, i.id DESC"
            }
            ImageOrder::UpdatedOnly => "i.updated_at DESC, i.id DESC",
        }
    }
}

/// Validated page window. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: u32,
    page: u32,
}

impl Pagination {
    pub fn new(limit: u32, page: u32, max_page_size: u32) -> Result<Self> {
        if limit == 0 {
            return Err(CatalogError::InvalidRequest(
                "limit must be at least 1".to_string(),
            ));
        }
        if page == 0 {
            return Err(CatalogError::InvalidRequest(
                "page numbers start at 1".to_string(),
            ));
        }
        Ok(Self {
            limit: limit.min(max_page_size.max(1)),
            page,
        })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn total_pages(&self, count: u64) -> u64 {
        count.div_ceil(u64::from(self.limit))
    }
}
