//! Cache invalidation port.
//!
//! Catalog mutations push the set of view paths whose cached renderings are
//! stale. Delivery is the adapter's concern; the catalog only logs failures.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::debug;

use crate::{api_routes::views, error::Result};

/// Paths invalidated by a create, update or delete: the caller's hint, the
/// public feed and the profile view.
pub fn mutation_paths(path_hint: &str) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    if !path_hint.trim().is_empty() {
        paths.insert(path_hint.to_string());
    }
    paths.insert(views::HOME.to_string());
    paths.insert(views::PROFILE.to_string());
    paths
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(&self, paths: &BTreeSet<String>) -> Result<()>;
}

/// Invalidator for deployments with no cached views to refresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInvalidator;

#[async_trait]
impl CacheInvalidator for NoopInvalidator {
    async fn invalidate(&self, paths: &BTreeSet<String>) -> Result<()> {
        debug!(?paths, "no invalidation listeners configured");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_paths_always_cover_feed_and_profile() {
        let paths = mutation_paths("/transformations/add/fill");
        assert_eq!(
            paths.into_iter().collect::<Vec<_>>(),
            vec!["/", "/profile", "/transformations/add/fill"]
        );
    }

    #[test]
    fn blank_hint_is_dropped() {
        assert_eq!(mutation_paths("").len(), 2);
        assert_eq!(mutation_paths("/").len(), 2);
    }
}
