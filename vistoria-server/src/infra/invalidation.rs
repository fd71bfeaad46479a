//! In-process fan-out of cache invalidations.
//!
//! Mutations publish the set of stale view paths; renderers subscribe through
//! the SSE endpoint and refresh what they cache.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use vistoria_core::{Result, cache::CacheInvalidator};

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationEvent {
    pub paths: Vec<String>,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<InvalidationEvent>,
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl InvalidationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InvalidationEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl CacheInvalidator for InvalidationBus {
    async fn invalidate(&self, paths: &BTreeSet<String>) -> Result<()> {
        let event = InvalidationEvent {
            paths: paths.iter().cloned().collect(),
            issued_at: Utc::now(),
        };
        // A send error only means nobody is listening right now.
        match self.sender.send(event) {
            Ok(receivers) => debug!(receivers, ?paths, "invalidation published"),
            Err(_) => debug!(?paths, "invalidation dropped; no subscribers"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistoria_core::cache::mutation_paths;

    #[tokio::test]
    async fn subscribers_receive_sorted_paths() {
        let bus = InvalidationBus::default();
        let mut receiver = bus.subscribe();

        bus.invalidate(&mutation_paths("/transformations/add/fill"))
            .await
            .unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.paths, vec!["/", "/profile", "/transformations/add/fill"]);
    }

    #[tokio::test]
    async fn publishing_without_subscribers_succeeds() {
        let bus = InvalidationBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.invalidate(&mutation_paths("/")).await.is_ok());
    }
}
