//! In-memory ports for unit and integration tests.

use std::{
    collections::{BTreeSet, HashMap},
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use vistoria_model::{
    ImageDocument, ImageId, UserId, UserProfile, UserRecord,
    user::{DEFAULT_CREDIT_BALANCE, DEFAULT_PLAN_ID},
};

use crate::{
    cache::CacheInvalidator,
    catalog::{ImageFilter, ImageOrder, Pagination},
    database::ports::{
        images::{ImageRepository, ImageUpdateDocument, NewImageDocument, PopulatedImage},
        users::UserRepository,
    },
    error::{CatalogError, Result},
};

/// Image and user store backed by hash maps. Implements both repository
/// ports so one instance can back a whole catalog service.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    images: Mutex<HashMap<ImageId, ImageDocument>>,
    users: Mutex<HashMap<UserId, UserRecord>>,
    unavailable: AtomicBool,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every port call fail with `StoreUnavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::StoreUnavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn insert_user(
        &self,
        external_id: &str,
        first_name: &str,
        last_name: &str,
    ) -> UserRecord {
        let user = UserRecord {
            id: UserId::new(),
            external_id: external_id.to_string(),
            email: format!("{external_id}@example.test"),
            username: external_id.to_string(),
            photo: String::new(),
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            plan_id: DEFAULT_PLAN_ID,
            credit_balance: DEFAULT_CREDIT_BALANCE,
            created_at: Utc::now(),
        };
        self.users.lock().await.insert(user.id, user.clone());
        user
    }

    pub async fn image(&self, id: ImageId) -> Option<ImageDocument> {
        self.images.lock().await.get(&id).cloned()
    }

    pub async fn image_count(&self) -> usize {
        self.images.lock().await.len()
    }

    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }

    /// Mutate a stored image directly, e.g. to pin timestamps.
    pub async fn edit_image(&self, id: ImageId, edit: impl FnOnce(&mut ImageDocument)) {
        if let Some(image) = self.images.lock().await.get_mut(&id) {
            edit(image);
        }
    }

    async fn populate(&self, image: ImageDocument) -> Option<PopulatedImage> {
        let users = self.users.lock().await;
        let author = users.get(&image.author)?.author_summary();
        Some(PopulatedImage { image, author })
    }
}

#[async_trait]
impl ImageRepository for InMemoryCatalogStore {
    async fn insert(&self, image: NewImageDocument) -> Result<ImageDocument> {
        self.check_available()?;
        let now = Utc::now();
        let document = ImageDocument {
            id: ImageId::new(),
            author: image.author,
            content: image.content,
            is_public: image.visibility.is_public,
            shared_at: image.visibility.shared_at,
            created_at: now,
            updated_at: now,
        };
        self.images.lock().await.insert(document.id, document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, id: ImageId) -> Result<Option<ImageDocument>> {
        self.check_available()?;
        Ok(self.image(id).await)
    }

    async fn find_with_author(&self, id: ImageId) -> Result<Option<PopulatedImage>> {
        self.check_available()?;
        match self.image(id).await {
            Some(image) => Ok(self.populate(image).await),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        id: ImageId,
        update: ImageUpdateDocument,
    ) -> Result<Option<ImageDocument>> {
        self.check_available()?;
        let mut images = self.images.lock().await;
        let Some(image) = images.get_mut(&id) else {
            return Ok(None);
        };
        image.content = update.content;
        image.is_public = update.visibility.is_public;
        image.shared_at = update.visibility.shared_at;
        image.updated_at = Utc::now();
        Ok(Some(image.clone()))
    }

    async fn delete(&self, id: ImageId) -> Result<bool> {
        self.check_available()?;
        Ok(self.images.lock().await.remove(&id).is_some())
    }

    async fn list(
        &self,
        filter: &ImageFilter,
        order: ImageOrder,
        pagination: Pagination,
    ) -> Result<Vec<PopulatedImage>> {
        self.check_available()?;
        let mut matching: Vec<ImageDocument> = self
            .images
            .lock()
            .await
            .values()
            .filter(|image| filter.matches(image))
            .cloned()
            .collect();
        matching.sort_by(|a, b| order.compare(a, b));

        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let mut page = Vec::new();
        for image in matching
            .into_iter()
            .skip(offset)
            .take(pagination.limit() as usize)
        {
            if let Some(populated) = self.populate(image).await {
                page.push(populated);
            }
        }
        Ok(page)
    }

    async fn count(&self, filter: &ImageFilter) -> Result<u64> {
        self.check_available()?;
        let images = self.images.lock().await;
        Ok(images.values().filter(|image| filter.matches(image)).count() as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryCatalogStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>> {
        self.check_available()?;
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<UserRecord>> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.external_id == external_id)
            .cloned())
    }

    async fn get_or_create(
        &self,
        external_id: &str,
        profile: &UserProfile,
    ) -> Result<UserRecord> {
        self.check_available()?;
        let mut users = self.users.lock().await;
        if let Some(existing) = users.values().find(|user| user.external_id == external_id) {
            return Ok(existing.clone());
        }

        let user = UserRecord {
            id: UserId::new(),
            external_id: external_id.to_string(),
            email: profile.email.clone(),
            username: profile.effective_username(),
            photo: profile.photo.clone().unwrap_or_default(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            plan_id: DEFAULT_PLAN_ID,
            credit_balance: DEFAULT_CREDIT_BALANCE,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

/// Invalidator that remembers every path set it receives.
#[derive(Debug, Default)]
pub struct RecordingInvalidator {
    calls: Mutex<Vec<BTreeSet<String>>>,
}

impl RecordingInvalidator {
    pub async fn calls(&self) -> Vec<BTreeSet<String>> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl CacheInvalidator for RecordingInvalidator {
    async fn invalidate(&self, paths: &BTreeSet<String>) -> Result<()> {
        self.calls.lock().await.push(paths.clone());
        Ok(())
    }
}
