use async_trait::async_trait;
use vistoria_model::{UserId, UserProfile, UserRecord};

use crate::error::Result;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<UserRecord>>;

    /// Fetch the user for `external_id`, inserting one built from `profile`
    /// when none exists. An existing record is returned unchanged.
    async fn get_or_create(
        &self,
        external_id: &str,
        profile: &UserProfile,
    ) -> Result<UserRecord>;
}
