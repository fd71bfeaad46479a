use std::{any::type_name_of_val, fmt, sync::Arc};

use tracing::{info, warn};
use vistoria_model::{UserProfile, UserRecord};

use crate::{
    database::ports::users::UserRepository,
    error::{CatalogError, Result},
};

/// Maps identity-provider subjects onto internal user records.
#[derive(Clone)]
pub struct UserProvisioning {
    users: Arc<dyn UserRepository>,
}

impl fmt::Debug for UserProvisioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserProvisioning")
            .field("users", &type_name_of_val(self.users.as_ref()))
            .finish()
    }
}

impl UserProvisioning {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Resolve the caller, creating the internal record on first sight.
    pub async fn resolve_current_user(
        &self,
        external_id: &str,
        profile: &UserProfile,
    ) -> Result<UserRecord> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(CatalogError::InvalidRequest(
                "identity subject is empty".to_string(),
            ));
        }

        if let Some(user) = self.users.find_by_external_id(external_id).await? {
            return Ok(user);
        }

        let user = self
            .users
            .get_or_create(external_id, profile)
            .await
            .inspect_err(|err| warn!(error = %err, "user provisioning failed"))?;
        info!(user_id = %user.id, username = %user.username, "provisioned user");
        Ok(user)
    }
}
