use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

pub const DEFAULT_PLAN_ID: i32 = 1;
pub const DEFAULT_CREDIT_BALANCE: i32 = 10;

const FALLBACK_USERNAME: &str = "user";

/// Profile fields forwarded by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl UserProfile {
    /// Username to provision with: the explicit one, else the e-mail local
    /// part, else a generic placeholder.
    pub fn effective_username(&self) -> String {
        if let Some(username) = self
            .username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            return username.to_string();
        }

        self.email
            .split('@')
            .next()
            .map(str::trim)
            .filter(|local| !local.is_empty())
            .unwrap_or(FALLBACK_USERNAME)
            .to_string()
    }
}

/// Internal user record owned by the user provisioning flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub external_id: String,
    pub email: String,
    pub username: String,
    pub photo: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub plan_id: i32,
    pub credit_balance: i32,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn author_summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            external_id: self.external_id.clone(),
        }
    }
}

/// Author fields copied into image query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub external_id: String,
}
