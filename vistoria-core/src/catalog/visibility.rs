//! Public/private visibility of an image.
//!
//! `shared_at` is set exactly when the image is public. Going private clears
//! it; going public keeps an earlier stamp if the record still carries one
//! and otherwise stamps `now`.

use chrono::{DateTime, Utc};

/// Only an explicit `true` makes an image public.
pub fn is_public_flag(requested: Option<bool>) -> bool {
    requested == Some(true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityState {
    pub is_public: bool,
    pub shared_at: Option<DateTime<Utc>>,
}

impl VisibilityState {
    pub const PRIVATE: VisibilityState = VisibilityState {
        is_public: false,
        shared_at: None,
    };

    pub fn on_create(requested: Option<bool>, now: DateTime<Utc>) -> Self {
        if is_public_flag(requested) {
            Self {
                is_public: true,
                shared_at: Some(now),
            }
        } else {
            Self::PRIVATE
        }
    }

    pub fn on_update(
        previous_shared_at: Option<DateTime<Utc>>,
        requested: Option<bool>,
        now: DateTime<Utc>,
    ) -> Self {
        if is_public_flag(requested) {
            Self {
                is_public: true,
                shared_at: Some(previous_shared_at.unwrap_or(now)),
            }
        } else {
            Self::PRIVATE
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.is_public == self.shared_at.is_some()
    }
}
