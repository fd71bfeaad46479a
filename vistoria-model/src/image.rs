use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    error::ModelError,
    ids::{ImageId, UserId},
};

/// Transformation vocabulary understood by the external media service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformationType {
    Restore,
    RemoveBackground,
    Fill,
    Remove,
    Recolor,
}

impl TransformationType {
    pub const ALL: [TransformationType; 5] = [
        TransformationType::Restore,
        TransformationType::RemoveBackground,
        TransformationType::Fill,
        TransformationType::Remove,
        TransformationType::Recolor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationType::Restore => "restore",
            TransformationType::RemoveBackground => "removeBackground",
            TransformationType::Fill => "fill",
            TransformationType::Remove => "remove",
            TransformationType::Recolor => "recolor",
        }
    }
}

impl fmt::Display for TransformationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformationType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ModelError::InvalidTransformation(s.to_string()))
    }
}

/// Descriptive attributes of an image: everything except identity,
/// ownership, visibility and store-maintained timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    pub title: String,
    pub transformation_type: TransformationType,
    pub public_id: String,
    #[serde(rename = "secureURL")]
    pub secure_url: String,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    /// Opaque transformation parameters, interpreted only by the media service.
    #[serde(default)]
    pub config: Option<Value>,
    #[serde(rename = "transformationURL", default)]
    pub transformation_url: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Attributes supplied by a caller when creating or updating an image.
///
/// `is_public` keeps whatever the caller sent; only a literal JSON `true`
/// is read as `Some(true)`, any other present value becomes `Some(false)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDraft {
    #[serde(flatten)]
    pub content: ImageContent,
    #[serde(
        default,
        deserialize_with = "literal_true",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_public: Option<bool>,
}

impl ImageDraft {
    pub fn new(content: ImageContent) -> Self {
        Self {
            content,
            is_public: None,
        }
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }
}

fn literal_true<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|value| matches!(value, Value::Bool(true))))
}

/// Store-native image record.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDocument {
    pub id: ImageId,
    pub author: UserId,
    pub content: ImageContent,
    pub is_public: bool,
    pub shared_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
