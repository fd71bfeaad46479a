//! Versioned wire records.
//!
//! Store documents never go over the wire directly; they are mapped through
//! [`ImageTransfer::from_document`] so the persistence schema can evolve
//! without breaking callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ids::{ImageId, UserId},
    image::{ImageContent, ImageDocument},
    user::AuthorSummary,
};

pub const IMAGE_TRANSFER_VERSION: u16 = 1;

/// Author reference on a transfer record: either the bare id or the
/// denormalized author summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorField {
    Populated(AuthorSummary),
    Id(UserId),
}

impl AuthorField {
    pub fn id(&self) -> UserId {
        match self {
            AuthorField::Populated(summary) => summary.id,
            AuthorField::Id(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTransfer {
    pub version: u16,
    pub id: ImageId,
    pub author: AuthorField,
    #[serde(flatten)]
    pub content: ImageContent,
    pub is_public: bool,
    pub shared_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImageTransfer {
    pub fn from_document(document: ImageDocument, author: AuthorField) -> Self {
        let ImageDocument {
            id,
            author: _,
            content,
            is_public,
            shared_at,
            created_at,
            updated_at,
        } = document;

        Self {
            version: IMAGE_TRANSFER_VERSION,
            id,
            author,
            content,
            is_public,
            shared_at,
            created_at,
            updated_at,
        }
    }

    /// Map a document with its author left as a plain id.
    pub fn with_author_id(document: ImageDocument) -> Self {
        let author = AuthorField::Id(document.author);
        Self::from_document(document, author)
    }

    /// Map a document with the author denormalized into the record.
    pub fn with_author(document: ImageDocument, author: AuthorSummary) -> Self {
        Self::from_document(document, AuthorField::Populated(author))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::TransformationType;
    use serde_json::Value;

    fn document() -> ImageDocument {
        let now = Utc::now();
        ImageDocument {
            id: ImageId::new(),
            author: UserId::new(),
            content: ImageContent {
                title: "Hills".into(),
                transformation_type: TransformationType::Restore,
                public_id: "vistoria/hills".into(),
                secure_url: "https://media.example/hills.png".into(),
                width: Some(640),
                height: Some(480),
                config: None,
                transformation_url: None,
                aspect_ratio: None,
                prompt: None,
                color: None,
                tags: vec![],
            },
            is_public: false,
            shared_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn bare_author_serializes_as_id_string() {
        let doc = document();
        let author = doc.author;
        let value = serde_json::to_value(ImageTransfer::with_author_id(doc)).unwrap();

        assert_eq!(value["version"], IMAGE_TRANSFER_VERSION);
        assert_eq!(value["author"], Value::String(author.as_str()));
        assert_eq!(value["secureURL"], "https://media.example/hills.png");
        assert_eq!(value["sharedAt"], Value::Null);
    }

    #[test]
    fn populated_author_round_trips_through_untagged_field() {
        let doc = document();
        let summary = AuthorSummary {
            id: doc.author,
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            external_id: "idp_123".into(),
        };
        let transfer = ImageTransfer::with_author(doc, summary.clone());

        let json = serde_json::to_string(&transfer).unwrap();
        let back: ImageTransfer = serde_json::from_str(&json).unwrap();
        assert_eq!(back.author, AuthorField::Populated(summary));
        assert_eq!(back.author.id(), transfer.author.id());
    }
}
