//! Normalization of the media service's upload callback.
//!
//! The media service reports the stored asset plus optional AI tagging
//! results. Tags are taken from the first source that yields any:
//! Imagga categorization (confident entries only), Google categorization,
//! then the service's own `tags` array.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::ModelError, image::ImageContent};

/// Imagga entries at or below this confidence are discarded.
pub const IMAGGA_MIN_CONFIDENCE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaggingMethod {
    Imagga,
    Google,
    MediaService,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub public_id: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    #[serde(rename = "secureURL")]
    pub secure_url: String,
    pub tags: Vec<String>,
    pub tagging: TaggingMethod,
}

impl UploadedAsset {
    /// Copy the stored-asset fields onto an image's content.
    pub fn apply_to(&self, content: &mut ImageContent) {
        content.public_id = self.public_id.clone();
        content.secure_url = self.secure_url.clone();
        content.width = self.width;
        content.height = self.height;
        content.tags = self.tags.clone();
    }
}

/// Build an [`UploadedAsset`] from the upload callback's `info` object.
pub fn normalize_upload(info: &Value) -> Result<UploadedAsset, ModelError> {
    let public_id = info
        .get("public_id")
        .and_then(Value::as_str)
        .ok_or(ModelError::MissingField("public_id"))?
        .to_string();
    let secure_url = info
        .get("secure_url")
        .and_then(Value::as_str)
        .ok_or(ModelError::MissingField("secure_url"))?
        .to_string();

    let (tags, tagging) = extract_tags(info);

    Ok(UploadedAsset {
        public_id,
        width: dimension(info, "width"),
        height: dimension(info, "height"),
        secure_url,
        tags,
        tagging,
    })
}

fn dimension(info: &Value, key: &str) -> Option<i32> {
    info.get(key)
        .and_then(Value::as_i64)
        .and_then(|value| i32::try_from(value).ok())
}

fn extract_tags(info: &Value) -> (Vec<String>, TaggingMethod) {
    let categorized = info.get("categorization").and_then(|categorization| {
        if let Some(data) = tagging_data(categorization, "imagga_tagging") {
            Some((imagga_tags(data), TaggingMethod::Imagga))
        } else {
            tagging_data(categorization, "google_tagging")
                .map(|data| (google_tags(data), TaggingMethod::Google))
        }
    });

    let mut method = TaggingMethod::None;
    if let Some((tags, categorized_by)) = categorized {
        if !tags.is_empty() {
            return (tags, categorized_by);
        }
        method = categorized_by;
    }

    let plain = string_array(info.get("tags"));
    if !plain.is_empty() {
        return (plain, TaggingMethod::MediaService);
    }

    (Vec::new(), method)
}

fn tagging_data<'a>(categorization: &'a Value, provider: &str) -> Option<&'a Vec<Value>> {
    categorization
        .get(provider)
        .and_then(|tagging| tagging.get("data"))
        .and_then(Value::as_array)
}

fn imagga_tags(data: &[Value]) -> Vec<String> {
    data.iter()
        .filter(|item| {
            item.get("confidence")
                .and_then(Value::as_f64)
                .is_some_and(|confidence| confidence > IMAGGA_MIN_CONFIDENCE)
        })
        .filter_map(|item| {
            let tag = item.get("tag")?;
            tag.get("en")
                .and_then(Value::as_str)
                .or_else(|| tag.as_str())
                .map(str::to_string)
        })
        .collect()
}

fn google_tags(data: &[Value]) -> Vec<String> {
    data.iter()
        .filter_map(|item| item.get("tag").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info(extra: Value) -> Value {
        let mut base = json!({
            "public_id": "vistoria/xyz",
            "secure_url": "https://media.example/xyz.jpg",
            "width": 1200,
            "height": 800,
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        base
    }

    #[test]
    fn imagga_keeps_only_confident_tags() {
        let upload = normalize_upload(&info(json!({
            "tags": ["fallback"],
            "categorization": {
                "imagga_tagging": {
                    "data": [
                        { "tag": { "en": "mountain" }, "confidence": 87.5 },
                        { "tag": "sky", "confidence": 51 },
                        { "tag": { "en": "rock" }, "confidence": 50 },
                        { "tag": { "en": "cloud" } },
                    ]
                }
            }
        })))
        .unwrap();

        assert_eq!(upload.tags, vec!["mountain", "sky"]);
        assert_eq!(upload.tagging, TaggingMethod::Imagga);
        assert_eq!(upload.width, Some(1200));
    }

    #[test]
    fn google_tags_used_when_imagga_absent() {
        let upload = normalize_upload(&info(json!({
            "categorization": {
                "google_tagging": { "data": [ { "tag": "beach" }, { "tag": "sea" } ] }
            }
        })))
        .unwrap();

        assert_eq!(upload.tags, vec!["beach", "sea"]);
        assert_eq!(upload.tagging, TaggingMethod::Google);
    }

    #[test]
    fn plain_tags_fill_in_when_categorization_yields_nothing() {
        let upload = normalize_upload(&info(json!({
            "tags": ["portrait"],
            "categorization": {
                "imagga_tagging": { "data": [ { "tag": "blur", "confidence": 10 } ] }
            }
        })))
        .unwrap();

        assert_eq!(upload.tags, vec!["portrait"]);
        assert_eq!(upload.tagging, TaggingMethod::MediaService);
    }

    #[test]
    fn no_tags_anywhere() {
        let upload = normalize_upload(&info(json!({}))).unwrap();
        assert!(upload.tags.is_empty());
        assert_eq!(upload.tagging, TaggingMethod::None);
    }

    #[test]
    fn missing_public_id_is_an_error() {
        let err = normalize_upload(&json!({ "secure_url": "x" })).unwrap_err();
        assert_eq!(err, ModelError::MissingField("public_id"));
    }
}
