//! Memorial records and the drafts visitors submit.
//!
//! Records mirror the documents held by the remote content store. They are
//! ephemeral copies: nothing here is authoritative and nothing reconciles
//! them with the store after a write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::iso_timestamp;
use crate::types::{DocumentId, Email, TributeIcon, UserUid};

/// Errors raised while validating a draft before it is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// A required form field is empty.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// No file was attached to a photo upload.
    #[error("no file selected")]
    MissingFile,
    /// The attached file is not an image.
    #[error("Please select an image file.")]
    NotAnImage,
}

/// A memorial message, optionally pinned ahead of the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tribute {
    pub name: String,
    pub tribute: String,
    /// ISO-8601 creation time, written by the submitting client.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<TributeIcon>,
    #[serde(default)]
    pub pin: bool,
}

/// A testimonial shared by a signed-in visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub name: String,
    pub story: String,
    pub date: String,
}

/// A gallery image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: DocumentId,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The role document kept for every account under `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: UserUid,
    pub email: Option<Email>,
    #[serde(default)]
    pub admin: bool,
}

impl UserProfile {
    /// The profile written when an account is first created: never an admin.
    #[must_use]
    pub const fn new_member(uid: UserUid, email: Option<Email>) -> Self {
        Self {
            uid,
            email,
            admin: false,
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, RecordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordError::MissingField(field));
    }
    Ok(trimmed.to_owned())
}

/// Tribute form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TributeDraft {
    pub name: String,
    pub tribute: String,
    #[serde(default)]
    pub icon: Option<TributeIcon>,
}

impl TributeDraft {
    /// Validate the draft and stamp it with `now`.
    ///
    /// New tributes are never pinned.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MissingField`] if the name or text is blank.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<Tribute, RecordError> {
        Ok(Tribute {
            name: required(&self.name, "name")?,
            tribute: required(&self.tribute, "tribute")?,
            date: iso_timestamp(now),
            icon: self.icon,
            pin: false,
        })
    }
}

/// Story form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryDraft {
    pub name: String,
    pub story: String,
}

impl StoryDraft {
    /// Validate the draft and stamp it with `now`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MissingField`] if the name or story is blank.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<Story, RecordError> {
        Ok(Story {
            name: required(&self.name, "name")?,
            story: required(&self.story, "story")?,
            date: iso_timestamp(now),
        })
    }
}

/// An image file a visitor wants to add to the gallery.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub description: Option<String>,
}

impl PhotoUpload {
    /// Check that a file was attached and that it is an image.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MissingFile`] for an empty upload and
    /// [`RecordError::NotAnImage`] when the content type is not `image/*`.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.file_name.trim().is_empty() || self.bytes.is_empty() {
            return Err(RecordError::MissingFile);
        }
        if !self.content_type.starts_with("image/") {
            return Err(RecordError::NotAnImage);
        }
        Ok(())
    }

    /// The description to store, with blank input collapsed to `None`.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_tribute_draft_is_never_pinned() {
        let draft = TributeDraft {
            name: "Jane".to_string(),
            tribute: "Hello".to_string(),
            icon: Some(TributeIcon::Flower),
        };
        let tribute = draft.into_record(noon()).unwrap();
        assert!(!tribute.pin);
        assert_eq!(tribute.icon, Some(TributeIcon::Flower));
        assert_eq!(tribute.date, "2024-06-18T12:00:00.000Z");
    }

    #[test]
    fn test_tribute_draft_requires_text() {
        let draft = TributeDraft {
            name: "Jane".to_string(),
            tribute: "   ".to_string(),
            icon: None,
        };
        assert_eq!(
            draft.into_record(noon()),
            Err(RecordError::MissingField("tribute"))
        );
    }

    #[test]
    fn test_story_draft_requires_name() {
        let draft = StoryDraft {
            name: String::new(),
            story: "We met in Garoua.".to_string(),
        };
        assert_eq!(draft.into_record(noon()), Err(RecordError::MissingField("name")));
    }

    #[test]
    fn test_photo_upload_rejects_non_images() {
        let upload = PhotoUpload {
            file_name: "notes.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![1, 2, 3],
            description: None,
        };
        assert_eq!(upload.validate(), Err(RecordError::NotAnImage));
    }

    #[test]
    fn test_photo_upload_requires_file() {
        let upload = PhotoUpload {
            file_name: String::new(),
            content_type: "image/png".to_string(),
            bytes: Vec::new(),
            description: Some("  ".to_string()),
        };
        assert_eq!(upload.validate(), Err(RecordError::MissingFile));
        assert_eq!(upload.description(), None);
    }

    #[test]
    fn test_photo_serializes_with_store_field_names() {
        let photo = Photo {
            id: DocumentId::new("p1"),
            image_url: "https://cdn/x.jpg".to_string(),
            description: None,
        };
        let json = serde_json::to_value(&photo).unwrap();
        assert_eq!(json["imageUrl"], "https://cdn/x.jpg");
        assert!(json.get("description").is_none());
    }
}
