//! Mapping between memorial records and Firestore documents.
//!
//! Reads are lenient the way the web client was: a missing field reads as
//! empty (or `false`) instead of failing the whole feed.

use forever_core::{Email, Photo, Story, Tribute, TributeIcon, UserProfile, UserUid};

use super::values::{self, Fields, boolean, read_bool, read_string, string};
use super::{Collection, ContentStore, FirebaseError, RawDocument};

/// A record stored as a document in one collection.
pub trait Document: Sized {
    /// Collection the record lives in.
    const COLLECTION: Collection;

    /// Encode for a write.
    fn to_fields(&self) -> Fields;

    /// Decode a fetched document.
    fn from_document(doc: &RawDocument) -> Self;
}

fn text(fields: &Fields, key: &str) -> String {
    read_string(fields, key).unwrap_or_default().to_string()
}

impl Document for Tribute {
    const COLLECTION: Collection = Collection::Tributes;

    fn to_fields(&self) -> Fields {
        values::fields([
            ("name", string(&self.name)),
            ("tribute", string(&self.tribute)),
            ("date", string(&self.date)),
            ("icon", string(self.icon.map_or("", TributeIcon::as_str))),
            ("pin", boolean(self.pin)),
        ])
    }

    fn from_document(doc: &RawDocument) -> Self {
        Self {
            name: text(&doc.fields, "name"),
            tribute: text(&doc.fields, "tribute"),
            date: text(&doc.fields, "date"),
            icon: read_string(&doc.fields, "icon").and_then(TributeIcon::from_stored),
            pin: read_bool(&doc.fields, "pin").unwrap_or(false),
        }
    }
}

impl Document for Story {
    const COLLECTION: Collection = Collection::Testimonials;

    fn to_fields(&self) -> Fields {
        values::fields([
            ("name", string(&self.name)),
            ("story", string(&self.story)),
            ("date", string(&self.date)),
        ])
    }

    fn from_document(doc: &RawDocument) -> Self {
        Self {
            name: text(&doc.fields, "name"),
            story: text(&doc.fields, "story"),
            date: text(&doc.fields, "date"),
        }
    }
}

impl Document for Photo {
    const COLLECTION: Collection = Collection::Images;

    fn to_fields(&self) -> Fields {
        values::fields([
            ("imageUrl", string(&self.image_url)),
            ("description", string(self.description.as_deref().unwrap_or(""))),
        ])
    }

    fn from_document(doc: &RawDocument) -> Self {
        Self {
            id: doc.id(),
            image_url: text(&doc.fields, "imageUrl"),
            description: read_string(&doc.fields, "description")
                .filter(|d| !d.trim().is_empty())
                .map(ToString::to_string),
        }
    }
}

impl Document for UserProfile {
    const COLLECTION: Collection = Collection::Users;

    fn to_fields(&self) -> Fields {
        values::fields([
            (
                "email",
                string(self.email.as_ref().map_or("", Email::as_str)),
            ),
            ("admin", boolean(self.admin)),
        ])
    }

    fn from_document(doc: &RawDocument) -> Self {
        Self {
            uid: UserUid::new(doc.id().into_inner()),
            email: read_string(&doc.fields, "email").and_then(|e| Email::parse(e).ok()),
            admin: read_bool(&doc.fields, "admin").unwrap_or(false),
        }
    }
}

/// Fetch and decode a whole collection in store order.
///
/// # Errors
///
/// Returns the store's error if the listing fails.
pub async fn fetch_all<D, S>(store: &S) -> Result<Vec<D>, FirebaseError>
where
    D: Document,
    S: ContentStore,
{
    let docs = store.list(D::COLLECTION).await?;
    Ok(docs.iter().map(D::from_document).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use forever_core::DocumentId;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_tribute_without_icon_writes_empty_string() {
        let tribute = Tribute {
            name: "Jane".to_string(),
            tribute: "Hello".to_string(),
            date: "2024-06-18T12:00:00.000Z".to_string(),
            icon: None,
            pin: false,
        };
        let fields = tribute.to_fields();
        assert_eq!(fields["icon"], json!({"stringValue": ""}));
        assert_eq!(fields["pin"], json!({"booleanValue": false}));

        let back = Tribute::from_document(&RawDocument::new(
            Collection::Tributes,
            &DocumentId::new("t1"),
            fields,
        ));
        assert_eq!(back, tribute);
    }

    #[test]
    fn test_missing_fields_read_as_defaults() {
        let doc = RawDocument::new(
            Collection::Tributes,
            &DocumentId::new("t2"),
            values::fields([("name", string("Aunt Rose"))]),
        );
        let tribute = Tribute::from_document(&doc);
        assert_eq!(tribute.name, "Aunt Rose");
        assert_eq!(tribute.tribute, "");
        assert!(!tribute.pin);
        assert_eq!(tribute.icon, None);
    }

    #[test]
    fn test_photo_carries_document_id() {
        let doc = RawDocument::new(
            Collection::Images,
            &DocumentId::new("img9"),
            values::fields([
                ("imageUrl", string("https://cdn.example/images/a.jpg")),
                ("description", string("")),
            ]),
        );
        let photo = Photo::from_document(&doc);
        assert_eq!(photo.id.as_str(), "img9");
        assert_eq!(photo.description, None);
    }

    #[test]
    fn test_user_profile_admin_flag() {
        let doc = RawDocument::new(
            Collection::Users,
            &DocumentId::new("uid-1"),
            values::fields([("email", string("jane@example.com")), ("admin", boolean(true))]),
        );
        let profile = UserProfile::from_document(&doc);
        assert_eq!(profile.uid.as_str(), "uid-1");
        assert!(profile.admin);

        let missing_flag = RawDocument::new(
            Collection::Users,
            &DocumentId::new("uid-2"),
            values::fields([("email", string("x@example.com"))]),
        );
        assert!(!UserProfile::from_document(&missing_flag).admin);
    }
}
