//! Write-through submission flows: tributes, stories and gallery photos.
//!
//! Each flow validates, stamps the record with the caller's clock and writes
//! it to the store. The caller re-renders the view afterwards; the store is
//! the only source of truth.

use chrono::{DateTime, Utc};
use forever_core::storage::{object_name_from_url, object_path};
use forever_core::{
    DocumentId, Gallery, Photo, PhotoUpload, RecordError, Story, StoryDraft, TransientNotice,
    Tribute, TributeDraft,
};
use thiserror::Error;
use tracing::instrument;

use crate::firebase::{Collection, ContentStore, Document, FirebaseError, ObjectStore};
use crate::models::CurrentUser;

/// Why a submission was not written.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The action is reserved for admins.
    #[error("admin role required")]
    Forbidden,

    /// The form input is incomplete or the file is not an image.
    #[error("invalid submission: {0}")]
    Invalid(#[from] RecordError),

    /// A stored photo URL does not name an object.
    #[error("cannot derive object name from {0}")]
    UnknownObject(String),

    /// The backend rejected a read or write.
    #[error(transparent)]
    Backend(#[from] FirebaseError),
}

/// Result of a story submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryOutcome {
    /// The story was written.
    Published(Story),
    /// Nobody is signed in; nothing was written.
    AuthRequired(TransientNotice),
}

/// Write a new tribute. Only admins may leave tributes.
///
/// # Errors
///
/// Returns [`SubmitError::Forbidden`] for non-admins, [`SubmitError::Invalid`]
/// for blank fields and [`SubmitError::Backend`] if the write fails.
#[instrument(skip_all, fields(admin = is_admin))]
pub async fn submit_tribute<S: ContentStore>(
    store: &S,
    is_admin: bool,
    token: Option<&str>,
    draft: TributeDraft,
    now: DateTime<Utc>,
) -> Result<Tribute, SubmitError> {
    if !is_admin {
        return Err(SubmitError::Forbidden);
    }

    let tribute = draft.into_record(now)?;
    let id = store
        .create(Collection::Tributes, tribute.to_fields(), token)
        .await?;

    tracing::info!(id = %id, "Tribute published");
    Ok(tribute)
}

/// Write a new story for a signed-in visitor.
///
/// A signed-out visitor gets [`StoryOutcome::AuthRequired`] and nothing is
/// written.
///
/// # Errors
///
/// Returns [`SubmitError::Invalid`] for blank fields and
/// [`SubmitError::Backend`] if the write fails.
#[instrument(skip_all, fields(signed_in = user.is_some()))]
pub async fn submit_story<S: ContentStore>(
    store: &S,
    user: Option<&CurrentUser>,
    draft: StoryDraft,
    now: DateTime<Utc>,
) -> Result<StoryOutcome, SubmitError> {
    let Some(user) = user else {
        return Ok(StoryOutcome::AuthRequired(
            TransientNotice::story_auth_required(now),
        ));
    };

    let story = draft.into_record(now)?;
    let id = store
        .create(Collection::Testimonials, story.to_fields(), Some(&user.id_token))
        .await?;

    tracing::info!(id = %id, "Story published");
    Ok(StoryOutcome::Published(story))
}

/// Delete a just-uploaded object after a later step failed.
async fn discard_upload<O: ObjectStore>(objects: &O, path: &str, token: Option<&str>) {
    if let Err(e) = objects.delete(path, token).await {
        tracing::error!(path, error = %e, "Orphaned blob: cleanup after failed photo write failed");
    } else {
        tracing::warn!(path, "Removed uploaded blob after failed photo write");
    }
}

/// Upload an image to `images/{file_name}` and record it in the gallery.
///
/// If the document write fails after the upload succeeded, the blob is
/// deleted again.
///
/// # Errors
///
/// Returns [`SubmitError::Invalid`] when no image is attached and
/// [`SubmitError::Backend`] if any backend step fails.
#[instrument(skip_all, fields(file_name = %upload.file_name))]
pub async fn upload_photo<S, O>(
    store: &S,
    objects: &O,
    token: Option<&str>,
    upload: PhotoUpload,
) -> Result<Photo, SubmitError>
where
    S: ContentStore,
    O: ObjectStore,
{
    upload.validate()?;

    let path = object_path(&upload.file_name);
    let description = upload.description().map(ToString::to_string);
    objects
        .upload(&path, &upload.content_type, upload.bytes, token)
        .await?;

    let image_url = match objects.download_url(&path, token).await {
        Ok(url) => url,
        Err(e) => {
            discard_upload(objects, &path, token).await;
            return Err(e.into());
        }
    };

    let mut photo = Photo {
        id: DocumentId::new(String::new()),
        image_url,
        description,
    };

    match store
        .create(Collection::Images, photo.to_fields(), token)
        .await
    {
        Ok(id) => {
            tracing::info!(id = %id, path, "Photo added");
            photo.id = id;
            Ok(photo)
        }
        Err(e) => {
            discard_upload(objects, &path, token).await;
            Err(e.into())
        }
    }
}

/// Delete the selected photo: blob first, then document.
///
/// Returns `Ok(None)` when nothing is selected. If the document delete fails
/// after the blob is gone, the photo stays in the gallery and the error is
/// returned.
///
/// # Errors
///
/// Returns [`SubmitError::Forbidden`] for non-admins,
/// [`SubmitError::UnknownObject`] for an unusable URL and
/// [`SubmitError::Backend`] if a delete fails.
#[instrument(skip_all, fields(admin = is_admin))]
pub async fn delete_selected_photo<S, O>(
    store: &S,
    objects: &O,
    is_admin: bool,
    token: Option<&str>,
    gallery: &mut Gallery,
) -> Result<Option<Photo>, SubmitError>
where
    S: ContentStore,
    O: ObjectStore,
{
    if !is_admin {
        return Err(SubmitError::Forbidden);
    }
    let Some(photo) = gallery.selected().cloned() else {
        return Ok(None);
    };

    let name = object_name_from_url(&photo.image_url)
        .ok_or_else(|| SubmitError::UnknownObject(photo.image_url.clone()))?;
    objects.delete(&object_path(&name), token).await?;

    if let Err(e) = store
        .delete(Collection::Images, photo.id.as_str(), token)
        .await
    {
        tracing::error!(id = %photo.id, object = %name, error = %e, "Photo blob deleted but document remains");
        return Err(e.into());
    }

    tracing::info!(id = %photo.id, object = %name, "Photo deleted");
    Ok(gallery.remove_selected())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use forever_core::{TributeIcon, UserUid, notice::AUTH_NOTICE_TTL};

    use super::*;
    use crate::firebase::memory::{
        DocumentOp, MemoryContentStore, MemoryObjectStore, ObjectOp,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 18, 12, 0, 0).unwrap()
    }

    fn upload(name: &str, content_type: &str) -> PhotoUpload {
        PhotoUpload {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
            description: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_tribute_requires_admin() {
        let store = MemoryContentStore::new();
        let draft = TributeDraft {
            name: "Jane".to_string(),
            tribute: "Hello".to_string(),
            icon: Some(TributeIcon::Flower),
        };

        let result = submit_tribute(&store, false, None, draft.clone(), now()).await;
        assert!(matches!(result, Err(SubmitError::Forbidden)));
        assert_eq!(store.count(Collection::Tributes), 0);

        let tribute = submit_tribute(&store, true, Some("tok"), draft, now())
            .await
            .unwrap();
        assert!(!tribute.pin);
        assert_eq!(tribute.icon, Some(TributeIcon::Flower));
        assert_eq!(store.count(Collection::Tributes), 1);
    }

    #[tokio::test]
    async fn test_blank_tribute_is_not_written() {
        let store = MemoryContentStore::new();
        let draft = TributeDraft {
            name: "   ".to_string(),
            tribute: "Hello".to_string(),
            icon: None,
        };
        let result = submit_tribute(&store, true, None, draft, now()).await;
        assert!(matches!(
            result,
            Err(SubmitError::Invalid(RecordError::MissingField("name")))
        ));
        assert_eq!(store.count(Collection::Tributes), 0);
    }

    #[tokio::test]
    async fn test_signed_out_story_writes_nothing() {
        let store = MemoryContentStore::new();
        let draft = StoryDraft {
            name: "Jane".to_string(),
            story: "We sang together.".to_string(),
        };

        let outcome = submit_story(&store, None, draft, now()).await.unwrap();
        let StoryOutcome::AuthRequired(notice) = outcome else {
            panic!("expected an auth notice");
        };
        assert_eq!(notice.ttl(), AUTH_NOTICE_TTL);
        assert_eq!(store.count(Collection::Testimonials), 0);
    }

    #[tokio::test]
    async fn test_signed_in_story_is_written() {
        let store = MemoryContentStore::new();
        let user = CurrentUser {
            uid: UserUid::new("uid-1"),
            email: None,
            id_token: "id".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: now(),
        };
        let draft = StoryDraft {
            name: "Jane".to_string(),
            story: "We sang together.".to_string(),
        };

        let outcome = submit_story(&store, Some(&user), draft, now()).await.unwrap();
        assert!(matches!(outcome, StoryOutcome::Published(ref s) if s.name == "Jane"));
        assert_eq!(store.count(Collection::Testimonials), 1);
    }

    #[tokio::test]
    async fn test_non_image_is_not_uploaded() {
        let store = MemoryContentStore::new();
        let objects = MemoryObjectStore::new();

        let result = upload_photo(&store, &objects, None, upload("notes.txt", "text/plain")).await;
        assert!(matches!(
            result,
            Err(SubmitError::Invalid(RecordError::NotAnImage))
        ));
        assert!(objects.paths().is_empty());
    }

    #[tokio::test]
    async fn test_upload_writes_blob_then_document() {
        let store = MemoryContentStore::new();
        let objects = MemoryObjectStore::new();

        let photo = upload_photo(&store, &objects, None, upload("mama.jpg", "image/jpeg"))
            .await
            .unwrap();

        assert!(objects.contains("images/mama.jpg"));
        assert_eq!(photo.image_url, MemoryObjectStore::url_for("images/mama.jpg"));
        assert_eq!(photo.description, None);
        assert!(store.fields(Collection::Images, photo.id.as_str()).is_some());
    }

    #[tokio::test]
    async fn test_failed_document_write_removes_blob() {
        let store = MemoryContentStore::new();
        store.fail(Collection::Images, DocumentOp::Create);
        let objects = MemoryObjectStore::new();

        let result = upload_photo(&store, &objects, None, upload("mama.jpg", "image/jpeg")).await;
        assert!(matches!(result, Err(SubmitError::Backend(_))));
        assert!(!objects.contains("images/mama.jpg"));
    }

    #[tokio::test]
    async fn test_failed_cleanup_leaves_orphan_and_reports_write_error() {
        let store = MemoryContentStore::new();
        store.fail(Collection::Images, DocumentOp::Create);
        let objects = MemoryObjectStore::new();
        objects.fail(ObjectOp::Delete);

        let result = upload_photo(&store, &objects, None, upload("mama.jpg", "image/jpeg")).await;
        assert!(matches!(result, Err(SubmitError::Backend(_))));
        assert!(objects.contains("images/mama.jpg"));
    }

    #[tokio::test]
    async fn test_delete_without_selection_is_noop() {
        let store = MemoryContentStore::new();
        let objects = MemoryObjectStore::new();
        let photo = upload_photo(&store, &objects, None, upload("a.jpg", "image/jpeg"))
            .await
            .unwrap();
        let mut gallery = Gallery::new(vec![photo]);

        let removed = delete_selected_photo(&store, &objects, true, None, &mut gallery)
            .await
            .unwrap();
        assert!(removed.is_none());
        assert_eq!(gallery.photos().len(), 1);
        assert!(objects.contains("images/a.jpg"));
    }

    #[tokio::test]
    async fn test_delete_keeps_photo_when_document_delete_fails() {
        let store = MemoryContentStore::new();
        let objects = MemoryObjectStore::new();
        let photo = upload_photo(&store, &objects, None, upload("a.jpg", "image/jpeg"))
            .await
            .unwrap();
        let id = photo.id.clone();
        let mut gallery = Gallery::new(vec![photo]);
        gallery.select(Some(&id));
        store.fail(Collection::Images, DocumentOp::Delete);

        let result = delete_selected_photo(&store, &objects, true, None, &mut gallery).await;
        assert!(result.is_err());
        assert!(!objects.contains("images/a.jpg"));
        assert_eq!(gallery.photos().len(), 1);
        assert!(gallery.is_selected(&id));
    }
}
