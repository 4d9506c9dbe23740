//! Firebase REST API clients.
//!
//! The site holds no state of its own. Documents live in Firestore, image
//! binaries in Firebase Storage and accounts in the Identity Toolkit. Each
//! backend sits behind a trait so the flows in [`crate::services`] can run
//! against in-memory stores in tests.
//!
//! # Clients
//!
//! - [`FirestoreClient`] - Document list/get/create/set/update/delete
//! - [`StorageClient`] - Object upload, download URL and delete
//! - [`IdentityClient`] - Password and Google sign-in, token refresh
//! - [`GoogleOAuthClient`] - Google authorization code flow
//!
//! The `memory` feature adds in-memory implementations of the three traits.

mod documents;
mod firestore;
mod google;
mod identity;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
mod storage;
pub mod values;

use std::future::Future;

use chrono::{DateTime, Utc};
use forever_core::{DocumentId, UserUid};
use serde::Deserialize;
use thiserror::Error;

pub use documents::{Document, fetch_all};
pub use firestore::FirestoreClient;
pub use google::GoogleOAuthClient;
pub use identity::IdentityClient;
pub use storage::StorageClient;
pub use values::Fields;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when talking to Firebase.
#[derive(Debug, Error)]
pub enum FirebaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl FirebaseError {
    /// Whether the backend answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Error envelope shared by the Google REST APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-2xx response into [`FirebaseError::Api`].
///
/// Uses the `error.message` field when the body carries one (for example
/// `EMAIL_EXISTS`), otherwise the raw body.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FirebaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    Err(FirebaseError::Api {
        status: status.as_u16(),
        message,
    })
}

// =============================================================================
// Collections and Documents
// =============================================================================

/// The Firestore collections the site reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tributes,
    Images,
    /// Stories.
    Testimonials,
    /// Role documents keyed by uid.
    Users,
}

impl Collection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tributes => "tributes",
            Self::Images => "images",
            Self::Testimonials => "testimonials",
            Self::Users => "users",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document as returned by Firestore, before mapping to a record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDocument {
    /// Resource name; the document ID is its last segment.
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
}

impl RawDocument {
    /// Build a document under a short `{collection}/{id}` name.
    #[must_use]
    pub fn new(collection: Collection, id: &DocumentId, fields: Fields) -> Self {
        Self {
            name: format!("{collection}/{id}"),
            fields,
        }
    }

    /// The store-assigned document ID.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        DocumentId::new(self.name.rsplit('/').next().unwrap_or_default())
    }
}

// =============================================================================
// Backend Traits
// =============================================================================

/// Document database operations used by the site.
///
/// `token` is the signed-in user's ID token; requests without one run as an
/// anonymous client and are subject to the project's security rules.
pub trait ContentStore: Send + Sync {
    /// Read every document of a collection in store order.
    fn list(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<RawDocument>, FirebaseError>> + Send;

    /// Read one document; `Ok(None)` when it does not exist.
    fn get(
        &self,
        collection: Collection,
        id: &str,
        token: Option<&str>,
    ) -> impl Future<Output = Result<Option<RawDocument>, FirebaseError>> + Send;

    /// Add a document with a store-assigned ID.
    fn create(
        &self,
        collection: Collection,
        fields: Fields,
        token: Option<&str>,
    ) -> impl Future<Output = Result<DocumentId, FirebaseError>> + Send;

    /// Create or replace the document at `id`.
    fn set(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
        token: Option<&str>,
    ) -> impl Future<Output = Result<(), FirebaseError>> + Send;

    /// Overwrite only the given fields of an existing document.
    fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
        token: Option<&str>,
    ) -> impl Future<Output = Result<(), FirebaseError>> + Send;

    /// Delete the document at `id`.
    fn delete(
        &self,
        collection: Collection,
        id: &str,
        token: Option<&str>,
    ) -> impl Future<Output = Result<(), FirebaseError>> + Send;
}

/// Object storage operations used by the gallery.
pub trait ObjectStore: Send + Sync {
    /// Upload `bytes` to `path`, replacing any existing object.
    fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
        token: Option<&str>,
    ) -> impl Future<Output = Result<(), FirebaseError>> + Send;

    /// Public download URL of the object at `path`.
    fn download_url(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> impl Future<Output = Result<String, FirebaseError>> + Send;

    /// Delete the object at `path`.
    fn delete(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> impl Future<Output = Result<(), FirebaseError>> + Send;
}

/// A signed-in account as issued by the auth provider.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub uid: UserUid,
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Account operations of the auth provider.
pub trait IdentityProvider: Send + Sync {
    /// Create a password account and sign it in.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthSession, FirebaseError>> + Send;

    /// Sign in with email and password.
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthSession, FirebaseError>> + Send;

    /// Sign in (creating the account if needed) with a Google ID token.
    fn sign_in_with_google(
        &self,
        google_id_token: &str,
        request_uri: &str,
    ) -> impl Future<Output = Result<AuthSession, FirebaseError>> + Send;

    /// Exchange a refresh token for a fresh ID token.
    ///
    /// The returned session carries no email; callers keep the one they had.
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<AuthSession, FirebaseError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_last_segment() {
        let doc = RawDocument {
            name: "projects/p/databases/(default)/documents/images/Xy12".to_string(),
            fields: Fields::new(),
        };
        assert_eq!(doc.id().as_str(), "Xy12");

        let short = RawDocument::new(Collection::Tributes, &DocumentId::new("t1"), Fields::new());
        assert_eq!(short.id().as_str(), "t1");
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::Testimonials.to_string(), "testimonials");
        assert_eq!(Collection::Images.as_str(), "images");
    }

    #[test]
    fn test_not_found() {
        let err = FirebaseError::Api {
            status: 404,
            message: "NOT_FOUND".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!FirebaseError::Parse("x".to_string()).is_not_found());
    }
}
