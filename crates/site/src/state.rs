//! Application state shared across handlers.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SiteConfig;
use crate::content::{ContentError, SiteContent};
use crate::firebase::{FirestoreClient, GoogleOAuthClient, IdentityClient, StorageClient};
use crate::services::RoleGate;
use crate::services::feeds::SlideshowPhotos;

/// Timeout for every backend request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("content: {0}")]
    Content(#[from] ContentError),
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// Firebase clients, the role gate and the loaded content.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    firestore: FirestoreClient,
    storage: StorageClient,
    identity: IdentityClient,
    google: Option<GoogleOAuthClient>,
    roles: RoleGate,
    slideshow: SlideshowPhotos,
    content: SiteContent,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `content_dir` - Directory holding the markdown content
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be loaded or the HTTP client
    /// cannot be built.
    pub fn new(config: SiteConfig, content_dir: &Path) -> Result<Self, StateError> {
        let content = SiteContent::load(content_dir)?;
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        let firestore = FirestoreClient::new(client.clone(), &config.firebase);
        let storage = StorageClient::new(client.clone(), &config.firebase);
        let identity = IdentityClient::new(client.clone(), &config.firebase);
        let google = config
            .google
            .clone()
            .map(|google| GoogleOAuthClient::new(client, google, &config.base_url));

        if google.is_none() {
            tracing::info!("Google sign-in disabled (no OAuth credentials)");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                firestore,
                storage,
                identity,
                google,
                roles: RoleGate::default(),
                slideshow: SlideshowPhotos::default(),
                content,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Firestore client for tributes, stories, photos and roles.
    #[must_use]
    pub fn firestore(&self) -> &FirestoreClient {
        &self.inner.firestore
    }

    /// Storage client for gallery images.
    #[must_use]
    pub fn storage(&self) -> &StorageClient {
        &self.inner.storage
    }

    /// Identity Toolkit client.
    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    /// Google OAuth client, when configured.
    #[must_use]
    pub fn google(&self) -> Option<&GoogleOAuthClient> {
        self.inner.google.as_ref()
    }

    /// The shared admin-role gate.
    #[must_use]
    pub fn roles(&self) -> &RoleGate {
        &self.inner.roles
    }

    /// Cached photo listing for slideshow frames.
    #[must_use]
    pub fn slideshow(&self) -> &SlideshowPhotos {
        &self.inner.slideshow
    }

    /// Markdown content loaded at startup.
    #[must_use]
    pub fn content(&self) -> &SiteContent {
        &self.inner.content
    }
}
