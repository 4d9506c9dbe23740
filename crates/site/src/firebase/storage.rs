//! Firebase Storage REST client.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{FirebaseError, ObjectStore, ensure_success};
use crate::config::FirebaseConfig;

/// Firebase Storage REST base URL.
const BASE_URL: &str = "https://firebasestorage.googleapis.com/v0";

/// Object metadata, reduced to what the download URL needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    /// Comma-separated list; the first token is used.
    download_tokens: Option<String>,
}

/// Storage client for one bucket.
#[derive(Clone)]
pub struct StorageClient {
    client: reqwest::Client,
    objects_url: String,
    api_key: SecretString,
}

impl StorageClient {
    /// Create a new Storage client.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &FirebaseConfig) -> Self {
        Self {
            client,
            objects_url: format!("{BASE_URL}/b/{}/o", config.storage_bucket),
            api_key: config.api_key.clone(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.objects_url, urlencoding::encode(path))
    }

    /// Public URL of an object given its download token.
    fn public_url(&self, path: &str, download_token: &str) -> String {
        format!(
            "{}?alt=media&token={download_token}",
            self.object_url(path)
        )
    }

    fn authorize(builder: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
        match token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, format!("Firebase {token}")),
            None => builder,
        }
    }
}

impl ObjectStore for StorageClient {
    #[instrument(skip(self, bytes, token), fields(size = bytes.len()))]
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
        token: Option<&str>,
    ) -> Result<(), FirebaseError> {
        let request = self
            .client
            .post(&self.objects_url)
            .query(&[("name", path), ("key", self.api_key.expose_secret())])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);

        ensure_success(Self::authorize(request, token).send().await?).await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn download_url(&self, path: &str, token: Option<&str>) -> Result<String, FirebaseError> {
        let request = self
            .client
            .get(self.object_url(path))
            .query(&[("key", self.api_key.expose_secret())]);

        let metadata: ObjectMetadata = ensure_success(Self::authorize(request, token).send().await?)
            .await?
            .json()
            .await
            .map_err(|e| FirebaseError::Parse(e.to_string()))?;

        let download_token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                FirebaseError::Parse(format!("object {} has no download token", metadata.name))
            })?;

        Ok(self.public_url(&metadata.name, download_token))
    }

    #[instrument(skip(self, token))]
    async fn delete(&self, path: &str, token: Option<&str>) -> Result<(), FirebaseError> {
        let request = self
            .client
            .delete(self.object_url(path))
            .query(&[("key", self.api_key.expose_secret())]);

        ensure_success(Self::authorize(request, token).send().await?).await?;
        Ok(())
    }
}
