//! Firestore REST client.

use forever_core::DocumentId;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::{Collection, ContentStore, FirebaseError, RawDocument, ensure_success, values::Fields};
use crate::config::FirebaseConfig;

/// Firestore REST base URL.
const BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Documents requested per list page.
const PAGE_SIZE: u32 = 300;

/// One page of a collection listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

/// Firestore client for the project's default database.
#[derive(Clone)]
pub struct FirestoreClient {
    client: reqwest::Client,
    documents_url: String,
    api_key: SecretString,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &FirebaseConfig) -> Self {
        Self {
            client,
            documents_url: format!(
                "{BASE_URL}/projects/{}/databases/(default)/documents",
                config.project_id
            ),
            api_key: config.api_key.clone(),
        }
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{collection}", self.documents_url)
    }

    fn document_url(&self, collection: Collection, id: &str) -> String {
        format!(
            "{}/{collection}/{}",
            self.documents_url,
            urlencoding::encode(id)
        )
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .query(&[("key", self.api_key.expose_secret())]);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

impl ContentStore for FirestoreClient {
    #[instrument(skip(self), fields(collection = %collection))]
    async fn list(&self, collection: Collection) -> Result<Vec<RawDocument>, FirebaseError> {
        let url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .request(reqwest::Method::GET, &url, None)
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = ensure_success(request.send().await?).await?;
            let page: ListResponse = response
                .json()
                .await
                .map_err(|e| FirebaseError::Parse(e.to_string()))?;

            documents.extend(page.documents);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(count = documents.len(), "Listed collection");
        Ok(documents)
    }

    #[instrument(skip(self, token), fields(collection = %collection))]
    async fn get(
        &self,
        collection: Collection,
        id: &str,
        token: Option<&str>,
    ) -> Result<Option<RawDocument>, FirebaseError> {
        let url = self.document_url(collection, id);
        let response = self.request(reqwest::Method::GET, &url, token).send().await?;

        match ensure_success(response).await {
            Ok(response) => response
                .json()
                .await
                .map(Some)
                .map_err(|e| FirebaseError::Parse(e.to_string())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, fields, token), fields(collection = %collection))]
    async fn create(
        &self,
        collection: Collection,
        fields: Fields,
        token: Option<&str>,
    ) -> Result<DocumentId, FirebaseError> {
        let url = self.collection_url(collection);
        let response = self
            .request(reqwest::Method::POST, &url, token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        let created: RawDocument = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| FirebaseError::Parse(e.to_string()))?;

        Ok(created.id())
    }

    #[instrument(skip(self, fields, token), fields(collection = %collection))]
    async fn set(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
        token: Option<&str>,
    ) -> Result<(), FirebaseError> {
        let url = self.document_url(collection, id);
        let response = self
            .request(reqwest::Method::PATCH, &url, token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    #[instrument(skip(self, fields, token), fields(collection = %collection))]
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
        token: Option<&str>,
    ) -> Result<(), FirebaseError> {
        let url = self.document_url(collection, id);
        let mask: Vec<(&str, &str)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", key.as_str()))
            .collect();

        let response = self
            .request(reqwest::Method::PATCH, &url, token)
            .query(&mask)
            .query(&[("currentDocument.exists", "true")])
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    #[instrument(skip(self, token), fields(collection = %collection))]
    async fn delete(
        &self,
        collection: Collection,
        id: &str,
        token: Option<&str>,
    ) -> Result<(), FirebaseError> {
        let url = self.document_url(collection, id);
        let response = self
            .request(reqwest::Method::DELETE, &url, token)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn client() -> FirestoreClient {
        FirestoreClient::new(
            reqwest::Client::new(),
            &FirebaseConfig {
                api_key: SecretString::from("key"),
                project_id: "forever-memorial".to_string(),
                storage_bucket: "forever-memorial.appspot.com".to_string(),
            },
        )
    }

    #[test]
    fn test_urls() {
        let client = client();
        assert_eq!(
            client.collection_url(Collection::Tributes),
            "https://firestore.googleapis.com/v1/projects/forever-memorial/databases/(default)/documents/tributes"
        );
        assert!(client.document_url(Collection::Users, "a/b").ends_with("/users/a%2Fb"));
    }

    #[test]
    fn test_list_response_without_documents() {
        let page: ListResponse = serde_json::from_str("{}").unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_list_response_page() {
        let page: ListResponse = serde_json::from_str(
            r#"{
                "documents": [{
                    "name": "projects/p/databases/(default)/documents/tributes/abc",
                    "fields": {"name": {"stringValue": "Jane"}},
                    "createTime": "2024-06-18T12:00:00Z"
                }],
                "nextPageToken": "tok"
            }"#,
        )
        .unwrap();
        assert_eq!(page.documents[0].id().as_str(), "abc");
        assert_eq!(page.next_page_token.as_deref(), Some("tok"));
    }
}
