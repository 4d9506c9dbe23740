//! Identity Toolkit client (Firebase Authentication REST API).

use chrono::{DateTime, TimeDelta, Utc};
use forever_core::UserUid;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::{AuthSession, FirebaseError, IdentityProvider, ensure_success};
use crate::config::FirebaseConfig;

/// Identity Toolkit base URL.
const ACCOUNTS_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts";

/// Secure token service URL.
const TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

/// Response of `signUp`, `signInWithPassword` and `signInWithIdp`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    /// Lifetime in seconds, as a string.
    expires_in: String,
}

/// Response of the secure token refresh (snake case, unlike the others).
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    user_id: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

fn expiry(expires_in: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, FirebaseError> {
    let seconds: i64 = expires_in
        .parse()
        .map_err(|_| FirebaseError::Parse(format!("invalid expiresIn: {expires_in}")))?;
    Ok(now + TimeDelta::seconds(seconds))
}

impl SignInResponse {
    fn into_session(self, now: DateTime<Utc>) -> Result<AuthSession, FirebaseError> {
        Ok(AuthSession {
            expires_at: expiry(&self.expires_in, now)?,
            uid: UserUid::new(self.local_id),
            email: self.email,
            id_token: self.id_token,
            refresh_token: self.refresh_token,
        })
    }
}

impl RefreshResponse {
    fn into_session(self, now: DateTime<Utc>) -> Result<AuthSession, FirebaseError> {
        Ok(AuthSession {
            expires_at: expiry(&self.expires_in, now)?,
            uid: UserUid::new(self.user_id),
            email: None,
            id_token: self.id_token,
            refresh_token: self.refresh_token,
        })
    }
}

/// Firebase Authentication client.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    api_key: SecretString,
}

impl IdentityClient {
    /// Create a new identity client.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &FirebaseConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
        }
    }

    async fn accounts_call(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<AuthSession, FirebaseError> {
        let response = self
            .client
            .post(format!("{ACCOUNTS_URL}:{method}"))
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await?;

        let parsed: SignInResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| FirebaseError::Parse(e.to_string()))?;

        parsed.into_session(Utc::now())
    }
}

impl IdentityProvider for IdentityClient {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, FirebaseError> {
        self.accounts_call(
            "signUp",
            json!({ "email": email, "password": password, "returnSecureToken": true }),
        )
        .await
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, FirebaseError> {
        self.accounts_call(
            "signInWithPassword",
            json!({ "email": email, "password": password, "returnSecureToken": true }),
        )
        .await
    }

    #[instrument(skip(self, google_id_token))]
    async fn sign_in_with_google(
        &self,
        google_id_token: &str,
        request_uri: &str,
    ) -> Result<AuthSession, FirebaseError> {
        let post_body = format!(
            "id_token={}&providerId=google.com",
            urlencoding::encode(google_id_token)
        );
        self.accounts_call(
            "signInWithIdp",
            json!({
                "postBody": post_body,
                "requestUri": request_uri,
                "returnSecureToken": true,
                "returnIdpCredential": false,
            }),
        )
        .await
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, FirebaseError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .query(&[("key", self.api_key.expose_secret())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let parsed: RefreshResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| FirebaseError::Parse(e.to_string()))?;

        parsed.into_session(Utc::now())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_sign_in_response_to_session() {
        let parsed: SignInResponse = serde_json::from_str(
            r#"{
                "kind": "identitytoolkit#VerifyPasswordResponse",
                "localId": "uid-42",
                "email": "jane@example.com",
                "idToken": "id.jwt",
                "refreshToken": "refresh",
                "expiresIn": "3600",
                "registered": true
            }"#,
        )
        .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 18, 12, 0, 0).unwrap();
        let session = parsed.into_session(now).unwrap();

        assert_eq!(session.uid.as_str(), "uid-42");
        assert_eq!(session.email.as_deref(), Some("jane@example.com"));
        assert_eq!(session.expires_at, now + TimeDelta::hours(1));
    }

    #[test]
    fn test_refresh_response_has_no_email() {
        let parsed: RefreshResponse = serde_json::from_str(
            r#"{"expires_in":"3600","token_type":"Bearer","refresh_token":"r2","id_token":"i2","user_id":"uid-42","project_id":"1"}"#,
        )
        .unwrap();
        let session = parsed.into_session(Utc::now()).unwrap();
        assert_eq!(session.uid.as_str(), "uid-42");
        assert!(session.email.is_none());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let session = AuthSession {
            uid: UserUid::new("uid-42"),
            email: None,
            id_token: "very-secret-id-token".to_string(),
            refresh_token: "very-secret-refresh".to_string(),
            expires_at: Utc::now(),
        };
        let output = format!("{session:?}");
        assert!(!output.contains("very-secret"));
        assert!(output.contains("uid-42"));
    }

    #[test]
    fn test_invalid_expiry() {
        assert!(expiry("soon", Utc::now()).is_err());
    }
}
