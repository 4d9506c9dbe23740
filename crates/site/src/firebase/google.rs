//! Google OAuth 2.0 authorization code flow.
//!
//! Used only to obtain a Google ID token, which is then exchanged for a
//! Firebase session through `accounts:signInWithIdp`.

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use super::{FirebaseError, ensure_success};
use crate::config::GoogleOAuthConfig;

/// Google authorization endpoint.
const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google token endpoint.
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scopes requested at sign-in.
const SCOPES: &str = "openid email profile";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
}

/// Google OAuth client for the site's callback URL.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    client: reqwest::Client,
    config: GoogleOAuthConfig,
    redirect_uri: String,
}

impl GoogleOAuthClient {
    /// Create a client whose callback is `{base_url}/auth/google/callback`.
    #[must_use]
    pub fn new(client: reqwest::Client, config: GoogleOAuthConfig, base_url: &str) -> Self {
        Self {
            client,
            config,
            redirect_uri: format!("{base_url}/auth/google/callback"),
        }
    }

    /// The callback URL registered with Google.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// URL to send the browser to, carrying the CSRF `state`.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{AUTHORIZE_URL}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&prompt=select_account",
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for a Google ID token.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or no ID token is returned.
    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<String, FirebaseError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let token: TokenResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| FirebaseError::Parse(e.to_string()))?;

        token
            .id_token
            .ok_or_else(|| FirebaseError::Parse("token response has no id_token".to_string()))
    }
}
