//! Session-related types.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use forever_core::UserUid;

use crate::firebase::AuthSession;

/// How close to expiry an ID token is refreshed before a write.
pub const TOKEN_REFRESH_MARGIN: TimeDelta = TimeDelta::seconds(60);

/// Session-stored user identity.
///
/// Carries the Firebase tokens so writes can run under the user's identity
/// and the project's security rules.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Firebase account uid.
    pub uid: UserUid,
    /// Email the account signed in with, when the provider shared one.
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    /// When `id_token` stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl CurrentUser {
    /// Whether the ID token expires within [`TOKEN_REFRESH_MARGIN`] of `now`.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= TOKEN_REFRESH_MARGIN
    }

    /// Take the tokens of a refreshed session, keeping the known email.
    #[must_use]
    pub fn refreshed(self, session: AuthSession) -> Self {
        Self {
            uid: self.uid,
            email: session.email.or(self.email),
            id_token: session.id_token,
            refresh_token: session.refresh_token,
            expires_at: session.expires_at,
        }
    }
}

impl From<AuthSession> for CurrentUser {
    fn from(session: AuthSession) -> Self {
        Self {
            uid: session.uid,
            email: session.email,
            id_token: session.id_token,
            refresh_token: session.refresh_token,
            expires_at: session.expires_at,
        }
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for Google OAuth state (CSRF protection).
    pub const GOOGLE_OAUTH_STATE: &str = "google_oauth_state";

    /// Key for a pending [`forever_core::TransientNotice`].
    pub const NOTICE: &str = "notice";

    /// Key for the one-time sign-in outcome shown on the next page.
    pub const AUTH_MESSAGE: &str = "auth_message";

    /// Tribute written by this visitor, shown first on the next About view.
    pub const PUBLISHED_TRIBUTE: &str = "published_tribute";

    /// Story written by this visitor, shown first on the next Stories view.
    pub const PUBLISHED_STORY: &str = "published_story";

    /// Photo uploaded by this visitor, shown first on the next Gallery view.
    pub const UPLOADED_PHOTO: &str = "uploaded_photo";
}
