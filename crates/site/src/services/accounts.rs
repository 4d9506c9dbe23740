//! Sign-in, registration and token refresh.
//!
//! Failures are reported with one generic message per flow; the provider's
//! error code is logged and never shown.

use chrono::{DateTime, Utc};
use forever_core::{Email, UserProfile};
use serde::Deserialize;
use tracing::instrument;

use super::RoleGate;
use crate::firebase::{ContentStore, Document, FirebaseError, IdentityProvider};
use crate::models::CurrentUser;

pub const FILL_ALL_FIELDS: &str = "Please fill in all fields.";
pub const REGISTERED: &str = "Successfully registered!";
pub const SIGNED_IN: &str = "Successfully signed in!";
pub const GOOGLE_SIGNED_IN: &str = "Successfully signed in with Google!";
pub const AUTH_FAILED: &str = "Error with authentication";
pub const GOOGLE_AUTH_FAILED: &str = "Error with Google authentication";

/// Which form the auth page shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    #[must_use]
    pub const fn is_register(self) -> bool {
        matches!(self, Self::Register)
    }
}

/// Result of a sign-in attempt.
#[derive(Debug)]
pub enum AuthOutcome {
    SignedIn {
        user: CurrentUser,
        message: &'static str,
    },
    Rejected(&'static str),
}

/// Write the member profile for a new account and remember its role.
async fn create_profile<S: ContentStore>(
    store: &S,
    roles: &RoleGate,
    user: &CurrentUser,
) -> Result<(), FirebaseError> {
    let email = user.email.as_deref().and_then(|e| Email::parse(e).ok());
    let profile = UserProfile::new_member(user.uid.clone(), email);
    store
        .set(
            UserProfile::COLLECTION,
            user.uid.as_str(),
            profile.to_fields(),
            Some(&user.id_token),
        )
        .await?;
    roles.prime(&user.uid, false).await;
    Ok(())
}

/// Create the member profile unless the account already has one.
async fn ensure_profile<S: ContentStore>(
    store: &S,
    roles: &RoleGate,
    user: &CurrentUser,
) -> Result<(), FirebaseError> {
    let existing = store
        .get(
            UserProfile::COLLECTION,
            user.uid.as_str(),
            Some(&user.id_token),
        )
        .await?;
    if existing.is_none() {
        create_profile(store, roles, user).await?;
    }
    Ok(())
}

/// Password registration or login.
///
/// Registration also writes `users/{uid}` with `admin: false`. Once the
/// account exists a failed profile write does not undo it: the visitor is
/// signed in with the generic failure message and the uid is logged.
#[instrument(skip(identity, store, roles, password))]
pub async fn authenticate<I, S>(
    identity: &I,
    store: &S,
    roles: &RoleGate,
    mode: AuthMode,
    email: &str,
    password: &str,
) -> AuthOutcome
where
    I: IdentityProvider,
    S: ContentStore,
{
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return AuthOutcome::Rejected(FILL_ALL_FIELDS);
    }

    let result = match mode {
        AuthMode::Register => match identity.sign_up(email, password).await {
            Ok(session) => {
                let user = CurrentUser::from(session);
                let message = match create_profile(store, roles, &user).await {
                    Ok(()) => REGISTERED,
                    Err(e) => {
                        tracing::error!(
                            uid = %user.uid,
                            error = %e,
                            "Account created without a profile"
                        );
                        AUTH_FAILED
                    }
                };
                Ok((user, message))
            }
            Err(e) => Err(e),
        },
        AuthMode::Login => identity
            .sign_in_with_password(email, password)
            .await
            .map(|session| (CurrentUser::from(session), SIGNED_IN)),
    };

    match result {
        Ok((user, message)) => {
            tracing::info!(uid = %user.uid, "Signed in");
            AuthOutcome::SignedIn { user, message }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Error with authentication");
            AuthOutcome::Rejected(AUTH_FAILED)
        }
    }
}

/// Finish Google sign-in with a Google ID token.
///
/// Creates the member profile on first sign-in. As with registration, a
/// failed profile check or write leaves the visitor signed in.
#[instrument(skip_all)]
pub async fn google_sign_in<I, S>(
    identity: &I,
    store: &S,
    roles: &RoleGate,
    google_id_token: &str,
    request_uri: &str,
) -> AuthOutcome
where
    I: IdentityProvider,
    S: ContentStore,
{
    let user = match identity
        .sign_in_with_google(google_id_token, request_uri)
        .await
    {
        Ok(session) => CurrentUser::from(session),
        Err(e) => {
            tracing::warn!(error = %e, "Error with Google authentication");
            return AuthOutcome::Rejected(GOOGLE_AUTH_FAILED);
        }
    };

    let message = match ensure_profile(store, roles, &user).await {
        Ok(()) => GOOGLE_SIGNED_IN,
        Err(e) => {
            tracing::error!(
                uid = %user.uid,
                error = %e,
                "Signed in with Google without a profile"
            );
            GOOGLE_AUTH_FAILED
        }
    };

    tracing::info!(uid = %user.uid, "Signed in with Google");
    AuthOutcome::SignedIn { user, message }
}

/// Return `user` with an ID token valid for at least another minute.
///
/// # Errors
///
/// Returns the provider's error if the refresh token is rejected.
#[instrument(skip_all, fields(uid = %user.uid))]
pub async fn ensure_fresh<I: IdentityProvider>(
    identity: &I,
    user: CurrentUser,
    now: DateTime<Utc>,
) -> Result<CurrentUser, FirebaseError> {
    if !user.needs_refresh(now) {
        return Ok(user);
    }
    let session = identity.refresh(&user.refresh_token).await?;
    tracing::debug!("Refreshed ID token");
    Ok(user.refreshed(session))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use forever_core::UserUid;

    use super::*;
    use crate::firebase::memory::{DocumentOp, MemoryContentStore, MemoryIdentity};
    use crate::firebase::values::{boolean, fields, string};
    use crate::firebase::{Collection, values::read_bool};

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let identity = MemoryIdentity::new();
        let store = MemoryContentStore::new();
        let roles = RoleGate::default();

        let outcome =
            authenticate(&identity, &store, &roles, AuthMode::Login, "  ", "secret").await;
        assert!(matches!(outcome, AuthOutcome::Rejected(FILL_ALL_FIELDS)));
    }

    #[tokio::test]
    async fn test_register_writes_member_profile() {
        let identity = MemoryIdentity::new();
        let store = MemoryContentStore::new();
        let roles = RoleGate::default();

        let outcome = authenticate(
            &identity,
            &store,
            &roles,
            AuthMode::Register,
            "jane@example.com",
            "hunter22",
        )
        .await;
        let AuthOutcome::SignedIn { user, message } = outcome else {
            panic!("registration failed");
        };
        assert_eq!(message, REGISTERED);

        let profile = store.fields(Collection::Users, user.uid.as_str()).unwrap();
        assert_eq!(read_bool(&profile, "admin"), Some(false));
        assert!(!roles.is_admin(&store, &user.uid, None).await);
    }

    #[tokio::test]
    async fn test_wrong_password_is_generic_failure() {
        let identity = MemoryIdentity::new();
        let store = MemoryContentStore::new();
        let roles = RoleGate::default();
        authenticate(&identity, &store, &roles, AuthMode::Register, "a@b.co", "right").await;

        let outcome = authenticate(&identity, &store, &roles, AuthMode::Login, "a@b.co", "wrong").await;
        assert!(matches!(outcome, AuthOutcome::Rejected(AUTH_FAILED)));

        let outcome = authenticate(&identity, &store, &roles, AuthMode::Login, "a@b.co", "right").await;
        assert!(matches!(
            outcome,
            AuthOutcome::SignedIn { message: SIGNED_IN, .. }
        ));
    }

    #[tokio::test]
    async fn test_google_keeps_existing_profile() {
        let identity = MemoryIdentity::new();
        let store = MemoryContentStore::new();
        let roles = RoleGate::default();
        store.insert(
            Collection::Users,
            "google-abc",
            fields([("email", string("abc@gmail.test")), ("admin", boolean(true))]),
        );

        let outcome = google_sign_in(&identity, &store, &roles, "abc", "https://x.test").await;
        assert!(matches!(outcome, AuthOutcome::SignedIn { .. }));
        assert!(
            roles
                .is_admin(&store, &UserUid::new("google-abc"), None)
                .await
        );
    }

    #[tokio::test]
    async fn test_google_profile_write_failure() {
        let identity = MemoryIdentity::new();
        let store = MemoryContentStore::new();
        store.fail(Collection::Users, DocumentOp::Set);
        let roles = RoleGate::default();

        let outcome = google_sign_in(&identity, &store, &roles, "new", "https://x.test").await;
        let AuthOutcome::SignedIn { user, message } = outcome else {
            panic!("the Google account exists, so the visitor stays signed in");
        };
        assert_eq!(message, GOOGLE_AUTH_FAILED);
        assert_eq!(user.uid.as_str(), "google-new");
        assert!(store.fields(Collection::Users, "google-new").is_none());
    }

    #[tokio::test]
    async fn test_registration_survives_profile_write_failure() {
        let identity = MemoryIdentity::new();
        let store = MemoryContentStore::new();
        store.fail(Collection::Users, DocumentOp::Set);
        let roles = RoleGate::default();

        let outcome =
            authenticate(&identity, &store, &roles, AuthMode::Register, "jo@b.co", "secret").await;
        let AuthOutcome::SignedIn { user, message } = outcome else {
            panic!("the account was created, so the visitor stays signed in");
        };
        assert_eq!(message, AUTH_FAILED);
        assert!(store.fields(Collection::Users, user.uid.as_str()).is_none());
        assert!(!roles.is_admin(&store, &user.uid, None).await);

        let again = authenticate(&identity, &store, &roles, AuthMode::Login, "jo@b.co", "secret").await;
        assert!(matches!(again, AuthOutcome::SignedIn { message: SIGNED_IN, .. }));
    }

    #[tokio::test]
    async fn test_ensure_fresh_refreshes_near_expiry() {
        let identity = MemoryIdentity::new();
        let now = Utc::now();
        let user = CurrentUser {
            uid: UserUid::new("uid-7"),
            email: Some("jane@example.com".to_string()),
            id_token: "stale".to_string(),
            refresh_token: "refresh-uid-7".to_string(),
            expires_at: now + TimeDelta::seconds(10),
        };

        let fresh = ensure_fresh(&identity, user.clone(), now).await.unwrap();
        assert_ne!(fresh.id_token, "stale");
        assert_eq!(fresh.email, user.email);

        let later = CurrentUser {
            expires_at: now + TimeDelta::hours(1),
            ..user
        };
        let same = ensure_fresh(&identity, later, now).await.unwrap();
        assert_eq!(same.id_token, "stale");
    }
}
