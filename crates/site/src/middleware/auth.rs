//! Authentication middleware and extractors.
//!
//! Provides extractors for the signed-in user and their admin role in route
//! handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::accounts::ensure_fresh;
use crate::state::AppState;

async fn session_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Extractor that requires a signed-in user.
///
/// If nobody is signed in, returns a redirect to the auth page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.uid)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is signed in.
pub enum AuthRejection {
    /// Redirect to the auth page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for fragment requests from the page script).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if parts.extensions.get::<Session>().is_none() {
            return Err(AuthRejection::Unauthorized);
        }

        session_user(parts).await.map(Self).ok_or_else(|| {
            if parts.headers.contains_key("hx-request") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })
    }
}

/// The signed-in user, if any, with their admin flag resolved through the
/// shared [`RoleGate`](crate::services::RoleGate).
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub user: Option<CurrentUser>,
    pub is_admin: bool,
}

impl Viewer {
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// The signed-in user with a token fit for a write, if anyone is signed in.
    ///
    /// # Errors
    ///
    /// See [`fresh_user`].
    pub async fn writer(
        &self,
        state: &AppState,
        session: &Session,
    ) -> Result<Option<CurrentUser>, AppError> {
        match &self.user {
            Some(user) => fresh_user(state, session, user.clone()).await.map(Some),
            None => Ok(None),
        }
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(user) = session_user(parts).await else {
            return Ok(Self::default());
        };

        let is_admin = state
            .roles()
            .is_admin(state.firestore(), &user.uid, Some(&user.id_token))
            .await;

        Ok(Self {
            user: Some(user),
            is_admin,
        })
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    // New identity, new session id
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    set_sentry_user(&user.uid, user.email.as_deref());
    Ok(())
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(
    session: &Session,
) -> Result<Option<CurrentUser>, tower_sessions::session::Error> {
    let user = session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    clear_sentry_user();
    Ok(user)
}

/// Refresh the user's ID token if it is about to expire and store the result.
///
/// Call before any write made on the user's behalf.
///
/// A rejected refresh token ends the session.
///
/// # Errors
///
/// Returns [`AppError::Unauthorized`] if the refresh is rejected, or a session
/// error if the session cannot be updated.
pub async fn fresh_user(
    state: &AppState,
    session: &Session,
    user: CurrentUser,
) -> Result<CurrentUser, AppError> {
    let now = Utc::now();
    if !user.needs_refresh(now) {
        return Ok(user);
    }

    match ensure_fresh(state.identity(), user.clone(), now).await {
        Ok(fresh) => {
            session.insert(session_keys::CURRENT_USER, &fresh).await?;
            Ok(fresh)
        }
        Err(e) => {
            tracing::warn!(uid = %user.uid, error = %e, "Token refresh rejected, signing out");
            clear_current_user(session).await?;
            state.roles().forget(&user.uid).await;
            Err(AppError::Unauthorized("session expired".to_string()))
        }
    }
}
