//! Authentication route handlers.
//!
//! Handles password login and registration, Google sign-in and logout via
//! the Identity Toolkit. The outcome message travels to the next page in the
//! session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::views::{Chrome, Page};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::session_keys;
use crate::services::accounts::{self, AuthMode, AuthOutcome, GOOGLE_AUTH_FAILED};
use crate::state::AppState;

// =============================================================================
// Form & Query Types
// =============================================================================

/// Login or registration form data.
#[derive(Debug, Deserialize)]
pub struct AuthForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub mode: AuthMode,
}

/// Which form to show.
#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    #[serde(default)]
    pub mode: AuthMode,
}

/// Google's redirect back to the site.
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Auth page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub chrome: Chrome,
    pub register: bool,
    pub google_enabled: bool,
}

// =============================================================================
// Password Routes
// =============================================================================

/// Display the login or registration form.
pub async fn show(
    State(state): State<AppState>,
    page: Page,
    Query(query): Query<AuthQuery>,
) -> impl IntoResponse {
    AuthTemplate {
        chrome: page.chrome("auth"),
        register: query.mode.is_register(),
        google_enabled: state.google().is_some(),
    }
}

fn auth_page(mode: AuthMode) -> &'static str {
    if mode.is_register() {
        "/auth?mode=register"
    } else {
        "/auth"
    }
}

/// Handle login or registration.
#[instrument(skip_all, fields(mode = ?form.mode))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AuthForm>,
) -> Result<Response> {
    let outcome = accounts::authenticate(
        state.identity(),
        state.firestore(),
        state.roles(),
        form.mode,
        &form.email,
        &form.password,
    )
    .await;

    finish(&session, outcome, auth_page(form.mode)).await
}

/// Store the outcome and pick the next page.
async fn finish(session: &Session, outcome: AuthOutcome, retry: &str) -> Result<Response> {
    match outcome {
        AuthOutcome::SignedIn { user, message } => {
            set_current_user(session, &user).await?;
            session
                .insert(session_keys::AUTH_MESSAGE, message)
                .await?;
            Ok(Redirect::to("/").into_response())
        }
        AuthOutcome::Rejected(message) => {
            session
                .insert(session_keys::AUTH_MESSAGE, message)
                .await?;
            Ok(Redirect::to(retry).into_response())
        }
    }
}

// =============================================================================
// Google Sign-In
// =============================================================================

fn oauth_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Redirect to Google's consent screen.
#[instrument(skip_all)]
pub async fn google_start(State(state): State<AppState>, session: Session) -> Result<Response> {
    let google = state
        .google()
        .ok_or_else(|| AppError::NotFound("Google sign-in".to_string()))?;

    let csrf = oauth_state();
    session
        .insert(session_keys::GOOGLE_OAUTH_STATE, &csrf)
        .await?;

    Ok(Redirect::to(&google.authorization_url(&csrf)).into_response())
}

/// Handle Google's redirect: check `state`, exchange the code and sign in.
#[instrument(skip_all)]
pub async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<Response> {
    let google = state
        .google()
        .ok_or_else(|| AppError::NotFound("Google sign-in".to_string()))?;

    let expected = session
        .remove::<String>(session_keys::GOOGLE_OAUTH_STATE)
        .await?;

    let code = match (query.code, query.state, expected, query.error) {
        (_, _, _, Some(error)) => {
            tracing::warn!(%error, "Google sign-in declined");
            None
        }
        (Some(code), Some(returned), Some(expected), None) if returned == expected => Some(code),
        _ => {
            tracing::warn!("Google callback state mismatch");
            None
        }
    };
    let Some(code) = code else {
        return finish(&session, AuthOutcome::Rejected(GOOGLE_AUTH_FAILED), "/auth").await;
    };

    let outcome = match google.exchange_code(&code).await {
        Ok(id_token) => {
            accounts::google_sign_in(
                state.identity(),
                state.firestore(),
                state.roles(),
                &id_token,
                google.redirect_uri(),
            )
            .await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Google code exchange failed");
            AuthOutcome::Rejected(GOOGLE_AUTH_FAILED)
        }
    };

    finish(&session, outcome, "/auth").await
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out and forget the cached role.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Response> {
    if let Some(user) = clear_current_user(&session).await? {
        state.roles().forget(&user.uid).await;
        tracing::info!(uid = %user.uid, "Signed out");
    }
    session.flush().await?;
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use forever_core::LayoutState;

    use super::*;

    fn page(offline: bool) -> String {
        AuthTemplate {
            chrome: Chrome {
                active: "auth",
                nonce: "nonce".to_string(),
                signed_in: false,
                layout: LayoutState {
                    small_screen: false,
                    offline,
                },
                breakpoint: forever_core::layout::SMALL_SCREEN_BREAKPOINT,
                flash: None,
            },
            register: false,
            google_enabled: false,
        }
        .render()
        .unwrap()
    }

    #[test]
    fn test_page_renders_offline_banner_for_the_script() {
        let online = page(false);
        assert!(online.contains("data-offline-banner hidden"));
        assert!(online.contains(r#"data-breakpoint="1300""#));

        let offline = page(true);
        assert!(offline.contains("data-offline-banner"));
        assert!(!offline.contains("data-offline-banner hidden"));
    }

    #[test]
    fn test_oauth_state_is_random_and_url_safe() {
        let a = oauth_state();
        assert_ne!(a, oauth_state());
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_failed_registration_returns_to_register_form() {
        assert_eq!(auth_page(AuthMode::Register), "/auth?mode=register");
        assert_eq!(auth_page(AuthMode::Login), "/auth");
    }
}
