//! HTTP route handlers for the memorial site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - About (tributes, intro, compact sections)
//! GET  /life                     - Biography
//! GET  /gallery                  - Gallery (?selected=<id>)
//! GET  /stories                  - Stories
//! GET  /slideshow/{index}        - Next slideshow frame (fragment)
//!
//! # Submissions (rate limited)
//! POST /tributes                 - Leave a tribute (admin)
//! POST /stories                  - Share a story (signed in)
//! POST /gallery/photos           - Upload a photo (multipart)
//! POST /gallery/photos/delete    - Delete the selected photo (admin)
//!
//! # Auth
//! GET  /auth                     - Login / register form (?mode=register)
//! POST /auth                     - Login or register (rate limited)
//! GET  /auth/google              - Redirect to Google (rate limited)
//! GET  /auth/google/callback     - Handle Google's redirect
//! POST /auth/logout              - Logout
//! ```

pub mod about;
pub mod auth;
pub mod gallery;
pub mod life;
pub mod slideshow;
pub mod stories;
pub mod views;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};

use crate::error::Result;
use crate::middleware::{auth_rate_limiter, submission_rate_limiter};
use crate::services::submissions::SubmitError;
use crate::state::AppState;

/// Largest accepted photo upload.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Finish a submission that was not written.
///
/// A missing role is a 403. Anything else returns to the form without
/// feedback; the failure is only logged.
fn submit_failed(e: SubmitError, back: &str) -> Result<Response> {
    match e {
        SubmitError::Forbidden => Err(e.into()),
        SubmitError::Invalid(reason) => {
            tracing::warn!(%reason, "Submission rejected");
            Ok(Redirect::to(back).into_response())
        }
        SubmitError::UnknownObject(_) | SubmitError::Backend(_) => {
            tracing::error!(error = %e, "Submission failed");
            Ok(Redirect::to(back).into_response())
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(auth::show).merge(post(auth::submit).layer(auth_rate_limiter())),
        )
        .route(
            "/google",
            get(auth::google_start).layer(auth_rate_limiter()),
        )
        .route("/google/callback", get(auth::google_callback))
        .route("/logout", post(auth::logout))
}

/// Create the gallery routes router.
pub fn gallery_routes() -> Router<AppState> {
    let uploads = Router::new()
        .route(
            "/photos",
            post(gallery::upload).layer(submission_rate_limiter()),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        .route("/", get(gallery::show))
        .merge(uploads)
        .route(
            "/photos/delete",
            post(gallery::delete).layer(submission_rate_limiter()),
        )
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(about::show))
        .route("/life", get(life::show))
        .route(
            "/tributes",
            post(about::create).layer(submission_rate_limiter()),
        )
        .route(
            "/stories",
            get(stories::show).merge(post(stories::create).layer(submission_rate_limiter())),
        )
        .route("/slideshow/{index}", get(slideshow::frame))
        .nest("/gallery", gallery_routes())
        .nest("/auth", auth_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table_builds_without_overlaps() {
        let _router: Router<AppState> = routes();
    }
}
