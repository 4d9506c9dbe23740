//! Slideshow frames for the sidebar.
//!
//! The page script asks for the next frame every three seconds and swaps it
//! in; each frame names the one after it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use super::views::{SlideFrame, SlideLabel};
use crate::state::AppState;

/// Which placeholder the requesting view uses.
#[derive(Debug, Default, Deserialize)]
pub struct FrameQuery {
    #[serde(default)]
    pub label: SlideLabel,
}

/// A single frame, without page chrome.
#[derive(Template, WebTemplate)]
#[template(path = "partials/slideshow.html")]
pub struct SlideshowFragment {
    pub frame: SlideFrame,
}

/// Render frame `index` from the cached photo listing.
pub async fn frame(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Query(query): Query<FrameQuery>,
) -> impl IntoResponse {
    let photos = state.slideshow().get(state.firestore()).await;
    SlideshowFragment {
        frame: SlideFrame::compose(
            photos.ready().map(|photos| photos.as_slice()),
            index,
            query.label,
        ),
    }
}
