//! Life view: the full biography.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use super::views::{Chrome, Page, Sidebar, SlideLabel};
use crate::content::LifeStory;
use crate::filters;
use crate::state::AppState;

/// Life page template.
#[derive(Template, WebTemplate)]
#[template(path = "life.html")]
pub struct LifeTemplate {
    pub chrome: Chrome,
    pub story: LifeStory,
    pub sidebar: Sidebar,
}

/// Display the biography.
#[instrument(skip_all)]
pub async fn show(State(state): State<AppState>, page: Page) -> impl IntoResponse {
    let photos = state.slideshow().get(state.firestore()).await;

    LifeTemplate {
        chrome: page.chrome("life"),
        story: state.content().life().clone(),
        sidebar: Sidebar::new(
            &state,
            photos.ready().map(|photos| photos.as_slice()),
            SlideLabel::Slideshow,
        ),
    }
}
