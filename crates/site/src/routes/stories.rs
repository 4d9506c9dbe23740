//! Stories view and story submission.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use forever_core::layout::{FormPresentation, SmallScreenForm};
use forever_core::preview::ExpandSet;
use forever_core::{Story, StoryDraft, TransientNotice};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::views::{Chrome, EntryView, Page, Sidebar, SlideLabel, add_href, href};
use crate::error::Result;
use crate::filters;
use crate::middleware::Viewer;
use crate::models::session_keys;
use crate::services::feeds::stories_view;
use crate::services::submissions::{StoryOutcome, submit_story};
use crate::state::AppState;

const FORM_ANCHOR: &str = "story-form";

/// Local view state carried in the URL.
#[derive(Debug, Default, Deserialize)]
pub struct StoriesQuery {
    /// Expanded stories.
    #[serde(default)]
    pub open: String,
    /// Present when the fullscreen story form was requested.
    pub compose: Option<String>,
}

/// Story form data.
#[derive(Debug, Deserialize)]
pub struct StoryForm {
    pub name: String,
    pub story: String,
    pub compose: Option<String>,
}

/// A notice with the time it has left on screen.
pub struct NoticeView {
    pub message: String,
    pub remaining_ms: u64,
}

/// Stories page template.
#[derive(Template, WebTemplate)]
#[template(path = "stories.html")]
pub struct StoriesTemplate {
    pub chrome: Chrome,
    /// `None` while the feed is unavailable.
    pub stories: Option<Vec<EntryView>>,
    pub add_href: String,
    pub form: FormPresentation,
    pub notice: Option<NoticeView>,
    pub show_add_action: bool,
    pub sidebar: Sidebar,
}

/// Read the pending notice, dropping it once it has expired.
async fn take_notice(session: &Session) -> Result<Option<NoticeView>> {
    let Some(notice) = session
        .get::<TransientNotice>(session_keys::NOTICE)
        .await?
    else {
        return Ok(None);
    };

    let now = Utc::now();
    if notice.is_visible_at(now) {
        return Ok(Some(NoticeView {
            remaining_ms: notice.remaining_ms(now),
            message: notice.message,
        }));
    }

    session
        .remove::<TransientNotice>(session_keys::NOTICE)
        .await?;
    Ok(None)
}

/// Display the stories feed and the story form.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    page: Page,
    Query(query): Query<StoriesQuery>,
) -> Result<impl IntoResponse> {
    let published = page
        .session
        .remove::<Story>(session_keys::PUBLISHED_STORY)
        .await?;
    let (stories, photos) = tokio::join!(
        stories_view(state.firestore(), published),
        state.slideshow().get(state.firestore())
    );
    let layout = page.layout;
    let open = ExpandSet::parse(&query.open);

    let stories = stories.ready().map(|stories| {
        stories
            .iter()
            .enumerate()
            .map(|(i, s)| {
                EntryView::compose("story", i, &s.name, &s.story, &s.date, &open, |set, anchor| {
                    href("/stories", &[("open", &set.to_query())], Some(anchor))
                })
            })
            .collect()
    });

    Ok(StoriesTemplate {
        chrome: page.chrome("stories"),
        stories,
        add_href: add_href(&layout, "/stories", FORM_ANCHOR),
        form: layout.form_presentation(query.compose.is_some(), SmallScreenForm::Inline),
        notice: take_notice(&page.session).await?,
        show_add_action: layout.show_add_action(true),
        sidebar: Sidebar::new(
            &state,
            photos.ready().map(|photos| photos.as_slice()),
            SlideLabel::Photos,
        ),
    })
}

/// Handle story form submission.
///
/// Signed-out visitors get a notice next to the form and nothing is written.
/// A published story rides the session to the next view, which lists it first.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    viewer: Viewer,
    session: Session,
    Form(form): Form<StoryForm>,
) -> Result<Response> {
    let user = viewer.writer(&state, &session).await?;
    let back = if form.compose.is_some() {
        href("/stories", &[("compose", "1")], Some(FORM_ANCHOR))
    } else {
        format!("/stories#{FORM_ANCHOR}")
    };

    let draft = StoryDraft {
        name: form.name,
        story: form.story,
    };

    match submit_story(state.firestore(), user.as_ref(), draft, Utc::now()).await {
        Ok(StoryOutcome::Published(story)) => {
            session.insert(session_keys::PUBLISHED_STORY, &story).await?;
            Ok(Redirect::to("/stories").into_response())
        }
        Ok(StoryOutcome::AuthRequired(notice)) => {
            session.insert(session_keys::NOTICE, &notice).await?;
            Ok(Redirect::to(&back).into_response())
        }
        Err(e) => super::submit_failed(e, &back),
    }
}
