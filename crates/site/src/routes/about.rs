//! About view: introduction, tributes and (on small screens) gallery,
//! biography and recent stories.

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
use forever_core::{Photo, Tribute, TributeDraft, TributeIcon};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::views::{
    Chrome, EntryView, IconOption, Page, SlideLabel, Sidebar, Toggle, add_href, href, icon_glyph,
    icon_options,
};
use crate::content::AboutIntro;
use crate::error::Result;
use crate::filters;
use crate::middleware::Viewer;
use crate::models::session_keys;
use crate::services::feeds::AboutFeeds;
use crate::services::submissions::submit_tribute;
use crate::state::AppState;

const FORM_ANCHOR: &str = "tribute-form";

// =============================================================================
// Query & Form Types
// =============================================================================

/// Local view state carried in the URL.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AboutQuery {
    /// Expanded tributes.
    #[serde(default)]
    pub open: String,
    /// Expanded recent stories.
    #[serde(default)]
    pub stories: String,
    /// `open` when the biography is expanded.
    #[serde(default)]
    pub life: String,
    /// Present when the fullscreen tribute form was requested.
    pub compose: Option<String>,
}

impl AboutQuery {
    fn life_open(&self) -> bool {
        self.life == "open"
    }

    /// Link to this view with the given state, dropping `compose`.
    fn link(&self, open: &ExpandSet, stories: &ExpandSet, life_open: bool, anchor: &str) -> String {
        href(
            "/",
            &[
                ("open", &open.to_query()),
                ("stories", &stories.to_query()),
                ("life", if life_open { "open" } else { "" }),
            ],
            Some(anchor),
        )
    }
}

/// Tribute form data.
#[derive(Debug, Deserialize)]
pub struct TributeForm {
    pub name: String,
    pub tribute: String,
    pub icon: Option<TributeIcon>,
    /// Set by the fullscreen form so a failed post returns to it.
    pub compose: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// The biography section as shown on small screens.
pub struct LifeSection {
    pub title: String,
    pub byline: Option<String>,
    pub html: String,
    pub toggle: Option<Toggle>,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub chrome: Chrome,
    pub intro: AboutIntro,
    pub is_admin: bool,
    /// `None` while the feed is unavailable.
    pub tributes: Option<Vec<EntryView>>,
    pub add_href: String,
    pub form: FormPresentation,
    pub icons: Vec<IconOption>,
    pub compact: bool,
    pub photos: Option<Vec<Photo>>,
    pub life: LifeSection,
    pub recent: Option<Vec<EntryView>>,
    pub story_total: usize,
    pub show_add_action: bool,
    pub sidebar: Sidebar,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the About page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    page: Page,
    Query(query): Query<AboutQuery>,
) -> Result<impl IntoResponse> {
    let published = page
        .session
        .remove::<Tribute>(session_keys::PUBLISHED_TRIBUTE)
        .await?;
    let feeds = AboutFeeds::load(state.firestore(), published).await;
    let layout = page.layout;
    let is_admin = page.viewer.is_admin;

    let open = ExpandSet::parse(&query.open);
    let story_open = ExpandSet::parse(&query.stories);
    let life_open = query.life_open();

    let tributes = feeds.tributes.ready().map(|tributes| {
        tributes
            .iter()
            .enumerate()
            .map(|(i, t)| EntryView {
                icon: t.icon.map(icon_glyph),
                pinned: t.pin,
                ..EntryView::compose("tribute", i, &t.name, &t.tribute, &t.date, &open, |set, anchor| {
                    query.link(set, &story_open, life_open, anchor)
                })
            })
            .collect()
    });

    let recent = feeds.recent.ready().map(|recent| {
        recent
            .items
            .iter()
            .enumerate()
            .map(|(i, s)| {
                EntryView::compose("recent", i, &s.name, &s.story, &s.date, &story_open, |set, anchor| {
                    query.link(&open, set, life_open, anchor)
                })
            })
            .collect()
    });
    let story_total = feeds.recent.ready().map_or(0, |recent| recent.total);

    let story = state.content().life();
    let life = LifeSection {
        title: story.meta.title.clone(),
        byline: story.meta.byline.clone(),
        html: if life_open {
            story.content_html.clone()
        } else {
            story.summary_html.clone()
        },
        toggle: story.has_more().then(|| Toggle {
            label: if life_open { "Show less" } else { "Read more" },
            href: query.link(&open, &story_open, !life_open, "her-life"),
        }),
    };

    let sidebar = Sidebar::new(
        &state,
        feeds.photos.ready().map(Vec::as_slice),
        SlideLabel::Slideshow,
    );

    Ok(AboutTemplate {
        chrome: page.chrome("about"),
        intro: state.content().about().clone(),
        is_admin,
        tributes,
        add_href: add_href(&layout, "/", FORM_ANCHOR),
        form: layout.form_presentation(query.compose.is_some(), SmallScreenForm::Inline),
        icons: icon_options(),
        compact: layout.show_compact_sections(),
        photos: feeds.photos.ready().cloned(),
        life,
        recent,
        story_total,
        show_add_action: layout.show_add_action(is_admin),
        sidebar,
    })
}

/// Handle tribute form submission.
///
/// Only admins see the form; anyone else posting gets 403. A failed write
/// returns to the view without feedback.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    viewer: Viewer,
    session: Session,
    Form(form): Form<TributeForm>,
) -> Result<Response> {
    let user = viewer.writer(&state, &session).await?;
    let back = if form.compose.is_some() {
        href("/", &[("compose", "1")], Some(FORM_ANCHOR))
    } else {
        format!("/#{FORM_ANCHOR}")
    };

    let draft = TributeDraft {
        name: form.name,
        tribute: form.tribute,
        icon: form.icon,
    };

    match submit_tribute(
        state.firestore(),
        viewer.is_admin,
        user.as_ref().map(|u| u.id_token.as_str()),
        draft,
        Utc::now(),
    )
    .await
    {
        Ok(tribute) => {
            session.insert(session_keys::PUBLISHED_TRIBUTE, &tribute).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => super::submit_failed(e, &back),
    }
}
