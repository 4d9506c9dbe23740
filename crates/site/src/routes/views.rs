//! View models shared by the page templates.
//!
//! Handlers compose these from feeds and request hints; templates only branch
//! on the booleans and options they carry.

use axum::{extract::FromRequestParts, http::request::Parts};
use forever_core::preview::{ExpandSet, Preview};
use forever_core::layout::SMALL_SCREEN_BREAKPOINT;
use forever_core::slideshow::interval_ms;
use forever_core::{LayoutState, Photo, Slideshow, TributeIcon};
use serde::Deserialize;
use tower_sessions::Session;

use crate::content::Update;
use crate::error::AppError;
use crate::middleware::{CspNonce, LayoutHints, Viewer};
use crate::models::session_keys;
use crate::state::AppState;

// =============================================================================
// Page Context
// =============================================================================

/// Everything a full page needs besides its own data.
///
/// Extracting it also takes the pending flash message out of the session.
pub struct Page {
    pub viewer: Viewer,
    pub layout: LayoutState,
    pub session: Session,
    nonce: CspNonce,
    flash: Option<String>,
}

impl FromRequestParts<AppState> for Page {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;
        let Ok(viewer) = Viewer::from_request_parts(parts, state).await;
        let Ok(LayoutHints(layout)) = LayoutHints::from_request_parts(parts, state).await;
        let Ok(nonce) = CspNonce::from_request_parts(parts, state).await;
        let flash = session
            .remove::<String>(session_keys::AUTH_MESSAGE)
            .await?;

        Ok(Self {
            viewer,
            layout,
            session,
            nonce,
            flash,
        })
    }
}

impl Page {
    /// Chrome for a page under the given nav entry.
    #[must_use]
    pub fn chrome(&self, active: &'static str) -> Chrome {
        Chrome {
            active,
            nonce: self.nonce.value().to_string(),
            signed_in: self.viewer.is_signed_in(),
            layout: self.layout,
            breakpoint: SMALL_SCREEN_BREAKPOINT,
            flash: self.flash.clone(),
        }
    }
}

/// Navigation, footer, offline banner and flash message.
#[derive(Debug, Clone)]
pub struct Chrome {
    /// Active nav entry: "about", "life", "gallery", "stories" or "auth".
    pub active: &'static str,
    pub nonce: String,
    pub signed_in: bool,
    pub layout: LayoutState,
    /// Width the page script compares against after a resize.
    pub breakpoint: u32,
    pub flash: Option<String>,
}

// =============================================================================
// Links
// =============================================================================

/// Build `path?k=v...#anchor`, skipping empty values.
#[must_use]
pub fn href(path: &str, params: &[(&str, &str)], anchor: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params.iter().filter(|(_, value)| !value.is_empty()) {
        query.append_pair(key, value);
    }
    let query = query.finish();

    let mut out = path.to_string();
    if !query.is_empty() {
        out.push('?');
        out.push_str(&query);
    }
    if let Some(anchor) = anchor {
        out.push('#');
        out.push_str(anchor);
    }
    out
}

/// Where an "add" button points: the overlay on small screens, the inline
/// form otherwise.
#[must_use]
pub fn add_href(layout: &LayoutState, path: &str, form_anchor: &str) -> String {
    if layout.small_screen {
        href(path, &[("compose", "1")], Some(form_anchor))
    } else {
        format!("#{form_anchor}")
    }
}

// =============================================================================
// Feed Entries
// =============================================================================

/// A Read more / Show less link.
#[derive(Debug, Clone)]
pub struct Toggle {
    pub label: &'static str,
    pub href: String,
}

/// A tribute or story as rendered.
#[derive(Debug, Clone)]
pub struct EntryView {
    pub anchor: String,
    pub name: String,
    /// Stored timestamp; templates format it with `month_day`.
    pub date: String,
    pub body: String,
    pub toggle: Option<Toggle>,
    pub icon: Option<&'static str>,
    pub pinned: bool,
}

impl EntryView {
    /// Compose one entry. `toggle_href` receives the expand set with this
    /// entry flipped.
    pub fn compose(
        prefix: &str,
        index: usize,
        name: &str,
        body: &str,
        date: &str,
        open: &ExpandSet,
        toggle_href: impl Fn(&ExpandSet, &str) -> String,
    ) -> Self {
        let anchor = format!("{prefix}-{index}");
        let expanded = open.contains(index);
        let preview = Preview::of(body);
        let toggle = preview.toggle_label(expanded).map(|label| Toggle {
            label,
            href: toggle_href(&open.toggled(index), &anchor),
        });

        Self {
            name: name.to_string(),
            date: date.to_string(),
            body: preview.display(expanded).into_owned(),
            toggle,
            icon: None,
            pinned: false,
            anchor,
        }
    }
}

/// Glyph standing in for a tribute icon.
#[must_use]
pub const fn icon_glyph(icon: TributeIcon) -> &'static str {
    match icon {
        TributeIcon::Candle => "\u{1F56F}",
        TributeIcon::Flower => "\u{273F}",
        TributeIcon::Feather => "\u{1FAB6}",
    }
}

/// One choice in the tribute form.
#[derive(Debug, Clone, Copy)]
pub struct IconOption {
    pub value: &'static str,
    pub label: &'static str,
    pub glyph: &'static str,
}

#[must_use]
pub fn icon_options() -> Vec<IconOption> {
    TributeIcon::ALL
        .iter()
        .map(|&icon| IconOption {
            value: icon.as_str(),
            label: icon.label(),
            glyph: icon_glyph(icon),
        })
        .collect()
}

// =============================================================================
// Sidebar
// =============================================================================

/// Which placeholder a slideshow shows when it has no frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideLabel {
    /// "Loading slideshow..." whenever there is no photo to show.
    #[default]
    Slideshow,
    /// "Loading photos..." only when the listing failed; empty shows nothing.
    Photos,
}

/// One slideshow frame and the URL of the next.
#[derive(Debug, Clone)]
pub struct SlideFrame {
    pub image_url: Option<String>,
    pub loading: Option<&'static str>,
    pub next_href: String,
    /// How long the page script shows this frame.
    pub interval_ms: u64,
}

impl SlideFrame {
    /// Frame `index` of `photos`; `None` means the listing failed.
    #[must_use]
    pub fn compose(photos: Option<&[Photo]>, index: usize, label: SlideLabel) -> Self {
        let show = Slideshow::at(index, photos.map_or(0, <[Photo]>::len));
        let image_url = photos
            .and_then(|photos| show.current(photos))
            .map(|photo| photo.image_url.clone());

        let loading = match (image_url.is_some(), label, photos.is_none()) {
            (true, _, _) | (false, SlideLabel::Photos, false) => None,
            (false, SlideLabel::Slideshow, _) => Some("Loading slideshow..."),
            (false, SlideLabel::Photos, true) => Some("Loading photos..."),
        };

        let next = show.next_index().to_string();
        let next_href = match label {
            SlideLabel::Slideshow => href(&format!("/slideshow/{next}"), &[], None),
            SlideLabel::Photos => href(&format!("/slideshow/{next}"), &[("label", "photos")], None),
        };

        Self {
            image_url,
            loading,
            next_href,
            interval_ms: interval_ms(),
        }
    }
}

/// Slideshow and "Recent updates", shown beside every memorial view.
#[derive(Debug, Clone)]
pub struct Sidebar {
    pub frame: SlideFrame,
    pub updates: Vec<Update>,
}

impl Sidebar {
    #[must_use]
    pub fn new(state: &AppState, photos: Option<&[Photo]>, label: SlideLabel) -> Self {
        Self {
            frame: SlideFrame::compose(photos, 0, label),
            updates: state.content().updates().to_vec(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use forever_core::DocumentId;

    use super::*;

    fn photo(id: &str) -> Photo {
        Photo {
            id: DocumentId::new(id),
            image_url: format!("https://img.test/{id}.jpg"),
            description: None,
        }
    }

    #[test]
    fn test_href_skips_empty_params() {
        assert_eq!(href("/", &[("open", ""), ("life", "open")], None), "/?life=open");
        assert_eq!(href("/stories", &[], Some("story-2")), "/stories#story-2");
        assert_eq!(href("/", &[("open", "1,3")], None), "/?open=1%2C3");
    }

    #[test]
    fn test_add_href_depends_on_screen() {
        let small = LayoutState {
            small_screen: true,
            offline: false,
        };
        assert_eq!(
            add_href(&small, "/gallery", "photo-form"),
            "/gallery?compose=1#photo-form"
        );
        assert_eq!(
            add_href(&LayoutState::default(), "/gallery", "photo-form"),
            "#photo-form"
        );
    }

    #[test]
    fn test_entry_toggle_flips_only_its_index() {
        let body = "x".repeat(250);
        let open = ExpandSet::parse("4");
        let entry = EntryView::compose("tribute", 1, "Jane", &body, "", &open, |set, anchor| {
            href("/", &[("open", &set.to_query())], Some(anchor))
        });

        assert_eq!(entry.body.chars().count(), 203);
        let toggle = entry.toggle.unwrap();
        assert_eq!(toggle.label, "Read more");
        assert_eq!(toggle.href, "/?open=1%2C4#tribute-1");
    }

    #[test]
    fn test_short_entry_has_no_toggle() {
        let entry = EntryView::compose(
            "story",
            0,
            "Jane",
            "Hello",
            "2024-06-18T10:00:00.000Z",
            &ExpandSet::default(),
            |_, _| String::new(),
        );
        assert_eq!(entry.body, "Hello");
        assert_eq!(forever_core::dates::month_day(&entry.date), "June 18");
        assert!(entry.toggle.is_none());
    }

    #[test]
    fn test_slide_frame_wraps_and_links_next() {
        let photos = vec![photo("a"), photo("b")];
        let frame = SlideFrame::compose(Some(&photos), 1, SlideLabel::Slideshow);
        assert_eq!(frame.image_url.as_deref(), Some("https://img.test/b.jpg"));
        assert_eq!(frame.next_href, "/slideshow/0");
        assert_eq!(frame.interval_ms, 3000);
    }

    #[test]
    fn test_slide_frame_folds_stale_index() {
        let photos = vec![photo("a"), photo("b")];
        let frame = SlideFrame::compose(Some(&photos), 4, SlideLabel::Slideshow);
        assert_eq!(frame.image_url.as_deref(), Some("https://img.test/a.jpg"));
        assert_eq!(frame.next_href, "/slideshow/1");
    }

    #[test]
    fn test_slide_frame_placeholders() {
        let empty = SlideFrame::compose(Some(&[]), 0, SlideLabel::Slideshow);
        assert_eq!(empty.loading, Some("Loading slideshow..."));

        let empty = SlideFrame::compose(Some(&[]), 0, SlideLabel::Photos);
        assert_eq!(empty.loading, None);

        let failed = SlideFrame::compose(None, 0, SlideLabel::Photos);
        assert_eq!(failed.loading, Some("Loading photos..."));
        assert_eq!(failed.next_href, "/slideshow/0?label=photos");
    }
}
