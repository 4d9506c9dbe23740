//! Viewport hints for server-rendered layout decisions.
//!
//! The browser reports its width through the `Sec-CH-Viewport-Width` client
//! hint (requested by `Accept-CH`) or, where client hints are unsupported,
//! through the `forever_vw` cookie written by the layout bootstrap script.
//! Connectivity is always online at render time; `site.js` feeds later
//! online/offline events to the banner.

use axum::{extract::FromRequestParts, http::request::Parts};
use forever_core::{Connectivity, LayoutResponder, LayoutState};
use tower_sessions::cookie::Cookie;

/// Cookie holding the last reported viewport width.
pub const VIEWPORT_COOKIE: &str = "forever_vw";

const HINT_HEADERS: [&str; 2] = ["sec-ch-viewport-width", "viewport-width"];

/// Layout state for the request, mounted from its viewport hints.
#[derive(Debug, Clone, Copy)]
pub struct LayoutHints(pub LayoutState);

impl LayoutHints {
    #[must_use]
    pub const fn state(&self) -> LayoutState {
        self.0
    }
}

fn parse_width(raw: &str) -> Option<u32> {
    // Client hints may be fractional
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value <= 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(value.round() as u32)
}

fn cookie_width(parts: &Parts) -> Option<u32> {
    parts
        .headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == VIEWPORT_COOKIE)
        .and_then(|cookie| parse_width(cookie.value()))
}

/// Viewport width reported by the request, if any.
#[must_use]
pub fn viewport_width(parts: &Parts) -> Option<u32> {
    HINT_HEADERS
        .iter()
        .filter_map(|name| parts.headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_width)
        .or_else(|| cookie_width(parts))
}

impl<S> FromRequestParts<S> for LayoutHints
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let responder = LayoutResponder::mount(viewport_width(parts), Connectivity::Online);
        Ok(Self(responder.state()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn hints(headers: &[(&str, &str)]) -> LayoutState {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        LayoutHints::from_request_parts(&mut parts, &())
            .await
            .unwrap()
            .state()
    }

    #[tokio::test]
    async fn test_unknown_width_is_large_screen() {
        let state = hints(&[]).await;
        assert!(!state.small_screen);
        assert!(!state.offline);
    }

    #[tokio::test]
    async fn test_client_hint_small_screen() {
        assert!(hints(&[("sec-ch-viewport-width", "1300")]).await.small_screen);
        assert!(!hints(&[("sec-ch-viewport-width", "1301")]).await.small_screen);
    }

    #[tokio::test]
    async fn test_cookie_fallback() {
        let state = hints(&[("cookie", "forever_session=abc; forever_vw=390")]).await;
        assert!(state.small_screen);
    }

    #[tokio::test]
    async fn test_header_beats_cookie() {
        let state = hints(&[
            ("viewport-width", "1920"),
            ("cookie", "forever_vw=390"),
        ])
        .await;
        assert!(!state.small_screen);
    }

    #[test]
    fn test_parse_width() {
        assert_eq!(parse_width("412.5"), Some(413));
        assert_eq!(parse_width("-3"), None);
        assert_eq!(parse_width("wide"), None);
    }
}
