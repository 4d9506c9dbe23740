//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Formats a stored ISO-8601 timestamp as "June 18".
///
/// Values that are not timestamps render as an empty string.
///
/// Usage in templates: `{{ tribute.date|month_day }}`
#[askama::filter_fn]
pub fn month_day(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(forever_core::dates::month_day(&value.to_string()))
}

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Returns the content hash for site.js.
///
/// Usage in templates: `{{ ""|js_hash }}`
#[askama::filter_fn]
pub fn js_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("JS_HASH"))
}
