//! Body truncation and per-view expand state.

use std::borrow::Cow;
use std::collections::BTreeSet;

/// Bodies longer than this many characters are collapsed behind "Read more".
pub const PREVIEW_CHARS: usize = 200;

/// Marker appended to a collapsed body.
pub const ELLIPSIS: &str = "...";

/// A body split at the preview boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preview<'a> {
    full: &'a str,
    prefix: &'a str,
}

impl<'a> Preview<'a> {
    /// Split `body` after [`PREVIEW_CHARS`] characters.
    #[must_use]
    pub fn of(body: &'a str) -> Self {
        let prefix = body
            .char_indices()
            .nth(PREVIEW_CHARS)
            .map_or(body, |(cut, _)| body.get(..cut).unwrap_or(body));
        Self { full: body, prefix }
    }

    /// Whether the body is longer than the preview and needs a toggle.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.prefix.len() < self.full.len()
    }

    /// The first [`PREVIEW_CHARS`] characters (or the whole body).
    #[must_use]
    pub const fn prefix(&self) -> &'a str {
        self.prefix
    }

    /// Text to display for the given expand state.
    #[must_use]
    pub fn display(&self, expanded: bool) -> Cow<'a, str> {
        if expanded || !self.is_truncated() {
            Cow::Borrowed(self.full)
        } else {
            Cow::Owned(format!("{}{ELLIPSIS}", self.prefix))
        }
    }

    /// Caption of the toggle, if the body has one.
    #[must_use]
    pub fn toggle_label(&self, expanded: bool) -> Option<&'static str> {
        if !self.is_truncated() {
            return None;
        }
        Some(if expanded { "Show less" } else { "Read more" })
    }
}

/// Positions of the expanded items in one rendered feed.
///
/// Expand state is local to a view and never written back. It travels in the
/// `open` query parameter as a comma-separated list of positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandSet(BTreeSet<usize>);

impl ExpandSet {
    /// Parse the query form, ignoring anything that is not a position.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect(),
        )
    }

    /// Whether the item at `index` is expanded.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    /// The set with `index` flipped, leaving `self` untouched.
    #[must_use]
    pub fn toggled(&self, index: usize) -> Self {
        let mut next = self.0.clone();
        if !next.remove(&index) {
            next.insert(index);
        }
        Self(next)
    }

    /// Encode for the `open` query parameter.
    #[must_use]
    pub fn to_query(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Whether nothing is expanded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_length_is_capped() {
        for len in [0, 1, 199, 200, 201, 450] {
            let body = "x".repeat(len);
            let preview = Preview::of(&body);
            assert_eq!(preview.prefix().chars().count(), len.min(PREVIEW_CHARS));
            assert_eq!(preview.is_truncated(), len > PREVIEW_CHARS);
            assert_eq!(preview.toggle_label(false).is_some(), len > PREVIEW_CHARS);
        }
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let body = "é".repeat(250);
        let preview = Preview::of(&body);
        assert_eq!(preview.prefix().chars().count(), 200);
        assert!(preview.display(false).ends_with(ELLIPSIS));
    }

    #[test]
    fn test_short_body_has_no_ellipsis() {
        let preview = Preview::of("Rest in peace.");
        assert_eq!(preview.display(false), "Rest in peace.");
        assert_eq!(preview.toggle_label(false), None);
    }

    #[test]
    fn test_expanded_body_is_full() {
        let body = "word ".repeat(60);
        let preview = Preview::of(&body);
        assert_eq!(preview.display(true), body.as_str());
        assert_eq!(preview.toggle_label(true), Some("Show less"));
        assert_eq!(preview.toggle_label(false), Some("Read more"));
    }

    #[test]
    fn test_expand_set_toggle_is_local() {
        let open = ExpandSet::parse("2, 5,x");
        assert!(open.contains(2));
        assert!(open.contains(5));

        let next = open.toggled(2).toggled(7);
        assert_eq!(next.to_query(), "5,7");
        assert_eq!(open.to_query(), "2,5");
    }

    #[test]
    fn test_expand_set_empty() {
        assert!(ExpandSet::parse("").is_empty());
        assert_eq!(ExpandSet::default().toggled(0).to_query(), "0");
    }
}
