//! Feed composition: ordering, slicing and the fetch-failure sentinel.
//!
//! A feed is composed once per view from a one-shot read of a collection.
//! Ordering is always computed here; the store keeps no order of its own.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::dates::parse_timestamp;
use crate::records::{Story, Tribute};

/// Number of stories shown in the About view's "Recent Stories" section.
pub const RECENT_STORY_LIMIT: usize = 3;

/// The outcome of a one-shot collection fetch.
///
/// `Unavailable` is distinct from an empty feed: a failed fetch renders as a
/// loading message that never resolves, an empty feed renders nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState<T> {
    Unavailable,
    Ready(T),
}

impl<T> FeedState<T> {
    /// Build a feed state from a fetch result, discarding the error.
    ///
    /// Callers log the error before converting; the view shows no error text.
    pub fn from_fetch<E>(result: Result<T, E>) -> Self {
        result.map_or(Self::Unavailable, Self::Ready)
    }

    /// The loaded value, if the fetch succeeded.
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Unavailable => None,
        }
    }

    /// Mutable access to the loaded value.
    pub const fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Unavailable => None,
        }
    }

    /// Whether the fetch failed.
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// Transform the loaded value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FeedState<U> {
        match self {
            Self::Ready(value) => FeedState::Ready(f(value)),
            Self::Unavailable => FeedState::Unavailable,
        }
    }
}

fn date_key(date: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(date)
}

/// Compare two tributes for display: pinned first, then newest first.
#[must_use]
pub fn tribute_order(a: &Tribute, b: &Tribute) -> Ordering {
    b.pin
        .cmp(&a.pin)
        .then_with(|| date_key(&b.date).cmp(&date_key(&a.date)))
}

/// Compare two stories for display: newest first.
#[must_use]
pub fn story_order(a: &Story, b: &Story) -> Ordering {
    date_key(&b.date).cmp(&date_key(&a.date))
}

/// Sort tributes in place (pin descending, then date descending).
///
/// The sort is stable, so tributes with equal keys keep their fetched order.
pub fn sort_tributes(tributes: &mut [Tribute]) {
    tributes.sort_by(tribute_order);
}

/// Sort stories in place, newest first.
pub fn sort_stories(stories: &mut [Story]) {
    stories.sort_by(story_order);
}

/// Move `record` to the front, dropping the copy a later fetch returned.
fn put_first<T: PartialEq>(records: &mut Vec<T>, record: T) {
    if let Some(position) = records.iter().position(|r| *r == record) {
        records.remove(position);
    }
    records.insert(0, record);
}

/// Put a just-written tribute at the front and restore display order.
///
/// A pinned tribute that was already first stays first.
pub fn prepend_tribute(tributes: &mut Vec<Tribute>, tribute: Tribute) {
    put_first(tributes, tribute);
    sort_tributes(tributes);
}

/// Put a just-written story at the front.
///
/// The Stories view shows the store's own order, so no sort follows. If the
/// listing already holds the story it moves rather than repeats.
pub fn prepend_story(stories: &mut Vec<Story>, story: Story) {
    put_first(stories, story);
}

/// The About view's slice of the story feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentStories {
    /// Newest stories, at most [`RECENT_STORY_LIMIT`].
    pub items: Vec<Story>,
    /// Number of stories in the whole collection.
    pub total: usize,
}

impl RecentStories {
    /// Sort the full collection newest first and keep the head.
    #[must_use]
    pub fn compose(mut stories: Vec<Story>, limit: usize) -> Self {
        let total = stories.len();
        sort_stories(&mut stories);
        stories.truncate(limit);
        Self {
            items: stories,
            total,
        }
    }
}
