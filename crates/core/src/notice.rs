//! Messages that disappear on their own.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How long the "please sign in" notice stays up.
pub const AUTH_NOTICE_TTL: Duration = Duration::from_millis(6000);

/// Shown when a signed-out visitor tries to share a story.
pub const STORY_AUTH_REQUIRED: &str = "Please log in or sign up to submit a story.";

/// A one-off message with an expiry.
///
/// Stored in the session between a rejected post and the redirect that
/// renders it; the page script hides it after [`TransientNotice::ttl`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientNotice {
    pub message: String,
    pub shown_at: DateTime<Utc>,
    ttl_ms: u64,
}

impl TransientNotice {
    #[must_use]
    pub fn new(message: impl Into<String>, shown_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            shown_at,
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// The notice for an unauthenticated story submission.
    #[must_use]
    pub fn story_auth_required(now: DateTime<Utc>) -> Self {
        Self::new(STORY_AUTH_REQUIRED, now, AUTH_NOTICE_TTL)
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Whether the notice is still up at `now`.
    #[must_use]
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        let ttl = TimeDelta::milliseconds(i64::try_from(self.ttl_ms).unwrap_or(i64::MAX));
        now >= self.shown_at && now - self.shown_at < ttl
    }

    /// Milliseconds of visibility left at `now`, for the page script timer.
    #[must_use]
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = (now - self.shown_at).num_milliseconds().max(0);
        self.ttl_ms
            .saturating_sub(u64::try_from(elapsed).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 18, 12, 0, 0).unwrap() + TimeDelta::milliseconds(ms)
    }

    #[test]
    fn test_story_notice_expires_after_six_seconds() {
        let notice = TransientNotice::story_auth_required(at(0));
        assert_eq!(notice.message, STORY_AUTH_REQUIRED);
        assert!(notice.is_visible_at(at(0)));
        assert!(notice.is_visible_at(at(5999)));
        assert!(!notice.is_visible_at(at(6000)));
    }

    #[test]
    fn test_remaining_ms() {
        let notice = TransientNotice::story_auth_required(at(0));
        assert_eq!(notice.remaining_ms(at(0)), 6000);
        assert_eq!(notice.remaining_ms(at(2500)), 3500);
        assert_eq!(notice.remaining_ms(at(9000)), 0);
    }

    #[test]
    fn test_survives_session_round_trip() {
        let notice = TransientNotice::story_auth_required(at(0));
        let json = serde_json::to_string(&notice).unwrap();
        let back: TransientNotice = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ttl(), AUTH_NOTICE_TTL);
    }
}
