//! Integration tests for Forever.
//!
//! The scenarios in `tests/` drive the site's services end to end against the
//! in-memory Firebase backends, so they need no network and no project.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p forever-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `tributes` - Admin tributes and feed order
//! - `stories` - Signed-in and signed-out story submission
//! - `gallery` - Photo upload, compensation and deletion
//! - `accounts` - Registration, login and the role gate
//! - `content` - The shipped markdown content

use chrono::{DateTime, TimeZone, Utc};
use forever_site::firebase::memory::MemoryContentStore;
use forever_site::firebase::{Document, Fields};

/// A fixed clock for records written by the scenarios.
///
/// # Panics
///
/// Never; the timestamp is valid.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 18, hour, 0, 0).unwrap()
}

/// Seed `record` under `id` in its collection.
pub fn seed<D: Document>(store: &MemoryContentStore, id: &str, record: &D) {
    let fields: Fields = record.to_fields();
    store.insert(D::COLLECTION, id, fields);
}
