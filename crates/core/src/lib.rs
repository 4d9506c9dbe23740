//! Forever Core - records and view logic for the memorial site.
//!
//! This crate provides the types and pure logic shared by all Forever
//! components:
//! - `site` - The public memorial site
//! - `cli` - Command-line tools for role management and feed inspection
//!
//! # Architecture
//!
//! The core crate contains only types and state machines - no I/O, no HTTP
//! clients, no clocks. Callers pass the current time and the signals they
//! observed, which keeps every rule here testable without a browser.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails and tribute icons
//! - [`records`] - Tributes, stories, photos, user profiles and their drafts
//! - [`feed`] - Sorting and slicing of the tribute and story feeds
//! - [`preview`] - Body truncation and expand state
//! - [`slideshow`] - Slideshow index
//! - [`layout`] - Small-screen and offline classification
//! - [`gallery`] - Photo feed with selection
//! - [`notice`] - Self-expiring messages
//! - [`storage`] - Object naming for gallery images
//! - [`dates`] - Record timestamp formatting and parsing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod dates;
pub mod feed;
pub mod gallery;
pub mod layout;
pub mod notice;
pub mod preview;
pub mod records;
pub mod slideshow;
pub mod storage;
pub mod types;

pub use feed::{FeedState, RecentStories};
pub use gallery::Gallery;
pub use layout::{Connectivity, LayoutResponder, LayoutState};
pub use notice::TransientNotice;
pub use records::{Photo, PhotoUpload, RecordError, Story, StoryDraft, Tribute, TributeDraft, UserProfile};
pub use slideshow::Slideshow;
pub use types::*;
