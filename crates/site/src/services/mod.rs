//! Business logic services for the memorial site.
//!
//! # Services
//!
//! - `feeds` - One-shot feed fetches per view, slideshow photo cache
//! - `submissions` - Tribute, story and photo writes; photo deletion
//! - `accounts` - Password and Google sign-in, token refresh
//! - `role_gate` - Shared, cached admin-role resolution
//!
//! Every service is generic over the backend traits in [`crate::firebase`].

pub mod accounts;
pub mod feeds;
pub mod role_gate;
pub mod submissions;

pub use role_gate::RoleGate;
