//! Session models for the memorial site.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
