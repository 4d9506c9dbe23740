//! Core types for the memorial site.
//!
//! This module provides type-safe wrappers for the identifiers and small
//! value types that appear in the remote documents.

pub mod email;
pub mod icon;
pub mod id;

pub use email::{Email, EmailError};
pub use icon::TributeIcon;
pub use id::*;
