//! CLI command implementations.

pub mod admin;
pub mod feed;

use forever_site::config::{ConfigError, FirebaseConfig};

/// Firebase settings plus a plain HTTP client.
fn firebase() -> Result<(reqwest::Client, FirebaseConfig), ConfigError> {
    dotenvy::dotenv().ok();
    Ok((reqwest::Client::new(), FirebaseConfig::from_env()?))
}
