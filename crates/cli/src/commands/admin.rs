//! Admin role management.
//!
//! The site never writes the role flag; it only reads `users/{uid}.admin`.
//! This command signs in as a maintainer account and patches that flag, so
//! the project's security rules must let the maintainer write it.
//!
//! # Usage
//!
//! ```bash
//! forever-cli admin grant --uid <uid>
//! forever-cli admin revoke --uid <uid>
//! ```
//!
//! # Environment Variables
//!
//! - `FIREBASE_API_KEY`, `FIREBASE_PROJECT_ID`, `FIREBASE_STORAGE_BUCKET`
//! - `FOREVER_CLI_EMAIL` - Maintainer account email
//! - `FOREVER_CLI_PASSWORD` - Maintainer account password

use forever_core::UserProfile;
use forever_site::config::ConfigError;
use forever_site::firebase::values::{boolean, fields};
use forever_site::firebase::{
    ContentStore, Document, FirebaseError, FirestoreClient, IdentityClient, IdentityProvider,
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors that can occur while changing a role.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Firebase settings are incomplete.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The uid is empty.
    #[error("Invalid uid: {0:?}")]
    InvalidUid(String),

    /// There is no role document for the uid.
    #[error("No user document for uid {0}; the user must sign in once first")]
    UnknownUser(String),

    /// Sign-in or the Firestore write failed.
    #[error("Firebase error: {0}")]
    Firebase(#[from] FirebaseError),
}

fn required(key: &'static str) -> Result<String, AdminError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(AdminError::MissingEnvVar(key))
}

/// Set `users/{uid}.admin`.
///
/// # Errors
///
/// Returns an error if the maintainer cannot sign in, the user has no role
/// document or the write is rejected.
pub async fn set_role(uid: &str, admin: bool) -> Result<(), AdminError> {
    let uid = uid.trim();
    if uid.is_empty() {
        return Err(AdminError::InvalidUid(uid.to_owned()));
    }

    let (client, config) = super::firebase()?;
    let email = required("FOREVER_CLI_EMAIL")?;
    let password = SecretString::from(required("FOREVER_CLI_PASSWORD")?);

    let identity = IdentityClient::new(client.clone(), &config);
    let firestore = FirestoreClient::new(client, &config);

    tracing::info!("Signing in as {email}...");
    let session = identity
        .sign_in_with_password(&email, password.expose_secret())
        .await?;

    match firestore
        .update(
            UserProfile::COLLECTION,
            uid,
            fields([("admin", boolean(admin))]),
            Some(&session.id_token),
        )
        .await
    {
        Ok(()) => {
            tracing::info!(
                "{} admin role for {uid}",
                if admin { "Granted" } else { "Revoked" }
            );
            tracing::warn!("Running sites keep a cached role for up to a minute.");
            Ok(())
        }
        Err(e) if e.is_not_found() => Err(AdminError::UnknownUser(uid.to_owned())),
        Err(e) => Err(e.into()),
    }
}
