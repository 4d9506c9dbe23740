//! Shared admin-role resolution.
//!
//! Every view asks the same gate whether the signed-in user is an admin. The
//! answer comes from `users/{uid}.admin` and is cached per uid, so a page
//! render reads the role document at most once.

use std::time::Duration;

use forever_core::{UserProfile, UserUid};
use moka::future::Cache;
use tracing::instrument;

use crate::firebase::{ContentStore, Document, RawDocument};

/// How long a resolved role is trusted.
pub const ROLE_TTL: Duration = Duration::from_secs(60);

/// Process-wide cache of admin flags keyed by uid.
#[derive(Clone)]
pub struct RoleGate {
    cache: Cache<UserUid, bool>,
}

impl Default for RoleGate {
    fn default() -> Self {
        Self::new(ROLE_TTL)
    }
}

impl RoleGate {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Whether `uid` holds the admin role.
    ///
    /// A missing role document or a missing flag means not admin. A failed
    /// read also answers `false` and is not cached.
    #[instrument(skip(self, store, token), fields(uid = %uid))]
    pub async fn is_admin<S: ContentStore>(
        &self,
        store: &S,
        uid: &UserUid,
        token: Option<&str>,
    ) -> bool {
        if let Some(admin) = self.cache.get(uid).await {
            return admin;
        }

        match store
            .get(UserProfile::COLLECTION, uid.as_str(), token)
            .await
        {
            Ok(doc) => {
                let admin = doc
                    .as_ref()
                    .is_some_and(|doc: &RawDocument| UserProfile::from_document(doc).admin);
                self.cache.insert(uid.clone(), admin).await;
                admin
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read role document");
                false
            }
        }
    }

    /// Record a role already known, e.g. right after the profile was written.
    pub async fn prime(&self, uid: &UserUid, admin: bool) {
        self.cache.insert(uid.clone(), admin).await;
    }

    /// Drop the cached role (sign-out, role change).
    pub async fn forget(&self, uid: &UserUid) {
        self.cache.invalidate(uid).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::firebase::Collection;
    use crate::firebase::memory::{DocumentOp, MemoryContentStore};
    use crate::firebase::values::{boolean, fields};

    fn store_with(uid: &str, admin: bool) -> MemoryContentStore {
        let store = MemoryContentStore::new();
        store.insert(Collection::Users, uid, fields([("admin", boolean(admin))]));
        store
    }

    #[tokio::test]
    async fn test_admin_flag_is_read_from_role_document() {
        let store = store_with("u-1", true);
        let gate = RoleGate::default();
        assert!(gate.is_admin(&store, &UserUid::from("u-1"), None).await);
        assert!(!gate.is_admin(&store, &UserUid::from("u-2"), None).await);
    }

    #[tokio::test]
    async fn test_cached_role_survives_store_failure() {
        let store = store_with("u-1", true);
        let gate = RoleGate::default();
        let uid = UserUid::from("u-1");
        assert!(gate.is_admin(&store, &uid, None).await);

        store.fail(Collection::Users, DocumentOp::Get);
        assert!(gate.is_admin(&store, &uid, None).await);

        gate.forget(&uid).await;
        assert!(!gate.is_admin(&store, &uid, None).await);
    }

    #[tokio::test]
    async fn test_failed_read_answers_false_until_primed() {
        let store = MemoryContentStore::new();
        store.fail(Collection::Users, DocumentOp::Get);
        let gate = RoleGate::default();
        let uid = UserUid::from("u-1");
        assert!(!gate.is_admin(&store, &uid, None).await);

        gate.prime(&uid, true).await;
        assert!(gate.is_admin(&store, &uid, None).await);
    }
}
