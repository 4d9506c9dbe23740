//! In-memory backends for tests and local runs without a Firebase project.
//!
//! Each store can be told to fail a given operation, which is how the
//! compensation and failure paths of the services are exercised.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{TimeDelta, Utc};
use forever_core::{DocumentId, UserUid};

use super::{
    AuthSession, Collection, ContentStore, FirebaseError, IdentityProvider, ObjectStore,
    RawDocument, values::Fields,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected(operation: &str) -> FirebaseError {
    FirebaseError::Api {
        status: 503,
        message: format!("injected failure: {operation}"),
    }
}

/// Document operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentOp {
    List,
    Get,
    Create,
    Set,
    Update,
    Delete,
}

/// A document database held in memory, listing in insertion order.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    collections: Mutex<HashMap<Collection, Vec<(DocumentId, Fields)>>>,
    failing: Mutex<HashSet<(Collection, DocumentOp)>>,
    next_id: Mutex<u64>,
}

impl MemoryContentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `op` on `collection` fail from now on.
    pub fn fail(&self, collection: Collection, op: DocumentOp) {
        lock(&self.failing).insert((collection, op));
    }

    /// Seed a document with a known id.
    pub fn insert(&self, collection: Collection, id: &str, fields: Fields) {
        let mut collections = lock(&self.collections);
        let docs = collections.entry(collection).or_default();
        docs.retain(|(existing, _)| existing.as_str() != id);
        docs.push((DocumentId::new(id), fields));
    }

    /// Fields of one document.
    #[must_use]
    pub fn fields(&self, collection: Collection, id: &str) -> Option<Fields> {
        lock(&self.collections)
            .get(&collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id.as_str() == id))
            .map(|(_, fields)| fields.clone())
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn count(&self, collection: Collection) -> usize {
        lock(&self.collections).get(&collection).map_or(0, Vec::len)
    }

    fn check(&self, collection: Collection, op: DocumentOp) -> Result<(), FirebaseError> {
        if lock(&self.failing).contains(&(collection, op)) {
            return Err(injected(&format!("{op:?} {collection}")));
        }
        Ok(())
    }
}

impl ContentStore for MemoryContentStore {
    async fn list(&self, collection: Collection) -> Result<Vec<RawDocument>, FirebaseError> {
        self.check(collection, DocumentOp::List)?;
        Ok(lock(&self.collections)
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| RawDocument::new(collection, id, fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(
        &self,
        collection: Collection,
        id: &str,
        _token: Option<&str>,
    ) -> Result<Option<RawDocument>, FirebaseError> {
        self.check(collection, DocumentOp::Get)?;
        Ok(self
            .fields(collection, id)
            .map(|fields| RawDocument::new(collection, &DocumentId::new(id), fields)))
    }

    async fn create(
        &self,
        collection: Collection,
        fields: Fields,
        _token: Option<&str>,
    ) -> Result<DocumentId, FirebaseError> {
        self.check(collection, DocumentOp::Create)?;
        let id = {
            let mut next = lock(&self.next_id);
            *next += 1;
            DocumentId::new(format!("doc-{next}"))
        };
        lock(&self.collections)
            .entry(collection)
            .or_default()
            .push((id.clone(), fields));
        Ok(id)
    }

    async fn set(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
        _token: Option<&str>,
    ) -> Result<(), FirebaseError> {
        self.check(collection, DocumentOp::Set)?;
        self.insert(collection, id, fields);
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
        _token: Option<&str>,
    ) -> Result<(), FirebaseError> {
        self.check(collection, DocumentOp::Update)?;
        let mut collections = lock(&self.collections);
        let existing = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| doc_id.as_str() == id))
            .ok_or_else(|| FirebaseError::Api {
                status: 404,
                message: format!("NOT_FOUND: {collection}/{id}"),
            })?;
        existing.1.extend(fields);
        Ok(())
    }

    async fn delete(
        &self,
        collection: Collection,
        id: &str,
        _token: Option<&str>,
    ) -> Result<(), FirebaseError> {
        self.check(collection, DocumentOp::Delete)?;
        if let Some(docs) = lock(&self.collections).get_mut(&collection) {
            docs.retain(|(doc_id, _)| doc_id.as_str() != id);
        }
        Ok(())
    }
}

/// Object operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectOp {
    Upload,
    DownloadUrl,
    Delete,
}

/// An object bucket held in memory.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, (String, Vec<u8>)>>,
    failing: Mutex<HashSet<ObjectOp>>,
}

impl MemoryObjectStore {
    /// Public URL prefix of every object.
    pub const BASE_URL: &'static str = "https://storage.test/v0/b/forever.test/o";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `op` fail from now on.
    pub fn fail(&self, op: ObjectOp) {
        lock(&self.failing).insert(op);
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        lock(&self.objects).contains_key(path)
    }

    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        lock(&self.objects).keys().cloned().collect()
    }

    /// The URL `download_url` hands out for `path`.
    #[must_use]
    pub fn url_for(path: &str) -> String {
        format!(
            "{}/{}?alt=media&token=memory",
            Self::BASE_URL,
            urlencoding::encode(path)
        )
    }

    fn check(&self, op: ObjectOp) -> Result<(), FirebaseError> {
        if lock(&self.failing).contains(&op) {
            return Err(injected(&format!("{op:?}")));
        }
        Ok(())
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
        _token: Option<&str>,
    ) -> Result<(), FirebaseError> {
        self.check(ObjectOp::Upload)?;
        lock(&self.objects).insert(path.to_string(), (content_type.to_string(), bytes));
        Ok(())
    }

    async fn download_url(&self, path: &str, _token: Option<&str>) -> Result<String, FirebaseError> {
        self.check(ObjectOp::DownloadUrl)?;
        if !self.contains(path) {
            return Err(FirebaseError::Api {
                status: 404,
                message: format!("object {path} does not exist"),
            });
        }
        Ok(Self::url_for(path))
    }

    async fn delete(&self, path: &str, _token: Option<&str>) -> Result<(), FirebaseError> {
        self.check(ObjectOp::Delete)?;
        lock(&self.objects)
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| FirebaseError::Api {
                status: 404,
                message: format!("object {path} does not exist"),
            })
    }
}

/// Password and Google accounts held in memory.
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    /// email -> (password, uid)
    accounts: Mutex<HashMap<String, (String, UserUid)>>,
}

impl MemoryIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn session(uid: UserUid, email: Option<String>) -> AuthSession {
        AuthSession {
            id_token: format!("id-{uid}"),
            refresh_token: format!("refresh-{uid}"),
            uid,
            email,
            expires_at: Utc::now() + TimeDelta::hours(1),
        }
    }
}

impl IdentityProvider for MemoryIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, FirebaseError> {
        let mut accounts = lock(&self.accounts);
        if accounts.contains_key(email) {
            return Err(FirebaseError::Api {
                status: 400,
                message: "EMAIL_EXISTS".to_string(),
            });
        }
        let uid = UserUid::new(format!("uid-{}", accounts.len() + 1));
        accounts.insert(email.to_string(), (password.to_string(), uid.clone()));
        Ok(Self::session(uid, Some(email.to_string())))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, FirebaseError> {
        match lock(&self.accounts).get(email) {
            Some((stored, uid)) if stored == password => {
                Ok(Self::session(uid.clone(), Some(email.to_string())))
            }
            _ => Err(FirebaseError::Api {
                status: 400,
                message: "INVALID_LOGIN_CREDENTIALS".to_string(),
            }),
        }
    }

    async fn sign_in_with_google(
        &self,
        google_id_token: &str,
        _request_uri: &str,
    ) -> Result<AuthSession, FirebaseError> {
        if google_id_token.is_empty() {
            return Err(FirebaseError::Api {
                status: 400,
                message: "INVALID_IDP_RESPONSE".to_string(),
            });
        }
        Ok(Self::session(
            UserUid::new(format!("google-{google_id_token}")),
            Some(format!("{google_id_token}@gmail.test")),
        ))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, FirebaseError> {
        let uid = refresh_token
            .strip_prefix("refresh-")
            .ok_or_else(|| FirebaseError::Api {
                status: 400,
                message: "INVALID_REFRESH_TOKEN".to_string(),
            })?;
        Ok(Self::session(UserUid::new(uid), None))
    }
}
