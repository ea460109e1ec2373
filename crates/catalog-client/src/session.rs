//! # Session Store
//!
//! Single source of truth for "who is logged in" and "what can they do".
//!
//! The store is a cheap-to-clone handle over shared state. It owns the
//! session invariant: the credential token and the current user record
//! are both present or both absent, never one without the other. Every
//! transition is mirrored into a [`SessionStorage`] so a restarted
//! process rehydrates the same session without re-authenticating; the
//! storage read happens synchronously inside [`SessionStore::open`], so
//! the first guard check never races the rehydration.
//!
//! Authentication failures are values, not panics or escaped errors:
//! `authenticate` and `register_account` return a [`SessionError`] whose
//! `Display` is the human-readable reason. Guards downstream only ever
//! see the boolean predicates.

use crate::error::ApiError;
use crate::transport::{ApiTransport, TokenSource, Verb};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Role tag that grants access to the backoffice.
pub const ADMIN_ROLE: &str = "admin";

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// Errors returned by session operations. Never escapes as a panic; the
/// message is suitable for direct display.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server rejected the credentials or the request failed.
    #[error("{0}")]
    Rejected(String),
    /// The server answered 2xx but the body was not the expected shape.
    #[error("malformed authentication response")]
    MalformedResponse,
}

impl From<ApiError> for SessionError {
    fn from(e: ApiError) -> Self {
        SessionError::Rejected(e.to_string())
    }
}

/// The authenticated user record, as persisted and as consumed by guards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// An established session: credential plus identity, always together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: CurrentUser,
}

/// Durable key-value storage backing the session across restarts.
///
/// Two entries are used: the opaque token and the serialized user
/// record. Writes never fail loudly; an implementation that cannot
/// persist logs and carries on, leaving the in-memory session intact.
pub trait SessionStorage: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory storage, for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// File-backed storage: one JSON object holding the key-value entries.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> HashMap<String, String> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(error = %e, path = %self.path.display(), "cannot create session dir");
                return;
            }
        }
        let raw = match serde_json::to_string_pretty(entries) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "cannot serialize session entries");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, raw) {
            warn!(error = %e, path = %self.path.display(), "cannot persist session");
        }
    }
}

impl SessionStorage for FileStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.load().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        let mut entries = self.load();
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.load();
        if entries.remove(key).is_some() {
            self.save(&entries);
        }
    }
}

struct StoreInner {
    storage: Box<dyn SessionStorage>,
    session: Mutex<Option<Session>>,
    notify: watch::Sender<Option<CurrentUser>>,
}

/// Cloneable handle to the session state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl SessionStore {
    /// Opens the store, synchronously rehydrating any persisted session.
    ///
    /// A partial persisted state (token without user, or the reverse)
    /// violates the session invariant and is discarded, clearing both
    /// entries.
    pub fn open(storage: impl SessionStorage + 'static) -> Self {
        let session = match (storage.read(TOKEN_KEY), storage.read(USER_KEY)) {
            (Some(token), Some(raw)) => match serde_json::from_str::<CurrentUser>(&raw) {
                Ok(user) => {
                    debug!(user = %user.name, "session rehydrated from storage");
                    Some(Session { token, user })
                }
                Err(e) => {
                    warn!(error = %e, "discarding unreadable persisted session");
                    storage.remove(TOKEN_KEY);
                    storage.remove(USER_KEY);
                    None
                }
            },
            (None, None) => None,
            _ => {
                warn!("discarding partial persisted session");
                storage.remove(TOKEN_KEY);
                storage.remove(USER_KEY);
                None
            }
        };

        let (notify, _) = watch::channel(session.as_ref().map(|s| s.user.clone()));
        Self {
            inner: Arc::new(StoreInner {
                storage: Box::new(storage),
                session: Mutex::new(session),
                notify,
            }),
        }
    }

    /// Sends credentials to the remote API and establishes the session
    /// on success: token and user land in memory and in durable storage.
    pub async fn authenticate(
        &self,
        transport: &dyn ApiTransport,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let body = json!({ "email": email, "password": password });
        let response = transport
            .request(Verb::Post, "/api/Usuarios/auth", Some(body))
            .await?;

        let token = response
            .get("jwt")
            .and_then(Value::as_str)
            .ok_or(SessionError::MalformedResponse)?
            .to_owned();
        let user: CurrentUser = response
            .get("user")
            .cloned()
            .ok_or(SessionError::MalformedResponse)
            .and_then(|v| serde_json::from_value(v).map_err(|_| SessionError::MalformedResponse))?;

        info!(user = %user.name, role = %user.role, "session established");
        self.install(Session { token, user });
        Ok(())
    }

    /// Creates a new account server-side. Does not establish a session.
    pub async fn register_account(
        &self,
        transport: &dyn ApiTransport,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let body = json!({ "nombre": name, "email": email, "password": password });
        transport
            .request(Verb::Post, "/api/Usuarios", Some(body))
            .await?;
        info!(%email, "account registered");
        Ok(())
    }

    /// Clears the session from memory and durable storage. Idempotent.
    pub fn end_session(&self) {
        let mut session = self.inner.session.lock().unwrap();
        if session.take().is_some() {
            info!("session ended");
        }
        drop(session);
        self.inner.storage.remove(TOKEN_KEY);
        self.inner.storage.remove(USER_KEY);
        self.inner.notify.send_replace(None);
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.lock().unwrap().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.inner
            .session
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.user.is_admin())
            .unwrap_or(false)
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.inner
            .session
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .session
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.token.clone())
    }

    /// Watch-channel receiver that yields the current user on every
    /// session transition. Guards and views read through it instead of
    /// duplicating session state.
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentUser>> {
        self.inner.notify.subscribe()
    }

    fn install(&self, session: Session) {
        self.inner.storage.write(TOKEN_KEY, &session.token);
        match serde_json::to_string(&session.user) {
            Ok(raw) => self.inner.storage.write(USER_KEY, &raw),
            Err(e) => warn!(error = %e, "cannot serialize user record"),
        }
        let user = session.user.clone();
        *self.inner.session.lock().unwrap() = Some(session);
        self.inner.notify.send_replace(Some(user));
    }
}

impl TokenSource for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use std::sync::Arc;

    fn auth_response() -> Value {
        json!({
            "jwt": "tok-123",
            "user": { "_id": "u1", "nombre": "Bulma", "email": "a@b.com", "role": "admin" }
        })
    }

    #[tokio::test]
    async fn authenticate_establishes_and_persists_session() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::open(SharedStorage(storage.clone()));
        let mock = MockTransport::new();
        mock.expect(Verb::Post, "/api/Usuarios/auth")
            .return_json(auth_response());

        store
            .authenticate(&mock, "a@b.com", "secret")
            .await
            .expect("authentication should succeed");

        assert!(store.is_authenticated());
        assert!(store.is_admin());
        assert_eq!(store.token().as_deref(), Some("tok-123"));
        assert_eq!(storage.read(TOKEN_KEY).as_deref(), Some("tok-123"));
        assert!(storage.read(USER_KEY).is_some());
        mock.verify();
    }

    #[tokio::test]
    async fn rehydrated_store_reproduces_authenticated_state() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let store = SessionStore::open(SharedStorage(storage.clone()));
            let mock = MockTransport::new();
            mock.expect(Verb::Post, "/api/Usuarios/auth")
                .return_json(auth_response());
            store.authenticate(&mock, "a@b.com", "secret").await.unwrap();
        }

        let fresh = SessionStore::open(SharedStorage(storage));
        assert!(fresh.is_authenticated());
        assert!(fresh.is_admin());
        assert_eq!(fresh.current_user().unwrap().name, "Bulma");
        assert_eq!(fresh.token().as_deref(), Some("tok-123"));
    }

    #[tokio::test]
    async fn end_session_clears_memory_and_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::open(SharedStorage(storage.clone()));
        let mock = MockTransport::new();
        mock.expect(Verb::Post, "/api/Usuarios/auth")
            .return_json(auth_response());
        store.authenticate(&mock, "a@b.com", "secret").await.unwrap();

        store.end_session();
        store.end_session(); // idempotent

        assert!(!store.is_authenticated());
        assert!(!store.is_admin());
        assert!(storage.read(TOKEN_KEY).is_none());
        assert!(storage.read(USER_KEY).is_none());
    }

    #[tokio::test]
    async fn rejected_credentials_surface_the_server_message() {
        let store = SessionStore::open(MemoryStorage::new());
        let mock = MockTransport::new();
        mock.expect(Verb::Post, "/api/Usuarios/auth")
            .return_error(401, "credenciales invalidas");

        let err = store
            .authenticate(&mock, "a@b.com", "nope")
            .await
            .expect_err("authentication should fail");
        assert_eq!(err.to_string(), "credenciales invalidas");
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn register_does_not_establish_a_session() {
        let store = SessionStore::open(MemoryStorage::new());
        let mock = MockTransport::new();
        mock.expect(Verb::Post, "/api/Usuarios")
            .return_json(json!({ "_id": "u2", "nombre": "Krilin" }));

        store
            .register_account(&mock, "Krilin", "k@b.com", "secreto")
            .await
            .unwrap();
        assert!(!store.is_authenticated());
        mock.verify();
    }

    #[test]
    fn partial_persisted_session_is_discarded() {
        let storage = Arc::new(MemoryStorage::new());
        storage.write(TOKEN_KEY, "orphan-token");

        let store = SessionStore::open(SharedStorage(storage.clone()));
        assert!(!store.is_authenticated());
        assert!(storage.read(TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn subscribe_observes_transitions() {
        let store = SessionStore::open(MemoryStorage::new());
        let rx = store.subscribe();
        assert!(rx.borrow().is_none());

        let mock = MockTransport::new();
        mock.expect(Verb::Post, "/api/Usuarios/auth")
            .return_json(auth_response());
        store.authenticate(&mock, "a@b.com", "secret").await.unwrap();
        assert_eq!(rx.borrow().as_ref().unwrap().name, "Bulma");

        store.end_session();
        assert!(rx.borrow().is_none());
    }

    /// Lets a test keep a handle on the storage the store owns.
    struct SharedStorage(Arc<MemoryStorage>);

    impl SessionStorage for SharedStorage {
        fn read(&self, key: &str) -> Option<String> {
            self.0.read(key)
        }
        fn write(&self, key: &str, value: &str) {
            self.0.write(key, value)
        }
        fn remove(&self, key: &str) {
            self.0.remove(key)
        }
    }
}
