//! Session credentials.
//! - Access token lives under the key `access_token`, refresh token under `refresh_token`
//! - Stores are injected into [`crate::http::ApiClient`]; nothing reads a global
//! - Written at login/refresh, cleared at logout
use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Source of the bearer credential. Read synchronously at request-build time.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> SessionState;
    fn store(&self, state: SessionState) -> Result<()>;

    fn access_token(&self) -> Option<String> {
        self.load().access_token.filter(|t| !t.is_empty())
    }

    fn has_token(&self) -> bool {
        self.access_token().is_some()
    }

    fn set_access_token(&self, token: String) -> Result<()> {
        let mut s = self.load();
        s.access_token = Some(token);
        self.store(s)
    }

    fn clear(&self) -> Result<()> {
        self.store(SessionState::default())
    }
}

/// Process-local store. Good for tests and short-lived embedders.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    state: Arc<RwLock<SessionState>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::default();
        if let Ok(mut s) = store.state.write() {
            s.access_token = Some(token.into());
        }
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> SessionState {
        self.state.read().map(|s| s.clone()).unwrap_or_default()
    }

    fn store(&self, state: SessionState) -> Result<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| ApiError::Storage("session lock poisoned".into()))?;
        *guard = state;
        Ok(())
    }
}

/// JSON file store, single writer. The file is rewritten on every change and
/// removed on logout.
pub struct FileTokenStore {
    path: PathBuf,
    cache: RwLock<SessionState>,
}

impl FileTokenStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("[session] Ignoring unreadable session file {}: {}", path.display(), e);
                SessionState::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionState::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            cache: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> SessionState {
        self.cache.read().map(|s| s.clone()).unwrap_or_default()
    }

    fn store(&self, state: SessionState) -> Result<()> {
        if state == SessionState::default() {
            match std::fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        } else {
            if let Some(dir) = self.path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(&self.path, serde_json::to_vec_pretty(&state)?)?;
        }
        let mut guard = self
            .cache
            .write()
            .map_err(|_| ApiError::Storage("session lock poisoned".into()))?;
        *guard = state;
        Ok(())
    }
}

/// Pull `access_token` / `refresh_token` out of a login or refresh response.
/// Keys that are absent leave the stored value untouched.
pub fn absorb_tokens(store: &dyn TokenStore, response: &Value) -> Result<bool> {
    let access = response[ACCESS_TOKEN_KEY].as_str().filter(|t| !t.is_empty());
    let refresh = response[REFRESH_TOKEN_KEY].as_str().filter(|t| !t.is_empty());
    if access.is_none() && refresh.is_none() {
        return Ok(false);
    }
    let mut state = store.load();
    if let Some(t) = access {
        state.access_token = Some(t.to_string());
    }
    if let Some(t) = refresh {
        state.refresh_token = Some(t.to_string());
    }
    store.store(state)?;
    log::debug!("[session] tokens updated");
    Ok(true)
}
