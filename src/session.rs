//! Session - the auth token and the logged-in flag
//!
//! One `Session` per process, shared as `Arc<Session>`. Only `login`
//! (via `Session::store_token`) and `logout` write it; everything else
//! reads the token or subscribes to `logged_in`.
//!
//! The token is persisted by a `TokenStore` so it survives restarts and is
//! cleared only by an explicit logout.

use crate::observable::Observable;
use crate::router::{Navigator, Params, Router};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::sync::watch;

/// File name of the persisted token inside the config directory
pub const TOKEN_FILE: &str = "auth_token";

/// Persistent storage for the auth token
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Token stored as a single file, e.g. ~/.config/medium/auth_token
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.path, token)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict {}", self.path.display()))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

/// In-memory token store for tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryTokenStore {
    token: std::sync::Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: std::sync::Mutex::new(Some(token.to_string())),
        }
    }
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().unwrap().clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}

pub struct Session {
    store: Box<dyn TokenStore>,
    logged_in: Observable<bool>,
}

impl Session {
    /// Create a session; `logged_in` starts true if a token is already stored
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        let has_token = match store.load() {
            Ok(token) => token.is_some(),
            Err(e) => {
                tracing::warn!("Could not read stored auth token: {:#}", e);
                false
            }
        };

        Self {
            store,
            logged_in: Observable::new(has_token),
        }
    }

    /// Current token, read from the store on every call
    pub fn token(&self) -> Option<String> {
        match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Could not read stored auth token: {:#}", e);
                None
            }
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.logged_in.subscribe()
    }

    /// Persist a freshly issued token and flip `logged_in`
    pub(crate) fn store_token(&self, token: &str) -> Result<()> {
        self.store.save(token)?;
        self.logged_in.set_if_changed(true);
        tracing::info!("Logged in");
        Ok(())
    }

    /// Clear the token, flip `logged_in` and navigate to the login route
    ///
    /// Requests already in flight keep the token they were sent with.
    pub fn logout(&self, router: &Router, navigator: &mut dyn Navigator) -> Result<()> {
        self.store.clear()?;
        self.logged_in.set_if_changed(false);
        tracing::info!("Logged out");

        let url = router.nav_url("login", &Params::new(), &Params::new())?;
        navigator.navigate(url);
        Ok(())
    }
}

/// Default token location: ~/.config/medium/auth_token
pub fn default_token_path() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".config").join("medium"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(TOKEN_FILE)
}
