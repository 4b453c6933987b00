//! Durable client-side key/value storage
//!
//! [`SqliteStore`] keeps values in ~/.config/eden-console/storage.db;
//! [`MemoryStore`] is the ephemeral variant. [`TokenStore`] sits on top of
//! either and owns the fixed keys for the credential and the cached profile.
//!
//! Storage failures never propagate: reads degrade to absent and writes are
//! fire-and-forget with a logged warning.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use eden_console_protocol::User;
use rusqlite::{params, Connection};

use crate::credential::Credential;

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Key holding the cached user profile as JSON
pub const USER_INFO_KEY: &str = "eden-user";

/// Minimal string key/value area
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Storage backed by `SQLite`
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create or open the storage database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create storage directory")?;
        }

        let conn = Connection::open(path).context("Failed to open storage database")?;
        Self::from_connection(conn)
    }

    /// Storage that lives only as long as the process
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("storage connection poisoned"))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        match conn.query_row("SELECT value FROM storage WHERE key = ?", [key], |row| {
            row.get(0)
        }) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO storage (key, value, updated_at)
             VALUES (?, ?, strftime('%s', 'now'))",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM storage WHERE key = ?", [key])?;
        Ok(())
    }
}

/// Process-local storage
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values()?.remove(key);
        Ok(())
    }
}

/// Passive persistence of the credential and the cached profile.
///
/// Holds no business rules; the session controller decides when to call it.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store backed by a fresh [`MemoryStore`]
    pub fn ephemeral() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Underlying key/value area, shared with the UI preferences
    pub fn backend(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.backend)
    }

    pub fn save(&self, credential: &Credential) {
        self.write(TOKEN_KEY, credential.expose());
    }

    pub fn load(&self) -> Option<Credential> {
        self.read(TOKEN_KEY).and_then(Credential::new)
    }

    pub fn clear(&self) {
        self.delete(TOKEN_KEY);
    }

    pub fn save_profile(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(json) => self.write(USER_INFO_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "Failed to encode user profile"),
        }
    }

    /// Cached profile; an unparsable entry reads as absent
    pub fn load_profile(&self) -> Option<User> {
        let raw = self.read(USER_INFO_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable cached profile");
                None
            }
        }
    }

    pub fn clear_profile(&self) {
        self.delete(USER_INFO_KEY);
    }

    /// Drop both the credential and the cached profile
    pub fn clear_all(&self) {
        self.clear();
        self.clear_profile();
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Storage read failed");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.set(key, value) {
            tracing::warn!(key, error = %e, "Storage write failed");
        }
    }

    fn delete(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            tracing::warn!(key, error = %e, "Storage delete failed");
        }
    }
}
