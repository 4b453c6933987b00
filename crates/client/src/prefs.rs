//! Persisted UI preferences

use std::sync::Arc;

use crate::store::KeyValueStore;

pub const SIDEBAR_KEY: &str = "sidebarStatus";
pub const THEME_KEY: &str = "theme";
pub const DEFAULT_THEME: &str = "default";

/// Sidebar status and theme, stored next to the credential
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Open unless explicitly stored as closed
    pub fn sidebar_opened(&self) -> bool {
        self.read(SIDEBAR_KEY).as_deref() != Some("0")
    }

    /// Flip the sidebar and return the new state
    pub fn toggle_sidebar(&self) -> bool {
        let opened = !self.sidebar_opened();
        self.write(SIDEBAR_KEY, if opened { "1" } else { "0" });
        opened
    }

    pub fn close_sidebar(&self) {
        self.write(SIDEBAR_KEY, "0");
    }

    pub fn theme(&self) -> String {
        self.read(THEME_KEY)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_THEME.to_string())
    }

    pub fn set_theme(&self, theme: &str) {
        self.write(THEME_KEY, theme);
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Failed to read preference");
            None
        })
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(key, error = %e, "Failed to save preference");
        }
    }
}
