//! Everything a console front end needs, wired from one [`ClientConfig`]

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{
    CloudAccountsApi, CloudProvidersApi, DatabaseConfigsApi, HistoryApi, K8sConfigsApi, MenusApi,
    NamespacesApi, NodesApi, PodsApi, RolesApi, ServerConfigsApi, ToolsApi, UsersApi,
    WorkloadsApi,
};
use crate::config::ClientConfig;
use crate::guard::{filter_routes, GuardDecision, NavigationGuard, RouteRecord};
use crate::notify::Notifier;
use crate::prefs::Preferences;
use crate::session::SessionController;
use crate::store::{KeyValueStore, MemoryStore, SqliteStore, TokenStore};
use crate::transport::Transport;

pub struct Console {
    config: ClientConfig,
    session: SessionController,
    guard: NavigationGuard,
    prefs: Preferences,
}

impl Console {
    /// Open the durable store named by the config and restore the session
    pub fn from_config(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match config.storage.resolved_path() {
            Some(path) => Arc::new(
                SqliteStore::open(&path)
                    .with_context(|| format!("Failed to open storage at {}", path.display()))?,
            ),
            None => {
                tracing::warn!("No config directory; credentials will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };
        Self::with_store(config, store, notifier)
    }

    pub fn with_store(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let transport = Transport::new(&config.api, notifier)?;
        let session = SessionController::new(transport, TokenStore::new(Arc::clone(&store)));
        let guard = NavigationGuard::new(config.navigation.clone());
        let prefs = Preferences::new(store);

        tracing::debug!(base_url = %config.api.base_url, "console ready");

        Ok(Self {
            config,
            session,
            guard,
            prefs,
        })
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub const fn session(&self) -> &SessionController {
        &self.session
    }

    pub const fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    pub const fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    /// Decide a route transition against the current session
    pub async fn navigate(&self, target: &str) -> GuardDecision {
        self.guard.check(&self.session, target).await
    }

    /// Part of `routes` the signed-in user may see; public routes only when
    /// no profile is cached
    pub async fn visible_routes(&self, routes: &[RouteRecord]) -> Vec<RouteRecord> {
        let roles = self
            .session
            .cached_user()
            .await
            .map(|user| user.role_codes())
            .unwrap_or_default();
        filter_routes(routes, &roles)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(&self.session)
    }

    pub fn roles(&self) -> RolesApi<'_> {
        RolesApi::new(&self.session)
    }

    pub fn menus(&self) -> MenusApi<'_> {
        MenusApi::new(&self.session)
    }

    pub fn cloud_accounts(&self) -> CloudAccountsApi<'_> {
        CloudAccountsApi::new(&self.session)
    }

    pub fn cloud_providers(&self) -> CloudProvidersApi<'_> {
        CloudProvidersApi::new(&self.session)
    }

    pub fn database_configs(&self) -> DatabaseConfigsApi<'_> {
        DatabaseConfigsApi::new(&self.session)
    }

    pub fn server_configs(&self) -> ServerConfigsApi<'_> {
        ServerConfigsApi::new(&self.session)
    }

    pub fn k8s_configs(&self) -> K8sConfigsApi<'_> {
        K8sConfigsApi::new(&self.session)
    }

    pub fn workloads(&self) -> WorkloadsApi<'_> {
        WorkloadsApi::new(&self.session)
    }

    pub fn pods(&self) -> PodsApi<'_> {
        PodsApi::new(&self.session)
    }

    pub fn nodes(&self) -> NodesApi<'_> {
        NodesApi::new(&self.session)
    }

    pub fn namespaces(&self) -> NamespacesApi<'_> {
        NamespacesApi::new(&self.session)
    }

    pub fn history(&self) -> HistoryApi<'_> {
        HistoryApi::new(&self.session)
    }

    pub fn tools(&self) -> ToolsApi<'_> {
        ToolsApi::new(&self.session)
    }
}
