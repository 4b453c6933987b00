//! Navigation guard and role-based route filtering

use eden_console_protocol::ADMIN_ROLE;
use serde::{Deserialize, Serialize};

use crate::config::NavigationConfig;
use crate::session::SessionView;

/// Outcome of one navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Carries the originally requested path
    RedirectToLogin(String),
    RedirectToHome,
}

/// Result of the synchronous part of the rule table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Decided(GuardDecision),
    /// Credential held but no profile cached; the profile fetch decides
    NeedProfile,
}

/// Route without its query string and fragment
fn route_of(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    let route = &target[..end];
    if route.is_empty() {
        "/"
    } else {
        route
    }
}

/// Apply the rule table to a navigation target
pub fn evaluate(
    target: &str,
    has_credential: bool,
    has_cached_profile: bool,
    config: &NavigationConfig,
) -> Verdict {
    let route = route_of(target);

    if has_credential {
        if route == config.login_path {
            return Verdict::Decided(GuardDecision::RedirectToHome);
        }
        if has_cached_profile {
            return Verdict::Decided(GuardDecision::Allow);
        }
        return Verdict::NeedProfile;
    }

    if route == config.login_path || config.allow_list.iter().any(|p| p == route) {
        Verdict::Decided(GuardDecision::Allow)
    } else {
        Verdict::Decided(GuardDecision::RedirectToLogin(target.to_string()))
    }
}

/// Decides every route transition against the session
#[derive(Debug, Clone, Default)]
pub struct NavigationGuard {
    config: NavigationConfig,
}

impl NavigationGuard {
    pub const fn new(config: NavigationConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub async fn check<S: SessionView + ?Sized>(&self, session: &S, target: &str) -> GuardDecision {
        let verdict = evaluate(
            target,
            session.has_credential().await,
            session.has_cached_profile().await,
            &self.config,
        );

        let decision = match verdict {
            Verdict::Decided(decision) => decision,
            Verdict::NeedProfile => match session.fetch_profile().await {
                Ok(_) => GuardDecision::Allow,
                Err(e) => {
                    tracing::warn!(target_path = target, error = %e, "profile fetch failed during navigation");
                    GuardDecision::RedirectToLogin(target.to_string())
                }
            },
        };

        tracing::debug!(target_path = target, decision = ?decision, "navigation checked");
        decision
    }

    /// Location the router should go to, `None` when the transition proceeds
    pub fn location(&self, decision: &GuardDecision) -> Option<String> {
        match decision {
            GuardDecision::Allow => None,
            GuardDecision::RedirectToHome => Some(self.config.home_path.clone()),
            GuardDecision::RedirectToLogin(target) => Some(format!(
                "{}?redirect={}",
                self.config.login_path,
                urlencoding::encode(target)
            )),
        }
    }
}

/// Node of the application route tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteRecord {
    pub path: String,
    pub name: String,
    /// Roles allowed to see the route; `None` means everyone
    pub roles: Option<Vec<String>>,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn roles(mut self, roles: &[&str]) -> Self {
        self.roles = Some(roles.iter().map(ToString::to_string).collect());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    fn permits(&self, roles: &[String]) -> bool {
        self.roles
            .as_ref()
            .map_or(true, |required| required.iter().any(|r| roles.contains(r)))
    }
}

/// Routes visible to a holder of `roles`
pub fn filter_routes(routes: &[RouteRecord], roles: &[String]) -> Vec<RouteRecord> {
    if roles.iter().any(|r| r == ADMIN_ROLE) {
        return routes.to_vec();
    }

    routes
        .iter()
        .filter(|route| route.permits(roles))
        .map(|route| RouteRecord {
            children: filter_routes(&route.children, roles),
            ..route.clone()
        })
        .collect()
}
