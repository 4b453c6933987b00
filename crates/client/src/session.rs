//! Session controller
//!
//! Owns the credential and the cached user profile. Every backend call made on
//! behalf of the signed-in user goes through [`SessionController::request`],
//! so a rejected token anywhere tears the session down in one place.
//!
//! State machine:
//!
//! ```text
//! Anonymous --login--> Authenticating --ok--> Authenticated
//!                            |                     |
//!                          error        logout / 401 (via Expired)
//!                            v                     v
//!                        Anonymous             Anonymous
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use eden_console_protocol::{LoginRequest, LoginResponse, ResponseEnvelope, User};
use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, RwLock};

use crate::credential::Credential;
use crate::error::{RequestError, Result};
use crate::store::TokenStore;
use crate::transport::{ApiRequest, Transport};

pub const LOGIN_PATH: &str = "/api/v1/login";
pub const LOGOUT_PATH: &str = "/api/v1/logout";
pub const USER_INFO_PATH: &str = "/api/v1/users/info";

/// Lifecycle of the signed-in identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated,
    /// Token rejected by the server; cleared to `Anonymous` right after
    Expired,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::Expired => "expired",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    credential: Option<Credential>,
    user: Option<User>,
}

/// What the navigation guard needs to know about the session
#[async_trait]
pub trait SessionView: Send + Sync {
    async fn has_credential(&self) -> bool;
    async fn has_cached_profile(&self) -> bool;
    /// Load the profile of the current credential
    async fn fetch_profile(&self) -> Result<User>;
}

pub struct SessionController {
    transport: Transport,
    store: TokenStore,
    inner: RwLock<SessionInner>,
    events: broadcast::Sender<SessionState>,
    epoch: AtomicU64,
}

impl SessionController {
    /// Restore the persisted credential, if any.
    ///
    /// The cached profile is not restored so the first guarded navigation
    /// revalidates the token with the server.
    pub fn new(transport: Transport, store: TokenStore) -> Self {
        let credential = store.load();
        let state = if credential.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        store.clear_profile();

        tracing::debug!(state = %state, "session restored");

        let (events, _) = broadcast::channel(16);
        Self {
            transport,
            store,
            inner: RwLock::new(SessionInner {
                state,
                credential,
                user: None,
            }),
            events,
            epoch: AtomicU64::new(0),
        }
    }

    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    pub const fn store(&self) -> &TokenStore {
        &self.store
    }

    pub async fn state(&self) -> SessionState {
        self.inner.read().await.state
    }

    pub async fn credential(&self) -> Option<Credential> {
        self.inner.read().await.credential.clone()
    }

    pub async fn cached_user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.credential.is_some()
    }

    /// Receive every state transition from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionState> {
        self.events.subscribe()
    }

    /// Incremented whenever the held identity changes. A response issued under
    /// an older epoch belongs to an identity that is gone.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Sign in with a username and an already hashed password
    pub async fn login(&self, username: &str, password_digest: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() || password_digest.is_empty() {
            return Err(self.reject(RequestError::Validation(
                "username and password are required".to_string(),
            )));
        }

        let snapshot = {
            let mut inner = self.inner.write().await;
            inner.state = SessionState::Authenticating;
            inner.credential.clone()
        };
        self.emit(SessionState::Authenticating);
        tracing::info!(username, "signing in");

        let outcome = self
            .login_request(username, password_digest, snapshot.as_ref())
            .await;

        match outcome {
            Ok((credential, user)) => {
                self.store.save(&credential);
                self.store.save_profile(&user);
                {
                    let mut inner = self.inner.write().await;
                    inner.state = SessionState::Authenticated;
                    inner.credential = Some(credential);
                    inner.user = Some(user.clone());
                }
                self.epoch.fetch_add(1, Ordering::SeqCst);
                self.emit(SessionState::Authenticated);
                tracing::info!(user_id = user.id, "signed in");
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-in failed");
                self.clear_local(false).await;
                Err(e)
            }
        }
    }

    async fn login_request(
        &self,
        username: &str,
        password_digest: &str,
        snapshot: Option<&Credential>,
    ) -> Result<(Credential, User)> {
        let request = ApiRequest::post(LOGIN_PATH).json(&LoginRequest {
            username: username.to_string(),
            password: password_digest.to_string(),
        })?;
        let reply: LoginResponse = payload(self.transport.send(&request, snapshot).await?)?;
        let credential = Credential::new(reply.token)
            .ok_or_else(|| RequestError::Decode("login reply carries an empty token".to_string()))?;
        Ok((credential, reply.user))
    }

    /// Best-effort server notification, then unconditional local sign-out
    pub async fn logout(&self) {
        let snapshot = self.credential().await;
        let request = ApiRequest::post(LOGOUT_PATH);
        if let Err(e) = self
            .transport
            .send::<serde_json::Value>(&request, snapshot.as_ref())
            .await
        {
            tracing::warn!(error = %e, "logout request failed; clearing local session anyway");
        }
        self.clear_local(false).await;
        tracing::info!("signed out");
    }

    /// Cached profile, or one fetch of `/users/info` memoized on success
    pub async fn current_user(&self) -> Result<User> {
        if let Some(user) = self.cached_user().await {
            return Ok(user);
        }

        let snapshot = self.credential().await;
        let epoch = self.epoch();
        let request = ApiRequest::get(USER_INFO_PATH);
        let fetched = match self.transport.send::<User>(&request, snapshot.as_ref()).await {
            Ok(envelope) => payload(envelope),
            Err(e) => Err(e),
        };

        match fetched {
            Ok(user) => {
                if self.epoch() != epoch {
                    // Identity changed while the fetch was in flight
                    return Ok(user);
                }
                self.store.save_profile(&user);
                {
                    let mut inner = self.inner.write().await;
                    inner.user = Some(user.clone());
                    inner.state = SessionState::Authenticated;
                }
                self.emit(SessionState::Authenticated);
                Ok(user)
            }
            Err(e) => {
                if self.epoch() == epoch {
                    let expired = matches!(e, RequestError::Unauthenticated { .. });
                    self.clear_local(expired).await;
                }
                Err(e)
            }
        }
    }

    /// Perform a backend call as the current identity
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<ResponseEnvelope<T>> {
        let snapshot = self.credential().await;
        let epoch = self.epoch();
        let result = self.transport.send(request, snapshot.as_ref()).await;
        if matches!(result, Err(RequestError::Unauthenticated { .. })) && self.epoch() == epoch {
            self.expire().await;
        }
        result
    }

    /// [`request`](Self::request) and take the payload
    pub async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        payload(self.request(request).await?)
    }

    /// [`request`](Self::request) for calls whose reply carries no payload
    pub async fn execute(&self, request: &ApiRequest) -> Result<()> {
        self.request::<serde_json::Value>(request).await.map(|_| ())
    }

    /// Report a failure found before anything was sent, then hand it back
    pub fn reject(&self, error: RequestError) -> RequestError {
        self.transport.report(&error);
        error
    }

    /// The server rejected the credential
    pub async fn expire(&self) {
        tracing::warn!("session expired");
        self.clear_local(true).await;
    }

    async fn clear_local(&self, expired: bool) {
        self.store.clear_all();
        let had_identity = {
            let mut inner = self.inner.write().await;
            let had_identity = inner.credential.is_some() || inner.user.is_some();
            inner.credential = None;
            inner.user = None;
            inner.state = SessionState::Anonymous;
            had_identity
        };
        if had_identity {
            self.epoch.fetch_add(1, Ordering::SeqCst);
        }
        if expired {
            self.emit(SessionState::Expired);
        }
        self.emit(SessionState::Anonymous);
    }

    fn emit(&self, state: SessionState) {
        // No subscribers is fine
        let _ = self.events.send(state);
    }
}

#[async_trait]
impl SessionView for SessionController {
    async fn has_credential(&self) -> bool {
        self.is_authenticated().await
    }

    async fn has_cached_profile(&self) -> bool {
        self.inner.read().await.user.is_some()
    }

    async fn fetch_profile(&self) -> Result<User> {
        self.current_user().await
    }
}

/// Payload of a success envelope; absent data is a decode failure
pub fn payload<T>(envelope: ResponseEnvelope<T>) -> Result<T> {
    envelope
        .into_data()
        .ok_or_else(|| RequestError::Decode("response carries no data".to_string()))
}
