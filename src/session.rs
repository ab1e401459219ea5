//! Signed-in user context handed explicitly to whoever needs a bearer token.
//!
//! A [`Session`] wraps an optional [`IdentityProvider`] and moves through
//! `Uninitialized → Loading → Ready | Disabled` exactly once, driven by [`Session::init`].
//! Callers asking for a token while the provider is still loading wait for it to settle.

use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::errors::SessionError;

/// Lifecycle of a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    /// Provider loaded, tokens may be available
    Ready,
    /// No provider configured or it failed to load, every request goes out anonymous
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Third-party identity SDK seam
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Prepare the provider, e.g. restore a persisted session
    async fn load(&self) -> Result<(), SessionError>;

    /// Bearer token of the active session, [None] when nobody is signed in
    async fn token(&self) -> Option<String>;

    fn user(&self) -> Option<User>;

    /// Start an interactive sign-in, if the provider has one
    fn open_sign_in(&self) {}

    async fn sign_out(&self) -> Result<(), SessionError>;
}

pub struct Session {
    provider: Option<Arc<dyn IdentityProvider>>,
    state: watch::Sender<SessionState>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("has_provider", &self.provider.is_some())
            .field("state", &self.state())
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Session {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self::from_parts(Some(provider))
    }

    /// A session without a provider, [Session::init] settles it as [SessionState::Disabled]
    pub fn disabled() -> Self {
        Self::from_parts(None)
    }

    fn from_parts(provider: Option<Arc<dyn IdentityProvider>>) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self { provider, state }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Load the provider. Only the first call does any work, later and concurrent calls
    /// wait for that one to settle and return the same state. Dropping the loading call
    /// puts the session back to [SessionState::Uninitialized].
    pub async fn init(&self) -> SessionState {
        let mut first = false;
        self.state.send_if_modified(|state| {
            if *state == SessionState::Uninitialized {
                *state = SessionState::Loading;
                first = true;
            }
            first
        });
        if !first {
            return self.settled().await;
        }

        let guard = LoadingGuard {
            state: &self.state,
            armed: true,
        };
        let next = match &self.provider {
            None => {
                warn!("no identity provider configured, auth disabled");
                SessionState::Disabled
            }
            Some(provider) => match provider.load().await {
                Ok(()) => {
                    debug!("identity provider ready");
                    SessionState::Ready
                }
                Err(e) => {
                    warn!(error = %e, "failed to load identity provider, auth disabled");
                    SessionState::Disabled
                }
            },
        };
        guard.settle(next);
        next
    }

    /// Current state once it is no longer [SessionState::Loading]
    async fn settled(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|state| *state != SessionState::Loading).await {
            Ok(state) => *state,
            // the sender lives as long as self
            Err(_) => SessionState::Disabled,
        }
    }

    fn ready_provider(&self) -> Option<&Arc<dyn IdentityProvider>> {
        match self.state() {
            SessionState::Ready => self.provider.as_ref(),
            _ => None,
        }
    }

    /// Bearer token for the active session. Waits while the provider is loading and
    /// returns [None] if the session was never initialised, is disabled or nobody is signed in.
    pub async fn token(&self) -> Option<String> {
        match self.settled().await {
            SessionState::Ready => self.provider.as_ref()?.token().await,
            _ => None,
        }
    }

    pub fn user(&self) -> Option<User> {
        self.ready_provider()?.user()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user().is_some()
    }

    pub async fn sign_in(&self) {
        if self.settled().await == SessionState::Ready {
            if let Some(provider) = &self.provider {
                provider.open_sign_in();
            }
        }
    }

    pub async fn sign_out(&self) -> Result<(), SessionError> {
        if self.settled().await != SessionState::Ready {
            return Ok(());
        }
        match &self.provider {
            Some(provider) => provider.sign_out().await,
            None => Ok(()),
        }
    }
}

/// Puts a [Session] back to [SessionState::Uninitialized] if `init` is dropped mid-load,
/// so waiters wake up and a later `init` can retry
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SessionState>,
    armed: bool,
}

impl LoadingGuard<'_> {
    fn settle(mut self, next: SessionState) {
        self.armed = false;
        self.state.send_replace(next);
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!("session init cancelled while loading");
            self.state.send_replace(SessionState::Uninitialized);
        }
    }
}

/// Provider backed by a fixed bearer token, for service accounts and scripts
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    token: RwLock<Option<String>>,
    user: Option<User>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
            user: None,
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenProvider {
    async fn load(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn user(&self) -> Option<User> {
        let signed_in = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        self.user.clone().filter(|_| signed_in)
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
