//! Session facade tying the store, dispatcher, coordinator and terminator together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::claims::Claims;
use crate::coordinator::RefreshCoordinator;
use crate::credentials::{Credentials, Signup};
use crate::dispatcher::Dispatcher;
use crate::endpoints::{AuthEndpoints, TokenResponse, refresh_body};
use crate::error::{RequestError, SessionError, StoreError};
use crate::request::RequestDescriptor;
use crate::response::Reply;
use crate::terminator::{SessionStatus, SessionTerminator};
use crate::tokens::{AccessToken, CredentialPair};
use crate::traits::{CredentialStore, SessionObserver, TracingObserver, Transport};

/// Default bound on the leader's refresh call.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// Session-level settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub endpoints: AuthEndpoints,
    pub refresh_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoints: AuthEndpoints::default(),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
        }
    }
}

/// An authenticated connection to the API.
///
/// Sessions are cheap to clone (they use internal `Arc`) and safe to share
/// across tasks; all clones share one credential store and one refresh
/// coordinator.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use reauth_core::{MemoryStore, RequestDescriptor, Session, SessionStatus, Transport};
///
/// # async fn example(transport: Arc<dyn Transport>) -> Result<(), reauth_core::RequestError> {
/// let session = Session::builder(transport, Arc::new(MemoryStore::new())).build()?;
/// let mut status = session.subscribe();
///
/// tokio::spawn(async move {
///     while status.changed().await.is_ok() {
///         if *status.borrow() == SessionStatus::Ended {
///             println!("please log in again");
///         }
///     }
/// });
///
/// session.dispatch(&RequestDescriptor::delete("/tasks/42")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    dispatcher: Dispatcher,
    coordinator: Arc<RefreshCoordinator>,
    terminator: Arc<SessionTerminator>,
    store: Arc<dyn CredentialStore>,
    endpoints: AuthEndpoints,
}

/// Builder for [`Session`].
pub struct SessionBuilder {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    observer: Arc<dyn SessionObserver>,
    config: SessionConfig,
}

impl SessionBuilder {
    /// Receive failure and session-end notifications. Defaults to [`TracingObserver`].
    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.config.refresh_timeout = timeout;
        self
    }

    /// Build the session, restoring any credentials already in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn build(self) -> Result<Session, RequestError> {
        let restored = self.store.get()?.is_some();
        let initial = if restored {
            SessionStatus::Active
        } else {
            SessionStatus::Ended
        };
        debug!(restored, "Building session");

        let terminator = Arc::new(SessionTerminator::new(
            self.store.clone(),
            self.observer.clone(),
            initial,
        ));
        let coordinator = Arc::new(RefreshCoordinator::new(
            self.store.clone(),
            self.transport.clone(),
            terminator.clone(),
            self.config.endpoints.refresh.clone(),
            self.config.refresh_timeout,
        ));
        let dispatcher = Dispatcher::new(
            self.transport,
            self.store.clone(),
            coordinator.clone(),
            self.observer,
        );

        Ok(Session {
            inner: Arc::new(SessionInner {
                dispatcher,
                coordinator,
                terminator,
                store: self.store,
                endpoints: self.config.endpoints,
            }),
        })
    }
}

impl Session {
    pub fn builder(transport: Arc<dyn Transport>, store: Arc<dyn CredentialStore>) -> SessionBuilder {
        SessionBuilder {
            transport,
            store,
            observer: Arc::new(TracingObserver),
            config: SessionConfig::default(),
        }
    }

    /// Authenticate with email and password and store the issued pair.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<CredentialPair, RequestError> {
        info!("Logging in");
        let request = RequestDescriptor::post(self.inner.endpoints.login.as_str())
            .public()
            .body(credentials.body());
        self.establish(&request).await
    }

    /// Register a new account and store the issued pair.
    #[instrument(skip(self, signup), fields(email = %signup.email(), username = %signup.username()))]
    pub async fn signup(&self, signup: &Signup) -> Result<CredentialPair, RequestError> {
        info!("Registering account");
        let request = RequestDescriptor::post(self.inner.endpoints.register.as_str())
            .public()
            .body(signup.body());
        self.establish(&request).await
    }

    /// End the session.
    ///
    /// The server is told to revoke the refresh token, but its answer does
    /// not matter: local credentials are always cleared. If the access token
    /// has to be refreshed first, the rotated refresh token is the one
    /// revoked.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        info!("Logging out");
        match self.inner.store.get() {
            Ok(Some(_)) => {
                let path = self.inner.endpoints.logout.as_str();
                let revoke = |pair: &CredentialPair| {
                    RequestDescriptor::post(path).body(refresh_body(&pair.refresh))
                };
                if let Err(e) = self.inner.dispatcher.dispatch_for_pair(revoke).await {
                    warn!(error = %e, "Server-side logout failed");
                }
            }
            Ok(None) => debug!("No stored credentials to revoke"),
            Err(e) => warn!(error = %e, "Failed to read credentials for logout"),
        }
        self.inner.terminator.terminate();
    }

    /// Send a request through the authenticated dispatcher.
    pub async fn dispatch(&self, request: &RequestDescriptor) -> Result<Reply, RequestError> {
        self.inner.dispatcher.dispatch(request).await
    }

    /// Send a request that gives up as soon as `cancel` fires.
    pub async fn dispatch_with_cancel(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Reply, RequestError> {
        self.inner.dispatcher.dispatch_with_cancel(request, cancel).await
    }

    /// Refresh the credentials now, joining any refresh already in flight.
    pub async fn refresh(&self) -> Result<AccessToken, SessionError> {
        self.inner.coordinator.obtain_fresh_credential().await
    }

    /// Returns the stored credential pair.
    pub fn credentials(&self) -> Result<Option<CredentialPair>, StoreError> {
        self.inner.store.get()
    }

    /// Returns the identity claims of the current access token, if decodable.
    pub fn current_user(&self) -> Option<Claims> {
        let pair = self.inner.store.get().ok()??;
        Claims::from_access_token(&pair.access)
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.terminator.status()
    }

    /// Subscribe to session status changes; `Ended` means "log in again".
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.inner.terminator.subscribe()
    }

    /// End the session locally without contacting the server.
    pub fn terminate(&self) -> bool {
        self.inner.terminator.terminate()
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.inner.coordinator
    }

    async fn establish(&self, request: &RequestDescriptor) -> Result<CredentialPair, RequestError> {
        let reply = self.inner.dispatcher.dispatch(request).await?;
        let tokens: TokenResponse = reply.json()?;
        let pair = CredentialPair::from(tokens);
        self.inner.store.set(&pair)?;
        self.inner.terminator.activate();
        debug!("Credentials stored");
        Ok(pair)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.status())
            .field("coordinator", &self.inner.coordinator)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
