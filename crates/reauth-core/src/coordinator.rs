//! Single-flight session refresh.
//!
//! When an access credential expires, every request in flight sees a `401`
//! at about the same time. Only one of them may call the refresh endpoint:
//! two refresh calls racing with the same refresh credential can revoke each
//! other server-side. The first caller to arrive becomes the leader and
//! starts the call; everyone arriving while it is outstanding becomes a
//! follower and waits on a oneshot channel for its outcome.
//!
//! The call itself runs on a spawned task, not in the leader's future. Once
//! the request has left, the server may already have rotated the pair, so
//! the response must be stored no matter what happens to the caller that
//! started it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{Instrument, debug, info, instrument, warn};

use crate::endpoints::{TokenResponse, refresh_body};
use crate::error::SessionError;
use crate::request::RequestDescriptor;
use crate::terminator::SessionTerminator;
use crate::tokens::{AccessToken, CredentialPair};
use crate::traits::{CredentialStore, Transport};

type Outcome = Result<AccessToken, SessionError>;

enum RefreshState {
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<Outcome>>,
    },
}

enum Role {
    Leader,
    Follower(oneshot::Receiver<Outcome>),
}

/// Owner of the refresh state machine.
///
/// One coordinator exists per session. The `Idle -> Refreshing` transition
/// is a single check-and-set under a mutex, so the protocol holds on a
/// multi-threaded runtime. The mutex is never held across an `.await`.
///
/// Must be used from within a Tokio runtime.
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<RefreshState>,
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    terminator: Arc<SessionTerminator>,
    refresh_path: String,
    refresh_timeout: Duration,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
        terminator: Arc<SessionTerminator>,
        refresh_path: impl Into<String>,
        refresh_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RefreshState::Idle),
                store,
                transport,
                terminator,
                refresh_path: refresh_path.into(),
                refresh_timeout,
            }),
        }
    }

    /// Obtain a new access credential, sharing any refresh already in flight.
    ///
    /// On success the new pair is already in the credential store. On
    /// [`SessionError::Expired`] the store has been cleared and the session
    /// terminated. Dropping the returned future does not stop the refresh:
    /// it still settles, and its outcome reaches every other waiter.
    /// [`SessionError::Aborted`] is only seen if the refresh task itself
    /// died before settling; nothing was changed in that case.
    #[instrument(skip(self))]
    pub async fn obtain_fresh_credential(&self) -> Result<AccessToken, SessionError> {
        match self.inner.join() {
            Role::Leader => {
                let inner = self.inner.clone();
                let task = tokio::spawn(inner.lead().in_current_span());
                task.await.unwrap_or_else(|e| {
                    warn!(error = %e, "Refresh task failed");
                    Err(SessionError::Aborted)
                })
            }
            Role::Follower(waiter) => {
                debug!("Refresh in flight, waiting for its outcome");
                waiter.await.unwrap_or(Err(SessionError::Aborted))
            }
        }
    }

    /// Returns true while a refresh call is outstanding.
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.inner.lock_state(), RefreshState::Refreshing { .. })
    }

    /// Returns the number of followers waiting on the current refresh.
    pub fn waiting(&self) -> usize {
        match &*self.inner.lock_state() {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { waiters } => waiters.len(),
        }
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn join(&self) -> Role {
        let mut state = self.lock_state();
        if let RefreshState::Refreshing { waiters } = &mut *state {
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            return Role::Follower(rx);
        }
        *state = RefreshState::Refreshing {
            waiters: Vec::new(),
        };
        Role::Leader
    }

    async fn lead(self: Arc<Self>) -> Outcome {
        info!("Refreshing session");
        let flight = Flight::new(&self);

        let outcome = self.refresh().await;
        if outcome.is_err() {
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "Failed to clear credential store");
            }
        }

        let released = flight.settle(outcome.clone());
        match &outcome {
            Ok(_) => info!(waiters = released, "Session refreshed"),
            Err(_) => {
                warn!(waiters = released, "Session refresh failed");
                self.terminator.terminate();
            }
        }
        outcome
    }

    async fn refresh(&self) -> Outcome {
        let refresh_token = match self.store.get() {
            Ok(Some(pair)) => pair.refresh,
            Ok(None) => {
                warn!("No refresh credential available");
                return Err(SessionError::Expired);
            }
            Err(e) => {
                warn!(error = %e, "Failed to read refresh credential");
                return Err(SessionError::Expired);
            }
        };

        let request = RequestDescriptor::post(self.refresh_path.as_str())
            .public()
            .body(refresh_body(&refresh_token));

        let response =
            match tokio::time::timeout(self.refresh_timeout, self.transport.send(&request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!(error = %e, "Refresh call failed");
                    return Err(SessionError::Expired);
                }
                Err(_) => {
                    warn!(
                        timeout_ms = self.refresh_timeout.as_millis() as u64,
                        "Refresh call timed out"
                    );
                    return Err(SessionError::Expired);
                }
            };

        if !response.is_success() {
            warn!(status = response.status, "Refresh rejected");
            return Err(SessionError::Expired);
        }

        let pair: CredentialPair = match serde_json::from_slice::<TokenResponse>(&response.body) {
            Ok(tokens) => tokens.into(),
            Err(e) => {
                warn!(error = %e, "Malformed refresh response");
                return Err(SessionError::Expired);
            }
        };

        if let Err(e) = self.store.set(&pair) {
            warn!(error = %e, "Failed to store refreshed credentials");
            return Err(SessionError::Expired);
        }

        Ok(pair.access)
    }

    /// Return to `Idle` and hand `outcome` to every queued waiter.
    fn release(&self, outcome: Outcome) -> usize {
        let state = std::mem::replace(&mut *self.lock_state(), RefreshState::Idle);
        let waiters = match state {
            RefreshState::Refreshing { waiters } => waiters,
            RefreshState::Idle => Vec::new(),
        };

        let count = waiters.len();
        for waiter in waiters {
            // The follower may have been cancelled; nothing left to notify.
            let _ = waiter.send(outcome.clone());
        }
        count
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("waiting", &self.waiting())
            .field("refresh_path", &self.inner.refresh_path)
            .field("refresh_timeout", &self.inner.refresh_timeout)
            .finish()
    }
}

/// The refresh task's claim on the `Refreshing` state.
///
/// If the task unwinds or is torn down before the refresh settles, the
/// waiters are released with [`SessionError::Aborted`] so none of them hangs.
struct Flight<'a> {
    inner: &'a Inner,
    settled: bool,
}

impl<'a> Flight<'a> {
    fn new(inner: &'a Inner) -> Self {
        Self {
            inner,
            settled: false,
        }
    }

    fn settle(mut self, outcome: Outcome) -> usize {
        self.settled = true;
        self.inner.release(outcome)
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Refresh task stopped before the refresh settled");
            self.inner.release(Err(SessionError::Aborted));
        }
    }
}
