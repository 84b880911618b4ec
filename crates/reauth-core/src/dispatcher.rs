//! The authenticated request dispatcher.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

use crate::coordinator::RefreshCoordinator;
use crate::error::{RequestError, TransportError};
use crate::request::RequestDescriptor;
use crate::response::{HttpResponse, Reply};
use crate::tokens::CredentialPair;
use crate::traits::{CredentialStore, SessionObserver, Transport};

/// Attaches credentials, sends requests and interprets responses.
///
/// A `401` on an authenticated request hands over to the
/// [`RefreshCoordinator`] and, if a fresh credential comes back, the request
/// is sent exactly once more. A second `401` is returned as
/// [`RequestError::Unauthorized`] instead of refreshing again.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
    observer: Arc<dyn SessionObserver>,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        coordinator: Arc<RefreshCoordinator>,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        Self {
            transport,
            store,
            coordinator,
            observer,
        }
    }

    /// Send a request, refreshing the session once if its credential expired.
    ///
    /// Every failure is reported to the [`SessionObserver`] before it is
    /// returned.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn dispatch(&self, request: &RequestDescriptor) -> Result<Reply, RequestError> {
        let result = self.execute(request).await;
        if let Err(ref e) = result {
            self.observer.request_failed(e);
        }
        result
    }

    /// Like [`dispatch`](Self::dispatch), but gives up with
    /// [`RequestError::Cancelled`] as soon as `cancel` fires.
    ///
    /// Cancelling a request that started a refresh does not stop the refresh;
    /// the rotated pair is still stored for the requests that follow.
    pub async fn dispatch_with_cancel(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Reply, RequestError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(method = %request.method(), path = %request.path(), "Request cancelled");
                let error = RequestError::Cancelled;
                self.observer.request_failed(&error);
                Err(error)
            }
            result = self.dispatch(request) => result,
        }
    }

    /// Send a request built from the stored credential pair.
    ///
    /// `build` is called again after a refresh, so a body that carries the
    /// refresh credential follows the rotation instead of naming a retired
    /// token. Without a stored pair this fails with
    /// [`RequestError::SessionExpired`].
    #[instrument(skip_all)]
    pub async fn dispatch_for_pair<F>(&self, build: F) -> Result<Reply, RequestError>
    where
        F: Fn(&CredentialPair) -> RequestDescriptor + Sync,
    {
        let result = self.execute_for_pair(&build).await;
        if let Err(ref e) = result {
            self.observer.request_failed(e);
        }
        result
    }

    async fn execute(&self, request: &RequestDescriptor) -> Result<Reply, RequestError> {
        if !request.requires_auth() {
            let response = self.send(request).await?;
            return interpret(response);
        }

        let attempt = match self.store.get()? {
            Some(pair) => request.authorized(&pair.access),
            None => {
                debug!("No access credential stored, sending without one");
                request.clone()
            }
        };

        let response = self.send(&attempt).await?;
        if response.status != 401 {
            return interpret(response);
        }

        debug!("Access credential rejected, obtaining a fresh one");
        let fresh = self.coordinator.obtain_fresh_credential().await?;
        self.retry(&request.authorized(&fresh)).await
    }

    async fn execute_for_pair<F>(&self, build: &F) -> Result<Reply, RequestError>
    where
        F: Fn(&CredentialPair) -> RequestDescriptor + Sync,
    {
        let pair = self.store.get()?.ok_or(RequestError::SessionExpired)?;
        let response = self.send(&build(&pair).authorized(&pair.access)).await?;
        if response.status != 401 {
            return interpret(response);
        }

        debug!("Access credential rejected, obtaining a fresh one");
        self.coordinator.obtain_fresh_credential().await?;
        let pair = self.store.get()?.ok_or(RequestError::SessionExpired)?;
        self.retry(&build(&pair).authorized(&pair.access)).await
    }

    /// The one resend allowed after a refresh.
    async fn retry(&self, request: &RequestDescriptor) -> Result<Reply, RequestError> {
        let response = self.send(request).await?;
        if response.status == 401 {
            warn!("Request rejected again after refreshing the session");
            return Err(RequestError::Unauthorized);
        }
        interpret(response)
    }

    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse, TransportError> {
        let response = match request.request_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.transport.send(request))
                .await
                .map_err(|_| TransportError::Timeout {
                    duration_ms: limit.as_millis() as u64,
                })??,
            None => self.transport.send(request).await?,
        };
        trace!(status = response.status, "Response received");
        Ok(response)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

/// Map a response that is not an expiry onto a reply or a failure.
fn interpret(response: HttpResponse) -> Result<Reply, RequestError> {
    match response.status {
        204 => Ok(Reply::NoContent),
        200..=299 => Ok(Reply::Content(response)),
        403 => Err(RequestError::PermissionDenied),
        404 => Err(RequestError::NotFound),
        status if status >= 500 => Err(RequestError::Server { status }),
        status => Err(RequestError::RequestFailed {
            status,
            message: response.error_message(),
        }),
    }
}
