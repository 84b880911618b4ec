//! An in-process fake of the task API, driven through the `Transport` trait.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reauth_core::{
    CredentialPair, CredentialStore, HttpResponse, MemoryStore, RequestDescriptor, RequestError,
    Session, SessionObserver, Transport, TransportError,
};
use serde_json::json;
use tokio::sync::Semaphore;

/// How the fake answers refresh calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshBehavior {
    /// Issue a new pair if the refresh token matches.
    Rotate,
    /// Reject every refresh with 401.
    Reject,
    /// Fail at the transport level.
    Offline,
}

struct Tokens {
    access: String,
    refresh: String,
    generation: u32,
}

pub struct FakeApi {
    tokens: Mutex<Tokens>,
    refresh_behavior: Mutex<RefreshBehavior>,
    refresh_gate: Semaphore,
    always_unauthorized: AtomicBool,
    pub refresh_calls: AtomicUsize,
    pub resource_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
    revoked: Mutex<Option<String>>,
}

impl FakeApi {
    /// A fake whose live pair is `(access, refresh)`.
    pub fn new(access: &str, refresh: &str) -> Arc<Self> {
        Self::with_gate(access, refresh, Semaphore::MAX_PERMITS)
    }

    /// Like [`FakeApi::new`], but refresh calls block until [`FakeApi::open_gate`].
    pub fn gated(access: &str, refresh: &str) -> Arc<Self> {
        Self::with_gate(access, refresh, 0)
    }

    fn with_gate(access: &str, refresh: &str, permits: usize) -> Arc<Self> {
        Arc::new(Self {
            tokens: Mutex::new(Tokens {
                access: access.to_string(),
                refresh: refresh.to_string(),
                generation: 0,
            }),
            refresh_behavior: Mutex::new(RefreshBehavior::Rotate),
            refresh_gate: Semaphore::new(permits),
            always_unauthorized: AtomicBool::new(false),
            refresh_calls: AtomicUsize::new(0),
            resource_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            last_authorization: Mutex::new(None),
            revoked: Mutex::new(None),
        })
    }

    pub fn open_gate(&self) {
        self.refresh_gate.add_permits(1024);
    }

    pub fn set_refresh_behavior(&self, behavior: RefreshBehavior) {
        *self.refresh_behavior.lock().unwrap() = behavior;
    }

    pub fn reject_every_token(&self) {
        self.always_unauthorized.store(true, Ordering::SeqCst);
    }

    /// Invalidate the current access token server-side.
    pub fn expire_access(&self) {
        self.tokens.lock().unwrap().access = "revoked".to_string();
    }

    pub fn live_pair(&self) -> CredentialPair {
        let tokens = self.tokens.lock().unwrap();
        CredentialPair::new(tokens.access.clone(), tokens.refresh.clone())
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.last_authorization.lock().unwrap().clone()
    }

    /// The refresh token named by the last logout call.
    pub fn revoked(&self) -> Option<String> {
        self.revoked.lock().unwrap().clone()
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn resources(&self) -> usize {
        self.resource_calls.load(Ordering::SeqCst)
    }

    /// Decides the refresh on receipt, like a server that rotates before
    /// its reply reaches the client, then holds the reply at the gate.
    async fn refresh(&self, request: &RequestDescriptor) -> Result<HttpResponse, TransportError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = *self.refresh_behavior.lock().unwrap();
        let outcome = match behavior {
            RefreshBehavior::Offline => Err(TransportError::Connection {
                message: "connection reset".to_string(),
            }),
            RefreshBehavior::Reject => Ok(HttpResponse::json(
                401,
                &json!({"message": "Invalid refresh token"}),
            )),
            RefreshBehavior::Rotate => Ok(self.rotate(request)),
        };

        let _permit = self
            .refresh_gate
            .acquire()
            .await
            .map_err(|e| TransportError::Http {
                message: e.to_string(),
            })?;
        outcome
    }

    fn rotate(&self, request: &RequestDescriptor) -> HttpResponse {
        let presented = body_token(request);
        let mut tokens = self.tokens.lock().unwrap();
        if presented != tokens.refresh {
            return HttpResponse::json(401, &json!({"message": "Invalid refresh token"}));
        }
        tokens.generation += 1;
        tokens.access = format!("access-{}", tokens.generation);
        tokens.refresh = format!("refresh-{}", tokens.generation);
        HttpResponse::json(
            200,
            &json!({"access_token": tokens.access, "refresh_token": tokens.refresh}),
        )
    }

    fn login(&self, request: &RequestDescriptor) -> HttpResponse {
        let body = request.json_body().cloned().unwrap_or_default();
        if body["password"] != "correct-horse" {
            return HttpResponse::json(401, &json!({"message": "Invalid credentials"}));
        }
        let mut tokens = self.tokens.lock().unwrap();
        tokens.generation += 1;
        tokens.access = format!("access-{}", tokens.generation);
        tokens.refresh = format!("refresh-{}", tokens.generation);
        HttpResponse::json(
            200,
            &json!({
                "access_token": tokens.access,
                "refresh_token": tokens.refresh,
                "user": {"id": "user-1", "email": body["email"]}
            }),
        )
    }

    fn authorized(&self, request: &RequestDescriptor) -> bool {
        if self.always_unauthorized.load(Ordering::SeqCst) {
            return false;
        }
        let expected = format!("Bearer {}", self.tokens.lock().unwrap().access);
        request.header_value("authorization") == Some(expected.as_str())
    }
}

#[async_trait]
impl Transport for FakeApi {
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse, TransportError> {
        *self.last_authorization.lock().unwrap() =
            request.header_value("authorization").map(str::to_string);

        match request.path() {
            "/auth/refresh" => return self.refresh(request).await,
            "/auth/login" | "/auth/register" => return Ok(self.login(request)),
            "/offline" => {
                return Err(TransportError::Connection {
                    message: "dns lookup failed".to_string(),
                });
            }
            _ => {}
        }

        self.resource_calls.fetch_add(1, Ordering::SeqCst);
        if !self.authorized(request) {
            return Ok(HttpResponse::json(401, &json!({"message": "Token expired"})));
        }

        let response = match request.path() {
            "/auth/logout" => {
                self.logout_calls.fetch_add(1, Ordering::SeqCst);
                *self.revoked.lock().unwrap() = Some(body_token(request));
                HttpResponse::new(204, "")
            }
            "/empty" => HttpResponse::new(204, ""),
            "/forbidden" => HttpResponse::json(403, &json!({"message": "Admins only"})),
            "/missing" => HttpResponse::new(404, ""),
            "/broken" => HttpResponse::new(500, "internal error"),
            "/invalid" => HttpResponse::json(422, &json!({"message": "title is required"})),
            "/slow" => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                HttpResponse::new(200, "")
            }
            path => HttpResponse::json(
                200,
                &json!({"path": path, "authorization": request.header_value("authorization")}),
            ),
        };
        Ok(response)
    }
}

fn body_token(request: &RequestDescriptor) -> String {
    request
        .json_body()
        .and_then(|body| body["refresh_token"].as_str())
        .unwrap_or_default()
        .to_string()
}

/// Counts observer notifications.
#[derive(Default)]
pub struct CountingObserver {
    pub failures: AtomicUsize,
    pub ended: AtomicUsize,
    pub expired: AtomicUsize,
}

impl CountingObserver {
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn ended(&self) -> usize {
        self.ended.load(Ordering::SeqCst)
    }
}

impl SessionObserver for CountingObserver {
    fn request_failed(&self, error: &RequestError) {
        self.failures.fetch_add(1, Ordering::SeqCst);
        if error.is_session_expired() {
            self.expired.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session_ended(&self) {
        self.ended.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub store: Arc<MemoryStore>,
    pub observer: Arc<CountingObserver>,
    pub session: Session,
}

/// A session over `api` whose store starts with `stored`.
pub fn harness(api: Arc<FakeApi>, stored: Option<CredentialPair>) -> Harness {
    let store = Arc::new(match stored {
        Some(pair) => MemoryStore::with_pair(pair),
        None => MemoryStore::new(),
    });
    let observer = Arc::new(CountingObserver::default());
    let session = Session::builder(api.clone(), store.clone())
        .observer(observer.clone())
        .build()
        .unwrap();
    Harness {
        api,
        store,
        observer,
        session,
    }
}

impl Harness {
    pub fn stored(&self) -> Option<CredentialPair> {
        self.store.get().unwrap()
    }
}

/// Yield until `check` holds.
pub async fn wait_until(check: impl Fn() -> bool) {
    while !check() {
        tokio::task::yield_now().await;
    }
}
