//! reqwest implementation of the transport seam.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use reauth_core::{ApiUrl, HttpResponse, Method, RequestDescriptor, Transport, TransportError};

use crate::config::ClientConfig;

/// HTTP transport that resolves request paths against an API base URL.
///
/// Performs exactly one network call per [`Transport::send`] and never
/// interprets status codes; that is the dispatcher's job.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: ApiUrl,
}

impl HttpTransport {
    /// Create a transport from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    /// (for example, when no TLS backend is available).
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| map_reqwest_error(e, config.request_timeout))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Returns the API base URL this transport is configured for.
    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse, TransportError> {
        let url = self.base_url.endpoint(request.path());
        debug!(%url, "Sending request");

        let mut builder = self.client.request(to_reqwest_method(request.method()), &url);
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.json_body() {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let limit = request.request_timeout();
        let response = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, limit))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, limit))?
            .to_vec();

        trace!(status, bytes = body.len(), "Response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn map_reqwest_error(err: reqwest::Error, limit: Option<Duration>) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: limit.map_or(0, |limit| limit.as_millis() as u64),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}
