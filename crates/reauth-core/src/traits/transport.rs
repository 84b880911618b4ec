//! Transport trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::RequestDescriptor;
use crate::response::HttpResponse;

/// Performs a single network call.
///
/// Implementations send exactly the headers and body on the descriptor,
/// report any status code as a successful [`HttpResponse`], and reserve
/// `Err` for calls that could not complete. They know nothing about
/// authentication.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}
