//! Adapter that answers locally without any I/O.

use async_trait::async_trait;
use axum::http::{Response, StatusCode, header};

use crate::adapter::{Adapter, AdapterError};
use crate::proxy::{ProxyRequest, ProxyResponse};

/// Replies `200 OK` with the request body and content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoAdapter;

#[async_trait]
impl Adapter for EchoAdapter {
    async fn send(&self, request: &ProxyRequest, target: &str) -> Result<ProxyResponse, AdapterError> {
        tracing::trace!(upstream = %target, bytes = request.body().len(), "Echoing request");

        let mut builder = Response::builder().status(StatusCode::OK);
        if let Some(content_type) = request.headers().get(header::CONTENT_TYPE) {
            builder = builder.header(header::CONTENT_TYPE, content_type.clone());
        }
        builder
            .body(request.body().clone())
            .map_err(AdapterError::other)
    }
}
