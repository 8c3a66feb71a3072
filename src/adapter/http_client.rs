//! Plain HTTP adapter backed by the hyper-util pooled client.
//!
//! # Responsibilities
//! - Validate the target as an absolute `http://` URI
//! - Rebuild the outgoing request (method, headers, buffered body)
//! - Enforce the upstream deadline and response body limit

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::uri::Scheme;
use axum::http::{Request, Response, Uri, header};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};

use crate::adapter::{Adapter, AdapterError};
use crate::config::ProxyConfig;
use crate::proxy::{ProxyRequest, ProxyResponse};

/// Forwards requests over HTTP/1.1 using a shared connection pool.
#[derive(Clone)]
pub struct HttpAdapter {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    max_body: usize,
}

impl HttpAdapter {
    pub fn new(timeout: Duration, max_body: usize) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            timeout,
            max_body,
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(
            Duration::from_secs(config.timeouts.upstream_secs),
            config.limits.max_response_body,
        )
    }

    /// Build the request sent upstream.
    ///
    /// `Host` is dropped so the client derives it from the target authority.
    /// Framing headers are dropped because the body is already buffered.
    fn outgoing(request: &ProxyRequest, target: &str) -> Result<Request<Body>, AdapterError> {
        let uri = parse_target(target)?;

        let mut builder = Request::builder().method(request.method().clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in request.headers() {
                if name == header::HOST || name == header::CONTENT_LENGTH || name == header::TRANSFER_ENCODING {
                    continue;
                }
                headers.append(name.clone(), value.clone());
            }
        }

        builder
            .body(Body::from(request.body().clone()))
            .map_err(AdapterError::other)
    }

    async fn exchange(&self, outgoing: Request<Body>) -> Result<ProxyResponse, AdapterError> {
        let response = self
            .client
            .request(outgoing)
            .await
            .map_err(AdapterError::Transport)?;

        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(Body::new(body), self.max_body)
            .await
            .map_err(|e| AdapterError::Body(e.to_string()))?;

        Ok(Response::from_parts(parts, bytes))
    }
}

#[async_trait]
impl Adapter for HttpAdapter {
    async fn send(&self, request: &ProxyRequest, target: &str) -> Result<ProxyResponse, AdapterError> {
        let outgoing = Self::outgoing(request, target)?;

        match tokio::time::timeout(self.timeout, self.exchange(outgoing)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(upstream = %target, timeout = ?self.timeout, "Upstream timed out");
                Err(AdapterError::Timeout(self.timeout))
            }
        }
    }
}

fn parse_target(target: &str) -> Result<Uri, AdapterError> {
    let invalid = |reason: &str| AdapterError::InvalidTarget {
        target: target.to_string(),
        reason: reason.to_string(),
    };

    let uri: Uri = target.parse().map_err(|_| invalid("not a valid URI"))?;
    if uri.scheme() != Some(&Scheme::HTTP) {
        return Err(invalid("only http:// targets are supported"));
    }
    if uri.authority().is_none() {
        return Err(invalid("missing host"));
    }
    Ok(uri)
}
