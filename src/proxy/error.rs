//! Error types for the forwarding pipeline.

use axum::http::header::{InvalidHeaderName, InvalidHeaderValue};
use thiserror::Error;

use crate::adapter::AdapterError;

/// Errors returned by [`Proxy::to`](crate::proxy::Proxy::to).
///
/// Every variant means the forward did not complete. There is no partial
/// response attached to any of them.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// `to` was called while no request was bound.
    #[error("missing request instance: call forward() before to()")]
    MissingRequest,

    /// A request filter rejected the bound request.
    #[error("request filter #{index} ({filter}) failed: {source}")]
    RequestFilter {
        index: usize,
        filter: String,
        #[source]
        source: FilterError,
    },

    /// The adapter failed to deliver the request.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// A response filter rejected the upstream response.
    #[error("response filter #{index} ({filter}) failed: {source}")]
    ResponseFilter {
        index: usize,
        filter: String,
        #[source]
        source: FilterError,
    },
}

impl ProxyError {
    /// Short machine-readable label for logs, metrics and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::MissingRequest => "missing_request",
            ProxyError::RequestFilter { .. } => "request_filter",
            ProxyError::Adapter(_) => "adapter",
            ProxyError::ResponseFilter { .. } => "response_filter",
        }
    }
}

/// Failure signalled by a request or response filter.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The filter refused to let the message through.
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("invalid header name: {0}")]
    InvalidHeaderName(#[from] InvalidHeaderName),

    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl FilterError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        FilterError::Rejected(reason.into())
    }

    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        FilterError::Other(err.into())
    }
}
