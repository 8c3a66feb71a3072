//! Transport adapters.
//!
//! # Responsibilities
//! - Deliver a filtered request to a target and materialize the response
//! - Own every I/O concern: connection handling, timeouts, body limits
//!
//! # Design Decisions
//! - The adapter borrows the request, so the proxy keeps it bound after send
//! - Errors are opaque to the proxy and reach the caller unchanged
//! - Any deadline is enforced here; the proxy itself never times out

pub mod echo;
pub mod http_client;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::proxy::{ProxyRequest, ProxyResponse};

pub use echo::EchoAdapter;
pub use http_client::HttpAdapter;

/// Sends a prepared request to a destination.
#[async_trait]
pub trait Adapter: Send + Sync {
    async fn send(&self, request: &ProxyRequest, target: &str) -> Result<ProxyResponse, AdapterError>;
}

/// Transport-level failure reported by an adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The target could not be used as a destination.
    #[error("invalid target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// The upstream exchange exceeded the adapter's deadline.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// Connecting to or talking with the upstream failed.
    #[error("upstream transport error: {0}")]
    Transport(#[source] hyper_util::client::legacy::Error),

    /// The upstream body could not be read.
    #[error("failed to read upstream body: {0}")]
    Body(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl AdapterError {
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        AdapterError::Other(err.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AdapterError::Timeout(_))
    }
}
