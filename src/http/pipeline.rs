//! Hot-swappable forwarding pipeline.
//!
//! A [`Pipeline`] is the reloadable part of the configuration: the upstream
//! base URL and both filter chains. The server keeps the current one behind
//! an `ArcSwap` and stamps a fresh [`Proxy`] out of it for every request.

use std::sync::Arc;

use axum::http::Uri;
use thiserror::Error;
use url::Url;

use crate::adapter::Adapter;
use crate::config::ProxyConfig;
use crate::filter;
use crate::proxy::{FilterChain, FilterError, Proxy, RequestFilter, ResponseFilter};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid upstream target: {0}")]
    Target(#[from] url::ParseError),

    #[error("invalid filter configuration: {0}")]
    Filter(#[from] FilterError),
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    target: Url,
    request_filters: FilterChain<dyn RequestFilter>,
    response_filters: FilterChain<dyn ResponseFilter>,
}

impl Pipeline {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            target: Url::parse(&config.upstream.target)?,
            request_filters: filter::request_chain(&config.filters.request)?,
            response_filters: filter::response_chain(&config.filters.response)?,
        })
    }

    /// A new proxy bound to `adapter` and seeded with this pipeline's chains.
    pub fn proxy(&self, adapter: Arc<dyn Adapter>) -> Proxy {
        let mut proxy = Proxy::new(adapter);
        proxy.set_request_filter(self.request_filters.clone());
        proxy.set_response_filter(self.response_filters.clone());
        proxy
    }

    /// Join the upstream base URL with the inbound path and query.
    pub fn target_for(&self, uri: &Uri) -> String {
        let base = self.target.as_str().trim_end_matches('/');
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        format!("{base}{path_and_query}")
    }

    pub fn target(&self) -> &Url {
        &self.target
    }
}
