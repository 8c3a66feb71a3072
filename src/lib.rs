//! Request forwarding through pluggable adapters and ordered filter chains.
//!
//! ```no_run
//! use std::sync::Arc;
//! use forward_proxy::{Proxy, adapter::HttpAdapter, filter::StripHopByHop};
//! # async fn run(request: forward_proxy::ProxyRequest) -> Result<(), forward_proxy::ProxyError> {
//! let adapter = Arc::new(HttpAdapter::new(std::time::Duration::from_secs(10), 1 << 20));
//! let mut proxy = Proxy::new(adapter);
//! proxy.add_request_filter(StripHopByHop);
//! let response = proxy.forward(request).to("http://127.0.0.1:3000/").await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use adapter::{Adapter, AdapterError};
pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::{
    FilterChain, FilterError, FnFilter, Proxy, ProxyError, ProxyRequest, ProxyResponse, RequestFilter,
    ResponseFilter,
};
