//! HTTP server embedding the forwarding core.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → pipeline.rs (current target + filter chains → per-request Proxy)
//!     → Proxy::forward(..).to(..)
//!     → response.rs (map errors to status codes)
//!     → Send to client
//! ```

pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use pipeline::{Pipeline, PipelineError};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
