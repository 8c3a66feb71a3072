//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all forwarding handler
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Build one Proxy per inbound request from the current pipeline
//! - Apply reloaded configuration to the pipeline
//! - Record request metrics

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
};
use arc_swap::ArcSwap;
use http_body_util::LengthLimitError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::adapter::{Adapter, EchoAdapter, HttpAdapter};
use crate::config::{AdapterKind, ProxyConfig};
use crate::http::pipeline::{Pipeline, PipelineError};
use crate::http::request::{UuidRequestId, request_id};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<dyn Adapter>,
    pub pipeline: Arc<ArcSwap<Pipeline>>,
    pub max_request_body: usize,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    pipeline: Arc<ArcSwap<Pipeline>>,
}

impl HttpServer {
    /// Create a server using the adapter named in the configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, PipelineError> {
        let adapter: Arc<dyn Adapter> = match config.upstream.adapter {
            AdapterKind::Http => Arc::new(HttpAdapter::from_config(&config)),
            AdapterKind::Echo => Arc::new(EchoAdapter),
        };
        Self::with_adapter(config, adapter)
    }

    /// Create a server around an explicit adapter.
    pub fn with_adapter(config: ProxyConfig, adapter: Arc<dyn Adapter>) -> Result<Self, PipelineError> {
        let pipeline = Arc::new(ArcSwap::from_pointee(Pipeline::from_config(&config)?));

        let state = AppState {
            adapter,
            pipeline: pipeline.clone(),
            max_request_body: config.limits.max_request_body,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            pipeline,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(forward_handler))
            .route("/{*path}", any(forward_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Every config received on `config_updates` replaces the forwarding
    /// pipeline; invalid ones are logged and ignored.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.target,
            adapter = ?self.config.upstream.adapter,
            "HTTP server starting"
        );

        let pipeline = self.pipeline.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                apply_config(&pipeline, &config);
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// A clone of the router, for serving without `run`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Swap in the pipeline described by `config`, keeping the old one on error.
pub fn apply_config(pipeline: &ArcSwap<Pipeline>, config: &ProxyConfig) -> bool {
    match Pipeline::from_config(config) {
        Ok(next) => {
            tracing::info!(
                upstream = %next.target(),
                request_filters = config.filters.request.len(),
                response_filters = config.filters.response.len(),
                "Forwarding pipeline reloaded"
            );
            pipeline.store(Arc::new(next));
            metrics::record_pipeline_reload(true);
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Rejected pipeline reload, keeping current pipeline");
            metrics::record_pipeline_reload(false);
            false
        }
    }
}

/// Buffers the inbound request, forwards it and returns the filtered response.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().to_string();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_request_body).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let (status, message) = if exceeds_limit(&e) {
                (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
            } else {
                (StatusCode::BAD_REQUEST, "Failed to read request body")
            };
            tracing::warn!(request_id = %request_id, status = status.as_u16(), error = %e, "Failed to read request body");
            metrics::record_request(&method, status.as_u16(), "request_body", start_time);
            return (status, message).into_response();
        }
    };

    let pipeline = state.pipeline.load_full();
    let target = pipeline.target_for(&parts.uri);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        upstream = %target,
        "Forwarding request"
    );

    let mut proxy = pipeline.proxy(state.adapter.clone());
    match proxy.forward(Request::from_parts(parts, body)).to(&target).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), "forwarded", start_time);
            response.map(Body::from)
        }
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                upstream = %target,
                stage = e.kind(),
                error = %e,
                "Forward failed"
            );
            metrics::record_stage_failure(e.kind());
            let response = e.into_response();
            metrics::record_request(&method, response.status().as_u16(), "failed", start_time);
            response
        }
    }
}

/// Whether a body read failed because the configured limit was exceeded.
fn exceeds_limit(error: &axum::Error) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}
