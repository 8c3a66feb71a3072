//! Mapping forwarding failures to client responses.
//!
//! # Design Decisions
//! - Rejected requests are the client's problem (400)
//! - Anything the upstream side did wrong is a gateway error (502/504)
//! - Error bodies are small JSON documents with a stable `error` kind

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::proxy::ProxyError;

pub fn status_for(error: &ProxyError) -> StatusCode {
    match error {
        ProxyError::MissingRequest => StatusCode::INTERNAL_SERVER_ERROR,
        ProxyError::RequestFilter { .. } => StatusCode::BAD_REQUEST,
        ProxyError::Adapter(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        ProxyError::Adapter(_) | ProxyError::ResponseFilter { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
