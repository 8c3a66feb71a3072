//! `X-Forwarded-*` request headers.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{HeaderName, HeaderValue, header};

use crate::proxy::{FilterError, ProxyRequest, RequestFilter};

static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
static X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Record the client address and original host.
///
/// The peer is read from the `ConnectInfo` extension the embedding server
/// attaches; without it the filter leaves `X-Forwarded-For` untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardedFor;

impl RequestFilter for ForwardedFor {
    fn filter(&self, request: &mut ProxyRequest) -> Result<(), FilterError> {
        if let Some(peer) = request.extensions().get::<ConnectInfo<SocketAddr>>().map(|info| info.0) {
            let ip = peer.ip().to_string();
            let value = match request.headers().get(&X_FORWARDED_FOR) {
                Some(existing) => {
                    let existing = existing
                        .to_str()
                        .map_err(|_| FilterError::rejected("malformed x-forwarded-for header"))?;
                    format!("{existing}, {ip}")
                }
                None => ip,
            };
            request
                .headers_mut()
                .insert(X_FORWARDED_FOR.clone(), HeaderValue::from_str(&value)?);
        }

        if !request.headers().contains_key(&X_FORWARDED_HOST) {
            if let Some(host) = request.headers().get(header::HOST).cloned() {
                request.headers_mut().insert(X_FORWARDED_HOST.clone(), host);
            }
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "forwarded_for"
    }
}
