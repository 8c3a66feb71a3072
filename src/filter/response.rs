//! Response-only filters.

use axum::http::{HeaderName, header};

use crate::proxy::{FilterError, ProxyResponse, ResponseFilter};

static X_PROXY_LOCATION: HeaderName = HeaderName::from_static("x-proxy-location");

/// Drop framing headers from a buffered upstream response.
///
/// The body is already fully read, so the serving side recomputes framing.
/// Required whenever a later filter may change the body length.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveEncoding;

impl ResponseFilter for RemoveEncoding {
    fn filter(&self, response: &mut ProxyResponse) -> Result<(), FilterError> {
        let headers = response.headers_mut();
        headers.remove(header::TRANSFER_ENCODING);
        headers.remove(header::CONTENT_LENGTH);
        Ok(())
    }

    fn name(&self) -> &str {
        "remove_encoding"
    }
}

/// Keep upstream redirects from moving the client off the proxy.
///
/// `Location` is renamed to `X-Proxy-Location`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveLocation;

impl ResponseFilter for RemoveLocation {
    fn filter(&self, response: &mut ProxyResponse) -> Result<(), FilterError> {
        let headers = response.headers_mut();
        if let Some(location) = headers.remove(header::LOCATION) {
            headers.insert(X_PROXY_LOCATION.clone(), location);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "remove_location"
    }
}
