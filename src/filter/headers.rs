//! Header manipulation filters.
//!
//! Each filter here works on both chains: the same rule can be applied to
//! the outgoing request or to the upstream response.

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};

use crate::proxy::{FilterError, ProxyRequest, ProxyResponse, RequestFilter, ResponseFilter};

/// Headers that only apply to a single transport hop (RFC 7230 §6.1).
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Insert a header, replacing any existing values.
#[derive(Debug, Clone)]
pub struct SetHeader {
    name: HeaderName,
    value: HeaderValue,
}

impl SetHeader {
    pub fn new(name: &str, value: &str) -> Result<Self, FilterError> {
        Ok(Self {
            name: HeaderName::from_bytes(name.as_bytes())?,
            value: HeaderValue::from_str(value)?,
        })
    }

    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(self.name.clone(), self.value.clone());
    }
}

impl RequestFilter for SetHeader {
    fn filter(&self, request: &mut ProxyRequest) -> Result<(), FilterError> {
        self.apply(request.headers_mut());
        Ok(())
    }

    fn name(&self) -> &str {
        "set_header"
    }
}

impl ResponseFilter for SetHeader {
    fn filter(&self, response: &mut ProxyResponse) -> Result<(), FilterError> {
        self.apply(response.headers_mut());
        Ok(())
    }

    fn name(&self) -> &str {
        "set_header"
    }
}

/// Remove every value of a header.
#[derive(Debug, Clone)]
pub struct RemoveHeader {
    name: HeaderName,
}

impl RemoveHeader {
    pub fn new(name: &str) -> Result<Self, FilterError> {
        Ok(Self {
            name: HeaderName::from_bytes(name.as_bytes())?,
        })
    }
}

impl RequestFilter for RemoveHeader {
    fn filter(&self, request: &mut ProxyRequest) -> Result<(), FilterError> {
        request.headers_mut().remove(&self.name);
        Ok(())
    }

    fn name(&self) -> &str {
        "remove_header"
    }
}

impl ResponseFilter for RemoveHeader {
    fn filter(&self, response: &mut ProxyResponse) -> Result<(), FilterError> {
        response.headers_mut().remove(&self.name);
        Ok(())
    }

    fn name(&self) -> &str {
        "remove_header"
    }
}

/// Strip hop-by-hop headers, including any listed in `Connection`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripHopByHop;

impl StripHopByHop {
    fn apply(headers: &mut HeaderMap) {
        let listed: Vec<HeaderName> = headers
            .get_all(header::CONNECTION)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
            .collect();

        for name in listed {
            headers.remove(name);
        }
        for name in HOP_BY_HOP {
            headers.remove(name);
        }
    }
}

impl RequestFilter for StripHopByHop {
    fn filter(&self, request: &mut ProxyRequest) -> Result<(), FilterError> {
        Self::apply(request.headers_mut());
        Ok(())
    }

    fn name(&self) -> &str {
        "strip_hop_by_hop"
    }
}

impl ResponseFilter for StripHopByHop {
    fn filter(&self, response: &mut ProxyResponse) -> Result<(), FilterError> {
        Self::apply(response.headers_mut());
        Ok(())
    }

    fn name(&self) -> &str {
        "strip_hop_by_hop"
    }
}
