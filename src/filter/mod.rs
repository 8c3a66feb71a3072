//! Concrete filters and their construction from configuration.
//!
//! # Data Flow
//! ```text
//! FiltersConfig (TOML entries, in order)
//!     → request_chain / response_chain
//!     → FilterChain<dyn RequestFilter> / FilterChain<dyn ResponseFilter>
//!     → cloned into every per-request Proxy
//! ```

pub mod forwarded;
pub mod headers;
pub mod response;

use std::sync::Arc;

use crate::config::{RequestFilterConfig, ResponseFilterConfig};
use crate::proxy::{FilterChain, FilterError, RequestFilter, ResponseFilter};

pub use forwarded::ForwardedFor;
pub use headers::{RemoveHeader, SetHeader, StripHopByHop};
pub use response::{RemoveEncoding, RemoveLocation};

/// Build the request chain described by `entries`, preserving their order.
pub fn request_chain(entries: &[RequestFilterConfig]) -> Result<FilterChain<dyn RequestFilter>, FilterError> {
    entries
        .iter()
        .map(|entry| {
            let filter: Arc<dyn RequestFilter> = match entry {
                RequestFilterConfig::SetHeader { name, value } => Arc::new(SetHeader::new(name, value)?),
                RequestFilterConfig::RemoveHeader { name } => Arc::new(RemoveHeader::new(name)?),
                RequestFilterConfig::StripHopByHop => Arc::new(StripHopByHop),
                RequestFilterConfig::ForwardedFor => Arc::new(ForwardedFor),
            };
            Ok::<_, FilterError>(filter)
        })
        .collect()
}

/// Build the response chain described by `entries`, preserving their order.
pub fn response_chain(entries: &[ResponseFilterConfig]) -> Result<FilterChain<dyn ResponseFilter>, FilterError> {
    entries
        .iter()
        .map(|entry| {
            let filter: Arc<dyn ResponseFilter> = match entry {
                ResponseFilterConfig::SetHeader { name, value } => Arc::new(SetHeader::new(name, value)?),
                ResponseFilterConfig::RemoveHeader { name } => Arc::new(RemoveHeader::new(name)?),
                ResponseFilterConfig::StripHopByHop => Arc::new(StripHopByHop),
                ResponseFilterConfig::RemoveEncoding => Arc::new(RemoveEncoding),
                ResponseFilterConfig::RemoveLocation => Arc::new(RemoveLocation),
            };
            Ok::<_, FilterError>(filter)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_chain_keeps_config_order() {
        let chain = request_chain(&[
            RequestFilterConfig::StripHopByHop,
            RequestFilterConfig::SetHeader {
                name: "x-a".into(),
                value: "1".into(),
            },
            RequestFilterConfig::ForwardedFor,
        ])
        .unwrap();

        let names: Vec<&str> = chain.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["strip_hop_by_hop", "set_header", "forwarded_for"]);
    }

    #[test]
    fn test_response_chain_rejects_invalid_header() {
        let result = response_chain(&[ResponseFilterConfig::RemoveHeader { name: "bad name".into() }]);
        assert!(matches!(result, Err(FilterError::InvalidHeaderName(_))));
    }
}
