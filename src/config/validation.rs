//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that filter entries name valid headers
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::{AdapterKind, ProxyConfig, RequestFilterConfig, ResponseFilterConfig};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("upstream.target {target:?}: {reason}")]
    Target { target: String, reason: String },

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeouts.upstream_secs ({upstream}) exceeds timeouts.request_secs ({request})")]
    UpstreamTimeoutTooLong { upstream: u64, request: u64 },

    #[error("limits.{0} must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("filters.{chain}[{index}]: {reason}")]
    Filter {
        chain: &'static str,
        index: usize,
        reason: String,
    },

    #[error("observability.log_level {0:?} is not a valid level")]
    LogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Check every semantic rule and collect all violations.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if let Err(reason) = check_target(&config.upstream.target, config.upstream.adapter) {
        errors.push(ValidationError::Target {
            target: config.upstream.target.clone(),
            reason,
        });
    }

    let timeouts = &config.timeouts;
    if timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }
    if timeouts.upstream_secs > timeouts.request_secs && timeouts.request_secs > 0 {
        errors.push(ValidationError::UpstreamTimeoutTooLong {
            upstream: timeouts.upstream_secs,
            request: timeouts.request_secs,
        });
    }

    if config.limits.max_request_body == 0 {
        errors.push(ValidationError::ZeroLimit("max_request_body"));
    }
    if config.limits.max_response_body == 0 {
        errors.push(ValidationError::ZeroLimit("max_response_body"));
    }

    for (index, entry) in config.filters.request.iter().enumerate() {
        let checked = match entry {
            RequestFilterConfig::SetHeader { name, value } => check_header(name, Some(value)),
            RequestFilterConfig::RemoveHeader { name } => check_header(name, None),
            RequestFilterConfig::StripHopByHop | RequestFilterConfig::ForwardedFor => Ok(()),
        };
        if let Err(reason) = checked {
            errors.push(ValidationError::Filter { chain: "request", index, reason });
        }
    }

    for (index, entry) in config.filters.response.iter().enumerate() {
        let checked = match entry {
            ResponseFilterConfig::SetHeader { name, value } => check_header(name, Some(value)),
            ResponseFilterConfig::RemoveHeader { name } => check_header(name, None),
            ResponseFilterConfig::StripHopByHop
            | ResponseFilterConfig::RemoveEncoding
            | ResponseFilterConfig::RemoveLocation => Ok(()),
        };
        if let Err(reason) = checked {
            errors.push(ValidationError::Filter { chain: "response", index, reason });
        }
    }

    let observability = &config.observability;
    if observability.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::LogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_target(target: &str, adapter: AdapterKind) -> Result<(), String> {
    let url = Url::parse(target).map_err(|e| e.to_string())?;
    if adapter == AdapterKind::Http && url.scheme() != "http" {
        return Err(format!("scheme {:?} is not supported, use http", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("base URL must not carry a query or fragment".to_string());
    }
    Ok(())
}

fn check_header(name: &str, value: Option<&String>) -> Result<(), String> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| format!("invalid header name {name:?}"))?;
    if let Some(value) = value {
        HeaderValue::from_str(value).map_err(|_| format!("invalid value for header {name:?}"))?;
    }
    Ok(())
}
