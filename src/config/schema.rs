//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where requests are forwarded and through which adapter.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Body size limits.
    pub limits: LimitConfig,

    /// Request and response filter chains.
    pub filters: FiltersConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Adapter used to reach the upstream.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// Plain HTTP through the pooled client.
    #[default]
    Http,
    /// Local echo, no network I/O.
    Echo,
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL; the inbound path and query are appended to it.
    pub target: String,

    /// Adapter implementation.
    pub adapter: AdapterKind,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            target: "http://127.0.0.1:3000".to_string(),
            adapter: AdapterKind::Http,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for handling one inbound request.
    pub request_secs: u64,

    /// Time allowed for the upstream exchange inside the adapter.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 25,
        }
    }
}

/// Body size limits in bytes.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimitConfig {
    pub max_request_body: usize,
    pub max_response_body: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_request_body: 2 * 1024 * 1024, // 2MB
            max_response_body: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Filter chains, applied in the order listed.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FiltersConfig {
    pub request: Vec<RequestFilterConfig>,
    pub response: Vec<ResponseFilterConfig>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            request: vec![RequestFilterConfig::StripHopByHop, RequestFilterConfig::ForwardedFor],
            response: vec![ResponseFilterConfig::StripHopByHop, ResponseFilterConfig::RemoveEncoding],
        }
    }
}

/// A request filter entry.
///
/// ```toml
/// [[filters.request]]
/// kind = "set_header"
/// name = "x-api-key"
/// value = "secret"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestFilterConfig {
    SetHeader { name: String, value: String },
    RemoveHeader { name: String },
    StripHopByHop,
    ForwardedFor,
}

/// A response filter entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseFilterConfig {
    SetHeader { name: String, value: String },
    RemoveHeader { name: String },
    StripHopByHop,
    RemoveEncoding,
    RemoveLocation,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
