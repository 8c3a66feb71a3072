//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → overrides.rs re-applies command line values
//!     → server rebuilds the forwarding pipeline and swaps it in
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Only the pipeline (target + filters) is hot-reloadable; listener,
//!   adapter and timeouts need a restart

pub mod loader;
pub mod overrides;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{ConfigError, load_config};
pub use overrides::ConfigOverrides;
pub use schema::{
    AdapterKind, FiltersConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig,
    RequestFilterConfig, ResponseFilterConfig, UpstreamConfig,
};
