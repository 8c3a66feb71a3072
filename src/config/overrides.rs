//! Command-line overrides layered on top of the configuration file.

use crate::config::schema::{AdapterKind, ProxyConfig};

/// Values given on the command line that win over the file.
///
/// Applied once at startup and again to every reloaded file, so a reload
/// never silently drops them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub target: Option<String>,
    pub echo: bool,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.bind_address.is_none() && self.target.is_none() && !self.echo
    }

    pub fn apply(&self, config: &mut ProxyConfig) {
        if let Some(bind) = &self.bind_address {
            config.listener.bind_address = bind.clone();
        }
        if let Some(target) = &self.target {
            if config.upstream.target != *target {
                tracing::debug!(
                    file = %config.upstream.target,
                    cli_target = %target,
                    "Command line target overrides configured upstream"
                );
            }
            config.upstream.target = target.clone();
        }
        if self.echo {
            config.upstream.adapter = AdapterKind::Echo;
        }
    }
}
