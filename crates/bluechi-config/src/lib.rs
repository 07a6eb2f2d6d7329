//! Shared configuration for the BlueChi control-plane client.
//!
//! Both the client library and the `bluechictl` binary agree on where the
//! manager lives and how long a remote call may take by loading a single
//! [`Config`]. Values are layered by `ortho_config`: built-in defaults, then an
//! optional TOML file (`--config-path`), then `BLUECHI_*` environment
//! variables, then command-line flags.

mod bus;
mod defaults;
mod logging;
mod policy;

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use bus::{BusEndpoint, BusEndpointParseError};
pub use defaults::{
    DEFAULT_CALL_TIMEOUT_MS, DEFAULT_LOG_FILTER, DEFAULT_MANAGER_INTERFACE, DEFAULT_MANAGER_PATH,
    DEFAULT_MANAGER_SERVICE, DEFAULT_NODE_INTERFACE, default_bus_endpoint, default_call_timeout,
    default_log_filter, default_log_filter_string, default_log_format, default_manager_interface,
    default_manager_path, default_manager_service, default_node_interface,
    default_reconnect_policy,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use policy::{ReconnectPolicy, ReconnectPolicyParseError};

/// Layered configuration shared by the client library and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "BLUECHI")]
pub struct Config {
    /// Bus hosting the manager (`system`, `session`, or a D-Bus address).
    #[ortho_config(default = default_bus_endpoint())]
    pub bus: BusEndpoint,
    /// Well-known bus name claimed by the manager daemon.
    #[ortho_config(default = default_manager_service())]
    pub manager_service: String,
    /// Object path of the manager object.
    #[ortho_config(default = default_manager_path())]
    pub manager_path: String,
    /// Interface carrying the manager methods.
    #[ortho_config(default = default_manager_interface())]
    pub manager_interface: String,
    /// Interface exported by per-node objects.
    #[ortho_config(default = default_node_interface())]
    pub node_interface: String,
    /// Budget for a single remote call in milliseconds.
    #[ortho_config(default = DEFAULT_CALL_TIMEOUT_MS)]
    pub call_timeout_ms: u64,
    /// Behaviour of callers that meet a session mid-reconnect.
    #[ortho_config(default = default_reconnect_policy())]
    pub reconnect_policy: ReconnectPolicy,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log line format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: default_bus_endpoint(),
            manager_service: default_manager_service(),
            manager_path: default_manager_path(),
            manager_interface: default_manager_interface(),
            node_interface: default_node_interface(),
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            reconnect_policy: default_reconnect_policy(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Bus hosting the manager.
    #[must_use]
    pub const fn bus(&self) -> &BusEndpoint {
        &self.bus
    }

    /// Well-known bus name of the manager daemon.
    #[must_use]
    pub fn manager_service(&self) -> &str {
        self.manager_service.as_str()
    }

    /// Object path of the manager object.
    #[must_use]
    pub fn manager_path(&self) -> &str {
        self.manager_path.as_str()
    }

    /// Interface carrying the manager methods.
    #[must_use]
    pub fn manager_interface(&self) -> &str {
        self.manager_interface.as_str()
    }

    /// Interface exported by per-node objects.
    #[must_use]
    pub fn node_interface(&self) -> &str {
        self.node_interface.as_str()
    }

    /// Budget for a single remote call.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Behaviour of callers that meet a session mid-reconnect.
    #[must_use]
    pub const fn reconnect_policy(&self) -> ReconnectPolicy {
        self.reconnect_policy
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log line format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
