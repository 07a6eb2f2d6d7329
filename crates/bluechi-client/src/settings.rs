//! Session settings derived from the shared configuration.

use std::time::Duration;

use bluechi_config::{BusEndpoint, Config, ReconnectPolicy};

use crate::transport::ObjectAddress;

/// Interface used for the systemd properties of a unit.
pub(crate) const SYSTEMD_UNIT_INTERFACE: &str = "org.freedesktop.systemd1.Unit";

/// Interface exported by monitor objects.
pub(crate) const MONITOR_INTERFACE: &str = "org.eclipse.bluechi.Monitor";

/// Standard interface for fetching exported properties.
pub(crate) const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// Everything a [`crate::ManagerSession`] needs to reach the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    endpoint: BusEndpoint,
    manager: ObjectAddress,
    node_interface: String,
    call_timeout: Duration,
    reconnect_policy: ReconnectPolicy,
}

impl SessionSettings {
    /// Extracts the session-relevant parts of `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.bus().clone(),
            manager: ObjectAddress::new(
                config.manager_service(),
                config.manager_path(),
                config.manager_interface(),
            ),
            node_interface: config.node_interface().to_owned(),
            call_timeout: config.call_timeout(),
            reconnect_policy: config.reconnect_policy(),
        }
    }

    /// Replaces the per-call budget.
    #[must_use]
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Replaces the reconnect policy.
    #[must_use]
    pub fn with_reconnect_policy(mut self, reconnect_policy: ReconnectPolicy) -> Self {
        self.reconnect_policy = reconnect_policy;
        self
    }

    /// Replaces the bus endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: BusEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Bus hosting the manager.
    #[must_use]
    pub const fn endpoint(&self) -> &BusEndpoint {
        &self.endpoint
    }

    /// Address of the manager object.
    #[must_use]
    pub const fn manager(&self) -> &ObjectAddress {
        &self.manager
    }

    /// Interface exported by per-node objects.
    #[must_use]
    pub fn node_interface(&self) -> &str {
        self.node_interface.as_str()
    }

    /// Budget for one remote call.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Behaviour of callers that meet a reconnect in progress.
    #[must_use]
    pub const fn reconnect_policy(&self) -> ReconnectPolicy {
        self.reconnect_policy
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
