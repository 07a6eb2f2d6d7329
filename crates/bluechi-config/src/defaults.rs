use std::time::Duration;

use crate::bus::BusEndpoint;
use crate::logging::LogFormat;
use crate::policy::ReconnectPolicy;

/// Well-known bus name claimed by the BlueChi manager.
pub const DEFAULT_MANAGER_SERVICE: &str = "org.eclipse.bluechi";

/// Object path exporting the manager interface.
pub const DEFAULT_MANAGER_PATH: &str = "/org/eclipse/bluechi";

/// Interface carrying the manager methods (`ListNodes`, `GetNode`, ...).
pub const DEFAULT_MANAGER_INTERFACE: &str = "org.eclipse.bluechi.Manager";

/// Interface exported by every per-node object.
pub const DEFAULT_NODE_INTERFACE: &str = "org.eclipse.bluechi.Node";

/// Budget for a single remote call, in milliseconds.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Bus used when nothing else is configured.
#[must_use]
pub const fn default_bus_endpoint() -> BusEndpoint {
    BusEndpoint::System
}

/// Owned manager service name used where allocation is required.
#[must_use]
pub fn default_manager_service() -> String {
    DEFAULT_MANAGER_SERVICE.to_owned()
}

/// Owned manager object path used where allocation is required.
#[must_use]
pub fn default_manager_path() -> String {
    DEFAULT_MANAGER_PATH.to_owned()
}

/// Owned manager interface name used where allocation is required.
#[must_use]
pub fn default_manager_interface() -> String {
    DEFAULT_MANAGER_INTERFACE.to_owned()
}

/// Owned node interface name used where allocation is required.
#[must_use]
pub fn default_node_interface() -> String {
    DEFAULT_NODE_INTERFACE.to_owned()
}

/// Default per-call timeout.
#[must_use]
pub const fn default_call_timeout() -> Duration {
    Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS)
}

/// Default reconnect policy.
#[must_use]
pub const fn default_reconnect_policy() -> ReconnectPolicy {
    ReconnectPolicy::Wait
}

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
