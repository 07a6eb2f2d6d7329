//! Typed node and unit model returned to callers.
//!
//! Every value here is an owned snapshot. None of them refer back into the
//! session or its transport, so callers may keep them across reconnects.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

use crate::wire::WireValue;

/// Lifecycle state of a [`crate::ManagerSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    /// A transport is live and the manager object has been resolved.
    Connected,
    /// No transport is live; `connect` must succeed before calls resume.
    Disconnected,
    /// A connect attempt is in flight.
    Reconnecting,
    /// The session was closed and cannot be reused.
    Closed,
}

/// Opaque remote reference to an exported bus object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Wraps an object path received from the bus.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Borrows the textual path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Connectivity of a node as reported by the manager.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeStatus {
    /// The node agent is connected to the manager.
    Online,
    /// The node agent is not connected.
    Offline,
    /// The node agent is connected but reports problems.
    Degraded,
    /// The manager could not determine the node's status.
    Unknown,
}

/// A fleet member managed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Name unique within one manager.
    pub name: String,
    /// Connectivity as last reported.
    pub status: NodeStatus,
    /// Object exported for the node, when the reply carried it.
    pub object_path: Option<ObjectPath>,
    /// Address the node agent connected from, when reported.
    pub peer_address: Option<String>,
}

impl Node {
    /// Builds a node snapshot carrying only the name and status.
    #[must_use]
    pub fn new(name: impl Into<String>, status: NodeStatus) -> Self {
        Self {
            name: name.into(),
            status,
            object_path: None,
            peer_address: None,
        }
    }
}

/// systemd active state of a unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ActiveState {
    /// Started and running.
    Active,
    /// Reloading its configuration.
    Reloading,
    /// Stopped.
    Inactive,
    /// Stopped after a failure.
    Failed,
    /// Starting up.
    Activating,
    /// Shutting down.
    Deactivating,
    /// Undergoing maintenance operations.
    Maintenance,
    /// Refreshing its mount namespace.
    Refreshing,
}

/// systemd load state of a unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LoadState {
    /// Placeholder that has not been loaded yet.
    Stub,
    /// Loaded into memory.
    Loaded,
    /// The unit file does not exist.
    NotFound,
    /// The unit file could not be parsed.
    BadSetting,
    /// Loading failed for another reason.
    Error,
    /// Merged into another unit.
    Merged,
    /// Masked by the administrator.
    Masked,
}

/// A service or workload instance tracked on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    /// Unit name such as `httpd.service`.
    pub name: String,
    /// Name of the owning node; a lookup key, not a live handle.
    pub node: String,
    /// Active state.
    pub active_state: ActiveState,
    /// Load state.
    pub load_state: LoadState,
    /// Unit-type specific sub-state, when reported.
    pub sub_state: Option<String>,
    /// Human-readable description, when reported.
    pub description: Option<String>,
    /// Object exported for the unit, when reported.
    pub object_path: Option<ObjectPath>,
}

/// One named property decoded from an `a{sv}` reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Unwrapped property value.
    pub value: WireValue,
}

/// Properties keyed and ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropertyMap {
    entries: BTreeMap<String, WireValue>,
}

impl PropertyMap {
    /// Builds a map from decoded properties; later duplicates win.
    #[must_use]
    pub fn from_properties(properties: impl IntoIterator<Item = Property>) -> Self {
        Self {
            entries: properties
                .into_iter()
                .map(|property| (property.name, property.value))
                .collect(),
        }
    }

    /// Looks up a property value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&WireValue> {
        self.entries.get(name)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

/// Job queued by a unit lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    /// Object exported for the job.
    pub object_path: ObjectPath,
}

/// How a queued unit job interacts with jobs already pending.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum JobMode {
    /// Replace conflicting pending jobs.
    #[default]
    Replace,
    /// Fail if the job conflicts with pending jobs.
    Fail,
    /// Stop every unit not required by the new job.
    Isolate,
    /// Ignore unit dependencies.
    IgnoreDependencies,
    /// Ignore requirement dependencies only.
    IgnoreRequirements,
}

/// One symlink change reported by enable/disable calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFileChange {
    /// Change type such as `symlink` or `unlink`.
    pub kind: String,
    /// Path of the created or removed link.
    pub file: String,
    /// Link destination; empty for removals.
    pub destination: String,
}

/// Outcome of an enable or disable call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFileChanges {
    /// Whether the unit files carried install information (enable only).
    pub carries_install_info: Option<bool>,
    /// Changes in the order the node reported them.
    pub changes: Vec<UnitFileChange>,
}
