//! Catalogue of operations issued by the session.

use std::fmt;

/// Operation being executed when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerOperation {
    /// Transport establishment and manager resolution.
    Connect,
    /// `Manager.ListNodes`.
    ListNodes,
    /// `Manager.ListUnits`.
    ListUnits,
    /// `Manager.GetNode` followed by a node property fetch.
    GetNode,
    /// `Node.GetUnitProperties`.
    GetUnit,
    /// `Node.StartUnit`.
    StartUnit,
    /// `Node.StopUnit`.
    StopUnit,
    /// `Node.RestartUnit`.
    RestartUnit,
    /// `Node.ReloadUnit`.
    ReloadUnit,
    /// `Node.FreezeUnit`.
    FreezeUnit,
    /// `Node.ThawUnit`.
    ThawUnit,
    /// `Node.ResetFailedUnit`.
    ResetFailedUnit,
    /// `Node.EnableUnitFiles`.
    EnableUnitFiles,
    /// `Node.DisableUnitFiles`.
    DisableUnitFiles,
    /// `Node.Reload`.
    DaemonReload,
    /// `Manager.SetLogLevel`.
    SetLogLevel,
    /// `Manager.CreateMonitor`.
    CreateMonitor,
    /// `Monitor.Close`.
    CloseMonitor,
}

impl ManagerOperation {
    /// Whether repeating the operation after an ambiguous failure cannot
    /// change remote state beyond what a single success would.
    ///
    /// Unit-mutating calls are treated as unsafe to repeat: a restart that
    /// timed out may already have run.
    #[must_use]
    pub const fn is_idempotent(self) -> bool {
        matches!(
            self,
            Self::Connect
                | Self::ListNodes
                | Self::ListUnits
                | Self::GetNode
                | Self::GetUnit
                | Self::SetLogLevel
                | Self::CloseMonitor
        )
    }
}

impl fmt::Display for ManagerOperation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Connect => "connect",
            Self::ListNodes => "list nodes",
            Self::ListUnits => "list units",
            Self::GetNode => "get node",
            Self::GetUnit => "get unit",
            Self::StartUnit => "start unit",
            Self::StopUnit => "stop unit",
            Self::RestartUnit => "restart unit",
            Self::ReloadUnit => "reload unit",
            Self::FreezeUnit => "freeze unit",
            Self::ThawUnit => "thaw unit",
            Self::ResetFailedUnit => "reset failed unit",
            Self::EnableUnitFiles => "enable unit files",
            Self::DisableUnitFiles => "disable unit files",
            Self::DaemonReload => "daemon reload",
            Self::SetLogLevel => "set log level",
            Self::CreateMonitor => "create monitor",
            Self::CloseMonitor => "close monitor",
        };
        formatter.write_str(label)
    }
}

/// Advice derived from a failure for callers that implement retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryHint {
    /// The same call may be issued again straight away.
    Retry,
    /// The call may be retried once the caller has backed off.
    Backoff,
    /// The session must `connect` again before the call can be retried.
    Reconnect,
    /// Retrying cannot help or may repeat a side effect.
    Never,
}
