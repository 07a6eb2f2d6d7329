//! Error types surfaced by the manager session.

use std::fmt;
use std::time::Duration;

use bluechi_config::BusEndpoint;
use serde::Serialize;
use thiserror::Error;

use crate::decode::DecodeError;
use crate::operation::{ManagerOperation, RetryHint};
use crate::transport::{ConnectFault, ObjectAddress};

/// Why an in-flight call lost its transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// The connection dropped, or the session was not connected.
    Disconnected,
    /// No reply arrived within the caller's budget.
    Timeout,
    /// The transport failed to send or receive for another reason.
    Failed,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disconnected => "disconnected",
            Self::Timeout => "timed out",
            Self::Failed => "transport failure",
        };
        formatter.write_str(label)
    }
}

/// Classified transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct TransportFault {
    kind: TransportErrorKind,
    detail: String,
}

impl TransportFault {
    /// The connection dropped or was never established.
    #[must_use]
    pub fn disconnected(detail: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Disconnected,
            detail: detail.into(),
        }
    }

    /// The reply did not arrive within `budget`.
    #[must_use]
    pub fn timeout(budget: Duration) -> Self {
        Self {
            kind: TransportErrorKind::Timeout,
            detail: format!("no reply within {}ms", budget.as_millis()),
        }
    }

    /// Any other transport failure.
    #[must_use]
    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Failed,
            detail: detail.into(),
        }
    }

    /// Classification of the fault.
    #[must_use]
    pub const fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// Free-form detail supplied by the transport.
    #[must_use]
    pub fn detail(&self) -> &str {
        self.detail.as_str()
    }
}

/// Broad category of an error reported by the manager or a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    /// The named node, unit, or object does not exist.
    NotFound,
    /// The caller lacks permission for the operation.
    PermissionDenied,
    /// The arguments were rejected.
    InvalidArguments,
    /// The peer does not implement the requested method or interface.
    Unsupported,
    /// The peer attempted the operation and it failed.
    Failed,
    /// Any other error name.
    Other,
}

impl RemoteErrorKind {
    /// Classifies a bus error name by its final component.
    #[must_use]
    pub fn classify(error_name: &str) -> Self {
        let leaf = error_name.rsplit('.').next().unwrap_or(error_name);
        match leaf {
            "UnknownObject" | "ServiceUnknown" | "NoSuchUnit" | "FileNotFound" => {
                Self::NotFound
            }
            "AccessDenied" | "AuthFailed" | "InteractiveAuthorizationRequired" => {
                Self::PermissionDenied
            }
            "InvalidArgs" | "InvalidSignature" => Self::InvalidArguments,
            "UnknownMethod" | "UnknownInterface" | "UnknownProperty" | "NotSupported" => {
                Self::Unsupported
            }
            "Failed" => Self::Failed,
            other if other.ends_with("NotFound") => Self::NotFound,
            other if other.ends_with("Denied") => Self::PermissionDenied,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::InvalidArguments => "invalid arguments",
            Self::Unsupported => "unsupported",
            Self::Failed => "failed",
            Self::Other => "remote error",
        };
        formatter.write_str(label)
    }
}

/// Error explicitly returned by the manager daemon or a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct RemoteFault {
    name: String,
    kind: RemoteErrorKind,
    message: String,
}

impl RemoteFault {
    /// Builds a fault from the bus error name and message, classifying it.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: RemoteErrorKind::classify(&name),
            name,
            message: message.into(),
        }
    }

    /// Bus error name exactly as the peer sent it.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Classified category.
    #[must_use]
    pub const fn kind(&self) -> RemoteErrorKind {
        self.kind
    }

    /// Message attached by the peer.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Errors returned by [`crate::ManagerSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The bus could not be reached at all.
    #[error("failed to connect to the {endpoint} bus: {source}")]
    Connection {
        /// Endpoint the session tried to reach.
        endpoint: BusEndpoint,
        /// Underlying transport failure.
        #[source]
        source: ConnectFault,
    },

    /// The manager or a node object is not addressable on the bus.
    #[error("cannot resolve {address}: {reason}")]
    Resolution {
        /// Object the session tried to resolve.
        address: ObjectAddress,
        /// Why resolution failed.
        reason: String,
    },

    /// The call lost its transport or timed out.
    #[error("{operation} failed: {fault}")]
    Transport {
        /// Operation that failed.
        operation: ManagerOperation,
        /// Classified transport fault.
        #[source]
        fault: TransportFault,
    },

    /// The daemon explicitly rejected the call.
    #[error("{operation} rejected ({}): {fault}", .fault.kind())]
    Remote {
        /// Operation that failed.
        operation: ManagerOperation,
        /// Error name, category, and message from the daemon.
        #[source]
        fault: RemoteFault,
    },

    /// The reply did not match any accepted shape.
    #[error("{operation} returned an unexpected reply: {source}")]
    Decode {
        /// Operation whose reply was rejected.
        operation: ManagerOperation,
        /// Decoder diagnostic.
        #[source]
        source: DecodeError,
    },

    /// The session was closed.
    #[error("the manager session is closed")]
    Closed,
}

impl SessionError {
    /// Wraps a transport establishment failure.
    pub(crate) const fn connection(endpoint: BusEndpoint, source: ConnectFault) -> Self {
        Self::Connection { endpoint, source }
    }

    /// Builds a resolution failure for `address`.
    pub(crate) fn resolution(address: ObjectAddress, reason: impl Into<String>) -> Self {
        Self::Resolution {
            address,
            reason: reason.into(),
        }
    }

    /// Wraps a transport fault raised during `operation`.
    pub(crate) const fn transport(operation: ManagerOperation, fault: TransportFault) -> Self {
        Self::Transport { operation, fault }
    }

    /// Wraps a remote fault raised during `operation`.
    pub(crate) const fn remote(operation: ManagerOperation, fault: RemoteFault) -> Self {
        Self::Remote { operation, fault }
    }

    /// Wraps a decoder failure raised during `operation`.
    pub(crate) const fn decode(operation: ManagerOperation, source: DecodeError) -> Self {
        Self::Decode { operation, source }
    }

    /// Operation that failed, where one was in progress.
    #[must_use]
    pub const fn operation(&self) -> Option<ManagerOperation> {
        match self {
            Self::Transport { operation, .. }
            | Self::Remote { operation, .. }
            | Self::Decode { operation, .. } => Some(*operation),
            Self::Connection { .. } | Self::Resolution { .. } => Some(ManagerOperation::Connect),
            Self::Closed => None,
        }
    }

    /// Category of a remote rejection, if this is one.
    #[must_use]
    pub const fn remote_kind(&self) -> Option<RemoteErrorKind> {
        match self {
            Self::Remote { fault, .. } => Some(fault.kind()),
            _ => None,
        }
    }

    /// Category of a transport failure, if this is one.
    #[must_use]
    pub const fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Self::Transport { fault, .. } => Some(fault.kind()),
            _ => None,
        }
    }

    /// Whether a caller-level retry is sensible.
    ///
    /// Transport faults are retryable only for idempotent operations. Remote
    /// rejections and decode failures never are.
    #[must_use]
    pub const fn retry_hint(&self) -> RetryHint {
        match self {
            Self::Connection { .. } => RetryHint::Reconnect,
            Self::Resolution { .. } => RetryHint::Backoff,
            Self::Transport { operation, fault } => {
                if !operation.is_idempotent() {
                    return RetryHint::Never;
                }
                match fault.kind() {
                    TransportErrorKind::Disconnected => RetryHint::Reconnect,
                    TransportErrorKind::Timeout => RetryHint::Retry,
                    TransportErrorKind::Failed => RetryHint::Backoff,
                }
            }
            Self::Remote { .. } | Self::Decode { .. } | Self::Closed => RetryHint::Never,
        }
    }
}
