//! Seam between the session and a concrete bus binding.
//!
//! The session never touches framing, authentication, or bus addressing
//! directly. It asks a [`BusConnector`] for a [`BusTransport`] and from then on
//! only issues [`CallRequest`]s, registers a [`LossNotifier`], and eventually
//! calls [`BusTransport::close`].

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bluechi_config::BusEndpoint;
use thiserror::Error;

use crate::errors::TransportFault;
use crate::wire::WireValue;

/// Service, object path, and interface addressing one remote target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectAddress {
    service: String,
    path: String,
    interface: String,
}

impl ObjectAddress {
    /// Builds an address from its parts.
    #[must_use]
    pub fn new(
        service: impl Into<String>,
        path: impl Into<String>,
        interface: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            path: path.into(),
            interface: interface.into(),
        }
    }

    /// Bus name owning the object.
    #[must_use]
    pub fn service(&self) -> &str {
        self.service.as_str()
    }

    /// Object path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Interface carrying the methods.
    #[must_use]
    pub fn interface(&self) -> &str {
        self.interface.as_str()
    }

    /// Same object addressed through another interface.
    #[must_use]
    pub fn with_interface(&self, interface: impl Into<String>) -> Self {
        Self {
            service: self.service.clone(),
            path: self.path.clone(),
            interface: interface.into(),
        }
    }
}

impl fmt::Display for ObjectAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{} ({})", self.service, self.path, self.interface)
    }
}

/// One marshalled method call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    address: ObjectAddress,
    method: String,
    args: Vec<WireValue>,
}

impl CallRequest {
    /// Builds a request for `method` on `address`.
    #[must_use]
    pub fn new(address: ObjectAddress, method: impl Into<String>, args: Vec<WireValue>) -> Self {
        Self {
            address,
            method: method.into(),
            args,
        }
    }

    /// Target of the call.
    #[must_use]
    pub const fn address(&self) -> &ObjectAddress {
        &self.address
    }

    /// Method name.
    #[must_use]
    pub fn method(&self) -> &str {
        self.method.as_str()
    }

    /// Positional arguments.
    #[must_use]
    pub fn args(&self) -> &[WireValue] {
        &self.args
    }
}

/// Raw reply returned by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum WireReply {
    /// Method return carrying the reply body.
    Return(Vec<WireValue>),
    /// Error reply sent by the remote peer.
    Error {
        /// Bus error name, e.g. `org.freedesktop.DBus.Error.UnknownObject`.
        name: String,
        /// Human-readable message attached to the error.
        message: String,
    },
}

/// Callback fired by a transport when its connection is lost.
#[derive(Clone)]
pub struct LossNotifier {
    callback: Arc<dyn Fn(&str) + Send + Sync>,
}

impl LossNotifier {
    /// Wraps the supplied callback.
    pub fn new(callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Reports connection loss with a short reason.
    pub fn notify(&self, reason: &str) {
        (self.callback)(reason);
    }
}

impl fmt::Debug for LossNotifier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("LossNotifier")
    }
}

/// Failure reported while establishing a transport.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConnectFault {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl ConnectFault {
    /// Builds a fault without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a fault that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-friendly description without the optional source.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Opens transports to a bus.
pub trait BusConnector: Send + Sync {
    /// Establishes a new connection to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectFault`] when the bus cannot be reached or refuses the
    /// connection.
    fn connect(&self, endpoint: &BusEndpoint) -> Result<Arc<dyn BusTransport>, ConnectFault>;
}

/// One live bus connection shared by every caller of a session.
///
/// Implementations must correlate replies to requests themselves; the
/// session issues `call` concurrently from several threads.
pub trait BusTransport: Send + Sync {
    /// Sends `request` and blocks until its reply arrives.
    ///
    /// `timeout` is advisory; the dispatcher enforces its own deadline.
    ///
    /// # Errors
    ///
    /// Returns [`TransportFault`] when the request could not be delivered or
    /// the connection dropped before the reply.
    fn call(&self, request: &CallRequest, timeout: Duration) -> Result<WireReply, TransportFault>;

    /// Registers the callback fired when the connection is lost.
    fn watch_loss(&self, notifier: LossNotifier);

    /// Releases the connection. Calls after the first are no-ops.
    fn close(&self);
}

impl fmt::Debug for dyn BusTransport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("BusTransport")
    }
}

impl fmt::Debug for dyn BusConnector {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("BusConnector")
    }
}
