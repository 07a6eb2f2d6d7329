//! D-Bus transport built on the blocking `zbus` API.
//!
//! [`DbusConnector`] opens a connection to the configured bus and hands back a
//! [`DbusTransport`]. Calls are marshalled from [`WireValue`] arguments into
//! typed bodies and replies are read back into [`WireValue`] trees, so the
//! reply decoder never sees `zbus` types.
//!
//! Every connection carries the session's call budget as its method timeout,
//! so a call against a hung manager ends on its own instead of parking the
//! dispatcher worker. Errors the bus daemon raises on the caller's behalf
//! (`NoReply`, `Disconnected`, `Timeout`) surface as transport faults rather
//! than as manager rejections.
//!
//! Loss of the manager is detected by watching `NameOwnerChanged` for the
//! manager's bus name on a dedicated thread. The match is registered before
//! [`BusTransport::watch_loss`] returns. The end of the signal stream is
//! treated as loss of the bus connection itself.
//!
//! [`WireValue`]: crate::WireValue

mod convert;
mod watch;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bluechi_config::BusEndpoint;
use tracing::{debug, warn};
use zbus::blocking::{Connection, connection};

use crate::errors::TransportFault;
use crate::settings::SessionSettings;
use crate::transport::{
    BusConnector, BusTransport, CallRequest, ConnectFault, LossNotifier, WireReply,
};

/// Log target for adapter events.
const ADAPTER_TARGET: &str = "bluechi_client::adapter";

/// Opens [`DbusTransport`]s for one manager service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbusConnector {
    manager_service: String,
    method_timeout: Duration,
}

impl DbusConnector {
    /// Builds a connector whose transports watch `manager_service` for loss
    /// and abandon any method call after `method_timeout`.
    #[must_use]
    pub fn new(manager_service: impl Into<String>, method_timeout: Duration) -> Self {
        Self {
            manager_service: manager_service.into(),
            method_timeout,
        }
    }

    /// Connector for the manager and call budget named by `settings`.
    #[must_use]
    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self::new(settings.manager().service(), settings.call_timeout())
    }

    /// Bus name watched for loss.
    #[must_use]
    pub fn manager_service(&self) -> &str {
        self.manager_service.as_str()
    }

    /// Longest a single method call may wait for its reply.
    #[must_use]
    pub const fn method_timeout(&self) -> Duration {
        self.method_timeout
    }
}

impl BusConnector for DbusConnector {
    fn connect(&self, endpoint: &BusEndpoint) -> Result<Arc<dyn BusTransport>, ConnectFault> {
        let connection = open(endpoint, self.method_timeout).map_err(|error| {
            ConnectFault::with_source(format!("cannot open the {endpoint} bus"), error)
        })?;
        debug!(
            target: ADAPTER_TARGET,
            %endpoint,
            unique_name = ?connection.unique_name(),
            method_timeout_ms = self.method_timeout.as_millis(),
            "opened bus connection"
        );
        Ok(Arc::new(DbusTransport::new(
            connection,
            self.manager_service.clone(),
        )))
    }
}

fn open(endpoint: &BusEndpoint, method_timeout: Duration) -> zbus::Result<Connection> {
    let builder = match endpoint.explicit_address() {
        Some(address) => connection::Builder::address(address)?,
        None if *endpoint == BusEndpoint::Session => connection::Builder::session()?,
        None => connection::Builder::system()?,
    };
    builder.method_timeout(method_timeout).build()
}

/// One `zbus` connection shared by every caller of a session.
#[derive(Debug)]
pub struct DbusTransport {
    connection: Mutex<Option<Connection>>,
    manager_service: String,
    closed: Arc<AtomicBool>,
}

impl DbusTransport {
    fn new(connection: Connection, manager_service: String) -> Self {
        Self {
            connection: Mutex::new(Some(connection)),
            manager_service,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.connection
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn live_connection(&self) -> Result<Connection, TransportFault> {
        self.lock()
            .clone()
            .ok_or_else(|| TransportFault::disconnected("bus connection closed"))
    }
}

impl BusTransport for DbusTransport {
    fn call(&self, request: &CallRequest, timeout: Duration) -> Result<WireReply, TransportFault> {
        let connection = self.live_connection()?;
        let args = convert::CallArgs::from_wire(request.args())?;
        match args.send(&connection, request.address(), request.method()) {
            Ok(message) => convert::reply_values(&message).map(WireReply::Return),
            Err(error) => convert::error_reply(error, timeout),
        }
    }

    fn watch_loss(&self, notifier: LossNotifier) {
        let connection = match self.live_connection() {
            Ok(connection) => connection,
            Err(_) => {
                notifier.notify("bus connection closed");
                return;
            }
        };
        match watch::subscribe(&connection, &self.manager_service) {
            Ok(changes) => watch::spawn(
                changes,
                self.manager_service.clone(),
                Arc::clone(&self.closed),
                notifier,
            ),
            Err(error) => {
                warn!(
                    target: ADAPTER_TARGET,
                    service = %self.manager_service,
                    error = %error,
                    "cannot watch the manager for loss"
                );
            }
        }
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let Some(connection) = self.lock().take() else {
            return;
        };
        if let Err(error) = connection.close() {
            debug!(
                target: ADAPTER_TARGET,
                error = %error,
                "bus connection was already gone when closing"
            );
        }
    }
}
