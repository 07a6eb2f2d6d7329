//! Manager session: connection lifecycle and the domain operations.
//!
//! A [`ManagerSession`] owns at most one live transport. The link state moves
//! between [`ConnectionState`] values only inside [`ManagerSession::connect`],
//! the loss notification registered with the transport, and
//! [`ManagerSession::close`]. Call failures never change the state on their
//! own. The link lock is held to read or transition state and is released
//! before any round trip.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

use bluechi_config::ReconnectPolicy;
use tracing::{debug, info, warn};

use crate::decode::{
    DecodeError, decode_empty, decode_enable_reply, decode_job, decode_node_properties,
    decode_nodes, decode_object_path, decode_property_map, decode_unit_file_changes,
    decode_unit_properties, decode_units,
};
use crate::dispatch::CallDispatcher;
use crate::errors::{SessionError, TransportFault};
use crate::model::{ConnectionState, Job, JobMode, Node, ObjectPath, Unit, UnitFileChanges};
use crate::monitor::Monitor;
use crate::operation::ManagerOperation;
use crate::resolver::{ObjectProxy, ProxyResolver};
use crate::settings::{
    MONITOR_INTERFACE, PROPERTIES_INTERFACE, SYSTEMD_UNIT_INTERFACE, SessionSettings,
};
use crate::transport::{BusConnector, BusTransport, LossNotifier, ObjectAddress};
use crate::wire::WireValue;

/// Log target for session lifecycle events.
const SESSION_TARGET: &str = "bluechi_client::session";

struct Link {
    state: ConnectionState,
    transport: Option<Arc<dyn BusTransport>>,
    manager: Option<ObjectProxy>,
    generation: u64,
    pending_loss: Option<String>,
    retired: Vec<Arc<dyn BusTransport>>,
}

impl Link {
    const fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            transport: None,
            manager: None,
            generation: 0,
            pending_loss: None,
            retired: Vec::new(),
        }
    }
}

/// Transport and manager proxy captured for one operation.
pub(crate) struct LiveLink {
    transport: Arc<dyn BusTransport>,
    manager: ObjectProxy,
    pub(crate) generation: u64,
}

pub(crate) struct Shared {
    connector: Arc<dyn BusConnector>,
    settings: SessionSettings,
    link: Mutex<Link>,
    settled: Condvar,
    resolver: ProxyResolver,
    dispatcher: CallDispatcher,
}

impl Shared {
    fn lock_link(&self) -> MutexGuard<'_, Link> {
        self.link
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn establish(
        self: &Arc<Self>,
        generation: u64,
    ) -> Result<(Arc<dyn BusTransport>, ObjectProxy), SessionError> {
        let endpoint = self.settings.endpoint();
        let transport = self
            .connector
            .connect(endpoint)
            .map_err(|source| SessionError::connection(endpoint.clone(), source))?;

        let weak: Weak<Self> = Arc::downgrade(self);
        transport.watch_loss(LossNotifier::new(move |reason| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_loss(generation, reason);
            }
        }));

        match self.resolver.resolve(
            &self.dispatcher,
            &transport,
            self.settings.manager(),
            ManagerOperation::Connect,
            self.settings.call_timeout(),
        ) {
            Ok(manager) => Ok((transport, manager)),
            Err(error) => {
                transport.close();
                Err(error)
            }
        }
    }

    fn finish_connect(
        &self,
        outcome: Result<(Arc<dyn BusTransport>, ObjectProxy), SessionError>,
    ) -> Result<ConnectionState, SessionError> {
        let mut link = self.lock_link();
        let (result, discard) = match outcome {
            Ok((transport, manager)) => {
                if link.state == ConnectionState::Closed {
                    (Err(SessionError::Closed), Some(transport))
                } else if let Some(reason) = link.pending_loss.take() {
                    link.state = ConnectionState::Disconnected;
                    let fault = TransportFault::disconnected(reason);
                    (
                        Err(SessionError::transport(ManagerOperation::Connect, fault)),
                        Some(transport),
                    )
                } else {
                    link.state = ConnectionState::Connected;
                    link.transport = Some(transport);
                    link.manager = Some(manager);
                    (Ok(ConnectionState::Connected), None)
                }
            }
            Err(error) => {
                if link.state != ConnectionState::Closed {
                    link.state = ConnectionState::Disconnected;
                }
                (Err(error), None)
            }
        };
        let generation = link.generation;
        drop(link);
        self.settled.notify_all();

        if let Some(transport) = discard {
            transport.close();
        }
        match &result {
            Ok(_) => info!(
                target: SESSION_TARGET,
                endpoint = %self.settings.endpoint(),
                manager = %self.settings.manager(),
                generation,
                "connected to the manager"
            ),
            Err(error) => warn!(
                target: SESSION_TARGET,
                endpoint = %self.settings.endpoint(),
                generation,
                error = %error,
                "failed to connect to the manager"
            ),
        }
        result
    }

    fn handle_loss(&self, generation: u64, reason: &str) {
        {
            let mut link = self.lock_link();
            if link.generation != generation {
                debug!(
                    target: SESSION_TARGET,
                    generation,
                    current = link.generation,
                    "ignoring loss of a superseded connection"
                );
                return;
            }
            match link.state {
                ConnectionState::Connected => {
                    link.state = ConnectionState::Disconnected;
                    link.manager = None;
                    if let Some(transport) = link.transport.take() {
                        link.retired.push(transport);
                    }
                }
                ConnectionState::Reconnecting => {
                    link.pending_loss = Some(reason.to_owned());
                }
                ConnectionState::Disconnected | ConnectionState::Closed => return,
            }
        }
        self.settled.notify_all();
        self.resolver.invalidate();
        let failed = self
            .dispatcher
            .fail_all(&TransportFault::disconnected(reason));
        warn!(
            target: SESSION_TARGET,
            generation,
            reason,
            failed_calls = failed,
            "lost connection to the manager"
        );
    }

    /// Whether the connection captured as `generation` is still the live one.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        let link = self.lock_link();
        link.state == ConnectionState::Connected && link.generation == generation
    }

    /// Sends one call, refusing to dispatch once the captured connection is
    /// no longer the live one.
    pub(crate) fn dispatch(
        &self,
        operation: ManagerOperation,
        live: &LiveLink,
        proxy: &ObjectProxy,
        method: &str,
        args: Vec<WireValue>,
    ) -> Result<Vec<WireValue>, SessionError> {
        {
            let link = self.lock_link();
            match link.state {
                ConnectionState::Closed => return Err(SessionError::Closed),
                ConnectionState::Connected if link.generation == live.generation => {}
                _ => return Err(not_connected(operation)),
            }
        }
        self.dispatcher
            .invoke(
                &live.transport,
                proxy,
                method,
                args,
                self.settings.call_timeout(),
            )
            .into_result(operation)
    }

    fn close(&self) {
        let released: Vec<Arc<dyn BusTransport>> = {
            let mut link = self.lock_link();
            if link.state == ConnectionState::Closed {
                return;
            }
            link.state = ConnectionState::Closed;
            link.manager = None;
            let mut released: Vec<_> = link.retired.drain(..).collect();
            released.extend(link.transport.take());
            released
        };
        self.settled.notify_all();
        self.resolver.invalidate();
        self.dispatcher
            .fail_all(&TransportFault::disconnected("session closed"));
        for transport in &released {
            transport.close();
        }
        info!(
            target: SESSION_TARGET,
            released = released.len(),
            "closed manager session"
        );
    }
}

/// Client-side handle to one BlueChi manager.
///
/// The session is `Send + Sync`; independent threads may issue operations
/// concurrently over the single shared transport. Every operation is one or
/// two round trips and nothing about fleet state is cached between calls.
///
/// Dropping the session closes it.
pub struct ManagerSession {
    shared: Arc<Shared>,
}

impl ManagerSession {
    /// Builds a disconnected session. Call [`Self::connect`] before issuing
    /// operations.
    #[must_use]
    pub fn new(connector: Arc<dyn BusConnector>, settings: SessionSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                connector,
                settings,
                link: Mutex::new(Link::new()),
                settled: Condvar::new(),
                resolver: ProxyResolver::new(),
                dispatcher: CallDispatcher::new(),
            }),
        }
    }

    /// Builds a session and connects it.
    ///
    /// # Errors
    ///
    /// Returns the error reported by [`Self::connect`].
    pub fn open(
        connector: Arc<dyn BusConnector>,
        settings: SessionSettings,
    ) -> Result<Self, SessionError> {
        let session = Self::new(connector, settings);
        session.connect()?;
        Ok(session)
    }

    /// Establishes the transport, registers for loss notification, and
    /// resolves the manager object.
    ///
    /// Returns immediately when already connected. A call that meets another
    /// connect in progress waits for it or fails, depending on the
    /// configured [`ReconnectPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connection`] when the bus is unreachable,
    /// [`SessionError::Resolution`] when the manager is not exported,
    /// [`SessionError::Transport`] when the connection drops or another
    /// connect is in progress under [`ReconnectPolicy::FailFast`], and
    /// [`SessionError::Closed`] after [`Self::close`].
    pub fn connect(&self) -> Result<ConnectionState, SessionError> {
        let (generation, retired) = {
            let mut link = self.shared.lock_link();
            loop {
                match link.state {
                    ConnectionState::Closed => return Err(SessionError::Closed),
                    ConnectionState::Connected => return Ok(ConnectionState::Connected),
                    ConnectionState::Disconnected => break,
                    ConnectionState::Reconnecting => match self.shared.settings.reconnect_policy()
                    {
                        ReconnectPolicy::Wait => {
                            link = self
                                .shared
                                .settled
                                .wait(link)
                                .unwrap_or_else(|poison| poison.into_inner());
                        }
                        ReconnectPolicy::FailFast => {
                            return Err(SessionError::transport(
                                ManagerOperation::Connect,
                                TransportFault::disconnected("reconnect already in progress"),
                            ));
                        }
                    },
                }
            }
            link.state = ConnectionState::Reconnecting;
            link.generation = link.generation.wrapping_add(1);
            link.pending_loss = None;
            let retired: Vec<_> = link.retired.drain(..).collect();
            (link.generation, retired)
        };

        for transport in &retired {
            transport.close();
        }
        self.shared.resolver.invalidate();
        debug!(
            target: SESSION_TARGET,
            endpoint = %self.shared.settings.endpoint(),
            generation,
            "connecting to the manager"
        );

        let outcome = self.shared.establish(generation);
        self.shared.finish_connect(outcome)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.lock_link().state
    }

    /// Settings the session was built with.
    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.shared.settings
    }

    /// Lists every node known to the manager, in manager order.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the session is not connected, the call
    /// fails, or the reply cannot be decoded.
    pub fn list_nodes(&self) -> Result<Vec<Node>, SessionError> {
        let operation = ManagerOperation::ListNodes;
        let live = self.live_link(operation)?;
        let reply = self.dispatch(operation, &live, &live.manager, "ListNodes", Vec::new())?;
        decoded(operation, decode_nodes(&reply))
    }

    /// Lists units across the fleet, optionally restricted to one node.
    ///
    /// The manager has no server-side filter; `node_filter` is applied to the
    /// decoded sequence and manager order is kept.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the session is not connected, the call
    /// fails, or the reply cannot be decoded.
    pub fn list_units(&self, node_filter: Option<&str>) -> Result<Vec<Unit>, SessionError> {
        let operation = ManagerOperation::ListUnits;
        let live = self.live_link(operation)?;
        let reply = self.dispatch(operation, &live, &live.manager, "ListUnits", Vec::new())?;
        let mut units = decoded(operation, decode_units(&reply))?;
        if let Some(node) = node_filter {
            units.retain(|unit| unit.node == node);
        }
        Ok(units)
    }

    /// Fetches the current state of one node.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Remote`] with
    /// [`crate::RemoteErrorKind::NotFound`] when the manager does not know
    /// the node, and other [`SessionError`] variants as for every operation.
    pub fn get_node(&self, name: &str) -> Result<Node, SessionError> {
        let operation = ManagerOperation::GetNode;
        let live = self.live_link(operation)?;
        let (node_proxy, path) = self.lookup_node(operation, &live, name)?;

        let properties_proxy =
            ObjectProxy::new(node_proxy.address().with_interface(PROPERTIES_INTERFACE));
        let args = vec![WireValue::str(self.shared.settings.node_interface())];
        let reply = self.dispatch(operation, &live, &properties_proxy, "GetAll", args)?;
        let properties = decoded(operation, decode_property_map(&reply))?;
        decoded(
            operation,
            decode_node_properties(name, path, &properties),
        )
    }

    /// Fetches the systemd state of `unit` on `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Remote`] with
    /// [`crate::RemoteErrorKind::NotFound`] when the node or unit is unknown,
    /// and other [`SessionError`] variants as for every operation.
    pub fn get_unit(&self, node: &str, unit: &str) -> Result<Unit, SessionError> {
        let operation = ManagerOperation::GetUnit;
        let live = self.live_link(operation)?;
        let proxy = self.node_proxy(operation, &live, node)?;
        let args = vec![WireValue::str(unit), WireValue::str(SYSTEMD_UNIT_INTERFACE)];
        let reply = self.dispatch(operation, &live, &proxy, "GetUnitProperties", args)?;
        let properties = decoded(operation, decode_property_map(&reply))?;
        decoded(operation, decode_unit_properties(node, &properties))
    }

    /// Queues a start job for `unit` on `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] as for every operation.
    pub fn start_unit(&self, node: &str, unit: &str, mode: JobMode) -> Result<Job, SessionError> {
        self.unit_job(ManagerOperation::StartUnit, "StartUnit", node, unit, mode)
    }

    /// Queues a stop job for `unit` on `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] as for every operation.
    pub fn stop_unit(&self, node: &str, unit: &str, mode: JobMode) -> Result<Job, SessionError> {
        self.unit_job(ManagerOperation::StopUnit, "StopUnit", node, unit, mode)
    }

    /// Queues a restart job for `unit` on `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] as for every operation.
    pub fn restart_unit(
        &self,
        node: &str,
        unit: &str,
        mode: JobMode,
    ) -> Result<Job, SessionError> {
        self.unit_job(ManagerOperation::RestartUnit, "RestartUnit", node, unit, mode)
    }

    /// Queues a reload job for `unit` on `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] as for every operation.
    pub fn reload_unit(&self, node: &str, unit: &str, mode: JobMode) -> Result<Job, SessionError> {
        self.unit_job(ManagerOperation::ReloadUnit, "ReloadUnit", node, unit, mode)
    }

    /// Freezes the processes of `unit` on `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] as for every operation.
    pub fn freeze_unit(&self, node: &str, unit: &str) -> Result<(), SessionError> {
        self.unit_action(ManagerOperation::FreezeUnit, "FreezeUnit", node, unit)
    }

    /// Thaws the processes of `unit` on `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] as for every operation.
    pub fn thaw_unit(&self, node: &str, unit: &str) -> Result<(), SessionError> {
        self.unit_action(ManagerOperation::ThawUnit, "ThawUnit", node, unit)
    }

    /// Clears the failed state of `unit` on `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] as for every operation.
    pub fn reset_failed_unit(&self, node: &str, unit: &str) -> Result<(), SessionError> {
        self.unit_action(ManagerOperation::ResetFailedUnit, "ResetFailedUnit", node, unit)
    }

    /// Enables unit files on `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] as for every operation.
    pub fn enable_unit_files<I, S>(
        &self,
        node: &str,
        files: I,
        runtime: bool,
        force: bool,
    ) -> Result<UnitFileChanges, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let operation = ManagerOperation::EnableUnitFiles;
        let live = self.live_link(operation)?;
        let proxy = self.node_proxy(operation, &live, node)?;
        let args = vec![
            WireValue::string_array(files),
            WireValue::Bool(runtime),
            WireValue::Bool(force),
        ];
        let reply = self.dispatch(operation, &live, &proxy, "EnableUnitFiles", args)?;
        decoded(operation, decode_enable_reply(&reply))
    }

    /// Disables unit files on `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] as for every operation.
    pub fn disable_unit_files<I, S>(
        &self,
        node: &str,
        files: I,
        runtime: bool,
    ) -> Result<UnitFileChanges, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let operation = ManagerOperation::DisableUnitFiles;
        let live = self.live_link(operation)?;
        let proxy = self.node_proxy(operation, &live, node)?;
        let args = vec![WireValue::string_array(files), WireValue::Bool(runtime)];
        let reply = self.dispatch(operation, &live, &proxy, "DisableUnitFiles", args)?;
        decoded(operation, decode_unit_file_changes(&reply))
    }

    /// Asks the service manager on `node` to reload its unit files.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] as for every operation.
    pub fn daemon_reload(&self, node: &str) -> Result<(), SessionError> {
        let operation = ManagerOperation::DaemonReload;
        let live = self.live_link(operation)?;
        let proxy = self.node_proxy(operation, &live, node)?;
        let reply = self.dispatch(operation, &live, &proxy, "Reload", Vec::new())?;
        decoded(operation, decode_empty(&reply))
    }

    /// Changes the manager's log level.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Remote`] when the manager rejects the level,
    /// and other [`SessionError`] variants as for every operation.
    pub fn set_log_level(&self, level: &str) -> Result<(), SessionError> {
        let operation = ManagerOperation::SetLogLevel;
        let live = self.live_link(operation)?;
        let args = vec![WireValue::str(level)];
        let reply = self.dispatch(operation, &live, &live.manager, "SetLogLevel", args)?;
        decoded(operation, decode_empty(&reply))
    }

    /// Asks the manager for a monitor object bound to this connection.
    ///
    /// The monitor lives until [`Monitor::close`] is called, the handle is
    /// dropped, or the connection it was created on goes away.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] as for every operation.
    pub fn create_monitor(&self) -> Result<Monitor, SessionError> {
        let operation = ManagerOperation::CreateMonitor;
        let live = self.live_link(operation)?;
        let reply = self.dispatch(operation, &live, &live.manager, "CreateMonitor", Vec::new())?;
        let path = decoded(operation, decode_object_path(&reply))?;
        let proxy = ObjectProxy::new(ObjectAddress::new(
            live.manager.address().service(),
            path.as_str(),
            MONITOR_INTERFACE,
        ));
        debug!(target: SESSION_TARGET, monitor = %path, "created monitor");
        Ok(Monitor::new(Arc::downgrade(&self.shared), live, proxy, path))
    }

    /// Releases the transport. Later calls are no-ops; later operations fail
    /// with [`SessionError::Closed`].
    pub fn close(&self) {
        self.shared.close();
    }

    fn unit_job(
        &self,
        operation: ManagerOperation,
        method: &str,
        node: &str,
        unit: &str,
        mode: JobMode,
    ) -> Result<Job, SessionError> {
        let live = self.live_link(operation)?;
        let proxy = self.node_proxy(operation, &live, node)?;
        let args = vec![WireValue::str(unit), WireValue::str(mode.as_ref())];
        let reply = self.dispatch(operation, &live, &proxy, method, args)?;
        decoded(operation, decode_job(&reply))
    }

    fn unit_action(
        &self,
        operation: ManagerOperation,
        method: &str,
        node: &str,
        unit: &str,
    ) -> Result<(), SessionError> {
        let live = self.live_link(operation)?;
        let proxy = self.node_proxy(operation, &live, node)?;
        let reply = self.dispatch(operation, &live, &proxy, method, vec![WireValue::str(unit)])?;
        decoded(operation, decode_empty(&reply))
    }

    /// Node proxy from the resolver cache, looked up through the manager on
    /// a miss.
    fn node_proxy(
        &self,
        operation: ManagerOperation,
        live: &LiveLink,
        node: &str,
    ) -> Result<ObjectProxy, SessionError> {
        if let Some(proxy) = self.shared.resolver.node(node) {
            return Ok(proxy);
        }
        self.lookup_node(operation, live, node)
            .map(|(proxy, _)| proxy)
    }

    fn lookup_node(
        &self,
        operation: ManagerOperation,
        live: &LiveLink,
        node: &str,
    ) -> Result<(ObjectProxy, ObjectPath), SessionError> {
        let generation = self.shared.resolver.generation();
        let reply = self.dispatch(
            operation,
            live,
            &live.manager,
            "GetNode",
            vec![WireValue::str(node)],
        )?;
        let path = decoded(operation, decode_object_path(&reply))?;
        let proxy = ObjectProxy::new(ObjectAddress::new(
            live.manager.address().service(),
            path.as_str(),
            self.shared.settings.node_interface(),
        ));
        self.shared
            .resolver
            .remember_node(node, proxy.clone(), generation);
        Ok((proxy, path))
    }

    /// Captures the live transport, waiting out a reconnect when the policy
    /// allows it.
    fn live_link(&self, operation: ManagerOperation) -> Result<LiveLink, SessionError> {
        let budget = self.shared.settings.call_timeout();
        let deadline = Instant::now().checked_add(budget);
        let mut link = self.shared.lock_link();
        loop {
            match link.state {
                ConnectionState::Connected => {
                    return match (&link.transport, &link.manager) {
                        (Some(transport), Some(manager)) => Ok(LiveLink {
                            transport: Arc::clone(transport),
                            manager: manager.clone(),
                            generation: link.generation,
                        }),
                        _ => Err(not_connected(operation)),
                    };
                }
                ConnectionState::Disconnected => return Err(not_connected(operation)),
                ConnectionState::Closed => return Err(SessionError::Closed),
                ConnectionState::Reconnecting => match self.shared.settings.reconnect_policy() {
                    ReconnectPolicy::FailFast => {
                        return Err(SessionError::transport(
                            operation,
                            TransportFault::disconnected("reconnect in progress"),
                        ));
                    }
                    ReconnectPolicy::Wait => {
                        let remaining = deadline.map_or(budget, |deadline| {
                            deadline.saturating_duration_since(Instant::now())
                        });
                        if remaining == Duration::ZERO {
                            return Err(SessionError::transport(
                                operation,
                                TransportFault::timeout(budget),
                            ));
                        }
                        let (guard, _) = self
                            .shared
                            .settled
                            .wait_timeout(link, remaining)
                            .unwrap_or_else(|poison| poison.into_inner());
                        link = guard;
                    }
                },
            }
        }
    }

    fn dispatch(
        &self,
        operation: ManagerOperation,
        live: &LiveLink,
        proxy: &ObjectProxy,
        method: &str,
        args: Vec<WireValue>,
    ) -> Result<Vec<WireValue>, SessionError> {
        self.shared.dispatch(operation, live, proxy, method, args)
    }
}

impl Drop for ManagerSession {
    fn drop(&mut self) {
        self.shared.close();
    }
}

impl fmt::Debug for ManagerSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ManagerSession")
            .field("state", &self.state())
            .field("settings", &self.shared.settings)
            .finish_non_exhaustive()
    }
}

fn not_connected(operation: ManagerOperation) -> SessionError {
    SessionError::transport(
        operation,
        TransportFault::disconnected("session is not connected"),
    )
}

pub(crate) fn decoded<T>(
    operation: ManagerOperation,
    result: Result<T, DecodeError>,
) -> Result<T, SessionError> {
    result.map_err(|source| SessionError::decode(operation, source))
}
