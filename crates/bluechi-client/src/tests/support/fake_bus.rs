//! In-memory bus standing in for the manager daemon.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use bluechi_config::BusEndpoint;

use crate::errors::TransportFault;
use crate::transport::{
    BusConnector, BusTransport, CallRequest, ConnectFault, LossNotifier, WireReply,
};
use crate::wire::WireValue;

/// Error name the fake manager returns for unknown nodes.
pub const NODE_NOT_FOUND: &str = "org.freedesktop.DBus.Error.ServiceUnknown";

/// Error name the fake node returns for unknown units.
pub const UNIT_NOT_FOUND: &str = "org.freedesktop.systemd1.NoSuchUnit";

/// Upper bound for a hanging call so a broken test cannot wedge the suite.
const HANG_LIMIT: Duration = Duration::from_secs(10);

/// Scripted behaviour for one method.
#[derive(Debug, Clone)]
pub enum Response {
    /// Return the given body.
    Reply(Vec<WireValue>),
    /// Return an error reply.
    Error {
        /// Bus error name.
        name: String,
        /// Error message.
        message: String,
    },
    /// Block until the connection is lost or closed.
    Hang,
    /// Return the given body after sleeping.
    Delay(Duration, Vec<WireValue>),
}

impl Response {
    /// Builds an error reply.
    pub fn error(name: &str, message: &str) -> Self {
        Self::Error {
            name: name.to_owned(),
            message: message.to_owned(),
        }
    }
}

/// Unit exported by a fake node.
#[derive(Debug, Clone)]
pub struct FakeUnit {
    /// Owning node.
    pub node: String,
    /// Unit name.
    pub name: String,
    /// Active state text.
    pub active: String,
    /// Load state text.
    pub load: String,
    /// Sub-state text.
    pub sub: String,
    /// Description.
    pub description: String,
}

impl FakeUnit {
    /// Builds a loaded unit in the given active state.
    pub fn new(node: &str, name: &str, active: &str) -> Self {
        Self {
            node: node.to_owned(),
            name: name.to_owned(),
            active: active.to_owned(),
            load: String::from("loaded"),
            sub: String::from(if active == "active" { "running" } else { "dead" }),
            description: format!("{name} on {node}"),
        }
    }
}

#[derive(Debug, Default)]
struct TransportRecord {
    closes: usize,
    lost: bool,
    notifier: Option<LossNotifier>,
}

#[derive(Debug)]
struct FakeState {
    nodes: Vec<(String, String)>,
    units: Vec<FakeUnit>,
    scripted: HashMap<String, VecDeque<Response>>,
    persistent: HashMap<String, Response>,
    connect_failure: Option<String>,
    connect_delay: Option<Duration>,
    connect_attempts: usize,
    transports: Vec<TransportRecord>,
    calls: Vec<CallRequest>,
    jobs: u32,
    monitors: Vec<String>,
    next_monitor: u32,
}

impl FakeState {
    fn with_model() -> Self {
        Self {
            nodes: vec![
                (String::from("node-a"), String::from("online")),
                (String::from("node-b"), String::from("offline")),
            ],
            units: vec![
                FakeUnit::new("node-a", "httpd.service", "active"),
                FakeUnit::new("node-b", "sshd.service", "inactive"),
                FakeUnit::new("node-a", "chronyd.service", "active"),
            ],
            scripted: HashMap::new(),
            persistent: HashMap::new(),
            connect_failure: None,
            connect_delay: None,
            connect_attempts: 0,
            transports: Vec::new(),
            calls: Vec::new(),
            jobs: 0,
            monitors: Vec::new(),
            next_monitor: 0,
        }
    }

    fn response_for(&mut self, request: &CallRequest) -> Response {
        let method = request.method();
        if let Some(response) = self
            .scripted
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return response;
        }
        if let Some(response) = self.persistent.get(method) {
            return response.clone();
        }
        self.default_response(request)
    }

    fn default_response(&mut self, request: &CallRequest) -> Response {
        let path = request.address().path();
        match (request.method(), request.args()) {
            ("Ping", []) => Response::Reply(Vec::new()),
            ("ListNodes", []) => Response::Reply(vec![WireValue::Array(
                self.nodes
                    .iter()
                    .map(|(name, status)| {
                        WireValue::Struct(vec![
                            WireValue::str(name.as_str()),
                            WireValue::object_path(node_path(name)),
                            WireValue::str(status.as_str()),
                            WireValue::str(""),
                        ])
                    })
                    .collect(),
            )]),
            ("ListUnits", []) => Response::Reply(vec![WireValue::Array(
                self.units.iter().map(listing_tuple).collect(),
            )]),
            ("GetNode", [WireValue::Str(name)]) => {
                if self.nodes.iter().any(|(known, _)| known == name) {
                    Response::Reply(vec![WireValue::object_path(node_path(name))])
                } else {
                    Response::error(NODE_NOT_FOUND, "Node not found")
                }
            }
            ("GetAll", [WireValue::Str(_)]) => match self.node_at(path) {
                Some((name, status)) => Response::Reply(vec![WireValue::Dict(vec![
                    property("Name", WireValue::str(name)),
                    property("Status", WireValue::str(status)),
                    property("PeerIp", WireValue::str("192.0.2.10")),
                    property("LastSeenTimestamp", WireValue::Uint64(1_700_000_000)),
                ])]),
                None => Response::error(
                    "org.freedesktop.DBus.Error.UnknownObject",
                    "No such object",
                ),
            },
            ("GetUnitProperties", [WireValue::Str(unit), WireValue::Str(_)]) => {
                let node = self.node_at(path).map(|(name, _)| name);
                let found = self.units.iter().find(|candidate| {
                    node.as_deref() == Some(candidate.node.as_str()) && &candidate.name == unit
                });
                match found {
                    Some(found) => Response::Reply(vec![WireValue::Dict(vec![
                        property("Id", WireValue::str(found.name.as_str())),
                        property("ActiveState", WireValue::str(found.active.as_str())),
                        property("LoadState", WireValue::str(found.load.as_str())),
                        property("SubState", WireValue::str(found.sub.as_str())),
                        property("Description", WireValue::str(found.description.as_str())),
                    ])]),
                    None => Response::error(UNIT_NOT_FOUND, &format!("Unit {unit} not loaded.")),
                }
            }
            (
                "StartUnit" | "StopUnit" | "RestartUnit" | "ReloadUnit",
                [WireValue::Str(_), WireValue::Str(_)],
            ) => {
                self.jobs += 1;
                Response::Reply(vec![WireValue::object_path(format!(
                    "/org/eclipse/bluechi/job/{}",
                    self.jobs
                ))])
            }
            ("CreateMonitor", []) => {
                self.next_monitor += 1;
                let monitor = format!("/org/eclipse/bluechi/monitor/{}", self.next_monitor);
                self.monitors.push(monitor.clone());
                Response::Reply(vec![WireValue::object_path(monitor)])
            }
            ("Close", []) => match self.monitors.iter().position(|open| open == path) {
                Some(index) => {
                    self.monitors.remove(index);
                    Response::Reply(Vec::new())
                }
                None => Response::error(
                    "org.freedesktop.DBus.Error.UnknownObject",
                    "No such monitor",
                ),
            },
            ("FreezeUnit" | "ThawUnit" | "ResetFailedUnit", [WireValue::Str(_)])
            | ("Reload", [])
            | ("SetLogLevel", [WireValue::Str(_)]) => Response::Reply(Vec::new()),
            ("EnableUnitFiles", [WireValue::Array(files), WireValue::Bool(_), WireValue::Bool(_)]) => {
                Response::Reply(vec![
                    WireValue::Bool(true),
                    WireValue::Array(
                        files
                            .iter()
                            .filter_map(WireValue::as_str)
                            .map(|file| {
                                change(
                                    "symlink",
                                    &format!("/etc/systemd/system/multi-user.target.wants/{file}"),
                                    &format!("/usr/lib/systemd/system/{file}"),
                                )
                            })
                            .collect(),
                    ),
                ])
            }
            ("DisableUnitFiles", [WireValue::Array(files), WireValue::Bool(_)]) => {
                Response::Reply(vec![WireValue::Array(
                    files
                        .iter()
                        .filter_map(WireValue::as_str)
                        .map(|file| {
                            change(
                                "unlink",
                                &format!("/etc/systemd/system/multi-user.target.wants/{file}"),
                                "",
                            )
                        })
                        .collect(),
                )])
            }
            (method, _) => Response::error(
                "org.freedesktop.DBus.Error.UnknownMethod",
                &format!("Unknown method {method}"),
            ),
        }
    }

    fn node_at(&self, path: &str) -> Option<(String, String)> {
        self.nodes
            .iter()
            .find(|(name, _)| node_path(name) == path)
            .cloned()
    }
}

/// Object path the fake manager exports for `name`.
pub fn node_path(name: &str) -> String {
    format!("/org/eclipse/bluechi/node/{}", name.replace('-', "_"))
}

fn listing_tuple(unit: &FakeUnit) -> WireValue {
    WireValue::Struct(vec![
        WireValue::str(unit.node.as_str()),
        WireValue::str(unit.name.as_str()),
        WireValue::str(unit.description.as_str()),
        WireValue::str(unit.load.as_str()),
        WireValue::str(unit.active.as_str()),
        WireValue::str(unit.sub.as_str()),
        WireValue::str(""),
        WireValue::object_path(format!(
            "/org/freedesktop/systemd1/unit/{}",
            unit.name.replace('.', "_2e")
        )),
        WireValue::Uint32(0),
        WireValue::str(""),
        WireValue::object_path("/"),
    ])
}

fn property(name: &str, value: WireValue) -> (WireValue, WireValue) {
    (WireValue::str(name), WireValue::variant(value))
}

fn change(kind: &str, file: &str, destination: &str) -> WireValue {
    WireValue::Struct(vec![
        WireValue::str(kind),
        WireValue::str(file),
        WireValue::str(destination),
    ])
}

#[derive(Debug)]
struct Inner {
    state: Mutex<FakeState>,
    changed: Condvar,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

/// Handle configuring the fake bus and exposing what it observed.
#[derive(Debug, Clone)]
pub struct FakeBus {
    inner: Arc<Inner>,
}

impl Default for FakeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBus {
    /// Builds a bus whose manager knows `node-a` (online) and `node-b`
    /// (offline) with a few units.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(FakeState::with_model()),
                changed: Condvar::new(),
            }),
        }
    }

    /// Connector handing out transports onto this bus.
    pub fn connector(&self) -> Arc<dyn BusConnector> {
        Arc::new(FakeConnector {
            inner: Arc::clone(&self.inner),
        })
    }

    /// Replaces the manager's node list.
    pub fn set_nodes(&self, nodes: &[(&str, &str)]) {
        self.inner.lock().nodes = nodes
            .iter()
            .map(|(name, status)| ((*name).to_owned(), (*status).to_owned()))
            .collect();
    }

    /// Replaces the fleet's units.
    pub fn set_units(&self, units: Vec<FakeUnit>) {
        self.inner.lock().units = units;
    }

    /// Makes every call to `method` behave as `response`.
    pub fn respond(&self, method: &str, response: Response) {
        self.inner
            .lock()
            .persistent
            .insert(method.to_owned(), response);
    }

    /// Makes the next call to `method` behave as `response`.
    pub fn script(&self, method: &str, response: Response) {
        self.inner
            .lock()
            .scripted
            .entry(method.to_owned())
            .or_default()
            .push_back(response);
    }

    /// Makes connection attempts fail with `message`, or succeed again.
    pub fn fail_connect(&self, message: Option<&str>) {
        self.inner.lock().connect_failure = message.map(str::to_owned);
    }

    /// Makes connection attempts take `delay` before completing.
    pub fn delay_connect(&self, delay: Duration) {
        self.inner.lock().connect_delay = Some(delay);
    }

    /// Drops the most recently opened connection and fires its loss hook.
    ///
    /// Returns `false` when there was no connection with a loss hook.
    pub fn trigger_loss(&self, reason: &str) -> bool {
        let latest = self.inner.lock().transports.len().checked_sub(1);
        latest.is_some_and(|index| self.trigger_loss_on(index, reason))
    }

    /// Drops the connection with index `index` and fires its loss hook.
    pub fn trigger_loss_on(&self, index: usize, reason: &str) -> bool {
        let notifier = {
            let mut state = self.inner.lock();
            let Some(record) = state.transports.get_mut(index) else {
                return false;
            };
            record.lost = true;
            record.notifier.clone()
        };
        self.inner.changed.notify_all();
        match notifier {
            Some(notifier) => {
                notifier.notify(reason);
                true
            }
            None => false,
        }
    }

    /// Number of connection attempts, successful or not.
    pub fn connect_attempts(&self) -> usize {
        self.inner.lock().connect_attempts
    }

    /// Number of transports handed out.
    pub fn transports_opened(&self) -> usize {
        self.inner.lock().transports.len()
    }

    /// How many times the transport with index `index` was closed.
    pub fn closes(&self, index: usize) -> usize {
        self.inner
            .lock()
            .transports
            .get(index)
            .map_or(0, |record| record.closes)
    }

    /// Every call received, in arrival order.
    pub fn calls(&self) -> Vec<CallRequest> {
        self.inner.lock().calls.clone()
    }

    /// Monitor paths created and not yet closed.
    pub fn open_monitors(&self) -> Vec<String> {
        self.inner.lock().monitors.clone()
    }

    /// Number of calls received for `method`.
    pub fn calls_to(&self, method: &str) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|call| call.method() == method)
            .count()
    }
}

#[derive(Debug)]
struct FakeConnector {
    inner: Arc<Inner>,
}

impl BusConnector for FakeConnector {
    fn connect(&self, _endpoint: &BusEndpoint) -> Result<Arc<dyn BusTransport>, ConnectFault> {
        let delay = {
            let mut state = self.inner.lock();
            state.connect_attempts += 1;
            state.connect_delay
        };
        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        let mut state = self.inner.lock();
        if let Some(message) = &state.connect_failure {
            return Err(ConnectFault::new(message.clone()));
        }
        state.transports.push(TransportRecord::default());
        let index = state.transports.len() - 1;
        Ok(Arc::new(FakeTransport {
            index,
            inner: Arc::clone(&self.inner),
        }))
    }
}

#[derive(Debug)]
struct FakeTransport {
    index: usize,
    inner: Arc<Inner>,
}

impl FakeTransport {
    fn is_down(state: &FakeState, index: usize) -> bool {
        state
            .transports
            .get(index)
            .is_none_or(|record| record.lost || record.closes > 0)
    }
}

impl BusTransport for FakeTransport {
    fn call(&self, request: &CallRequest, _timeout: Duration) -> Result<WireReply, TransportFault> {
        let response = {
            let mut state = self.inner.lock();
            state.calls.push(request.clone());
            if Self::is_down(&state, self.index) {
                return Err(TransportFault::disconnected("connection reset by peer"));
            }
            state.response_for(request)
        };

        match response {
            Response::Reply(values) => Ok(WireReply::Return(values)),
            Response::Error { name, message } => Ok(WireReply::Error { name, message }),
            Response::Delay(delay, values) => {
                thread::sleep(delay);
                Ok(WireReply::Return(values))
            }
            Response::Hang => {
                let state = self.inner.lock();
                let (_state, wait) = self
                    .inner
                    .changed
                    .wait_timeout_while(state, HANG_LIMIT, |state| {
                        !Self::is_down(state, self.index)
                    })
                    .unwrap_or_else(|poison| poison.into_inner());
                if wait.timed_out() {
                    Err(TransportFault::failed("hanging call was never released"))
                } else {
                    Err(TransportFault::disconnected("connection reset by peer"))
                }
            }
        }
    }

    fn watch_loss(&self, notifier: LossNotifier) {
        if let Some(record) = self.inner.lock().transports.get_mut(self.index) {
            record.notifier = Some(notifier);
        }
    }

    fn close(&self) {
        if let Some(record) = self.inner.lock().transports.get_mut(self.index) {
            record.closes += 1;
        }
        self.inner.changed.notify_all();
    }
}
