//! Canned manager replies for driving the CLI end to end.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bluechi_client::{
    BusConnector, BusTransport, CallRequest, ConnectFault, LossNotifier, TransportFault,
    WireReply, WireValue,
};
use bluechi_config::BusEndpoint;

const NODE_PATH_PREFIX: &str = "/org/eclipse/bluechi/node/";

#[derive(Debug, Default)]
struct StubState {
    overrides: HashMap<String, WireReply>,
    refuse: Option<String>,
    endpoints: Vec<BusEndpoint>,
    calls: Vec<CallRequest>,
    closes: usize,
}

/// A manager with two nodes: `node-a` online and `node-b` offline.
#[derive(Debug, Clone, Default)]
pub(crate) struct StubBus {
    state: Arc<Mutex<StubState>>,
}

impl StubBus {
    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    /// Replaces the reply to `method`.
    pub(crate) fn reply(&self, method: &str, reply: WireReply) {
        self.lock().overrides.insert(method.to_owned(), reply);
    }

    /// Makes every connection attempt fail with `message`.
    pub(crate) fn refuse(&self, message: &str) {
        self.lock().refuse = Some(message.to_owned());
    }

    /// Endpoints the CLI asked to connect to.
    pub(crate) fn endpoints(&self) -> Vec<BusEndpoint> {
        self.lock().endpoints.clone()
    }

    /// Calls received so far.
    pub(crate) fn calls(&self) -> Vec<CallRequest> {
        self.lock().calls.clone()
    }

    /// Calls to `method` received so far.
    pub(crate) fn call_to(&self, method: &str) -> Option<CallRequest> {
        self.lock()
            .calls
            .iter()
            .find(|call| call.method() == method)
            .cloned()
    }

    /// Number of times a transport was closed.
    pub(crate) fn closes(&self) -> usize {
        self.lock().closes
    }
}

impl BusConnector for StubBus {
    fn connect(&self, endpoint: &BusEndpoint) -> Result<Arc<dyn BusTransport>, ConnectFault> {
        let mut state = self.lock();
        state.endpoints.push(endpoint.clone());
        if let Some(message) = &state.refuse {
            return Err(ConnectFault::new(message.clone()));
        }
        Ok(Arc::new(self.clone()))
    }
}

impl BusTransport for StubBus {
    fn call(&self, request: &CallRequest, _timeout: Duration) -> Result<WireReply, TransportFault> {
        let mut state = self.lock();
        state.calls.push(request.clone());
        let reply = match state.overrides.get(request.method()) {
            Some(reply) => reply.clone(),
            None => canned(request),
        };
        Ok(reply)
    }

    fn watch_loss(&self, _notifier: LossNotifier) {}

    fn close(&self) {
        self.lock().closes += 1;
    }
}

fn canned(request: &CallRequest) -> WireReply {
    let node = request
        .address()
        .path()
        .strip_prefix(NODE_PATH_PREFIX)
        .map(|name| name.replace('_', "-"));
    match (request.method(), request.args()) {
        ("ListNodes", _) => WireReply::Return(vec![WireValue::Array(vec![
            node_tuple("node-a", "online", "192.0.2.4"),
            node_tuple("node-b", "offline", ""),
        ])]),
        ("ListUnits", _) => WireReply::Return(vec![WireValue::Array(vec![
            unit_tuple("node-a", "httpd.service", "active", "running"),
            unit_tuple("node-b", "sshd.service", "inactive", "dead"),
        ])]),
        ("GetNode", [WireValue::Str(name)]) if name == "node-a" || name == "node-b" => {
            WireReply::Return(vec![WireValue::object_path(format!(
                "{NODE_PATH_PREFIX}{}",
                name.replace('-', "_")
            ))])
        }
        ("GetNode", _) => error(
            "org.freedesktop.DBus.Error.ServiceUnknown",
            "Node not found",
        ),
        ("GetAll", _) => WireReply::Return(vec![properties(&[
            ("Name", WireValue::str(node.unwrap_or_default())),
            ("Status", WireValue::str("online")),
            ("PeerIp", WireValue::str("192.0.2.4")),
        ])]),
        ("GetUnitProperties", [WireValue::Str(unit), _]) if unit == "httpd.service" => {
            WireReply::Return(vec![properties(&[
                ("Id", WireValue::str("httpd.service")),
                ("ActiveState", WireValue::str("active")),
                ("LoadState", WireValue::str("loaded")),
                ("SubState", WireValue::str("running")),
                ("Description", WireValue::str("The Apache HTTP Server")),
            ])])
        }
        ("GetUnitProperties", _) => error(
            "org.freedesktop.systemd1.NoSuchUnit",
            "Unit not loaded.",
        ),
        ("StartUnit" | "StopUnit" | "RestartUnit" | "ReloadUnit", _) => {
            WireReply::Return(vec![WireValue::object_path("/org/eclipse/bluechi/job/7")])
        }
        ("EnableUnitFiles", _) => WireReply::Return(vec![
            WireValue::Bool(true),
            WireValue::Array(vec![change(
                "symlink",
                "/etc/systemd/system/multi-user.target.wants/httpd.service",
                "/usr/lib/systemd/system/httpd.service",
            )]),
        ]),
        ("DisableUnitFiles", _) => WireReply::Return(vec![WireValue::Array(vec![change(
            "unlink",
            "/etc/systemd/system/multi-user.target.wants/httpd.service",
            "",
        )])]),
        ("Ping" | "FreezeUnit" | "ThawUnit" | "ResetFailedUnit" | "Reload" | "SetLogLevel", _) => {
            WireReply::Return(Vec::new())
        }
        (method, _) => error(
            "org.freedesktop.DBus.Error.UnknownMethod",
            &format!("no method {method}"),
        ),
    }
}

fn error(name: &str, message: &str) -> WireReply {
    WireReply::Error {
        name: name.to_owned(),
        message: message.to_owned(),
    }
}

fn node_tuple(name: &str, status: &str, peer: &str) -> WireValue {
    WireValue::Struct(vec![
        WireValue::str(name),
        WireValue::object_path(format!("{NODE_PATH_PREFIX}{}", name.replace('-', "_"))),
        WireValue::str(status),
        WireValue::str(peer),
    ])
}

fn unit_tuple(node: &str, name: &str, active: &str, sub: &str) -> WireValue {
    WireValue::Struct(vec![
        WireValue::str(node),
        WireValue::str(name),
        WireValue::str(format!("{name} on {node}")),
        WireValue::str("loaded"),
        WireValue::str(active),
        WireValue::str(sub),
        WireValue::str(""),
        WireValue::object_path("/org/freedesktop/systemd1/unit/stub"),
        WireValue::Uint32(0),
        WireValue::str(""),
        WireValue::object_path("/"),
    ])
}

fn properties(entries: &[(&str, WireValue)]) -> WireValue {
    WireValue::Dict(
        entries
            .iter()
            .map(|(name, value)| (WireValue::str(*name), WireValue::variant(value.clone())))
            .collect(),
    )
}

fn change(kind: &str, file: &str, destination: &str) -> WireValue {
    WireValue::Struct(vec![
        WireValue::str(kind),
        WireValue::str(file),
        WireValue::str(destination),
    ])
}
