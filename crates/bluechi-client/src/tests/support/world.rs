//! BDD test world wrapping a session over the fake bus.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::{ManagerSession, Node, SessionError, SessionSettings, Unit};

use super::fake_bus::FakeBus;
use super::{test_settings, wait_until};

/// Shared state exercised by BDD step implementations.
pub struct TestWorld {
    /// Bus the session talks to.
    pub bus: FakeBus,
    /// Settings used when the session is opened.
    pub settings: SessionSettings,
    /// Session under test, once opened.
    pub session: Option<Arc<ManagerSession>>,
    /// Nodes returned by the last listing.
    pub nodes: Option<Vec<Node>>,
    /// Units returned by the last listing.
    pub units: Option<Vec<Unit>>,
    /// Node returned by the last lookup.
    pub node: Option<Node>,
    /// Last error observed.
    pub last_error: Option<SessionError>,
    background: Option<JoinHandle<Result<Vec<Node>, SessionError>>>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self {
            bus: FakeBus::new(),
            settings: test_settings(),
            session: None,
            nodes: None,
            units: None,
            node: None,
            last_error: None,
            background: None,
        }
    }
}

impl TestWorld {
    /// Opens the session, recording any failure.
    pub fn open_session(&mut self) {
        let session = ManagerSession::new(self.bus.connector(), self.settings.clone());
        if let Err(error) = session.connect() {
            self.last_error = Some(error);
        }
        self.session = Some(Arc::new(session));
    }

    /// Session under test.
    pub fn session(&self) -> Arc<ManagerSession> {
        Arc::clone(self.session.as_ref().expect("session should be open"))
    }

    /// Reconnects the session, recording any failure.
    pub fn reconnect(&mut self) {
        let result = self.session().connect();
        self.record(result);
    }

    /// Lists nodes through the session.
    pub fn list_nodes(&mut self) {
        let result = self.session().list_nodes();
        self.nodes = self.record(result);
    }

    /// Lists units through the session.
    pub fn list_units(&mut self, node_filter: Option<&str>) {
        let result = self.session().list_units(node_filter);
        self.units = self.record(result);
    }

    /// Looks up one node through the session.
    pub fn get_node(&mut self, name: &str) {
        let result = self.session().get_node(name);
        self.node = self.record(result);
    }

    /// Starts a node listing on another thread and waits until the bus has
    /// received it.
    pub fn list_nodes_in_background(&mut self) {
        let before = self.bus.calls_to("ListNodes");
        let session = self.session();
        self.background = Some(thread::spawn(move || session.list_nodes()));
        let bus = self.bus.clone();
        assert!(
            wait_until(|| bus.calls_to("ListNodes") > before),
            "background listing never reached the bus"
        );
    }

    /// Waits for the background listing and records its outcome.
    pub fn finish_background(&mut self) {
        let handle = self
            .background
            .take()
            .expect("a background listing should be running");
        let result = handle.join().expect("background listing panicked");
        self.nodes = self.record(result);
    }

    /// Error recorded by the last failing step.
    pub fn error(&self) -> &SessionError {
        self.last_error.as_ref().expect("an error should be recorded")
    }

    fn record<T>(&mut self, result: Result<T, SessionError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(error) => {
                self.last_error = Some(error);
                None
            }
        }
    }
}
