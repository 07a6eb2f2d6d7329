//! Shared fixtures and helpers for session tests.

mod fake_bus;
mod world;

use std::thread;
use std::time::{Duration, Instant};

use bluechi_config::ReconnectPolicy;
use rstest::fixture;

use crate::{ManagerSession, SessionSettings};

pub use fake_bus::{FakeBus, FakeUnit, NODE_NOT_FOUND, Response, UNIT_NOT_FOUND, node_path};
pub use world::TestWorld;

/// Call budget used by most session tests.
pub const CALL_TIMEOUT: Duration = Duration::from_millis(500);

/// Fresh fake bus with the default fleet.
#[fixture]
pub fn bus() -> FakeBus {
    FakeBus::new()
}

/// Settings with a short call budget and the waiting reconnect policy.
#[must_use]
pub fn test_settings() -> SessionSettings {
    SessionSettings::default().with_call_timeout(CALL_TIMEOUT)
}

/// Settings with a short call budget and the fail-fast reconnect policy.
#[must_use]
pub fn fail_fast_settings() -> SessionSettings {
    test_settings().with_reconnect_policy(ReconnectPolicy::FailFast)
}

/// Opens a session against `bus`.
pub fn connected_session(bus: &FakeBus, settings: SessionSettings) -> ManagerSession {
    ManagerSession::open(bus.connector(), settings).expect("session should connect")
}

/// Polls `condition` until it holds or two seconds pass.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
