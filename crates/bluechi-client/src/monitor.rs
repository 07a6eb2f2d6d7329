//! Monitor objects created on the manager.

use std::fmt;
use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::decode::decode_empty;
use crate::errors::SessionError;
use crate::model::ObjectPath;
use crate::operation::ManagerOperation;
use crate::resolver::ObjectProxy;
use crate::session::{LiveLink, Shared, decoded};

const MONITOR_TARGET: &str = "bluechi_client::monitor";

/// Handle to a monitor the manager created for this session's connection.
///
/// The manager drops its monitors when the owning connection goes away, so
/// closing a monitor whose connection was lost or replaced makes no call.
pub struct Monitor {
    session: Weak<Shared>,
    live: LiveLink,
    proxy: ObjectProxy,
    path: ObjectPath,
    closed: AtomicBool,
}

impl Monitor {
    pub(crate) fn new(
        session: Weak<Shared>,
        live: LiveLink,
        proxy: ObjectProxy,
        path: ObjectPath,
    ) -> Self {
        Self {
            session,
            live,
            proxy,
            path,
            closed: AtomicBool::new(false),
        }
    }

    /// Object path the manager assigned.
    #[must_use]
    pub const fn path(&self) -> &ObjectPath {
        &self.path
    }

    /// Whether [`Self::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Closes the monitor on the manager. Only the first call does any work;
    /// the handle counts as closed even when that call fails.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the manager rejects the close or the
    /// call fails in transit.
    pub fn close(&self) -> Result<(), SessionError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let Some(shared) = self.session.upgrade() else {
            return Ok(());
        };
        if !shared.is_current(self.live.generation) {
            debug!(
                target: MONITOR_TARGET,
                monitor = %self.path,
                "monitor went away with its connection"
            );
            return Ok(());
        }
        let operation = ManagerOperation::CloseMonitor;
        let reply = shared.dispatch(operation, &self.live, &self.proxy, "Close", Vec::new())?;
        decoded(operation, decode_empty(&reply))?;
        debug!(target: MONITOR_TARGET, monitor = %self.path, "closed monitor");
        Ok(())
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            debug!(
                target: MONITOR_TARGET,
                monitor = %self.path,
                error = %error,
                "failed to close monitor on drop"
            );
        }
    }
}

impl fmt::Debug for Monitor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Monitor")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
