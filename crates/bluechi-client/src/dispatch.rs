//! Single-call dispatch with deadlines and loss draining.
//!
//! Each call gets its own reply slot. The transport call runs on a worker
//! thread that posts into the slot; the caller waits on the slot with the
//! call's deadline. A slot is registered while its caller waits so that a
//! loss notification can resolve every waiter at once. Replies arriving after
//! the caller gave up find the slot closed and are dropped.

use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::errors::{RemoteFault, SessionError, TransportFault};
use crate::operation::ManagerOperation;
use crate::resolver::ObjectProxy;
use crate::transport::{BusTransport, CallRequest, WireReply};
use crate::wire::WireValue;

/// Log target for dispatch events.
pub(crate) const DISPATCH_TARGET: &str = "bluechi_client::dispatch";

/// Outcome of one remote call. Exactly one variant is populated.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCallResult {
    /// The peer returned a reply body.
    Success(Vec<WireValue>),
    /// The peer explicitly rejected the call.
    RemoteError(RemoteFault),
    /// The call never produced a reply.
    TransportError(TransportFault),
}

impl RemoteCallResult {
    /// Converts the outcome into a session result tagged with `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Remote`] or [`SessionError::Transport`] for the
    /// corresponding failure variants.
    pub fn into_result(self, operation: ManagerOperation) -> Result<Vec<WireValue>, SessionError> {
        match self {
            Self::Success(values) => Ok(values),
            Self::RemoteError(fault) => Err(SessionError::remote(operation, fault)),
            Self::TransportError(fault) => Err(SessionError::transport(operation, fault)),
        }
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::RemoteError(_) => "remote error",
            Self::TransportError(_) => "transport error",
        }
    }
}

impl From<WireReply> for RemoteCallResult {
    fn from(reply: WireReply) -> Self {
        match reply {
            WireReply::Return(values) => Self::Success(values),
            WireReply::Error { name, message } => Self::RemoteError(RemoteFault::new(name, message)),
        }
    }
}

#[derive(Default)]
struct InFlight {
    next_slot: u64,
    slots: HashMap<u64, Sender<RemoteCallResult>>,
}

/// Sends calls over a shared transport and waits for their replies.
#[derive(Default)]
pub struct CallDispatcher {
    in_flight: Mutex<InFlight>,
}

impl CallDispatcher {
    /// Builds a dispatcher with no calls in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends `method` with `args` to `proxy` and blocks until the reply
    /// arrives, the deadline passes, or the connection is reported lost.
    ///
    /// The dispatcher never retries.
    pub fn invoke(
        &self,
        transport: &Arc<dyn BusTransport>,
        proxy: &ObjectProxy,
        method: &str,
        args: Vec<WireValue>,
        timeout: Duration,
    ) -> RemoteCallResult {
        let request = CallRequest::new(proxy.address().clone(), method, args);
        let started = Instant::now();
        let (sender, receiver) = mpsc::channel();
        let slot = self.register(sender.clone());

        let worker_transport = Arc::clone(transport);
        let worker_request = request.clone();
        let spawned = thread::Builder::new()
            .name(String::from("bluechi-call"))
            .spawn(move || {
                let outcome = match worker_transport.call(&worker_request, timeout) {
                    Ok(reply) => RemoteCallResult::from(reply),
                    Err(fault) => RemoteCallResult::TransportError(fault),
                };
                if sender.send(outcome).is_err() {
                    debug!(
                        target: DISPATCH_TARGET,
                        method = worker_request.method(),
                        path = worker_request.address().path(),
                        "discarding reply that arrived after its caller gave up"
                    );
                }
            });

        let outcome = match spawned {
            Ok(_) => match receiver.recv_timeout(timeout) {
                Ok(outcome) => outcome,
                Err(RecvTimeoutError::Timeout) => {
                    RemoteCallResult::TransportError(TransportFault::timeout(timeout))
                }
                Err(RecvTimeoutError::Disconnected) => RemoteCallResult::TransportError(
                    TransportFault::failed("call worker exited without replying"),
                ),
            },
            Err(error) => RemoteCallResult::TransportError(TransportFault::failed(format!(
                "failed to start call worker: {error}"
            ))),
        };
        self.release(slot);

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &outcome {
            RemoteCallResult::Success(_) => debug!(
                target: DISPATCH_TARGET,
                method,
                path = request.address().path(),
                interface = request.address().interface(),
                elapsed_ms,
                "call completed"
            ),
            RemoteCallResult::RemoteError(fault) => warn!(
                target: DISPATCH_TARGET,
                method,
                path = request.address().path(),
                elapsed_ms,
                outcome = outcome.label(),
                error_name = fault.name(),
                "call rejected"
            ),
            RemoteCallResult::TransportError(fault) => warn!(
                target: DISPATCH_TARGET,
                method,
                path = request.address().path(),
                elapsed_ms,
                outcome = outcome.label(),
                fault = %fault,
                "call failed"
            ),
        }
        outcome
    }

    /// Resolves every waiting call with `fault` and returns how many there
    /// were.
    pub fn fail_all(&self, fault: &TransportFault) -> usize {
        let drained: Vec<Sender<RemoteCallResult>> = {
            let mut in_flight = self.lock();
            in_flight.slots.drain().map(|(_, sender)| sender).collect()
        };
        for sender in &drained {
            // The caller may already have left on its own deadline.
            let _ = sender.send(RemoteCallResult::TransportError(fault.clone()));
        }
        if !drained.is_empty() {
            debug!(
                target: DISPATCH_TARGET,
                count = drained.len(),
                fault = %fault,
                "resolved in-flight calls after connection loss"
            );
        }
        drained.len()
    }

    /// Number of callers currently waiting for a reply.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.lock().slots.len()
    }

    fn register(&self, sender: Sender<RemoteCallResult>) -> u64 {
        let mut in_flight = self.lock();
        let slot = in_flight.next_slot;
        in_flight.next_slot = in_flight.next_slot.wrapping_add(1);
        in_flight.slots.insert(slot, sender);
        slot
    }

    fn release(&self, slot: u64) {
        self.lock().slots.remove(&slot);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InFlight> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}
