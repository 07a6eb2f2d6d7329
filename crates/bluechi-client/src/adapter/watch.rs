//! Background watcher reporting loss of the manager or the bus.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tracing::{debug, warn};
use zbus::blocking::Connection;
use zbus::blocking::fdo::{DBusProxy, NameOwnerChangedIterator};

use crate::transport::LossNotifier;

use super::ADAPTER_TARGET;

/// Registers the `NameOwnerChanged` match for `service` on the bus.
///
/// Signals emitted after this returns are queued on the iterator, so an
/// owner change that races the watcher thread start-up is still seen.
pub(super) fn subscribe(
    connection: &Connection,
    service: &str,
) -> zbus::Result<NameOwnerChangedIterator> {
    let proxy: DBusProxy<'static> = DBusProxy::new(connection)?;
    proxy.receive_name_owner_changed_with_args(&[(0, service)])
}

/// Starts a thread that fires `notifier` once the manager leaves the bus or
/// the connection ends. Nothing fires after the transport was closed.
pub(super) fn spawn(
    changes: NameOwnerChangedIterator,
    service: String,
    closed: Arc<AtomicBool>,
    notifier: LossNotifier,
) {
    let spawned = thread::Builder::new()
        .name(String::from("bluechi-loss-watch"))
        .spawn(move || {
            let reason = match wait_for_loss(changes, &service) {
                Ok(reason) => reason,
                Err(error) => {
                    if !closed.load(Ordering::Acquire) {
                        warn!(
                            target: ADAPTER_TARGET,
                            %service,
                            error = %error,
                            "stopped watching the manager for loss"
                        );
                    }
                    return;
                }
            };
            if closed.load(Ordering::Acquire) {
                debug!(target: ADAPTER_TARGET, %service, "loss watcher finished");
                return;
            }
            notifier.notify(&reason);
        });
    if let Err(error) = spawned {
        warn!(
            target: ADAPTER_TARGET,
            error = %error,
            "failed to start the loss watcher"
        );
    }
}

fn wait_for_loss(changes: NameOwnerChangedIterator, service: &str) -> zbus::Result<String> {
    for change in changes {
        let args = change.args()?;
        if args.new_owner().is_none() {
            return Ok(format!("{service} left the bus"));
        }
    }
    Ok(String::from("bus connection closed"))
}
