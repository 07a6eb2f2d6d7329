//! Resolution and caching of addressable remote objects.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

use crate::dispatch::{CallDispatcher, RemoteCallResult};
use crate::errors::SessionError;
use crate::operation::ManagerOperation;
use crate::transport::{BusTransport, ObjectAddress};

/// Log target for resolver events.
const RESOLVER_TARGET: &str = "bluechi_client::resolver";

/// Interface answered by every bus peer.
pub(crate) const PEER_INTERFACE: &str = "org.freedesktop.DBus.Peer";

/// Error names meaning nothing reachable exports the requested object.
const UNRESOLVABLE_ERRORS: &[&str] = &[
    "org.freedesktop.DBus.Error.ServiceUnknown",
    "org.freedesktop.DBus.Error.NameHasNoOwner",
    "org.freedesktop.DBus.Error.UnknownObject",
    "org.freedesktop.DBus.Error.UnknownInterface",
    "org.freedesktop.DBus.Error.UnknownMethod",
];

/// Handle addressing a resolved remote object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectProxy {
    address: ObjectAddress,
}

impl ObjectProxy {
    /// Wraps an address that is already known to be reachable.
    #[must_use]
    pub const fn new(address: ObjectAddress) -> Self {
        Self { address }
    }

    /// Address used for calls through this proxy.
    #[must_use]
    pub const fn address(&self) -> &ObjectAddress {
        &self.address
    }
}

#[derive(Default)]
struct ResolverCache {
    generation: u64,
    objects: HashMap<ObjectAddress, ObjectProxy>,
    nodes: HashMap<String, ObjectProxy>,
}

/// Resolves object addresses into proxies and caches them per session.
///
/// The cache survives until [`ProxyResolver::invalidate`], which the session
/// calls on connection loss and before every connect.
#[derive(Default)]
pub struct ProxyResolver {
    cache: Mutex<ResolverCache>,
}

impl ProxyResolver {
    /// Builds an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a proxy for `address`, probing it with `Peer.Ping` on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Resolution`] when the bus reports that nothing
    /// exports the object, [`SessionError::Remote`] for any other rejection,
    /// and [`SessionError::Transport`] when the probe itself fails.
    pub fn resolve(
        &self,
        dispatcher: &CallDispatcher,
        transport: &Arc<dyn BusTransport>,
        address: &ObjectAddress,
        operation: ManagerOperation,
        timeout: Duration,
    ) -> Result<ObjectProxy, SessionError> {
        let generation = {
            let cache = self.lock();
            if let Some(proxy) = cache.objects.get(address) {
                return Ok(proxy.clone());
            }
            cache.generation
        };

        let probe = ObjectProxy::new(address.with_interface(PEER_INTERFACE));
        match dispatcher.invoke(transport, &probe, "Ping", Vec::new(), timeout) {
            RemoteCallResult::Success(_) => {}
            RemoteCallResult::RemoteError(fault) => {
                if UNRESOLVABLE_ERRORS.contains(&fault.name()) {
                    return Err(SessionError::resolution(address.clone(), fault.to_string()));
                }
                return Err(SessionError::remote(operation, fault));
            }
            RemoteCallResult::TransportError(fault) => {
                return Err(SessionError::transport(operation, fault));
            }
        }

        let proxy = ObjectProxy::new(address.clone());
        let mut cache = self.lock();
        if cache.generation == generation {
            cache.objects.insert(address.clone(), proxy.clone());
        }
        debug!(target: RESOLVER_TARGET, %address, "resolved object");
        Ok(proxy)
    }

    /// Cached proxy for the named node, if one was remembered in the current
    /// generation.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<ObjectProxy> {
        self.lock().nodes.get(name).cloned()
    }

    /// Current cache generation; bumped by every invalidation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Remembers the proxy for `name` unless the cache was invalidated since
    /// `generation` was read.
    pub fn remember_node(&self, name: &str, proxy: ObjectProxy, generation: u64) {
        let mut cache = self.lock();
        if cache.generation == generation {
            cache.nodes.insert(name.to_owned(), proxy);
        }
    }

    /// Drops every cached proxy.
    pub fn invalidate(&self) {
        let mut cache = self.lock();
        cache.generation = cache.generation.wrapping_add(1);
        cache.objects.clear();
        cache.nodes.clear();
    }

    /// Number of cached object and node proxies.
    #[must_use]
    pub fn cached(&self) -> usize {
        let cache = self.lock();
        cache.objects.len() + cache.nodes.len()
    }

    fn lock(&self) -> MutexGuard<'_, ResolverCache> {
        self.cache
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}
