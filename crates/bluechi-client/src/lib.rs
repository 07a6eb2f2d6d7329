//! Control-plane client for the BlueChi manager.
//!
//! The crate opens a [`ManagerSession`] against the manager daemon, issues
//! typed remote calls (list nodes, list units, fetch a node, drive unit
//! lifecycle), and decodes their positional replies into the owned
//! [`Node`]/[`Unit`] model. Failures are classified into
//! [`SessionError`] variants that keep transport loss, remote rejection, and
//! decode mismatch apart.
//!
//! The bus binding sits behind the [`BusConnector`] and [`BusTransport`]
//! traits. The default `dbus` feature provides [`adapter::DbusConnector`];
//! tests and embedders may supply their own.

#![deny(missing_docs)]

#[cfg(feature = "dbus")]
pub mod adapter;
pub mod decode;
mod dispatch;
mod errors;
mod model;
mod monitor;
mod operation;
mod resolver;
mod session;
mod settings;
mod transport;
mod wire;

pub use decode::DecodeError;
pub use dispatch::{CallDispatcher, RemoteCallResult};
pub use errors::{
    RemoteErrorKind, RemoteFault, SessionError, TransportErrorKind, TransportFault,
};
pub use model::{
    ActiveState, ConnectionState, Job, JobMode, LoadState, Node, NodeStatus, ObjectPath,
    Property, PropertyMap, Unit, UnitFileChange, UnitFileChanges,
};
pub use monitor::Monitor;
pub use operation::{ManagerOperation, RetryHint};
pub use resolver::{ObjectProxy, ProxyResolver};
pub use session::ManagerSession;
pub use settings::SessionSettings;
pub use transport::{
    BusConnector, BusTransport, CallRequest, ConnectFault, LossNotifier, ObjectAddress, WireReply,
};
pub use wire::{WireKind, WireValue};

#[cfg(test)]
mod tests;
