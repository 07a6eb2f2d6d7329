//! Conversion between [`WireValue`] trees and `zbus` messages.

use std::io;
use std::time::Duration;

use zbus::DBusError;
use zbus::blocking::Connection;
use zbus::message::Message;
use zbus::zvariant::{Structure, Value};

use crate::errors::TransportFault;
use crate::transport::{ObjectAddress, WireReply};
use crate::wire::WireValue;

/// Argument lists the manager and node interfaces accept.
pub(super) enum CallArgs<'a> {
    Empty,
    Name(&'a str),
    NamePair(&'a str, &'a str),
    Files(Vec<&'a str>, bool),
    ForcedFiles(Vec<&'a str>, bool, bool),
}

impl<'a> CallArgs<'a> {
    /// Maps positional arguments onto a typed body.
    pub(super) fn from_wire(args: &'a [WireValue]) -> Result<Self, TransportFault> {
        let unsupported = || {
            TransportFault::failed(format!(
                "cannot marshal arguments with signature '{}'",
                WireValue::body_signature(args)
            ))
        };
        match args {
            [] => Ok(Self::Empty),
            [WireValue::Str(name)] => Ok(Self::Name(name)),
            [WireValue::Str(first), WireValue::Str(second)] => Ok(Self::NamePair(first, second)),
            [WireValue::Array(files), WireValue::Bool(runtime)] => {
                let files = strings(files).ok_or_else(unsupported)?;
                Ok(Self::Files(files, *runtime))
            }
            [WireValue::Array(files), WireValue::Bool(runtime), WireValue::Bool(force)] => {
                let files = strings(files).ok_or_else(unsupported)?;
                Ok(Self::ForcedFiles(files, *runtime, *force))
            }
            _ => Err(unsupported()),
        }
    }

    /// Sends the call and blocks for its reply.
    pub(super) fn send(
        &self,
        connection: &Connection,
        address: &ObjectAddress,
        method: &str,
    ) -> zbus::Result<Message> {
        let destination = Some(address.service());
        let path = address.path();
        let interface = Some(address.interface());
        match self {
            Self::Empty => connection.call_method(destination, path, interface, method, &()),
            Self::Name(name) => {
                connection.call_method(destination, path, interface, method, &(*name,))
            }
            Self::NamePair(first, second) => connection.call_method(
                destination,
                path,
                interface,
                method,
                &(*first, *second),
            ),
            Self::Files(files, runtime) => connection.call_method(
                destination,
                path,
                interface,
                method,
                &(files, *runtime),
            ),
            Self::ForcedFiles(files, runtime, force) => connection.call_method(
                destination,
                path,
                interface,
                method,
                &(files, *runtime, *force),
            ),
        }
    }
}

fn strings(values: &[WireValue]) -> Option<Vec<&str>> {
    values.iter().map(WireValue::as_str).collect()
}

/// Reads every top-level value of a method return.
pub(super) fn reply_values(message: &Message) -> Result<Vec<WireValue>, TransportFault> {
    let body = message.body();
    match body.deserialize::<Structure<'_>>() {
        Ok(structure) => structure.fields().iter().map(wire_value).collect(),
        Err(structured) => match body.deserialize::<()>() {
            Ok(()) => Ok(Vec::new()),
            Err(_) => Err(TransportFault::failed(format!(
                "unreadable reply body: {structured}"
            ))),
        },
    }
}

fn wire_value(value: &Value<'_>) -> Result<WireValue, TransportFault> {
    let converted = match value {
        Value::U8(byte) => WireValue::Byte(*byte),
        Value::Bool(flag) => WireValue::Bool(*flag),
        Value::I16(number) => WireValue::Int16(*number),
        Value::U16(number) => WireValue::Uint16(*number),
        Value::I32(number) => WireValue::Int32(*number),
        Value::U32(number) => WireValue::Uint32(*number),
        Value::I64(number) => WireValue::Int64(*number),
        Value::U64(number) => WireValue::Uint64(*number),
        Value::F64(number) => WireValue::Double(*number),
        Value::Str(text) => WireValue::Str(text.to_string()),
        Value::Signature(signature) => WireValue::Signature(signature.to_string()),
        Value::ObjectPath(path) => WireValue::ObjectPath(path.to_string()),
        Value::Value(inner) => WireValue::variant(wire_value(inner)?),
        Value::Array(array) => {
            WireValue::Array(array.iter().map(wire_value).collect::<Result<_, _>>()?)
        }
        Value::Dict(dict) => WireValue::Dict(
            dict.iter()
                .map(|(key, entry)| Ok((wire_value(key)?, wire_value(entry)?)))
                .collect::<Result<_, TransportFault>>()?,
        ),
        Value::Structure(structure) => WireValue::Struct(
            structure
                .fields()
                .iter()
                .map(wire_value)
                .collect::<Result<_, _>>()?,
        ),
        other => {
            return Err(TransportFault::failed(format!(
                "unsupported reply value of type '{}'",
                other.value_signature()
            )));
        }
    };
    Ok(converted)
}

/// Error names the bus daemon itself returns when the callee never answered.
const NO_REPLY: &str = "org.freedesktop.DBus.Error.NoReply";
const DISCONNECTED: &str = "org.freedesktop.DBus.Error.Disconnected";
const TIMEOUT: &str = "org.freedesktop.DBus.Error.Timeout";
const TIMED_OUT: &str = "org.freedesktop.DBus.Error.TimedOut";

/// Splits `zbus` failures into remote replies and transport faults.
///
/// `budget` is the call timeout reported when the call ran out of time.
pub(super) fn error_reply(
    error: zbus::Error,
    budget: Duration,
) -> Result<WireReply, TransportFault> {
    match error {
        zbus::Error::MethodError(name, detail, _) => {
            classify_error(name.to_string(), detail.unwrap_or_default(), budget)
        }
        zbus::Error::FDO(fdo) => classify_error(
            fdo.name().to_string(),
            fdo.description().unwrap_or_default().to_owned(),
            budget,
        ),
        zbus::Error::InputOutput(io) if io.kind() == io::ErrorKind::TimedOut => {
            Err(TransportFault::timeout(budget))
        }
        zbus::Error::InputOutput(io) => Err(TransportFault::disconnected(io.to_string())),
        other => Err(TransportFault::failed(other.to_string())),
    }
}

/// Keeps errors raised by the callee as replies and turns the ones the bus
/// raised on its behalf into transport faults.
fn classify_error(
    name: String,
    message: String,
    budget: Duration,
) -> Result<WireReply, TransportFault> {
    match name.as_str() {
        NO_REPLY | DISCONNECTED => {
            let detail = if message.is_empty() { name } else { message };
            Err(TransportFault::disconnected(detail))
        }
        TIMEOUT | TIMED_OUT => Err(TransportFault::timeout(budget)),
        _ => Ok(WireReply::Error { name, message }),
    }
}
