use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transports accepted in an explicit D-Bus address.
const ADDRESS_TRANSPORTS: &[&str] = &[
    "unix",
    "tcp",
    "nonce-tcp",
    "unixexec",
    "launchd",
    "autolaunch",
];

/// Declarative configuration for the bus hosting the BlueChi manager.
///
/// The textual form is `system`, `session`, or a D-Bus server address such as
/// `unix:path=/run/dbus/system_bus_socket` or `tcp:host=10.0.0.5,port=55555`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum BusEndpoint {
    /// The well-known system bus.
    System,
    /// The per-login session bus.
    Session,
    /// An explicit D-Bus server address.
    Address(String),
}

impl BusEndpoint {
    /// Builds an endpoint for an explicit bus address after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`BusEndpointParseError`] when the address does not name a
    /// supported transport or carries malformed key/value pairs.
    pub fn address(address: impl Into<String>) -> Result<Self, BusEndpointParseError> {
        let address = address.into();
        validate_address(&address)?;
        Ok(Self::Address(address))
    }

    /// Returns the explicit address when the endpoint is not a well-known bus.
    #[must_use]
    pub fn explicit_address(&self) -> Option<&str> {
        match self {
            Self::Address(address) => Some(address.as_str()),
            Self::System | Self::Session => None,
        }
    }
}

impl fmt::Display for BusEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => formatter.write_str("system"),
            Self::Session => formatter.write_str("session"),
            Self::Address(address) => formatter.write_str(address),
        }
    }
}

impl FromStr for BusEndpoint {
    type Err = BusEndpointParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "" => Err(BusEndpointParseError::Empty),
            "system" => Ok(Self::System),
            "session" => Ok(Self::Session),
            other => Self::address(other),
        }
    }
}

impl TryFrom<String> for BusEndpoint {
    type Error = BusEndpointParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BusEndpoint> for String {
    fn from(value: BusEndpoint) -> Self {
        value.to_string()
    }
}

fn validate_address(address: &str) -> Result<(), BusEndpointParseError> {
    // Multiple addresses may be listed; each must be well formed.
    for entry in address.split(';').filter(|entry| !entry.is_empty()) {
        let Some((transport, options)) = entry.split_once(':') else {
            return Err(BusEndpointParseError::MissingTransport(entry.to_owned()));
        };
        if !ADDRESS_TRANSPORTS.contains(&transport) {
            return Err(BusEndpointParseError::UnsupportedTransport(
                transport.to_owned(),
            ));
        }
        if let Some(pair) = options
            .split(',')
            .filter(|pair| !pair.is_empty())
            .find(|pair| !pair.contains('='))
        {
            return Err(BusEndpointParseError::MalformedOption {
                address: entry.to_owned(),
                option: pair.to_owned(),
            });
        }
    }
    Ok(())
}

/// Errors encountered while parsing a [`BusEndpoint`] from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusEndpointParseError {
    /// The endpoint text was blank.
    #[error("bus endpoint must not be empty")]
    Empty,
    /// The address lacked a `transport:` prefix.
    #[error("bus address '{0}' does not name a transport")]
    MissingTransport(String),
    /// The address named a transport the client does not understand.
    #[error("unsupported bus transport '{0}'")]
    UnsupportedTransport(String),
    /// A `key=value` option was malformed.
    #[error("malformed option '{option}' in bus address '{address}'")]
    MalformedOption {
        /// Address entry containing the malformed option.
        address: String,
        /// The offending option text.
        option: String,
    },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("system", BusEndpoint::System)]
    #[case("session", BusEndpoint::Session)]
    #[case(
        "unix:path=/run/dbus/system_bus_socket",
        BusEndpoint::Address(String::from("unix:path=/run/dbus/system_bus_socket"))
    )]
    #[case(
        "tcp:host=10.0.0.5,port=55555",
        BusEndpoint::Address(String::from("tcp:host=10.0.0.5,port=55555"))
    )]
    fn parses_endpoints(#[case] input: &str, #[case] expected: BusEndpoint) {
        let endpoint: BusEndpoint = input.parse().expect("endpoint should parse");
        assert_eq!(endpoint, expected);
        assert_eq!(endpoint.to_string(), input);
    }

    #[rstest]
    fn rejects_blank_endpoint() {
        assert_eq!("  ".parse::<BusEndpoint>(), Err(BusEndpointParseError::Empty));
    }

    #[rstest]
    fn rejects_unknown_transport() {
        let error = "carrier-pigeon:coop=1"
            .parse::<BusEndpoint>()
            .expect_err("unknown transport should fail");
        assert_eq!(
            error,
            BusEndpointParseError::UnsupportedTransport(String::from("carrier-pigeon"))
        );
    }

    #[rstest]
    fn rejects_option_without_value() {
        let error = "unix:path"
            .parse::<BusEndpoint>()
            .expect_err("bare option should fail");
        assert!(matches!(error, BusEndpointParseError::MalformedOption { .. }));
    }

    #[rstest]
    fn rejects_address_without_transport() {
        let error = "/run/dbus/system_bus_socket"
            .parse::<BusEndpoint>()
            .expect_err("path-only address should fail");
        assert!(matches!(error, BusEndpointParseError::MissingTransport(_)));
    }
}
