use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How callers behave when they meet a session that is mid-reconnect.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReconnectPolicy {
    /// Block until the in-flight reconnect attempt settles.
    #[default]
    Wait,
    /// Return a disconnected transport error immediately.
    FailFast,
}

/// Errors encountered while parsing a [`ReconnectPolicy`] from text.
pub type ReconnectPolicyParseError = strum::ParseError;
