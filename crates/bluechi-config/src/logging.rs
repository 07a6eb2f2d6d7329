//! Output format for `bluechictl` diagnostics written to stderr.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How `bluechictl` renders its own log lines.
///
/// Set with `--log-format`, `BLUECHI_LOG_FORMAT`, or `log_format` in the
/// configuration file. Matching is case-insensitive.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One terse line per event, for operators at a terminal.
    #[default]
    Compact,
    /// One JSON object per event, for journald or log shippers.
    Json,
}

/// Rejection of an unknown `--log-format` value.
pub type LogFormatParseError = strum::ParseError;
