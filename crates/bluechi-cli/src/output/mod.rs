//! Rendering of command outcomes.
//!
//! Human output is aligned text for terminals; JSON output is the serialised
//! model, one document per invocation.

mod render;

use std::io::Write;

use clap::ValueEnum;

use crate::command::CommandOutcome;
use crate::errors::AppError;

pub(crate) use render::render_human;

/// Output format selection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Selects `human` for terminal output and `json` for redirected output.
    #[default]
    Auto,
    /// Always render human-readable output.
    Human,
    /// Always emit JSON.
    Json,
}

/// Output format after resolving `auto` against TTY detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolvedOutputFormat {
    /// Aligned, human-readable text.
    Human,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Resolves the output format based on whether stdout is a terminal.
    #[must_use]
    pub const fn resolve(self, stdout_is_terminal: bool) -> ResolvedOutputFormat {
        match self {
            Self::Auto if stdout_is_terminal => ResolvedOutputFormat::Human,
            Self::Auto | Self::Json => ResolvedOutputFormat::Json,
            Self::Human => ResolvedOutputFormat::Human,
        }
    }
}

pub(crate) fn emit<W: Write>(
    outcome: &CommandOutcome,
    format: ResolvedOutputFormat,
    stdout: &mut W,
) -> Result<(), AppError> {
    match format {
        ResolvedOutputFormat::Human => {
            render_human(outcome, &mut *stdout).map_err(AppError::WriteOutput)?;
        }
        ResolvedOutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *stdout, outcome)
                .map_err(AppError::SerialiseOutput)?;
            stdout.write_all(b"\n").map_err(AppError::WriteOutput)?;
        }
    }
    stdout.flush().map_err(AppError::WriteOutput)
}
