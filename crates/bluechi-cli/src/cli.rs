//! Argument definitions for `bluechictl`.
//!
//! Configuration flags (`--bus`, `--call-timeout-ms`, ...) are peeled off
//! before clap sees the command line; see [`crate::config`].

use bluechi_client::JobMode;
use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Command-line client for the BlueChi manager.
#[derive(Parser, Debug)]
#[command(name = "bluechictl", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Controls how results are rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Auto, global = true)]
    pub(crate) output: OutputFormat,
    /// Operation to run against the manager.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Operations exposed by the CLI.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Lists every node known to the manager.
    ListNodes,
    /// Lists units across the fleet.
    ListUnits {
        /// Only show units on this node.
        #[arg(long)]
        node: Option<String>,
    },
    /// Shows the state of one node.
    NodeStatus {
        /// Node name.
        node: String,
    },
    /// Shows the state of one unit.
    UnitStatus(UnitTarget),
    /// Queues a start job.
    Start(JobArgs),
    /// Queues a stop job.
    Stop(JobArgs),
    /// Queues a restart job.
    Restart(JobArgs),
    /// Queues a reload job.
    Reload(JobArgs),
    /// Freezes a unit's processes.
    Freeze(UnitTarget),
    /// Thaws a frozen unit.
    Thaw(UnitTarget),
    /// Clears a unit's failed state.
    ResetFailed(UnitTarget),
    /// Enables unit files on a node.
    Enable {
        /// Target node and files.
        #[command(flatten)]
        files: UnitFiles,
        /// Replace existing conflicting links.
        #[arg(long)]
        force: bool,
    },
    /// Disables unit files on a node.
    Disable {
        /// Target node and files.
        #[command(flatten)]
        files: UnitFiles,
    },
    /// Reloads the service manager configuration on a node.
    DaemonReload {
        /// Node name.
        node: String,
    },
    /// Changes the manager's log level.
    SetLogLevel {
        /// Level understood by the manager, for example `DEBUG`.
        level: String,
    },
}

/// A unit on a node.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub(crate) struct UnitTarget {
    /// Node name.
    pub(crate) node: String,
    /// Unit name, for example `httpd.service`.
    pub(crate) unit: String,
}

/// A unit lifecycle request.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub(crate) struct JobArgs {
    /// Target unit.
    #[command(flatten)]
    pub(crate) target: UnitTarget,
    /// How the job treats conflicting pending jobs.
    #[arg(long, default_value_t = JobMode::Replace)]
    pub(crate) mode: JobMode,
}

/// Unit files on a node.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub(crate) struct UnitFiles {
    /// Node name.
    pub(crate) node: String,
    /// Unit files to change.
    #[arg(required = true, value_name = "FILE")]
    pub(crate) files: Vec<String>,
    /// Change links under /run instead of /etc.
    #[arg(long)]
    pub(crate) runtime: bool,
}
