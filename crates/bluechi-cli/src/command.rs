//! Maps parsed commands onto manager session operations.

use bluechi_client::{Job, JobMode, ManagerSession, Node, SessionError, Unit, UnitFileChanges};
use serde::Serialize;

use crate::cli::{CliCommand, JobArgs, UnitTarget};

/// Result of one command, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum CommandOutcome {
    Nodes(Vec<Node>),
    Units(Vec<Unit>),
    Node(Node),
    Unit(Unit),
    Job {
        action: &'static str,
        unit: String,
        node: String,
        job: Job,
    },
    UnitFiles(UnitFileChanges),
    Done {
        action: &'static str,
        target: String,
    },
}

pub(crate) fn execute(
    session: &ManagerSession,
    command: CliCommand,
) -> Result<CommandOutcome, SessionError> {
    let outcome = match command {
        CliCommand::ListNodes => CommandOutcome::Nodes(session.list_nodes()?),
        CliCommand::ListUnits { node } => CommandOutcome::Units(session.list_units(node.as_deref())?),
        CliCommand::NodeStatus { node } => CommandOutcome::Node(session.get_node(&node)?),
        CliCommand::UnitStatus(target) => {
            CommandOutcome::Unit(session.get_unit(&target.node, &target.unit)?)
        }
        CliCommand::Start(args) => queue("start", args, |node, unit, mode| {
            session.start_unit(node, unit, mode)
        })?,
        CliCommand::Stop(args) => queue("stop", args, |node, unit, mode| {
            session.stop_unit(node, unit, mode)
        })?,
        CliCommand::Restart(args) => queue("restart", args, |node, unit, mode| {
            session.restart_unit(node, unit, mode)
        })?,
        CliCommand::Reload(args) => queue("reload", args, |node, unit, mode| {
            session.reload_unit(node, unit, mode)
        })?,
        CliCommand::Freeze(target) => {
            session.freeze_unit(&target.node, &target.unit)?;
            done("freeze", &target)
        }
        CliCommand::Thaw(target) => {
            session.thaw_unit(&target.node, &target.unit)?;
            done("thaw", &target)
        }
        CliCommand::ResetFailed(target) => {
            session.reset_failed_unit(&target.node, &target.unit)?;
            done("reset-failed", &target)
        }
        CliCommand::Enable { files, force } => CommandOutcome::UnitFiles(
            session.enable_unit_files(&files.node, &files.files, files.runtime, force)?,
        ),
        CliCommand::Disable { files } => CommandOutcome::UnitFiles(session.disable_unit_files(
            &files.node,
            &files.files,
            files.runtime,
        )?),
        CliCommand::DaemonReload { node } => {
            session.daemon_reload(&node)?;
            CommandOutcome::Done {
                action: "daemon-reload",
                target: node,
            }
        }
        CliCommand::SetLogLevel { level } => {
            session.set_log_level(&level)?;
            CommandOutcome::Done {
                action: "set-log-level",
                target: level,
            }
        }
    };
    Ok(outcome)
}

fn queue<F>(action: &'static str, args: JobArgs, call: F) -> Result<CommandOutcome, SessionError>
where
    F: FnOnce(&str, &str, JobMode) -> Result<Job, SessionError>,
{
    let JobArgs { target, mode } = args;
    let job = call(&target.node, &target.unit, mode)?;
    Ok(CommandOutcome::Job {
        action,
        unit: target.unit,
        node: target.node,
        job,
    })
}

fn done(action: &'static str, target: &UnitTarget) -> CommandOutcome {
    CommandOutcome::Done {
        action,
        target: format!("{} on {}", target.unit, target.node),
    }
}
