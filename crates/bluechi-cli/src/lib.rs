//! Command-line runtime for `bluechictl`.
//!
//! The runtime splits configuration flags from the command, loads layered
//! configuration, installs telemetry, opens a manager session, runs one
//! operation, and renders the outcome. Configuration loading, the bus
//! connector, and the IO streams are injectable so tests can drive the whole
//! pipeline against an in-memory bus.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use bluechi_client::adapter::DbusConnector;
use bluechi_client::{BusConnector, ManagerSession, SessionSettings};
use bluechi_config::Config;
use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;

mod cli;
mod command;
mod config;
mod errors;
pub mod output;
pub mod telemetry;

use cli::Cli;
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use errors::AppError;
pub use output::{OutputFormat, ResolvedOutputFormat};

const CLI_TARGET: &str = "bluechi_cli";

/// Supplies the bus connector for a loaded configuration.
pub(crate) trait ConnectorSource {
    fn connector(&self, config: &Config) -> Arc<dyn BusConnector>;
}

/// Production source backed by the D-Bus adapter.
pub(crate) struct DbusConnectorSource;

impl ConnectorSource for DbusConnectorSource {
    fn connector(&self, config: &Config) -> Arc<dyn BusConnector> {
        Arc::new(DbusConnector::from_settings(&SessionSettings::from_config(
            config,
        )))
    }
}

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
    stdout_is_terminal: bool,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E, stdout_is_terminal: bool) -> Self {
        Self {
            stdout,
            stderr,
            stdout_is_terminal,
        }
    }
}

struct CliRunner<'a, 'io, W: Write, E: Write, L: ConfigLoader, C: ConnectorSource> {
    io: &'a mut IoStreams<'io, W, E>,
    loader: &'a L,
    connectors: &'a C,
}

impl<W, E, L, C> CliRunner<'_, '_, W, E, L, C>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
    C: ConnectorSource,
{
    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);

        let cli = match Cli::try_parse_from(&split.command_arguments) {
            Ok(cli) => cli,
            Err(error) => return self.report_usage(error),
        };

        match self.execute(cli, &split.config_arguments) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                let _ = writeln!(self.io.stderr, "bluechictl: {error}");
                ExitCode::FAILURE
            }
        }
    }

    fn execute(&mut self, cli: Cli, config_arguments: &[OsString]) -> Result<(), AppError> {
        let config = self.loader.load(config_arguments)?;
        telemetry::initialise(&config)?;

        let format = cli.output.resolve(self.io.stdout_is_terminal);
        debug!(
            target: CLI_TARGET,
            command = ?cli.command,
            bus = %config.bus(),
            "running command"
        );

        let session = ManagerSession::open(
            self.connectors.connector(&config),
            SessionSettings::from_config(&config),
        )?;
        let outcome = command::execute(&session, cli.command);
        session.close();
        output::emit(&outcome?, format, &mut *self.io.stdout)
    }

    fn report_usage(&mut self, error: clap::Error) -> ExitCode {
        match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = write!(self.io.stdout, "{error}");
                ExitCode::SUCCESS
            }
            _ => {
                let _ = write!(self.io.stderr, "{}", AppError::CliUsage(error));
                ExitCode::FAILURE
            }
        }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E, stdout_is_terminal: bool) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr, stdout_is_terminal);
    run_with(args, &mut io, &OrthoConfigLoader, &DbusConnectorSource)
}

/// Runs the CLI with a custom configuration loader and connector source.
pub(crate) fn run_with<I, W, E, L, C>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
    connectors: &C,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    C: ConnectorSource,
{
    CliRunner {
        io,
        loader,
        connectors,
    }
    .run(args)
}

#[cfg(test)]
mod tests;
