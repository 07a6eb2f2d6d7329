//! Test support for driving the CLI runtime against a stub bus.

mod stub_bus;

use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::Arc;

use bluechi_client::BusConnector;
use bluechi_config::Config;

use crate::errors::AppError;
use crate::{ConfigLoader, ConnectorSource, IoStreams, run_with};

pub(crate) use stub_bus::StubBus;

/// A config loader that returns a fixed configuration.
pub(crate) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(crate) const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

impl ConnectorSource for StubBus {
    fn connector(&self, _config: &Config) -> Arc<dyn BusConnector> {
        Arc::new(self.clone())
    }
}

/// Captured result of one CLI invocation.
#[derive(Debug)]
pub(crate) struct CliRun {
    pub(crate) exit_code: ExitCode,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

impl CliRun {
    pub(crate) fn succeeded(&self) -> bool {
        self.exit_code == ExitCode::SUCCESS
    }
}

/// Runs the CLI with `args` (program name excluded) against `bus`.
pub(crate) fn run_cli(
    args: &[&str],
    config: &Config,
    bus: &StubBus,
    stdout_is_terminal: bool,
) -> CliRun {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let argv = std::iter::once("bluechictl")
        .chain(args.iter().copied())
        .map(OsString::from);
    let exit_code = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr, stdout_is_terminal);
        run_with(
            argv,
            &mut io,
            &StaticConfigLoader::new(config.clone()),
            bus,
        )
    };
    CliRun {
        exit_code,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    }
}

/// State shared by the CLI behaviour steps.
#[derive(Default)]
pub(crate) struct TestWorld {
    pub(crate) config: Config,
    pub(crate) bus: StubBus,
    pub(crate) run: Option<CliRun>,
}

impl TestWorld {
    pub(crate) fn invoke(&mut self, command_line: &str) {
        let args: Vec<&str> = command_line.split_whitespace().collect();
        self.run = Some(run_cli(&args, &self.config, &self.bus, false));
    }

    pub(crate) fn last_run(&self) -> &CliRun {
        match self.run.as_ref() {
            Some(run) => run,
            None => panic!("the CLI has not been invoked"),
        }
    }
}
