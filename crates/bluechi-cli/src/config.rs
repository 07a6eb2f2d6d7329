//! Configuration loading for `bluechictl`.
//!
//! Leading configuration flags are handed to `ortho_config`; everything from
//! the first other token onwards is the command line clap parses.

use std::ffi::{OsStr, OsString};

use bluechi_config::Config;
use ortho_config::OrthoConfig;

use crate::errors::AppError;

/// Flags owned by [`Config`].
///
/// Keep in sync with the fields of `bluechi_config::Config`.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--bus",
    "--manager-service",
    "--manager-path",
    "--manager-interface",
    "--node-interface",
    "--call-timeout-ms",
    "--reconnect-policy",
    "--log-filter",
    "--log-format",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the program name plus leading config flags.
    ///
    /// Configuration flags after the first command token are not seen here;
    /// clap rejects them as unknown arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

/// Layered loader: defaults, config file, `BLUECHI_*` environment, flags.
pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let (flag, inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (&*text, false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Result of splitting the raw arguments.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    /// Program name followed by the configuration flags and their values.
    pub(crate) config_arguments: Vec<OsString>,
    /// Program name followed by the command tokens.
    pub(crate) command_arguments: Vec<OsString>,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let mut tokens = args.iter();
    let Some(program) = tokens.next() else {
        return ConfigArgumentSplit::default();
    };

    let mut config_arguments = vec![program.clone()];
    let mut command_arguments = vec![program.clone()];
    let mut tokens = tokens.peekable();
    while let Some(argument) = tokens.next_if(|argument| classify(argument) != FlagAction::Stop)
    {
        config_arguments.push(argument.clone());
        if classify(argument) == (FlagAction::Include { needs_value: true })
            && let Some(value) = tokens.next()
        {
            config_arguments.push(value.clone());
        }
    }
    command_arguments.extend(tokens.cloned());

    ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    }
}
