// src/config/model.rs

use serde::Deserialize;

use crate::exec::{RunnerConfig, ShellRunnerConfig};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [command]
/// output_log = "/var/log/app/offload.log"
/// auto_dispatch = true
///
/// [runner]
/// kind = "shell"
/// runtime_bin_path = "php"
/// entry_point_path = "/srv/app/protected/yiic"
/// ```
///
/// Both sections are optional. Without `[runner]` the dispatcher falls back
/// to a default shell runner.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Initial field values for every created command.
    #[serde(default)]
    pub command: CommandDefaults,

    /// Runner description from `[runner]`.
    #[serde(default)]
    pub runner: Option<RunnerConfig>,
}

/// `[command]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommandDefaults {
    /// File the spawned process output is appended to.
    pub output_log: Option<String>,

    /// Whether commands dispatch themselves when dropped undispatched.
    pub auto_dispatch: bool,
}

impl Default for CommandDefaults {
    fn default() -> Self {
        Self {
            output_log: None,
            auto_dispatch: true,
        }
    }
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`) or
/// `Default`, which is always valid.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub command: CommandDefaults,
    pub runner: Option<RunnerConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(command: CommandDefaults, runner: Option<RunnerConfig>) -> Self {
        Self { command, runner }
    }

    /// Shell settings to render with: the configured shell runner's, or the
    /// defaults when another (or no) runner kind is configured.
    pub fn shell_runner_config(&self) -> ShellRunnerConfig {
        match &self.runner {
            Some(RunnerConfig::Shell(cfg)) => cfg.clone(),
            _ => ShellRunnerConfig::default(),
        }
    }
}
