#![allow(dead_code)]

use offload::config::{CommandDefaults, ConfigFile, RawConfigFile};
use offload::exec::{RunnerConfig, ShellRunnerConfig};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                command: CommandDefaults::default(),
                runner: None,
            },
        }
    }

    pub fn with_output_log(mut self, path: &str) -> Self {
        self.config.command.output_log = Some(path.to_string());
        self
    }

    pub fn with_auto_dispatch(mut self, val: bool) -> Self {
        self.config.command.auto_dispatch = val;
        self
    }

    pub fn with_recording_runner(mut self) -> Self {
        self.config.runner = Some(RunnerConfig::Recording);
        self
    }

    pub fn with_shell_runner(mut self, shell: ShellRunnerConfig) -> Self {
        self.config.runner = Some(RunnerConfig::Shell(shell));
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ShellRunnerConfig`.
pub struct ShellRunnerConfigBuilder {
    shell: ShellRunnerConfig,
}

impl ShellRunnerConfigBuilder {
    pub fn new() -> Self {
        Self {
            shell: ShellRunnerConfig::default(),
        }
    }

    pub fn runtime_bin_path(mut self, path: &str) -> Self {
        self.shell.runtime_bin_path = path.to_string();
        self
    }

    pub fn entry_point_path(mut self, path: &str) -> Self {
        self.shell.entry_point_path = Some(path.to_string());
        self
    }

    pub fn build(self) -> ShellRunnerConfig {
        self.shell
    }
}

impl Default for ShellRunnerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
