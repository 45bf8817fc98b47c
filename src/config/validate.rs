// src/config/validate.rs

use crate::config::model::{CommandDefaults, ConfigFile, RawConfigFile};
use crate::errors::{OffloadError, Result};
use crate::exec::RunnerConfig;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::OffloadError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.command, raw.runner))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_command_defaults(&cfg.command)?;
    if let Some(runner) = &cfg.runner {
        validate_runner(runner)?;
    }
    Ok(())
}

fn validate_command_defaults(defaults: &CommandDefaults) -> Result<()> {
    if defaults
        .output_log
        .as_deref()
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err(OffloadError::ConfigError(
            "[command].output_log must not be empty when set".to_string(),
        ));
    }
    Ok(())
}

fn validate_runner(runner: &RunnerConfig) -> Result<()> {
    runner.validate().map_err(|e| match e {
        OffloadError::InvalidArgument(msg) => OffloadError::ConfigError(format!("[runner]: {msg}")),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ShellRunnerConfig;

    #[test]
    fn default_raw_config_is_valid() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert!(cfg.command.auto_dispatch);
        assert!(cfg.runner.is_none());
    }

    #[test]
    fn empty_output_log_is_rejected() {
        let raw = RawConfigFile {
            command: CommandDefaults {
                output_log: Some(" ".to_string()),
                auto_dispatch: true,
            },
            runner: None,
        };
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(OffloadError::ConfigError(_))
        ));
    }

    #[test]
    fn invalid_runner_is_reported_as_config_error() {
        let raw = RawConfigFile {
            command: CommandDefaults::default(),
            runner: Some(RunnerConfig::Shell(ShellRunnerConfig {
                entry_point_path: Some(String::new()),
                ..ShellRunnerConfig::default()
            })),
        };

        match ConfigFile::try_from(raw) {
            Err(OffloadError::ConfigError(msg)) => assert!(msg.contains("entry_point_path")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }
}
