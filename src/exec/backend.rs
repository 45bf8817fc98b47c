// src/exec/backend.rs

//! Pluggable runner abstraction.
//!
//! The dispatcher talks to a [`Runner`] instead of spawning processes
//! itself. This makes it easy to swap in the in-memory
//! [`RecordingRunner`](super::RecordingRunner) in tests while production
//! uses the [`ShellRunner`](super::ShellRunner).
//!
//! Runners can also be described by a [`RunnerConfig`] and built lazily on
//! first use.

use std::fmt::Debug;
use std::sync::Arc;

use serde::Deserialize;

use crate::command::Command;
use crate::errors::{OffloadError, Result};

use super::recording::RecordingRunner;
use super::shell::{ShellRunner, ShellRunnerConfig};

/// Trait abstracting how a dispatched command is executed.
///
/// A runner is shared by every command of a dispatcher, so `run` may be
/// called repeatedly and from several threads at once.
pub trait Runner: Send + Sync + Debug {
    /// Short identifier used in logs (e.g. `"shell"`).
    fn name(&self) -> &'static str;

    /// Start `command` without waiting for it to finish.
    ///
    /// Errors are reported only for problems detected before the hand-off
    /// to the OS; the outcome of the started process is never observed.
    fn run(&self, command: &Command) -> Result<()>;
}

/// Deferred description of a runner, as found in the `[runner]` config
/// section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RunnerConfig {
    Shell(ShellRunnerConfig),
    Recording,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig::Shell(ShellRunnerConfig::default())
    }
}

impl RunnerConfig {
    /// Parse a runner description from an untyped TOML table.
    pub fn from_table(table: toml::Table) -> Result<Self> {
        toml::Value::Table(table).try_into::<RunnerConfig>().map_err(|e| {
            OffloadError::InvalidArgument(format!("not a valid runner configuration: {e}"))
        })
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            RunnerConfig::Shell(cfg) => cfg.validate(),
            RunnerConfig::Recording => Ok(()),
        }
    }

    /// Construct the described runner.
    pub fn build(self) -> Result<Arc<dyn Runner>> {
        self.validate()?;
        let runner: Arc<dyn Runner> = match self {
            RunnerConfig::Shell(cfg) => Arc::new(ShellRunner::new(cfg)),
            RunnerConfig::Recording => Arc::new(RecordingRunner::new()),
        };
        Ok(runner)
    }
}

/// What can be handed to [`Dispatcher::set_runner`](crate::Dispatcher::set_runner).
#[derive(Debug, Clone)]
pub enum RunnerSetting {
    /// A ready runner, used as-is.
    Instance(Arc<dyn Runner>),
    /// A runner to build on first use.
    Config(RunnerConfig),
}

impl<R: Runner + 'static> From<Arc<R>> for RunnerSetting {
    fn from(runner: Arc<R>) -> Self {
        RunnerSetting::Instance(runner)
    }
}

impl From<RunnerConfig> for RunnerSetting {
    fn from(config: RunnerConfig) -> Self {
        RunnerSetting::Config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> toml::Table {
        src.parse().unwrap()
    }

    #[test]
    fn parses_shell_table() {
        let cfg = RunnerConfig::from_table(table(
            r#"
kind = "shell"
runtime_bin_path = "/usr/bin/php8"
entry_point_path = "/srv/app/yiic"
"#,
        ))
        .unwrap();

        match cfg {
            RunnerConfig::Shell(shell) => {
                assert_eq!(shell.runtime_bin_path, "/usr/bin/php8");
                assert_eq!(shell.entry_point_path.as_deref(), Some("/srv/app/yiic"));
            }
            other => panic!("expected shell config, got {other:?}"),
        }
    }

    #[test]
    fn parses_recording_table() {
        let cfg = RunnerConfig::from_table(table(r#"kind = "recording""#)).unwrap();
        assert_eq!(cfg, RunnerConfig::Recording);
    }

    #[test]
    fn rejects_unknown_kind_and_missing_kind() {
        for src in [r#"kind = "queue""#, r#"runtime_bin_path = "php""#] {
            let err = RunnerConfig::from_table(table(src)).unwrap_err();
            assert!(matches!(err, OffloadError::InvalidArgument(_)), "{src}: {err:?}");
        }
    }

    #[test]
    fn build_rejects_empty_runtime_binary() {
        let cfg = RunnerConfig::Shell(ShellRunnerConfig {
            runtime_bin_path: "  ".to_string(),
            ..ShellRunnerConfig::default()
        });
        assert!(matches!(cfg.build(), Err(OffloadError::InvalidArgument(_))));
    }

    #[test]
    fn build_produces_named_runner() {
        assert_eq!(RunnerConfig::Recording.build().unwrap().name(), "recording");
        assert_eq!(RunnerConfig::default().build().unwrap().name(), "shell");
    }
}
