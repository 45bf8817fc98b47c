// src/exec/shell.rs

//! Shell runner: renders a command into one `sh` line and starts it in the
//! background.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::{Command as ShellProcess, Stdio};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::errors::{OffloadError, Result};

use super::backend::Runner;
use super::render::{derive_command_name, render_params};

const DEFAULT_RUNTIME_BIN: &str = "php";
const DEFAULT_ENTRY_POINT: &str = "yiic";

/// Settings used to build the base of framework-action lines.
///
/// External commands ignore all of these.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShellRunnerConfig {
    /// Interpreter that executes the console entry point.
    pub runtime_bin_path: String,

    /// Console entry point script. When unset, `yiic` inside `base_path`
    /// is used.
    pub entry_point_path: Option<String>,

    /// Application base directory. Defaults to the current directory,
    /// resolved at render time.
    pub base_path: Option<PathBuf>,
}

impl Default for ShellRunnerConfig {
    fn default() -> Self {
        Self {
            runtime_bin_path: DEFAULT_RUNTIME_BIN.to_string(),
            entry_point_path: None,
            base_path: None,
        }
    }
}

impl ShellRunnerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.runtime_bin_path.trim().is_empty() {
            return Err(OffloadError::InvalidArgument(
                "shell runner `runtime_bin_path` must not be empty".to_string(),
            ));
        }
        if self
            .entry_point_path
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            return Err(OffloadError::InvalidArgument(
                "shell runner `entry_point_path` must not be empty when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Runner that hands commands to `sh` as background jobs.
///
/// Holds no mutable state; every `run` renders into its own buffer.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    config: ShellRunnerConfig,
}

impl ShellRunner {
    pub fn new(config: ShellRunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ShellRunnerConfig {
        &self.config
    }

    /// Render `command` into the full shell line, including redirection and
    /// the trailing `&`:
    ///
    /// `<base> [params...] 2>&1 [>> <output_log>] &`
    pub fn render(&self, command: &Command) -> Result<String> {
        let external = command.is_external();

        let mut line = match command.bin_path().filter(|_| external) {
            Some(bin_path) => bin_path.to_string(),
            None => self.framework_base(command)?,
        };

        let params = render_params(command.params(), external)?;
        if !params.is_empty() {
            line.push(' ');
            line.push_str(&params);
        }

        line.push_str(" 2>&1");

        if let Some(log) = output_log(command) {
            line.push_str(" >> ");
            line.push_str(log);
        }

        line.push_str(" &");
        Ok(line)
    }

    fn framework_base(&self, command: &Command) -> Result<String> {
        let class = command
            .target_class()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                OffloadError::InvalidArgument(
                    "command to be executed should set either `bin_path` or `target_class`"
                        .to_string(),
                )
            })?;

        let mut base = format!(
            "{} {} {}",
            self.config.runtime_bin_path,
            self.entry_point()?,
            derive_command_name(class)
        );

        if let Some(action) = command.target_action().filter(|a| !a.is_empty()) {
            base.push(' ');
            base.push_str(action);
        }

        Ok(base)
    }

    fn entry_point(&self) -> Result<String> {
        if let Some(path) = &self.config.entry_point_path {
            return Ok(path.clone());
        }

        let base = match &self.config.base_path {
            Some(base) => base.clone(),
            None => std::env::current_dir()?,
        };
        Ok(base.join(DEFAULT_ENTRY_POINT).display().to_string())
    }

    /// Start `line` through `sh -c`.
    ///
    /// The line ends with `&`, so `sh` exits as soon as the job is started
    /// and waiting on it does not block on the job itself. When a log is
    /// set, `sh` inherits it as stdout so the job's merged stderr lands in
    /// the log too; otherwise all output goes to the null device.
    fn spawn(&self, line: &str, log: Option<&str>) -> Result<()> {
        let stdout = match log {
            Some(path) => Stdio::from(
                OpenOptions::new().create(true).append(true).open(path)?,
            ),
            None => Stdio::null(),
        };

        let status = ShellProcess::new("sh")
            .arg("-c")
            .arg(line)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::null())
            .status()?;

        if !status.success() {
            warn!(
                exit_code = status.code().unwrap_or(-1),
                line = %line,
                "shell exited with a failure status while starting background job"
            );
        }

        Ok(())
    }
}

impl Runner for ShellRunner {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn run(&self, command: &Command) -> Result<()> {
        let line = self.render(command)?;
        debug!(command_id = %command.id(), line = %line, "rendered shell line");

        self.spawn(&line, output_log(command))?;

        info!(command_id = %command.id(), line = %line, "started background command");
        Ok(())
    }
}

fn output_log(command: &Command) -> Option<&str> {
    command.output_log().filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Params;
    use serde_json::json;

    fn runner() -> ShellRunner {
        ShellRunner::new(ShellRunnerConfig {
            entry_point_path: Some("/app/yiic".to_string()),
            ..ShellRunnerConfig::default()
        })
    }

    fn cmd() -> Command {
        Command::new().with_auto_dispatch(false)
    }

    #[test]
    fn renders_external_with_named_param() {
        let line = runner()
            .render(&cmd().as_external("/usr/bin/foo", Params::new().named("bar", 1)))
            .unwrap();

        assert_eq!(line, "/usr/bin/foo bar 1 2>&1 &");
        assert!(line.contains("bar 1"));
        assert!(line.ends_with('&'));
    }

    #[test]
    fn renders_framework_action_with_derived_name() {
        let line = runner()
            .render(&cmd().as_framework_action("FooCommand", Some("index"), Params::new()))
            .unwrap();

        assert_eq!(line, "php /app/yiic foo index 2>&1 &");
    }

    #[test]
    fn renders_framework_params_as_long_options() {
        let command = cmd().as_framework_action(
            "FooCommand",
            Some("named"),
            Params::new().named("input", 123).named("--tags", json!(["a", "b"])),
        );

        assert_eq!(
            runner().render(&command).unwrap(),
            r#"php /app/yiic foo named --input=123 --tags='["a","b"]' 2>&1 &"#
        );
    }

    #[test]
    fn appends_output_log_before_background_marker() {
        let command = cmd()
            .as_external("ls -al", Params::positional(["/tmp"]))
            .with_output_log("/var/log/ls.log");

        assert_eq!(
            runner().render(&command).unwrap(),
            "ls -al /tmp 2>&1 >> /var/log/ls.log &"
        );
    }

    #[test]
    fn bin_path_takes_precedence_over_class() {
        let command = cmd()
            .with_target_class("FooCommand")
            .as_external("/usr/bin/foo", Params::new());

        assert_eq!(runner().render(&command).unwrap(), "/usr/bin/foo 2>&1 &");
    }

    #[test]
    fn entry_point_defaults_to_yiic_in_base_path() {
        let runner = ShellRunner::new(ShellRunnerConfig {
            runtime_bin_path: "/usr/bin/php".to_string(),
            entry_point_path: None,
            base_path: Some(PathBuf::from("/srv/app")),
        });
        let line = runner
            .render(&cmd().as_framework_action("MailCommand", None, Params::new()))
            .unwrap();

        assert_eq!(line, "/usr/bin/php /srv/app/yiic mail 2>&1 &");
    }

    #[test]
    fn metacharacters_stay_inside_one_argument() {
        let command = cmd().as_external("/bin/echo", Params::positional(["a;rm -rf /"]));
        let line = runner().render(&command).unwrap();

        assert_eq!(line, "/bin/echo 'a;rm -rf /' 2>&1 &");
    }

    #[test]
    fn missing_target_is_invalid_argument() {
        let err = runner().render(&cmd()).unwrap_err();
        assert!(matches!(err, OffloadError::InvalidArgument(_)));

        let err = runner().run(&cmd().with_bin_path("")).unwrap_err();
        assert!(matches!(err, OffloadError::InvalidArgument(_)));
    }
}
