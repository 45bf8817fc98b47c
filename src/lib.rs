// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod exec;
pub mod logging;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::{CliArgs, Target};
use crate::command::{Command, Params};
use crate::config::{ConfigFile, default_config_path, load_and_validate};
use crate::exec::ShellRunner;

pub use crate::command::CommandId;
pub use crate::dispatcher::Dispatcher;
pub use crate::errors::{OffloadError, Result as OffloadResult};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - dispatcher + runner
/// - the command described by the CLI target
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_and_validate(&path)?
        }
        None => ConfigFile::default(),
    };

    let dispatcher = Dispatcher::from_config(&cfg);
    let mut command = build_command(&dispatcher, &args);

    if args.dry_run {
        let runner = ShellRunner::new(cfg.shell_runner_config());
        println!("{}", runner.render(&command)?);
        return Ok(());
    }

    command.dispatch()?;
    info!(command_id = %command.id(), "command dispatched");
    Ok(())
}

/// Explicit paths are always used; the default path only when it exists.
fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(PathBuf::from(path)),
        None => Some(default_config_path()).filter(|p| p.is_file()),
    }
}

fn build_command(dispatcher: &Dispatcher, args: &CliArgs) -> Command {
    // dispatched explicitly by `run`, or not at all for --dry-run
    let command = dispatcher.create().with_auto_dispatch(false);

    let command = match &args.target {
        Target::External { bin, params, args: positional } => {
            command.as_external(bin.clone(), collect_params(params, positional))
        }
        Target::Action { class, action, params, args: positional } => command
            .as_framework_action(class.clone(), action.as_deref(), collect_params(params, positional)),
    };

    match &args.output_log {
        Some(log) => command.with_output_log(log.clone()),
        None => command,
    }
}

fn collect_params(named: &[(String, String)], positional: &[String]) -> Params {
    let params = named
        .iter()
        .fold(Params::new(), |p, (k, v)| p.named(k.clone(), v.clone()));
    positional.iter().fold(params, |p, v| p.arg(v.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn build_command_applies_cli_output_log() {
        let args = CliArgs::parse_from([
            "offload", "--output-log", "/tmp/o.log", "external", "ls", "-al",
        ]);
        let dispatcher = Dispatcher::default();
        let command = build_command(&dispatcher, &args);

        assert_eq!(command.bin_path(), Some("ls"));
        assert_eq!(command.output_log(), Some("/tmp/o.log"));
        assert!(!command.auto_dispatch());
    }

    #[test]
    fn named_params_come_before_positional() {
        let params = collect_params(
            &[("k".to_string(), "v".to_string())],
            &["a".to_string(), "b".to_string()],
        );
        let keys: Vec<String> = params.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["k", "0", "1"]);
    }

    #[test]
    fn run_with_missing_explicit_config_fails() {
        let args = CliArgs::parse_from([
            "offload", "--config", "/nonexistent/Offload.toml", "--dry-run", "external", "ls",
        ]);
        assert!(run(args).is_err());
    }
}
