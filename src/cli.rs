// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `offload`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "offload",
    version,
    about = "Start a command in the background and return immediately.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Offload.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `OFFLOAD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the shell line that would be started, without starting it.
    #[arg(long)]
    pub dry_run: bool,

    /// Append the command's output to this file.
    #[arg(long, value_name = "PATH")]
    pub output_log: Option<String>,

    #[command(subcommand)]
    pub target: Target,
}

/// What to start.
#[derive(Debug, Clone, Subcommand)]
pub enum Target {
    /// Run an external binary.
    External {
        /// Binary path or name.
        bin: String,

        /// Named argument, rendered as `KEY VALUE`.
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// Positional arguments.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a framework console command action.
    Action {
        /// Console command class name, e.g. `FooCommand`.
        class: String,

        /// Action within the command.
        #[arg(long)]
        action: Option<String>,

        /// Named argument, rendered as `--KEY=VALUE`.
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// Positional arguments.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{s}`")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
