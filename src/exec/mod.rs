// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the [`Runner`] trait plus the deferred
//!   [`RunnerConfig`] used to build runners from configuration.
//! - [`render`] turns command fields into escaped shell text.
//! - [`shell`] is the production [`ShellRunner`], starting commands as
//!   `sh` background jobs.
//! - [`recording`] is the in-memory [`RecordingRunner`] used by tests.

pub mod backend;
pub mod recording;
pub mod render;
pub mod shell;

pub use backend::{Runner, RunnerConfig, RunnerSetting};
pub use recording::RecordingRunner;
pub use shell::{ShellRunner, ShellRunnerConfig};
