// src/exec/recording.rs

//! Runner that keeps dispatched commands in memory instead of running them.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::command::{Command, CommandSnapshot};
use crate::errors::Result;

use super::backend::Runner;

/// Records a snapshot of every command passed to `run`, in order.
///
/// Nothing is rendered or spawned. Useful for asserting what a piece of
/// code would have dispatched.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<CommandSnapshot>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded commands, oldest first.
    pub fn commands(&self) -> Vec<CommandSnapshot> {
        self.lock().clone()
    }

    /// The most recently recorded command, if any.
    pub fn last(&self) -> Option<CommandSnapshot> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CommandSnapshot>> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Runner for RecordingRunner {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn run(&self, command: &Command) -> Result<()> {
        debug!(command_id = %command.id(), "recording command");
        self.lock().push(command.snapshot());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Params;

    #[test]
    fn last_is_most_recent_and_len_counts_runs() {
        let runner = RecordingRunner::new();
        assert!(runner.last().is_none());

        let commands: Vec<Command> = (0..3)
            .map(|i| {
                Command::new()
                    .with_auto_dispatch(false)
                    .as_external(format!("/bin/job{i}"), Params::new())
            })
            .collect();
        for c in &commands {
            runner.run(c).unwrap();
        }

        assert_eq!(runner.len(), 3);
        assert_eq!(runner.last().map(|s| s.id), Some(commands[2].id()));
        assert_eq!(
            runner.commands().first().and_then(|s| s.bin_path.clone()).as_deref(),
            Some("/bin/job0")
        );

        runner.clear();
        assert_eq!(runner.len(), 0);
        assert!(runner.is_empty());
    }

    #[test]
    fn records_commands_without_a_target() {
        let runner = RecordingRunner::new();
        runner.run(&Command::new().with_auto_dispatch(false)).unwrap();
        assert_eq!(runner.len(), 1);
    }
}
