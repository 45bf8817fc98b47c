// src/dispatcher.rs

//! Command factory and router.
//!
//! A [`Dispatcher`] creates commands bound to itself and forwards them to
//! its runner. Cloning a dispatcher yields another handle to the same
//! defaults and runner.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::command::Command;
use crate::config::{CommandDefaults, ConfigFile};
use crate::errors::Result;
use crate::exec::{Runner, RunnerConfig, RunnerSetting, ShellRunner};

#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

struct Shared {
    defaults: CommandDefaults,
    runner: Mutex<RunnerSlot>,
}

enum RunnerSlot {
    /// Nothing configured; a default [`ShellRunner`] is built on first use.
    Unset,
    Deferred(RunnerConfig),
    Ready(Arc<dyn Runner>),
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(CommandDefaults::default())
    }
}

impl Dispatcher {
    /// Create a dispatcher whose commands start from `defaults`.
    pub fn new(defaults: CommandDefaults) -> Self {
        Self::with_slot(defaults, RunnerSlot::Unset)
    }

    /// Create a dispatcher from a validated config file.
    ///
    /// The `[runner]` section, if present, is built lazily on first dispatch.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let slot = match &cfg.runner {
            Some(runner) => RunnerSlot::Deferred(runner.clone()),
            None => RunnerSlot::Unset,
        };
        Self::with_slot(cfg.command.clone(), slot)
    }

    fn with_slot(defaults: CommandDefaults, slot: RunnerSlot) -> Self {
        Self {
            shared: Arc::new(Shared {
                defaults,
                runner: Mutex::new(slot),
            }),
        }
    }

    pub fn defaults(&self) -> &CommandDefaults {
        &self.shared.defaults
    }

    /// New command with the defaults applied, bound to this dispatcher.
    pub fn create(&self) -> Command {
        Command::from_defaults(&self.shared.defaults, self.clone())
    }

    /// The active runner.
    ///
    /// Resolves a deferred config or, when nothing was set, the default
    /// [`ShellRunner`]; the result is cached for the dispatcher's lifetime.
    pub fn runner(&self) -> Result<Arc<dyn Runner>> {
        let mut slot = self.lock_slot();

        let runner = match &*slot {
            RunnerSlot::Ready(runner) => return Ok(Arc::clone(runner)),
            RunnerSlot::Deferred(config) => config.clone().build()?,
            RunnerSlot::Unset => Arc::new(ShellRunner::default()) as Arc<dyn Runner>,
        };

        debug!(runner = runner.name(), "resolved command runner");
        *slot = RunnerSlot::Ready(Arc::clone(&runner));
        Ok(runner)
    }

    /// Replace the runner with a ready instance or a deferred config.
    ///
    /// A config is validated here, so an invalid one fails immediately
    /// with `InvalidArgument`.
    pub fn set_runner(&self, setting: impl Into<RunnerSetting>) -> Result<&Self> {
        let slot = match setting.into() {
            RunnerSetting::Instance(runner) => RunnerSlot::Ready(runner),
            RunnerSetting::Config(config) => {
                config.validate()?;
                RunnerSlot::Deferred(config)
            }
        };

        *self.lock_slot() = slot;
        Ok(self)
    }

    /// Like [`Dispatcher::set_runner`] with a config given as an untyped
    /// table, e.g. `kind = "shell"` plus the shell runner fields.
    pub fn set_runner_table(&self, table: toml::Table) -> Result<&Self> {
        let config = RunnerConfig::from_table(table)?;
        self.set_runner(config)
    }

    /// Run `command` through the active runner and mark it dispatched.
    pub fn dispatch(&self, command: &mut Command) -> Result<&Self> {
        let runner = self.runner()?;
        debug!(command_id = %command.id(), runner = runner.name(), "dispatching command");

        runner.run(command)?;
        command.mark_dispatched();
        Ok(self)
    }

    /// True when both handles share the same dispatcher state.
    pub fn same_as(&self, other: &Dispatcher) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    fn lock_slot(&self) -> MutexGuard<'_, RunnerSlot> {
        self.shared
            .runner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let runner = match &*self.lock_slot() {
            RunnerSlot::Unset => "unset".to_string(),
            RunnerSlot::Deferred(cfg) => format!("deferred({cfg:?})"),
            RunnerSlot::Ready(runner) => runner.name().to_string(),
        };

        f.debug_struct("Dispatcher")
            .field("defaults", &self.shared.defaults)
            .field("runner", &runner)
            .finish()
    }
}
