// src/command/mod.rs

//! Command descriptors.
//!
//! A [`Command`] describes one pending invocation:
//! - a framework action (`target_class` + optional `target_action`), or
//! - an external binary (`bin_path`),
//!
//! plus its [`Params`] and an optional output log. Commands created by a
//! [`Dispatcher`] are bound to it and dispatch themselves on drop unless
//! auto-dispatch is turned off.

pub mod params;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::config::CommandDefaults;
use crate::dispatcher::Dispatcher;
use crate::errors::{OffloadError, Result};

pub use params::{ParamKey, Params};

static NEXT_COMMAND_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a command instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(u64);

impl CommandId {
    fn next() -> Self {
        CommandId(NEXT_COMMAND_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct Command {
    id: CommandId,
    target_class: Option<String>,
    target_action: Option<String>,
    bin_path: Option<String>,
    params: Params,
    output_log: Option<String>,
    dispatched: bool,
    auto_dispatch: bool,
    dispatcher: Option<Dispatcher>,
}

impl Default for Command {
    fn default() -> Self {
        Self {
            id: CommandId::next(),
            target_class: None,
            target_action: None,
            bin_path: None,
            params: Params::new(),
            output_log: None,
            dispatched: false,
            auto_dispatch: true,
            dispatcher: None,
        }
    }
}

impl Command {
    /// Create an unbound command. [`Command::dispatch`] fails until a
    /// dispatcher is attached with [`Command::with_dispatcher`].
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_defaults(defaults: &CommandDefaults, dispatcher: Dispatcher) -> Self {
        let mut command = Self::default();
        command.output_log = defaults.output_log.clone();
        command.auto_dispatch = defaults.auto_dispatch;
        command.dispatcher = Some(dispatcher);
        command
    }

    /// Configure the command to run a framework console action.
    ///
    /// `action` is only applied when given; `params` always replaces the
    /// current parameter list.
    pub fn as_framework_action(
        mut self,
        class: impl Into<String>,
        action: Option<&str>,
        params: Params,
    ) -> Self {
        self.target_class = Some(class.into());
        if let Some(action) = action {
            self.target_action = Some(action.to_string());
        }
        self.params = params;
        self
    }

    /// Configure the command to run an external binary.
    pub fn as_external(mut self, bin_path: impl Into<String>, params: Params) -> Self {
        self.bin_path = Some(bin_path.into());
        self.params = params;
        self
    }

    pub fn with_target_class(mut self, class: impl Into<String>) -> Self {
        self.target_class = Some(class.into());
        self
    }

    pub fn with_target_action(mut self, action: impl Into<String>) -> Self {
        self.target_action = Some(action.into());
        self
    }

    pub fn with_bin_path(mut self, bin_path: impl Into<String>) -> Self {
        self.bin_path = Some(bin_path.into());
        self
    }

    /// Replace the parameter list wholesale.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn set_params(&mut self, params: Params) -> &mut Self {
        self.params = params;
        self
    }

    pub fn with_output_log(mut self, path: impl Into<String>) -> Self {
        self.output_log = Some(path.into());
        self
    }

    pub fn with_auto_dispatch(mut self, enabled: bool) -> Self {
        self.auto_dispatch = enabled;
        self
    }

    pub fn set_auto_dispatch(&mut self, enabled: bool) -> &mut Self {
        self.auto_dispatch = enabled;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn target_class(&self) -> Option<&str> {
        self.target_class.as_deref()
    }

    pub fn target_action(&self) -> Option<&str> {
        self.target_action.as_deref()
    }

    pub fn bin_path(&self) -> Option<&str> {
        self.bin_path.as_deref()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn output_log(&self) -> Option<&str> {
        self.output_log.as_deref()
    }

    pub fn is_dispatched(&self) -> bool {
        self.dispatched
    }

    pub fn auto_dispatch(&self) -> bool {
        self.auto_dispatch
    }

    pub fn dispatcher(&self) -> Option<&Dispatcher> {
        self.dispatcher.as_ref()
    }

    /// True when an external binary is targeted. An empty `bin_path` counts
    /// as unset.
    pub fn is_external(&self) -> bool {
        self.bin_path().is_some_and(|p| !p.is_empty())
    }

    /// Plain-data copy of what this command would run.
    pub fn snapshot(&self) -> CommandSnapshot {
        CommandSnapshot {
            id: self.id,
            target_class: self.target_class.clone(),
            target_action: self.target_action.clone(),
            bin_path: self.bin_path.clone(),
            params: self.params.clone(),
            output_log: self.output_log.clone(),
        }
    }

    /// Hand this command to its dispatcher for background execution.
    ///
    /// Calling this again on an already dispatched command runs it again.
    /// On failure auto-dispatch is disarmed so the error is not repeated
    /// on drop.
    pub fn dispatch(&mut self) -> Result<&mut Self> {
        let Some(dispatcher) = self.dispatcher.clone() else {
            self.auto_dispatch = false;
            return Err(OffloadError::ConfigError(format!(
                "command {} has no dispatcher bound",
                self.id
            )));
        };

        if let Err(err) = dispatcher.dispatch(self) {
            self.auto_dispatch = false;
            return Err(err);
        }

        Ok(self)
    }

    pub(crate) fn mark_dispatched(&mut self) {
        self.dispatched = true;
    }
}

impl Drop for Command {
    fn drop(&mut self) {
        if !self.auto_dispatch || self.dispatched {
            return;
        }

        debug!(command_id = %self.id, "auto-dispatching pending command on drop");
        if let Err(err) = self.dispatch() {
            warn!(command_id = %self.id, error = %err, "auto-dispatch failed");
        }
    }
}

/// Detached copy of a command's invocation fields.
///
/// Carries no dispatcher and no lifecycle, so holding or dropping it has no
/// side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSnapshot {
    pub id: CommandId,
    pub target_class: Option<String>,
    pub target_action: Option<String>,
    pub bin_path: Option<String>,
    pub params: Params,
    pub output_log: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn framework_action_sets_class_action_and_params() {
        let cmd = Command::new()
            .with_auto_dispatch(false)
            .as_framework_action("FooCommand", Some("index"), Params::new().arg("x"));

        assert_eq!(cmd.target_class(), Some("FooCommand"));
        assert_eq!(cmd.target_action(), Some("index"));
        assert_eq!(cmd.params().len(), 1);
        assert!(!cmd.is_external());
    }

    #[test]
    fn framework_action_without_action_keeps_previous_action() {
        let cmd = Command::new()
            .with_auto_dispatch(false)
            .with_target_action("long")
            .as_framework_action("FooCommand", None, Params::new());

        assert_eq!(cmd.target_action(), Some("long"));
    }

    #[test]
    fn params_are_replaced_not_merged() {
        let mut cmd = Command::new()
            .with_auto_dispatch(false)
            .as_external("/usr/bin/foo", Params::new().named("a", 1).named("b", 2));
        cmd.set_params(Params::new().named("c", 3));

        let keys: Vec<_> = cmd.params().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["c"]);
    }

    #[test]
    fn ids_are_unique_per_instance() {
        let a = Command::new().with_auto_dispatch(false);
        let b = Command::new().with_auto_dispatch(false);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn dispatch_without_dispatcher_is_config_error() {
        let mut cmd = Command::new().with_bin_path("/usr/bin/foo");
        let err = cmd.dispatch().unwrap_err();

        assert!(matches!(err, OffloadError::ConfigError(_)));
        assert!(!cmd.is_dispatched());
        // the failed explicit dispatch disarms the drop hook
        assert!(!cmd.auto_dispatch());
    }

    #[test]
    fn snapshot_copies_invocation_fields() {
        let cmd = Command::new()
            .with_auto_dispatch(false)
            .as_external("/usr/bin/foo", Params::new().named("bar", json!([1, 2])))
            .with_output_log("/tmp/foo.log");
        let snap = cmd.snapshot();

        assert_eq!(snap.id, cmd.id());
        assert_eq!(snap.bin_path.as_deref(), Some("/usr/bin/foo"));
        assert_eq!(snap.output_log.as_deref(), Some("/tmp/foo.log"));
        assert_eq!(&snap.params, cmd.params());
    }
}
