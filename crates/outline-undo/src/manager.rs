#![forbid(unsafe_code)]

//! Done/undone stacks with group scopes and coalescing.
//!
//! # Invariants
//!
//! 1. Only commands whose `run` returned true are ever recorded.
//! 2. Any successful non-redo run clears the undone stack.
//! 3. `done.len() <= config.max_depth` after every operation.
//! 4. Coalescing is only attempted against the immediately preceding entry
//!    in the same scope (top-level stack or the open group).
//!
//! ```text
//! begin_group("Paste")      run(a)  run(b)       end_group()
//! ┌─────────────────────┐   ┌────────────────┐   ┌──────────────────────┐
//! │ group: Paste []     │ → │ Paste [a, b]   │ → │ done: [.., Paste]    │
//! └─────────────────────┘   └────────────────┘   └──────────────────────┘
//!
//! run(c) fails inside the group
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ group force-closed; done: [.., Paste [a, b]]; run(c) returns false  │
//! │ undo/redo allowed again; runs rejected until the matching end_group │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::fmt;

use crate::command::{Command, GroupCommand};
use crate::config::HistoryConfig;
use crate::error::CommandError;

/// Undo/redo history for commands over a context `C`.
pub struct CommandManager<C> {
    /// Undoable entries (newest at back).
    done: VecDeque<Command<C>>,
    /// Redoable entries (newest at back).
    undone: Vec<Command<C>>,
    /// The open group, if any.
    active_group: Option<GroupCommand<C>>,
    /// Number of unmatched `begin_group` calls.
    group_depth: usize,
    /// Name of the group that failed inside the current scope.
    failed_group: Option<String>,
    last_error: Option<CommandError>,
    config: HistoryConfig,
}

impl<C> fmt::Debug for CommandManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandManager")
            .field("done_depth", &self.done.len())
            .field("undone_depth", &self.undone.len())
            .field("group_depth", &self.group_depth)
            .field("failed_group", &self.failed_group)
            .field("config", &self.config)
            .finish()
    }
}

impl<C> Default for CommandManager<C> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<C> CommandManager<C> {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            done: VecDeque::new(),
            undone: Vec::new(),
            active_group: None,
            group_depth: 0,
            failed_group: None,
            last_error: None,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Running
    // ========================================================================

    /// Run `command` and record it if it applied.
    ///
    /// Returns the command's own result. A failure inside an open group
    /// force-closes the group, keeping the commands that already ran as one
    /// undoable entry; commands submitted afterwards in the same scope are
    /// rejected without running.
    pub fn run(&mut self, mut command: Command<C>, context: &mut C) -> bool {
        if let Some(group) = &self.failed_group {
            tracing::debug!(command = %command.name(), group = %group, outcome = "rejected", "run");
            self.last_error = Some(CommandError::GroupAborted {
                group: group.clone(),
                command: command.name().to_owned(),
            });
            return false;
        }

        if !command.run(context) {
            tracing::debug!(command = %command.name(), outcome = "failed", "run");
            self.fail_group_or_command(command.name());
            return false;
        }

        self.last_error = None;
        self.undone.clear();
        let name = command.name().to_owned();
        let coalesce = self.config.coalesce;
        let outcome = match self.active_group.as_mut() {
            Some(group) if coalesce => {
                if group.append(command) {
                    "coalesced"
                } else {
                    "grouped"
                }
            }
            Some(group) => {
                group.push(command);
                "grouped"
            }
            None => self.record(command, coalesce),
        };
        tracing::debug!(command = %name, outcome, "run");
        true
    }

    /// Convenience for running a leaf action.
    pub fn run_action(
        &mut self,
        action: impl crate::command::Action<C> + 'static,
        context: &mut C,
    ) -> bool {
        self.run(Command::leaf(action), context)
    }

    fn fail_group_or_command(&mut self, command: &str) {
        let Some(group) = self.active_group.take() else {
            self.last_error = Some(CommandError::PreconditionFailed {
                operation: "run",
                command: command.to_owned(),
            });
            return;
        };
        let completed = group.len();
        tracing::debug!(group = %group.name(), completed, outcome = "failed", "group force-closed");
        self.last_error = Some(CommandError::GroupPartialFailure {
            group: group.name().to_owned(),
            command: command.to_owned(),
            completed,
        });
        self.failed_group = Some(group.name().to_owned());
        if !group.is_empty() {
            self.record(Command::Group(group), false);
        }
    }

    /// Push onto the done stack, optionally offering it to the last entry.
    fn record(&mut self, command: Command<C>, coalesce: bool) -> &'static str {
        if coalesce {
            if let Some(last) = self.done.back_mut() {
                if last.coalesce(&command) {
                    return "coalesced";
                }
            }
        }
        self.done.push_back(command);
        self.enforce_limits();
        "done"
    }

    fn enforce_limits(&mut self) {
        while self.done.len() > self.config.max_depth {
            if let Some(evicted) = self.done.pop_front() {
                tracing::trace!(command = %evicted.name(), "evicted from history");
            }
        }
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// Open a group scope. Nested calls only deepen the current scope.
    pub fn begin_group(&mut self, name: impl Into<String>) {
        self.group_depth += 1;
        if self.group_depth > 1 {
            tracing::trace!(depth = self.group_depth, "nested begin_group ignored");
            return;
        }
        let name = name.into();
        tracing::debug!(group = %name, "group opened");
        self.failed_group = None;
        self.active_group = Some(GroupCommand::new(name));
    }

    /// Close the current group scope. Without an open scope this is a no-op.
    ///
    /// Empty groups are dropped. A group with a single child is recorded as
    /// that child and offered to the previous top-level entry for
    /// coalescing. This is the one place where coalescing reaches across a
    /// group boundary.
    ///
    /// Closing an aborted scope only clears the abort; the completed prefix
    /// was recorded when the failure happened.
    pub fn end_group(&mut self) {
        if self.group_depth == 0 {
            return;
        }
        self.group_depth -= 1;
        if self.group_depth > 0 {
            return;
        }
        if let Some(group) = self.failed_group.take() {
            tracing::debug!(group = %group, outcome = "failed", "group closed");
            return;
        }
        let Some(group) = self.active_group.take() else {
            return;
        };
        if group.is_empty() {
            tracing::debug!(group = %group.name(), outcome = "empty", "group closed");
            return;
        }
        let group_name = group.name().to_owned();
        let outcome = match group.into_single() {
            Ok(single) => self.record(single, self.config.coalesce),
            Err(group) => self.record(Command::Group(group), false),
        };
        tracing::debug!(group = %group_name, outcome, "group closed");
    }

    /// Whether a group is collecting commands.
    ///
    /// False once a failure force-closed the group, even though the scope
    /// stays aborted until the matching [`end_group`](Self::end_group).
    #[must_use]
    pub fn in_group(&self) -> bool {
        self.active_group.is_some()
    }

    /// Whether the current scope was aborted by a failed command.
    #[must_use]
    pub fn group_failed(&self) -> bool {
        self.failed_group.is_some()
    }

    // ========================================================================
    // Undo / Redo
    // ========================================================================

    fn assert_no_open_group(&self, operation: &'static str) {
        if self.active_group.is_some() {
            panic!("{}", CommandError::IllegalReentrancy { operation });
        }
    }

    /// Undo the newest entry.
    ///
    /// # Panics
    ///
    /// Panics if a group is collecting commands. A force-closed group does
    /// not count.
    pub fn undo(&mut self, context: &mut C) -> bool {
        self.assert_no_open_group("undo");
        let Some(mut command) = self.done.pop_back() else {
            return false;
        };
        if command.undo(context) {
            tracing::debug!(command = %command.name(), outcome = "done", "undo");
            self.last_error = None;
            self.undone.push(command);
            true
        } else {
            tracing::debug!(command = %command.name(), outcome = "failed", "undo");
            self.last_error = Some(CommandError::PreconditionFailed {
                operation: "undo",
                command: command.name().to_owned(),
            });
            self.done.push_back(command);
            false
        }
    }

    /// Re-run the newest undone entry.
    ///
    /// # Panics
    ///
    /// Panics if a group is collecting commands. A force-closed group does
    /// not count.
    pub fn redo(&mut self, context: &mut C) -> bool {
        self.assert_no_open_group("redo");
        let Some(mut command) = self.undone.pop() else {
            return false;
        };
        if command.run(context) {
            tracing::debug!(command = %command.name(), outcome = "done", "redo");
            self.last_error = None;
            self.done.push_back(command);
            self.enforce_limits();
            true
        } else {
            tracing::debug!(command = %command.name(), outcome = "failed", "redo");
            self.last_error = Some(CommandError::PreconditionFailed {
                operation: "redo",
                command: command.name().to_owned(),
            });
            self.undone.push(command);
            false
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.done.is_empty() && self.active_group.is_none()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty() && self.active_group.is_none()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.done.is_empty() && self.undone.is_empty()
    }

    #[must_use]
    pub fn done_len(&self) -> usize {
        self.done.len()
    }

    #[must_use]
    pub fn undone_len(&self) -> usize {
        self.undone.len()
    }

    /// Done entries, oldest first.
    pub fn done(&self) -> impl Iterator<Item = &Command<C>> {
        self.done.iter()
    }

    /// Names of undoable entries, newest first.
    #[must_use]
    pub fn undo_names(&self) -> Vec<&str> {
        self.done.iter().rev().map(Command::name).collect()
    }

    /// Names of redoable entries, newest first.
    #[must_use]
    pub fn redo_names(&self) -> Vec<&str> {
        self.undone.iter().rev().map(Command::name).collect()
    }

    /// The failure recorded by the most recent run, undo, or redo.
    #[must_use]
    pub fn last_error(&self) -> Option<&CommandError> {
        self.last_error.as_ref()
    }

    /// Drop all history. Open group scopes are discarded too.
    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
        self.active_group = None;
        self.group_depth = 0;
        self.failed_group = None;
        self.last_error = None;
    }
}
