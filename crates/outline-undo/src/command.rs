#![forbid(unsafe_code)]

//! Undoable command infrastructure.
//!
//! A [`Command`] is either a leaf [`Action`] or a [`GroupCommand`] of child
//! commands. The run/undo/coalesce contract is implemented once on
//! [`Command`] by matching on the variant.
//!
//! # Contract
//!
//! - `run` returns `false` when the operation did not apply (a precondition
//!   no longer holds). A command that returned `false` is never recorded.
//! - `undo` reverses exactly what the last successful `run` did, using state
//!   captured during that run.
//! - `coalesce(next)` is offered a command that has *already run*. Returning
//!   `true` means the receiver absorbed `next`'s effect, so undoing the
//!   receiver reverts both.
//!
//! # Groups
//!
//! Running a group runs its children in order and stops at the first
//! failure without reverting the children that already ran. Undoing a group
//! undoes children in reverse order and stops at the first failure. Partial
//! outcomes are reported through the boolean result, never swallowed.

use std::any::Any;
use std::fmt;

/// A leaf unit of undoable work over a context `C`.
pub trait Action<C> {
    /// Human-readable name used for tracing and undo menus.
    fn name(&self) -> &str;

    /// Apply the action. Returns false if it did not apply.
    fn run(&mut self, context: &mut C) -> bool;

    /// Revert the last successful [`run`](Action::run).
    fn undo(&mut self, context: &mut C) -> bool;

    /// Absorb `next`, which ran immediately after this action.
    fn coalesce(&mut self, _next: &Command<C>) -> bool {
        false
    }

    /// Downcast support for [`coalesce`](Action::coalesce) implementations.
    fn as_any(&self) -> &dyn Any;
}

/// A unit of undoable work: a single action or an ordered group.
pub enum Command<C> {
    Leaf(Box<dyn Action<C>>),
    Group(GroupCommand<C>),
}

impl<C> fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(action) => f.debug_tuple("Leaf").field(&action.name()).finish(),
            Self::Group(group) => group.fmt(f),
        }
    }
}

impl<C> Command<C> {
    /// Wrap an action.
    pub fn leaf(action: impl Action<C> + 'static) -> Self {
        Self::Leaf(Box::new(action))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(action) => action.name(),
            Self::Group(group) => group.name(),
        }
    }

    pub fn run(&mut self, context: &mut C) -> bool {
        match self {
            Self::Leaf(action) => action.run(context),
            Self::Group(group) => group.run(context),
        }
    }

    pub fn undo(&mut self, context: &mut C) -> bool {
        match self {
            Self::Leaf(action) => action.undo(context),
            Self::Group(group) => group.undo(context),
        }
    }

    /// Offer `next` to this command; groups forward to their last child.
    pub fn coalesce(&mut self, next: &Command<C>) -> bool {
        match self {
            Self::Leaf(action) => action.coalesce(next),
            Self::Group(group) => group.coalesce(next),
        }
    }

    /// The concrete leaf action, if this is a leaf of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Leaf(action) => action.as_any().downcast_ref::<T>(),
            Self::Group(_) => None,
        }
    }

    #[must_use]
    pub fn as_group(&self) -> Option<&GroupCommand<C>> {
        match self {
            Self::Group(group) => Some(group),
            Self::Leaf(_) => None,
        }
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

/// A named, ordered batch of commands undone and redone as one step.
pub struct GroupCommand<C> {
    name: String,
    commands: Vec<Command<C>>,
}

impl<C> fmt::Debug for GroupCommand<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupCommand")
            .field("name", &self.name)
            .field("commands", &self.commands)
            .finish()
    }
}

impl<C> GroupCommand<C> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Children in run order.
    #[must_use]
    pub fn commands(&self) -> &[Command<C>] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Add a child without attempting to coalesce it.
    pub fn push(&mut self, command: Command<C>) {
        self.commands.push(command);
    }

    /// Add a child that already ran, first offering it to the last child.
    ///
    /// Returns true when the last child absorbed it.
    pub fn append(&mut self, command: Command<C>) -> bool {
        if let Some(last) = self.commands.last_mut() {
            if last.coalesce(&command) {
                return true;
            }
        }
        self.commands.push(command);
        false
    }

    /// Consume a one-child group into its child.
    pub(crate) fn into_single(mut self) -> Result<Command<C>, Self> {
        if self.commands.len() == 1 {
            if let Some(command) = self.commands.pop() {
                return Ok(command);
            }
        }
        Err(self)
    }

    pub fn run(&mut self, context: &mut C) -> bool {
        for command in &mut self.commands {
            if !command.run(context) {
                tracing::debug!(group = %self.name, command = %command.name(), "group child run failed");
                return false;
            }
        }
        true
    }

    pub fn undo(&mut self, context: &mut C) -> bool {
        for command in self.commands.iter_mut().rev() {
            if !command.undo(context) {
                tracing::debug!(group = %self.name, command = %command.name(), "group child undo failed");
                return false;
            }
        }
        true
    }

    pub fn coalesce(&mut self, next: &Command<C>) -> bool {
        self.commands
            .last_mut()
            .is_some_and(|last| last.coalesce(next))
    }
}

// ============================================================================
// Closure-backed commands
// ============================================================================

type StepFn<C> = Box<dyn FnMut(&mut C) -> bool>;
type CoalesceFn<C> = Box<dyn FnMut(&Command<C>) -> bool>;

/// An action whose behaviour is supplied as closures.
pub struct BlockCommand<C> {
    name: String,
    run: StepFn<C>,
    undo: StepFn<C>,
    coalesce: Option<CoalesceFn<C>>,
}

impl<C> fmt::Debug for BlockCommand<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockCommand")
            .field("name", &self.name)
            .field("has_coalesce", &self.coalesce.is_some())
            .finish()
    }
}

impl<C> BlockCommand<C> {
    pub fn new<R, U>(name: impl Into<String>, run: R, undo: U) -> Self
    where
        R: FnMut(&mut C) -> bool + 'static,
        U: FnMut(&mut C) -> bool + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(run),
            undo: Box::new(undo),
            coalesce: None,
        }
    }

    /// Set the coalesce callback.
    #[must_use]
    pub fn with_coalesce<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Command<C>) -> bool + 'static,
    {
        self.coalesce = Some(Box::new(f));
        self
    }
}

impl<C: 'static> Action<C> for BlockCommand<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, context: &mut C) -> bool {
        (self.run)(context)
    }

    fn undo(&mut self, context: &mut C) -> bool {
        (self.undo)(context)
    }

    fn coalesce(&mut self, next: &Command<C>) -> bool {
        match self.coalesce.as_mut() {
            Some(coalesce) => coalesce(next),
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
