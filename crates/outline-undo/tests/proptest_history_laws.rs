#![forbid(unsafe_code)]

//! Property tests for [`CommandManager`] history laws.
//!
//! Validates:
//! - run → undo → redo restores the exact post-run state.
//! - Undoing everything restores the initial state; redoing everything
//!   restores the final state.
//! - Coalesced commands occupy one entry and undo atomically.
//! - The undone stack never survives a fresh command.
//! - The done stack never exceeds `max_depth`.

use std::any::Any;

use proptest::prelude::*;

use outline_undo::{Action, Command, CommandManager, HistoryConfig};

// ============================================================================
// Test context: a small vector of integers
// ============================================================================

#[derive(Debug, Clone)]
enum Edit {
    /// Push a value; consecutive pushes coalesce.
    Push(i32),
    /// Overwrite a slot; fails when the slot does not exist.
    Set(usize, i32),
    /// Remove the last element; fails on empty.
    Pop,
}

struct EditAction {
    edit: Edit,
    pushed: Vec<i32>,
    previous: Option<i32>,
}

impl EditAction {
    fn new(edit: Edit) -> Self {
        Self {
            edit,
            pushed: Vec::new(),
            previous: None,
        }
    }
}

impl Action<Vec<i32>> for EditAction {
    fn name(&self) -> &str {
        match self.edit {
            Edit::Push(_) => "Push",
            Edit::Set(..) => "Set",
            Edit::Pop => "Pop",
        }
    }

    fn run(&mut self, ctx: &mut Vec<i32>) -> bool {
        match self.edit {
            Edit::Push(v) => {
                if self.pushed.is_empty() {
                    self.pushed.push(v);
                }
                ctx.extend_from_slice(&self.pushed);
                true
            }
            Edit::Set(i, v) => match ctx.get_mut(i) {
                Some(slot) => {
                    self.previous = Some(*slot);
                    *slot = v;
                    true
                }
                None => false,
            },
            Edit::Pop => {
                self.previous = ctx.pop();
                self.previous.is_some()
            }
        }
    }

    fn undo(&mut self, ctx: &mut Vec<i32>) -> bool {
        match self.edit {
            Edit::Push(_) => {
                let keep = ctx.len().saturating_sub(self.pushed.len());
                ctx.truncate(keep);
                true
            }
            Edit::Set(i, _) => match (ctx.get_mut(i), self.previous) {
                (Some(slot), Some(previous)) => {
                    *slot = previous;
                    true
                }
                _ => false,
            },
            Edit::Pop => match self.previous {
                Some(v) => {
                    ctx.push(v);
                    true
                }
                None => false,
            },
        }
    }

    fn coalesce(&mut self, next: &Command<Vec<i32>>) -> bool {
        if !matches!(self.edit, Edit::Push(_)) {
            return false;
        }
        match next.downcast_ref::<EditAction>() {
            Some(other) if matches!(other.edit, Edit::Push(_)) => {
                self.pushed.extend_from_slice(&other.pushed);
                true
            }
            _ => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => (-50i32..50).prop_map(Edit::Push),
        2 => (0usize..8, -50i32..50).prop_map(|(i, v)| Edit::Set(i, v)),
        1 => Just(Edit::Pop),
    ]
}

fn command(edit: Edit) -> Command<Vec<i32>> {
    Command::leaf(EditAction::new(edit))
}

// ============================================================================
// Invariant 1: replay law
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn run_undo_redo_restores_post_run_state(
        prefix in prop::collection::vec(edit_strategy(), 0..10),
        edit in edit_strategy(),
    ) {
        let mut history = CommandManager::new(HistoryConfig::unlimited().with_coalesce(false));
        let mut ctx = Vec::new();
        for e in prefix {
            history.run(command(e), &mut ctx);
        }
        let before = ctx.clone();
        if history.run(command(edit), &mut ctx) {
            let after_run = ctx.clone();
            prop_assert!(history.undo(&mut ctx));
            prop_assert_eq!(&ctx, &before);
            prop_assert!(history.redo(&mut ctx));
            prop_assert_eq!(&ctx, &after_run);
        } else {
            prop_assert_eq!(&ctx, &before, "failed run must not mutate");
        }
    }
}

// ============================================================================
// Invariant 2: full undo/redo sweep
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn full_sweep_restores_endpoints(
        edits in prop::collection::vec(edit_strategy(), 0..30),
        coalesce in any::<bool>(),
    ) {
        let mut history = CommandManager::new(HistoryConfig::unlimited().with_coalesce(coalesce));
        let mut ctx = Vec::new();
        for e in edits {
            history.run(command(e), &mut ctx);
        }
        let end = ctx.clone();
        let depth = history.done_len();

        while history.can_undo() {
            prop_assert!(history.undo(&mut ctx));
        }
        prop_assert!(ctx.is_empty());
        prop_assert_eq!(history.undone_len(), depth);

        while history.can_redo() {
            prop_assert!(history.redo(&mut ctx));
        }
        prop_assert_eq!(ctx, end);
    }
}

// ============================================================================
// Invariant 3: coalesced pushes are one atomic step
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn consecutive_pushes_coalesce_into_one_entry(values in prop::collection::vec(-50i32..50, 1..20)) {
        let mut history = CommandManager::new(HistoryConfig::unlimited());
        let mut ctx = vec![99];
        for v in &values {
            prop_assert!(history.run(command(Edit::Push(*v)), &mut ctx));
        }
        prop_assert_eq!(history.done_len(), 1);
        prop_assert_eq!(ctx.len(), values.len() + 1);
        prop_assert!(history.undo(&mut ctx));
        prop_assert_eq!(ctx, vec![99]);
    }
}

// ============================================================================
// Invariant 4: divergence clears the undone stack
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn fresh_command_abandons_redo(
        edits in prop::collection::vec(edit_strategy(), 1..12),
        undo_count in 1usize..6,
        value in -50i32..50,
    ) {
        let mut history = CommandManager::new(HistoryConfig::unlimited().with_coalesce(false));
        let mut ctx = Vec::new();
        for e in edits {
            history.run(command(e), &mut ctx);
        }
        for _ in 0..undo_count {
            history.undo(&mut ctx);
        }
        prop_assert!(history.run(command(Edit::Push(value)), &mut ctx));
        prop_assert_eq!(history.undone_len(), 0);
        prop_assert!(!history.redo(&mut ctx));
    }
}

// ============================================================================
// Invariant 5: depth limit
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn done_stack_respects_max_depth(
        edits in prop::collection::vec(edit_strategy(), 0..40),
        max_depth in 1usize..10,
    ) {
        let mut history = CommandManager::new(HistoryConfig::new(max_depth).with_coalesce(false));
        let mut ctx = Vec::new();
        for e in edits {
            history.run(command(e), &mut ctx);
            prop_assert!(history.done_len() <= max_depth);
        }
    }
}
