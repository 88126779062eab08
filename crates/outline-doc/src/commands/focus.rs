#![forbid(unsafe_code)]

use std::any::Any;

use outline_undo::{Action, Command};

use crate::state::{EditState, Focus};

/// Move focus. Never fails; consecutive focus moves coalesce.
#[derive(Debug, Clone)]
pub struct FocusElement {
    focus: Option<Focus>,
    previous: Option<Focus>,
}

impl FocusElement {
    #[must_use]
    pub fn new(focus: Option<Focus>) -> Self {
        Self {
            focus,
            previous: None,
        }
    }
}

impl Action<EditState> for FocusElement {
    fn name(&self) -> &str {
        "Focus"
    }

    fn run(&mut self, state: &mut EditState) -> bool {
        self.previous = std::mem::replace(&mut state.focus, self.focus.clone());
        true
    }

    fn undo(&mut self, state: &mut EditState) -> bool {
        state.focus = self.previous.clone();
        true
    }

    fn coalesce(&mut self, next: &Command<EditState>) -> bool {
        match next.downcast_ref::<Self>() {
            Some(next) => {
                self.focus = next.focus.clone();
                true
            }
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
