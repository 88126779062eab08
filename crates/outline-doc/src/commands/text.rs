#![forbid(unsafe_code)]

use std::any::Any;
use std::ops::Range;

use outline_text::AttributedText;
use outline_undo::{Action, Command};

use super::editable_text;
use crate::id::ElementId;
use crate::state::{EditState, Focus};

fn ends_word(text: &AttributedText) -> bool {
    text.to_string()
        .chars()
        .next_back()
        .is_some_and(char::is_whitespace)
}

/// Insert attributed text into an element and move the caret after it.
///
/// Consecutive insertions coalesce while they are contiguous and the text
/// typed so far does not end in whitespace, so undo removes one word at a
/// time.
#[derive(Debug, Clone)]
pub struct InsertText {
    element: ElementId,
    position: usize,
    text: AttributedText,
}

impl InsertText {
    #[must_use]
    pub fn new(element: ElementId, position: usize, text: impl Into<AttributedText>) -> Self {
        Self {
            element,
            position,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &AttributedText {
        &self.text
    }
}

impl Action<EditState> for InsertText {
    fn name(&self) -> &str {
        "Insert Text"
    }

    fn run(&mut self, state: &mut EditState) -> bool {
        if self.text.is_empty() {
            return false;
        }
        let Some(text) = editable_text(state, self.element) else {
            return false;
        };
        if self.position > text.len() {
            return false;
        }
        text.insert_text(self.position, &self.text);
        state.place_cursor(self.element, self.position + self.text.len());
        true
    }

    fn undo(&mut self, state: &mut EditState) -> bool {
        let Some(text) = editable_text(state, self.element) else {
            return false;
        };
        if !text.delete_subrange(self.position..self.position + self.text.len()) {
            return false;
        }
        state.place_cursor(self.element, self.position);
        true
    }

    fn coalesce(&mut self, next: &Command<EditState>) -> bool {
        let Some(next) = next.downcast_ref::<Self>() else {
            return false;
        };
        if next.element != self.element
            || next.position != self.position + self.text.len()
            || ends_word(&self.text)
        {
            return false;
        }
        self.text.append_text(&next.text);
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Which side of the caret a deletion removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDirection {
    /// Backspace: the caret ends at the start of the range.
    Backward,
    /// Delete: the caret stays put.
    Forward,
}

/// Delete a range of an element's text.
///
/// Single-character deletions in the same direction coalesce into one
/// step, matching a held backspace or delete key.
#[derive(Debug, Clone)]
pub struct DeleteText {
    element: ElementId,
    range: Range<usize>,
    direction: DeleteDirection,
    keystroke: bool,
    removed: AttributedText,
}

impl DeleteText {
    #[must_use]
    pub fn new(element: ElementId, range: Range<usize>, direction: DeleteDirection) -> Self {
        Self {
            element,
            keystroke: range.len() == 1,
            range,
            direction,
            removed: AttributedText::default(),
        }
    }

    #[must_use]
    pub fn backward(element: ElementId, range: Range<usize>) -> Self {
        Self::new(element, range, DeleteDirection::Backward)
    }

    #[must_use]
    pub fn forward(element: ElementId, range: Range<usize>) -> Self {
        Self::new(element, range, DeleteDirection::Forward)
    }

    /// The deleted text, once run.
    #[must_use]
    pub fn removed(&self) -> &AttributedText {
        &self.removed
    }
}

impl Action<EditState> for DeleteText {
    fn name(&self) -> &str {
        "Delete Text"
    }

    fn run(&mut self, state: &mut EditState) -> bool {
        if self.range.is_empty() {
            return false;
        }
        let Some(text) = editable_text(state, self.element) else {
            return false;
        };
        if self.range.end > text.len() {
            return false;
        }
        self.removed = text.extract(self.range.clone());
        text.delete_subrange(self.range.clone());
        state.place_cursor(self.element, self.range.start);
        true
    }

    fn undo(&mut self, state: &mut EditState) -> bool {
        let Some(text) = editable_text(state, self.element) else {
            return false;
        };
        if self.range.start > text.len() {
            return false;
        }
        text.insert_text(self.range.start, &self.removed);
        let cursor = match self.direction {
            DeleteDirection::Backward => self.range.end,
            DeleteDirection::Forward => self.range.start,
        };
        state.place_cursor(self.element, cursor);
        true
    }

    fn coalesce(&mut self, next: &Command<EditState>) -> bool {
        let Some(next) = next.downcast_ref::<Self>() else {
            return false;
        };
        if next.element != self.element
            || next.direction != self.direction
            || !self.keystroke
            || !next.keystroke
        {
            return false;
        }
        match self.direction {
            DeleteDirection::Backward if next.range.end == self.range.start => {
                let mut removed = next.removed.clone();
                removed.append_text(&self.removed);
                self.removed = removed;
                self.range.start = next.range.start;
                true
            }
            DeleteDirection::Forward if next.range.start == self.range.start => {
                self.removed.append_text(&next.removed);
                self.range.end += next.range.len();
                true
            }
            _ => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Replace a range of an element's text, selecting the original range on undo.
#[derive(Debug, Clone)]
pub struct ReplaceText {
    element: ElementId,
    range: Range<usize>,
    text: AttributedText,
    replaced: AttributedText,
}

impl ReplaceText {
    #[must_use]
    pub fn new(element: ElementId, range: Range<usize>, text: impl Into<AttributedText>) -> Self {
        Self {
            element,
            range,
            text: text.into(),
            replaced: AttributedText::default(),
        }
    }
}

impl Action<EditState> for ReplaceText {
    fn name(&self) -> &str {
        "Replace Text"
    }

    fn run(&mut self, state: &mut EditState) -> bool {
        let Some(text) = editable_text(state, self.element) else {
            return false;
        };
        if self.range.end > text.len() || self.range.start > self.range.end {
            return false;
        }
        self.replaced = text.extract(self.range.clone());
        text.replace_subrange(self.range.clone(), &self.text);
        state.place_cursor(self.element, self.range.start + self.text.len());
        true
    }

    fn undo(&mut self, state: &mut EditState) -> bool {
        let Some(text) = editable_text(state, self.element) else {
            return false;
        };
        let inserted = self.range.start..self.range.start + self.text.len();
        if !text.replace_subrange(inserted, &self.replaced) {
            return false;
        }
        state.focus =
            Some(Focus::at(self.element, self.range.end).with_selection(self.range.clone()));
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
