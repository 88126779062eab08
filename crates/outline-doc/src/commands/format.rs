#![forbid(unsafe_code)]

use std::any::Any;
use std::ops::Range;

use outline_text::{Attribute, AttributeSet, AttributedText};
use outline_undo::Action;

use super::editable_text;
use crate::id::ElementId;
use crate::state::EditState;

/// How [`FormatText`] changes the attributes of its range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOp {
    /// Replace the attribute set.
    Set(AttributeSet),
    /// Union with the existing attributes.
    Add(AttributeSet),
    /// Remove attributes of the same kinds.
    Remove(AttributeSet),
    /// Add unless the whole range already has it, else remove.
    Toggle(Attribute),
}

impl FormatOp {
    fn apply(&self, text: &mut AttributedText, range: Range<usize>) {
        match self {
            Self::Set(attributes) => text.set_attributes(attributes, range),
            Self::Add(attributes) => text.add_attributes(attributes, range),
            Self::Remove(attributes) => text.remove_attributes(attributes, range),
            Self::Toggle(attribute) => {
                text.toggle_attribute(attribute, range);
            }
        }
    }
}

/// Change the formatting of a text range.
///
/// Fails when the range is empty, out of bounds, or the formatting would
/// not change.
#[derive(Debug, Clone)]
pub struct FormatText {
    element: ElementId,
    range: Range<usize>,
    op: FormatOp,
    before: AttributedText,
}

impl FormatText {
    #[must_use]
    pub fn new(element: ElementId, range: Range<usize>, op: FormatOp) -> Self {
        Self {
            element,
            range,
            op,
            before: AttributedText::default(),
        }
    }
}

impl Action<EditState> for FormatText {
    fn name(&self) -> &str {
        "Format Text"
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
        let before = text.extract(self.range.clone());
        self.op.apply(text, self.range.clone());
        if text.extract(self.range.clone()) == before {
            return false;
        }
        self.before = before;
        true
    }

    fn undo(&mut self, state: &mut EditState) -> bool {
        editable_text(state, self.element)
            .is_some_and(|text| text.replace_subrange(self.range.clone(), &self.before))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
