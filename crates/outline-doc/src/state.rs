#![forbid(unsafe_code)]

use std::ops::Range;

use crate::document::Document;
use crate::id::ElementId;

/// Caret position and optional selection inside one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focus {
    pub element: ElementId,
    /// Character offset of the caret.
    pub cursor: usize,
    pub selection: Option<Range<usize>>,
}

impl Focus {
    #[must_use]
    pub fn at(element: ElementId, cursor: usize) -> Self {
        Self {
            element,
            cursor,
            selection: None,
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: Range<usize>) -> Self {
        self.selection = Some(selection);
        self
    }

    /// The selection if it is non-empty.
    #[must_use]
    pub fn selected_range(&self) -> Option<Range<usize>> {
        self.selection.clone().filter(|r| !r.is_empty())
    }
}

/// The context every structural command runs against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditState {
    pub document: Document,
    pub focus: Option<Focus>,
}

impl EditState {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            focus: None,
        }
    }

    /// Move the caret, dropping any selection.
    pub(crate) fn place_cursor(&mut self, element: ElementId, cursor: usize) {
        self.focus = Some(Focus::at(element, cursor));
    }
}
