#![forbid(unsafe_code)]

//! Editing operations that compose structural commands.
//!
//! Every mutation goes through the editor's [`CommandManager`]. Operations
//! that touch more than one element run inside a named group so they undo
//! as one step. Moving the caret with [`Editor::focus_on`] or
//! [`Editor::select`] is not recorded; focus changes that are part of an
//! edit are recorded with the edit.

use std::ops::Range;

use outline_text::{Attribute, AttributeSet, AttributedText};
use outline_undo::{Action, CommandManager};

use crate::commands::{
    ChangeKind, DeleteElement, DeleteText, EditCommand, FocusElement, FormatOp, FormatText,
    InsertElement, InsertText, ReparentElement, ReplaceText, SetOpen,
};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::element::ElementTree;
use crate::id::ElementId;
use crate::kind::ElementKind;
use crate::link::LinkResolver;
use crate::state::{EditState, Focus};

/// A document, its focus, and its undo history.
#[derive(Debug)]
pub struct Editor {
    state: EditState,
    history: CommandManager<EditState>,
    config: EditorConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// An editor over an empty document.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self::with_document(Document::new(), config)
    }

    #[must_use]
    pub fn with_document(document: Document, config: EditorConfig) -> Self {
        Self {
            state: EditState::new(document),
            history: CommandManager::new(config.history.clone()),
            config,
        }
    }

    #[must_use]
    pub fn state(&self) -> &EditState {
        &self.state
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.state.document
    }

    #[must_use]
    pub fn focus(&self) -> Option<&Focus> {
        self.state.focus.as_ref()
    }

    #[must_use]
    pub fn history(&self) -> &CommandManager<EditState> {
        &self.history
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ========================================================================
    // Running commands
    // ========================================================================

    /// Run a command through the history.
    pub fn run(&mut self, command: EditCommand) -> bool {
        self.history.run(command, &mut self.state)
    }

    pub fn run_action(&mut self, action: impl Action<EditState> + 'static) -> bool {
        self.history.run_action(action, &mut self.state)
    }

    /// Run `f` inside a named group.
    fn grouped(&mut self, name: &str, f: impl FnOnce(&mut Self) -> bool) -> bool {
        self.history.begin_group(name);
        let ok = f(self);
        self.history.end_group();
        ok
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.state)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.state)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ========================================================================
    // Focus
    // ========================================================================

    fn text_len(&self, id: ElementId) -> usize {
        self.document().get(id).map_or(0, |e| e.text_len())
    }

    fn carries_text(&self, id: ElementId) -> bool {
        self.document()
            .get(id)
            .is_some_and(|e| e.kind().carries_text())
    }

    /// Place the caret in `element`, clamped to its text. Not recorded.
    pub fn focus_on(&mut self, element: ElementId, cursor: usize) -> bool {
        if !self.document().contains(element) || element == self.document().root() {
            return false;
        }
        let cursor = cursor.min(self.text_len(element));
        self.state.focus = Some(Focus::at(element, cursor));
        true
    }

    /// Select `range` of `element`, caret at its end. Not recorded.
    pub fn select(&mut self, element: ElementId, range: Range<usize>) -> bool {
        if range.end > self.text_len(element) || range.start > range.end {
            return false;
        }
        if !self.focus_on(element, range.end) {
            return false;
        }
        self.state.focus = Some(Focus::at(element, range.end).with_selection(range));
        true
    }

    /// The focus if its element still exists, with caret and selection
    /// clamped to the element's text.
    fn live_focus(&self) -> Option<Focus> {
        let focus = self.focus()?;
        let len = self.document().get(focus.element)?.text_len();
        Some(Focus {
            element: focus.element,
            cursor: focus.cursor.min(len),
            selection: focus.selection.clone().filter(|r| r.end <= len),
        })
    }

    /// Attributes for text typed at `cursor`: those of the preceding
    /// character, without links.
    fn typing_attributes(&self, element: ElementId, cursor: usize) -> AttributeSet {
        if cursor == 0 {
            return AttributeSet::new();
        }
        self.document()
            .get(element)
            .map(|e| e.text().attributes_at(cursor - 1))
            .unwrap_or_default()
            .into_iter()
            .filter(|a| !a.is_link())
            .collect()
    }

    // ========================================================================
    // Text editing
    // ========================================================================

    /// Type `s` at the caret, replacing any selection.
    pub fn insert_text(&mut self, s: &str) -> bool {
        if s.is_empty() {
            return false;
        }
        let Some(focus) = self.live_focus() else {
            return self.insert_into_empty_document(s);
        };
        if focus.selected_range().is_some() {
            return self.replace_selection(s);
        }
        let attributes = self.typing_attributes(focus.element, focus.cursor);
        self.run_action(InsertText::new(
            focus.element,
            focus.cursor,
            AttributedText::new(s, attributes),
        ))
    }

    fn insert_into_empty_document(&mut self, s: &str) -> bool {
        if !self.config.create_node_in_empty_parent || !self.document().is_empty() {
            return false;
        }
        let root = self.document().root();
        let tree = ElementTree::default();
        let id = tree.id;
        let s = s.to_owned();
        self.grouped("Insert Text", move |ed| {
            ed.run_action(InsertElement::new(root, 0, tree))
                && ed.run_action(InsertText::new(id, 0, s))
        })
    }

    /// Replace the selection with `s`, keeping the selection's leading attributes.
    pub fn replace_selection(&mut self, s: &str) -> bool {
        let Some((element, range)) = self.selection() else {
            return false;
        };
        let attributes = self
            .document()
            .get(element)
            .map(|e| e.text().attributes_at(range.start))
            .unwrap_or_default();
        self.run_action(ReplaceText::new(
            element,
            range,
            AttributedText::new(s, attributes),
        ))
    }

    fn selection(&self) -> Option<(ElementId, Range<usize>)> {
        let focus = self.live_focus()?;
        Some((focus.element, focus.selected_range()?))
    }

    /// Backspace: delete the selection, the character before the caret, or
    /// merge the element into the previous visible one.
    pub fn delete_backward(&mut self) -> bool {
        if let Some((element, range)) = self.selection() {
            return self.run_action(DeleteText::backward(element, range));
        }
        let Some(focus) = self.live_focus() else {
            return false;
        };
        if focus.cursor > 0 {
            let range = focus.cursor - 1..focus.cursor;
            return self.run_action(DeleteText::backward(focus.element, range));
        }
        match self.document().previous_visible(focus.element) {
            Some(previous) => self.merge(previous, focus.element),
            None => false,
        }
    }

    /// Delete: delete the selection, the character after the caret, or
    /// merge the next visible element into this one.
    pub fn delete_forward(&mut self) -> bool {
        if let Some((element, range)) = self.selection() {
            return self.run_action(DeleteText::forward(element, range));
        }
        let Some(focus) = self.live_focus() else {
            return false;
        };
        if focus.cursor < self.text_len(focus.element) {
            let range = focus.cursor..focus.cursor + 1;
            return self.run_action(DeleteText::forward(focus.element, range));
        }
        match self.document().next_visible(focus.element) {
            Some(next) => self.merge(focus.element, next),
            None => false,
        }
    }

    /// Append `source`'s text to `target`, move its children under
    /// `target`, and delete it. A non-text `target` is deleted instead.
    fn merge(&mut self, target: ElementId, source: ElementId) -> bool {
        let doc = self.document();
        if !self.carries_text(target) {
            if doc.is_ancestor(target, source) {
                return false;
            }
            return self.grouped("Delete", |ed| {
                ed.run_action(DeleteElement::new(target))
            });
        }

        let target_len = self.text_len(target);
        let text = match doc.get(source) {
            Some(e) if e.kind().carries_text() => e.text().clone(),
            Some(_) => AttributedText::default(),
            None => return false,
        };
        let children = doc.children(source).to_vec();
        let base = if doc.parent(source) == Some(target) {
            doc.index_in_parent(source).map_or(0, |i| i + 1)
        } else {
            doc.children(target).len()
        };

        self.grouped("Delete", move |ed| {
            (text.is_empty() || ed.run_action(InsertText::new(target, target_len, text)))
                && children
                    .iter()
                    .enumerate()
                    .all(|(i, child)| ed.run_action(ReparentElement::new(*child, target, base + i)))
                && ed.run_action(DeleteElement::new(source))
                && ed.run_action(FocusElement::new(Some(Focus::at(target, target_len))))
        })
    }

    /// Apply `op` to the selection.
    pub fn format_selection(&mut self, op: FormatOp) -> bool {
        let Some((element, range)) = self.selection() else {
            return false;
        };
        self.run_action(FormatText::new(element, range, op))
    }

    /// Link the selection to the note titled `title`.
    pub fn link_selection(&mut self, title: &str, resolver: &dyn LinkResolver) -> bool {
        let Some(note) = resolver.resolve(title) else {
            tracing::debug!(title, "link target not found");
            return false;
        };
        let mut link = AttributeSet::new();
        link.insert(Attribute::InternalLink(note));
        self.format_selection(FormatOp::Add(link))
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Where a new element following the focus goes: first child of an open
    /// element with children, else next sibling.
    fn insertion_point(&self) -> (ElementId, usize) {
        let doc = self.document();
        let Some(focus) = self.live_focus() else {
            return (doc.root(), doc.children(doc.root()).len());
        };
        let element = focus.element;
        let open_with_children = doc
            .get(element)
            .is_some_and(|e| e.is_open() && !e.children().is_empty());
        if open_with_children {
            return (element, 0);
        }
        match (doc.parent(element), doc.index_in_parent(element)) {
            (Some(parent), Some(index)) => (parent, index + 1),
            _ => (doc.root(), doc.children(doc.root()).len()),
        }
    }

    /// Insert a new element after the focus and focus its end.
    pub fn insert_element_after(&mut self, text: impl Into<AttributedText>) -> Option<ElementId> {
        let (parent, index) = self.insertion_point();
        let tree = ElementTree::new(text);
        let id = tree.id;
        let len = tree.text.len();
        let ok = self.grouped("Insert Element", move |ed| {
            ed.run_action(InsertElement::new(parent, index, tree))
                && ed.run_action(FocusElement::new(Some(Focus::at(id, len))))
        });
        ok.then_some(id)
    }

    /// Split the focused element at the caret; the text after the caret
    /// moves to a new element, which takes the focus.
    pub fn split_at_cursor(&mut self) -> Option<ElementId> {
        let focus = self.live_focus()?;
        if !self.carries_text(focus.element) {
            return None;
        }
        let len = self.text_len(focus.element);
        let cursor = focus.cursor.min(len);
        let tail = self.document().get(focus.element)?.text().suffix(len - cursor);
        let (parent, index) = self.insertion_point();
        let tree = ElementTree::new(tail);
        let id = tree.id;
        let element = focus.element;
        let ok = self.grouped("Split Element", move |ed| {
            (cursor == len || ed.run_action(DeleteText::forward(element, cursor..len)))
                && ed.run_action(InsertElement::new(parent, index, tree))
                && ed.run_action(FocusElement::new(Some(Focus::at(id, 0))))
        });
        ok.then_some(id)
    }

    /// Delete elements and their subtrees, focusing what precedes them.
    pub fn delete_elements(&mut self, ids: &[ElementId]) -> bool {
        let doc = self.document();
        let root = doc.root();
        let targets: Vec<ElementId> = doc
            .flat_ids()
            .into_iter()
            .filter(|id| ids.contains(id))
            .filter(|id| !ids.iter().any(|other| doc.is_ancestor(*other, *id)))
            .collect();
        let Some(&first) = targets.first() else {
            return false;
        };
        let mut focus_target = doc.previous_visible(first);
        while let Some(candidate) = focus_target {
            let deleted = targets
                .iter()
                .any(|t| *t == candidate || doc.is_ancestor(*t, candidate));
            if !deleted || candidate == root {
                break;
            }
            focus_target = doc.previous_visible(candidate);
        }
        let focus = focus_target.map(|id| Focus::at(id, self.text_len(id)));

        self.grouped("Delete Elements", move |ed| {
            targets
                .iter()
                .all(|id| ed.run_action(DeleteElement::new(*id)))
                && ed.run_action(FocusElement::new(focus))
        })
    }

    /// Whether `id` can become the last child of its previous sibling.
    #[must_use]
    pub fn can_increase_indentation(&self, id: ElementId) -> bool {
        let doc = self.document();
        let Some(depth) = doc.depth(id) else {
            return false;
        };
        doc.previous_sibling(id).is_some()
            && depth + doc.subtree_height(id) < self.config.max_indent_depth
    }

    /// Make `id` the last child of its previous sibling.
    pub fn increase_indentation(&mut self, id: ElementId) -> bool {
        if !self.can_increase_indentation(id) {
            return false;
        }
        let doc = self.document();
        let Some(new_parent) = doc.previous_sibling(id) else {
            return false;
        };
        let index = doc.children(new_parent).len();
        let collapsed = doc.get(new_parent).is_some_and(|e| !e.is_open());
        self.grouped("Increase Indentation", move |ed| {
            (!collapsed || ed.run_action(SetOpen::new(new_parent, true)))
                && ed.run_action(ReparentElement::new(id, new_parent, index))
        })
    }

    /// Move `id` after its parent; its following siblings become its children.
    pub fn decrease_indentation(&mut self, id: ElementId) -> bool {
        let doc = self.document();
        let Some(parent) = doc.parent(id) else {
            return false;
        };
        let (Some(grandparent), Some(parent_index), Some(index)) = (
            doc.parent(parent),
            doc.index_in_parent(parent),
            doc.index_in_parent(id),
        ) else {
            return false;
        };
        let following = doc.children(parent)[index + 1..].to_vec();
        let base = doc.children(id).len();
        self.grouped("Decrease Indentation", move |ed| {
            following
                .iter()
                .enumerate()
                .all(|(i, sibling)| ed.run_action(ReparentElement::new(*sibling, id, base + i)))
                && ed.run_action(ReparentElement::new(id, grandparent, parent_index + 1))
        })
    }

    pub fn change_kind(&mut self, id: ElementId, kind: ElementKind) -> bool {
        self.run_action(ChangeKind::new(id, kind))
    }

    pub fn set_open(&mut self, id: ElementId, open: bool) -> bool {
        self.run_action(SetOpen::new(id, open))
    }
}
