#![forbid(unsafe_code)]

use std::any::Any;

use outline_undo::Action;

use crate::element::ElementTree;
use crate::id::ElementId;
use crate::kind::ElementKind;
use crate::state::EditState;

/// Insert a subtree under `parent` at `index`.
#[derive(Debug, Clone)]
pub struct InsertElement {
    parent: ElementId,
    index: usize,
    tree: ElementTree,
}

impl InsertElement {
    #[must_use]
    pub fn new(parent: ElementId, index: usize, tree: ElementTree) -> Self {
        Self {
            parent,
            index,
            tree,
        }
    }

    /// Id of the inserted subtree's root.
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.tree.id
    }
}

impl Action<EditState> for InsertElement {
    fn name(&self) -> &str {
        "Insert Element"
    }

    fn run(&mut self, state: &mut EditState) -> bool {
        match state
            .document
            .insert(self.parent, self.tree.clone(), self.index)
        {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(error = %err, "insert element rejected");
                false
            }
        }
    }

    fn undo(&mut self, state: &mut EditState) -> bool {
        // Redo reinserts the subtree as it was when undone.
        match state.document.remove_child(self.parent, self.tree.id) {
            Some(tree) => {
                self.tree = tree;
                true
            }
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
struct Detached {
    parent: ElementId,
    index: usize,
    tree: ElementTree,
}

/// Detach an element and its descendants.
#[derive(Debug, Clone)]
pub struct DeleteElement {
    id: ElementId,
    detached: Option<Detached>,
}

impl DeleteElement {
    #[must_use]
    pub fn new(id: ElementId) -> Self {
        Self { id, detached: None }
    }
}

impl Action<EditState> for DeleteElement {
    fn name(&self) -> &str {
        "Delete Element"
    }

    fn run(&mut self, state: &mut EditState) -> bool {
        let doc = &mut state.document;
        let (Some(parent), Some(index)) = (doc.parent(self.id), doc.index_in_parent(self.id)) else {
            return false;
        };
        let Some(tree) = doc.remove_child(parent, self.id) else {
            return false;
        };
        self.detached = Some(Detached {
            parent,
            index,
            tree,
        });
        true
    }

    fn undo(&mut self, state: &mut EditState) -> bool {
        let Some(detached) = self.detached.as_ref() else {
            return false;
        };
        state
            .document
            .insert(detached.parent, detached.tree.clone(), detached.index)
            .is_ok()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Move an element under `parent` at `index`.
#[derive(Debug, Clone)]
pub struct ReparentElement {
    id: ElementId,
    parent: ElementId,
    index: usize,
    origin: Option<(ElementId, usize)>,
}

impl ReparentElement {
    #[must_use]
    pub fn new(id: ElementId, parent: ElementId, index: usize) -> Self {
        Self {
            id,
            parent,
            index,
            origin: None,
        }
    }
}

impl Action<EditState> for ReparentElement {
    fn name(&self) -> &str {
        "Move Element"
    }

    fn run(&mut self, state: &mut EditState) -> bool {
        let doc = &mut state.document;
        let (Some(old_parent), Some(old_index)) = (doc.parent(self.id), doc.index_in_parent(self.id))
        else {
            return false;
        };
        match doc.reparent(self.id, self.parent, self.index) {
            Ok(()) => {
                self.origin = Some((old_parent, old_index));
                true
            }
            Err(err) => {
                tracing::debug!(error = %err, "reparent rejected");
                false
            }
        }
    }

    fn undo(&mut self, state: &mut EditState) -> bool {
        let Some((parent, index)) = self.origin else {
            return false;
        };
        state.document.reparent(self.id, parent, index).is_ok()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Replace an element's kind.
#[derive(Debug, Clone)]
pub struct ChangeKind {
    id: ElementId,
    kind: ElementKind,
    previous: Option<ElementKind>,
}

impl ChangeKind {
    #[must_use]
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            previous: None,
        }
    }
}

impl Action<EditState> for ChangeKind {
    fn name(&self) -> &str {
        "Change Kind"
    }

    fn run(&mut self, state: &mut EditState) -> bool {
        let unchanged = state
            .document
            .get(self.id)
            .is_none_or(|e| *e.kind() == self.kind);
        if unchanged {
            return false;
        }
        self.previous = state.document.set_kind(self.id, self.kind.clone()).ok();
        self.previous.is_some()
    }

    fn undo(&mut self, state: &mut EditState) -> bool {
        match self.previous.clone() {
            Some(kind) => state.document.set_kind(self.id, kind).is_ok(),
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Expand or collapse an element.
#[derive(Debug, Clone)]
pub struct SetOpen {
    id: ElementId,
    open: bool,
}

impl SetOpen {
    #[must_use]
    pub fn new(id: ElementId, open: bool) -> Self {
        Self { id, open }
    }
}

impl Action<EditState> for SetOpen {
    fn name(&self) -> &str {
        if self.open { "Expand" } else { "Collapse" }
    }

    fn run(&mut self, state: &mut EditState) -> bool {
        match state.document.get(self.id) {
            Some(e) if e.is_open() != self.open => {
                state.document.set_open(self.id, self.open).is_ok()
            }
            _ => false,
        }
    }

    fn undo(&mut self, state: &mut EditState) -> bool {
        state.document.set_open(self.id, !self.open).is_ok()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn state_with(children: Vec<ElementTree>) -> EditState {
        let root = ElementTree::new("").with_children(children);
        EditState::new(Document::from_tree(root).unwrap())
    }

    #[test]
    fn insert_then_undo_restores_document() {
        let mut state = EditState::default();
        let before = state.clone();
        let root = state.document.root();
        let mut cmd = InsertElement::new(root, 0, ElementTree::new("x"));
        assert!(cmd.run(&mut state));
        assert_eq!(state.document.len(), 1);
        assert!(cmd.undo(&mut state));
        assert_eq!(state, before);
    }

    #[test]
    fn insert_at_bad_index_fails() {
        let mut state = EditState::default();
        let root = state.document.root();
        let mut cmd = InsertElement::new(root, 3, ElementTree::new("x"));
        assert!(!cmd.run(&mut state));
        assert!(state.document.is_empty());
    }

    #[test]
    fn delete_restores_original_position() {
        let a = ElementTree::new("a");
        let b = ElementTree::new("b").with_children([ElementTree::new("b1")]);
        let c = ElementTree::new("c");
        let b_id = b.id;
        let mut state = state_with(vec![a, b, c]);
        let before = state.clone();

        let mut cmd = DeleteElement::new(b_id);
        assert!(cmd.run(&mut state));
        assert_eq!(state.document.len(), 2);
        assert!(cmd.undo(&mut state));
        assert_eq!(state, before);
    }

    #[test]
    fn delete_of_root_fails() {
        let mut state = EditState::default();
        let root = state.document.root();
        assert!(!DeleteElement::new(root).run(&mut state));
    }

    #[test]
    fn reparent_and_undo() {
        let a = ElementTree::new("a");
        let b = ElementTree::new("b");
        let (a_id, b_id) = (a.id, b.id);
        let mut state = state_with(vec![a, b]);
        let before = state.clone();

        let mut cmd = ReparentElement::new(b_id, a_id, 0);
        assert!(cmd.run(&mut state));
        assert_eq!(state.document.children(a_id), &[b_id]);
        assert!(cmd.undo(&mut state));
        assert_eq!(state, before);
    }

    #[test]
    fn reparent_into_descendant_fails_without_change() {
        let child = ElementTree::new("child");
        let child_id = child.id;
        let parent = ElementTree::new("parent").with_children([child]);
        let parent_id = parent.id;
        let mut state = state_with(vec![parent]);
        let before = state.clone();

        let mut cmd = ReparentElement::new(parent_id, child_id, 0);
        assert!(!cmd.run(&mut state));
        assert_eq!(state, before);
    }

    #[test]
    fn change_kind_round_trip() {
        let a = ElementTree::new("a");
        let id = a.id;
        let mut state = state_with(vec![a]);
        let mut cmd = ChangeKind::new(id, ElementKind::heading(2));
        assert!(cmd.run(&mut state));
        assert_eq!(state.document.get(id).unwrap().kind(), &ElementKind::heading(2));
        assert!(cmd.undo(&mut state));
        assert!(state.document.get(id).unwrap().kind().is_bullet());
        assert!(!ChangeKind::new(id, ElementKind::Bullet).run(&mut state));
    }

    #[test]
    fn set_open_requires_change() {
        let a = ElementTree::new("a");
        let id = a.id;
        let mut state = state_with(vec![a]);
        assert!(!SetOpen::new(id, true).run(&mut state));
        let mut collapse = SetOpen::new(id, false);
        assert_eq!(collapse.name(), "Collapse");
        assert!(collapse.run(&mut state));
        assert!(!state.document.get(id).unwrap().is_open());
        assert!(collapse.undo(&mut state));
        assert!(state.document.get(id).unwrap().is_open());
    }
}
