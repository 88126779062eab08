#![forbid(unsafe_code)]

//! The outline tree, stored as an arena of elements keyed by id.
//!
//! # Invariants
//!
//! 1. Every element except the root has `parent == Some(p)` where `p`
//!    lists it exactly once in `children`.
//! 2. Ids are unique; every id in a `children` list is in the arena.
//! 3. The tree is acyclic: [`Document::reparent`] rejects moves under the
//!    moved element or its descendants.
//!
//! Rejected mutations return a [`TreeError`] and leave the tree untouched.

use std::collections::{HashMap, HashSet};

use outline_text::AttributedText;

use crate::element::{DocumentElement, ElementTree};
use crate::error::TreeError;
use crate::id::ElementId;
use crate::kind::ElementKind;

/// An outline document: a root element and its descendants.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: ElementId,
    nodes: HashMap<ElementId, DocumentElement>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document with an empty root.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            root: ElementId::new(),
            nodes: HashMap::new(),
        };
        let root = ElementTree::default().with_id(doc.root);
        doc.attach(root, None);
        doc
    }

    /// Build a document whose root is `tree`.
    pub fn from_tree(tree: ElementTree) -> Result<Self, TreeError> {
        let mut seen = HashSet::new();
        for id in tree.ids() {
            if !seen.insert(id) {
                return Err(TreeError::DuplicateId(id));
            }
        }
        let mut doc = Self {
            root: tree.id,
            nodes: HashMap::with_capacity(seen.len()),
        };
        doc.attach(tree, None);
        Ok(doc)
    }

    /// The whole document as an owned tree.
    #[must_use]
    pub fn to_tree(&self) -> ElementTree {
        self.snapshot(self.root).unwrap_or_default()
    }

    #[must_use]
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Number of elements, excluding the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Whether the root has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&DocumentElement> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn element(&self, id: ElementId) -> Result<&DocumentElement, TreeError> {
        self.nodes.get(&id).ok_or(TreeError::UnknownElement(id))
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut DocumentElement, TreeError> {
        self.nodes.get_mut(&id).ok_or(TreeError::UnknownElement(id))
    }

    /// Children of `id`; empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes.get(&id).map_or(&[], |e| e.children.as_slice())
    }

    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(&id).and_then(|e| e.parent)
    }

    // ========================================================================
    // Structure
    // ========================================================================

    fn attach(&mut self, tree: ElementTree, parent: Option<ElementId>) -> ElementId {
        let ElementTree {
            id,
            text,
            open,
            kind,
            children,
        } = tree;
        let children = children
            .into_iter()
            .map(|child| self.attach(child, Some(id)))
            .collect();
        self.nodes.insert(
            id,
            DocumentElement {
                id,
                text,
                kind,
                open,
                parent,
                children,
            },
        );
        id
    }

    fn detach(&mut self, id: ElementId) -> Option<ElementTree> {
        let node = self.nodes.remove(&id)?;
        let children = node
            .children
            .iter()
            .filter_map(|child| self.detach(*child))
            .collect();
        Some(ElementTree {
            id,
            text: node.text,
            open: node.open,
            kind: node.kind,
            children,
        })
    }

    /// Insert `tree` as the child of `parent` at `index`.
    pub fn insert(
        &mut self,
        parent: ElementId,
        tree: ElementTree,
        index: usize,
    ) -> Result<(), TreeError> {
        let len = self.element(parent)?.children.len();
        if index > len {
            return Err(TreeError::IndexOutOfBounds { index, len });
        }
        let mut seen = HashSet::new();
        for id in tree.ids() {
            if self.contains(id) || !seen.insert(id) {
                return Err(TreeError::DuplicateId(id));
            }
        }
        let id = self.attach(tree, Some(parent));
        self.element_mut(parent)?.children.insert(index, id);
        tracing::trace!(element = %id, parent = %parent, index, "inserted");
        Ok(())
    }

    /// Detach `child` from `parent`, returning the removed subtree.
    ///
    /// Returns `None` without changing anything when `child` is not a child
    /// of `parent`.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Option<ElementTree> {
        let siblings = &mut self.nodes.get_mut(&parent)?.children;
        let index = siblings.iter().position(|c| *c == child)?;
        siblings.remove(index);
        tracing::trace!(element = %child, parent = %parent, index, "removed");
        self.detach(child)
    }

    /// Move `child` under `new_parent` at `index`.
    ///
    /// `index` addresses `new_parent`'s children after `child` has been
    /// taken out of its current position.
    pub fn reparent(
        &mut self,
        child: ElementId,
        new_parent: ElementId,
        index: usize,
    ) -> Result<(), TreeError> {
        if child == self.root {
            return Err(TreeError::RootIsImmovable);
        }
        let old_parent = self.element(child)?.parent.ok_or(TreeError::RootIsImmovable)?;
        let mut len = self.element(new_parent)?.children.len();
        if new_parent == child || self.is_ancestor(child, new_parent) {
            return Err(TreeError::CycleDetected {
                element: child,
                target: new_parent,
            });
        }
        if new_parent == old_parent {
            len -= 1;
        }
        if index > len {
            return Err(TreeError::IndexOutOfBounds { index, len });
        }

        self.element_mut(old_parent)?.children.retain(|c| *c != child);
        self.element_mut(new_parent)?.children.insert(index, child);
        self.element_mut(child)?.parent = Some(new_parent);
        tracing::trace!(element = %child, from = %old_parent, to = %new_parent, index, "reparented");
        Ok(())
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// An owned copy of the subtree rooted at `id`.
    #[must_use]
    pub fn snapshot(&self, id: ElementId) -> Option<ElementTree> {
        let node = self.nodes.get(&id)?;
        Some(ElementTree {
            id,
            text: node.text.clone(),
            open: node.open,
            kind: node.kind.clone(),
            children: node
                .children
                .iter()
                .filter_map(|child| self.snapshot(*child))
                .collect(),
        })
    }

    // ========================================================================
    // Element content
    // ========================================================================

    pub fn text_mut(&mut self, id: ElementId) -> Option<&mut AttributedText> {
        self.nodes.get_mut(&id).map(|e| &mut e.text)
    }

    /// Replace the kind of `id`, returning the previous kind.
    pub fn set_kind(&mut self, id: ElementId, kind: ElementKind) -> Result<ElementKind, TreeError> {
        let node = self.element_mut(id)?;
        Ok(std::mem::replace(&mut node.kind, kind))
    }

    /// Set the open flag of `id`, returning the previous value.
    pub fn set_open(&mut self, id: ElementId, open: bool) -> Result<bool, TreeError> {
        let node = self.element_mut(id)?;
        Ok(std::mem::replace(&mut node.open, open))
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    #[must_use]
    pub fn index_in_parent(&self, id: ElementId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Number of ancestors; the root has depth 0.
    #[must_use]
    pub fn depth(&self, id: ElementId) -> Option<usize> {
        self.get(id)?;
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(p) = current {
            depth += 1;
            current = self.parent(p);
        }
        Some(depth)
    }

    /// Levels below `id`; a leaf has height 0.
    #[must_use]
    pub fn subtree_height(&self, id: ElementId) -> usize {
        self.children(id)
            .iter()
            .map(|c| 1 + self.subtree_height(*c))
            .max()
            .unwrap_or(0)
    }

    /// Every element except the root, in document order.
    #[must_use]
    pub fn flat_ids(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<ElementId> = self.children(self.root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    #[must_use]
    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    #[must_use]
    pub fn previous_sibling(&self, id: ElementId) -> Option<ElementId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Next sibling of `id` or of its nearest ancestor that has one.
    fn next_after_subtree(&self, id: ElementId) -> Option<ElementId> {
        let mut current = id;
        loop {
            if current == self.root {
                return None;
            }
            if let Some(next) = self.next_sibling(current) {
                return Some(next);
            }
            current = self.parent(current)?;
        }
    }

    /// The element after `id` in document order, ignoring collapse state.
    #[must_use]
    pub fn next_element(&self, id: ElementId) -> Option<ElementId> {
        match self.children(id).first() {
            Some(first) => Some(*first),
            None => self.next_after_subtree(id),
        }
    }

    /// The last visible descendant of `id`, or `id` itself.
    #[must_use]
    pub fn deepest_child(&self, id: ElementId) -> ElementId {
        let mut current = id;
        while let Some(node) = self.get(current) {
            match node.children.last() {
                Some(last) if node.open => current = *last,
                _ => break,
            }
        }
        current
    }

    /// Whether every ancestor below the root is open.
    #[must_use]
    pub fn is_visible(&self, id: ElementId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == self.root {
                return true;
            }
            if !self.get(p).is_some_and(DocumentElement::is_open) {
                return false;
            }
            current = self.parent(p);
        }
        id == self.root
    }

    /// The next element a reader would see after `id`.
    #[must_use]
    pub fn next_visible(&self, id: ElementId) -> Option<ElementId> {
        let node = self.get(id)?;
        if node.open {
            if let Some(first) = node.children.first() {
                return Some(*first);
            }
        }
        self.next_after_subtree(id)
    }

    /// The element a reader sees just before `id`.
    #[must_use]
    pub fn previous_visible(&self, id: ElementId) -> Option<ElementId> {
        if let Some(previous) = self.previous_sibling(id) {
            return Some(self.deepest_child(previous));
        }
        self.parent(id).filter(|p| *p != self.root)
    }

    /// Visible elements in document order.
    #[must_use]
    pub fn visible_ids(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut current = self.children(self.root).first().copied();
        while let Some(id) = current {
            out.push(id);
            current = self.next_visible(id);
        }
        out
    }
}
