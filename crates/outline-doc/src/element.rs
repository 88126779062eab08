#![forbid(unsafe_code)]

//! Elements as stored in a [`Document`](crate::Document) and as owned trees.

use outline_text::AttributedText;
use serde::{Deserialize, Serialize};

use crate::id::ElementId;
use crate::kind::ElementKind;

/// A node of the outline as stored in the document arena.
///
/// Parent and children are id references into the owning document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentElement {
    pub(crate) id: ElementId,
    pub(crate) text: AttributedText,
    pub(crate) kind: ElementKind,
    pub(crate) open: bool,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
}

impl DocumentElement {
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &AttributedText {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Whether children are shown (not collapsed).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Text length in characters; zero for kinds without text.
    #[must_use]
    pub fn text_len(&self) -> usize {
        if self.kind.carries_text() {
            self.text.len()
        } else {
            0
        }
    }
}

fn default_open() -> bool {
    true
}

fn is_open(open: &bool) -> bool {
    *open
}

/// An owned element subtree.
///
/// Used to build documents, to snapshot detached elements for undo, and as
/// the persisted form:
///
/// ```json
/// {"id": "…", "text": {"ranges": [{"string": "Hello"}]}, "open": false,
///  "kind": {"type": "heading", "level": 1}, "children": [ … ]}
/// ```
///
/// `open` is omitted when true, `kind` when bullet, `children` when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementTree {
    pub id: ElementId,
    #[serde(default)]
    pub text: AttributedText,
    #[serde(default = "default_open", skip_serializing_if = "is_open")]
    pub open: bool,
    #[serde(default, skip_serializing_if = "ElementKind::is_bullet")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementTree>,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new(AttributedText::default())
    }
}

impl ElementTree {
    /// An open bullet with a fresh id.
    #[must_use]
    pub fn new(text: impl Into<AttributedText>) -> Self {
        Self {
            id: ElementId::new(),
            text: text.into(),
            open: true,
            kind: ElementKind::Bullet,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = ElementTree>) -> Self {
        self.children.extend(children);
        self
    }

    /// Number of elements in the subtree, including this one.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }

    /// Ids in document order, starting with this element.
    #[must_use]
    pub fn ids(&self) -> Vec<ElementId> {
        let mut ids = Vec::with_capacity(self.count());
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, out: &mut Vec<ElementId>) {
        out.push(self.id);
        for child in &self.children {
            child.collect_ids(out);
        }
    }

    /// A copy of the subtree where every element has a fresh id.
    #[must_use]
    pub fn deep_copy_with_new_ids(&self) -> Self {
        Self {
            id: ElementId::new(),
            text: self.text.clone(),
            open: self.open,
            kind: self.kind.clone(),
            children: self
                .children
                .iter()
                .map(Self::deep_copy_with_new_ids)
                .collect(),
        }
    }
}
