#![forbid(unsafe_code)]

//! Outline editor core facade.
//!
//! Re-exports the text, undo, and document crates and offers a prelude for
//! day-to-day use.
//!
//! ```
//! use outline::prelude::*;
//!
//! let mut editor = Editor::default();
//! editor.insert_text("Groceries");
//! let first = editor.document().flat_ids()[0];
//! editor.insert_element_after("milk");
//! editor.change_kind(first, ElementKind::heading(1));
//!
//! let json = editor.document().to_json()?;
//! assert_eq!(Document::from_json(&json)?.len(), 2);
//! # Ok::<(), outline::Error>(())
//! ```

// --- Text re-exports -------------------------------------------------------

pub use outline_text::{Attribute, AttributeSet, AttributedText, SourceMetadata};

// --- Undo re-exports -------------------------------------------------------

pub use outline_undo::{
    Action, BlockCommand, Command, CommandError, CommandManager, GroupCommand, HistoryConfig,
};

// --- Document re-exports ---------------------------------------------------

pub use outline_doc::commands::FormatOp;
pub use outline_doc::{
    ConfigError, Document, DocumentElement, EditCommand, EditState, Editor, EditorConfig,
    ElementId, ElementKind, ElementTree, Focus, LinkRegistry, LinkResolver, PersistError,
    TreeError,
};

// --- Errors ---------------------------------------------------------------

/// Any error surfaced by the outline crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Standard result type for outline APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Common imports.
pub mod prelude {
    pub use crate::{
        Attribute, AttributedText, Document, Editor, EditorConfig, ElementId, ElementKind,
        ElementTree, Error, FormatOp, HistoryConfig, Result,
    };

    pub use crate::{doc, text, undo};
}

pub use outline_doc as doc;
pub use outline_text as text;
pub use outline_undo as undo;
