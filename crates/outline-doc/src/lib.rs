#![forbid(unsafe_code)]

//! Outline documents and their undoable editing.
//!
//! A [`Document`] is a tree of [`DocumentElement`]s stored in an arena keyed
//! by [`ElementId`]. Each element owns an
//! [`AttributedText`](outline_text::AttributedText), an [`ElementKind`], and
//! an open flag. Documents are changed only through the structural commands
//! in [`commands`], run by a [`CommandManager`](outline_undo::CommandManager)
//! against an [`EditState`]. [`Editor`] bundles the three and provides the
//! usual editing operations.
//!
//! # Example
//!
//! ```
//! use outline_doc::{Editor, EditorConfig};
//!
//! let mut editor = Editor::new(EditorConfig::default());
//! editor.insert_text("Hello");
//! editor.insert_text(" world");
//! assert_eq!(editor.document().len(), 1);
//!
//! editor.undo();
//! assert!(editor.document().is_empty());
//! ```

pub mod commands;
pub mod config;
pub mod document;
pub mod editor;
pub mod element;
pub mod error;
pub mod id;
pub mod kind;
pub mod link;
mod persist;
pub mod state;

pub use commands::EditCommand;
pub use config::EditorConfig;
pub use document::Document;
pub use editor::Editor;
pub use element::{DocumentElement, ElementTree};
pub use error::{ConfigError, PersistError, TreeError};
pub use id::ElementId;
pub use kind::{ElementKind, MediaDisplayInfo};
pub use link::{LinkRegistry, LinkResolver};
pub use state::{EditState, Focus};
