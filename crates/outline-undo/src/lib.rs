#![forbid(unsafe_code)]

//! Undo/redo command engine.
//!
//! Commands run against a caller-supplied context `C` that the engine never
//! interprets. [`CommandManager`] records what applied, merges consecutive
//! commands through [`Command::coalesce`], and batches work inside
//! `begin_group`/`end_group` scopes into a single [`GroupCommand`] step.
//!
//! # Example
//!
//! ```
//! use outline_undo::{BlockCommand, CommandManager};
//!
//! let mut history = CommandManager::default();
//! let mut text = String::from("Hello");
//!
//! history.run_action(
//!     BlockCommand::new(
//!         "Append",
//!         |t: &mut String| {
//!             t.push_str(" world");
//!             true
//!         },
//!         |t: &mut String| {
//!             t.truncate(5);
//!             true
//!         },
//!     ),
//!     &mut text,
//! );
//! assert_eq!(text, "Hello world");
//!
//! history.undo(&mut text);
//! assert_eq!(text, "Hello");
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod manager;

pub use command::{Action, BlockCommand, Command, GroupCommand};
pub use config::HistoryConfig;
pub use error::CommandError;
pub use manager::CommandManager;
