#![forbid(unsafe_code)]

use thiserror::Error;

use crate::id::ElementId;

/// Why a tree mutation was rejected. Rejected mutations change nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("element {0} is not in the document")]
    UnknownElement(ElementId),

    #[error("index {index} is out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("moving {element} under {target} would create a cycle")]
    CycleDetected {
        element: ElementId,
        target: ElementId,
    },

    #[error("element id {0} is already in use")]
    DuplicateId(ElementId),

    #[error("the root element cannot be moved or removed")]
    RootIsImmovable,
}

/// Failure to load or save a document.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid document: {0}")]
    Tree(#[from] TreeError),
}

/// Failure to load an [`EditorConfig`](crate::EditorConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),
}
