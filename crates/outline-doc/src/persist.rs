#![forbid(unsafe_code)]

//! JSON persistence of whole documents.
//!
//! A document is stored as its root [`ElementTree`]. Loading rebuilds the
//! arena and rejects trees that reuse an id.

use std::path::Path;

use crate::document::Document;
use crate::element::ElementTree;
use crate::error::PersistError;

impl Document {
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(&self.to_tree())?)
    }

    pub fn to_json_pretty(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(&self.to_tree())?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let tree: ElementTree = serde_json::from_str(json).map_err(|err| {
            tracing::warn!(error = %err, "rejected document JSON");
            err
        })?;
        Document::from_tree(tree).map_err(|err| {
            tracing::warn!(error = %err, "rejected document tree");
            PersistError::from(err)
        })
    }

    /// Write the document as JSON to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let json = self.to_json_pretty()?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }
}
