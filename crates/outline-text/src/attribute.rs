#![forbid(unsafe_code)]

//! Formatting and link attributes carried by attributed text.
//!
//! An [`Attribute`] is a closed tagged union. Sets of attributes are kept in
//! a [`BTreeSet`] so that two runs with the same formatting compare equal
//! regardless of the order the attributes were applied in.
//!
//! # Persistence
//!
//! Attributes serialize as `{"type": "...", "payload": ...}` objects, the
//! payload being omitted for unit variants:
//!
//! ```text
//! {"type": "strong"}
//! {"type": "link", "payload": "https://example.com"}
//! {"type": "internalLink", "payload": "4f6c…"}
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where quoted or clipped content came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceOrigin {
    /// Content owned by the local store (e.g. an imported file).
    Local(Uuid),
    /// Content captured from a remote page.
    Remote(String),
}

/// Provenance metadata attached to a span of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub origin: SourceOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl SourceMetadata {
    /// Metadata for content captured from `url`.
    #[must_use]
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            origin: SourceOrigin::Remote(url.into()),
            title: None,
        }
    }

    /// Metadata for locally stored content.
    #[must_use]
    pub fn local(id: Uuid) -> Self {
        Self {
            origin: SourceOrigin::Local(id),
            title: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A single formatting or link attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Attribute {
    Strong,
    Emphasis,
    Strikethrough,
    Underline,
    /// External hyperlink.
    Link(String),
    /// Link to another note, stored as its resolved id only.
    InternalLink(Uuid),
    /// Provenance of clipped content.
    Source(SourceMetadata),
    /// Opaque style token owned by the presentation layer.
    Decorated(String),
}

/// The discriminant of an [`Attribute`], ignoring its payload.
///
/// Removal matches on kinds: removing `Link(_)` strips every link from the
/// target range whatever its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKind {
    Strong,
    Emphasis,
    Strikethrough,
    Underline,
    Link,
    InternalLink,
    Source,
    Decorated,
}

impl AttributeKind {
    /// Stable name, identical to the persisted `type` tag.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Emphasis => "emphasis",
            Self::Strikethrough => "strikethrough",
            Self::Underline => "underline",
            Self::Link => "link",
            Self::InternalLink => "internalLink",
            Self::Source => "source",
            Self::Decorated => "decorated",
        }
    }
}

impl Attribute {
    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Strong => AttributeKind::Strong,
            Self::Emphasis => AttributeKind::Emphasis,
            Self::Strikethrough => AttributeKind::Strikethrough,
            Self::Underline => AttributeKind::Underline,
            Self::Link(_) => AttributeKind::Link,
            Self::InternalLink(_) => AttributeKind::InternalLink,
            Self::Source(_) => AttributeKind::Source,
            Self::Decorated(_) => AttributeKind::Decorated,
        }
    }

    /// True for external and internal links.
    #[must_use]
    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link(_) | Self::InternalLink(_))
    }

    /// Links are atomic for editing purposes: the caret may not split them.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        !self.is_link()
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(url) => write!(f, "link({url})"),
            Self::InternalLink(id) => write!(f, "internalLink({id})"),
            Self::Source(meta) => match &meta.origin {
                SourceOrigin::Local(id) => write!(f, "source(local:{id})"),
                SourceOrigin::Remote(url) => write!(f, "source({url})"),
            },
            Self::Decorated(token) => write!(f, "decorated({token})"),
            other => f.write_str(other.kind().name()),
        }
    }
}

/// An ordered, de-duplicated set of attributes.
pub type AttributeSet = BTreeSet<Attribute>;

/// Build an [`AttributeSet`] from any iterable of attributes.
pub fn attribute_set(attributes: impl IntoIterator<Item = Attribute>) -> AttributeSet {
    attributes.into_iter().collect()
}
