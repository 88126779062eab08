#![forbid(unsafe_code)]

//! Element kinds.
//!
//! Persisted as an object tagged by `type`:
//!
//! ```json
//! {"type": "heading", "level": 1}
//! {"type": "check", "value": true}
//! {"type": "image", "source": "<uuid>", "displayInfos": {"width": 640}}
//! ```

use std::fmt;

use outline_text::SourceMetadata;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::ElementId;

/// Intrinsic size and aspect ratio of an image or embed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDisplayInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_ratio: Option<f64>,
}

impl MediaDisplayInfo {
    #[must_use]
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            display_ratio: None,
        }
    }

    /// `(width, height)` when both are known.
    #[must_use]
    pub fn size(&self) -> Option<(u32, u32)> {
        Some((self.width?, self.height?))
    }
}

/// What an element displays.
///
/// Only the text kinds (bullet, heading, quote, check, code) carry
/// meaningful attributed text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ElementKind {
    #[default]
    Bullet,
    Heading {
        level: u8,
    },
    Quote {
        level: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<SourceMetadata>,
    },
    Check {
        value: bool,
    },
    Code,
    Divider,
    Image {
        source: Uuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_metadata: Option<SourceMetadata>,
        #[serde(default)]
        display_infos: MediaDisplayInfo,
    },
    Embed {
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_metadata: Option<SourceMetadata>,
        #[serde(default)]
        display_infos: MediaDisplayInfo,
    },
    BlockReference {
        #[serde(rename = "title")]
        note: Uuid,
        #[serde(rename = "source")]
        element: ElementId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_metadata: Option<SourceMetadata>,
    },
    DailySummary,
    TabGroup {
        tab_group_id: Uuid,
    },
}

impl ElementKind {
    /// A heading. Only levels 1 and 2 exist; other values are clamped.
    #[must_use]
    pub fn heading(level: u8) -> Self {
        Self::Heading {
            level: level.clamp(1, 2),
        }
    }

    #[must_use]
    pub fn check(value: bool) -> Self {
        Self::Check { value }
    }

    #[must_use]
    pub fn image(source: Uuid, display_infos: MediaDisplayInfo) -> Self {
        Self::Image {
            source,
            source_metadata: None,
            display_infos,
        }
    }

    #[must_use]
    pub fn embed(url: impl Into<String>) -> Self {
        Self::Embed {
            source: url.into(),
            source_metadata: None,
            display_infos: MediaDisplayInfo::default(),
        }
    }

    #[must_use]
    pub fn is_bullet(&self) -> bool {
        matches!(self, Self::Bullet)
    }

    #[must_use]
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Image { .. } | Self::Embed { .. })
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        !self.is_media()
    }

    /// Whether elements of this kind hold editable text.
    #[must_use]
    pub fn carries_text(&self) -> bool {
        matches!(
            self,
            Self::Bullet
                | Self::Heading { .. }
                | Self::Quote { .. }
                | Self::Check { .. }
                | Self::Code
        )
    }

    /// Display info for media kinds.
    #[must_use]
    pub fn display_infos(&self) -> Option<&MediaDisplayInfo> {
        match self {
            Self::Image { display_infos, .. } | Self::Embed { display_infos, .. } => {
                Some(display_infos)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullet => f.write_str("bullet"),
            Self::Heading { level } => write!(f, "heading {level}"),
            Self::Quote { .. } => f.write_str("quote"),
            Self::Check { value } => write!(f, "check {value}"),
            Self::Code => f.write_str("code"),
            Self::Divider => f.write_str("divider"),
            Self::Image { source, .. } => write!(f, "image '{source}'"),
            Self::Embed { source, .. } => write!(f, "embed '{source}'"),
            Self::BlockReference { note, element, .. } => {
                write!(f, "blockReference '{note}.{element}'")
            }
            Self::DailySummary => f.write_str("dailySummary"),
            Self::TabGroup { tab_group_id } => write!(f, "tabGroup '{tab_group_id}'"),
        }
    }
}
