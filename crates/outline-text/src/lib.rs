#![forbid(unsafe_code)]

//! Attributed text for the outline editor core.
//!
//! [`AttributedText`] is a value type: a string plus ordered attribute runs
//! that always cover the whole string. Elements of an outline each own one.

pub mod attribute;
pub mod text;

pub use attribute::{
    Attribute, AttributeKind, AttributeSet, SourceMetadata, SourceOrigin, attribute_set,
};
pub use text::{AttributeRange, AttributedText};
