#![forbid(unsafe_code)]

//! Attributed text: a string plus normalized attribute runs.
//!
//! The text is stored as an ordered list of runs. Each run is a non-empty
//! string with one attribute set, and no two adjacent runs share the same
//! set. Every mutation splits runs at its boundaries, edits whole runs, and
//! re-normalizes, so the exposed [`AttributeRange`]s are always contiguous,
//! ordered, non-overlapping, and cover `[0, len)` exactly.
//!
//! # Positions
//!
//! All positions and lengths count Unicode scalar values (`char`s), not
//! bytes.
//!
//! # Invariants
//!
//! 1. No run is empty (an empty text has no runs).
//! 2. Adjacent runs have different attribute sets.
//! 3. Equality is structural: same string, same runs.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attribute::{Attribute, AttributeKind, AttributeSet};

/// A contiguous span of text sharing one attribute set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRange {
    pub start: usize,
    /// Exclusive.
    pub end: usize,
    pub attributes: AttributeSet,
}

impl AttributeRange {
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Run {
    string: String,
    #[serde(default, skip_serializing_if = "AttributeSet::is_empty")]
    attributes: AttributeSet,
}

impl Run {
    fn char_len(&self) -> usize {
        self.string.chars().count()
    }
}

#[derive(Serialize, Deserialize)]
struct RawText {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ranges: Vec<Run>,
}

/// A string with formatting and link attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawText", into = "RawText")]
pub struct AttributedText {
    runs: Vec<Run>,
}

impl From<RawText> for AttributedText {
    fn from(raw: RawText) -> Self {
        let mut text = Self { runs: raw.ranges };
        text.normalize();
        text
    }
}

impl From<AttributedText> for RawText {
    fn from(text: AttributedText) -> Self {
        Self { ranges: text.runs }
    }
}

impl From<&str> for AttributedText {
    fn from(s: &str) -> Self {
        Self::plain(s)
    }
}

impl From<String> for AttributedText {
    fn from(s: String) -> Self {
        Self::new(s, AttributeSet::new())
    }
}

impl fmt::Display for AttributedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for run in &self.runs {
            f.write_str(&run.string)?;
        }
        Ok(())
    }
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(b, _)| b)
}

impl AttributedText {
    /// Text whose every character carries `attributes`.
    #[must_use]
    pub fn new(string: impl Into<String>, attributes: AttributeSet) -> Self {
        let mut text = Self {
            runs: vec![Run {
                string: string.into(),
                attributes,
            }],
        };
        text.normalize();
        text
    }

    /// Text without attributes.
    #[must_use]
    pub fn plain(string: impl Into<String>) -> Self {
        Self::new(string, AttributeSet::new())
    }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.iter().map(Run::char_len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// The whole string, without attributes.
    #[must_use]
    pub fn as_plain(&self) -> String {
        self.to_string()
    }

    /// `0..len()`.
    #[must_use]
    pub fn whole_range(&self) -> Range<usize> {
        0..self.len()
    }

    /// Attribute ranges in document order.
    #[must_use]
    pub fn ranges(&self) -> Vec<AttributeRange> {
        let mut start = 0;
        self.runs
            .iter()
            .map(|run| {
                let end = start + run.char_len();
                let range = AttributeRange {
                    start,
                    end,
                    attributes: run.attributes.clone(),
                };
                start = end;
                range
            })
            .collect()
    }

    /// Runs as `(string, attributes)` pairs.
    pub fn runs(&self) -> impl Iterator<Item = (&str, &AttributeSet)> {
        self.runs.iter().map(|r| (r.string.as_str(), &r.attributes))
    }

    /// Clamp `range` into `0..len()`, keeping `start <= end`.
    #[must_use]
    pub fn clamp(&self, range: Range<usize>) -> Range<usize> {
        let len = self.len();
        let end = range.end.min(len);
        range.start.min(end)..end
    }

    fn contains_range(&self, range: &Range<usize>) -> bool {
        range.start <= range.end && range.end <= self.len()
    }

    // ------------------------------------------------------------------
    // Run bookkeeping
    // ------------------------------------------------------------------

    /// Ensure a run boundary at `pos`; returns the index of the first run
    /// starting at or after `pos`.
    fn split_at(&mut self, pos: usize) -> usize {
        let mut start = 0;
        for i in 0..self.runs.len() {
            if pos == start {
                return i;
            }
            let len = self.runs[i].char_len();
            if pos < start + len {
                let at = byte_offset(&self.runs[i].string, pos - start);
                let tail = self.runs[i].string.split_off(at);
                let attributes = self.runs[i].attributes.clone();
                self.runs.insert(
                    i + 1,
                    Run {
                        string: tail,
                        attributes,
                    },
                );
                return i + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    /// Drop empty runs and merge neighbours with identical attributes.
    fn normalize(&mut self) {
        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.string.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.attributes == run.attributes => {
                    last.string.push_str(&run.string);
                }
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }

    /// Split at both ends of `range` and return the covered run indices.
    fn isolate(&mut self, range: Range<usize>) -> Range<usize> {
        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        first..last
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Insert `string` at `at` (clamped to the end) carrying `attributes`.
    pub fn insert(&mut self, at: usize, string: &str, attributes: AttributeSet) {
        if string.is_empty() {
            return;
        }
        let at = at.min(self.len());
        let index = self.split_at(at);
        self.runs.insert(
            index,
            Run {
                string: string.to_owned(),
                attributes,
            },
        );
        self.normalize();
    }

    /// Insert another attributed text at `at`, preserving its ranges.
    pub fn insert_text(&mut self, at: usize, text: &AttributedText) {
        if text.is_empty() {
            return;
        }
        let at = at.min(self.len());
        let index = self.split_at(at);
        self.runs.splice(index..index, text.runs.iter().cloned());
        self.normalize();
    }

    /// Append `string` with `attributes`.
    pub fn append(&mut self, string: &str, attributes: AttributeSet) {
        let end = self.len();
        self.insert(end, string, attributes);
    }

    /// Append another attributed text.
    pub fn append_text(&mut self, text: &AttributedText) {
        let end = self.len();
        self.insert_text(end, text);
    }

    /// Remove the characters in `range`.
    ///
    /// Out-of-bounds ranges are ignored; returns whether anything applied.
    pub fn delete_subrange(&mut self, range: Range<usize>) -> bool {
        if !self.contains_range(&range) {
            return false;
        }
        if range.is_empty() {
            return true;
        }
        let runs = self.isolate(range);
        self.runs.drain(runs);
        self.normalize();
        true
    }

    /// Replace the characters in `range` with `text`.
    ///
    /// Out-of-bounds ranges are ignored; returns whether anything applied.
    pub fn replace_subrange(&mut self, range: Range<usize>, text: &AttributedText) -> bool {
        if !self.contains_range(&range) {
            return false;
        }
        let runs = self.isolate(range);
        self.runs.splice(runs, text.runs.iter().cloned());
        self.normalize();
        true
    }

    /// Replace the attribute set of every character in `range`.
    pub fn set_attributes(&mut self, attributes: &AttributeSet, range: Range<usize>) {
        self.update_attributes(range, |set| set.clone_from(attributes));
    }

    /// Add `attributes` to every character in `range`.
    pub fn add_attributes(&mut self, attributes: &AttributeSet, range: Range<usize>) {
        self.update_attributes(range, |set| set.extend(attributes.iter().cloned()));
    }

    /// Remove attributes of the same kinds as `attributes` from `range`.
    pub fn remove_attributes(&mut self, attributes: &AttributeSet, range: Range<usize>) {
        let kinds: Vec<AttributeKind> = attributes.iter().map(Attribute::kind).collect();
        self.update_attributes(range, |set| set.retain(|a| !kinds.contains(&a.kind())));
    }

    fn update_attributes(&mut self, range: Range<usize>, mut update: impl FnMut(&mut AttributeSet)) {
        let range = self.clamp(range);
        if range.is_empty() {
            return;
        }
        let runs = self.isolate(range);
        for run in &mut self.runs[runs] {
            update(&mut run.attributes);
        }
        self.normalize();
    }

    /// Add `attribute` to `range` unless every character already has it, in
    /// which case it is removed. Returns true when the attribute was added.
    pub fn toggle_attribute(&mut self, attribute: &Attribute, range: Range<usize>) -> bool {
        let set: AttributeSet = std::iter::once(attribute.clone()).collect();
        if self.range_has_attribute(range.clone(), attribute) {
            self.remove_attributes(&set, range);
            false
        } else {
            self.add_attributes(&set, range);
            true
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// A new text holding exactly `range` (clamped), re-based at 0.
    #[must_use]
    pub fn extract(&self, range: Range<usize>) -> AttributedText {
        let range = self.clamp(range);
        if range.is_empty() {
            return Self::default();
        }
        let mut copy = self.clone();
        let runs = copy.isolate(range);
        Self {
            runs: copy.runs.drain(runs).collect(),
        }
    }

    /// The first `count` characters.
    #[must_use]
    pub fn prefix(&self, count: usize) -> AttributedText {
        self.extract(0..count)
    }

    /// The last `count` characters.
    #[must_use]
    pub fn suffix(&self, count: usize) -> AttributedText {
        let len = self.len();
        self.extract(len.saturating_sub(count)..len)
    }

    /// Attributes of the character at `pos`.
    ///
    /// At the end of the text this reports the last character's attributes,
    /// which is what newly typed text continues with.
    #[must_use]
    pub fn attributes_at(&self, pos: usize) -> AttributeSet {
        let len = self.len();
        if len == 0 {
            return AttributeSet::new();
        }
        let pos = pos.min(len - 1);
        self.ranges()
            .into_iter()
            .find(|r| r.start <= pos && pos < r.end)
            .map(|r| r.attributes)
            .unwrap_or_default()
    }

    /// True when every character in `range` carries `attribute`.
    #[must_use]
    pub fn range_has_attribute(&self, range: Range<usize>, attribute: &Attribute) -> bool {
        let range = self.clamp(range);
        if range.is_empty() {
            return self.attributes_at(range.start).contains(attribute);
        }
        self.ranges()
            .iter()
            .filter(|r| r.start < range.end && range.start < r.end)
            .all(|r| r.attributes.contains(attribute))
    }

    /// External link targets in order of appearance.
    #[must_use]
    pub fn links(&self) -> Vec<&str> {
        self.runs
            .iter()
            .flat_map(|r| r.attributes.iter())
            .filter_map(|a| match a {
                Attribute::Link(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Internal link targets in order of appearance.
    #[must_use]
    pub fn internal_links(&self) -> Vec<Uuid> {
        self.runs
            .iter()
            .flat_map(|r| r.attributes.iter())
            .filter_map(|a| match a {
                Attribute::InternalLink(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn has_link_to(&self, note: Uuid) -> bool {
        self.internal_links().contains(&note)
    }

    /// Ranges covered by a link, which editing treats as atomic.
    #[must_use]
    pub fn uneditable_ranges(&self) -> Vec<Range<usize>> {
        self.ranges()
            .into_iter()
            .filter(|r| r.attributes.iter().any(|a| !a.is_editable()))
            .map(|r| r.range())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::attribute_set;

    fn bold() -> AttributeSet {
        attribute_set([Attribute::Strong])
    }

    fn assert_covering(text: &AttributedText) {
        let ranges = text.ranges();
        let mut pos = 0;
        for (i, r) in ranges.iter().enumerate() {
            assert_eq!(r.start, pos, "gap before range {i}");
            assert!(r.end > r.start, "empty range {i}");
            if i > 0 {
                assert_ne!(ranges[i - 1].attributes, r.attributes, "unmerged ranges at {i}");
            }
            pos = r.end;
        }
        assert_eq!(pos, text.len());
    }

    #[test]
    fn new_text_has_one_range() {
        let text = AttributedText::new("Hello", bold());
        assert_eq!(text.ranges().len(), 1);
        assert_eq!(text.len(), 5);
        assert_eq!(text.to_string(), "Hello");
    }

    #[test]
    fn empty_text_has_no_ranges() {
        let text = AttributedText::plain("");
        assert!(text.is_empty());
        assert!(text.ranges().is_empty());
    }

    #[test]
    fn insert_merges_with_equal_neighbour() {
        let mut text = AttributedText::plain("Helo");
        text.insert(3, "l", AttributeSet::new());
        assert_eq!(text.to_string(), "Hello");
        assert_eq!(text.ranges().len(), 1);
    }

    #[test]
    fn insert_with_attributes_splits_range() {
        let mut text = AttributedText::plain("Hello world");
        text.insert(6, "big ", bold());
        assert_eq!(text.to_string(), "Hello big world");
        let ranges = text.ranges();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[1].range(), 6..10);
        assert_eq!(ranges[1].attributes, bold());
        assert_covering(&text);
    }

    #[test]
    fn insert_past_end_appends() {
        let mut text = AttributedText::plain("ab");
        text.insert(99, "c", AttributeSet::new());
        assert_eq!(text.to_string(), "abc");
    }

    #[test]
    fn delete_merges_ranges_that_become_adjacent() {
        let mut text = AttributedText::plain("ab");
        text.insert(1, "X", bold());
        assert_eq!(text.ranges().len(), 3);
        assert!(text.delete_subrange(1..2));
        assert_eq!(text.to_string(), "ab");
        assert_eq!(text.ranges().len(), 1);
    }

    #[test]
    fn delete_out_of_bounds_is_noop() {
        let mut text = AttributedText::plain("abc");
        assert!(!text.delete_subrange(2..5));
        assert_eq!(text.to_string(), "abc");
    }

    #[test]
    fn delete_whole_text_leaves_empty() {
        let mut text = AttributedText::new("abc", bold());
        assert!(text.delete_subrange(0..3));
        assert!(text.is_empty());
    }

    #[test]
    fn set_and_remove_attributes() {
        let mut text = AttributedText::plain("Hello world");
        text.set_attributes(&bold(), 0..5);
        assert!(text.range_has_attribute(0..5, &Attribute::Strong));
        assert!(!text.range_has_attribute(0..6, &Attribute::Strong));
        text.remove_attributes(&bold(), 2..3);
        assert_eq!(text.ranges().len(), 4);
        assert_covering(&text);
        text.remove_attributes(&bold(), 0..11);
        assert_eq!(text.ranges().len(), 1);
    }

    #[test]
    fn remove_matches_by_kind() {
        let mut text = AttributedText::new("site", attribute_set([Attribute::Link("a".into())]));
        text.remove_attributes(&attribute_set([Attribute::Link(String::new())]), 0..4);
        assert!(text.links().is_empty());
    }

    #[test]
    fn add_attributes_unions() {
        let mut text = AttributedText::new("abc", bold());
        text.add_attributes(&attribute_set([Attribute::Emphasis]), 1..2);
        assert_eq!(
            text.attributes_at(1),
            attribute_set([Attribute::Strong, Attribute::Emphasis])
        );
        assert_eq!(text.attributes_at(0), bold());
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut text = AttributedText::plain("abc");
        assert!(text.toggle_attribute(&Attribute::Underline, 0..3));
        assert!(!text.toggle_attribute(&Attribute::Underline, 0..3));
        assert_eq!(text.ranges()[0].attributes, AttributeSet::new());
    }

    #[test]
    fn extract_rebases_ranges() {
        let mut text = AttributedText::plain("Hello world");
        text.set_attributes(&bold(), 6..11);
        let piece = text.extract(4..8);
        assert_eq!(piece.to_string(), "o wo");
        let ranges = piece.ranges();
        assert_eq!(ranges[0].range(), 0..2);
        assert_eq!(ranges[1].range(), 2..4);
        assert_eq!(ranges[1].attributes, bold());
    }

    #[test]
    fn extract_then_insert_restores_text() {
        let mut text = AttributedText::plain("Hello world");
        text.set_attributes(&bold(), 3..8);
        let original = text.clone();
        let piece = text.extract(2..9);
        assert!(text.delete_subrange(2..9));
        text.insert_text(2, &piece);
        assert_eq!(text, original);
    }

    #[test]
    fn replace_subrange_swaps_content() {
        let mut text = AttributedText::plain("Hello world");
        assert!(text.replace_subrange(6..11, &AttributedText::new("there", bold())));
        assert_eq!(text.to_string(), "Hello there");
        assert_eq!(text.ranges()[1].attributes, bold());
    }

    #[test]
    fn positions_count_chars_not_bytes() {
        let mut text = AttributedText::plain("héllo");
        assert_eq!(text.len(), 5);
        text.insert(2, "!", bold());
        assert_eq!(text.to_string(), "hé!llo");
        assert_eq!(text.ranges()[1].range(), 2..3);
    }

    #[test]
    fn prefix_and_suffix() {
        let text = AttributedText::plain("abcdef");
        assert_eq!(text.prefix(2).to_string(), "ab");
        assert_eq!(text.suffix(2).to_string(), "ef");
        assert_eq!(text.suffix(10).to_string(), "abcdef");
    }

    #[test]
    fn serde_shape_matches_persisted_format() {
        let mut text = AttributedText::plain("ab");
        text.set_attributes(&bold(), 1..2);
        let json = serde_json::to_string(&text).unwrap();
        assert_eq!(
            json,
            r#"{"ranges":[{"string":"a"},{"string":"b","attributes":[{"type":"strong"}]}]}"#
        );
    }

    #[test]
    fn deserialize_normalizes_runs() {
        let json = r#"{"ranges":[{"string":"a"},{"string":""},{"string":"b"}]}"#;
        let text: AttributedText = serde_json::from_str(json).unwrap();
        assert_eq!(text.ranges().len(), 1);
        assert_eq!(text, AttributedText::plain("ab"));
    }

    #[test]
    fn uneditable_ranges_cover_links() {
        let mut text = AttributedText::plain("see docs here");
        text.add_attributes(&attribute_set([Attribute::Link("https://d".into())]), 4..8);
        assert_eq!(text.uneditable_ranges(), vec![4..8]);
    }
}
