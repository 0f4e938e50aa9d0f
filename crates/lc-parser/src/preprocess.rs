//! Provenance-tracking preprocessor.
//!
//! Surrounds every parenthesis with spaces so punctuation never touches an
//! adjacent atom, and remembers for every byte of the normalized text which
//! byte of the original source it came from.

use std::ops::Range;

use log::debug;

use crate::span::Span;

/// Maps offsets in the normalized text back to the original source.
///
/// The mapping is monotonically non-decreasing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvenanceMap {
    offsets: Vec<usize>,
    source_len: usize,
}

impl ProvenanceMap {
    /// Original offset of the normalized byte at `normalized`.
    ///
    /// Offsets at or past the end of the normalized text map to the end of
    /// the original source.
    pub fn original_offset(&self, normalized: usize) -> usize {
        self.offsets
            .get(normalized)
            .copied()
            .unwrap_or(self.source_len)
    }

    /// Maps a normalized byte range to a span of the original source.
    pub fn original_span(&self, range: Range<usize>) -> Span {
        let start = self.original_offset(range.start);
        if range.is_empty() {
            return Span::new(start..start);
        }
        let end = self.original_offset(range.end - 1) + 1;
        Span::new(start..end.min(self.source_len))
    }

    /// Number of normalized bytes covered by the map.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Length of the original source in bytes.
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    fn push(&mut self, original: usize, byte_len: usize) {
        self.offsets.extend(original..original + byte_len);
    }
}

/// The output of [`preprocess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    text: String,
    provenance: ProvenanceMap,
}

impl Preprocessed {
    /// The normalized text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn provenance(&self) -> &ProvenanceMap {
        &self.provenance
    }
}

/// Normalizes `source` and records where every normalized byte came from.
///
/// ```
/// let pre = lc_parser::preprocess("(sum 1 2)");
/// assert_eq!(pre.text(), " ( sum 1 2 ) ");
/// assert_eq!(pre.provenance().original_offset(1), 0);
/// assert_eq!(pre.provenance().original_offset(11), 8);
/// ```
pub fn preprocess(source: &str) -> Preprocessed {
    debug!(bytes = source.len(); "Preprocessing source");

    let mut text = String::with_capacity(source.len() + source.len() / 4);
    let mut provenance = ProvenanceMap {
        offsets: Vec::with_capacity(text.capacity()),
        source_len: source.len(),
    };

    for (offset, ch) in source.char_indices() {
        if ch == '(' || ch == ')' {
            text.push(' ');
            provenance.push(offset, 1);
            text.push(ch);
            provenance.push(offset, 1);
            text.push(' ');
            provenance.push(offset + 1, 1);
        } else {
            text.push(ch);
            provenance.push(offset, ch.len_utf8());
        }
    }

    debug_assert_eq!(text.len(), provenance.len());
    Preprocessed { text, provenance }
}
