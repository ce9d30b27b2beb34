//! Program metadata for diagnostics.
//!
//! Maps expression ids back to the source text they were compiled from so
//! runtime errors can point at a line and column. Evaluation never depends on
//! this information.

use crate::{ExprId, Span};
use rustc_hash::FxHashMap;
use std::fmt;

/// A 1-based line and column position in the expression text.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Location { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source positions and description for one compiled program.
///
/// # Usage
///
/// ```
/// use sift_ir::{ExprId, Location, ProgramMetadata, Span};
///
/// let mut metadata = ProgramMetadata::from_source("<input>", "a +\n  b");
/// metadata.record_span(ExprId::new(2), Span::new(6, 7));
/// assert_eq!(metadata.id_location(ExprId::new(2)), Some(Location::new(2, 3)));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgramMetadata {
    /// Human readable origin of the program (file name, rule name, ...).
    description: String,
    /// Byte offset at which each line starts. Always begins with 0 when
    /// built from source text.
    line_offsets: Vec<u32>,
    spans: FxHashMap<ExprId, Span>,
}

impl ProgramMetadata {
    /// Create metadata with a description and no source positions.
    pub fn new(description: impl Into<String>) -> Self {
        ProgramMetadata {
            description: description.into(),
            line_offsets: Vec::new(),
            spans: FxHashMap::default(),
        }
    }

    /// Create metadata for a program compiled from `source`.
    ///
    /// Offsets that do not fit in `u32` are not recorded; positions past them
    /// resolve to the last representable line.
    pub fn from_source(description: impl Into<String>, source: &str) -> Self {
        let mut line_offsets = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                if let Ok(next) = u32::try_from(offset.saturating_add(1)) {
                    line_offsets.push(next);
                }
            }
        }
        ProgramMetadata {
            description: description.into(),
            line_offsets,
            spans: FxHashMap::default(),
        }
    }

    /// Record the source span of an expression id.
    pub fn record_span(&mut self, id: ExprId, span: Span) {
        self.spans.insert(id, span);
    }

    /// Builder-style variant of [`record_span`](Self::record_span).
    #[must_use]
    pub fn with_span(mut self, id: ExprId, span: Span) -> Self {
        self.record_span(id, span);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Source span recorded for `id`, if any.
    pub fn id_span(&self, id: ExprId) -> Option<Span> {
        self.spans.get(&id).copied()
    }

    /// Byte offset at which the expression for `id` starts.
    pub fn id_offset(&self, id: ExprId) -> Option<u32> {
        self.id_span(id).map(|span| span.start)
    }

    /// Line and column at which the expression for `id` starts.
    ///
    /// Returns `None` when no span was recorded or the metadata has no line
    /// table (it was not built from source text).
    pub fn id_location(&self, id: ExprId) -> Option<Location> {
        let offset = self.id_offset(id)?;
        self.offset_location(offset)
    }

    /// Line and column for a byte offset.
    pub fn offset_location(&self, offset: u32) -> Option<Location> {
        let lines_before = self.line_offsets.partition_point(|&start| start <= offset);
        let line_index = lines_before.checked_sub(1)?;
        let line_start = self.line_offsets.get(line_index)?;
        let line = u32::try_from(lines_before).ok()?;
        let column = offset.checked_sub(*line_start)?.checked_add(1)?;
        Some(Location::new(line, column))
    }
}
