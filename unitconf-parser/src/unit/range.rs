//! Location and range tracking for unit-configuration sources
//!
//! This module defines the data structures for representing locations and ranges in source
//! text, as well as utilities for converting between byte offsets and line/column pairs.
//!
//! ## Types
//!
//! - [`Location`] - An `(offset, line, column)` triple, all zero-based
//! - [`Range`] - A half-open `[start, end)` pair of locations
//! - [`SourceLocation`] - Utility for converting between offsets and line/column
//!
//! ## Key Design
//!
//! - **Byte offsets**: `offset` indexes the UTF-8 text, so `&text[range.span()]` is the token text
//! - **Byte columns**: `column` is the byte distance from the start of the line
//! - **Line breaks**: `\n` and `\r\n`; the `\r` of a pair is never part of a token
//! - **Invariant violations panic**: asking for a line/column outside the document is a caller
//!   bug that would corrupt editor UI, so [`SourceLocation::offset_at`] panics. Use
//!   [`SourceLocation::try_offset_at`] when the position comes from an untrusted client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range as ByteRange;
use thiserror::Error;

/// A zero-based position in source text.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open range `[start, end)` in source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Location,
    pub end: Location,
}

impl Range {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    /// The byte span covered by this range.
    pub fn span(&self) -> ByteRange<usize> {
        self.start.offset..self.end.offset
    }

    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.end.offset <= self.start.offset
    }

    /// Check if an offset falls inside the range. The end offset counts as inside so that a
    /// cursor placed right after a token still refers to it.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start.offset <= offset && offset <= self.end.offset
    }

    /// Check if another range shares at least one byte with this one
    pub fn overlaps(&self, other: &Range) -> bool {
        self.start.offset < other.end.offset && other.start.offset < self.end.offset
    }

    /// Build a bounding box that contains all provided ranges.
    pub fn bounding_box<'a, I>(mut ranges: I) -> Option<Range>
    where
        I: Iterator<Item = &'a Range>,
    {
        let first = *ranges.next()?;
        let mut start = first.start;
        let mut end = first.end;

        for range in ranges {
            if range.start < start {
                start = range.start;
            }
            if range.end > end {
                end = range.end;
            }
        }

        Some(Range::new(start, end))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Errors raised when a line/column pair or offset cannot be mapped onto the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("line {line} is outside the document ({line_count} lines)")]
    LineOutOfBounds { line: usize, line_count: usize },
    #[error("column {column} is outside line {line} ({line_len} bytes)")]
    ColumnOutOfBounds {
        line: usize,
        column: usize,
        line_len: usize,
    },
    #[error("offset {offset} is outside the document ({len} bytes)")]
    OffsetOutOfBounds { offset: usize, len: usize },
}

/// Provides fast conversion between byte offsets and line/column positions
#[derive(Debug, Clone)]
pub struct SourceLocation {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
    len: usize,
}

impl SourceLocation {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Convert a byte offset to a location, failing when the offset is past the end.
    pub fn try_location_at(&self, offset: usize) -> Result<Location, LocationError> {
        if offset > self.len {
            return Err(LocationError::OffsetOutOfBounds {
                offset,
                len: self.len,
            });
        }
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);

        Ok(Location::new(offset, line, offset - self.line_starts[line]))
    }

    /// Convert a byte offset to a location.
    ///
    /// Panics when the offset is past the end of the document.
    pub fn location_at(&self, offset: usize) -> Location {
        match self.try_location_at(offset) {
            Ok(location) => location,
            Err(err) => panic!("location invariant violated: {err}"),
        }
    }

    /// Convert a line/column pair to a byte offset.
    pub fn try_offset_at(&self, line: usize, column: usize) -> Result<usize, LocationError> {
        let start = self
            .line_start(line)
            .ok_or(LocationError::LineOutOfBounds {
                line,
                line_count: self.line_count(),
            })?;
        let line_len = self.line_end(line) - start;
        if column > line_len {
            return Err(LocationError::ColumnOutOfBounds {
                line,
                column,
                line_len,
            });
        }
        Ok(start + column)
    }

    /// Convert a line/column pair to a byte offset.
    ///
    /// Panics when the position is outside the document.
    pub fn offset_at(&self, line: usize, column: usize) -> usize {
        match self.try_offset_at(line, column) {
            Ok(offset) => offset,
            Err(err) => panic!("location invariant violated: {err}"),
        }
    }

    /// Build the range covering a byte span
    pub fn range_of(&self, span: ByteRange<usize>) -> Range {
        Range::new(self.location_at(span.start), self.location_at(span.end))
    }

    /// Get the total number of lines in the source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the byte offset for the start of a line
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    // Offset of the line break ending `line`, or the document length for the last line.
    fn line_end(&self, line: usize) -> usize {
        match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.len,
        }
    }
}
