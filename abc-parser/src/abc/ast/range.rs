//! Positions and ranges
//!
//! Positions are zero-based lines and UTF-16 columns, the unit editors speak. Ranges also
//! carry the byte span they cover so visitors can slice source text without converting back.
//!
//! [`SourceLocation`] maps between the two coordinate systems for a given text.

use std::fmt;
use std::ops::Range as ByteRange;

use serde::Serialize;

/// A line:column position (UTF-16 columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A start/end pair plus the byte span between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Range {
    pub span: ByteRange<usize>,
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(span: ByteRange<usize>, start: Position, end: Position) -> Self {
        Self { span, start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Converts between byte offsets and positions for one text.
pub struct SourceLocation<'a> {
    source: &'a str,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl<'a> SourceLocation<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let offset = byte_offset.min(self.source.len());
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);
        let start = self.line_starts[line];
        let column = self
            .source
            .get(start..offset)
            .map(|text| text.encode_utf16().count())
            .unwrap_or(0);
        Position::new(line, column)
    }

    /// Byte offset of a position. Positions past the end of a line clamp to the line end
    /// (before its line break); lines past the end of the text clamp to the text length.
    pub fn position_to_byte(&self, position: Position) -> usize {
        let Some(&line_start) = self.line_starts.get(position.line) else {
            return self.source.len();
        };
        let line_end = self
            .line_starts
            .get(position.line + 1)
            .copied()
            .unwrap_or(self.source.len());
        let line = &self.source[line_start..line_end];
        let content = line.trim_end_matches(['\n', '\r']);

        let mut units = 0;
        for (idx, ch) in content.char_indices() {
            if units >= position.column {
                return line_start + idx;
            }
            units += ch.len_utf16();
        }
        line_start + content.len()
    }

    pub fn byte_range_to_range(&self, span: &ByteRange<usize>) -> Range {
        Range::new(
            span.clone(),
            self.byte_to_position(span.start),
            self.byte_to_position(span.end),
        )
    }
}
