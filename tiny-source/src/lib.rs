//! Source code representation and position tracking.

use std::fmt;

/// Represents source code.
pub struct Source<'a> {
    /// Original source code.
    pub content: &'a str,
    /// Byte offset of the first character of every row.
    row_starts: Vec<usize>,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        let row_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            content,
            row_starts,
        }
    }

    /// Returns the 1-based row and column of the byte at `offset`.
    /// `\n` is the row separator. Columns count characters, not bytes.
    ///
    /// # Example
    /// ```
    /// use tiny_source::{Position, Source};
    /// let source = Source::new("10 END\r\n20 END");
    /// assert_eq!(source.position(0), Position::new(1, 1));
    /// assert_eq!(source.position(11), Position::new(2, 4));
    /// ```
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.content.len());
        // `row_starts[0] == 0` so the partition point is always at least 1.
        let row = self.row_starts.partition_point(|&start| start <= offset);
        let row_start = self.row_starts[row - 1];
        let col = self.content[row_start..offset].chars().count() + 1;
        Position::new(row as u32, col as u32)
    }

    /// Returns the position just past the last character.
    pub fn end_position(&self) -> Position {
        self.position(self.content.len())
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// A 1-based row/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_single_row() {
        let source = Source::new("10 PRINT X");
        assert_eq!(source.position(0), Position::new(1, 1));
        assert_eq!(source.position(3), Position::new(1, 4));
        assert_eq!(source.end_position(), Position::new(1, 11));
    }

    #[test]
    fn test_position_rows() {
        let source = Source::new("10 END\r\n20 END\r\n");
        assert_eq!(source.position(6), Position::new(1, 7)); // '\r'
        assert_eq!(source.position(7), Position::new(1, 8)); // '\n'
        assert_eq!(source.position(8), Position::new(2, 1));
        assert_eq!(source.end_position(), Position::new(3, 1));
    }

    #[test]
    fn test_position_counts_chars() {
        let source = Source::new("\"é\" X");
        assert_eq!(source.position(5), Position::new(1, 5));
    }
}
