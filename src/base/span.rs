//! Source text positions and ranges.

use std::fmt;

pub use text_size::TextRange;
pub use text_size::TextSize;

/// A line and column position in source text.
///
/// Stored 0-indexed, displayed 1-indexed the way Go tooling prints positions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct LineCol {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column in UTF-8 bytes
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// 1-indexed line number.
    #[inline]
    pub const fn line_one_indexed(self) -> u32 {
        self.line + 1
    }

    /// 1-indexed column number.
    #[inline]
    pub const fn col_one_indexed(self) -> u32 {
        self.col + 1
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

/// Byte offset to line/column conversion for one file.
///
/// The lexer leans on this for semicolon insertion and comment grouping,
/// both of which are decided by line numbers.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(offset, _)| TextSize::from((offset + 1) as u32)),
        );
        Self { line_starts }
    }

    /// 0-indexed line containing `offset`.
    pub fn line(&self, offset: TextSize) -> u32 {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1) as u32
    }

    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self.line(offset);
        let col = offset - self.line_starts[line as usize];
        LineCol {
            line,
            col: col.into(),
        }
    }

    /// Convert a line/column position back to a byte offset.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let line_start = self.line_starts.get(line_col.line as usize)?;
        Some(*line_start + TextSize::from(line_col.col))
    }

    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_display() {
        assert_eq!(LineCol::new(0, 0).to_string(), "1:1");
        assert_eq!(LineCol::new(5, 10).to_string(), "6:11");
    }

    #[test]
    fn test_line_index_multi_line() {
        let index = LineIndex::new("package a\n\ntype T int\n");

        assert_eq!(index.line_col(TextSize::from(0)), LineCol::new(0, 0));
        assert_eq!(index.line_col(TextSize::from(8)), LineCol::new(0, 8));
        assert_eq!(index.line(TextSize::from(10)), 1);
        assert_eq!(index.line_col(TextSize::from(16)), LineCol::new(2, 5));
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_line_index_offset_round_trip() {
        let index = LineIndex::new("a\nbc\ndef");
        let pos = index.line_col(TextSize::from(6));

        assert_eq!(pos, LineCol::new(2, 1));
        assert_eq!(index.offset(pos), Some(TextSize::from(6)));
        assert_eq!(index.offset(LineCol::new(9, 0)), None);
    }
}
