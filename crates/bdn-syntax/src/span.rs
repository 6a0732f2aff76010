//! Source location tracking for tokens and diagnostics.

use facet::Facet;

/// A span representing a range in source text.
///
/// Lines and columns are 1-based; columns count Unicode scalar values, not
/// bytes, so a caret rendered under `column` lines up with the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Facet)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start: u32,
    /// End byte offset (exclusive).
    pub end: u32,
    /// Start line (1-based).
    pub line: u32,
    /// Start column (1-based, in characters).
    pub column: u32,
    /// End line (1-based).
    pub end_line: u32,
    /// End column (1-based, exclusive, in characters).
    pub end_column: u32,
}

impl Span {
    /// Create a new span from byte offsets and positions.
    #[must_use]
    pub const fn new(
        start: u32,
        end: u32,
        line: u32,
        column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            start,
            end,
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// Create an empty span at a single position.
    #[must_use]
    pub const fn point(offset: u32, line: u32, column: u32) -> Self {
        Self::new(offset, offset, line, column, line, column)
    }

    /// Get the length in bytes.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans to create a span covering both.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let (start, line, column) = if self.start <= other.start {
            (self.start, self.line, self.column)
        } else {
            (other.start, other.line, other.column)
        };

        let (end, end_line, end_column) = if self.end >= other.end {
            (self.end, self.end_line, self.end_column)
        } else {
            (other.end, other.end_line, other.end_column)
        };

        Self {
            start,
            end,
            line,
            column,
            end_line,
            end_column,
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.line, self.column, self.end_line, self.end_column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_display() {
        let span = Span::new(0, 10, 1, 1, 1, 11);
        assert_eq!(span.to_string(), "1:1-1:11");
    }

    #[test]
    fn span_merge() {
        let a = Span::new(0, 5, 1, 1, 1, 6);
        let b = Span::new(10, 15, 2, 1, 2, 6);
        let merged = a.merge(&b);
        assert_eq!(merged.start, 0);
        assert_eq!(merged.end, 15);
        assert_eq!(merged.end_line, 2);
    }

    #[test]
    fn point_span_is_empty() {
        let span = Span::point(7, 3, 2);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
    }
}
