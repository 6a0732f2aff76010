//! Tokens produced by the scanner.

use std::fmt;

use facet::Facet;

use crate::span::Span;

/// Kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum TokenKind {
    /// End of a line (`\n`).
    Eol,
    /// End of the source text.
    Eof,
    /// A character sequence no recognizer accepts.
    Error,
    /// Punctuation or operator from the delimiter table.
    Delimiter,
    /// A bare identifier (variables, functions, messages).
    Identifier,
    /// A reserved word from the keyword table.
    Keyword,
    /// `~π`
    Angle,
    /// `'>SGVsbG8=<'`
    Binary,
    /// `true` / `false`
    Boolean,
    /// `!>` ... `<!` block comment.
    Comment,
    /// `~P3D`
    Duration,
    /// `<2024-03-15>`
    Moment,
    /// `/bdn/collections/Set/v1`
    Name,
    /// `">` ... `<"` narrative.
    Narrative,
    /// `! trailing note`
    Note,
    /// Real, imaginary or complex number.
    Number,
    /// `none`, `any` or `"regex"?`
    Pattern,
    /// `50%`
    Percentage,
    /// `.5`
    Probability,
    /// `"text"`
    Quote,
    /// `<https://example.com>`
    Resource,
    /// `$name`
    Symbol,
    /// `#ABCD`
    Tag,
    /// `v1.2.3`
    Version,
}

impl TokenKind {
    /// Returns the kind as a lowercase name for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eol => "end of line",
            Self::Eof => "end of file",
            Self::Error => "error",
            Self::Delimiter => "delimiter",
            Self::Identifier => "identifier",
            Self::Keyword => "keyword",
            Self::Angle => "angle",
            Self::Binary => "binary",
            Self::Boolean => "boolean",
            Self::Comment => "comment",
            Self::Duration => "duration",
            Self::Moment => "moment",
            Self::Name => "name",
            Self::Narrative => "narrative",
            Self::Note => "note",
            Self::Number => "number",
            Self::Pattern => "pattern",
            Self::Percentage => "percentage",
            Self::Probability => "probability",
            Self::Quote => "quote",
            Self::Resource => "resource",
            Self::Symbol => "symbol",
            Self::Tag => "tag",
            Self::Version => "version",
        }
    }

    /// Whether tokens of this kind decode to a primitive literal value.
    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::Angle
                | Self::Binary
                | Self::Boolean
                | Self::Duration
                | Self::Moment
                | Self::Name
                | Self::Narrative
                | Self::Number
                | Self::Pattern
                | Self::Percentage
                | Self::Probability
                | Self::Quote
                | Self::Resource
                | Self::Symbol
                | Self::Tag
                | Self::Version
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified slice of source text.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub text: String,
    /// Source span.
    pub span: Span,
}

impl Token {
    /// Create a new token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Check whether this is the given delimiter.
    #[must_use]
    pub fn is_delimiter(&self, text: &str) -> bool {
        self.kind == TokenKind::Delimiter && self.text == text
    }

    /// Check whether this is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, text: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eol => write!(f, "<EOL> ({})", self.kind),
            TokenKind::Eof => write!(f, "<EOF> ({})", self.kind),
            _ => write!(f, "`{}` ({})", self.text, self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_text_and_kind() {
        let token = Token::new(TokenKind::Symbol, "$foo", Span::point(0, 1, 1));
        assert_eq!(token.to_string(), "`$foo` (symbol)");
    }

    #[test]
    fn structural_tokens_display_markers() {
        let token = Token::new(TokenKind::Eol, "\n", Span::point(0, 1, 1));
        assert_eq!(token.to_string(), "<EOL> (end of line)");
    }

    #[test]
    fn literal_kinds() {
        assert!(TokenKind::Moment.is_literal());
        assert!(!TokenKind::Comment.is_literal());
        assert!(!TokenKind::Note.is_literal());
        assert!(!TokenKind::Keyword.is_literal());
    }
}
