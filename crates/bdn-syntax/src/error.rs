//! Error kinds raised by the literal library, the scanner and the parser.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::grammar;
use crate::token::{Token, TokenKind};

/// Text that does not decode to a value of the requested literal kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} literal `{text}`: {reason}")]
pub struct LiteralError {
    /// The literal kind that was requested.
    pub kind: TokenKind,
    /// The offending text.
    pub text: String,
    /// Why the text was rejected.
    pub reason: String,
}

impl LiteralError {
    /// Create a new literal error.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised when building ranges from primitive endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The endpoints are not the same primitive type and family.
    #[error("range endpoints must share a type: `first` is a {first} but `last` is a {last}")]
    Mismatch {
        /// Type of the first endpoint.
        first: &'static str,
        /// Type of the last endpoint.
        last: &'static str,
    },
    /// The endpoint type has no ordering, so it cannot bound a range.
    #[error("a {kind} cannot be a range endpoint because it is not ordered")]
    Unordered {
        /// Type of the offending endpoint.
        kind: &'static str,
    },
}

/// A rendered parser diagnostic: the offending token, its surrounding source
/// lines and the grammar rules that were active when parsing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Short description of the failure.
    pub message: String,
    /// The token at which parsing failed.
    pub token: Token,
    /// Numbered source lines around the token (previous, current, next).
    pub excerpt: Vec<(u32, String)>,
    /// Names of the grammar rules active at the failure, outermost first.
    pub trail: Vec<&'static str>,
}

impl Diagnostic {
    /// Build a diagnostic for `token`, pulling the excerpt from `source`.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        token: Token,
        source: &str,
        trail: &[&'static str],
    ) -> Self {
        let mut lines: Vec<&str> = source.split('\n').collect();
        // The piece after the final newline is not a line of its own.
        if lines.len() > 1 && lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }

        let current = token.span.line;
        let mut excerpt = Vec::new();
        for number in current.saturating_sub(1).max(1)..=current + 1 {
            match lines.get(number as usize - 1) {
                Some(text) => excerpt.push((number, (*text).to_string())),
                // The offending line is shown even when it is the empty line after
                // the final newline (where `Eof` lives).
                None if number == current => excerpt.push((number, String::new())),
                None => {}
            }
        }

        Self {
            message: message.into(),
            token,
            excerpt,
            trail: trail.to_vec(),
        }
    }

    /// Line of the offending token (1-based).
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.token.span.line
    }

    /// Column of the offending token (1-based).
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.token.span.column
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} at line {}, column {}",
            self.message,
            self.token,
            self.line(),
            self.column()
        )?;

        let width = self
            .excerpt
            .iter()
            .map(|(number, _)| number.to_string().len())
            .max()
            .unwrap_or(1);
        for (number, text) in &self.excerpt {
            if text.is_empty() {
                writeln!(f, "{number:>width$} |")?;
            } else {
                writeln!(f, "{number:>width$} | {text}")?;
            }
            if *number == self.line() {
                let pad = " ".repeat(self.column().saturating_sub(1) as usize);
                writeln!(f, "{:width$} | {pad}^", "")?;
            }
        }

        if self.trail.is_empty() {
            return Ok(());
        }
        write!(f, "expected: {}", self.trail.join(" > "))?;
        for rule in self.trail.iter().rev().take(2) {
            if let Some(production) = grammar::production(rule) {
                write!(f, "\n  {rule}: {production}")?;
            }
        }
        Ok(())
    }
}

/// Errors that can occur during parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The scanner found characters no token recognizer accepts.
    #[error("lexical error: {0}")]
    Lexical(Diagnostic),
    /// A required production could not be completed.
    #[error("syntax error: {0}")]
    Syntax(Diagnostic),
    /// A literal token scanned cleanly but its value is invalid.
    #[error("{source}\n{diagnostic}")]
    Literal {
        /// Where the literal appeared.
        diagnostic: Diagnostic,
        /// Why the literal was rejected.
        source: LiteralError,
    },
    /// Range endpoints did not satisfy the type rules.
    #[error("type error: {source}\n{diagnostic}")]
    Type {
        /// Where the range appeared.
        diagnostic: Diagnostic,
        /// The underlying type error.
        source: TypeError,
    },
    /// The scanner stopped producing tokens.
    #[error("timed out after {0:?} waiting for the scanner to produce a token")]
    Timeout(Duration),
}

impl ParseError {
    /// The diagnostic attached to this error, if any.
    #[must_use]
    pub const fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Lexical(diagnostic)
            | Self::Syntax(diagnostic)
            | Self::Literal { diagnostic, .. }
            | Self::Type { diagnostic, .. } => Some(diagnostic),
            Self::Timeout(_) => None,
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn token(kind: TokenKind, text: &str, line: u32, column: u32) -> Token {
        Token::new(kind, text, Span::point(0, line, column))
    }

    #[test]
    fn excerpt_includes_neighbouring_lines() {
        let source = "[\n    $foo\n    $bar\n";
        let diagnostic = Diagnostic::new(
            "unexpected token",
            token(TokenKind::Symbol, "$foo", 2, 5),
            source,
            &[],
        );
        let numbers: Vec<u32> = diagnostic.excerpt.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn excerpt_at_eof_shows_empty_line() {
        let source = "[\n    $foo\n";
        let diagnostic =
            Diagnostic::new("unexpected token", token(TokenKind::Eof, "", 3, 1), source, &[]);
        assert_eq!(
            diagnostic.excerpt,
            vec![(2, "    $foo".to_string()), (3, String::new())]
        );
    }

    #[test]
    fn caret_sits_under_column() {
        let diagnostic = Diagnostic::new(
            "unexpected token",
            token(TokenKind::Delimiter, ")", 1, 4),
            "[1, )\n",
            &["document"],
        );
        let rendered = diagnostic.to_string();
        assert!(rendered.contains("1 | [1, )\n  |    ^\n"), "{rendered}");
        assert!(rendered.contains("expected: document"));
    }

    #[test]
    fn type_error_messages() {
        let error = TypeError::Mismatch {
            first: "duration",
            last: "moment",
        };
        assert_eq!(
            error.to_string(),
            "range endpoints must share a type: `first` is a duration but `last` is a moment"
        );
    }
}
