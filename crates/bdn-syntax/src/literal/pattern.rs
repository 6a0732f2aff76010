//! Regular-expression patterns and the `none` / `any` shorthands.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LiteralError;
use crate::token::TokenKind;

/// Lexical form of a pattern.
pub(crate) const PATTERN: &str = r#"none|any|"(?:[^"\\\n]|\\.)*"\?"#;

static BODY: Lazy<Regex> =
    Lazy::new(|| super::anchored(r#"(?:[^"\\\n]|\\.)*"#));

/// A pattern that matches nothing.
const NONE: &str = "^none$";
/// A pattern that matches anything.
const ANY: &str = ".*";

/// A pattern literal. The expression text is kept as written; it is not
/// compiled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    source: String,
}

impl Pattern {
    /// The pattern that matches nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            source: NONE.to_string(),
        }
    }

    /// The pattern that matches anything.
    #[must_use]
    pub fn any() -> Self {
        Self {
            source: ANY.to_string(),
        }
    }

    /// Wrap an expression. It must be writable between double quotes.
    pub fn new(source: impl Into<String>) -> Result<Self, LiteralError> {
        let source = source.into();
        if !BODY.is_match(&source) {
            return Err(LiteralError::new(
                TokenKind::Pattern,
                source,
                "unescaped quote or line break in pattern",
            ));
        }
        Ok(Self { source })
    }

    /// The expression text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl FromStr for Pattern {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "none" => Ok(Self::none()),
            "any" => Ok(Self::any()),
            _ => {
                let source = text
                    .strip_prefix('"')
                    .and_then(|rest| rest.strip_suffix("\"?"))
                    .ok_or_else(|| {
                        LiteralError::new(TokenKind::Pattern, text, "expected `\"...\"?`")
                    })?;
                Self::new(source)
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source.as_str() {
            NONE => f.write_str("none"),
            ANY => f.write_str("any"),
            source => write!(f, "\"{source}\"?"),
        }
    }
}
