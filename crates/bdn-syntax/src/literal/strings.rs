//! String types: binaries, names, narratives, quotes and versions.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LiteralError;
use crate::token::TokenKind;

use super::Sequential;

/// Lexical form of a binary.
pub(crate) const BINARY_PATTERN: &str = r"'>[A-Za-z0-9+/= \n]*<'";
/// Lexical form of a name.
pub(crate) const NAME_PATTERN: &str = r"(?:/[a-zA-Z0-9][a-zA-Z0-9._-]*)+";
/// Lexical form of a quote.
pub(crate) const QUOTE_PATTERN: &str = r#""(?:[^"\\\n]|\\.)*""#;
/// Lexical form of a version.
pub(crate) const VERSION_PATTERN: &str = r"v[1-9][0-9]*(?:\.[1-9][0-9]*)*";

static NAME: Lazy<Regex> = Lazy::new(|| super::anchored(NAME_PATTERN));
static QUOTE: Lazy<Regex> = Lazy::new(|| super::anchored(QUOTE_PATTERN));
static VERSION: Lazy<Regex> = Lazy::new(|| super::anchored(VERSION_PATTERN));

/// Base-64 characters per line once a binary is written over several lines.
pub const LINE_WIDTH: usize = 60;

/// A sequence of bytes, written in base 64.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binary(Vec<u8>);

impl Binary {
    /// Wrap raw bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Render the binary at the given nesting depth. Short encodings stay on
    /// one line; longer ones are split into lines of [`LINE_WIDTH`]
    /// characters indented one level deeper than the closing `<'`.
    #[must_use]
    pub fn format_indented(&self, indent: &str, depth: usize) -> String {
        let encoded = STANDARD.encode(&self.0);
        if encoded.len() <= LINE_WIDTH {
            return format!("'>{encoded}<'");
        }
        let inner = indent.repeat(depth + 1);
        let mut out = String::from("'>\n");
        let mut start = 0;
        while start < encoded.len() {
            let end = (start + LINE_WIDTH).min(encoded.len());
            out.push_str(&inner);
            out.push_str(&encoded[start..end]);
            out.push('\n');
            start = end;
        }
        out.push_str(&indent.repeat(depth));
        out.push_str("<'");
        out
    }
}

impl FromStr for Binary {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let error = |reason: String| LiteralError::new(TokenKind::Binary, text, reason);
        let body = text
            .strip_prefix("'>")
            .and_then(|rest| rest.strip_suffix("<'"))
            .ok_or_else(|| error("expected `'>` ... `<'`".to_string()))?;
        let compact: String = body.chars().filter(|ch| !ch.is_whitespace()).collect();
        STANDARD
            .decode(compact)
            .map(Self)
            .map_err(|cause| error(format!("not valid base 64 ({cause})")))
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_indented("    ", 0))
    }
}

impl Sequential for Binary {
    type Item = u8;

    fn items(&self) -> Vec<u8> {
        self.0.clone()
    }
}

/// A hierarchical name such as `/bdn/collections/Set/v1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(Vec<String>);

impl Name {
    /// Build a name from its segments.
    pub fn new<S: AsRef<str>>(segments: &[S]) -> Result<Self, LiteralError> {
        let text: String = segments
            .iter()
            .map(|segment| format!("/{}", segment.as_ref()))
            .collect();
        text.parse()
    }

    /// The segments between the slashes.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl FromStr for Name {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if !NAME.is_match(text) {
            return Err(LiteralError::new(
                TokenKind::Name,
                text,
                "expected `/segment` repeated, each segment starting with a letter or digit",
            ));
        }
        Ok(Self(text.split('/').skip(1).map(str::to_string).collect()))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl Sequential for Name {
    type Item = String;

    fn items(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// Multi-line text between `">` and `<"`, kept verbatim including its line
/// breaks and indentation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Narrative(String);

impl Narrative {
    /// Wrap the text between the delimiters.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    /// The text between the delimiters.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.0
    }

    /// The lines of text, without the empty line after `">` and the
    /// indentation before `<"`.
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        let mut lines: Vec<&str> = self.0.split('\n').collect();
        if lines.len() > 1 && lines.first().is_some_and(|line| line.is_empty()) {
            lines.remove(0);
        }
        if lines.len() > 1 && lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }
        lines
    }
}

impl FromStr for Narrative {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        text.strip_prefix("\">")
            .and_then(|rest| rest.strip_suffix("<\""))
            .map(Self::new)
            .ok_or_else(|| LiteralError::new(TokenKind::Narrative, text, "expected `\">` ... `<\"`"))
    }
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\">{}<\"", self.0)
    }
}

impl Sequential for Narrative {
    type Item = String;

    fn items(&self) -> Vec<String> {
        self.lines().into_iter().map(str::to_string).collect()
    }
}

/// Single-line text in double quotes, stored with escapes decoded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quote(String);

impl Quote {
    /// Wrap decoded text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The decoded text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the text.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl FromStr for Quote {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let error = |reason: &str| LiteralError::new(TokenKind::Quote, text, reason);
        if !QUOTE.is_match(text) {
            return Err(error("expected text in double quotes on one line"));
        }

        let mut decoded = String::new();
        let mut chars = text[1..text.len() - 1].chars();
        while let Some(ch) = chars.next() {
            if ch != '\\' {
                decoded.push(ch);
                continue;
            }
            match chars.next() {
                Some('"') => decoded.push('"'),
                Some('\\') => decoded.push('\\'),
                Some('n') => decoded.push('\n'),
                Some('r') => decoded.push('\r'),
                Some('t') => decoded.push('\t'),
                Some('u') => {
                    let digits: String = chars.by_ref().take(4).collect();
                    let ch = (digits.len() == 4)
                        .then(|| u32::from_str_radix(&digits, 16).ok())
                        .flatten()
                        .and_then(char::from_u32)
                        .ok_or_else(|| error("`\\u` needs four hex digits naming a character"))?;
                    decoded.push(ch);
                }
                _ => return Err(error("unknown escape sequence")),
            }
        }
        Ok(Self(decoded))
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for ch in self.0.chars() {
            match ch {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                _ => write!(f, "{ch}")?,
            }
        }
        f.write_str("\"")
    }
}

impl Sequential for Quote {
    type Item = char;

    fn items(&self) -> Vec<char> {
        self.0.chars().collect()
    }
}

/// A version such as `v1.2.3`. Every ordinal is at least one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(Vec<u32>);

impl Version {
    /// Build a version from its ordinals.
    pub fn new(ordinals: Vec<u32>) -> Result<Self, LiteralError> {
        if ordinals.is_empty() || ordinals.contains(&0) {
            let text = ordinals
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(".");
            return Err(LiteralError::new(
                TokenKind::Version,
                format!("v{text}"),
                "a version needs one or more ordinals, each at least 1",
            ));
        }
        Ok(Self(ordinals))
    }

    /// The ordinals between the dots.
    #[must_use]
    pub fn ordinals(&self) -> &[u32] {
        &self.0
    }
}

impl FromStr for Version {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let error = |reason: &str| LiteralError::new(TokenKind::Version, text, reason);
        if !VERSION.is_match(text) {
            return Err(error("expected `v` followed by dotted ordinals such as `v1.2`"));
        }
        text[1..]
            .split('.')
            .map(|ordinal| ordinal.parse::<u32>().map_err(|_| error("ordinal is too large")))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("v")?;
        for (index, ordinal) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "{ordinal}")?;
        }
        Ok(())
    }
}

impl Sequential for Version {
    type Item = u32;

    fn items(&self) -> Vec<u32> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_decode_and_reescape() {
        let quote: Quote = r#""say \"hi\"\né""#.parse().unwrap();
        assert_eq!(quote.as_str(), "say \"hi\"\né");
        assert_eq!(quote.to_string(), r#""say \"hi\"\né""#);
        assert!(r#""bad \q""#.parse::<Quote>().is_err());
        assert!(r#""\u12""#.parse::<Quote>().is_err());
    }

    #[test]
    fn names_split_into_segments() {
        let name: Name = "/bdn/collections/Set/v1".parse().unwrap();
        assert_eq!(name.segments(), ["bdn", "collections", "Set", "v1"]);
        assert_eq!(name.to_string(), "/bdn/collections/Set/v1");
        assert_eq!(name.item(-1).as_deref(), Some("v1"));
        assert!("/bdn//x".parse::<Name>().is_err());
        assert_eq!(Name::new(&["a", "b"]).unwrap().to_string(), "/a/b");
    }

    #[test]
    fn versions() {
        let version: Version = "v1.2.3".parse().unwrap();
        assert_eq!(version.ordinals(), [1, 2, 3]);
        assert!(version < "v1.10".parse::<Version>().unwrap());
        assert!("v0".parse::<Version>().is_err());
        assert!("v1.0".parse::<Version>().is_err());
        assert!(Version::new(vec![]).is_err());
    }

    #[test]
    fn short_binaries_stay_inline() {
        let binary: Binary = "'>SGVsbG8=<'".parse().unwrap();
        assert_eq!(binary.as_bytes(), b"Hello");
        assert_eq!(binary.to_string(), "'>SGVsbG8=<'");
        assert_eq!(Binary::new(Vec::new()).to_string(), "'><'");
    }

    #[test]
    fn long_binaries_wrap() {
        let binary = Binary::new(vec![0xAB; 60]);
        let rendered = binary.format_indented("    ", 1);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "'>");
        assert_eq!(lines[1].len(), 8 + LINE_WIDTH);
        assert!(lines[1].starts_with("        "));
        assert_eq!(lines[3], "    <'");
        assert_eq!(rendered.parse::<Binary>().unwrap(), binary);
    }

    #[test]
    fn narratives_keep_their_body() {
        let text = "\">\n    first line\n      second\n<\"";
        let narrative: Narrative = text.parse().unwrap();
        assert_eq!(narrative.to_string(), text);
        assert_eq!(narrative.lines(), ["    first line", "      second"]);
        assert_eq!(narrative.len(), 2);
    }
}
