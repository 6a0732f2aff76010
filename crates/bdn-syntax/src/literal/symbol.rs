//! Symbols (`$name`) and tags (`#BASE32`).

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;

use crate::error::LiteralError;
use crate::token::TokenKind;

use super::Sequential;

/// Lexical form of a symbol.
pub(crate) const SYMBOL_PATTERN: &str = r"\$[a-zA-Z][a-zA-Z0-9]*";
/// Lexical form of a tag.
pub(crate) const TAG_PATTERN: &str = r"#[0-9A-DF-HJ-NP-TV-Z]+";

static SYMBOL: Lazy<Regex> = Lazy::new(|| super::anchored(SYMBOL_PATTERN));
static TAG: Lazy<Regex> = Lazy::new(|| super::anchored(TAG_PATTERN));

/// A symbolic name such as `$type`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from its name, without the `$`.
    pub fn new(name: impl Into<String>) -> Result<Self, LiteralError> {
        format!("${}", name.into()).parse()
    }

    /// The name without the `$`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if !SYMBOL.is_match(text) {
            return Err(LiteralError::new(
                TokenKind::Symbol,
                text,
                "expected `$` followed by a letter and then letters or digits",
            ));
        }
        Ok(Self(text[1..].to_string()))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

impl Sequential for Symbol {
    type Item = char;

    fn items(&self) -> Vec<char> {
        self.0.chars().collect()
    }
}

/// Base-32 alphabet without the easily confused `E I O U`.
const ALPHABET: &[u8; 32] = b"0123456789ABCDFGHJKLMNPQRSTVWXYZ";

/// Default number of random bytes in a generated tag.
pub const DEFAULT_TAG_SIZE: usize = 20;

/// A unique identifier such as `#BCDFG`. The canonical base-32 text is stored
/// so arbitrary tag lengths survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(String);

impl Tag {
    /// Generate a random tag of [`DEFAULT_TAG_SIZE`] bytes.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_sized(DEFAULT_TAG_SIZE)
    }

    /// Generate a random tag of `size` bytes.
    #[must_use]
    pub fn generate_sized(size: usize) -> Self {
        let mut bytes = vec![0u8; size];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::from_bytes(&bytes)
    }

    /// Encode raw bytes as a tag.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(encode(bytes))
    }

    /// Decode the tag back into bytes. Trailing bits that do not fill a
    /// whole byte are dropped.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        decode(&self.0)
    }

    /// The base-32 text without the `#`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(5) * 8);
    let mut buffer: u16 = 0;
    let mut bits = 0;
    for &byte in bytes {
        buffer = (buffer << 8) | u16::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(char::from(ALPHABET[usize::from((buffer >> bits) & 0x1F)]));
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(char::from(ALPHABET[usize::from((buffer << (5 - bits)) & 0x1F)]));
    }
    out
}

fn decode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u16 = 0;
    let mut bits = 0;
    for ch in text.bytes() {
        let Some(value) = ALPHABET.iter().position(|&symbol| symbol == ch) else {
            continue;
        };
        #[allow(clippy::cast_possible_truncation)]
        let value = value as u16;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            #[allow(clippy::cast_possible_truncation)]
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }
    out
}

impl FromStr for Tag {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if !TAG.is_match(text) {
            return Err(LiteralError::new(
                TokenKind::Tag,
                text,
                "expected `#` followed by base-32 characters (no E, I, O or U)",
            ));
        }
        Ok(Self(text[1..].to_string()))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Sequential for Tag {
    type Item = u8;

    fn items(&self) -> Vec<u8> {
        self.bytes()
    }
}
