//! Scanner turning BDN source text into tokens.
//!
//! Recognizers are tried in a fixed priority order at each position, so the
//! first one that accepts wins even when a later one could match more text.
//! Literal patterns come from the [`literal`](crate::literal) module, which
//! keeps the scanner and the value parsers in agreement.
//!
//! [`spawn`] runs a scanner on a scoped worker thread feeding a bounded queue,
//! which is how the parser consumes tokens.

use std::thread::Scope;

use crossbeam_channel::Receiver;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::literal::patterns;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Reserved words. Each needs a word boundary after it.
pub const KEYWORDS: &[&str] = &[
    "and", "break", "catch", "continue", "do", "each", "if", "in", "IS", "loop", "MATCHES",
    "matching", "not", "on", "or", "return", "sans", "select", "throw", "while", "with", "xor",
];

/// Punctuation and operators, longest first.
pub const DELIMITERS: &[&str] = &[
    ":=", "?=", "+=", "-=", "*=", "/=", "..", "//", "<-", "≠", "(", ")", "[", "]", "{", "}", ",",
    ":", ";", ".", "+", "-", "*", "/", "^", "&", "|", "@", "<", "=", ">",
];

enum Recognizer {
    Eol,
    Block {
        kind: TokenKind,
        open: &'static str,
        close: &'static str,
    },
    Pattern {
        kind: TokenKind,
        regex: Regex,
    },
    Words {
        kind: TokenKind,
        words: &'static [&'static str],
    },
}

impl Recognizer {
    fn pattern(kind: TokenKind, source: &str) -> Self {
        let regex = Regex::new(&format!("^(?:{source})")).expect("token pattern is valid");
        Self::Pattern { kind, regex }
    }

    const fn kind(&self) -> TokenKind {
        match self {
            Self::Eol => TokenKind::Eol,
            Self::Block { kind, .. } | Self::Pattern { kind, .. } | Self::Words { kind, .. } => {
                *kind
            }
        }
    }

    /// Length in bytes of the text this recognizer accepts at the start of
    /// `rest`.
    fn matches(&self, rest: &str) -> Option<usize> {
        match self {
            Self::Eol => rest.starts_with('\n').then_some(1),
            Self::Block { open, close, .. } => scan_block(rest, open, close),
            Self::Pattern { regex, .. } => regex.find(rest).map(|found| found.end()),
            Self::Words { words, .. } => words
                .iter()
                .filter(|word| rest.starts_with(**word) && at_boundary(rest, word.len()))
                .map(|word| word.len())
                .max(),
        }
    }
}

static RECOGNIZERS: Lazy<Vec<Recognizer>> = Lazy::new(|| {
    vec![
        Recognizer::Eol,
        Recognizer::Block {
            kind: TokenKind::Comment,
            open: "!>",
            close: "<!",
        },
        Recognizer::pattern(TokenKind::Note, r"! [^\n]*"),
        Recognizer::Block {
            kind: TokenKind::Narrative,
            open: "\">",
            close: "<\"",
        },
        Recognizer::pattern(TokenKind::Binary, patterns::BINARY),
        Recognizer::pattern(TokenKind::Pattern, patterns::PATTERN),
        Recognizer::pattern(TokenKind::Quote, patterns::QUOTE),
        Recognizer::pattern(TokenKind::Boolean, "true|false"),
        Recognizer::pattern(TokenKind::Duration, patterns::DURATION),
        Recognizer::pattern(TokenKind::Angle, &patterns::angle()),
        Recognizer::pattern(TokenKind::Moment, patterns::MOMENT),
        Recognizer::pattern(TokenKind::Resource, patterns::RESOURCE),
        Recognizer::pattern(TokenKind::Percentage, &patterns::percentage()),
        Recognizer::pattern(TokenKind::Probability, patterns::PROBABILITY),
        Recognizer::pattern(TokenKind::Number, &patterns::number()),
        Recognizer::pattern(TokenKind::Version, patterns::VERSION),
        Recognizer::pattern(TokenKind::Name, patterns::NAME),
        Recognizer::pattern(TokenKind::Symbol, patterns::SYMBOL),
        Recognizer::pattern(TokenKind::Tag, patterns::TAG),
        Recognizer::Words {
            kind: TokenKind::Keyword,
            words: KEYWORDS,
        },
        Recognizer::pattern(TokenKind::Identifier, "[a-zA-Z][a-zA-Z0-9]*"),
        Recognizer::Words {
            kind: TokenKind::Delimiter,
            words: DELIMITERS,
        },
    ]
});

const fn is_word(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Whether a match of `length` bytes ends on a word boundary.
fn at_boundary(rest: &str, length: usize) -> bool {
    let last = rest[..length].chars().next_back();
    let next = rest[length..].chars().next();
    !matches!((last, next), (Some(last), Some(next)) if is_word(last) && is_word(next))
}

/// Scan a nestable block such as `!>` ... `<!`. A closing delimiter only
/// counts when nothing but spaces precede it on its line.
fn scan_block(rest: &str, open: &str, close: &str) -> Option<usize> {
    if !rest.starts_with(open) {
        return None;
    }
    let mut depth = 0usize;
    let mut index = open.len();
    let mut blank_prefix = false;
    while index < rest.len() {
        let tail = &rest[index..];
        if blank_prefix && tail.starts_with(close) {
            index += close.len();
            if depth == 0 {
                return Some(index);
            }
            depth -= 1;
            blank_prefix = false;
            continue;
        }
        if tail.starts_with(open) {
            depth += 1;
            index += open.len();
            blank_prefix = false;
            continue;
        }
        let ch = tail.chars().next()?;
        match ch {
            '\n' => blank_prefix = true,
            ' ' => {}
            _ => blank_prefix = false,
        }
        index += ch.len_utf8();
    }
    None
}

fn recognize(rest: &str) -> Option<(TokenKind, usize)> {
    RECOGNIZERS.iter().find_map(|recognizer| {
        let length = recognizer.matches(rest)?;
        let kind = recognizer.kind();
        if length == 0 || !at_boundary(rest, length) {
            return None;
        }
        // `1.` directly before `.` or a digit belongs to a range or a number.
        if kind == TokenKind::Probability
            && &rest[..length] == "1."
            && rest[length..].starts_with(|ch: char| ch == '.' || ch.is_ascii_digit())
        {
            return None;
        }
        Some((kind, length))
    })
}

fn position(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Iterator over the tokens of a source text.
///
/// The sequence always ends with a single [`TokenKind::Eof`] token, or with
/// a [`TokenKind::Error`] token holding the first character no recognizer
/// accepts.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    offset: usize,
    line: u32,
    column: u32,
    finished: bool,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over `source`.
    #[must_use]
    pub const fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn skip_spaces(&mut self) {
        while self.source[self.offset..].starts_with(' ') {
            self.offset += 1;
            self.column += 1;
        }
    }

    fn emit(&mut self, kind: TokenKind, length: usize) -> Token {
        let start = self.offset;
        let (line, column) = (self.line, self.column);
        let text = &self.source[start..start + length];
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset += length;
        let span = Span::new(
            position(start),
            position(self.offset),
            line,
            column,
            self.line,
            self.column,
        );
        Token::new(kind, text, span)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        self.skip_spaces();
        let rest = &self.source[self.offset..];
        if rest.is_empty() {
            self.finished = true;
            return Some(Token::new(
                TokenKind::Eof,
                "",
                Span::point(position(self.offset), self.line, self.column),
            ));
        }
        if let Some((kind, length)) = recognize(rest) {
            return Some(self.emit(kind, length));
        }
        self.finished = true;
        let length = rest.chars().next().map_or(1, char::len_utf8);
        Some(self.emit(TokenKind::Error, length))
    }
}

/// Scan a whole source text at once.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    Scanner::new(source).collect()
}

/// Run a scanner on a worker thread inside `scope`, delivering tokens through
/// a queue holding at most `capacity` of them.
///
/// The worker blocks while the queue is full and stops as soon as the
/// receiver is dropped.
pub fn spawn<'scope, 'env>(
    scope: &'scope Scope<'scope, 'env>,
    source: &'env str,
    capacity: usize,
) -> Receiver<Token> {
    let (sender, receiver) = crossbeam_channel::bounded(capacity);
    scope.spawn(move || {
        debug!(bytes = source.len(), capacity, "scanner started");
        let mut count = 0usize;
        for token in Scanner::new(source) {
            if sender.send(token).is_err() {
                debug!(count, "token queue closed, scanner stopping");
                return;
            }
            count += 1;
        }
        debug!(count, "scanner finished");
    });
    receiver
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|token| token.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        tokenize(source).into_iter().map(|token| token.text).collect()
    }

    #[test]
    fn range_is_not_a_probability() {
        use TokenKind::{Delimiter, Eof, Number};
        assert_eq!(
            kinds("[1..100]"),
            vec![Delimiter, Number, Delimiter, Number, Delimiter, Eof]
        );
        assert_eq!(texts("[1..100]")[2], "..");
    }

    #[test]
    fn probabilities() {
        assert_eq!(kinds(".5")[0], TokenKind::Probability);
        assert_eq!(kinds("1.")[0], TokenKind::Probability);
        assert_eq!(kinds("1.5")[0], TokenKind::Number);
    }

    #[test]
    fn word_boundaries() {
        assert_eq!(kinds("each")[0], TokenKind::Keyword);
        assert_eq!(kinds("e")[0], TokenKind::Number);
        assert_eq!(kinds("eta")[0], TokenKind::Identifier);
        assert_eq!(kinds("v2")[0], TokenKind::Version);
        assert_eq!(kinds("v2f")[0], TokenKind::Identifier);
        assert_eq!(kinds("truest")[0], TokenKind::Identifier);
        assert_eq!(kinds("anything")[0], TokenKind::Identifier);
    }

    #[test]
    fn literal_kinds() {
        let cases = [
            ("~P3D", TokenKind::Duration),
            ("~π", TokenKind::Angle),
            ("<2024-03-15>", TokenKind::Moment),
            ("<https://example.com/a>", TokenKind::Resource),
            ("50%", TokenKind::Percentage),
            ("(1, 2i)", TokenKind::Number),
            ("3i", TokenKind::Number),
            ("/bdn/types/v1", TokenKind::Name),
            ("$key", TokenKind::Symbol),
            ("#BCDF", TokenKind::Tag),
            ("\"text\"", TokenKind::Quote),
            ("\"[a-z]\"?", TokenKind::Pattern),
            ("none", TokenKind::Pattern),
            ("'>SGVsbG8=<'", TokenKind::Binary),
            ("! a note", TokenKind::Note),
            ("true", TokenKind::Boolean),
        ];
        for (source, kind) in cases {
            let tokens = tokenize(source);
            assert_eq!(tokens[0].kind, kind, "{source}");
            assert_eq!(tokens[0].text, source, "{source}");
        }
    }

    #[test]
    fn operators_versus_literals() {
        assert_eq!(texts("x<-m()"), vec!["x", "<-", "m", "(", ")", ""]);
        assert_eq!(texts("a < b"), vec!["a", "<", "b", ""]);
        assert_eq!(texts("a // b"), vec!["a", "//", "b", ""]);
        assert_eq!(texts("x := -y"), vec!["x", ":=", "-", "y", ""]);
    }

    #[test]
    fn nested_blocks() {
        let source = "!>\n    outer\n    !>\n        inner\n    <!\n<!\n";
        let tokens = tokenize(source);
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].text, source.trim_end());
        assert_eq!(tokens[1].kind, TokenKind::Eol);

        let narrative = "\">\n    says <\" inline\n<\"";
        let tokens = tokenize(narrative);
        assert_eq!(tokens[0].kind, TokenKind::Narrative);
        assert_eq!(tokens[0].text, narrative);
    }

    #[test]
    fn unterminated_block_is_an_error() {
        let tokens = tokenize("!>\n    never closed\n");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Error);
    }

    #[test]
    fn tabs_are_errors() {
        let tokens = tokenize("[\t1]");
        assert_eq!(tokens.last().map(|token| token.kind), Some(TokenKind::Error));
        assert_eq!(tokens.last().map(|token| token.text.as_str()), Some("\t"));
    }

    #[test]
    fn positions_count_characters() {
        let tokens = tokenize("[\n    ~π, $x\n]\n");
        let symbol = tokens.iter().find(|token| token.text == "$x").unwrap();
        assert_eq!((symbol.span.line, symbol.span.column), (2, 9));
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!((eof.span.line, eof.span.column), (4, 1));
    }

    #[test]
    fn spawned_scanner_delivers_in_order() {
        let source = "[1, 2, 3]\n";
        let expected = tokenize(source);
        let received: Vec<Token> = std::thread::scope(|scope| {
            let receiver = spawn(scope, source, 2);
            receiver.iter().collect()
        });
        assert_eq!(received, expected);
    }

    #[test]
    fn dropping_the_receiver_stops_the_worker() {
        let source = "[1, 2, 3, 4, 5, 6, 7, 8]\n";
        std::thread::scope(|scope| {
            let receiver = spawn(scope, source, 1);
            let first = receiver.recv().unwrap();
            assert!(first.is_delimiter("["));
            drop(receiver);
        });
    }
}
