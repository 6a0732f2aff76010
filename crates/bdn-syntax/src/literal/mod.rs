//! Literal values: the primitive element and string types of BDN.
//!
//! Every type parses from its token text with [`FromStr`](std::str::FromStr)
//! and writes its canonical text with [`Display`](std::fmt::Display). The
//! lexical pattern of each type is shared with the scanner so both agree on
//! what a literal looks like.

mod angle;
mod duration;
mod moment;
mod number;
mod pattern;
mod probability;
mod real;
mod resource;
mod strings;
mod symbol;

use std::cmp::Ordering;
use std::fmt;

use facet::Facet;
use regex::Regex;

use crate::error::LiteralError;
use crate::token::TokenKind;

pub use angle::Angle;
pub use duration::Duration;
pub use moment::Moment;
pub use number::{Number, Percentage};
pub use pattern::Pattern;
pub use probability::Probability;
pub use real::PHI;
pub use resource::Resource;
pub use strings::{Binary, LINE_WIDTH, Name, Narrative, Quote, Version};
pub use symbol::{DEFAULT_TAG_SIZE, Symbol, Tag};

/// Lexical patterns the scanner compiles, by token kind.
pub(crate) mod patterns {
    pub(crate) use super::duration::PATTERN as DURATION;
    pub(crate) use super::moment::PATTERN as MOMENT;
    pub(crate) use super::pattern::PATTERN as PATTERN;
    pub(crate) use super::probability::PATTERN as PROBABILITY;
    pub(crate) use super::resource::PATTERN as RESOURCE;
    pub(crate) use super::strings::{
        BINARY_PATTERN as BINARY, NAME_PATTERN as NAME, QUOTE_PATTERN as QUOTE,
        VERSION_PATTERN as VERSION,
    };
    pub(crate) use super::symbol::{SYMBOL_PATTERN as SYMBOL, TAG_PATTERN as TAG};

    pub(crate) fn angle() -> String {
        super::angle::pattern()
    }

    pub(crate) fn number() -> String {
        super::number::pattern()
    }

    pub(crate) fn percentage() -> String {
        super::number::percentage_pattern()
    }
}

/// Compile a pattern that must match a whole string.
pub(crate) fn anchored(pattern: &str) -> Regex {
    Regex::new(&format!("^(?:{pattern})$")).expect("literal pattern is valid")
}

/// Element literals.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// `~π`
    Angle(Angle),
    /// `true` / `false`
    Boolean(bool),
    /// `~P3D`
    Duration(Duration),
    /// `<2024-03-15>`
    Moment(Moment),
    /// `42`, `3i`, `(1, 2i)`
    Number(Number),
    /// `none`, `any`, `"[a-z]+"?`
    Pattern(Pattern),
    /// `50%`
    Percentage(Percentage),
    /// `.5`
    Probability(Probability),
    /// `<https://example.com>`
    Resource(Resource),
    /// `$name`
    Symbol(Symbol),
    /// `#BCDFG`
    Tag(Tag),
}

impl Element {
    /// The token kind this element is written as.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::Angle(_) => TokenKind::Angle,
            Self::Boolean(_) => TokenKind::Boolean,
            Self::Duration(_) => TokenKind::Duration,
            Self::Moment(_) => TokenKind::Moment,
            Self::Number(_) => TokenKind::Number,
            Self::Pattern(_) => TokenKind::Pattern,
            Self::Percentage(_) => TokenKind::Percentage,
            Self::Probability(_) => TokenKind::Probability,
            Self::Resource(_) => TokenKind::Resource,
            Self::Symbol(_) => TokenKind::Symbol,
            Self::Tag(_) => TokenKind::Tag,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Angle(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Duration(value) => write!(f, "{value}"),
            Self::Moment(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Pattern(value) => write!(f, "{value}"),
            Self::Percentage(value) => write!(f, "{value}"),
            Self::Probability(value) => write!(f, "{value}"),
            Self::Resource(value) => write!(f, "{value}"),
            Self::Symbol(value) => write!(f, "{value}"),
            Self::Tag(value) => write!(f, "{value}"),
        }
    }
}

/// String literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringType {
    /// `'>SGVsbG8=<'`
    Binary(Binary),
    /// `/bdn/collections/Set/v1`
    Name(Name),
    /// `">` ... `<"`
    Narrative(Narrative),
    /// `"text"`
    Quote(Quote),
    /// `v1.2.3`
    Version(Version),
}

impl StringType {
    /// The token kind this string is written as.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::Binary(_) => TokenKind::Binary,
            Self::Name(_) => TokenKind::Name,
            Self::Narrative(_) => TokenKind::Narrative,
            Self::Quote(_) => TokenKind::Quote,
            Self::Version(_) => TokenKind::Version,
        }
    }
}

impl fmt::Display for StringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary(value) => write!(f, "{value}"),
            Self::Name(value) => write!(f, "{value}"),
            Self::Narrative(value) => write!(f, "{value}"),
            Self::Quote(value) => write!(f, "{value}"),
            Self::Version(value) => write!(f, "{value}"),
        }
    }
}

/// How the values of a primitive type are ordered, which decides whether and
/// how it may bound a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum Family {
    /// Discrete points: durations, moments, single characters.
    Interval,
    /// Real-valued quantities: angles, real numbers, percentages, probabilities.
    Continuum,
    /// Lexically ordered values: text, names, symbols, tags, versions.
    Spectrum,
}

/// An element or a string.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// An element literal.
    Element(Element),
    /// A string literal.
    String(StringType),
}

impl Primitive {
    /// The token kind this primitive is written as.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::Element(element) => element.kind(),
            Self::String(string) => string.kind(),
        }
    }

    /// Lowercase type name for messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// The ordering family, or `None` for unordered types.
    #[must_use]
    pub fn family(&self) -> Option<Family> {
        match self {
            Self::Element(Element::Duration(_) | Element::Moment(_)) => Some(Family::Interval),
            Self::Element(
                Element::Angle(_) | Element::Percentage(_) | Element::Probability(_),
            ) => Some(Family::Continuum),
            Self::Element(Element::Number(number)) => {
                (number.is_real() && !number.is_undefined()).then_some(Family::Continuum)
            }
            Self::String(StringType::Quote(quote)) if quote.char_count() == 1 => {
                Some(Family::Interval)
            }
            Self::String(StringType::Quote(_) | StringType::Name(_) | StringType::Version(_))
            | Self::Element(Element::Symbol(_) | Element::Tag(_)) => Some(Family::Spectrum),
            _ => None,
        }
    }

    /// Order two primitives of the same type.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Element(first), Self::Element(second)) => match (first, second) {
                (Element::Angle(a), Element::Angle(b)) => a.partial_cmp(b),
                (Element::Duration(a), Element::Duration(b)) => Some(a.cmp(b)),
                (Element::Moment(a), Element::Moment(b)) => Some(a.cmp(b)),
                (Element::Number(a), Element::Number(b)) if a.is_real() && b.is_real() => {
                    a.real().partial_cmp(&b.real())
                }
                (Element::Percentage(a), Element::Percentage(b)) => a.partial_cmp(b),
                (Element::Probability(a), Element::Probability(b)) => a.partial_cmp(b),
                (Element::Symbol(a), Element::Symbol(b)) => Some(a.cmp(b)),
                (Element::Tag(a), Element::Tag(b)) => Some(a.cmp(b)),
                _ => None,
            },
            (Self::String(first), Self::String(second)) => match (first, second) {
                (StringType::Name(a), StringType::Name(b)) => Some(a.cmp(b)),
                (StringType::Quote(a), StringType::Quote(b)) => Some(a.cmp(b)),
                (StringType::Version(a), StringType::Version(b)) => Some(a.cmp(b)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(element) => write!(f, "{element}"),
            Self::String(string) => write!(f, "{string}"),
        }
    }
}

impl From<Element> for Primitive {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<StringType> for Primitive {
    fn from(string: StringType) -> Self {
        Self::String(string)
    }
}

/// Decode the text of a literal token into its value.
pub fn parse(kind: TokenKind, text: &str) -> Result<Primitive, LiteralError> {
    let primitive = match kind {
        TokenKind::Angle => Element::Angle(text.parse()?).into(),
        TokenKind::Boolean => match text {
            "true" => Element::Boolean(true).into(),
            "false" => Element::Boolean(false).into(),
            _ => return Err(LiteralError::new(kind, text, "expected `true` or `false`")),
        },
        TokenKind::Duration => Element::Duration(text.parse()?).into(),
        TokenKind::Moment => Element::Moment(text.parse()?).into(),
        TokenKind::Number => Element::Number(text.parse()?).into(),
        TokenKind::Pattern => Element::Pattern(text.parse()?).into(),
        TokenKind::Percentage => Element::Percentage(text.parse()?).into(),
        TokenKind::Probability => Element::Probability(text.parse()?).into(),
        TokenKind::Resource => Element::Resource(text.parse()?).into(),
        TokenKind::Symbol => Element::Symbol(text.parse()?).into(),
        TokenKind::Tag => Element::Tag(text.parse()?).into(),
        TokenKind::Binary => StringType::Binary(text.parse()?).into(),
        TokenKind::Name => StringType::Name(text.parse()?).into(),
        TokenKind::Narrative => StringType::Narrative(text.parse()?).into(),
        TokenKind::Quote => StringType::Quote(text.parse()?).into(),
        TokenKind::Version => StringType::Version(text.parse()?).into(),
        TokenKind::Eol
        | TokenKind::Eof
        | TokenKind::Error
        | TokenKind::Delimiter
        | TokenKind::Identifier
        | TokenKind::Keyword
        | TokenKind::Comment
        | TokenKind::Note => {
            return Err(LiteralError::new(kind, text, "not a literal token"));
        }
    };
    Ok(primitive)
}

/// Values made of an ordered sequence of items, addressed by ordinal.
///
/// Ordinals start at 1 for the first item; negative ordinals count back from
/// the end, so -1 is the last item. Zero never addresses an item.
pub trait Sequential {
    /// The item type.
    type Item;

    /// All items in order.
    fn items(&self) -> Vec<Self::Item>;

    /// Number of items.
    fn len(&self) -> usize {
        self.items().len()
    }

    /// Whether there are no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The item at an ordinal.
    fn item(&self, ordinal: i64) -> Option<Self::Item> {
        let items = self.items();
        let offset = ordinal_offset(ordinal, items.len())?;
        items.into_iter().nth(offset)
    }

    /// The items from `first` through `last`, both inclusive.
    fn slice(&self, first: i64, last: i64) -> Option<Vec<Self::Item>> {
        let mut items = self.items();
        let start = ordinal_offset(first, items.len())?;
        let end = ordinal_offset(last, items.len())?;
        if start > end {
            return Some(Vec::new());
        }
        items.truncate(end + 1);
        Some(items.split_off(start))
    }
}

fn ordinal_offset(ordinal: i64, len: usize) -> Option<usize> {
    let magnitude = usize::try_from(ordinal.unsigned_abs()).ok()?;
    match ordinal.cmp(&0) {
        Ordering::Greater if magnitude <= len => Some(magnitude - 1),
        Ordering::Less if magnitude <= len => Some(len - magnitude),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primitive(kind: TokenKind, text: &str) -> Primitive {
        parse(kind, text).unwrap()
    }

    #[test]
    fn dispatch_by_kind() {
        assert_eq!(primitive(TokenKind::Boolean, "true").to_string(), "true");
        assert_eq!(primitive(TokenKind::Angle, "~pi").to_string(), "~π");
        assert_eq!(primitive(TokenKind::Version, "v2.1").type_name(), "version");
        assert!(parse(TokenKind::Keyword, "if").is_err());
        assert!(parse(TokenKind::Boolean, "yes").is_err());
    }

    #[test]
    fn families() {
        assert_eq!(primitive(TokenKind::Duration, "~P1D").family(), Some(Family::Interval));
        assert_eq!(primitive(TokenKind::Quote, "\"a\"").family(), Some(Family::Interval));
        assert_eq!(primitive(TokenKind::Quote, "\"ab\"").family(), Some(Family::Spectrum));
        assert_eq!(primitive(TokenKind::Number, "1.5").family(), Some(Family::Continuum));
        assert_eq!(primitive(TokenKind::Number, "2i").family(), None);
        assert_eq!(primitive(TokenKind::Boolean, "false").family(), None);
        assert_eq!(primitive(TokenKind::Pattern, "any").family(), None);
    }

    #[test]
    fn compare_within_a_type() {
        let low = primitive(TokenKind::Number, "1");
        let high = primitive(TokenKind::Number, "100");
        assert_eq!(low.compare(&high), Some(Ordering::Less));
        let quote = primitive(TokenKind::Quote, "\"a\"");
        assert_eq!(low.compare(&quote), None);
    }

    #[test]
    fn ordinals_address_from_both_ends() {
        let quote = Quote::new("abcde");
        assert_eq!(quote.item(1), Some('a'));
        assert_eq!(quote.item(-1), Some('e'));
        assert_eq!(quote.item(0), None);
        assert_eq!(quote.item(6), None);
        assert_eq!(quote.slice(2, -2), Some(vec!['b', 'c', 'd']));
        assert_eq!(quote.slice(4, 2), Some(Vec::new()));
        assert_eq!(quote.len(), 5);
    }
}
