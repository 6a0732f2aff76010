//! Ranges between two primitive endpoints.

use std::cmp::Ordering;
use std::fmt;

use facet::Facet;

use crate::error::TypeError;
use crate::literal::{Family, Primitive};

/// Which endpoints a range includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Facet)]
#[repr(u8)]
pub enum Extent {
    /// `[first..last]`
    #[default]
    Inclusive,
    /// `(first..last]`
    LeftOpen,
    /// `[first..last)`
    RightOpen,
    /// `(first..last)`
    Exclusive,
}

impl Extent {
    /// Build an extent from its bracket characters.
    #[must_use]
    pub const fn from_brackets(open: char, close: char) -> Option<Self> {
        match (open, close) {
            ('[', ']') => Some(Self::Inclusive),
            ('(', ']') => Some(Self::LeftOpen),
            ('[', ')') => Some(Self::RightOpen),
            ('(', ')') => Some(Self::Exclusive),
            _ => None,
        }
    }

    /// The opening bracket.
    #[must_use]
    pub const fn open(self) -> char {
        match self {
            Self::Inclusive | Self::RightOpen => '[',
            Self::LeftOpen | Self::Exclusive => '(',
        }
    }

    /// The closing bracket.
    #[must_use]
    pub const fn close(self) -> char {
        match self {
            Self::Inclusive | Self::LeftOpen => ']',
            Self::RightOpen | Self::Exclusive => ')',
        }
    }

    /// Whether the first endpoint is part of the range.
    #[must_use]
    pub const fn includes_first(self) -> bool {
        matches!(self, Self::Inclusive | Self::RightOpen)
    }

    /// Whether the last endpoint is part of the range.
    #[must_use]
    pub const fn includes_last(self) -> bool {
        matches!(self, Self::Inclusive | Self::LeftOpen)
    }
}

/// A range of ordered values. Both endpoints share a type and family.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    first: Primitive,
    extent: Extent,
    last: Primitive,
    kind: Family,
}

impl Range {
    /// Create a range, checking that the endpoints can bound one.
    pub fn new(first: Primitive, extent: Extent, last: Primitive) -> Result<Self, TypeError> {
        let Some(family) = first.family() else {
            return Err(TypeError::Unordered {
                kind: first.type_name(),
            });
        };
        if first.kind() != last.kind() || last.family() != Some(family) {
            return Err(TypeError::Mismatch {
                first: first.type_name(),
                last: last.type_name(),
            });
        }
        Ok(Self {
            first,
            extent,
            last,
            kind: family,
        })
    }

    /// The first endpoint.
    #[must_use]
    pub const fn first(&self) -> &Primitive {
        &self.first
    }

    /// The last endpoint.
    #[must_use]
    pub const fn last(&self) -> &Primitive {
        &self.last
    }

    /// Which endpoints are included.
    #[must_use]
    pub const fn extent(&self) -> Extent {
        self.extent
    }

    /// The kind of range, chosen by the ordering family of the endpoints.
    #[must_use]
    pub const fn kind(&self) -> Family {
        self.kind
    }

    /// Whether `value` falls within the range. Values of another type never
    /// do.
    #[must_use]
    pub fn contains(&self, value: &Primitive) -> bool {
        let after_first = match value.compare(&self.first) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => self.extent.includes_first(),
            _ => false,
        };
        let before_last = match value.compare(&self.last) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => self.extent.includes_last(),
            _ => false,
        };
        after_first && before_last
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}..{}{}",
            self.extent.open(),
            self.first,
            self.last,
            self.extent.close()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal;
    use crate::token::TokenKind;

    fn primitive(kind: TokenKind, text: &str) -> Primitive {
        literal::parse(kind, text).unwrap()
    }

    #[test]
    fn numeric_range() {
        let range = Range::new(
            primitive(TokenKind::Number, "1"),
            Extent::Inclusive,
            primitive(TokenKind::Number, "100"),
        )
        .unwrap();
        assert_eq!(range.to_string(), "[1..100]");
        assert_eq!(range.kind(), Family::Continuum);
        assert!(range.contains(&primitive(TokenKind::Number, "100")));
        assert!(!range.contains(&primitive(TokenKind::Number, "100.5")));
    }

    #[test]
    fn open_extents() {
        let range = Range::new(
            primitive(TokenKind::Quote, "\"a\""),
            Extent::Exclusive,
            primitive(TokenKind::Quote, "\"z\""),
        )
        .unwrap();
        assert_eq!(range.to_string(), "(\"a\"..\"z\")");
        assert_eq!(range.kind(), Family::Interval);
        assert!(!range.contains(&primitive(TokenKind::Quote, "\"a\"")));
        assert!(range.contains(&primitive(TokenKind::Quote, "\"m\"")));
    }

    #[test]
    fn mismatched_endpoints() {
        let error = Range::new(
            primitive(TokenKind::Duration, "~P1D"),
            Extent::Inclusive,
            primitive(TokenKind::Moment, "<2024>"),
        )
        .unwrap_err();
        assert_eq!(
            error,
            TypeError::Mismatch {
                first: "duration",
                last: "moment"
            }
        );
    }

    #[test]
    fn single_and_multi_character_quotes_do_not_mix() {
        let error = Range::new(
            primitive(TokenKind::Quote, "\"a\""),
            Extent::Inclusive,
            primitive(TokenKind::Quote, "\"abc\""),
        )
        .unwrap_err();
        assert!(matches!(error, TypeError::Mismatch { .. }));
    }

    /// One endpoint of every ordered type, paired with its range kind.
    fn ordered_endpoints() -> Vec<(Primitive, Family)> {
        [
            (TokenKind::Angle, "~π", Family::Continuum),
            (TokenKind::Duration, "~P1D", Family::Interval),
            (TokenKind::Moment, "<2024>", Family::Interval),
            (TokenKind::Number, "5", Family::Continuum),
            (TokenKind::Percentage, "5%", Family::Continuum),
            (TokenKind::Probability, ".5", Family::Continuum),
            (TokenKind::Quote, "\"a\"", Family::Interval),
            (TokenKind::Quote, "\"abc\"", Family::Spectrum),
            (TokenKind::Name, "/a", Family::Spectrum),
            (TokenKind::Symbol, "$a", Family::Spectrum),
            (TokenKind::Tag, "#BCDFG", Family::Spectrum),
            (TokenKind::Version, "v1", Family::Spectrum),
        ]
        .into_iter()
        .map(|(kind, text, family)| (primitive(kind, text), family))
        .collect()
    }

    #[test]
    fn every_pair_of_ordered_types() {
        let endpoints = ordered_endpoints();
        for (i, (first, family)) in endpoints.iter().enumerate() {
            for (j, (last, _)) in endpoints.iter().enumerate() {
                let result = Range::new(first.clone(), Extent::Inclusive, last.clone());
                if i == j {
                    let range = result.unwrap();
                    assert_eq!(range.kind(), *family, "{range}");
                    assert!(range.contains(first), "{range}");
                } else {
                    assert_eq!(
                        result.unwrap_err(),
                        TypeError::Mismatch {
                            first: first.type_name(),
                            last: last.type_name()
                        },
                        "{first}..{last}"
                    );
                }
            }
        }
    }

    #[test]
    fn unordered_endpoints() {
        let error = Range::new(
            primitive(TokenKind::Boolean, "false"),
            Extent::Inclusive,
            primitive(TokenKind::Boolean, "true"),
        )
        .unwrap_err();
        assert_eq!(error, TypeError::Unordered { kind: "boolean" });
    }

    #[test]
    fn extents_from_brackets() {
        assert_eq!(Extent::from_brackets('(', ']'), Some(Extent::LeftOpen));
        assert_eq!(Extent::from_brackets('{', ']'), None);
    }
}
