//! Probabilities in `[0, 1]`, written without a leading zero.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LiteralError;
use crate::token::TokenKind;

/// Lexical form of a probability. The scanner refuses `1.` when it is
/// followed by another `.` or a digit so that `1..5` stays a range.
pub(crate) const PATTERN: &str = r"\.[0-9]+|1\.";

static PROBABILITY: Lazy<Regex> = Lazy::new(|| super::anchored(PATTERN));

/// A probability.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    /// Certainty.
    pub const CERTAIN: Self = Self(1.0);
    /// Impossibility.
    pub const IMPOSSIBLE: Self = Self(0.0);

    /// Create a probability, or `None` when `value` is outside `[0, 1]`.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (0.0..=1.0).contains(&value).then_some(Self(value + 0.0))
    }

    /// The probability value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for Probability {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let error = |reason: &str| LiteralError::new(TokenKind::Probability, text, reason);
        if !PROBABILITY.is_match(text) {
            return Err(error("expected `.digits` or `1.`"));
        }
        if text == "1." {
            return Ok(Self::CERTAIN);
        }
        format!("0{text}")
            .parse::<f64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| error("not a probability"))
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 1.0 {
            return f.write_str("1.");
        }
        if self.0 == 0.0 {
            return f.write_str(".0");
        }
        let decimal = self.0.to_string();
        f.write_str(decimal.strip_prefix('0').unwrap_or(&decimal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_forms() {
        for text in [".0", "1.", ".5", ".25", ".001"] {
            assert_eq!(text.parse::<Probability>().unwrap().to_string(), text);
        }
        assert_eq!(".50".parse::<Probability>().unwrap().to_string(), ".5");
        assert_eq!(".000".parse::<Probability>().unwrap().to_string(), ".0");
    }

    #[test]
    fn bounds_are_enforced() {
        assert!(Probability::new(1.5).is_none());
        assert!(Probability::new(-0.1).is_none());
        assert!(Probability::new(f64::NAN).is_none());
        assert_eq!(Probability::new(0.75).unwrap().to_string(), ".75");
    }

    #[test]
    fn rejects_other_spellings() {
        assert!("0.5".parse::<Probability>().is_err());
        assert!("1.0".parse::<Probability>().is_err());
        assert!("1".parse::<Probability>().is_err());
    }
}
