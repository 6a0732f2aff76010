//! Real, imaginary and complex numbers, plus percentages.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LiteralError;
use crate::token::TokenKind;

use super::angle::Angle;
use super::real::{self, format_real, parse_real};

/// Lexical form of a number. Complex and polar forms come first so that the
/// leading real of a longer form is never taken on its own.
pub(crate) fn pattern() -> String {
    let real = real::PATTERN;
    format!(
        r"\((?:{real}), ?(?:{real})i\)|\((?:{real})e\^~(?:{real})i\)|(?:{real})i|{real}"
    )
}

/// Lexical form of a percentage.
pub(crate) fn percentage_pattern() -> String {
    format!("(?:{})%", real::PATTERN)
}

static REAL: Lazy<Regex> = Lazy::new(|| super::anchored(real::PATTERN));
static IMAGINARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^({})i$", real::PATTERN)).expect("imaginary pattern is valid")
});
static COMPLEX: Lazy<Regex> = Lazy::new(|| {
    let real = real::PATTERN;
    Regex::new(&format!(r"^\(({real}), ?({real})i\)$")).expect("complex pattern is valid")
});
static POLAR: Lazy<Regex> = Lazy::new(|| {
    let real = real::PATTERN;
    Regex::new(&format!(r"^\(({real})e\^~({real})i\)$")).expect("polar pattern is valid")
});

/// A complex number stored in rectangular form.
///
/// Any undefined part makes the whole number undefined, and an infinite part
/// collapses the number onto the real infinity.
#[derive(Debug, Clone, Copy)]
pub struct Number {
    real: f64,
    imaginary: f64,
}

impl Number {
    /// The undefined number.
    pub const UNDEFINED: Self = Self {
        real: f64::NAN,
        imaginary: 0.0,
    };

    /// Create a number from its rectangular parts.
    #[must_use]
    pub fn new(real: f64, imaginary: f64) -> Self {
        if real.is_nan() || imaginary.is_nan() {
            return Self::UNDEFINED;
        }
        if imaginary.is_infinite() || (real.is_infinite() && imaginary != 0.0) {
            return Self {
                real: f64::INFINITY,
                imaginary: 0.0,
            };
        }
        // Adding zero turns a negative zero into a positive one.
        Self {
            real: real + 0.0,
            imaginary: imaginary + 0.0,
        }
    }

    /// Create a real number.
    #[must_use]
    pub fn real_only(value: f64) -> Self {
        Self::new(value, 0.0)
    }

    /// Create a number from a magnitude and a phase.
    #[must_use]
    pub fn from_polar(magnitude: f64, phase: Angle) -> Self {
        let radians = phase.radians();
        Self::new(magnitude * radians.cos(), magnitude * radians.sin())
    }

    /// The real part.
    #[must_use]
    pub const fn real(&self) -> f64 {
        self.real
    }

    /// The imaginary part.
    #[must_use]
    pub const fn imaginary(&self) -> f64 {
        self.imaginary
    }

    /// Whether the imaginary part is zero.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.imaginary == 0.0
    }

    /// Whether this is the undefined number.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        self.real.is_nan()
    }

    /// Distance from the origin.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.real.hypot(self.imaginary)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        real::same(self.real, other.real) && real::same(self.imaginary, other.imaginary)
    }
}

impl FromStr for Number {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let error = |reason: String| LiteralError::new(TokenKind::Number, text, reason);
        if let Some(parts) = COMPLEX.captures(text) {
            let real = parse_real(&parts[1]).map_err(error)?;
            let imaginary = parse_real(&parts[2]).map_err(error)?;
            return Ok(Self::new(real, imaginary));
        }
        if let Some(parts) = POLAR.captures(text) {
            let magnitude = parse_real(&parts[1]).map_err(error)?;
            let phase = parse_real(&parts[2]).map_err(error)?;
            if !phase.is_finite() {
                return Err(error("the phase of a polar number must be finite".to_string()));
            }
            return Ok(Self::from_polar(magnitude, Angle::new(phase)));
        }
        if let Some(parts) = IMAGINARY.captures(text) {
            let imaginary = parse_real(&parts[1]).map_err(error)?;
            return Ok(Self::new(0.0, imaginary));
        }
        if REAL.is_match(text) {
            return parse_real(text).map(Self::real_only).map_err(error);
        }
        Err(error("not a real, imaginary or complex number".to_string()))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() || self.imaginary == 0.0 {
            f.write_str(&format_real(self.real))
        } else if self.real == 0.0 {
            write!(f, "{}i", format_real(self.imaginary))
        } else {
            write!(
                f,
                "({}, {}i)",
                format_real(self.real),
                format_real(self.imaginary)
            )
        }
    }
}

/// A real number written with a trailing `%`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Percentage {
    /// Create a percentage. Undefined values are rejected.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (!value.is_nan()).then_some(Self(value + 0.0))
    }

    /// The percentage value, so `50%` is `50.0`.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for Percentage {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let error = |reason: String| LiteralError::new(TokenKind::Percentage, text, reason);
        let real = text
            .strip_suffix('%')
            .ok_or_else(|| error("missing `%` suffix".to_string()))?;
        let value = parse_real(real).map_err(error)?;
        Self::new(value).ok_or_else(|| error("a percentage must be defined".to_string()))
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", format_real(self.0))
    }
}
