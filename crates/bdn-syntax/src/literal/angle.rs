//! Angles, normalised into `[0, 2π)` with phase locking.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::str::FromStr;

use crate::error::LiteralError;
use crate::token::TokenKind;

use super::real::{format_real, parse_real};

/// Lexical form of an angle.
pub(crate) fn pattern() -> String {
    format!("~(?:{})", super::real::PATTERN)
}

/// An angle in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Angle(f64);

impl Angle {
    /// The zero angle.
    pub const ZERO: Self = Self(0.0);
    /// The straight angle, π radians.
    pub const PI: Self = Self(PI);

    /// Create an angle, normalising it into `[0, 2π)`.
    ///
    /// Values that differ from a quarter-turn multiple by no more than `f32`
    /// precision snap onto it exactly, so `~τ` is stored as `0` and
    /// rounding noise around `π/2` does not leak into the canonical text.
    #[must_use]
    pub fn new(radians: f64) -> Self {
        Self(lock_phase(radians))
    }

    /// The angle in radians.
    #[must_use]
    pub const fn radians(self) -> f64 {
        self.0
    }
}

#[allow(clippy::cast_possible_truncation)]
fn lock_phase(radians: f64) -> f64 {
    let normalized = radians.rem_euclid(TAU);
    let anchors = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2, TAU];
    for anchor in anchors {
        if normalized as f32 == anchor as f32 {
            return if anchor == TAU { 0.0 } else { anchor };
        }
    }
    normalized
}

impl FromStr for Angle {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let error = |reason: String| LiteralError::new(TokenKind::Angle, text, reason);
        let real = text
            .strip_prefix('~')
            .ok_or_else(|| error("missing `~` prefix".to_string()))?;
        let radians = parse_real(real).map_err(error)?;
        if !radians.is_finite() {
            return Err(error("an angle must be finite".to_string()));
        }
        Ok(Self::new(radians))
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{}", format_real(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_into_one_turn() {
        assert_eq!(Angle::new(TAU).radians(), 0.0);
        assert_eq!(Angle::new(-PI).radians(), PI);
        assert_eq!(Angle::new(5.0 * PI).radians(), PI);
    }

    #[test]
    fn phase_locks_near_quarter_turns() {
        let noisy = FRAC_PI_2 + 1e-12;
        assert_eq!(Angle::new(noisy).radians(), FRAC_PI_2);
        assert_eq!(Angle::new(TAU - 1e-12).radians(), 0.0);
        assert_eq!(Angle::new(1.0).radians(), 1.0);
    }

    #[test]
    fn round_trips_constant_spelling() {
        let angle: Angle = "~pi".parse().unwrap();
        assert_eq!(angle.to_string(), "~π");
        assert_eq!("~τ".parse::<Angle>().unwrap().to_string(), "~0");
        assert_eq!("~1.25".parse::<Angle>().unwrap().to_string(), "~1.25");
    }

    #[test]
    fn rejects_infinite_angles() {
        assert!("~∞".parse::<Angle>().is_err());
        assert!("π".parse::<Angle>().is_err());
    }
}
