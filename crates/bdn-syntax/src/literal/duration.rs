//! Durations, stored as signed milliseconds.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LiteralError;
use crate::token::TokenKind;

/// Lexical form of a duration.
pub(crate) const PATTERN: &str = r"~-?P(?:[0-9]+W|(?:[0-9]+Y)?(?:[0-9]+M)?(?:[0-9]+D)?(?:T(?:[0-9]+H)?(?:[0-9]+M)?(?:[0-9]+(?:\.[0-9]+)?S)?)?)";

static DURATION: Lazy<Regex> = Lazy::new(|| super::anchored(PATTERN));

const SECOND: i64 = 1_000;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
// Average Gregorian month and year.
const MONTH: i64 = 2_629_746_000;
const YEAR: i64 = 31_556_952_000;

/// A span of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(i64);

impl Duration {
    /// The empty duration.
    pub const ZERO: Self = Self(0);

    /// Create a duration from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// The duration in milliseconds.
    #[must_use]
    pub const fn millis(self) -> i64 {
        self.0
    }

    /// Whether the duration runs backwards.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl From<Duration> for std::time::Duration {
    fn from(duration: Duration) -> Self {
        Self::from_millis(duration.0.unsigned_abs())
    }
}

impl FromStr for Duration {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let error = |reason: &str| LiteralError::new(TokenKind::Duration, text, reason);
        if !DURATION.is_match(text) {
            return Err(error("expected an ISO 8601 duration such as `~P3DT4H`"));
        }

        let body = &text[1..];
        let (negative, body) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        let body = body.strip_prefix('P').unwrap_or(body);

        let overflow = || error("duration is too long");
        let mut total: i64 = 0;
        let mut amount = String::new();
        let mut time = false;
        let mut units = 0;
        for ch in body.chars() {
            if ch.is_ascii_digit() || ch == '.' {
                amount.push(ch);
                continue;
            }
            let unit = match ch {
                'T' => {
                    time = true;
                    continue;
                }
                'W' => WEEK,
                'Y' => YEAR,
                'M' if time => MINUTE,
                'M' => MONTH,
                'D' => DAY,
                'H' => HOUR,
                'S' => SECOND,
                _ => return Err(error("unknown duration unit")),
            };
            let millis = if ch == 'S' {
                seconds_to_millis(&amount).ok_or_else(overflow)?
            } else {
                amount
                    .parse::<i64>()
                    .ok()
                    .and_then(|count| count.checked_mul(unit))
                    .ok_or_else(overflow)?
            };
            total = total.checked_add(millis).ok_or_else(overflow)?;
            amount.clear();
            units += 1;
        }

        if units == 0 {
            return Err(error("a duration needs at least one unit"));
        }
        if time && body.ends_with('T') {
            return Err(error("the time section is empty"));
        }
        Ok(Self(if negative { -total } else { total }))
    }
}

fn seconds_to_millis(amount: &str) -> Option<i64> {
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let whole = whole.parse::<i64>().ok()?.checked_mul(SECOND)?;
    let mut digits: String = fraction.chars().take(3).collect();
    while digits.len() < 3 {
        digits.push('0');
    }
    whole.checked_add(digits.parse::<i64>().ok()?)
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = i128::from(self.0).unsigned_abs();
        let week = u128::from(WEEK.unsigned_abs());
        if magnitude % week == 0 {
            return write!(f, "~{sign}P{}W", magnitude / week);
        }

        let mut rest = magnitude;
        let mut take = |unit: i64| {
            let unit = u128::from(unit.unsigned_abs());
            let count = rest / unit;
            rest %= unit;
            count
        };
        let years = take(YEAR);
        let months = take(MONTH);
        let days = take(DAY);
        let hours = take(HOUR);
        let minutes = take(MINUTE);
        let seconds = take(SECOND);
        let millis = rest;

        write!(f, "~{sign}P")?;
        for (count, unit) in [(years, 'Y'), (months, 'M'), (days, 'D')] {
            if count > 0 {
                write!(f, "{count}{unit}")?;
            }
        }
        if hours == 0 && minutes == 0 && seconds == 0 && millis == 0 {
            return Ok(());
        }
        f.write_str("T")?;
        for (count, unit) in [(hours, 'H'), (minutes, 'M')] {
            if count > 0 {
                write!(f, "{count}{unit}")?;
            }
        }
        if millis > 0 {
            let fraction = format!("{millis:03}");
            write!(f, "{seconds}.{}S", fraction.trim_end_matches('0'))
        } else if seconds > 0 {
            write!(f, "{seconds}S")
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(text: &str) -> i64 {
        text.parse::<Duration>().unwrap().millis()
    }

    #[test]
    fn calendar_and_clock_units() {
        assert_eq!(millis("~P3D"), 3 * DAY);
        assert_eq!(millis("~P1M"), MONTH);
        assert_eq!(millis("~PT1M"), MINUTE);
        assert_eq!(millis("~P1Y2M3DT4H5M6.5S"), YEAR + 2 * MONTH + 3 * DAY + 4 * HOUR + 5 * MINUTE + 6_500);
        assert_eq!(millis("~-P2W"), -2 * WEEK);
        assert_eq!(millis("~PT0.25S"), 250);
    }

    #[test]
    fn canonical_forms() {
        let cases = [
            ("~P14D", "~P2W"),
            ("~P0D", "~P0W"),
            ("~PT0S", "~P0W"),
            ("~P3D", "~P3D"),
            ("~PT36H", "~P1DT12H"),
            ("~PT1.50S", "~PT1.5S"),
            ("~-P3D", "~-P3D"),
            ("~P1Y", "~P1Y"),
        ];
        for (text, canonical) in cases {
            assert_eq!(text.parse::<Duration>().unwrap().to_string(), canonical, "{text}");
        }
    }

    #[test]
    fn rejects_malformed_durations() {
        assert!("~P".parse::<Duration>().is_err());
        assert!("~P1DT".parse::<Duration>().is_err());
        assert!("P3D".parse::<Duration>().is_err());
        assert!("~P3X".parse::<Duration>().is_err());
        assert!("~P99999999999999999999D".parse::<Duration>().is_err());
    }
}
