//! Moments in time, stored as milliseconds since the Unix epoch (UTC).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LiteralError;
use crate::token::TokenKind;

/// Lexical form of a moment.
pub(crate) const PATTERN: &str = r"<-?[0-9]{4,}(?:-[0-9]{2}(?:-[0-9]{2}(?:T[0-9]{2}(?::[0-9]{2}(?::[0-9]{2}(?:\.[0-9]{3})?)?)?)?)?)?>";

static FIELDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^<(-?[0-9]{4,})(?:-([0-9]{2})(?:-([0-9]{2})(?:T([0-9]{2})(?::([0-9]{2})(?::([0-9]{2})(?:\.([0-9]{3}))?)?)?)?)?)?>$",
    )
    .expect("moment pattern is valid")
});

/// A point in time with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Moment(i64);

impl Moment {
    /// Create a moment from milliseconds since the epoch, or `None` when the
    /// value lies outside the representable calendar.
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(|_| Self(millis))
    }

    /// Milliseconds since the epoch.
    #[must_use]
    pub const fn millis(self) -> i64 {
        self.0
    }

    /// The moment as a UTC date and time.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.0)
    }
}

impl FromStr for Moment {
    type Err = LiteralError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let error = |reason: String| LiteralError::new(TokenKind::Moment, text, reason);
        let fields = FIELDS
            .captures(text)
            .ok_or_else(|| error("expected `<YYYY-MM-DDThh:mm:ss.mmm>` or a prefix of it".to_string()))?;

        let year: i32 = fields[1]
            .parse()
            .map_err(|_| error("the year is out of range".to_string()))?;
        let field = |index: usize, default: &'static str| {
            fields.get(index).map_or(default, |matched| matched.as_str())
        };

        // Parse against a leap year so that any day of the month is accepted
        // before the real year is applied.
        let patched = format!(
            "2000-{}-{}T{}:{}:{}.{}",
            field(2, "01"),
            field(3, "01"),
            field(4, "00"),
            field(5, "00"),
            field(6, "00"),
            field(7, "000"),
        );
        let datetime = NaiveDateTime::parse_from_str(&patched, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(|cause| error(format!("not a valid date and time ({cause})")))?
            .with_year(year)
            .ok_or_else(|| error(format!("the date does not exist in year {year}")))?;
        Ok(Self(datetime.and_utc().timestamp_millis()))
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(datetime) = self.to_datetime() else {
            return Err(fmt::Error);
        };

        let year = datetime.year();
        if year < 0 {
            write!(f, "<-{:04}", year.unsigned_abs())?;
        } else {
            write!(f, "<{year:04}")?;
        }

        let millis = datetime.timestamp_subsec_millis();
        let show_millis = millis != 0;
        let show_second = show_millis || datetime.second() != 0;
        let show_minute = show_second || datetime.minute() != 0;
        let show_hour = show_minute || datetime.hour() != 0;
        let show_day = show_hour || datetime.day() != 1;
        let show_month = show_day || datetime.month() != 1;

        if show_month {
            write!(f, "-{:02}", datetime.month())?;
        }
        if show_day {
            write!(f, "-{:02}", datetime.day())?;
        }
        if show_hour {
            write!(f, "T{:02}", datetime.hour())?;
        }
        if show_minute {
            write!(f, ":{:02}", datetime.minute())?;
        }
        if show_second {
            write!(f, ":{:02}", datetime.second())?;
        }
        if show_millis {
            write!(f, ".{millis:03}")?;
        }
        f.write_str(">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixes_of_the_full_form() {
        let day: Moment = "<2024-03-15>".parse().unwrap();
        let full: Moment = "<2024-03-15T00:00:00.000>".parse().unwrap();
        assert_eq!(day, full);
        assert_eq!("<1970>".parse::<Moment>().unwrap().millis(), 0);
        assert_eq!("<1970-01-01T00:00:01.500>".parse::<Moment>().unwrap().millis(), 1_500);
    }

    #[test]
    fn canonical_form_hides_default_fields() {
        let cases = [
            ("<2024-03-15T00:00:00.000>", "<2024-03-15>"),
            ("<2024-01-01>", "<2024>"),
            ("<2024-03>", "<2024-03>"),
            ("<2024-03-15T10:30>", "<2024-03-15T10:30>"),
            ("<2024-03-15T10:30:00.250>", "<2024-03-15T10:30:00.250>"),
        ];
        for (text, canonical) in cases {
            assert_eq!(text.parse::<Moment>().unwrap().to_string(), canonical);
        }
    }

    #[test]
    fn leap_days_follow_the_real_year() {
        assert!("<2024-02-29>".parse::<Moment>().is_ok());
        assert!("<2023-02-29>".parse::<Moment>().is_err());
        assert!("<2024-13-01>".parse::<Moment>().is_err());
    }

    #[test]
    fn years_before_the_common_era() {
        let moment: Moment = "<-0044-03-15>".parse().unwrap();
        assert!(moment.millis() < 0);
        assert_eq!(moment.to_string(), "<-0044-03-15>");
    }

    #[test]
    fn millis_outside_the_calendar() {
        assert_eq!(Moment::from_millis(0).map(Moment::millis), Some(0));
        assert!(Moment::from_millis(i64::MAX).is_none());
    }
}
