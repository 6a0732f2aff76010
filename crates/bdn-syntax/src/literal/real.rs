//! Real-number spelling shared by angles, numbers and percentages.

use std::f64::consts::{E, PI, TAU};

use once_cell::sync::Lazy;
use regex::Regex;

/// The golden ratio.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Lexical form of a real, including the named constants.
pub(crate) const PATTERN: &str = r"-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:E[+-]?[0-9]+)?|-?(?:e|π|pi|φ|phi|τ|tau)|-?(?:∞|infinity)|undefined";

/// Named constants and the symbols they format as.
const CONSTANTS: [(f64, &str); 4] = [(E, "e"), (PI, "π"), (PHI, "φ"), (TAU, "τ")];

static DECIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:E[+-]?[0-9]+)?$")
        .expect("decimal pattern is valid")
});

/// Decode the text of a real, accepting both word and symbol spellings of the
/// named constants.
pub(crate) fn parse_real(text: &str) -> Result<f64, String> {
    let value = match text {
        "e" => E,
        "-e" => -E,
        "π" | "pi" => PI,
        "-π" | "-pi" => -PI,
        "φ" | "phi" => PHI,
        "-φ" | "-phi" => -PHI,
        "τ" | "tau" => TAU,
        "-τ" | "-tau" => -TAU,
        "∞" | "infinity" => f64::INFINITY,
        "-∞" | "-infinity" => f64::NEG_INFINITY,
        "undefined" => f64::NAN,
        _ if DECIMAL.is_match(text) => text
            .parse::<f64>()
            .map_err(|error| format!("not a real number ({error})"))?,
        _ => return Err("not a real number".to_string()),
    };
    Ok(value)
}

/// Encode a real in canonical form: constants by symbol, everything else as
/// the shortest decimal that reads back to the same value.
pub(crate) fn format_real(value: f64) -> String {
    if value.is_nan() {
        return "undefined".to_string();
    }
    if value == f64::INFINITY {
        return "∞".to_string();
    }
    if value == f64::NEG_INFINITY {
        return "-∞".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    CONSTANTS
        .iter()
        .find(|(constant, _)| *constant == magnitude)
        .map_or_else(|| format!("{value}"), |(_, symbol)| format!("{sign}{symbol}"))
}

/// Equality that treats two undefined values as the same value.
pub(crate) fn same(first: f64, second: f64) -> bool {
    first == second || (first.is_nan() && second.is_nan())
}
