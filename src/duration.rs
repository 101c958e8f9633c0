//! Compound duration grammar: `[-+]?([0-9]*(\.[0-9]*)?unit)+`, e.g. `5s`,
//! `150ms`, `1h30m`, `-1.5h`.
//!
//! Units are `ns`, `us` (`µs`, `μs`), `ms`, `s`, `m`, `h`. A bare `0` is the
//! only unit-less value accepted. The magnitude must fit in an `i64` count of
//! nanoseconds.

use std::fmt;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Largest magnitude accepted; `i64::MIN` nanoseconds for negative input
const MAX_MAGNITUDE: u64 = 1 << 63;

/// Why a duration string was rejected. The offending text is not included.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("expected a number")]
    MissingNumber,
    #[error("missing unit in duration")]
    MissingUnit,
    #[error("unknown unit in duration (expected ns, us, ms, s, m or h)")]
    UnknownUnit,
    #[error("duration out of range")]
    Overflow,
}

/// A parsed duration: sign plus magnitude in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDuration {
    pub negative: bool,
    pub nanos: u64,
}

impl ParsedDuration {
    /// Signed nanosecond count
    pub fn as_nanos_i64(&self) -> i64 {
        if self.negative {
            // MAX_MAGNITUDE maps onto i64::MIN exactly
            (self.nanos as i64).wrapping_neg()
        } else {
            self.nanos as i64
        }
    }
}

impl fmt::Display for ParsedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative && self.nanos != 0 { "-" } else { "" };
        write!(f, "{}{}ns", sign, self.nanos)
    }
}

fn unit_scale(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "µs" | "μs" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Split the leading run of ASCII digits off `s`
fn take_digits(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Parse a compound duration string
pub fn parse_duration(text: &str) -> Result<ParsedDuration, DurationError> {
    let mut rest = text;
    let mut negative = false;

    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok(ParsedDuration { negative, nanos: 0 });
    }
    if rest.is_empty() {
        return Err(DurationError::Empty);
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        let (whole, after_whole) = take_digits(rest);
        let (fraction, after_number) = match after_whole.strip_prefix('.') {
            Some(after_dot) => take_digits(after_dot),
            None => ("", after_whole),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(DurationError::MissingNumber);
        }

        let unit_end = after_number
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after_number.len());
        let (unit, remaining) = after_number.split_at(unit_end);
        if unit.is_empty() {
            return Err(DurationError::MissingUnit);
        }
        let scale = unit_scale(unit).ok_or(DurationError::UnknownUnit)?;

        let mut segment = whole_nanos(whole, scale)?;
        segment = segment
            .checked_add(fraction_nanos(fraction, scale))
            .ok_or(DurationError::Overflow)?;
        total = total.checked_add(segment).ok_or(DurationError::Overflow)?;
        if total > MAX_MAGNITUDE {
            return Err(DurationError::Overflow);
        }

        rest = remaining;
    }

    if !negative && total == MAX_MAGNITUDE {
        return Err(DurationError::Overflow);
    }

    Ok(ParsedDuration {
        negative,
        nanos: total,
    })
}

fn whole_nanos(digits: &str, scale: u64) -> Result<u64, DurationError> {
    let mut value: u64 = 0;
    for digit in digits.bytes() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(digit - b'0')))
            .filter(|v| *v <= MAX_MAGNITUDE)
            .ok_or(DurationError::Overflow)?;
    }
    value
        .checked_mul(scale)
        .filter(|v| *v <= MAX_MAGNITUDE)
        .ok_or(DurationError::Overflow)
}

/// Fractional part scaled to the unit, truncated toward zero
fn fraction_nanos(digits: &str, scale: u64) -> u64 {
    let mut numerator: u64 = 0;
    let mut denominator: u64 = 1;
    for digit in digits.bytes() {
        // Digits beyond nanosecond precision cannot change the result
        if denominator > u64::MAX / 10 || numerator > u64::MAX / 10 {
            break;
        }
        numerator = numerator * 10 + u64::from(digit - b'0');
        denominator *= 10;
    }
    ((u128::from(numerator) * u128::from(scale)) / u128::from(denominator)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nanos(text: &str) -> i64 {
        parse_duration(text).unwrap().as_nanos_i64()
    }

    #[test]
    fn test_simple_units() {
        assert_eq!(nanos("5s"), 5 * SECOND as i64);
        assert_eq!(nanos("150ms"), 150 * MILLISECOND as i64);
        assert_eq!(nanos("3us"), 3_000);
        assert_eq!(nanos("3µs"), 3_000);
        assert_eq!(nanos("3μs"), 3_000);
        assert_eq!(nanos("7ns"), 7);
        assert_eq!(nanos("2m"), 120 * SECOND as i64);
        assert_eq!(nanos("1h"), 3_600 * SECOND as i64);
    }

    #[test]
    fn test_compound() {
        assert_eq!(nanos("1h30m"), 90 * MINUTE as i64);
        assert_eq!(nanos("1m0.5s"), 60_500 * MILLISECOND as i64);
    }

    #[test]
    fn test_fractions() {
        assert_eq!(nanos("1.5h"), 90 * MINUTE as i64);
        assert_eq!(nanos(".5s"), 500 * MILLISECOND as i64);
        assert_eq!(nanos("1.s"), SECOND as i64);
        assert_eq!(nanos("0.000000001s"), 1);
        assert_eq!(nanos("0.0000000019s"), 1);
    }

    #[test]
    fn test_signs() {
        assert_eq!(nanos("-5s"), -5 * SECOND as i64);
        assert_eq!(nanos("+5s"), 5 * SECOND as i64);
        assert!(parse_duration("-5s").unwrap().negative);
    }

    #[test]
    fn test_zero() {
        assert_eq!(nanos("0"), 0);
        assert_eq!(nanos("0s"), 0);
        assert_eq!(nanos("-0"), 0);
    }

    #[test]
    fn test_rejects_spelled_out_units() {
        assert_eq!(
            parse_duration("5 seconds"),
            Err(DurationError::UnknownUnit)
        );
    }

    #[test]
    fn test_rejects_missing_unit() {
        assert_eq!(parse_duration("5"), Err(DurationError::MissingUnit));
        assert_eq!(parse_duration("1h5"), Err(DurationError::MissingUnit));
    }

    #[test]
    fn test_rejects_missing_number() {
        assert_eq!(parse_duration("s"), Err(DurationError::MissingNumber));
        assert_eq!(parse_duration(".s"), Err(DurationError::MissingNumber));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(parse_duration(""), Err(DurationError::Empty));
        assert_eq!(parse_duration("-"), Err(DurationError::Empty));
    }

    #[test]
    fn test_overflow() {
        assert_eq!(parse_duration("9223372036854775807ns").unwrap().nanos, i64::MAX as u64);
        assert_eq!(
            parse_duration("9223372036854775808ns"),
            Err(DurationError::Overflow)
        );
        assert_eq!(nanos("-9223372036854775808ns"), i64::MIN);
        assert_eq!(parse_duration("3000000h"), Err(DurationError::Overflow));
    }

    #[test]
    fn test_display() {
        assert_eq!(parse_duration("-2us").unwrap().to_string(), "-2000ns");
    }
}
