//! Leaf coercions: how one piece of environment text becomes a field value.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use chrono::{DateTime, FixedOffset, Local, TimeDelta, Utc};

use crate::{bind::Bind, duration::parse_duration, error::ParseError};

/// `std::any::type_name` with module paths stripped: `Vec<String>`, not
/// `alloc::vec::Vec<alloc::string::String>`
pub(crate) fn type_name_of<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut word = String::new();
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            word.clear();
        } else if c.is_alphanumeric() || c == '_' {
            word.push(c);
        } else {
            out.push_str(&word);
            word.clear();
            out.push(c);
        }
    }
    out.push_str(&word);
    out
}

impl Bind for String {
    fn from_env_text(text: &str) -> Result<Self, ParseError> {
        Ok(text.to_string())
    }
}

impl Bind for PathBuf {
    fn from_env_text(text: &str) -> Result<Self, ParseError> {
        Ok(PathBuf::from(text))
    }
}

impl Bind for bool {
    fn from_env_text(text: &str) -> Result<Self, ParseError> {
        match text {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(ParseError::Bool),
        }
    }
}

impl Bind for char {
    fn from_env_text(text: &str) -> Result<Self, ParseError> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ParseError::Char),
        }
    }
}

macro_rules! int_leaf {
    ($($t:ty),* $(,)?) => {
        $(
            impl Bind for $t {
                fn from_env_text(text: &str) -> Result<Self, ParseError> {
                    Ok(text.parse::<$t>()?)
                }
            }
        )*
    };
}

int_leaf!(i8, i16, i32, i64, i128, isize);

macro_rules! uint_leaf {
    ($($t:ty),* $(,)?) => {
        $(
            impl Bind for $t {
                fn from_env_text(text: &str) -> Result<Self, ParseError> {
                    if text.starts_with('+') {
                        return Err(ParseError::UnsignedSign);
                    }
                    Ok(text.parse::<$t>()?)
                }
            }
        )*
    };
}

uint_leaf!(u8, u16, u32, u64, u128, usize);

/// Whether `text` spells infinity explicitly rather than overflowing to it
fn names_infinity(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

macro_rules! float_leaf {
    ($($t:ty),* $(,)?) => {
        $(
            impl Bind for $t {
                fn from_env_text(text: &str) -> Result<Self, ParseError> {
                    let value = text.parse::<$t>()?;
                    if value.is_infinite() && !names_infinity(text) {
                        return Err(ParseError::FloatOutOfRange {
                            type_name: stringify!($t),
                        });
                    }
                    Ok(value)
                }
            }
        )*
    };
}

float_leaf!(f32, f64);

macro_rules! from_str_leaf {
    ($($t:ty),* $(,)?) => {
        $(
            impl Bind for $t {
                fn from_env_text(text: &str) -> Result<Self, ParseError> {
                    Ok(text.parse::<$t>()?)
                }
            }
        )*
    };
}

from_str_leaf!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

impl Bind for Duration {
    fn from_env_text(text: &str) -> Result<Self, ParseError> {
        let parsed = parse_duration(text)?;
        if parsed.negative && parsed.nanos != 0 {
            return Err(ParseError::NegativeDuration);
        }
        Ok(Duration::from_nanos(parsed.nanos))
    }
}

impl Bind for TimeDelta {
    fn from_env_text(text: &str) -> Result<Self, ParseError> {
        let parsed = parse_duration(text)?;
        Ok(TimeDelta::nanoseconds(parsed.as_nanos_i64()))
    }
}

impl Bind for DateTime<FixedOffset> {
    fn from_env_text(text: &str) -> Result<Self, ParseError> {
        Ok(DateTime::parse_from_rfc3339(text)?)
    }
}

impl Bind for DateTime<Utc> {
    fn from_env_text(text: &str) -> Result<Self, ParseError> {
        Ok(DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc))
    }
}

impl Bind for DateTime<Local> {
    fn from_env_text(text: &str) -> Result<Self, ParseError> {
        Ok(DateTime::parse_from_rfc3339(text)?.with_timezone(&Local))
    }
}

/// Comma-separated list; segments are trimmed and empty ones dropped
impl<T: Bind> Bind for Vec<T> {
    fn from_env_text(text: &str) -> Result<Self, ParseError> {
        text.split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(T::from_env_text)
            .collect()
    }
}

// Maps have no textual form; tagging one fails once its variable is set.
impl<K, V, S> Bind for HashMap<K, V, S> {}

impl<K, V> Bind for BTreeMap<K, V> {}

impl<T, S> Bind for HashSet<T, S> {}

impl<T> Bind for BTreeSet<T> {}

impl<T> Bind for VecDeque<T> {}

impl<T> Bind for Box<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_type_name_of() {
        assert_eq!(type_name_of::<String>(), "String");
        assert_eq!(type_name_of::<Vec<Option<u16>>>(), "Vec<Option<u16>>");
        assert_eq!(type_name_of::<DateTime<Utc>>(), "DateTime<Utc>");
    }

    #[test]
    fn test_string_verbatim() {
        assert_eq!(String::from_env_text("  spaced , text ").unwrap(), "  spaced , text ");
        assert_eq!(String::from_env_text("").unwrap(), "");
    }

    #[test]
    fn test_bool_tokens() {
        for token in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(bool::from_env_text(token).unwrap(), "{token}");
        }
        for token in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!bool::from_env_text(token).unwrap(), "{token}");
        }
        for token in ["yes", "no", "on", "tRUE", " true", ""] {
            assert_eq!(bool::from_env_text(token), Err(ParseError::Bool), "{token}");
        }
    }

    #[test]
    fn test_integers_range_checked() {
        assert_eq!(u8::from_env_text("255").unwrap(), 255);
        assert!(matches!(u8::from_env_text("256"), Err(ParseError::Int(_))));
        assert_eq!(i8::from_env_text("-128").unwrap(), -128);
        assert!(matches!(i8::from_env_text("-129"), Err(ParseError::Int(_))));
        assert!(matches!(u32::from_env_text("-1"), Err(ParseError::Int(_))));
        assert!(matches!(i64::from_env_text("12a"), Err(ParseError::Int(_))));
        assert!(matches!(i64::from_env_text("0x10"), Err(ParseError::Int(_))));
        assert_eq!(i64::from_env_text("+42").unwrap(), 42);
    }

    #[test]
    fn test_unsigned_rejects_sign() {
        assert_eq!(u32::from_env_text("+5"), Err(ParseError::UnsignedSign));
        assert_eq!(u8::from_env_text("+0"), Err(ParseError::UnsignedSign));
        assert_eq!(u32::from_env_text("5").unwrap(), 5);
    }

    #[test]
    fn test_floats() {
        assert_eq!(f64::from_env_text("1.5").unwrap(), 1.5);
        assert_eq!(f64::from_env_text("2e3").unwrap(), 2000.0);
        assert_eq!(f32::from_env_text("-0.25").unwrap(), -0.25);
        assert!(f64::from_env_text("inf").unwrap().is_infinite());
        assert!(f64::from_env_text("NaN").unwrap().is_nan());
        assert!(matches!(f64::from_env_text("1.2.3"), Err(ParseError::Float(_))));
    }

    #[test]
    fn test_float_overflow_rejected() {
        assert_eq!(
            f32::from_env_text("1e39"),
            Err(ParseError::FloatOutOfRange { type_name: "f32" })
        );
        assert_eq!(f64::from_env_text("1e39").unwrap(), 1e39);
        assert_eq!(
            f64::from_env_text("-1e400"),
            Err(ParseError::FloatOutOfRange { type_name: "f64" })
        );
    }

    #[test]
    fn test_char() {
        assert_eq!(char::from_env_text("x").unwrap(), 'x');
        assert_eq!(char::from_env_text("é").unwrap(), 'é');
        assert_eq!(char::from_env_text("xy"), Err(ParseError::Char));
        assert_eq!(char::from_env_text(""), Err(ParseError::Char));
    }

    #[test]
    fn test_addresses() {
        assert_eq!(
            IpAddr::from_env_text("127.0.0.1").unwrap(),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
        assert_eq!(
            SocketAddr::from_env_text("[::1]:8080").unwrap().port(),
            8080
        );
        assert!(matches!(Ipv4Addr::from_env_text("300.0.0.1"), Err(ParseError::Addr(_))));
    }

    #[test]
    fn test_durations() {
        assert_eq!(Duration::from_env_text("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(Duration::from_env_text("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(Duration::from_env_text("0s").unwrap(), Duration::ZERO);
        assert!(matches!(
            Duration::from_env_text("5 seconds"),
            Err(ParseError::Duration(_))
        ));
        assert_eq!(
            Duration::from_env_text("-5s"),
            Err(ParseError::NegativeDuration)
        );
    }

    #[test]
    fn test_signed_durations() {
        assert_eq!(TimeDelta::from_env_text("-1m30s").unwrap(), TimeDelta::seconds(-90));
        assert_eq!(TimeDelta::from_env_text("2h").unwrap(), TimeDelta::hours(2));
    }

    #[test]
    fn test_timestamps() {
        let utc = DateTime::<Utc>::from_env_text("2024-03-01T12:30:00+02:00").unwrap();
        assert_eq!(utc.hour(), 10);
        assert_eq!(utc.day(), 1);

        let fixed = DateTime::<FixedOffset>::from_env_text("2024-03-01T12:30:00+02:00").unwrap();
        assert_eq!(fixed.offset().local_minus_utc(), 7200);

        assert!(matches!(
            DateTime::<Utc>::from_env_text("2024-03-01"),
            Err(ParseError::Timestamp(_))
        ));
    }

    #[test]
    fn test_lists() {
        assert_eq!(Vec::<i32>::from_env_text("1, 2 ,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(Vec::<i32>::from_env_text("").unwrap(), Vec::<i32>::new());
        assert_eq!(Vec::<i32>::from_env_text(" , ,").unwrap(), Vec::<i32>::new());
        assert_eq!(Vec::<u8>::from_env_text("1,1,1").unwrap(), vec![1, 1, 1]);
        assert_eq!(
            Vec::<String>::from_env_text("b, a").unwrap(),
            vec!["b".to_string(), "a".to_string()]
        );
        assert!(matches!(
            Vec::<i32>::from_env_text("1,x,3"),
            Err(ParseError::Int(_))
        ));
    }

    #[test]
    fn test_list_of_durations() {
        assert_eq!(
            Vec::<Duration>::from_env_text("1s, 250ms").unwrap(),
            vec![Duration::from_secs(1), Duration::from_millis(250)]
        );
    }

    #[test]
    fn test_option_wraps_inner() {
        assert_eq!(Option::<u16>::from_env_text("80").unwrap(), Some(80));
        assert!(Option::<u16>::from_env_text("eighty").is_err());
    }

    #[test]
    fn test_maps_unsupported() {
        match HashMap::<String, String>::from_env_text("a=b") {
            Err(ParseError::Unsupported { type_name }) => assert!(type_name.starts_with("HashMap<")),
            other => panic!("expected Unsupported, got {:?}", other),
        }
        assert!(matches!(
            BTreeMap::<String, u8>::from_env_text(""),
            Err(ParseError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_sets_and_boxes_unsupported() {
        assert!(matches!(
            HashSet::<String>::from_env_text("a,b"),
            Err(ParseError::Unsupported { .. })
        ));
        assert!(matches!(
            BTreeSet::<u8>::from_env_text("1"),
            Err(ParseError::Unsupported { .. })
        ));
        assert!(matches!(
            VecDeque::<u8>::from_env_text("1"),
            Err(ParseError::Unsupported { .. })
        ));
        assert!(matches!(
            Box::<u8>::from_env_text("1"),
            Err(ParseError::Unsupported { .. })
        ));
    }
}
