/// Custom GraphQL scalar types used by converted columns
///
/// Dates and times are ISO 8601 strings checked with chrono. `BigInt` and
/// `Decimal` accept numbers or numeric strings, decimals parsed exactly with
/// rust_decimal. `UUID` accepts any text form the uuid crate parses, `JSON` any
/// value.

use crate::mapper::scalars::{BIG_INT, DATE, DATE_TIME, DECIMAL, INTERVAL, JSON, TIME, UUID};

use async_graphql::dynamic::Scalar;
use async_graphql::Value;
use chrono::{DateTime as ChronoDateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Every custom scalar, ready to register in the schema builder
pub fn register_custom_scalars() -> Vec<Scalar> {
    vec![
        big_int_scalar(),
        decimal_scalar(),
        date_scalar(),
        datetime_scalar(),
        time_scalar(),
        interval_scalar(),
        uuid_scalar(),
        json_scalar(),
    ]
}

/// ISO 8601 date (YYYY-MM-DD)
pub fn is_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// RFC 3339 datetime, or a naive `YYYY-MM-DDTHH:MM:SS[.f]`
pub fn is_datetime(s: &str) -> bool {
    ChronoDateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").is_ok()
}

/// `HH:MM[:SS[.f]]`
pub fn is_time(s: &str) -> bool {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f").is_ok() || NaiveTime::parse_from_str(s, "%H:%M").is_ok()
}

/// UUID text, hyphenated or simple
pub fn is_uuid(s: &str) -> bool {
    uuid::Uuid::parse_str(s).is_ok()
}

/// Exact decimal text such as `-12.50`
pub fn is_decimal(s: &str) -> bool {
    Decimal::from_str(s).is_ok()
}

pub fn is_integer_string(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn big_int_scalar() -> Scalar {
    Scalar::new(BIG_INT)
        .description("Integer that may exceed 32 bits, as a number or a numeric string")
        .validator(|value| match value {
            Value::Number(n) => n.is_i64() || n.is_u64(),
            Value::String(s) => is_integer_string(s),
            _ => false,
        })
}

fn decimal_scalar() -> Scalar {
    Scalar::new(DECIMAL)
        .description("Arbitrary precision decimal, as a number or a numeric string")
        .validator(|value| match value {
            Value::Number(_) => true,
            Value::String(s) => is_decimal(s),
            _ => false,
        })
}

fn date_scalar() -> Scalar {
    Scalar::new(DATE)
        .description("ISO 8601 date format (YYYY-MM-DD)")
        .validator(|value| matches!(value, Value::String(s) if is_date(s)))
}

fn datetime_scalar() -> Scalar {
    Scalar::new(DATE_TIME)
        .description("ISO 8601 datetime format")
        .validator(|value| matches!(value, Value::String(s) if is_datetime(s)))
}

fn time_scalar() -> Scalar {
    Scalar::new(TIME)
        .description("ISO 8601 time of day (HH:MM:SS)")
        .validator(|value| matches!(value, Value::String(s) if is_time(s)))
}

fn interval_scalar() -> Scalar {
    Scalar::new(INTERVAL)
        .description("Duration, as ISO 8601 text or a number of seconds")
        .validator(|value| matches!(value, Value::String(_) | Value::Number(_)))
}

fn uuid_scalar() -> Scalar {
    Scalar::new(UUID)
        .description("UUID, hyphenated or simple")
        .validator(|value| matches!(value, Value::String(s) if is_uuid(s)))
}

fn json_scalar() -> Scalar {
    Scalar::new(JSON).description("Arbitrary JSON value")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::CUSTOM_SCALARS;

    #[test]
    fn test_every_custom_scalar_registered() {
        let scalars = register_custom_scalars();
        assert_eq!(scalars.len(), CUSTOM_SCALARS.len());
    }

    #[test]
    fn test_date_validation() {
        assert!(is_date("2024-01-15"));
        assert!(!is_date("invalid-date"));
        assert!(!is_date("2024-13-01"));
    }

    #[test]
    fn test_datetime_validation() {
        assert!(is_datetime("2024-01-15T10:00:00Z"));
        assert!(is_datetime("2024-01-15T10:00:00"));
        assert!(!is_datetime("not-a-datetime"));
    }

    #[test]
    fn test_time_validation() {
        assert!(is_time("10:30:00"));
        assert!(is_time("10:30"));
        assert!(!is_time("25:00"));
    }

    #[test]
    fn test_uuid_validation() {
        assert!(is_uuid("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!is_uuid("67e55044-10b1-426f-9247"));
        assert!(!is_uuid("zze55044-10b1-426f-9247-bb680e5fe0c8"));
    }

    #[test]
    fn test_decimal_validation() {
        assert!(is_decimal("12345678901234567.89"));
        assert!(is_decimal("-0.5"));
        assert!(!is_decimal("1.2.3"));
        assert!(!is_decimal("ten"));
    }

    #[test]
    fn test_integer_string() {
        assert!(is_integer_string("-42"));
        assert!(!is_integer_string("4.2"));
        assert!(!is_integer_string("-"));
    }
}
