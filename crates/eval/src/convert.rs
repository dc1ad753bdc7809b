//! Value conversion: coercions between scalar representations.
//!
//! Serves two callers: the arithmetic engine (coercing operands to their
//! combined type) and cast expressions. Narrowing follows cast semantics:
//! fractional parts truncate toward zero, chars convert through their code
//! point, strings parse. Null converts to null for every target.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::EvalError;
use crate::promote::TypeKind;
use crate::value::Value;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DATETIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const DATETIME_SUBSEC_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
const TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const TIME_SHORT_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]");

fn cast_err(value: &Value, target: &str) -> EvalError {
    EvalError::IllegalCast {
        value: value.render(),
        from: value.type_name().to_owned(),
        to: target.to_owned(),
    }
}

/// Floating view of a numeric or char value.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Char(c) => Some(*c as u32 as f64),
        Value::Byte(v) => Some(*v as f64),
        Value::Short(v) => Some(*v as f64),
        Value::Int(v) => Some(*v as f64),
        Value::Long(v) => Some(*v as f64),
        Value::BigInt(v) => Some(*v as f64),
        Value::Float(v) => Some(*v as f64),
        Value::Double(v) => Some(*v),
        Value::Decimal(v) => v.to_f64(),
        _ => None,
    }
}

/// Integral view, truncating toward zero.
fn as_i128(value: &Value) -> Option<i128> {
    match value {
        Value::Char(c) => Some(*c as u32 as i128),
        Value::Byte(v) => Some(*v as i128),
        Value::Short(v) => Some(*v as i128),
        Value::Int(v) => Some(*v as i128),
        Value::Long(v) => Some(*v as i128),
        Value::BigInt(v) => Some(*v),
        Value::Float(v) => Some(*v as i128),
        Value::Double(v) => Some(*v as i128),
        Value::Decimal(v) => v.trunc().to_i128(),
        _ => None,
    }
}

fn parse_date(text: &str) -> Option<PrimitiveDateTime> {
    if let Ok(d) = Date::parse(text, DATE_FORMAT) {
        return Some(PrimitiveDateTime::new(d, Time::MIDNIGHT));
    }
    PrimitiveDateTime::parse(text, DATETIME_FORMAT).ok()
}

fn parse_time(text: &str) -> Option<Time> {
    Time::parse(text, TIME_FORMAT)
        .or_else(|_| Time::parse(text, TIME_SHORT_FORMAT))
        .ok()
}

fn parse_timestamp(text: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(text, DATETIME_SUBSEC_FORMAT)
        .ok()
        .or_else(|| parse_date(text))
}

/// Coerce a value to the target kind.
pub fn convert(value: &Value, target: TypeKind) -> Result<Value, EvalError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    if TypeKind::of(value) == Some(target) {
        return Ok(value.clone());
    }
    match target {
        TypeKind::Bool => match value {
            Value::Str(s) => match s.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(cast_err(value, "boolean")),
            },
            _ => Err(cast_err(value, "boolean")),
        },
        TypeKind::Char => match value {
            Value::Str(s) => match (s.chars().next(), s.chars().count()) {
                (Some(c), 1) => Ok(Value::Char(c)),
                _ => Err(cast_err(value, "char")),
            },
            _ => as_i128(value)
                .and_then(|n| u32::try_from(n).ok())
                .and_then(char::from_u32)
                .map(Value::Char)
                .ok_or_else(|| cast_err(value, "char")),
        },
        TypeKind::Byte => integral(value, "byte", |n| Value::Byte(n as i8)),
        TypeKind::Short => integral(value, "short", |n| Value::Short(n as i16)),
        TypeKind::Int => integral(value, "int", |n| Value::Int(n as i32)),
        TypeKind::Long => integral(value, "long", |n| Value::Long(n as i64)),
        TypeKind::BigInt => integral(value, "big_integer", Value::BigInt),
        TypeKind::Float => match value {
            Value::Str(s) => s
                .parse::<f32>()
                .map(Value::Float)
                .map_err(|_| cast_err(value, "float")),
            _ => as_f64(value)
                .map(|f| Value::Float(f as f32))
                .ok_or_else(|| cast_err(value, "float")),
        },
        TypeKind::Double => match value {
            Value::Str(s) => s
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| cast_err(value, "double")),
            _ => as_f64(value)
                .map(Value::Double)
                .ok_or_else(|| cast_err(value, "double")),
        },
        TypeKind::Decimal => match value {
            Value::Str(s) => s
                .parse::<Decimal>()
                .map(Value::Decimal)
                .map_err(|_| cast_err(value, "big_decimal")),
            Value::Float(_) | Value::Double(_) => as_f64(value)
                .and_then(Decimal::from_f64_retain)
                .map(Value::Decimal)
                .ok_or_else(|| cast_err(value, "big_decimal")),
            _ => as_i128(value)
                .and_then(|n| Decimal::try_from_i128_with_scale(n, 0).ok())
                .map(Value::Decimal)
                .ok_or_else(|| cast_err(value, "big_decimal")),
        },
        TypeKind::Str => Ok(Value::Str(value.render())),
        TypeKind::Date => match value {
            Value::Str(s) => parse_date(s)
                .map(Value::Date)
                .ok_or_else(|| cast_err(value, "date")),
            // truncate sub-millisecond precision
            Value::Timestamp(ts) => {
                let millis = ts.nanosecond() / 1_000_000;
                Ok(Value::Date(
                    ts.replace_nanosecond(millis * 1_000_000)
                        .map_err(|_| cast_err(value, "date"))?,
                ))
            }
            _ => Err(cast_err(value, "date")),
        },
        TypeKind::Time => match value {
            Value::Str(s) => parse_time(s)
                .map(Value::Time)
                .ok_or_else(|| cast_err(value, "time")),
            Value::Date(d) | Value::Timestamp(d) => Ok(Value::Time(d.time())),
            _ => Err(cast_err(value, "time")),
        },
        TypeKind::Timestamp => match value {
            Value::Str(s) => parse_timestamp(s)
                .map(Value::Timestamp)
                .ok_or_else(|| cast_err(value, "timestamp")),
            Value::Date(d) => Ok(Value::Timestamp(*d)),
            _ => Err(cast_err(value, "timestamp")),
        },
        TypeKind::Zoned => match value {
            Value::Str(s) => OffsetDateTime::parse(s, &Rfc3339)
                .map(Value::Zoned)
                .map_err(|_| cast_err(value, "zoneddatetime")),
            Value::Date(d) | Value::Timestamp(d) => Ok(Value::Zoned(d.assume_utc())),
            _ => Err(cast_err(value, "zoneddatetime")),
        },
    }
}

fn integral(
    value: &Value,
    target: &str,
    make: impl Fn(i128) -> Value,
) -> Result<Value, EvalError> {
    match value {
        Value::Str(s) => s
            .parse::<i128>()
            .map(make)
            .map_err(|_| cast_err(value, target)),
        _ => as_i128(value).map(make).ok_or_else(|| cast_err(value, target)),
    }
}

/// Boolean view for conditions; strict about its input.
pub fn as_bool(value: &Value) -> Result<bool, EvalError> {
    match convert(value, TypeKind::Bool)? {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::type_mismatch(format!(
            "not a boolean: {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, time};

    #[test]
    fn narrowing_truncates_toward_zero() {
        assert_eq!(
            convert(&Value::Double(1.5), TypeKind::Int).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            convert(&Value::Double(-1.9), TypeKind::Int).unwrap(),
            Value::Int(-1)
        );
        assert_eq!(
            convert(&Value::Long(100_000_000_002), TypeKind::Int).unwrap(),
            Value::Int(100_000_000_002i64 as i32)
        );
    }

    #[test]
    fn string_to_temporal() {
        assert_eq!(
            convert(&Value::Str("2009-10-06".into()), TypeKind::Date).unwrap(),
            Value::Date(datetime!(2009-10-06 0:00))
        );
        assert_eq!(
            convert(&Value::Str("18:19:20".into()), TypeKind::Time).unwrap(),
            Value::Time(time!(18:19:20))
        );
        assert_eq!(
            convert(&Value::Str("1970-01-01".into()), TypeKind::Timestamp).unwrap(),
            Value::Timestamp(datetime!(1970-01-01 0:00))
        );
    }

    #[test]
    fn number_renders_to_string() {
        assert_eq!(
            convert(&Value::Int(1), TypeKind::Str).unwrap(),
            Value::Str("1".into())
        );
    }

    #[test]
    fn char_converts_through_code_point() {
        assert_eq!(
            convert(&Value::Char('A'), TypeKind::Int).unwrap(),
            Value::Int(65)
        );
        assert_eq!(
            convert(&Value::Int(65), TypeKind::Char).unwrap(),
            Value::Char('A')
        );
    }

    #[test]
    fn null_converts_to_null() {
        assert_eq!(convert(&Value::Null, TypeKind::Int).unwrap(), Value::Null);
    }

    #[test]
    fn bad_parse_is_an_illegal_cast() {
        let err = convert(&Value::Str("abc".into()), TypeKind::Int).unwrap_err();
        assert!(matches!(err, EvalError::IllegalCast { .. }));
    }

    #[test]
    fn sequence_cannot_become_a_number() {
        let err = convert(&Value::Seq(vec![]), TypeKind::Int).unwrap_err();
        assert!(matches!(err, EvalError::IllegalCast { .. }));
    }
}
