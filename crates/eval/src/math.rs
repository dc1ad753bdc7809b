//! The arithmetic engine.
//!
//! Operands are promoted to their combined type (see [`crate::promote`])
//! and the operation runs at that type. Integer arithmetic wraps at the
//! native width. Temporal types dispatch to a per-type strategy that
//! shifts along the epoch timeline.
//!
//! Null is absorbing for multiplication, neutral for addition, and a
//! hard error for division by null and for ordering comparisons.

mod date;
mod time;
mod timestamp;
mod zoned;

use std::cmp::Ordering;

use rust_decimal::Decimal;
use ::time::macros::datetime;
use ::time::{Duration, PrimitiveDateTime, Time};

use crate::convert::{as_bool, convert};
use crate::error::EvalError;
use crate::promote::{combined_kind, TypeKind};
use crate::value::Value;

use self::date::DateArithmetic;
use self::time::TimeArithmetic;
use self::timestamp::TimestampArithmetic;
use self::zoned::ZonedArithmetic;

const EPOCH: PrimitiveDateTime = datetime!(1970-01-01 0:00);

pub(crate) fn millis_since_epoch(dt: PrimitiveDateTime) -> i64 {
    (dt - EPOCH).whole_milliseconds() as i64
}

pub(crate) fn pdt_from_millis(millis: i64) -> PrimitiveDateTime {
    EPOCH + Duration::milliseconds(millis)
}

pub(crate) fn nanos_since_epoch(dt: PrimitiveDateTime) -> i128 {
    (dt - EPOCH).whole_nanoseconds()
}

pub(crate) fn pdt_from_nanos(nanos: i128) -> PrimitiveDateTime {
    EPOCH + Duration::nanoseconds_i128(nanos)
}

/// Millisecond contribution of an operand in a temporal shift. Temporal
/// operands count from their own epoch, numbers count as milliseconds.
pub(crate) fn millis_delta(value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Date(d) | Value::Timestamp(d) => Ok(millis_since_epoch(*d)),
        Value::Time(t) => Ok((*t - Time::MIDNIGHT).whole_milliseconds() as i64),
        Value::Zoned(z) => Ok((z.unix_timestamp_nanos() / 1_000_000) as i64),
        _ => value.as_i64().ok_or_else(|| {
            EvalError::type_mismatch(format!(
                "cannot use {} in date arithmetic",
                value.type_name()
            ))
        }),
    }
}

/// Nanosecond contribution, for the sub-second precise types.
pub(crate) fn nanos_delta(value: &Value) -> Result<i128, EvalError> {
    match value {
        Value::Timestamp(d) => Ok(nanos_since_epoch(*d)),
        Value::Zoned(z) => Ok(z.unix_timestamp_nanos()),
        _ => Ok(millis_delta(value)? as i128 * 1_000_000),
    }
}

/// Per-type implementation of the four basic operations.
pub(crate) trait TypeArithmetic: Sync {
    fn add(&self, left: &Value, right: &Value) -> Result<Value, EvalError>;
    fn subtract(&self, left: &Value, right: &Value) -> Result<Value, EvalError>;
    fn multiply(&self, left: &Value, right: &Value) -> Result<Value, EvalError>;
    fn divide(&self, left: &Value, right: &Value) -> Result<Value, EvalError>;
}

static DATE: DateArithmetic = DateArithmetic;
static TIME: TimeArithmetic = TimeArithmetic;
static TIMESTAMP: TimestampArithmetic = TimestampArithmetic;
static ZONED: ZonedArithmetic = ZonedArithmetic;

fn strategy_for(kind: TypeKind) -> Option<&'static dyn TypeArithmetic> {
    match kind {
        TypeKind::Date => Some(&DATE),
        TypeKind::Time => Some(&TIME),
        TypeKind::Timestamp => Some(&TIMESTAMP),
        TypeKind::Zoned => Some(&ZONED),
        _ => None,
    }
}

#[derive(Clone, Copy)]
enum NumOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl NumOp {
    fn symbol(self) -> &'static str {
        match self {
            NumOp::Add => "+",
            NumOp::Sub => "-",
            NumOp::Mul => "*",
            NumOp::Div => "/",
            NumOp::Rem => "%",
        }
    }
}

fn apply_i32(op: NumOp, a: i32, b: i32) -> Result<Value, EvalError> {
    Ok(Value::Int(match op {
        NumOp::Add => a.wrapping_add(b),
        NumOp::Sub => a.wrapping_sub(b),
        NumOp::Mul => a.wrapping_mul(b),
        NumOp::Div if b == 0 => return Err(EvalError::DivisionByZero),
        NumOp::Div => a.wrapping_div(b),
        NumOp::Rem if b == 0 => return Err(EvalError::DivisionByZero),
        NumOp::Rem => a.wrapping_rem(b),
    }))
}

fn apply_i64(op: NumOp, a: i64, b: i64) -> Result<Value, EvalError> {
    Ok(Value::Long(match op {
        NumOp::Add => a.wrapping_add(b),
        NumOp::Sub => a.wrapping_sub(b),
        NumOp::Mul => a.wrapping_mul(b),
        NumOp::Div if b == 0 => return Err(EvalError::DivisionByZero),
        NumOp::Div => a.wrapping_div(b),
        NumOp::Rem if b == 0 => return Err(EvalError::DivisionByZero),
        NumOp::Rem => a.wrapping_rem(b),
    }))
}

fn apply_i128(op: NumOp, a: i128, b: i128) -> Result<Value, EvalError> {
    let checked = match op {
        NumOp::Add => a.checked_add(b),
        NumOp::Sub => a.checked_sub(b),
        NumOp::Mul => a.checked_mul(b),
        NumOp::Div | NumOp::Rem if b == 0 => return Err(EvalError::DivisionByZero),
        NumOp::Div => a.checked_div(b),
        NumOp::Rem => a.checked_rem(b),
    };
    checked.map(Value::BigInt).ok_or_else(|| EvalError::Overflow {
        message: format!("big integer overflow in '{}'", op.symbol()),
    })
}

fn apply_f64(op: NumOp, a: f64, b: f64) -> Value {
    Value::Double(match op {
        NumOp::Add => a + b,
        NumOp::Sub => a - b,
        NumOp::Mul => a * b,
        NumOp::Div => a / b,
        NumOp::Rem => a % b,
    })
}

fn apply_decimal(op: NumOp, a: Decimal, b: Decimal) -> Result<Value, EvalError> {
    if b.is_zero() && matches!(op, NumOp::Div | NumOp::Rem) {
        return Err(EvalError::DivisionByZero);
    }
    let checked = match op {
        NumOp::Add => a.checked_add(b),
        NumOp::Sub => a.checked_sub(b),
        NumOp::Mul => a.checked_mul(b),
        NumOp::Div => a.checked_div(b),
        NumOp::Rem => a.checked_rem(b),
    };
    checked
        .map(Value::Decimal)
        .ok_or_else(|| EvalError::Overflow {
            message: format!("decimal overflow in '{}'", op.symbol()),
        })
}

/// Run a numeric operation at the combined kind. Sub-int kinds widen
/// to int first, mirroring integer promotion.
fn numeric(op: NumOp, kind: TypeKind, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match kind {
        TypeKind::Bool | TypeKind::Char | TypeKind::Byte | TypeKind::Short | TypeKind::Int => {
            match (convert(left, TypeKind::Int)?, convert(right, TypeKind::Int)?) {
                (Value::Int(a), Value::Int(b)) => apply_i32(op, a, b),
                _ => unreachable!("conversion to int yields ints"),
            }
        }
        TypeKind::Long => match (convert(left, TypeKind::Long)?, convert(right, TypeKind::Long)?) {
            (Value::Long(a), Value::Long(b)) => apply_i64(op, a, b),
            _ => unreachable!("conversion to long yields longs"),
        },
        TypeKind::BigInt => {
            match (convert(left, TypeKind::BigInt)?, convert(right, TypeKind::BigInt)?) {
                (Value::BigInt(a), Value::BigInt(b)) => apply_i128(op, a, b),
                _ => unreachable!("conversion to big_integer yields big integers"),
            }
        }
        TypeKind::Float => {
            match (convert(left, TypeKind::Float)?, convert(right, TypeKind::Float)?) {
                (Value::Float(a), Value::Float(b)) => Ok(match apply_f64(op, a as f64, b as f64) {
                    Value::Double(d) => Value::Float(d as f32),
                    other => other,
                }),
                _ => unreachable!("conversion to float yields floats"),
            }
        }
        TypeKind::Double => {
            match (convert(left, TypeKind::Double)?, convert(right, TypeKind::Double)?) {
                (Value::Double(a), Value::Double(b)) => Ok(apply_f64(op, a, b)),
                _ => unreachable!("conversion to double yields doubles"),
            }
        }
        TypeKind::Decimal => {
            match (convert(left, TypeKind::Decimal)?, convert(right, TypeKind::Decimal)?) {
                (Value::Decimal(a), Value::Decimal(b)) => apply_decimal(op, a, b),
                _ => unreachable!("conversion to big_decimal yields decimals"),
            }
        }
        other => Err(EvalError::type_mismatch(format!(
            "'{}' of type {} is not numeric",
            op.symbol(),
            other.name()
        ))),
    }
}

pub fn add(left: &Value, right: &Value) -> Result<Value, EvalError> {
    if left.is_null() {
        return Ok(right.clone());
    }
    if right.is_null() {
        return Ok(left.clone());
    }
    let kind = combined_kind("+", left, right)?;
    if let Some(strategy) = strategy_for(kind) {
        return strategy.add(left, right);
    }
    match kind {
        TypeKind::Bool => Ok(Value::Bool(as_bool(left)? || as_bool(right)?)),
        TypeKind::Str => Ok(Value::Str(left.render() + &right.render())),
        _ => numeric(NumOp::Add, kind, left, right),
    }
}

pub fn subtract(left: &Value, right: &Value) -> Result<Value, EvalError> {
    if left.is_null() {
        return negate(right);
    }
    if right.is_null() {
        return Ok(left.clone());
    }
    let kind = combined_kind("-", left, right)?;
    if let Some(strategy) = strategy_for(kind) {
        return strategy.subtract(left, right);
    }
    numeric(NumOp::Sub, kind, left, right)
}

pub fn multiply(left: &Value, right: &Value) -> Result<Value, EvalError> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    let kind = combined_kind("*", left, right)?;
    if let Some(strategy) = strategy_for(kind) {
        return strategy.multiply(left, right);
    }
    numeric(NumOp::Mul, kind, left, right)
}

pub fn divide(left: &Value, right: &Value) -> Result<Value, EvalError> {
    if right.is_null() {
        return Err(EvalError::DivisionByNull);
    }
    if left.is_null() {
        return Ok(Value::Null);
    }
    let kind = combined_kind("/", left, right)?;
    if let Some(strategy) = strategy_for(kind) {
        return strategy.divide(left, right);
    }
    numeric(NumOp::Div, kind, left, right)
}

pub fn modulo(left: &Value, right: &Value) -> Result<Value, EvalError> {
    if right.is_null() {
        return Err(EvalError::DivisionByNull);
    }
    if left.is_null() {
        return Ok(Value::Null);
    }
    let kind = combined_kind("%", left, right)?;
    numeric(NumOp::Rem, kind, left, right)
}

pub fn negate(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Null => Ok(Value::Null),
        // sub-int types widen, as unary minus does on narrow integers
        Value::Byte(v) => Ok(Value::Int(-(*v as i32))),
        Value::Short(v) => Ok(Value::Int(-(*v as i32))),
        Value::Char(c) => Ok(Value::Int(-(*c as u32 as i32))),
        Value::Int(v) => Ok(Value::Int(v.wrapping_neg())),
        Value::Long(v) => Ok(Value::Long(v.wrapping_neg())),
        Value::BigInt(v) => Ok(Value::BigInt(v.wrapping_neg())),
        Value::Float(v) => Ok(Value::Float(-v)),
        Value::Double(v) => Ok(Value::Double(-v)),
        Value::Decimal(v) => Ok(Value::Decimal(-*v)),
        other => Err(EvalError::type_mismatch(format!(
            "cannot negate {}",
            other.type_name()
        ))),
    }
}

/// Natural order of two values already converted to the same kind.
fn ordering(op: &str, a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    let ord = match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Char(a), Value::Char(b)) => a.cmp(b),
        (Value::Byte(a), Value::Byte(b)) => a.cmp(b),
        (Value::Short(a), Value::Short(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Long(a), Value::Long(b)) => a.cmp(b),
        (Value::BigInt(a), Value::BigInt(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
        (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
        (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Date(a), Value::Date(b)) => a.cmp(b),
        (Value::Time(a), Value::Time(b)) => a.cmp(b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Zoned(a), Value::Zoned(b)) => a.cmp(b),
        _ => {
            return Err(EvalError::type_mismatch(format!(
                "'{}' of types {} and {} is not supported",
                op,
                a.type_name(),
                b.type_name()
            )))
        }
    };
    Ok(ord)
}

fn compare(op: &str, left: &Value, right: &Value) -> Result<Ordering, EvalError> {
    if left.is_null() || right.is_null() {
        return Err(EvalError::CannotCompareNull);
    }
    let kind = combined_kind(op, left, right)?;
    ordering(op, &convert(left, kind)?, &convert(right, kind)?)
}

pub fn equals(left: &Value, right: &Value) -> Result<bool, EvalError> {
    if left.is_null() || right.is_null() {
        return Ok(left.is_null() && right.is_null());
    }
    match (TypeKind::of(left), TypeKind::of(right)) {
        (Some(a), Some(b)) => {
            let kind = a.max(b);
            Ok(convert(left, kind)? == convert(right, kind)?)
        }
        // sequences, maps and objects compare structurally at their own type
        _ => Ok(left == right),
    }
}

pub fn not_equals(left: &Value, right: &Value) -> Result<bool, EvalError> {
    Ok(!equals(left, right)?)
}

pub fn less(left: &Value, right: &Value) -> Result<bool, EvalError> {
    Ok(compare("<", left, right)? == Ordering::Less)
}

pub fn less_or_equals(left: &Value, right: &Value) -> Result<bool, EvalError> {
    Ok(compare("<=", left, right)? != Ordering::Greater)
}

pub fn greater(left: &Value, right: &Value) -> Result<bool, EvalError> {
    less(right, left)
}

pub fn greater_or_equals(left: &Value, right: &Value) -> Result<bool, EvalError> {
    Ok(!less(left, right)?)
}

fn bitwise(
    op: &str,
    left: &Value,
    right: &Value,
    bools: impl Fn(bool, bool) -> bool,
    ints: impl Fn(i128, i128) -> i128,
) -> Result<Value, EvalError> {
    let kind = combined_kind(op, left, right)?;
    let unsupported = || {
        EvalError::type_mismatch(format!(
            "bitwise '{}' of types {} and {} is not supported",
            op,
            left.type_name(),
            right.type_name()
        ))
    };
    // boolean mixes with nothing: both operands or neither
    if kind != TypeKind::Bool
        && (matches!(left, Value::Bool(_)) || matches!(right, Value::Bool(_)))
    {
        return Err(unsupported());
    }
    match kind {
        TypeKind::Bool => Ok(Value::Bool(bools(as_bool(left)?, as_bool(right)?))),
        TypeKind::Char | TypeKind::Byte | TypeKind::Short | TypeKind::Int => {
            match (convert(left, TypeKind::Int)?, convert(right, TypeKind::Int)?) {
                (Value::Int(a), Value::Int(b)) => {
                    Ok(Value::Int(ints(a as i128, b as i128) as i32))
                }
                _ => unreachable!("conversion to int yields ints"),
            }
        }
        TypeKind::Long => match (convert(left, TypeKind::Long)?, convert(right, TypeKind::Long)?) {
            (Value::Long(a), Value::Long(b)) => Ok(Value::Long(ints(a as i128, b as i128) as i64)),
            _ => unreachable!("conversion to long yields longs"),
        },
        TypeKind::BigInt => {
            match (convert(left, TypeKind::BigInt)?, convert(right, TypeKind::BigInt)?) {
                (Value::BigInt(a), Value::BigInt(b)) => Ok(Value::BigInt(ints(a, b))),
                _ => unreachable!("conversion to big_integer yields big integers"),
            }
        }
        _ => Err(unsupported()),
    }
}

pub fn bitwise_and(left: &Value, right: &Value) -> Result<Value, EvalError> {
    bitwise("&", left, right, |a, b| a & b, |a, b| a & b)
}

pub fn bitwise_or(left: &Value, right: &Value) -> Result<Value, EvalError> {
    bitwise("|", left, right, |a, b| a | b, |a, b| a | b)
}

pub fn bitwise_xor(left: &Value, right: &Value) -> Result<Value, EvalError> {
    bitwise("^", left, right, |a, b| a ^ b, |a, b| a ^ b)
}

fn shift_amount(value: &Value) -> Result<u32, EvalError> {
    match convert(value, TypeKind::Long)? {
        Value::Long(n) => Ok(n as u32),
        _ => unreachable!("conversion to long yields a long"),
    }
}

/// Shifts operate at the concrete width of the left operand, with
/// narrow integers widening to int first.
pub fn shift_left(left: &Value, right: &Value) -> Result<Value, EvalError> {
    let by = shift_amount(right)?;
    match left {
        Value::Byte(_) | Value::Short(_) | Value::Char(_) | Value::Int(_) => {
            match convert(left, TypeKind::Int)? {
                Value::Int(v) => Ok(Value::Int(v.wrapping_shl(by))),
                _ => unreachable!("conversion to int yields an int"),
            }
        }
        Value::Long(v) => Ok(Value::Long(v.wrapping_shl(by))),
        Value::BigInt(v) => Ok(Value::BigInt(v.wrapping_shl(by))),
        other => Err(EvalError::type_mismatch(format!(
            "cannot shift {}",
            other.type_name()
        ))),
    }
}

pub fn shift_right(left: &Value, right: &Value) -> Result<Value, EvalError> {
    let by = shift_amount(right)?;
    match left {
        Value::Byte(_) | Value::Short(_) | Value::Char(_) | Value::Int(_) => {
            match convert(left, TypeKind::Int)? {
                Value::Int(v) => Ok(Value::Int(v.wrapping_shr(by))),
                _ => unreachable!("conversion to int yields an int"),
            }
        }
        Value::Long(v) => Ok(Value::Long(v.wrapping_shr(by))),
        Value::BigInt(v) => Ok(Value::BigInt(v.wrapping_shr(by))),
        other => Err(EvalError::type_mismatch(format!(
            "cannot shift {}",
            other.type_name()
        ))),
    }
}

pub fn shift_right_unsigned(left: &Value, right: &Value) -> Result<Value, EvalError> {
    let by = shift_amount(right)?;
    match left {
        Value::Byte(_) | Value::Short(_) | Value::Char(_) | Value::Int(_) => {
            match convert(left, TypeKind::Int)? {
                Value::Int(v) => Ok(Value::Int(((v as u32).wrapping_shr(by)) as i32)),
                _ => unreachable!("conversion to int yields an int"),
            }
        }
        Value::Long(v) => Ok(Value::Long(((*v as u64).wrapping_shr(by)) as i64)),
        Value::BigInt(v) => Ok(Value::BigInt(((*v as u128).wrapping_shr(by)) as i128)),
        other => Err(EvalError::type_mismatch(format!(
            "cannot shift {}",
            other.type_name()
        ))),
    }
}

pub fn logical_complement(value: &Value) -> Result<Value, EvalError> {
    Ok(Value::Bool(!as_bool(value)?))
}

pub fn bitwise_complement(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Byte(_) | Value::Short(_) | Value::Char(_) | Value::Int(_) => {
            match convert(value, TypeKind::Int)? {
                Value::Int(v) => Ok(Value::Int(!v)),
                _ => unreachable!("conversion to int yields an int"),
            }
        }
        Value::Long(v) => Ok(Value::Long(!v)),
        Value::BigInt(v) => Ok(Value::BigInt(!v)),
        other => Err(EvalError::type_mismatch(format!(
            "cannot complement {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::time::macros::{datetime, time};

    #[test]
    fn null_is_neutral_for_addition() {
        assert_eq!(add(&Value::Null, &Value::Int(2)).unwrap(), Value::Int(2));
        assert_eq!(add(&Value::Int(2), &Value::Null).unwrap(), Value::Int(2));
        assert_eq!(add(&Value::Null, &Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn null_absorbs_multiplication() {
        assert_eq!(
            multiply(&Value::Null, &Value::Int(3)).unwrap(),
            Value::Null
        );
        assert_eq!(
            multiply(&Value::Int(3), &Value::Null).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn division_null_laws() {
        assert_eq!(
            divide(&Value::Int(3), &Value::Null).unwrap_err(),
            EvalError::DivisionByNull
        );
        assert_eq!(divide(&Value::Null, &Value::Int(3)).unwrap(), Value::Null);
    }

    #[test]
    fn subtracting_from_null_negates() {
        assert_eq!(
            subtract(&Value::Null, &Value::Int(5)).unwrap(),
            Value::Int(-5)
        );
    }

    #[test]
    fn narrow_integers_widen_to_int() {
        assert_eq!(
            add(&Value::Byte(3), &Value::Byte(2)).unwrap(),
            Value::Int(5)
        );
        assert_eq!(
            add(&Value::Char('a'), &Value::Char('b')).unwrap(),
            Value::Int(195)
        );
        assert_eq!(negate(&Value::Byte(7)).unwrap(), Value::Int(-7));
    }

    #[test]
    fn mixed_numeric_promotes() {
        assert_eq!(
            add(&Value::Int(1), &Value::Double(2.5)).unwrap(),
            Value::Double(3.5)
        );
        assert_eq!(
            multiply(&Value::Long(2), &Value::Int(3)).unwrap(),
            Value::Long(6)
        );
    }

    #[test]
    fn boolean_addition_is_disjunction() {
        assert_eq!(
            add(&Value::Bool(true), &Value::Bool(false)).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            add(&Value::Bool(false), &Value::Bool(false)).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn string_addition_concatenates() {
        assert_eq!(
            add(&Value::Str("Test".into()), &Value::Int(123)).unwrap(),
            Value::Str("Test123".into())
        );
        assert_eq!(
            add(&Value::Int(1), &Value::Str("2".into())).unwrap(),
            Value::Str("12".into())
        );
    }

    #[test]
    fn integer_division_by_zero_fails() {
        assert_eq!(
            divide(&Value::Int(1), &Value::Int(0)).unwrap_err(),
            EvalError::DivisionByZero
        );
    }

    #[test]
    fn float_division_by_zero_is_infinite() {
        assert_eq!(
            divide(&Value::Double(1.0), &Value::Double(0.0)).unwrap(),
            Value::Double(f64::INFINITY)
        );
    }

    #[test]
    fn comparisons_promote() {
        assert!(less(&Value::Int(1), &Value::Double(1.5)).unwrap());
        assert!(greater(&Value::Long(3), &Value::Int(2)).unwrap());
        assert!(equals(&Value::Int(1), &Value::Long(1)).unwrap());
        assert!(equals(&Value::Str("1".into()), &Value::Int(1)).unwrap());
    }

    #[test]
    fn sequences_compare_structurally_but_do_not_order() {
        let a = Value::Seq(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::Seq(vec![Value::Int(1), Value::Int(2)]);
        assert!(equals(&a, &b).unwrap());
        assert!(!equals(&a, &Value::Int(1)).unwrap());
        assert!(matches!(
            less(&a, &b).unwrap_err(),
            EvalError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn ordering_null_is_an_error() {
        assert_eq!(
            less(&Value::Null, &Value::Int(1)).unwrap_err(),
            EvalError::CannotCompareNull
        );
        assert!(equals(&Value::Null, &Value::Null).unwrap());
        assert!(!equals(&Value::Null, &Value::Int(1)).unwrap());
    }

    #[test]
    fn date_shifts_by_milliseconds() {
        let day = 86_400_000i64;
        assert_eq!(
            add(&Value::Date(datetime!(2009-10-06 0:00)), &Value::Long(day)).unwrap(),
            Value::Date(datetime!(2009-10-07 0:00))
        );
        assert_eq!(
            subtract(
                &Value::Date(datetime!(2009-10-07 0:00)),
                &Value::Date(datetime!(2009-10-06 0:00)),
            )
            .unwrap(),
            Value::Long(day)
        );
    }

    #[test]
    fn date_plus_time_sets_time_of_day() {
        assert_eq!(
            add(
                &Value::Date(datetime!(2009-10-06 0:00)),
                &Value::Time(time!(8:30)),
            )
            .unwrap(),
            Value::Date(datetime!(2009-10-06 8:30))
        );
    }

    #[test]
    fn timestamp_nanoseconds_carry() {
        let a = datetime!(2020-01-01 0:00:00.999_999_999);
        let shifted = add(&Value::Timestamp(a), &Value::Long(1)).unwrap();
        assert_eq!(
            shifted,
            Value::Timestamp(datetime!(2020-01-01 0:00:01.000_999_999))
        );
    }

    #[test]
    fn multiplying_dates_is_rejected() {
        let d = Value::Date(datetime!(2009-10-06 0:00));
        assert!(matches!(
            multiply(&d, &d).unwrap_err(),
            EvalError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn bitwise_on_booleans_does_not_short_circuit() {
        assert_eq!(
            bitwise_and(&Value::Bool(true), &Value::Bool(false)).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            bitwise_xor(&Value::Bool(true), &Value::Bool(true)).unwrap(),
            Value::Bool(false)
        );
        assert!(matches!(
            bitwise_and(&Value::Bool(true), &Value::Int(1)).unwrap_err(),
            EvalError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn shifts_follow_left_operand_width() {
        assert_eq!(
            shift_left(&Value::Int(1), &Value::Int(3)).unwrap(),
            Value::Int(8)
        );
        assert_eq!(
            shift_right(&Value::Long(-8), &Value::Int(1)).unwrap(),
            Value::Long(-4)
        );
        assert_eq!(
            shift_right_unsigned(&Value::Int(-1), &Value::Int(28)).unwrap(),
            Value::Int(15)
        );
        assert_eq!(
            shift_left(&Value::Byte(1), &Value::Int(4)).unwrap(),
            Value::Int(16)
        );
    }

    #[test]
    fn complements() {
        assert_eq!(
            logical_complement(&Value::Bool(true)).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(bitwise_complement(&Value::Int(0)).unwrap(), Value::Int(-1));
        assert_eq!(
            bitwise_complement(&Value::Byte(0)).unwrap(),
            Value::Int(-1)
        );
    }

    #[test]
    fn modulo_is_integral() {
        assert_eq!(
            modulo(&Value::Int(7), &Value::Int(3)).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            modulo(&Value::Long(7), &Value::Int(3)).unwrap(),
            Value::Long(1)
        );
    }
}
