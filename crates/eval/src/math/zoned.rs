use time::OffsetDateTime;

use crate::error::EvalError;
use crate::math::{nanos_delta, TypeArithmetic};
use crate::value::Value;

/// Zone-aware datetimes shift on the absolute nanosecond timeline and
/// keep the left operand's UTC offset in the result.
pub(crate) struct ZonedArithmetic;

fn rebuild(nanos: i128, offset: time::UtcOffset) -> Result<Value, EvalError> {
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map(|dt| Value::Zoned(dt.to_offset(offset)))
        .map_err(|_| EvalError::Overflow {
            message: "zoned datetime out of range".to_owned(),
        })
}

impl ZonedArithmetic {
    fn shift(&self, base: &Value, delta: &Value, sign: i128) -> Result<Value, EvalError> {
        let z = match base {
            Value::Zoned(z) => *z,
            other => {
                return Err(EvalError::type_mismatch(format!(
                    "cannot combine zoneddatetime with {}",
                    other.type_name()
                )))
            }
        };
        let nanos = nanos_delta(delta)?;
        rebuild(z.unix_timestamp_nanos() + sign * nanos, z.offset())
    }
}

impl TypeArithmetic for ZonedArithmetic {
    fn add(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        if matches!(left, Value::Zoned(_)) {
            self.shift(left, right, 1)
        } else {
            self.shift(right, left, 1)
        }
    }

    fn subtract(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        if let (Value::Zoned(a), Value::Zoned(b)) = (left, right) {
            return Ok(Value::Long(
                ((a.unix_timestamp_nanos() - b.unix_timestamp_nanos()) / 1_000_000) as i64,
            ));
        }
        self.shift(left, right, -1)
    }

    fn multiply(&self, _left: &Value, _right: &Value) -> Result<Value, EvalError> {
        Err(EvalError::type_mismatch("cannot multiply zoned datetimes"))
    }

    fn divide(&self, _left: &Value, _right: &Value) -> Result<Value, EvalError> {
        Err(EvalError::type_mismatch("cannot divide zoned datetimes"))
    }
}
