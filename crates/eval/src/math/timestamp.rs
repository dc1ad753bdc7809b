use crate::error::EvalError;
use crate::math::{nanos_delta, nanos_since_epoch, pdt_from_nanos, TypeArithmetic};
use crate::value::Value;

/// Timestamps carry nanosecond precision. Shifts are computed on a total
/// nanoseconds-since-epoch count so sub-second carry and borrow come out
/// right without tracking the second and nanosecond fields separately.
pub(crate) struct TimestampArithmetic;

impl TimestampArithmetic {
    fn shift(&self, base: &Value, delta: &Value, sign: i128) -> Result<Value, EvalError> {
        let ts = match base {
            Value::Timestamp(ts) => *ts,
            other => {
                return Err(EvalError::type_mismatch(format!(
                    "cannot combine timestamp with {}",
                    other.type_name()
                )))
            }
        };
        let nanos = nanos_delta(delta)?;
        Ok(Value::Timestamp(pdt_from_nanos(
            nanos_since_epoch(ts) + sign * nanos,
        )))
    }
}

impl TypeArithmetic for TimestampArithmetic {
    fn add(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        if matches!(left, Value::Timestamp(_)) {
            self.shift(left, right, 1)
        } else {
            self.shift(right, left, 1)
        }
    }

    fn subtract(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        if let (Value::Timestamp(a), Value::Timestamp(b)) = (left, right) {
            return Ok(Value::Long((*a - *b).whole_milliseconds() as i64));
        }
        self.shift(left, right, -1)
    }

    fn multiply(&self, _left: &Value, _right: &Value) -> Result<Value, EvalError> {
        Err(EvalError::type_mismatch("cannot multiply timestamps"))
    }

    fn divide(&self, _left: &Value, _right: &Value) -> Result<Value, EvalError> {
        Err(EvalError::type_mismatch("cannot divide timestamps"))
    }
}
