use time::Duration;

use crate::error::EvalError;
use crate::math::{millis_delta, TypeArithmetic};
use crate::value::Value;

/// Times of day shift by milliseconds and wrap around midnight.
pub(crate) struct TimeArithmetic;

impl TimeArithmetic {
    fn shift(&self, base: &Value, delta: &Value, sign: i64) -> Result<Value, EvalError> {
        let t = match base {
            Value::Time(t) => *t,
            other => {
                return Err(EvalError::type_mismatch(format!(
                    "cannot combine time with {}",
                    other.type_name()
                )))
            }
        };
        let millis = millis_delta(delta)?;
        Ok(Value::Time(t + Duration::milliseconds(sign * millis)))
    }
}

impl TypeArithmetic for TimeArithmetic {
    fn add(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        if matches!(left, Value::Time(_)) {
            self.shift(left, right, 1)
        } else {
            self.shift(right, left, 1)
        }
    }

    fn subtract(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        if let (Value::Time(a), Value::Time(b)) = (left, right) {
            return Ok(Value::Long((*a - *b).whole_milliseconds() as i64));
        }
        self.shift(left, right, -1)
    }

    fn multiply(&self, _left: &Value, _right: &Value) -> Result<Value, EvalError> {
        Err(EvalError::type_mismatch("cannot multiply times"))
    }

    fn divide(&self, _left: &Value, _right: &Value) -> Result<Value, EvalError> {
        Err(EvalError::type_mismatch("cannot divide times"))
    }
}
