use crate::error::EvalError;
use crate::math::{millis_delta, millis_since_epoch, pdt_from_millis, TypeArithmetic};
use crate::value::Value;

/// Calendar dates shift by whole milliseconds. Adding another date or a
/// time contributes that operand's milliseconds since its own epoch, so
/// `date + time` lands on the given time of day.
pub(crate) struct DateArithmetic;

impl DateArithmetic {
    fn shift(&self, base: &Value, delta: &Value, sign: i64) -> Result<Value, EvalError> {
        let d = match base {
            Value::Date(d) => *d,
            other => {
                return Err(EvalError::type_mismatch(format!(
                    "cannot combine date with {}",
                    other.type_name()
                )))
            }
        };
        let millis = millis_delta(delta)?;
        Ok(Value::Date(pdt_from_millis(
            millis_since_epoch(d) + sign * millis,
        )))
    }
}

impl TypeArithmetic for DateArithmetic {
    fn add(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        if matches!(left, Value::Date(_)) {
            self.shift(left, right, 1)
        } else {
            self.shift(right, left, 1)
        }
    }

    fn subtract(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        if let (Value::Date(a), Value::Date(b)) = (left, right) {
            // difference of two dates is a millisecond count
            return Ok(Value::Long(
                (*a - *b).whole_milliseconds() as i64,
            ));
        }
        self.shift(left, right, -1)
    }

    fn multiply(&self, _left: &Value, _right: &Value) -> Result<Value, EvalError> {
        Err(EvalError::type_mismatch("cannot multiply dates"))
    }

    fn divide(&self, _left: &Value, _right: &Value) -> Result<Value, EvalError> {
        Err(EvalError::type_mismatch("cannot divide dates"))
    }
}
