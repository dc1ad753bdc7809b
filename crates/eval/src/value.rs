//! The dynamic value domain.
//!
//! Scripts are dynamically typed; every runtime value is one of these
//! variants. The domain is a closed tagged union rather than a host "any"
//! type: embedders plug their own types in through the `Object` handle and
//! the class registry, never by extending this enum.

use rust_decimal::Decimal;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, Time};

use crate::registry::ScriptObject;

/// Shared handle to an embedder-provided object. Cloning a `Value` clones
/// the handle, not the object; property writes through one handle are
/// visible through all of them.
pub type ObjRef = Rc<RefCell<dyn ScriptObject>>;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    BigInt(i128),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Str(String),
    /// A calendar date with time-of-day at millisecond semantics.
    Date(PrimitiveDateTime),
    /// Time of day; its "own epoch" is midnight.
    Time(Time),
    /// Like `Date` but tracks sub-millisecond precision in nanoseconds.
    Timestamp(PrimitiveDateTime),
    /// Offset-aware timestamp; arithmetic preserves the offset.
    Zoned(OffsetDateTime),
    Seq(Vec<Value>),
    /// Insertion-ordered key/value pairs; looked up by raw key equality.
    Map(Vec<(Value, Value)>),
    /// A resolved class, by fully-qualified name. Anchors static access.
    Type(String),
    Object(ObjRef),
}

const DATETIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

impl Value {
    /// The concrete type's name, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Char(_) => "char",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::BigInt(_) => "big_integer",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Decimal(_) => "big_decimal",
            Value::Str(_) => "string",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::Zoned(_) => "zoneddatetime",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "map",
            Value::Type(_) => "class",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Byte(_)
                | Value::Short(_)
                | Value::Int(_)
                | Value::Long(_)
                | Value::BigInt(_)
                | Value::Float(_)
                | Value::Double(_)
                | Value::Decimal(_)
        )
    }

    /// Integral view of a numeric value, truncating fractions.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(*v as i64),
            Value::Short(v) => Some(*v as i64),
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            Value::BigInt(v) => Some(*v as i64),
            Value::Float(v) => Some(*v as i64),
            Value::Double(v) => Some(*v as i64),
            Value::Decimal(v) => Some(v.trunc().try_into().unwrap_or(0)),
            _ => None,
        }
    }

    /// Render the value the way string concatenation does.
    pub fn render(&self) -> String {
        match self {
            Value::Null => "null".to_owned(),
            Value::Bool(v) => v.to_string(),
            Value::Char(v) => v.to_string(),
            Value::Byte(v) => v.to_string(),
            Value::Short(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::BigInt(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Decimal(v) => v.to_string(),
            Value::Str(v) => v.clone(),
            Value::Date(v) => v
                .format(DATETIME_FORMAT)
                .unwrap_or_else(|_| v.to_string()),
            Value::Time(v) => v.format(TIME_FORMAT).unwrap_or_else(|_| v.to_string()),
            Value::Timestamp(v) => {
                let base = v
                    .format(DATETIME_FORMAT)
                    .unwrap_or_else(|_| v.to_string());
                if v.nanosecond() > 0 {
                    format!("{}.{:09}", base, v.nanosecond())
                } else {
                    base
                }
            }
            Value::Zoned(v) => v
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| v.to_string()),
            Value::Seq(items) => {
                let parts: Vec<String> = items.iter().map(Value::render).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Map(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}={}", k.render(), v.render()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Type(name) => name.clone(),
            Value::Object(obj) => obj.borrow().class_name().to_owned(),
        }
    }
}

/// Structural equality; `Object` handles compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Zoned(a), Value::Zoned(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
