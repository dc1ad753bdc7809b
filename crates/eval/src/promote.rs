//! Type promotion: a fixed total order over the scalar type list.
//!
//! Before a binary operator applies, both operands are coerced to the
//! higher-ranked of their two types. The order is load-bearing: string
//! outranks everything (so `'a' + 1` concatenates), the temporal types
//! outrank the numerics (so `date + long` shifts the date), and the
//! numerics widen bottom-up.

use crate::error::EvalError;
use crate::value::Value;

/// Scalar type ranks. Variant order *is* the promotion order; do not
/// reorder without revisiting every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TypeKind {
    Bool,
    Char,
    Byte,
    Short,
    Int,
    Long,
    BigInt,
    Float,
    Double,
    Decimal,
    Time,
    Date,
    Timestamp,
    Zoned,
    Str,
}

impl TypeKind {
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Bool => "boolean",
            TypeKind::Char => "char",
            TypeKind::Byte => "byte",
            TypeKind::Short => "short",
            TypeKind::Int => "int",
            TypeKind::Long => "long",
            TypeKind::BigInt => "big_integer",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            TypeKind::Decimal => "big_decimal",
            TypeKind::Time => "time",
            TypeKind::Date => "date",
            TypeKind::Timestamp => "timestamp",
            TypeKind::Zoned => "zoneddatetime",
            TypeKind::Str => "string",
        }
    }

    /// The kind of a value, when it sits on the promotion lattice.
    /// Null, sequences, maps, classes and objects do not.
    pub fn of(value: &Value) -> Option<TypeKind> {
        match value {
            Value::Bool(_) => Some(TypeKind::Bool),
            Value::Char(_) => Some(TypeKind::Char),
            Value::Byte(_) => Some(TypeKind::Byte),
            Value::Short(_) => Some(TypeKind::Short),
            Value::Int(_) => Some(TypeKind::Int),
            Value::Long(_) => Some(TypeKind::Long),
            Value::BigInt(_) => Some(TypeKind::BigInt),
            Value::Float(_) => Some(TypeKind::Float),
            Value::Double(_) => Some(TypeKind::Double),
            Value::Decimal(_) => Some(TypeKind::Decimal),
            Value::Str(_) => Some(TypeKind::Str),
            Value::Time(_) => Some(TypeKind::Time),
            Value::Date(_) => Some(TypeKind::Date),
            Value::Timestamp(_) => Some(TypeKind::Timestamp),
            Value::Zoned(_) => Some(TypeKind::Zoned),
            Value::Null
            | Value::Seq(_)
            | Value::Map(_)
            | Value::Type(_)
            | Value::Object(_) => None,
        }
    }

    /// The primitive type denoted by a script-level type name, as used in
    /// cast expressions.
    pub fn by_name(name: &str) -> Option<TypeKind> {
        Some(match name {
            "boolean" => TypeKind::Bool,
            "char" => TypeKind::Char,
            "byte" => TypeKind::Byte,
            "short" => TypeKind::Short,
            "int" => TypeKind::Int,
            "long" => TypeKind::Long,
            "big_integer" => TypeKind::BigInt,
            "float" => TypeKind::Float,
            "double" => TypeKind::Double,
            "big_decimal" => TypeKind::Decimal,
            "string" => TypeKind::Str,
            "date" => TypeKind::Date,
            "time" => TypeKind::Time,
            "timestamp" => TypeKind::Timestamp,
            "zoneddatetime" => TypeKind::Zoned,
            _ => return None,
        })
    }
}

/// The promoted common type for a binary operation's operands.
pub fn combined_type(a: TypeKind, b: TypeKind) -> TypeKind {
    a.max(b)
}

/// Combined kind of two values, or a type-mismatch naming both operand
/// types when either sits outside the lattice.
pub fn combined_kind(op: &str, a: &Value, b: &Value) -> Result<TypeKind, EvalError> {
    match (TypeKind::of(a), TypeKind::of(b)) {
        (Some(ka), Some(kb)) => Ok(combined_type(ka, kb)),
        _ => Err(EvalError::type_mismatch(format!(
            "{} of types {} and {} is not supported",
            op,
            a.type_name(),
            b.type_name()
        ))),
    }
}
