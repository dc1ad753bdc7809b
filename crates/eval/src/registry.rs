//! Host classes and script objects.
//!
//! A [`ClassRegistry`] maps class names to [`ObjectClass`] handles, which
//! cover the static side: construction, static methods and static fields.
//! Instances live behind the [`ScriptObject`] trait and expose fields and
//! methods dynamically. Built-in methods on strings, sequences and maps
//! are handled here as well, so `'abc'.length()` works without any host
//! registration.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::context::Context;
use crate::convert::convert;
use crate::error::EvalError;
use crate::promote::TypeKind;
use crate::value::Value;

/// Static surface of a host class.
pub trait ObjectClass {
    fn name(&self) -> &str;

    /// Build an instance (or value) from constructor arguments.
    fn construct(&self, args: &[Value]) -> Result<Value, EvalError>;

    fn invoke_static(&self, method: &str, args: &[Value]) -> Result<Value, EvalError>;

    fn static_field(&self, field: &str) -> Result<Value, EvalError>;
}

/// Instance surface of a host object.
///
/// `context_aware` objects get the evaluation context injected after
/// every property assignment of a `new QN{...}` construction has been
/// applied.
pub trait ScriptObject: std::fmt::Debug {
    fn class_name(&self) -> &str;

    fn get_field(&self, name: &str) -> Result<Value, EvalError>;

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), EvalError>;

    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value, EvalError>;

    fn context_aware(&self) -> bool {
        false
    }

    fn inject_context(&mut self, _ctx: &Context) {}
}

pub type ClassHandle = Arc<dyn ObjectClass + Send + Sync>;

#[derive(Clone, Default)]
pub struct ClassRegistry {
    classes: BTreeMap<String, ClassHandle>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the `math` and `string` classes.
    pub fn with_standard_library() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MathClass));
        registry.register(Arc::new(StringClass));
        registry
    }

    pub fn register(&mut self, class: ClassHandle) {
        self.classes.insert(class.name().to_owned(), class);
    }

    pub fn get(&self, name: &str) -> Option<ClassHandle> {
        self.classes.get(name).cloned()
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct MathClass;

impl ObjectClass for MathClass {
    fn name(&self) -> &str {
        "math"
    }

    fn construct(&self, _args: &[Value]) -> Result<Value, EvalError> {
        Err(EvalError::ArgumentMismatch {
            class: "math".to_owned(),
            member: "<init>".to_owned(),
            message: "math cannot be instantiated".to_owned(),
        })
    }

    fn invoke_static(&self, method: &str, args: &[Value]) -> Result<Value, EvalError> {
        match method {
            "sqrt" => Ok(Value::Double(double_arg("math", method, args, 0)?.sqrt())),
            "abs" => Ok(Value::Double(double_arg("math", method, args, 0)?.abs())),
            "floor" => Ok(Value::Double(double_arg("math", method, args, 0)?.floor())),
            "ceil" => Ok(Value::Double(double_arg("math", method, args, 0)?.ceil())),
            "min" | "max" => {
                expect_args("math", method, args, 2)?;
                let a = double_arg("math", method, args, 0)?;
                let b = double_arg("math", method, args, 1)?;
                let res = if method == "min" { a.min(b) } else { a.max(b) };
                Ok(Value::Double(res))
            }
            "pow" => {
                expect_args("math", method, args, 2)?;
                let a = double_arg("math", method, args, 0)?;
                let b = double_arg("math", method, args, 1)?;
                Ok(Value::Double(a.powf(b)))
            }
            _ => Err(EvalError::UnknownMember {
                class: "math".to_owned(),
                member: method.to_owned(),
            }),
        }
    }

    fn static_field(&self, field: &str) -> Result<Value, EvalError> {
        match field {
            "pi" => Ok(Value::Double(std::f64::consts::PI)),
            "e" => Ok(Value::Double(std::f64::consts::E)),
            _ => Err(EvalError::UnknownMember {
                class: "math".to_owned(),
                member: field.to_owned(),
            }),
        }
    }
}

struct StringClass;

impl ObjectClass for StringClass {
    fn name(&self) -> &str {
        "string"
    }

    fn construct(&self, args: &[Value]) -> Result<Value, EvalError> {
        match args {
            [] => Ok(Value::Str(String::new())),
            [v] => Ok(Value::Str(v.render())),
            _ => Err(EvalError::ArgumentMismatch {
                class: "string".to_owned(),
                member: "<init>".to_owned(),
                message: format!("expected at most 1 argument, got {}", args.len()),
            }),
        }
    }

    fn invoke_static(&self, method: &str, _args: &[Value]) -> Result<Value, EvalError> {
        Err(EvalError::UnknownMember {
            class: "string".to_owned(),
            member: method.to_owned(),
        })
    }

    fn static_field(&self, field: &str) -> Result<Value, EvalError> {
        Err(EvalError::UnknownMember {
            class: "string".to_owned(),
            member: field.to_owned(),
        })
    }
}

fn expect_args(class: &str, member: &str, args: &[Value], n: usize) -> Result<(), EvalError> {
    if args.len() == n {
        Ok(())
    } else {
        Err(EvalError::ArgumentMismatch {
            class: class.to_owned(),
            member: member.to_owned(),
            message: format!("expected {} argument(s), got {}", n, args.len()),
        })
    }
}

fn double_arg(class: &str, member: &str, args: &[Value], i: usize) -> Result<f64, EvalError> {
    let arg = args.get(i).ok_or_else(|| EvalError::ArgumentMismatch {
        class: class.to_owned(),
        member: member.to_owned(),
        message: format!("missing argument {}", i + 1),
    })?;
    match convert(arg, TypeKind::Double)? {
        Value::Double(d) => Ok(d),
        _ => Err(EvalError::ArgumentMismatch {
            class: class.to_owned(),
            member: member.to_owned(),
            message: format!("argument {} is not numeric", i + 1),
        }),
    }
}

fn int_arg(class: &str, member: &str, args: &[Value], i: usize) -> Result<i64, EvalError> {
    let arg = args.get(i).ok_or_else(|| EvalError::ArgumentMismatch {
        class: class.to_owned(),
        member: member.to_owned(),
        message: format!("missing argument {}", i + 1),
    })?;
    match convert(arg, TypeKind::Long)? {
        Value::Long(n) => Ok(n),
        _ => Err(EvalError::ArgumentMismatch {
            class: class.to_owned(),
            member: member.to_owned(),
            message: format!("argument {} is not an index", i + 1),
        }),
    }
}

/// Built-in methods on scalar values, invoked as `receiver.method(args)`.
pub fn invoke_builtin(receiver: &Value, method: &str, args: &[Value]) -> Result<Value, EvalError> {
    match receiver {
        Value::Str(s) => string_method(s, method, args),
        Value::Seq(items) => match method {
            "length" | "size" => {
                expect_args("sequence", method, args, 0)?;
                Ok(Value::Int(items.len() as i32))
            }
            "contains" => {
                expect_args("sequence", method, args, 1)?;
                Ok(Value::Bool(items.contains(&args[0])))
            }
            _ => Err(EvalError::UnknownMember {
                class: "sequence".to_owned(),
                member: method.to_owned(),
            }),
        },
        Value::Map(entries) => match method {
            "size" => {
                expect_args("map", method, args, 0)?;
                Ok(Value::Int(entries.len() as i32))
            }
            "containsKey" => {
                expect_args("map", method, args, 1)?;
                Ok(Value::Bool(entries.iter().any(|(k, _)| k == &args[0])))
            }
            _ => Err(EvalError::UnknownMember {
                class: "map".to_owned(),
                member: method.to_owned(),
            }),
        },
        other => Err(EvalError::type_mismatch(format!(
            "cannot invoke '{}' on {}",
            method,
            other.type_name()
        ))),
    }
}

fn string_method(s: &str, method: &str, args: &[Value]) -> Result<Value, EvalError> {
    match method {
        "length" => {
            expect_args("string", method, args, 0)?;
            Ok(Value::Int(s.chars().count() as i32))
        }
        "trim" => {
            expect_args("string", method, args, 0)?;
            Ok(Value::Str(s.trim().to_owned()))
        }
        "toUpperCase" => {
            expect_args("string", method, args, 0)?;
            Ok(Value::Str(s.to_uppercase()))
        }
        "toLowerCase" => {
            expect_args("string", method, args, 0)?;
            Ok(Value::Str(s.to_lowercase()))
        }
        "charAt" => {
            expect_args("string", method, args, 1)?;
            let i = int_arg("string", method, args, 0)?;
            s.chars()
                .nth(usize::try_from(i).unwrap_or(usize::MAX))
                .map(Value::Char)
                .ok_or_else(|| EvalError::ArgumentMismatch {
                    class: "string".to_owned(),
                    member: method.to_owned(),
                    message: format!("index {} out of bounds", i),
                })
        }
        "substring" => {
            let from = int_arg("string", method, args, 0)? as usize;
            let chars: Vec<char> = s.chars().collect();
            let to = if args.len() > 1 {
                int_arg("string", method, args, 1)? as usize
            } else {
                chars.len()
            };
            if from > to || to > chars.len() {
                return Err(EvalError::ArgumentMismatch {
                    class: "string".to_owned(),
                    member: method.to_owned(),
                    message: format!("range {}..{} out of bounds", from, to),
                });
            }
            Ok(Value::Str(chars[from..to].iter().collect()))
        }
        "contains" => {
            expect_args("string", method, args, 1)?;
            Ok(Value::Bool(s.contains(&args[0].render())))
        }
        "startsWith" => {
            expect_args("string", method, args, 1)?;
            Ok(Value::Bool(s.starts_with(&args[0].render())))
        }
        "endsWith" => {
            expect_args("string", method, args, 1)?;
            Ok(Value::Bool(s.ends_with(&args[0].render())))
        }
        "indexOf" => {
            expect_args("string", method, args, 1)?;
            let needle = args[0].render();
            let index = s.find(&needle).map_or(-1i32, |byte_pos| {
                s[..byte_pos].chars().count() as i32
            });
            Ok(Value::Int(index))
        }
        _ => Err(EvalError::UnknownMember {
            class: "string".to_owned(),
            member: method.to_owned(),
        }),
    }
}

/// Read a named feature: object field, map entry or static class field.
pub fn get_feature(target: &Value, name: &str, ctx: &Context) -> Result<Value, EvalError> {
    match target {
        Value::Object(obj) => obj.borrow().get_field(name),
        Value::Map(entries) => entries
            .iter()
            .find(|(k, _)| matches!(k, Value::Str(s) if s == name))
            .map(|(_, v)| v.clone())
            .ok_or_else(|| EvalError::UnknownMember {
                class: "map".to_owned(),
                member: name.to_owned(),
            }),
        Value::Type(class_name) => ctx
            .for_name(class_name)
            .ok_or_else(|| EvalError::UnknownClass {
                name: class_name.clone(),
            })?
            .static_field(name),
        other => Err(EvalError::type_mismatch(format!(
            "cannot read feature '{}' of {}",
            name,
            other.type_name()
        ))),
    }
}

/// Write a named feature. Only mutable objects accept writes.
pub fn set_feature(target: &Value, name: &str, value: Value) -> Result<(), EvalError> {
    match target {
        Value::Object(obj) => obj.borrow_mut().set_field(name, value),
        other => Err(EvalError::type_mismatch(format!(
            "cannot write feature '{}' of {}",
            name,
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_library_math() {
        let registry = ClassRegistry::with_standard_library();
        let math = registry.get("math").unwrap();
        assert_eq!(
            math.invoke_static("sqrt", &[Value::Int(9)]).unwrap(),
            Value::Double(3.0)
        );
        assert_eq!(
            math.static_field("pi").unwrap(),
            Value::Double(std::f64::consts::PI)
        );
        assert!(matches!(
            math.invoke_static("nope", &[]).unwrap_err(),
            EvalError::UnknownMember { .. }
        ));
    }

    #[test]
    fn string_class_constructs() {
        let registry = ClassRegistry::with_standard_library();
        let string = registry.get("string").unwrap();
        assert_eq!(string.construct(&[]).unwrap(), Value::Str("".into()));
        assert_eq!(
            string.construct(&[Value::Int(12)]).unwrap(),
            Value::Str("12".into())
        );
    }

    #[test]
    fn builtin_string_methods() {
        let s = Value::Str("Hello".into());
        assert_eq!(invoke_builtin(&s, "length", &[]).unwrap(), Value::Int(5));
        assert_eq!(
            invoke_builtin(&s, "toUpperCase", &[]).unwrap(),
            Value::Str("HELLO".into())
        );
        assert_eq!(
            invoke_builtin(&s, "substring", &[Value::Int(1), Value::Int(3)]).unwrap(),
            Value::Str("el".into())
        );
        assert_eq!(
            invoke_builtin(&s, "charAt", &[Value::Int(1)]).unwrap(),
            Value::Char('e')
        );
    }

    #[test]
    fn builtin_collection_methods() {
        let seq = Value::Seq(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(invoke_builtin(&seq, "size", &[]).unwrap(), Value::Int(2));
        assert_eq!(
            invoke_builtin(&seq, "contains", &[Value::Int(2)]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn map_feature_lookup() {
        let map = Value::Map(vec![(Value::Str("k".into()), Value::Int(7))]);
        let ctx = Context::new();
        assert_eq!(get_feature(&map, "k", &ctx).unwrap(), Value::Int(7));
        assert!(matches!(
            get_feature(&map, "missing", &ctx).unwrap_err(),
            EvalError::UnknownMember { .. }
        ));
    }
}
