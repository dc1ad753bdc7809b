//! Qualified name resolution.
//!
//! A dotted name like `a.b.c` is ambiguous between a variable with a
//! dotted name, a class, and a feature path rooted at either. Resolution
//! tries the longest prefix first: the whole name as a variable, then as
//! a class, then the head as an owner whose trailing segment is read as
//! a feature.

use crate::context::Context;
use crate::error::EvalError;
use crate::registry::{get_feature, invoke_builtin};
use crate::value::Value;

/// Resolve a dotted name to a value. Classes resolve to a type handle
/// so that static members can be accessed on the result.
pub fn resolve_qn(parts: &[String], ctx: &Context) -> Result<Value, EvalError> {
    let name = parts.join(".");
    if let Some(value) = ctx.get(&name) {
        return Ok(value.clone());
    }
    if ctx.for_name(&name).is_some() {
        return Ok(Value::Type(name));
    }
    if parts.len() > 1 {
        let (owner_parts, feature) = parts.split_at(parts.len() - 1);
        let owner = resolve_qn(owner_parts, ctx)
            .map_err(|_| EvalError::UnresolvedName { name: name.clone() })?;
        return get_feature(&owner, &feature[0], ctx);
    }
    Err(EvalError::UnresolvedName { name })
}

/// Invoke a method through a receiver value.
pub fn invoke_value(
    receiver: &Value,
    method: &str,
    args: &[Value],
    ctx: &Context,
) -> Result<Value, EvalError> {
    match receiver {
        Value::Object(obj) => obj.borrow_mut().invoke(method, args),
        Value::Type(class_name) => ctx
            .for_name(class_name)
            .ok_or_else(|| EvalError::UnknownClass {
                name: class_name.clone(),
            })?
            .invoke_static(method, args),
        other => invoke_builtin(other, method, args),
    }
}

/// Invoke a dotted call `a.b.method(args)`. The anchor search prefers a
/// context variable named like the owner path, then a class of that
/// name, then falls back to full owner resolution.
pub fn invoke_qn(parts: &[String], args: &[Value], ctx: &Context) -> Result<Value, EvalError> {
    let (owner_parts, method) = match parts.split_last() {
        Some((method, owner)) if !owner.is_empty() => (owner, method),
        _ => {
            return Err(EvalError::UnresolvedName {
                name: parts.join("."),
            })
        }
    };
    let owner_name = owner_parts.join(".");
    if let Some(receiver) = ctx.get(&owner_name) {
        let receiver = receiver.clone();
        return invoke_value(&receiver, method, args, ctx);
    }
    // an owner that is not a known class is not an error yet
    if let Some(class) = ctx.for_name(&owner_name) {
        return class.invoke_static(method, args);
    }
    let owner = resolve_qn(owner_parts, ctx)?;
    invoke_value(&owner, method, args, ctx)
}

/// Result of resolving a bean spec: either a reference to an existing
/// value or a freshly constructed one.
#[derive(Clone, Debug, PartialEq)]
pub enum BeanSpec {
    Reference(Value),
    Construction(Value),
}

impl BeanSpec {
    pub fn value(&self) -> &Value {
        match self {
            BeanSpec::Reference(v) | BeanSpec::Construction(v) => v,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            BeanSpec::Reference(v) | BeanSpec::Construction(v) => v,
        }
    }
}

/// A dotted name used as a bean spec: an existing variable is a
/// reference, a class name constructs a fresh default instance, and
/// anything else resolves as a feature path.
pub fn resolve_qn_bean_spec(parts: &[String], ctx: &Context) -> Result<BeanSpec, EvalError> {
    let name = parts.join(".");
    if let Some(value) = ctx.get(&name) {
        return Ok(BeanSpec::Reference(value.clone()));
    }
    if let Some(class) = ctx.for_name(&name) {
        return Ok(BeanSpec::Construction(class.construct(&[])?));
    }
    Ok(BeanSpec::Reference(resolve_qn(parts, ctx)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn variable_wins_over_class() {
        let mut ctx = Context::new();
        ctx.set("math", Value::Int(42));
        assert_eq!(resolve_qn(&parts(&["math"]), &ctx).unwrap(), Value::Int(42));
    }

    #[test]
    fn class_resolves_to_type_handle() {
        let ctx = Context::new();
        assert_eq!(
            resolve_qn(&parts(&["math"]), &ctx).unwrap(),
            Value::Type("math".into())
        );
    }

    #[test]
    fn static_field_through_feature_path() {
        let ctx = Context::new();
        assert_eq!(
            resolve_qn(&parts(&["math", "pi"]), &ctx).unwrap(),
            Value::Double(std::f64::consts::PI)
        );
    }

    #[test]
    fn dotted_variable_wins_over_feature_path() {
        let mut ctx = Context::new();
        ctx.set("math.pi", Value::Int(3));
        assert_eq!(
            resolve_qn(&parts(&["math", "pi"]), &ctx).unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn unresolved_reports_the_full_name() {
        let ctx = Context::new();
        let err = resolve_qn(&parts(&["no", "such", "thing"]), &ctx).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnresolvedName {
                name: "no.such.thing".into()
            }
        );
    }

    #[test]
    fn static_invocation_through_qn() {
        let ctx = Context::new();
        assert_eq!(
            invoke_qn(&parts(&["math", "sqrt"]), &[Value::Int(16)], &ctx).unwrap(),
            Value::Double(4.0)
        );
    }

    #[test]
    fn builtin_invocation_on_a_variable() {
        let mut ctx = Context::new();
        ctx.set("greeting", Value::Str("Hello".into()));
        assert_eq!(
            invoke_qn(&parts(&["greeting", "length"]), &[], &ctx).unwrap(),
            Value::Int(5)
        );
    }

    #[test]
    fn bean_spec_reference_and_construction() {
        let mut ctx = Context::new();
        ctx.set("x", Value::Int(1));
        assert_eq!(
            resolve_qn_bean_spec(&parts(&["x"]), &ctx).unwrap(),
            BeanSpec::Reference(Value::Int(1))
        );
        assert_eq!(
            resolve_qn_bean_spec(&parts(&["string"]), &ctx).unwrap(),
            BeanSpec::Construction(Value::Str("".into()))
        );
    }
}
