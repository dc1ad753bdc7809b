//! Expression evaluation for Quill scripts.
//!
//! The syntax crate turns text into parse trees; this crate types the
//! literals, resolves names against a [`Context`] and evaluates. The
//! usual entry points are the free functions:
//!
//! ```
//! use quill_eval::{evaluate, Context, Value};
//!
//! let mut ctx = Context::new();
//! ctx.set("x", Value::Int(3));
//! assert_eq!(evaluate("x * 2 + 1", &mut ctx).unwrap(), Value::Int(7));
//! ```

pub mod build_tree;
pub mod context;
pub mod convert;
pub mod error;
pub mod expr;
pub mod math;
pub mod promote;
pub mod registry;
pub mod resolve;
pub mod value;
pub mod weighted;

pub use context::Context;
pub use error::{EvalError, ScriptError};
pub use expr::{BinaryOp, CastTarget, CompositeOp, Expr, UnaryOp};
pub use promote::TypeKind;
pub use registry::{ClassHandle, ClassRegistry, ObjectClass, ScriptObject};
pub use resolve::BeanSpec;
pub use value::{ObjRef, Value};
pub use weighted::{sort_by_weight, WeightedSample, WeightedTransition};

use quill_syntax as syntax;
use syntax::SynNode;

/// Parse one expression. Blank input is not an expression and yields
/// `None`; trailing input after a complete expression is an error.
pub fn parse_expression(text: &str) -> Result<Option<Expr>, ScriptError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let node = syntax::parse_expression(text)?;
    Ok(Some(build_tree::build_expression(&node)?))
}

/// Parse and evaluate in one step. Blank input evaluates to null.
pub fn evaluate(text: &str, ctx: &mut Context) -> Result<Value, ScriptError> {
    match parse_expression(text)? {
        Some(expr) => Ok(expr.evaluate(ctx)?),
        None => Ok(Value::Null),
    }
}

/// Parse one bean spec without resolving it.
pub fn parse_bean_spec(text: &str) -> Result<Expr, ScriptError> {
    let node = syntax::parse_bean_spec(text)?;
    Ok(build_tree::build_bean_spec(&node)?)
}

/// Parse a comma-separated bean-spec list without resolving it.
pub fn parse_bean_spec_list(text: &str) -> Result<Vec<Expr>, ScriptError> {
    let nodes = syntax::parse_bean_spec_list(text)?;
    nodes
        .iter()
        .map(|n| Ok(build_tree::build_bean_spec(n)?))
        .collect()
}

/// Resolve a bean spec against a context: an existing value becomes a
/// reference, a class name or construction builds a fresh instance.
pub fn resolve_bean_spec(text: &str, ctx: &mut Context) -> Result<BeanSpec, ScriptError> {
    let expr = parse_bean_spec(text)?;
    resolve_bean_expr(&expr, ctx)
}

pub fn resolve_bean_spec_list(
    text: &str,
    ctx: &mut Context,
) -> Result<Vec<BeanSpec>, ScriptError> {
    let exprs = parse_bean_spec_list(text)?;
    exprs.iter().map(|e| resolve_bean_expr(e, ctx)).collect()
}

fn resolve_bean_expr(expr: &Expr, ctx: &mut Context) -> Result<BeanSpec, ScriptError> {
    match expr {
        Expr::QnBeanSpec(parts) => Ok(resolve::resolve_qn_bean_spec(parts, ctx)?),
        Expr::Construction { .. } | Expr::BeanConstruction { .. } => {
            Ok(BeanSpec::Construction(expr.evaluate(ctx)?))
        }
        other => Ok(BeanSpec::Reference(other.evaluate(ctx)?)),
    }
}

/// Evaluate a list-literal parse node. The grammar only admits constant
/// literals here, so a throwaway context suffices.
fn literal_value(node: &SynNode) -> Result<Value, ScriptError> {
    let expr = build_tree::build_expression(node)?;
    let mut ctx = Context::new();
    Ok(expr.evaluate(&mut ctx)?)
}

fn weight_of(node: &SynNode) -> Result<f64, ScriptError> {
    let value = literal_value(node)?;
    match convert::convert(&value, TypeKind::Double)? {
        Value::Double(w) => Ok(w),
        other => Err(ScriptError::Eval(EvalError::type_mismatch(format!(
            "weight is not numeric: {}",
            other.type_name()
        )))),
    }
}

/// Parse a weighted-literal list like `'A',  'B'^2.5`. Entries without
/// an explicit weight default to 1. Blank input is an empty list.
pub fn parse_weighted_literal_list(text: &str) -> Result<Vec<WeightedSample>, ScriptError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let nodes = syntax::parse_weighted_literal_list(text)?;
    nodes
        .iter()
        .map(|node| {
            if node.kind == syntax::SynKind::Caret {
                Ok(WeightedSample::new(
                    literal_value(node.child(0))?,
                    weight_of(node.child(1))?,
                ))
            } else {
                Ok(WeightedSample::new(literal_value(node)?, 1.0))
            }
        })
        .collect()
}

/// Parse a transition list like `1->2, 2->3^0.5`. The weight defaults
/// to 1. Blank input is an empty list.
pub fn parse_transition_list(text: &str) -> Result<Vec<WeightedTransition>, ScriptError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let nodes = syntax::parse_transition_list(text)?;
    nodes
        .iter()
        .map(|node| {
            let from = literal_value(node.child(0))?;
            let to = literal_value(node.child(1))?;
            let weight = if node.children.len() > 2 {
                weight_of(node.child(2))?
            } else {
                1.0
            };
            Ok(WeightedTransition::new(from, to, weight))
        })
        .collect()
}
