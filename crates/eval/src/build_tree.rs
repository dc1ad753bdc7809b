//! Builds evaluable expressions from parse trees.
//!
//! Literal typing happens here. Integer literals pick the narrowest of
//! int and long by digit count: fewer than ten digits is always an int,
//! exactly ten digits is a long only when the value exceeds the int
//! range, more than ten digits is a long. Decimal literals become
//! doubles. Operator chains of the same kind are flattened so the
//! evaluator folds every term.

use quill_syntax::{SynKind, SynNode, SyntaxError};

use crate::expr::{BinaryOp, CastTarget, CompositeOp, Expr, UnaryOp};
use crate::promote::TypeKind;
use crate::value::Value;

fn tree_err(node: &SynNode, message: impl Into<String>) -> SyntaxError {
    SyntaxError::new(message, &node.text, node.line, node.column)
}

fn qn_parts(node: &SynNode) -> Result<Vec<String>, SyntaxError> {
    match node.kind {
        SynKind::Ident => Ok(vec![node.text.clone()]),
        SynKind::QualifiedName => Ok(node.children.iter().map(|c| c.text.clone()).collect()),
        _ => Err(tree_err(node, "expected a name")),
    }
}

fn int_literal(node: &SynNode) -> Result<Value, SyntaxError> {
    let digits = node.text.as_str();
    let invalid = || tree_err(node, format!("invalid integer literal '{}'", digits));
    if digits.len() < 10 {
        return digits.parse::<i32>().map(Value::Int).map_err(|_| invalid());
    }
    let wide = digits.parse::<i64>().map_err(|_| invalid())?;
    if digits.len() == 10 && wide <= i32::MAX as i64 {
        Ok(Value::Int(wide as i32))
    } else {
        Ok(Value::Long(wide))
    }
}

fn string_literal(node: &SynNode) -> Result<Value, SyntaxError> {
    let raw = node.text.as_str();
    if raw.len() < 2 {
        return Err(tree_err(node, "malformed string literal"));
    }
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => return Err(tree_err(node, "dangling escape in string literal")),
        }
    }
    Ok(Value::Str(out))
}

fn cast_target(node: &SynNode) -> Result<CastTarget, SyntaxError> {
    let name = qn_parts(node.child(0))?.join(".");
    if name == "object" {
        return Ok(CastTarget::Any);
    }
    match TypeKind::by_name(&name) {
        Some(kind) => Ok(CastTarget::Kind(kind)),
        None => Ok(CastTarget::Class(name)),
    }
}

/// Flatten a left-nested chain of one operator into its term list.
fn flatten(kind: SynKind, node: &SynNode, out: &mut Vec<Expr>) -> Result<(), SyntaxError> {
    if node.kind == kind {
        flatten(kind, node.child(0), out)?;
        out.push(build_expression(node.child(1))?);
        Ok(())
    } else {
        out.push(build_expression(node)?);
        Ok(())
    }
}

fn composite(op: CompositeOp, kind: SynKind, node: &SynNode) -> Result<Expr, SyntaxError> {
    let mut terms = Vec::new();
    flatten(kind, node, &mut terms)?;
    Ok(Expr::Composite(op, terms))
}

fn binary(op: BinaryOp, node: &SynNode) -> Result<Expr, SyntaxError> {
    Ok(Expr::Binary(
        op,
        Box::new(build_expression(node.child(0))?),
        Box::new(build_expression(node.child(1))?),
    ))
}

fn arguments(node: &SynNode) -> Result<Vec<Expr>, SyntaxError> {
    node.children.iter().map(build_expression).collect()
}

pub fn build_expression(node: &SynNode) -> Result<Expr, SyntaxError> {
    match node.kind {
        SynKind::NullLit => Ok(Expr::Const(Value::Null)),
        SynKind::BoolLit => Ok(Expr::Const(Value::Bool(node.text == "true"))),
        SynKind::IntLit => Ok(Expr::Const(int_literal(node)?)),
        SynKind::DecimalLit => node
            .text
            .parse::<f64>()
            .map(|d| Expr::Const(Value::Double(d)))
            .map_err(|_| tree_err(node, format!("invalid decimal literal '{}'", node.text))),
        SynKind::StringLit => Ok(Expr::Const(string_literal(node)?)),
        SynKind::Ident | SynKind::QualifiedName => Ok(Expr::QualifiedName(qn_parts(node)?)),
        SynKind::Negation => Ok(Expr::Unary(
            UnaryOp::Negate,
            Box::new(build_expression(node.child(0))?),
        )),
        SynKind::LogicalNot => Ok(Expr::Unary(
            UnaryOp::LogicalNot,
            Box::new(build_expression(node.child(0))?),
        )),
        SynKind::BitNot => Ok(Expr::Unary(
            UnaryOp::BitNot,
            Box::new(build_expression(node.child(0))?),
        )),
        SynKind::Add => composite(CompositeOp::Add, SynKind::Add, node),
        SynKind::Sub => composite(CompositeOp::Sub, SynKind::Sub, node),
        SynKind::Mul => composite(CompositeOp::Mul, SynKind::Mul, node),
        SynKind::Div => composite(CompositeOp::Div, SynKind::Div, node),
        SynKind::CondAnd => composite(CompositeOp::CondAnd, SynKind::CondAnd, node),
        SynKind::CondOr => composite(CompositeOp::CondOr, SynKind::CondOr, node),
        SynKind::Mod => binary(BinaryOp::Mod, node),
        SynKind::BitAnd => binary(BinaryOp::BitAnd, node),
        SynKind::BitOr => binary(BinaryOp::BitOr, node),
        SynKind::BitXor => binary(BinaryOp::BitXor, node),
        SynKind::Eq => binary(BinaryOp::Eq, node),
        SynKind::Ne => binary(BinaryOp::Ne, node),
        SynKind::Lt => binary(BinaryOp::Lt, node),
        SynKind::Le => binary(BinaryOp::Le, node),
        SynKind::Gt => binary(BinaryOp::Gt, node),
        SynKind::Ge => binary(BinaryOp::Ge, node),
        SynKind::Shl => binary(BinaryOp::Shl, node),
        SynKind::Shr => binary(BinaryOp::Shr, node),
        SynKind::Ushr => binary(BinaryOp::Ushr, node),
        SynKind::Cond => Ok(Expr::Conditional {
            condition: Box::new(build_expression(node.child(0))?),
            then: Box::new(build_expression(node.child(1))?),
            otherwise: Box::new(build_expression(node.child(2))?),
        }),
        SynKind::Index => Ok(Expr::Index {
            target: Box::new(build_expression(node.child(0))?),
            index: Box::new(build_expression(node.child(1))?),
        }),
        SynKind::Field => Ok(Expr::Field {
            target: Box::new(build_expression(node.child(0))?),
            name: node.child(1).text.clone(),
        }),
        SynKind::Invocation => Ok(Expr::QnInvocation {
            parts: qn_parts(node.child(0))?,
            args: arguments(node.child(1))?,
        }),
        SynKind::SubInvocation => Ok(Expr::Invocation {
            target: Box::new(build_expression(node.child(0))?),
            method: node.child(1).text.clone(),
            args: arguments(node.child(2))?,
        }),
        SynKind::Cast => Ok(Expr::Cast {
            target: cast_target(node.child(0))?,
            source: Box::new(build_expression(node.child(1))?),
        }),
        SynKind::Assign => Ok(Expr::Assignment {
            target: qn_parts(node.child(0))?,
            value: Box::new(build_expression(node.child(1))?),
        }),
        SynKind::Constructor => Ok(Expr::Construction {
            class: qn_parts(node.child(0))?.join("."),
            args: arguments(node.child(1))?,
        }),
        SynKind::Bean => {
            let class = qn_parts(node.child(0))?.join(".");
            let mut props = Vec::with_capacity(node.children.len() - 1);
            for prop in &node.children[1..] {
                if prop.kind != SynKind::PropAssign {
                    return Err(tree_err(prop, "expected a property assignment"));
                }
                props.push((prop.child(0).text.clone(), build_expression(prop.child(1))?));
            }
            Ok(Expr::BeanConstruction { class, props })
        }
        SynKind::BeanSpec => build_bean_spec(node),
        _ => Err(tree_err(node, format!("unexpected node {:?}", node.kind))),
    }
}

/// A bean spec that is a plain dotted name keeps its reference-or-construct
/// ambiguity until resolution; everything else is an ordinary expression.
pub fn build_bean_spec(node: &SynNode) -> Result<Expr, SyntaxError> {
    let inner = if node.kind == SynKind::BeanSpec {
        node.child(0)
    } else {
        node
    };
    match inner.kind {
        SynKind::Ident | SynKind::QualifiedName => Ok(Expr::QnBeanSpec(qn_parts(inner)?)),
        _ => build_expression(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_syntax::parse_expression as parse;

    fn built(text: &str) -> Expr {
        build_expression(&parse(text).unwrap()).unwrap()
    }

    #[test]
    fn short_integer_literals_are_ints() {
        assert_eq!(built("123456789"), Expr::Const(Value::Int(123_456_789)));
    }

    #[test]
    fn ten_digit_literals_split_on_int_range() {
        assert_eq!(built("2147483647"), Expr::Const(Value::Int(i32::MAX)));
        assert_eq!(built("2147483648"), Expr::Const(Value::Long(2_147_483_648)));
    }

    #[test]
    fn long_literals_are_longs() {
        assert_eq!(
            built("123456789012"),
            Expr::Const(Value::Long(123_456_789_012))
        );
    }

    #[test]
    fn decimal_literals_are_doubles() {
        assert_eq!(built("1.5"), Expr::Const(Value::Double(1.5)));
        assert_eq!(built("1E+2"), Expr::Const(Value::Double(100.0)));
    }

    #[test]
    fn string_escapes_unquote() {
        assert_eq!(
            built("'a\\'b\\n'"),
            Expr::Const(Value::Str("a'b\n".into()))
        );
    }

    #[test]
    fn mixed_chains_stay_nested_but_same_op_flattens() {
        if let Expr::Composite(CompositeOp::Add, terms) = built("1 + 2 + 3") {
            assert_eq!(terms.len(), 3);
        } else {
            panic!("expected a sum chain");
        }
        // subtraction of a sum keeps its own chain
        if let Expr::Composite(CompositeOp::Sub, terms) = built("1 + 2 - 3") {
            assert_eq!(terms.len(), 2);
            assert!(matches!(&terms[0], Expr::Composite(CompositeOp::Add, _)));
        } else {
            panic!("expected a difference chain");
        }
    }

    #[test]
    fn cast_targets() {
        assert!(matches!(
            built("(int) 1.5"),
            Expr::Cast {
                target: CastTarget::Kind(TypeKind::Int),
                ..
            }
        ));
        assert!(matches!(
            built("(object) 5"),
            Expr::Cast {
                target: CastTarget::Any,
                ..
            }
        ));
        assert!(matches!(
            built("(com.example.Widget) x"),
            Expr::Cast {
                target: CastTarget::Class(_),
                ..
            }
        ));
    }

    #[test]
    fn bean_spec_keeps_dotted_names_unresolved() {
        let node = quill_syntax::parse_bean_spec("a.b.c").unwrap();
        assert_eq!(
            build_bean_spec(&node).unwrap(),
            Expr::QnBeanSpec(vec!["a".into(), "b".into(), "c".into()])
        );
        let node = quill_syntax::parse_bean_spec("1 + 2").unwrap();
        assert!(matches!(
            build_bean_spec(&node).unwrap(),
            Expr::Composite(CompositeOp::Add, _)
        ));
    }
}
