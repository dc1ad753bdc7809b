//! Evaluable expression trees.
//!
//! Expressions evaluate against a mutable [`Context`]. Most operators
//! delegate to the arithmetic engine in [`crate::math`]; name lookup and
//! invocation go through [`crate::resolve`]. Sum and product chains are
//! kept n-ary so a whole `a + b + c` folds left over every term.

use crate::context::Context;
use crate::convert::{as_bool, convert};
use crate::error::EvalError;
use crate::math;
use crate::promote::TypeKind;
use crate::registry::{get_feature, set_feature};
use crate::resolve::{invoke_qn, invoke_value, resolve_qn, resolve_qn_bean_spec};
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    LogicalNot,
    BitNot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Shl,
    Shr,
    Ushr,
}

/// Operators that chain: the term list always holds at least two
/// entries and folds left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeOp {
    Add,
    Sub,
    Mul,
    Div,
    CondAnd,
    CondOr,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CastTarget {
    /// A scalar kind with conversion semantics.
    Kind(TypeKind),
    /// A registered class; the operand must already be an instance.
    Class(String),
    /// `(object)` casts are a no-op.
    Any,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(Value),
    QualifiedName(Vec<String>),
    QnBeanSpec(Vec<String>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Composite(CompositeOp, Vec<Expr>),
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Field {
        target: Box<Expr>,
        name: String,
    },
    Invocation {
        target: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    QnInvocation {
        parts: Vec<String>,
        args: Vec<Expr>,
    },
    Construction {
        class: String,
        args: Vec<Expr>,
    },
    BeanConstruction {
        class: String,
        props: Vec<(String, Expr)>,
    },
    Assignment {
        target: Vec<String>,
        value: Box<Expr>,
    },
    Cast {
        target: CastTarget,
        source: Box<Expr>,
    },
}

impl Expr {
    pub fn evaluate(&self, ctx: &mut Context) -> Result<Value, EvalError> {
        match self {
            Expr::Const(value) => Ok(value.clone()),
            Expr::QualifiedName(parts) => resolve_qn(parts, ctx),
            Expr::QnBeanSpec(parts) => Ok(resolve_qn_bean_spec(parts, ctx)?.into_value()),
            Expr::Unary(op, operand) => {
                let value = operand.evaluate(ctx)?;
                match op {
                    UnaryOp::Negate => math::negate(&value),
                    UnaryOp::LogicalNot => math::logical_complement(&value),
                    UnaryOp::BitNot => math::bitwise_complement(&value),
                }
            }
            Expr::Binary(op, left, right) => {
                let l = left.evaluate(ctx)?;
                let r = right.evaluate(ctx)?;
                match op {
                    BinaryOp::Mod => math::modulo(&l, &r),
                    BinaryOp::BitAnd => math::bitwise_and(&l, &r),
                    BinaryOp::BitOr => math::bitwise_or(&l, &r),
                    BinaryOp::BitXor => math::bitwise_xor(&l, &r),
                    BinaryOp::Eq => Ok(Value::Bool(math::equals(&l, &r)?)),
                    BinaryOp::Ne => Ok(Value::Bool(math::not_equals(&l, &r)?)),
                    BinaryOp::Lt => Ok(Value::Bool(math::less(&l, &r)?)),
                    BinaryOp::Le => Ok(Value::Bool(math::less_or_equals(&l, &r)?)),
                    BinaryOp::Gt => Ok(Value::Bool(math::greater(&l, &r)?)),
                    BinaryOp::Ge => Ok(Value::Bool(math::greater_or_equals(&l, &r)?)),
                    BinaryOp::Shl => math::shift_left(&l, &r),
                    BinaryOp::Shr => math::shift_right(&l, &r),
                    BinaryOp::Ushr => math::shift_right_unsigned(&l, &r),
                }
            }
            Expr::Composite(op, terms) => self.evaluate_composite(*op, terms, ctx),
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                // only the selected branch is evaluated
                if as_bool(&condition.evaluate(ctx)?)? {
                    then.evaluate(ctx)
                } else {
                    otherwise.evaluate(ctx)
                }
            }
            Expr::Index { target, index } => {
                let target = target.evaluate(ctx)?;
                let index = index.evaluate(ctx)?;
                index_value(&target, &index)
            }
            Expr::Field { target, name } => {
                let target = target.evaluate(ctx)?;
                get_feature(&target, name, ctx)
            }
            Expr::Invocation {
                target,
                method,
                args,
            } => {
                let receiver = target.evaluate(ctx)?;
                let args = self.evaluate_args(args, ctx)?;
                invoke_value(&receiver, method, &args, ctx)
            }
            Expr::QnInvocation { parts, args } => {
                let args = self.evaluate_args(args, ctx)?;
                invoke_qn(parts, &args, ctx)
            }
            Expr::Construction { class, args } => {
                let args = self.evaluate_args(args, ctx)?;
                ctx.for_name(class)
                    .ok_or_else(|| EvalError::UnknownClass {
                        name: class.clone(),
                    })?
                    .construct(&args)
            }
            Expr::BeanConstruction { class, props } => {
                let instance = ctx
                    .for_name(class)
                    .ok_or_else(|| EvalError::UnknownClass {
                        name: class.clone(),
                    })?
                    .construct(&[])?;
                if let Value::Object(obj) = &instance {
                    // Properties are evaluated and assigned in source
                    // order; the context goes in only once the instance
                    // is fully configured.
                    for (name, expr) in props {
                        let value = expr.evaluate(ctx)?;
                        obj.borrow_mut().set_field(name, value)?;
                    }
                    let mut borrowed = obj.borrow_mut();
                    if borrowed.context_aware() {
                        borrowed.inject_context(ctx);
                    }
                } else if !props.is_empty() {
                    return Err(EvalError::type_mismatch(format!(
                        "cannot set properties of {}",
                        instance.type_name()
                    )));
                }
                Ok(instance)
            }
            Expr::Assignment { target, value } => {
                let value = value.evaluate(ctx)?;
                match target.as_slice() {
                    [name] => ctx.set(name.clone(), value.clone()),
                    _ => {
                        let (owner_parts, feature) = target.split_at(target.len() - 1);
                        let owner = resolve_qn(owner_parts, ctx)?;
                        set_feature(&owner, &feature[0], value.clone())?;
                    }
                }
                Ok(value)
            }
            Expr::Cast { target, source } => {
                let value = source.evaluate(ctx)?;
                match target {
                    CastTarget::Any => Ok(value),
                    CastTarget::Kind(kind) => convert(&value, *kind),
                    CastTarget::Class(class) => {
                        if ctx.for_name(class).is_none() {
                            return Err(EvalError::UnknownClass {
                                name: class.clone(),
                            });
                        }
                        match &value {
                            Value::Object(obj) if obj.borrow().class_name() == class => Ok(value),
                            other => Err(EvalError::IllegalCast {
                                value: other.render(),
                                from: other.type_name().to_owned(),
                                to: class.clone(),
                            }),
                        }
                    }
                }
            }
        }
    }

    fn evaluate_args(&self, args: &[Expr], ctx: &mut Context) -> Result<Vec<Value>, EvalError> {
        args.iter().map(|a| a.evaluate(ctx)).collect()
    }

    fn evaluate_composite(
        &self,
        op: CompositeOp,
        terms: &[Expr],
        ctx: &mut Context,
    ) -> Result<Value, EvalError> {
        match op {
            CompositeOp::CondAnd => {
                for term in terms {
                    if !as_bool(&term.evaluate(ctx)?)? {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            CompositeOp::CondOr => {
                for term in terms {
                    if as_bool(&term.evaluate(ctx)?)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            CompositeOp::Add | CompositeOp::Sub | CompositeOp::Mul | CompositeOp::Div => {
                let mut terms = terms.iter();
                let first = terms.next().ok_or_else(|| {
                    EvalError::type_mismatch("empty operator chain")
                })?;
                let mut acc = first.evaluate(ctx)?;
                for term in terms {
                    let rhs = term.evaluate(ctx)?;
                    acc = match op {
                        CompositeOp::Add => math::add(&acc, &rhs)?,
                        CompositeOp::Sub => math::subtract(&acc, &rhs)?,
                        CompositeOp::Mul => math::multiply(&acc, &rhs)?,
                        CompositeOp::Div => math::divide(&acc, &rhs)?,
                        CompositeOp::CondAnd | CompositeOp::CondOr => unreachable!(),
                    };
                }
                Ok(acc)
            }
        }
    }

    /// True when evaluation cannot observe or mutate context state.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Const(_) => true,
            Expr::Unary(_, operand) => operand.is_constant(),
            Expr::Binary(_, left, right) => left.is_constant() && right.is_constant(),
            Expr::Composite(_, terms) => terms.iter().all(Expr::is_constant),
            Expr::Index { target, index } => target.is_constant() && index.is_constant(),
            Expr::Cast { source, .. } => source.is_constant(),
            _ => false,
        }
    }
}

fn index_value(target: &Value, index: &Value) -> Result<Value, EvalError> {
    match target {
        Value::Seq(items) => {
            let i = numeric_index(index)?;
            items.get(i).cloned().ok_or_else(|| {
                EvalError::type_mismatch(format!("index {} out of bounds", i))
            })
        }
        Value::Str(s) => {
            let i = numeric_index(index)?;
            s.chars().nth(i).map(Value::Char).ok_or_else(|| {
                EvalError::type_mismatch(format!("index {} out of bounds", i))
            })
        }
        Value::Map(entries) => entries
            .iter()
            .find(|(k, _)| k == index)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| EvalError::type_mismatch(format!("no entry for key {}", index))),
        other => Err(EvalError::type_mismatch(format!(
            "cannot index {}",
            other.type_name()
        ))),
    }
}

fn numeric_index(index: &Value) -> Result<usize, EvalError> {
    match convert(index, TypeKind::Long)? {
        Value::Long(n) if n >= 0 => Ok(n as usize),
        _ => Err(EvalError::type_mismatch(format!(
            "not a valid index: {}",
            index
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i32) -> Expr {
        Expr::Const(Value::Int(v))
    }

    #[test]
    fn sum_chain_folds_every_term() {
        let expr = Expr::Composite(CompositeOp::Add, vec![int(1), int(2), int(3), int(4)]);
        let mut ctx = Context::new();
        assert_eq!(expr.evaluate(&mut ctx).unwrap(), Value::Int(10));
    }

    #[test]
    fn conjunction_short_circuits() {
        // the would-be division by zero is never reached
        let poison = Expr::Composite(CompositeOp::Div, vec![int(1), int(0)]);
        let expr = Expr::Composite(
            CompositeOp::CondAnd,
            vec![Expr::Const(Value::Bool(false)), poison],
        );
        let mut ctx = Context::new();
        assert_eq!(expr.evaluate(&mut ctx).unwrap(), Value::Bool(false));
    }

    #[test]
    fn conditional_evaluates_one_branch() {
        let assign = Expr::Assignment {
            target: vec!["probe".into()],
            value: Box::new(int(1)),
        };
        let expr = Expr::Conditional {
            condition: Box::new(Expr::Const(Value::Bool(true))),
            then: Box::new(int(7)),
            otherwise: Box::new(assign),
        };
        let mut ctx = Context::new();
        assert_eq!(expr.evaluate(&mut ctx).unwrap(), Value::Int(7));
        assert!(!ctx.contains("probe"));
    }

    #[test]
    fn assignment_updates_the_context() {
        let expr = Expr::Assignment {
            target: vec!["x".into()],
            value: Box::new(int(5)),
        };
        let mut ctx = Context::new();
        assert_eq!(expr.evaluate(&mut ctx).unwrap(), Value::Int(5));
        assert_eq!(ctx.get("x"), Some(&Value::Int(5)));
    }

    #[test]
    fn string_indexing_yields_chars() {
        let expr = Expr::Index {
            target: Box::new(Expr::Const(Value::Str("Hello".into()))),
            index: Box::new(int(1)),
        };
        let mut ctx = Context::new();
        assert_eq!(expr.evaluate(&mut ctx).unwrap(), Value::Char('e'));
    }

    #[test]
    fn object_cast_is_a_no_op() {
        let expr = Expr::Cast {
            target: CastTarget::Any,
            source: Box::new(int(3)),
        };
        let mut ctx = Context::new();
        assert_eq!(expr.evaluate(&mut ctx).unwrap(), Value::Int(3));
    }

    #[test]
    fn constancy_is_structural() {
        let constant = Expr::Composite(CompositeOp::Mul, vec![int(2), int(3)]);
        assert!(constant.is_constant());
        let var = Expr::QualifiedName(vec!["x".into()]);
        assert!(!var.is_constant());
        let mixed = Expr::Composite(CompositeOp::Add, vec![int(1), var]);
        assert!(!mixed.is_constant());
    }
}
