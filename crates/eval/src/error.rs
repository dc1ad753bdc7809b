use quill_syntax::SyntaxError;
use thiserror::Error;

/// Errors raised while evaluating an expression. Typed by category;
/// messages always name the offending operand type(s).
///
/// Evaluation errors are never retried internally and side effects already
/// applied by earlier sub-expressions are not rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A name resolved neither to a variable nor to a loadable class.
    #[error("'{name}' is not defined")]
    UnresolvedName { name: String },

    /// A class name could not be resolved. Distinct from `UnresolvedName`
    /// because the invocation anchor search swallows this one and tries
    /// the next strategy.
    #[error("class not found: {name}")]
    UnknownClass { name: String },

    /// A resolved class or object has no such field or method.
    #[error("{class} has no member '{member}'")]
    UnknownMember { class: String, member: String },

    /// A member was called with the wrong number or shape of arguments.
    #[error("wrong arguments for {class}.{member}: {message}")]
    ArgumentMismatch {
        class: String,
        member: String,
        message: String,
    },

    /// An operation was applied to types that do not support it.
    #[error("{message}")]
    TypeMismatch { message: String },

    /// A value could not be converted to the requested type.
    #[error("cannot convert {value} of type {from} to {to}")]
    IllegalCast {
        value: String,
        from: String,
        to: String,
    },

    #[error("division by null")]
    DivisionByNull,

    #[error("division by zero")]
    DivisionByZero,

    #[error("cannot compare null")]
    CannotCompareNull,

    #[error("numeric overflow: {message}")]
    Overflow { message: String },
}

impl EvalError {
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        EvalError::TypeMismatch {
            message: message.into(),
        }
    }
}

/// Two error strata: parse-time (syntax) and evaluate-time (semantic).
/// Parse-time errors are fatal to that parse call; no partial AST is
/// ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}
