/// Typed parse tree handed to the interpreter core.
///
/// The parser resolves precedence and associativity; every node here is
/// already shaped the way the evaluator's tree builder expects it. Literal
/// text is carried verbatim (quotes, escapes, digit strings) -- width and
/// escape rules are applied downstream.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynKind {
    // Literals and names
    NullLit,
    BoolLit,
    IntLit,
    DecimalLit,
    StringLit,
    /// A single name segment, used for member names and qualified-name parts.
    Ident,
    /// Dotted identifier path; children are Ident nodes.
    QualifiedName,
    /// Cast target; one QualifiedName child.
    TypeName,
    // Object construction
    /// `new QN(args)`; children: QualifiedName, Args.
    Constructor,
    /// `new QN{k=v,...}`; children: QualifiedName, PropAssign*.
    Bean,
    /// `name = expr` inside a Bean body; children: Ident, expr.
    PropAssign,
    /// Wrapper for one bean-spec entry; one child.
    BeanSpec,
    // Calls and member access
    /// `a.b.method(args)`; children: QualifiedName, Args.
    Invocation,
    /// `expr.method(args)`; children: target, Ident, Args.
    SubInvocation,
    /// Argument list; children are expressions.
    Args,
    /// `target[key]`; children: target, key.
    Index,
    /// `target.name`; children: target, Ident.
    Field,
    /// `(type) expr`; children: TypeName, expr.
    Cast,
    // Unary
    Negation,
    LogicalNot,
    BitNot,
    // Binary / n-ary operators
    Add,
    Sub,
    Mul,
    Div,
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
    CondAnd,
    CondOr,
    /// `c ? a : b`; children: condition, then, else.
    Cond,
    /// `qn = expr`; children: QualifiedName, expr.
    Assign,
    // Weighted lists
    /// `value ^ weight`; children: value, weight.
    Caret,
    /// `from -> to [^ weight]`; children: from, to, optional weight.
    Arrow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynNode {
    pub kind: SynKind,
    /// Literal or identifier text; empty for structural nodes.
    pub text: String,
    pub line: u32,
    pub column: u32,
    pub children: Vec<SynNode>,
}

impl SynNode {
    pub fn new(kind: SynKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        SynNode {
            kind,
            text: text.into(),
            line,
            column,
            children: Vec::new(),
        }
    }

    pub fn with_children(
        kind: SynKind,
        line: u32,
        column: u32,
        children: Vec<SynNode>,
    ) -> Self {
        SynNode {
            kind,
            text: String::new(),
            line,
            column,
            children,
        }
    }

    pub fn child(&self, index: usize) -> &SynNode {
        &self.children[index]
    }
}
