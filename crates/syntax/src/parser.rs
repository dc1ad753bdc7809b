//! Recursive-descent parser for the Quill script grammar.
//!
//! Precedence and associativity are resolved here; the output is a typed
//! parse tree (`SynNode`) that the evaluator's tree builder consumes as-is.
//! One entry point per syntax category: expression, bean spec, bean-spec
//! list, weighted-literal list, transition list. Residual input after a
//! successful parse is a syntax error.

use crate::error::SyntaxError;
use crate::lexer::{lex, Spanned, Token};
use crate::tree::{SynKind, SynNode};

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    src: &'a str,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], src: &'a str) -> Self {
        Parser {
            tokens,
            pos: 0,
            src,
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn peek_at(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)].token
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, tok: &Token) -> bool {
        if self.peek() == tok {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Token) -> Result<(), SyntaxError> {
        if self.peek() == &tok {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {:?}, got {:?}", tok, self.peek())))
        }
    }

    fn err(&self, message: impl Into<String>) -> SyntaxError {
        let s = self.cur();
        SyntaxError::new(message, self.src, s.line, s.column)
    }

    fn node(&self, kind: SynKind, text: &str) -> SynNode {
        let s = self.cur();
        SynNode::new(kind, text, s.line, s.column)
    }

    /// Residual unconsumed input after a successful parse is an error.
    fn expect_end(&self, category: &str) -> Result<(), SyntaxError> {
        if self.peek() == &Token::Eof {
            Ok(())
        } else {
            Err(self.err(format!(
                "unexpected input after {}: {:?}",
                category,
                self.peek()
            )))
        }
    }

    // ── Expression grammar, lowest precedence first ─────────────

    fn expression(&mut self) -> Result<SynNode, SyntaxError> {
        if self.looks_like_assignment() {
            let lhs = self.qualified_name()?;
            let (line, column) = (self.cur().line, self.cur().column);
            self.expect(Token::Assign)?;
            let rhs = self.expression()?;
            return Ok(SynNode::with_children(
                SynKind::Assign,
                line,
                column,
                vec![lhs, rhs],
            ));
        }
        self.conditional()
    }

    /// True when the upcoming tokens are `ident (. ident)* =`.
    fn looks_like_assignment(&self) -> bool {
        let mut i = 0;
        if !matches!(self.peek_at(i), Token::Ident(_)) {
            return false;
        }
        i += 1;
        while self.peek_at(i) == &Token::Dot && matches!(self.peek_at(i + 1), Token::Ident(_)) {
            i += 2;
        }
        self.peek_at(i) == &Token::Assign
    }

    fn conditional(&mut self) -> Result<SynNode, SyntaxError> {
        let cond = self.cond_or()?;
        if self.peek() != &Token::Ques {
            return Ok(cond);
        }
        let (line, column) = (self.cur().line, self.cur().column);
        self.advance();
        let then = self.expression()?;
        self.expect(Token::Colon)?;
        let other = self.expression()?;
        Ok(SynNode::with_children(
            SynKind::Cond,
            line,
            column,
            vec![cond, then, other],
        ))
    }

    fn binary(
        &mut self,
        left: SynNode,
        kind: SynKind,
        right: SynNode,
        line: u32,
        column: u32,
    ) -> SynNode {
        SynNode::with_children(kind, line, column, vec![left, right])
    }

    fn cond_or(&mut self) -> Result<SynNode, SyntaxError> {
        let mut left = self.cond_and()?;
        while self.peek() == &Token::OrOr {
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let right = self.cond_and()?;
            left = self.binary(left, SynKind::CondOr, right, l, c);
        }
        Ok(left)
    }

    fn cond_and(&mut self) -> Result<SynNode, SyntaxError> {
        let mut left = self.bit_or()?;
        while self.peek() == &Token::AndAnd {
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let right = self.bit_or()?;
            left = self.binary(left, SynKind::CondAnd, right, l, c);
        }
        Ok(left)
    }

    fn bit_or(&mut self) -> Result<SynNode, SyntaxError> {
        let mut left = self.bit_xor()?;
        while self.peek() == &Token::Bar {
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let right = self.bit_xor()?;
            left = self.binary(left, SynKind::BitOr, right, l, c);
        }
        Ok(left)
    }

    fn bit_xor(&mut self) -> Result<SynNode, SyntaxError> {
        let mut left = self.bit_and()?;
        while self.peek() == &Token::Caret {
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let right = self.bit_and()?;
            left = self.binary(left, SynKind::BitXor, right, l, c);
        }
        Ok(left)
    }

    fn bit_and(&mut self) -> Result<SynNode, SyntaxError> {
        let mut left = self.equality()?;
        while self.peek() == &Token::Amp {
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let right = self.equality()?;
            left = self.binary(left, SynKind::BitAnd, right, l, c);
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<SynNode, SyntaxError> {
        let mut left = self.relational()?;
        loop {
            let kind = match self.peek() {
                Token::EqEq => SynKind::Eq,
                Token::BangEq => SynKind::Ne,
                _ => return Ok(left),
            };
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let right = self.relational()?;
            left = self.binary(left, kind, right, l, c);
        }
    }

    fn relational(&mut self) -> Result<SynNode, SyntaxError> {
        let mut left = self.shift()?;
        loop {
            let kind = match self.peek() {
                Token::Lt => SynKind::Lt,
                Token::Le => SynKind::Le,
                Token::Gt => SynKind::Gt,
                Token::Ge => SynKind::Ge,
                _ => return Ok(left),
            };
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let right = self.shift()?;
            left = self.binary(left, kind, right, l, c);
        }
    }

    fn shift(&mut self) -> Result<SynNode, SyntaxError> {
        let mut left = self.additive()?;
        loop {
            let kind = match self.peek() {
                Token::Shl => SynKind::Shl,
                Token::Shr => SynKind::Shr,
                Token::Ushr => SynKind::Ushr,
                _ => return Ok(left),
            };
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let right = self.additive()?;
            left = self.binary(left, kind, right, l, c);
        }
    }

    fn additive(&mut self) -> Result<SynNode, SyntaxError> {
        let mut left = self.multiplicative()?;
        loop {
            let kind = match self.peek() {
                Token::Plus => SynKind::Add,
                Token::Minus => SynKind::Sub,
                _ => return Ok(left),
            };
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let right = self.multiplicative()?;
            left = self.binary(left, kind, right, l, c);
        }
    }

    fn multiplicative(&mut self) -> Result<SynNode, SyntaxError> {
        let mut left = self.unary()?;
        loop {
            let kind = match self.peek() {
                Token::Star => SynKind::Mul,
                Token::Slash => SynKind::Div,
                Token::Percent => SynKind::Mod,
                _ => return Ok(left),
            };
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let right = self.unary()?;
            left = self.binary(left, kind, right, l, c);
        }
    }

    fn unary(&mut self) -> Result<SynNode, SyntaxError> {
        let kind = match self.peek() {
            Token::Minus => Some(SynKind::Negation),
            Token::Bang => Some(SynKind::LogicalNot),
            Token::Tilde => Some(SynKind::BitNot),
            _ => None,
        };
        if let Some(kind) = kind {
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let term = self.unary()?;
            return Ok(SynNode::with_children(kind, l, c, vec![term]));
        }
        if self.peek() == &Token::LParen && self.looks_like_cast() {
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let qn = self.qualified_name()?;
            let type_name = SynNode::with_children(SynKind::TypeName, l, c, vec![qn]);
            self.expect(Token::RParen)?;
            let term = self.unary()?;
            return Ok(SynNode::with_children(
                SynKind::Cast,
                l,
                c,
                vec![type_name, term],
            ));
        }
        self.postfix()
    }

    /// Distinguishes `(type) operand` from a parenthesized expression.
    /// `(name) x` is unambiguous (a paren expression cannot be followed
    /// by an identifier), but `-`, `(` and literals can legally follow a
    /// closing paren, so those lookaheads only make a cast when the
    /// parenthesized name is a primitive type name: `(x) - 1` subtracts,
    /// `(int) - 1` casts.
    fn looks_like_cast(&self) -> bool {
        let mut i = 1;
        let single = match self.peek_at(i) {
            Token::Ident(name) => Some(name.as_str()),
            _ => return false,
        };
        i += 1;
        let mut dotted = false;
        while self.peek_at(i) == &Token::Dot && matches!(self.peek_at(i + 1), Token::Ident(_)) {
            dotted = true;
            i += 2;
        }
        if self.peek_at(i) != &Token::RParen {
            return false;
        }
        let primitive = !dotted && single.is_some_and(is_type_name);
        match self.peek_at(i + 1) {
            Token::Ident(_) | Token::Str(_) | Token::New | Token::Bang | Token::Tilde => true,
            Token::Null
            | Token::True
            | Token::False
            | Token::Int(_)
            | Token::Decimal(_)
            | Token::LParen
            | Token::Minus => primitive,
            _ => false,
        }
    }

    fn postfix(&mut self) -> Result<SynNode, SyntaxError> {
        let mut node = self.primary()?;
        loop {
            match self.peek() {
                Token::Dot => {
                    let (l, c) = (self.cur().line, self.cur().column);
                    self.advance();
                    let name = self.ident()?;
                    if self.peek() == &Token::LParen {
                        let args = self.arguments()?;
                        node = SynNode::with_children(
                            SynKind::SubInvocation,
                            l,
                            c,
                            vec![node, name, args],
                        );
                    } else {
                        node =
                            SynNode::with_children(SynKind::Field, l, c, vec![node, name]);
                    }
                }
                Token::LBracket => {
                    let (l, c) = (self.cur().line, self.cur().column);
                    self.advance();
                    let key = self.expression()?;
                    self.expect(Token::RBracket)?;
                    node = SynNode::with_children(SynKind::Index, l, c, vec![node, key]);
                }
                _ => return Ok(node),
            }
        }
    }

    fn primary(&mut self) -> Result<SynNode, SyntaxError> {
        match self.peek().clone() {
            Token::Null => {
                let n = self.node(SynKind::NullLit, "null");
                self.advance();
                Ok(n)
            }
            Token::True => {
                let n = self.node(SynKind::BoolLit, "true");
                self.advance();
                Ok(n)
            }
            Token::False => {
                let n = self.node(SynKind::BoolLit, "false");
                self.advance();
                Ok(n)
            }
            Token::Int(text) => {
                let n = self.node(SynKind::IntLit, &text);
                self.advance();
                Ok(n)
            }
            Token::Decimal(text) => {
                let n = self.node(SynKind::DecimalLit, &text);
                self.advance();
                Ok(n)
            }
            Token::Str(raw) => {
                let n = self.node(SynKind::StringLit, &raw);
                self.advance();
                Ok(n)
            }
            Token::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::New => self.construction(),
            Token::Ident(_) => {
                let qn = self.qualified_name()?;
                if self.peek() == &Token::LParen {
                    let (l, c) = (qn.line, qn.column);
                    let args = self.arguments()?;
                    Ok(SynNode::with_children(
                        SynKind::Invocation,
                        l,
                        c,
                        vec![qn, args],
                    ))
                } else {
                    Ok(qn)
                }
            }
            other => Err(self.err(format!("expected expression, got {:?}", other))),
        }
    }

    /// `new QN(args)` or `new QN{name=value, ...}`.
    fn construction(&mut self) -> Result<SynNode, SyntaxError> {
        let (l, c) = (self.cur().line, self.cur().column);
        self.expect(Token::New)?;
        let qn = self.qualified_name()?;
        match self.peek() {
            Token::LParen => {
                let args = self.arguments()?;
                Ok(SynNode::with_children(
                    SynKind::Constructor,
                    l,
                    c,
                    vec![qn, args],
                ))
            }
            Token::LBrace => {
                self.advance();
                let mut children = vec![qn];
                if !self.eat(&Token::RBrace) {
                    loop {
                        children.push(self.prop_assign()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                    self.expect(Token::RBrace)?;
                }
                Ok(SynNode::with_children(SynKind::Bean, l, c, children))
            }
            other => Err(self.err(format!("expected '(' or '{{' after new, got {:?}", other))),
        }
    }

    fn prop_assign(&mut self) -> Result<SynNode, SyntaxError> {
        let name = self.ident()?;
        let (l, c) = (self.cur().line, self.cur().column);
        self.expect(Token::Assign)?;
        let value = self.expression()?;
        Ok(SynNode::with_children(
            SynKind::PropAssign,
            l,
            c,
            vec![name, value],
        ))
    }

    fn arguments(&mut self) -> Result<SynNode, SyntaxError> {
        let (l, c) = (self.cur().line, self.cur().column);
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.expression()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
        }
        Ok(SynNode::with_children(SynKind::Args, l, c, args))
    }

    fn ident(&mut self) -> Result<SynNode, SyntaxError> {
        if let Token::Ident(name) = self.peek().clone() {
            let n = self.node(SynKind::Ident, &name);
            self.advance();
            Ok(n)
        } else {
            Err(self.err(format!("expected identifier, got {:?}", self.peek())))
        }
    }

    fn qualified_name(&mut self) -> Result<SynNode, SyntaxError> {
        let (l, c) = (self.cur().line, self.cur().column);
        let mut parts = vec![self.ident()?];
        while self.peek() == &Token::Dot && matches!(self.peek_at(1), Token::Ident(_)) {
            self.advance();
            parts.push(self.ident()?);
        }
        Ok(SynNode::with_children(SynKind::QualifiedName, l, c, parts))
    }

    // ── Weighted lists ──────────────────────────────────────────

    /// A literal as allowed in weighted/transition lists: an optionally
    /// negated scalar literal.
    fn list_literal(&mut self) -> Result<SynNode, SyntaxError> {
        if self.peek() == &Token::Minus {
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let term = self.list_literal()?;
            return Ok(SynNode::with_children(SynKind::Negation, l, c, vec![term]));
        }
        match self.peek().clone() {
            Token::Null | Token::True | Token::False => self.primary(),
            Token::Int(_) | Token::Decimal(_) | Token::Str(_) => self.primary(),
            other => Err(self.err(format!("expected literal, got {:?}", other))),
        }
    }

    /// `literal [^ weight]`
    fn weighted_literal(&mut self) -> Result<SynNode, SyntaxError> {
        let value = self.list_literal()?;
        if self.peek() == &Token::Caret {
            let (l, c) = (self.cur().line, self.cur().column);
            self.advance();
            let weight = self.list_literal()?;
            Ok(SynNode::with_children(
                SynKind::Caret,
                l,
                c,
                vec![value, weight],
            ))
        } else {
            Ok(value)
        }
    }

    /// `from -> to [^ weight]`
    fn transition(&mut self) -> Result<SynNode, SyntaxError> {
        let from = self.list_literal()?;
        let (l, c) = (self.cur().line, self.cur().column);
        self.expect(Token::Arrow)?;
        let to = self.list_literal()?;
        let mut children = vec![from, to];
        if self.eat(&Token::Caret) {
            children.push(self.list_literal()?);
        }
        Ok(SynNode::with_children(SynKind::Arrow, l, c, children))
    }

    fn bean_spec(&mut self) -> Result<SynNode, SyntaxError> {
        let (l, c) = (self.cur().line, self.cur().column);
        let inner = self.expression()?;
        Ok(SynNode::with_children(SynKind::BeanSpec, l, c, vec![inner]))
    }
}

/// Primitive type names that may cast ambiguous operands such as
/// `- 1` or a parenthesized expression. Class casts never get the
/// ambiguous lookaheads, so this list stays closed.
fn is_type_name(name: &str) -> bool {
    matches!(
        name,
        "boolean"
            | "char"
            | "byte"
            | "short"
            | "int"
            | "long"
            | "big_integer"
            | "float"
            | "double"
            | "big_decimal"
            | "string"
            | "date"
            | "time"
            | "timestamp"
            | "zoneddatetime"
            | "object"
    )
}

// ── Entry points ────────────────────────────────────────────────

/// Parse one expression; trailing input is an error.
pub fn parse_expression(text: &str) -> Result<SynNode, SyntaxError> {
    let tokens = lex(text)?;
    let mut p = Parser::new(&tokens, text);
    let node = p.expression()?;
    p.expect_end("expression")?;
    Ok(node)
}

/// Parse one bean spec: an expression, qualified name or construction.
pub fn parse_bean_spec(text: &str) -> Result<SynNode, SyntaxError> {
    let tokens = lex(text)?;
    let mut p = Parser::new(&tokens, text);
    let node = p.bean_spec()?;
    p.expect_end("bean spec")?;
    Ok(node)
}

/// Parse a comma-separated bean-spec list.
pub fn parse_bean_spec_list(text: &str) -> Result<Vec<SynNode>, SyntaxError> {
    let tokens = lex(text)?;
    let mut p = Parser::new(&tokens, text);
    let mut specs = vec![p.bean_spec()?];
    while p.eat(&Token::Comma) {
        specs.push(p.bean_spec()?);
    }
    p.expect_end("bean spec list")?;
    Ok(specs)
}

/// Parse a comma-separated weighted-literal list (`value[^weight]`).
pub fn parse_weighted_literal_list(text: &str) -> Result<Vec<SynNode>, SyntaxError> {
    let tokens = lex(text)?;
    let mut p = Parser::new(&tokens, text);
    let mut items = vec![p.weighted_literal()?];
    while p.eat(&Token::Comma) {
        items.push(p.weighted_literal()?);
    }
    p.expect_end("weighted literal list")?;
    Ok(items)
}

/// Parse a comma-separated transition list (`from->to[^weight]`).
pub fn parse_transition_list(text: &str) -> Result<Vec<SynNode>, SyntaxError> {
    let tokens = lex(text)?;
    let mut p = Parser::new(&tokens, text);
    let mut items = vec![p.transition()?];
    while p.eat(&Token::Comma) {
        items.push(p.transition()?);
    }
    p.expect_end("transition list")?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_shapes_the_tree() {
        // 2 + 7 * 5 - 1  =>  (- (+ 2 (* 7 5)) 1)
        let n = parse_expression("2 + 7 * 5 - 1").unwrap();
        assert_eq!(n.kind, SynKind::Sub);
        assert_eq!(n.child(0).kind, SynKind::Add);
        assert_eq!(n.child(0).child(1).kind, SynKind::Mul);
        assert_eq!(n.child(1).kind, SynKind::IntLit);
    }

    #[test]
    fn subtraction_is_left_associative() {
        // 6 - 3 - 2 => (- (- 6 3) 2)
        let n = parse_expression("6 - 3 - 2").unwrap();
        assert_eq!(n.kind, SynKind::Sub);
        assert_eq!(n.child(0).kind, SynKind::Sub);
        assert_eq!(n.child(0).child(0).text, "6");
        assert_eq!(n.child(1).text, "2");
    }

    #[test]
    fn cast_versus_parenthesized_expression() {
        let cast = parse_expression("(int) (1 + 0.5)").unwrap();
        assert_eq!(cast.kind, SynKind::Cast);
        assert_eq!(cast.child(0).kind, SynKind::TypeName);

        let paren = parse_expression("(false ? 1 : 2)").unwrap();
        assert_eq!(paren.kind, SynKind::Cond);
    }

    #[test]
    fn parenthesized_name_before_minus_is_not_a_cast() {
        // `(x) - 1` subtracts from the variable x; only a primitive
        // type name makes `- 1` a cast operand.
        let sub = parse_expression("(x) - 1").unwrap();
        assert_eq!(sub.kind, SynKind::Sub);
        assert_eq!(sub.child(0).kind, SynKind::QualifiedName);

        let cast = parse_expression("(int) - 1").unwrap();
        assert_eq!(cast.kind, SynKind::Cast);
        assert_eq!(cast.child(1).kind, SynKind::Negation);
    }

    #[test]
    fn qualified_invocation_keeps_the_whole_path() {
        let n = parse_expression("a.b.trim()").unwrap();
        assert_eq!(n.kind, SynKind::Invocation);
        assert_eq!(n.child(0).children.len(), 3);
    }

    #[test]
    fn sub_invocation_on_literal_target() {
        let n = parse_expression("'Hello'.substring(1,3).charAt(1)").unwrap();
        assert_eq!(n.kind, SynKind::SubInvocation);
        assert_eq!(n.child(0).kind, SynKind::SubInvocation);
        assert_eq!(n.child(0).child(0).kind, SynKind::StringLit);
    }

    #[test]
    fn assignment_requires_a_name_path() {
        let n = parse_expression("x = x + 2").unwrap();
        assert_eq!(n.kind, SynKind::Assign);
        assert_eq!(n.child(0).kind, SynKind::QualifiedName);
        assert_eq!(n.child(1).kind, SynKind::Add);
    }

    #[test]
    fn bean_construction_with_named_properties() {
        let n = parse_expression("new a.b.Person{name='Alice', score=102}").unwrap();
        assert_eq!(n.kind, SynKind::Bean);
        assert_eq!(n.children.len(), 3);
        assert_eq!(n.child(1).kind, SynKind::PropAssign);
        assert_eq!(n.child(1).child(0).text, "name");
    }

    #[test]
    fn trailing_input_is_rejected() {
        let err = parse_expression("1 + 2 3").unwrap_err();
        assert!(err.message.contains("unexpected input"));
    }

    #[test]
    fn truncated_expression_is_rejected() {
        assert!(parse_expression("3 + ").is_err());
    }

    #[test]
    fn weighted_list_shapes() {
        let items = parse_weighted_literal_list("'A',1^0.5").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, SynKind::StringLit);
        assert_eq!(items[1].kind, SynKind::Caret);
    }

    #[test]
    fn transition_list_shapes() {
        let items = parse_transition_list("'A'->'B',1->2^0.5").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, SynKind::Arrow);
        assert_eq!(items[0].children.len(), 2);
        assert_eq!(items[1].children.len(), 3);
    }

    #[test]
    fn conditional_is_right_associative() {
        let n = parse_expression("2 > 1 ? (4 > 3 ? '4' : '3') : (7 < 6 ? 6 : 7)").unwrap();
        assert_eq!(n.kind, SynKind::Cond);
        assert_eq!(n.child(1).kind, SynKind::Cond);
        assert_eq!(n.child(2).kind, SynKind::Cond);
    }
}
