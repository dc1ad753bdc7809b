use crate::error::SyntaxError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Keywords
    Null,
    True,
    False,
    New,
    /// Integer literal -- digit text preserved so the tree builder can
    /// apply the literal width rule.
    Int(String),
    /// Decimal literal, including scientific notation. Kept as text.
    Decimal(String),
    /// String literal, raw: surrounding quotes and backslash escapes are
    /// kept verbatim for the tree builder to resolve.
    Str(String),
    Ident(String),
    // Operators, lowest precedence first
    Assign, // =
    Ques,   // ?
    Colon,  // :
    OrOr,   // ||
    AndAnd, // &&
    Bar,    // |
    Caret,  // ^
    Amp,    // &
    EqEq,   // ==
    BangEq, // !=
    Lt,     // <
    Le,     // <=
    Gt,     // >
    Ge,     // >=
    Shl,    // <<
    Shr,    // >>
    Ushr,   // >>>
    Plus,   // +
    Minus,  // -
    Star,   // *
    Slash,  // /
    Percent, // %
    Bang,   // !
    Tilde,  // ~
    Arrow,  // ->
    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Comma,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
    pub column: u32,
}

/// Tokenize a script. Positions are 1-based.
pub fn lex(src: &str) -> Result<Vec<Spanned>, SyntaxError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0usize;
    let mut line: u32 = 1;
    let mut col: u32 = 1;

    macro_rules! push {
        ($tok:expr, $l:expr, $c:expr) => {
            tokens.push(Spanned {
                token: $tok,
                line: $l,
                column: $c,
            })
        };
    }

    while pos < chars.len() {
        let c = chars[pos];

        // Whitespace
        if c.is_whitespace() {
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
            pos += 1;
            continue;
        }

        let tok_line = line;
        let tok_col = col;

        // String literal: single-quoted, escapes passed through raw
        if c == '\'' {
            let start = pos;
            pos += 1;
            col += 1;
            loop {
                if pos >= chars.len() {
                    return Err(SyntaxError::new(
                        "unterminated string literal",
                        src,
                        tok_line,
                        tok_col,
                    ));
                }
                let sc = chars[pos];
                if sc == '\\' {
                    // keep the escape verbatim, skip the escaped char
                    if pos + 1 >= chars.len() {
                        return Err(SyntaxError::new(
                            "unterminated escape in string literal",
                            src,
                            tok_line,
                            tok_col,
                        ));
                    }
                    pos += 2;
                    col += 2;
                    continue;
                }
                if sc == '\n' {
                    return Err(SyntaxError::new(
                        "unterminated string literal",
                        src,
                        tok_line,
                        tok_col,
                    ));
                }
                pos += 1;
                col += 1;
                if sc == '\'' {
                    break;
                }
            }
            let raw: String = chars[start..pos].iter().collect();
            push!(Token::Str(raw), tok_line, tok_col);
            continue;
        }

        // Number: digits, optional fraction, optional exponent.
        // A leading '-' is always a separate operator token.
        if c.is_ascii_digit() {
            let start = pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            let mut decimal = false;
            if pos + 1 < chars.len() && chars[pos] == '.' && chars[pos + 1].is_ascii_digit() {
                decimal = true;
                pos += 1;
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
            if pos < chars.len() && (chars[pos] == 'e' || chars[pos] == 'E') {
                let mut ahead = pos + 1;
                if ahead < chars.len() && (chars[ahead] == '+' || chars[ahead] == '-') {
                    ahead += 1;
                }
                if ahead < chars.len() && chars[ahead].is_ascii_digit() {
                    decimal = true;
                    pos = ahead;
                    while pos < chars.len() && chars[pos].is_ascii_digit() {
                        pos += 1;
                    }
                }
            }
            let text: String = chars[start..pos].iter().collect();
            col += (pos - start) as u32;
            if decimal {
                push!(Token::Decimal(text), tok_line, tok_col);
            } else {
                push!(Token::Int(text), tok_line, tok_col);
            }
            continue;
        }

        // Identifier or keyword
        if c.is_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            col += (pos - start) as u32;
            let token = match word.as_str() {
                "null" => Token::Null,
                "true" => Token::True,
                "false" => Token::False,
                "new" => Token::New,
                _ => Token::Ident(word),
            };
            push!(token, tok_line, tok_col);
            continue;
        }

        // Operators and punctuation
        let remaining = chars.len() - pos;
        let two = |o: usize, ch: char| remaining > o && chars[pos + o] == ch;
        let (token, width) = match c {
            '=' if two(1, '=') => (Token::EqEq, 2),
            '=' => (Token::Assign, 1),
            '?' => (Token::Ques, 1),
            ':' => (Token::Colon, 1),
            '|' if two(1, '|') => (Token::OrOr, 2),
            '|' => (Token::Bar, 1),
            '&' if two(1, '&') => (Token::AndAnd, 2),
            '&' => (Token::Amp, 1),
            '^' => (Token::Caret, 1),
            '!' if two(1, '=') => (Token::BangEq, 2),
            '!' => (Token::Bang, 1),
            '<' if two(1, '<') => (Token::Shl, 2),
            '<' if two(1, '=') => (Token::Le, 2),
            '<' => (Token::Lt, 1),
            '>' if two(1, '>') && two(2, '>') => (Token::Ushr, 3),
            '>' if two(1, '>') => (Token::Shr, 2),
            '>' if two(1, '=') => (Token::Ge, 2),
            '>' => (Token::Gt, 1),
            '+' => (Token::Plus, 1),
            '-' if two(1, '>') => (Token::Arrow, 2),
            '-' => (Token::Minus, 1),
            '*' => (Token::Star, 1),
            '/' => (Token::Slash, 1),
            '%' => (Token::Percent, 1),
            '~' => (Token::Tilde, 1),
            '(' => (Token::LParen, 1),
            ')' => (Token::RParen, 1),
            '[' => (Token::LBracket, 1),
            ']' => (Token::RBracket, 1),
            '{' => (Token::LBrace, 1),
            '}' => (Token::RBrace, 1),
            '.' => (Token::Dot, 1),
            ',' => (Token::Comma, 1),
            other => {
                return Err(SyntaxError::new(
                    format!("unexpected character '{}'", other),
                    src,
                    tok_line,
                    tok_col,
                ));
            }
        };
        push!(token, tok_line, tok_col);
        pos += width;
        col += width as u32;
    }

    tokens.push(Spanned {
        token: Token::Eof,
        line,
        column: col,
    });
    Ok(tokens)
}
