use serde::{Deserialize, Serialize};
use std::fmt;

/// A syntax error. Fatal to the parse call that raised it -- no partial
/// parse tree is ever returned alongside one.
///
/// `line` and `column` are 1-based; 0 means "unknown" (the source text was
/// too damaged to locate the offending token).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    /// The full text handed to the parser.
    pub text: String,
    pub line: u32,
    pub column: u32,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, text: &str, line: u32, column: u32) -> Self {
        SyntaxError {
            message: message.into(),
            text: text.to_owned(),
            line,
            column,
        }
    }

    /// An error without a usable position.
    pub fn unlocated(message: impl Into<String>, text: &str) -> Self {
        SyntaxError::new(message, text, 0, 0)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "syntax error at {}:{}: {} in '{}'",
                self.line, self.column, self.message, self.text
            )
        } else {
            write!(f, "syntax error: {} in '{}'", self.message, self.text)
        }
    }
}

impl std::error::Error for SyntaxError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_when_known() {
        let err = SyntaxError::new("expected expression", "3 + ", 1, 5);
        assert_eq!(
            err.to_string(),
            "syntax error at 1:5: expected expression in '3 + '"
        );
        let err = SyntaxError::unlocated("empty input", "");
        assert_eq!(err.to_string(), "syntax error: empty input in ''");
    }

    #[test]
    fn round_trips_through_json() {
        let err = SyntaxError::new("expected expression", "3 + ", 1, 5);
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(serde_json::from_str::<SyntaxError>(&json).unwrap(), err);
    }
}
