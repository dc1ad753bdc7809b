//! quill-syntax: front end of the Quill expression language.
//!
//! Tokenizes and parses script text into a typed parse tree (`SynNode`).
//! The interpreter core (`quill-eval`) consumes that tree as-is; literal
//! width and escape rules are applied there, which is why literal nodes
//! carry their source text verbatim.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod tree;

pub use error::SyntaxError;
pub use parser::{
    parse_bean_spec, parse_bean_spec_list, parse_expression, parse_transition_list,
    parse_weighted_literal_list,
};
pub use tree::{SynKind, SynNode};
