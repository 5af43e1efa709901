//! Lexing and parsing for the Java subset.
//!
//! The parser is a collaborator of the template pipeline: it is reset and
//! reused for every synthesised program, and its trees carry the trivia
//! the marker extractor reads.

pub mod lexer;
pub mod parser;

pub use parser::Parser;
