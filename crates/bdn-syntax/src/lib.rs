//! Bali Document Notation: literal types, scanner, parser and formatter.
//!
//! This crate provides:
//! - A library of literal value types with canonical text forms
//! - Ranges over ordered literals
//! - A scanner that runs on a worker thread and streams tokens to the parser
//! - A backtracking parser producing a component tree
//! - A canonical formatter that inverts the parser
//!
//! # Example
//!
//! ```
//! use bdn_syntax::{format_document, FormatConfig, Parser};
//!
//! let source = "[\n    $foo\n    $bar\n]\n";
//!
//! let document = Parser::parse(source).unwrap();
//! assert_eq!(format_document(&document, &FormatConfig::default()), source);
//! ```

pub mod ast;
pub mod error;
pub mod format;
pub mod grammar;
pub mod literal;
pub mod parser;
pub mod range;
pub mod scanner;
pub mod span;
pub mod token;

#[cfg(test)]
mod proptest_support;

pub use ast::*;
pub use error::{Diagnostic, LiteralError, ParseError, ParseResult, TypeError};
pub use format::{format, format_document, FormatConfig};
pub use literal::{Element, Family, Primitive, Sequential, StringType};
pub use parser::{ParseConfig, Parser};
pub use range::{Extent, Range};
pub use scanner::{tokenize, Scanner};
pub use span::Span;
pub use token::{Token, TokenKind};
