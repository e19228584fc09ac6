//! Pascal-subset front end
//!
//! This module transforms source text into a syntax tree:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → syntax tree + symbol table)
//! - [`ast`]: Arena syntax tree and node shapes
//! - [`symbols`]: Declared variables and their types
//! - [`errors`]: Diagnostics shared by lexer and parser
//!
//! # Supported Subset
//!
//! - Types: `integer`, `boolean`, one-dimensional `array [lo..hi] of` either
//! - Statements: assignment, `begin ... end`, `if/then/else`, `goto`, labels,
//!   and `for`/`while`/`break` (parsed only)
//! - Expressions: arithmetic, comparisons, `and`/`or`/`xor`, array elements
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary
//! operators. No external parser generator dependencies.

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod parse;
pub mod symbols;

mod declarations;
mod expressions;
mod statements;

pub use parse::{ParseFailure, ParsedProgram, Parser};
