//! Code generation error types
//!
//! This module defines [`CodegenError`], which represents every way lowering a
//! syntax tree can fail. Each variant carries the value of the node that could
//! not be lowered.
//!
//! All codegen errors are fatal - generation stops at the first one. The
//! instructions produced before the failure are kept.

use std::fmt;

/// Errors raised while lowering a syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// The tree has neither declarations nor statements
    EmptyTree { program: String },

    /// The program root's left child is not a declaration list
    MissingDeclarations { found: String },

    /// A declaration without a usable type
    MissingType { name: String },

    /// Statement form the generator does not lower (loops, `break`, ...)
    UnsupportedStatement { statement: String },

    /// Reference to a name missing from the symbol table
    UndefinedVariable { name: String },

    /// Operator with no lowering in the current context
    UnknownOperator { operator: String },

    /// Node whose children do not match the expected shape
    MalformedNode { node: String },
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::EmptyTree { program } => {
                write!(f, "Nothing to generate: program '{}' is empty", program)
            }
            CodegenError::MissingDeclarations { found } => {
                write!(f, "Expected a 'var' section, found '{}'", found)
            }
            CodegenError::MissingType { name } => {
                write!(f, "Variable '{}' has no type", name)
            }
            CodegenError::UnsupportedStatement { statement } => {
                write!(f, "Unsupported statement '{}'", statement)
            }
            CodegenError::UndefinedVariable { name } => {
                write!(f, "Undefined variable '{}'", name)
            }
            CodegenError::UnknownOperator { operator } => {
                write!(f, "Unknown operator '{}'", operator)
            }
            CodegenError::MalformedNode { node } => {
                write!(f, "Malformed syntax tree at node '{}'", node)
            }
        }
    }
}

impl std::error::Error for CodegenError {}
