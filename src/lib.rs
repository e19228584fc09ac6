//! # Introduction
//!
//! pascc compiles a small Pascal subset to 32-bit assembler text. The front
//! end keeps going after syntax errors so a single run reports as many
//! problems as possible; the back end lowers whatever it can recognise.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Source → Lexer → Parser (+ SymbolTable) → SyntaxTree → Generator → Instr → Text
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds an arena syntax tree plus
//!    a symbol table, recording [`parser::errors::Diagnostic`]s on the way.
//! 2. [`codegen`]: walks the tree, produces abstract
//!    [`codegen::instr::Instr`]s and renders them through a
//!    [`codegen::BackendProfile`].
//! 3. [`error`]: driver-level failures (unreadable input, hard aborts).
//!
//! ## Supported subset
//!
//! Types: `integer`, `boolean`, `array [lo..hi] of` either.
//! Statements: assignment, `begin/end`, `if/then/else`, `goto`, labels.
//! `for`, `while` and `break` are parsed but not lowered.

pub mod codegen;
pub mod error;
pub mod parser;

use crate::codegen::{BackendProfile, CodegenError};
use crate::error::{CompileResult, ProfileSnafu, ReadSourceSnafu};
use crate::parser::{ParsedProgram, Parser};
use snafu::ResultExt;
use std::fs;
use std::path::Path;

/// Outcome of a compilation that got past parsing
#[derive(Debug)]
pub struct Compilation {
    pub program: ParsedProgram,
    pub token_count: usize,
    /// Rendered assembler text, or the error that stopped lowering
    pub output: Result<String, CodegenError>,
}

impl Compilation {
    /// Whether any diagnostic or codegen error was recorded
    pub fn has_errors(&self) -> bool {
        self.program.has_errors() || self.output.is_err()
    }

    /// Whether lowering found nothing to generate, which aborts the run
    /// like a parser abort
    pub fn is_abort(&self) -> bool {
        matches!(self.output, Err(CodegenError::EmptyTree { .. }))
    }
}

/// Parse and lower `source`.
///
/// Only hard aborts are returned as `Err`; soft diagnostics travel inside the
/// [`Compilation`] together with the best-effort tree.
pub fn compile(source: &str, profile: &BackendProfile) -> CompileResult<Compilation> {
    let mut parser = Parser::new(source)?;
    let token_count = parser.token_count();
    let program = parser.parse_program()?;
    let output = codegen::compile_tree(&program.tree, &program.symbols, profile);

    Ok(Compilation {
        program,
        token_count,
        output,
    })
}

/// Read `path` and compile it
pub fn compile_file(path: &Path, profile: &BackendProfile) -> CompileResult<Compilation> {
    let source = fs::read_to_string(path).context(ReadSourceSnafu { path })?;
    compile(&source, profile)
}

/// Load a backend profile file
pub fn load_profile(path: &Path) -> CompileResult<BackendProfile> {
    let text = fs::read_to_string(path).context(ReadSourceSnafu { path })?;
    text.parse().map_err(|err: codegen::profile::ProfileError| {
        ProfileSnafu {
            path,
            message: err.to_string(),
        }
        .build()
    })
}
