//! Errors surfaced by the compilation driver
//!
//! Stage-level problems keep their own types ([`Diagnostic`] for the front
//! end, [`CodegenError`](crate::codegen::CodegenError) for lowering). This
//! type only covers what stops the driver from producing a [`Compilation`]
//! at all.
//!
//! [`Compilation`]: crate::Compilation

use crate::parser::errors::Diagnostic;
use crate::parser::ParseFailure;
use snafu::Snafu;
use std::path::PathBuf;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
    #[snafu(display("cannot read '{}': {source}", path.display()))]
    ReadSource {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("compilation aborted after {} diagnostic(s)", diagnostics.len()))]
    Aborted { diagnostics: Vec<Diagnostic> },

    #[snafu(display("invalid backend profile '{}': {message}", path.display()))]
    Profile { path: PathBuf, message: String },
}

impl CompileError {
    /// Diagnostics recorded before a hard abort
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::Aborted { diagnostics } => diagnostics,
            _ => &[],
        }
    }
}

impl From<ParseFailure> for CompileError {
    fn from(failure: ParseFailure) -> Self {
        CompileError::Aborted {
            diagnostics: failure.diagnostics,
        }
    }
}
