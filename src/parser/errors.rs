//! Diagnostics recorded by the lexer and parser
//!
//! [`ErrorKind`] is the closed set of problems the front end can report.
//! A [`Diagnostic`] pairs a kind with the offending token text and its
//! location. Most diagnostics are recorded and parsing continues; the parser
//! decides from context which of them abort the run.

use crate::parser::ast::SourceLocation;
use std::fmt;

/// Every problem the lexer or parser can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownLexeme,
    PrematureEof,
    ExpectedIdentifier,
    ExpectedSemicolon,
    ExpectedProgram,
    /// Raised after an identifier list that is followed by neither `,` nor
    /// `:`, so it also covers a missing `:` before the type clause
    ExpectedComma,
    ExpectedConstant,
    ExpectedComparison,
    ExpectedType,
    ExpectedDot,
    ExpectedRangeDots,
    ExpectedAssignment,
    ExpectedOpenParen,
    ExpectedCloseParen,
    ExpectedOpenBracket,
    ExpectedCloseBracket,
    ExpectedDo,
    ExpectedTo,
    ExpectedThen,
    ExpectedOf,
    DuplicateIdentifier,
    UnknownIdentifier,
    WrongArrayIndexType,
    ArrayIndexOutOfRange,
}

impl ErrorKind {
    fn describe(self, text: &str) -> String {
        match self {
            ErrorKind::UnknownLexeme => format!("unknown lexeme '{text}'"),
            ErrorKind::PrematureEof => "premature end of file".to_string(),
            ErrorKind::ExpectedIdentifier => format!("must be identifier instead of '{text}'"),
            ErrorKind::ExpectedSemicolon => format!("must be ';' instead of '{text}'"),
            ErrorKind::ExpectedProgram => {
                format!("program must start with 'program', found '{text}'")
            }
            ErrorKind::ExpectedComma => format!("must be ',' or ':' instead of '{text}'"),
            ErrorKind::ExpectedConstant => format!("must be constant instead of '{text}'"),
            ErrorKind::ExpectedComparison => {
                format!("condition must be a comparison, found '{text}'")
            }
            ErrorKind::ExpectedType => format!("must be type instead of '{text}'"),
            ErrorKind::ExpectedDot => format!("program must end with '.', found '{text}'"),
            ErrorKind::ExpectedRangeDots => format!("must be '..' instead of '{text}'"),
            ErrorKind::ExpectedAssignment => format!("must be ':=' instead of '{text}'"),
            ErrorKind::ExpectedOpenParen => format!("missing '(' before '{text}'"),
            ErrorKind::ExpectedCloseParen => format!("must be ')' instead of '{text}'"),
            ErrorKind::ExpectedOpenBracket => format!("must be '[' instead of '{text}'"),
            ErrorKind::ExpectedCloseBracket => format!("must be ']' instead of '{text}'"),
            ErrorKind::ExpectedDo => format!("must be 'do' instead of '{text}'"),
            ErrorKind::ExpectedTo => format!("must be 'to' or 'downto' instead of '{text}'"),
            ErrorKind::ExpectedThen => format!("must be 'then' instead of '{text}'"),
            ErrorKind::ExpectedOf => format!("must be 'of' instead of '{text}'"),
            ErrorKind::DuplicateIdentifier => format!("duplicate identifier '{text}'"),
            ErrorKind::UnknownIdentifier => format!("undefined variable '{text}'"),
            ErrorKind::WrongArrayIndexType => format!("wrong array index type at '{text}'"),
            ErrorKind::ArrayIndexOutOfRange => format!("array index out of range at '{text}'"),
        }
    }
}

/// A single recorded lexer or parser problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub text: String,
    pub location: SourceLocation,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Diagnostic {
            kind,
            text: text.into(),
            location,
        }
    }

    pub fn message(&self) -> String {
        self.kind.describe(&self.text)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.kind {
            ErrorKind::UnknownLexeme => "Lexer",
            _ => "Syntax",
        };
        write!(
            f,
            "{} error at line {}, column {}: {}",
            stage,
            self.location.line,
            self.location.column,
            self.message()
        )
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_token_and_line() {
        let diag = Diagnostic::new(ErrorKind::ExpectedSemicolon, "end", SourceLocation::new(4, 7));
        assert_eq!(
            diag.to_string(),
            "Syntax error at line 4, column 7: must be ';' instead of 'end'"
        );
    }

    #[test]
    fn test_lexer_stage_label() {
        let diag = Diagnostic::new(ErrorKind::UnknownLexeme, "?", SourceLocation::new(1, 3));
        assert!(diag.to_string().starts_with("Lexer error at line 1"));
    }
}
