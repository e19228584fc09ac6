//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the result types, helper methods, and the top-level driver.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and the block driver
//! - `declarations`: the `var` section and the symbol table
//! - `statements`: compound, assignment, `if`, loops, `goto`
//! - `expressions`: expressions with precedence climbing over the tree
//!
//! # Error Recovery
//!
//! Syntax problems are recorded as [`Diagnostic`]s and parsing continues from
//! the nearest sensible point, so one run reports as many problems as
//! possible. A missing `program` header, empty input and premature end of
//! file abort the run instead; they surface as a [`ParseFailure`].

use crate::parser::ast::{NodeId, SourceLocation, SyntaxTree};
use crate::parser::errors::{Diagnostic, ErrorKind};
use crate::parser::lexer::{Lexer, Token, TokenKind};
use crate::parser::symbols::SymbolTable;
use std::fmt;

/// Marker for a hard abort; the cause is already recorded in the diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fatal;

pub(crate) type ParseResult<T> = Result<T, Fatal>;

/// Hard abort of the parse, with every diagnostic recorded up to that point
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub diagnostics: Vec<Diagnostic>,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parsing aborted")?;
        for diag in &self.diagnostics {
            write!(f, "\n  {diag}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseFailure {}

/// Result of a parse that reached the end of the program
#[derive(Debug, Clone)]
pub struct ParsedProgram {
    pub tree: SyntaxTree,
    pub symbols: SymbolTable,
    /// Soft errors; the tree is best-effort when this is non-empty
    pub diagnostics: Vec<Diagnostic>,
    /// Whether the terminating `.` was seen
    pub finished: bool,
}

impl ParsedProgram {
    pub fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Name declared in the `program` header
    pub fn name(&self) -> Option<&str> {
        self.root().map(|root| self.tree[root].value())
    }
}

/// Recursive descent parser for the Pascal subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) tree: SyntaxTree,
    pub(crate) symbols: SymbolTable,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Sentinel link at the end of the declaration chain
    pub(crate) decl_tail: Option<NodeId>,
    /// Compound statements opened so far; numbers the statement labels
    pub(crate) compound_count: usize,
    /// Current `begin`/`end` nesting
    pub(crate) compound_depth: usize,
}

impl Parser {
    /// Tokenize `source` and prepare a parser over it.
    ///
    /// Input without a single token aborts immediately.
    pub fn new(source: &str) -> Result<Self, ParseFailure> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();
        let mut diagnostics = lexer.take_diagnostics();

        if tokens[0].kind == TokenKind::Eof {
            diagnostics.push(Diagnostic::new(
                ErrorKind::PrematureEof,
                tokens[0].text.clone(),
                tokens[0].location,
            ));
            return Err(ParseFailure { diagnostics });
        }

        Ok(Self {
            tokens,
            position: 0,
            tree: SyntaxTree::new(),
            symbols: SymbolTable::new(),
            diagnostics,
            decl_tail: None,
            compound_count: 0,
            compound_depth: 0,
        })
    }

    /// Number of tokens produced by the lexer, including the final EOF
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Parse the whole program: header, then `var` and `begin` blocks up to `.`
    pub fn parse_program(&mut self) -> Result<ParsedProgram, ParseFailure> {
        match self.parse_blocks() {
            Ok(finished) => Ok(ParsedProgram {
                tree: std::mem::take(&mut self.tree),
                symbols: std::mem::take(&mut self.symbols),
                diagnostics: std::mem::take(&mut self.diagnostics),
                finished,
            }),
            Err(Fatal) => Err(ParseFailure {
                diagnostics: std::mem::take(&mut self.diagnostics),
            }),
        }
    }

    fn parse_blocks(&mut self) -> ParseResult<bool> {
        let root = self.parse_header()?;
        self.tree.set_root(root);

        loop {
            match self.peek_kind() {
                TokenKind::Var => self.parse_var_section(root)?,
                TokenKind::Begin => {
                    let body = self.parse_compound()?;
                    self.tree.attach_right(root, body);
                }
                TokenKind::Dot => {
                    self.advance();
                    return Ok(true);
                }
                TokenKind::Eof => {
                    if self.tree[root].right().is_none() {
                        return Err(self.fatal(ErrorKind::PrematureEof));
                    }
                    return Ok(false);
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// `program <id> ;`: creates the root node named after the program
    fn parse_header(&mut self) -> ParseResult<NodeId> {
        if !self.check(TokenKind::Program) {
            return Err(self.fatal(ErrorKind::ExpectedProgram));
        }
        self.advance();

        let name = match self.peek_kind() {
            TokenKind::Identifier => self.advance().text.clone(),
            TokenKind::Eof => return Err(self.fatal(ErrorKind::PrematureEof)),
            _ => return Err(self.fatal(ErrorKind::ExpectedIdentifier)),
        };

        match self.peek_kind() {
            TokenKind::Semicolon => {
                self.advance();
            }
            TokenKind::Eof => return Err(self.fatal(ErrorKind::PrematureEof)),
            _ => return Err(self.fatal(ErrorKind::ExpectedSemicolon)),
        }

        Ok(self.tree.create_node(name))
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    pub(crate) fn peek_ahead_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.position + n)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token and return it; EOF is never consumed
    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
            &self.tokens[self.position - 1]
        } else {
            &self.tokens[self.position]
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    /// Record a soft error against the current token
    pub(crate) fn report(&mut self, kind: ErrorKind) {
        let token = self.peek();
        let diag = Diagnostic::new(kind, token.text.clone(), token.location);
        self.diagnostics.push(diag);
    }

    /// Record a soft error with explicit text and location
    pub(crate) fn report_with(&mut self, kind: ErrorKind, text: &str, location: SourceLocation) {
        self.diagnostics.push(Diagnostic::new(kind, text, location));
    }

    /// Record a fatal error against the current token
    pub(crate) fn fatal(&mut self, kind: ErrorKind) -> Fatal {
        self.report(kind);
        Fatal
    }

    /// Abort if the input ran out
    pub(crate) fn guard_eof(&mut self) -> ParseResult<()> {
        if self.is_at_end() {
            Err(self.fatal(ErrorKind::PrematureEof))
        } else {
            Ok(())
        }
    }

    /// Skip tokens until one of `stops` (left unconsumed) or end of input
    pub(crate) fn skip_until(&mut self, stops: &[TokenKind]) {
        while !self.is_at_end() && !stops.contains(&self.peek_kind()) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedProgram {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_program().unwrap()
    }

    #[test]
    fn test_minimal_program() {
        let program = parse("program P; begin end.");
        assert_eq!(program.name(), Some("P"));
        assert!(program.finished);
        assert!(!program.has_errors());

        let root = program.root().unwrap();
        assert_eq!(program.tree[root].left(), None);
        let begin = program.tree[root].right().unwrap();
        assert_eq!(program.tree[begin].value(), "begin");
        let end = program.tree[begin].right().unwrap();
        assert_eq!(program.tree[end].value(), "end.");
    }

    #[test]
    fn test_missing_program_keyword_aborts() {
        let mut parser = Parser::new("begin end.").unwrap();
        let failure = parser.parse_program().unwrap_err();
        assert_eq!(failure.diagnostics.len(), 1);
        assert_eq!(failure.diagnostics[0].kind, ErrorKind::ExpectedProgram);
    }

    #[test]
    fn test_header_without_name_aborts() {
        let mut parser = Parser::new("program ;").unwrap();
        let failure = parser.parse_program().unwrap_err();
        assert_eq!(failure.diagnostics[0].kind, ErrorKind::ExpectedIdentifier);

        let mut parser = Parser::new("program P").unwrap();
        let failure = parser.parse_program().unwrap_err();
        assert_eq!(failure.diagnostics[0].kind, ErrorKind::PrematureEof);
    }

    #[test]
    fn test_empty_input_aborts() {
        let failure = Parser::new("   { only a comment }").err().unwrap();
        assert_eq!(failure.diagnostics[0].kind, ErrorKind::PrematureEof);
    }

    #[test]
    fn test_program_without_body_aborts() {
        let mut parser = Parser::new("program P; var a : integer;").unwrap();
        let failure = parser.parse_program().unwrap_err();
        assert_eq!(failure.diagnostics.last().unwrap().kind, ErrorKind::PrematureEof);
    }

    #[test]
    fn test_missing_dot_keeps_tree() {
        let program = parse("program P; var a : integer; begin a := 1; end");
        assert!(!program.finished);
        assert_eq!(program.diagnostics.len(), 1);
        assert_eq!(program.diagnostics[0].kind, ErrorKind::ExpectedDot);
        assert!(program.tree[program.root().unwrap()].right().is_some());
    }

    #[test]
    fn test_lexer_diagnostics_are_carried() {
        let program = parse("program P; ? begin end.");
        assert_eq!(program.diagnostics[0].kind, ErrorKind::UnknownLexeme);
    }
}
