//! Declaration parsing implementation
//!
//! This module handles the `var` section:
//!
//! ```text
//! var_section ::= "var" group { ["var"] group }
//! group       ::= ident { "," ident } ":" type [ "=" init ] ";"
//! type        ::= "integer" | "boolean"
//!               | "array" "[" const ".." const "]" "of" ("integer" | "boolean")
//! init        ::= const | "(" const { "," const } ")"
//! ```
//!
//! Each declared name becomes a node in the declaration chain hanging off the
//! program's `"var"` node. The symbol table is filled as the groups are read.

use crate::parser::ast::{NodeId, DECL_SENTINEL};
use crate::parser::errors::ErrorKind;
use crate::parser::lexer::{constant_value, Token, TokenKind};
use crate::parser::parse::{ParseResult, Parser};
use crate::parser::symbols::{DeclaredType, Symbol};

/// Type clause of one declaration group
struct TypeClause {
    node: Option<NodeId>,
    element_type: DeclaredType,
    range: Option<(i64, i64)>,
}

impl Parser {
    /// Parse a `var` section and append its groups to the declaration chain
    pub(crate) fn parse_var_section(&mut self, root: NodeId) -> ParseResult<()> {
        self.advance(); // consume 'var'

        if self.decl_tail.is_none() {
            let var_node = self.tree.add_left_node(root, "var");
            self.decl_tail = Some(var_node);
        }

        loop {
            self.parse_declaration_group()?;

            if self.check(TokenKind::Var) && self.peek_ahead_kind(1) == TokenKind::Identifier {
                self.advance();
                continue;
            }
            if !self.check(TokenKind::Identifier) {
                return Ok(());
            }
        }
    }

    fn parse_declaration_group(&mut self) -> ParseResult<()> {
        let names = self.parse_identifier_list()?;

        if !self.match_token(TokenKind::Colon) {
            self.report(ErrorKind::ExpectedComma);
        }

        let clause = self.parse_type_clause()?;
        for name in &names {
            match clause.range {
                Some(range) => self.symbols.resolve_array(name, clause.element_type, range),
                None => self.symbols.resolve(name, clause.element_type),
            }
        }

        let initializer = if self.match_token(TokenKind::Eq) {
            self.parse_initializer()?
        } else {
            None
        };

        if !self.match_token(TokenKind::Semicolon) {
            self.report(ErrorKind::ExpectedSemicolon);
            self.skip_until(&[TokenKind::Semicolon, TokenKind::Begin, TokenKind::Var]);
            self.match_token(TokenKind::Semicolon);
        }

        for name in &names {
            let decl = self.tree.create_node(name.as_str());
            if let Some(ty) = clause.node {
                let copy = self.tree.clone_subtree(ty);
                self.tree.attach_right(decl, copy);
            }
            if let Some(init) = initializer {
                let copy = self.tree.clone_subtree(init);
                self.tree.attach_left(decl, copy);
            }
            self.append_declaration(decl);
        }

        if let Some(ty) = clause.node {
            self.tree.free_subtree(ty);
        }
        if let Some(init) = initializer {
            self.tree.free_subtree(init);
        }
        Ok(())
    }

    /// Read `a, b, c`, registering each fresh name. Duplicates are reported
    /// and left out of the returned list.
    fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut names = Vec::new();
        loop {
            self.guard_eof()?;
            if !self.check(TokenKind::Identifier) {
                self.report(ErrorKind::ExpectedIdentifier);
                return Ok(names);
            }

            let token = self.advance().clone();
            if self.symbols.declare(&token.text) {
                names.push(token.text);
            } else {
                self.report_with(ErrorKind::DuplicateIdentifier, &token.text, token.location);
            }

            if !self.match_token(TokenKind::Comma) {
                return Ok(names);
            }
        }
    }

    fn parse_type_clause(&mut self) -> ParseResult<TypeClause> {
        self.guard_eof()?;

        if self.check(TokenKind::Array) {
            return self.parse_array_type();
        }

        if self.peek_kind().is_type_keyword() {
            let name = self.advance().text.clone();
            let element_type = DeclaredType::from_name(&name);
            return Ok(TypeClause {
                node: Some(self.tree.create_node(name)),
                element_type,
                range: None,
            });
        }

        self.report(ErrorKind::ExpectedType);
        Ok(TypeClause {
            node: None,
            element_type: DeclaredType::Unresolved,
            range: None,
        })
    }

    /// `array [ min .. max ] of type`, producing `array(range(min, max), type)`
    fn parse_array_type(&mut self) -> ParseResult<TypeClause> {
        self.advance(); // consume 'array'
        let array_node = self.tree.create_node("array");
        let range_node = self.tree.add_left_node(array_node, "range");

        if !self.match_token(TokenKind::LBracket) {
            self.report(ErrorKind::ExpectedOpenBracket);
        }

        let range_location = self.current_location();
        let min = self.parse_bound()?;
        if !self.match_token(TokenKind::Range) {
            self.report(ErrorKind::ExpectedRangeDots);
        }
        let max = self.parse_bound()?;

        if !self.match_token(TokenKind::RBracket) {
            self.report(ErrorKind::ExpectedCloseBracket);
        }
        if !self.match_token(TokenKind::Of) {
            self.report(ErrorKind::ExpectedOf);
        }

        self.guard_eof()?;
        let element_type = if self.peek_kind().is_type_keyword() {
            let name = self.advance().text.clone();
            self.tree.add_right_node(array_node, name.as_str());
            DeclaredType::from_name(&name)
        } else {
            self.report(ErrorKind::ExpectedType);
            DeclaredType::Unresolved
        };

        if let Some((_, text)) = &min {
            self.tree.add_left_node(range_node, text.as_str());
        }
        if let Some((_, text)) = &max {
            self.tree.add_right_node(range_node, text.as_str());
        }

        let range = match (min, max) {
            (Some((lo, _)), Some((hi, text))) => {
                if Symbol::count_in_range((lo, hi)).is_none() {
                    self.report_with(ErrorKind::ArrayIndexOutOfRange, &text, range_location);
                }
                (lo, hi)
            }
            _ => (0, 0),
        };

        Ok(TypeClause {
            node: Some(array_node),
            element_type,
            range: Some(range),
        })
    }

    /// Integer bound of an array range, optionally negative
    fn parse_bound(&mut self) -> ParseResult<Option<(i64, String)>> {
        self.guard_eof()?;
        let negative = self.check(TokenKind::Minus)
            && self.peek_ahead_kind(1) == TokenKind::IntConstant;
        if negative {
            self.advance();
        }

        if !self.check(TokenKind::IntConstant) {
            self.report(ErrorKind::ExpectedConstant);
            return Ok(None);
        }

        let token = self.advance().clone();
        let text = if negative {
            format!("-{}", token.text)
        } else {
            token.text
        };
        match constant_value(&text) {
            Some(value) => Ok(Some((value, text))),
            None => {
                self.report_with(ErrorKind::ExpectedConstant, &text, token.location);
                Ok(None)
            }
        }
    }

    /// Scalar constant or a parenthesised list of constants
    fn parse_initializer(&mut self) -> ParseResult<Option<NodeId>> {
        self.guard_eof()?;
        if !self.match_token(TokenKind::LParen) {
            return self.parse_constant_leaf();
        }

        let mut first = None;
        let mut last: Option<NodeId> = None;
        loop {
            if let Some(leaf) = self.parse_constant_leaf()? {
                match last {
                    Some(prev) => self.tree.attach_right(prev, leaf),
                    None => first = Some(leaf),
                }
                last = Some(leaf);
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        if !self.match_token(TokenKind::RParen) {
            self.report(ErrorKind::ExpectedCloseParen);
        }
        Ok(first)
    }

    fn parse_constant_leaf(&mut self) -> ParseResult<Option<NodeId>> {
        self.guard_eof()?;
        match self.peek_kind() {
            TokenKind::True | TokenKind::False => {
                let text = self.advance().text.clone();
                Ok(Some(self.tree.create_node(text)))
            }
            TokenKind::IntConstant => {
                let token = self.advance().clone();
                Ok(self.constant_leaf(token.text.clone(), &token))
            }
            TokenKind::Minus if self.peek_ahead_kind(1) == TokenKind::IntConstant => {
                self.advance();
                let token = self.advance().clone();
                Ok(self.constant_leaf(format!("-{}", token.text), &token))
            }
            _ => {
                self.report(ErrorKind::ExpectedConstant);
                Ok(None)
            }
        }
    }

    /// Leaf for a numeric constant, or `None` after reporting one that does
    /// not fit a word
    fn constant_leaf(&mut self, text: String, token: &Token) -> Option<NodeId> {
        if constant_value(&text).is_none() {
            self.report_with(ErrorKind::ExpectedConstant, &text, token.location);
            return None;
        }
        Some(self.tree.create_node(text))
    }

    /// Hang `decl` on the current sentinel and grow a fresh `"$"` behind it
    fn append_declaration(&mut self, decl: NodeId) {
        let Some(tail) = self.decl_tail else {
            return;
        };
        self.tree.attach_left(tail, decl);
        let sentinel = self.tree.add_right_node(tail, DECL_SENTINEL);
        self.decl_tail = Some(sentinel);
    }
}
