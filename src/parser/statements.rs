//! Statement parsing implementation
//!
//! This module handles parsing of every statement form:
//!
//! - Compound statements: `begin ... end`
//! - Assignments: `x := expr`, `v[i] := expr`
//! - Conditionals: `if cond then stmt [else stmt]`
//! - Loops: `for`, `while`, `break` (parsed, not lowered)
//! - Jumps and labels: `goto l`, `l : stmt`
//!
//! # Grammar
//!
//! ```text
//! compound  ::= "begin" [ statement { ";" statement } ] "end"
//! statement ::= assign | compound | if_stmt | for_stmt | while_stmt
//!             | "break" | "goto" ident | ident ":" statement
//! ```
//!
//! `;` separates statements and may be left out before `end` and `else`.

use crate::parser::ast::NodeId;
use crate::parser::errors::ErrorKind;
use crate::parser::expressions::{is_arithmetic, ASSIGN_PRIORITY};
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::parse::{ParseResult, Parser};

/// Tokens a malformed statement is skipped up to
const STATEMENT_STOPS: &[TokenKind] = &[TokenKind::Semicolon, TokenKind::End];

impl Parser {
    /// Parse `begin ... end`, returning the detached `"begin"` head.
    ///
    /// Each statement hangs off a `_*op<n>.<m>` link, where `n` numbers the
    /// compound and `m` the statement inside it. The chain ends in `"end"`,
    /// or `"end."` for the outermost compound.
    pub(crate) fn parse_compound(&mut self) -> ParseResult<NodeId> {
        self.advance(); // consume 'begin'
        self.compound_count += 1;
        self.compound_depth += 1;
        let level = self.compound_count;

        let head = self.tree.create_node("begin");
        let mut tail = head;
        let mut index = 0;

        loop {
            self.guard_eof()?;
            if self.check(TokenKind::End) {
                break;
            }
            if self.check(TokenKind::Dot) {
                self.report(ErrorKind::ExpectedSemicolon);
                break;
            }
            if self.match_token(TokenKind::Semicolon) {
                continue;
            }

            if let Some(statement) = self.parse_statement()? {
                let link = self.tree.add_right_node(tail, format!("_*op{level}.{index}"));
                self.tree.attach_left(link, statement);
                tail = link;
                index += 1;
            }

            if self.match_token(TokenKind::Semicolon) || self.check(TokenKind::End) {
                continue;
            }
            self.guard_eof()?;
            self.report(ErrorKind::ExpectedSemicolon);
            self.skip_until(STATEMENT_STOPS);
        }

        self.match_token(TokenKind::End);
        self.compound_depth -= 1;

        let terminator = if self.compound_depth == 0 {
            if !self.check(TokenKind::Dot) {
                self.report(ErrorKind::ExpectedDot);
            }
            "end."
        } else {
            "end"
        };
        self.tree.add_right_node(tail, terminator);
        Ok(head)
    }

    /// Parse one statement. `None` means an empty statement, or one so
    /// malformed that nothing was built for it.
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Option<NodeId>> {
        self.guard_eof()?;
        match self.peek_kind() {
            TokenKind::Identifier => {
                if self.peek_ahead_kind(1) == TokenKind::Colon {
                    self.parse_labelled_statement()
                } else {
                    self.parse_assignment()
                }
            }
            TokenKind::Begin => self.parse_compound().map(Some),
            TokenKind::If => self.parse_if_statement().map(Some),
            TokenKind::For => self.parse_for_statement().map(Some),
            TokenKind::While => self.parse_while_statement().map(Some),
            TokenKind::Goto => Ok(Some(self.parse_goto_statement())),
            TokenKind::Break => {
                self.advance();
                Ok(Some(self.tree.create_node("break")))
            }
            TokenKind::Semicolon | TokenKind::End | TokenKind::Else => Ok(None),
            _ => {
                self.report(ErrorKind::ExpectedIdentifier);
                self.skip_until(STATEMENT_STOPS);
                Ok(None)
            }
        }
    }

    /// `target := expr`. The `":="` node doubles as the expression anchor.
    fn parse_assignment(&mut self) -> ParseResult<Option<NodeId>> {
        let target_token = self.advance().clone();
        self.check_declared(&target_token);

        let target = if self.check(TokenKind::LBracket) {
            self.parse_element_access(&target_token)?
        } else {
            self.tree.create_node(target_token.text.as_str())
        };

        if !self.match_token(TokenKind::Assign) {
            self.report(ErrorKind::ExpectedAssignment);
            self.tree.free_subtree(target);
            self.skip_until(STATEMENT_STOPS);
            return Ok(None);
        }

        let assign = self.tree.create_op_node(":=", ASSIGN_PRIORITY);
        self.tree.attach_left(assign, target);
        self.parse_expression(assign)?;
        Ok(Some(assign))
    }

    /// `if cond then stmt [else stmt]`
    fn parse_if_statement(&mut self) -> ParseResult<NodeId> {
        let if_token = self.advance().clone();
        let node = self.tree.create_node("if");

        if let Some(cond) = self.parse_detached_expression()? {
            let root = &self.tree[cond];
            if !root.is_leaf() && is_arithmetic(root.value()) {
                let text = root.value().to_string();
                self.report_with(ErrorKind::ExpectedComparison, &text, if_token.location);
            }
            self.tree.attach_left(node, cond);
        }

        if !self.match_token(TokenKind::Then) {
            self.report(ErrorKind::ExpectedThen);
        }

        let then_node = self.tree.add_right_node(node, "then");
        if let Some(statement) = self.parse_statement()? {
            self.tree.attach_left(then_node, statement);
        }

        if self.match_token(TokenKind::Else) {
            let else_node = self.tree.add_right_node(then_node, "else");
            if let Some(statement) = self.parse_statement()? {
                self.tree.attach_left(else_node, statement);
            }
        }

        Ok(node)
    }

    /// `for i := first to|downto last do stmt`
    fn parse_for_statement(&mut self) -> ParseResult<NodeId> {
        self.advance(); // consume 'for'
        let node = self.tree.create_node("for");

        let init = self.tree.create_op_node(":=", ASSIGN_PRIORITY);
        self.guard_eof()?;
        if self.check(TokenKind::Identifier) {
            let counter = self.advance().clone();
            self.check_declared(&counter);
            self.tree.add_left_node(init, counter.text.as_str());
        } else {
            self.report(ErrorKind::ExpectedIdentifier);
        }

        if !self.match_token(TokenKind::Assign) {
            self.report(ErrorKind::ExpectedAssignment);
        }
        self.parse_expression(init)?;
        self.tree.attach_left(node, init);

        let direction = if self.match_token(TokenKind::To) {
            "to"
        } else if self.match_token(TokenKind::Downto) {
            "downto"
        } else {
            self.report(ErrorKind::ExpectedTo);
            "to"
        };
        let bound = self.tree.add_right_node(node, direction);
        if let Some(limit) = self.parse_detached_expression()? {
            self.tree.attach_left(bound, limit);
        }

        if !self.match_token(TokenKind::Do) {
            self.report(ErrorKind::ExpectedDo);
        }
        if let Some(body) = self.parse_statement()? {
            self.tree.attach_right(bound, body);
        }

        Ok(node)
    }

    /// `while cond do stmt`
    fn parse_while_statement(&mut self) -> ParseResult<NodeId> {
        self.advance(); // consume 'while'
        let node = self.tree.create_node("while");

        if let Some(cond) = self.parse_detached_expression()? {
            self.tree.attach_left(node, cond);
        }
        if !self.match_token(TokenKind::Do) {
            self.report(ErrorKind::ExpectedDo);
        }
        if let Some(body) = self.parse_statement()? {
            self.tree.attach_right(node, body);
        }

        Ok(node)
    }

    fn parse_goto_statement(&mut self) -> NodeId {
        self.advance(); // consume 'goto'
        let node = self.tree.create_node("goto");
        if self.check(TokenKind::Identifier) {
            let label = self.advance().text.clone();
            self.tree.add_left_node(node, label);
        } else {
            self.report(ErrorKind::ExpectedIdentifier);
        }
        node
    }

    /// `name : stmt`
    fn parse_labelled_statement(&mut self) -> ParseResult<Option<NodeId>> {
        let label = self.advance().text.clone();
        self.advance(); // consume ':'

        let node = self.tree.create_node("label");
        self.tree.add_left_node(node, label);
        if let Some(statement) = self.parse_statement()? {
            self.tree.attach_right(node, statement);
        }
        Ok(Some(node))
    }

    /// Report an undeclared identifier; parsing carries on either way
    pub(crate) fn check_declared(&mut self, token: &Token) {
        if !self.symbols.is_var_exist(&token.text) {
            self.report_with(ErrorKind::UnknownIdentifier, &token.text, token.location);
        }
    }
}
