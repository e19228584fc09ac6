//! Expression parsing implementation
//!
//! This module builds expression trees by precedence climbing directly over
//! the syntax tree, using parent links to walk upward.
//!
//! # Supported Expressions
//!
//! - Literals: integers, `true`, `false`, negative integer constants
//! - Identifiers, negated identifiers and array elements `v[expr]`
//! - Binary operators: comparisons, `+ - or xor`, `* / div mod and`
//! - Parentheses
//!
//! # Precedence
//!
//! | Operators                  | Priority |
//! |----------------------------|----------|
//! | `:=`                       | 0        |
//! | `= <> < > <= >=`           | 1        |
//! | `+ - or xor`               | 2        |
//! | `* / div mod and`          | 3        |
//!
//! Parentheses add [`NESTING_STEP`] to the priority of every operator inside
//! them instead of producing a node of their own, so each operator node's
//! precedence records how tightly it binds.

use crate::parser::ast::NodeId;
use crate::parser::errors::ErrorKind;
use crate::parser::lexer::{constant_value, Token, TokenKind};
use crate::parser::parse::{ParseResult, Parser};

/// Priority of `:=`, the anchor every expression hangs from
pub(crate) const ASSIGN_PRIORITY: i32 = 0;

/// Priority of parenthesis markers and of primary-level nodes
pub(crate) const PAREN_PRIORITY: i32 = 4;

/// Priority boost applied per level of parentheses
pub(crate) const NESTING_STEP: i32 = 3;

/// Table priority of a binary operator token
pub(crate) fn priority(kind: TokenKind) -> Option<i32> {
    match kind {
        kind if kind.is_comparison() => Some(1),
        TokenKind::Plus | TokenKind::Minus | TokenKind::Or | TokenKind::Xor => Some(2),
        TokenKind::Star | TokenKind::Slash | TokenKind::Div | TokenKind::Mod | TokenKind::And => {
            Some(3)
        }
        _ => None,
    }
}

/// Whether an operator node computes a number rather than a truth value
pub(crate) fn is_arithmetic(value: &str) -> bool {
    matches!(value, "+" | "-" | "*" | "/" | "div" | "mod")
}

impl Parser {
    /// Parse an expression and hang its root as the right child of `anchor`.
    ///
    /// Every operator read is placed by comparing its priority with the node
    /// currently being extended: a tighter operator descends, a looser one
    /// climbs the parent links and is spliced in above the subtree it must
    /// take as its left operand.
    pub(crate) fn parse_expression(&mut self, anchor: NodeId) -> ParseResult<()> {
        let mut current = anchor;
        let mut nesting = 0;

        loop {
            while self.match_token(TokenKind::LParen) {
                nesting += NESTING_STEP;
            }

            let Some(primary) = self.parse_primary(nesting)? else {
                return Ok(());
            };

            while self.check(TokenKind::RParen) {
                if nesting == 0 {
                    self.report(ErrorKind::ExpectedOpenParen);
                } else {
                    nesting -= NESTING_STEP;
                }
                self.advance();
            }

            let Some(base) = priority(self.peek_kind()) else {
                self.tree.attach_right(current, primary);
                if nesting > 0 {
                    self.report(ErrorKind::ExpectedCloseParen);
                }
                return Ok(());
            };
            let operator = self.advance().text.clone();
            let prio = base + nesting;

            let node = self.tree.create_op_node(operator, prio);
            if prio <= self.tree[current].precedence() {
                self.tree.attach_right(current, primary);

                let mut ancestor = current;
                while prio <= self.tree[ancestor].precedence() {
                    match self.tree[ancestor].parent() {
                        Some(parent) => ancestor = parent,
                        None => break,
                    }
                }

                if let Some(absorbed) = self.tree.take_right(ancestor) {
                    self.tree.attach_left(node, absorbed);
                }
                self.tree.attach_right(ancestor, node);
            } else {
                self.tree.attach_left(node, primary);
                self.tree.attach_right(current, node);
            }
            current = node;
        }
    }

    /// Parse an expression that is not the right side of an assignment,
    /// returning its detached root
    pub(crate) fn parse_detached_expression(&mut self) -> ParseResult<Option<NodeId>> {
        let anchor = self.tree.create_op_node("", ASSIGN_PRIORITY);
        let result = self.parse_expression(anchor);
        let root = self.tree.take_right(anchor);
        self.tree.free_subtree(anchor);
        result?;
        Ok(root)
    }

    /// Operand of a binary operator
    fn parse_primary(&mut self, nesting: i32) -> ParseResult<Option<NodeId>> {
        self.guard_eof()?;
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Identifier => {
                self.advance();
                self.check_declared(&token);
                if self.check(TokenKind::LBracket) {
                    self.parse_element_access(&token).map(Some)
                } else {
                    Ok(Some(self.tree.create_node(token.text)))
                }
            }
            TokenKind::IntConstant => {
                self.advance();
                self.check_constant(&token.text, &token);
                Ok(Some(self.tree.create_node(token.text)))
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(Some(self.tree.create_node(token.text)))
            }
            TokenKind::Minus => {
                self.advance();
                match self.peek_kind() {
                    TokenKind::IntConstant => {
                        let digits = self.advance().clone();
                        let text = format!("-{}", digits.text);
                        self.check_constant(&text, &digits);
                        Ok(Some(self.tree.create_node(text)))
                    }
                    TokenKind::Identifier => {
                        let node = self.tree.create_op_node("-", PAREN_PRIORITY + nesting);
                        self.tree.add_left_node(node, "0");
                        if let Some(operand) = self.parse_primary(nesting)? {
                            self.tree.attach_right(node, operand);
                        }
                        Ok(Some(node))
                    }
                    TokenKind::Eof => Err(self.fatal(ErrorKind::PrematureEof)),
                    _ => {
                        self.report(ErrorKind::ExpectedIdentifier);
                        Ok(None)
                    }
                }
            }
            _ => {
                self.report(ErrorKind::ExpectedIdentifier);
                Ok(None)
            }
        }
    }

    /// Report a literal that does not fit a 32-bit word
    fn check_constant(&mut self, text: &str, token: &Token) {
        if constant_value(text).is_none() {
            self.report_with(ErrorKind::ExpectedConstant, text, token.location);
        }
    }

    /// `name [ index ]` with the name already consumed
    pub(crate) fn parse_element_access(&mut self, name: &Token) -> ParseResult<NodeId> {
        self.advance(); // consume '['
        let node = self.tree.create_op_node("[]", PAREN_PRIORITY);
        self.tree.add_left_node(node, name.text.as_str());

        let symbol = self.symbols.get(&name.text).cloned();
        if let Some(symbol) = &symbol {
            if !symbol.is_array {
                self.report_with(ErrorKind::WrongArrayIndexType, &name.text, name.location);
            }
        }

        let index_location = self.current_location();
        if let Some(index) = self.parse_detached_expression()? {
            let index_node = &self.tree[index];
            if index_node.is_leaf() {
                let text = index_node.value().to_string();
                if text == "true" || text == "false" {
                    self.report_with(ErrorKind::WrongArrayIndexType, &text, index_location);
                } else if let (Some(value), Some(symbol)) = (constant_value(&text), &symbol) {
                    if symbol.is_array && !symbol.in_range(value) {
                        self.report_with(ErrorKind::ArrayIndexOutOfRange, &text, index_location);
                    }
                }
            }
            self.tree.attach_right(node, index);
        }

        if !self.match_token(TokenKind::RBracket) {
            self.report(ErrorKind::ExpectedCloseBracket);
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::{NodeId, SyntaxTree};
    use crate::parser::errors::ErrorKind;
    use crate::parser::parse::{ParsedProgram, Parser};

    /// Parse `x := <expr>` inside a small program and return the assignment
    fn parse_assign(expr: &str) -> (ParsedProgram, NodeId) {
        let source = format!(
            "program P; var x, a, b, c : integer; f : boolean; v : array[1..5] of integer; \
             begin x := {expr}; end."
        );
        let mut parser = Parser::new(&source).unwrap();
        let program = parser.parse_program().unwrap();
        let begin = program.tree[program.root().unwrap()].right().unwrap();
        let link = program.tree[begin].right().unwrap();
        let assign = program.tree[link].left().unwrap();
        (program, assign)
    }

    /// Prefix form of a subtree, e.g. `(+ 1 (* 2 3))`
    fn sexpr(tree: &SyntaxTree, id: NodeId) -> String {
        let node = &tree[id];
        if node.is_leaf() {
            return node.value().to_string();
        }
        let left = node.left().map_or("_".to_string(), |l| sexpr(tree, l));
        let right = node.right().map_or("_".to_string(), |r| sexpr(tree, r));
        format!("({} {} {})", node.value(), left, right)
    }

    fn expr(source: &str) -> String {
        let (program, assign) = parse_assign(source);
        assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);
        let rhs = program.tree[assign].right().unwrap();
        sexpr(&program.tree, rhs)
    }

    #[test]
    fn test_tighter_operator_descends() {
        assert_eq!(expr("1+2*3"), "(+ 1 (* 2 3))");
    }

    #[test]
    fn test_looser_operator_climbs() {
        assert_eq!(expr("1*2+3"), "(+ (* 1 2) 3)");
    }

    #[test]
    fn test_left_associative_chain() {
        assert_eq!(expr("a-b-c"), "(- (- a b) c)");
        assert_eq!(expr("a div b * c"), "(* (div a b) c)");
    }

    #[test]
    fn test_mixed_levels() {
        assert_eq!(expr("a+b*c-1"), "(- (+ a (* b c)) 1)");
        assert_eq!(expr("a*b+c*2"), "(+ (* a b) (* c 2))");
    }

    #[test]
    fn test_parentheses_override() {
        assert_eq!(expr("(1+2)*3"), "(* (+ 1 2) 3)");
        assert_eq!(expr("a*(b+c)*2"), "(* (* a (+ b c)) 2)");
        assert_eq!(expr("((a+b)*c)"), "(* (+ a b) c)");
    }

    #[test]
    fn test_comparison_binds_loosest() {
        assert_eq!(expr("a+1 > b*2"), "(> (+ a 1) (* b 2))");
    }

    #[test]
    fn test_precedence_recorded_on_nodes() {
        let (program, assign) = parse_assign("(1+2)*3");
        let mul = program.tree[assign].right().unwrap();
        let add = program.tree[mul].left().unwrap();
        assert_eq!(program.tree[mul].precedence(), 3);
        assert_eq!(program.tree[add].precedence(), 5);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(expr("-5 + a"), "(+ -5 a)");
        assert_eq!(expr("-a * 2"), "(* (- 0 a) 2)");
    }

    #[test]
    fn test_element_access() {
        assert_eq!(expr("v[a+1] + 2"), "(+ ([] v (+ a 1)) 2)");
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let (program, _) = parse_assign("(1+2");
        assert_eq!(program.diagnostics[0].kind, ErrorKind::ExpectedCloseParen);

        let (program, _) = parse_assign("1+2)");
        assert_eq!(program.diagnostics[0].kind, ErrorKind::ExpectedOpenParen);
    }

    #[test]
    fn test_index_errors() {
        let (program, _) = parse_assign("v[9]");
        assert_eq!(program.diagnostics[0].kind, ErrorKind::ArrayIndexOutOfRange);

        let (program, _) = parse_assign("v[true]");
        assert_eq!(program.diagnostics[0].kind, ErrorKind::WrongArrayIndexType);

        let (program, _) = parse_assign("a[1]");
        assert_eq!(program.diagnostics[0].kind, ErrorKind::WrongArrayIndexType);

        let (program, _) = parse_assign("v[1");
        assert_eq!(program.diagnostics[0].kind, ErrorKind::ExpectedCloseBracket);
    }

    #[test]
    fn test_unknown_identifier_in_expression() {
        let (program, assign) = parse_assign("y + 1");
        assert_eq!(program.diagnostics.len(), 1);
        assert_eq!(program.diagnostics[0].kind, ErrorKind::UnknownIdentifier);
        assert!(program.tree[assign].right().is_some());
    }

    #[test]
    fn test_oversized_literals() {
        for literal in ["99999999999999999999", "5000000000", "-2147483649"] {
            let (program, assign) = parse_assign(&format!("a + {literal}"));
            assert_eq!(program.diagnostics.len(), 1, "{literal}");
            assert_eq!(program.diagnostics[0].kind, ErrorKind::ExpectedConstant);
            assert_eq!(program.diagnostics[0].text, literal);
            assert!(program.tree[assign].right().is_some());
        }
        assert_eq!(expr("-2147483648 + 2147483647"), "(+ -2147483648 2147483647)");
    }
}
