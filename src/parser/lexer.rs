//! Lexer (tokenizer) for the Pascal subset
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Scanning never fails: bytes that start no known lexeme become
//! [`TokenKind::Unknown`] tokens and are recorded as diagnostics, and the
//! stream always ends with a single [`TokenKind::Eof`] token.

use super::ast::SourceLocation;
use super::errors::{Diagnostic, ErrorKind};
use std::fmt;

/// Classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural keywords
    Program,
    Var,
    Begin,
    End,
    If,
    Then,
    Else,
    For,
    To,
    Downto,
    Do,
    While,
    Array,
    Of,
    Break,
    Goto,

    // Type keywords
    Integer,
    Boolean,

    // Literals
    Identifier,
    IntConstant,
    True,
    False,

    // Punctuation
    Comma,     // ,
    Dot,       // .
    Range,     // ..
    Colon,     // :
    Semicolon, // ;
    Assign,    // :=
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    LBracket,  // [
    RBracket,  // ]
    LParen,    // (
    RParen,    // )

    // Comparison
    Eq, // =
    Ne, // <>
    Gt, // >
    Lt, // <
    Ge, // >=
    Le, // <=

    // Word operators
    Div,
    Mod,
    And,
    Or,
    Xor,

    Eof,
    Unknown,
}

impl TokenKind {
    /// Keyword lookup for a scanned word; `None` means the word is an identifier
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "program" => TokenKind::Program,
            "var" => TokenKind::Var,
            "begin" => TokenKind::Begin,
            "end" => TokenKind::End,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "to" => TokenKind::To,
            "downto" => TokenKind::Downto,
            "do" => TokenKind::Do,
            "while" => TokenKind::While,
            "array" => TokenKind::Array,
            "of" => TokenKind::Of,
            "break" => TokenKind::Break,
            "goto" => TokenKind::Goto,
            "integer" => TokenKind::Integer,
            "boolean" => TokenKind::Boolean,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "div" => TokenKind::Div,
            "mod" => TokenKind::Mod,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "xor" => TokenKind::Xor,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_type_keyword(self) -> bool {
        matches!(self, TokenKind::Integer | TokenKind::Boolean)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            TokenKind::Eq | TokenKind::Ne | TokenKind::Gt | TokenKind::Lt | TokenKind::Ge | TokenKind::Le
        )
    }
}

/// Value of an integer constant, `None` when it does not fit a 32-bit word
pub fn constant_value(text: &str) -> Option<i64> {
    text.parse::<i32>().ok().map(i64::from)
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Program => "'program'",
            TokenKind::Var => "'var'",
            TokenKind::Begin => "'begin'",
            TokenKind::End => "'end'",
            TokenKind::If => "'if'",
            TokenKind::Then => "'then'",
            TokenKind::Else => "'else'",
            TokenKind::For => "'for'",
            TokenKind::To => "'to'",
            TokenKind::Downto => "'downto'",
            TokenKind::Do => "'do'",
            TokenKind::While => "'while'",
            TokenKind::Array => "'array'",
            TokenKind::Of => "'of'",
            TokenKind::Break => "'break'",
            TokenKind::Goto => "'goto'",
            TokenKind::Integer => "'integer'",
            TokenKind::Boolean => "'boolean'",
            TokenKind::Identifier => "identifier",
            TokenKind::IntConstant => "integer constant",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Range => "'..'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Assign => "':='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Eq => "'='",
            TokenKind::Ne => "'<>'",
            TokenKind::Gt => "'>'",
            TokenKind::Lt => "'<'",
            TokenKind::Ge => "'>='",
            TokenKind::Le => "'<='",
            TokenKind::Div => "'div'",
            TokenKind::Mod => "'mod'",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Xor => "'xor'",
            TokenKind::Eof => "end of file",
            TokenKind::Unknown => "unknown lexeme",
        };
        f.write_str(name)
    }
}

/// A classified lexeme with its source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, location: SourceLocation) -> Self {
        Token {
            text: text.into(),
            kind,
            location,
        }
    }

    pub fn line(&self) -> usize {
        self.location.line
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            TokenKind::IntConstant => write!(f, "integer constant {}", self.text),
            TokenKind::Unknown => write!(f, "unknown lexeme '{}'", self.text),
            kind => write!(f, "{kind}"),
        }
    }
}

/// Lexer for Pascal-subset source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            diagnostics: Vec::new(),
        }
    }

    /// Classify a single word the way the scanner would
    pub fn classify(word: &str) -> TokenKind {
        TokenKind::keyword(word).unwrap_or(TokenKind::Identifier)
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token::new("EOF", TokenKind::Eof, self.current_location()));
                break;
            }

            tokens.push(self.next_token());
        }

        tokens
    }

    /// Diagnostics recorded while scanning
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Get next token; the caller guarantees input remains
    fn next_token(&mut self) -> Token {
        let loc = self.current_location();
        let Some(ch) = self.advance() else {
            return Token::new("EOF", TokenKind::Eof, loc);
        };

        match ch {
            '0'..='9' => self.number_literal(ch, loc),
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch, loc),

            ':' => self.with_follower(ch, loc, '=', TokenKind::Assign, TokenKind::Colon),
            '.' => self.with_follower(ch, loc, '.', TokenKind::Range, TokenKind::Dot),
            '>' => self.with_follower(ch, loc, '=', TokenKind::Ge, TokenKind::Gt),
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new("<=", TokenKind::Le, loc)
                } else if self.peek() == Some('>') {
                    self.advance();
                    Token::new("<>", TokenKind::Ne, loc)
                } else {
                    Token::new("<", TokenKind::Lt, loc)
                }
            }

            ',' => Token::new(",", TokenKind::Comma, loc),
            ';' => Token::new(";", TokenKind::Semicolon, loc),
            '=' => Token::new("=", TokenKind::Eq, loc),
            '+' => Token::new("+", TokenKind::Plus, loc),
            '-' => Token::new("-", TokenKind::Minus, loc),
            '*' => Token::new("*", TokenKind::Star, loc),
            '/' => Token::new("/", TokenKind::Slash, loc),
            '(' => Token::new("(", TokenKind::LParen, loc),
            ')' => Token::new(")", TokenKind::RParen, loc),
            '[' => Token::new("[", TokenKind::LBracket, loc),
            ']' => Token::new("]", TokenKind::RBracket, loc),

            _ => {
                let text = ch.to_string();
                self.diagnostics
                    .push(Diagnostic::new(ErrorKind::UnknownLexeme, text.clone(), loc));
                Token::new(text, TokenKind::Unknown, loc)
            }
        }
    }

    /// Single-character token that merges with `follower` into a two-character one
    fn with_follower(
        &mut self,
        first: char,
        loc: SourceLocation,
        follower: char,
        merged: TokenKind,
        single: TokenKind,
    ) -> Token {
        if self.peek() == Some(follower) {
            self.advance();
            Token::new(format!("{first}{follower}"), merged, loc)
        } else {
            Token::new(first.to_string(), single, loc)
        }
    }

    /// Parse numeric literal (maximal digit run)
    fn number_literal(&mut self, first_digit: char, loc: SourceLocation) -> Token {
        let mut num_str = String::new();
        num_str.push(first_digit);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::new(num_str, TokenKind::IntConstant, loc)
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = Self::classify(&ident);
        Token::new(ident, kind, loc)
    }

    /// Skip whitespace and the three comment forms
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('{') => self.skip_until("}"),
                Some('(') if self.peek_ahead(1) == Some('*') => {
                    self.advance();
                    self.skip_until("*)");
                }
                Some('/') if self.peek_ahead(1) == Some('/') => self.skip_until("\n"),
                _ => break,
            }
        }
    }

    /// Consume characters up to and including `terminator`, or to end of input
    fn skip_until(&mut self, terminator: &str) {
        self.advance();
        let pattern: Vec<char> = terminator.chars().collect();
        while !self.is_at_end() {
            if self.input[self.position..].starts_with(&pattern) {
                for _ in 0..pattern.len() {
                    self.advance();
                }
                return;
            }
            self.advance();
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
