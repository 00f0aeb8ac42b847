//! Tokenizer for shell literal arguments.
//!
//! Tokenizes the restricted literal grammar accepted by the argument
//! parser: object/array literals, strings, numbers, identifiers, regex
//! literals, and the punctuation between them.
//!
//! # Design Principles
//!
//! - **Never panic** - always return a valid token stream
//! - **Never reject input** - unknown characters become `Unknown` tokens
//! - **Simple grammar** - literals only, no statements or operators beyond
//!   unary sign
//! - **Performance** - simple character-by-character scanning

use std::ops::Range;

/// Token types for shell literal syntax
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier (unquoted key, `true`, `Date`, etc.)
    Ident(String),
    /// Dot separator
    Dot,
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
    /// Left brace
    LBrace,
    /// Right brace
    RBrace,
    /// Left bracket
    LBracket,
    /// Right bracket
    RBracket,
    /// Comma
    Comma,
    /// Colon
    Colon,
    /// Minus sign
    Minus,
    /// Plus sign
    Plus,
    /// String literal (quotes stripped, escapes resolved)
    String(String),
    /// Number literal (raw text)
    Number(String),
    /// Regex literal: /pattern/flags
    Regex { pattern: String, flags: String },
    /// End of input
    Eof,
    /// Unknown character
    Unknown(char),
}

/// Token with position information
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }
}

/// Literal lexer - error-tolerant tokenizer
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
}

impl Lexer {
    /// Create a new lexer from input string
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Self::new(input);
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next_token();
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Get the next token
    fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        if self.is_at_end() {
            return Token::new(TokenKind::Eof, start..start);
        }

        let ch = self.current_char();

        match ch {
            '.' => {
                // A dot immediately followed by a digit starts a number.
                if self.peek_char().is_ascii_digit() {
                    return self.scan_number(start);
                }
                self.advance();
                Token::new(TokenKind::Dot, start..self.pos)
            }
            '(' => {
                self.advance();
                Token::new(TokenKind::LParen, start..self.pos)
            }
            ')' => {
                self.advance();
                Token::new(TokenKind::RParen, start..self.pos)
            }
            '{' => {
                self.advance();
                Token::new(TokenKind::LBrace, start..self.pos)
            }
            '}' => {
                self.advance();
                Token::new(TokenKind::RBrace, start..self.pos)
            }
            '[' => {
                self.advance();
                Token::new(TokenKind::LBracket, start..self.pos)
            }
            ']' => {
                self.advance();
                Token::new(TokenKind::RBracket, start..self.pos)
            }
            ',' => {
                self.advance();
                Token::new(TokenKind::Comma, start..self.pos)
            }
            ':' => {
                self.advance();
                Token::new(TokenKind::Colon, start..self.pos)
            }
            '-' => {
                self.advance();
                Token::new(TokenKind::Minus, start..self.pos)
            }
            '+' => {
                self.advance();
                Token::new(TokenKind::Plus, start..self.pos)
            }
            '/' => self.scan_regex(start),
            '\'' | '"' => self.scan_string(ch, start),
            '0'..='9' => self.scan_number(start),
            'a'..='z' | 'A'..='Z' | '_' | '$' => self.scan_identifier(start),
            _ => {
                self.advance();
                Token::new(TokenKind::Unknown(ch), start..self.pos)
            }
        }
    }

    /// Scan a string literal
    fn scan_string(&mut self, quote: char, start: usize) -> Token {
        self.advance(); // Skip opening quote

        let mut value = String::new();

        while !self.is_at_end() && self.current_char() != quote {
            let ch = self.current_char();
            if ch == '\\' && !self.is_at_end() {
                self.advance();
                match self.current_char() {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\\' => value.push('\\'),
                    '\'' => value.push('\''),
                    '"' => value.push('"'),
                    '/' => value.push('/'),
                    ch => {
                        value.push('\\');
                        value.push(ch);
                    }
                }
            } else {
                value.push(ch);
            }
            self.advance();
        }

        // Skip closing quote if present
        if self.current_char() == quote {
            self.advance();
        }

        Token::new(TokenKind::String(value), start..self.pos)
    }

    /// Scan a regex literal: /pattern/flags
    fn scan_regex(&mut self, start: usize) -> Token {
        self.advance(); // Skip opening slash

        let mut pattern = String::new();

        while !self.is_at_end() && self.current_char() != '/' {
            let ch = self.current_char();
            if ch == '\\' {
                pattern.push(ch);
                self.advance();
                if !self.is_at_end() {
                    pattern.push(self.current_char());
                    self.advance();
                }
                continue;
            }
            pattern.push(ch);
            self.advance();
        }

        if self.current_char() == '/' {
            self.advance();
        }

        let mut flags = String::new();
        while !self.is_at_end() && self.current_char().is_ascii_alphabetic() {
            flags.push(self.current_char());
            self.advance();
        }

        Token::new(TokenKind::Regex { pattern, flags }, start..self.pos)
    }

    /// Scan a number (integer, decimal, optional exponent)
    fn scan_number(&mut self, start: usize) -> Token {
        let mut value = String::new();

        while !self.is_at_end() && self.current_char().is_ascii_digit() {
            value.push(self.current_char());
            self.advance();
        }

        if self.current_char() == '.' && self.peek_char().is_ascii_digit() {
            value.push('.');
            self.advance();
            while !self.is_at_end() && self.current_char().is_ascii_digit() {
                value.push(self.current_char());
                self.advance();
            }
        }

        if matches!(self.current_char(), 'e' | 'E') && {
            let next = self.peek_char();
            next.is_ascii_digit() || next == '-' || next == '+'
        } {
            value.push(self.current_char());
            self.advance();
            if matches!(self.current_char(), '-' | '+') {
                value.push(self.current_char());
                self.advance();
            }
            while !self.is_at_end() && self.current_char().is_ascii_digit() {
                value.push(self.current_char());
                self.advance();
            }
        }

        Token::new(TokenKind::Number(value), start..self.pos)
    }

    /// Scan an identifier
    fn scan_identifier(&mut self, start: usize) -> Token {
        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::new(TokenKind::Ident(value), start..self.pos)
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() {
            if self.current_char().is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Get current character
    fn current_char(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.input[self.pos]
        }
    }

    /// Peek at next character
    fn peek_char(&self) -> char {
        if self.pos + 1 >= self.input.len() {
            '\0'
        } else {
            self.input[self.pos + 1]
        }
    }

    /// Advance position
    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_object_literal() {
        let tokens = Lexer::tokenize("{name: 'John', age: 30}");
        assert!(matches!(tokens[0].kind, TokenKind::LBrace));
        assert!(matches!(tokens[1].kind, TokenKind::Ident(ref s) if s == "name"));
        assert!(matches!(tokens[2].kind, TokenKind::Colon));
        assert!(matches!(tokens[3].kind, TokenKind::String(ref s) if s == "John"));
        assert!(matches!(tokens[4].kind, TokenKind::Comma));
        assert!(matches!(tokens.last().unwrap().kind, TokenKind::Eof));
    }

    #[test]
    fn test_tokenize_operator_key() {
        let tokens = Lexer::tokenize("{$gt: 18}");
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t.kind, TokenKind::Ident(ref s) if s == "$gt"))
        );
    }

    #[test]
    fn test_tokenize_negative_number() {
        let tokens = Lexer::tokenize("-5");
        assert!(matches!(tokens[0].kind, TokenKind::Minus));
        assert!(matches!(tokens[1].kind, TokenKind::Number(ref s) if s == "5"));
    }

    #[test]
    fn test_tokenize_decimal_and_exponent() {
        let tokens = Lexer::tokenize("3.14");
        assert!(matches!(tokens[0].kind, TokenKind::Number(ref s) if s == "3.14"));

        let tokens = Lexer::tokenize("1e-3");
        assert!(matches!(tokens[0].kind, TokenKind::Number(ref s) if s == "1e-3"));
    }

    #[test]
    fn test_tokenize_leading_dot_number() {
        let tokens = Lexer::tokenize(".5");
        assert!(matches!(tokens[0].kind, TokenKind::Number(ref s) if s == ".5"));
    }

    #[test]
    fn test_tokenize_string_escapes() {
        let tokens = Lexer::tokenize(r#""a\nb""#);
        assert!(matches!(tokens[0].kind, TokenKind::String(ref s) if s == "a\nb"));
    }

    #[test]
    fn test_tokenize_regex_literal() {
        let tokens = Lexer::tokenize("/^jo.n$/i");
        match &tokens[0].kind {
            TokenKind::Regex { pattern, flags } => {
                assert_eq!(pattern, "^jo.n$");
                assert_eq!(flags, "i");
            }
            other => panic!("expected regex token, got {other:?}"),
        }
    }

    #[test]
    fn test_tokenize_regex_escaped_slash() {
        let tokens = Lexer::tokenize(r"/a\/b/");
        match &tokens[0].kind {
            TokenKind::Regex { pattern, flags } => {
                assert_eq!(pattern, r"a\/b");
                assert_eq!(flags, "");
            }
            other => panic!("expected regex token, got {other:?}"),
        }
    }

    #[test]
    fn test_tokenize_new_date_call() {
        let tokens = Lexer::tokenize("new Date()");
        assert!(matches!(tokens[0].kind, TokenKind::Ident(ref s) if s == "new"));
        assert!(matches!(tokens[1].kind, TokenKind::Ident(ref s) if s == "Date"));
        assert!(matches!(tokens[2].kind, TokenKind::LParen));
        assert!(matches!(tokens[3].kind, TokenKind::RParen));
    }

    #[test]
    fn test_tokenize_empty_input() {
        let tokens = Lexer::tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0].kind, TokenKind::Eof));
    }

    #[test]
    fn test_tokenize_unknown_chars() {
        let tokens = Lexer::tokenize("{a: @}");
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t.kind, TokenKind::Unknown('@')))
        );
    }
}
