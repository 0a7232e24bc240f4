//! Lexer for rule expressions.
//!
//! Tokens are produced on demand; nothing is buffered beyond the current
//! character. The lexer stops at the first illegal input, emitting a single
//! [`TokenKind::Error`] and then only [`TokenKind::Eof`].

use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Pull-based scanner over one rule string.
pub struct Lexer<'src> {
    source: &'src str,
    rest: &'src str,
    position: usize,
    line: u32,
    column: u32,
    parens: u32,
    brackets: u32,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer positioned at the start of `source`.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
            parens: 0,
            brackets: 0,
            finished: false,
        }
    }

    /// The text being scanned.
    #[must_use]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Returns the next token. After `Eof` or `Error` every call returns `Eof`.
    pub fn next_token(&mut self) -> Token {
        if self.finished {
            return Token::new(TokenKind::Eof, self.here());
        }

        self.skip_whitespace();
        let start = self.here();

        let Some(c) = self.peek_char() else {
            self.finished = true;
            if self.parens > 0 || self.brackets > 0 {
                return Token::new(TokenKind::Error("unclosed '(' or '['".into()), start);
            }
            return Token::new(TokenKind::Eof, start);
        };

        let kind = match c {
            '(' => {
                self.advance();
                self.parens += 1;
                TokenKind::LParen
            }
            ')' => {
                if self.parens == 0 {
                    return self.fail(start, "unexpected ')'");
                }
                self.advance();
                self.parens -= 1;
                TokenKind::RParen
            }
            '[' => {
                self.advance();
                self.brackets += 1;
                TokenKind::LBracket
            }
            ']' => {
                if self.brackets == 0 {
                    return self.fail(start, "unexpected ']'");
                }
                self.advance();
                self.brackets -= 1;
                TokenKind::RBracket
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            '=' => return self.scan_pair(start, '=', TokenKind::Eq),
            '!' => return self.scan_pair(start, '=', TokenKind::NotEq),
            '<' => {
                self.advance();
                TokenKind::Lt
            }
            '>' => {
                self.advance();
                TokenKind::Gt
            }
            '\'' => return self.scan_string(start),
            c if c.is_ascii_digit() => return self.scan_number(start),
            c if is_ident_start(c) => return self.scan_word(start),
            c => return self.fail(start, &format!("unrecognized character {c:?}")),
        };

        Token::new(kind, self.span_from(start))
    }

    /// Scans `source` to completion, including the final `Eof` or `Error`.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind.is_terminal();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&pred) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(char::is_whitespace);
    }

    fn here(&self) -> Span {
        Span::point(self.position, self.line, self.column)
    }

    fn span_from(&self, start: Span) -> Span {
        Span::new(start.start, self.position, start.line, start.column)
    }

    fn fail(&mut self, at: Span, message: &str) -> Token {
        self.finished = true;
        Token::new(TokenKind::Error(message.to_string()), at)
    }

    /// Words and numbers must be followed by a separator.
    fn at_separator(&self) -> bool {
        match self.peek_char() {
            None => true,
            Some(c) => c.is_whitespace() || matches!(c, '.' | '(' | ')' | ',' | '[' | ']'),
        }
    }

    fn unexpected_here(&mut self) -> Token {
        let at = self.here();
        let message = match self.peek_char() {
            Some(c) => format!("unexpected {c:?}"),
            None => "unexpected end of input".to_string(),
        };
        self.fail(at, &message)
    }

    fn scan_pair(&mut self, start: Span, second: char, kind: TokenKind) -> Token {
        self.advance();
        if self.peek_char() != Some(second) {
            return self.unexpected_here();
        }
        self.advance();
        Token::new(kind, self.span_from(start))
    }

    fn scan_string(&mut self, start: Span) -> Token {
        self.advance();
        let body_start = self.position;
        self.advance_while(|c| c != '\'');
        if self.peek_char().is_none() {
            return self.fail(start, "unterminated string");
        }
        let text = self.source[body_start..self.position].to_string();
        self.advance();
        Token::new(TokenKind::Str(text), self.span_from(start))
    }

    fn scan_number(&mut self, start: Span) -> Token {
        self.advance_while(|c| c.is_ascii_digit());
        if !self.at_separator() {
            return self.unexpected_here();
        }
        let text = &self.source[start.start..self.position];
        match text.parse::<f64>() {
            Ok(n) => Token::new(TokenKind::Number(n), self.span_from(start)),
            Err(e) => self.fail(start, &format!("invalid number: {e}")),
        }
    }

    fn scan_word(&mut self, start: Span) -> Token {
        self.advance_while(is_ident_continue);
        if !self.at_separator() {
            return self.unexpected_here();
        }
        let word = &self.source[start.start..self.position];
        if let Some(keyword) = TokenKind::keyword(word) {
            return Token::new(keyword, self.span_from(start));
        }
        Token::new(TokenKind::Identifier(word.to_string()), self.span_from(start))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields tokens up to and including the terminal one.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        Some(self.next_token())
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
