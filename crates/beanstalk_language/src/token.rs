//! Token types produced by the lexer.

use std::fmt;

use crate::span::Span;

/// A lexical token with its location.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Where it came from.
    pub span: Span,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The source text this token was scanned from.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.slice(source)
    }
}

/// Token kinds of the rule language.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// `Kokiri_Sword`, `is_adult`, `logic_grottos_without_agony`
    Identifier(String),
    /// Unsigned decimal literal; rules only ever count.
    Number(f64),
    /// Single-quoted string, quotes stripped.
    Str(String),

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,

    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
    /// `in`
    In,
    /// `True`
    True,
    /// `False`
    False,

    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,

    /// End of input.
    Eof,
    /// Illegal input; the lexer stops after producing one.
    Error(String),
}

impl TokenKind {
    /// Human-readable name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identifier(_) => "identifier",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::Comma => "','",
            Self::And => "'and'",
            Self::Or => "'or'",
            Self::Not => "'not'",
            Self::In => "'in'",
            Self::True => "'True'",
            Self::False => "'False'",
            Self::Eq => "'=='",
            Self::NotEq => "'!='",
            Self::Lt => "'<'",
            Self::Gt => "'>'",
            Self::Eof => "end of input",
            Self::Error(_) => "error",
        }
    }

    /// Maps a scanned word to its keyword kind, if it is one.
    #[must_use]
    pub fn keyword(word: &str) -> Option<Self> {
        Some(match word {
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "in" => Self::In,
            "True" => Self::True,
            "False" => Self::False,
            _ => return None,
        })
    }

    /// Returns true for `Eof` and `Error`, after which the lexer yields nothing new.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Eof | Self::Error(_))
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "{name}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "'{s}'"),
            Self::Error(msg) => write!(f, "<error: {msg}>"),
            other => {
                let name = other.name();
                f.write_str(name.trim_matches('\''))
            }
        }
    }
}
