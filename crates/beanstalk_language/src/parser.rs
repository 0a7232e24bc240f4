//! Precedence-climbing parser for rule expressions.
//!
//! Binding power, loosest first: `or`, `and`, `not`, comparisons and `in`,
//! subscript, call. A parenthesized list with a top-level comma is a tuple.

use beanstalk_foundation::{Error, ErrorKind, Result};

use crate::expr::{BinOp, BoolOp, Expr, FunctionDecl};
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

const OR: u8 = 1;
const AND: u8 = 2;
const NOT: u8 = 3;
const COMPARE: u8 = 4;
const SUBSCRIPT: u8 = 5;
const CALL: u8 = 6;

/// Parser over a single rule string.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    source: &'src str,
}

impl<'src> Parser<'src> {
    /// Creates a parser and primes the first token.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            source,
        }
    }

    /// Parses one expression. Tokens after it are left for [`Parser::has_more`].
    ///
    /// # Errors
    /// Returns a parse error carrying the offending position.
    pub fn parse(&mut self) -> Result<Expr> {
        self.parse_expr(0)
    }

    /// Returns true if input remains after the last parsed expression.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.current.kind != TokenKind::Eof
    }

    fn parse_expr(&mut self, min_power: u8) -> Result<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some(power) = infix_power(&self.current.kind) else {
                break;
            };
            if power < min_power {
                break;
            }

            lhs = match self.current.kind {
                TokenKind::Or | TokenKind::And => {
                    let op = if self.current.kind == TokenKind::Or {
                        BoolOp::Or
                    } else {
                        BoolOp::And
                    };
                    self.advance();
                    let rhs = self.parse_expr(power + 1)?;
                    Expr::boolop(op, lhs, rhs)
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr(0)?;
                    self.expect(&TokenKind::RBracket)?;
                    Expr::Subscript {
                        target: Box::new(lhs),
                        index: Box::new(index),
                    }
                }
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_arguments()?;
                    Expr::Call {
                        callee: Box::new(lhs),
                        args,
                    }
                }
                _ => {
                    let op = compare_op(&self.current.kind)
                        .ok_or_else(|| self.error("expected an operator"))?;
                    self.advance();
                    let rhs = self.parse_expr(power + 1)?;
                    Expr::binop(op, lhs, rhs)
                }
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        let expr = match &self.current.kind {
            TokenKind::Identifier(name) => Expr::Identifier(name.clone()),
            TokenKind::Number(n) => Expr::Number(*n),
            TokenKind::Str(s) => Expr::Str(s.clone()),
            TokenKind::True => Expr::Bool(true),
            TokenKind::False => Expr::Bool(false),
            TokenKind::Not => {
                self.advance();
                let inner = self.parse_expr(NOT)?;
                return Ok(Expr::Not(Box::new(inner)));
            }
            TokenKind::LParen => return self.parse_group(),
            TokenKind::Error(msg) => return Err(self.error(&msg.clone())),
            TokenKind::Eof => return Err(self.error("unexpected end of input")),
            other => {
                return Err(self.error(&format!("expected expression, found {}", other.name())));
            }
        };
        self.advance();
        Ok(expr)
    }

    /// `( expr )` or `( expr, expr, ... )`.
    fn parse_group(&mut self) -> Result<Expr> {
        let open = self.current.span;
        self.expect(&TokenKind::LParen)?;
        let first = self.parse_expr(0)?;
        if self.current.kind != TokenKind::Comma {
            self.expect(&TokenKind::RParen)?;
            return Ok(first);
        }

        let mut elems = vec![first];
        while self.current.kind == TokenKind::Comma {
            self.advance();
            elems.push(self.parse_expr(0)?);
        }
        if self.current.kind != TokenKind::RParen {
            return Err(self.error_at(
                open,
                &format!("expected ')' to close tuple, found {}", self.current.kind.name()),
            ));
        }
        self.advance();
        Ok(Expr::Tuple(elems))
    }

    /// Arguments after an already consumed `(`.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.current.kind == TokenKind::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr(0)?);
            if self.current.kind == TokenKind::Comma {
                self.advance();
                continue;
            }
            self.expect(&TokenKind::RParen)?;
            return Ok(args);
        }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<()> {
        if std::mem::discriminant(&self.current.kind) == std::mem::discriminant(expected) {
            self.advance();
            return Ok(());
        }
        if let TokenKind::Error(msg) = &self.current.kind {
            return Err(self.error(&msg.clone()));
        }
        Err(self.error(&format!(
            "expected {}, found {}",
            expected.name(),
            self.current.kind.name()
        )))
    }

    fn error(&self, message: &str) -> Error {
        self.error_at(self.current.span, message)
    }

    fn error_at(&self, span: Span, message: &str) -> Error {
        Error::new(ErrorKind::ParseError {
            message: message.to_string(),
            line: span.line,
            column: span.column,
            context: self.context_at(span),
        })
    }

    fn context_at(&self, span: Span) -> String {
        let start = span.start.min(self.source.len());
        let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.source[start..]
            .find('\n')
            .map_or(self.source.len(), |i| start + i);
        self.source[line_start..line_end].to_string()
    }
}

fn infix_power(kind: &TokenKind) -> Option<u8> {
    Some(match kind {
        TokenKind::Or => OR,
        TokenKind::And => AND,
        TokenKind::Eq | TokenKind::NotEq | TokenKind::Lt | TokenKind::Gt | TokenKind::In => {
            COMPARE
        }
        TokenKind::LBracket => SUBSCRIPT,
        TokenKind::LParen => CALL,
        _ => return None,
    })
}

fn compare_op(kind: &TokenKind) -> Option<BinOp> {
    Some(match kind {
        TokenKind::Eq => BinOp::Eq,
        TokenKind::NotEq => BinOp::NotEq,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::In => BinOp::Contains,
        _ => return None,
    })
}

/// Parses a complete rule; trailing input is an error.
///
/// # Errors
/// Returns a parse error for malformed or trailing input.
pub fn parse(source: &str) -> Result<Expr> {
    let mut parser = Parser::new(source);
    let expr = parser.parse()?;
    if parser.has_more() {
        let found = parser.current.kind.clone();
        return Err(match found {
            TokenKind::Error(msg) => parser.error(&msg),
            other => parser.error(&format!("unexpected {} after expression", other.name())),
        });
    }
    Ok(expr)
}

/// Parses a helper declaration such as `("can_use(item)", "is_adult and item")`.
///
/// # Errors
/// Returns an error if either half fails to parse or the declaration is not a
/// bare name or a call on plain parameter names.
pub fn parse_function_decl(decl: &str, body: &str) -> Result<FunctionDecl> {
    let head = parse(decl).map_err(|e| e.in_frame(format!("while parsing helper {decl:?}")))?;
    let (name, params) = match head {
        Expr::Identifier(name) => (name, Vec::new()),
        Expr::Call { callee, args } => {
            let Expr::Identifier(name) = *callee else {
                return Err(Error::optimization(format!(
                    "unsupported helper declaration: {decl}"
                )));
            };
            let params = args
                .into_iter()
                .map(|arg| match arg {
                    Expr::Identifier(param) => Ok(param),
                    other => Err(Error::optimization(format!(
                        "unsupported helper parameter in {decl}: {other:?}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            (name, params)
        }
        other => {
            return Err(Error::optimization(format!(
                "unsupported helper declaration: {other:?}"
            )));
        }
    };
    let body = parse(body).map_err(|e| e.in_frame(format!("while parsing body of {name}")))?;
    Ok(FunctionDecl { name, params, body })
}
