//! Parse tree for rule expressions.
//!
//! This is the shape of the source text and nothing more. Names are still
//! strings; [`lower`](crate::lower) resolves them against the symbol table and
//! produces the [`Node`](crate::ast::Node) tree the optimizer works on.

/// Comparison and membership operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `in`
    Contains,
}

impl BinOp {
    /// Source spelling.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Contains => "in",
        }
    }
}

/// Boolean connectives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoolOp {
    /// `and`
    And,
    /// `or`
    Or,
}

impl BoolOp {
    /// Source spelling.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// A parsed rule expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Bare name.
    Identifier(String),
    /// Numeric literal.
    Number(f64),
    /// String literal.
    Str(String),
    /// `True` / `False`.
    Bool(bool),
    /// `callee(args...)`
    Call {
        /// Usually an identifier.
        callee: Box<Expr>,
        /// Arguments in source order.
        args: Vec<Expr>,
    },
    /// `target[index]`
    Subscript {
        /// Collection being indexed.
        target: Box<Expr>,
        /// Index expression.
        index: Box<Expr>,
    },
    /// `(a, b, ...)` with at least one top-level comma.
    Tuple(Vec<Expr>),
    /// `not expr`
    Not(Box<Expr>),
    /// Comparison or `in`.
    BinOp {
        /// Operator.
        op: BinOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// `and` / `or`.
    BoolOp {
        /// Connective.
        op: BoolOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Shorthand for an identifier.
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Shorthand for a call on a named callee.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call {
            callee: Box::new(Self::ident(name)),
            args,
        }
    }

    /// Shorthand for a comparison.
    #[must_use]
    pub fn binop(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Self::BinOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Shorthand for a connective.
    #[must_use]
    pub fn boolop(op: BoolOp, lhs: Expr, rhs: Expr) -> Self {
        Self::BoolOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Returns the name if this is an identifier.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the callee name if this is a call on an identifier.
    #[must_use]
    pub fn callee_name(&self) -> Option<&str> {
        match self {
            Self::Call { callee, .. } => callee.as_identifier(),
            _ => None,
        }
    }
}

/// A scripted helper: `name(params...)` bound to a body expression.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    /// Helper name.
    pub name: String,
    /// Parameter names in order. Empty for bare-name helpers.
    pub params: Vec<String>,
    /// Body expression.
    pub body: Expr,
}
