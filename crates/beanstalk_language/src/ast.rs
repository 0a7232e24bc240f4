//! Resolved rule tree.
//!
//! Unlike [`Expr`](crate::expr::Expr), every name here is a [`SymbolId`] and
//! the boolean connectives are n-ary lists. Nodes are plain values; rewrite
//! passes consume a tree and return a new one.

use crate::symbols::SymbolId;

/// Comparison operators that survive lowering. `>` is lowered to a swapped `<`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Nq,
    /// `<`
    Lt,
}

impl CompareOp {
    /// Source spelling.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Nq => "!=",
            Self::Lt => "<",
        }
    }

    /// Numeric code passed to `compare_setting`.
    #[must_use]
    pub const fn code(self) -> f64 {
        match self {
            Self::Eq => 1.0,
            Self::Nq => 2.0,
            Self::Lt => 3.0,
        }
    }

    /// Inverse of [`CompareOp::code`].
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn from_code(code: f64) -> Option<Self> {
        match code {
            c if c == 1.0 => Some(Self::Eq),
            c if c == 2.0 => Some(Self::Nq),
            c if c == 3.0 => Some(Self::Lt),
            _ => None,
        }
    }
}

/// A node of the resolved rule tree.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// True if any member is.
    AnyOf(Vec<Node>),
    /// True if every member is.
    Every(Vec<Node>),
    /// Binary comparison.
    Compare {
        /// Operator.
        op: CompareOp,
        /// Left operand.
        lhs: Box<Node>,
        /// Right operand.
        rhs: Box<Node>,
    },
    /// Reference to a symbol.
    Identifier(SymbolId),
    /// Logical negation.
    Invert(Box<Node>),
    /// Call.
    Invoke {
        /// Callee, an identifier once lowered.
        target: Box<Node>,
        /// Arguments in order.
        args: Vec<Node>,
    },
    /// Numeric literal.
    Number(f64),
    /// String literal.
    Str(String),
    /// Boolean literal.
    Bool(bool),
}

impl Node {
    /// A call on a symbol.
    #[must_use]
    pub fn invoke(target: SymbolId, args: Vec<Node>) -> Self {
        Self::Invoke {
            target: Box::new(Self::Identifier(target)),
            args,
        }
    }

    /// `has(what, qty)`.
    #[must_use]
    pub fn has(has: SymbolId, what: Node, qty: f64) -> Self {
        Self::invoke(has, vec![what, Self::Number(qty)])
    }

    /// A comparison.
    #[must_use]
    pub fn compare(op: CompareOp, lhs: Node, rhs: Node) -> Self {
        Self::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Negation.
    #[must_use]
    pub fn invert(inner: Node) -> Self {
        Self::Invert(Box::new(inner))
    }

    /// Short label for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::AnyOf(_) => "anyof",
            Self::Every(_) => "every",
            Self::Compare { .. } => "compare",
            Self::Identifier(_) => "identifier",
            Self::Invert(_) => "invert",
            Self::Invoke { .. } => "invoke",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
        }
    }

    /// Returns the symbol if this is an identifier.
    #[must_use]
    pub fn as_identifier(&self) -> Option<SymbolId> {
        match self {
            Self::Identifier(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the callee symbol if this is a call on an identifier.
    #[must_use]
    pub fn invoked(&self) -> Option<SymbolId> {
        match self {
            Self::Invoke { target, .. } => target.as_identifier(),
            _ => None,
        }
    }

    /// Returns the literal if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Merges directly nested lists of the same kind into this one.
    /// Other nodes are returned unchanged.
    #[must_use]
    pub fn flatten(self) -> Self {
        match self {
            Self::AnyOf(items) => Self::AnyOf(flatten_into(items, |n| match n {
                Self::AnyOf(inner) => Ok(inner),
                other => Err(other),
            })),
            Self::Every(items) => Self::Every(flatten_into(items, |n| match n {
                Self::Every(inner) => Ok(inner),
                other => Err(other),
            })),
            other => other,
        }
    }

    /// Drops neutral literals, short-circuits on absorbing ones, and unwraps
    /// singleton lists. An empty `Every` is `True`, an empty `AnyOf` is `False`.
    /// Other nodes are returned unchanged.
    #[must_use]
    pub fn reduce(self) -> Self {
        match self {
            Self::AnyOf(items) => reduce_list(items, true, Self::AnyOf),
            Self::Every(items) => reduce_list(items, false, Self::Every),
            other => other,
        }
    }
}

fn flatten_into(items: Vec<Node>, open: impl Fn(Node) -> Result<Vec<Node>, Node> + Copy) -> Vec<Node> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match open(item) {
            Ok(inner) => out.extend(flatten_into(inner, open)),
            Err(leaf) => out.push(leaf),
        }
    }
    out
}

/// `absorbing` is the literal that decides the whole list.
fn reduce_list(items: Vec<Node>, absorbing: bool, rebuild: fn(Vec<Node>) -> Node) -> Node {
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        match item.as_bool() {
            Some(b) if b == absorbing => return Node::Bool(absorbing),
            Some(_) => {}
            None => kept.push(item),
        }
    }
    match kept.len() {
        0 => Node::Bool(!absorbing),
        1 => kept.pop().unwrap_or(Node::Bool(!absorbing)),
        _ => rebuild(kept),
    }
}
