//! Traversal and rewriting of [`Node`] trees.
//!
//! Two traits, both with a default method per node kind:
//! - [`AstVisitor`] observes a tree; defaults do nothing.
//! - [`Rewriter`] rebuilds a tree; defaults recurse structurally, so a pass
//!   overrides only the node kinds it cares about.
//!
//! # Example
//!
//! ```
//! use beanstalk_language::ast::Node;
//! use beanstalk_language::visitor::{rewrite, Rewriter};
//! use beanstalk_foundation::Result;
//!
//! struct Negate;
//!
//! impl Rewriter for Negate {
//!     fn rewrite_bool(&mut self, value: bool) -> Result<Node> {
//!         Ok(Node::Bool(!value))
//!     }
//! }
//!
//! let tree = Node::AnyOf(vec![Node::Bool(true), Node::Number(1.0)]);
//! let out = rewrite(&mut Negate, tree).unwrap();
//! assert_eq!(out, Node::AnyOf(vec![Node::Bool(false), Node::Number(1.0)]));
//! ```

use beanstalk_foundation::Result;

use crate::ast::{CompareOp, Node};
use crate::symbols::SymbolId;

// =============================================================================
// Read-Only Visitor
// =============================================================================

/// Read-only traversal. Drive it with [`walk`].
#[allow(unused_variables)]
pub trait AstVisitor {
    /// Called before any node's own callback.
    fn enter_node(&mut self, node: &Node) {}

    /// Called after a node and all of its children.
    fn leave_node(&mut self, node: &Node) {}

    /// Identifier leaf.
    fn visit_identifier(&mut self, id: SymbolId) {}

    /// Literal leaf of any type.
    fn visit_literal(&mut self, node: &Node) {}

    /// Call, before its target and arguments are walked.
    fn visit_invoke(&mut self, target: &Node, args: &[Node]) {}
}

/// Walks `node` depth-first, pre-order.
pub fn walk<V: AstVisitor + ?Sized>(visitor: &mut V, node: &Node) {
    visitor.enter_node(node);
    match node {
        Node::AnyOf(items) | Node::Every(items) => {
            for item in items {
                walk(visitor, item);
            }
        }
        Node::Compare { lhs, rhs, .. } => {
            walk(visitor, lhs);
            walk(visitor, rhs);
        }
        Node::Identifier(id) => visitor.visit_identifier(*id),
        Node::Invert(inner) => walk(visitor, inner),
        Node::Invoke { target, args } => {
            visitor.visit_invoke(target, args);
            walk(visitor, target);
            for arg in args {
                walk(visitor, arg);
            }
        }
        Node::Number(_) | Node::Str(_) | Node::Bool(_) => visitor.visit_literal(node),
    }
    visitor.leave_node(node);
}

/// Counts nodes and tracks the deepest nesting.
#[derive(Debug, Default)]
pub struct TreeShape {
    /// Total nodes visited.
    pub nodes: usize,
    /// Maximum depth, root at 1.
    pub depth: usize,
    current: usize,
}

impl TreeShape {
    /// Measures `node`.
    #[must_use]
    pub fn of(node: &Node) -> Self {
        let mut shape = Self::default();
        walk(&mut shape, node);
        shape
    }
}

impl AstVisitor for TreeShape {
    fn enter_node(&mut self, _node: &Node) {
        self.nodes += 1;
        self.current += 1;
        self.depth = self.depth.max(self.current);
    }

    fn leave_node(&mut self, _node: &Node) {
        self.current -= 1;
    }
}

/// Collects the callee of every call, in visit order.
#[derive(Debug, Default)]
pub struct CalleeCollector {
    /// Callee symbols, duplicates included.
    pub callees: Vec<SymbolId>,
}

impl AstVisitor for CalleeCollector {
    fn visit_invoke(&mut self, target: &Node, _args: &[Node]) {
        if let Some(id) = target.as_identifier() {
            self.callees.push(id);
        }
    }
}

// =============================================================================
// Rewriter
// =============================================================================

/// Tree-to-tree rewrite. Drive it with [`rewrite`].
pub trait Rewriter {
    /// `AnyOf`; default rewrites each member.
    fn rewrite_any_of(&mut self, items: Vec<Node>) -> Result<Node> {
        Ok(Node::AnyOf(rewrite_all(self, items)?))
    }

    /// `Every`; default rewrites each member.
    fn rewrite_every(&mut self, items: Vec<Node>) -> Result<Node> {
        Ok(Node::Every(rewrite_all(self, items)?))
    }

    /// Comparison; default rewrites both sides.
    fn rewrite_compare(&mut self, op: CompareOp, lhs: Node, rhs: Node) -> Result<Node> {
        let lhs = rewrite(self, lhs)?;
        let rhs = rewrite(self, rhs)?;
        Ok(Node::compare(op, lhs, rhs))
    }

    /// Identifier leaf; default keeps it.
    fn rewrite_identifier(&mut self, id: SymbolId) -> Result<Node> {
        Ok(Node::Identifier(id))
    }

    /// Negation; default rewrites the operand.
    fn rewrite_invert(&mut self, inner: Node) -> Result<Node> {
        Ok(Node::invert(rewrite(self, inner)?))
    }

    /// Call; default rewrites the target and then each argument.
    fn rewrite_invoke(&mut self, target: Node, args: Vec<Node>) -> Result<Node> {
        let target = rewrite(self, target)?;
        let args = rewrite_all(self, args)?;
        Ok(Node::Invoke {
            target: Box::new(target),
            args,
        })
    }

    /// Number leaf; default keeps it.
    fn rewrite_number(&mut self, value: f64) -> Result<Node> {
        Ok(Node::Number(value))
    }

    /// String leaf; default keeps it.
    fn rewrite_str(&mut self, value: String) -> Result<Node> {
        Ok(Node::Str(value))
    }

    /// Boolean leaf; default keeps it.
    fn rewrite_bool(&mut self, value: bool) -> Result<Node> {
        Ok(Node::Bool(value))
    }
}

/// Dispatches `node` to the matching [`Rewriter`] method.
///
/// # Errors
/// Propagates the first error a callback returns.
pub fn rewrite<R: Rewriter + ?Sized>(rewriter: &mut R, node: Node) -> Result<Node> {
    match node {
        Node::AnyOf(items) => rewriter.rewrite_any_of(items),
        Node::Every(items) => rewriter.rewrite_every(items),
        Node::Compare { op, lhs, rhs } => rewriter.rewrite_compare(op, *lhs, *rhs),
        Node::Identifier(id) => rewriter.rewrite_identifier(id),
        Node::Invert(inner) => rewriter.rewrite_invert(*inner),
        Node::Invoke { target, args } => rewriter.rewrite_invoke(*target, args),
        Node::Number(value) => rewriter.rewrite_number(value),
        Node::Str(value) => rewriter.rewrite_str(value),
        Node::Bool(value) => rewriter.rewrite_bool(value),
    }
}

/// Rewrites each node in order.
///
/// # Errors
/// Propagates the first error a callback returns.
pub fn rewrite_all<R: Rewriter + ?Sized>(rewriter: &mut R, nodes: Vec<Node>) -> Result<Vec<Node>> {
    nodes
        .into_iter()
        .map(|node| rewrite(rewriter, node))
        .collect()
}
