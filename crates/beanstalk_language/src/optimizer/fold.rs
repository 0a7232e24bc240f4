//! Constant folding.
//!
//! Only rewrites whose result the VM would also produce under every host
//! state: negated literals, literal comparisons, comparisons of a symbol with
//! itself, and boolean list reduction.

use std::cmp::Ordering;

use beanstalk_foundation::Result;

use crate::ast::{CompareOp, Node};
use crate::visitor::{rewrite, rewrite_all, Rewriter};

/// The folding pass.
#[derive(Debug, Default)]
pub struct FoldConstants;

impl Rewriter for FoldConstants {
    fn rewrite_any_of(&mut self, items: Vec<Node>) -> Result<Node> {
        Ok(Node::AnyOf(rewrite_all(self, items)?).flatten().reduce())
    }

    fn rewrite_every(&mut self, items: Vec<Node>) -> Result<Node> {
        Ok(Node::Every(rewrite_all(self, items)?).flatten().reduce())
    }

    fn rewrite_invert(&mut self, inner: Node) -> Result<Node> {
        Ok(match rewrite(self, inner)? {
            Node::Bool(b) => Node::Bool(!b),
            Node::Invert(twice) => *twice,
            other => Node::invert(other),
        })
    }

    fn rewrite_compare(&mut self, op: CompareOp, lhs: Node, rhs: Node) -> Result<Node> {
        let lhs = rewrite(self, lhs)?;
        let rhs = rewrite(self, rhs)?;
        Ok(fold_compare(op, &lhs, &rhs).map_or_else(|| Node::compare(op, lhs, rhs), Node::Bool))
    }
}

/// Decides a comparison at compile time, if it can be decided.
#[must_use]
pub fn fold_compare(op: CompareOp, lhs: &Node, rhs: &Node) -> Option<bool> {
    let ordering = match (lhs, rhs) {
        (Node::Number(a), Node::Number(b)) => a.partial_cmp(b)?,
        (Node::Str(a), Node::Str(b)) => a.cmp(b),
        (Node::Bool(a), Node::Bool(b)) if op != CompareOp::Lt => a.cmp(b),
        (Node::Identifier(a), Node::Identifier(b)) if op != CompareOp::Lt && a == b => {
            Ordering::Equal
        }
        _ => return None,
    };
    Some(match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Nq => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolId;
    use proptest::prelude::*;

    fn fold(node: Node) -> Node {
        rewrite(&mut FoldConstants, node).unwrap()
    }

    fn id(n: u32) -> Node {
        Node::Identifier(SymbolId::new(n))
    }

    #[test]
    fn negation() {
        assert_eq!(fold(Node::invert(Node::Bool(true))), Node::Bool(false));
        assert_eq!(fold(Node::invert(Node::invert(id(1)))), id(1));
        assert_eq!(fold(Node::invert(id(1))), Node::invert(id(1)));
    }

    #[test]
    fn literal_comparisons() {
        let cmp = |op, l, r| fold(Node::compare(op, l, r));
        assert_eq!(
            cmp(CompareOp::Lt, Node::Number(2.0), Node::Number(3.0)),
            Node::Bool(true)
        );
        assert_eq!(
            cmp(CompareOp::Eq, Node::Str("a".into()), Node::Str("b".into())),
            Node::Bool(false)
        );
        assert_eq!(
            cmp(CompareOp::Nq, Node::Bool(true), Node::Bool(false)),
            Node::Bool(true)
        );
        // mixed types stay for the VM
        assert!(matches!(
            cmp(CompareOp::Eq, Node::Number(1.0), Node::Str("1".into())),
            Node::Compare { .. }
        ));
        assert!(matches!(
            cmp(CompareOp::Lt, Node::Bool(false), Node::Bool(true)),
            Node::Compare { .. }
        ));
    }

    #[test]
    fn reflexive_identifiers() {
        assert_eq!(
            fold(Node::compare(CompareOp::Eq, id(3), id(3))),
            Node::Bool(true)
        );
        assert_eq!(
            fold(Node::compare(CompareOp::Nq, id(3), id(3))),
            Node::Bool(false)
        );
        assert!(matches!(
            fold(Node::compare(CompareOp::Eq, id(3), id(4))),
            Node::Compare { .. }
        ));
    }

    #[test]
    fn lists_fold_bottom_up() {
        let tree = Node::AnyOf(vec![
            id(1),
            Node::Every(vec![Node::invert(Node::Bool(false)), Node::Bool(true)]),
        ]);
        assert_eq!(fold(tree), Node::Bool(true));

        let tree = Node::Every(vec![id(1), Node::Every(vec![id(2), Node::Bool(true)])]);
        assert_eq!(fold(tree), Node::Every(vec![id(1), id(2)]));
    }

    /// Evaluates a boolean tree with identifier `n` bound to bit `n` of `env`.
    fn eval(node: &Node, env: u8) -> bool {
        match node {
            Node::Bool(b) => *b,
            Node::Identifier(id) => env & (1 << id.index()) != 0,
            Node::Invert(inner) => !eval(inner, env),
            Node::Every(items) => items.iter().all(|n| eval(n, env)),
            Node::AnyOf(items) => items.iter().any(|n| eval(n, env)),
            other => panic!("not generated: {other:?}"),
        }
    }

    fn tree() -> impl Strategy<Value = Node> {
        let leaf = prop_oneof![any::<bool>().prop_map(Node::Bool), (0u32..4).prop_map(id)];
        leaf.prop_recursive(4, 24, 4, |inner| {
            prop_oneof![
                inner.clone().prop_map(Node::invert),
                prop::collection::vec(inner.clone(), 0..4).prop_map(Node::Every),
                prop::collection::vec(inner, 0..4).prop_map(Node::AnyOf),
            ]
        })
    }

    proptest! {
        #[test]
        fn folding_preserves_meaning(t in tree(), env in 0u8..16) {
            let folded = fold(t.clone());
            prop_assert_eq!(eval(&folded, env), eval(&t, env));
        }
    }
}
