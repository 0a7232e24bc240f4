//! Batches single-token `has` checks.
//!
//! Inside an `Every`, every `has(x, 1)` and every existing `has_every(...)`
//! merge into one `has_every`. Inside an `AnyOf`, the same happens with
//! `has_anyof`. The batch takes the position of its first member; everything
//! else keeps its place.

use beanstalk_foundation::Result;

use crate::ast::Node;
use crate::symbols::{SymbolId, SymbolKind, SymbolTable};
use crate::visitor::{rewrite_all, Rewriter};

/// The collapsing pass.
pub struct CollapseHas {
    has: SymbolId,
    has_every: SymbolId,
    has_anyof: SymbolId,
}

impl CollapseHas {
    /// Creates the pass, declaring the three built-ins it emits.
    ///
    /// # Errors
    /// Fails if one of those names is already something other than a built-in.
    pub fn new(symbols: &mut SymbolTable) -> Result<Self> {
        Ok(Self {
            has: symbols.declare("has", SymbolKind::BuiltIn)?,
            has_every: symbols.declare("has_every", SymbolKind::BuiltIn)?,
            has_anyof: symbols.declare("has_anyof", SymbolKind::BuiltIn)?,
        })
    }

    /// The token of `has(token, 1)`.
    fn single(&self, node: &Node) -> Option<Node> {
        let Node::Invoke { target, args } = node else {
            return None;
        };
        if target.as_identifier() != Some(self.has) {
            return None;
        }
        match args.as_slice() {
            [token @ Node::Identifier(_), Node::Number(qty)] if (*qty - 1.0).abs() < f64::EPSILON => {
                Some(token.clone())
            }
            _ => None,
        }
    }

    fn collapse(&self, items: Vec<Node>, batch: SymbolId) -> Vec<Node> {
        let mut kept = Vec::with_capacity(items.len());
        let mut gathered = Vec::new();
        let mut slot = None;

        for item in items {
            if let Some(token) = self.single(&item) {
                slot.get_or_insert(kept.len());
                gathered.push(token);
                continue;
            }
            if item.invoked() == Some(batch) {
                if let Node::Invoke { args, .. } = item {
                    slot.get_or_insert(kept.len());
                    gathered.extend(args);
                }
                continue;
            }
            kept.push(item);
        }

        let Some(slot) = slot else {
            return kept;
        };
        let merged = if gathered.len() == 1 {
            Node::has(self.has, gathered.remove(0), 1.0)
        } else {
            Node::invoke(batch, gathered)
        };
        kept.insert(slot, merged);
        kept
    }
}

impl Rewriter for CollapseHas {
    fn rewrite_every(&mut self, items: Vec<Node>) -> Result<Node> {
        let items = rewrite_all(self, items)?;
        Ok(Node::Every(self.collapse(items, self.has_every))
            .flatten()
            .reduce())
    }

    fn rewrite_any_of(&mut self, items: Vec<Node>) -> Result<Node> {
        let items = rewrite_all(self, items)?;
        Ok(Node::AnyOf(self.collapse(items, self.has_anyof))
            .flatten()
            .reduce())
    }
}
