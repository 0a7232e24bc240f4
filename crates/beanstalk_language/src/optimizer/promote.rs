//! Gives bare tokens and settings their runtime meaning.

use beanstalk_foundation::Result;

use crate::ast::Node;
use crate::symbols::{Symbol, SymbolId, SymbolKind, SymbolTable};
use crate::visitor::Rewriter;

/// `Bow` becomes `has(Bow, 1)` and `bridge` becomes `load_setting(bridge)`.
///
/// Names that do not resolve are retried with underscores read as spaces,
/// since rule text spells display names both ways. Call arguments are never
/// promoted.
pub struct PromoteTokens<'a> {
    symbols: &'a SymbolTable,
    has: SymbolId,
    load_setting: SymbolId,
}

impl<'a> PromoteTokens<'a> {
    /// Creates the pass, declaring the built-ins it emits.
    ///
    /// # Errors
    /// Fails if `has` or `load_setting` is already declared as something else.
    pub fn new(symbols: &'a mut SymbolTable) -> Result<Self> {
        let has = symbols.declare("has", SymbolKind::BuiltIn)?;
        let load_setting = symbols.declare("load_setting", SymbolKind::BuiltIn)?;
        Ok(Self {
            symbols,
            has,
            load_setting,
        })
    }

    fn promote(&self, symbol: &Symbol) -> Option<Node> {
        match symbol.kind {
            SymbolKind::Token | SymbolKind::Event => {
                Some(Node::has(self.has, Node::Identifier(symbol.id), 1.0))
            }
            SymbolKind::Setting => Some(Node::invoke(
                self.load_setting,
                vec![Node::Identifier(symbol.id)],
            )),
            _ => None,
        }
    }

    fn spaced(&self, name: &str) -> Option<&'a Symbol> {
        if !name.contains('_') {
            return None;
        }
        self.symbols.lookup(&name.replace('_', " "))
    }
}

impl Rewriter for PromoteTokens<'_> {
    fn rewrite_identifier(&mut self, id: SymbolId) -> Result<Node> {
        let Some(symbol) = self.symbols.get(id) else {
            return Ok(Node::Identifier(id));
        };
        if let Some(promoted) = self.promote(symbol) {
            return Ok(promoted);
        }
        if symbol.kind == SymbolKind::Unknown {
            if let Some(promoted) = self.spaced(&symbol.name).and_then(|s| self.promote(s)) {
                return Ok(promoted);
            }
        }
        Ok(Node::Identifier(id))
    }

    fn rewrite_str(&mut self, s: String) -> Result<Node> {
        let found = self.symbols.lookup(&s).or_else(|| self.spaced(&s));
        Ok(match found {
            Some(symbol) if matches!(symbol.kind, SymbolKind::Token | SymbolKind::Event) => {
                Node::has(self.has, Node::Identifier(symbol.id), 1.0)
            }
            _ => Node::Str(s),
        })
    }

    fn rewrite_invoke(&mut self, target: Node, args: Vec<Node>) -> Result<Node> {
        Ok(Node::Invoke {
            target: Box::new(target),
            args,
        })
    }
}
