//! Replaces calls to scripted helpers with the helper's body.

use std::collections::HashMap;

use beanstalk_foundation::{Error, Result};

use crate::ast::Node;
use crate::functions::FunctionTable;
use crate::symbols::SymbolId;
use crate::visitor::{rewrite, rewrite_all, Rewriter};

/// Nested helper expansions deeper than this are treated as recursion.
const MAX_DEPTH: usize = 64;

/// Inlines helper calls, substituting arguments for parameters.
///
/// Only the innermost helper's parameters are in scope while its body is
/// rewritten, so a body never sees its caller's parameters.
pub struct InlineCalls<'a> {
    functions: &'a FunctionTable,
    scopes: Vec<HashMap<SymbolId, Node>>,
}

impl<'a> InlineCalls<'a> {
    /// Creates the pass.
    #[must_use]
    pub fn new(functions: &'a FunctionTable) -> Self {
        Self {
            functions,
            scopes: Vec::new(),
        }
    }
}

impl Rewriter for InlineCalls<'_> {
    fn rewrite_identifier(&mut self, id: SymbolId) -> Result<Node> {
        Ok(self
            .scopes
            .last()
            .and_then(|scope| scope.get(&id))
            .cloned()
            .unwrap_or(Node::Identifier(id)))
    }

    fn rewrite_invoke(&mut self, target: Node, args: Vec<Node>) -> Result<Node> {
        let args = rewrite_all(self, args)?;
        let target = rewrite(self, target)?;

        let Some(helper) = target.as_identifier().and_then(|id| self.functions.get(id)) else {
            return Ok(Node::Invoke {
                target: Box::new(target),
                args,
            });
        };

        if helper.params.len() != args.len() {
            return Err(Error::arity_mismatch(helper.params.len().to_string(), args.len()));
        }
        if self.scopes.len() >= MAX_DEPTH {
            return Err(Error::optimization(format!(
                "helper {:?} expands more than {MAX_DEPTH} levels deep",
                helper.id
            )));
        }

        self.scopes
            .push(helper.params.iter().copied().zip(args).collect());
        let body = rewrite(self, helper.body.clone());
        self.scopes.pop();
        body
    }
}
