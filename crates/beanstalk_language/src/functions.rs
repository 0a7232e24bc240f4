//! Scripted helper functions.
//!
//! Helpers are rule fragments with parameters, such as
//! `can_use(item)` → `is_adult and has(item, 1)`. They never reach the VM:
//! the inlining pass replaces each call with the helper's body.

use std::collections::HashMap;

use beanstalk_foundation::Result;
use tracing::debug;

use crate::ast::Node;
use crate::lower::lower;
use crate::parser::parse_function_decl;
use crate::symbols::{SymbolId, SymbolKind, SymbolTable};

/// One helper, lowered and ready to inline.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedFunction {
    /// Helper symbol.
    pub id: SymbolId,
    /// Parameter symbols, in order.
    pub params: Vec<SymbolId>,
    /// Lowered body.
    pub body: Node,
}

/// Helpers by symbol.
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    functions: HashMap<SymbolId, ScriptedFunction>,
}

impl FunctionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses, declares, and stores a helper. Re-declaring a helper replaces
    /// its body.
    ///
    /// # Errors
    /// Returns an error if either half fails to parse or lower, or if the
    /// helper name is already something that cannot be a helper.
    pub fn declare(&mut self, decl: &str, body: &str, symbols: &mut SymbolTable) -> Result<SymbolId> {
        let parsed = parse_function_decl(decl, body)?;
        let id = symbols.declare(&parsed.name, SymbolKind::CompiledFunc)?;
        let params = symbols.declare_many(SymbolKind::Local, &parsed.params)?;
        let body = lower(parsed.body, symbols)
            .map_err(|e| e.in_frame(format!("while lowering helper {}", parsed.name)))?;
        debug!(name = %parsed.name, params = params.len(), "declared helper");
        self.functions.insert(id, ScriptedFunction { id, params, body });
        Ok(id)
    }

    /// Declares every `(declaration, body)` pair, stopping at the first error.
    ///
    /// # Errors
    /// See [`FunctionTable::declare`].
    pub fn declare_all<'a, I>(&mut self, helpers: I, symbols: &mut SymbolTable) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (decl, body) in helpers {
            self.declare(decl, body, symbols)?;
        }
        Ok(())
    }

    /// Looks up a helper.
    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&ScriptedFunction> {
        self.functions.get(&id)
    }

    /// Number of helpers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if no helpers are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
