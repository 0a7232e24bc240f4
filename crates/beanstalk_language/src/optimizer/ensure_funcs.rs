//! Turns bare references to zero-argument functions into calls.

use beanstalk_foundation::{Error, Result};

use crate::ast::Node;
use crate::functions::FunctionTable;
use crate::objects::{Arity, BuiltIn};
use crate::symbols::{SymbolId, SymbolKind, SymbolTable};
use crate::visitor::Rewriter;

/// `is_adult` becomes `is_adult()`. Call arguments are left alone.
pub struct EnsureFuncs<'a> {
    symbols: &'a SymbolTable,
    functions: &'a FunctionTable,
}

impl<'a> EnsureFuncs<'a> {
    /// Creates the pass.
    #[must_use]
    pub fn new(symbols: &'a SymbolTable, functions: &'a FunctionTable) -> Self {
        Self { symbols, functions }
    }

    fn bare_reference_error(&self, id: SymbolId, expected: usize) -> Error {
        Error::arity_mismatch(expected.to_string(), 0)
            .in_frame(format!("bare reference to {}", self.symbols.name_of(id)))
    }
}

impl Rewriter for EnsureFuncs<'_> {
    fn rewrite_identifier(&mut self, id: SymbolId) -> Result<Node> {
        match self.symbols.kind_of(id) {
            SymbolKind::BuiltIn => {
                let name = self.symbols.name_of(id);
                let builtin = BuiltIn::from_name(name)
                    .ok_or_else(|| Error::undefined_symbol(format!("built-in {name}")))?;
                match builtin.arity() {
                    Arity::Fixed(0) => Ok(Node::invoke(id, Vec::new())),
                    Arity::Fixed(n) => Err(self.bare_reference_error(id, n)),
                    Arity::Variadic => Err(self.bare_reference_error(id, 1)),
                }
            }
            SymbolKind::CompFunc => Ok(Node::invoke(id, Vec::new())),
            SymbolKind::Function | SymbolKind::CompiledFunc => match self.functions.get(id) {
                Some(helper) if helper.params.is_empty() => Ok(Node::invoke(id, Vec::new())),
                Some(helper) => Err(self.bare_reference_error(id, helper.params.len())),
                None => Err(Error::undefined_symbol(self.symbols.name_of(id))),
            },
            _ => Ok(Node::Identifier(id)),
        }
    }

    fn rewrite_invoke(&mut self, target: Node, args: Vec<Node>) -> Result<Node> {
        Ok(Node::Invoke {
            target: Box::new(target),
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::rewrite;

    fn run(symbols: &SymbolTable, functions: &FunctionTable, node: Node) -> Result<Node> {
        rewrite(&mut EnsureFuncs::new(symbols, functions), node)
    }

    #[test]
    fn zero_arg_builtins_become_calls() {
        let mut symbols = SymbolTable::new();
        let adult = symbols.declare("is_adult", SymbolKind::BuiltIn).unwrap();
        let functions = FunctionTable::new();
        let out = run(&symbols, &functions, Node::Every(vec![Node::Identifier(adult)])).unwrap();
        assert_eq!(out, Node::Every(vec![Node::invoke(adult, vec![])]));
    }

    #[test]
    fn parameterized_builtins_are_rejected() {
        let mut symbols = SymbolTable::new();
        let has = symbols.declare("has", SymbolKind::BuiltIn).unwrap();
        let functions = FunctionTable::new();
        assert!(run(&symbols, &functions, Node::Identifier(has)).is_err());
    }

    #[test]
    fn helpers_by_arity() {
        let mut symbols = SymbolTable::new();
        let mut functions = FunctionTable::new();
        let bare = functions.declare("can_play", "Ocarina", &mut symbols).unwrap();
        let param = functions.declare("can_use(x)", "x", &mut symbols).unwrap();
        assert_eq!(
            run(&symbols, &functions, Node::Identifier(bare)).unwrap(),
            Node::invoke(bare, vec![])
        );
        assert!(run(&symbols, &functions, Node::Identifier(param)).is_err());

        let missing = symbols.declare("mystery", SymbolKind::Function).unwrap();
        assert!(run(&symbols, &functions, Node::Identifier(missing)).is_err());
    }

    #[test]
    fn call_arguments_are_not_visited() {
        let mut symbols = SymbolTable::new();
        let adult = symbols.declare("is_adult", SymbolKind::BuiltIn).unwrap();
        let f = symbols.declare("f", SymbolKind::BuiltIn).unwrap();
        let functions = FunctionTable::new();
        let call = Node::invoke(f, vec![Node::Identifier(adult)]);
        assert_eq!(run(&symbols, &functions, call.clone()).unwrap(), call);
    }

    #[test]
    fn other_kinds_pass_through() {
        let mut symbols = SymbolTable::new();
        let bow = symbols.declare("Bow", SymbolKind::Token).unwrap();
        let functions = FunctionTable::new();
        assert_eq!(
            run(&symbols, &functions, Node::Identifier(bow)).unwrap(),
            Node::Identifier(bow)
        );
    }
}
