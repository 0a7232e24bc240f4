//! AST rewrite pipeline.
//!
//! Every round runs the passes in a fixed order:
//!
//! 1. [`InlineCalls`] - helper calls become helper bodies
//! 2. [`ExpandIntrinsics`] - compiler functions, when a [`CompilerFunctions`] is attached
//! 3. [`FoldConstants`] - literal negation, comparison and list reduction
//! 4. [`EnsureFuncs`] - bare zero-argument functions become calls
//! 5. [`CollapseHas`] - `has(x, 1)` lists become `has_every`/`has_anyof`
//! 6. [`PromoteTokens`] - bare tokens become `has`, bare settings become loads
//!
//! Rounds repeat until the tree stops changing or the configured round count
//! is spent, since each pass can expose work for the ones before it.

pub mod collapse_has;
pub mod connections;
pub mod ensure_funcs;
pub mod fold;
pub mod inline;
pub mod intrinsics;
pub mod promote;

use beanstalk_foundation::Result;
use tracing::trace;

use crate::ast::Node;
use crate::config::CompilerConfig;
use crate::functions::FunctionTable;
use crate::symbols::SymbolTable;
use crate::visitor::rewrite;

pub use collapse_has::CollapseHas;
pub use connections::{Connections, GeneratedConnection, Mark};
pub use ensure_funcs::EnsureFuncs;
pub use fold::{fold_compare, FoldConstants};
pub use inline::InlineCalls;
pub use intrinsics::{CompilerFunctions, ExpandIntrinsics, SettingsFunctions};
pub use promote::PromoteTokens;

/// Drives the passes over one tree.
pub struct Optimizer<'a> {
    symbols: &'a mut SymbolTable,
    functions: &'a FunctionTable,
    intrinsics: Option<&'a mut dyn CompilerFunctions>,
    config: CompilerConfig,
}

impl<'a> Optimizer<'a> {
    /// Creates an optimizer without compiler functions.
    #[must_use]
    pub fn new(symbols: &'a mut SymbolTable, functions: &'a FunctionTable) -> Self {
        Self {
            symbols,
            functions,
            intrinsics: None,
            config: CompilerConfig::default(),
        }
    }

    /// Attaches compiler functions.
    #[must_use]
    pub fn with_intrinsics(mut self, intrinsics: &'a mut dyn CompilerFunctions) -> Self {
        self.intrinsics = Some(intrinsics);
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs rounds until a fixpoint or the round limit.
    ///
    /// # Errors
    /// Propagates the first pass failure.
    pub fn run(&mut self, mut node: Node) -> Result<Node> {
        for round in 0..self.config.passes {
            let before = node.clone();
            node = self.round(node)?;
            if self.config.stop_at_fixpoint && node == before {
                trace!(round, "optimizer reached fixpoint");
                break;
            }
        }
        Ok(node)
    }

    fn round(&mut self, node: Node) -> Result<Node> {
        let node = rewrite(&mut InlineCalls::new(self.functions), node)?;
        let node = match self.intrinsics.as_deref_mut() {
            Some(funcs) => rewrite(&mut ExpandIntrinsics::new(funcs, self.symbols), node)?,
            None => node,
        };
        let node = rewrite(&mut FoldConstants, node)?;
        let node = rewrite(&mut EnsureFuncs::new(self.symbols, self.functions), node)?;
        let node = rewrite(&mut CollapseHas::new(self.symbols)?, node)?;
        rewrite(&mut PromoteTokens::new(self.symbols)?, node)
    }
}
