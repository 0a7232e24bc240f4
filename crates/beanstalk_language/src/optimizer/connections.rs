//! Synthetic edges produced by `at` and `here`.
//!
//! Each expansion declares a fresh event named
//! `Token$<generation>#<rank>@<origin>`, queues an edge from the origin to
//! that event guarded by the call's rule, and replaces the call with
//! `has(event, 1)`. Ranks count per origin within one generation, so a name
//! is never issued twice. [`Connections::swap`] hands out the queued batch and
//! starts the next generation.

use std::collections::HashMap;

use beanstalk_foundation::Result;
use tracing::debug;

use crate::ast::Node;
use crate::symbols::{SymbolId, SymbolKind, SymbolTable};

/// A queued synthetic edge.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedConnection {
    /// Location the edge leaves from.
    pub origin: SymbolId,
    /// Name of `origin`.
    pub origin_name: String,
    /// The synthetic event.
    pub destination: SymbolId,
    /// Name of `destination`.
    pub name: String,
    /// Guard, not yet optimized.
    pub rule: Node,
    /// Generation the edge was created in.
    pub generation: u32,
    /// Position among this generation's edges from `origin`.
    pub rank: u32,
    /// Location whose rule contained the call.
    pub attached_to: String,
}

/// Queue position returned by [`Connections::mark`].
#[derive(Clone, Debug)]
pub struct Mark {
    queued: usize,
    ranks: HashMap<String, u32>,
}

/// Generation counter and the current batch.
#[derive(Debug, Default)]
pub struct Connections {
    generation: u32,
    batch: Vec<GeneratedConnection>,
    ranks: HashMap<String, u32>,
}

impl Connections {
    /// Starts at generation zero with an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of queued edges.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Queues an edge from `origin_name` guarded by `rule` and returns the
    /// node that replaces the call site.
    ///
    /// # Errors
    /// Fails if the origin or destination name is already declared with an
    /// incompatible kind.
    pub fn generate(
        &mut self,
        symbols: &mut SymbolTable,
        origin_name: &str,
        attached_to: &str,
        rule: Node,
    ) -> Result<Node> {
        let origin = symbols.declare(origin_name, SymbolKind::Location)?;
        let has = symbols.declare("has", SymbolKind::BuiltIn)?;
        let origin_name = symbols.name_of(origin).to_string();

        let rank = self.ranks.entry(origin_name.clone()).or_insert(0);
        let name = format!(
            "Token${:04}#{:04}@{}",
            self.generation, *rank, origin_name
        );
        let destination = symbols.declare(&name, SymbolKind::Event)?;
        debug!(%name, attached_to, "generated connection");

        self.batch.push(GeneratedConnection {
            origin,
            origin_name,
            destination,
            name,
            rule,
            generation: self.generation,
            rank: *rank,
            attached_to: attached_to.to_string(),
        });
        *rank += 1;

        Ok(Node::has(has, Node::Identifier(destination), 1.0))
    }

    /// Remembers the queue so a failed rule can withdraw what it queued.
    #[must_use]
    pub fn mark(&self) -> Mark {
        Mark {
            queued: self.batch.len(),
            ranks: self.ranks.clone(),
        }
    }

    /// Drops everything queued since `mark` and restores the rank counters.
    pub fn rollback(&mut self, mark: Mark) {
        let withdrawn = self.batch.len().saturating_sub(mark.queued);
        if withdrawn > 0 {
            debug!(withdrawn, "generated connections withdrawn");
        }
        self.batch.truncate(mark.queued);
        self.ranks = mark.ranks;
    }

    /// Takes the queued batch and advances the generation.
    pub fn swap(&mut self) -> Vec<GeneratedConnection> {
        self.generation += 1;
        self.ranks.clear();
        std::mem::take(&mut self.batch)
    }
}
