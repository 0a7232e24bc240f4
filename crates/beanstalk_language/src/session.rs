//! One compilation session: the tables a rule set is compiled against.
//!
//! A [`Session`] owns the symbol table, object table, helpers, and the
//! generated-connection queue. Symbol and object indices are baked into every
//! tape it produces, so tapes are only meaningful against the session's own
//! [`Objects`].
//!
//! A failing rule leaves the tables usable; [`Session::compile_all`] collects
//! failures instead of stopping at the first one.

use beanstalk_foundation::{Error, Result};
use tracing::{debug, instrument, warn};

use crate::ast::Node;
use crate::compiler::compile;
use crate::config::CompilerConfig;
use crate::functions::FunctionTable;
use crate::lower::lower;
use crate::objects::{BuiltIn, Objects};
use crate::optimizer::intrinsics::COMPILER_FUNCTIONS;
use crate::optimizer::{Connections, Optimizer, SettingsFunctions};
use crate::parser::parse;
use crate::render::pretty;
use crate::settings::SettingReader;
use crate::symbols::{escape_name, SymbolId, SymbolKind, SymbolTable};

/// Names every session knows before any rule is read.
pub const GLOBALS: [&str; 11] = [
    "Fire", "Forest", "Light", "Shadow", "Spirit", "Water", "adult", "age", "both", "either",
    "child",
];

/// What reaching an edge's destination means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceKind {
    /// An item check; the destination is a token.
    Check,
    /// An event; the destination is an event flag.
    Event,
    /// An exit; the destination is another location.
    Transit,
}

/// Raw rule text for one edge, as a data loader hands it over.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Source {
    /// Edge kind.
    pub kind: SourceKind,
    /// Location the edge leaves from.
    pub origin: String,
    /// Check, event, or location the edge reaches.
    pub destination: String,
    /// Guard rule text.
    pub rule: String,
}

impl Source {
    /// Creates a source.
    #[must_use]
    pub fn new(kind: SourceKind, origin: &str, destination: &str, rule: &str) -> Self {
        Self {
            kind,
            origin: origin.to_string(),
            destination: destination.to_string(),
            rule: rule.to_string(),
        }
    }

    /// An item check at `origin`.
    #[must_use]
    pub fn check(origin: &str, destination: &str, rule: &str) -> Self {
        Self::new(SourceKind::Check, origin, destination, rule)
    }

    /// An event at `origin`.
    #[must_use]
    pub fn event(origin: &str, destination: &str, rule: &str) -> Self {
        Self::new(SourceKind::Event, origin, destination, rule)
    }

    /// An exit from `origin` to `destination`.
    #[must_use]
    pub fn transit(origin: &str, destination: &str, rule: &str) -> Self {
        Self::new(SourceKind::Transit, origin, destination, rule)
    }

    /// `origin -> destination`, the name a transit edge is declared under.
    #[must_use]
    pub fn edge_name(&self) -> String {
        format!("{} -> {}", self.origin, self.destination)
    }
}

/// A compiled edge.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledSource {
    /// Edge kind. Generated connections compile as [`SourceKind::Event`].
    pub kind: SourceKind,
    /// Origin location.
    pub origin: SymbolId,
    /// Destination symbol.
    pub destination: SymbolId,
    /// The `TRANSIT` symbol, for exits.
    pub edge: Option<SymbolId>,
    /// Origin name.
    pub origin_name: String,
    /// Destination name.
    pub destination_name: String,
    /// The guard's bytecode.
    pub tape: Vec<u8>,
}

/// Outcome of compiling many rules.
#[derive(Debug, Default)]
pub struct CompileReport {
    /// Rules that compiled.
    pub compiled: Vec<CompiledSource>,
    /// One error per rule that did not.
    pub failed: Vec<Error>,
}

impl CompileReport {
    /// Returns true if every rule compiled.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    /// Every compiled rule, or all the failures joined into one error.
    ///
    /// # Errors
    /// Returns the joined failures if any rule failed.
    pub fn into_result(self) -> Result<Vec<CompiledSource>> {
        if self.failed.is_empty() {
            Ok(self.compiled)
        } else {
            Err(Error::join(self.failed))
        }
    }

    fn absorb(&mut self, other: CompileReport) {
        self.compiled.extend(other.compiled);
        self.failed.extend(other.failed);
    }
}

/// Tables and settings shared by every rule of one world.
pub struct Session<R> {
    symbols: SymbolTable,
    objects: Objects,
    functions: FunctionTable,
    connections: Connections,
    settings: R,
    config: CompilerConfig,
}

impl<R: SettingReader> Session<R> {
    /// Creates a session with the built-ins, compiler functions, and globals
    /// declared.
    ///
    /// # Errors
    /// Only fails if the fixed declarations conflict with each other.
    pub fn new(settings: R) -> Result<Self> {
        let mut symbols = SymbolTable::new();
        symbols.declare_many(SymbolKind::BuiltIn, BuiltIn::ALL.iter().map(|b| b.name()))?;
        symbols.declare_many(SymbolKind::CompFunc, COMPILER_FUNCTIONS)?;
        symbols.declare_many(SymbolKind::Global, GLOBALS)?;
        Ok(Self {
            symbols,
            objects: Objects::new(),
            functions: FunctionTable::new(),
            connections: Connections::new(),
            settings,
            config: CompilerConfig::default(),
        })
    }

    /// Replaces the optimizer configuration.
    #[must_use]
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// The symbol table.
    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The object table every tape of this session indexes into.
    #[must_use]
    pub fn objects(&self) -> &Objects {
        &self.objects
    }

    /// The declared helpers.
    #[must_use]
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// The compile-time settings.
    #[must_use]
    pub fn settings(&self) -> &R {
        &self.settings
    }

    /// Ends the session, keeping the tables its tapes index into.
    #[must_use]
    pub fn into_tables(self) -> (SymbolTable, Objects) {
        (self.symbols, self.objects)
    }

    /// Number of generated connections waiting for [`Session::compile_generated`].
    #[must_use]
    pub fn pending_connections(&self) -> usize {
        self.connections.pending()
    }

    /// Declares placeable items. Each is also reachable through its escaped
    /// spelling, so `Bottle with Milk` answers to `Bottle_with_Milk`.
    ///
    /// # Errors
    /// Fails on a conflicting declaration.
    pub fn declare_tokens<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Result<Vec<SymbolId>> {
        self.declare_escaped(SymbolKind::Token, names)
    }

    /// Declares event flags, with escaped aliases.
    ///
    /// # Errors
    /// Fails on a conflicting declaration.
    pub fn declare_events<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Result<Vec<SymbolId>> {
        self.declare_escaped(SymbolKind::Event, names)
    }

    /// Declares setting names.
    ///
    /// # Errors
    /// Fails on a conflicting declaration.
    pub fn declare_settings<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Result<Vec<SymbolId>> {
        self.symbols.declare_many(SymbolKind::Setting, names)
    }

    /// Declares location names.
    ///
    /// # Errors
    /// Fails on a conflicting declaration.
    pub fn declare_locations<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Result<Vec<SymbolId>> {
        self.symbols.declare_many(SymbolKind::Location, names)
    }

    /// Declares helpers from `(declaration, body)` pairs.
    ///
    /// # Errors
    /// Stops at the first helper that fails to parse or lower.
    pub fn declare_helpers<'a>(&mut self, helpers: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<()> {
        self.functions.declare_all(helpers, &mut self.symbols)
    }

    fn declare_escaped<'a>(
        &mut self,
        kind: SymbolKind,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<SymbolId>> {
        names
            .into_iter()
            .map(|name| {
                let id = self.symbols.declare(name, kind)?;
                let escaped = escape_name(name);
                if escaped != name {
                    self.symbols.alias(id, &escaped)?;
                }
                Ok(id)
            })
            .collect()
    }

    fn declare_one(&mut self, kind: SymbolKind, name: &str) -> Result<SymbolId> {
        let ids = self.declare_escaped(kind, [name])?;
        ids.first()
            .copied()
            .ok_or_else(|| Error::internal(format!("declaring {name} returned nothing")))
    }

    /// Compiles one edge's rule.
    ///
    /// Calls to `at` and `here` queue generated connections; compile those
    /// with [`Session::compile_generated`] once every source is in.
    ///
    /// # Errors
    /// Any parse, lowering, optimization, or code generation failure, with
    /// the rule text and the edge attached as context.
    #[instrument(skip_all, fields(origin = %source.origin, destination = %source.destination))]
    pub fn compile(&mut self, source: &Source) -> Result<CompiledSource> {
        self.compile_source(source)
            .map_err(|e| annotate(e, &source.rule, source.edge_name()))
    }

    /// Compiles every source, collecting failures.
    pub fn compile_all<'s>(&mut self, sources: impl IntoIterator<Item = &'s Source>) -> CompileReport {
        let mut report = CompileReport::default();
        for source in sources {
            match self.compile(source) {
                Ok(compiled) => report.compiled.push(compiled),
                Err(err) => {
                    warn!(error = %err, edge = %source.edge_name(), "rule failed to compile");
                    report.failed.push(err);
                }
            }
        }
        report
    }

    /// Compiles queued generated connections, batch by batch, until a batch
    /// queues nothing new.
    #[instrument(skip_all)]
    pub fn compile_generated(&mut self) -> CompileReport {
        let mut report = CompileReport::default();
        loop {
            let batch = self.connections.swap();
            if batch.is_empty() {
                break;
            }
            debug!(
                generation = self.connections.generation(),
                size = batch.len(),
                "compiling generated connections"
            );
            let mut round = CompileReport::default();
            for conn in batch {
                let text = pretty(&conn.rule, &self.symbols);
                let frame = format!("{} -> {}", conn.origin_name, conn.name);
                match self.optimize_and_compile(conn.rule, &conn.origin_name) {
                    Ok(tape) => round.compiled.push(CompiledSource {
                        kind: SourceKind::Event,
                        origin: conn.origin,
                        destination: conn.destination,
                        edge: None,
                        origin_name: conn.origin_name,
                        destination_name: conn.name,
                        tape,
                    }),
                    Err(err) => {
                        let err = annotate(err, &text, frame);
                        warn!(error = %err, "generated connection failed to compile");
                        round.failed.push(err);
                    }
                }
            }
            report.absorb(round);
        }
        report
    }

    fn compile_source(&mut self, source: &Source) -> Result<CompiledSource> {
        let origin = self.symbols.declare(&source.origin, SymbolKind::Location)?;
        let (destination, edge) = match source.kind {
            SourceKind::Check => (self.declare_one(SymbolKind::Token, &source.destination)?, None),
            SourceKind::Event => (self.declare_one(SymbolKind::Event, &source.destination)?, None),
            SourceKind::Transit => {
                let destination = self.symbols.declare(&source.destination, SymbolKind::Location)?;
                let edge = self.symbols.declare(&source.edge_name(), SymbolKind::Transit)?;
                (destination, Some(edge))
            }
        };

        let node = lower(parse(&source.rule)?, &mut self.symbols)?;
        let tape = self.optimize_and_compile(node, &source.origin)?;
        debug!(len = tape.len(), "compiled rule");

        Ok(CompiledSource {
            kind: source.kind,
            origin,
            destination,
            edge,
            origin_name: source.origin.clone(),
            destination_name: source.destination.clone(),
            tape,
        })
    }

    /// Connections queued while optimizing `node` are withdrawn if the rule
    /// fails.
    fn optimize_and_compile(&mut self, node: Node, current: &str) -> Result<Vec<u8>> {
        let mark = self.connections.mark();
        let compiled = self.try_optimize_and_compile(node, current);
        if compiled.is_err() {
            self.connections.rollback(mark);
        }
        compiled
    }

    fn try_optimize_and_compile(&mut self, node: Node, current: &str) -> Result<Vec<u8>> {
        let mut funcs =
            SettingsFunctions::new(&self.settings).with_connections(&mut self.connections, current);
        let node = Optimizer::new(&mut self.symbols, &self.functions)
            .with_intrinsics(&mut funcs)
            .with_config(self.config.clone())
            .run(node)?;
        Ok(compile(&node, &self.symbols, &mut self.objects)?.into_bytes())
    }
}

/// Attaches the rule text, unless a deeper layer already did, and the edge.
fn annotate(mut err: Error, rule: &str, edge: String) -> Error {
    let mut context = err.context.take().unwrap_or_default();
    if context.source.is_none() {
        context.source = Some(rule.to_string());
    }
    err.with_context(context.with_frame(edge))
}
