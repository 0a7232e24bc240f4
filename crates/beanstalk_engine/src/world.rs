//! The explorable world: compiled edges stored as rows, plus the graph over
//! them.
//!
//! Every location, token, check, and event is a row keyed by the symbol it
//! was compiled as. Every edge is a row carrying its origin, destination,
//! kind, and compiled rule. The [`Directed`] graph mirrors the edge rows with
//! row indexes as nodes.

use std::collections::HashMap;
use std::sync::Arc;

use beanstalk_foundation::{Directed, Error, Result};
use beanstalk_language::{
    CompileReport, CompiledSource, Objects, SettingReader, Session, Source, SourceKind, SymbolId,
    SymbolKind, SymbolTable,
};
use beanstalk_storage::{Component, ComponentValue, Engine, IndexSpec, RowId};
use tracing::{debug, instrument, warn};

use crate::components::{
    Collected, Destination, DungeonReward, EdgeKind, IsBottle, IsCheck, IsEdge, IsEvent,
    IsLocation, IsToken, Medallion, Name, Notes, Origin, PieceOfHeart, Placed, Rule, Song,
    SpiritualStone, Symbol,
};

// =============================================================================
// World
// =============================================================================

/// Compiled rules, the rows they connect, and the object table their tapes
/// index into.
#[derive(Debug)]
pub struct World {
    storage: Engine,
    symbols: SymbolTable,
    objects: Objects,
    graph: Directed,
    edges: HashMap<(u32, u32), RowId>,
}

impl World {
    /// The row store.
    #[must_use]
    pub fn storage(&self) -> &Engine {
        &self.storage
    }

    /// The symbol table the rules were compiled against.
    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The object table every rule indexes into.
    #[must_use]
    pub fn objects(&self) -> &Objects {
        &self.objects
    }

    /// Edges between rows, by row index.
    #[must_use]
    pub fn graph(&self) -> &Directed {
        &self.graph
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The row compiled as `symbol`.
    #[must_use]
    pub fn row_of(&self, symbol: SymbolId) -> Option<RowId> {
        self.storage.lookup_one(Symbol(symbol)).ok().flatten()
    }

    /// The row for `name`, resolving aliases such as escaped spellings.
    #[must_use]
    pub fn row(&self, name: &str) -> Option<RowId> {
        match self.symbols.lookup(name) {
            Some(symbol) => self.row_of(symbol.id),
            None => self.storage.lookup_one(Name(name.to_string())).ok().flatten(),
        }
    }

    /// The display name of `row`.
    #[must_use]
    pub fn name_of(&self, row: RowId) -> String {
        match self.storage.get::<Name>(row) {
            Ok(Some(Name(name))) => name,
            _ => row.to_string(),
        }
    }

    /// The edge row from `origin` to `destination`.
    #[must_use]
    pub fn edge(&self, origin: RowId, destination: RowId) -> Option<RowId> {
        self.edges.get(&(origin.index(), destination.index())).copied()
    }

    /// The compiled rule on an edge row.
    ///
    /// # Errors
    /// Returns an internal error if the row has no rule.
    pub fn rule(&self, edge: RowId) -> Result<Rule> {
        self.storage
            .get::<Rule>(edge)?
            .ok_or_else(|| Error::internal(format!("edge {} has no rule", self.name_of(edge))))
    }

    /// How many copies of `token` are held.
    #[must_use]
    pub fn collected(&self, token: RowId) -> u32 {
        match self.storage.get::<Collected>(token) {
            Ok(Some(Collected(n))) => n,
            _ => 0,
        }
    }

    /// Adds `qty` copies of `token` and returns the new count.
    ///
    /// # Errors
    /// Returns `RowNotFound` for an unknown row.
    pub fn collect(&mut self, token: RowId, qty: u32) -> Result<u32> {
        let total = self.collected(token).saturating_add(qty);
        self.storage.set(token, Collected(total))?;
        debug!(token = %self.name_of(token), total, "collected");
        Ok(total)
    }

    /// Removes up to `qty` copies of `token` and returns how many were removed.
    ///
    /// # Errors
    /// Returns `RowNotFound` for an unknown row.
    pub fn remove(&mut self, token: RowId, qty: u32) -> Result<u32> {
        let held = self.collected(token);
        let removed = held.min(qty);
        self.storage.set(token, Collected(held - removed))?;
        Ok(removed)
    }
}

// =============================================================================
// Token Categories
// =============================================================================

/// What kind of item a token is, for the counting built-ins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenCategory {
    /// A bottle.
    Bottle,
    /// A medallion; also a dungeon reward.
    Medallion,
    /// A spiritual stone; also a dungeon reward.
    SpiritualStone,
    /// Quarter hearts granted per copy.
    Heart(u32),
    /// A song and, when notes are shuffled, the button tokens it needs.
    Song(Vec<String>),
}

impl TokenCategory {
    fn components(&self) -> Vec<ComponentValue> {
        match self {
            Self::Bottle => vec![IsBottle.into()],
            Self::Medallion => vec![Medallion.into(), DungeonReward.into()],
            Self::SpiritualStone => vec![SpiritualStone.into(), DungeonReward.into()],
            Self::Heart(quarters) => vec![PieceOfHeart(*quarters).into()],
            Self::Song(notes) => vec![Song.into(), Notes(notes.join(",")).into()],
        }
    }
}

// =============================================================================
// WorldBuilder
// =============================================================================

/// Compiles sources into a [`World`].
pub struct WorldBuilder<R> {
    session: Session<R>,
    storage: Engine,
    graph: Directed,
    edges: HashMap<(u32, u32), RowId>,
}

impl<R: SettingReader> WorldBuilder<R> {
    /// Creates the world's columns and indexes around `session`.
    ///
    /// # Errors
    /// Only fails if a column is registered twice.
    pub fn new(session: Session<R>) -> Result<Self> {
        let mut storage = Engine::new();
        storage.create_column::<Name>()?;
        storage.create_column::<Symbol>()?;
        storage.create_column::<Collected>()?;
        storage.create_column::<PieceOfHeart>()?;
        storage.create_column::<Notes>()?;
        storage.create_column::<Origin>()?;
        storage.create_column::<Destination>()?;
        storage.create_column::<Placed>()?;
        storage.create_column::<Rule>()?;
        storage.create_column::<EdgeKind>()?;
        storage.create_column::<IsLocation>()?;
        storage.create_column::<IsToken>()?;
        storage.create_column::<IsEvent>()?;
        storage.create_column::<IsCheck>()?;
        storage.create_column::<IsEdge>()?;
        storage.create_column::<IsBottle>()?;
        storage.create_column::<Medallion>()?;
        storage.create_column::<SpiritualStone>()?;
        storage.create_column::<DungeonReward>()?;
        storage.create_column::<Song>()?;
        storage.create_index::<Name>(IndexSpec::unique())?;
        storage.create_index::<Symbol>(IndexSpec::unique())?;
        Ok(Self {
            session,
            storage,
            graph: Directed::new(),
            edges: HashMap::new(),
        })
    }

    /// The compile session.
    #[must_use]
    pub fn session(&self) -> &Session<R> {
        &self.session
    }

    /// The compile session, for declaring names and helpers.
    pub fn session_mut(&mut self) -> &mut Session<R> {
        &mut self.session
    }

    /// Declares a token and gives it a row with an empty count.
    ///
    /// # Errors
    /// Fails if the name is already declared as something other than a token.
    pub fn add_token(&mut self, name: &str, categories: &[TokenCategory]) -> Result<RowId> {
        let ids = self.session.declare_tokens([name])?;
        let symbol = ids
            .first()
            .copied()
            .ok_or_else(|| Error::internal("declaring one token returned nothing"))?;
        let mut tags: Vec<ComponentValue> = vec![IsToken.into(), Collected(0).into()];
        tags.extend(categories.iter().flat_map(TokenCategory::components));
        self.row_for(symbol, tags)
    }

    /// Marks `start` as where exploration begins.
    ///
    /// # Errors
    /// Fails if `start` is declared as something other than a location.
    pub fn add_root(&mut self, start: &str) -> Result<RowId> {
        let ids = self.session.declare_locations([start])?;
        let symbol = ids
            .first()
            .copied()
            .ok_or_else(|| Error::internal("declaring one location returned nothing"))?;
        let row = self.row_for(symbol, vec![IsLocation.into()])?;
        self.graph.add_root(row.index());
        Ok(row)
    }

    /// Puts `token` at `check`: reaching the check collects one copy.
    ///
    /// # Errors
    /// Returns `UndefinedSymbol` if either has no row yet.
    pub fn place(&mut self, check: &str, token: &str) -> Result<()> {
        let check_row = self.existing_row(check)?;
        let token_row = self.existing_row(token)?;
        self.storage.set(check_row, Placed(token_row))
    }

    /// Compiles one source and stores its edge.
    ///
    /// # Errors
    /// Any compile error, annotated with the rule and edge.
    pub fn add_source(&mut self, source: &Source) -> Result<RowId> {
        let compiled = self.session.compile(source)?;
        self.attach(compiled)
    }

    /// Compiles every source, storing the ones that compile and returning the
    /// failures.
    pub fn add_sources<'s>(&mut self, sources: impl IntoIterator<Item = &'s Source>) -> Vec<Error> {
        let report = self.session.compile_all(sources);
        self.attach_report(report)
    }

    /// Compiles generated connections and finishes the world.
    ///
    /// # Errors
    /// Returns every generated connection that failed to compile, joined.
    #[instrument(skip_all)]
    pub fn build(mut self) -> Result<World> {
        let report = self.session.compile_generated();
        let failed = self.attach_report(report);
        if !failed.is_empty() {
            return Err(Error::join(failed));
        }

        let (symbols, objects) = self.session.into_tables();
        debug!(
            rows = self.storage.row_count(),
            edges = self.edges.len(),
            "world built"
        );
        Ok(World {
            storage: self.storage,
            symbols,
            objects,
            graph: self.graph,
            edges: self.edges,
        })
    }

    fn attach_report(&mut self, report: CompileReport) -> Vec<Error> {
        let mut failed = report.failed;
        for compiled in report.compiled {
            if let Err(err) = self.attach(compiled) {
                warn!(error = %err, "compiled edge could not be stored");
                failed.push(err);
            }
        }
        failed
    }

    fn attach(&mut self, compiled: CompiledSource) -> Result<RowId> {
        let origin = self.row_for(compiled.origin, vec![IsLocation.into()])?;
        let tag: ComponentValue = match compiled.kind {
            SourceKind::Check => IsCheck.into(),
            SourceKind::Event => IsEvent.into(),
            SourceKind::Transit => IsLocation.into(),
        };
        let mut destination_tags = vec![tag];
        if compiled.kind == SourceKind::Event {
            destination_tags.push(Collected(0).into());
        }
        let destination = self.row_for(compiled.destination, destination_tags)?;

        let rule = Rule(Arc::from(compiled.tape));
        let key = (origin.index(), destination.index());
        if let Some(&edge) = self.edges.get(&key) {
            self.storage.set(edge, rule)?;
            debug!(origin = %compiled.origin_name, destination = %compiled.destination_name, "edge rule replaced");
            return Ok(edge);
        }

        let name = format!("{} -> {}", compiled.origin_name, compiled.destination_name);
        let mut values: Vec<ComponentValue> = vec![
            Name(name).into(),
            IsEdge.into(),
            Origin(origin).into(),
            Destination(destination).into(),
            EdgeKind(compiled.kind).into(),
            rule.into(),
        ];
        if let Some(edge_symbol) = compiled.edge {
            values.push(Symbol(edge_symbol).into());
        }
        let edge = self.storage.insert_row(values)?;
        self.graph.add_edge(origin.index(), destination.index());
        self.edges.insert(key, edge);
        debug!(
            origin = %compiled.origin_name,
            destination = %compiled.destination_name,
            kind = ?compiled.kind,
            "edge stored"
        );
        Ok(edge)
    }

    /// The row for `symbol`, created under its canonical name if missing.
    /// `tags` are applied either way.
    fn row_for(&mut self, symbol: SymbolId, tags: Vec<ComponentValue>) -> Result<RowId> {
        if let Some(row) = self.storage.lookup_one(Symbol(symbol))? {
            let fresh: Vec<ComponentValue> = tags
                .into_iter()
                .filter(|tag| tag.name() != Collected::NAME)
                .collect();
            self.storage.set_values(row, fresh)?;
            return Ok(row);
        }
        let name = self.session.symbols().name_of(symbol).to_string();
        let mut values: Vec<ComponentValue> = vec![Name(name).into(), Symbol(symbol).into()];
        values.extend(tags);
        let row = self.storage.insert_row(values)?;
        self.graph.add_node(row.index());
        Ok(row)
    }

    fn existing_row(&self, name: &str) -> Result<RowId> {
        let symbol = self
            .session
            .symbols()
            .lookup(name)
            .filter(|s| s.kind != SymbolKind::Unknown)
            .ok_or_else(|| Error::undefined_symbol(name))?;
        self.storage
            .lookup_one(Symbol(symbol.id))?
            .ok_or_else(|| Error::undefined_symbol(name))
    }
}
