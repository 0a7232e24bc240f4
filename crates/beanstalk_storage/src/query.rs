//! Query building and row retrieval.
//!
//! A query is three column sets. A row is admitted iff
//! `(exists ∪ load) ⊆ presence` and `presence ∩ not_exists = ∅`.
//!
//! Declaring a component type that has no column does not fail right away;
//! the error is kept on the builder and the whole query fails when it is
//! built or executed.

use beanstalk_foundation::{Bitset, Error, Result};

use crate::component::{ColumnId, Component, Payload, RowId};
use crate::engine::Engine;

/// Accumulates column constraints and any resolution errors.
#[must_use]
pub struct QueryBuilder<'e> {
    engine: &'e Engine,
    load: Vec<ColumnId>,
    exists: Bitset,
    not_exists: Bitset,
    subset: Option<Bitset>,
    errors: Vec<Error>,
}

impl<'e> QueryBuilder<'e> {
    pub(crate) fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            load: Vec::new(),
            exists: Bitset::new(),
            not_exists: Bitset::new(),
            subset: None,
            errors: Vec::new(),
        }
    }

    /// Requires `C` and fetches its value for each row.
    pub fn load<C: Component>(mut self) -> Self {
        if let Some(col) = self.resolve::<C>() {
            self.load.push(col);
        }
        self
    }

    /// Requires `C` to be present.
    pub fn exists<C: Component>(mut self) -> Self {
        if let Some(col) = self.resolve::<C>() {
            self.exists.set(col.index());
        }
        self
    }

    /// Requires `C` to be absent.
    pub fn not_exists<C: Component>(mut self) -> Self {
        if let Some(col) = self.resolve::<C>() {
            self.not_exists.set(col.index());
        }
        self
    }

    /// Requires a column by id.
    pub fn exists_column(mut self, col: ColumnId) -> Self {
        self.exists.set(col.index());
        self
    }

    /// Forbids a column by id.
    pub fn not_exists_column(mut self, col: ColumnId) -> Self {
        self.not_exists.set(col.index());
        self
    }

    /// Restricts candidates to `rows`.
    pub fn from_subset(mut self, rows: Bitset) -> Self {
        self.subset = Some(rows);
        self
    }

    /// Finishes the query.
    ///
    /// # Errors
    /// Returns every deferred resolution error, joined.
    pub fn build(self) -> Result<Query> {
        if !self.errors.is_empty() {
            return Err(Error::join(self.errors));
        }
        let mut load_mask = Bitset::new();
        load_mask.extend(self.load.iter().map(|c| c.index()));
        Ok(Query {
            load: self.load,
            load_mask,
            exists: self.exists,
            not_exists: self.not_exists,
            subset: self.subset,
        })
    }

    /// Builds and executes the query.
    ///
    /// # Errors
    /// Returns every deferred resolution error, joined.
    pub fn retrieve(self) -> Result<RowSet<'e>> {
        let engine = self.engine;
        let query = self.build()?;
        Ok(engine.retrieve(&query))
    }

    fn resolve<C: Component>(&mut self) -> Option<ColumnId> {
        match self.engine.column_id::<C>() {
            Ok(col) => Some(col),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }
}

/// A compiled row predicate plus the columns to load.
#[derive(Clone, Debug, Default)]
pub struct Query {
    load: Vec<ColumnId>,
    load_mask: Bitset,
    exists: Bitset,
    not_exists: Bitset,
    subset: Option<Bitset>,
}

impl Query {
    /// Builds a query directly from column sets.
    #[must_use]
    pub fn from_parts(load: Vec<ColumnId>, exists: Bitset, not_exists: Bitset) -> Self {
        let load_mask = load.iter().map(|c| c.index()).collect();
        Self {
            load,
            load_mask,
            exists,
            not_exists,
            subset: None,
        }
    }

    /// Returns true if a row with `presence` satisfies this query.
    #[must_use]
    pub fn admits(&self, presence: &Bitset) -> bool {
        self.exists.is_subset(presence)
            && self.load_mask.is_subset(presence)
            && presence.is_disjoint(&self.not_exists)
    }

    /// Columns to load, in declaration order.
    #[must_use]
    pub fn load(&self) -> &[ColumnId] {
        &self.load
    }

    /// Candidate restriction, if any.
    #[must_use]
    pub fn subset(&self) -> Option<&Bitset> {
        self.subset.as_ref()
    }
}

// =============================================================================
// Results
// =============================================================================

/// Rows admitted by a query, captured at retrieval time.
///
/// Exactly one hit is returned as [`RowSet::One`] so the common
/// "find the row with this unique name" case needs no iteration.
#[derive(Debug)]
pub enum RowSet<'e> {
    /// No row matched.
    Empty,
    /// Exactly one row matched.
    One(Row<'e>),
    /// Several rows matched; values are loaded lazily.
    Many(Rows<'e>),
}

impl<'e> RowSet<'e> {
    pub(crate) fn new(engine: &'e Engine, load: Vec<ColumnId>, matched: Bitset) -> Self {
        match matched.len() {
            0 => Self::Empty,
            1 => {
                let row = matched.first().map_or(RowId(0), RowId);
                Self::One(Row::load(engine, &load, row))
            }
            _ => Self::Many(Rows {
                engine,
                load,
                matched,
            }),
        }
    }

    /// Number of admitted rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Many(rows) => rows.matched.len(),
        }
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The admitted row ids.
    #[must_use]
    pub fn ids(&self) -> Bitset {
        match self {
            Self::Empty => Bitset::new(),
            Self::One(row) => [row.id.index()].into_iter().collect(),
            Self::Many(rows) => rows.matched.clone(),
        }
    }

    /// The single row, if exactly one matched.
    #[must_use]
    pub fn single(self) -> Option<Row<'e>> {
        match self {
            Self::One(row) => Some(row),
            _ => None,
        }
    }
}

impl<'e> IntoIterator for RowSet<'e> {
    type Item = Row<'e>;
    type IntoIter = RowIter<'e>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Self::Empty => RowIter::Done,
            Self::One(row) => RowIter::One(Some(row)),
            Self::Many(rows) => RowIter::Many(rows),
        }
    }
}

/// Lazily loading multi-row cursor.
#[derive(Debug)]
pub struct Rows<'e> {
    engine: &'e Engine,
    load: Vec<ColumnId>,
    matched: Bitset,
}

impl<'e> Iterator for Rows<'e> {
    type Item = Row<'e>;

    fn next(&mut self) -> Option<Row<'e>> {
        let row = self.matched.pop()?;
        Some(Row::load(self.engine, &self.load, RowId(row)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.matched.len();
        (n, Some(n))
    }
}

/// Iterator over a [`RowSet`].
pub enum RowIter<'e> {
    /// Exhausted.
    Done,
    /// Single row not yet yielded.
    One(Option<Row<'e>>),
    /// Multi-row cursor.
    Many(Rows<'e>),
}

impl<'e> Iterator for RowIter<'e> {
    type Item = Row<'e>;

    fn next(&mut self) -> Option<Row<'e>> {
        match self {
            Self::Done => None,
            Self::One(row) => row.take(),
            Self::Many(rows) => rows.next(),
        }
    }
}

/// One admitted row with its loaded values.
#[derive(Debug)]
pub struct Row<'e> {
    /// The row id.
    pub id: RowId,
    columns: Vec<ColumnId>,
    values: Vec<&'e Payload>,
    engine: &'e Engine,
}

impl<'e> Row<'e> {
    fn load(engine: &'e Engine, load: &[ColumnId], id: RowId) -> Self {
        let mut columns = Vec::with_capacity(load.len());
        let mut values = Vec::with_capacity(load.len());
        for col in load {
            if let Some(payload) = engine.table().get(id, *col) {
                columns.push(*col);
                values.push(payload);
            }
        }
        Self {
            id,
            columns,
            values,
            engine,
        }
    }

    /// Loaded payloads in load order.
    #[must_use]
    pub fn values(&self) -> &[&'e Payload] {
        &self.values
    }

    /// The loaded value of `C`, if `C` was loaded.
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<C> {
        let col = self.engine.column_id::<C>().ok()?;
        let pos = self.columns.iter().position(|c| *c == col)?;
        C::from_payload(self.values[pos])
    }

    /// Returns true if `C` was loaded for this row.
    #[must_use]
    pub fn has<C: Component>(&self) -> bool {
        self.get::<C>().is_some()
    }
}
