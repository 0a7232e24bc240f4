//! Typed facade over the [`Table`].
//!
//! The engine owns the component-type to column mapping. Resolving a
//! [`ComponentValue`]'s runtime type to a [`ColumnId`] happens here and
//! nowhere else.

use std::any::TypeId;
use std::collections::HashMap;

use beanstalk_foundation::{Bitset, Error, ErrorKind, Result};
use tracing::debug;

use crate::component::{ColumnId, ColumnKind, Component, ComponentValue, Entry, Payload, RowId};
use crate::index::IndexSpec;
use crate::query::{Query, QueryBuilder, RowSet};
use crate::table::Table;

/// Column-oriented entity store.
#[derive(Debug)]
pub struct Engine {
    table: Table,
    columns: HashMap<TypeId, ColumnId>,
    entry: ColumnId,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with only the built-in [`Entry`] column.
    #[must_use]
    pub fn new() -> Self {
        let mut table = Table::new();
        let entry = table.create_column(Entry::NAME, Entry::KIND);
        let mut columns = HashMap::new();
        columns.insert(TypeId::of::<Entry>(), entry);
        Self {
            table,
            columns,
            entry,
        }
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Registers the column for `C` using `C::KIND`.
    ///
    /// # Errors
    /// Returns `ColumnExists` if `C` already has a column.
    pub fn create_column<C: Component>(&mut self) -> Result<ColumnId> {
        self.create_column_with::<C>(C::KIND)
    }

    /// Registers the column for `C` with an explicit shape.
    ///
    /// # Errors
    /// Returns `ColumnExists` if `C` already has a column.
    pub fn create_column_with<C: Component>(&mut self, kind: ColumnKind) -> Result<ColumnId> {
        let type_id = TypeId::of::<C>();
        if self.columns.contains_key(&type_id) {
            return Err(Error::new(ErrorKind::ColumnExists(C::NAME.to_string())));
        }
        let id = self.table.create_column(C::NAME, kind);
        self.columns.insert(type_id, id);
        debug!(component = C::NAME, column = id.0, ?kind, "column created");
        Ok(id)
    }

    /// Returns `C`'s column, creating it if needed.
    pub fn create_column_if_not_exists<C: Component>(&mut self) -> ColumnId {
        match self.columns.get(&TypeId::of::<C>()) {
            Some(id) => *id,
            None => {
                let id = self.table.create_column(C::NAME, C::KIND);
                self.columns.insert(TypeId::of::<C>(), id);
                debug!(component = C::NAME, column = id.0, "column created on demand");
                id
            }
        }
    }

    /// Attaches a secondary index to `C`'s column.
    ///
    /// # Errors
    /// Returns `UnknownColumn` if `C` has no column.
    pub fn create_index<C: Component>(&mut self, spec: IndexSpec) -> Result<()> {
        let col = self.column_id::<C>()?;
        self.table.create_index(col, spec)?;
        debug!(component = C::NAME, ?spec, "index created");
        Ok(())
    }

    /// Resolves `C` to its column.
    ///
    /// # Errors
    /// Returns `UnknownColumn` if `C` has no column.
    pub fn column_id<C: Component>(&self) -> Result<ColumnId> {
        self.columns
            .get(&TypeId::of::<C>())
            .copied()
            .ok_or_else(|| Error::new(ErrorKind::UnknownColumn(C::NAME.to_string())))
    }

    fn resolve(&self, value: &ComponentValue) -> Result<ColumnId> {
        self.columns
            .get(&value.type_id)
            .copied()
            .ok_or_else(|| Error::new(ErrorKind::UnknownColumn(value.name.to_string())))
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Appends a row and applies `values` to it.
    ///
    /// Values are validated before the row is created, so a failed insert
    /// leaves the table untouched.
    ///
    /// # Errors
    /// Returns a joined `UnknownColumn` error for every unregistered type.
    pub fn insert_row(&mut self, values: impl IntoIterator<Item = ComponentValue>) -> Result<RowId> {
        let resolved = self.resolve_all(values)?;
        let row = self.table.insert_row();
        self.table.set_value(row, self.entry, Payload::Tag)?;
        for (col, payload) in resolved {
            self.table.set_value(row, col, payload)?;
        }
        Ok(row)
    }

    /// Writes `values` to `row`.
    ///
    /// Every value is resolved before anything is written: if any type has no
    /// column, nothing is written and the errors are returned joined.
    ///
    /// # Errors
    /// Returns `RowNotFound` or a joined `UnknownColumn` error.
    pub fn set_values(
        &mut self,
        row: RowId,
        values: impl IntoIterator<Item = ComponentValue>,
    ) -> Result<()> {
        self.table.presence(row)?;
        for (col, payload) in self.resolve_all(values)? {
            self.table.set_value(row, col, payload)?;
        }
        Ok(())
    }

    /// Writes a single typed component.
    ///
    /// # Errors
    /// Returns `RowNotFound` or `UnknownColumn`.
    pub fn set<C: Component>(&mut self, row: RowId, component: C) -> Result<()> {
        self.set_values(row, [ComponentValue::of(component)])
    }

    /// Clears `columns` on `row`.
    ///
    /// # Errors
    /// Returns `RowNotFound` or `UnknownColumn`.
    pub fn unset_values(&mut self, row: RowId, columns: &[ColumnId]) -> Result<()> {
        self.table.presence(row)?;
        for col in columns {
            self.table.unset_value(row, *col)?;
        }
        Ok(())
    }

    /// Clears a single typed component.
    ///
    /// # Errors
    /// Returns `RowNotFound` or `UnknownColumn`.
    pub fn unset<C: Component>(&mut self, row: RowId) -> Result<()> {
        let col = self.column_id::<C>()?;
        self.unset_values(row, &[col])
    }

    /// Reads a typed component.
    ///
    /// # Errors
    /// Returns `UnknownColumn` if `C` has no column.
    pub fn get<C: Component>(&self, row: RowId) -> Result<Option<C>> {
        let col = self.column_id::<C>()?;
        Ok(self.table.get(row, col).and_then(C::from_payload))
    }

    /// Reads raw payloads for `columns` in order.
    ///
    /// # Errors
    /// Returns `RowNotFound` if the row does not exist.
    pub fn get_values(&self, row: RowId, columns: &[ColumnId]) -> Result<Vec<Option<Payload>>> {
        self.table.presence(row)?;
        Ok(columns
            .iter()
            .map(|col| self.table.get(row, *col).cloned())
            .collect())
    }

    /// The presence mask of `row`.
    ///
    /// # Errors
    /// Returns `RowNotFound` if the row does not exist.
    pub fn membership(&self, row: RowId) -> Result<&Bitset> {
        self.table.presence(row)
    }

    /// Rows whose `C` equals `value`.
    ///
    /// # Errors
    /// Returns `UnknownColumn` if `C` has no column.
    pub fn lookup<C: Component>(&self, value: C) -> Result<Bitset> {
        let col = self.column_id::<C>()?;
        self.table.lookup(col, &value.into_payload())
    }

    /// The single row whose `C` equals `value`, if exactly one exists.
    ///
    /// # Errors
    /// Returns `UnknownColumn` if `C` has no column.
    pub fn lookup_one<C: Component>(&self, value: C) -> Result<Option<RowId>> {
        let rows = self.lookup(value)?;
        Ok(if rows.len() == 1 {
            rows.first().map(RowId)
        } else {
            None
        })
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// The underlying table.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Starts building a query.
    #[must_use]
    pub fn create_query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }

    /// Evaluates `query` against every row (or its subset) and captures the hits.
    #[must_use]
    pub fn retrieve(&self, query: &Query) -> RowSet<'_> {
        let matched: Bitset = match query.subset() {
            Some(subset) => subset
                .iter()
                .filter(|row| {
                    self.table
                        .presence(RowId(*row))
                        .is_ok_and(|mask| query.admits(mask))
                })
                .collect(),
            None => self
                .table
                .rows()
                .filter(|(_, mask)| query.admits(mask))
                .map(|(row, _)| row.0)
                .collect(),
        };
        RowSet::new(self, query.load().to_vec(), matched)
    }

    fn resolve_all(
        &self,
        values: impl IntoIterator<Item = ComponentValue>,
    ) -> Result<Vec<(ColumnId, Payload)>> {
        let mut resolved = Vec::new();
        let mut errors = Vec::new();
        for value in values {
            match self.resolve(&value) {
                Ok(col) => resolved.push((col, value.payload)),
                Err(e) => errors.push(e),
            }
        }
        if errors.is_empty() {
            Ok(resolved)
        } else {
            Err(Error::join(errors))
        }
    }
}
