//! Untyped column table: columns, per-row presence masks, and indexes.
//!
//! The table addresses everything by [`ColumnId`] and [`RowId`]; mapping
//! component types to columns is the [`Engine`](crate::Engine)'s job.

use beanstalk_foundation::{Bitset, Error, ErrorKind, Result};

use crate::column::{self, Column};
use crate::component::{ColumnId, ColumnKind, Payload, RowId};
use crate::index::{Index, IndexSpec};

#[derive(Debug)]
struct ColumnEntry {
    name: &'static str,
    column: Box<dyn Column>,
    index: Option<Box<dyn Index>>,
}

/// Columns plus a presence mask per row.
#[derive(Debug, Default)]
pub struct Table {
    columns: Vec<ColumnEntry>,
    rows: Vec<Bitset>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column of the given shape.
    pub fn create_column(&mut self, name: &'static str, kind: ColumnKind) -> ColumnId {
        let id = ColumnId(self.columns.len() as u32);
        self.columns.push(ColumnEntry {
            name,
            column: column::build(kind),
            index: None,
        });
        id
    }

    /// Attaches an index to a column and backfills it from existing rows.
    ///
    /// # Errors
    /// Returns an error if the column does not exist.
    pub fn create_index(&mut self, col: ColumnId, spec: IndexSpec) -> Result<()> {
        let entry = self.entry_mut(col)?;
        let mut index = spec.build();
        for row in entry.column.members().iter() {
            if let Some(payload) = entry.column.get(RowId(row)) {
                index.set(RowId(row), payload);
            }
        }
        entry.index = Some(index);
        Ok(())
    }

    /// Appends a row with an empty presence mask.
    pub fn insert_row(&mut self) -> RowId {
        let id = RowId(self.rows.len() as u32);
        self.rows.push(Bitset::new());
        id
    }

    /// Writes `payload` into `col` for `row` and marks the presence bit.
    ///
    /// # Errors
    /// Returns an error if the row or column does not exist.
    pub fn set_value(&mut self, row: RowId, col: ColumnId, payload: Payload) -> Result<()> {
        self.check_row(row)?;
        let entry = self.entry_mut(col)?;
        if let Some(index) = entry.index.as_mut() {
            if let Some(old) = entry.column.get(row) {
                index.unset(row, old);
            }
            index.set(row, &payload);
        }
        entry.column.set(row, payload);
        self.rows[row.0 as usize].set(col.0);
        Ok(())
    }

    /// Clears `col` for `row` and its presence bit.
    ///
    /// # Errors
    /// Returns an error if the row or column does not exist.
    pub fn unset_value(&mut self, row: RowId, col: ColumnId) -> Result<()> {
        self.check_row(row)?;
        let entry = self.entry_mut(col)?;
        if let (Some(index), Some(old)) = (entry.index.as_mut(), entry.column.get(row)) {
            index.unset(row, old);
        }
        entry.column.unset(row);
        self.rows[row.0 as usize].unset(col.0);
        Ok(())
    }

    /// Reads `col` for `row`.
    #[must_use]
    pub fn get(&self, row: RowId, col: ColumnId) -> Option<&Payload> {
        self.columns.get(col.0 as usize)?.column.get(row)
    }

    /// The presence mask of `row`.
    ///
    /// # Errors
    /// Returns an error if the row does not exist.
    pub fn presence(&self, row: RowId) -> Result<&Bitset> {
        self.rows
            .get(row.0 as usize)
            .ok_or_else(|| Error::new(ErrorKind::RowNotFound(row.0)))
    }

    /// Rows whose `col` payload equals `payload`, via the index when one applies.
    ///
    /// # Errors
    /// Returns an error if the column does not exist.
    pub fn lookup(&self, col: ColumnId, payload: &Payload) -> Result<Bitset> {
        let entry = self.entry(col)?;
        if let Some(hits) = entry.index.as_ref().and_then(|idx| idx.lookup(payload)) {
            return Ok(hits);
        }
        Ok(entry.column.scan_for(payload))
    }

    /// Rows that have `col`.
    ///
    /// # Errors
    /// Returns an error if the column does not exist.
    pub fn members(&self, col: ColumnId) -> Result<&Bitset> {
        Ok(self.entry(col)?.column.members())
    }

    /// Diagnostic name of `col`.
    #[must_use]
    pub fn column_name(&self, col: ColumnId) -> Option<&'static str> {
        self.columns.get(col.0 as usize).map(|e| e.name)
    }

    /// Storage shape of `col`.
    #[must_use]
    pub fn column_kind(&self, col: ColumnId) -> Option<ColumnKind> {
        self.columns.get(col.0 as usize).map(|e| e.column.kind())
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Iterates `(row, presence)` pairs in row order.
    pub fn rows(&self) -> impl Iterator<Item = (RowId, &Bitset)> {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, mask)| (RowId(idx as u32), mask))
    }

    fn check_row(&self, row: RowId) -> Result<()> {
        if (row.0 as usize) < self.rows.len() {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::RowNotFound(row.0)))
        }
    }

    fn entry(&self, col: ColumnId) -> Result<&ColumnEntry> {
        self.columns
            .get(col.0 as usize)
            .ok_or_else(|| Error::new(ErrorKind::UnknownColumn(format!("{col:?}"))))
    }

    fn entry_mut(&mut self, col: ColumnId) -> Result<&mut ColumnEntry> {
        self.columns
            .get_mut(col.0 as usize)
            .ok_or_else(|| Error::new(ErrorKind::UnknownColumn(format!("{col:?}"))))
    }
}
