//! Column storage strategies.
//!
//! Every column tracks its members in a [`Bitset`]; the three shapes differ
//! only in where (and whether) payloads live.

use std::collections::HashMap;
use std::fmt;

use beanstalk_foundation::Bitset;

use crate::component::{ColumnKind, Payload, RowId};

/// Storage for one component type across all rows.
pub trait Column: fmt::Debug {
    /// The column's storage shape.
    fn kind(&self) -> ColumnKind;

    /// Returns the payload for `row`, if the row has this component.
    fn get(&self, row: RowId) -> Option<&Payload>;

    /// Stores `payload` for `row`.
    fn set(&mut self, row: RowId, payload: Payload);

    /// Removes `row`'s payload, returning true if it was present.
    fn unset(&mut self, row: RowId) -> bool;

    /// Rows that have this component.
    fn members(&self) -> &Bitset;

    /// Rows whose payload equals `payload`.
    fn scan_for(&self, payload: &Payload) -> Bitset {
        self.members()
            .iter()
            .filter(|row| self.get(RowId(*row)) == Some(payload))
            .collect()
    }

    /// Number of rows with this component.
    fn len(&self) -> usize {
        self.members().len()
    }

    /// Returns true if no row has this component.
    fn is_empty(&self) -> bool {
        self.members().is_empty()
    }
}

/// Builds an empty column of the requested shape.
#[must_use]
pub fn build(kind: ColumnKind) -> Box<dyn Column> {
    match kind {
        ColumnKind::Slice => Box::new(SliceColumn::default()),
        ColumnKind::Map => Box::new(MapColumn::default()),
        ColumnKind::Bit => Box::new(BitColumn::default()),
    }
}

// =============================================================================
// Slice
// =============================================================================

/// Dense vector indexed by row id.
#[derive(Debug, Default)]
pub struct SliceColumn {
    values: Vec<Option<Payload>>,
    members: Bitset,
}

impl Column for SliceColumn {
    fn kind(&self) -> ColumnKind {
        ColumnKind::Slice
    }

    fn get(&self, row: RowId) -> Option<&Payload> {
        self.values.get(row.0 as usize)?.as_ref()
    }

    fn set(&mut self, row: RowId, payload: Payload) {
        let idx = row.0 as usize;
        if idx >= self.values.len() {
            self.values.resize(idx + 1, None);
        }
        self.values[idx] = Some(payload);
        self.members.set(row.0);
    }

    fn unset(&mut self, row: RowId) -> bool {
        if let Some(slot) = self.values.get_mut(row.0 as usize) {
            *slot = None;
        }
        self.members.unset(row.0)
    }

    fn members(&self) -> &Bitset {
        &self.members
    }

    fn scan_for(&self, payload: &Payload) -> Bitset {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.as_ref() == Some(payload))
            .map(|(idx, _)| idx as u32)
            .collect()
    }
}

// =============================================================================
// Map
// =============================================================================

/// Sparse hash map from row id to payload.
#[derive(Debug, Default)]
pub struct MapColumn {
    values: HashMap<RowId, Payload>,
    members: Bitset,
}

impl Column for MapColumn {
    fn kind(&self) -> ColumnKind {
        ColumnKind::Map
    }

    fn get(&self, row: RowId) -> Option<&Payload> {
        self.values.get(&row)
    }

    fn set(&mut self, row: RowId, payload: Payload) {
        self.values.insert(row, payload);
        self.members.set(row.0);
    }

    fn unset(&mut self, row: RowId) -> bool {
        self.values.remove(&row);
        self.members.unset(row.0)
    }

    fn members(&self) -> &Bitset {
        &self.members
    }
}

// =============================================================================
// Bit
// =============================================================================

/// Membership-only column. Every hit returns the same zero-value payload.
#[derive(Debug)]
pub struct BitColumn {
    members: Bitset,
    zero: Payload,
}

impl Default for BitColumn {
    fn default() -> Self {
        Self {
            members: Bitset::new(),
            zero: Payload::Tag,
        }
    }
}

impl Column for BitColumn {
    fn kind(&self) -> ColumnKind {
        ColumnKind::Bit
    }

    fn get(&self, row: RowId) -> Option<&Payload> {
        self.members.is_set(row.0).then_some(&self.zero)
    }

    fn set(&mut self, row: RowId, _payload: Payload) {
        self.members.set(row.0);
    }

    fn unset(&mut self, row: RowId) -> bool {
        self.members.unset(row.0)
    }

    fn members(&self) -> &Bitset {
        &self.members
    }

    fn scan_for(&self, payload: &Payload) -> Bitset {
        if *payload == self.zero {
            self.members.clone()
        } else {
            Bitset::new()
        }
    }
}
