//! Secondary indexes over column payloads.
//!
//! An index projects each payload through a function into an [`IndexKey`].
//! Payloads the projection rejects are simply not indexed, so an index never
//! promises total coverage of its column.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use beanstalk_foundation::Bitset;

use crate::component::{Payload, RowId};

/// A hashable projection of a payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// Integer key.
    Int(i64),
    /// String key.
    Str(Arc<str>),
    /// Row key.
    Row(RowId),
}

impl IndexKey {
    /// Projects ints, strings, and row references as-is; rejects the rest.
    #[must_use]
    pub fn exact(payload: &Payload) -> Option<IndexKey> {
        match payload {
            Payload::Int(n) => Some(Self::Int(*n)),
            Payload::Str(s) => Some(Self::Str(s.clone())),
            Payload::Row(r) => Some(Self::Row(*r)),
            Payload::Tag | Payload::Float(_) | Payload::Bytes(_) => None,
        }
    }
}

/// Function that maps a payload to its index key.
pub type Projection = fn(&Payload) -> Option<IndexKey>;

/// Which index structure to build for a column.
#[derive(Clone, Copy)]
pub enum IndexSpec {
    /// Many rows per key.
    Hash(Projection),
    /// At most one row per key.
    Unique(Projection),
}

impl IndexSpec {
    /// A many-to-many index using [`IndexKey::exact`].
    #[must_use]
    pub fn hash() -> Self {
        Self::Hash(IndexKey::exact)
    }

    /// A one-to-one index using [`IndexKey::exact`].
    #[must_use]
    pub fn unique() -> Self {
        Self::Unique(IndexKey::exact)
    }

    pub(crate) fn build(self) -> Box<dyn Index> {
        match self {
            Self::Hash(projection) => Box::new(HashIndex::new(projection)),
            Self::Unique(projection) => Box::new(UniqueHashIndex::new(projection)),
        }
    }
}

impl fmt::Debug for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hash(_) => f.write_str("IndexSpec::Hash"),
            Self::Unique(_) => f.write_str("IndexSpec::Unique"),
        }
    }
}

/// A secondary index kept in step with one column.
pub trait Index: fmt::Debug {
    /// Records that `row` now holds `payload`.
    fn set(&mut self, row: RowId, payload: &Payload);

    /// Records that `row` no longer holds `payload`.
    fn unset(&mut self, row: RowId, payload: &Payload);

    /// Rows holding `payload`, or `None` if the payload is not indexable.
    fn lookup(&self, payload: &Payload) -> Option<Bitset>;
}

// =============================================================================
// HashIndex
// =============================================================================

/// Many-to-many index: key to the set of rows holding it.
pub struct HashIndex {
    projection: Projection,
    postings: HashMap<IndexKey, Bitset>,
}

impl HashIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            postings: HashMap::new(),
        }
    }
}

impl fmt::Debug for HashIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashIndex")
            .field("keys", &self.postings.len())
            .finish()
    }
}

impl Index for HashIndex {
    fn set(&mut self, row: RowId, payload: &Payload) {
        if let Some(key) = (self.projection)(payload) {
            self.postings.entry(key).or_default().set(row.0);
        }
    }

    fn unset(&mut self, row: RowId, payload: &Payload) {
        let Some(key) = (self.projection)(payload) else {
            return;
        };
        if let Some(rows) = self.postings.get_mut(&key) {
            rows.unset(row.0);
            if rows.is_empty() {
                self.postings.remove(&key);
            }
        }
    }

    fn lookup(&self, payload: &Payload) -> Option<Bitset> {
        let key = (self.projection)(payload)?;
        Some(self.postings.get(&key).cloned().unwrap_or_default())
    }
}

// =============================================================================
// UniqueHashIndex
// =============================================================================

/// One-to-one index: key to the single row holding it. Later sets win.
pub struct UniqueHashIndex {
    projection: Projection,
    rows: HashMap<IndexKey, RowId>,
}

impl UniqueHashIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            rows: HashMap::new(),
        }
    }
}

impl fmt::Debug for UniqueHashIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueHashIndex")
            .field("keys", &self.rows.len())
            .finish()
    }
}

impl Index for UniqueHashIndex {
    fn set(&mut self, row: RowId, payload: &Payload) {
        if let Some(key) = (self.projection)(payload) {
            self.rows.insert(key, row);
        }
    }

    fn unset(&mut self, row: RowId, payload: &Payload) {
        let Some(key) = (self.projection)(payload) else {
            return;
        };
        if self.rows.get(&key) == Some(&row) {
            self.rows.remove(&key);
        }
    }

    fn lookup(&self, payload: &Payload) -> Option<Bitset> {
        let key = (self.projection)(payload)?;
        let mut rows = Bitset::new();
        if let Some(row) = self.rows.get(&key) {
            rows.set(row.0);
        }
        Some(rows)
    }
}
