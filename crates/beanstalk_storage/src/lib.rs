//! Columnar entity/component storage for Beanstalk.
//!
//! This crate provides:
//! - [`Component`] / [`ComponentValue`] - Typed components and their erased form
//! - [`Column`] - Slice, map, and bit column strategies
//! - [`Index`] - Hash and unique-hash secondary indexes
//! - [`Table`] - Untyped columns with per-row presence masks
//! - [`Engine`] - Typed facade: column registry, row writes, lookups, queries
//! - [`QueryBuilder`] / [`RowSet`] - Presence-mask queries with captured results

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]

pub mod column;
pub mod component;
pub mod engine;
pub mod index;
pub mod query;
pub mod table;

pub use column::{BitColumn, Column, MapColumn, SliceColumn};
pub use component::{ColumnId, ColumnKind, Component, ComponentValue, Entry, Payload, RowId};
pub use engine::Engine;
pub use index::{HashIndex, Index, IndexKey, IndexSpec, Projection, UniqueHashIndex};
pub use query::{Query, QueryBuilder, Row, RowIter, RowSet, Rows};
pub use table::Table;
