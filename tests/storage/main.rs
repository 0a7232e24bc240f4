//! Integration tests for Layer 1: Storage
//!
//! Tests for columns, rows, indexes, and queries.

mod columns;
mod queries;
