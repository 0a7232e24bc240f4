//! Integration tests for Layer 0: Foundation
//!
//! Tests for errors, bitsets, and the directed graph.

mod bitsets;
mod errors;
mod graph;
