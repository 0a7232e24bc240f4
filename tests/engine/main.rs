//! Integration tests for Layer 3: Engine
//!
//! Tests for world building, the storage-backed inventory, and exploration.

mod exploration;
mod inventory;
mod world;
