//! Errors, bitsets, and graph primitives for Beanstalk.
//!
//! This crate provides:
//! - [`Error`] - Rich error types with context, shared by every layer
//! - [`Bitset`] - Growable bitset used for presence masks and frontiers
//! - [`Directed`] - Directed graph with bitset adjacency

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]

pub mod bitset;
pub mod error;
pub mod graph;

pub use bitset::Bitset;
pub use error::{Error, ErrorContext, ErrorKind, Result, VmFault};
pub use graph::Directed;
