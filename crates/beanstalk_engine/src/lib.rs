//! World building, inventory, and exploration for Beanstalk.
//!
//! This crate provides:
//! - [`WorldBuilder`] / [`World`] - Compiled edges stored as rows, with a graph over them
//! - [`Inventory`] / [`PlayerState`] - The VM's host state, backed by storage queries
//! - [`Exploration`] - Rule-guarded worklist search to a fixpoint
//!
//! # Example
//!
//! ```
//! use beanstalk_engine::{Exploration, PlayerState, WorldBuilder};
//! use beanstalk_language::{Session, Source, StaticSettings};
//!
//! let session = Session::new(StaticSettings::new()).unwrap();
//! let mut builder = WorldBuilder::new(session).unwrap();
//! builder.add_root("Root").unwrap();
//! builder.add_source(&Source::transit("Root", "Kokiri Forest", "True")).unwrap();
//! let mut world = builder.build().unwrap();
//!
//! let mut exploration = Exploration::from_roots(&world, PlayerState::new());
//! let reached = exploration.explore_all(&mut world).unwrap();
//! assert_eq!(reached.locations.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod components;
pub mod exploration;
pub mod inventory;
pub mod world;

pub use exploration::{Exploration, ExplorationConfig, Reached};
pub use inventory::{Age, Inventory, PlayerState, STARTING_QUARTERS};
pub use world::{TokenCategory, World, WorldBuilder};
