//! Beanstalk - Access-rule compiler, bytecode VM, and columnar world store
//!
//! This crate re-exports all layers of the Beanstalk system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: beanstalk_engine      World building, inventory host, exploration
//! Layer 2: beanstalk_language    Lexer, parser, optimizer, compiler, bytecode VM
//! Layer 1: beanstalk_storage     Columnar component storage, indexes, queries
//! Layer 0: beanstalk_foundation  Errors, bitsets, directed graph
//! ```

use tracing_subscriber::{EnvFilter, fmt};

pub use beanstalk_engine as engine;
pub use beanstalk_foundation as foundation;
pub use beanstalk_language as language;
pub use beanstalk_storage as storage;

/// Installs a `tracing` subscriber that logs to stderr.
///
/// `RUST_LOG` overrides the default `info` filter. Calling this again after a
/// subscriber is installed does nothing.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
