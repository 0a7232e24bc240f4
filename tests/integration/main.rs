//! Cross-layer integration tests for Beanstalk
//!
//! Rule text through compilation, storage, and exploration.

mod generated;
mod scenarios;
