//! Integration tests for Layer 2: Language
//!
//! Tests for the lexer, the parse/render cycle, and the compile pipeline.

mod lexer;
mod pipeline;
mod symbols;
