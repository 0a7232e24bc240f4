//! Rule language for Beanstalk: from rule text to bytecode and back to a
//! boolean.
//!
//! This crate provides:
//! - [`Lexer`] and [`parse`] - Tokenization and parsing of rule text
//! - [`lower`] - Parse tree to resolved [`Node`] tree, declaring names in a [`SymbolTable`]
//! - [`Optimizer`] - Inlining, intrinsic expansion, folding, and batching passes
//! - [`compile`] - [`Node`] tree to a byte [`Tape`]
//! - [`Vm`] - Stack-based interpreter answering questions through [`HostState`]
//! - [`Session`] - The tables one world's rules are compiled against

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]

pub mod ast;
pub mod compiler;
pub mod config;
pub mod expr;
pub mod functions;
pub mod lexer;
pub mod lower;
pub mod objects;
pub mod opcode;
pub mod optimizer;
pub mod parser;
pub mod render;
pub mod session;
pub mod settings;
pub mod span;
pub mod symbols;
pub mod token;
pub mod visitor;
pub mod vm;

pub use ast::{CompareOp, Node};
pub use compiler::compile;
pub use config::{CompilerConfig, VmConfig};
pub use expr::{BinOp, BoolOp, Expr, FunctionDecl};
pub use functions::{FunctionTable, ScriptedFunction};
pub use lexer::Lexer;
pub use lower::lower;
pub use objects::{Arity, BuiltIn, Name, Object, Objects, Ptr, PtrTag};
pub use opcode::{disassemble, Op, Tape};
pub use optimizer::{Connections, GeneratedConnection, Optimizer};
pub use parser::{parse, parse_function_decl};
pub use render::{pretty, render};
pub use session::{CompileReport, CompiledSource, Session, Source, SourceKind};
pub use settings::{SettingReader, SettingValue, StaticSettings};
pub use span::Span;
pub use symbols::{escape_name, Symbol, SymbolId, SymbolKind, SymbolTable};
pub use token::{Token, TokenKind};
pub use vm::{AllTrue, HostState, MemoryHost, Vm};
