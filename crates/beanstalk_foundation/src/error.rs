//! Error types for the Beanstalk system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

/// The main error type for Beanstalk operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context, creating the context if needed.
    #[must_use]
    pub fn in_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Creates an undefined symbol error.
    #[must_use]
    pub fn undefined_symbol(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedSymbol(name.into()))
    }

    /// Creates an arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(expected: impl Into<String>, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch {
            expected: expected.into(),
            actual,
        })
    }

    /// Creates a VM fault error.
    #[must_use]
    pub fn vm(fault: VmFault) -> Self {
        Self::new(ErrorKind::Vm(fault))
    }

    /// Creates an optimization error.
    #[must_use]
    pub fn optimization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Optimization(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Joins several errors into one. A single error is returned unchanged;
    /// an empty list is an internal error.
    #[must_use]
    pub fn join(mut errors: Vec<Error>) -> Self {
        match errors.len() {
            0 => Self::internal("joined an empty error list"),
            1 => errors.remove(0),
            _ => Self::new(ErrorKind::Joined(errors)),
        }
    }

    /// Returns true if this error is a VM execution fault.
    ///
    /// A fault means the rule could not be evaluated; it is never the same
    /// thing as the rule evaluating to false.
    #[must_use]
    pub fn is_vm_fault(&self) -> bool {
        matches!(self.kind, ErrorKind::Vm(_))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Parse error in rule text.
    #[error("parse error at {line}:{column}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
        /// The source line where the error occurred.
        context: String,
    },

    /// Symbol was not defined.
    #[error("undefined symbol: {0}")]
    UndefinedSymbol(String),

    /// A symbol was redeclared with a kind the merge rules do not allow.
    #[error("symbol {name} redeclared: {existing} cannot become {requested}")]
    SymbolRedeclared {
        /// The symbol name.
        name: String,
        /// The kind already on record.
        existing: String,
        /// The kind that was requested.
        requested: String,
    },

    /// Wrong number of arguments to function.
    #[error("arity mismatch: expected {expected}, got {actual}")]
    ArityMismatch {
        /// Description of expected arity.
        expected: String,
        /// Actual number of arguments.
        actual: usize,
    },

    /// A rewrite pass rejected its input.
    #[error("optimization failed: {0}")]
    Optimization(String),

    /// The compiler met a node it has no encoding for.
    #[error("uncompilable node: {0}")]
    UncompilableNode(String),

    /// A compile-time-only call survived the rewrite passes.
    #[error("compiler intrinsic {0} was not expanded before code generation")]
    UnexpandedIntrinsic(String),

    /// An object table namespace ran out of 16-bit indexes.
    #[error("too many entries in {namespace} table")]
    TableFull {
        /// The namespace that overflowed.
        namespace: &'static str,
    },

    /// VM execution fault.
    #[error("vm fault: {0}")]
    Vm(VmFault),

    /// A column for this component type already exists.
    #[error("column already exists for {0}")]
    ColumnExists(String),

    /// No column is registered for this component type.
    #[error("no column registered for {0}")]
    UnknownColumn(String),

    /// The row id is not part of the table.
    #[error("row not found: {0}")]
    RowNotFound(u32),

    /// Exploration was asked to run with nothing to visit.
    #[error("exploration workset is empty")]
    WorksetEmpty,

    /// Exploration ran a round without reaching anything new.
    #[error("exploration made no progress")]
    NoProgress,

    /// An edge rule produced something other than a boolean.
    #[error("rule for edge {edge} produced {produced}, expected a boolean")]
    RuleNotBoolean {
        /// Description of the edge.
        edge: String,
        /// Description of the produced value.
        produced: String,
    },

    /// Several errors reported together.
    #[error("{} errors: {}", .0.len(), join_messages(.0))]
    Joined(Vec<Error>),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

fn join_messages(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Non-retryable VM execution faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmFault {
    /// The byte at `ip` is not a defined opcode.
    #[error("unknown opcode 0x{opcode:02X} at {ip}")]
    UnknownOpcode {
        /// The unrecognized byte.
        opcode: u8,
        /// Where it was found.
        ip: usize,
    },
    /// The ERR opcode was executed.
    #[error("error opcode executed at {ip}")]
    ErrOpcode {
        /// Where it was found.
        ip: usize,
    },
    /// An instruction's operands run past the end of the tape.
    #[error("truncated operand at {ip}")]
    TruncatedOperand {
        /// Start of the instruction.
        ip: usize,
    },
    /// Popped from an empty stack.
    #[error("stack underflow at {ip}")]
    StackUnderflow {
        /// The faulting instruction.
        ip: usize,
    },
    /// Pushed past the configured stack size.
    #[error("stack overflow at {ip} (limit {limit})")]
    StackOverflow {
        /// The faulting instruction.
        ip: usize,
        /// The configured limit.
        limit: usize,
    },
    /// An operand index refers to nothing in the object table.
    #[error("unbound {namespace} index {index}")]
    UnboundName {
        /// The object namespace.
        namespace: &'static str,
        /// The unresolved index.
        index: u16,
    },
    /// An instruction handler left the program counter where it was.
    #[error("program counter did not advance at {ip}")]
    PcDidNotAdvance {
        /// The faulting instruction.
        ip: usize,
    },
    /// INVOKE found a non-function on the stack.
    #[error("cannot call {0}")]
    NotCallable(String),
    /// An operand had the wrong runtime type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected object kind.
        expected: &'static str,
        /// The kind that was found.
        actual: String,
    },
    /// The tape finished with nothing on the stack.
    #[error("tape produced no result")]
    NoResult,
}

/// Context about where an error occurred.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Rule text, edge, or row the error concerns.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Column number in source.
    pub column: Option<usize>,
    /// Chain of components the error passed through.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            line: None,
            column: None,
            stack: Vec::new(),
        }
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line and column.
    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Adds a frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let (Some(line), Some(col)) = (self.line, self.column) {
                write!(f, ":{line}:{col}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias using the Beanstalk error.
pub type Result<T> = std::result::Result<T, Error>;
