//! Compiler from optimized AST to bytecode.
//!
//! A single post-order walk: operands are emitted before the instruction that
//! consumes them, and every tape ends in `RETURN`. Literals and pointer
//! targets are interned into the session's [`Objects`], so tapes from one
//! session share indexes.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use beanstalk_foundation::{Error, ErrorKind, Result};

use crate::ast::{CompareOp, Node};
use crate::objects::{BuiltIn, Object, Objects, PtrTag};
use crate::opcode::{Op, Tape};
use crate::symbols::{SymbolId, SymbolKind, SymbolTable};

/// Compiles one optimized rule.
///
/// # Errors
/// * [`ErrorKind::UnexpandedIntrinsic`] for a compiler function that survived
///   optimization
/// * [`ErrorKind::UncompilableNode`] for names with no runtime meaning
/// * [`ErrorKind::ArityMismatch`] for built-ins called with the wrong count
/// * [`ErrorKind::TableFull`] when an object namespace or a list operand
///   overflows
pub fn compile(node: &Node, symbols: &SymbolTable, objects: &mut Objects) -> Result<Tape> {
    let mut compiler = Compiler {
        symbols,
        objects,
        tape: Tape::new(),
    };
    compiler.node(node)?;
    compiler.tape.emit(Op::Return, &[]);
    Ok(compiler.tape)
}

struct Compiler<'a> {
    symbols: &'a SymbolTable,
    objects: &'a mut Objects,
    tape: Tape,
}

impl Compiler<'_> {
    fn node(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Bool(true) => {
                self.tape.emit(Op::PushT, &[]);
            }
            Node::Bool(false) => {
                self.tape.emit(Op::PushF, &[]);
            }
            Node::Number(n) => self.constant(Object::Number(*n))?,
            Node::Str(s) => self.constant(Object::from(s.as_str()))?,
            Node::Every(items) => self.list(items, Op::NeedAll, true)?,
            Node::AnyOf(items) => self.list(items, Op::NeedAny, false)?,
            Node::Invert(inner) => {
                self.node(inner)?;
                self.tape.emit(Op::Invert, &[]);
            }
            Node::Compare { op, lhs, rhs } => {
                self.node(rhs)?;
                self.node(lhs)?;
                self.tape.emit(compare_op(*op), &[]);
            }
            Node::Identifier(id) => self.identifier(*id)?,
            Node::Invoke { target, args } => {
                let Some(id) = target.as_identifier() else {
                    return Err(uncompilable(format!("call on {}", target.kind_name())));
                };
                self.invoke(id, args)?;
            }
        }
        Ok(())
    }

    fn constant(&mut self, object: Object) -> Result<()> {
        let index = self.objects.intern_constant(object)?;
        self.tape.emit(Op::PushConst, &[usize::from(index)]);
        Ok(())
    }

    fn list(&mut self, items: &[Node], op: Op, empty: bool) -> Result<()> {
        match items {
            [] => {
                self.tape.emit(if empty { Op::PushT } else { Op::PushF }, &[]);
            }
            [only] => self.node(only)?,
            _ => {
                let count = operand_count(items.len())?;
                for item in items {
                    self.node(item)?;
                }
                self.tape.emit(op, &[count]);
            }
        }
        Ok(())
    }

    fn identifier(&mut self, id: SymbolId) -> Result<()> {
        let name = self.symbols.name_of(id);
        match self.symbols.kind_of(id) {
            SymbolKind::Token | SymbolKind::Event => {
                let index = self.objects.intern_name(name, id, PtrTag::Token)?;
                self.tape.emit(Op::PushPtr, &[usize::from(index)]);
            }
            SymbolKind::Setting => {
                let index = self.objects.intern_name(name, id, PtrTag::Setting)?;
                self.tape.emit(Op::PushPtr, &[usize::from(index)]);
            }
            SymbolKind::BuiltIn => {
                let index = self.objects.builtin_index(name)?;
                self.tape.emit(Op::PushBuiltIn, &[usize::from(index)]);
            }
            kind => return Err(uncompilable(format!("{kind} {name}"))),
        }
        Ok(())
    }

    /// Index of `node` in the names table if it is a token reference.
    fn token_ptr(&mut self, node: &Node) -> Result<Option<usize>> {
        let Some(id) = node.as_identifier() else {
            return Ok(None);
        };
        if !matches!(self.symbols.kind_of(id), SymbolKind::Token | SymbolKind::Event) {
            return Ok(None);
        }
        let index = self
            .objects
            .intern_name(self.symbols.name_of(id), id, PtrTag::Token)?;
        Ok(Some(usize::from(index)))
    }

    fn invoke(&mut self, id: SymbolId, args: &[Node]) -> Result<()> {
        let name = self.symbols.name_of(id);
        match self.symbols.kind_of(id) {
            SymbolKind::CompFunc => {
                return Err(Error::new(ErrorKind::UnexpandedIntrinsic(name.to_string())));
            }
            SymbolKind::BuiltIn => {}
            SymbolKind::Function | SymbolKind::CompiledFunc => {
                return Err(uncompilable(format!("call to helper {name} was not inlined")));
            }
            kind => return Err(uncompilable(format!("call on {kind} {name}"))),
        }

        let builtin =
            BuiltIn::from_name(name).ok_or_else(|| Error::undefined_symbol(name.to_string()))?;
        if !builtin.arity().accepts(args.len()) {
            return Err(Error::arity_mismatch(builtin.arity().to_string(), args.len())
                .in_frame(format!("call to {name}")));
        }

        match builtin {
            BuiltIn::IsAdult => {
                self.tape.emit(Op::IsAdult, &[]);
                return Ok(());
            }
            BuiltIn::IsChild => {
                self.tape.emit(Op::IsChild, &[]);
                return Ok(());
            }
            BuiltIn::Has => {
                if let [token, Node::Number(qty)] = args {
                    if let (Some(ptr), Some(qty)) = (self.token_ptr(token)?, small_quantity(*qty)) {
                        self.tape.emit(Op::ChkQty, &[ptr, qty]);
                        return Ok(());
                    }
                }
            }
            BuiltIn::HasEvery | BuiltIn::HasAnyOf => {
                if self.batch(builtin, args)? {
                    return Ok(());
                }
            }
            _ => {}
        }

        let count = operand_count(args.len())?;
        for arg in args {
            self.node(arg)?;
        }
        self.tape
            .emit(Op::PushBuiltIn, &[usize::from(builtin.index())]);
        self.tape.emit(Op::Invoke, &[count]);
        Ok(())
    }

    /// `CHK_ALL`/`CHK_ANY` when every argument is a token. Returns false,
    /// having emitted nothing, otherwise.
    fn batch(&mut self, builtin: BuiltIn, args: &[Node]) -> Result<bool> {
        let all_tokens = args.iter().all(|arg| {
            arg.as_identifier().is_some_and(|id| {
                matches!(self.symbols.kind_of(id), SymbolKind::Token | SymbolKind::Event)
            })
        });
        if !all_tokens || args.is_empty() {
            return Ok(false);
        }
        let count = operand_count(args.len())?;
        for arg in args {
            if let Some(ptr) = self.token_ptr(arg)? {
                self.tape.emit(Op::PushPtr, &[ptr]);
            }
        }
        let op = if builtin == BuiltIn::HasEvery {
            Op::ChkAll
        } else {
            Op::ChkAny
        };
        self.tape.emit(op, &[count]);
        Ok(true)
    }
}

const fn compare_op(op: CompareOp) -> Op {
    match op {
        CompareOp::Eq => Op::CmpEq,
        CompareOp::Nq => Op::CmpNq,
        CompareOp::Lt => Op::CmpLt,
    }
}

#[allow(clippy::float_cmp)]
fn small_quantity(qty: f64) -> Option<usize> {
    (qty.fract() == 0.0 && (0.0..=255.0).contains(&qty)).then_some(qty as usize)
}

fn operand_count(len: usize) -> Result<usize> {
    if len > usize::from(u16::MAX) {
        return Err(Error::new(ErrorKind::TableFull {
            namespace: "operands",
        }));
    }
    Ok(len)
}

fn uncompilable(what: String) -> Error {
    Error::new(ErrorKind::UncompilableNode(what))
}
