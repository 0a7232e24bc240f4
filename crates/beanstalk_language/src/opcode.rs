//! Instruction set and byte-tape encoding.
//!
//! An instruction is one opcode byte followed by fixed-width operands:
//! little-endian `u16`s and single `u8`s. The width of every opcode is fixed
//! by its [`Definition`], so the program counter always advances by exactly
//! [`Op::width`].

#![allow(clippy::doc_markdown)]

use std::fmt::{self, Write};

use beanstalk_foundation::{Error, Result, VmFault};

/// A single opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    // === Stack ===
    /// No operation.
    Nop = 0x00,
    /// Push `True`.
    PushT = 0x21,
    /// Push `False`.
    PushF = 0x22,
    /// Push `constants[u16]`.
    PushConst = 0x23,
    /// Push a pointer to `names[u16]`.
    PushPtr = 0x25,
    /// Push `builtins[u16]`.
    PushBuiltIn = 0x26,

    // === Logic ===
    /// `[a] -> [!a]`
    Invert = 0x27,
    /// Pop `u16` booleans, push their conjunction.
    NeedAll = 0x31,
    /// Pop `u16` booleans, push their disjunction.
    NeedAny = 0x32,

    // === Inventory ===
    /// `has(names[u16], u8)` in one instruction.
    ChkQty = 0x41,
    /// Pop `u16` token pointers, push `has_every`.
    ChkAll = 0x42,
    /// Pop `u16` token pointers, push `has_anyof`.
    ChkAny = 0x43,
    /// Push the host's `is_child`.
    IsChild = 0x44,
    /// Push the host's `is_adult`.
    IsAdult = 0x45,

    // === Calls ===
    /// Pop the callee, then `u16` arguments, push the call's result.
    Invoke = 0x51,

    // === Comparison ===
    /// `[rhs, lhs] -> [lhs == rhs]`
    CmpEq = 0x61,
    /// `[rhs, lhs] -> [lhs != rhs]`
    CmpNq = 0x62,
    /// `[rhs, lhs] -> [lhs < rhs]`
    CmpLt = 0x63,

    // === Control ===
    /// Pop the result and stop.
    Return = 0x70,
    /// Always faults.
    Err = 0xFF,
}

/// Name and operand widths of an opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Definition {
    /// Mnemonic used by the disassembler.
    pub name: &'static str,
    /// Byte width of each operand, in order.
    pub operands: &'static [usize],
}

const NONE: &[usize] = &[];
const U16: &[usize] = &[2];
const U16_U8: &[usize] = &[2, 1];

impl Op {
    /// Every opcode, in byte order.
    pub const ALL: [Op; 20] = [
        Op::Nop,
        Op::PushT,
        Op::PushF,
        Op::PushConst,
        Op::PushPtr,
        Op::PushBuiltIn,
        Op::Invert,
        Op::NeedAll,
        Op::NeedAny,
        Op::ChkQty,
        Op::ChkAll,
        Op::ChkAny,
        Op::IsChild,
        Op::IsAdult,
        Op::Invoke,
        Op::CmpEq,
        Op::CmpNq,
        Op::CmpLt,
        Op::Return,
        Op::Err,
    ];

    /// Decodes an opcode byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x00 => Self::Nop,
            0x21 => Self::PushT,
            0x22 => Self::PushF,
            0x23 => Self::PushConst,
            0x25 => Self::PushPtr,
            0x26 => Self::PushBuiltIn,
            0x27 => Self::Invert,
            0x31 => Self::NeedAll,
            0x32 => Self::NeedAny,
            0x41 => Self::ChkQty,
            0x42 => Self::ChkAll,
            0x43 => Self::ChkAny,
            0x44 => Self::IsChild,
            0x45 => Self::IsAdult,
            0x51 => Self::Invoke,
            0x61 => Self::CmpEq,
            0x62 => Self::CmpNq,
            0x63 => Self::CmpLt,
            0x70 => Self::Return,
            0xFF => Self::Err,
            _ => return None,
        })
    }

    /// The opcode byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Mnemonic and operand layout.
    #[must_use]
    pub const fn definition(self) -> Definition {
        let (name, operands) = match self {
            Self::Nop => ("NOP", NONE),
            Self::PushT => ("PUSH_T", NONE),
            Self::PushF => ("PUSH_F", NONE),
            Self::PushConst => ("PUSH_CONST", U16),
            Self::PushPtr => ("PUSH_PTR", U16),
            Self::PushBuiltIn => ("PUSH_BUILTIN", U16),
            Self::Invert => ("INVERT", NONE),
            Self::NeedAll => ("NEED_ALL", U16),
            Self::NeedAny => ("NEED_ANY", U16),
            Self::ChkQty => ("CHK_QTY", U16_U8),
            Self::ChkAll => ("CHK_ALL", U16),
            Self::ChkAny => ("CHK_ANY", U16),
            Self::IsChild => ("IS_CHILD", NONE),
            Self::IsAdult => ("IS_ADULT", NONE),
            Self::Invoke => ("INVOKE", U16),
            Self::CmpEq => ("CMP_EQ", NONE),
            Self::CmpNq => ("CMP_NQ", NONE),
            Self::CmpLt => ("CMP_LT", NONE),
            Self::Return => ("RETURN", NONE),
            Self::Err => ("ERR", NONE),
        };
        Definition { name, operands }
    }

    /// Total encoded size: the opcode byte plus its operands.
    #[must_use]
    pub fn width(self) -> usize {
        1 + self.definition().operands.iter().sum::<usize>()
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.definition().name)
    }
}

/// Encodes one instruction.
///
/// # Panics
/// Panics if `operands` does not match the opcode's definition or an operand
/// does not fit its width. Both are compiler bugs, not data errors.
#[must_use]
pub fn make(op: Op, operands: &[usize]) -> Vec<u8> {
    let def = op.definition();
    assert_eq!(
        operands.len(),
        def.operands.len(),
        "{} takes {} operands, got {}",
        def.name,
        def.operands.len(),
        operands.len()
    );

    let mut bytes = Vec::with_capacity(op.width());
    bytes.push(op.byte());
    for (&value, &width) in operands.iter().zip(def.operands) {
        match width {
            1 => {
                let v = u8::try_from(value)
                    .unwrap_or_else(|_| panic!("{} operand {value} exceeds u8", def.name));
                bytes.push(v);
            }
            2 => {
                let v = u16::try_from(value)
                    .unwrap_or_else(|_| panic!("{} operand {value} exceeds u16", def.name));
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            other => panic!("{} has unsupported operand width {other}", def.name),
        }
    }
    bytes
}

/// A decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Offset of the opcode byte.
    pub ip: usize,
    /// The opcode.
    pub op: Op,
    operands: [usize; 2],
}

impl Instruction {
    /// Operand `i`.
    ///
    /// # Panics
    /// Panics if the opcode has fewer than `i + 1` operands.
    #[must_use]
    pub fn operand(&self, i: usize) -> usize {
        assert!(i < self.op.definition().operands.len(), "{} has no operand {i}", self.op);
        self.operands[i]
    }

    /// Offset of the next instruction.
    #[must_use]
    pub fn next(&self) -> usize {
        self.ip + self.op.width()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04} {}", self.ip, self.op)?;
        for i in 0..self.op.definition().operands.len() {
            write!(f, " {}", self.operands[i])?;
        }
        Ok(())
    }
}

/// Decodes the instruction at `ip`.
///
/// # Errors
/// Faults with [`VmFault::UnknownOpcode`] or [`VmFault::TruncatedOperand`].
pub fn decode(tape: &[u8], ip: usize) -> Result<Instruction> {
    let byte = *tape
        .get(ip)
        .ok_or_else(|| Error::vm(VmFault::TruncatedOperand { ip }))?;
    let op = Op::from_byte(byte).ok_or_else(|| Error::vm(VmFault::UnknownOpcode { opcode: byte, ip }))?;

    let mut operands = [0usize; 2];
    let mut at = ip + 1;
    for (slot, &width) in operands.iter_mut().zip(op.definition().operands) {
        let bytes = tape
            .get(at..at + width)
            .ok_or_else(|| Error::vm(VmFault::TruncatedOperand { ip }))?;
        *slot = match bytes {
            [b] => usize::from(*b),
            [lo, hi] => usize::from(u16::from_le_bytes([*lo, *hi])),
            _ => return Err(Error::vm(VmFault::TruncatedOperand { ip })),
        };
        at += width;
    }
    Ok(Instruction { ip, op, operands })
}

/// Iterates the instructions of a tape, stopping after the first decode error.
pub fn instructions(tape: &[u8]) -> impl Iterator<Item = Result<Instruction>> + '_ {
    let mut ip = 0;
    let mut failed = false;
    std::iter::from_fn(move || {
        if failed || ip >= tape.len() {
            return None;
        }
        let decoded = decode(tape, ip);
        match &decoded {
            Ok(inst) => ip = inst.next(),
            Err(_) => failed = true,
        }
        Some(decoded)
    })
}

/// Renders a tape one instruction per line: offset, mnemonic, operands.
///
/// # Errors
/// Fails on the first byte that does not decode.
pub fn disassemble(tape: &[u8]) -> Result<String> {
    let mut out = String::new();
    for inst in instructions(tape) {
        writeln!(out, "{}", inst?).map_err(|e| Error::internal(format!("disassembly: {e}")))?;
    }
    Ok(out)
}

/// A compiled instruction tape under construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tape {
    bytes: Vec<u8>,
}

impl Tape {
    /// Creates an empty tape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction and returns its offset.
    ///
    /// # Panics
    /// See [`make`].
    pub fn emit(&mut self, op: Op, operands: &[usize]) -> usize {
        let at = self.bytes.len();
        self.bytes.extend(make(op, operands));
        at
    }

    /// Encoded length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Takes the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
