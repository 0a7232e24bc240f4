//! Stack-based virtual machine for compiled rules.
//!
//! The VM walks a tape strictly forward; there are no jumps. Every operand of
//! `NEED_ALL`/`NEED_ANY` is evaluated before the reduction, so a faulting
//! operand faults the whole rule even when another operand already decides
//! it.
//!
//! # Faults
//!
//! Every failure is a [`VmFault`]. A fault is never the same thing as a rule
//! that evaluated to false; callers that need the distinction use
//! [`Error::is_vm_fault`].

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

mod host;

pub use host::{AllTrue, HostState, MemoryHost};

use beanstalk_foundation::{Error, Result, VmFault};
use tracing::trace;

use crate::config::VmConfig;
use crate::objects::{BuiltIn, Object, Objects, Ptr, PtrTag};
use crate::opcode::{decode, Op};
use crate::symbols::SymbolId;

/// Stack-based virtual machine.
#[derive(Debug, Default)]
pub struct Vm {
    stack: Vec<Object>,
    config: VmConfig,
}

impl Vm {
    /// Creates a VM with the default stack limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    /// Creates a VM with the given limits.
    #[must_use]
    pub fn with_config(config: VmConfig) -> Self {
        Self {
            stack: Vec::with_capacity(config.stack_size),
            config,
        }
    }

    /// Runs a tape to `RETURN` and returns the value on top of the stack.
    ///
    /// # Errors
    /// Any [`VmFault`].
    pub fn execute<H: HostState + ?Sized>(
        &mut self,
        tape: &[u8],
        objects: &Objects,
        host: &H,
    ) -> Result<Object> {
        self.stack.clear();
        let mut ip = 0;

        while ip < tape.len() {
            let inst = decode(tape, ip)?;
            trace!(%inst, depth = self.stack.len(), "vm step");
            let next = inst.next();
            if next <= ip {
                return Err(Error::vm(VmFault::PcDidNotAdvance { ip }));
            }

            match inst.op {
                Op::Nop => {}
                Op::PushT => self.push(Object::Bool(true), ip)?,
                Op::PushF => self.push(Object::Bool(false), ip)?,
                Op::PushConst => {
                    let index = inst.operand(0) as u16;
                    let constant = objects.constant(index).cloned().ok_or_else(|| {
                        Error::vm(VmFault::UnboundName {
                            namespace: "constants",
                            index,
                        })
                    })?;
                    self.push(constant, ip)?;
                }
                Op::PushPtr => {
                    let index = inst.operand(0) as u16;
                    let name = objects.name(index).ok_or_else(|| {
                        Error::vm(VmFault::UnboundName {
                            namespace: "names",
                            index,
                        })
                    })?;
                    self.push(Object::Ptr(Ptr { tag: name.tag, index }), ip)?;
                }
                Op::PushBuiltIn => {
                    let index = inst.operand(0) as u16;
                    let builtin = objects.builtin(index).ok_or_else(|| {
                        Error::vm(VmFault::UnboundName {
                            namespace: "builtins",
                            index,
                        })
                    })?;
                    self.push(Object::BuiltIn(builtin), ip)?;
                }
                Op::Invert => {
                    let value = self.pop_bool(ip)?;
                    self.push(Object::Bool(!value), ip)?;
                }
                Op::NeedAll | Op::NeedAny => {
                    let operands = self.pop_n(inst.operand(0), ip)?;
                    let mut values = Vec::with_capacity(operands.len());
                    for operand in operands {
                        values.push(expect_bool(&operand)?);
                    }
                    let result = if inst.op == Op::NeedAll {
                        values.iter().all(|&b| b)
                    } else {
                        values.iter().any(|&b| b)
                    };
                    self.push(Object::Bool(result), ip)?;
                }
                Op::ChkQty => {
                    let token = token_at(objects, inst.operand(0) as u16)?;
                    let result = host.has(token, inst.operand(1) as u32);
                    self.push(Object::Bool(result), ip)?;
                }
                Op::ChkAll | Op::ChkAny => {
                    let operands = self.pop_n(inst.operand(0), ip)?;
                    let tokens = tokens_of(objects, &operands)?;
                    let result = if inst.op == Op::ChkAll {
                        host.has_every(&tokens)
                    } else {
                        host.has_anyof(&tokens)
                    };
                    self.push(Object::Bool(result), ip)?;
                }
                Op::IsChild => self.push(Object::Bool(host.is_child()), ip)?,
                Op::IsAdult => self.push(Object::Bool(host.is_adult()), ip)?,
                Op::Invoke => {
                    let callee = self.pop(ip)?;
                    let Object::BuiltIn(builtin) = callee else {
                        return Err(Error::vm(VmFault::NotCallable(callee.to_string())));
                    };
                    let args = self.pop_n(inst.operand(0), ip)?;
                    let result = call(builtin, &args, objects, host)?;
                    self.push(result, ip)?;
                }
                Op::CmpEq | Op::CmpNq | Op::CmpLt => {
                    let lhs = self.pop(ip)?;
                    let rhs = self.pop(ip)?;
                    let result = compare(inst.op, &lhs, &rhs)?;
                    self.push(Object::Bool(result), ip)?;
                }
                Op::Return => return self.pop(ip),
                Op::Err => return Err(Error::vm(VmFault::ErrOpcode { ip })),
            }

            ip = next;
        }

        self.stack.pop().ok_or_else(|| Error::vm(VmFault::NoResult))
    }

    /// Runs a tape and requires a boolean result.
    ///
    /// # Errors
    /// Any [`VmFault`], including [`VmFault::TypeMismatch`] for a non-boolean
    /// result.
    pub fn evaluate<H: HostState + ?Sized>(
        &mut self,
        tape: &[u8],
        objects: &Objects,
        host: &H,
    ) -> Result<bool> {
        let result = self.execute(tape, objects, host)?;
        expect_bool(&result)
    }

    fn push(&mut self, object: Object, ip: usize) -> Result<()> {
        if self.stack.len() >= self.config.stack_size {
            return Err(Error::vm(VmFault::StackOverflow {
                ip,
                limit: self.config.stack_size,
            }));
        }
        self.stack.push(object);
        Ok(())
    }

    fn pop(&mut self, ip: usize) -> Result<Object> {
        self.stack
            .pop()
            .ok_or_else(|| Error::vm(VmFault::StackUnderflow { ip }))
    }

    fn pop_bool(&mut self, ip: usize) -> Result<bool> {
        let value = self.pop(ip)?;
        expect_bool(&value)
    }

    /// Pops `n` values, returned in push order.
    fn pop_n(&mut self, n: usize, ip: usize) -> Result<Vec<Object>> {
        if n > self.stack.len() {
            return Err(Error::vm(VmFault::StackUnderflow { ip }));
        }
        Ok(self.stack.split_off(self.stack.len() - n))
    }
}

fn type_mismatch(expected: &'static str, actual: &Object) -> Error {
    Error::vm(VmFault::TypeMismatch {
        expected,
        actual: actual.kind_name().to_string(),
    })
}

fn expect_bool(object: &Object) -> Result<bool> {
    object.as_bool().ok_or_else(|| type_mismatch("bool", object))
}

fn token_at(objects: &Objects, index: u16) -> Result<SymbolId> {
    match objects.name(index) {
        Some(name) if name.tag == PtrTag::Token => Ok(name.symbol),
        Some(_) => Err(Error::vm(VmFault::TypeMismatch {
            expected: "token pointer",
            actual: "setting pointer".to_string(),
        })),
        None => Err(Error::vm(VmFault::UnboundName {
            namespace: "names",
            index,
        })),
    }
}

fn token_of(objects: &Objects, object: &Object) -> Result<SymbolId> {
    match object {
        Object::Ptr(ptr) => token_at(objects, ptr.index),
        other => Err(type_mismatch("token pointer", other)),
    }
}

fn tokens_of(objects: &Objects, operands: &[Object]) -> Result<Vec<SymbolId>> {
    operands.iter().map(|o| token_of(objects, o)).collect()
}

/// Names-table index and spelling of a setting pointer.
fn setting_name<'o>(objects: &'o Objects, object: &Object) -> Result<(u16, &'o str)> {
    let Object::Ptr(ptr) = object else {
        return Err(type_mismatch("setting pointer", object));
    };
    match objects.name(ptr.index) {
        Some(name) if name.tag == PtrTag::Setting => Ok((ptr.index, &name.name)),
        Some(_) => Err(type_mismatch("setting pointer", object)),
        None => Err(Error::vm(VmFault::UnboundName {
            namespace: "names",
            index: ptr.index,
        })),
    }
}

/// The host had no value for the setting at `index`.
fn unset_setting(index: u16) -> Error {
    Error::vm(VmFault::UnboundName {
        namespace: "settings",
        index,
    })
}

/// Reads a number, loading it first if it is a setting pointer.
fn number<H: HostState + ?Sized>(objects: &Objects, host: &H, object: &Object) -> Result<f64> {
    if let Object::Ptr(Ptr {
        tag: PtrTag::Setting,
        ..
    }) = object
    {
        let (index, name) = setting_name(objects, object)?;
        let value = host.setting(name).ok_or_else(|| unset_setting(index))?;
        return value.as_number().ok_or_else(|| type_mismatch("number", &value));
    }
    object.as_number().ok_or_else(|| type_mismatch("number", object))
}

fn count<H: HostState + ?Sized>(objects: &Objects, host: &H, object: &Object) -> Result<u32> {
    let n = number(objects, host, object)?;
    if !n.is_finite() || n < 0.0 {
        return Err(type_mismatch("count", object));
    }
    Ok(n as u32)
}

fn call<H: HostState + ?Sized>(
    builtin: BuiltIn,
    args: &[Object],
    objects: &Objects,
    host: &H,
) -> Result<Object> {
    if !builtin.arity().accepts(args.len()) {
        return Err(Error::arity_mismatch(builtin.arity().to_string(), args.len())
            .in_frame(builtin.name()));
    }

    let result = match (builtin, args) {
        (BuiltIn::Has, [token, qty]) => {
            host.has(token_of(objects, token)?, count(objects, host, qty)?)
        }
        (BuiltIn::HasEvery, _) => host.has_every(&tokens_of(objects, args)?),
        (BuiltIn::HasAnyOf, _) => host.has_anyof(&tokens_of(objects, args)?),
        (BuiltIn::IsAdult, []) => host.is_adult(),
        (BuiltIn::IsChild, []) => host.is_child(),
        (BuiltIn::IsStartingAge, []) => host.is_starting_age(),
        (BuiltIn::AtDay, []) => host.at_day(),
        (BuiltIn::AtNight, []) => host.at_night(),
        (BuiltIn::AtDampeTime, []) => host.at_dampe_time(),
        (BuiltIn::HasBottle, []) => host.has_bottle(),
        (BuiltIn::HasMedallions, [n]) => host.has_medallions(count(objects, host, n)?),
        (BuiltIn::HasStones, [n]) => host.has_stones(count(objects, host, n)?),
        (BuiltIn::HasDungeonRewards, [n]) => host.has_dungeon_rewards(count(objects, host, n)?),
        (BuiltIn::HasHearts, [n]) => host.has_hearts(count(objects, host, n)?),
        (BuiltIn::HasAllNotesForSong, [song]) => {
            host.has_all_notes_for_song(token_of(objects, song)?)
        }
        (BuiltIn::RegionHasShortcuts, [region]) => {
            let region = region
                .as_str()
                .ok_or_else(|| type_mismatch("string", region))?;
            host.region_has_shortcuts(region)
        }
        (BuiltIn::LoadSetting, [setting]) => {
            let (index, name) = setting_name(objects, setting)?;
            return host.setting(name).ok_or_else(|| unset_setting(index));
        }
        (BuiltIn::LoadSetting2, [setting, key]) => {
            let (index, name) = setting_name(objects, setting)?;
            let key = key.as_str().ok_or_else(|| type_mismatch("string", key))?;
            return host
                .indexed_setting(name, key)
                .ok_or_else(|| unset_setting(index));
        }
        (builtin, _) => {
            return Err(Error::internal(format!(
                "{builtin} accepted {} arguments but has no dispatch",
                args.len()
            )));
        }
    };
    Ok(Object::Bool(result))
}

fn compare(op: Op, lhs: &Object, rhs: &Object) -> Result<bool> {
    match op {
        Op::CmpEq => Ok(lhs == rhs),
        Op::CmpNq => Ok(lhs != rhs),
        _ => match (lhs, rhs) {
            (Object::Number(a), Object::Number(b)) => Ok(a < b),
            (Object::Str(a), Object::Str(b)) => Ok(a < b),
            (Object::Number(_) | Object::Str(_), other) | (other, _) => {
                Err(type_mismatch("number or string", other))
            }
        },
    }
}
