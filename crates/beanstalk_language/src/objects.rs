//! Runtime objects and the tables the bytecode indexes into.
//!
//! Three namespaces, each addressed by a `u16` operand:
//! - constants: deduplicated literals (`PUSH_CONST`)
//! - names: token and setting pointers (`PUSH_PTR`, `CHK_QTY`)
//! - built-ins: the fixed host function set (`PUSH_BUILTIN`)

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use beanstalk_foundation::{Error, ErrorKind, Result};

use crate::symbols::SymbolId;

// =============================================================================
// Built-ins
// =============================================================================

/// How many arguments a built-in takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many.
    Fixed(usize),
    /// Any number.
    Variadic,
}

impl Arity {
    /// Returns true if `count` arguments are acceptable.
    #[must_use]
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Fixed(n) => n == count,
            Self::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Variadic => f.write_str("any number"),
        }
    }
}

/// Host functions a tape can call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuiltIn {
    /// `has(token, qty)`
    Has,
    /// `has_anyof(tokens...)`
    HasAnyOf,
    /// `has_every(tokens...)`
    HasEvery,
    /// `is_adult()`
    IsAdult,
    /// `is_child()`
    IsChild,
    /// `has_all_notes_for_song(song)`
    HasAllNotesForSong,
    /// `at_dampe_time()`
    AtDampeTime,
    /// `at_day()`
    AtDay,
    /// `at_night()`
    AtNight,
    /// `has_bottle()`
    HasBottle,
    /// `has_dungeon_rewards(n)`
    HasDungeonRewards,
    /// `has_hearts(n)`
    HasHearts,
    /// `has_medallions(n)`
    HasMedallions,
    /// `has_stones(n)`
    HasStones,
    /// `is_starting_age()`
    IsStartingAge,
    /// `region_has_shortcuts(region)`
    RegionHasShortcuts,
    /// `load_setting(name)`
    LoadSetting,
    /// `load_setting_2(name, key)`
    LoadSetting2,
}

impl BuiltIn {
    /// Every built-in; a built-in's table index is its position here.
    pub const ALL: [BuiltIn; 18] = [
        BuiltIn::Has,
        BuiltIn::HasAnyOf,
        BuiltIn::HasEvery,
        BuiltIn::IsAdult,
        BuiltIn::IsChild,
        BuiltIn::HasAllNotesForSong,
        BuiltIn::AtDampeTime,
        BuiltIn::AtDay,
        BuiltIn::AtNight,
        BuiltIn::HasBottle,
        BuiltIn::HasDungeonRewards,
        BuiltIn::HasHearts,
        BuiltIn::HasMedallions,
        BuiltIn::HasStones,
        BuiltIn::IsStartingAge,
        BuiltIn::RegionHasShortcuts,
        BuiltIn::LoadSetting,
        BuiltIn::LoadSetting2,
    ];

    /// Name as written in rules.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Has => "has",
            Self::HasAnyOf => "has_anyof",
            Self::HasEvery => "has_every",
            Self::IsAdult => "is_adult",
            Self::IsChild => "is_child",
            Self::HasAllNotesForSong => "has_all_notes_for_song",
            Self::AtDampeTime => "at_dampe_time",
            Self::AtDay => "at_day",
            Self::AtNight => "at_night",
            Self::HasBottle => "has_bottle",
            Self::HasDungeonRewards => "has_dungeon_rewards",
            Self::HasHearts => "has_hearts",
            Self::HasMedallions => "has_medallions",
            Self::HasStones => "has_stones",
            Self::IsStartingAge => "is_starting_age",
            Self::RegionHasShortcuts => "region_has_shortcuts",
            Self::LoadSetting => "load_setting",
            Self::LoadSetting2 => "load_setting_2",
        }
    }

    /// Declared parameter count.
    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::Has | Self::LoadSetting2 => Arity::Fixed(2),
            Self::HasAnyOf | Self::HasEvery => Arity::Variadic,
            Self::HasAllNotesForSong
            | Self::HasDungeonRewards
            | Self::HasHearts
            | Self::HasMedallions
            | Self::HasStones
            | Self::RegionHasShortcuts
            | Self::LoadSetting => Arity::Fixed(1),
            Self::IsAdult
            | Self::IsChild
            | Self::AtDampeTime
            | Self::AtDay
            | Self::AtNight
            | Self::HasBottle
            | Self::IsStartingAge => Arity::Fixed(0),
        }
    }

    /// Looks up a built-in by rule name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Position in the built-in table.
    #[must_use]
    pub fn index(self) -> u16 {
        Self::ALL.iter().position(|b| *b == self).unwrap_or_default() as u16
    }
}

impl fmt::Display for BuiltIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Objects
// =============================================================================

/// What a pointer refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PtrTag {
    /// A token or event.
    Token,
    /// A generation setting.
    Setting,
}

/// Typed reference into the names table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ptr {
    /// Referent kind.
    pub tag: PtrTag,
    /// Names table index.
    pub index: u16,
}

/// A value on the VM stack.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Object {
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(f64),
    /// String.
    Str(Arc<str>),
    /// Callable host function.
    BuiltIn(BuiltIn),
    /// Token or setting reference.
    Ptr(Ptr),
}

impl Object {
    /// Kind name for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::BuiltIn(_) => "builtin",
            Self::Ptr(Ptr {
                tag: PtrTag::Token, ..
            }) => "token pointer",
            Self::Ptr(Ptr {
                tag: PtrTag::Setting,
                ..
            }) => "setting pointer",
        }
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Object {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Object {
    fn from(s: &str) -> Self {
        Self::Str(s.into())
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::BuiltIn(b) => write!(f, "<builtin {b}>"),
            Self::Ptr(p) => write!(f, "<{:?} {}>", p.tag, p.index),
        }
    }
}

/// Hashable identity of a constant. Numbers are keyed by bit pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum ConstKey {
    Bool(bool),
    Number(u64),
    Str(Arc<str>),
}

impl ConstKey {
    fn of(object: &Object) -> Option<Self> {
        match object {
            Object::Bool(b) => Some(Self::Bool(*b)),
            Object::Number(n) => Some(Self::Number(n.to_bits())),
            Object::Str(s) => Some(Self::Str(s.clone())),
            Object::BuiltIn(_) | Object::Ptr(_) => None,
        }
    }
}

/// An entry in the names table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Name {
    /// Spelling, for diagnostics and setting lookups.
    pub name: String,
    /// The symbol it came from.
    pub symbol: SymbolId,
    /// Referent kind.
    pub tag: PtrTag,
}

// =============================================================================
// Tables
// =============================================================================

const MAX_ENTRIES: usize = 1 << 16;

fn next_index(len: usize, namespace: &'static str) -> Result<u16> {
    if len >= MAX_ENTRIES {
        return Err(Error::new(ErrorKind::TableFull { namespace }));
    }
    Ok(len as u16)
}

/// Object table shared by every tape of one compile session.
#[derive(Clone, Debug, Default)]
pub struct Objects {
    constants: Vec<Object>,
    constant_index: HashMap<ConstKey, u16>,
    names: Vec<Name>,
    name_index: HashMap<(SymbolId, PtrTag), u16>,
}

impl Objects {
    /// Creates empty constant and name tables. Built-ins are always present.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a literal and returns its index.
    ///
    /// # Errors
    /// Returns [`ErrorKind::TableFull`] when the namespace is exhausted, or an
    /// internal error for objects that are not literals.
    pub fn intern_constant(&mut self, object: Object) -> Result<u16> {
        let key = ConstKey::of(&object)
            .ok_or_else(|| Error::internal(format!("{} is not a constant", object.kind_name())))?;
        if let Some(&index) = self.constant_index.get(&key) {
            return Ok(index);
        }
        let index = next_index(self.constants.len(), "constants")?;
        self.constants.push(object);
        self.constant_index.insert(key, index);
        Ok(index)
    }

    /// Interns a pointer target and returns its index.
    ///
    /// # Errors
    /// Returns [`ErrorKind::TableFull`] when the namespace is exhausted.
    pub fn intern_name(&mut self, name: &str, symbol: SymbolId, tag: PtrTag) -> Result<u16> {
        if let Some(&index) = self.name_index.get(&(symbol, tag)) {
            return Ok(index);
        }
        let index = next_index(self.names.len(), "names")?;
        self.names.push(Name {
            name: name.to_string(),
            symbol,
            tag,
        });
        self.name_index.insert((symbol, tag), index);
        Ok(index)
    }

    /// Index of a built-in by rule name.
    ///
    /// # Errors
    /// The built-in table is fixed; any other name is an undefined symbol.
    pub fn builtin_index(&self, name: &str) -> Result<u16> {
        BuiltIn::from_name(name)
            .map(BuiltIn::index)
            .ok_or_else(|| Error::undefined_symbol(format!("built-in {name}")))
    }

    /// Constant at `index`.
    #[must_use]
    pub fn constant(&self, index: u16) -> Option<&Object> {
        self.constants.get(usize::from(index))
    }

    /// Name at `index`.
    #[must_use]
    pub fn name(&self, index: u16) -> Option<&Name> {
        self.names.get(usize::from(index))
    }

    /// Built-in at `index`.
    #[must_use]
    pub fn builtin(&self, index: u16) -> Option<BuiltIn> {
        BuiltIn::ALL.get(usize::from(index)).copied()
    }

    /// Number of constants.
    #[must_use]
    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    /// Number of names.
    #[must_use]
    pub fn name_count(&self) -> usize {
        self.names.len()
    }
}
