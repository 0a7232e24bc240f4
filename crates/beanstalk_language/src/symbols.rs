//! Symbol table: every name a rule can mention, interned to a dense index.
//!
//! Indexes are handed out in first-declaration order and never change. A
//! symbol's kind may be refined by later declarations, following the merge
//! rules in [`SymbolKind::merge`].

use std::collections::HashMap;
use std::fmt;

use beanstalk_foundation::{Error, ErrorKind, Result};

/// Dense, stable symbol index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    /// Wraps a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:04X}", self.0)
    }
}

/// What a symbol denotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SymbolKind {
    /// Seen in rule text, not yet classified.
    Unknown,
    /// Collectible item.
    Token,
    /// Event flag; a token that is never placed.
    Event,
    /// Something called, nothing more known.
    Function,
    /// Host-provided function callable at runtime.
    BuiltIn,
    /// Function that must be rewritten away before code generation.
    CompFunc,
    /// Scripted helper inlined by the optimizer.
    CompiledFunc,
    /// Fixed names such as `age` or `Forest`.
    Global,
    /// Region of the world graph.
    Location,
    /// Generation setting.
    Setting,
    /// Exit between regions.
    Transit,
    /// Alternate spelling of another symbol.
    Alias,
    /// Helper parameter.
    Local,
}

impl SymbolKind {
    /// Upper-case name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Token => "TOKEN",
            Self::Event => "EVENT",
            Self::Function => "FUNCTION",
            Self::BuiltIn => "BUILT_IN",
            Self::CompFunc => "COMP_FUNC",
            Self::CompiledFunc => "COMPILED_FUNC",
            Self::Global => "GLOBAL",
            Self::Location => "LOCATION",
            Self::Setting => "SETTING",
            Self::Transit => "TRANSIT",
            Self::Alias => "ALIAS",
            Self::Local => "LOCAL",
        }
    }

    /// Returns true for the kinds that can be invoked.
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(
            self,
            Self::Function | Self::BuiltIn | Self::CompFunc | Self::CompiledFunc
        )
    }

    /// The kind a symbol ends up with when `self` is on record and `requested`
    /// is declared. `None` means the two cannot be reconciled.
    ///
    /// * `Unknown` and `Alias` requests never change anything.
    /// * An `Unknown` symbol takes whatever is requested.
    /// * `Local` never reclassifies a symbol that is already known, since
    ///   parameters only shadow within their helper body.
    /// * `Event` refines `Token`; `Token` never overwrites `Event`.
    /// * `Function` is the least specific callable and never overwrites a
    ///   more specific one; the more specific ones all overwrite it.
    /// * A `Token` that turns out to be a helper becomes `CompiledFunc`.
    #[must_use]
    pub fn merge(self, requested: Self) -> Option<Self> {
        use SymbolKind::{
            Alias, BuiltIn, CompFunc, CompiledFunc, Event, Function, Local, Token, Unknown,
        };
        match (self, requested) {
            (_, Unknown | Alias) => Some(self),
            (Unknown, _) => Some(requested),
            (_, Local) => Some(self),
            (current, req) if current == req => Some(current),
            (Token, Event) | (Event, Token) => Some(Event),
            (BuiltIn | CompFunc | CompiledFunc, Function) => Some(self),
            (Function, BuiltIn | CompFunc | CompiledFunc) => Some(requested),
            (CompiledFunc, BuiltIn | CompFunc) => Some(requested),
            (Token, CompiledFunc) => Some(CompiledFunc),
            _ => None,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One interned name.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symbol {
    /// Canonical spelling.
    pub name: String,
    /// Stable index.
    pub id: SymbolId,
    /// Current classification.
    pub kind: SymbolKind,
}

/// Owns every name the compiler knows about.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    names: HashMap<String, SymbolId>,
    aliases: HashMap<String, SymbolId>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` as `kind`, or refines an existing declaration.
    ///
    /// Declaring through an alias refines the aliased symbol.
    ///
    /// # Errors
    /// Returns [`ErrorKind::SymbolRedeclared`] when the kinds cannot be merged.
    /// The table is left unchanged in that case.
    pub fn declare(&mut self, name: &str, kind: SymbolKind) -> Result<SymbolId> {
        if let Some(id) = self.resolve(name) {
            let symbol = &mut self.symbols[id.0 as usize];
            let Some(merged) = symbol.kind.merge(kind) else {
                return Err(Error::new(ErrorKind::SymbolRedeclared {
                    name: symbol.name.clone(),
                    existing: symbol.kind.to_string(),
                    requested: kind.to_string(),
                }));
            };
            symbol.kind = merged;
            return Ok(id);
        }

        let id = SymbolId(self.symbols.len() as u32);
        let kind = if kind == SymbolKind::Alias {
            SymbolKind::Unknown
        } else {
            kind
        };
        self.symbols.push(Symbol {
            name: name.to_string(),
            id,
            kind,
        });
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Declares every name in `names` as `kind`.
    ///
    /// # Errors
    /// Stops at the first conflicting declaration.
    pub fn declare_many<I, S>(&mut self, kind: SymbolKind, names: I) -> Result<Vec<SymbolId>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| self.declare(name.as_ref(), kind))
            .collect()
    }

    /// Makes `alias` resolve to `target` without allocating a new index.
    ///
    /// Aliasing a name to the symbol it already denotes is a no-op.
    ///
    /// # Errors
    /// Returns an error if `target` is unknown, or if `alias` already names a
    /// different symbol.
    pub fn alias(&mut self, target: SymbolId, alias: &str) -> Result<()> {
        if self.get(target).is_none() {
            return Err(Error::internal(format!("cannot alias unknown symbol {target:?}")));
        }
        match self.resolve(alias) {
            Some(existing) if existing == target => Ok(()),
            Some(existing) => Err(Error::new(ErrorKind::SymbolRedeclared {
                name: alias.to_string(),
                existing: format!("{existing:?}"),
                requested: format!("alias of {target:?}"),
            })),
            None => {
                self.aliases.insert(alias.to_string(), target);
                Ok(())
            }
        }
    }

    /// Finds a symbol by name or alias.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.resolve(name).map(|id| &self.symbols[id.0 as usize])
    }

    /// Finds a symbol by index.
    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    /// The kind of `id`, or `Unknown` for an index this table never issued.
    #[must_use]
    pub fn kind_of(&self, id: SymbolId) -> SymbolKind {
        self.get(id).map_or(SymbolKind::Unknown, |s| s.kind)
    }

    /// The name of `id`, or `"?"` for an index this table never issued.
    #[must_use]
    pub fn name_of(&self, id: SymbolId) -> &str {
        self.get(id).map_or("?", |s| s.name.as_str())
    }

    /// Number of real symbols; aliases are not counted.
    #[must_use]
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Number of aliases.
    #[must_use]
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Symbols plus aliases.
    #[must_use]
    pub fn raw_size(&self) -> usize {
        self.size() + self.alias_count()
    }

    /// Iterates symbols in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Iterates symbols of one kind in index order.
    pub fn of_kind(&self, kind: SymbolKind) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(move |s| s.kind == kind)
    }

    fn resolve(&self, name: &str) -> Option<SymbolId> {
        self.names
            .get(name)
            .or_else(|| self.aliases.get(name))
            .copied()
    }
}

/// Rewrites a display name into the identifier form rule text uses:
/// punctuation dropped, spaces to underscores.
///
/// `"Bottle with Milk (Half)"` becomes `"Bottle_with_Milk_Half"`.
#[must_use]
pub fn escape_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\'' | '(' | ')' | '[' | ']' | '-'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}
