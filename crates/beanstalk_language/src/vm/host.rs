//! The world-state seam the VM calls into.
//!
//! Rule evaluation is pure; everything game-specific about an inventory lives
//! behind [`HostState`]. Tokens arrive as the [`SymbolId`] they were compiled
//! from.

use std::collections::{HashMap, HashSet};

use crate::objects::Object;
use crate::symbols::SymbolId;

// =============================================================================
// HostState Trait
// =============================================================================

/// Answers the questions compiled rules ask about the world.
pub trait HostState {
    /// Whether at least `qty` of `token` are held.
    fn has(&self, token: SymbolId, qty: u32) -> bool;

    /// Whether every token is held.
    fn has_every(&self, tokens: &[SymbolId]) -> bool {
        tokens.iter().all(|&t| self.has(t, 1))
    }

    /// Whether any token is held.
    fn has_anyof(&self, tokens: &[SymbolId]) -> bool {
        tokens.iter().any(|&t| self.has(t, 1))
    }

    /// Whether the player is currently adult.
    fn is_adult(&self) -> bool;

    /// Whether the player is currently child.
    fn is_child(&self) -> bool {
        !self.is_adult()
    }

    /// Whether the current age is the starting age.
    fn is_starting_age(&self) -> bool;

    /// Daytime access.
    fn at_day(&self) -> bool;

    /// Nighttime access.
    fn at_night(&self) -> bool;

    /// Access during the graveyard tour hours.
    fn at_dampe_time(&self) -> bool;

    /// Whether an empty-able bottle is held.
    fn has_bottle(&self) -> bool;

    /// Whether at least `n` medallions are held.
    fn has_medallions(&self, n: u32) -> bool;

    /// Whether at least `n` spiritual stones are held.
    fn has_stones(&self, n: u32) -> bool;

    /// Whether at least `n` dungeon rewards are held.
    fn has_dungeon_rewards(&self, n: u32) -> bool;

    /// Whether at least `n` full hearts are available.
    fn has_hearts(&self, n: u32) -> bool;

    /// Whether every note of `song` is playable.
    fn has_all_notes_for_song(&self, song: SymbolId) -> bool;

    /// Whether the named dungeon has its shortcuts enabled.
    fn region_has_shortcuts(&self, region: &str) -> bool;

    /// Run-time value of a setting the optimizer could not fold.
    fn setting(&self, name: &str) -> Option<Object>;

    /// Run-time value of one entry of a keyed setting.
    fn indexed_setting(&self, name: &str, key: &str) -> Option<Object> {
        let _ = (name, key);
        None
    }
}

// =============================================================================
// Fakes
// =============================================================================

/// Says yes to everything. Settings are unknown.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllTrue;

impl HostState for AllTrue {
    fn has(&self, _: SymbolId, _: u32) -> bool {
        true
    }

    fn is_adult(&self) -> bool {
        true
    }

    fn is_child(&self) -> bool {
        true
    }

    fn is_starting_age(&self) -> bool {
        true
    }

    fn at_day(&self) -> bool {
        true
    }

    fn at_night(&self) -> bool {
        true
    }

    fn at_dampe_time(&self) -> bool {
        true
    }

    fn has_bottle(&self) -> bool {
        true
    }

    fn has_medallions(&self, _: u32) -> bool {
        true
    }

    fn has_stones(&self, _: u32) -> bool {
        true
    }

    fn has_dungeon_rewards(&self, _: u32) -> bool {
        true
    }

    fn has_hearts(&self, _: u32) -> bool {
        true
    }

    fn has_all_notes_for_song(&self, _: SymbolId) -> bool {
        true
    }

    fn region_has_shortcuts(&self, _: &str) -> bool {
        true
    }

    fn setting(&self, _: &str) -> Option<Object> {
        None
    }
}

/// Map-backed host for tests and benchmarks.
#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    /// Held quantities.
    pub tokens: HashMap<SymbolId, u32>,
    /// Adult when true.
    pub adult: bool,
    /// Result of `is_starting_age`.
    pub starting_age: bool,
    /// Medallions held.
    pub medallions: u32,
    /// Spiritual stones held.
    pub stones: u32,
    /// Full hearts.
    pub hearts: u32,
    /// Whether a bottle is held.
    pub bottle: bool,
    /// Songs with every note.
    pub songs: HashSet<SymbolId>,
    /// Dungeons with shortcuts.
    pub shortcuts: HashSet<String>,
    /// Run-time settings.
    pub settings: HashMap<String, Object>,
}

impl MemoryHost {
    /// Creates a child with an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to hold `qty` of `token`.
    #[must_use]
    pub fn with(mut self, token: SymbolId, qty: u32) -> Self {
        self.tokens.insert(token, qty);
        self
    }

    /// Builder method to set the age.
    #[must_use]
    pub fn adult(mut self, adult: bool) -> Self {
        self.adult = adult;
        self
    }

    /// Builder method to set a run-time setting.
    #[must_use]
    pub fn with_setting(mut self, name: &str, value: impl Into<Object>) -> Self {
        self.settings.insert(name.to_string(), value.into());
        self
    }

    /// Builder method to set the medallion count.
    #[must_use]
    pub fn with_medallions(mut self, n: u32) -> Self {
        self.medallions = n;
        self
    }
}

impl HostState for MemoryHost {
    fn has(&self, token: SymbolId, qty: u32) -> bool {
        self.tokens.get(&token).copied().unwrap_or(0) >= qty
    }

    fn is_adult(&self) -> bool {
        self.adult
    }

    fn is_starting_age(&self) -> bool {
        self.starting_age
    }

    fn at_day(&self) -> bool {
        true
    }

    fn at_night(&self) -> bool {
        true
    }

    fn at_dampe_time(&self) -> bool {
        true
    }

    fn has_bottle(&self) -> bool {
        self.bottle
    }

    fn has_medallions(&self, n: u32) -> bool {
        self.medallions >= n
    }

    fn has_stones(&self, n: u32) -> bool {
        self.stones >= n
    }

    fn has_dungeon_rewards(&self, n: u32) -> bool {
        self.medallions + self.stones >= n
    }

    fn has_hearts(&self, n: u32) -> bool {
        self.hearts >= n
    }

    fn has_all_notes_for_song(&self, song: SymbolId) -> bool {
        self.songs.contains(&song)
    }

    fn region_has_shortcuts(&self, region: &str) -> bool {
        self.shortcuts.contains(region)
    }

    fn setting(&self, name: &str) -> Option<Object> {
        self.settings.get(name).cloned()
    }
}
