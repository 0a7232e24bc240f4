//! Storage-backed answers to the VM's questions.
//!
//! [`Inventory`] borrows a [`World`] for one exploration round. Aggregate
//! counts are retrieved once when the inventory is taken; single-token
//! quantities are read from storage on demand.

use std::collections::{HashMap, HashSet};

use beanstalk_foundation::Result;
use beanstalk_language::{HostState, Object, SymbolId};
use beanstalk_storage::Component;

use crate::components::{
    Collected, DungeonReward, IsBottle, Medallion, Notes, PieceOfHeart, SpiritualStone,
};
use crate::world::World;

/// Hearts everyone starts with, in quarters.
pub const STARTING_QUARTERS: u32 = 12;

/// Which age is exploring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Age {
    /// Young Link.
    #[default]
    Child,
    /// Adult Link.
    Adult,
}

/// Everything about the player that is not an item count.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    /// Current age.
    pub age: Age,
    /// Age the seed starts at.
    pub starting_age: Age,
    /// Daytime is reachable.
    pub day: bool,
    /// Nighttime is reachable.
    pub night: bool,
    /// The graveyard tour hours are reachable.
    pub dampe_time: bool,
    /// Songs need their individual note tokens.
    pub notes_shuffled: bool,
    /// Dungeons with shortcuts enabled.
    pub shortcuts: HashSet<String>,
    /// Settings the optimizer could not fold.
    pub settings: HashMap<String, Object>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            age: Age::Child,
            starting_age: Age::Child,
            day: true,
            night: true,
            dampe_time: true,
            notes_shuffled: false,
            shortcuts: HashSet::new(),
            settings: HashMap::new(),
        }
    }
}

impl PlayerState {
    /// Creates a child starting as a child, with every time of day open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the current age.
    #[must_use]
    pub fn with_age(mut self, age: Age) -> Self {
        self.age = age;
        self
    }

    /// Builder method to set the starting age.
    #[must_use]
    pub fn with_starting_age(mut self, age: Age) -> Self {
        self.starting_age = age;
        self
    }

    /// Builder method to set the time-of-day flags.
    #[must_use]
    pub fn with_times(mut self, day: bool, night: bool, dampe_time: bool) -> Self {
        self.day = day;
        self.night = night;
        self.dampe_time = dampe_time;
        self
    }

    /// Builder method to require note tokens for songs.
    #[must_use]
    pub fn with_shuffled_notes(mut self, shuffled: bool) -> Self {
        self.notes_shuffled = shuffled;
        self
    }

    /// Builder method to enable a dungeon's shortcuts.
    #[must_use]
    pub fn with_shortcuts(mut self, dungeon: &str) -> Self {
        self.shortcuts.insert(dungeon.to_string());
        self
    }

    /// Builder method to set a run-time setting.
    #[must_use]
    pub fn with_setting(mut self, name: &str, value: impl Into<Object>) -> Self {
        self.settings.insert(name.to_string(), value.into());
        self
    }
}

/// A world's collected items, as the VM sees them.
#[derive(Debug)]
pub struct Inventory<'w> {
    world: &'w World,
    state: &'w PlayerState,
    bottles: u32,
    medallions: u32,
    stones: u32,
    rewards: u32,
    quarters: u32,
}

impl<'w> Inventory<'w> {
    /// Takes the aggregate counts from `world`.
    ///
    /// # Errors
    /// Returns `UnknownColumn` if `world` was not built by a
    /// [`WorldBuilder`](crate::WorldBuilder).
    pub fn snapshot(world: &'w World, state: &'w PlayerState) -> Result<Self> {
        Ok(Self {
            world,
            state,
            bottles: sum_collected::<IsBottle>(world)?,
            medallions: sum_collected::<Medallion>(world)?,
            stones: sum_collected::<SpiritualStone>(world)?,
            rewards: sum_collected::<DungeonReward>(world)?,
            quarters: heart_quarters(world)?,
        })
    }

    /// How many of `token` are held.
    #[must_use]
    pub fn quantity(&self, token: SymbolId) -> u32 {
        self.world
            .row_of(token)
            .map_or(0, |row| self.world.collected(row))
    }

    /// Whole hearts, counting the starting three.
    #[must_use]
    pub fn hearts(&self) -> u32 {
        (STARTING_QUARTERS + self.quarters) / 4
    }

    fn holds_named(&self, name: &str) -> bool {
        self.world
            .row(name)
            .is_some_and(|row| self.world.collected(row) > 0)
    }
}

fn sum_collected<Tag: Component>(world: &World) -> Result<u32> {
    let rows = world
        .storage()
        .create_query()
        .load::<Collected>()
        .exists::<Tag>()
        .retrieve()?;
    Ok(rows
        .into_iter()
        .filter_map(|row| row.get::<Collected>())
        .map(|Collected(n)| n)
        .sum())
}

fn heart_quarters(world: &World) -> Result<u32> {
    let rows = world
        .storage()
        .create_query()
        .load::<Collected>()
        .load::<PieceOfHeart>()
        .retrieve()?;
    Ok(rows
        .into_iter()
        .filter_map(|row| Some((row.get::<Collected>()?, row.get::<PieceOfHeart>()?)))
        .map(|(Collected(n), PieceOfHeart(weight))| n.saturating_mul(weight))
        .sum())
}

impl HostState for Inventory<'_> {
    fn has(&self, token: SymbolId, qty: u32) -> bool {
        self.quantity(token) >= qty
    }

    fn is_adult(&self) -> bool {
        self.state.age == Age::Adult
    }

    fn is_child(&self) -> bool {
        self.state.age == Age::Child
    }

    fn is_starting_age(&self) -> bool {
        self.state.age == self.state.starting_age
    }

    fn at_day(&self) -> bool {
        self.state.day
    }

    fn at_night(&self) -> bool {
        self.state.night
    }

    fn at_dampe_time(&self) -> bool {
        self.state.dampe_time
    }

    fn has_bottle(&self) -> bool {
        self.bottles > 0
    }

    fn has_medallions(&self, n: u32) -> bool {
        self.medallions >= n
    }

    fn has_stones(&self, n: u32) -> bool {
        self.stones >= n
    }

    fn has_dungeon_rewards(&self, n: u32) -> bool {
        self.rewards >= n
    }

    fn has_hearts(&self, n: u32) -> bool {
        self.hearts() >= n
    }

    fn has_all_notes_for_song(&self, song: SymbolId) -> bool {
        if !self.state.notes_shuffled {
            return true;
        }
        let notes = self
            .world
            .row_of(song)
            .and_then(|row| self.world.storage().get::<Notes>(row).ok().flatten());
        match notes {
            Some(Notes(notes)) => notes
                .split(',')
                .filter(|n| !n.is_empty())
                .all(|note| self.holds_named(note)),
            None => true,
        }
    }

    fn region_has_shortcuts(&self, region: &str) -> bool {
        self.state.shortcuts.contains(region)
    }

    fn setting(&self, name: &str) -> Option<Object> {
        self.state.settings.get(name).cloned()
    }
}
