//! Rule-guarded graph exploration.
//!
//! An [`Exploration`] keeps a visited set and a workset of locations whose
//! outgoing edges still need evaluating. Each round:
//!
//! 1. Takes a snapshot [`Inventory`] of the world
//! 2. Runs the rule of every unvisited edge leaving the workset
//! 3. Marks reached rows visited; reached locations join the next workset
//! 4. Puts back every location that still has unreached neighbors
//! 5. Collects reached events, and the items placed at reached checks
//!
//! A rule that faults fails the round. A fault never counts as "not reached".

use beanstalk_foundation::{Bitset, Error, ErrorKind, Result};
use beanstalk_language::{Object, Vm, VmConfig};
use beanstalk_storage::RowId;
use tracing::{debug, instrument};

use crate::components::{IsCheck, IsEvent, IsLocation, Placed};
use crate::inventory::{Inventory, PlayerState};
use crate::world::World;

/// Bounds on an exploration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExplorationConfig {
    /// Most rounds [`Exploration::explore_all`] runs. `None` runs to a fixpoint.
    pub max_rounds: Option<usize>,
    /// VM limits used for every rule.
    pub vm: VmConfig,
}

impl ExplorationConfig {
    /// Builder method to bound the round count.
    #[must_use]
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Builder method to set the VM limits.
    #[must_use]
    pub fn with_vm(mut self, vm: VmConfig) -> Self {
        self.vm = vm;
        self
    }
}

/// Rows reached by one or more rounds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reached {
    /// Rounds covered.
    pub rounds: usize,
    /// Locations reached.
    pub locations: Bitset,
    /// Checks reached.
    pub checks: Bitset,
    /// Events reached.
    pub events: Bitset,
    /// Workset locations that still have unreached neighbors.
    pub pending: Bitset,
}

impl Reached {
    /// Returns true if nothing new was reached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.checks.is_empty() && self.events.is_empty()
    }

    /// Every reached row.
    #[must_use]
    pub fn all(&self) -> Bitset {
        self.locations.union(&self.checks).union(&self.events)
    }

    fn absorb(&mut self, round: Reached) {
        self.rounds += round.rounds;
        self.locations.union_with(&round.locations);
        self.checks.union_with(&round.checks);
        self.events.union_with(&round.events);
        self.pending = round.pending;
    }
}

/// One age's walk over a [`World`].
#[derive(Debug)]
pub struct Exploration {
    state: PlayerState,
    config: ExplorationConfig,
    vm: Vm,
    visited: Bitset,
    workset: Bitset,
    round: usize,
}

impl Exploration {
    /// Creates an exploration with an empty workset.
    #[must_use]
    pub fn new(state: PlayerState) -> Self {
        Self::with_config(state, ExplorationConfig::default())
    }

    /// Creates an exploration with explicit bounds.
    #[must_use]
    pub fn with_config(state: PlayerState, config: ExplorationConfig) -> Self {
        Self {
            state,
            vm: Vm::with_config(config.vm.clone()),
            config,
            visited: Bitset::new(),
            workset: Bitset::new(),
            round: 0,
        }
    }

    /// Starts from every root of `world`.
    #[must_use]
    pub fn from_roots(world: &World, state: PlayerState) -> Self {
        let mut exploration = Self::new(state);
        for root in world.graph().roots() {
            exploration.start_at(RowId::new(root));
        }
        exploration
    }

    /// Adds a starting location.
    pub fn start_at(&mut self, location: RowId) {
        self.visited.set(location.index());
        self.workset.set(location.index());
    }

    /// Rows reached so far, starting points included.
    #[must_use]
    pub fn visited(&self) -> &Bitset {
        &self.visited
    }

    /// Locations waiting to be explored.
    #[must_use]
    pub fn workset(&self) -> &Bitset {
        &self.workset
    }

    /// The explorer.
    #[must_use]
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// The explorer, to change age or time between rounds.
    pub fn state_mut(&mut self) -> &mut PlayerState {
        &mut self.state
    }

    /// Runs one round.
    ///
    /// # Errors
    /// * `WorksetEmpty` if there is nothing to explore from
    /// * `NoProgress` if the round reached nothing; the workset is kept so a
    ///   later round can retry after the inventory changes
    /// * `RuleNotBoolean` or any VM fault from an edge rule; nothing reached
    ///   earlier in the failed round is kept
    #[instrument(skip_all, fields(round = self.round))]
    pub fn explore(&mut self, world: &mut World) -> Result<Reached> {
        if self.workset.is_empty() {
            return Err(Error::new(ErrorKind::WorksetEmpty));
        }

        let workset = std::mem::take(&mut self.workset);
        let visited = self.visited.clone();
        let reached = match self.visit(world, &workset) {
            Ok(reached) => reached,
            Err(err) => {
                self.workset = workset;
                self.visited = visited;
                return Err(err);
            }
        };
        self.round += 1;

        if reached.is_empty() {
            debug!(pending = reached.pending.len(), "no progress");
            return Err(Error::new(ErrorKind::NoProgress));
        }

        for event in &reached.events {
            world.collect(RowId::new(event), 1)?;
        }
        for check in &reached.checks {
            if let Some(Placed(token)) = world.storage().get::<Placed>(RowId::new(check))? {
                world.collect(token, 1)?;
            }
        }

        debug!(
            locations = reached.locations.len(),
            checks = reached.checks.len(),
            events = reached.events.len(),
            pending = reached.pending.len(),
            "round finished"
        );
        Ok(reached)
    }

    /// Runs rounds until nothing more can be reached or the round bound is
    /// hit, and returns everything reached.
    ///
    /// # Errors
    /// Any error from [`Exploration::explore`] other than `WorksetEmpty` and
    /// `NoProgress`, which end the walk.
    #[instrument(skip_all)]
    pub fn explore_all(&mut self, world: &mut World) -> Result<Reached> {
        let mut total = Reached::default();
        while self.config.max_rounds.is_none_or(|max| total.rounds < max) {
            match self.explore(world) {
                Ok(round) => total.absorb(round),
                Err(err) if matches!(err.kind, ErrorKind::WorksetEmpty | ErrorKind::NoProgress) => {
                    total.pending = self.workset.clone();
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(total)
    }

    fn visit(&mut self, world: &World, workset: &Bitset) -> Result<Reached> {
        let inventory = Inventory::snapshot(world, &self.state)?;
        let mut reached = Reached {
            rounds: 1,
            ..Reached::default()
        };

        for visiting in workset {
            let mut neighbors = world.graph().successors(visiting);
            neighbors.difference_with(&self.visited);

            for neighbor in neighbors.elems() {
                let origin = RowId::new(visiting);
                let destination = RowId::new(neighbor);
                if !can_transit(&mut self.vm, world, &inventory, origin, destination)? {
                    continue;
                }

                neighbors.unset(neighbor);
                self.visited.set(neighbor);
                let membership = world.storage().membership(destination)?;
                let storage = world.storage();
                if membership.is_set(storage.column_id::<IsLocation>()?.index()) {
                    reached.locations.set(neighbor);
                    self.workset.set(neighbor);
                } else if membership.is_set(storage.column_id::<IsEvent>()?.index()) {
                    reached.events.set(neighbor);
                } else if membership.is_set(storage.column_id::<IsCheck>()?.index()) {
                    reached.checks.set(neighbor);
                }
            }

            if !neighbors.is_empty() {
                self.workset.set(visiting);
                reached.pending.set(visiting);
            }
        }
        Ok(reached)
    }
}

fn can_transit(
    vm: &mut Vm,
    world: &World,
    inventory: &Inventory<'_>,
    origin: RowId,
    destination: RowId,
) -> Result<bool> {
    let edge = world.edge(origin, destination).ok_or_else(|| {
        Error::internal(format!(
            "no edge registered between {} and {}",
            world.name_of(origin),
            world.name_of(destination)
        ))
    })?;
    let rule = world.rule(edge)?;
    let frame = || world.name_of(edge);

    match vm
        .execute(&rule.0, world.objects(), inventory)
        .map_err(|e| e.in_frame(frame()))?
    {
        Object::Bool(answer) => Ok(answer),
        other => Err(Error::new(ErrorKind::RuleNotBoolean {
            edge: frame(),
            produced: other.to_string(),
        })),
    }
}
