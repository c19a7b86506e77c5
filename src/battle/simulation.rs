//! The owning arena: agent slab, grid, per-tick orchestration
//!
//! One fixed-order tick: every live agent updates (taken out of its slot so
//! it can read and nudge the others), then the global collision pass, then
//! horn propagation. Dead agents free their tile in the same tick, before
//! anything else reads occupancy.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::battle::collision::resolve_collisions;
use crate::battle::faction::Faction;
use crate::battle::horn::HornBlast;
use crate::battle::regiment::{Cadaver, RegimentAgent};
use crate::core::config::SimConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Circle, Rect, Tick, Vec2};
use crate::spatial::TileGrid;

/// Slot arena for regiment agents
///
/// `AgentId` is the slot index. A slot goes `None` for good when its agent
/// dies, so ids stay stable for the lifetime of the battle; the updating
/// agent is also briefly taken out of its slot, which is what lets it mutate
/// others without aliasing.
pub struct AgentSlab {
    slots: Vec<Option<RegimentAgent>>,
}

impl AgentSlab {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub(crate) fn push(&mut self, agent: RegimentAgent) -> AgentId {
        let id = agent.id();
        self.slots.push(Some(agent));
        id
    }

    /// Total slots, live or not
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, id: AgentId) -> Option<&RegimentAgent> {
        self.slots.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: AgentId) -> Option<&mut RegimentAgent> {
        self.slots.get_mut(id.index()).and_then(|slot| slot.as_mut())
    }

    pub(crate) fn take(&mut self, index: usize) -> Option<RegimentAgent> {
        self.slots.get_mut(index).and_then(|slot| slot.take())
    }

    pub(crate) fn put_back(&mut self, index: usize, agent: RegimentAgent) {
        self.slots[index] = Some(agent);
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut RegimentAgent> {
        self.slots.get_mut(index).and_then(|slot| slot.as_mut())
    }

    /// Mutable access to two distinct slots at once
    pub(crate) fn pair_mut(
        &mut self,
        i: usize,
        j: usize,
    ) -> Option<(&mut RegimentAgent, &mut RegimentAgent)> {
        debug_assert!(i < j);
        let (head, tail) = self.slots.split_at_mut(j);
        match (head[i].as_mut(), tail[0].as_mut()) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }

    pub fn iter_live(&self) -> impl Iterator<Item = &RegimentAgent> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }
}

/// Per-update view handed to the agent being updated
///
/// The agent itself is out of the slab while it holds this, so `agents`
/// never aliases it.
pub(crate) struct WorldCtx<'a> {
    pub grid: &'a mut TileGrid,
    pub agents: &'a mut AgentSlab,
    pub bounds: Rect,
    pub fumble_chance: f64,
}

/// How the battle ended, if it has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    RomanVictory,
    BarbarianVictory,
    MutualAnnihilation,
}

impl std::fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BattleOutcome::RomanVictory => write!(f, "roman victory"),
            BattleOutcome::BarbarianVictory => write!(f, "barbarian victory"),
            BattleOutcome::MutualAnnihilation => write!(f, "mutual annihilation"),
        }
    }
}

pub struct Simulation {
    config: SimConfig,
    grid: TileGrid,
    agents: AgentSlab,
    bounds: Rect,
    cemetery: Vec<Cadaver>,
    tick: Tick,
    /// Seed source for per-agent generators
    rng: ChaCha8Rng,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let world = Vec2::new(config.world_width, config.world_height);
        let grid = TileGrid::new(world, config.tile_size);
        let bounds = Rect::new(0.0, 0.0, config.world_width, config.world_height);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            grid,
            agents: AgentSlab::new(),
            bounds,
            cemetery: Vec::new(),
            tick: 0,
            rng,
        })
    }

    /// Register one forest copse; tiles under it accumulate density.
    pub fn register_copse(&mut self, copse: Circle) {
        self.grid.register_forest(copse);
    }

    /// Deploy a full-strength regiment at `position`
    pub fn spawn_regiment(&mut self, faction: Faction, position: Vec2) -> Result<AgentId> {
        let strength = faction.traits().regiment_size;
        self.spawn_regiment_sized(faction, position, strength)
    }

    /// Deploy a regiment at a chosen headcount (understrength garrisons,
    /// test scenarios)
    pub fn spawn_regiment_sized(
        &mut self,
        faction: Faction,
        position: Vec2,
        strength: u32,
    ) -> Result<AgentId> {
        let coord = self
            .grid
            .point_to_coord(position)
            .ok_or(SimError::SpawnOutOfBounds(position.x, position.y))?;
        if self.grid.occupant(coord).is_some() {
            return Err(SimError::DeploymentBlocked(position.x, position.y));
        }
        let id = AgentId(self.agents.capacity() as u32);
        let seed = self.rng.gen::<u64>();
        let mut agent = RegimentAgent::new_sized(id, faction, position, strength.max(1), seed);
        agent.claim_tile(&mut self.grid);
        debug!(agent = id.0, faction = %faction, strength, "regiment deployed");
        Ok(self.agents.push(agent))
    }

    /// Advance the battle by one tick of `dt_ms` milliseconds.
    pub fn update(&mut self, dt_ms: f32) {
        self.tick += 1;
        let mut blasts: Vec<HornBlast> = Vec::new();
        for index in 0..self.agents.capacity() {
            let mut agent = match self.agents.take(index) {
                Some(agent) => agent,
                None => continue,
            };
            {
                let mut ctx = WorldCtx {
                    grid: &mut self.grid,
                    agents: &mut self.agents,
                    bounds: self.bounds,
                    fumble_chance: self.config.attack_fumble_chance,
                };
                agent.update(&mut ctx, dt_ms);
            }
            agent.bring_out_your_dead(&mut self.cemetery);
            if let Some(blast) = agent.bring_out_your_horn_blast() {
                blasts.push(blast);
            }
            if agent.is_dead() {
                if let Some(tile) = self.grid.tile_mut(agent.tile) {
                    if tile.occupant == Some(agent.id()) {
                        tile.release();
                    }
                }
                info!(agent = agent.id().0, faction = %agent.faction(), "regiment destroyed");
                // slot stays empty for the rest of the battle
            } else {
                self.agents.put_back(index, agent);
            }
        }
        resolve_collisions(&mut self.agents, &self.bounds);
        for blast in blasts {
            self.propagate_horn(blast);
        }
    }

    /// Deliver one blast to every occupied tile whose center lies within the
    /// propagation radius, excluding the source.
    fn propagate_horn(&mut self, blast: HornBlast) {
        let reach = HornBlast::radius();
        let area = Rect::from_center(blast.origin, reach * 2.0, reach * 2.0);
        for coord in self.grid.window(area).coords() {
            let (occupant, center) = match self.grid.tile(coord) {
                Some(tile) => (tile.occupant, tile.center()),
                None => continue,
            };
            let id = match occupant {
                Some(id) if id != blast.source => id,
                _ => continue,
            };
            if center.distance(&blast.origin) > reach {
                continue;
            }
            if let Some(agent) = self.agents.get_mut(id) {
                agent.hear_the_horn(blast);
            }
        }
    }

    /// Move every cadaver accumulated since the last call into `out`
    pub fn collect_cadavers(&mut self, out: &mut Vec<Cadaver>) {
        out.append(&mut self.cemetery);
    }

    // ---- read-only surface ----

    pub fn agent(&self, id: AgentId) -> Option<&RegimentAgent> {
        self.agents.get(id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut RegimentAgent> {
        self.agents.get_mut(id)
    }

    pub fn live_agents(&self) -> impl Iterator<Item = &RegimentAgent> {
        self.agents.iter_live()
    }

    pub fn surviving_strength(&self, faction: Faction) -> u32 {
        self.agents
            .iter_live()
            .filter(|agent| agent.faction() == faction)
            .map(|agent| agent.strength())
            .sum()
    }

    /// `None` while both sides still field soldiers
    pub fn outcome(&self) -> Option<BattleOutcome> {
        let romans = self.surviving_strength(Faction::Roman) > 0;
        let barbarians = self.surviving_strength(Faction::Barbarian) > 0;
        match (romans, barbarians) {
            (true, true) => None,
            (true, false) => Some(BattleOutcome::RomanVictory),
            (false, true) => Some(BattleOutcome::BarbarianVictory),
            (false, false) => Some(BattleOutcome::MutualAnnihilation),
        }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::regiment::State;

    fn sim() -> Simulation {
        Simulation::new(SimConfig::default()).unwrap()
    }

    #[test]
    fn test_spawn_claims_a_tile() {
        let mut sim = sim();
        let id = sim.spawn_regiment(Faction::Roman, Vec2::new(500.0, 500.0)).unwrap();
        let agent = sim.agent(id).unwrap();
        assert_eq!(sim.grid().occupant(agent.tile), Some(id));
        assert_eq!(sim.surviving_strength(Faction::Roman), 36);
    }

    #[test]
    fn test_spawn_rejects_out_of_bounds() {
        let mut sim = sim();
        let err = sim.spawn_regiment(Faction::Roman, Vec2::new(-10.0, 500.0));
        assert!(matches!(err, Err(SimError::SpawnOutOfBounds(_, _))));
    }

    #[test]
    fn test_spawn_rejects_occupied_tile() {
        let mut sim = sim();
        sim.spawn_regiment(Faction::Roman, Vec2::new(500.0, 500.0)).unwrap();
        let err = sim.spawn_regiment(Faction::Roman, Vec2::new(510.0, 510.0));
        assert!(matches!(err, Err(SimError::DeploymentBlocked(_, _))));
    }

    #[test]
    fn test_outcome_tracks_survivors() {
        let mut sim = sim();
        assert_eq!(sim.outcome(), Some(BattleOutcome::MutualAnnihilation));
        let roman = sim.spawn_regiment(Faction::Roman, Vec2::new(500.0, 500.0)).unwrap();
        assert_eq!(sim.outcome(), Some(BattleOutcome::RomanVictory));
        sim.spawn_regiment(Faction::Barbarian, Vec2::new(3000.0, 3000.0)).unwrap();
        assert_eq!(sim.outcome(), None);
        sim.agent_mut(roman).unwrap().kill_soldiers(36);
        assert_eq!(sim.outcome(), Some(BattleOutcome::BarbarianVictory));
    }

    #[test]
    fn test_dead_agent_slot_and_tile_cleared() {
        let mut sim = sim();
        let id = sim.spawn_regiment(Faction::Roman, Vec2::new(500.0, 500.0)).unwrap();
        let tile = sim.agent(id).unwrap().tile;
        sim.agent_mut(id).unwrap().kill_soldiers(36);
        sim.update(100.0);
        assert!(sim.agent(id).is_none());
        assert_eq!(sim.grid().occupant(tile), None);
        let mut cadavers = Vec::new();
        sim.collect_cadavers(&mut cadavers);
        assert_eq!(cadavers.len(), 36);
    }

    #[test]
    fn test_horn_reaches_near_but_not_far() {
        let mut sim = sim();
        let caller = sim.spawn_regiment(Faction::Roman, Vec2::new(3200.0, 3200.0)).unwrap();
        let near = sim.spawn_regiment(Faction::Roman, Vec2::new(3200.0, 3200.0 - 640.0)).unwrap();
        let far = sim.spawn_regiment(Faction::Roman, Vec2::new(3200.0, 3200.0 - 2500.0)).unwrap();
        sim.agent_mut(caller).unwrap().sound_the_horn();
        sim.update(100.0);
        assert!(sim.agent(near).unwrap().heard_horn().is_some());
        assert!(sim.agent(far).unwrap().heard_horn().is_none());
        // the source never hears its own blast
        assert!(sim.agent(caller).unwrap().heard_horn().is_none());
    }

    #[test]
    fn test_tick_counter_advances() {
        let mut sim = sim();
        assert_eq!(sim.tick(), 0);
        sim.update(100.0);
        sim.update(100.0);
        assert_eq!(sim.tick(), 2);
    }

    #[test]
    fn test_heard_horn_triggers_rally() {
        let mut sim = sim();
        let caller = sim.spawn_regiment(Faction::Roman, Vec2::new(3200.0, 3200.0)).unwrap();
        let listener =
            sim.spawn_regiment(Faction::Roman, Vec2::new(3200.0, 3200.0 - 640.0)).unwrap();
        sim.agent_mut(caller).unwrap().sound_the_horn();
        sim.update(100.0);
        // blast lands after the listener's update; the next tick reacts
        sim.update(100.0);
        assert_eq!(sim.agent(listener).unwrap().state(), State::Rallying);
    }
}
