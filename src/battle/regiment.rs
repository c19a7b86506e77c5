//! The regiment agent: perception, state machine, melee, tile claiming
//!
//! One concrete type serves both factions; everything faction-specific comes
//! in through `FactionTraits`. Each agent carries its own seeded generator so
//! combat rolls are reproducible and independent of update order.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::battle::combat::kill_roll;
use crate::battle::constants::{
    ATTACK_INTERVAL_MS, DEFEND_MIN_ALLIES, FLEE_STRENGTH_FRACTION, FRICTION, IDLE_DRIFT_FACTOR,
    MIN_SPEED, PERCEPTION_RADIUS_PX, RALLY_TIMEOUT_MS, SHARING_PUSH, TILE_SIZE_PX,
};
use crate::battle::faction::Faction;
use crate::battle::formation::{Formation, Pose};
use crate::battle::horn::HornBlast;
use crate::battle::simulation::{AgentSlab, WorldCtx};
use crate::core::types::{angle_between, AgentId, Circle, Rect, Vec2};
use crate::spatial::{TileCoord, TileGrid};

/// Behavior state; Rallying, Defending and Escaping are Roman-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Waiting,
    Charging,
    Fighting,
    Fleeing,
    Rallying,
    Defending,
    Escaping,
    Dead,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            State::Waiting => "waiting",
            State::Charging => "charging",
            State::Fighting => "fighting",
            State::Fleeing => "fleeing",
            State::Rallying => "rallying",
            State::Defending => "defending",
            State::Escaping => "escaping",
            State::Dead => "dead",
        };
        write!(f, "{name}")
    }
}

/// A fallen soldier, drained by the host each tick
#[derive(Debug, Clone, Copy)]
pub struct Cadaver {
    pub position: Vec2,
    pub faction: Faction,
}

/// Per-tick snapshot of everything visible from the perception window
///
/// Rebuilt from scratch at the start of every update; squared distances to
/// avoid roots in the hot scan.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Percepts {
    pub nearest_enemy: Option<(AgentId, f32)>,
    pub nearest_ally: Option<(AgentId, f32)>,
    pub nearest_active_ally: Option<(AgentId, f32)>,
    pub visible_enemy_strength: u32,
    pub visible_ally_strength: u32,
    /// Inverse-distance-weighted sum of directions away from visible enemies
    pub enemy_pressure: Vec2,
    /// Density-weighted sum of directions away from forested tiles
    pub forest_repulsion: Vec2,
    /// Whether the agent's own tile is forested
    pub in_forest: bool,
}

impl Percepts {
    /// Visible enemy strength minus visible ally strength
    pub fn threat(&self) -> i64 {
        self.visible_enemy_strength as i64 - self.visible_ally_strength as i64
    }
}

pub struct RegimentAgent {
    pub(crate) id: AgentId,
    pub(crate) faction: Faction,
    pub(crate) circle: Circle,
    pub(crate) direction: Vec2,
    pub(crate) left: Vec2,
    /// Displacement applied at the next integration, pixels
    pub(crate) speed: Vec2,
    pub(crate) strength: u32,
    pub(crate) initial_strength: u32,
    pub(crate) state: State,
    attack_recharge_ms: f32,
    /// Casualties dealt by other agents this tick, applied at the start of
    /// this agent's own update
    pub(crate) hits_to_take: u32,
    pub(crate) combat: Vec<AgentId>,
    pub(crate) allies: Vec<AgentId>,
    pub(crate) tile: TileCoord,
    pub(crate) sharing_tile: bool,
    pub(crate) formation: Formation,
    formation_seed: u64,
    pub(crate) percepts: Percepts,
    dead_pile: Vec<Cadaver>,
    queued_horn: Option<HornBlast>,
    sounded_horn: Option<HornBlast>,
    heard_horn: Option<HornBlast>,
    rally_point: Vec2,
    rally_timer_ms: f32,
    pub(crate) rng: ChaCha8Rng,
}

impl RegimentAgent {
    pub(crate) fn new(id: AgentId, faction: Faction, position: Vec2, seed: u64) -> Self {
        Self::new_sized(id, faction, position, faction.traits().regiment_size, seed)
    }

    pub(crate) fn new_sized(
        id: AgentId,
        faction: Faction,
        position: Vec2,
        strength: u32,
        seed: u64,
    ) -> Self {
        let direction = Vec2::new(0.0, -1.0);
        let mut agent = Self {
            id,
            faction,
            circle: Circle::new(position, 0.0),
            direction,
            left: direction.left(),
            speed: Vec2::ZERO,
            strength,
            initial_strength: strength,
            state: State::Waiting,
            attack_recharge_ms: 0.0,
            hits_to_take: 0,
            combat: Vec::new(),
            allies: Vec::new(),
            // off-grid sentinel, replaced by the first tile claim
            tile: TileCoord::new(-1, -1),
            sharing_tile: false,
            formation: faction.create_formation(seed),
            formation_seed: seed,
            percepts: Percepts::default(),
            dead_pile: Vec::new(),
            queued_horn: None,
            sounded_horn: None,
            heard_horn: None,
            rally_point: Vec2::ZERO,
            rally_timer_ms: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        agent.reform();
        agent
    }

    // ---- read-only surface ----

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn position(&self) -> Vec2 {
        self.circle.center
    }

    pub fn radius(&self) -> f32 {
        self.circle.radius
    }

    pub fn strength(&self) -> u32 {
        self.strength
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state == State::Dead || self.strength == 0
    }

    pub fn formed_up(&self) -> bool {
        self.formation.is_turtle()
    }

    /// Tile this regiment has claimed (or stands on while sharing)
    pub fn tile(&self) -> TileCoord {
        self.tile
    }

    /// Whether the regiment is in the degraded mode of standing on another
    /// regiment's tile
    pub fn is_sharing_tile(&self) -> bool {
        self.sharing_tile
    }

    /// World position of soldier `index` within the current formation
    pub fn soldier_position(&self, index: usize) -> Option<Vec2> {
        self.formation.soldier_position(index)
    }

    fn pose(&self) -> Pose {
        Pose { position: self.circle.center, direction: self.direction, left: self.left }
    }

    // ---- tick entry point ----

    pub(crate) fn update(&mut self, ctx: &mut WorldCtx<'_>, dt_ms: f32) {
        let pending = std::mem::take(&mut self.hits_to_take);
        if pending > 0 {
            self.kill_soldiers(pending);
        }
        if self.is_dead() {
            self.state = State::Dead;
            return;
        }
        if self.attack_recharge_ms > 0.0 {
            self.attack_recharge_ms -= dt_ms;
        }
        self.cache_percepts(ctx.grid, ctx.agents);
        self.refresh_contacts(ctx.grid, ctx.agents);
        self.run_ai(ctx, dt_ms);
        if self.is_dead() {
            // fully requisitioned mid-flight
            self.state = State::Dead;
            return;
        }
        if self.sharing_tile {
            self.nudge_blocker(ctx);
        }
        self.integrate(ctx);
        self.decay_horns(dt_ms);
    }

    // ---- perception ----

    fn cache_percepts(&mut self, grid: &TileGrid, agents: &AgentSlab) {
        let mut p = Percepts {
            in_forest: grid.tile(self.tile).map_or(false, |t| t.in_forest()),
            ..Percepts::default()
        };
        let reach = PERCEPTION_RADIUS_PX;
        let area = Rect::from_center(self.position(), reach * 2.0, reach * 2.0);
        let blind = self.faction.traits().forest_blind_when_idle
            && self.state == State::Waiting
            && self.heard_horn.is_none();
        for coord in grid.window(area).coords() {
            let tile = match grid.tile(coord) {
                Some(tile) => tile,
                None => continue,
            };
            if tile.in_forest() {
                let away = self.position() - tile.center();
                p.forest_repulsion += away * (tile.forest / away.length_squared().max(1.0));
            }
            let id = match tile.occupant {
                Some(id) if id != self.id => id,
                _ => continue,
            };
            let other = match agents.get(id) {
                Some(other) if !other.is_dead() => other,
                _ => continue,
            };
            let d2 = self.position().distance_squared(&other.position());
            if self.faction.is_enemy(other.faction) {
                if blind && tile.in_forest() {
                    continue;
                }
                p.visible_enemy_strength += other.strength;
                let away = self.position() - other.position();
                p.enemy_pressure += away * (1.0 / away.length_squared().max(1.0));
                if p.nearest_enemy.map_or(true, |(_, best)| d2 < best) {
                    p.nearest_enemy = Some((id, d2));
                }
            } else {
                p.visible_ally_strength += other.strength;
                if p.nearest_ally.map_or(true, |(_, best)| d2 < best) {
                    p.nearest_ally = Some((id, d2));
                }
                if matches!(other.state, State::Charging | State::Fighting)
                    && p.nearest_active_ally.map_or(true, |(_, best)| d2 < best)
                {
                    p.nearest_active_ally = Some((id, d2));
                }
            }
        }
        self.percepts = p;
    }

    /// Contact sets from the adjacent tiles, pruned to live overlapping agents
    fn refresh_contacts(&mut self, grid: &TileGrid, agents: &AgentSlab) {
        let me = self.circle;
        let still_touching = |id: &AgentId| {
            agents.get(*id).map_or(false, |a| !a.is_dead() && a.circle.overlaps(&me))
        };
        self.combat.retain(still_touching);
        self.allies.retain(still_touching);

        let mut coords = grid.neighbors(self.tile, true);
        coords.push(self.tile);
        for coord in coords {
            let id = match grid.occupant(coord) {
                Some(id) if id != self.id => id,
                _ => continue,
            };
            let other = match agents.get(id) {
                Some(other) if !other.is_dead() && other.circle.overlaps(&me) => other,
                _ => continue,
            };
            if self.faction.is_enemy(other.faction) {
                if !self.combat.contains(&id) {
                    self.combat.push(id);
                }
            } else if !self.allies.contains(&id) {
                self.allies.push(id);
            }
        }
    }

    // ---- state machine ----

    fn run_ai(&mut self, ctx: &mut WorldCtx<'_>, dt_ms: f32) {
        // a rout preempts whatever the regiment was doing, and being in
        // contact preempts the rout
        if self.state != State::Fleeing
            && self.strength < self.initial_strength / FLEE_STRENGTH_FRACTION
        {
            self.start_fleeing();
        }
        if !self.combat.is_empty() && self.state != State::Fighting {
            self.start_fighting();
        }
        match self.state {
            State::Waiting => self.act_waiting(ctx, dt_ms),
            State::Charging => self.act_charging(ctx, dt_ms),
            State::Fighting => self.act_fighting(ctx),
            State::Fleeing => self.act_fleeing(ctx, dt_ms),
            State::Rallying => self.act_rallying(dt_ms),
            State::Defending => self.act_defending(ctx),
            State::Escaping => self.act_escaping(dt_ms),
            State::Dead => {}
        }
    }

    fn start_fleeing(&mut self) {
        debug!(agent = self.id.0, faction = %self.faction, "regiment breaks and flees");
        self.set_formed_up(false);
        if self.faction == Faction::Roman {
            self.sound_the_horn();
        }
        self.state = State::Fleeing;
    }

    fn start_fighting(&mut self) {
        if self.faction == Faction::Roman {
            self.sound_the_horn();
        }
        self.state = State::Fighting;
    }

    fn start_charging(&mut self) {
        debug!(
            agent = self.id.0,
            faction = %self.faction,
            threat = self.percepts.threat(),
            "charging"
        );
        // an ambusher bursting from the trees calls the rest of the warband
        if self.faction == Faction::Barbarian && self.percepts.in_forest {
            self.sound_the_horn();
        }
        self.state = State::Charging;
    }

    fn act_waiting(&mut self, ctx: &mut WorldCtx<'_>, dt_ms: f32) {
        if self.percepts.nearest_enemy.is_some() {
            self.start_charging();
            return;
        }
        if self.faction == Faction::Roman {
            if self.formed_neighbors(ctx.agents) >= DEFEND_MIN_ALLIES {
                self.state = State::Defending;
                return;
            }
            if let Some(blast) = self.heard_horn {
                self.rally_point = blast.origin;
                self.rally_timer_ms = RALLY_TIMEOUT_MS;
                self.state = State::Rallying;
                return;
            }
        }
        // drift toward the action; a lone regiment holds its ground
        if let Some((ally, _)) = self.percepts.nearest_active_ally {
            if let Some(other) = ctx.agents.get(ally) {
                let to = other.position() - self.position();
                self.turn_towards(to, dt_ms);
                if self.facing(to) {
                    let step = self.faction.traits().speed_factor * dt_ms * IDLE_DRIFT_FACTOR;
                    self.advance(step);
                }
            }
        }
    }

    fn act_charging(&mut self, ctx: &mut WorldCtx<'_>, dt_ms: f32) {
        let (enemy, d2) = match self.percepts.nearest_enemy {
            Some(found) => found,
            None => {
                self.state = State::Waiting;
                return;
            }
        };
        let target = match ctx.agents.get(enemy) {
            Some(other) => other.position(),
            None => {
                self.state = State::Waiting;
                return;
            }
        };
        let to = target - self.position();
        self.turn_towards(to, dt_ms);
        if self.facing(to) {
            // press on toward the target's center rather than stopping at
            // the rim; the resulting overlap is what enlists the fight
            let step = self.faction.traits().speed_factor * dt_ms;
            self.advance(step.min(d2.sqrt()));
        }
    }

    fn act_fighting(&mut self, ctx: &mut WorldCtx<'_>) {
        if self.combat.is_empty() {
            self.state = State::Waiting;
            return;
        }
        if self.attack_recharge_ms <= 0.0 {
            self.random_attack(ctx);
            self.attack_recharge_ms = ATTACK_INTERVAL_MS / self.strength.max(1) as f32;
        }
    }

    fn act_fleeing(&mut self, ctx: &mut WorldCtx<'_>, dt_ms: f32) {
        if self.percepts.nearest_enemy.is_none() {
            self.state = State::Waiting;
            return;
        }
        self.try_requisition(ctx);
        if self.is_dead() {
            return;
        }
        let mut desired = self.percepts.enemy_pressure;
        if desired.normalize() == Vec2::ZERO {
            if let Some((ally, _)) = self.percepts.nearest_ally {
                if let Some(other) = ctx.agents.get(ally) {
                    desired = other.position() - self.position();
                }
            }
        }
        self.turn_towards(desired, dt_ms);
        // run flat out even before the turn completes
        self.advance(self.faction.traits().speed_factor * dt_ms);
    }

    fn act_rallying(&mut self, dt_ms: f32) {
        if self.percepts.nearest_enemy.is_some() {
            self.start_charging();
            return;
        }
        self.rally_timer_ms -= dt_ms;
        if self.rally_timer_ms <= 0.0 {
            self.state = State::Escaping;
            return;
        }
        let to = self.rally_point - self.position();
        if to.length() < TILE_SIZE_PX {
            self.state = State::Waiting;
            return;
        }
        self.turn_towards(to, dt_ms);
        if self.facing(to) {
            self.advance(self.faction.traits().speed_factor * dt_ms);
        }
    }

    fn act_defending(&mut self, ctx: &mut WorldCtx<'_>) {
        if self.percepts.nearest_enemy.is_some() {
            self.start_charging();
            return;
        }
        if !self.formed_up() {
            self.set_formed_up(true);
        }
        if self.formed_neighbors(ctx.agents) < DEFEND_MIN_ALLIES {
            self.state = State::Waiting;
        }
    }

    /// Touching allies that are holding formation
    fn formed_neighbors(&self, agents: &AgentSlab) -> usize {
        self.allies
            .iter()
            .filter(|id| agents.get(**id).map_or(false, |a| a.formed_up()))
            .count()
    }

    fn act_escaping(&mut self, dt_ms: f32) {
        if self.percepts.nearest_enemy.is_some() {
            self.start_charging();
            return;
        }
        // north edge, bending away from the trees
        let desired = Vec2::new(0.0, -1.0) + self.percepts.forest_repulsion;
        self.turn_towards(desired, dt_ms);
        if self.facing(desired) {
            self.advance(self.faction.traits().speed_factor * dt_ms);
        }
    }

    // ---- steering and physics ----

    fn turn_towards(&mut self, desired: Vec2, dt_ms: f32) {
        let desired = desired.normalize();
        if desired == Vec2::ZERO {
            return;
        }
        let traits = self.faction.traits();
        let cap = if self.formed_up() { traits.max_turn_formed } else { traits.max_turn_unformed };
        let angle = angle_between(self.direction, desired).min(cap * dt_ms);
        let sign = if self.direction.cross(&desired) < 0.0 { -1.0 } else { 1.0 };
        self.direction = self.direction.rotated(sign * angle).normalize();
        self.left = self.direction.left();
    }

    fn facing(&self, desired: Vec2) -> bool {
        angle_between(self.direction, desired) < 0.5
    }

    /// Set this tick's propulsion; collision impulses land on top after the
    /// global pass and decay under friction once propulsion stops.
    fn advance(&mut self, distance: f32) {
        self.speed = self.direction * distance;
    }

    fn integrate(&mut self, ctx: &mut WorldCtx<'_>) {
        if self.speed != Vec2::ZERO {
            self.circle.center = ctx.bounds.clamp_point(self.circle.center + self.speed);
            self.claim_tile(ctx.grid);
            self.formation.reposition(&self.pose());
        }
        self.speed = self.speed * FRICTION;
        if self.speed.length() < MIN_SPEED {
            self.speed = Vec2::ZERO;
        }
    }

    // ---- tile occupancy ----

    /// Claim the tile under the agent's center; on conflict fall back to a
    /// free neighbor, and failing that enter the degraded sharing mode.
    pub(crate) fn claim_tile(&mut self, grid: &mut TileGrid) {
        let old = self.tile;
        let coord = match grid.point_to_coord(self.position()) {
            Some(coord) => coord,
            None => return,
        };
        if coord == old && !self.sharing_tile {
            return;
        }
        if let Some(tile) = grid.tile_mut(coord) {
            if tile.try_claim(self.id) {
                self.settle_on(grid, old, coord);
                return;
            }
        }
        for neighbor in grid.neighbors(coord, true) {
            let free = grid.tile(neighbor).map_or(false, |t| t.occupant.is_none());
            if free {
                if let Some(tile) = grid.tile_mut(neighbor) {
                    tile.try_claim(self.id);
                }
                self.settle_on(grid, old, neighbor);
                return;
            }
        }
        // every candidate taken: stand on the occupied tile and keep nudging
        if coord != old {
            self.release_owned(grid, old);
        }
        self.tile = coord;
        self.sharing_tile = true;
    }

    fn settle_on(&mut self, grid: &mut TileGrid, old: TileCoord, new: TileCoord) {
        if new != old {
            self.release_owned(grid, old);
        }
        self.tile = new;
        self.sharing_tile = false;
    }

    fn release_owned(&self, grid: &mut TileGrid, coord: TileCoord) {
        if let Some(tile) = grid.tile_mut(coord) {
            if tile.occupant == Some(self.id) {
                tile.release();
            }
        }
    }

    fn nudge_blocker(&self, ctx: &mut WorldCtx<'_>) {
        let id = match ctx.grid.occupant(self.tile) {
            Some(id) if id != self.id => id,
            _ => return,
        };
        if let Some(other) = ctx.agents.get_mut(id) {
            other.speed += (other.position() - self.position()) * SHARING_PUSH;
        }
    }

    // ---- melee ----

    /// One simultaneous exchange with a random member of the in-combat set
    ///
    /// Both kill counts come from the two sides' own generators and are
    /// computed before either is applied; the opponent's casualties are
    /// queued and land at the start of its own update.
    fn random_attack(&mut self, ctx: &mut WorldCtx<'_>) {
        let pick = self.rng.gen_range(0..self.combat.len());
        let target = self.combat[pick];
        let fumble = ctx.fumble_chance;
        let my_traits = self.faction.traits();
        let kills_taken = {
            let defender = match ctx.agents.get_mut(target) {
                Some(defender) if !defender.is_dead() => defender,
                _ => return,
            };
            let attack_dir = (defender.position() - self.position()).normalize();
            let defender_block = defender.chance_to_block(attack_dir);
            let kills_dealt =
                kill_roll(&mut self.rng, my_traits.hit_chance, defender_block, fumble);
            defender.hits_to_take += kills_dealt;
            // the defender strikes back only if its own timer is ready, and
            // that consumes its readiness
            if defender.attack_recharge_ms <= 0.0 {
                let my_block = self.chance_to_block(-attack_dir);
                let kills = kill_roll(
                    &mut defender.rng,
                    defender.faction.traits().hit_chance,
                    my_block,
                    fumble,
                );
                defender.attack_recharge_ms =
                    ATTACK_INTERVAL_MS / defender.strength.max(1) as f32;
                kills
            } else {
                0
            }
        };
        self.kill_soldiers(kills_taken);
    }

    /// Block chance against an attack travelling along `attack_dir`
    ///
    /// A turtle holds its high block only against the front; a flank or rear
    /// hit gets the loose chance and breaks the square open.
    fn chance_to_block(&mut self, attack_dir: Vec2) -> f64 {
        let traits = self.faction.traits();
        if self.formed_up() {
            let facing_deg = angle_between(self.direction, attack_dir).to_degrees();
            if facing_deg >= traits.frontal_arc_deg {
                return traits.block_chance_formed;
            }
            self.set_formed_up(false);
        }
        traits.block_chance_unformed
    }

    /// Remove `count` soldiers from the trailing formation slots
    ///
    /// Returns true when the regiment is wiped out. Survivors re-form and
    /// the attack recharge is rescaled to the reduced headcount. Public so a
    /// host can apply scripted attrition (off-map artillery, disease).
    pub fn kill_soldiers(&mut self, count: u32) -> bool {
        let count = count.min(self.strength);
        if count == 0 {
            return false;
        }
        for i in 0..count {
            let slot = (self.strength - 1 - i) as usize;
            if let Some(position) = self.formation.soldier_position(slot) {
                self.dead_pile.push(Cadaver { position, faction: self.faction });
            }
        }
        self.strength -= count;
        if self.strength == 0 {
            self.state = State::Dead;
            return true;
        }
        self.reform();
        let interval = ATTACK_INTERVAL_MS / self.strength as f32;
        self.attack_recharge_ms = self.attack_recharge_ms.min(interval);
        false
    }

    fn reform(&mut self) {
        let radius = self.formation.rebuild(self.strength, &self.pose());
        self.circle.radius = radius;
    }

    /// Swap between turtle and rabble, keeping the jitter seed stable
    fn set_formed_up(&mut self, formed: bool) {
        if formed == self.formed_up() {
            return;
        }
        self.formation =
            if formed { Formation::turtle() } else { Formation::rabble(self.formation_seed) };
        self.reform();
    }

    /// A stronger non-fleeing ally in contact absorbs a routing regiment's
    /// remaining soldiers, up to the ally's initial-strength cap.
    fn try_requisition(&mut self, ctx: &mut WorldCtx<'_>) {
        let candidate = self.allies.iter().copied().find(|id| {
            ctx.agents.get(*id).map_or(false, |a| {
                !a.is_dead()
                    && a.state != State::Fleeing
                    && a.strength > self.strength
                    && a.circle.overlaps(&self.circle)
            })
        });
        let ally_id = match candidate {
            Some(id) => id,
            None => return,
        };
        if let Some(ally) = ctx.agents.get_mut(ally_id) {
            let room = ally.initial_strength.saturating_sub(ally.strength);
            let transfer = room.min(self.strength);
            if transfer == 0 {
                return;
            }
            ally.strength += transfer;
            ally.reform();
            self.strength -= transfer;
            debug!(
                from = self.id.0,
                into = ally_id.0,
                transfer,
                "routing regiment requisitioned"
            );
            if self.strength == 0 {
                // absorbed whole, no cadavers
                self.state = State::Dead;
            } else {
                self.reform();
            }
        }
    }

    // ---- horn signalling ----

    /// Queue a blast unless one is already queued or still sounding
    pub fn sound_the_horn(&mut self) {
        if self.queued_horn.is_none() && self.sounded_horn.is_none() {
            debug!(agent = self.id.0, faction = %self.faction, "horn sounded");
            self.queued_horn = Some(HornBlast::new(self.position(), self.id));
        }
    }

    /// Hand the queued blast to the host for propagation
    pub fn bring_out_your_horn_blast(&mut self) -> Option<HornBlast> {
        let blast = self.queued_horn.take();
        if let Some(b) = blast {
            self.sounded_horn = Some(b);
        }
        blast
    }

    /// Receive a blast; own echoes are ignored, a newer blast replaces older
    pub fn hear_the_horn(&mut self, blast: HornBlast) {
        if blast.source != self.id {
            self.heard_horn = Some(blast);
        }
    }

    pub fn heard_horn(&self) -> Option<&HornBlast> {
        self.heard_horn.as_ref()
    }

    /// Move this tick's casualties into `out`
    pub fn bring_out_your_dead(&mut self, out: &mut Vec<Cadaver>) {
        out.append(&mut self.dead_pile);
    }

    fn decay_horns(&mut self, dt_ms: f32) {
        for slot in [&mut self.sounded_horn, &mut self.heard_horn] {
            if let Some(blast) = slot {
                blast.decay(dt_ms);
                if !blast.is_audible() {
                    *slot = None;
                }
            }
        }
    }
}

impl std::fmt::Debug for RegimentAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegimentAgent")
            .field("id", &self.id)
            .field("faction", &self.faction)
            .field("state", &self.state)
            .field("strength", &self.strength)
            .field("position", &self.circle.center)
            .finish()
    }
}
