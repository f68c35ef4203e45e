//! Public API for the simulation core.
//!
//! [`SimWorld`] owns the agents, the grid and the RNG stream. A host clock
//! calls [`SimWorld::advance_step`] at a fixed interval; a presentation layer
//! reads [`Snapshot`]s and subscribes to death / attack-impact events. One
//! `advance_step` call is one atomic logical tick: nothing inside it yields,
//! and agents are processed in spawn (roster) order, which is the only
//! tie-break for contested cells and contested targets.

use bevy_ecs::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

use crate::components::{
    AgentId, AgentState, AttackCooldown, Cell, CombatState, Health, PhaseClock, Position, Team,
};
use crate::config::{GridKind, SimConfig, SimError};
use crate::events::{Observers, SimEvent, SubscriptionId};
use crate::geometry::{Coord, GridGeometry, HexGrid, SquareGrid};
use crate::grid::GridManager;
use crate::pathfinding::find_path;
use crate::world::Snapshot;

/// Damage dealt by one landed attack.
const DAMAGE_PER_ATTACK: i32 = 1;
/// Seconds an agent must wait between issuing attacks.
const ATTACK_COOLDOWN: f32 = 0.7;
/// Pre-swing pause before the strike starts.
const PRE_SWING_DURATION: f32 = 1.0;
/// Duration of the strike itself; impact fires when it completes.
const STRIKE_DURATION: f32 = 0.5;
/// World units per second while traversing a tile.
const MOVE_SPEED: f32 = 130.0;
/// Spawn hit-point range, inclusive.
const SPAWN_HP_MIN: i32 = 2;
const SPAWN_HP_MAX: i32 = 5;

/// The simulation world: agent arena, grid state, observers and RNG.
pub struct SimWorld {
    world: World,
    grid: GridManager,
    /// Living-agent roster in spawn order; the deterministic processing
    /// order within a tick.
    roster: Vec<Entity>,
    observers: Observers,
    rng: ChaCha8Rng,
    config: SimConfig,
    next_agent_id: u32,
    tick: u64,
}

impl SimWorld {
    /// Build a simulation from a validated configuration, seed the RNG and
    /// spawn both teams at random free cells.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let geometry: Box<dyn GridGeometry> = match config.grid_kind {
            GridKind::Square => Box::new(SquareGrid::new(config.grid_size, config.tile_size)),
            GridKind::Hex => Box::new(HexGrid::new(config.grid_size, config.tile_size)),
        };

        let mut sim = Self {
            world: World::new(),
            grid: GridManager::new(geometry, config.grid_origin),
            roster: Vec::new(),
            observers: Observers::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            next_agent_id: 0,
            tick: 0,
        };

        sim.spawn_all_agents();
        tracing::debug!(
            seed = sim.config.seed,
            agents = sim.roster.len(),
            "simulation initialized"
        );
        Ok(sim)
    }

    /// Advance one logical tick.
    ///
    /// A no-op once either team has no living member; match-end detection is
    /// the business of an external observer watching that condition.
    pub fn advance_step(&mut self) {
        if self.living_agents(Team::Red) == 0 || self.living_agents(Team::Blue) == 0 {
            return;
        }

        self.prune_dead_agents();

        // Cells occupied at tick start. Nobody may plan a path through them
        // this tick; an agent's own cell and its target's cell are carved
        // back out per path request.
        let temp_unwalkable: HashSet<Coord> = self
            .roster
            .iter()
            .filter_map(|&agent| self.grid.current_cell_for(agent))
            .collect();

        for i in 0..self.roster.len() {
            let agent = self.roster[i];
            if !self.is_alive(agent) {
                continue;
            }
            if !self.simulate_attack(agent) {
                self.simulate_movement(agent, &temp_unwalkable);
            }
        }

        self.advance_clocks();

        self.tick += 1;
    }

    /// Unsubscribe every observer and destroy all remaining agents.
    /// Idempotent.
    pub fn clean_up(&mut self) {
        self.observers.clear();
        for agent in self.roster.drain(..) {
            self.world.despawn(agent);
        }
        self.grid.clear();
    }

    // ------------------------------------------------------------------
    // Observation surface
    // ------------------------------------------------------------------

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Number of living agents on a team.
    pub fn living_agents(&self, team: Team) -> usize {
        self.roster
            .iter()
            .filter(|&&agent| {
                self.is_alive(agent) && self.world.get::<Team>(agent) == Some(&team)
            })
            .count()
    }

    /// Snapshot of the current state, agents sorted by id.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick)
    }

    /// Snapshot serialized to JSON.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Subscribe to death / attack-impact notifications.
    pub fn subscribe(&mut self, callback: impl FnMut(&SimEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Read access to the agent arena (the presentation layer must not
    /// mutate simulation state).
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn roster(&self) -> &[Entity] {
        &self.roster
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    /// Spawn a single agent at a fixed cell with fixed hit points. Intended
    /// for scripted scenarios; randomized team spawning happens in `new`.
    pub fn spawn_agent_at(&mut self, team: Team, cell: Coord, hp: i32) -> Entity {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;

        let (x, y) = self.grid.grid_to_world(cell);
        let agent = self
            .world
            .spawn((
                id,
                team,
                Position::new(x, y),
                Cell(cell),
                Health::new(hp),
                AgentState::Idle,
                CombatState::default(),
                AttackCooldown::elapsed(ATTACK_COOLDOWN),
                PhaseClock::default(),
            ))
            .id();

        self.grid.register_agent(agent, cell);
        self.roster.push(agent);
        agent
    }

    fn spawn_all_agents(&mut self) {
        let grid_size = self.config.grid_size;
        let max_attempts = 2 * grid_size * grid_size;
        let mut occupied: HashSet<Coord> = HashSet::new();

        for team in [Team::Red, Team::Blue] {
            let mut spawned = 0;
            while spawned < self.config.agents_per_team {
                let mut found = None;
                for _ in 0..max_attempts {
                    let cell = Coord::new(
                        self.rng.gen_range(0..grid_size),
                        self.rng.gen_range(0..grid_size),
                    );
                    if !occupied.contains(&cell) {
                        found = Some(cell);
                        break;
                    }
                }

                let Some(cell) = found else {
                    tracing::warn!(
                        ?team,
                        spawned,
                        requested = self.config.agents_per_team,
                        "no free spawn cell found within attempt budget, team under strength"
                    );
                    break;
                };

                occupied.insert(cell);
                let hp = self.rng.gen_range(SPAWN_HP_MIN..=SPAWN_HP_MAX);
                self.spawn_agent_at(team, cell, hp);
                spawned += 1;
            }
        }
    }

    // ------------------------------------------------------------------
    // Per-tick decisions
    // ------------------------------------------------------------------

    fn is_alive(&self, agent: Entity) -> bool {
        self.world
            .get::<Health>(agent)
            .is_some_and(Health::is_alive)
    }

    fn prune_dead_agents(&mut self) {
        let world = &self.world;
        let (keep, drop): (Vec<Entity>, Vec<Entity>) = self
            .roster
            .iter()
            .copied()
            .partition(|&agent| world.get::<Health>(agent).is_some_and(Health::is_alive));

        for agent in drop {
            self.world.despawn(agent);
        }
        self.roster = keep;
    }

    /// Attack an adjacent living enemy if possible. Returns true when an
    /// attack was issued (the agent then skips movement this tick).
    fn simulate_attack(&mut self, agent: Entity) -> bool {
        let Some(&state) = self.world.get::<AgentState>(agent) else {
            return false;
        };
        let off_cooldown = self
            .world
            .get::<AttackCooldown>(agent)
            .is_some_and(|cd| cd.is_ready(ATTACK_COOLDOWN));
        if state != AgentState::Idle || !off_cooldown {
            return false;
        }

        let Some(&my_team) = self.world.get::<Team>(agent) else {
            return false;
        };
        let Some(my_cell) = self.grid.current_cell_for(agent) else {
            return false;
        };

        // Partition order is canonical, so "first enemy found" is stable.
        for other in self.grid.neighbouring_agents(my_cell) {
            if !self.is_alive(other) {
                continue;
            }
            if self.world.get::<Team>(other) != Some(&my_team) {
                return self.try_attack(agent, other);
            }
        }

        false
    }

    /// Queue the target, arm pending damage and enter the pre-swing windup.
    fn try_attack(&mut self, attacker: Entity, target: Entity) -> bool {
        if !self.is_alive(target) {
            return false;
        }

        if let Some(mut combat) = self.world.get_mut::<CombatState>(attacker) {
            combat.queued_target = Some(target);
            combat.pending_damage = DAMAGE_PER_ATTACK;
        }
        if let Some(mut cooldown) = self.world.get_mut::<AttackCooldown>(attacker) {
            cooldown.reset();
        }
        self.enter_phase(attacker, AgentState::WaitingForCombat, PRE_SWING_DURATION);
        true
    }

    /// Step one cell toward the nearest living enemy, if any.
    fn simulate_movement(&mut self, agent: Entity, temp_unwalkable: &HashSet<Coord>) {
        if self.world.get::<AgentState>(agent) != Some(&AgentState::Idle) {
            return;
        }

        let Some(enemy) = self.find_closest_enemy(agent) else {
            return;
        };
        let (Some(my_cell), Some(enemy_cell)) = (
            self.grid.current_cell_for(agent),
            self.grid.current_cell_for(enemy),
        ) else {
            return;
        };

        // Both endpoints must stay walkable so an adjacent goal is always
        // reachable; everyone else's tick-start cell is a wall.
        let mut local_unwalkable = temp_unwalkable.clone();
        local_unwalkable.remove(&my_cell);
        local_unwalkable.remove(&enemy_cell);

        let previous_cell = self.grid.previous_cell_for(agent);
        let path = find_path(
            my_cell,
            enemy_cell,
            self.grid.geometry(),
            previous_cell,
            Some(&local_unwalkable),
        );

        let Some(&next_cell) = path.get(1) else {
            tracing::debug!(?my_cell, ?enemy_cell, "no path to enemy this tick");
            return;
        };

        // Commit-time re-check. The step must land on the board (the
        // reversal penalty can steer an edge agent's cheapest route through
        // off-grid cells, since neighbor enumeration is not bounds-filtered)
        // and the cell must still be free: an agent processed earlier this
        // tick may have reserved it already. Either way, hold position and
        // let the approaching enemy come to us.
        if !self.grid.is_valid_cell(next_cell) || self.grid.is_occupied(next_cell) {
            return;
        }

        self.grid.update_agent_cell(agent, next_cell);
        let (x, y) = self.grid.grid_to_world(next_cell);
        if let Some(mut pos) = self.world.get_mut::<Position>(agent) {
            pos.x = x;
            pos.y = y;
        }
        if let Some(mut cell) = self.world.get_mut::<Cell>(agent) {
            cell.0 = next_cell;
        }
        self.enter_phase(agent, AgentState::Moving, self.config.tile_size / MOVE_SPEED);
    }

    /// Expanding-ring search: the smallest disk radius containing any living
    /// enemy wins, then the Euclidean-closest enemy within it.
    fn find_closest_enemy(&self, seeker: Entity) -> Option<Entity> {
        let &my_team = self.world.get::<Team>(seeker)?;
        let my_cell = self.grid.current_cell_for(seeker)?;
        let my_pos = *self.world.get::<Position>(seeker)?;

        let mut closest: Option<(Entity, f32)> = None;
        for radius in 1..=self.grid.grid_size() {
            for other in self.grid.surrounding_agents(my_cell, radius) {
                if other == seeker || !self.is_alive(other) {
                    continue;
                }
                if self.world.get::<Team>(other) == Some(&my_team) {
                    continue;
                }
                let Some(pos) = self.world.get::<Position>(other) else {
                    continue;
                };
                let dist_sq = my_pos.distance_squared_to(pos);
                if closest.is_none_or(|(_, best)| dist_sq < best) {
                    closest = Some((other, dist_sq));
                }
            }
            if closest.is_some() {
                break;
            }
        }

        closest.map(|(enemy, _)| enemy)
    }

    // ------------------------------------------------------------------
    // Clocks, impacts and death
    // ------------------------------------------------------------------

    fn enter_phase(&mut self, agent: Entity, state: AgentState, duration: f32) {
        if let Some(mut current) = self.world.get_mut::<AgentState>(agent) {
            *current = state;
        }
        if let Some(mut clock) = self.world.get_mut::<PhaseClock>(agent) {
            clock.remaining = duration;
        }
    }

    /// Advance every agent's timers by one step interval. Phase durations
    /// are fixed wall-clock amounts; leftover tick time carries across phase
    /// boundaries, so a short swing can wind up, strike and land inside a
    /// single long tick.
    fn advance_clocks(&mut self) {
        let dt = self.config.step_interval;
        let agents: Vec<Entity> = self.roster.clone();

        for agent in agents {
            if !self.is_alive(agent) {
                continue;
            }
            if let Some(mut cooldown) = self.world.get_mut::<AttackCooldown>(agent) {
                cooldown.advance(dt);
            }

            let mut budget = dt;
            while budget > 0.0 {
                let Some(&state) = self.world.get::<AgentState>(agent) else {
                    break;
                };
                if !matches!(
                    state,
                    AgentState::Moving | AgentState::WaitingForCombat | AgentState::InCombat
                ) {
                    break;
                }

                let remaining = self
                    .world
                    .get::<PhaseClock>(agent)
                    .map_or(0.0, |clock| clock.remaining);
                if remaining > budget {
                    if let Some(mut clock) = self.world.get_mut::<PhaseClock>(agent) {
                        clock.remaining -= budget;
                    }
                    break;
                }
                budget -= remaining;

                match state {
                    AgentState::Moving => {
                        self.enter_phase(agent, AgentState::Idle, 0.0);
                    }
                    AgentState::WaitingForCombat => {
                        self.enter_phase(agent, AgentState::InCombat, STRIKE_DURATION);
                    }
                    AgentState::InCombat => {
                        self.enter_phase(agent, AgentState::Idle, 0.0);
                        self.resolve_attack_impact(agent);
                    }
                    _ => break,
                }
            }
        }
    }

    /// The strike landed: apply the armed damage to the queued target, then
    /// notify observers. Dropped silently if either side died in the
    /// meantime.
    fn resolve_attack_impact(&mut self, attacker: Entity) {
        if !self.is_alive(attacker) {
            return;
        }
        let Some(&attacker_id) = self.world.get::<AgentId>(attacker) else {
            return;
        };
        let Some(combat) = self.world.get::<CombatState>(attacker).copied() else {
            return;
        };
        let Some(target) = combat.queued_target else {
            return;
        };
        if !self.is_alive(target) {
            return;
        }

        self.apply_damage(target, combat.pending_damage, attacker_id);
        self.observers.emit(&SimEvent::AttackImpact {
            attacker: attacker_id,
        });
    }

    fn apply_damage(&mut self, target: Entity, amount: i32, instigator: AgentId) {
        let died = match self.world.get_mut::<Health>(target) {
            Some(mut health) => {
                health.damage(amount);
                !health.is_alive()
            }
            None => return,
        };

        if let Some(&target_id) = self.world.get::<AgentId>(target) {
            tracing::debug!(?target_id, amount, from = ?instigator, "damage applied");
        }

        if died {
            self.handle_agent_death(target);
        }
    }

    /// An agent reached zero hit points. Runs exactly once per agent: damage
    /// is never applied to a dead target, so there is no second trigger.
    fn handle_agent_death(&mut self, agent: Entity) {
        self.enter_phase(agent, AgentState::Dead, 0.0);
        if let Some(mut combat) = self.world.get_mut::<CombatState>(agent) {
            combat.clear();
        }

        // Every agent holding a handle to the deceased clears it now and
        // stands down; nobody keeps a dangling target.
        let others: Vec<Entity> = self
            .roster
            .iter()
            .copied()
            .filter(|&other| other != agent)
            .collect();
        for other in others {
            let targeting = self
                .world
                .get::<CombatState>(other)
                .is_some_and(|combat| combat.queued_target == Some(agent));
            if targeting && self.is_alive(other) {
                if let Some(mut combat) = self.world.get_mut::<CombatState>(other) {
                    combat.clear();
                }
                self.enter_phase(other, AgentState::Idle, 0.0);
            }
        }

        self.grid.remove_agent(agent);

        if let Some(&id) = self.world.get::<AgentId>(agent) {
            tracing::debug!(?id, "agent died");
            self.observers.emit(&SimEvent::Death { agent: id });
        }
    }
}
