//! Grid manager: couples geometry, the spatial index and per-agent cell
//! tracking behind one query surface.
//!
//! The manager is the single owner of agent↔cell bookkeeping: the current
//! cell feeds the spatial partition, and the most recently vacated cell feeds
//! the pathfinder's anti-oscillation bias.

use bevy_ecs::entity::Entity;
use std::collections::{BTreeSet, HashMap};

use crate::geometry::{Coord, GridGeometry};
use crate::spatial::SpatialPartition;

pub struct GridManager {
    geometry: Box<dyn GridGeometry>,
    partition: SpatialPartition,
    /// Cell each tracked agent currently occupies.
    current_cells: HashMap<Entity, Coord>,
    /// Cell each tracked agent most recently vacated. Equals the current
    /// cell until the agent's first move.
    previous_cells: HashMap<Entity, Coord>,
    origin: (f32, f32),
}

impl GridManager {
    pub fn new(geometry: Box<dyn GridGeometry>, origin: (f32, f32)) -> Self {
        Self {
            geometry,
            partition: SpatialPartition::new(),
            current_cells: HashMap::new(),
            previous_cells: HashMap::new(),
            origin,
        }
    }

    pub fn geometry(&self) -> &dyn GridGeometry {
        self.geometry.as_ref()
    }

    pub fn grid_size(&self) -> i32 {
        self.geometry.grid_size()
    }

    pub fn is_valid_cell(&self, cell: Coord) -> bool {
        let size = self.geometry.grid_size();
        cell.col >= 0 && cell.col < size && cell.row >= 0 && cell.row < size
    }

    /// Start tracking an agent at a cell.
    pub fn register_agent(&mut self, agent: Entity, cell: Coord) {
        self.partition.register(agent, cell);
        self.current_cells.insert(agent, cell);
        self.previous_cells.insert(agent, cell);
    }

    /// Stop tracking an agent, removing it from the spatial index.
    pub fn remove_agent(&mut self, agent: Entity) {
        if let Some(cell) = self.current_cells.remove(&agent) {
            self.partition.remove(agent, cell);
        }
        self.previous_cells.remove(&agent);
    }

    /// Commit an agent's move to `new_cell`, recording the vacated cell as
    /// its previous cell. No-op when the cell is unchanged or out of bounds.
    pub fn update_agent_cell(&mut self, agent: Entity, new_cell: Coord) {
        if !self.is_valid_cell(new_cell) {
            return;
        }
        match self.current_cells.get(&agent).copied() {
            Some(old_cell) => {
                if old_cell == new_cell {
                    return;
                }
                self.partition.update_cell(agent, old_cell, new_cell);
                self.previous_cells.insert(agent, old_cell);
                self.current_cells.insert(agent, new_cell);
            }
            None => self.register_agent(agent, new_cell),
        }
    }

    pub fn current_cell_for(&self, agent: Entity) -> Option<Coord> {
        self.current_cells.get(&agent).copied()
    }

    /// The cell the agent last stepped out of; the anti-oscillation bias
    /// input for pathfinding.
    pub fn previous_cell_for(&self, agent: Entity) -> Option<Coord> {
        self.previous_cells.get(&agent).copied()
    }

    pub fn is_occupied(&self, cell: Coord) -> bool {
        self.partition.is_occupied(cell)
    }

    pub fn agents_at(&self, cell: Coord) -> Option<&BTreeSet<Entity>> {
        self.partition.agents_at(cell)
    }

    /// Agents within `range` steps of `center` (center cell included), in
    /// geometry disk order then ascending entity order per cell.
    pub fn surrounding_agents(&self, center: Coord, range: i32) -> Vec<Entity> {
        let mut result = Vec::new();
        for cell in self.geometry.cells_in_range(center, range) {
            if let Some(agents) = self.partition.agents_at(cell) {
                result.extend(agents.iter().copied());
            }
        }
        result
    }

    /// Agents one traversal step away from `center` (4 cells for square,
    /// 6 for hex).
    pub fn neighbouring_agents(&self, center: Coord) -> Vec<Entity> {
        let mut result = Vec::new();
        for cell in self.geometry.neighbors(center) {
            if let Some(agents) = self.partition.agents_at(cell) {
                result.extend(agents.iter().copied());
            }
        }
        result
    }

    pub fn grid_to_world(&self, cell: Coord) -> (f32, f32) {
        self.geometry.tile_world_position(cell, self.origin)
    }

    pub fn world_to_grid(&self, x: f32, y: f32) -> Coord {
        self.geometry
            .world_to_grid(x - self.origin.0, y - self.origin.1)
    }

    /// Drop all agent tracking (the geometry configuration stays).
    pub fn clear(&mut self) {
        self.partition.clear();
        self.current_cells.clear();
        self.previous_cells.clear();
    }
}
