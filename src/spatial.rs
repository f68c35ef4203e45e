//! Spatial partitioning: cell → agent-set index over the logical grid.
//!
//! Tracks which agents occupy which grid cell so occupancy checks and
//! neighborhood queries are O(1) average instead of scanning every agent.
//! Agent sets are `BTreeSet`s so iteration order at a cell is canonical
//! (ascending entity), which keeps "first enemy found" style decisions
//! reproducible between runs.

use bevy_ecs::entity::Entity;
use std::collections::{BTreeSet, HashMap};

use crate::geometry::Coord;

/// Cell → occupying-agents index.
///
/// Invariants: an agent is present in at most one cell's set at any time
/// (callers move agents via [`update_cell`](Self::update_cell)), and the map
/// never holds an empty set, so memory stays proportional to occupied cells
/// rather than the full grid.
#[derive(Debug, Default)]
pub struct SpatialPartition {
    cells: HashMap<Coord, BTreeSet<Entity>>,
}

impl SpatialPartition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent at a cell. Re-registering the same agent at the same
    /// cell is a no-op.
    pub fn register(&mut self, agent: Entity, cell: Coord) {
        self.cells.entry(cell).or_default().insert(agent);
    }

    /// Move an agent between cells. `old_cell` must be the cell the agent
    /// was actually registered in.
    pub fn update_cell(&mut self, agent: Entity, old_cell: Coord, new_cell: Coord) {
        if let Some(set) = self.cells.get_mut(&old_cell) {
            set.remove(&agent);
            if set.is_empty() {
                self.cells.remove(&old_cell);
            }
        }
        self.cells.entry(new_cell).or_default().insert(agent);
    }

    /// Remove an agent from a cell, pruning the cell entry if it empties.
    pub fn remove(&mut self, agent: Entity, cell: Coord) {
        if let Some(set) = self.cells.get_mut(&cell) {
            set.remove(&agent);
            if set.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn is_occupied(&self, cell: Coord) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Agents at a cell, in ascending entity order. `None` when unoccupied.
    pub fn agents_at(&self, cell: Coord) -> Option<&BTreeSet<Entity>> {
        self.cells.get(&cell)
    }

    /// Number of occupied cells (not agents).
    pub fn occupied_cell_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    #[test]
    fn register_then_remove_leaves_cell_unoccupied() {
        let mut partition = SpatialPartition::new();
        let cell = Coord::new(2, 3);
        let a = entity(1);

        partition.register(a, cell);
        assert!(partition.is_occupied(cell));

        partition.remove(a, cell);
        assert!(!partition.is_occupied(cell));
        assert!(partition.agents_at(cell).is_none(), "empty entry not pruned");
    }

    #[test]
    fn register_is_idempotent() {
        let mut partition = SpatialPartition::new();
        let cell = Coord::new(0, 0);
        let a = entity(1);

        partition.register(a, cell);
        partition.register(a, cell);

        assert_eq!(partition.agents_at(cell).unwrap().len(), 1);
    }

    #[test]
    fn update_cell_moves_agent_between_sets() {
        let mut partition = SpatialPartition::new();
        let from = Coord::new(1, 1);
        let to = Coord::new(1, 2);
        let a = entity(1);

        partition.register(a, from);
        partition.update_cell(a, from, to);

        assert!(partition.agents_at(from).is_none());
        assert!(partition.agents_at(to).unwrap().contains(&a));
    }

    #[test]
    fn shared_cell_keeps_other_agents_on_removal() {
        let mut partition = SpatialPartition::new();
        let cell = Coord::new(4, 4);
        let a = entity(1);
        let b = entity(2);

        partition.register(a, cell);
        partition.register(b, cell);
        partition.remove(a, cell);

        assert!(partition.is_occupied(cell));
        let set = partition.agents_at(cell).unwrap();
        assert!(!set.contains(&a));
        assert!(set.contains(&b));
    }

    #[test]
    fn memory_tracks_occupied_cells_only() {
        let mut partition = SpatialPartition::new();
        for i in 0..8 {
            partition.register(entity(i), Coord::new(i as i32, 0));
        }
        assert_eq!(partition.occupied_cell_count(), 8);

        for i in 0..8 {
            partition.remove(entity(i), Coord::new(i as i32, 0));
        }
        assert_eq!(partition.occupied_cell_count(), 0);
    }

    #[test]
    fn agents_iterate_in_ascending_entity_order() {
        let mut partition = SpatialPartition::new();
        let cell = Coord::new(0, 0);
        partition.register(entity(9), cell);
        partition.register(entity(3), cell);
        partition.register(entity(7), cell);

        let order: Vec<Entity> = partition.agents_at(cell).unwrap().iter().copied().collect();
        assert_eq!(order, vec![entity(3), entity(7), entity(9)]);
    }

    #[test]
    fn clear_empties_everything() {
        let mut partition = SpatialPartition::new();
        partition.register(entity(1), Coord::new(0, 0));
        partition.register(entity(2), Coord::new(5, 5));
        partition.clear();
        assert_eq!(partition.occupied_cell_count(), 0);
    }
}
