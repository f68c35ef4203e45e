//! Serializable snapshot of simulation state.
//!
//! A presentation layer reads these snapshots (and subscribes to
//! [`crate::events::SimEvent`]); it never mutates simulation state.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{AgentId, AgentState, Cell, Health, Position, Team};

/// One agent's state, flattened for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: u32,
    pub team: String,
    pub col: i32,
    pub row: i32,
    pub x: f32,
    pub y: f32,
    pub hp: i32,
    pub hp_max: i32,
    pub state: String,
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tick the snapshot was taken after.
    pub tick: u64,
    /// All agents, sorted by id.
    pub agents: Vec<AgentSnapshot>,
}

impl Snapshot {
    /// Build a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64) -> Self {
        let mut agents = Vec::new();

        let mut query = world.query::<(&AgentId, &Team, &Position, &Cell, &Health, &AgentState)>();
        for (id, team, pos, cell, health, state) in query.iter(world) {
            let team_str = match team {
                Team::Red => "Red",
                Team::Blue => "Blue",
            };
            agents.push(AgentSnapshot {
                id: id.0,
                team: team_str.to_string(),
                col: cell.0.col,
                row: cell.0.row,
                x: pos.x,
                y: pos.y,
                hp: health.current,
                hp_max: health.max,
                state: state.as_str().to_string(),
            });
        }

        agents.sort_by_key(|agent| agent.id);

        Self { tick, agents }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coord;

    #[test]
    fn snapshot_collects_and_sorts_agents() {
        let mut world = World::new();
        for (id, col) in [(2u32, 5), (0u32, 1), (1u32, 3)] {
            world.spawn((
                AgentId(id),
                Team::Red,
                Position::new(col as f32 * 100.0, 0.0),
                Cell(Coord::new(col, 0)),
                Health::new(3),
                AgentState::Idle,
            ));
        }

        let snapshot = Snapshot::from_world(&mut world, 7);
        assert_eq!(snapshot.tick, 7);
        let ids: Vec<u32> = snapshot.agents.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut world = World::new();
        world.spawn((
            AgentId(0),
            Team::Blue,
            Position::new(0.0, 0.0),
            Cell(Coord::new(0, 0)),
            Health::new(4),
            AgentState::Moving,
        ));

        let json = Snapshot::from_world(&mut world, 1).to_json().unwrap();
        assert!(json.contains("\"Blue\""));
        assert!(json.contains("\"Moving\""));
    }
}
