//! ECS components for skirmish agents.
//!
//! Components are pure data containers attached to agent entities.
//! All behavior lives in the step engine ([`crate::api::SimWorld`]).

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::Coord;

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Stable per-simulation agent identifier, assigned at spawn in spawn order.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// Team/side identifier.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Red,
    Blue,
}

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// World-space position. Always tick-aligned: between ticks it is exactly the
/// center of the agent's current grid cell.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// The agent's current logical grid cell.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell(pub Coord);

// ============================================================================
// COMBAT COMPONENTS
// ============================================================================

/// Hit points. `current` never drops below zero; `max` is positive.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn damage(&mut self, amount: i32) {
        self.current = (self.current - amount).max(0);
    }
}

/// Agent life-cycle state. `Dead` is terminal and reachable from any state
/// the moment hit points reach zero.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AgentState {
    #[default]
    Idle,
    Moving,
    WaitingForCombat,
    InCombat,
    Dead,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Moving => "Moving",
            Self::WaitingForCombat => "WaitingForCombat",
            Self::InCombat => "InCombat",
            Self::Dead => "Dead",
        }
    }
}

/// Queued combat intent: the target handle and the damage armed for it.
///
/// The target is a plain [`Entity`] handle, never an owning reference; it is
/// re-validated against the world before every use, and cleared synchronously
/// when the target dies.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct CombatState {
    pub queued_target: Option<Entity>,
    pub pending_damage: i32,
}

impl CombatState {
    pub fn clear(&mut self) {
        self.queued_target = None;
        self.pending_damage = 0;
    }
}

/// Seconds elapsed since the agent last issued an attack.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AttackCooldown {
    pub time_since_attack: f32,
}

impl AttackCooldown {
    /// A cooldown that starts already elapsed, so a fresh agent may attack
    /// on its first tick.
    pub fn elapsed(seconds: f32) -> Self {
        Self {
            time_since_attack: seconds,
        }
    }

    pub fn is_ready(&self, cooldown: f32) -> bool {
        self.time_since_attack >= cooldown
    }

    pub fn reset(&mut self) {
        self.time_since_attack = 0.0;
    }

    pub fn advance(&mut self, dt: f32) {
        self.time_since_attack += dt;
    }
}

/// Time remaining in the agent's current non-idle phase: tile traversal for
/// `Moving`, pre-swing pause for `WaitingForCombat`, the strike itself for
/// `InCombat`. Durations are fixed wall-clock amounts independent of the
/// tick rate; leftover tick time carries across phase boundaries.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PhaseClock {
    pub remaining: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_never_drops_below_zero() {
        let mut health = Health::new(3);
        health.damage(5);
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn cooldown_gates_until_elapsed() {
        let mut cd = AttackCooldown::default();
        assert!(!cd.is_ready(0.7));
        cd.advance(0.5);
        assert!(!cd.is_ready(0.7));
        cd.advance(0.25);
        assert!(cd.is_ready(0.7));
        cd.reset();
        assert!(!cd.is_ready(0.7));
    }

    #[test]
    fn combat_state_clear_drops_target_and_damage() {
        let mut combat = CombatState {
            queued_target: Some(Entity::from_raw(1)),
            pending_damage: 1,
        };
        combat.clear();
        assert!(combat.queued_target.is_none());
        assert_eq!(combat.pending_damage, 0);
    }
}
