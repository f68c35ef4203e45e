//! Deterministic grid skirmish simulation core.
//!
//! Two teams of agents spawn on a square or hexagonal grid, seek the nearest
//! enemy, path toward it one cell per tick and trade melee blows until one
//! side is eliminated. The whole simulation is a pure function of its
//! [`SimConfig`]: same seed, same tick-by-tick history, on any machine.
//!
//! The crate is engine-agnostic. A host drives it by calling
//! [`SimWorld::advance_step`] on its own clock and renders from
//! [`Snapshot`]s; deaths and landed attacks arrive through the observer
//! callbacks on [`SimWorld::subscribe`].
//!
//! ```no_run
//! use skirmish_sim::{SimConfig, SimEvent, SimWorld};
//!
//! let mut sim = SimWorld::new(SimConfig::default()).unwrap();
//! sim.subscribe(|event| {
//!     if let SimEvent::Death { agent } = event {
//!         println!("agent {:?} down", agent);
//!     }
//! });
//! for _ in 0..100 {
//!     sim.advance_step();
//! }
//! println!("{}", sim.snapshot_json());
//! ```

pub mod api;
pub mod components;
pub mod config;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod pathfinding;
pub mod spatial;
pub mod world;

pub use api::SimWorld;
pub use components::{
    AgentId, AgentState, AttackCooldown, Cell, CombatState, Health, PhaseClock, Position, Team,
};
pub use config::{GridKind, SimConfig, SimError};
pub use events::{Observers, SimEvent, SubscriptionId};
pub use geometry::{Coord, GridGeometry, HexGrid, SquareGrid};
pub use grid::GridManager;
pub use pathfinding::find_path;
pub use spatial::SpatialPartition;
pub use world::{AgentSnapshot, Snapshot};
