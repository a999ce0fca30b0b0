//! Frame-driven actor simulation for Lumberjack.
//!
//! Systems operate on a [`lj_core::World`] through a [`SimContext`]. The
//! [`Simulation`] orchestrator owns the world, clock, RNG, economy, timers
//! and event log, and runs update, fixed-step and late phases every frame
//! from an explicit [`InputSnapshot`].

/// Third-person camera rigs.
pub mod camera;
/// Frame and fixed-step clock.
pub mod clock;
/// Configuration types for simulation runs.
pub mod config;
/// Mutable context passed to systems each phase.
pub mod context;
/// Currency balance, sell zones and sale settlement.
pub mod economy;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Per-frame input snapshots and recorded input scripts.
pub mod input;
/// Chopping, picking up, carrying and dropping.
pub mod interaction;
/// Player locomotion.
pub mod movement;
/// Top-level simulation orchestrator.
pub mod simulation;
/// Overlap and sweep queries against scene colliders.
pub mod spatial;
/// The trait that all simulation systems implement.
pub mod system;
/// One-shot timers on simulated time.
pub mod timer;
/// Tree health, felling, log drops and respawn.
pub mod tree;

#[cfg(test)]
pub(crate) mod testing;

/// Re-exports of the camera types.
pub use camera::{CameraRig, CameraSystem};
/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-exports of the configuration types.
pub use config::{
    CameraConfig, EconomyConfig, InteractionConfig, MovementConfig, SimConfig, TreeConfig,
};
/// Re-export of [`context::SimContext`].
pub use context::SimContext;
/// Re-exports of the economy types.
pub use economy::{Economy, SellRequest, SellZoneSystem};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], and [`event::SimEventKind`].
pub use event::{EventLog, SimEvent, SimEventKind};
/// Re-exports of the input types.
pub use input::{InputScript, InputSnapshot, ScriptStep, SwingEdge};
/// Re-exports of the interaction types.
pub use interaction::{InteractionController, InteractionSystem, Weapon};
/// Re-exports of the movement types.
pub use movement::{MoveReport, MovementController, MovementSystem, ReferenceFrame};
/// Re-export of [`simulation::Simulation`].
pub use simulation::Simulation;
/// Re-exports of the spatial query types.
pub use spatial::{Hit, QueryFilter, SpatialQuery};
/// Re-export of [`system::System`].
pub use system::System;
/// Re-exports of the timer types.
pub use timer::{Timer, TimerId, TimerKind, TimerQueue};
/// Re-exports of the tree types.
pub use tree::{HitOutcome, Tree, TreeHit, TreeState, TreeSystem};
