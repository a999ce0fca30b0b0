//! Core types for Lumberjack: entities, components, and the scene graph.
//!
//! This crate holds the data model the simulation drives. It has no notion of
//! time or behaviour; you can build a [`World`] programmatically with the
//! helpers in [`prefab`] and hand it to the simulation.

/// Parent links between entities.
pub mod attachment;
/// Typed component data (bodies, colliders, trees, cameras, sell zones).
pub mod component;
/// Entity types, identifiers, and poses.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Smoothing and angle helpers.
pub mod math;
/// Spawn helpers for the standard actors.
pub mod prefab;
/// Query builder for filtering and searching entities.
pub mod query;
/// The scene graph that owns entities and their attachments.
pub mod world;

/// Re-export attachment types.
pub use attachment::Attachment;
/// Re-export component types.
pub use component::{
    Body, CameraComponent, CameraMode, Collider, ComponentSet, LayerMask, SellZoneComponent,
    Shape, TreeComponent,
};
/// Re-export core entity types.
pub use entity::{Entity, EntityId, EntityKind, Pose};
/// Re-export error types.
pub use error::{LjError, LjResult};
/// Re-export world model types.
pub use world::{World, WorldMeta};
