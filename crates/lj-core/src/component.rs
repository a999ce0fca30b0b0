use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// The set of typed components attached to an entity.
/// Entities can hold any combination; systems skip entities missing what they need.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentSet {
    /// Rigid-body state owned by the physics collaborator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    /// Collision volume used by spatial queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collider: Option<Collider>,
    /// Choppable tree authoring data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeComponent>,
    /// Camera rig authoring data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraComponent>,
    /// Sell zone authoring data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_zone: Option<SellZoneComponent>,
}

// ---------------------------------------------------------------------------
// Physics
// ---------------------------------------------------------------------------

/// Rigid-body state. Integration belongs to the physics collaborator; the
/// simulation only reads and writes velocity and toggles kinematic mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Linear velocity in units per second.
    pub velocity: Vec3,
    /// Kinematic bodies are not simulated independently.
    pub kinematic: bool,
}

impl Body {
    /// Apply an instantaneous velocity change.
    pub fn apply_velocity_change(&mut self, delta: Vec3) {
        if !self.kinematic {
            self.velocity += delta;
        }
    }
}

/// A bit set of collision layers. Single-bit values name a layer; any
/// combination is a filter mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// No layers.
    pub const NONE: Self = Self(0);
    /// Unassigned geometry.
    pub const DEFAULT: Self = Self(1 << 0);
    /// Player actors.
    pub const PLAYER: Self = Self(1 << 1);
    /// Standing trees.
    pub const TREE: Self = Self(1 << 2);
    /// Loose logs.
    pub const LOG: Self = Self(1 << 3);
    /// Logs being carried; ignored by player sweeps.
    pub const CARRIED: Self = Self(1 << 4);
    /// Static blocking geometry.
    pub const OBSTACLE: Self = Self(1 << 5);
    /// Trigger zones.
    pub const ZONE: Self = Self(1 << 6);
    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// True when the two masks share at least one layer.
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Remove the layers in `other`.
    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LayerMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for LayerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerMask({:#b})", self.0)
    }
}

/// Collision volume shape. Boxes are axis-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// A sphere.
    Sphere {
        /// Sphere radius.
        radius: f32,
    },
    /// An axis-aligned box.
    Box {
        /// Half size along each axis.
        half_extents: Vec3,
    },
}

/// Collision volume attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Volume shape.
    pub shape: Shape,
    /// Center offset from the entity position (not rotated).
    pub offset: Vec3,
    /// The layer this collider lives on.
    pub layer: LayerMask,
    /// Triggers report overlaps but never block sweeps.
    pub is_trigger: bool,
    /// Disabled colliders are invisible to every query.
    pub enabled: bool,
}

impl Collider {
    /// An enabled, solid sphere.
    pub fn sphere(radius: f32, layer: LayerMask) -> Self {
        Self {
            shape: Shape::Sphere { radius },
            offset: Vec3::ZERO,
            layer,
            is_trigger: false,
            enabled: true,
        }
    }

    /// An enabled, solid axis-aligned box.
    pub fn cuboid(half_extents: Vec3, layer: LayerMask) -> Self {
        Self {
            shape: Shape::Box { half_extents },
            offset: Vec3::ZERO,
            layer,
            is_trigger: false,
            enabled: true,
        }
    }

    /// Set the center offset.
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Turn into a trigger volume.
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Gameplay authoring data
// ---------------------------------------------------------------------------

/// Static data for a choppable tree. Runtime health lives in the tree system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeComponent {
    /// Health restored on every respawn.
    pub max_health: i32,
    /// Where logs drop, relative to the tree's pose.
    pub drop_offset: Vec3,
}

impl Default for TreeComponent {
    fn default() -> Self {
        Self {
            max_health: 3,
            drop_offset: Vec3::new(0.0, 0.3, 1.2),
        }
    }
}

/// How a camera rig positions itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Mouse-driven orbit with auto-align, zoom and collision.
    #[default]
    Orbit,
    /// Fixed-offset follow.
    Follow,
}

/// Static data for a camera rig.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraComponent {
    /// The followed entity. A rig without a target is disabled.
    pub target: Option<EntityId>,
    /// Positioning model.
    pub mode: CameraMode,
}

/// Static data for a sell zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellZoneComponent {
    /// Credits paid per sold object.
    pub price_per_log: u32,
    /// Tag a carried object needs to be bought.
    pub sell_tag: String,
}

impl Default for SellZoneComponent {
    fn default() -> Self {
        Self {
            price_per_log: 5,
            sell_tag: "log".to_string(),
        }
    }
}
