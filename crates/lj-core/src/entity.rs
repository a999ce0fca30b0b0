use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attachment::Attachment;
use crate::component::ComponentSet;
use crate::math::heading_degrees;

/// Unique identifier for every entity in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// The kind of an entity. Extensible via `Custom(String)` for host-defined actors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A controllable lumberjack.
    Player,
    /// A choppable tree.
    Tree,
    /// A log dropped by a felled tree.
    Log,
    /// A camera following another entity.
    CameraRig,
    /// A trigger volume that buys logs.
    SellZone,
    /// Static geometry that blocks movement and camera sweeps.
    Obstacle,
    /// A host-defined entity type not covered by built-in kinds.
    Custom(String),
}

impl EntityKind {
    /// Parse a kind from its lowercase name.
    pub fn parse(s: &str) -> Self {
        match s {
            "player" => Self::Player,
            "tree" => Self::Tree,
            "log" => Self::Log,
            "camera_rig" | "camera" => Self::CameraRig,
            "sell_zone" => Self::SellZone,
            "obstacle" => Self::Obstacle,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Tree => write!(f, "tree"),
            Self::Log => write!(f, "log"),
            Self::CameraRig => write!(f, "camera_rig"),
            Self::SellZone => write!(f, "sell_zone"),
            Self::Obstacle => write!(f, "obstacle"),
            Self::Custom(s) => write!(f, "{s}"),
        }
    }
}

/// Position and orientation of an entity.
///
/// Y is up and forward is +Z, so a yaw of 90 degrees faces +X.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World-space position.
    pub position: Vec3,
    /// World-space orientation.
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// Origin, facing +Z.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a pose from a position and rotation.
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// A pose at `position` facing +Z.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// A pose at `position` rotated `yaw_degrees` about the up axis.
    pub fn from_yaw(position: Vec3, yaw_degrees: f32) -> Self {
        Self::new(position, Quat::from_rotation_y(yaw_degrees.to_radians()))
    }

    /// Unit forward vector.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Unit right vector.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Heading of the forward vector projected on the ground plane, in degrees.
    pub fn yaw_degrees(&self) -> f32 {
        heading_degrees(self.forward())
    }

    /// Transform a point from this pose's local space into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Compose a child pose expressed in this pose's local space.
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose {
            position: self.transform_point(local.position),
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }
}

/// Core entity struct. Every scene object is an Entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// The kind (type) of this entity.
    pub kind: EntityKind,
    /// Display name; not required to be unique.
    pub name: String,
    /// Free-form tags used by interaction filters (e.g. `"log"`).
    pub tags: Vec<String>,
    /// World-space pose. Derived from the parent while attached.
    pub pose: Pose,
    /// Whether the visual representation is shown.
    pub visible: bool,
    /// Parent link, if this entity is attached to another one.
    pub attachment: Option<Attachment>,
    /// Typed component data attached to this entity.
    pub components: ComponentSet,
}

impl Entity {
    /// Create a new entity with a random ID at the origin.
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::with_id(EntityId::new(), kind, name)
    }

    /// Create an entity with a pre-assigned ID.
    pub fn with_id(id: EntityId, kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            tags: Vec::new(),
            pose: Pose::IDENTITY,
            visible: true,
            attachment: None,
            components: ComponentSet::default(),
        }
    }

    /// Set the initial pose.
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Replace the component set.
    pub fn with_components(mut self, components: ComponentSet) -> Self {
        self.components = components;
        self
    }

    /// Case-insensitive tag check.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Heading of the entity in degrees.
    pub fn yaw_degrees(&self) -> f32 {
        self.pose.yaw_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_display_shows_short_form() {
        let id = EntityId::new();
        assert_eq!(id.to_string().len(), 8);
    }

    #[test]
    fn entity_kind_parse_round_trips_display() {
        for kind in [
            EntityKind::Player,
            EntityKind::Tree,
            EntityKind::Log,
            EntityKind::CameraRig,
            EntityKind::SellZone,
            EntityKind::Obstacle,
        ] {
            assert_eq!(EntityKind::parse(&kind.to_string()), kind);
        }
        assert_eq!(
            EntityKind::parse("stump"),
            EntityKind::Custom("stump".to_string())
        );
    }

    #[test]
    fn pose_yaw_matches_forward() {
        let pose = Pose::from_yaw(Vec3::ZERO, 90.0);
        let fwd = pose.forward();
        assert!((fwd.x - 1.0).abs() < 1e-5);
        assert!(fwd.z.abs() < 1e-5);
        assert!((pose.yaw_degrees() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn pose_right_is_perpendicular_on_ground() {
        let pose = Pose::from_yaw(Vec3::ZERO, 37.0);
        assert!(pose.right().dot(pose.forward()).abs() < 1e-5);
        assert!(pose.right().y.abs() < 1e-5);
    }

    #[test]
    fn compose_offsets_in_local_space() {
        let parent = Pose::from_yaw(Vec3::new(1.0, 0.0, 1.0), 90.0);
        let child = parent.compose(&Pose::at(Vec3::new(0.0, 1.0, 2.0)));
        assert!((child.position - Vec3::new(3.0, 1.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn tags_are_case_insensitive() {
        let e = Entity::new(EntityKind::Log, "Log").with_tag("Log");
        assert!(e.has_tag("log"));
        assert!(!e.has_tag("tree"));
    }
}
