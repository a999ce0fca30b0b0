use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, Pose};

/// A parent link: the child's world pose is `parent.pose.compose(&local)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// The entity this one follows.
    pub parent: EntityId,
    /// Offset expressed in the parent's local space.
    pub local: Pose,
}

impl Attachment {
    /// Attach to `parent` at a local offset.
    pub fn new(parent: EntityId, local: Pose) -> Self {
        Self { parent, local }
    }

    /// World pose of the child given the parent's world pose.
    pub fn resolve(&self, parent_pose: &Pose) -> Pose {
        parent_pose.compose(&self.local)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn resolve_follows_parent_rotation() {
        let parent = EntityId::new();
        let link = Attachment::new(parent, Pose::at(Vec3::new(0.0, 1.0, 1.0)));
        let pose = link.resolve(&Pose::from_yaw(Vec3::new(5.0, 0.0, 0.0), 180.0));
        assert!((pose.position - Vec3::new(5.0, 1.0, -1.0)).length() < 1e-4);
    }
}
