//! Spawn helpers for the standard scene actors.
//!
//! Each helper builds an [`Entity`] with the components its systems expect
//! and spawns it into the world.

use glam::Vec3;

use crate::component::{
    Body, CameraComponent, CameraMode, Collider, LayerMask, SellZoneComponent, TreeComponent,
};
use crate::entity::{Entity, EntityId, EntityKind, Pose};
use crate::error::LjResult;
use crate::world::World;

/// Player capsule approximated by a sphere around the hips.
pub const PLAYER_RADIUS: f32 = 0.5;
/// Log pickup volume.
pub const LOG_RADIUS: f32 = 0.3;
/// Half size of a standing trunk.
pub const TRUNK_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 2.5, 0.4);

/// Tag carried by every log.
pub const LOG_TAG: &str = "log";

/// Spawn a player with a dynamic body.
pub fn spawn_player(world: &mut World, name: &str, pose: Pose) -> LjResult<EntityId> {
    let mut entity = Entity::new(EntityKind::Player, name).with_pose(pose);
    entity.components.body = Some(Body::default());
    entity.components.collider = Some(
        Collider::sphere(PLAYER_RADIUS, LayerMask::PLAYER)
            .with_offset(Vec3::new(0.0, PLAYER_RADIUS, 0.0)),
    );
    world.spawn(entity)
}

/// Spawn a choppable tree.
pub fn spawn_tree(
    world: &mut World,
    name: &str,
    pose: Pose,
    tree: TreeComponent,
) -> LjResult<EntityId> {
    let mut entity = Entity::new(EntityKind::Tree, name).with_pose(pose);
    entity.components.collider = Some(
        Collider::cuboid(TRUNK_HALF_EXTENTS, LayerMask::TREE)
            .with_offset(Vec3::new(0.0, TRUNK_HALF_EXTENTS.y, 0.0)),
    );
    entity.components.tree = Some(tree);
    world.spawn(entity)
}

/// Spawn a loose log.
pub fn spawn_log(world: &mut World, position: Vec3) -> LjResult<EntityId> {
    let mut entity = Entity::new(EntityKind::Log, "Log")
        .with_pose(Pose::at(position))
        .with_tag(LOG_TAG);
    entity.components.body = Some(Body::default());
    entity.components.collider = Some(Collider::sphere(LOG_RADIUS, LayerMask::LOG));
    world.spawn(entity)
}

/// Spawn a box-shaped sell trigger.
pub fn spawn_sell_zone(
    world: &mut World,
    name: &str,
    center: Vec3,
    half_extents: Vec3,
    zone: SellZoneComponent,
) -> LjResult<EntityId> {
    let mut entity = Entity::new(EntityKind::SellZone, name).with_pose(Pose::at(center));
    entity.components.collider = Some(Collider::cuboid(half_extents, LayerMask::ZONE).as_trigger());
    entity.components.sell_zone = Some(zone);
    world.spawn(entity)
}

/// Spawn static blocking geometry.
pub fn spawn_obstacle(
    world: &mut World,
    name: &str,
    center: Vec3,
    half_extents: Vec3,
) -> LjResult<EntityId> {
    let mut entity = Entity::new(EntityKind::Obstacle, name).with_pose(Pose::at(center));
    entity.components.collider = Some(Collider::cuboid(half_extents, LayerMask::OBSTACLE));
    world.spawn(entity)
}

/// Spawn a camera rig following `target`.
pub fn spawn_camera(
    world: &mut World,
    name: &str,
    target: Option<EntityId>,
    mode: CameraMode,
) -> LjResult<EntityId> {
    let mut entity = Entity::new(EntityKind::CameraRig, name);
    entity.components.camera = Some(CameraComponent { target, mode });
    world.spawn(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldMeta;

    #[test]
    fn prefabs_carry_expected_components() {
        let mut world = World::new(WorldMeta::new("Prefabs"));
        let player = spawn_player(&mut world, "Jack", Pose::IDENTITY).unwrap();
        let tree = spawn_tree(
            &mut world,
            "Oak",
            Pose::at(Vec3::Z * 3.0),
            TreeComponent::default(),
        )
        .unwrap();
        let log = spawn_log(&mut world, Vec3::X).unwrap();
        let zone = spawn_sell_zone(
            &mut world,
            "Market",
            Vec3::X * 10.0,
            Vec3::splat(1.5),
            SellZoneComponent::default(),
        )
        .unwrap();
        let cam = spawn_camera(&mut world, "Cam", Some(player), CameraMode::Orbit).unwrap();

        let p = world.get_entity(player).unwrap();
        assert!(p.components.body.is_some());
        assert_eq!(p.components.collider.unwrap().layer, LayerMask::PLAYER);

        let t = world.get_entity(tree).unwrap();
        assert!(t.components.tree.is_some());
        assert_eq!(t.components.collider.unwrap().layer, LayerMask::TREE);

        assert!(world.get_entity(log).unwrap().has_tag("log"));
        assert!(world.get_entity(zone).unwrap().components.collider.unwrap().is_trigger);
        assert_eq!(
            world.get_entity(cam).unwrap().components.camera.unwrap().target,
            Some(player)
        );
    }
}
