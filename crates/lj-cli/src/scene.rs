//! The demo clearing: one player, one tree, a sell zone, a rock and an
//! orbit camera.

use glam::Vec3;
use lj_core::{
    CameraMode, EntityId, LjResult, Pose, SellZoneComponent, TreeComponent, World, WorldMeta,
    prefab,
};

/// Handles to the actors of the demo scene.
#[derive(Debug, Clone, Copy)]
pub struct DemoActors {
    pub player: EntityId,
    pub tree: EntityId,
    pub zone: EntityId,
    pub camera: EntityId,
}

pub fn demo() -> LjResult<(World, DemoActors)> {
    let mut meta = WorldMeta::new("Clearing");
    meta.description = "A lumberjack, an oak and a timber buyer".into();
    let mut world = World::new(meta);

    let player = prefab::spawn_player(&mut world, "Jack", Pose::IDENTITY)?;
    let tree = prefab::spawn_tree(
        &mut world,
        "Oak",
        Pose::from_yaw(Vec3::new(0.0, 0.0, 6.0), 180.0),
        TreeComponent::default(),
    )?;
    let zone = prefab::spawn_sell_zone(
        &mut world,
        "Timber Buyer",
        Vec3::new(6.0, 1.0, 0.0),
        Vec3::new(1.5, 1.0, 1.5),
        SellZoneComponent::default(),
    )?;
    prefab::spawn_obstacle(
        &mut world,
        "Rock",
        Vec3::new(-4.0, 0.5, 3.0),
        Vec3::splat(0.5),
    )?;
    let camera = prefab::spawn_camera(&mut world, "Camera", Some(player), CameraMode::Orbit)?;

    Ok((
        world,
        DemoActors {
            player,
            tree,
            zone,
            camera,
        },
    ))
}
