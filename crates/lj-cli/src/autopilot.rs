//! A scripted lumberjack for the demo: chop the tree, collect the logs,
//! carry each one to the buyer, wait for the tree to grow back.

use glam::{Vec2, Vec3};
use lj_core::math::planar;
use lj_core::{EntityId, Pose, World, prefab};
use lj_simulation::InputSnapshot;

use crate::scene::DemoActors;

/// Stop walking this close to the trunk and start swinging.
const CHOP_DISTANCE: f32 = 2.0;
/// Press interact this close to a log.
const PICKUP_DISTANCE: f32 = 1.2;
/// Stop walking this close to the buyer's centre.
const ZONE_ARRIVAL: f32 = 0.5;
/// Frames between swings.
const STRIKE_INTERVAL: u32 = 20;

/// What the autopilot is doing this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Goal {
    Chop,
    Collect(EntityId),
    Deliver,
    Wait,
}

#[derive(Debug)]
pub struct Autopilot {
    actors: DemoActors,
    cooldown: u32,
    goal: Goal,
}

impl Autopilot {
    pub fn new(actors: DemoActors) -> Self {
        Self {
            actors,
            cooldown: 0,
            goal: Goal::Wait,
        }
    }

    /// Decide the input for the next frame from the current scene.
    pub fn next_input(&mut self, world: &World) -> InputSnapshot {
        self.cooldown = self.cooldown.saturating_sub(1);
        let Some(me) = world.pose(self.actors.player) else {
            return InputSnapshot::idle();
        };
        let basis_yaw = world
            .pose(self.actors.camera)
            .map_or(0.0, |p| p.yaw_degrees());

        self.goal = self.choose_goal(world, &me);
        match self.goal {
            Goal::Deliver => match world.pose(self.actors.zone) {
                Some(zone) => walk_towards(&me, zone.position, ZONE_ARRIVAL, basis_yaw),
                None => InputSnapshot::idle(),
            },
            Goal::Collect(log) => {
                let Some(target) = world.pose(log) else {
                    return InputSnapshot::idle();
                };
                if planar(target.position - me.position).length() <= PICKUP_DISTANCE {
                    if self.cooldown == 0 {
                        self.cooldown = 2;
                        return InputSnapshot::interact();
                    }
                    return InputSnapshot::idle();
                }
                walk_towards(&me, target.position, PICKUP_DISTANCE, basis_yaw)
            }
            Goal::Chop => {
                let Some(tree) = world.pose(self.actors.tree) else {
                    return InputSnapshot::idle();
                };
                if planar(tree.position - me.position).length() <= CHOP_DISTANCE {
                    if self.cooldown == 0 {
                        self.cooldown = STRIKE_INTERVAL;
                        return InputSnapshot::strike();
                    }
                    return InputSnapshot::idle();
                }
                walk_towards(&me, tree.position, CHOP_DISTANCE, basis_yaw)
            }
            Goal::Wait => InputSnapshot::idle(),
        }
    }

    fn choose_goal(&self, world: &World, me: &Pose) -> Goal {
        if !world.children_of(self.actors.player).is_empty() {
            return Goal::Deliver;
        }
        let nearest_log = world
            .query()
            .tag(prefab::LOG_TAG)
            .execute()
            .into_iter()
            .filter(|e| e.attachment.is_none())
            .min_by(|a, b| {
                let da = a.pose.position.distance_squared(me.position);
                let db = b.pose.position.distance_squared(me.position);
                da.total_cmp(&db)
            })
            .map(|e| e.id);
        if let Some(log) = nearest_log {
            return Goal::Collect(log);
        }
        let tree_standing = world
            .get_entity(self.actors.tree)
            .is_some_and(|e| e.visible);
        if tree_standing { Goal::Chop } else { Goal::Wait }
    }
}

/// Stick input that walks from `me` toward `target` in the camera's frame.
fn walk_towards(me: &Pose, target: Vec3, arrival: f32, basis_yaw: f32) -> InputSnapshot {
    let to_target = planar(target - me.position);
    if to_target.length() <= arrival {
        return InputSnapshot::idle();
    }
    let dir = to_target.normalize();
    let basis = Pose::from_yaw(Vec3::ZERO, basis_yaw);
    let axis = Vec2::new(dir.dot(basis.right()), dir.dot(basis.forward()));
    InputSnapshot::moving(axis.x, axis.y)
}
