use std::collections::HashSet;

use lj_core::{EntityId, EntityKind, LayerMask, Pose};

use crate::config::InteractionConfig;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::SimEventKind;
use crate::input::SwingEdge;
use crate::spatial::{QueryFilter, SpatialQuery};
use crate::system::System;
use crate::tree::TreeHit;

/// Axe hitbox driven by swing animation events.
///
/// While the window is open every tree the hitbox touches takes one hit,
/// and no tree is hit twice in the same swing.
#[derive(Debug, Clone, Default)]
pub struct Weapon {
    open: bool,
    hit_this_swing: HashSet<EntityId>,
}

impl Weapon {
    /// Open the damage window and forget the previous swing.
    pub fn begin_window(&mut self) {
        self.open = true;
        self.hit_this_swing.clear();
    }

    /// Close the damage window.
    pub fn end_window(&mut self) {
        self.open = false;
        self.hit_this_swing.clear();
    }

    /// Whether the window is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Record a touch. Returns `true` if it counts as a hit.
    pub fn register(&mut self, tree: EntityId) -> bool {
        self.open && self.hit_this_swing.insert(tree)
    }

    /// Trees already hit during this swing.
    pub fn hits_this_swing(&self) -> usize {
        self.hit_this_swing.len()
    }

    fn apply(&mut self, edge: SwingEdge) {
        match edge {
            SwingEdge::Begin => self.begin_window(),
            SwingEdge::End => self.end_window(),
        }
    }
}

/// Chop and carry state for one player.
#[derive(Debug, Clone)]
pub struct InteractionController {
    player: EntityId,
    carried: Option<EntityId>,
    weapon: Weapon,
}

impl InteractionController {
    /// A controller for `player` with empty hands.
    pub fn new(player: EntityId) -> Self {
        Self {
            player,
            carried: None,
            weapon: Weapon::default(),
        }
    }

    /// The player this controller belongs to.
    pub fn player(&self) -> EntityId {
        self.player
    }

    /// The weapon state.
    pub fn weapon(&self) -> &Weapon {
        &self.weapon
    }

    /// The carried object, without side effects.
    pub fn take_carried(&self) -> Option<EntityId> {
        self.carried
    }

    /// The first standing tree inside the chop volume in front of the player.
    pub fn chop_target(
        &self,
        spatial: &SpatialQuery<'_>,
        pose: &Pose,
        config: &InteractionConfig,
    ) -> Option<EntityId> {
        let center = pose.position + pose.forward() * config.reach;
        let filter = QueryFilter::new(LayerMask::TREE).kind(EntityKind::Tree);
        spatial
            .overlap_sphere(center, config.hit_range, &filter)
            .into_iter()
            .next()
    }

    /// Trees the open weapon window touches for the first time this swing.
    pub fn weapon_hits(
        &mut self,
        spatial: &SpatialQuery<'_>,
        pose: &Pose,
        config: &InteractionConfig,
    ) -> Vec<EntityId> {
        if !self.weapon.is_open() {
            return Vec::new();
        }
        let center = pose.transform_point(config.weapon_offset);
        let filter = QueryFilter::new(LayerMask::TREE).kind(EntityKind::Tree);
        spatial
            .overlap_sphere(center, config.weapon_radius, &filter)
            .into_iter()
            .filter(|tree| self.weapon.register(*tree))
            .collect()
    }

    /// Pick up the first carryable in reach. No-op while already carrying.
    pub fn try_pickup(
        &mut self,
        ctx: &mut SimContext<'_>,
        config: &InteractionConfig,
    ) -> SimResult<Option<EntityId>> {
        if self.carried.is_some() {
            return Ok(None);
        }
        let Some(pose) = ctx.world.pose(self.player) else {
            return Ok(None);
        };
        let filter = QueryFilter::new(LayerMask::ALL.without(LayerMask::CARRIED))
            .tag(config.carry_tag.as_str())
            .exclude(self.player);
        let candidate = ctx
            .spatial()
            .overlap_sphere(pose.position, config.pickup_radius, &filter)
            .into_iter()
            .find(|id| ctx.world.parent_of(*id).is_none());
        let Some(item) = candidate else {
            return Ok(None);
        };

        if let Ok(body) = ctx.world.body_mut(item) {
            body.kinematic = true;
            body.velocity = glam::Vec3::ZERO;
        }
        if ctx.world.set_layer(item, LayerMask::CARRIED).is_err() {
            log::debug!("carried object {item} has no collider");
        }
        ctx.world.attach(item, self.player, Pose::at(config.carry_offset))?;
        self.carried = Some(item);

        ctx.emit(
            SimEventKind::PickedUp {
                player: self.player,
                item,
            },
            format!("{} picked up {item}", self.player),
        );
        Ok(Some(item))
    }

    /// Release the carried object with a forward push.
    pub fn drop_carried(
        &mut self,
        ctx: &mut SimContext<'_>,
        config: &InteractionConfig,
    ) -> SimResult<Option<EntityId>> {
        let Some(item) = self.carried.take() else {
            return Ok(None);
        };
        if !ctx.world.contains(item) {
            return Ok(None);
        }
        let forward = ctx
            .world
            .pose(self.player)
            .map_or(glam::Vec3::Z, |p| p.forward());

        ctx.world.detach(item)?;
        if ctx.world.set_layer(item, LayerMask::LOG).is_err() {
            log::debug!("dropped object {item} has no collider");
        }
        if let Ok(body) = ctx.world.body_mut(item) {
            body.kinematic = false;
            body.apply_velocity_change(forward * config.drop_impulse);
        }

        ctx.emit(
            SimEventKind::Dropped {
                player: self.player,
                item,
            },
            format!("{} dropped {item}", self.player),
        );
        Ok(Some(item))
    }

    /// Destroy the carried object and empty the hands.
    pub fn clear_carried(&mut self, ctx: &mut SimContext<'_>) -> SimResult<Option<EntityId>> {
        let Some(item) = self.carried.take() else {
            return Ok(None);
        };
        match ctx.despawn(item) {
            Ok(_) | Err(SimError::World(lj_core::LjError::EntityNotFound(_))) => Ok(Some(item)),
            Err(e) => Err(e),
        }
    }
}

/// Turns strike, interact and swing input into chops and carry changes.
#[derive(Debug)]
pub struct InteractionSystem {
    config: InteractionConfig,
    controllers: Vec<InteractionController>,
    hits: Vec<TreeHit>,
}

impl Default for InteractionSystem {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl InteractionSystem {
    /// Create an interaction system with the given tuning.
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            controllers: Vec::new(),
            hits: Vec::new(),
        }
    }

    /// The controller for a player, if tracked.
    pub fn controller(&self, player: EntityId) -> Option<&InteractionController> {
        self.controllers.iter().find(|c| c.player == player)
    }

    fn controller_mut(&mut self, player: EntityId) -> Option<&mut InteractionController> {
        self.controllers.iter_mut().find(|c| c.player == player)
    }

    /// The object `player` carries, without side effects.
    pub fn take_carried(&self, player: EntityId) -> Option<EntityId> {
        self.controller(player).and_then(InteractionController::take_carried)
    }

    /// Destroy what `player` carries and clear the relation.
    pub fn clear_carried(
        &mut self,
        ctx: &mut SimContext<'_>,
        player: EntityId,
    ) -> SimResult<Option<EntityId>> {
        match self.controller_mut(player) {
            Some(controller) => controller.clear_carried(ctx),
            None => Ok(None),
        }
    }

    /// Take the tree hits collected since the last drain.
    pub fn drain_hits(&mut self) -> Vec<TreeHit> {
        std::mem::take(&mut self.hits)
    }

    fn sync(&mut self, ctx: &SimContext<'_>) {
        self.controllers.retain(|c| ctx.world.contains(c.player));
        for controller in &mut self.controllers {
            if let Some(item) = controller.carried
                && ctx.world.parent_of(item) != Some(controller.player)
            {
                log::debug!("{} lost hold of {item}", controller.player);
                controller.carried = None;
            }
        }
        for id in ctx.world.ids_by_kind(&EntityKind::Player) {
            if self.controller(id).is_none() {
                self.controllers.push(InteractionController::new(id));
            }
        }
    }
}

impl System for InteractionSystem {
    fn name(&self) -> &str {
        "interaction"
    }

    fn init(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        self.sync(ctx);
        Ok(())
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        self.sync(ctx);
        let input = ctx.input.clone();

        for controller in &mut self.controllers {
            let Some(pose) = ctx.world.pose(controller.player) else {
                continue;
            };
            let by = Some(controller.player);

            if let Some(edge) = input.swing {
                controller.weapon.apply(edge);
            }
            for tree in controller.weapon_hits(&ctx.spatial(), &pose, &self.config) {
                self.hits.push(TreeHit {
                    tree,
                    damage: self.config.damage,
                    by,
                });
            }

            if input.strike
                && let Some(tree) = controller.chop_target(&ctx.spatial(), &pose, &self.config)
            {
                log::debug!("{} chops {tree}", controller.player);
                self.hits.push(TreeHit {
                    tree,
                    damage: self.config.damage,
                    by,
                });
            }

            if input.interact {
                if controller.carried.is_none() {
                    controller.try_pickup(ctx, &self.config)?;
                } else {
                    controller.drop_carried(ctx, &self.config)?;
                }
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use lj_core::prefab;
    use lj_core::{Pose, TreeComponent};

    use super::*;
    use crate::testing::Harness;

    fn setup() -> (Harness, EntityId) {
        let mut h = Harness::new();
        let player = prefab::spawn_player(&mut h.world, "Jack", Pose::IDENTITY).unwrap();
        (h, player)
    }

    #[test]
    fn weapon_hits_each_tree_once_per_swing() {
        let mut weapon = Weapon::default();
        let tree = EntityId::new();
        assert!(!weapon.register(tree));

        weapon.begin_window();
        assert!(weapon.register(tree));
        assert!(!weapon.register(tree));
        assert_eq!(weapon.hits_this_swing(), 1);

        weapon.end_window();
        assert!(!weapon.register(tree));
        weapon.begin_window();
        assert!(weapon.register(tree));
    }

    #[test]
    fn chop_picks_first_tree_in_front() {
        let (mut h, player) = setup();
        let near = prefab::spawn_tree(
            &mut h.world,
            "A",
            Pose::at(Vec3::new(0.5, 0.0, 1.5)),
            TreeComponent::default(),
        )
        .unwrap();
        prefab::spawn_tree(
            &mut h.world,
            "B",
            Pose::at(Vec3::new(-0.5, 0.0, 1.5)),
            TreeComponent::default(),
        )
        .unwrap();
        prefab::spawn_tree(
            &mut h.world,
            "Behind",
            Pose::at(Vec3::new(0.0, 0.0, -4.0)),
            TreeComponent::default(),
        )
        .unwrap();

        let controller = InteractionController::new(player);
        let pose = h.world.pose(player).unwrap();
        let target = controller.chop_target(
            &SpatialQuery::new(&h.world),
            &pose,
            &InteractionConfig::default(),
        );
        assert_eq!(target, Some(near));

        let facing_away = Pose::from_yaw(Vec3::ZERO, 90.0);
        let mut far = Harness::new();
        prefab::spawn_tree(
            &mut far.world,
            "Lone",
            Pose::at(Vec3::new(-5.0, 0.0, 0.0)),
            TreeComponent::default(),
        )
        .unwrap();
        assert_eq!(
            controller.chop_target(
                &SpatialQuery::new(&far.world),
                &facing_away,
                &InteractionConfig::default(),
            ),
            None
        );
    }

    #[test]
    fn pickup_attaches_and_second_pickup_is_noop() {
        let (mut h, player) = setup();
        let log_a = prefab::spawn_log(&mut h.world, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let log_b = prefab::spawn_log(&mut h.world, Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        let config = InteractionConfig::default();
        let mut controller = InteractionController::new(player);

        let picked = controller.try_pickup(&mut h.ctx(), &config).unwrap();
        assert_eq!(picked, Some(log_a));
        assert_eq!(controller.take_carried(), Some(log_a));
        assert_eq!(h.world.parent_of(log_a), Some(player));
        assert_eq!(h.world.pose(log_a).unwrap().position, config.carry_offset);
        let entity = h.world.get_entity(log_a).unwrap();
        assert!(entity.components.body.unwrap().kinematic);
        assert_eq!(entity.components.collider.unwrap().layer, LayerMask::CARRIED);

        assert_eq!(controller.try_pickup(&mut h.ctx(), &config).unwrap(), None);
        assert_eq!(controller.take_carried(), Some(log_a));
        assert!(h.world.parent_of(log_b).is_none());
    }

    #[test]
    fn pickup_ignores_untagged_objects() {
        let (mut h, player) = setup();
        prefab::spawn_obstacle(&mut h.world, "Rock", Vec3::X, Vec3::splat(0.3)).unwrap();
        let mut controller = InteractionController::new(player);
        let picked = controller
            .try_pickup(&mut h.ctx(), &InteractionConfig::default())
            .unwrap();
        assert_eq!(picked, None);
    }

    #[test]
    fn drop_releases_with_forward_push() {
        let (mut h, player) = setup();
        let log = prefab::spawn_log(&mut h.world, Vec3::new(0.0, 0.0, 1.0)).unwrap();
        let config = InteractionConfig::default();
        let mut controller = InteractionController::new(player);
        controller.try_pickup(&mut h.ctx(), &config).unwrap();

        let dropped = controller.drop_carried(&mut h.ctx(), &config).unwrap();
        assert_eq!(dropped, Some(log));
        assert_eq!(controller.take_carried(), None);
        assert!(h.world.parent_of(log).is_none());

        let entity = h.world.get_entity(log).unwrap();
        let body = entity.components.body.unwrap();
        assert!(!body.kinematic);
        assert!((body.velocity - Vec3::Z * 2.0).length() < 1e-5);
        assert_eq!(entity.components.collider.unwrap().layer, LayerMask::LOG);
        // Kept the carry pose.
        assert_eq!(entity.pose.position, config.carry_offset);
    }

    #[test]
    fn clear_carried_destroys_object() {
        let (mut h, player) = setup();
        let log = prefab::spawn_log(&mut h.world, Vec3::X).unwrap();
        let mut controller = InteractionController::new(player);
        controller
            .try_pickup(&mut h.ctx(), &InteractionConfig::default())
            .unwrap();

        assert_eq!(controller.clear_carried(&mut h.ctx()).unwrap(), Some(log));
        assert!(!h.world.contains(log));
        assert_eq!(controller.clear_carried(&mut h.ctx()).unwrap(), None);
    }
}
