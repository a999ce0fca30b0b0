use glam::Vec3;
use lj_core::prefab;
use lj_core::{EntityId, EntityKind, Pose, TreeComponent};
use rand::Rng;

use crate::config::TreeConfig;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;
use crate::timer::{Timer, TimerId, TimerKind};

/// Whether a tree can be chopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    /// Upright and taking damage.
    Standing,
    /// Chopped down, waiting to respawn.
    Felled,
}

/// Result of a single hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// The tree was already down or the damage was not positive.
    Ignored,
    /// The tree is still standing.
    Damaged {
        /// Health left.
        remaining: i32,
    },
    /// This hit brought the tree down.
    Felled,
}

/// Runtime state of one choppable tree.
#[derive(Debug, Clone)]
pub struct Tree {
    entity: EntityId,
    max_health: i32,
    health: i32,
    state: TreeState,
    spawn_pose: Pose,
    drop_offset: Vec3,
    respawn_timer: Option<TimerId>,
}

impl Tree {
    /// Track a tree standing at `spawn_pose`.
    pub fn new(entity: EntityId, authoring: &TreeComponent, spawn_pose: Pose) -> Self {
        Self {
            entity,
            max_health: authoring.max_health,
            health: authoring.max_health,
            state: TreeState::Standing,
            spawn_pose,
            drop_offset: authoring.drop_offset,
            respawn_timer: None,
        }
    }

    /// Apply damage. Health only drops while standing, and the tree falls
    /// exactly once when it reaches zero.
    pub fn hit(&mut self, damage: i32) -> HitOutcome {
        if self.state == TreeState::Felled || damage <= 0 {
            return HitOutcome::Ignored;
        }
        self.health -= damage;
        if self.health <= 0 {
            self.state = TreeState::Felled;
            HitOutcome::Felled
        } else {
            HitOutcome::Damaged {
                remaining: self.health,
            }
        }
    }

    /// Stand back up with full health.
    pub fn respawn(&mut self) {
        self.health = self.max_health;
        self.state = TreeState::Standing;
        self.respawn_timer = None;
    }

    /// The tree entity.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Current health.
    pub fn health(&self) -> i32 {
        self.health
    }

    /// Health restored on respawn.
    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Current state.
    pub fn state(&self) -> TreeState {
        self.state
    }

    /// Pose captured when the tree was registered.
    pub fn spawn_pose(&self) -> Pose {
        self.spawn_pose
    }

    /// Pending respawn timer, if felled.
    pub fn respawn_timer(&self) -> Option<TimerId> {
        self.respawn_timer
    }
}

/// A hit on a tree, collected from the interaction system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeHit {
    /// The tree struck.
    pub tree: EntityId,
    /// Damage dealt.
    pub damage: i32,
    /// The striking player.
    pub by: Option<EntityId>,
}

/// Owns tree health, felling side-effects and respawns.
#[derive(Debug)]
pub struct TreeSystem {
    config: TreeConfig,
    trees: Vec<Tree>,
    rejected: Vec<EntityId>,
}

impl Default for TreeSystem {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

impl TreeSystem {
    /// Create a tree system with the given tuning.
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Runtime state of a tree.
    pub fn tree(&self, id: EntityId) -> Option<&Tree> {
        self.trees.iter().find(|t| t.entity == id)
    }

    /// All tracked trees in registration order.
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    fn sync(&mut self, ctx: &mut SimContext<'_>) {
        self.trees.retain(|t| {
            if ctx.world.contains(t.entity) {
                return true;
            }
            if let Some(timer) = t.respawn_timer
                && ctx.timers.cancel(timer)
            {
                log::debug!("tree {} removed; respawn cancelled", t.entity);
            }
            false
        });
        self.rejected.retain(|id| ctx.world.contains(*id));

        let fresh: Vec<(EntityId, TreeComponent, Pose)> = ctx
            .world
            .entities_by_kind(&EntityKind::Tree)
            .into_iter()
            .filter(|e| self.tree(e.id).is_none() && !self.rejected.contains(&e.id))
            .map(|e| {
                let authoring = e.components.tree.unwrap_or(TreeComponent {
                    max_health: self.config.default_health,
                    ..TreeComponent::default()
                });
                (e.id, authoring, e.pose)
            })
            .collect();

        for (id, authoring, pose) in fresh {
            if authoring.max_health <= 0 {
                log::warn!("tree {id} has no health; ignoring it");
                ctx.emit(
                    SimEventKind::ComponentDisabled {
                        entity: id,
                        reason: "non-positive health".into(),
                    },
                    format!("Tree {id} disabled: non-positive health"),
                );
                self.rejected.push(id);
                continue;
            }
            log::debug!("tracking tree {id} with {} health", authoring.max_health);
            self.trees.push(Tree::new(id, &authoring, pose));
        }
    }

    /// Apply a hit and run the felling side-effects when it brings the tree down.
    pub fn apply_hit(&mut self, ctx: &mut SimContext<'_>, hit: &TreeHit) -> SimResult<HitOutcome> {
        let Some(index) = self.trees.iter().position(|t| t.entity == hit.tree) else {
            log::debug!("hit on untracked tree {}", hit.tree);
            return Ok(HitOutcome::Ignored);
        };

        let outcome = self.trees[index].hit(hit.damage);
        match outcome {
            HitOutcome::Ignored => {}
            HitOutcome::Damaged { remaining } => {
                ctx.emit(
                    SimEventKind::TreeHit {
                        tree: hit.tree,
                        by: hit.by,
                        remaining,
                    },
                    format!("Tree {} hit, {remaining} health left", hit.tree),
                );
            }
            HitOutcome::Felled => {
                ctx.emit(
                    SimEventKind::TreeHit {
                        tree: hit.tree,
                        by: hit.by,
                        remaining: self.trees[index].health,
                    },
                    format!("Tree {} hit", hit.tree),
                );
                self.fell(ctx, index)?;
            }
        }
        Ok(outcome)
    }

    fn fell(&mut self, ctx: &mut SimContext<'_>, index: usize) -> SimResult<()> {
        let tree = &mut self.trees[index];
        let id = tree.entity;
        let pose = ctx.world.pose(id).unwrap_or(tree.spawn_pose);
        let drop_point = pose.transform_point(tree.drop_offset);

        let (lo, hi) = (
            self.config.min_logs.min(self.config.max_logs),
            self.config.min_logs.max(self.config.max_logs),
        );
        let count = ctx.rng.random_range(lo..=hi);
        log::info!("tree {id} felled, dropping {count} log(s)");
        ctx.emit(SimEventKind::TreeFelled { tree: id }, format!("Tree {id} felled"));

        for _ in 0..count {
            let jitter = random_in_unit_sphere(&mut *ctx.rng) * self.config.drop_jitter;
            let log = prefab::spawn_log(ctx.world, drop_point + jitter)?;
            ctx.emit(
                SimEventKind::LogSpawned { log, tree: id },
                format!("Log {log} dropped by tree {id}"),
            );
        }

        set_standing(ctx, id, false)?;
        let due = ctx.now() + f64::from(self.config.respawn_delay);
        tree.respawn_timer = Some(ctx.timers.schedule(id, due, TimerKind::TreeRespawn));
        Ok(())
    }

    fn respawn(&mut self, ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<bool> {
        let Some(tree) = self.trees.iter_mut().find(|t| t.entity == id) else {
            return Ok(false);
        };
        if !ctx.world.contains(id) {
            log::debug!("respawn timer fired for removed tree {id}");
            return Ok(false);
        }
        tree.respawn();
        ctx.world.set_pose(id, tree.spawn_pose)?;
        set_standing(ctx, id, true)?;
        log::info!("tree {id} respawned");
        ctx.emit(SimEventKind::TreeRespawned { tree: id }, format!("Tree {id} respawned"));
        Ok(true)
    }
}

/// Show or hide a tree along with its collider.
fn set_standing(ctx: &mut SimContext<'_>, id: EntityId, standing: bool) -> SimResult<()> {
    ctx.world.set_visible(id, standing)?;
    if let Some(entity) = ctx.world.get_entity_mut(id)
        && let Some(collider) = entity.components.collider.as_mut()
    {
        collider.enabled = standing;
    }
    Ok(())
}

/// Uniform sample inside the unit sphere.
fn random_in_unit_sphere(rng: &mut impl Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}

impl System for TreeSystem {
    fn name(&self) -> &str {
        "tree"
    }

    fn init(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        self.sync(ctx);
        Ok(())
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        self.sync(ctx);
        Ok(())
    }

    fn on_timer(&mut self, ctx: &mut SimContext<'_>, timer: &Timer) -> SimResult<bool> {
        match timer.kind {
            TimerKind::TreeRespawn => self.respawn(ctx, timer.owner),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
