use glam::{Vec2, Vec3};
use lj_core::math::{heading_degrees, planar, smooth_damp, smooth_damp_angle};
use lj_core::{EntityId, EntityKind, Pose, Shape};

use crate::config::MovementConfig;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::spatial::QueryFilter;
use crate::system::System;

/// Below this planar speed the heading is left alone.
const HEADING_EPSILON: f32 = 0.01;
/// Axis magnitude treated as "pressed".
const AXIS_DEADZONE: f32 = 0.1;

/// Axes the raw input is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFrame {
    /// `y` is world +Z, `x` is world +X.
    World,
    /// `y` is the camera's ground-plane forward.
    Camera(EntityId),
}

/// Smoothing state kept between fixed steps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementState {
    /// Spring velocity for the x/z smoothing.
    pub velocity_ref: Vec3,
    /// Spring velocity for the heading smoothing.
    pub turn_velocity: f32,
    /// Planar speed the input asks for.
    pub target_speed: f32,
    /// Planar speed after the last step.
    pub current_speed: f32,
}

/// Movement summary handed to camera rigs after each fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveReport {
    /// The moving player.
    pub player: EntityId,
    /// Unit ground-plane direction the input resolves to, or zero.
    pub direction: Vec3,
    /// Whether the input pushes forward relative to the camera.
    pub moving_forward: bool,
}

/// Velocity and turn smoothing for one player.
#[derive(Debug, Clone)]
pub struct MovementController {
    entity: EntityId,
    frame: ReferenceFrame,
    config: MovementConfig,
    state: MovementState,
    axis: Vec2,
    target_velocity: Vec3,
    enabled: bool,
}

impl MovementController {
    /// A controller for `entity` reading input in world axes.
    pub fn new(entity: EntityId, config: MovementConfig) -> Self {
        Self {
            entity,
            frame: ReferenceFrame::World,
            config,
            state: MovementState::default(),
            axis: Vec2::ZERO,
            target_velocity: Vec3::ZERO,
            enabled: true,
        }
    }

    /// Read input relative to another frame.
    pub fn with_frame(mut self, frame: ReferenceFrame) -> Self {
        self.frame = frame;
        self
    }

    /// The controlled entity.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// The input frame.
    pub fn frame(&self) -> ReferenceFrame {
        self.frame
    }

    /// Smoothing state.
    pub fn state(&self) -> &MovementState {
        &self.state
    }

    /// Whether the controller moves its entity.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Planar velocity the current input asks for.
    pub fn target_velocity(&self) -> Vec3 {
        self.target_velocity
    }

    /// Feed one frame of raw input. `basis_yaw` is the heading of the
    /// reference frame in degrees, `None` for world axes.
    pub fn set_input(&mut self, raw: Vec2, basis_yaw: Option<f32>) {
        let mut axis = raw.clamp_length_max(1.0);
        if self.config.lateral_to_diagonal
            && axis.y.abs() < AXIS_DEADZONE
            && axis.x.abs() > AXIS_DEADZONE
        {
            axis = Vec2::new(axis.x, axis.x.abs()).clamp_length_max(1.0);
        }
        self.axis = axis;

        let pose = Pose::from_yaw(Vec3::ZERO, basis_yaw.unwrap_or(0.0));
        let forward = planar(pose.forward()).normalize_or_zero();
        let right = planar(pose.right()).normalize_or_zero();
        self.target_velocity = (right * axis.x + forward * axis.y) * self.config.move_speed;
        self.state.target_speed = self.target_velocity.length();
    }

    /// Advance one fixed step from the body's current velocity and heading.
    /// Returns the new velocity and heading in degrees.
    pub fn step(&mut self, velocity: Vec3, yaw: f32, dt: f32) -> (Vec3, f32) {
        let target = self.target_velocity;
        let accel = self.config.accel_time;
        let new_velocity = Vec3::new(
            smooth_damp(velocity.x, target.x, &mut self.state.velocity_ref.x, accel, dt),
            velocity.y,
            smooth_damp(velocity.z, target.z, &mut self.state.velocity_ref.z, accel, dt),
        );

        let ground = planar(new_velocity);
        let new_yaw = if ground.length() > HEADING_EPSILON {
            smooth_damp_angle(
                yaw,
                heading_degrees(ground),
                &mut self.state.turn_velocity,
                self.config.turn_smooth_time,
                dt,
            )
        } else {
            yaw
        };

        self.state.current_speed = ground.length();
        (new_velocity, new_yaw)
    }

    /// Record the velocity that survived collision.
    pub fn record_velocity(&mut self, velocity: Vec3) {
        self.state.current_speed = planar(velocity).length();
    }

    /// Current planar speed over top speed, for the animator.
    pub fn speed_ratio(&self) -> f32 {
        if self.config.move_speed > 0.0 {
            self.state.current_speed / self.config.move_speed
        } else {
            0.0
        }
    }

    /// What the camera should know about this frame's movement.
    pub fn report(&self) -> MoveReport {
        MoveReport {
            player: self.entity,
            direction: planar(self.target_velocity).normalize_or_zero(),
            moving_forward: self.axis.y > AXIS_DEADZONE,
        }
    }
}

/// Moves every player from the frame input, sweeping against blocking layers.
#[derive(Debug)]
pub struct MovementSystem {
    config: MovementConfig,
    controllers: Vec<MovementController>,
    reports: Vec<MoveReport>,
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new(MovementConfig::default())
    }
}

impl MovementSystem {
    /// Create a movement system with the given tuning.
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            controllers: Vec::new(),
            reports: Vec::new(),
        }
    }

    /// The controller for a player, if tracked.
    pub fn controller(&self, player: EntityId) -> Option<&MovementController> {
        self.controllers.iter().find(|c| c.entity == player)
    }

    /// All tracked controllers.
    pub fn controllers(&self) -> &[MovementController] {
        &self.controllers
    }

    /// Take the reports produced since the last drain.
    pub fn drain_reports(&mut self) -> Vec<MoveReport> {
        std::mem::take(&mut self.reports)
    }

    fn sync(&mut self, ctx: &mut SimContext<'_>) {
        self.controllers.retain(|c| ctx.world.contains(c.entity));

        let untracked: Vec<EntityId> = ctx
            .world
            .ids_by_kind(&EntityKind::Player)
            .into_iter()
            .filter(|id| self.controller(*id).is_none())
            .collect();

        for id in untracked {
            let camera = ctx
                .world
                .entities_by_kind(&EntityKind::CameraRig)
                .into_iter()
                .find(|e| e.components.camera.is_some_and(|c| c.target == Some(id)))
                .map(|e| e.id);
            let frame = camera.map_or(ReferenceFrame::World, ReferenceFrame::Camera);
            let mut controller = MovementController::new(id, self.config.clone()).with_frame(frame);

            let has_body = ctx
                .world
                .get_entity(id)
                .is_some_and(|e| e.components.body.is_some());
            if !has_body {
                log::warn!("player {id} has no body; movement disabled");
                ctx.emit(
                    SimEventKind::ComponentDisabled {
                        entity: id,
                        reason: "no body".into(),
                    },
                    format!("Movement disabled for {id}: no body"),
                );
                controller.enabled = false;
            }
            self.controllers.push(controller);
        }
    }

    fn move_one(&mut self, index: usize, ctx: &mut SimContext<'_>, dt: f32) -> SimResult<()> {
        let controller = &mut self.controllers[index];
        let id = controller.entity;
        let Some(entity) = ctx.world.get_entity(id) else {
            return Ok(());
        };
        let Some(body) = entity.components.body else {
            return Ok(());
        };
        if body.kinematic {
            return Ok(());
        }
        let pose = entity.pose;
        let (radius, offset) = match entity.components.collider {
            Some(c) => match c.shape {
                Shape::Sphere { radius } => (radius, c.offset),
                Shape::Box { half_extents } => (half_extents.max_element(), c.offset),
            },
            None => (lj_core::prefab::PLAYER_RADIUS, Vec3::ZERO),
        };

        let (mut velocity, yaw) = controller.step(body.velocity, pose.yaw_degrees(), dt);

        let mut position = pose.position;
        let displacement = planar(velocity) * dt;
        if let Some(dir) = displacement.try_normalize() {
            let distance = displacement.length();
            let skin = self.config.skin_width;
            let filter = QueryFilter::new(self.config.blocking_layers).exclude(id);
            match ctx
                .spatial()
                .sphere_cast(position + offset, radius, dir, distance + skin, &filter)
            {
                Some(hit) => {
                    let allowed = (hit.distance - skin).clamp(0.0, distance);
                    position += dir * allowed;
                    let normal = planar(hit.normal).normalize_or_zero();
                    let into = velocity.dot(normal);
                    if into < 0.0 {
                        velocity -= normal * into;
                    }
                    log::debug!("{id} blocked by {} after {allowed:.3}", hit.entity);
                }
                None => position += displacement,
            }
        }
        position.y += velocity.y * dt;

        controller.record_velocity(velocity);
        let report = controller.report();

        ctx.world.set_pose(id, Pose::from_yaw(position, yaw))?;
        ctx.world.body_mut(id)?.velocity = velocity;
        self.reports.push(report);
        Ok(())
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn init(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        self.sync(ctx);
        Ok(())
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        self.sync(ctx);
        let raw = ctx.input.move_axis;
        for controller in self.controllers.iter_mut().filter(|c| c.enabled) {
            let basis = match controller.frame {
                ReferenceFrame::World => None,
                ReferenceFrame::Camera(cam) => ctx.world.pose(cam).map(|p| p.yaw_degrees()),
            };
            controller.set_input(raw, basis);
        }
        Ok(())
    }

    fn fixed_tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let dt = ctx.fixed_dt();
        for index in 0..self.controllers.len() {
            if self.controllers[index].enabled {
                self.move_one(index, ctx, dt)?;
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
