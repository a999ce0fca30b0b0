//! Third-person camera rigs.
//!
//! An orbit rig keeps yaw, pitch and distance around its target, lets the
//! look input orbit it, swings it behind a target that walks forward, zooms
//! with the scroll wheel and pulls in when geometry blocks the view. A
//! follow rig trails its target at a fixed offset.

use glam::{EulerRot, Quat, Vec2, Vec3};
use lj_core::math::{exp_blend, heading_degrees, lerp_angle, look_rotation, smooth_damp_vec3};
use lj_core::{CameraMode, EntityId, EntityKind, Pose};

use crate::config::CameraConfig;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::input::InputSnapshot;
use crate::movement::MoveReport;
use crate::spatial::{QueryFilter, SpatialQuery};
use crate::system::System;

/// Fraction of the pivot height the camera looks at.
const FOCUS_HEIGHT_FACTOR: f32 = 0.6;
/// Squared length below which a move direction counts as "not moving".
const MOVING_EPSILON_SQ: f32 = 0.01;
/// Scroll deltas smaller than this are ignored.
const SCROLL_DEADZONE: f32 = 0.001;

/// State of one camera rig.
#[derive(Debug, Clone)]
pub struct CameraRig {
    entity: EntityId,
    target: Option<EntityId>,
    mode: CameraMode,
    config: CameraConfig,
    enabled: bool,
    yaw: f32,
    pitch: f32,
    distance: f32,
    default_distance: f32,
    pos_velocity: Vec3,
    last_move_dir: Vec3,
    moving_forward: bool,
}

impl CameraRig {
    /// A rig for camera `entity` following `target`.
    pub fn new(
        entity: EntityId,
        target: Option<EntityId>,
        mode: CameraMode,
        config: CameraConfig,
    ) -> Self {
        let pitch = config.default_pitch.clamp(config.min_pitch, config.max_pitch);
        Self {
            entity,
            target,
            mode,
            enabled: target.is_some(),
            yaw: 0.0,
            pitch,
            distance: config.distance,
            default_distance: config.distance,
            pos_velocity: Vec3::ZERO,
            last_move_dir: Vec3::ZERO,
            moving_forward: false,
            config,
        }
    }

    /// The camera entity.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// The followed entity.
    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Positioning model.
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Whether the rig updates.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Orbit yaw in degrees.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Orbit pitch in degrees.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Orbit distance.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Position smoothing velocity.
    pub fn pos_velocity(&self) -> Vec3 {
        self.pos_velocity
    }

    /// Record what the target's movement controller reported.
    pub fn report_move(&mut self, direction: Vec3, moving_forward: bool) {
        self.last_move_dir = direction;
        self.moving_forward = moving_forward;
    }

    fn clamp_pitch(&self, pitch: f32) -> f32 {
        pitch.clamp(self.config.min_pitch, self.config.max_pitch)
    }

    /// Orbit from look input, scaled by sensitivity and `dt`.
    pub fn apply_look(&mut self, look: Vec2, orbit_held: bool, dt: f32) {
        if self.config.hold_to_orbit && !orbit_held {
            return;
        }
        let sign = if self.config.invert_y { 1.0 } else { -1.0 };
        self.yaw += look.x * self.config.yaw_sensitivity * dt;
        self.pitch += sign * look.y * self.config.pitch_sensitivity * dt;
    }

    /// Swing toward the reported move heading.
    pub fn auto_align(&mut self, dt: f32) {
        if !self.config.auto_align || self.last_move_dir.length_squared() <= MOVING_EPSILON_SQ {
            return;
        }
        if self.config.align_only_when_forward && !self.moving_forward {
            return;
        }
        let target_yaw = heading_degrees(self.last_move_dir);
        self.yaw = lerp_angle(self.yaw, target_yaw, exp_blend(self.config.align_speed, dt));
    }

    /// Zoom from scroll input; positive scroll moves closer.
    pub fn apply_zoom(&mut self, scroll: f32, dt: f32) {
        if scroll.abs() > SCROLL_DEADZONE {
            self.distance = (self.distance - scroll * self.config.zoom_speed * dt)
                .clamp(self.config.min_distance, self.config.max_distance);
        }
    }

    /// Rotation of the orbit arm.
    pub fn orbit_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw.to_radians(), self.pitch.to_radians(), 0.0)
    }

    /// The point the orbit arm starts from.
    pub fn pivot(&self, target: Vec3) -> Vec3 {
        target + Vec3::Y * self.config.height
    }

    /// Where the camera wants to be, before collision.
    pub fn desired_position(&self, target: Vec3) -> Vec3 {
        self.pivot(target) - self.orbit_rotation() * Vec3::Z * self.distance
    }

    /// The point the camera looks at.
    pub fn focus(&self, target: Vec3) -> Vec3 {
        let mut focus = target + Vec3::Y * (self.config.height * FOCUS_HEIGHT_FACTOR);
        if self.config.look_ahead > 0.0 && self.last_move_dir.length_squared() > MOVING_EPSILON_SQ {
            focus += self.last_move_dir.normalize() * self.config.look_ahead;
        }
        focus
    }

    /// Pull the desired position in front of anything between it and the pivot.
    pub fn resolve_obstruction(
        &self,
        spatial: &SpatialQuery<'_>,
        target: Vec3,
        desired: Vec3,
    ) -> Vec3 {
        let from = self.pivot(target);
        let arm = desired - from;
        let Some(dir) = arm.try_normalize() else {
            return desired;
        };
        let mut filter = QueryFilter::new(self.config.obstruction_mask).exclude(self.entity);
        if let Some(t) = self.target {
            filter = filter.exclude(t);
        }
        match spatial.sphere_cast(from, self.config.clip_radius, dir, arm.length(), &filter) {
            Some(hit) => hit.point + hit.normal * self.config.clip_radius,
            None => desired,
        }
    }

    /// One late-phase orbit update. Returns the new camera pose.
    pub fn update_orbit(
        &mut self,
        spatial: &SpatialQuery<'_>,
        target: Vec3,
        current: Pose,
        input: &InputSnapshot,
        dt: f32,
    ) -> Pose {
        self.apply_look(input.look_delta, input.orbit_held, dt);
        self.auto_align(dt);
        self.pitch = self.clamp_pitch(self.pitch);
        self.apply_zoom(input.scroll, dt);

        let desired = self.resolve_obstruction(spatial, target, self.desired_position(target));
        let position = smooth_damp_vec3(
            current.position,
            desired,
            &mut self.pos_velocity,
            self.config.pos_smooth_time,
            dt,
        );
        let rotation = match look_rotation(self.focus(target) - position, Vec3::Y) {
            Some(look) => current
                .rotation
                .slerp(look, exp_blend(self.config.rot_smooth, dt)),
            None => current.rotation,
        };
        Pose::new(position, rotation)
    }

    /// Snap behind the target with default pitch and distance.
    pub fn reset(&mut self, target: &Pose) -> Pose {
        self.yaw = target.yaw_degrees();
        self.pitch = self.clamp_pitch(self.config.default_pitch);
        self.distance = self.default_distance;
        self.pos_velocity = Vec3::ZERO;

        let position = self.desired_position(target.position);
        let focus = target.position + Vec3::Y * (self.config.height * FOCUS_HEIGHT_FACTOR);
        let rotation = look_rotation(focus - position, Vec3::Y).unwrap_or(Quat::IDENTITY);
        Pose::new(position, rotation)
    }

    /// One late-phase follow update. Returns the new camera pose.
    pub fn update_follow(&self, target: Vec3, current: Pose, dt: f32) -> Pose {
        let desired = target + self.config.follow_offset;
        let t = (self.config.follow_smooth * dt).clamp(0.0, 1.0);
        let position = current.position.lerp(desired, t);
        let rotation = look_rotation(target - position, Vec3::Y).unwrap_or(current.rotation);
        Pose::new(position, rotation)
    }
}

/// Positions every camera rig after movement has settled.
#[derive(Debug)]
pub struct CameraSystem {
    config: CameraConfig,
    rigs: Vec<CameraRig>,
}

impl Default for CameraSystem {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl CameraSystem {
    /// Create a camera system with the given tuning.
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            rigs: Vec::new(),
        }
    }

    /// The rig for a camera entity.
    pub fn rig(&self, camera: EntityId) -> Option<&CameraRig> {
        self.rigs.iter().find(|r| r.entity == camera)
    }

    /// All tracked rigs.
    pub fn rigs(&self) -> &[CameraRig] {
        &self.rigs
    }

    /// Forward a movement report to the rigs following that player.
    pub fn report_move(&mut self, report: &MoveReport) {
        for rig in self.rigs.iter_mut().filter(|r| r.target == Some(report.player)) {
            rig.report_move(report.direction, report.moving_forward);
        }
    }

    fn sync(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        self.rigs.retain(|r| ctx.world.contains(r.entity));

        let fresh: Vec<(EntityId, Option<EntityId>, CameraMode)> = ctx
            .world
            .entities_by_kind(&EntityKind::CameraRig)
            .into_iter()
            .filter(|e| self.rig(e.id).is_none())
            .map(|e| {
                let authoring = e.components.camera.unwrap_or_default();
                (e.id, authoring.target, authoring.mode)
            })
            .collect();

        for (id, target, mode) in fresh {
            let mut rig = CameraRig::new(id, target, mode, self.config.clone());
            match target.and_then(|t| ctx.world.pose(t)) {
                Some(target_pose) => {
                    let pose = rig.reset(&target_pose);
                    ctx.world.set_pose(id, pose)?;
                }
                None => {
                    log::warn!("camera {id} has no target; rig disabled");
                    ctx.emit(
                        SimEventKind::ComponentDisabled {
                            entity: id,
                            reason: "no target".into(),
                        },
                        format!("Camera {id} disabled: no target"),
                    );
                    rig.enabled = false;
                }
            }
            self.rigs.push(rig);
        }
        Ok(())
    }
}

impl System for CameraSystem {
    fn name(&self) -> &str {
        "camera"
    }

    fn init(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        self.sync(ctx)
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        self.sync(ctx)
    }

    fn late_tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let dt = ctx.frame_dt();
        for rig in self.rigs.iter_mut().filter(|r| r.enabled) {
            let Some(target_pose) = rig.target.and_then(|t| ctx.world.pose(t)) else {
                continue;
            };
            let Some(current) = ctx.world.pose(rig.entity) else {
                continue;
            };

            let pose = match rig.mode {
                CameraMode::Orbit => {
                    let spatial = ctx.spatial();
                    let mut pose = rig.update_orbit(
                        &spatial,
                        target_pose.position,
                        current,
                        ctx.input,
                        dt,
                    );
                    if ctx.input.reset_camera {
                        pose = rig.reset(&target_pose);
                    }
                    pose
                }
                CameraMode::Follow => rig.update_follow(target_pose.position, current, dt),
            };
            ctx.world.set_pose(rig.entity, pose)?;

            if rig.mode == CameraMode::Orbit && ctx.input.reset_camera {
                ctx.emit(
                    SimEventKind::CameraReset { camera: rig.entity },
                    format!("Camera {} reset", rig.entity),
                );
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
