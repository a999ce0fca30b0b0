use std::path::Path;

use glam::Vec3;
use lj_core::LayerMask;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Configuration for a simulation run.
///
/// Every field has a default, so a JSON file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for deterministic log drops.
    pub seed: u64,
    /// Fixed physics step in seconds.
    pub fixed_dt: f32,
    /// Upper bound on fixed steps per frame.
    pub max_fixed_steps: u32,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Player movement tuning.
    pub movement: MovementConfig,
    /// Camera rig tuning.
    pub camera: CameraConfig,
    /// Chop, carry and weapon tuning.
    pub interaction: InteractionConfig,
    /// Tree felling and respawn tuning.
    pub tree: TreeConfig,
    /// Starting economy state.
    pub economy: EconomyConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            fixed_dt: 0.02,
            max_fixed_steps: 5,
            max_events: 10_000,
            movement: MovementConfig::default(),
            camera: CameraConfig::default(),
            interaction: InteractionConfig::default(),
            tree: TreeConfig::default(),
            economy: EconomyConfig::default(),
        }
    }
}

/// Player movement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Top planar speed in units per second.
    pub move_speed: f32,
    /// Smoothing time for velocity changes.
    pub accel_time: f32,
    /// Smoothing time for heading changes.
    pub turn_smooth_time: f32,
    /// Reinterpret purely sideways input as diagonal-forward.
    pub lateral_to_diagonal: bool,
    /// Gap kept between the player and whatever blocked the sweep.
    pub skin_width: f32,
    /// Layers that block player movement.
    pub blocking_layers: LayerMask,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            accel_time: 0.12,
            turn_smooth_time: 0.08,
            lateral_to_diagonal: false,
            skin_width: 0.02,
            blocking_layers: LayerMask::OBSTACLE | LayerMask::TREE,
        }
    }
}

/// Camera rig tuning. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial orbit distance, restored by a reset.
    pub distance: f32,
    /// Height of the orbit pivot above the target.
    pub height: f32,
    /// Lowest pitch.
    pub min_pitch: f32,
    /// Highest pitch.
    pub max_pitch: f32,
    /// Pitch restored by a reset.
    pub default_pitch: f32,
    /// Only orbit while the orbit modifier is held.
    pub hold_to_orbit: bool,
    /// Yaw degrees per unit of horizontal look delta per second.
    pub yaw_sensitivity: f32,
    /// Pitch degrees per unit of vertical look delta per second.
    pub pitch_sensitivity: f32,
    /// Invert vertical look.
    pub invert_y: bool,
    /// Swing behind the target while it moves.
    pub auto_align: bool,
    /// Auto-align rate.
    pub align_speed: f32,
    /// Only auto-align while the target moves forward.
    pub align_only_when_forward: bool,
    /// Position smoothing time.
    pub pos_smooth_time: f32,
    /// Rotation smoothing rate.
    pub rot_smooth: f32,
    /// Radius of the obstruction sweep.
    pub clip_radius: f32,
    /// Layers that push the camera in.
    pub obstruction_mask: LayerMask,
    /// Distance change per unit of scroll per second.
    pub zoom_speed: f32,
    /// Closest zoom.
    pub min_distance: f32,
    /// Farthest zoom.
    pub max_distance: f32,
    /// How far ahead of a moving target the camera looks.
    pub look_ahead: f32,
    /// Offset used by follow rigs.
    pub follow_offset: Vec3,
    /// Position blend rate used by follow rigs.
    pub follow_smooth: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 4.5,
            height: 1.4,
            min_pitch: 12.0,
            max_pitch: 55.0,
            default_pitch: 22.0,
            hold_to_orbit: true,
            yaw_sensitivity: 150.0,
            pitch_sensitivity: 100.0,
            invert_y: false,
            auto_align: true,
            align_speed: 2.5,
            align_only_when_forward: true,
            pos_smooth_time: 0.08,
            rot_smooth: 12.0,
            clip_radius: 0.2,
            obstruction_mask: LayerMask::ALL.without(
                LayerMask::PLAYER | LayerMask::LOG | LayerMask::CARRIED | LayerMask::ZONE,
            ),
            zoom_speed: 5.0,
            min_distance: 2.5,
            max_distance: 7.5,
            look_ahead: 0.6,
            follow_offset: Vec3::new(0.0, 6.0, -6.0),
            follow_smooth: 10.0,
        }
    }
}

/// Chop, carry and weapon tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Distance in front of the player where the chop volume is centered.
    pub reach: f32,
    /// Radius of the chop volume.
    pub hit_range: f32,
    /// Damage per chop or weapon hit.
    pub damage: i32,
    /// Radius searched for carryable objects.
    pub pickup_radius: f32,
    /// Tag an object needs to be picked up.
    pub carry_tag: String,
    /// Carry point in the player's local space.
    pub carry_offset: Vec3,
    /// Forward velocity change applied on drop.
    pub drop_impulse: f32,
    /// Weapon hitbox center in the player's local space.
    pub weapon_offset: Vec3,
    /// Weapon hitbox radius.
    pub weapon_radius: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            reach: 1.0,
            hit_range: 2.0,
            damage: 1,
            pickup_radius: 2.0,
            carry_tag: "log".to_string(),
            carry_offset: Vec3::new(0.0, 1.1, 0.6),
            drop_impulse: 2.0,
            weapon_offset: Vec3::new(0.0, 1.0, 0.9),
            weapon_radius: 0.5,
        }
    }
}

/// Tree felling and respawn tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Health given to trees built from this config.
    pub default_health: i32,
    /// Seconds from felling to respawn.
    pub respawn_delay: f32,
    /// Fewest logs dropped by a felled tree.
    pub min_logs: u32,
    /// Most logs dropped by a felled tree.
    pub max_logs: u32,
    /// Radius of the random scatter around the drop point.
    pub drop_jitter: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            default_health: 3,
            respawn_delay: 10.0,
            min_logs: 1,
            max_logs: 2,
            drop_jitter: 0.5,
        }
    }
}

/// Starting economy state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Balance at the start of the run.
    pub starting_balance: u64,
}

impl SimConfig {
    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the fixed physics step.
    pub fn with_fixed_dt(mut self, fixed_dt: f32) -> Self {
        self.fixed_dt = fixed_dt;
        self
    }

    /// Set the cap on fixed steps per frame.
    pub fn with_max_fixed_steps(mut self, steps: u32) -> Self {
        self.max_fixed_steps = steps;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Replace the movement tuning.
    pub fn with_movement(mut self, movement: MovementConfig) -> Self {
        self.movement = movement;
        self
    }

    /// Replace the camera tuning.
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Replace the interaction tuning.
    pub fn with_interaction(mut self, interaction: InteractionConfig) -> Self {
        self.interaction = interaction;
        self
    }

    /// Replace the tree tuning.
    pub fn with_tree(mut self, tree: TreeConfig) -> Self {
        self.tree = tree;
        self
    }

    /// Replace the starting economy state.
    pub fn with_economy(mut self, economy: EconomyConfig) -> Self {
        self.economy = economy;
        self
    }

    /// Parse a config from JSON and validate it.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file and validate it.
    pub fn load(path: &Path) -> SimResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| SimError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject values the systems cannot run with.
    pub fn validate(&self) -> SimResult<()> {
        let invalid = |msg: String| Err(SimError::InvalidConfig(msg));

        if self.fixed_dt.is_nan() || self.fixed_dt <= 0.0 {
            return invalid(format!("fixed_dt must be positive, got {}", self.fixed_dt));
        }
        if self.max_fixed_steps == 0 {
            return invalid("max_fixed_steps must be at least 1".into());
        }

        let m = &self.movement;
        if m.move_speed < 0.0 || m.accel_time < 0.0 || m.turn_smooth_time < 0.0 {
            return invalid("movement speeds and smoothing times must not be negative".into());
        }

        let c = &self.camera;
        if c.min_pitch > c.max_pitch {
            return invalid(format!(
                "camera pitch range is inverted: {} > {}",
                c.min_pitch, c.max_pitch
            ));
        }
        if c.min_distance > c.max_distance {
            return invalid(format!(
                "camera zoom range is inverted: {} > {}",
                c.min_distance, c.max_distance
            ));
        }
        if c.clip_radius < 0.0 {
            return invalid("camera clip_radius must not be negative".into());
        }

        let i = &self.interaction;
        if i.hit_range < 0.0 || i.pickup_radius < 0.0 || i.weapon_radius < 0.0 {
            return invalid("interaction radii must not be negative".into());
        }

        let t = &self.tree;
        if t.default_health <= 0 {
            return invalid(format!(
                "tree default_health must be positive, got {}",
                t.default_health
            ));
        }
        if t.min_logs > t.max_logs {
            return invalid(format!(
                "tree log range is inverted: {} > {}",
                t.min_logs, t.max_logs
            ));
        }
        if t.respawn_delay < 0.0 {
            return invalid("tree respawn_delay must not be negative".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn config_default_values() {
        let config = SimConfig::default();
        assert_eq!(config.seed, 42);
        assert!((config.fixed_dt - 0.02).abs() < f32::EPSILON);
        assert_eq!(config.movement.move_speed, 5.0);
        assert_eq!(config.camera.distance, 4.5);
        assert_eq!(config.tree.respawn_delay, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_chain() {
        let config = SimConfig::default()
            .with_seed(123)
            .with_fixed_dt(0.01)
            .with_max_events(500);
        assert_eq!(config.seed, 123);
        assert!((config.fixed_dt - 0.01).abs() < f32::EPSILON);
        assert_eq!(config.max_events, 500);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SimConfig::from_json_str(r#"{ "seed": 7, "tree": { "respawn_delay": 2.5 } }"#)
            .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.tree.respawn_delay, 2.5);
        assert_eq!(config.tree.default_health, 3);
        assert_eq!(config.camera.max_pitch, 55.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero_step = SimConfig::default().with_fixed_dt(0.0);
        assert!(matches!(zero_step.validate(), Err(SimError::InvalidConfig(_))));

        let mut pitch = SimConfig::default();
        pitch.camera.min_pitch = 60.0;
        assert!(pitch.validate().is_err());

        let mut zoom = SimConfig::default();
        zoom.camera.min_distance = 10.0;
        assert!(zoom.validate().is_err());

        let no_health = SimConfig::default().with_tree(TreeConfig {
            default_health: 0,
            ..TreeConfig::default()
        });
        assert!(no_health.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            SimConfig::from_json_str("{ seed: }"),
            Err(SimError::ConfigParse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "economy": {{ "starting_balance": 20 }} }}"#).unwrap();
        let config = SimConfig::load(file.path()).unwrap();
        assert_eq!(config.economy.starting_balance, 20);

        let missing = SimConfig::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(missing, Err(SimError::ConfigIo { .. })));
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let json = serde_json::to_string_pretty(&SimConfig::default()).unwrap();
        assert_eq!(SimConfig::from_json_str(&json).unwrap(), SimConfig::default());
    }
}
