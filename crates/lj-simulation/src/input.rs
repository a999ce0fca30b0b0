//! Per-frame input snapshots and scripted input for replay.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A weapon animation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingEdge {
    /// The damaging part of a swing starts.
    Begin,
    /// The damaging part of a swing ends.
    End,
}

/// Everything the host sampled for one frame.
///
/// Button fields are edges: `true` only on the frame the button went down.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    /// Raw movement axes; `x` is right, `y` is forward.
    pub move_axis: Vec2,
    /// Look delta for the orbit camera.
    pub look_delta: Vec2,
    /// Scroll delta; positive zooms in.
    pub scroll: f32,
    /// The orbit modifier is held.
    pub orbit_held: bool,
    /// Chop button pressed.
    pub strike: bool,
    /// Pickup/drop button pressed.
    pub interact: bool,
    /// Camera reset button pressed.
    pub reset_camera: bool,
    /// Weapon window transition fired by the animation.
    pub swing: Option<SwingEdge>,
}

impl InputSnapshot {
    /// No input at all.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Input that only moves.
    pub fn moving(x: f32, y: f32) -> Self {
        Self {
            move_axis: Vec2::new(x, y),
            ..Self::default()
        }
    }

    /// A strike edge.
    pub fn strike() -> Self {
        Self {
            strike: true,
            ..Self::default()
        }
    }

    /// An interact edge.
    pub fn interact() -> Self {
        Self {
            interact: true,
            ..Self::default()
        }
    }

    /// A copy with every edge field cleared, for holding an input over
    /// several frames.
    pub fn held(&self) -> Self {
        Self {
            strike: false,
            interact: false,
            reset_camera: false,
            swing: None,
            ..self.clone()
        }
    }
}

/// One step of an input script: an input held for a number of frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// How many frames the input lasts.
    #[serde(default = "one_frame")]
    pub frames: u32,
    /// The input; edges fire on the first frame only.
    #[serde(flatten)]
    pub input: InputSnapshot,
}

fn one_frame() -> u32 {
    1
}

/// A recorded or hand-written input sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    /// Frame duration in seconds.
    #[serde(default = "default_frame_dt")]
    pub dt: f32,
    /// Steps played in order.
    pub steps: Vec<ScriptStep>,
}

fn default_frame_dt() -> f32 {
    1.0 / 60.0
}

impl InputScript {
    /// Parse a script from JSON.
    pub fn from_json_str(json: &str) -> crate::SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of frames the script covers.
    pub fn frame_count(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.frames)).sum()
    }

    /// Expand the script into one snapshot per frame.
    pub fn frames(&self) -> impl Iterator<Item = InputSnapshot> + '_ {
        self.steps.iter().flat_map(|step| {
            let held = step.input.held();
            (0..step.frames).map(move |i| {
                if i == 0 {
                    step.input.clone()
                } else {
                    held.clone()
                }
            })
        })
    }
}
