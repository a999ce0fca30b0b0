use std::fs;
use std::path::Path;

use lj_simulation::{InputScript, Simulation};

use crate::scene;

pub fn run(
    script: &Path,
    seed: Option<u64>,
    config: Option<&Path>,
    events: bool,
) -> Result<(), String> {
    let json = fs::read_to_string(script)
        .map_err(|e| format!("cannot read {}: {e}", script.display()))?;
    let script = InputScript::from_json_str(&json)
        .map_err(|e| format!("invalid input script: {e}"))?;
    if !script.dt.is_finite() || script.dt <= 0.0 {
        return Err(format!("script dt must be positive, got {}", script.dt));
    }

    let config = super::load_config(config, seed)?;
    let (world, actors) = scene::demo().map_err(|e| format!("failed to build scene: {e}"))?;

    let mut sim = Simulation::with_default_systems(world, config);
    let frames = sim
        .run_script(&script)
        .map_err(|e| format!("simulation error: {e}"))?;
    log::debug!("replayed {frames} frame(s)");

    super::print_report(&sim, actors.player, "Replay", events);
    Ok(())
}
