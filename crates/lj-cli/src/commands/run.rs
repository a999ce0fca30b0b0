use std::path::Path;

use lj_simulation::Simulation;

use crate::autopilot::Autopilot;
use crate::scene;

pub fn run(
    frames: u64,
    dt: f32,
    seed: Option<u64>,
    config: Option<&Path>,
    events: bool,
) -> Result<(), String> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(format!("--dt must be a positive number of seconds, got {dt}"));
    }
    let config = super::load_config(config, seed)?;
    let (world, actors) = scene::demo().map_err(|e| format!("failed to build scene: {e}"))?;

    let mut sim = Simulation::with_default_systems(world, config);
    sim.init()
        .map_err(|e| format!("simulation init failed: {e}"))?;

    let mut pilot = Autopilot::new(actors);
    for _ in 0..frames {
        let input = pilot.next_input(sim.world());
        sim.step(dt, &input)
            .map_err(|e| format!("simulation error: {e}"))?;
    }

    super::print_report(&sim, actors.player, "Autopilot", events);
    Ok(())
}
