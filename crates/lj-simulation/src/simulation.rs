use lj_core::{Entity, EntityId, World};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::camera::CameraSystem;
use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::economy::{Economy, SellZoneSystem, settle_sale};
use crate::error::SimResult;
use crate::event::EventLog;
use crate::input::{InputScript, InputSnapshot};
use crate::interaction::InteractionSystem;
use crate::movement::MovementSystem;
use crate::system::System;
use crate::timer::TimerQueue;
use crate::tree::TreeSystem;

/// Everything systems may touch, kept apart from the systems themselves so
/// a context can borrow it while a system is borrowed mutably.
#[derive(Debug)]
struct SimState {
    world: World,
    clock: SimClock,
    rng: StdRng,
    events: EventLog,
    economy: Economy,
    timers: TimerQueue,
}

impl SimState {
    fn context<'a>(&'a mut self, input: &'a InputSnapshot) -> SimContext<'a> {
        SimContext {
            world: &mut self.world,
            clock: &self.clock,
            events: &mut self.events,
            rng: &mut self.rng,
            economy: &mut self.economy,
            timers: &mut self.timers,
            input,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Init,
    Update,
    Fixed,
    Late,
}

/// The top-level simulation orchestrator.
///
/// Owns the world, clock, RNG, event log, economy, timers and registered
/// systems. Each [`step`](Simulation::step) runs one frame:
///
/// 1. due timers are offered to the systems,
/// 2. the update phase (`tick`),
/// 3. zero or more fixed steps (`fixed_tick`),
/// 4. cross-system effects (tree hits, sales, camera move reports),
/// 5. attachment propagation,
/// 6. the late phase (`late_tick`).
pub struct Simulation {
    state: SimState,
    config: SimConfig,
    systems: Vec<Box<dyn System>>,
    initialized: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("frame", &self.state.clock.frame())
            .field("systems", &self.systems.len())
            .field("events", &self.state.events.len())
            .field("balance", &self.state.economy.balance())
            .finish()
    }
}

impl Simulation {
    /// Create a simulation with no systems.
    pub fn new(world: World, config: SimConfig) -> Self {
        let state = SimState {
            world,
            clock: SimClock::new(config.fixed_dt, config.max_fixed_steps),
            rng: StdRng::seed_from_u64(config.seed),
            events: EventLog::new(config.max_events),
            economy: Economy::new(config.economy.starting_balance),
            timers: TimerQueue::new(),
        };
        Self {
            state,
            config,
            systems: Vec::new(),
            initialized: false,
        }
    }

    /// Create a simulation with movement, interaction, tree, sell zone and
    /// camera systems registered in that order.
    pub fn with_default_systems(world: World, config: SimConfig) -> Self {
        let mut sim = Self::new(world, config.clone());
        sim.add_system(MovementSystem::new(config.movement));
        sim.add_system(InteractionSystem::new(config.interaction));
        sim.add_system(TreeSystem::new(config.tree));
        sim.add_system(SellZoneSystem::new());
        sim.add_system(CameraSystem::new(config.camera));
        sim
    }

    /// Register a system. Systems run in registration order within a phase.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        log::debug!("registered system '{}'", system.name());
        self.systems.push(Box::new(system));
    }

    /// Validate the configuration and initialize all registered systems.
    pub fn init(&mut self) -> SimResult<()> {
        if self.initialized {
            return Ok(());
        }
        self.config.validate()?;
        self.run_phase(Phase::Init, &InputSnapshot::default())?;
        self.initialized = true;
        log::info!(
            "simulation of '{}' initialized: {} entities, {} systems",
            self.state.world.meta.name,
            self.state.world.entity_count(),
            self.systems.len()
        );
        Ok(())
    }

    /// Advance the simulation by one frame of `dt` seconds.
    pub fn step(&mut self, dt: f32, input: &InputSnapshot) -> SimResult<()> {
        if !self.initialized {
            self.init()?;
        }

        let fixed_steps = self.state.clock.begin_frame(dt);
        self.fire_timers(input)?;
        self.run_phase(Phase::Update, input)?;
        for _ in 0..fixed_steps {
            self.state.clock.advance_fixed();
            self.run_phase(Phase::Fixed, input)?;
        }
        self.apply_cross_system_effects(input)?;
        self.state.world.propagate_attachments();
        self.run_phase(Phase::Late, input)
    }

    /// Run one frame per input, all of `dt` seconds. Returns the frame count.
    pub fn run_frames<I>(&mut self, dt: f32, inputs: I) -> SimResult<u64>
    where
        I: IntoIterator<Item = InputSnapshot>,
    {
        let mut frames = 0;
        for input in inputs {
            self.step(dt, &input)?;
            frames += 1;
        }
        Ok(frames)
    }

    /// Replay a recorded input script. Returns the frame count.
    pub fn run_script(&mut self, script: &InputScript) -> SimResult<u64> {
        self.run_frames(script.dt, script.frames())
    }

    fn run_phase(&mut self, phase: Phase, input: &InputSnapshot) -> SimResult<()> {
        for system in &mut self.systems {
            let mut ctx = self.state.context(input);
            match phase {
                Phase::Init => system.init(&mut ctx)?,
                Phase::Update => system.tick(&mut ctx)?,
                Phase::Fixed => system.fixed_tick(&mut ctx)?,
                Phase::Late => system.late_tick(&mut ctx)?,
            }
        }
        Ok(())
    }

    /// Offer each due timer to the systems until one handles it.
    fn fire_timers(&mut self, input: &InputSnapshot) -> SimResult<()> {
        let due = self.state.timers.drain_due(self.state.clock.elapsed());
        for timer in due {
            let mut handled = false;
            for system in &mut self.systems {
                let mut ctx = self.state.context(input);
                if system.on_timer(&mut ctx, &timer)? {
                    handled = true;
                    break;
                }
            }
            if !handled {
                log::debug!("timer {:?} for {} had no handler", timer.kind, timer.owner);
            }
        }
        Ok(())
    }

    /// Hand results from one system to another after the fixed phase.
    fn apply_cross_system_effects(&mut self, input: &InputSnapshot) -> SimResult<()> {
        let hits = find_system_mut::<InteractionSystem>(&mut self.systems)
            .map(InteractionSystem::drain_hits)
            .unwrap_or_default();
        if !hits.is_empty()
            && let Some(trees) = find_system_mut::<TreeSystem>(&mut self.systems)
        {
            let mut ctx = self.state.context(input);
            for hit in &hits {
                trees.apply_hit(&mut ctx, hit)?;
            }
        }

        let requests = find_system_mut::<SellZoneSystem>(&mut self.systems)
            .map(SellZoneSystem::drain_requests)
            .unwrap_or_default();
        if !requests.is_empty()
            && let Some(interaction) = find_system_mut::<InteractionSystem>(&mut self.systems)
        {
            let mut ctx = self.state.context(input);
            for request in &requests {
                settle_sale(&mut ctx, interaction, request)?;
            }
        }

        let reports = find_system_mut::<MovementSystem>(&mut self.systems)
            .map(MovementSystem::drain_reports)
            .unwrap_or_default();
        if let Some(cameras) = find_system_mut::<CameraSystem>(&mut self.systems) {
            for report in &reports {
                cameras.report_move(report);
            }
        }
        Ok(())
    }

    /// The scene.
    pub fn world(&self) -> &World {
        &self.state.world
    }

    /// The scene, mutably.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.state.world
    }

    /// Remove an entity from the scene and cancel the timers it owns.
    ///
    /// Prefer this over `world_mut().despawn` so a felled tree removed by
    /// the host does not leave a respawn pending.
    pub fn despawn(&mut self, id: EntityId) -> SimResult<Entity> {
        let input = InputSnapshot::default();
        let mut ctx = self.state.context(&input);
        ctx.despawn(id)
    }

    /// The simulation clock.
    pub fn clock(&self) -> &SimClock {
        &self.state.clock
    }

    /// Events emitted so far.
    pub fn events(&self) -> &EventLog {
        &self.state.events
    }

    /// The currency balance.
    pub fn economy(&self) -> &Economy {
        &self.state.economy
    }

    /// Pending timers.
    pub fn timers(&self) -> &TimerQueue {
        &self.state.timers
    }

    /// The configuration this simulation was built with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Frames run so far.
    pub fn current_frame(&self) -> u64 {
        self.state.clock.frame()
    }

    /// Access a system by downcasting to a concrete type.
    pub fn get_system<T: System + 'static>(&self) -> Option<&T> {
        self.systems
            .iter()
            .find_map(|s| s.as_any().downcast_ref::<T>())
    }

    /// Access a system mutably by downcasting to a concrete type.
    pub fn get_system_mut<T: System + 'static>(&mut self) -> Option<&mut T> {
        find_system_mut(&mut self.systems)
    }

    /// Extract the world, consuming the simulation.
    pub fn into_world(self) -> World {
        self.state.world
    }
}

fn find_system_mut<T: System + 'static>(systems: &mut [Box<dyn System>]) -> Option<&mut T> {
    systems
        .iter_mut()
        .find_map(|s| s.as_any_mut().downcast_mut::<T>())
}
