use lj_core::{Entity, EntityId, World};
use rand::rngs::StdRng;

use crate::clock::SimClock;
use crate::economy::Economy;
use crate::error::SimResult;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::input::InputSnapshot;
use crate::spatial::SpatialQuery;
use crate::timer::TimerQueue;

/// Mutable context passed to each system during a phase.
pub struct SimContext<'a> {
    /// The scene.
    pub world: &'a mut World,
    /// Frame and fixed-step time.
    pub clock: &'a SimClock,
    /// Event sink.
    pub events: &'a mut EventLog,
    /// Seeded RNG shared by all systems.
    pub rng: &'a mut StdRng,
    /// The currency balance.
    pub economy: &'a mut Economy,
    /// Pending one-shot timers.
    pub timers: &'a mut TimerQueue,
    /// Input sampled for this frame.
    pub input: &'a InputSnapshot,
}

impl SimContext<'_> {
    /// Emit a simulation event at the current frame.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events
            .push(SimEvent::new(self.clock.frame(), kind, description));
    }

    /// Current frame number.
    pub fn tick(&self) -> u64 {
        self.clock.frame()
    }

    /// Duration of this frame.
    pub fn frame_dt(&self) -> f32 {
        self.clock.frame_dt()
    }

    /// Duration of a fixed step.
    pub fn fixed_dt(&self) -> f32 {
        self.clock.fixed_dt()
    }

    /// Simulated seconds since start.
    pub fn now(&self) -> f64 {
        self.clock.elapsed()
    }

    /// Spatial queries over the current scene.
    pub fn spatial(&self) -> SpatialQuery<'_> {
        SpatialQuery::new(self.world)
    }

    /// Despawn an entity and cancel the timers it owns.
    pub fn despawn(&mut self, id: EntityId) -> SimResult<Entity> {
        let cancelled = self.timers.cancel_owner(id);
        if cancelled > 0 {
            log::debug!("cancelled {cancelled} timer(s) owned by {id}");
        }
        Ok(self.world.despawn(id)?)
    }
}
