//! Owned simulation state for unit tests that drive one system by hand.

use lj_core::{World, WorldMeta};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::clock::SimClock;
use crate::context::SimContext;
use crate::economy::Economy;
use crate::event::EventLog;
use crate::input::InputSnapshot;
use crate::timer::TimerQueue;

pub(crate) struct Harness {
    pub world: World,
    pub clock: SimClock,
    pub events: EventLog,
    pub rng: StdRng,
    pub economy: Economy,
    pub timers: TimerQueue,
    pub input: InputSnapshot,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            world: World::new(WorldMeta::new("Test")),
            clock: SimClock::new(0.02, 5),
            events: EventLog::new(1000),
            rng: StdRng::seed_from_u64(7),
            economy: Economy::default(),
            timers: TimerQueue::new(),
            input: InputSnapshot::default(),
        }
    }

    pub fn ctx(&mut self) -> SimContext<'_> {
        SimContext {
            world: &mut self.world,
            clock: &self.clock,
            events: &mut self.events,
            rng: &mut self.rng,
            economy: &mut self.economy,
            timers: &mut self.timers,
            input: &self.input,
        }
    }
}
