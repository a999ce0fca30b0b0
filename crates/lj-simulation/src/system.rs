use crate::context::SimContext;
use crate::error::SimResult;
use crate::timer::Timer;

/// A behaviour that runs every frame.
///
/// Systems are executed in registration order within each phase. Each
/// system receives a mutable context providing access to the world, clock,
/// RNG, timers, economy, input and event log.
pub trait System: std::fmt::Debug {
    /// Human-readable name for this system.
    fn name(&self) -> &str;

    /// Update phase, once per frame.
    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()>;

    /// Called once before the first frame. Resolves entity references.
    fn init(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }

    /// Fixed-step phase, zero or more times per frame.
    fn fixed_tick(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }

    /// Late phase, once per frame after attachments are propagated.
    fn late_tick(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }

    /// Offered each due timer. Returns `true` if this system handled it.
    fn on_timer(&mut self, _ctx: &mut SimContext<'_>, _timer: &Timer) -> SimResult<bool> {
        Ok(false)
    }

    /// Support downcasting to concrete types for cross-system communication.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Support downcasting to concrete types for cross-system communication.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
