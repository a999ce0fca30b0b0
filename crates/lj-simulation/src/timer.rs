use lj_core::EntityId;

/// Handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Bring a felled tree back.
    TreeRespawn,
}

/// A one-shot timer owned by an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    /// Handle for cancellation.
    pub id: TimerId,
    /// The entity the timer belongs to.
    pub owner: EntityId,
    /// Simulated time at which it fires, in seconds.
    pub due: f64,
    /// What to do when it fires.
    pub kind: TimerKind,
}

/// One-shot timers keyed on simulated time.
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    next_id: u64,
}

impl TimerQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer at absolute time `due`.
    pub fn schedule(&mut self, owner: EntityId, due: f64, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            owner,
            due,
            kind,
        });
        id
    }

    /// Cancel one timer. Returns `false` if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Cancel every timer owned by `owner`. Returns how many were removed.
    pub fn cancel_owner(&mut self, owner: EntityId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.owner != owner);
        before - self.timers.len()
    }

    /// Remove and return the timers due at or before `now`, earliest first.
    pub fn drain_due(&mut self, now: f64) -> Vec<Timer> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|t| t.due <= now);
        self.timers = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)));
        due
    }

    /// Timers still waiting for `owner`.
    pub fn pending_for(&self, owner: EntityId) -> impl Iterator<Item = &Timer> {
        self.timers.iter().filter(move |t| t.owner == owner)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_fire_once_in_due_order() {
        let mut queue = TimerQueue::new();
        let a = EntityId::new();
        let b = EntityId::new();
        queue.schedule(a, 2.0, TimerKind::TreeRespawn);
        queue.schedule(b, 1.0, TimerKind::TreeRespawn);

        assert!(queue.drain_due(0.5).is_empty());
        let fired = queue.drain_due(5.0);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].owner, b);
        assert_eq!(fired[1].owner, a);
        assert!(queue.drain_due(10.0).is_empty());
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut queue = TimerQueue::new();
        let owner = EntityId::new();
        let id = queue.schedule(owner, 1.0, TimerKind::TreeRespawn);
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(queue.drain_due(2.0).is_empty());
    }

    #[test]
    fn cancel_owner_removes_only_that_owner() {
        let mut queue = TimerQueue::new();
        let a = EntityId::new();
        let b = EntityId::new();
        queue.schedule(a, 1.0, TimerKind::TreeRespawn);
        queue.schedule(a, 2.0, TimerKind::TreeRespawn);
        queue.schedule(b, 1.0, TimerKind::TreeRespawn);

        assert_eq!(queue.cancel_owner(a), 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pending_for(b).count(), 1);
    }
}
