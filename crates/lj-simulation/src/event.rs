use lj_core::EntityId;

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEventKind {
    // Trees
    /// A standing tree took damage.
    TreeHit {
        /// The tree that was hit.
        tree: EntityId,
        /// The player responsible, if known.
        by: Option<EntityId>,
        /// Health left after the hit.
        remaining: i32,
    },
    /// A tree ran out of health.
    TreeFelled {
        /// The felled tree.
        tree: EntityId,
    },
    /// A felled tree dropped a log.
    LogSpawned {
        /// The new log.
        log: EntityId,
        /// The tree that dropped it.
        tree: EntityId,
    },
    /// A felled tree grew back.
    TreeRespawned {
        /// The restored tree.
        tree: EntityId,
    },

    // Carrying
    /// A player picked something up.
    PickedUp {
        /// The carrying player.
        player: EntityId,
        /// The object now carried.
        item: EntityId,
    },
    /// A player let go of what it carried.
    Dropped {
        /// The player that dropped it.
        player: EntityId,
        /// The released object.
        item: EntityId,
    },

    // Economy
    /// A carried object was sold at a zone.
    Sold {
        /// The selling player.
        player: EntityId,
        /// The zone that bought it.
        zone: EntityId,
        /// The object that was sold and destroyed.
        item: EntityId,
        /// Credits paid.
        price: u32,
    },
    /// The balance changed.
    BalanceChanged {
        /// Balance after the change.
        balance: u64,
        /// Amount added.
        delta: u32,
    },

    // Camera
    /// A camera rig snapped back behind its target.
    CameraReset {
        /// The rig that was reset.
        camera: EntityId,
    },

    // Lifecycle
    /// A behaviour was switched off because a reference was missing.
    ComponentDisabled {
        /// The entity whose behaviour was disabled.
        entity: EntityId,
        /// Why it was disabled.
        reason: String,
    },

    // Custom
    /// A user-defined event.
    Custom {
        /// A label identifying the custom event type.
        label: String,
        /// The entities involved in this custom event.
        entities: Vec<EntityId>,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::TreeFelled { tree } | Self::TreeRespawned { tree } => *tree == id,
            Self::TreeHit { tree, by, .. } => *tree == id || *by == Some(id),
            Self::LogSpawned { log, tree } => *log == id || *tree == id,
            Self::PickedUp { player, item } | Self::Dropped { player, item } => {
                *player == id || *item == id
            }
            Self::Sold {
                player, zone, item, ..
            } => *player == id || *zone == id || *item == id,
            Self::BalanceChanged { .. } => false,
            Self::CameraReset { camera } => *camera == id,
            Self::ComponentDisabled { entity, .. } => *entity == id,
            Self::Custom { entities, .. } => entities.contains(&id),
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// The frame when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all events involving the given entity.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Count events matching a predicate on their kind.
    pub fn count_where(&self, pred: impl Fn(&SimEventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
