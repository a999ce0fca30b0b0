use glam::Vec3;
use lj_core::{EntityId, EntityKind, LayerMask, SellZoneComponent, Shape};

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::interaction::InteractionSystem;
use crate::spatial::QueryFilter;
use crate::system::System;

/// The currency balance. Only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Economy {
    balance: u64,
}

impl Economy {
    /// An economy starting at `balance`.
    pub fn new(balance: u64) -> Self {
        Self { balance }
    }

    /// Current balance.
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Credit `amount` and return the new balance.
    pub fn add(&mut self, amount: u32) -> u64 {
        self.balance = self.balance.saturating_add(u64::from(amount));
        log::info!("balance: {}", self.balance);
        self.balance
    }
}

/// A player walked into a sell zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellRequest {
    /// The entering player.
    pub player: EntityId,
    /// The zone entered.
    pub zone: EntityId,
    /// Credits paid for a sellable object.
    pub price: u32,
    /// Tag the carried object needs.
    pub sell_tag: String,
}

#[derive(Debug, Clone)]
struct Zone {
    entity: EntityId,
    terms: SellZoneComponent,
    inside: Vec<EntityId>,
}

/// Detects players entering sell zones.
#[derive(Debug, Default)]
pub struct SellZoneSystem {
    zones: Vec<Zone>,
    pending: Vec<SellRequest>,
}

impl SellZoneSystem {
    /// Create an empty sell zone system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Players currently inside `zone`.
    pub fn occupants(&self, zone: EntityId) -> &[EntityId] {
        self.zones
            .iter()
            .find(|z| z.entity == zone)
            .map_or(&[], |z| z.inside.as_slice())
    }

    /// Take the enter events collected since the last drain.
    pub fn drain_requests(&mut self) -> Vec<SellRequest> {
        std::mem::take(&mut self.pending)
    }

    fn sync(&mut self, ctx: &SimContext<'_>) {
        self.zones.retain(|z| ctx.world.contains(z.entity));
        for entity in ctx.world.entities_by_kind(&EntityKind::SellZone) {
            if self.zones.iter().any(|z| z.entity == entity.id) {
                continue;
            }
            self.zones.push(Zone {
                entity: entity.id,
                terms: entity.components.sell_zone.clone().unwrap_or_default(),
                inside: Vec::new(),
            });
        }
    }
}

impl System for SellZoneSystem {
    fn name(&self) -> &str {
        "sell_zone"
    }

    fn init(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        self.sync(ctx);
        Ok(())
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        self.sync(ctx);
        let filter = QueryFilter::new(LayerMask::PLAYER).kind(EntityKind::Player);

        for zone in &mut self.zones {
            let volume = ctx
                .world
                .get_entity(zone.entity)
                .and_then(|e| e.components.collider.map(|c| (e.pose.position + c.offset, c)));
            let now = match volume {
                Some((center, collider)) if collider.enabled => {
                    ctx.spatial().overlap_shape(center, collider.shape, &filter)
                }
                // A zone without a volume only covers its own position.
                None => match ctx.world.pose(zone.entity) {
                    Some(pose) => ctx.spatial().overlap_shape(
                        pose.position,
                        Shape::Box {
                            half_extents: Vec3::splat(0.5),
                        },
                        &filter,
                    ),
                    None => Vec::new(),
                },
                Some(_) => Vec::new(),
            };

            for player in now.iter().filter(|p| !zone.inside.contains(p)) {
                log::debug!("{player} entered sell zone {}", zone.entity);
                self.pending.push(SellRequest {
                    player: *player,
                    zone: zone.entity,
                    price: zone.terms.price_per_log,
                    sell_tag: zone.terms.sell_tag.clone(),
                });
            }
            zone.inside = now;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Sell what the entering player carries, if the zone buys it.
/// Returns `true` when a sale happened.
pub fn settle_sale(
    ctx: &mut SimContext<'_>,
    interaction: &mut InteractionSystem,
    request: &SellRequest,
) -> SimResult<bool> {
    let Some(item) = interaction.take_carried(request.player) else {
        return Ok(false);
    };
    let sellable = ctx
        .world
        .get_entity(item)
        .is_some_and(|e| e.has_tag(&request.sell_tag));
    if !sellable {
        return Ok(false);
    }

    let balance = ctx.economy.add(request.price);
    interaction.clear_carried(ctx, request.player)?;

    ctx.emit(
        SimEventKind::Sold {
            player: request.player,
            zone: request.zone,
            item,
            price: request.price,
        },
        format!("{} sold {item} for {}", request.player, request.price),
    );
    ctx.emit(
        SimEventKind::BalanceChanged {
            balance,
            delta: request.price,
        },
        format!("Balance is now {balance}"),
    );
    Ok(true)
}
