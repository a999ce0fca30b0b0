use crate::component::LayerMask;
use crate::entity::{Entity, EntityId, EntityKind};
use crate::world::World;

/// A builder for filtering and searching entities in a world.
///
/// Results keep spawn order, so `first()` is the same entity a physics
/// overlap would report first.
pub struct QueryBuilder<'w> {
    world: &'w World,
    kind_filter: Option<EntityKind>,
    tag_filters: Vec<String>,
    name_contains: Option<String>,
    attached_to: Option<EntityId>,
    layer: Option<LayerMask>,
    visible_only: bool,
    limit: Option<usize>,
    offset: usize,
}

impl<'w> QueryBuilder<'w> {
    /// Start an unfiltered query.
    pub fn new(world: &'w World) -> Self {
        Self {
            world,
            kind_filter: None,
            tag_filters: Vec::new(),
            name_contains: None,
            attached_to: None,
            layer: None,
            visible_only: false,
            limit: None,
            offset: 0,
        }
    }

    /// Filter by entity kind.
    pub fn kind(mut self, kind: EntityKind) -> Self {
        self.kind_filter = Some(kind);
        self
    }

    /// Filter to entities that have a specific tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag_filters.push(tag.into());
        self
    }

    /// Filter to entities whose name contains the given substring (case-insensitive).
    pub fn name_contains(mut self, s: impl Into<String>) -> Self {
        self.name_contains = Some(s.into().to_lowercase());
        self
    }

    /// Filter to entities attached directly to `parent`.
    pub fn attached_to(mut self, parent: EntityId) -> Self {
        self.attached_to = Some(parent);
        self
    }

    /// Filter to entities with an enabled collider on one of these layers.
    pub fn on_layer(mut self, mask: LayerMask) -> Self {
        self.layer = Some(mask);
        self
    }

    /// Skip hidden entities.
    pub fn visible_only(mut self) -> Self {
        self.visible_only = true;
        self
    }

    /// Limit the number of results.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skip the first N results.
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = n;
        self
    }

    /// Execute the query and return matching entities.
    pub fn execute(self) -> Vec<&'w Entity> {
        let iter = self
            .world
            .all_entities()
            .filter(|e| self.matches(e))
            .skip(self.offset);
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }

    /// The first matching entity.
    pub fn first(self) -> Option<&'w Entity> {
        self.limit(1).execute().into_iter().next()
    }

    /// Count matching entities without collecting them.
    pub fn count(self) -> usize {
        self.world
            .all_entities()
            .filter(|e| self.matches(e))
            .count()
    }

    fn matches(&self, entity: &Entity) -> bool {
        if let Some(ref kind) = self.kind_filter
            && entity.kind != *kind
        {
            return false;
        }

        // All tags must match
        if !self.tag_filters.iter().all(|tag| entity.has_tag(tag)) {
            return false;
        }

        if let Some(ref s) = self.name_contains
            && !entity.name.to_lowercase().contains(s)
        {
            return false;
        }

        if let Some(parent) = self.attached_to
            && entity.attachment.map(|a| a.parent) != Some(parent)
        {
            return false;
        }

        if let Some(mask) = self.layer {
            let on_layer = entity
                .components
                .collider
                .is_some_and(|c| c.enabled && c.layer.intersects(mask));
            if !on_layer {
                return false;
            }
        }

        !self.visible_only || entity.visible
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::component::Collider;
    use crate::entity::Pose;
    use crate::world::WorldMeta;

    fn test_world() -> World {
        let mut world = World::new(WorldMeta::new("Test"));

        let mut oak = Entity::new(EntityKind::Tree, "Old Oak");
        oak.components.collider = Some(Collider::sphere(0.5, LayerMask::TREE));
        world.spawn(oak).unwrap();

        let mut pine = Entity::new(EntityKind::Tree, "Pine").with_tag("evergreen");
        pine.visible = false;
        pine.components.collider = Some(Collider {
            enabled: false,
            ..Collider::sphere(0.5, LayerMask::TREE)
        });
        world.spawn(pine).unwrap();

        let log = Entity::new(EntityKind::Log, "Log").with_tag("log");
        world.spawn(log).unwrap();

        world
    }

    #[test]
    fn query_by_kind() {
        let world = test_world();
        let results = world.query().kind(EntityKind::Tree).execute();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn query_by_tag() {
        let world = test_world();
        let results = world.query().tag("LOG").execute();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, EntityKind::Log);
    }

    #[test]
    fn query_by_name_contains() {
        let world = test_world();
        let results = world.query().name_contains("oak").execute();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn query_keeps_spawn_order_with_limit_and_offset() {
        let world = test_world();
        let all = world.query().execute();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Old Oak");

        let second = world.query().offset(1).limit(1).execute();
        assert_eq!(second[0].name, "Pine");
        assert_eq!(world.query().first().unwrap().name, "Old Oak");
    }

    #[test]
    fn disabled_colliders_drop_out_of_layer_queries() {
        let world = test_world();
        let results = world.query().on_layer(LayerMask::TREE).execute();
        assert_eq!(results.len(), 1);
        assert_eq!(world.query().kind(EntityKind::Tree).visible_only().count(), 1);
    }

    #[test]
    fn query_attached_to() {
        let mut world = test_world();
        let player = world
            .spawn(Entity::new(EntityKind::Player, "Player").with_pose(Pose::at(Vec3::ZERO)))
            .unwrap();
        let log = world.query().kind(EntityKind::Log).first().unwrap().id;
        world.attach(log, player, Pose::IDENTITY).unwrap();

        let carried = world.query().attached_to(player).execute();
        assert_eq!(carried.len(), 1);
        assert_eq!(carried[0].id, log);
    }
}
