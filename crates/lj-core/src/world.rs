use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::component::{Body, Collider, LayerMask};
use crate::entity::{Entity, EntityId, EntityKind, Pose};
use crate::error::{LjError, LjResult};
use crate::query::QueryBuilder;

/// Metadata about the scene itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldMeta {
    /// Scene name.
    pub name: String,
    /// Free-text description.
    pub description: String,
}

impl WorldMeta {
    /// Metadata with a name and empty description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }
}

/// The scene graph. Owns all entities and the parent/child links between them.
///
/// Iteration always follows spawn order so that "first match" queries are
/// deterministic.
#[derive(Debug, Clone)]
pub struct World {
    /// Scene metadata.
    pub meta: WorldMeta,
    entities: HashMap<EntityId, Entity>,

    // Indexes
    order: Vec<EntityId>,
    by_kind: HashMap<EntityKind, Vec<EntityId>>,
    children: HashMap<EntityId, Vec<EntityId>>,
}

impl World {
    /// Create an empty world.
    pub fn new(meta: WorldMeta) -> Self {
        Self {
            meta,
            entities: HashMap::new(),
            order: Vec::new(),
            by_kind: HashMap::new(),
            children: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Add an entity to the world. Returns the entity's ID.
    pub fn spawn(&mut self, mut entity: Entity) -> LjResult<EntityId> {
        let id = entity.id;
        if self.entities.contains_key(&id) {
            return Err(LjError::DuplicateId(id));
        }
        // Links are established through `attach` only.
        entity.attachment = None;

        self.by_kind.entry(entity.kind.clone()).or_default().push(id);
        self.order.push(id);
        log::debug!("spawned {} '{}' ({id})", entity.kind, entity.name);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Remove an entity. Its children are detached and keep their world pose.
    pub fn despawn(&mut self, id: EntityId) -> LjResult<Entity> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(LjError::EntityNotFound(id))?;

        self.order.retain(|eid| *eid != id);
        if let Some(ids) = self.by_kind.get_mut(&entity.kind) {
            ids.retain(|eid| *eid != id);
        }
        if let Some(link) = entity.attachment
            && let Some(siblings) = self.children.get_mut(&link.parent)
        {
            siblings.retain(|eid| *eid != id);
        }
        for child in self.children.remove(&id).unwrap_or_default() {
            if let Some(c) = self.entities.get_mut(&child) {
                c.attachment = None;
            }
        }

        log::debug!("despawned {} '{}' ({id})", entity.kind, entity.name);
        Ok(entity)
    }

    /// Get a reference to an entity by ID.
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Whether the entity is currently spawned.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Find the first entity with the given name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.all_entities()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    // -----------------------------------------------------------------------
    // Pose and components
    // -----------------------------------------------------------------------

    /// World pose of an entity.
    pub fn pose(&self, id: EntityId) -> Option<Pose> {
        self.entities.get(&id).map(|e| e.pose)
    }

    /// Overwrite an entity's world pose.
    pub fn set_pose(&mut self, id: EntityId, pose: Pose) -> LjResult<()> {
        let entity = self.entity_mut_or_err(id)?;
        entity.pose = pose;
        Ok(())
    }

    /// Mutable access to an entity's body.
    pub fn body_mut(&mut self, id: EntityId) -> LjResult<&mut Body> {
        self.entity_mut_or_err(id)?
            .components
            .body
            .as_mut()
            .ok_or(LjError::MissingComponent {
                entity: id,
                component: "body",
            })
    }

    /// Mutable access to an entity's collider.
    pub fn collider_mut(&mut self, id: EntityId) -> LjResult<&mut Collider> {
        self.entity_mut_or_err(id)?
            .components
            .collider
            .as_mut()
            .ok_or(LjError::MissingComponent {
                entity: id,
                component: "collider",
            })
    }

    /// Show or hide the visual representation.
    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> LjResult<()> {
        self.entity_mut_or_err(id)?.visible = visible;
        Ok(())
    }

    /// Enable or disable the collision representation.
    pub fn set_collider_enabled(&mut self, id: EntityId, enabled: bool) -> LjResult<()> {
        self.collider_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// Move the collider to another layer.
    pub fn set_layer(&mut self, id: EntityId, layer: LayerMask) -> LjResult<()> {
        self.collider_mut(id)?.layer = layer;
        Ok(())
    }

    fn entity_mut_or_err(&mut self, id: EntityId) -> LjResult<&mut Entity> {
        self.entities
            .get_mut(&id)
            .ok_or(LjError::EntityNotFound(id))
    }

    // -----------------------------------------------------------------------
    // Hierarchy
    // -----------------------------------------------------------------------

    /// Parent `child` to `parent` at a local offset. The child's pose snaps
    /// to the offset immediately. Re-attaching replaces the previous link.
    pub fn attach(&mut self, child: EntityId, parent: EntityId, local: Pose) -> LjResult<()> {
        if child == parent {
            return Err(LjError::Validation(format!(
                "cannot attach {child} to itself"
            )));
        }
        let parent_pose = self.pose(parent).ok_or(LjError::EntityNotFound(parent))?;
        if !self.contains(child) {
            return Err(LjError::EntityNotFound(child));
        }
        if self.is_ancestor(child, parent) {
            return Err(LjError::Validation(format!(
                "attaching {child} to {parent} would create a cycle"
            )));
        }

        self.detach(child)?;
        let link = Attachment::new(parent, local);
        let entity = self.entity_mut_or_err(child)?;
        entity.pose = link.resolve(&parent_pose);
        entity.attachment = Some(link);
        self.children.entry(parent).or_default().push(child);
        Ok(())
    }

    /// Remove the parent link, keeping the current world pose.
    pub fn detach(&mut self, child: EntityId) -> LjResult<Option<Attachment>> {
        let link = self.entity_mut_or_err(child)?.attachment.take();
        if let Some(link) = link
            && let Some(siblings) = self.children.get_mut(&link.parent)
        {
            siblings.retain(|eid| *eid != child);
        }
        Ok(link)
    }

    /// The parent of an attached entity.
    pub fn parent_of(&self, child: EntityId) -> Option<EntityId> {
        self.entities
            .get(&child)
            .and_then(|e| e.attachment)
            .map(|a| a.parent)
    }

    /// Entities attached directly to `parent`.
    pub fn children_of(&self, parent: EntityId) -> &[EntityId] {
        self.children.get(&parent).map_or(&[], Vec::as_slice)
    }

    fn is_ancestor(&self, candidate: EntityId, of: EntityId) -> bool {
        let mut cursor = self.parent_of(of);
        let mut guard = self.entities.len();
        while let Some(p) = cursor {
            if p == candidate {
                return true;
            }
            if guard == 0 {
                break;
            }
            guard -= 1;
            cursor = self.parent_of(p);
        }
        false
    }

    /// Recompute the world pose of every attached entity from its parent chain.
    pub fn propagate_attachments(&mut self) {
        let attached: Vec<EntityId> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.parent_of(*id).is_some())
            .collect();
        for id in attached {
            if let Some(pose) = self.resolve_pose(id, self.entities.len())
                && let Some(entity) = self.entities.get_mut(&id)
            {
                entity.pose = pose;
            }
        }
    }

    fn resolve_pose(&self, id: EntityId, depth: usize) -> Option<Pose> {
        let entity = self.entities.get(&id)?;
        match entity.attachment {
            Some(link) if depth > 0 => {
                let parent_pose = self.resolve_pose(link.parent, depth - 1)?;
                Some(link.resolve(&parent_pose))
            }
            _ => Some(entity.pose),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Get all entities of a specific kind, in spawn order.
    pub fn entities_by_kind(&self, kind: &EntityKind) -> Vec<&Entity> {
        self.by_kind
            .get(kind)
            .map(|ids| ids.iter().filter_map(|id| self.entities.get(id)).collect())
            .unwrap_or_default()
    }

    /// IDs of all entities of a specific kind, in spawn order.
    pub fn ids_by_kind(&self, kind: &EntityKind) -> Vec<EntityId> {
        self.by_kind.get(kind).cloned().unwrap_or_default()
    }

    /// All entities in spawn order.
    pub fn all_entities(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// Start building a query.
    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    /// Number of spawned entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Count entities by kind.
    pub fn entity_counts_by_kind(&self) -> HashMap<EntityKind, usize> {
        self.by_kind
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(k, ids)| (k.clone(), ids.len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn test_world() -> World {
        World::new(WorldMeta::new("Test Clearing"))
    }

    #[test]
    fn spawn_and_get_entity() {
        let mut world = test_world();
        let id = world.spawn(Entity::new(EntityKind::Tree, "Oak")).unwrap();
        assert_eq!(world.get_entity(id).unwrap().name, "Oak");
        assert!(world.contains(id));
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut world = test_world();
        let entity = Entity::new(EntityKind::Log, "Log");
        world.spawn(entity.clone()).unwrap();
        assert!(matches!(world.spawn(entity), Err(LjError::DuplicateId(_))));
    }

    #[test]
    fn duplicate_names_allowed() {
        let mut world = test_world();
        world.spawn(Entity::new(EntityKind::Log, "Log")).unwrap();
        world.spawn(Entity::new(EntityKind::Log, "Log")).unwrap();
        assert_eq!(world.entities_by_kind(&EntityKind::Log).len(), 2);
    }

    #[test]
    fn iteration_follows_spawn_order() {
        let mut world = test_world();
        let names = ["c", "a", "b"];
        for name in names {
            world.spawn(Entity::new(EntityKind::Tree, name)).unwrap();
        }
        let seen: Vec<_> = world.all_entities().map(|e| e.name.as_str()).collect();
        assert_eq!(seen, names);
    }

    #[test]
    fn attach_snaps_child_and_follows_parent() {
        let mut world = test_world();
        let player = world
            .spawn(Entity::new(EntityKind::Player, "Player").with_pose(Pose::at(Vec3::ZERO)))
            .unwrap();
        let log = world
            .spawn(Entity::new(EntityKind::Log, "Log").with_pose(Pose::at(Vec3::splat(9.0))))
            .unwrap();

        world
            .attach(log, player, Pose::at(Vec3::new(0.0, 1.0, 0.5)))
            .unwrap();
        assert_eq!(world.pose(log).unwrap().position, Vec3::new(0.0, 1.0, 0.5));
        assert_eq!(world.children_of(player), &[log]);

        world
            .set_pose(player, Pose::at(Vec3::new(4.0, 0.0, 0.0)))
            .unwrap();
        world.propagate_attachments();
        assert_eq!(world.pose(log).unwrap().position, Vec3::new(4.0, 1.0, 0.5));
    }

    #[test]
    fn detach_keeps_world_pose() {
        let mut world = test_world();
        let parent = world.spawn(Entity::new(EntityKind::Player, "P")).unwrap();
        let child = world.spawn(Entity::new(EntityKind::Log, "L")).unwrap();
        world.attach(child, parent, Pose::at(Vec3::Y)).unwrap();

        let link = world.detach(child).unwrap();
        assert!(link.is_some());
        world.set_pose(parent, Pose::at(Vec3::X * 10.0)).unwrap();
        world.propagate_attachments();
        assert_eq!(world.pose(child).unwrap().position, Vec3::Y);
        assert!(world.children_of(parent).is_empty());
    }

    #[test]
    fn attach_rejects_self_and_cycles() {
        let mut world = test_world();
        let a = world.spawn(Entity::new(EntityKind::Player, "A")).unwrap();
        let b = world.spawn(Entity::new(EntityKind::Log, "B")).unwrap();
        assert!(world.attach(a, a, Pose::IDENTITY).is_err());
        world.attach(b, a, Pose::IDENTITY).unwrap();
        assert!(world.attach(a, b, Pose::IDENTITY).is_err());
    }

    #[test]
    fn despawn_parent_releases_children() {
        let mut world = test_world();
        let parent = world.spawn(Entity::new(EntityKind::Player, "P")).unwrap();
        let child = world.spawn(Entity::new(EntityKind::Log, "L")).unwrap();
        world.attach(child, parent, Pose::IDENTITY).unwrap();

        world.despawn(parent).unwrap();
        assert!(world.parent_of(child).is_none());
        assert!(world.despawn(parent).is_err());
    }

    #[test]
    fn despawn_child_unlinks_from_parent() {
        let mut world = test_world();
        let parent = world.spawn(Entity::new(EntityKind::Player, "P")).unwrap();
        let child = world.spawn(Entity::new(EntityKind::Log, "L")).unwrap();
        world.attach(child, parent, Pose::IDENTITY).unwrap();

        world.despawn(child).unwrap();
        assert!(world.children_of(parent).is_empty());
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn missing_components_are_reported() {
        let mut world = test_world();
        let id = world.spawn(Entity::new(EntityKind::Obstacle, "Rock")).unwrap();
        assert!(matches!(
            world.body_mut(id),
            Err(LjError::MissingComponent { component: "body", .. })
        ));
        assert!(world.set_collider_enabled(id, false).is_err());
        world.set_visible(id, false).unwrap();
        assert!(!world.get_entity(id).unwrap().visible);
    }

    #[test]
    fn counts_by_kind() {
        let mut world = test_world();
        world.spawn(Entity::new(EntityKind::Tree, "Oak")).unwrap();
        world.spawn(Entity::new(EntityKind::Tree, "Pine")).unwrap();
        let log = world.spawn(Entity::new(EntityKind::Log, "Log")).unwrap();
        world.despawn(log).unwrap();

        let counts = world.entity_counts_by_kind();
        assert_eq!(counts.get(&EntityKind::Tree), Some(&2));
        assert_eq!(counts.get(&EntityKind::Log), None);
    }
}
