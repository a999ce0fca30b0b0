//! Overlap and sweep queries against the colliders in a [`World`].
//!
//! Queries are stateless and read the scene directly; results come back in
//! spawn order, which is the "registration order" the behaviours rely on
//! when they pick the first match.

use glam::Vec3;
use lj_core::{Collider, Entity, EntityId, EntityKind, LayerMask, Shape, World};

/// Which colliders a query may report.
#[derive(Debug, Clone)]
pub struct QueryFilter {
    /// Only colliders on these layers.
    pub layers: LayerMask,
    /// Only entities of this kind.
    pub kind: Option<EntityKind>,
    /// Only entities carrying this tag.
    pub tag: Option<String>,
    /// Never report these entities.
    pub exclude: Vec<EntityId>,
    /// Report trigger volumes too.
    pub include_triggers: bool,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self::new(LayerMask::ALL)
    }
}

impl QueryFilter {
    /// A filter over `layers` that skips triggers.
    pub fn new(layers: LayerMask) -> Self {
        Self {
            layers,
            kind: None,
            tag: None,
            exclude: Vec::new(),
            include_triggers: false,
        }
    }

    /// Restrict to an entity kind.
    pub fn kind(mut self, kind: EntityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restrict to a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Ignore an entity.
    pub fn exclude(mut self, id: EntityId) -> Self {
        self.exclude.push(id);
        self
    }

    /// Include trigger volumes.
    pub fn with_triggers(mut self) -> Self {
        self.include_triggers = true;
        self
    }

    fn accepts(&self, entity: &Entity, collider: &Collider) -> bool {
        collider.enabled
            && collider.layer.intersects(self.layers)
            && (self.include_triggers || !collider.is_trigger)
            && self.kind.as_ref().is_none_or(|k| entity.kind == *k)
            && self.tag.as_deref().is_none_or(|t| entity.has_tag(t))
            && !self.exclude.contains(&entity.id)
    }
}

/// The first collider a sweep touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// The entity owning the collider.
    pub entity: EntityId,
    /// Contact point on the collider surface.
    pub point: Vec3,
    /// Surface normal at the contact, pointing back toward the sweep.
    pub normal: Vec3,
    /// Distance travelled along the sweep before contact.
    pub distance: f32,
}

/// Read-only spatial queries over a world.
#[derive(Debug, Clone, Copy)]
pub struct SpatialQuery<'w> {
    world: &'w World,
}

impl<'w> SpatialQuery<'w> {
    /// Query the colliders of `world`.
    pub fn new(world: &'w World) -> Self {
        Self { world }
    }

    fn candidates<'f>(
        &self,
        filter: &'f QueryFilter,
    ) -> impl Iterator<Item = (EntityId, Shape, Vec3)> + use<'w, 'f> {
        let world: &'w World = self.world;
        world.all_entities().filter_map(move |e| {
            let collider = e.components.collider.as_ref()?;
            filter
                .accepts(e, collider)
                .then(|| (e.id, collider.shape, e.pose.position + collider.offset))
        })
    }

    /// Entities whose collider overlaps a sphere.
    pub fn overlap_sphere(&self, center: Vec3, radius: f32, filter: &QueryFilter) -> Vec<EntityId> {
        self.overlap_shape(center, Shape::Sphere { radius }, filter)
    }

    /// Entities whose collider overlaps an arbitrary volume.
    pub fn overlap_shape(&self, center: Vec3, shape: Shape, filter: &QueryFilter) -> Vec<EntityId> {
        self.candidates(filter)
            .filter(|(_, other, other_center)| shapes_overlap(center, shape, *other_center, *other))
            .map(|(id, _, _)| id)
            .collect()
    }

    /// Sweep a sphere from `origin` along `direction` and report the nearest
    /// collider it touches within `max_distance`.
    ///
    /// Colliders the sphere already overlaps at `origin` are not reported.
    /// Boxes are swept as boxes grown by the radius, which is slightly
    /// conservative at the corners.
    pub fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<Hit> {
        let dir = direction.try_normalize()?;
        let mut best: Option<Hit> = None;
        for (id, shape, center) in self.candidates(filter) {
            let hit = match shape {
                Shape::Sphere { radius: r } => cast_sphere(origin, radius, dir, center, r),
                Shape::Box { half_extents } => cast_box(origin, radius, dir, center, half_extents),
            };
            if let Some((distance, point, normal)) = hit
                && distance <= max_distance
                && best.is_none_or(|b| distance < b.distance)
            {
                best = Some(Hit {
                    entity: id,
                    point,
                    normal,
                    distance,
                });
            }
        }
        best
    }
}

/// Whether two volumes intersect. Touching counts as overlapping.
pub fn shapes_overlap(a_center: Vec3, a: Shape, b_center: Vec3, b: Shape) -> bool {
    match (a, b) {
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            a_center.distance_squared(b_center) <= (ra + rb) * (ra + rb)
        }
        (Shape::Sphere { radius }, Shape::Box { half_extents }) => {
            sphere_box(a_center, radius, b_center, half_extents)
        }
        (Shape::Box { half_extents }, Shape::Sphere { radius }) => {
            sphere_box(b_center, radius, a_center, half_extents)
        }
        (Shape::Box { half_extents: ha }, Shape::Box { half_extents: hb }) => {
            (a_center - b_center).abs().cmple(ha + hb).all()
        }
    }
}

fn sphere_box(center: Vec3, radius: f32, box_center: Vec3, half: Vec3) -> bool {
    let closest = center.clamp(box_center - half, box_center + half);
    closest.distance_squared(center) <= radius * radius
}

fn cast_sphere(
    origin: Vec3,
    radius: f32,
    dir: Vec3,
    center: Vec3,
    r: f32,
) -> Option<(f32, Vec3, Vec3)> {
    let reach = radius + r;
    let m = origin - center;
    let c = m.length_squared() - reach * reach;
    if c <= 0.0 {
        return None;
    }
    let b = m.dot(dir);
    if b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    let normal = (origin + dir * t - center).try_normalize()?;
    Some((t, center + normal * r, normal))
}

fn cast_box(
    origin: Vec3,
    radius: f32,
    dir: Vec3,
    center: Vec3,
    half: Vec3,
) -> Option<(f32, Vec3, Vec3)> {
    let grown = half + Vec3::splat(radius);
    let min = center - grown;
    let max = center + grown;
    if origin.cmpge(min).all() && origin.cmple(max).all() {
        return None;
    }

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_axis = 0;
    for axis in 0..3 {
        let (o, d) = (origin[axis], dir[axis]);
        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let mut t1 = (min[axis] - o) / d;
        let mut t2 = (max[axis] - o) / d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        if t1 > t_enter {
            t_enter = t1;
            enter_axis = axis;
        }
        t_exit = t_exit.min(t2);
    }
    if t_enter > t_exit || t_enter < 0.0 {
        return None;
    }

    let mut normal = Vec3::ZERO;
    normal[enter_axis] = -dir[enter_axis].signum();
    let point = origin + dir * t_enter - normal * radius;
    Some((t_enter, point, normal))
}

#[cfg(test)]
mod tests {
    use lj_core::prefab;
    use lj_core::{Pose, SellZoneComponent, TreeComponent, WorldMeta};

    use super::*;

    fn scene() -> (World, EntityId, EntityId, EntityId) {
        let mut world = World::new(WorldMeta::new("Spatial"));
        let wall = prefab::spawn_obstacle(
            &mut world,
            "Wall",
            Vec3::new(0.0, 1.0, 5.0),
            Vec3::new(2.0, 1.0, 0.5),
        )
        .unwrap();
        let log_a = prefab::spawn_log(&mut world, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let log_b = prefab::spawn_log(&mut world, Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        prefab::spawn_sell_zone(
            &mut world,
            "Market",
            Vec3::new(0.0, 1.0, -5.0),
            Vec3::splat(1.0),
            SellZoneComponent::default(),
        )
        .unwrap();
        (world, wall, log_a, log_b)
    }

    #[test]
    fn overlap_reports_in_spawn_order() {
        let (world, _, log_a, log_b) = scene();
        let hits = SpatialQuery::new(&world).overlap_sphere(
            Vec3::ZERO,
            2.0,
            &QueryFilter::default(),
        );
        assert_eq!(hits, vec![log_a, log_b]);
    }

    #[test]
    fn overlap_respects_layer_tag_and_exclusion() {
        let (world, _, log_a, log_b) = scene();
        let q = SpatialQuery::new(&world);
        assert!(q
            .overlap_sphere(Vec3::ZERO, 2.0, &QueryFilter::new(LayerMask::TREE))
            .is_empty());
        assert_eq!(
            q.overlap_sphere(Vec3::ZERO, 2.0, &QueryFilter::default().tag("log").exclude(log_a)),
            vec![log_b]
        );
    }

    #[test]
    fn disabled_colliders_are_invisible() {
        let (mut world, _, log_a, log_b) = scene();
        world.set_collider_enabled(log_a, false).unwrap();
        let hits = SpatialQuery::new(&world).overlap_sphere(
            Vec3::ZERO,
            2.0,
            &QueryFilter::default(),
        );
        assert_eq!(hits, vec![log_b]);
    }

    #[test]
    fn triggers_need_opt_in() {
        let (world, ..) = scene();
        let q = SpatialQuery::new(&world);
        let at_zone = Vec3::new(0.0, 1.0, -5.0);
        assert!(q.overlap_sphere(at_zone, 0.5, &QueryFilter::default()).is_empty());
        assert_eq!(
            q.overlap_sphere(at_zone, 0.5, &QueryFilter::default().with_triggers()).len(),
            1
        );
        // Sweeps skip triggers too.
        assert!(q
            .sphere_cast(Vec3::new(0.0, 1.0, 0.0), 0.2, -Vec3::Z, 10.0, &QueryFilter::default())
            .is_none());
    }

    #[test]
    fn sphere_cast_hits_box_face() {
        let (world, wall, ..) = scene();
        let hit = SpatialQuery::new(&world)
            .sphere_cast(
                Vec3::new(0.0, 1.0, 0.0),
                0.5,
                Vec3::Z,
                10.0,
                &QueryFilter::new(LayerMask::OBSTACLE),
            )
            .unwrap();
        assert_eq!(hit.entity, wall);
        // Wall face at z = 4.5, minus the sweep radius.
        assert!((hit.distance - 4.0).abs() < 1e-4);
        assert!((hit.normal - -Vec3::Z).length() < 1e-5);
        assert!((hit.point.z - 4.5).abs() < 1e-4);
    }

    #[test]
    fn sphere_cast_respects_max_distance_and_start_overlap() {
        let (world, ..) = scene();
        let q = SpatialQuery::new(&world);
        let filter = QueryFilter::new(LayerMask::OBSTACLE);
        assert!(q.sphere_cast(Vec3::new(0.0, 1.0, 0.0), 0.5, Vec3::Z, 3.0, &filter).is_none());
        // Starting inside the wall reports nothing.
        assert!(q.sphere_cast(Vec3::new(0.0, 1.0, 5.0), 0.5, Vec3::Z, 3.0, &filter).is_none());
        assert!(q.sphere_cast(Vec3::new(0.0, 1.0, 0.0), 0.5, Vec3::ZERO, 3.0, &filter).is_none());
    }

    #[test]
    fn sphere_cast_hits_nearest_sphere() {
        let mut world = World::new(WorldMeta::new("Logs"));
        let far = prefab::spawn_log(&mut world, Vec3::new(0.0, 0.0, 6.0)).unwrap();
        let near = prefab::spawn_log(&mut world, Vec3::new(0.0, 0.0, 3.0)).unwrap();
        let hit = SpatialQuery::new(&world)
            .sphere_cast(Vec3::ZERO, 0.2, Vec3::Z, 10.0, &QueryFilter::default())
            .unwrap();
        assert_eq!(hit.entity, near);
        assert_ne!(hit.entity, far);
        assert!((hit.distance - 2.5).abs() < 1e-4);
        assert!((hit.point - Vec3::new(0.0, 0.0, 2.7)).length() < 1e-4);
    }

    #[test]
    fn box_overlaps_sphere_and_box() {
        let sphere = Shape::Sphere { radius: 0.5 };
        let cube = Shape::Box {
            half_extents: Vec3::splat(1.0),
        };
        assert!(shapes_overlap(Vec3::new(1.4, 0.0, 0.0), sphere, Vec3::ZERO, cube));
        assert!(!shapes_overlap(Vec3::new(1.6, 0.0, 0.0), sphere, Vec3::ZERO, cube));
        assert!(shapes_overlap(Vec3::ZERO, cube, Vec3::new(1.9, 1.9, 0.0), cube));
        assert!(!shapes_overlap(Vec3::ZERO, cube, Vec3::new(2.1, 0.0, 0.0), cube));
    }

    #[test]
    fn trees_block_on_their_layer() {
        let mut world = World::new(WorldMeta::new("Grove"));
        let tree = prefab::spawn_tree(
            &mut world,
            "Oak",
            Pose::at(Vec3::new(0.0, 0.0, 3.0)),
            TreeComponent::default(),
        )
        .unwrap();
        let hit = SpatialQuery::new(&world)
            .sphere_cast(
                Vec3::new(0.0, 0.5, 0.0),
                0.5,
                Vec3::Z,
                5.0,
                &QueryFilter::new(LayerMask::TREE),
            )
            .unwrap();
        assert_eq!(hit.entity, tree);
        assert!((hit.distance - 2.1).abs() < 1e-4);
    }
}
