use log::{trace, warn};
use slotmap::SlotMap;

use crate::api::{NarrowphaseApi, PhysWorldApi};
use crate::config::WorldConfig;
use crate::geometry::{Aabb, LineSegment};
use crate::narrowphase::Narrowphase;
use crate::types::*;

/// Axis-aligned collision volume attached to an actor.
///
/// The object-space box is set once; the world-space box is refit from it
/// every time the owner's transform changes and is stale in between.
#[derive(Clone, Debug)]
pub struct BoxComponent {
    owner: ActorId,
    object_box: Aabb,
    world_box: Aabb,
    should_rotate: bool,
}

impl BoxComponent {
    fn new(owner: ActorId, object_box: Aabb) -> Self {
        Self { owner, object_box, world_box: object_box, should_rotate: true }
    }

    pub fn owner(&self) -> ActorId {
        self.owner
    }

    pub fn object_box(&self) -> &Aabb {
        &self.object_box
    }

    pub fn world_box(&self) -> &Aabb {
        &self.world_box
    }

    pub fn should_rotate(&self) -> bool {
        self.should_rotate
    }

    /// Rebuild the world box: scale, then rotate (if enabled), then
    /// translate. Always starts from the object box so repeated updates do
    /// not accumulate rotation growth.
    fn refit(&mut self, transform: &Transform) {
        let mut world = self.object_box.scaled(transform.scale);
        if self.should_rotate {
            world.rotate(transform.rotation);
        }
        self.world_box = world.translated(transform.position);
    }
}

/// Registry of live box components with segment casting and pairwise
/// overlap enumeration.
///
/// Boxes are stored in an arena keyed by [`BoxId`]; actors keep the handle
/// and the world never refers back to actor storage. Queries visit boxes in
/// registration order.
pub struct PhysWorld {
    pub cfg: WorldConfig,

    boxes: SlotMap<BoxId, BoxComponent>,
    // Registration order, drives iteration and segment-cast tie-breaks
    order: Vec<BoxId>,

    last_stats: WorldStats,
}

impl PhysWorldApi for PhysWorld {
    fn new(cfg: WorldConfig) -> Self {
        Self {
            cfg,
            boxes: SlotMap::with_key(),
            order: Vec::new(),
            last_stats: WorldStats::default(),
        }
    }

    fn add_box(&mut self, owner: ActorId, object_box: Aabb) -> BoxId {
        let id = self.boxes.insert(BoxComponent::new(owner, object_box));
        self.order.push(id);
        trace!("box {:?} registered for actor {:?} ({} live)", id, owner, self.order.len());
        id
    }

    fn remove_box(&mut self, id: BoxId) -> bool {
        if self.boxes.remove(id).is_none() {
            warn!("remove_box: {:?} is not registered", id);
            return false;
        }
        if let Some(pos) = self.order.iter().position(|b| *b == id) {
            self.order.remove(pos);
        }
        trace!("box {:?} removed ({} live)", id, self.order.len());
        true
    }

    fn on_update_world_transform(&mut self, id: BoxId, transform: &Transform) {
        match self.boxes.get_mut(id) {
            Some(b) => b.refit(transform),
            None => warn!("on_update_world_transform: {:?} is not registered", id),
        }
    }

    fn segment_cast(&self, segment: &LineSegment) -> Option<CollisionInfo> {
        let mut best: Option<CollisionInfo> = None;
        for (id, b) in self.iter() {
            let Some(hit) = Narrowphase::segment_aabb(segment, &b.world_box) else { continue };
            // Strict: an equal t never displaces an earlier-registered box
            if best.is_some_and(|cur| hit.t >= cur.t) {
                continue;
            }
            best = Some(CollisionInfo {
                point: segment.point_on_segment(hit.t),
                normal: hit.normal,
                t: hit.t,
                box_id: id,
                actor: b.owner,
                world_box: b.world_box,
            });
        }
        best
    }

    fn test_pairwise<F>(&mut self, mut f: F)
    where
        F: FnMut(ActorId, ActorId),
    {
        let mut stats = WorldStats { boxes: self.order.len(), ..Default::default() };
        for i in 0..self.order.len() {
            let a = &self.boxes[self.order[i]];
            for j in (i + 1)..self.order.len() {
                let b = &self.boxes[self.order[j]];
                stats.pair_tests += 1;
                if Narrowphase::aabb_aabb(&a.world_box, &b.world_box) {
                    stats.overlaps += 1;
                    f(a.owner, b.owner);
                }
            }
        }
        self.last_stats = stats;
    }

    fn test_sweep_and_prune<F>(&mut self, mut f: F)
    where
        F: FnMut(ActorId, ActorId),
    {
        let axis = self.cfg.sweep_axis;
        let mut sorted: Vec<&BoxComponent> = self.order.iter().map(|id| &self.boxes[*id]).collect();
        // Stable, so equal minima keep registration order
        sorted.sort_by(|a, b| axis.of(a.world_box.min).total_cmp(&axis.of(b.world_box.min)));

        let mut stats = WorldStats { boxes: sorted.len(), ..Default::default() };
        for i in 0..sorted.len() {
            let a = sorted[i];
            let max = axis.of(a.world_box.max);
            for b in &sorted[(i + 1)..] {
                // Everything from here on starts past a's extent on the sweep axis
                if axis.of(b.world_box.min) > max {
                    break;
                }
                stats.pair_tests += 1;
                if Narrowphase::aabb_aabb(&a.world_box, &b.world_box) {
                    stats.overlaps += 1;
                    f(a.owner, b.owner);
                }
            }
        }
        self.last_stats = stats;
    }
}

impl PhysWorld {
    /// Replace the object-space box. The world box is refit on the next
    /// transform update.
    pub fn set_object_box(&mut self, id: BoxId, object_box: Aabb) {
        if let Some(b) = self.boxes.get_mut(id) {
            b.object_box = object_box;
        }
    }

    /// Skip the rotate-and-refit step for boxes whose owner rotates but
    /// whose collider should stay put (e.g. an upright player).
    pub fn set_should_rotate(&mut self, id: BoxId, value: bool) {
        if let Some(b) = self.boxes.get_mut(id) {
            b.should_rotate = value;
        }
    }

    pub fn get(&self, id: BoxId) -> Option<&BoxComponent> {
        self.boxes.get(id)
    }

    pub fn world_box(&self, id: BoxId) -> Option<&Aabb> {
        self.boxes.get(id).map(|b| &b.world_box)
    }

    pub fn owner_of(&self, id: BoxId) -> Option<ActorId> {
        self.boxes.get(id).map(|b| b.owner)
    }

    pub fn contains(&self, id: BoxId) -> bool {
        self.boxes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Live boxes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (BoxId, &BoxComponent)> + '_ {
        self.order.iter().map(move |id| (*id, &self.boxes[*id]))
    }

    /// Counters from the most recent pairwise or sweep-and-prune run.
    pub fn stats(&self) -> WorldStats {
        self.last_stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{Quat, Vec3};
    use std::collections::BTreeSet;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    fn world_with(boxes: &[(u64, Vec3)]) -> (PhysWorld, Vec<BoxId>) {
        let mut w = PhysWorld::new(WorldConfig::default());
        let ids = boxes
            .iter()
            .map(|(actor, pos)| {
                let id = w.add_box(ActorId(*actor), unit_box());
                w.on_update_world_transform(id, &Transform::from_position(*pos));
                id
            })
            .collect();
        (w, ids)
    }

    fn pair_set(pairs: Vec<(ActorId, ActorId)>) -> BTreeSet<(u64, u64)> {
        pairs.into_iter().map(|(a, b)| (a.0.min(b.0), a.0.max(b.0))).collect()
    }

    #[test]
    fn test_add_remove_and_stale_handle() {
        let mut w = PhysWorld::new(WorldConfig::default());
        let a = w.add_box(ActorId(1), unit_box());
        let b = w.add_box(ActorId(2), unit_box());
        assert_eq!(w.len(), 2);
        assert!(w.remove_box(a));
        assert!(!w.remove_box(a));
        assert!(!w.contains(a));
        assert_eq!(w.len(), 1);
        assert_eq!(w.owner_of(b), Some(ActorId(2)));
        // Reused slot gets a fresh handle
        let c = w.add_box(ActorId(3), unit_box());
        assert_ne!(a, c);
        assert!(w.owner_of(a).is_none());
    }

    #[test]
    fn test_refit_scale_rotate_translate_order() {
        let mut w = PhysWorld::new(WorldConfig::default());
        let id = w.add_box(ActorId(1), Aabb::new(Vec3::new(0.0, -1.0, -1.0), Vec3::new(2.0, 1.0, 1.0)));
        let t = Transform {
            position: Vec3::new(10.0, 0.0, 0.0),
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            scale: 2.0,
        };
        w.on_update_world_transform(id, &t);
        let wb = w.world_box(id).unwrap();
        // scaled: x[0,4] y[-2,2]; rotated 90 about z: x[-2,2] y[0,4]; translated by +10 x
        assert!(wb.min.abs_diff_eq(Vec3::new(8.0, 0.0, -2.0), 1e-5));
        assert!(wb.max.abs_diff_eq(Vec3::new(12.0, 4.0, 2.0), 1e-5));
    }

    #[test]
    fn test_refit_without_rotation() {
        let mut w = PhysWorld::new(WorldConfig::default());
        let id = w.add_box(ActorId(1), unit_box());
        w.set_should_rotate(id, false);
        let t = Transform {
            position: Vec3::new(0.0, 5.0, 0.0),
            rotation: Quat::from_rotation_y(0.7),
            scale: 1.0,
        };
        w.on_update_world_transform(id, &t);
        let wb = w.world_box(id).unwrap();
        assert_eq!(wb.min, Vec3::new(-1.0, 4.0, -1.0));
        assert_eq!(wb.max, Vec3::new(1.0, 6.0, 1.0));
    }

    #[test]
    fn test_refit_does_not_accumulate() {
        let mut w = PhysWorld::new(WorldConfig::default());
        let id = w.add_box(ActorId(1), unit_box());
        let t = Transform { rotation: Quat::from_rotation_z(0.5), ..Default::default() };
        w.on_update_world_transform(id, &t);
        let first = *w.world_box(id).unwrap();
        w.on_update_world_transform(id, &t);
        assert_eq!(*w.world_box(id).unwrap(), first);
    }

    #[test]
    fn test_segment_cast_closest_wins() {
        let (w, ids) = world_with(&[(1, Vec3::new(0.0, 0.0, 20.0)), (2, Vec3::new(0.0, 0.0, 10.0))]);
        let l = LineSegment::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0));
        let hit = w.segment_cast(&l).unwrap();
        assert_eq!(hit.actor, ActorId(2));
        assert_eq!(hit.box_id, ids[1]);
        assert_eq!(hit.normal, Vec3::NEG_Z);
        assert_relative_eq!(hit.point.z, 9.0, epsilon = 1e-4);
        assert_relative_eq!(hit.t, 0.09, epsilon = 1e-6);
    }

    #[test]
    fn test_segment_cast_tie_keeps_first_registered() {
        // Two boxes with the same entry face
        let (w, _) = world_with(&[(7, Vec3::new(0.0, 0.0, 10.0)), (8, Vec3::new(0.5, 0.0, 10.0))]);
        let l = LineSegment::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 100.0));
        assert_eq!(w.segment_cast(&l).unwrap().actor, ActorId(7));
    }

    #[test]
    fn test_segment_cast_miss_and_empty() {
        let empty = PhysWorld::new(WorldConfig::default());
        let l = LineSegment::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0));
        assert!(empty.segment_cast(&l).is_none());
        let (w, _) = world_with(&[(1, Vec3::new(50.0, 0.0, 10.0))]);
        assert!(w.segment_cast(&l).is_none());
    }

    #[test]
    fn test_segment_cast_ignores_removed_box() {
        let (mut w, ids) = world_with(&[(1, Vec3::new(0.0, 0.0, 10.0)), (2, Vec3::new(0.0, 0.0, 20.0))]);
        w.remove_box(ids[0]);
        let l = LineSegment::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0));
        assert_eq!(w.segment_cast(&l).unwrap().actor, ActorId(2));
    }

    #[test]
    fn test_pairwise_reports_each_pair_once() {
        let (mut w, _) = world_with(&[
            (1, Vec3::ZERO),
            (2, Vec3::new(1.5, 0.0, 0.0)),
            (3, Vec3::new(0.5, 1.0, 0.0)),
            (4, Vec3::new(50.0, 0.0, 0.0)),
        ]);
        let mut pairs = Vec::new();
        w.test_pairwise(|a, b| pairs.push((a, b)));
        assert_eq!(pairs.len(), 3);
        assert_eq!(pair_set(pairs), BTreeSet::from([(1, 2), (1, 3), (2, 3)]));
        let stats = w.stats();
        assert_eq!(stats.pair_tests, 6);
        assert_eq!(stats.overlaps, 3);
    }

    #[test]
    fn test_sweep_and_prune_matches_pairwise() {
        let (mut w, _) = world_with(&[
            (1, Vec3::new(30.0, 0.0, 0.0)),
            (2, Vec3::ZERO),
            (3, Vec3::new(1.5, 0.0, 0.0)),
            (4, Vec3::new(31.0, 0.0, 5.0)),
            (5, Vec3::new(31.0, 0.5, 1.0)),
            (6, Vec3::new(-40.0, 0.0, 0.0)),
        ]);
        let mut naive = Vec::new();
        w.test_pairwise(|a, b| naive.push((a, b)));
        let naive_tests = w.stats().pair_tests;
        let mut sap = Vec::new();
        w.test_sweep_and_prune(|a, b| sap.push((a, b)));
        assert_eq!(pair_set(naive), pair_set(sap));
        assert!(w.stats().pair_tests < naive_tests);
    }

    #[test]
    fn test_sweep_and_prune_other_axis() {
        let mut w = PhysWorld::new(WorldConfig { sweep_axis: Axis::Y });
        for (actor, y) in [(1, 0.0), (2, 1.0), (3, 10.0)] {
            let id = w.add_box(ActorId(actor), unit_box());
            w.on_update_world_transform(id, &Transform::from_position(Vec3::new(0.0, y, 0.0)));
        }
        let mut pairs = Vec::new();
        w.test_sweep_and_prune(|a, b| pairs.push((a, b)));
        assert_eq!(pair_set(pairs), BTreeSet::from([(1, 2)]));
        assert_eq!(w.stats().pair_tests, 1);
    }

    #[test]
    fn test_iter_in_registration_order() {
        let (w, ids) = world_with(&[(3, Vec3::ZERO), (1, Vec3::ONE), (2, Vec3::X)]);
        let seen: Vec<BoxId> = w.iter().map(|(id, _)| id).collect();
        assert_eq!(seen, ids);
    }
}
