use crate::config::WorldConfig;
use crate::geometry::{Aabb, Capsule, LineSegment, Plane, Sphere};
use crate::types::*;

/// Public API contract for the box registry and its broad-phase queries.
pub trait PhysWorldApi {
    /// Construct an empty world.
    fn new(cfg: WorldConfig) -> Self
    where
        Self: Sized;

    // --- Registration ------------------------------------------------------

    /// Register a box owned by `owner`. The world box starts equal to the
    /// object box until the first transform update.
    fn add_box(&mut self, owner: ActorId, object_box: Aabb) -> BoxId;

    /// Deregister a box. Returns `false` if the handle was stale.
    fn remove_box(&mut self, id: BoxId) -> bool;

    /// Owner transform changed: refit the world box (scale, rotate if
    /// enabled, translate).
    fn on_update_world_transform(&mut self, id: BoxId, transform: &Transform);

    // --- Queries -----------------------------------------------------------

    /// Closest box hit by the segment, earliest registration wins ties.
    fn segment_cast(&self, segment: &LineSegment) -> Option<CollisionInfo>;

    /// Report every overlapping pair once by testing all unordered pairs.
    fn test_pairwise<F>(&mut self, f: F)
    where
        F: FnMut(ActorId, ActorId);

    /// Same pair set as [`PhysWorldApi::test_pairwise`], pruned by sorting
    /// along the configured axis.
    fn test_sweep_and_prune<F>(&mut self, f: F)
    where
        F: FnMut(ActorId, ActorId);
}

/// Pairwise primitive intersection tests.
///
/// All tests are pure. "No hit" is `None`/`false`; a returned value is
/// always meaningful.
pub trait NarrowphaseApi {
    // Volumes ---------------------------------------------------------------

    fn sphere_sphere(a: &Sphere, b: &Sphere) -> bool;
    fn aabb_aabb(a: &Aabb, b: &Aabb) -> bool;
    fn capsule_capsule(a: &Capsule, b: &Capsule) -> bool;
    fn sphere_aabb(s: &Sphere, b: &Aabb) -> bool;

    // Segments --------------------------------------------------------------

    /// Earliest `t` in [0,1] where the segment touches the sphere.
    fn segment_sphere(l: &LineSegment, s: &Sphere) -> Option<f32>;
    fn segment_plane(l: &LineSegment, p: &Plane) -> Option<PlaneHit>;
    /// Earliest face crossing that lies on the box, with that face's normal.
    fn segment_aabb(l: &LineSegment, b: &Aabb) -> Option<SegmentHit>;

    // Sweeps ----------------------------------------------------------------

    /// Spheres moving from `p0` to `p1` and `q0` to `q1` over one step.
    /// Returns the first contact fraction in [0,1]. Radii are taken from
    /// the start spheres.
    fn swept_sphere(p0: &Sphere, p1: &Sphere, q0: &Sphere, q1: &Sphere) -> Option<f32>;
}
