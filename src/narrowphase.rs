use glam::Vec3;

use crate::api::NarrowphaseApi;
use crate::geometry::{near_zero, Aabb, Capsule, LineSegment, Plane, Sphere};
use crate::types::*;

/// Narrowphase primitive tests.
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn sphere_sphere(a: &Sphere, b: &Sphere) -> bool {
        let dist_sq = (a.center - b.center).length_squared();
        let sum_radii = a.radius + b.radius;
        dist_sq <= sum_radii * sum_radii
    }

    fn aabb_aabb(a: &Aabb, b: &Aabb) -> bool {
        // Inclusive: touching faces count as overlap
        let separated = a.max.x < b.min.x
            || a.max.y < b.min.y
            || a.max.z < b.min.z
            || b.max.x < a.min.x
            || b.max.y < a.min.y
            || b.max.z < a.min.z;
        !separated
    }

    fn capsule_capsule(a: &Capsule, b: &Capsule) -> bool {
        let dist_sq = LineSegment::min_dist_sq(&a.segment, &b.segment);
        let sum_radii = a.radius + b.radius;
        dist_sq <= sum_radii * sum_radii
    }

    fn sphere_aabb(s: &Sphere, b: &Aabb) -> bool {
        b.min_dist_sq(s.center) <= s.radius * s.radius
    }

    fn segment_sphere(l: &LineSegment, s: &Sphere) -> Option<f32> {
        // Solve |start + t*(end - start) - center|^2 = r^2
        let x = l.start - s.center;
        let y = l.end - l.start;
        let a = y.dot(y);
        if near_zero(y.length()) {
            // Zero-length segment: a point test at t = 0
            return s.contains(l.start).then_some(0.0);
        }
        let b = 2.0 * x.dot(y);
        let c = x.dot(x) - s.radius * s.radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        let t_min = (-b - sqrt_disc) / (2.0 * a);
        let t_max = (-b + sqrt_disc) / (2.0 * a);
        if (0.0..=1.0).contains(&t_min) {
            Some(t_min)
        } else if (0.0..=1.0).contains(&t_max) {
            Some(t_max)
        } else {
            None
        }
    }

    fn segment_plane(l: &LineSegment, p: &Plane) -> Option<PlaneHit> {
        let denom = (l.end - l.start).dot(p.normal);
        if near_zero(denom) {
            // Parallel: only a hit when the whole segment lies in the plane
            return near_zero(p.signed_dist(l.start)).then_some(PlaneHit::Coincident);
        }
        let t = (p.d - l.start.dot(p.normal)) / denom;
        (0.0..=1.0).contains(&t).then_some(PlaneHit::Point(t))
    }

    fn segment_aabb(l: &LineSegment, b: &Aabb) -> Option<SegmentHit> {
        // Candidate crossings of all six face planes
        let mut hits: Vec<FaceHit> = Vec::with_capacity(6);
        for (axis, lo, hi) in [
            (Axis::X, b.min.x, b.max.x),
            (Axis::Y, b.min.y, b.max.y),
            (Axis::Z, b.min.z, b.max.z),
        ] {
            let start = axis.of(l.start);
            let end = axis.of(l.end);
            let unit = axis_unit(axis);
            test_side_plane(start, end, lo, -unit, axis, &mut hits);
            test_side_plane(start, end, hi, unit, axis, &mut hits);
        }

        // Stable: equal t keeps face order -x, +x, -y, +y, -z, +z
        hits.sort_by(|a, b| a.t.total_cmp(&b.t));

        // A plane crossing only counts if it lands on the face itself
        hits.into_iter()
            .find(|h| b.contains(h.point_on_face(l)))
            .map(|h| SegmentHit { t: h.t, normal: h.normal })
    }

    fn swept_sphere(p0: &Sphere, p1: &Sphere, q0: &Sphere, q1: &Sphere) -> Option<f32> {
        // Relative motion of P with respect to Q
        let x = p0.center - q0.center;
        let y = (p1.center - p0.center) - (q1.center - q0.center);
        let sum_radii = p0.radius + q0.radius;
        let a = y.dot(y);
        let c = x.dot(x) - sum_radii * sum_radii;
        if c <= 0.0 {
            // Already touching at the start of the step
            return Some(0.0);
        }
        if near_zero(y.length()) {
            return None;
        }
        let b = 2.0 * x.dot(y);
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let t = (-b - disc.sqrt()) / (2.0 * a);
        (0.0..=1.0).contains(&t).then_some(t)
    }
}

struct FaceHit {
    t: f32,
    normal: Vec3,
    axis: Axis,
    plane: f32,
}

impl FaceHit {
    /// Point at `t`, snapped onto the face plane so rounding in the
    /// parametric evaluation cannot push it outside the box.
    fn point_on_face(&self, l: &LineSegment) -> Vec3 {
        let mut p = l.point_on_segment(self.t);
        match self.axis {
            Axis::X => p.x = self.plane,
            Axis::Y => p.y = self.plane,
            Axis::Z => p.z = self.plane,
        }
        p
    }
}

fn axis_unit(axis: Axis) -> Vec3 {
    match axis {
        Axis::X => Vec3::X,
        Axis::Y => Vec3::Y,
        Axis::Z => Vec3::Z,
    }
}

fn test_side_plane(start: f32, end: f32, plane: f32, normal: Vec3, axis: Axis, out: &mut Vec<FaceHit>) {
    let denom = end - start;
    if near_zero(denom) {
        return;
    }
    let t = (plane - start) / denom;
    if (0.0..=1.0).contains(&t) {
        out.push(FaceHit { t, normal, axis, plane });
    }
}

/// Closed set of volume primitives for shape-agnostic overlap checks.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Aabb(Aabb),
    Capsule(Capsule),
}

impl Shape {
    /// Overlap test dispatched on the pair of variants. `None` for the one
    /// pair without an exact test (capsule vs box).
    pub fn intersects(&self, other: &Shape) -> Option<bool> {
        let hit = match (self, other) {
            (Shape::Sphere(a), Shape::Sphere(b)) => Narrowphase::sphere_sphere(a, b),
            (Shape::Aabb(a), Shape::Aabb(b)) => Narrowphase::aabb_aabb(a, b),
            (Shape::Capsule(a), Shape::Capsule(b)) => Narrowphase::capsule_capsule(a, b),
            (Shape::Sphere(s), Shape::Aabb(b)) | (Shape::Aabb(b), Shape::Sphere(s)) => {
                Narrowphase::sphere_aabb(s, b)
            }
            (Shape::Sphere(s), Shape::Capsule(c)) | (Shape::Capsule(c), Shape::Sphere(s)) => {
                let sum_radii = s.radius + c.radius;
                c.segment.min_dist_sq_point(s.center) <= sum_radii * sum_radii
            }
            (Shape::Capsule(_), Shape::Aabb(_)) | (Shape::Aabb(_), Shape::Capsule(_)) => return None,
        };
        Some(hit)
    }

    /// Point containment for any variant.
    pub fn contains(&self, point: Vec3) -> bool {
        match self {
            Shape::Sphere(s) => s.contains(point),
            Shape::Aabb(b) => b.contains(point),
            Shape::Capsule(c) => c.contains(point),
        }
    }

    /// Segment entry fraction, when the variant supports segment tests.
    pub fn segment_t(&self, l: &LineSegment) -> Option<f32> {
        match self {
            Shape::Sphere(s) => Narrowphase::segment_sphere(l, s),
            Shape::Aabb(b) => Narrowphase::segment_aabb(l, b).map(|h| h.t),
            Shape::Capsule(_) => None,
        }
    }
}
