//! Geometric primitives: segments, planes, spheres, boxes, capsules, polygons.
//!
//! All types are plain values. Distance queries return squared distances so
//! callers can compare against squared radii without a square root.

use glam::{Quat, Vec2, Vec3};

/// Tolerance used by every "is this effectively zero" decision in the crate.
pub const EPSILON: f32 = 0.001;

/// Shared near-zero predicate. Never compare floats against `0.0` directly
/// for degenerate-case detection; go through this.
#[inline]
pub fn near_zero(val: f32) -> bool {
    val.abs() <= EPSILON
}

/// Same as [`near_zero`] with a caller-provided tolerance.
#[inline]
pub fn near_zero_eps(val: f32, epsilon: f32) -> bool {
    val.abs() <= epsilon
}

/// Finite line segment, also used as a parametric ray over `t` in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineSegment {
    pub start: Vec3,
    pub end: Vec3,
}

impl LineSegment {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// `start + (end - start) * t`.
    pub fn point_on_segment(&self, t: f32) -> Vec3 {
        self.start + (self.end - self.start) * t
    }

    /// Minimum squared distance from `point` to this segment.
    pub fn min_dist_sq_point(&self, point: Vec3) -> f32 {
        let ab = self.end - self.start;
        let ba = -ab;
        let ac = point - self.start;
        let bc = point - self.end;

        if ab.dot(ac) < 0.0 {
            // Projects before start
            ac.length_squared()
        } else if ba.dot(bc) < 0.0 {
            // Projects past end
            bc.length_squared()
        } else {
            let ab_len_sq = ab.length_squared();
            if near_zero(ab_len_sq) {
                return ac.length_squared();
            }
            let p = ab * (ac.dot(ab) / ab_len_sq);
            (ac - p).length_squared()
        }
    }

    /// Minimum squared distance between two segments.
    ///
    /// Closest points on the infinite lines are found in closed form, then
    /// both parameters are clamped into `[0, 1]` edge by edge. Nearly
    /// parallel segments pin `s = 0` and solve for `t` directly.
    pub fn min_dist_sq(s1: &LineSegment, s2: &LineSegment) -> f32 {
        let u = s1.end - s1.start;
        let v = s2.end - s2.start;
        let w = s1.start - s2.start;
        let a = u.dot(u);
        let b = u.dot(v);
        let c = v.dot(v);
        let d = u.dot(w);
        let e = v.dot(w);
        let denom = a * c - b * b;

        // s = s_n / s_d, t = t_n / t_d
        let (mut s_n, mut s_d, mut t_n, t_d) = if near_zero(denom) {
            // Nearly parallel: pin s to the start of s1
            (0.0, 1.0, e, c)
        } else {
            let s_n = b * e - c * d;
            let t_n = a * e - b * d;
            if s_n < 0.0 {
                (0.0, denom, e, c)
            } else if s_n > denom {
                (denom, denom, e + b, c)
            } else {
                (s_n, denom, t_n, denom)
            }
        };

        if t_n < 0.0 {
            t_n = 0.0;
            if -d < 0.0 {
                s_n = 0.0;
            } else if -d > a {
                s_n = s_d;
            } else {
                s_n = -d;
                s_d = a;
            }
        } else if t_n > t_d {
            t_n = t_d;
            if (-d + b) < 0.0 {
                s_n = 0.0;
            } else if (-d + b) > a {
                s_n = s_d;
            } else {
                s_n = -d + b;
                s_d = a;
            }
        }

        let sc = if near_zero(s_n) { 0.0 } else { s_n / s_d };
        let tc = if near_zero(t_n) { 0.0 } else { t_n / t_d };

        // S1(sc) - S2(tc)
        let dp = w + u * sc - v * tc;
        dp.length_squared()
    }
}

/// Plane in the form `dot(p, normal) - d == 0`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    /// Unit normal.
    pub normal: Vec3,
    /// Signed distance of the plane from the origin along `normal`.
    pub d: f32,
}

impl Plane {
    pub fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// Plane through three non-collinear points, normal following the
    /// right-hand rule over `(b - a) x (c - a)`.
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self { normal, d: a.dot(normal) }
    }

    /// Positive on the side the normal points to.
    pub fn signed_dist(&self, point: Vec3) -> f32 {
        point.dot(self.normal) - self.d
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        (self.center - point).length_squared() <= self.radius * self.radius
    }
}

/// Axis-aligned bounding box.
///
/// Invariant: `min` is component-wise `<=` `max`. Every mutating operation
/// here preserves it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self { min: Vec3::ZERO, max: Vec3::ZERO }
    }
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(min.cmple(max).all(), "invalid AABB: min > max");
        Self { min, max }
    }

    /// Box centered at `center` with half extents `half`.
    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self::new(center - half, center + half)
    }

    /// Smallest box containing every point, `None` when `points` is empty.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut out = Self { min: *first, max: *first };
        for p in rest {
            out.update_min_max(*p);
        }
        Some(out)
    }

    /// Grow the box so that it contains `point`.
    pub fn update_min_max(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// The eight corners, `min` first and `max` last.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            lo,
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, lo.z),
            hi,
        ]
    }

    /// Rotate all eight corners by `q` and refit an axis-aligned box around
    /// them. The result bounds the rotated box; it is generally larger.
    pub fn rotate(&mut self, q: Quat) {
        let corners = self.corners();
        let first = q * corners[0];
        self.min = first;
        self.max = first;
        for c in &corners[1..] {
            self.update_min_max(q * *c);
        }
    }

    /// Uniform scale about the origin. Negative scale swaps the corners so
    /// the min/max invariant survives.
    pub fn scaled(&self, scale: f32) -> Self {
        let a = self.min * scale;
        let b = self.max * scale;
        Self { min: a.min(b), max: a.max(b) }
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self { min: self.min + offset, max: self.max + offset }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive on faces.
    pub fn contains(&self, point: Vec3) -> bool {
        let outside = point.x < self.min.x
            || point.y < self.min.y
            || point.z < self.min.z
            || point.x > self.max.x
            || point.y > self.max.y
            || point.z > self.max.z;
        !outside
    }

    /// Squared distance from `point` to the closest point of the box; zero
    /// when the point is inside.
    pub fn min_dist_sq(&self, point: Vec3) -> f32 {
        let dx = (self.min.x - point.x).max(0.0).max(point.x - self.max.x);
        let dy = (self.min.y - point.y).max(0.0).max(point.y - self.max.y);
        let dz = (self.min.z - point.z).max(0.0).max(point.z - self.max.z);
        dx * dx + dy * dy + dz * dz
    }
}

/// Segment swept by a radius.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Capsule {
    pub segment: LineSegment,
    pub radius: f32,
}

impl Capsule {
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self { segment: LineSegment::new(start, end), radius }
    }

    pub fn point_on_segment(&self, t: f32) -> Vec3 {
        self.segment.point_on_segment(t)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.segment.min_dist_sq_point(point) <= self.radius * self.radius
    }
}

/// Convex polygon in the plane. Vertex winding does not matter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConvexPolygon {
    pub vertices: Vec<Vec2>,
}

impl ConvexPolygon {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        Self { vertices }
    }

    /// Angle-sum test: the angles subtended at `point` by each edge add up to
    /// a full turn only when the point is inside.
    pub fn contains(&self, point: Vec2) -> bool {
        if self.vertices.len() < 3 {
            return false;
        }
        let n = self.vertices.len();
        let mut sum = 0.0_f32;
        for i in 0..n {
            let a = (self.vertices[i] - point).normalize_or_zero();
            let b = (self.vertices[(i + 1) % n] - point).normalize_or_zero();
            sum += a.dot(b).clamp(-1.0, 1.0).acos();
        }
        near_zero(sum - std::f32::consts::TAU)
    }
}

/// 2D circle, used by sprite-space games (asteroids, tower defense enemies).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Circle whose radius follows an owner's uniform scale.
    pub fn scaled(center: Vec2, base_radius: f32, scale: f32) -> Self {
        Self { center, radius: base_radius * scale }
    }

    pub fn intersects(&self, other: &Circle) -> bool {
        let dist_sq = (self.center - other.center).length_squared();
        let radii = self.radius + other.radius;
        dist_sq <= radii * radii
    }
}
