use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::geometry::Aabb;

/// Opaque handle for an actor owned by the game's actor framework.
///
/// The physics core never dereferences it; it is echoed back in query
/// results so the caller can find the actor in its own storage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(pub u64);

new_key_type! {
    /// Handle for a box registered with a [`crate::PhysWorld`].
    ///
    /// Generation-checked: a handle to a removed box never aliases a newer one.
    pub struct BoxId;
}

/// Actor world transform as seen by the collision core.
///
/// Applied to an object-space box in fixed order: scale, rotation,
/// translation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    /// Uniform scale.
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Quat::IDENTITY, scale: 1.0 }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }
}

/// Parametric hit of a segment against a surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentHit {
    /// Fraction in [0,1] along the segment.
    pub t: f32,
    /// Outward normal of the face that was hit.
    pub normal: Vec3,
}

/// Result of a segment/plane test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PlaneHit {
    /// Segment crosses the plane at fraction `t`.
    Point(f32),
    /// Segment is parallel to and lies in the plane; every `t` is a hit.
    Coincident,
}

impl PlaneHit {
    /// The crossing fraction, `None` for the coincident case.
    pub fn t(self) -> Option<f32> {
        match self {
            PlaneHit::Point(t) => Some(t),
            PlaneHit::Coincident => None,
        }
    }
}

/// Closest hit reported by a segment cast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionInfo {
    /// Point of contact in world space.
    pub point: Vec3,
    /// Outward normal of the face that was hit.
    pub normal: Vec3,
    /// Fraction along the cast segment.
    pub t: f32,
    pub box_id: BoxId,
    pub actor: ActorId,
    /// World box at the time of the cast.
    pub world_box: Aabb,
}

/// Coordinate axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn of(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

/// Counters for the last broad-phase run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Registered boxes.
    pub boxes: usize,
    /// Full AABB/AABB tests performed.
    pub pair_tests: usize,
    /// Overlapping pairs reported to the callback.
    pub overlaps: usize,
}
