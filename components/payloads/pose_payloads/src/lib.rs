use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Values that can be blended between two states.
///
/// `alpha` is the normalized blend factor: 0 yields `self`, 1 yields `other`.
/// Callers are expected to keep it within `[0, 1]`.
pub trait Interpolate: Clone {
    fn interpolate(&self, other: &Self, alpha: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(&self, other: &Self, alpha: f32) -> Self {
        self + (other - self) * alpha
    }
}

impl Interpolate for f64 {
    fn interpolate(&self, other: &Self, alpha: f32) -> Self {
        self + (other - self) * alpha as f64
    }
}

impl Interpolate for Vec3 {
    fn interpolate(&self, other: &Self, alpha: f32) -> Self {
        self.lerp(*other, alpha)
    }
}

/// Spherical interpolation along the shortest arc.
/// glam flips `other` when the dot product is negative, so `q` and `-q` blend the same way.
impl Interpolate for Quat {
    fn interpolate(&self, other: &Self, alpha: f32) -> Self {
        self.slerp(*other, alpha)
    }
}

/// Placement of an entity at an instant: a position and a unit rotation.
///
/// The default value is the zero pose (origin, identity rotation).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation,
        }
    }

    /// Value equality with a tolerance.
    /// A quaternion and its negation describe the same rotation and compare equal.
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }
}

impl Interpolate for Pose {
    fn interpolate(&self, other: &Self, alpha: f32) -> Self {
        Self {
            position: self.position.interpolate(&other.position, alpha),
            rotation: self.rotation.interpolate(&other.rotation, alpha),
        }
    }
}

impl Display for Pose {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let p = self.position;
        let r = self.rotation;
        write!(
            f,
            "pos=({:.3}, {:.3}, {:.3}) rot=({:.3}, {:.3}, {:.3}, {:.3})",
            p.x, p.y, p.z, r.x, r.y, r.z, r.w
        )
    }
}
