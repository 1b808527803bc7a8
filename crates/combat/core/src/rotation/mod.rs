//! Rotation model: yaw/pitch pairs, aim-point selection, and arbitration.
//!
//! Two rotation values exist side by side and must never be conflated: the
//! *visual* rotation the avatar's body is interpolated toward, and the
//! *authoritative* rotation reported to the remote simulation for hit
//! resolution. Both are owned exclusively by the [`RotationArbiter`];
//! behaviors only ever submit [`RotationRequest`]s.
mod arbiter;
mod point;

pub use arbiter::{ArbiterConfig, Priority, RotationArbiter, RotationRequest, RotationTiming};
pub use point::{PointInBox, PointTracker};

use crate::math::Vec3;

/// Facing direction as yaw/pitch in degrees.
///
/// Canonical form is yaw in `[-180, 180)` and pitch in `[-90, 90]`;
/// [`Rotation::normalize`] produces it and is idempotent.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
}

/// Wraps an angle into `[-180, 180)`.
fn wrap_degrees(angle: f32) -> f32 {
    (angle % 360.0 + 540.0) % 360.0 - 180.0
}

impl Rotation {
    pub const fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Rotation that faces `point` from `eyes`.
    pub fn looking_at(point: Vec3, eyes: Vec3) -> Self {
        let diff = point - eyes;
        let yaw = (-diff.x).atan2(diff.z).to_degrees() as f32;
        let horizontal = (diff.x * diff.x + diff.z * diff.z).sqrt();
        let pitch = (-diff.y.atan2(horizontal)).to_degrees() as f32;
        Self { yaw, pitch }.normalize()
    }

    /// Canonical form: yaw wrapped to `[-180, 180)`, pitch clamped to
    /// `[-90, 90]`. Idempotent.
    pub fn normalize(self) -> Self {
        Self {
            yaw: wrap_degrees(self.yaw),
            pitch: self.pitch.clamp(-90.0, 90.0),
        }
    }

    /// Unit direction vector of this facing.
    pub fn direction(self) -> Vec3 {
        let yaw = f64::from(self.yaw).to_radians();
        let pitch = f64::from(self.pitch).to_radians();
        Vec3::new(
            -yaw.sin() * pitch.cos(),
            -pitch.sin(),
            yaw.cos() * pitch.cos(),
        )
    }

    /// Angular distance to `other` in degrees, measured between the facing
    /// direction vectors.
    pub fn angle_to(self, other: Rotation) -> f32 {
        let dot = self.direction().dot(other.direction()).clamp(-1.0, 1.0);
        dot.acos().to_degrees() as f32
    }

    /// Component-wise wrapped yaw/pitch difference toward `other`.
    pub fn delta_to(self, other: Rotation) -> (f32, f32) {
        let a = self.normalize();
        let b = other.normalize();
        (wrap_degrees(b.yaw - a.yaw), b.pitch - a.pitch)
    }

    /// Moves toward `target` by at most `max_step` degrees of combined
    /// yaw/pitch change. A non-positive `max_step` freezes the rotation.
    pub fn step_towards(self, target: Rotation, max_step: f32) -> Self {
        if max_step <= 0.0 {
            return self.normalize();
        }
        let current = self.normalize();
        let (dyaw, dpitch) = current.delta_to(target);
        let magnitude = (dyaw * dyaw + dpitch * dpitch).sqrt();
        if magnitude <= max_step {
            return target.normalize();
        }
        let scale = max_step / magnitude;
        Rotation::new(current.yaw + dyaw * scale, current.pitch + dpitch * scale).normalize()
    }

    /// Steps needed to reach `target` when turning `max_step` degrees per
    /// step. Saturates at one step for an infinite rate.
    pub fn steps_to(self, target: Rotation, max_step: f32) -> u32 {
        if max_step <= 0.0 {
            return u32::MAX;
        }
        let (dyaw, dpitch) = self.delta_to(target);
        let magnitude = (dyaw * dyaw + dpitch * dpitch).sqrt();
        (magnitude / max_step).ceil().max(1.0) as u32
    }
}
