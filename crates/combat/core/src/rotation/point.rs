//! Aim-point selection on a target hitbox.

use super::Rotation;
use crate::math::{Aabb, Vec3};

/// A chosen aim point together with the (possibly expanded) hitbox it was
/// selected on, which downstream raycasts must use as well.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointInBox {
    pub pos: Vec3,
    pub hitbox: Aabb,
}

/// Tracks a point on the current target's hitbox across steps.
///
/// Continuity matters more than optimality here: re-picking a wildly
/// different point every step makes the externally visible aim snap around
/// and wastes interpolation budget. When a previous point exists, candidates
/// are ranked by angular change relative to it; otherwise the closest
/// reachable point wins.
#[derive(Debug)]
pub struct PointTracker {
    /// Hitbox expansion applied before point selection.
    margin: f64,
    /// Lattice resolution per visible face axis.
    lattice: usize,
    last_point: Option<Vec3>,
}

impl Default for PointTracker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MARGIN)
    }
}

impl PointTracker {
    pub const DEFAULT_MARGIN: f64 = 0.0;
    const DEFAULT_LATTICE: usize = 5;

    pub fn new(margin: f64) -> Self {
        Self {
            margin,
            lattice: Self::DEFAULT_LATTICE,
            last_point: None,
        }
    }

    /// The point chosen on the previous step, if any.
    pub fn last_point(&self) -> Option<Vec3> {
        self.last_point
    }

    /// Drops point history, e.g. when the tracked target changes or the
    /// owning behavior is disabled.
    pub fn reset(&mut self) {
        self.last_point = None;
    }

    /// Selects the point to aim at on `hitbox` as seen from `eyes`.
    ///
    /// The caller supplies the hitbox already rebased at the (possibly
    /// extrapolated) target position; this function only expands it by the
    /// configured margin and picks a point on it.
    pub fn find_point(&mut self, eyes: Vec3, hitbox: Aabb) -> PointInBox {
        let hitbox = hitbox.expand(self.margin);
        let candidates = hitbox.surface_points(eyes, self.lattice);

        let pos = match self.last_point {
            Some(last) => {
                let last_rotation = Rotation::looking_at(last, eyes);
                candidates
                    .iter()
                    .copied()
                    .min_by(|a, b| {
                        let cost_a = last_rotation.angle_to(Rotation::looking_at(*a, eyes));
                        let cost_b = last_rotation.angle_to(Rotation::looking_at(*b, eyes));
                        cost_a.total_cmp(&cost_b)
                    })
                    .unwrap_or_else(|| hitbox.closest_point(eyes))
            }
            None => candidates
                .iter()
                .copied()
                .min_by(|a, b| {
                    a.squared_distance_to(eyes).total_cmp(&b.squared_distance_to(eyes))
                })
                .unwrap_or_else(|| hitbox.closest_point(eyes)),
        };

        self.last_point = Some(pos);
        PointInBox { pos, hitbox }
    }
}
