//! Line-of-sight checks with a separate through-wall tolerance.
//!
//! Two distances are distinguished everywhere: `range` is the maximum
//! unobstructed distance, while `walls_range` is the (normally smaller)
//! distance at which an *obstructed* line is still accepted as good enough —
//! aiming through a thin obstruction. Callers opt into the weaker mode by
//! passing a non-zero `walls_range`.

use crate::env::WorldOracle;
use crate::math::{Aabb, Vec3};
use crate::rotation::Rotation;

/// Tie-break cost for choosing among several viable rotations.
#[derive(Clone, Copy, Debug)]
pub enum RotationPreference {
    /// Prefer the rotation closest to a reference rotation — usually the one
    /// that was aimed at last step, which keeps the visible aim continuous.
    LeastDifference(Rotation),
}

impl RotationPreference {
    pub fn towards_point(point: Vec3, eyes: Vec3) -> Self {
        Self::LeastDifference(Rotation::looking_at(point, eyes))
    }

    fn cost(&self, candidate: Rotation) -> f32 {
        match self {
            Self::LeastDifference(reference) => reference.angle_to(candidate),
        }
    }
}

/// Whether a ray cast from `eyes` along `rotation` strikes `hitbox` under the
/// dual-distance rule.
fn visible_along(
    world: &dyn WorldOracle,
    eyes: Vec3,
    rotation: Rotation,
    hitbox: &Aabb,
    range: f64,
    walls_range: f64,
) -> bool {
    let reach = range.max(walls_range);
    let Some(hit) = hitbox.ray_intersect(eyes, rotation.direction(), reach) else {
        return false;
    };

    if hit <= range {
        let hit_point = eyes + rotation.direction() * hit;
        let obstructed = world
            .obstruction_distance(eyes, hit_point)
            .is_some_and(|d| d < hit);
        if !obstructed {
            return true;
        }
    }

    // Obstructed (or only reachable) within the wall tolerance.
    hit <= walls_range
}

/// True when any reasonable rotation from `eyes` can see `hitbox` within the
/// dual-distance rule. Cheaper than a full [`raytrace_box`] search: only the
/// closest point and the box center are probed.
pub fn can_see_box(
    world: &dyn WorldOracle,
    eyes: Vec3,
    hitbox: &Aabb,
    range: f64,
    walls_range: f64,
) -> bool {
    [hitbox.closest_point(eyes), hitbox.center()]
        .into_iter()
        .any(|point| {
            let rotation = Rotation::looking_at(point, eyes);
            visible_along(world, eyes, rotation, hitbox, range, walls_range)
        })
}

/// Convenience check for an already-chosen rotation: is the avatar facing the
/// hitbox under the dual-distance rule?
pub fn facing_box(
    world: &dyn WorldOracle,
    eyes: Vec3,
    rotation: Rotation,
    hitbox: &Aabb,
    range: f64,
    walls_range: f64,
) -> bool {
    visible_along(world, eyes, rotation, hitbox, range, walls_range)
}

/// Lattice resolution used when searching candidate rotations.
const SEARCH_LATTICE: usize = 5;

/// Searches for a rotation that sees `hitbox`, minimizing the supplied
/// tie-break cost among all viable candidates.
///
/// Returns `None` when no candidate rotation satisfies either the
/// unobstructed `range` or the obstructed `walls_range` mode.
pub fn raytrace_box(
    world: &dyn WorldOracle,
    eyes: Vec3,
    hitbox: &Aabb,
    range: f64,
    walls_range: f64,
    preference: &RotationPreference,
) -> Option<Rotation> {
    let mut candidates = hitbox.surface_points(eyes, SEARCH_LATTICE);
    candidates.push(hitbox.closest_point(eyes));

    candidates
        .into_iter()
        .map(|point| Rotation::looking_at(point, eyes))
        .filter(|rotation| visible_along(world, eyes, *rotation, hitbox, range, walls_range))
        .min_by(|a, b| preference.cost(*a).total_cmp(&preference.cost(*b)))
}
