//! Trait describing read-only world data.
//!
//! The host simulation implements [`WorldOracle`]; the core only ever reads
//! through it and never mutates world state. Mirrors the boundary contract of
//! the step scheduler: every query is answered synchronously from the current
//! step's state.

use crate::common::EntityId;
use crate::math::Vec3;
use crate::target::TargetSnapshot;

/// Read-only view of the surrounding world for one simulation step.
pub trait WorldOracle {
    /// Live entities whose hitbox lies within `radius` of `center`.
    ///
    /// The returned order does not matter; the target tracker re-sorts by its
    /// own metric. Snapshots are only valid for the current step.
    fn entities_within(&self, center: Vec3, radius: f64) -> Vec<TargetSnapshot>;

    /// Resolves an entity id to a fresh snapshot, or `None` if it no longer
    /// exists. Used to re-validate sticky targets each step.
    fn entity(&self, id: EntityId) -> Option<TargetSnapshot>;

    /// Distance from `from` to the first opaque world geometry along the
    /// segment toward `to`, or `None` when the line is clear.
    fn obstruction_distance(&self, from: Vec3, to: Vec3) -> Option<f64>;
}
