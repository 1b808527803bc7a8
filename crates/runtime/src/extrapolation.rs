//! Forward motion prediction for aim leading and range-exit detection.

use combat_core::{TargetSnapshot, Vec3, WorldOracle, can_see_box};

use crate::env::ActorView;

/// Closed set of extrapolation strategies, selected from the observed
/// velocity at construction time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PositionExtrapolation {
    /// The entity is not meaningfully moving.
    Stationary(Vec3),
    /// Constant-velocity extrapolation.
    Linear { position: Vec3, velocity: Vec3 },
}

/// Below this per-step speed an entity is treated as standing still.
const MOTION_EPSILON: f64 = 1e-4;

impl PositionExtrapolation {
    pub fn best_for(position: Vec3, velocity: Vec3) -> Self {
        if velocity.length_squared() < MOTION_EPSILON * MOTION_EPSILON {
            Self::Stationary(position)
        } else {
            Self::Linear { position, velocity }
        }
    }

    pub fn position_in_ticks(&self, ticks: f64) -> Vec3 {
        match *self {
            Self::Stationary(position) => position,
            Self::Linear { position, velocity } => position + velocity * ticks,
        }
    }
}

/// Predicts whether the target will have left valid attack range `ticks`
/// steps from now, by extrapolating both parties forward and testing
/// visibility from the future eye position against the future hitbox.
///
/// A freshly hit target (still in its hurt animation) is not predicted to
/// exit; it is knocked back and recovers in place more often than not.
///
/// # Panics
///
/// `ticks` must be strictly positive: a non-positive horizon is a logic bug
/// upstream, not a degenerate prediction.
pub fn predicts_range_exit(
    world: &dyn WorldOracle,
    actor: &ActorView,
    target: &TargetSnapshot,
    ticks: f64,
    range: f64,
    walls_range: f64,
) -> bool {
    assert!(ticks > 0.0, "prediction horizon must be positive");

    if target.hurt_time > 7 {
        return false;
    }

    let future_actor = PositionExtrapolation::best_for(actor.position, actor.velocity)
        .position_in_ticks(ticks);
    let future_eyes = future_actor + Vec3::new(0.0, actor.eye_height, 0.0);

    let future_target = PositionExtrapolation::best_for(target.position, target.velocity)
        .position_in_ticks(ticks);
    let future_box = target.hitbox.offset(future_target - target.position);

    !can_see_box(world, future_eyes, &future_box, range, walls_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{Aabb, EntityId};

    struct OpenWorld;

    impl WorldOracle for OpenWorld {
        fn entities_within(&self, _center: Vec3, _radius: f64) -> Vec<TargetSnapshot> {
            Vec::new()
        }

        fn entity(&self, _id: EntityId) -> Option<TargetSnapshot> {
            None
        }

        fn obstruction_distance(&self, _from: Vec3, _to: Vec3) -> Option<f64> {
            None
        }
    }

    fn actor() -> ActorView {
        ActorView {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            eye_height: 1.6,
            on_ground: true,
        }
    }

    fn runner(distance: f64, velocity: Vec3) -> TargetSnapshot {
        let position = Vec3::new(0.0, 0.0, distance);
        TargetSnapshot {
            id: EntityId(1),
            position,
            velocity,
            hitbox: Aabb::from_center(position, 0.6, 1.8),
            alive: true,
            eligible: true,
            health: 20.0,
            hurt_time: 0,
            would_block_hit: false,
        }
    }

    #[test]
    fn stationary_entity_stays_put() {
        let extrapolation = PositionExtrapolation::best_for(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        assert_eq!(
            extrapolation.position_in_ticks(10.0),
            Vec3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn linear_entity_advances_by_velocity() {
        let extrapolation =
            PositionExtrapolation::best_for(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(
            extrapolation.position_in_ticks(4.0),
            Vec3::new(0.0, 0.0, 2.0)
        );
    }

    #[test]
    fn sprinting_target_predicted_to_exit() {
        // Target at 3.5 running away at 0.3/step: gone past 4.2 within 5.
        let target = runner(3.5, Vec3::new(0.0, 0.0, 0.3));
        assert!(predicts_range_exit(
            &OpenWorld,
            &actor(),
            &target,
            5.0,
            4.2,
            3.0
        ));
    }

    #[test]
    fn idle_target_in_range_is_not_predicted_to_exit() {
        let target = runner(3.0, Vec3::ZERO);
        assert!(!predicts_range_exit(
            &OpenWorld,
            &actor(),
            &target,
            5.0,
            4.2,
            3.0
        ));
    }

    #[test]
    fn freshly_hurt_target_never_triggers() {
        let mut target = runner(3.5, Vec3::new(0.0, 0.0, 0.5));
        target.hurt_time = 8;
        assert!(!predicts_range_exit(
            &OpenWorld,
            &actor(),
            &target,
            5.0,
            4.2,
            3.0
        ));
    }

    #[test]
    #[should_panic(expected = "prediction horizon must be positive")]
    fn zero_horizon_is_a_caller_error() {
        let target = runner(3.0, Vec3::ZERO);
        predicts_range_exit(&OpenWorld, &actor(), &target, 0.0, 4.2, 3.0);
    }

    #[test]
    #[should_panic(expected = "prediction horizon must be positive")]
    fn negative_horizon_is_a_caller_error() {
        let target = runner(3.0, Vec3::ZERO);
        predicts_range_exit(&OpenWorld, &actor(), &target, -1.0, 4.2, 3.0);
    }
}
