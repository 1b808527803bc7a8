//! Behavior drivers stepped by the combat runtime.
//!
//! A driver owns its own target tracker, point tracker, and attack scheduler;
//! the only shared mutable state between drivers is the rotation arbiter, and
//! drivers reach it exclusively through [`RotationArbiter::submit`].

pub mod melee;
pub mod ranged;

pub use melee::{GuardConfig, MeleeAura, MeleeConfig};
pub use ranged::{RangedAura, RangedConfig};

use combat_core::{OwnerId, RotationArbiter};

use crate::env::{NetworkEgress, StepContext};

/// One steppable combat behavior.
///
/// The runtime calls [`BehaviorDriver::observe`] on every enabled driver,
/// then resolves arbitration, then calls [`BehaviorDriver::act`] on every
/// enabled driver. Observe submits rotation requests and must not touch the
/// egress; act reads the resolved rotations and may dispatch actions.
pub trait BehaviorDriver {
    /// Stable identity used for rotation-request ownership.
    fn owner(&self) -> OwnerId;

    fn observe(&mut self, ctx: &mut StepContext<'_>, arbiter: &mut RotationArbiter);

    fn act(&mut self, ctx: &mut StepContext<'_>, arbiter: &mut RotationArbiter);

    /// Synchronous teardown on disable: forget targets, cancel waits, release
    /// any guard held through the egress.
    fn reset(&mut self, egress: &mut dyn NetworkEgress);
}
