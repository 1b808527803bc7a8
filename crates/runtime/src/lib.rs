//! Step-driven combat runtime: behavior drivers over the decision core.
//!
//! The embedding client calls [`CombatRuntime::step`] once per fixed-rate
//! simulation step, supplying read-only world access and the network egress.
//! Drivers (melee aura, ranged aura) query their target trackers, submit
//! rotation requests, and dispatch attacks through the scheduler; the runtime
//! enforces the step ordering: all requests are collected before arbitration
//! resolves the winner, and only then do drivers act.
pub mod drivers;
pub mod env;
pub mod extrapolation;
pub mod profile;
pub mod runtime;
pub mod sequence;

pub use drivers::{BehaviorDriver, GuardConfig, MeleeAura, MeleeConfig, RangedAura, RangedConfig};
pub use drivers::ranged::GravityMode;
pub use env::{ActorView, DebugShape, DebugSink, NetworkEgress, NoopDebugSink, StepContext};
pub use extrapolation::{PositionExtrapolation, predicts_range_exit};
pub use profile::{CombatProfile, ProfileError};
pub use runtime::CombatRuntime;
pub use sequence::Sequence;
