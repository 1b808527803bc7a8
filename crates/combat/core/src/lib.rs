//! Deterministic aim-arbitration and combat-scheduling logic.
//!
//! `combat-core` defines the decision core that sits in front of a fixed-rate
//! simulation: target selection, aim-point computation, visibility checks,
//! rotation arbitration between competing behaviors, and attack cooldown
//! scheduling. All APIs are pure and step-driven; the embedding runtime
//! supplies world data through [`env::WorldOracle`] and performs the actual
//! network calls.
pub mod clicker;
pub mod common;
pub mod env;
pub mod error;
pub mod math;
pub mod rng;
pub mod rotation;
pub mod target;
pub mod visibility;

pub use clicker::{ClickScheduler, ClickerConfig, OverrideFlags};
pub use common::{EntityId, OwnerId, Tick};
pub use env::WorldOracle;
pub use error::ConfigError;
pub use math::{Aabb, Vec3};
pub use rng::PcgRng;
pub use rotation::{
    ArbiterConfig, PointInBox, PointTracker, Priority, Rotation, RotationArbiter,
    RotationRequest, RotationTiming,
};
pub use target::{TargetPriority, TargetSnapshot, TargetTracker, TrackerConfig};
pub use visibility::{RotationPreference, can_see_box, facing_box, raytrace_box};
