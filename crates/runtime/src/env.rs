//! Boundary contracts with the embedding client.
//!
//! The core never talks to the network or the renderer directly: the host
//! implements [`NetworkEgress`] and (optionally) [`DebugSink`], and passes
//! them into every step. Both calls are fire-and-forget from the core's
//! perspective; only the local accept/reject boolean of an attack is
//! consumed, to decide whether the cooldown advances.

use std::fmt;

use combat_core::{Aabb, EntityId, Rotation, Tick, Vec3, WorldOracle};

/// The controlled avatar as seen this step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorView {
    pub position: Vec3,
    pub velocity: Vec3,
    pub eye_height: f64,
    pub on_ground: bool,
}

impl ActorView {
    pub fn eye_pos(&self) -> Vec3 {
        self.position + Vec3::new(0.0, self.eye_height, 0.0)
    }
}

/// One-way calls into the host's network layer.
pub trait NetworkEgress {
    /// Reports the authoritative rotation to the remote simulation.
    fn send_rotation(&mut self, rotation: Rotation);

    /// Performs an attack on the given entity. Returns whether the call was
    /// accepted locally; a rejection is a soft failure and the caller retries
    /// on the next eligible step.
    fn send_attack(&mut self, target: EntityId) -> bool;

    /// Raises or lowers the defensive guard (the melee driver's waiting
    /// micro-behavior).
    fn set_guard(&mut self, active: bool);
}

/// Geometric debug annotation emitted toward an external visualizer.
#[derive(Clone, Copy, Debug)]
pub enum DebugShape {
    Point { pos: Vec3, size: f64 },
    Box(Aabb),
    Line { from: Vec3, to: Vec3 },
}

/// Optional render/debug layer. All methods default to no-ops so an absent
/// debug layer costs nothing and can never affect control flow.
pub trait DebugSink {
    fn parameter(&self, _name: &str, _value: fmt::Arguments<'_>) {}

    fn shape(&self, _name: &str, _shape: DebugShape) {}
}

/// The always-available sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDebugSink;

impl DebugSink for NoopDebugSink {}

/// Everything a driver may touch during one step.
pub struct StepContext<'a> {
    pub world: &'a dyn WorldOracle,
    pub egress: &'a mut dyn NetworkEgress,
    pub debug: &'a dyn DebugSink,
    pub actor: ActorView,
    pub now: Tick,
    /// Whether the local inventory/container screen is open this step.
    pub inventory_open: bool,
}
