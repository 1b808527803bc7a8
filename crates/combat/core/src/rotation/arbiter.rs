//! Priority arbitration over the shared facing direction.
//!
//! Many behaviors may want control of the avatar's facing in the same step.
//! The arbiter collects every request first, resolves exactly one winner, and
//! is the only component that ever writes the visual/authoritative rotation
//! pair. Requests not resubmitted next step simply expire; the arbiter keeps
//! no memory of past losers.

use super::Rotation;
use crate::common::OwnerId;

/// Importance of a rotation request. Numerically higher always wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Priority {
    /// Background movement and navigation aids.
    Navigation,
    /// Supporting behaviors (e.g. ranged harassment).
    SecondaryUsage,
    /// The behavior the user is directly relying on.
    PrimaryUsage,
}

/// When the authoritative rotation is allowed to change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RotationTiming {
    /// Update every step. Fastest, but the full aim path is visible on the
    /// wire.
    #[default]
    OnTick,
    /// Update only at the instant an attack is dispatched, hiding
    /// intermediate aim from the network entirely.
    Snap,
}

/// One behavior's bid for the facing direction this step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationRequest {
    pub rotation: Rotation,
    pub priority: Priority,
    pub owner: OwnerId,
    /// Hold rotation changes while the local inventory screen is open, so the
    /// avatar does not visibly aim while the player is "in a menu".
    pub consider_inventory: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct ArbiterConfig {
    pub timing: RotationTiming,
    /// Maximum visual turn per step in degrees. Zero freezes the visual
    /// rotation while the authoritative one keeps updating.
    pub turn_speed: f32,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            timing: RotationTiming::OnTick,
            turn_speed: Self::DEFAULT_TURN_SPEED,
        }
    }
}

impl ArbiterConfig {
    pub const DEFAULT_TURN_SPEED: f32 = 180.0;
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    request: RotationRequest,
    seq: u64,
}

/// Owner of the visual/authoritative rotation pair.
///
/// Per step: behaviors call [`RotationArbiter::submit`] (same owner
/// overwrites its earlier bid), then the step scheduler calls
/// [`RotationArbiter::step`] exactly once after all submissions, which
/// resolves the winner and advances both rotations.
#[derive(Debug)]
pub struct RotationArbiter {
    config: ArbiterConfig,
    pending: Vec<Pending>,
    seq: u64,
    active: Option<RotationRequest>,
    visual: Rotation,
    authoritative: Rotation,
    authoritative_dirty: bool,
}

impl RotationArbiter {
    pub fn new(initial: Rotation, config: ArbiterConfig) -> Self {
        let initial = initial.normalize();
        Self {
            config,
            pending: Vec::new(),
            seq: 0,
            active: None,
            visual: initial,
            authoritative: initial,
            authoritative_dirty: false,
        }
    }

    pub fn config(&self) -> ArbiterConfig {
        self.config
    }

    pub fn set_config(&mut self, config: ArbiterConfig) {
        self.config = config;
    }

    /// Submits a request for this step. A later submission by the same owner
    /// replaces the earlier one and counts as the most recent for the
    /// last-write-wins tie-break.
    pub fn submit(&mut self, request: RotationRequest) {
        self.pending.retain(|p| p.request.owner != request.owner);
        self.seq += 1;
        self.pending.push(Pending {
            request: RotationRequest {
                rotation: request.rotation.normalize(),
                ..request
            },
            seq: self.seq,
        });
    }

    /// Resolves this step's winner and advances both rotations.
    ///
    /// Selection is deterministic: strictly greatest priority wins; among
    /// equal priorities the most recently submitted request wins. With no
    /// submissions both rotations hold their last value — the arbiter never
    /// invents a rotation.
    pub fn step(&mut self, inventory_open: bool) -> Option<RotationRequest> {
        self.active = self
            .pending
            .iter()
            .max_by_key(|p| (p.request.priority, p.seq))
            .map(|p| p.request);
        self.pending.clear();

        let winner = self.active?;
        if winner.consider_inventory && inventory_open {
            // Hold both rotations while the inventory is open; the winner
            // stays selected so the behavior keeps its claim.
            return self.active;
        }

        self.visual = self.visual.step_towards(winner.rotation, self.config.turn_speed);
        if self.config.timing == RotationTiming::OnTick {
            self.authoritative = winner.rotation;
            self.authoritative_dirty = true;
        }

        self.active
    }

    /// In [`RotationTiming::Snap`] mode, commits the winning rotation as
    /// authoritative at the instant of action. Returns the committed value,
    /// or `None` when there is nothing to commit.
    pub fn commit_snap(&mut self) -> Option<Rotation> {
        if self.config.timing != RotationTiming::Snap {
            return None;
        }
        let winner = self.active?;
        self.authoritative = winner.rotation;
        self.authoritative_dirty = true;
        Some(self.authoritative)
    }

    /// The winner resolved by the last [`RotationArbiter::step`] call.
    pub fn active(&self) -> Option<RotationRequest> {
        self.active
    }

    pub fn visual_rotation(&self) -> Rotation {
        self.visual
    }

    pub fn authoritative_rotation(&self) -> Rotation {
        self.authoritative
    }

    /// True once per authoritative change; clearing acknowledges the value
    /// has been reported to the network egress.
    pub fn take_authoritative_dirty(&mut self) -> bool {
        std::mem::take(&mut self.authoritative_dirty)
    }

    /// Re-anchors both rotations, e.g. on world or session change.
    pub fn sync(&mut self, rotation: Rotation) {
        let rotation = rotation.normalize();
        self.visual = rotation;
        self.authoritative = rotation;
        self.active = None;
        self.pending.clear();
        self.authoritative_dirty = false;
    }
}
