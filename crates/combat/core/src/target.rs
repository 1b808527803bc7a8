//! Target selection and sticky retention.
//!
//! One tracker instance exists per behavior; nothing here is shared across
//! behaviors. The tracker only holds entity identifiers across steps and
//! resolves them back to fresh [`TargetSnapshot`]s through the world oracle,
//! so a reference that fails eligibility can never leak into a later step.

use crate::common::EntityId;
use crate::env::WorldOracle;
use crate::math::{Aabb, Vec3};
use crate::rng::PcgRng;

/// Transient, per-step view of a candidate entity.
///
/// Valid only for the step it was produced in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSnapshot {
    pub id: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub hitbox: Aabb,
    pub alive: bool,
    /// Within the host's global attackability rules (not friendly, etc.).
    pub eligible: bool,
    pub health: f32,
    /// Steps since the entity was last hit; fresh hits suppress the
    /// exiting-range cooldown override.
    pub hurt_time: u32,
    /// Whether the entity is currently holding a guard that would block a
    /// hit.
    pub would_block_hit: bool,
}

impl TargetSnapshot {
    /// Squared distance from `from` to the nearest point of the hitbox.
    pub fn squared_boxed_distance_to(&self, from: Vec3) -> f64 {
        self.hitbox.squared_distance_to(from)
    }
}

/// Ranking metric for candidate targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetPriority {
    /// Closest first. Canonical.
    #[default]
    Distance,
    /// Lowest remaining health first.
    Health,
}

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackerConfig {
    /// Nominal attack range.
    pub range: f64,
    /// Extra scan distance added to `range`, re-sampled from this interval
    /// after every recorded attack so range checks are never exactly fixed.
    pub scan_extra_range: (f64, f64),
    pub priority: TargetPriority,
    /// Attacking is allowed only while the live enemy count is under this
    /// limit; `None` disables the limit.
    pub max_enemies: Option<usize>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            range: 4.2,
            scan_extra_range: (2.0, 3.0),
            priority: TargetPriority::Distance,
            max_enemies: None,
        }
    }
}

/// Per-behavior target tracker with sticky retention.
#[derive(Debug)]
pub struct TargetTracker {
    config: TrackerConfig,
    rng: PcgRng,
    current: Option<EntityId>,
    sticky: Option<EntityId>,
    sticky_enabled: bool,
    scan_extra: f64,
}

impl TargetTracker {
    pub fn new(config: TrackerConfig, seed: u64) -> Self {
        let mut rng = PcgRng::new(seed);
        let scan_extra = rng.range_f64(config.scan_extra_range.0, config.scan_extra_range.1);
        Self {
            config,
            rng,
            current: None,
            sticky: None,
            sticky_enabled: false,
            scan_extra,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn current(&self) -> Option<EntityId> {
        self.current
    }

    pub fn sticky(&self) -> Option<EntityId> {
        self.sticky
    }

    /// Current scan radius: nominal range plus the randomized extra.
    pub fn scan_range(&self) -> f64 {
        self.config.range + self.scan_extra
    }

    /// Enables or disables sticky mode. Disabling drops any sticky reference
    /// in the same step.
    pub fn set_sticky_enabled(&mut self, enabled: bool) {
        self.sticky_enabled = enabled;
        if !enabled {
            self.sticky = None;
        }
    }

    pub fn sticky_enabled(&self) -> bool {
        self.sticky_enabled
    }

    /// Whether attacking is allowed under the enemy-count limit: the count
    /// must be under the limit, or the limit must be disabled.
    pub fn attack_allowed(&self, live_enemies: usize) -> bool {
        self.config.max_enemies.is_none_or(|limit| live_enemies < limit)
    }

    /// Re-rolls the randomized extra scan range. Called after each recorded
    /// attack.
    pub fn on_attack(&mut self) {
        self.scan_extra = self
            .rng
            .range_f64(self.config.scan_extra_range.0, self.config.scan_extra_range.1);
    }

    /// Clears the current target, sticky reference, and in-flight state.
    /// Must be called on behavior disable and when no eligible candidate
    /// exists.
    pub fn reset(&mut self) {
        self.current = None;
        self.sticky = None;
    }

    /// Selects the best target for this step.
    ///
    /// With sticky mode on and a live sticky target, ranking and feasibility
    /// are short-circuited entirely: the sticky target is returned regardless
    /// of range or visibility degradation until it dies or sticky mode is
    /// turned off. Otherwise candidates within the scan radius are ranked by
    /// the configured metric (in-range candidates ahead of extended-scan
    /// ones) and the first one accepted by `feasible` becomes current.
    pub fn select(
        &mut self,
        world: &dyn WorldOracle,
        origin: Vec3,
        mut feasible: impl FnMut(&TargetSnapshot) -> bool,
    ) -> Option<TargetSnapshot> {
        if self.sticky_enabled {
            if let Some(id) = self.sticky {
                match world.entity(id) {
                    Some(snapshot) if snapshot.alive => {
                        self.current = Some(id);
                        return Some(snapshot);
                    }
                    _ => {
                        // Died or despawned: drop it and fall through to a
                        // fresh selection this same step.
                        self.sticky = None;
                    }
                }
            }
        }

        let scan_range = self.scan_range();
        let squared_scan = scan_range * scan_range;
        let squared_range = self.config.range * self.config.range;

        let mut candidates: Vec<TargetSnapshot> = world
            .entities_within(origin, scan_range)
            .into_iter()
            .filter(|c| c.alive && c.eligible)
            .filter(|c| c.squared_boxed_distance_to(origin) <= squared_scan)
            .collect();

        candidates.sort_by(|a, b| {
            let a_extended = a.squared_boxed_distance_to(origin) > squared_range;
            let b_extended = b.squared_boxed_distance_to(origin) > squared_range;
            a_extended.cmp(&b_extended).then_with(|| match self.config.priority {
                TargetPriority::Distance => a
                    .squared_boxed_distance_to(origin)
                    .total_cmp(&b.squared_boxed_distance_to(origin)),
                TargetPriority::Health => a.health.total_cmp(&b.health),
            })
        });

        let chosen = candidates.into_iter().find(|c| feasible(c));

        match chosen {
            Some(snapshot) => {
                self.current = Some(snapshot.id);
                if self.sticky_enabled {
                    self.sticky = Some(snapshot.id);
                }
                Some(snapshot)
            }
            None => {
                self.current = None;
                None
            }
        }
    }
}
