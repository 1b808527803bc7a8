//! Attack scheduling under randomized cooldowns and override conditions.

use crate::common::Tick;
use crate::error::ConfigError;
use crate::rng::PcgRng;

bitflags::bitflags! {
    /// Conditions that permit bypassing the numeric cooldown.
    ///
    /// Each flag alone is sufficient; they are evaluated by the driver (which
    /// has world access) and passed in per query.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct OverrideFlags: u8 {
        /// The target's guard is about to break; hit now.
        const SHIELD_BREAK = 1 << 0;
        /// A special/critical strike is imminent.
        const CRITICAL_STRIKE = 1 << 1;
        /// The target is predicted to leave valid range before the cooldown
        /// elapses.
        const EXITING_RANGE = 1 << 2;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClickerConfig {
    /// Inclusive tick range the cooldown is sampled from after each action.
    pub cooldown_range: (u32, u32),
}

impl Default for ClickerConfig {
    fn default() -> Self {
        Self {
            cooldown_range: (Self::DEFAULT_COOLDOWN_MIN, Self::DEFAULT_COOLDOWN_MAX),
        }
    }
}

impl ClickerConfig {
    // 20 steps/second: 10..=12 ticks roughly matches a measured human
    // click cadence.
    pub const DEFAULT_COOLDOWN_MIN: u32 = 10;
    pub const DEFAULT_COOLDOWN_MAX: u32 = 12;

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = self.cooldown_range;
        if min == 0 || min > max {
            return Err(ConfigError::InvalidCooldownRange { min, max });
        }
        Ok(())
    }
}

/// Decides, per step, whether an attack may be issued.
///
/// The cooldown is re-sampled uniformly from the configured range on every
/// [`ClickScheduler::record_action`] so the action cadence is never perfectly
/// periodic. The counter is unsigned and cannot go negative. An
/// override-forced early action is recorded exactly like a regular one — no
/// double counting, the next cooldown simply starts from the early action.
#[derive(Debug)]
pub struct ClickScheduler {
    config: ClickerConfig,
    rng: PcgRng,
    cooldown: u32,
    last_action: Option<Tick>,
}

impl ClickScheduler {
    pub fn new(config: ClickerConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = PcgRng::new(seed);
        let cooldown = rng.range_u32(config.cooldown_range.0, config.cooldown_range.1);
        Ok(Self {
            config,
            rng,
            cooldown,
            last_action: None,
        })
    }

    /// Ticks remaining until the cooldown elapses, zero when ready.
    pub fn ticks_until_ready(&self, now: Tick) -> u32 {
        match self.last_action {
            None => 0,
            Some(last) => {
                let elapsed = now.since(last);
                u64::from(self.cooldown).saturating_sub(elapsed) as u32
            }
        }
    }

    /// True exactly when the cooldown has elapsed or an override reason
    /// fires.
    pub fn is_action_due(&self, now: Tick, overrides: OverrideFlags) -> bool {
        self.ticks_until_ready(now) == 0 || !overrides.is_empty()
    }

    /// Predictive check: will the cooldown have elapsed within `ticks` more
    /// steps? Other components use this to decide whether it is worth
    /// starting to aim now for an action that is still a few steps away.
    pub fn will_fire_within(&self, now: Tick, ticks: u32) -> bool {
        self.ticks_until_ready(now) <= ticks
    }

    /// Records a successfully dispatched action and samples the next
    /// cooldown. Not called when the egress rejects the attack, so a failed
    /// attack never desynchronizes the schedule.
    pub fn record_action(&mut self, now: Tick) {
        self.last_action = Some(now);
        self.cooldown = self
            .rng
            .range_u32(self.config.cooldown_range.0, self.config.cooldown_range.1);
    }

    pub fn last_action(&self) -> Option<Tick> {
        self.last_action
    }

    /// Forgets schedule history, e.g. on session change.
    pub fn reset(&mut self) {
        self.last_action = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(seed: u64) -> ClickScheduler {
        ClickScheduler::new(
            ClickerConfig {
                cooldown_range: (4, 8),
            },
            seed,
        )
        .unwrap()
    }

    #[test]
    fn due_immediately_before_first_action() {
        let scheduler = scheduler(1);
        assert!(scheduler.is_action_due(Tick(0), OverrideFlags::empty()));
    }

    #[test]
    fn cooldown_blocks_until_minimum_and_yields_by_maximum() {
        // Scenario: range 4..=8, action at step 100. For every seed the
        // scheduler must be cold through step 103 and hot by step 108.
        for seed in 0..64 {
            let mut scheduler = scheduler(seed);
            scheduler.record_action(Tick(100));

            for step in 101..=103 {
                assert!(
                    !scheduler.is_action_due(Tick(step), OverrideFlags::empty()),
                    "seed {seed} fired early at step {step}"
                );
            }
            assert!(
                scheduler.is_action_due(Tick(108), OverrideFlags::empty()),
                "seed {seed} still cold at step 108"
            );
        }
    }

    #[test]
    fn override_bypasses_cooldown() {
        let mut scheduler = scheduler(1);
        scheduler.record_action(Tick(100));
        assert!(!scheduler.is_action_due(Tick(101), OverrideFlags::empty()));
        assert!(scheduler.is_action_due(Tick(101), OverrideFlags::SHIELD_BREAK));
        assert!(scheduler.is_action_due(Tick(101), OverrideFlags::EXITING_RANGE));
    }

    #[test]
    fn override_action_records_like_a_regular_one() {
        let mut scheduler = scheduler(1);
        scheduler.record_action(Tick(100));

        // Early action under an override: recorded normally, cooldown
        // restarts from the early step.
        assert!(scheduler.is_action_due(Tick(101), OverrideFlags::CRITICAL_STRIKE));
        scheduler.record_action(Tick(101));
        assert_eq!(scheduler.last_action(), Some(Tick(101)));
        assert!(!scheduler.is_action_due(Tick(102), OverrideFlags::empty()));
    }

    #[test]
    fn will_fire_within_tracks_remaining_cooldown() {
        let mut scheduler = scheduler(1);
        scheduler.record_action(Tick(100));
        let remaining = scheduler.ticks_until_ready(Tick(100));
        assert!((4..=8).contains(&remaining));

        assert!(!scheduler.will_fire_within(Tick(100), remaining - 1));
        assert!(scheduler.will_fire_within(Tick(100), remaining));
        assert!(scheduler.will_fire_within(Tick(100), remaining + 3));
    }

    #[test]
    fn skipped_attack_leaves_schedule_untouched() {
        let mut scheduler = scheduler(1);
        scheduler.record_action(Tick(100));
        let before = scheduler.ticks_until_ready(Tick(102));
        // Egress rejected the attack: record_action is not called, nothing
        // moves.
        assert_eq!(scheduler.ticks_until_ready(Tick(102)), before);
        assert_eq!(scheduler.last_action(), Some(Tick(100)));
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(ClickScheduler::new(
            ClickerConfig {
                cooldown_range: (0, 5)
            },
            1
        )
        .is_err());
        assert!(ClickScheduler::new(
            ClickerConfig {
                cooldown_range: (6, 5)
            },
            1
        )
        .is_err());
    }

    #[test]
    fn reset_makes_scheduler_immediately_due() {
        let mut scheduler = scheduler(1);
        scheduler.record_action(Tick(100));
        scheduler.reset();
        assert!(scheduler.is_action_due(Tick(100), OverrideFlags::empty()));
    }
}
