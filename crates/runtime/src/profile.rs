//! RON-loadable combat profiles.
//!
//! A profile is the host-facing flat tunable surface; it is validated and
//! clamped once on load and then expanded into the per-component config
//! structs. Core code never parses anything.

use combat_core::{
    ArbiterConfig, ClickerConfig, ConfigError, RotationTiming, TargetPriority, TrackerConfig,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::drivers::{GuardConfig, MeleeConfig};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile parse error: {0}")]
    Parse(#[from] ron::de::SpannedError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatProfile {
    pub range: f64,
    /// Clamped to `range` on load.
    pub walls_range: f64,
    pub scan_extra_range: (f64, f64),
    pub priority: TargetPriority,
    pub max_enemies: Option<usize>,
    pub cooldown_range: (u32, u32),
    pub timing: RotationTiming,
    pub turn_speed: f32,
    pub point_margin: f64,
    pub sticky: bool,
    pub consider_inventory: bool,
    pub aim_through_walls: bool,
    pub shield_break: bool,
    pub critical_strike: bool,
    pub predict_exit: bool,
    pub guard: GuardConfig,
}

impl Default for CombatProfile {
    fn default() -> Self {
        let tracker = TrackerConfig::default();
        let melee = MeleeConfig::default();
        let arbiter = ArbiterConfig::default();
        Self {
            range: tracker.range,
            walls_range: melee.walls_range,
            scan_extra_range: tracker.scan_extra_range,
            priority: tracker.priority,
            max_enemies: tracker.max_enemies,
            cooldown_range: melee.clicker.cooldown_range,
            timing: arbiter.timing,
            turn_speed: arbiter.turn_speed,
            point_margin: melee.point_margin,
            sticky: melee.sticky,
            consider_inventory: melee.consider_inventory,
            aim_through_walls: melee.aim_through_walls,
            shield_break: melee.shield_break,
            critical_strike: melee.critical_strike,
            predict_exit: melee.predict_exit,
            guard: melee.guard,
        }
    }
}

impl CombatProfile {
    /// Parses, validates, and clamps a profile from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ProfileError> {
        let profile: CombatProfile = ron::from_str(text)?;
        profile.validated()
    }

    fn validated(mut self) -> Result<Self, ProfileError> {
        ClickerConfig {
            cooldown_range: self.cooldown_range,
        }
        .validate()?;

        let (lo, hi) = self.scan_extra_range;
        if lo < 0.0 || lo > hi {
            return Err(ConfigError::InvalidScanExtraRange { lo, hi }.into());
        }

        if self.walls_range > self.range {
            warn!(
                walls_range = self.walls_range,
                range = self.range,
                "walls_range exceeds range, clamping"
            );
            self.walls_range = self.range;
        }
        Ok(self)
    }

    pub fn melee_config(&self) -> MeleeConfig {
        MeleeConfig {
            tracker: self.tracker_config(),
            clicker: ClickerConfig {
                cooldown_range: self.cooldown_range,
            },
            walls_range: self.walls_range,
            aim_through_walls: self.aim_through_walls,
            point_margin: self.point_margin,
            sticky: self.sticky,
            consider_inventory: self.consider_inventory,
            shield_break: self.shield_break,
            critical_strike: self.critical_strike,
            predict_exit: self.predict_exit,
            guard: self.guard,
        }
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            range: self.range,
            scan_extra_range: self.scan_extra_range,
            priority: self.priority,
            max_enemies: self.max_enemies,
        }
    }

    pub fn arbiter_config(&self) -> ArbiterConfig {
        ArbiterConfig {
            timing: self.timing,
            turn_speed: self.turn_speed,
        }
    }
}
