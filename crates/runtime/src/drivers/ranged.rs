//! Ranged aura: projectile harassment at secondary priority.
//!
//! The ranged driver never fights the melee driver for rotation control; it
//! submits at [`Priority::SecondaryUsage`] and only fires once the
//! authoritative rotation has actually converged onto its ideal aim, so a
//! higher-priority winner silently suppresses it.

use combat_core::{
    ClickScheduler, ClickerConfig, ConfigError, OverrideFlags, OwnerId, Priority, Rotation,
    RotationArbiter, RotationRequest, RotationTiming, TargetSnapshot, TargetTracker,
    TrackerConfig, Vec3, can_see_box,
};
use tracing::debug;

use crate::drivers::BehaviorDriver;
use crate::env::{NetworkEgress, StepContext};
use crate::extrapolation::PositionExtrapolation;

/// Projectile drop compensation strategy.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display, strum::EnumString,
    serde::Serialize, serde::Deserialize,
)]
pub enum GravityMode {
    /// Aim straight at the target.
    None,
    /// Lead the target by its flight-time displacement.
    #[default]
    Linear,
    /// Lead the target and raise the aim by the projectile's drop.
    Ballistic,
}

/// Projectile drop per step squared.
const PROJECTILE_GRAVITY: f64 = 0.05;

#[derive(Clone, Copy, Debug)]
pub struct RangedConfig {
    pub tracker: TrackerConfig,
    pub clicker: ClickerConfig,
    /// Projectile travel distance per step.
    pub projectile_speed: f64,
    pub gravity: GravityMode,
    /// Maximum angular error in degrees between the authoritative rotation
    /// and the ideal aim before a shot may go out.
    pub aim_threshold: f32,
    pub consider_inventory: bool,
}

impl Default for RangedConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig {
                range: 20.0,
                scan_extra_range: (0.0, 1.0),
                ..TrackerConfig::default()
            },
            clicker: ClickerConfig::default(),
            projectile_speed: 3.0,
            gravity: GravityMode::default(),
            aim_threshold: 1.5,
            consider_inventory: true,
        }
    }
}

pub struct RangedAura {
    owner: OwnerId,
    config: RangedConfig,
    tracker: TargetTracker,
    scheduler: ClickScheduler,
    ideal: Option<Rotation>,
}

impl RangedAura {
    pub fn new(owner: OwnerId, config: RangedConfig, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            owner,
            tracker: TargetTracker::new(config.tracker, seed),
            scheduler: ClickScheduler::new(config.clicker, seed.wrapping_add(1))?,
            ideal: None,
            config,
        })
    }

    pub fn with_random_seed(owner: OwnerId, config: RangedConfig) -> Result<Self, ConfigError> {
        Self::new(owner, config, rand::random())
    }

    pub fn config(&self) -> &RangedConfig {
        &self.config
    }

    /// Point to aim at, compensating for flight time under the configured
    /// gravity mode.
    fn aim_point(&self, eyes: Vec3, target: &TargetSnapshot) -> Vec3 {
        let center = target.hitbox.center();
        match self.config.gravity {
            GravityMode::None => center,
            mode => {
                let speed = self.config.projectile_speed.max(f64::EPSILON);
                let flight = eyes.distance_to(center) / speed;
                let lead = PositionExtrapolation::best_for(target.position, target.velocity)
                    .position_in_ticks(flight)
                    - target.position;
                let mut point = center + lead;
                if mode == GravityMode::Ballistic {
                    point.y += 0.5 * PROJECTILE_GRAVITY * flight * flight;
                }
                point
            }
        }
    }
}

impl BehaviorDriver for RangedAura {
    fn owner(&self) -> OwnerId {
        self.owner
    }

    fn observe(&mut self, ctx: &mut StepContext<'_>, arbiter: &mut RotationArbiter) {
        let eyes = ctx.actor.eye_pos();
        let range = self.config.tracker.range;
        self.ideal = None;

        let world = ctx.world;
        let selected = self
            .tracker
            .select(world, eyes, |candidate| {
                // Projectiles get no wall tolerance.
                can_see_box(world, eyes, &candidate.hitbox, range, 0.0)
            });

        let Some(target) = selected else {
            return;
        };

        let ideal = Rotation::looking_at(self.aim_point(eyes, &target), eyes);
        arbiter.submit(RotationRequest {
            rotation: ideal,
            priority: Priority::SecondaryUsage,
            owner: self.owner,
            consider_inventory: self.config.consider_inventory,
        });
        self.ideal = Some(ideal);
    }

    fn act(&mut self, ctx: &mut StepContext<'_>, arbiter: &mut RotationArbiter) {
        let (Some(id), Some(ideal)) = (self.tracker.current(), self.ideal) else {
            return;
        };

        // In Snap mode the authoritative rotation holds its last committed
        // value between shots, so the convergence check runs against the
        // rotation that would be committed with the shot instead.
        let won = arbiter.active().is_some_and(|r| r.owner == self.owner);
        let aim = match arbiter.config().timing {
            RotationTiming::OnTick => arbiter.authoritative_rotation(),
            RotationTiming::Snap => {
                if !won {
                    return;
                }
                ideal
            }
        };
        let error = aim.angle_to(ideal);
        ctx.debug
            .parameter("ranged.aim_error", format_args!("{error:.2}"));
        if error > self.config.aim_threshold {
            // Still turning, or a higher-priority behavior owns the rotation.
            return;
        }

        if !self.scheduler.is_action_due(ctx.now, OverrideFlags::empty()) {
            return;
        }

        if won {
            if let Some(committed) = arbiter.commit_snap() {
                ctx.egress.send_rotation(committed);
                arbiter.take_authoritative_dirty();
            }
        }

        if ctx.egress.send_attack(id) {
            self.scheduler.record_action(ctx.now);
            self.tracker.on_attack();
            debug!(target = %id, "projectile fired");
        } else {
            debug!(target = %id, "shot rejected locally, retrying next step");
        }
    }

    fn reset(&mut self, _egress: &mut dyn NetworkEgress) {
        self.tracker.reset();
        self.ideal = None;
    }
}
