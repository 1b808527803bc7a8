//! Melee aura: close-range target acquisition, aim, and attack dispatch.

use combat_core::{
    ArbiterConfig, ClickScheduler, ClickerConfig, ConfigError, OverrideFlags, OwnerId,
    PointTracker, Priority,
    Rotation, RotationArbiter, RotationPreference, RotationRequest, RotationTiming,
    TargetSnapshot, TargetTracker, Tick, TrackerConfig, Vec3, WorldOracle, facing_box,
    raytrace_box,
};
use tracing::debug;

use crate::drivers::BehaviorDriver;
use crate::env::{DebugShape, NetworkEgress, StepContext};
use crate::extrapolation::predicts_range_exit;
use crate::sequence::Sequence;

/// Defensive guard raised while the current target cannot be reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GuardConfig {
    pub enabled: bool,
    /// Steps to stay passive after lowering the guard before the next attack
    /// may go out.
    pub tick_off: u32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tick_off: 1,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MeleeConfig {
    pub tracker: TrackerConfig,
    pub clicker: ClickerConfig,
    /// Distance at which an obstructed line is still accepted.
    pub walls_range: f64,
    /// Fall back to treating obstructions within full range as acceptable
    /// when no clean rotation exists.
    pub aim_through_walls: bool,
    /// Hitbox expansion applied before aim-point selection.
    pub point_margin: f64,
    /// Lock onto the first target and keep it until it dies.
    pub sticky: bool,
    /// Hold rotation changes while the inventory screen is open.
    pub consider_inventory: bool,
    pub shield_break: bool,
    pub critical_strike: bool,
    pub predict_exit: bool,
    pub guard: GuardConfig,
}

impl Default for MeleeConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            clicker: ClickerConfig::default(),
            walls_range: 3.0,
            aim_through_walls: false,
            point_margin: PointTracker::DEFAULT_MARGIN,
            sticky: false,
            consider_inventory: true,
            shield_break: true,
            critical_strike: false,
            predict_exit: true,
            guard: GuardConfig::default(),
        }
    }
}

/// The primary-usage combat driver.
///
/// Observe phase: resolve the best target, pick an aim point on its hitbox,
/// search a viable rotation, and submit it at [`Priority::PrimaryUsage`].
/// Act phase: verify the resolved rotation actually faces the target, manage
/// the guard micro-behavior, and dispatch the attack when the scheduler
/// allows it. `record_action` runs only when the egress accepts the attack,
/// so a rejected dispatch retries on the next eligible step with the
/// schedule untouched.
pub struct MeleeAura {
    owner: OwnerId,
    config: MeleeConfig,
    tracker: TargetTracker,
    points: PointTracker,
    scheduler: ClickScheduler,
    sequence: Sequence,
    guard_active: bool,
    planned: Option<Rotation>,
}

impl MeleeAura {
    pub fn new(owner: OwnerId, config: MeleeConfig, seed: u64) -> Result<Self, ConfigError> {
        let mut tracker = TargetTracker::new(config.tracker, seed);
        tracker.set_sticky_enabled(config.sticky);
        Ok(Self {
            owner,
            tracker,
            points: PointTracker::new(config.point_margin),
            scheduler: ClickScheduler::new(config.clicker, seed.wrapping_add(1))?,
            sequence: Sequence::new(),
            guard_active: false,
            planned: None,
            config,
        })
    }

    /// Convenience constructor for hosts that do not replay sessions.
    pub fn with_random_seed(owner: OwnerId, config: MeleeConfig) -> Result<Self, ConfigError> {
        Self::new(owner, config, rand::random())
    }

    pub fn config(&self) -> &MeleeConfig {
        &self.config
    }

    /// Toggles sticky target retention. Turning it off drops any lock in the
    /// same step.
    pub fn set_sticky(&mut self, sticky: bool) {
        self.config.sticky = sticky;
        self.tracker.set_sticky_enabled(sticky);
    }

    fn engage_guard(&mut self, egress: &mut dyn NetworkEgress) {
        if self.config.guard.enabled && !self.guard_active {
            egress.set_guard(true);
            self.guard_active = true;
            debug!("guard raised");
        }
    }

    fn release_guard(&mut self, egress: &mut dyn NetworkEgress) {
        if self.guard_active {
            egress.set_guard(false);
            self.guard_active = false;
            debug!("guard lowered");
        }
    }

    fn override_flags(
        &self,
        ctx: &StepContext<'_>,
        target: &TargetSnapshot,
        range: f64,
        walls_range: f64,
    ) -> OverrideFlags {
        let mut flags = OverrideFlags::empty();
        if self.config.shield_break && target.would_block_hit {
            flags |= OverrideFlags::SHIELD_BREAK;
        }
        if self.config.critical_strike && ctx.actor.velocity.y < 0.0 && !ctx.actor.on_ground {
            flags |= OverrideFlags::CRITICAL_STRIKE;
        }
        if self.config.predict_exit {
            let horizon = 1.0 + f64::from(self.scheduler.ticks_until_ready(ctx.now));
            if predicts_range_exit(ctx.world, &ctx.actor, target, horizon, range, walls_range) {
                flags |= OverrideFlags::EXITING_RANGE;
            }
        }
        flags
    }
}

impl BehaviorDriver for MeleeAura {
    fn owner(&self) -> OwnerId {
        self.owner
    }

    fn observe(&mut self, ctx: &mut StepContext<'_>, arbiter: &mut RotationArbiter) {
        let eyes = ctx.actor.eye_pos();
        let arbiter_config = arbiter.config();
        let visual = arbiter.visual_rotation();
        let owner = self.owner;
        let consider_inventory = self.config.consider_inventory;
        self.planned = None;

        let (selected, plan) = {
            let MeleeAura {
                config,
                tracker,
                points,
                scheduler,
                ..
            } = &mut *self;
            let world = ctx.world;
            let now = ctx.now;

            let mut plan: Option<Rotation> = None;
            let mut evaluated = false;
            let selected = tracker.select(world, eyes, |candidate| {
                evaluated = true;
                match plan_aim(
                    config,
                    points,
                    scheduler,
                    world,
                    eyes,
                    now,
                    visual,
                    arbiter_config,
                    candidate,
                ) {
                    Some(aim) => {
                        plan = aim;
                        true
                    }
                    None => {
                        plan = None;
                        false
                    }
                }
            });

            match selected {
                Some(target) => {
                    if !evaluated {
                        // Sticky short-circuit skipped the feasibility
                        // closure; plan for the retained target explicitly.
                        // An infeasible plan is fine, the lock holds anyway.
                        plan = plan_aim(
                            config,
                            points,
                            scheduler,
                            world,
                            eyes,
                            now,
                            visual,
                            arbiter_config,
                            &target,
                        )
                        .flatten();
                    }
                    (Some(target), plan)
                }
                None => {
                    points.reset();
                    (None, None)
                }
            }
        };

        let Some(target) = selected else {
            return;
        };

        ctx.debug.shape("melee.target", DebugShape::Box(target.hitbox));
        if let Some(point) = self.points.last_point() {
            ctx.debug
                .shape("melee.aim_point", DebugShape::Point { pos: point, size: 0.05 });
        }

        if let Some(rotation) = plan {
            arbiter.submit(RotationRequest {
                rotation,
                priority: Priority::PrimaryUsage,
                owner,
                consider_inventory,
            });
            self.planned = Some(rotation);
        }
    }

    fn act(&mut self, ctx: &mut StepContext<'_>, arbiter: &mut RotationArbiter) {
        let eyes = ctx.actor.eye_pos();
        let Some(target) = self.tracker.current().and_then(|id| ctx.world.entity(id)) else {
            // No target this step; stay guarded only while something hostile
            // remains inside scan reach.
            let threat = self.config.guard.enabled
                && ctx
                    .world
                    .entities_within(eyes, self.tracker.scan_range())
                    .iter()
                    .any(|e| e.alive && e.eligible);
            if threat {
                self.engage_guard(ctx.egress);
            } else {
                self.release_guard(ctx.egress);
            }
            return;
        };

        let range = self.tracker.config().range;
        let walls_range = self.config.walls_range;
        let timing = arbiter.config().timing;

        // In Snap mode the authoritative rotation lags behind the plan until
        // commit; the facing check must use the rotation that would actually
        // be committed with the attack.
        let rotation = match timing {
            RotationTiming::OnTick => arbiter.authoritative_rotation(),
            RotationTiming::Snap => self.planned.unwrap_or_else(|| arbiter.authoritative_rotation()),
        };

        let mut facing = facing_box(ctx.world, eyes, rotation, &target.hitbox, range, walls_range);
        if !facing && self.config.aim_through_walls {
            facing = facing_box(ctx.world, eyes, rotation, &target.hitbox, range, range);
        }

        if !facing {
            // Turning toward or occluded: the target counts as unreachable.
            self.engage_guard(ctx.egress);
            return;
        }

        if self.guard_active {
            self.release_guard(ctx.egress);
            if self.config.guard.tick_off > 0 {
                self.sequence.wait_ticks(self.config.guard.tick_off);
                return;
            }
        }

        if !self.sequence.tick() {
            return;
        }

        let live_enemies = ctx
            .world
            .entities_within(eyes, self.tracker.scan_range())
            .iter()
            .filter(|e| e.alive && e.eligible)
            .count();
        if !self.tracker.attack_allowed(live_enemies) {
            debug!(live_enemies, "attack withheld by enemy-count limit");
            return;
        }

        let overrides = self.override_flags(ctx, &target, range, walls_range);
        ctx.debug.parameter(
            "melee.cooldown",
            format_args!("{}", self.scheduler.ticks_until_ready(ctx.now)),
        );
        if !self.scheduler.is_action_due(ctx.now, overrides) {
            return;
        }

        if arbiter.active().is_some_and(|r| r.owner == self.owner) {
            if let Some(committed) = arbiter.commit_snap() {
                ctx.egress.send_rotation(committed);
                arbiter.take_authoritative_dirty();
            }
        }

        if ctx.egress.send_attack(target.id) {
            self.scheduler.record_action(ctx.now);
            self.tracker.on_attack();
            debug!(target = %target.id, overrides = ?overrides, "attack dispatched");
        } else {
            debug!(target = %target.id, "attack rejected locally, retrying next step");
        }
    }

    fn reset(&mut self, egress: &mut dyn NetworkEgress) {
        self.tracker.reset();
        self.points.reset();
        self.sequence.cancel();
        self.planned = None;
        self.release_guard(egress);
    }
}

/// Plans the rotation for one candidate.
///
/// `None` means the candidate is infeasible (no viable rotation under either
/// distance mode). `Some(None)` means feasible but the aim is deliberately
/// withheld this step: in Snap timing the aim path is hidden until the
/// scheduler will allow the attack within the steps the turn itself needs.
/// `Some(Some(_))` is a rotation ready to submit.
#[allow(clippy::too_many_arguments)]
fn plan_aim(
    config: &MeleeConfig,
    points: &mut PointTracker,
    scheduler: &ClickScheduler,
    world: &dyn WorldOracle,
    eyes: Vec3,
    now: Tick,
    visual: Rotation,
    arbiter_config: ArbiterConfig,
    candidate: &TargetSnapshot,
) -> Option<Option<Rotation>> {
    // Lead a moving target by one step; the facing check at dispatch still
    // runs against the real hitbox.
    let hitbox = candidate.hitbox.offset(candidate.velocity);
    let point = points.find_point(eyes, hitbox);
    let preference = RotationPreference::LeastDifference(visual);
    let range = config.tracker.range;

    let mut rotation = raytrace_box(
        world,
        eyes,
        &point.hitbox,
        range,
        config.walls_range,
        &preference,
    );
    if rotation.is_none() && config.aim_through_walls {
        rotation = raytrace_box(world, eyes, &point.hitbox, range, range, &preference);
    }
    let rotation = rotation?;

    if arbiter_config.timing == RotationTiming::Snap {
        // Start aiming only once the attack will come due within the steps
        // the turn needs; until then the aim stays hidden.
        let turn_ticks = visual.steps_to(rotation, arbiter_config.turn_speed).max(1);
        if !scheduler.will_fire_within(now, turn_ticks) {
            return Some(None);
        }
    }
    Some(Some(rotation))
}
