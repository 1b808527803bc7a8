//! Per-step orchestration of drivers around the rotation arbiter.

use combat_core::{ArbiterConfig, OwnerId, Rotation, RotationArbiter, Tick, WorldOracle};
use tracing::debug;

use crate::drivers::BehaviorDriver;
use crate::env::{ActorView, DebugSink, NetworkEgress, StepContext};

struct DriverSlot {
    enabled: bool,
    driver: Box<dyn BehaviorDriver>,
}

/// Owns the arbiter and the registered drivers, and enforces the step
/// ordering: every enabled driver observes (submitting rotation requests),
/// then arbitration resolves exactly one winner, then every enabled driver
/// acts against the resolved rotations.
pub struct CombatRuntime {
    arbiter: RotationArbiter,
    drivers: Vec<DriverSlot>,
}

impl CombatRuntime {
    pub fn new(initial_rotation: Rotation, config: ArbiterConfig) -> Self {
        Self {
            arbiter: RotationArbiter::new(initial_rotation, config),
            drivers: Vec::new(),
        }
    }

    /// Registers a driver, enabled from the next step on.
    pub fn register(&mut self, driver: Box<dyn BehaviorDriver>) {
        debug!(owner = %driver.owner(), "driver registered");
        self.drivers.push(DriverSlot {
            enabled: true,
            driver,
        });
    }

    /// Enables or disables the driver with the given owner id. Disabling
    /// resets the driver synchronously, which releases any guard it holds
    /// through the egress.
    pub fn set_enabled(&mut self, owner: OwnerId, enabled: bool, egress: &mut dyn NetworkEgress) {
        for slot in &mut self.drivers {
            if slot.driver.owner() != owner || slot.enabled == enabled {
                continue;
            }
            slot.enabled = enabled;
            if !enabled {
                slot.driver.reset(egress);
                debug!(owner = %owner, "driver disabled and reset");
            }
        }
    }

    pub fn is_enabled(&self, owner: OwnerId) -> bool {
        self.drivers
            .iter()
            .any(|slot| slot.enabled && slot.driver.owner() == owner)
    }

    pub fn arbiter(&self) -> &RotationArbiter {
        &self.arbiter
    }

    /// Re-anchors the rotation pair, e.g. after a world or session change.
    pub fn sync_rotation(&mut self, rotation: Rotation) {
        self.arbiter.sync(rotation);
    }

    /// Runs one simulation step.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &mut self,
        world: &dyn WorldOracle,
        egress: &mut dyn NetworkEgress,
        debug_sink: &dyn DebugSink,
        actor: ActorView,
        now: Tick,
        inventory_open: bool,
    ) {
        let Self { arbiter, drivers } = self;
        let mut ctx = StepContext {
            world,
            egress,
            debug: debug_sink,
            actor,
            now,
            inventory_open,
        };

        for slot in drivers.iter_mut().filter(|s| s.enabled) {
            slot.driver.observe(&mut ctx, arbiter);
        }

        arbiter.step(ctx.inventory_open);
        if arbiter.take_authoritative_dirty() {
            ctx.egress.send_rotation(arbiter.authoritative_rotation());
        }

        for slot in drivers.iter_mut().filter(|s| s.enabled) {
            slot.driver.act(&mut ctx, arbiter);
        }
    }
}
