//! Error types for configuration validation.
//!
//! Steady-state conditions (no candidate, no visibility solution, cooldown
//! not yet elapsed) are represented as `Option`/`None` and are never errors.
//! Only malformed configuration and broken caller contracts are escalated;
//! the latter fail fast with assertions at the call site.

/// Rejected tunable values.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid cooldown range: {min}..={max} (min must be >= 1 and <= max)")]
    InvalidCooldownRange { min: u32, max: u32 },

    #[error("invalid scan extra range: {lo}..{hi}")]
    InvalidScanExtraRange { lo: f64, hi: f64 },
}
