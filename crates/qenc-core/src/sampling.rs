//! Sample-rate bounds for half-period wrap disambiguation.
//!
//! The tracker can only tell a forward step from a backward wrap when the
//! shaft moves less than half a counter period between reads. Past that point
//! the correction silently picks the wrong direction, so the bound has to be
//! met by construction. Counters move in whole ticks, so the bound applies to
//! the largest whole-tick step a sample can see, not the average step.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Largest per-sample displacement that is always reconstructed correctly.
///
/// A step of exactly half an even modulus is reported in the direction of the
/// raw delta's sign, so either true direction can be misread. Only steps
/// strictly below `modulus / 2` are safe in both directions.
#[must_use]
pub fn max_unambiguous_step(modulus: u64) -> u64 {
    modulus.saturating_sub(1) / 2
}

/// Whether a shaft turning at `ticks_per_second` stays within the safe step
/// when sampled every `period`.
///
/// A fractional average step of `x` ticks shows up as whole steps of up to
/// `ceil(x)`, so the check is `ceil(|v| * T) <= max_unambiguous_step(modulus)`.
#[must_use]
pub fn is_aliasing_safe(modulus: u64, ticks_per_second: i64, period: Duration) -> bool {
    let travel = u128::from(ticks_per_second.unsigned_abs()) * period.as_nanos();
    travel <= u128::from(max_unambiguous_step(modulus)) * NANOS_PER_SEC
}

/// Lowest sample rate at which every whole-tick step stays within
/// [`max_unambiguous_step`] for a given peak speed.
///
/// Infinite when the modulus leaves no safe step and the shaft moves.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn min_sample_rate_hz(modulus: u64, ticks_per_second: i64) -> f64 {
    let speed = ticks_per_second.unsigned_abs();
    if speed == 0 {
        return 0.0;
    }
    speed as f64 / max_unambiguous_step(modulus) as f64
}
