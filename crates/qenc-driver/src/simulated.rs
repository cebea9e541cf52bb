//! In-memory free-running counter.
//!
//! Behaves like a timer in encoder mode attached to a shaft turning at a
//! constant speed: the count wraps from `modulus - 1` to 0 going forward and
//! from 0 to `modulus - 1` going backward.

use crate::CounterSource;
use qenc_common::error::{check_modulus, check_raw, EncResult, EncoderError};
use std::time::Duration;

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Simulated encoder-mode counter.
#[derive(Debug, Clone)]
pub struct SimulatedCounter {
    modulus: u64,
    counter: u64,
    /// Shaft speed in ticks per second.
    speed: i64,
    /// Sub-tick travel carried between `run_for` calls, in tick-nanoseconds.
    carry: i128,
}

impl SimulatedCounter {
    /// Create a stopped counter at zero.
    ///
    /// # Errors
    ///
    /// Returns `InvalidModulus` if `modulus` is not within `[2, 2^32]`.
    pub fn new(modulus: u64) -> EncResult<Self> {
        Ok(Self {
            modulus: check_modulus(modulus)?,
            counter: 0,
            speed: 0,
            carry: 0,
        })
    }

    /// Set the shaft speed (builder style).
    #[must_use]
    pub fn with_speed(mut self, ticks_per_second: i64) -> Self {
        self.speed = ticks_per_second;
        self
    }

    /// Get the shaft speed in ticks per second.
    pub fn speed(&self) -> i64 {
        self.speed
    }

    /// Change the shaft speed.
    pub fn set_speed(&mut self, ticks_per_second: i64) {
        self.speed = ticks_per_second;
    }

    /// Preload the counter register.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionViolation` if `raw` is not below the modulus.
    pub fn set_counter(&mut self, raw: u32) -> EncResult<()> {
        check_raw(u64::from(raw), self.modulus)?;
        self.counter = u64::from(raw);
        Ok(())
    }

    /// Move the shaft by `ticks` (negative counts down).
    pub fn advance(&mut self, ticks: i64) {
        self.advance_wide(i128::from(ticks));
    }

    /// Let the shaft turn at its current speed for `dt`.
    ///
    /// Fractions of a tick are carried into the next call, so many short steps
    /// land on the same count as one long one.
    pub fn run_for(&mut self, dt: Duration) {
        let nanos = i128::try_from(dt.as_nanos()).unwrap_or(i128::MAX);
        let travel = i128::from(self.speed)
            .saturating_mul(nanos)
            .saturating_add(self.carry);
        self.carry = travel.rem_euclid(NANOS_PER_SEC);
        self.advance_wide(travel.div_euclid(NANOS_PER_SEC));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn advance_wide(&mut self, ticks: i128) {
        let modulus = i128::from(self.modulus);
        // rem_euclid keeps the result in [0, modulus).
        self.counter = (i128::from(self.counter) + ticks).rem_euclid(modulus) as u64;
    }
}

impl CounterSource for SimulatedCounter {
    fn modulus(&self) -> u64 {
        self.modulus
    }

    fn read_counter(&self) -> EncResult<u32> {
        u32::try_from(self.counter)
            .map_err(|_| EncoderError::Source(format!("counter {} exceeds 32 bits", self.counter)))
    }
}
