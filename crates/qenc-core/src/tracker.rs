//! Wrap-correcting position tracker.
//!
//! A free-running counter only shows position modulo its period. Given two
//! consecutive snapshots, the raw difference is ambiguous by whole multiples of
//! the period; [`PositionTracker`] resolves it by picking the representative
//! with the smallest magnitude. That choice is correct as long as the shaft
//! moves less than half a counter period between samples.

use qenc_common::config::DEFAULT_MODULUS;
use qenc_common::error::{check_modulus, check_raw, EncResult};
use serde::{Deserialize, Serialize};

/// Position tracker for one encoder channel.
///
/// Consumes raw counter readings in `[0, modulus)` and accumulates the
/// wrap-corrected difference between consecutive readings into an unbounded
/// `i64` position. Zeroing moves the origin only; the previous raw reading is
/// kept so the next delta is still measured against the real counter.
///
/// # Wrap rule
///
/// With `delta = raw - last_raw` computed as a signed value:
///
/// ```text
/// 2 * delta >  modulus  =>  delta -= modulus   (counter underflowed)
/// 2 * delta < -modulus  =>  delta += modulus   (counter overflowed)
/// otherwise             =>  delta unchanged
/// ```
///
/// A delta of exactly `modulus / 2` in either direction is taken as is.
///
/// # Example
///
/// ```
/// use qenc_core::PositionTracker;
///
/// let mut tracker = PositionTracker::with_initial_raw(65536, 100).unwrap();
///
/// assert_eq!(tracker.sample(110), 10);
///
/// // Zero keeps the last raw reading, so the next delta is 120 - 110.
/// tracker.zero();
/// assert_eq!(tracker.position(), 0);
/// assert_eq!(tracker.sample(120), 10);
///
/// // Backwards through zero: 5 -> 65530 is a step of -11.
/// tracker.sample(5);
/// assert_eq!(tracker.sample(65530), -116);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTracker {
    /// Counter wrap period.
    modulus: u64,
    /// Last raw counter reading.
    last_raw: u32,
    /// Accumulated position in ticks since the last zero.
    position: i64,
    /// Corrected delta applied by the latest sample.
    last_delta: i64,
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self {
            modulus: DEFAULT_MODULUS,
            last_raw: 0,
            position: 0,
            last_delta: 0,
        }
    }
}

impl PositionTracker {
    /// Create a tracker for a counter that wraps every `modulus` ticks.
    ///
    /// # Errors
    ///
    /// Returns `InvalidModulus` if `modulus` is not within `[2, 2^32]`.
    pub fn new(modulus: u64) -> EncResult<Self> {
        Ok(Self {
            modulus: check_modulus(modulus)?,
            ..Self::default()
        })
    }

    /// Create a tracker whose first delta is measured from `raw`.
    ///
    /// Use this when the counter already holds a value at start-up, so the
    /// first sample does not register a jump from zero.
    ///
    /// # Errors
    ///
    /// Returns `InvalidModulus` for a bad modulus and `PreconditionViolation`
    /// if `raw` is not below it.
    pub fn with_initial_raw(modulus: u64, raw: u32) -> EncResult<Self> {
        let mut tracker = Self::new(modulus)?;
        check_raw(u64::from(raw), tracker.modulus)?;
        tracker.last_raw = raw;
        Ok(tracker)
    }

    /// Feed one raw counter reading and return the updated position.
    ///
    /// `raw` must lie in `[0, modulus)`; use [`try_sample`](Self::try_sample)
    /// when the source is not trusted to uphold that.
    pub fn sample(&mut self, raw: u32) -> i64 {
        debug_assert!(
            u64::from(raw) < self.modulus,
            "raw sample {raw} outside [0, {})",
            self.modulus
        );

        let delta = correct_wrap(i64::from(raw) - i64::from(self.last_raw), self.modulus);
        self.position += delta;
        self.last_raw = raw;
        self.last_delta = delta;
        self.position
    }

    /// Checked form of [`sample`](Self::sample).
    ///
    /// # Errors
    ///
    /// Returns `PreconditionViolation` and leaves the state untouched if `raw`
    /// is not below the modulus.
    pub fn try_sample(&mut self, raw: u32) -> EncResult<i64> {
        check_raw(u64::from(raw), self.modulus)?;
        Ok(self.sample(raw))
    }

    /// Move the origin to the current shaft position.
    pub fn zero(&mut self) {
        self.position = 0;
        self.last_delta = 0;
    }

    /// Get accumulated position.
    #[must_use]
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Get the last raw counter reading.
    #[must_use]
    pub fn last_raw(&self) -> u32 {
        self.last_raw
    }

    /// Get the corrected delta applied by the latest sample.
    #[must_use]
    pub fn last_delta(&self) -> i64 {
        self.last_delta
    }

    /// Get the counter wrap period.
    #[must_use]
    pub fn modulus(&self) -> u64 {
        self.modulus
    }
}

/// Map a raw difference onto the representative nearest zero.
///
/// `modulus` is at most 2^32 and `|delta| < modulus`, so neither the cast nor
/// the doubling can overflow.
#[allow(clippy::cast_possible_wrap)]
fn correct_wrap(delta: i64, modulus: u64) -> i64 {
    let modulus = modulus as i64;
    if 2 * delta > modulus {
        delta - modulus
    } else if 2 * delta < -modulus {
        delta + modulus
    } else {
        delta
    }
}
