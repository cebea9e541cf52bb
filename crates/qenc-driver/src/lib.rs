//! Counter source abstractions for encoder position tracking.
//!
//! This crate provides:
//! - [`CounterSource`] trait for anything that can report a raw counter value
//! - [`EncoderDriver`] binding one source to one [`PositionTracker`]
//! - [`simulated`] module with an in-memory counter for running without hardware

#[cfg(feature = "simulated")]
pub mod simulated;

#[cfg(feature = "simulated")]
pub use simulated::SimulatedCounter;

use qenc_common::EncResult;
use qenc_core::PositionTracker;
use tracing::{debug, trace, warn};

/// Source of raw counter readings.
///
/// Implemented by whatever exposes the timer's encoder-mode counter on the
/// target platform. Reading must not disturb counting.
pub trait CounterSource: Send {
    /// Wrap period of the counter (65536 for a 16-bit timer).
    fn modulus(&self) -> u64;

    /// Read the current counter value.
    ///
    /// A well-behaved source always returns a value below [`modulus`](Self::modulus).
    fn read_counter(&self) -> EncResult<u32>;
}

/// One encoder channel: a counter source and the tracker fed from it.
#[derive(Debug)]
pub struct EncoderDriver<S: CounterSource> {
    source: S,
    tracker: PositionTracker,
}

impl<S: CounterSource> EncoderDriver<S> {
    /// Bind a counter source to a fresh tracker.
    ///
    /// The tracker is seeded with the counter's current value, so position
    /// starts at zero wherever the shaft happens to be.
    ///
    /// # Errors
    ///
    /// Fails if the source reports an unusable modulus, cannot be read, or
    /// returns a value outside its own modulus.
    pub fn new(source: S) -> EncResult<Self> {
        let raw = source.read_counter()?;
        let tracker = PositionTracker::with_initial_raw(source.modulus(), raw)?;
        debug!(modulus = tracker.modulus(), raw, "Encoder driver attached");
        Ok(Self { source, tracker })
    }

    /// Read the counter and return the updated absolute position.
    ///
    /// # Errors
    ///
    /// Propagates source failures, and returns `PreconditionViolation` if the
    /// reading is outside the counter's range. The tracker is unchanged on error.
    pub fn read(&mut self) -> EncResult<i64> {
        let raw = self.source.read_counter()?;
        match self.tracker.try_sample(raw) {
            Ok(position) => {
                trace!(raw, position, delta = self.tracker.last_delta(), "Encoder sampled");
                Ok(position)
            }
            Err(e) => {
                warn!(raw, modulus = self.tracker.modulus(), "Counter reading outside modulus");
                Err(e)
            }
        }
    }

    /// Reset the position origin without touching the counter.
    pub fn zero(&mut self) {
        debug!(position = self.tracker.position(), "Zeroing encoder position");
        self.tracker.zero();
    }

    /// Get the position from the latest read.
    #[inline]
    pub fn position(&self) -> i64 {
        self.tracker.position()
    }

    /// Get the underlying tracker.
    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    /// Get the counter source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get the counter source mutably.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume the driver and return the counter source.
    pub fn free(self) -> S {
        self.source
    }
}
