//! Absolute position reconstruction for quadrature encoders.
//!
//! A timer in encoder mode counts pulses into a free-running register that
//! wraps every `modulus` ticks. This crate turns successive snapshots of that
//! register into an unbounded signed position:
//!
//! - **Tracker** ([`tracker`]): [`PositionTracker`], the wrap-correcting accumulator
//! - **Sampling** ([`sampling`]): helpers for checking that a sample rate keeps
//!   consecutive reads within half a counter period
//!
//! # Example
//!
//! ```
//! use qenc_core::PositionTracker;
//!
//! let mut tracker = PositionTracker::new(65536).unwrap();
//! tracker.sample(65530);
//! tracker.zero();
//!
//! // Counter wrapped past 65535 -> 0 while moving forward.
//! assert_eq!(tracker.sample(5), 11);
//! ```

pub mod sampling;
pub mod tracker;

pub use sampling::{is_aliasing_safe, max_unambiguous_step, min_sample_rate_hz};
pub use tracker::PositionTracker;
