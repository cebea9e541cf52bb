//! Driver acceptance tests.
//!
//! Exercise [`EncoderDriver`] over the simulated counter and over sources that
//! break the counter contract.
//!
//! # Acceptance Criteria
//!
//! - Position follows a simulated shaft through many counter wraps
//! - Out-of-range readings surface as `PreconditionViolation` and leave the
//!   tracker untouched
//! - Channels are independent

use qenc_common::{EncResult, EncoderError};
use qenc_core::is_aliasing_safe;
use qenc_driver::{CounterSource, EncoderDriver, SimulatedCounter};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Counter that reports a wider range than its declared modulus.
struct MisconfiguredTimer {
    declared_modulus: u64,
    value: AtomicU32,
}

impl CounterSource for MisconfiguredTimer {
    fn modulus(&self) -> u64 {
        self.declared_modulus
    }

    fn read_counter(&self) -> EncResult<u32> {
        Ok(self.value.load(Ordering::Relaxed))
    }
}

#[test]
fn test_simulated_shaft_tracked_through_wraps() {
    let period = Duration::from_millis(25);
    let speed = 400_000; // 10_000 ticks per sample
    assert!(is_aliasing_safe(65536, speed, period));

    let counter = SimulatedCounter::new(65536).unwrap().with_speed(speed);
    let mut driver = EncoderDriver::new(counter).unwrap();

    for _ in 0..100 {
        driver.source_mut().run_for(period);
        driver.read().unwrap();
    }
    assert_eq!(driver.position(), 1_000_000);

    driver.source_mut().set_speed(-speed);
    for _ in 0..150 {
        driver.source_mut().run_for(period);
        driver.read().unwrap();
    }
    assert_eq!(driver.position(), -500_000);
}

#[test]
fn test_fractional_half_period_step_is_flagged() {
    // -65535 ticks/s over 500 ms averages 32767.5 ticks per sample; the counter
    // alternates between 32768- and 32767-tick steps.
    let period = Duration::from_millis(500);
    let speed = -65_535;
    assert!(!is_aliasing_safe(65536, speed, period));

    let counter = SimulatedCounter::new(65536).unwrap().with_speed(speed);
    let mut driver = EncoderDriver::new(counter).unwrap();
    let positions: Vec<i64> = (0..4)
        .map(|_| {
            driver.source_mut().run_for(period);
            driver.read().unwrap()
        })
        .collect();

    // Every 32768-tick backward step crosses the wrap and reads as forward.
    assert_eq!(positions, vec![32_768, 1, 32_769, 2]);
    assert_ne!(driver.position(), 2 * speed);
}

#[test]
fn test_whole_tick_bound_tracks_exactly() {
    // 32767 ticks per sample is the largest step the check accepts.
    let period = Duration::from_millis(500);
    let speed = -65_534;
    assert!(is_aliasing_safe(65536, speed, period));

    let counter = SimulatedCounter::new(65536).unwrap().with_speed(speed);
    let mut driver = EncoderDriver::new(counter).unwrap();
    for _ in 0..8 {
        driver.source_mut().run_for(period);
        driver.read().unwrap();
    }
    assert_eq!(driver.position(), 4 * speed);
}

#[test]
fn test_zero_then_continue() {
    let mut counter = SimulatedCounter::new(65536).unwrap();
    counter.set_counter(65_000).unwrap();
    let mut driver = EncoderDriver::new(counter).unwrap();

    driver.source_mut().advance(300);
    assert_eq!(driver.read().unwrap(), 300);

    driver.zero();
    assert_eq!(driver.position(), 0);
    assert_eq!(driver.source().read_counter().unwrap(), 65_300);

    driver.source_mut().advance(500);
    assert_eq!(driver.read().unwrap(), 500);
}

#[test]
fn test_misconfigured_modulus_is_precondition_violation() {
    // Declared as a 12-bit counter but actually 16 bits wide.
    let timer = MisconfiguredTimer {
        declared_modulus: 4096,
        value: AtomicU32::new(100),
    };
    let mut driver = EncoderDriver::new(timer).unwrap();

    driver.source().value.store(5000, Ordering::Relaxed);
    assert_eq!(
        driver.read(),
        Err(EncoderError::PreconditionViolation {
            raw: 5000,
            modulus: 4096
        })
    );
    assert_eq!(driver.position(), 0);
    assert_eq!(driver.tracker().last_raw(), 100);
}

#[test]
fn test_channels_are_independent() {
    let period = Duration::from_millis(10);
    let mut a = EncoderDriver::new(SimulatedCounter::new(65536).unwrap().with_speed(2_000)).unwrap();
    let mut b = EncoderDriver::new(SimulatedCounter::new(1 << 32).unwrap().with_speed(-7_000)).unwrap();

    for i in 0..20 {
        a.source_mut().run_for(period);
        b.source_mut().run_for(period);
        a.read().unwrap();
        b.read().unwrap();
        if i == 9 {
            a.zero();
        }
    }

    assert_eq!(a.position(), 200);
    assert_eq!(b.position(), -1_400);
}
