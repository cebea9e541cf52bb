//! Periodic multi-channel sampling.
//!
//! Each configured channel owns an [`EncoderDriver`] over a simulated counter.
//! One call to [`Sampler::step`] models one sample period: every shaft turns
//! for `period`, then every counter is read and its tracker updated.

use qenc_common::config::SamplerConfig;
use qenc_common::error::EncResult;
use qenc_core::{is_aliasing_safe, min_sample_rate_hz};
use qenc_driver::{CounterSource, EncoderDriver, SimulatedCounter};
use std::time::Duration;
use tracing::{error, info, warn};

/// A named encoder channel.
#[derive(Debug)]
pub struct Channel {
    name: String,
    driver: EncoderDriver<SimulatedCounter>,
}

impl Channel {
    /// Channel name from the configuration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest absolute position.
    pub fn position(&self) -> i64 {
        self.driver.position()
    }

    /// Latest raw counter reading.
    pub fn raw(&self) -> u32 {
        self.driver.tracker().last_raw()
    }
}

/// Samples every channel once per period.
#[derive(Debug)]
pub struct Sampler {
    channels: Vec<Channel>,
    period: Duration,
    samples: u64,
}

impl Sampler {
    /// Build one channel per configuration entry.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config does not validate, or the
    /// driver error if a channel cannot be attached.
    pub fn from_config(config: &SamplerConfig) -> EncResult<Self> {
        config.validate()?;

        let channels = config
            .channels
            .iter()
            .map(|channel| -> EncResult<Channel> {
                let counter =
                    SimulatedCounter::new(channel.modulus)?.with_speed(channel.simulated_speed);
                Ok(Channel {
                    name: channel.name.clone(),
                    driver: EncoderDriver::new(counter)?,
                })
            })
            .collect::<EncResult<Vec<_>>>()?;

        Ok(Self {
            channels,
            period: config.sample_period,
            samples: 0,
        })
    }

    /// Names of channels whose simulated speed can move the counter half a
    /// period or more in a single sample. Positions on these channels will alias.
    pub fn check_sampling_rate(&self) -> Vec<&str> {
        let mut at_risk = Vec::new();
        for channel in &self.channels {
            let counter = channel.driver.source();
            if !is_aliasing_safe(counter.modulus(), counter.speed(), self.period) {
                warn!(
                    channel = %channel.name,
                    speed = counter.speed(),
                    period = ?self.period,
                    min_rate_hz = min_sample_rate_hz(counter.modulus(), counter.speed()),
                    "Sample rate too low for channel speed, position will alias"
                );
                at_risk.push(channel.name.as_str());
            }
        }
        at_risk
    }

    /// Run one sample period.
    ///
    /// # Errors
    ///
    /// Stops at the first channel whose read fails and returns its error.
    pub fn step(&mut self) -> EncResult<()> {
        for channel in &mut self.channels {
            channel.driver.source_mut().run_for(self.period);
        }
        for channel in &mut self.channels {
            if let Err(e) = channel.driver.read() {
                error!(channel = %channel.name, error = %e, "Encoder read failed");
                return Err(e);
            }
        }
        self.samples += 1;
        Ok(())
    }

    /// Zero every channel at its current position.
    pub fn zero_all(&mut self) {
        for channel in &mut self.channels {
            channel.driver.zero();
        }
        info!(channels = self.channels.len(), "All encoder positions zeroed");
    }

    /// Log the current position of every channel.
    pub fn report(&self) {
        for channel in &self.channels {
            info!(
                channel = %channel.name,
                raw = channel.raw(),
                position = channel.position(),
                "Encoder position"
            );
        }
    }

    /// Configured channels.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Sample period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of completed sample periods.
    pub fn sample_count(&self) -> u64 {
        self.samples
    }
}
