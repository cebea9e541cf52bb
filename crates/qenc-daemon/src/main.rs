//! Encoder sampling daemon entry point.
//!
//! Polls every configured encoder channel at a fixed period, feeds the raw
//! counter readings through the position trackers, and reports absolute
//! positions through `tracing`.

mod sampler;
mod signals;

use anyhow::{Context, Result};
use clap::Parser;
use qenc_common::config::SamplerConfig;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::sampler::Sampler;
use crate::signals::SignalHandler;

/// Encoder daemon command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "qenc-daemon",
    about = "Quadrature encoder position tracker - periodic counter sampling",
    version,
    long_about = None
)]
struct Args {
    /// Path to a sampler configuration file (TOML).
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sample period (overrides config file), e.g. "25ms".
    #[arg(long, short = 'p', value_name = "DURATION", value_parser = humantime::parse_duration)]
    period: Option<Duration>,

    /// Maximum samples to take (0 = infinite).
    #[arg(long, default_value = "0")]
    max_samples: u64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting encoder daemon");

    let mut config = load_config(&args)?;
    if let Some(period) = args.period {
        config.sample_period = period;
    }
    config.validate().context("Invalid sampler configuration")?;

    info!(
        sample_period = ?config.sample_period,
        channels = config.channels.len(),
        "Configuration loaded"
    );

    let signal_handler = SignalHandler::new().context("Failed to set up signal handlers")?;

    let mut sampler = Sampler::from_config(&config).context("Failed to attach encoders")?;
    let at_risk = sampler.check_sampling_rate();
    if !at_risk.is_empty() {
        warn!(channels = ?at_risk, "Some channels exceed the half-period sampling limit");
    }

    run_sampler(&mut sampler, &signal_handler, config.log_every, args.max_samples)
}

/// Initialize logging with the specified log level.
fn init_logging(level: &str) {
    let filter = format!(
        "qenc_daemon={level},qenc_driver={level},qenc_core={level},qenc_common={level}"
    );

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_target(true)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Resolution priority (first existing file wins):
/// 1. Command-line `--config` argument
/// 2. `QENC_CONFIG_PATH` environment variable
/// 3. `/etc/qenc/config.toml` (system path)
/// 4. `config/default.toml` (local development)
/// 5. Built-in defaults
fn load_config(args: &Args) -> Result<SamplerConfig> {
    if let Some(config_path) = &args.config {
        info!(?config_path, "Loading config from command-line argument");
        return SamplerConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"));
    }

    if let Ok(env_path) = std::env::var("QENC_CONFIG_PATH") {
        let config_path = PathBuf::from(&env_path);
        if config_path.exists() {
            info!(?config_path, "Loading config from QENC_CONFIG_PATH");
            return SamplerConfig::from_file(&config_path).with_context(|| {
                format!("Failed to load config from QENC_CONFIG_PATH={env_path:?}")
            });
        }
        warn!(
            path = %env_path,
            "QENC_CONFIG_PATH set but file does not exist, checking other locations"
        );
    }

    for (path, origin) in [
        ("/etc/qenc/config.toml", "system path"),
        ("config/default.toml", "local path"),
    ] {
        let config_path = PathBuf::from(path);
        if config_path.exists() {
            info!(?config_path, "Loading config from {origin}");
            return SamplerConfig::from_file(&config_path)
                .with_context(|| format!("Failed to load config from {config_path:?}"));
        }
    }

    info!("No config file found, using built-in defaults");
    Ok(SamplerConfig::default())
}

/// Main sampling loop.
///
/// Sleeps to absolute deadlines so the period does not drift with the time
/// spent sampling and logging.
fn run_sampler(
    sampler: &mut Sampler,
    signal_handler: &SignalHandler,
    log_every: u64,
    max_samples: u64,
) -> Result<()> {
    let period = sampler.period();
    let mut next_deadline = Instant::now() + period;
    let mut late_samples = 0u64;
    let mut outcome = Ok(());

    info!(?period, "Entering sampling loop");

    loop {
        signal_handler.poll();
        if signal_handler.shutdown_requested() {
            info!("Shutdown signal received, stopping sampler");
            break;
        }
        if signal_handler.take_zero_request() {
            sampler.zero_all();
        }

        if let Err(e) = sampler.step() {
            error!("Sampling failed: {}", e);
            outcome = Err(e).context("Encoder sampling failed");
            break;
        }

        let count = sampler.sample_count();
        if count % log_every == 0 {
            sampler.report();
        }

        if max_samples > 0 && count >= max_samples {
            info!(samples = count, "Maximum sample count reached");
            signal_handler.request_shutdown();
            break;
        }

        let now = Instant::now();
        if next_deadline > now {
            std::thread::sleep(next_deadline - now);
            next_deadline += period;
        } else {
            late_samples += 1;
            debug!(
                lag_us = u64::try_from((now - next_deadline).as_micros()).unwrap_or(u64::MAX),
                "Sample deadline missed"
            );
            next_deadline = now + period;
        }
    }

    info!("Shutting down...");
    for channel in sampler.channels() {
        info!(
            channel = channel.name(),
            raw = channel.raw(),
            position = channel.position(),
            "Final encoder position"
        );
    }
    info!(
        samples = sampler.sample_count(),
        late_samples,
        signals = signal_handler.state().signal_count(),
        "Daemon shutdown complete"
    );

    outcome
}
