//! Configuration acceptance tests.
//!
//! Sampler configurations are written to disk, loaded back, and used to
//! attach drivers the way the daemon does.

use qenc_common::config::{ConfigError, SamplerConfig};
use qenc_core::is_aliasing_safe;
use qenc_driver::{EncoderDriver, SimulatedCounter};
use std::io::Write;
use std::time::Duration;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp config");
    file.write_all(content.as_bytes()).expect("write temp config");
    file
}

#[test]
fn test_load_config_and_attach_channels() {
    let file = write_config(
        r#"
        sample_period = "5ms"
        log_every = 10

        [[channels]]
        name = "spindle"
        modulus = 4096
        simulated_speed = 200000

        [[channels]]
        name = "feed"
        simulated_speed = -1000
        "#,
    );

    let config = SamplerConfig::from_file(file.path()).unwrap();
    config.validate().unwrap();
    assert_eq!(config.sample_period, Duration::from_millis(5));

    let mut drivers: Vec<_> = config
        .channels
        .iter()
        .map(|c| {
            let counter = SimulatedCounter::new(c.modulus)
                .unwrap()
                .with_speed(c.simulated_speed);
            EncoderDriver::new(counter).unwrap()
        })
        .collect();

    for _ in 0..200 {
        for driver in &mut drivers {
            driver.source_mut().run_for(config.sample_period);
            driver.read().unwrap();
        }
    }

    // 1000 ticks per sample on the 4096-tick spindle counter, 5 per sample on feed.
    assert_eq!(drivers[0].position(), 200_000);
    assert_eq!(drivers[1].position(), -1_000);
}

#[test]
fn test_aliasing_flagged_from_config() {
    let config = SamplerConfig::from_toml(
        r#"
        sample_period = "100ms"

        [[channels]]
        name = "slow"
        simulated_speed = 1000

        [[channels]]
        name = "fast"
        simulated_speed = 400000
        "#,
    )
    .unwrap();

    let unsafe_channels: Vec<&str> = config
        .channels
        .iter()
        .filter(|c| !is_aliasing_safe(c.modulus, c.simulated_speed, config.sample_period))
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(unsafe_channels, vec!["fast"]);
}

#[test]
fn test_missing_file_reports_path() {
    let err = SamplerConfig::from_file(std::path::Path::new("/nonexistent/qenc.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/qenc.toml"));
}

#[test]
fn test_invalid_modulus_rejected() {
    let config = SamplerConfig::from_toml(
        r#"
        [[channels]]
        name = "wide"
        modulus = 8589934592
        "#,
    )
    .unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("invalid modulus 8589934592"));
}
