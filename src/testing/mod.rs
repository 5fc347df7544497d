//! Testing utilities and fixtures
//!
//! Mocks for the cloud and subprocess seams plus config helpers that keep
//! polling intervals short enough for tests.

pub mod mocks;

use crate::config::HoistConfig;
use std::time::Duration;

/// Configuration with millisecond intervals and no health-check delay
pub fn fast_config() -> HoistConfig {
    let mut config = HoistConfig::default();
    config.stack.poll_interval = Duration::from_millis(1);
    config.logs.poll_interval = Duration::from_millis(1);
    config.health.retry_delay = Duration::from_millis(1);
    config
}
