//! Retry policy for verified device writes.
//!
//! # Responsibilities
//! - Bound the number of read-back checks
//! - Provide the fixed settle pause between a re-issued write and its check
//!
//! # Design Decisions
//! - Fixed delay, no jitter: a single client drives the bus
//! - The first check follows the first write immediately

use std::time::Duration;

use crate::config::TallyConfig;

/// Bounded retry schedule with a constant delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// A policy allowing `max_attempts` total attempts (at least one).
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &TallyConfig) -> Self {
        Self::new(config.max_attempts, config.retry_delay())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Attempt numbers, starting at 1.
    pub fn attempts(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.max_attempts
    }

    /// Pause between re-writing and reading back on `attempt` (1-based).
    pub fn settle_delay(&self, attempt: u32) -> Option<Duration> {
        (attempt > 1 && attempt <= self.max_attempts).then_some(self.delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TallyConfig::default())
    }
}
