// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Retry schedule for transient WAPI failures.
//!
//! Delays start at 50ms and double up to 10s, each one jittered by ±10%.
//! The schedule ends once the retry budget of the client has been spent:
//!
//! | attempt | delay |
//! |---------|-------|
//! | 1       | 50ms  |
//! | 2       | 100ms |
//! | 3       | 200ms |
//! | ...     | ...   |
//! | 9+      | 10s   |

use rand::Rng;
use std::time::{Duration, Instant};

use crate::constants::{RETRY_INITIAL_DELAY_MILLIS, RETRY_JITTER, RETRY_MAX_DELAY_SECS};

/// Delays to sleep between attempts of one WAPI call.
///
/// Yields `None` once `budget` has elapsed since the schedule was created.
#[derive(Debug)]
pub struct RetrySchedule {
    delay: Duration,
    budget: Duration,
    started: Instant,
}

impl RetrySchedule {
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            delay: Duration::from_millis(RETRY_INITIAL_DELAY_MILLIS),
            budget,
            started: Instant::now(),
        }
    }

    /// Time spent since the first attempt.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Iterator for RetrySchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.started.elapsed() >= self.budget {
            return None;
        }
        let delay = self.delay;
        self.delay = delay
            .saturating_mul(2)
            .min(Duration::from_secs(RETRY_MAX_DELAY_SECS));
        Some(jitter(delay))
    }
}

fn jitter(delay: Duration) -> Duration {
    let secs = delay.as_secs_f64();
    let spread = secs * RETRY_JITTER;
    let jittered = rand::rng().random_range((secs - spread)..=(secs + spread));
    Duration::from_secs_f64(jittered.max(0.0))
}

/// Statuses the grid master returns while overloaded or restarting:
/// 429, 500, 502, 503 and 504.
#[must_use]
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
