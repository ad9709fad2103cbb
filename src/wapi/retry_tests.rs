// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `retry.rs`

#[cfg(test)]
mod tests {
    use super::super::{is_transient_status, RetrySchedule};
    use std::time::Duration;

    fn within(delay: Duration, expected_millis: u64) -> bool {
        let expected = Duration::from_millis(expected_millis);
        delay >= expected.mul_f64(0.9) && delay <= expected.mul_f64(1.1)
    }

    #[test]
    fn test_delays_double_from_fifty_millis() {
        let delays: Vec<Duration> = RetrySchedule::new(Duration::from_secs(120)).take(4).collect();

        assert_eq!(delays.len(), 4);
        for (delay, expected) in delays.iter().zip([50, 100, 200, 400]) {
            assert!(within(*delay, expected), "{delay:?} not near {expected}ms");
        }
    }

    #[test]
    fn test_delays_are_capped() {
        let last = RetrySchedule::new(Duration::from_secs(120))
            .take(20)
            .last()
            .unwrap();

        assert!(within(last, 10_000), "{last:?} not near 10s");
    }

    #[test]
    fn test_schedule_ends_when_budget_is_spent() {
        assert_eq!(RetrySchedule::new(Duration::ZERO).next(), None);
    }

    #[test]
    fn test_transient_statuses() {
        for status in [429, 500, 502, 503, 504] {
            assert!(is_transient_status(status), "{status} should be retried");
        }
        for status in [400, 401, 403, 404, 501] {
            assert!(!is_transient_status(status), "{status} should fail immediately");
        }
    }
}
