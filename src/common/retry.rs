// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>


use crate::common::constants::{
    DEFAULT_RETRIES, DEFAULT_RETRY_MAX_TIMEOUT_MS, DEFAULT_RETRY_MIN_TIMEOUT_MS,
};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

/// Exponential-backoff budget for the quote attempt loop: `retries` further
/// attempts after the first, delays doubling from `min_timeout_ms` up to
/// `max_timeout_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_min_timeout_ms")]
    pub min_timeout_ms: u64,
    #[serde(default = "default_max_timeout_ms")]
    pub max_timeout_ms: u64,
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}
fn default_min_timeout_ms() -> u64 {
    DEFAULT_RETRY_MIN_TIMEOUT_MS
}
fn default_max_timeout_ms() -> u64 {
    DEFAULT_RETRY_MAX_TIMEOUT_MS
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            min_timeout_ms: default_min_timeout_ms(),
            max_timeout_ms: default_max_timeout_ms(),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let doublings = retry.saturating_sub(1).min(16);
        let ms = self
            .min_timeout_ms
            .saturating_mul(1u64 << doublings)
            .min(self.max_timeout_ms);
        Duration::from_millis(ms)
    }

    pub async fn wait_before_retry(&self, retry: u32) {
        sleep(self.backoff_delay(retry)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_until_capped() {
        let policy = RetryPolicy {
            retries: 5,
            min_timeout_ms: 25,
            max_timeout_ms: 250,
        };
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(25));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(50));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(4), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(5), Duration::from_millis(250));
        assert_eq!(policy.backoff_delay(20), Duration::from_millis(250));
    }

    #[test]
    fn huge_retry_numbers_do_not_overflow() {
        let policy = RetryPolicy {
            retries: u32::MAX,
            min_timeout_ms: u64::MAX / 2,
            max_timeout_ms: u64::MAX,
        };
        let _ = policy.backoff_delay(u32::MAX);
    }
}
