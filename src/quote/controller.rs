// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::constants::{OUT_OF_GAS_CHUNK, OUT_OF_GAS_GAS_LIMIT};
use crate::common::metrics::QuoteMetrics;
use crate::config::SuccessRateFailureOverrides;
use crate::quote::batch::FailureKind;

/// Whether the call has already retried for each failure kind, plus the
/// bookkeeping the block-header rollback needs. Scoped to one invocation.
#[derive(Debug, Default)]
struct RetryFlags {
    block_conflict: bool,
    block_header: bool,
    timeout: bool,
    out_of_gas: bool,
    success_rate: bool,
    unknown: bool,
    block_header_last_attempt: u32,
    block_rolled_back: bool,
}

/// Knobs the controller may rewrite between attempts. The engine owns the
/// values; the controller owns the policy.
#[derive(Debug)]
pub struct AttemptKnobs<'a> {
    pub gas_limit_per_call: &'a mut u64,
    pub multicall_chunk: &'a mut usize,
    pub block_number: &'a mut u64,
}

/// What the next attempt should do with the batch set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    /// Re-plan every batch from the flat inputs with the current chunk size;
    /// otherwise only failed batches are re-executed.
    pub retry_all: bool,
}

pub struct RetryController {
    flags: RetryFlags,
    rollback_enabled: bool,
    overrides: SuccessRateFailureOverrides,
}

impl RetryController {
    pub fn new(rollback_enabled: bool, overrides: SuccessRateFailureOverrides) -> Self {
        Self {
            flags: RetryFlags::default(),
            rollback_enabled,
            overrides,
        }
    }

    /// The validator suppresses repeat success-rate violations once the call
    /// has retried for one.
    pub fn has_retried_success_rate(&self) -> bool {
        self.flags.success_rate
    }

    /// Inspects the failure kinds of one attempt, updates per-call flags,
    /// bumps each retry metric at most once per call, and rewrites the
    /// execution knobs per kind.
    pub fn on_attempt_failures(
        &mut self,
        attempt: u32,
        kinds: &[FailureKind],
        knobs: &mut AttemptKnobs<'_>,
        metrics: &QuoteMetrics,
    ) -> Decision {
        let mut decision = Decision::default();

        for kind in kinds {
            match kind {
                FailureKind::BlockConflict { .. } => {
                    if !self.flags.block_conflict {
                        self.flags.block_conflict = true;
                        metrics.count_block_conflict_retry();
                    }
                    decision.retry_all = true;
                }
                FailureKind::BlockHeaderMissing => {
                    if !self.flags.block_header {
                        self.flags.block_header = true;
                        self.flags.block_header_last_attempt = attempt;
                        metrics.count_block_header_not_found_retry();
                    } else if self.rollback_enabled
                        && !self.flags.block_rolled_back
                        && attempt > self.flags.block_header_last_attempt
                    {
                        *knobs.block_number = knobs.block_number.saturating_sub(1);
                        self.flags.block_rolled_back = true;
                        self.flags.block_header_last_attempt = attempt;
                        decision.retry_all = true;
                        tracing::info!(
                            target: "quote",
                            block_number = *knobs.block_number,
                            "Repeated missing header; rolling pinned block back by one"
                        );
                    } else {
                        self.flags.block_header_last_attempt = attempt;
                    }
                }
                FailureKind::Timeout => {
                    if !self.flags.timeout {
                        self.flags.timeout = true;
                        metrics.count_timeout_retry();
                    }
                }
                FailureKind::OutOfGas => {
                    if !self.flags.out_of_gas {
                        self.flags.out_of_gas = true;
                        metrics.count_out_of_gas_retry();
                        *knobs.gas_limit_per_call = OUT_OF_GAS_GAS_LIMIT;
                        *knobs.multicall_chunk = OUT_OF_GAS_CHUNK;
                        tracing::info!(
                            target: "quote",
                            gas_limit_per_call = *knobs.gas_limit_per_call,
                            multicall_chunk = *knobs.multicall_chunk,
                            "Provider ran out of gas; tightening batch parameters"
                        );
                    }
                }
                FailureKind::SuccessRateTooLow => {
                    if !self.flags.success_rate {
                        self.flags.success_rate = true;
                        metrics.count_success_rate_retry();
                        *knobs.gas_limit_per_call = self.overrides.gas_limit_override;
                        *knobs.multicall_chunk = self.overrides.multicall_chunk;
                        decision.retry_all = true;
                        tracing::info!(
                            target: "quote",
                            gas_limit_per_call = *knobs.gas_limit_per_call,
                            multicall_chunk = *knobs.multicall_chunk,
                            "Success rate below floor; applying overrides and retrying all"
                        );
                    }
                }
                FailureKind::Unknown(_) => {
                    if !self.flags.unknown {
                        self.flags.unknown = true;
                        metrics.count_unknown_retry();
                    }
                }
            }
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(rollback: bool) -> RetryController {
        RetryController::new(
            rollback,
            SuccessRateFailureOverrides {
                gas_limit_override: 1_300_000,
                multicall_chunk: 110,
            },
        )
    }

    struct Knobs {
        gas: u64,
        chunk: usize,
        block: u64,
    }

    impl Knobs {
        fn new() -> Self {
            Self {
                gas: 1_500_000,
                chunk: 210,
                block: 1000,
            }
        }

        fn view(&mut self) -> AttemptKnobs<'_> {
            AttemptKnobs {
                gas_limit_per_call: &mut self.gas,
                multicall_chunk: &mut self.chunk,
                block_number: &mut self.block,
            }
        }
    }

    #[test]
    fn out_of_gas_tightens_once_and_retries_failed_only() {
        let metrics = QuoteMetrics::default();
        let mut ctl = controller(false);
        let mut knobs = Knobs::new();

        let decision =
            ctl.on_attempt_failures(1, &[FailureKind::OutOfGas], &mut knobs.view(), &metrics);
        assert!(!decision.retry_all);
        assert_eq!(knobs.gas, OUT_OF_GAS_GAS_LIMIT);
        assert_eq!(knobs.chunk, OUT_OF_GAS_CHUNK);
        assert_eq!(metrics.retry_count("out_of_gas"), 1);

        knobs.gas = 42;
        ctl.on_attempt_failures(2, &[FailureKind::OutOfGas], &mut knobs.view(), &metrics);
        assert_eq!(knobs.gas, 42, "second sight leaves knobs alone");
        assert_eq!(metrics.retry_count("out_of_gas"), 1, "metric emitted once");
    }

    #[test]
    fn success_rate_applies_overrides_and_retries_all() {
        let metrics = QuoteMetrics::default();
        let mut ctl = controller(false);
        let mut knobs = Knobs::new();

        let decision = ctl.on_attempt_failures(
            1,
            &[FailureKind::SuccessRateTooLow],
            &mut knobs.view(),
            &metrics,
        );
        assert!(decision.retry_all);
        assert!(ctl.has_retried_success_rate());
        assert_eq!(knobs.gas, 1_300_000);
        assert_eq!(knobs.chunk, 110);
    }

    #[test]
    fn block_header_rolls_back_once_on_second_sight() {
        let metrics = QuoteMetrics::default();
        let mut ctl = controller(true);
        let mut knobs = Knobs::new();

        let first = ctl.on_attempt_failures(
            1,
            &[FailureKind::BlockHeaderMissing],
            &mut knobs.view(),
            &metrics,
        );
        assert!(!first.retry_all);
        assert_eq!(knobs.block, 1000);

        let second = ctl.on_attempt_failures(
            2,
            &[FailureKind::BlockHeaderMissing],
            &mut knobs.view(),
            &metrics,
        );
        assert!(second.retry_all);
        assert_eq!(knobs.block, 999);

        let third = ctl.on_attempt_failures(
            3,
            &[FailureKind::BlockHeaderMissing],
            &mut knobs.view(),
            &metrics,
        );
        assert!(!third.retry_all, "rollback happens at most once");
        assert_eq!(knobs.block, 999);
        assert_eq!(metrics.retry_count("block_header"), 1);
    }

    #[test]
    fn block_header_never_rolls_back_when_disabled() {
        let metrics = QuoteMetrics::default();
        let mut ctl = controller(false);
        let mut knobs = Knobs::new();

        for attempt in 1..=3 {
            let decision = ctl.on_attempt_failures(
                attempt,
                &[FailureKind::BlockHeaderMissing],
                &mut knobs.view(),
                &metrics,
            );
            assert!(!decision.retry_all);
        }
        assert_eq!(knobs.block, 1000);
    }

    #[test]
    fn block_conflict_always_retries_all() {
        let metrics = QuoteMetrics::default();
        let mut ctl = controller(false);
        let mut knobs = Knobs::new();
        let conflict = FailureKind::BlockConflict {
            observed: vec![100, 101],
        };

        for attempt in 1..=2 {
            let decision =
                ctl.on_attempt_failures(attempt, &[conflict.clone()], &mut knobs.view(), &metrics);
            assert!(decision.retry_all);
        }
        assert_eq!(metrics.retry_count("block_conflict"), 1);
    }

    #[test]
    fn duplicate_kinds_in_one_attempt_emit_one_metric() {
        let metrics = QuoteMetrics::default();
        let mut ctl = controller(false);
        let mut knobs = Knobs::new();

        ctl.on_attempt_failures(
            1,
            &[FailureKind::Timeout, FailureKind::Timeout],
            &mut knobs.view(),
            &metrics,
        );
        assert_eq!(metrics.retry_count("timeout"), 1);
    }
}
