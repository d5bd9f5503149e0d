// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::quote::batch::{BatchState, FailureKind};

/// Checks that every successful batch of this attempt reported the same
/// block height. Needs at least two successes to be meaningful. With
/// `allow_one_block_drift` heights differing by one are tolerated.
pub fn check_block_uniformity(
    states: &[BatchState],
    allow_one_block_drift: bool,
) -> Option<FailureKind> {
    let mut observed: Vec<u64> = states
        .iter()
        .filter_map(|state| match state {
            BatchState::Success { block_number, .. } => Some(*block_number),
            _ => None,
        })
        .collect();
    if observed.len() < 2 {
        return None;
    }
    observed.sort_unstable();
    observed.dedup();
    if observed.len() < 2 {
        return None;
    }
    if allow_one_block_drift && observed[observed.len() - 1] - observed[0] <= 1 {
        return None;
    }

    tracing::warn!(
        target: "quote",
        observed = ?observed,
        "Successful batches disagree on block height"
    );
    Some(FailureKind::BlockConflict { observed })
}

/// Applies the per-batch success-rate floor. A batch below the floor is
/// demoted to `Failed` only on the first violation across the whole call;
/// once the call has retried for success rate, low-rate batches are
/// accepted — some pools legitimately fail low-liquidity quotes.
pub fn enforce_success_rate_floor(
    state: BatchState,
    quote_min_success_rate: f64,
    already_retried: bool,
) -> BatchState {
    let BatchState::Success {
        inputs,
        block_number,
        outcomes,
        approx_gas_per_success,
    } = state
    else {
        return state;
    };

    let total = outcomes.len();
    let successful = outcomes.iter().filter(|o| o.success).count();
    let rate = if total == 0 {
        1.0
    } else {
        successful as f64 / total as f64
    };

    if rate >= quote_min_success_rate || already_retried {
        if rate < quote_min_success_rate {
            tracing::debug!(
                target: "quote",
                rate,
                floor = quote_min_success_rate,
                "Accepting low-success-rate batch after prior retry"
            );
        }
        return BatchState::Success {
            inputs,
            block_number,
            outcomes,
            approx_gas_per_success,
        };
    }

    tracing::info!(
        target: "quote",
        rate,
        floor = quote_min_success_rate,
        successful,
        total,
        "Batch success rate below floor"
    );
    BatchState::Failed {
        inputs,
        kind: FailureKind::SuccessRateTooLow,
        partial: Some(crate::network::aggregator::AggregatedBatch {
            block_number,
            outcomes,
            approx_gas_used_per_success: approx_gas_per_success,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::types::{CallOutcome, QuoteCallData};
    use alloy::primitives::U256;

    fn success(block_number: u64, outcomes: Vec<CallOutcome>) -> BatchState {
        BatchState::Success {
            inputs: Vec::new(),
            block_number,
            outcomes,
            approx_gas_per_success: 0,
        }
    }

    fn ok_outcome() -> CallOutcome {
        CallOutcome::ok(QuoteCallData {
            amount: U256::from(1),
            sqrt_price_x96_after: vec![],
            initialized_ticks_crossed: vec![],
            gas_estimate: U256::ZERO,
        })
    }

    #[test]
    fn uniform_blocks_pass() {
        let states = vec![success(100, vec![]), success(100, vec![])];
        assert!(check_block_uniformity(&states, false).is_none());
    }

    #[test]
    fn single_success_never_conflicts() {
        let states = vec![success(100, vec![])];
        assert!(check_block_uniformity(&states, false).is_none());
    }

    #[test]
    fn divergent_blocks_conflict_and_list_heights() {
        let states = vec![success(100, vec![]), success(101, vec![]), success(100, vec![])];
        match check_block_uniformity(&states, false) {
            Some(FailureKind::BlockConflict { observed }) => {
                assert_eq!(observed, vec![100, 101]);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn one_block_drift_tolerated_only_when_enabled() {
        let states = vec![success(100, vec![]), success(101, vec![])];
        assert!(check_block_uniformity(&states, true).is_none());
        assert!(check_block_uniformity(&states, false).is_some());

        let wide = vec![success(100, vec![]), success(102, vec![])];
        assert!(check_block_uniformity(&wide, true).is_some());
    }

    #[test]
    fn floor_demotes_first_violation_only() {
        let low_rate = || {
            success(
                100,
                vec![ok_outcome(), CallOutcome::failed(), CallOutcome::failed()],
            )
        };

        let demoted = enforce_success_rate_floor(low_rate(), 0.7, false);
        assert!(matches!(
            demoted.failure_kind(),
            Some(FailureKind::SuccessRateTooLow)
        ));

        let accepted = enforce_success_rate_floor(low_rate(), 0.7, true);
        assert!(accepted.is_success());

        let above_floor = enforce_success_rate_floor(low_rate(), 0.2, false);
        assert!(above_floor.is_success());
    }
}
