// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::constants;
use crate::common::error::AppError;
use crate::common::metrics::QuoteMetrics;
use crate::config::QuoteOptions;
use crate::network::aggregator::{AggregatorParams, QuoteAggregator};
use crate::quote::assembler;
use crate::quote::batch::{self, BatchState, FailureKind};
use crate::quote::controller::{AttemptKnobs, RetryController};
use crate::quote::planner;
use crate::quote::types::{
    CallOutcome, QuoteDirection, QuoteResponse, RouteSpec, TokenAmount,
};
use crate::quote::validator;
use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Batched quote engine. One instance serves many concurrent calls; every
/// call owns its batch states, retry flags, and adjusted knobs.
pub struct OnChainQuoteProvider {
    aggregator: Arc<dyn QuoteAggregator>,
    chain_id: u64,
    metrics: Arc<QuoteMetrics>,
    cancel: CancellationToken,
}

impl OnChainQuoteProvider {
    pub fn new(aggregator: Arc<dyn QuoteAggregator>, chain_id: u64) -> Self {
        Self {
            aggregator,
            chain_id,
            metrics: Arc::new(QuoteMetrics::default()),
            cancel: CancellationToken::new(),
        }
    }

    /// Cancelling the token abandons in-flight attempts with
    /// [`AppError::Cancelled`]; no partial results are surfaced.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn metrics(&self) -> Arc<QuoteMetrics> {
        self.metrics.clone()
    }

    pub async fn get_quotes_many_exact_in(
        &self,
        amounts: &[TokenAmount],
        routes: &[RouteSpec],
        opts: QuoteOptions,
    ) -> Result<QuoteResponse, AppError> {
        self.get_quotes_many(amounts, routes, QuoteDirection::ExactIn, opts)
            .await
    }

    pub async fn get_quotes_many_exact_out(
        &self,
        amounts: &[TokenAmount],
        routes: &[RouteSpec],
        opts: QuoteOptions,
    ) -> Result<QuoteResponse, AppError> {
        self.get_quotes_many(amounts, routes, QuoteDirection::ExactOut, opts)
            .await
    }

    async fn get_quotes_many(
        &self,
        amounts: &[TokenAmount],
        routes: &[RouteSpec],
        direction: QuoteDirection,
        opts: QuoteOptions,
    ) -> Result<QuoteResponse, AppError> {
        opts.validate()?;

        if routes.is_empty() || amounts.is_empty() {
            return Ok(QuoteResponse {
                routes_with_quotes: Vec::new(),
                block_number: opts.block_number.unwrap_or_default(),
            });
        }

        let quoter = opts
            .quoter_address_override
            .or_else(|| constants::quoter_address(self.chain_id))
            .ok_or(AppError::MissingQuoter(self.chain_id))?;

        let mut block_number = match opts.block_number {
            Some(block) => block,
            None => tokio::select! {
                _ = self.cancel.cancelled() => return Err(AppError::Cancelled),
                block = self.aggregator.latest_block_number() => block?,
            },
        };

        let inputs = planner::plan_inputs(routes, amounts, direction);
        let mut gas_limit_per_call = opts.gas_limit_per_call;
        let mut multicall_chunk = opts.multicall_chunk;

        let mut states: Vec<BatchState> = planner::chunk_inputs(&inputs, multicall_chunk)
            .into_iter()
            .map(|inputs| BatchState::Pending { inputs })
            .collect();

        let expected_calls = states.len() as u64;
        let mut total_calls: u64 = 0;
        self.metrics.add_expected_calls(expected_calls);

        tracing::debug!(
            target: "quote",
            chain_id = self.chain_id,
            quoter = %quoter,
            routes = routes.len(),
            amounts = amounts.len(),
            batches = states.len(),
            block_number,
            "Dispatching quote batches"
        );

        let mut controller =
            RetryController::new(opts.rollback, opts.success_rate_failure_overrides.clone());
        let max_attempts = opts.retry.retries + 1;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            // Every slot counts as a provider call for this attempt, even
            // ones skipped because they already succeeded.
            total_calls += states.len() as u64;
            self.metrics.add_total_calls(states.len() as u64);

            let params = AggregatorParams {
                block_number,
                gas_limit_per_call,
            };
            let attempt_futures = states.iter().map(|state| {
                let aggregator = self.aggregator.clone();
                async move {
                    match state {
                        BatchState::Success { .. } => state.clone(),
                        BatchState::Pending { inputs } | BatchState::Failed { inputs, .. } => {
                            batch::execute_batch(
                                aggregator.as_ref(),
                                quoter,
                                direction,
                                inputs.clone(),
                                params,
                            )
                            .await
                        }
                    }
                }
            });
            let joined = tokio::select! {
                _ = self.cancel.cancelled() => return Err(AppError::Cancelled),
                joined = join_all(attempt_futures) => joined,
            };
            states = joined;

            if states.iter().any(BatchState::is_pending) {
                return Err(AppError::Invariant(
                    "batch still pending after all attempt tasks joined".into(),
                ));
            }

            let already_retried = controller.has_retried_success_rate();
            states = states
                .into_iter()
                .map(|state| {
                    validator::enforce_success_rate_floor(
                        state,
                        opts.quote_min_success_rate,
                        already_retried,
                    )
                })
                .collect();

            let mut kinds: Vec<FailureKind> = states
                .iter()
                .filter_map(|state| state.failure_kind().cloned())
                .collect();
            if let Some(conflict) =
                validator::check_block_uniformity(&states, opts.allow_one_block_drift)
            {
                kinds.push(conflict);
            }

            if kinds.is_empty() {
                break;
            }

            tracing::info!(
                target: "quote",
                attempt,
                failures = kinds.len(),
                kinds = %join_kind_names(&kinds),
                "Quote attempt had failures"
            );

            let mut knobs = AttemptKnobs {
                gas_limit_per_call: &mut gas_limit_per_call,
                multicall_chunk: &mut multicall_chunk,
                block_number: &mut block_number,
            };
            let decision = controller.on_attempt_failures(attempt, &kinds, &mut knobs, &self.metrics);

            if attempt >= max_attempts {
                return Err(AppError::QuoteBatch {
                    attempts: attempt,
                    kinds: join_kind_names(&kinds),
                });
            }

            self.metrics.add_retry_loops(1);
            if decision.retry_all {
                states = planner::chunk_inputs(&inputs, multicall_chunk)
                    .into_iter()
                    .map(|inputs| BatchState::Pending { inputs })
                    .collect();
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return Err(AppError::Cancelled),
                _ = opts.retry.wait_before_retry(attempt) => {}
            }
        }

        let mut flat: Vec<CallOutcome> = Vec::with_capacity(inputs.len());
        let mut covered = 0usize;
        let mut agreed_block: Option<u64> = None;
        let mut gas_sum: u64 = 0;
        let mut gas_batches: u64 = 0;
        for state in &states {
            let BatchState::Success {
                inputs: batch_inputs,
                block_number,
                outcomes,
                approx_gas_per_success,
            } = state
            else {
                return Err(AppError::Invariant(
                    "non-success batch after attempt loop settled".into(),
                ));
            };
            covered += batch_inputs.len();
            agreed_block.get_or_insert(*block_number);
            gas_sum = gas_sum.saturating_add(*approx_gas_per_success);
            gas_batches += 1;
            flat.extend(outcomes.iter().cloned());
        }
        if covered != inputs.len() {
            return Err(AppError::Invariant(format!(
                "successful batches cover {} inputs, planner emitted {}",
                covered,
                inputs.len()
            )));
        }
        let agreed_block = agreed_block
            .ok_or_else(|| AppError::Invariant("no successful batch on settled call".into()))?;

        self.metrics
            .record_approx_gas_used_per_successful_call(gas_sum / gas_batches.max(1));
        self.metrics
            .add_retried_calls(total_calls.saturating_sub(expected_calls));

        tracing::info!(
            target: "quote",
            attempts = attempt,
            batches = states.len(),
            quotes = flat.len(),
            block_number = agreed_block,
            "Quote batches settled"
        );

        assembler::assemble(routes, amounts, flat, agreed_block)
    }
}

fn join_kind_names(kinds: &[FailureKind]) -> String {
    let mut names: Vec<String> = Vec::new();
    for kind in kinds {
        let name = kind.to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names.join(", ")
}
