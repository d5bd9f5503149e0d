// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::constants::PROVIDER_ERROR_TRUNCATE;
use crate::common::error::AppError;
use crate::network::aggregator::{AggregatedBatch, AggregatorParams, QuoteAggregator};
use crate::quote::types::{CallOutcome, EncodedInput, QuoteDirection};
use alloy::primitives::Address;
use std::fmt;

/// Typed classification of a failed batch. `Display` renders the provider
/// error class the aggregated per-call error reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    BlockHeaderMissing,
    Timeout,
    OutOfGas,
    SuccessRateTooLow,
    BlockConflict { observed: Vec<u64> },
    Unknown(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::BlockHeaderMissing => "ProviderBlockHeaderError",
            FailureKind::Timeout => "ProviderTimeoutError",
            FailureKind::OutOfGas => "ProviderGasError",
            FailureKind::SuccessRateTooLow => "SuccessRateError",
            FailureKind::BlockConflict { .. } => "BlockConflictError",
            FailureKind::Unknown(_) => "UnknownError",
        };
        f.write_str(name)
    }
}

/// Classifies a raw provider error message by substring, in order. The
/// message is truncated before being attached: providers routinely echo
/// full calldata in revert strings.
pub fn classify_provider_error(message: &str) -> FailureKind {
    if message.contains("header not found") {
        FailureKind::BlockHeaderMissing
    } else if message.contains("timeout") {
        FailureKind::Timeout
    } else if message.contains("out of gas") {
        FailureKind::OutOfGas
    } else {
        FailureKind::Unknown(truncate_message(message))
    }
}

fn truncate_message(message: &str) -> String {
    message.chars().take(PROVIDER_ERROR_TRUNCATE).collect()
}

/// One chunk of encoded inputs as it moves through the attempt loop.
#[derive(Debug, Clone)]
pub enum BatchState {
    Pending {
        inputs: Vec<EncodedInput>,
    },
    Success {
        inputs: Vec<EncodedInput>,
        block_number: u64,
        outcomes: Vec<CallOutcome>,
        approx_gas_per_success: u64,
    },
    Failed {
        inputs: Vec<EncodedInput>,
        kind: FailureKind,
        partial: Option<AggregatedBatch>,
    },
}

impl BatchState {
    pub fn inputs(&self) -> &[EncodedInput] {
        match self {
            BatchState::Pending { inputs }
            | BatchState::Success { inputs, .. }
            | BatchState::Failed { inputs, .. } => inputs,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, BatchState::Pending { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchState::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<&FailureKind> {
        match self {
            BatchState::Failed { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

/// Runs one chunk through the aggregator and folds the reply (or the
/// classified provider error) into a terminal batch state.
pub async fn execute_batch(
    aggregator: &dyn QuoteAggregator,
    quoter: Address,
    direction: QuoteDirection,
    inputs: Vec<EncodedInput>,
    params: AggregatorParams,
) -> BatchState {
    match aggregator.execute(quoter, direction, &inputs, params).await {
        Ok(reply) => {
            if reply.outcomes.len() != inputs.len() {
                let kind = FailureKind::Unknown(format!(
                    "aggregator returned {} outcomes for {} inputs",
                    reply.outcomes.len(),
                    inputs.len()
                ));
                return BatchState::Failed {
                    inputs,
                    kind,
                    partial: Some(reply),
                };
            }
            BatchState::Success {
                inputs,
                block_number: reply.block_number,
                approx_gas_per_success: reply.approx_gas_used_per_success,
                outcomes: reply.outcomes,
            }
        }
        Err(err) => {
            let message = match &err {
                AppError::Provider(msg) => msg.clone(),
                other => other.to_string(),
            };
            let kind = classify_provider_error(&message);
            tracing::debug!(
                target: "quote",
                kind = %kind,
                error = %truncate_message(&message),
                batch_size = inputs.len(),
                "Batch failed"
            );
            BatchState::Failed {
                inputs,
                kind,
                partial: None,
            }
        }
    }
}
