// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::constants;
use crate::common::error::AppError;
use crate::data::quoter_abi::{QuoterMulticall, QuoterV2};
use crate::network::provider::HttpProvider;
use crate::quote::types::{CallOutcome, EncodedInput, QuoteCallData, QuoteDirection};
use alloy::eips::BlockId;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use alloy_sol_types::SolCall;
use async_trait::async_trait;

/// Per-batch execution knobs the engine adjusts between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorParams {
    /// Block the batch is pinned to.
    pub block_number: u64,
    /// Gas ceiling for each individual quoter call inside the batch.
    pub gas_limit_per_call: u64,
}

/// Reply for one executed batch: per-input outcomes positionally aligned
/// with the submitted inputs, the block height the batch executed at, and
/// the mean gas burned by the successful calls.
#[derive(Debug, Clone)]
pub struct AggregatedBatch {
    pub block_number: u64,
    pub outcomes: Vec<CallOutcome>,
    pub approx_gas_used_per_success: u64,
}

/// The multicall-aggregator collaborator. Production wraps the on-chain
/// gas-metering multicall; tests inject deterministic fakes.
#[async_trait]
pub trait QuoteAggregator: Send + Sync {
    async fn execute(
        &self,
        quoter: Address,
        direction: QuoteDirection,
        inputs: &[EncodedInput],
        params: AggregatorParams,
    ) -> Result<AggregatedBatch, AppError>;

    async fn latest_block_number(&self) -> Result<u64, AppError>;
}

pub struct OnChainAggregator {
    provider: HttpProvider,
    multicall: Address,
}

impl OnChainAggregator {
    pub fn new(provider: HttpProvider, chain_id: u64) -> Result<Self, AppError> {
        let multicall = constants::multicall_address(chain_id).ok_or_else(|| {
            AppError::Config(format!("No multicall deployment known for chain {chain_id}"))
        })?;
        Ok(Self::with_address(provider, multicall))
    }

    pub fn with_address(provider: HttpProvider, multicall: Address) -> Self {
        Self {
            provider,
            multicall,
        }
    }

    fn encode_quote_call(direction: QuoteDirection, input: &EncodedInput) -> Bytes {
        match direction {
            QuoteDirection::ExactIn => QuoterV2::quoteExactInputCall {
                path: input.path.clone(),
                amountIn: input.amount,
            }
            .abi_encode()
            .into(),
            QuoteDirection::ExactOut => QuoterV2::quoteExactOutputCall {
                path: input.path.clone(),
                amountOut: input.amount,
            }
            .abi_encode()
            .into(),
        }
    }

    fn decode_quote_return(direction: QuoteDirection, data: &[u8]) -> Option<QuoteCallData> {
        match direction {
            QuoteDirection::ExactIn => QuoterV2::quoteExactInputCall::abi_decode_returns(data)
                .ok()
                .map(|ret| QuoteCallData {
                    amount: ret.amountOut,
                    sqrt_price_x96_after: ret
                        .sqrtPriceX96AfterList
                        .into_iter()
                        .map(U256::from)
                        .collect(),
                    initialized_ticks_crossed: ret.initializedTicksCrossedList,
                    gas_estimate: ret.gasEstimate,
                }),
            QuoteDirection::ExactOut => QuoterV2::quoteExactOutputCall::abi_decode_returns(data)
                .ok()
                .map(|ret| QuoteCallData {
                    amount: ret.amountIn,
                    sqrt_price_x96_after: ret
                        .sqrtPriceX96AfterList
                        .into_iter()
                        .map(U256::from)
                        .collect(),
                    initialized_ticks_crossed: ret.initializedTicksCrossedList,
                    gas_estimate: ret.gasEstimate,
                }),
        }
    }
}

#[async_trait]
impl QuoteAggregator for OnChainAggregator {
    async fn execute(
        &self,
        quoter: Address,
        direction: QuoteDirection,
        inputs: &[EncodedInput],
        params: AggregatorParams,
    ) -> Result<AggregatedBatch, AppError> {
        let calls: Vec<QuoterMulticall::Call> = inputs
            .iter()
            .map(|input| QuoterMulticall::Call {
                target: quoter,
                gasLimit: U256::from(params.gas_limit_per_call),
                callData: Self::encode_quote_call(direction, input),
            })
            .collect();

        let contract = QuoterMulticall::new(self.multicall, self.provider.clone());
        let reply = contract
            .multicall(calls)
            .block(BlockId::number(params.block_number))
            .call()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        let mut outcomes = Vec::with_capacity(reply.returnData.len());
        let mut success_count: u64 = 0;
        let mut success_gas: u64 = 0;
        for result in &reply.returnData {
            if !result.success {
                outcomes.push(CallOutcome::failed());
                continue;
            }
            match Self::decode_quote_return(direction, &result.returnData) {
                Some(data) => {
                    success_count += 1;
                    success_gas = success_gas
                        .saturating_add(u64::try_from(result.gasUsed).unwrap_or(u64::MAX));
                    outcomes.push(CallOutcome::ok(data));
                }
                // Truncated or malformed return payload: the call burned its
                // gas without producing a quote.
                None => outcomes.push(CallOutcome::failed()),
            }
        }

        let approx_gas_used_per_success = if success_count > 0 {
            success_gas / success_count
        } else {
            0
        };

        Ok(AggregatedBatch {
            block_number: u64::try_from(reply.blockNumber).unwrap_or(u64::MAX),
            outcomes,
            approx_gas_used_per_success,
        })
    }

    async fn latest_block_number(&self) -> Result<u64, AppError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))
    }
}
