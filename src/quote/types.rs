// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, Bytes, U256};

/// Whether the quoted amount fixes the input or the output side of the swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteDirection {
    ExactIn,
    ExactOut,
}

/// One pool traversal: the two assets, the fee tier, and the direction
/// implied by their order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolEdge {
    pub token_in: Address,
    pub token_out: Address,
    /// Fee tier in hundredths of a bip (e.g. 3000 = 0.30%).
    pub fee: u32,
}

/// An ordered, non-empty sequence of pools forming a directional path
/// between two assets. Immutable for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pools: Vec<PoolEdge>,
}

impl RouteSpec {
    /// Builds a route if pools are non-empty and token continuity holds.
    pub fn try_new(pools: Vec<PoolEdge>) -> Option<Self> {
        if pools.is_empty() {
            return None;
        }
        if !Self::is_continuous(&pools) {
            return None;
        }
        Some(Self { pools })
    }

    /// Validates token continuity: each pool's output matches the next pool's input.
    pub fn is_continuous(pools: &[PoolEdge]) -> bool {
        if pools.len() < 2 {
            return true;
        }
        for window in pools.windows(2) {
            if let [a, b] = window
                && a.token_out != b.token_in
            {
                return false;
            }
        }
        true
    }

    pub fn pools(&self) -> &[PoolEdge] {
        &self.pools
    }

    pub fn input_token(&self) -> Address {
        self.pools[0].token_in
    }

    pub fn output_token(&self) -> Address {
        self.pools[self.pools.len() - 1].token_out
    }
}

/// A non-negative 256-bit amount annotated with its asset and decimal scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    pub token: Address,
    pub decimals: u8,
    pub raw: U256,
}

impl TokenAmount {
    pub fn new(token: Address, decimals: u8, raw: U256) -> Self {
        Self {
            token,
            decimals,
            raw,
        }
    }
}

/// One encoded (path, amount) pair as the remote quoter consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInput {
    pub path: Bytes,
    pub amount: U256,
}

/// Successful quoter return for one input. Array lengths equal the number
/// of pools in the quoted route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteCallData {
    /// Output amount for ExactIn, required input amount for ExactOut.
    pub amount: U256,
    pub sqrt_price_x96_after: Vec<U256>,
    pub initialized_ticks_crossed: Vec<u32>,
    pub gas_estimate: U256,
}

/// Per-input reply from the aggregator, positionally aligned with the
/// submitted inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub success: bool,
    pub data: Option<QuoteCallData>,
}

impl CallOutcome {
    pub fn failed() -> Self {
        Self {
            success: false,
            data: None,
        }
    }

    pub fn ok(data: QuoteCallData) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}

/// Per-(route, amount) output. `quote` is absent when the quoter call for
/// this input failed on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRecord {
    pub amount: TokenAmount,
    pub quote: Option<QuoteCallData>,
}

pub type RouteQuotes = (RouteSpec, Vec<QuoteRecord>);

/// Result of one engine call: quotes for every (route, amount) pair, all
/// sampled at `block_number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteResponse {
    pub routes_with_quotes: Vec<RouteQuotes>,
    pub block_number: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const A: Address = address!("0000000000000000000000000000000000000001");
    const B: Address = address!("0000000000000000000000000000000000000002");
    const C: Address = address!("0000000000000000000000000000000000000003");

    fn edge(token_in: Address, token_out: Address) -> PoolEdge {
        PoolEdge {
            token_in,
            token_out,
            fee: 3000,
        }
    }

    #[test]
    fn route_requires_pools() {
        assert!(RouteSpec::try_new(vec![]).is_none());
    }

    #[test]
    fn route_requires_token_continuity() {
        assert!(RouteSpec::try_new(vec![edge(A, B), edge(C, A)]).is_none());
        let route = RouteSpec::try_new(vec![edge(A, B), edge(B, C)]).expect("continuous");
        assert_eq!(route.input_token(), A);
        assert_eq!(route.output_token(), C);
    }
}
