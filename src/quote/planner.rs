// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::quote::path::encode_path;
use crate::quote::types::{EncodedInput, QuoteDirection, RouteSpec, TokenAmount};

/// Flattens (routes × amounts) into the positional input sequence the
/// assembler relies on: route-major, amount-minor. Each route's path is
/// encoded once, reversed for exact-output quoting.
pub fn plan_inputs(
    routes: &[RouteSpec],
    amounts: &[TokenAmount],
    direction: QuoteDirection,
) -> Vec<EncodedInput> {
    let mut inputs = Vec::with_capacity(routes.len() * amounts.len());
    for route in routes {
        let path = encode_path(route, direction == QuoteDirection::ExactOut);
        for amount in amounts {
            inputs.push(EncodedInput {
                path: path.clone(),
                amount: amount.raw,
            });
        }
    }
    inputs
}

/// Splits the input sequence into contiguous chunks that never exceed
/// `multicall_chunk` and are as evenly sized as possible: with
/// `num_chunks = ceil(N / multicall_chunk)` each chunk holds
/// `ceil(N / num_chunks)` inputs (the last may be shorter), so chunk sizes
/// differ by at most one.
pub fn chunk_inputs(inputs: &[EncodedInput], multicall_chunk: usize) -> Vec<Vec<EncodedInput>> {
    if inputs.is_empty() {
        return Vec::new();
    }
    let chunk = multicall_chunk.max(1);
    let num_chunks = inputs.len().div_ceil(chunk);
    let normalized = inputs.len().div_ceil(num_chunks);
    inputs
        .chunks(normalized)
        .map(|slice| slice.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::types::PoolEdge;
    use alloy::primitives::{Address, Bytes, U256, address};

    const A: Address = address!("00000000000000000000000000000000000000Aa");
    const B: Address = address!("00000000000000000000000000000000000000Bb");

    fn route() -> RouteSpec {
        RouteSpec::try_new(vec![PoolEdge {
            token_in: A,
            token_out: B,
            fee: 3000,
        }])
        .expect("route")
    }

    fn amount(raw: u64) -> TokenAmount {
        TokenAmount::new(A, 18, U256::from(raw))
    }

    fn synthetic_inputs(n: usize) -> Vec<EncodedInput> {
        (0..n)
            .map(|i| EncodedInput {
                path: Bytes::new(),
                amount: U256::from(i),
            })
            .collect()
    }

    #[test]
    fn layout_is_route_major_amount_minor() {
        let routes = vec![route(), route()];
        let amounts = vec![amount(10), amount(20), amount(30)];
        let inputs = plan_inputs(&routes, &amounts, QuoteDirection::ExactIn);

        assert_eq!(inputs.len(), 6);
        for (route_idx, chunk) in inputs.chunks(amounts.len()).enumerate() {
            for (amount_idx, input) in chunk.iter().enumerate() {
                assert_eq!(input.amount, amounts[amount_idx].raw, "route {route_idx}");
            }
        }
    }

    #[test]
    fn exact_out_reverses_the_encoded_path() {
        let routes = vec![route()];
        let amounts = vec![amount(1)];
        let fwd = plan_inputs(&routes, &amounts, QuoteDirection::ExactIn);
        let rev = plan_inputs(&routes, &amounts, QuoteDirection::ExactOut);
        assert_eq!(&fwd[0].path[0..20], A.as_slice());
        assert_eq!(&rev[0].path[0..20], B.as_slice());
    }

    #[test]
    fn chunks_are_bounded_and_even() {
        for (n, chunk) in [(1usize, 1usize), (7, 3), (100, 7), (210, 210), (211, 210)] {
            let chunks = chunk_inputs(&synthetic_inputs(n), chunk);
            let total: usize = chunks.iter().map(|c| c.len()).sum();
            assert_eq!(total, n);
            let max = chunks.iter().map(|c| c.len()).max().unwrap();
            let min = chunks.iter().map(|c| c.len()).min().unwrap();
            assert!(max <= chunk, "n={n} chunk={chunk} max={max}");
            assert!(max - min <= 1, "n={n} chunk={chunk} spread={}", max - min);
        }
    }

    #[test]
    fn empty_inputs_produce_no_chunks() {
        assert!(chunk_inputs(&[], 10).is_empty());
    }
}
