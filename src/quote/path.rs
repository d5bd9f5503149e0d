// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::quote::types::RouteSpec;
use alloy::primitives::Bytes;

/// Bytes per hop in a packed path: 3 fee bytes plus the next 20-byte token.
const HOP_LEN: usize = 23;

/// Encodes a route as a packed token/fee path for the on-chain quoter:
/// `token (20) ++ fee (3) ++ token (20) ++ fee (3) ++ ...`.
///
/// With `reverse` the route is traversed output-first, which is how the
/// quoter expects exact-output paths: it reads the desired output token up
/// front and walks back to the input.
pub fn encode_path(route: &RouteSpec, reverse: bool) -> Bytes {
    let pools = route.pools();
    let mut out = Vec::with_capacity(20 + pools.len() * HOP_LEN);

    if reverse {
        out.extend_from_slice(route.output_token().as_slice());
        for pool in pools.iter().rev() {
            out.extend_from_slice(&fee_bytes(pool.fee));
            out.extend_from_slice(pool.token_in.as_slice());
        }
    } else {
        out.extend_from_slice(route.input_token().as_slice());
        for pool in pools {
            out.extend_from_slice(&fee_bytes(pool.fee));
            out.extend_from_slice(pool.token_out.as_slice());
        }
    }

    Bytes::from(out)
}

fn fee_bytes(fee: u32) -> [u8; 3] {
    let be = fee.to_be_bytes();
    [be[1], be[2], be[3]]
}
