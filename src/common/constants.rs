// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, address};

// =============================================================================
// NETWORK CONSTANTS
// =============================================================================

pub const CHAIN_ETHEREUM: u64 = 1;
pub const CHAIN_OPTIMISM: u64 = 10;
pub const CHAIN_BSC: u64 = 56;
pub const CHAIN_POLYGON: u64 = 137;
pub const CHAIN_BASE: u64 = 8453;
pub const CHAIN_ARBITRUM: u64 = 42161;

/// View-quoter (QuoterV2) deployment for a chain, if one is known.
pub fn quoter_address(chain_id: u64) -> Option<Address> {
    match chain_id {
        CHAIN_ETHEREUM | CHAIN_OPTIMISM | CHAIN_POLYGON | CHAIN_ARBITRUM => {
            Some(address!("61fFE014bA17989E743c5F6cB21bF9697530B21e"))
        }
        CHAIN_BSC => Some(address!("78D78E420Da98ad378D7799bE8f4AF69033EB077")),
        CHAIN_BASE => Some(address!("3d4e44Eb1374240CE5F1B871ab261CD16335B76a")),
        _ => None,
    }
}

/// Gas-metering multicall aggregator deployment for a chain.
pub fn multicall_address(chain_id: u64) -> Option<Address> {
    match chain_id {
        CHAIN_ETHEREUM | CHAIN_OPTIMISM | CHAIN_POLYGON | CHAIN_ARBITRUM => {
            Some(address!("1F98415757620B543A52E61c46B32eB19261F984"))
        }
        CHAIN_BSC => Some(address!("963Df249eD09c358A4819E39d9Cd5736c3087184")),
        CHAIN_BASE => Some(address!("091e99cb1C49331a94dD62755D168E941AbD0693")),
        _ => None,
    }
}

// =============================================================================
// QUOTE BATCHING CONSTANTS
// =============================================================================

pub const DEFAULT_MULTICALL_CHUNK: usize = 210;
pub const DEFAULT_GAS_LIMIT_PER_CALL: u64 = 1_500_000;
pub const DEFAULT_QUOTE_MIN_SUCCESS_RATE: f64 = 0.2;

pub const DEFAULT_SUCCESS_RATE_GAS_OVERRIDE: u64 = 1_300_000;
pub const DEFAULT_SUCCESS_RATE_CHUNK: usize = 110;

// Applied when the provider reports gas exhaustion: tighter cap, smaller chunks.
pub const OUT_OF_GAS_GAS_LIMIT: u64 = 1_000_000;
pub const OUT_OF_GAS_CHUNK: usize = 140;

pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_MIN_TIMEOUT_MS: u64 = 25;
pub const DEFAULT_RETRY_MAX_TIMEOUT_MS: u64 = 250;

/// Provider error messages routinely embed full calldata; cap what we keep.
pub const PROVIDER_ERROR_TRUNCATE: usize = 500;

/// Failed per-input quotes are debug-logged in groups of this size.
pub const FAILED_QUOTE_LOG_CHUNK: usize = 80;
