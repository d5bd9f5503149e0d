// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::constants;
use crate::common::error::AppError;
use crate::common::retry::RetryPolicy;
use alloy::primitives::Address;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Process-level settings for the probe binary. The library API takes
/// explicit arguments; none of this reaches the engine directly.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_debug")]
    pub debug: bool,
    #[serde(default = "default_chains")]
    pub chains: Vec<u64>,
    pub rpc_urls: Option<HashMap<String, String>>,
    pub ws_urls: Option<HashMap<String, String>>,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

fn default_debug() -> bool {
    false
}
fn default_chains() -> Vec<u64> {
    vec![constants::CHAIN_ETHEREUM]
}
fn default_metrics_port() -> u16 {
    9000
}

impl Settings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        builder = builder.add_source(Environment::default());

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        // A CHAINS env var overrides the config list, e.g. CHAINS=1,137
        if let Ok(raw) = std::env::var("CHAINS") {
            settings.chains = chains_from_env(&raw)?;
        }

        Ok(settings)
    }

    pub fn load() -> Result<Self, AppError> {
        Self::load_with_path(None)
    }

    /// RPC URL for a chain: explicit map first, then `RPC_URL_<id>` env.
    pub fn get_rpc_url(&self, chain_id: u64) -> Result<String, AppError> {
        if let Some(urls) = &self.rpc_urls {
            if let Some(url) = urls.get(&chain_id.to_string()) {
                return Ok(url.clone());
            }
        }

        let env_key = format!("RPC_URL_{}", chain_id);
        std::env::var(&env_key)
            .map_err(|_| AppError::Config(format!("No RPC URL found for chain {}", chain_id)))
    }

    pub fn get_ws_url(&self, chain_id: u64) -> Option<String> {
        if let Some(urls) = &self.ws_urls {
            if let Some(url) = urls.get(&chain_id.to_string()) {
                return Some(url.clone());
            }
        }
        std::env::var(format!("WS_URL_{}", chain_id)).ok()
    }
}

/// Comma-separated chain ids; surrounding whitespace per entry is fine.
fn chains_from_env(raw: &str) -> Result<Vec<u64>, AppError> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<u64>()
                .map_err(|_| AppError::Config(format!("CHAINS entry '{entry}' is not a chain id")))
        })
        .collect::<Result<Vec<u64>, AppError>>()?;
    if ids.is_empty() {
        return Err(AppError::Config("CHAINS is set but names no chains".into()));
    }
    Ok(ids)
}

/// Overrides applied the first time a batch is rejected for a low per-batch
/// success rate.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SuccessRateFailureOverrides {
    #[serde(default = "default_success_rate_gas_override")]
    pub gas_limit_override: u64,
    #[serde(default = "default_success_rate_chunk")]
    pub multicall_chunk: usize,
}

fn default_success_rate_gas_override() -> u64 {
    constants::DEFAULT_SUCCESS_RATE_GAS_OVERRIDE
}
fn default_success_rate_chunk() -> usize {
    constants::DEFAULT_SUCCESS_RATE_CHUNK
}

impl Default for SuccessRateFailureOverrides {
    fn default() -> Self {
        Self {
            gas_limit_override: default_success_rate_gas_override(),
            multicall_chunk: default_success_rate_chunk(),
        }
    }
}

/// Per-call options for the quote engine.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct QuoteOptions {
    /// Max inputs per aggregator call.
    #[serde(default = "default_multicall_chunk")]
    pub multicall_chunk: usize,
    /// Per-quote gas ceiling inside the aggregator.
    #[serde(default = "default_gas_limit_per_call")]
    pub gas_limit_per_call: u64,
    /// Per-batch success-rate floor in [0, 1].
    #[serde(default = "default_quote_min_success_rate")]
    pub quote_min_success_rate: f64,
    #[serde(default)]
    pub success_rate_failure_overrides: SuccessRateFailureOverrides,
    /// Decrement the pinned block by one on a repeated missing-header failure.
    #[serde(default)]
    pub rollback: bool,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub quoter_address_override: Option<Address>,
    /// Caller-pinned block; when absent the engine fetches the current block
    /// once and pins it for the whole call.
    #[serde(default)]
    pub block_number: Option<u64>,
    /// Treat two block heights differing by one as non-conflicting. Off by
    /// default; the strict policy is the supported one.
    #[serde(default)]
    pub allow_one_block_drift: bool,
}

fn default_multicall_chunk() -> usize {
    constants::DEFAULT_MULTICALL_CHUNK
}
fn default_gas_limit_per_call() -> u64 {
    constants::DEFAULT_GAS_LIMIT_PER_CALL
}
fn default_quote_min_success_rate() -> f64 {
    constants::DEFAULT_QUOTE_MIN_SUCCESS_RATE
}

impl Default for QuoteOptions {
    fn default() -> Self {
        Self {
            multicall_chunk: default_multicall_chunk(),
            gas_limit_per_call: default_gas_limit_per_call(),
            quote_min_success_rate: default_quote_min_success_rate(),
            success_rate_failure_overrides: SuccessRateFailureOverrides::default(),
            rollback: false,
            retry: RetryPolicy::default(),
            quoter_address_override: None,
            block_number: None,
            allow_one_block_drift: false,
        }
    }
}

impl QuoteOptions {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.multicall_chunk == 0 {
            return Err(AppError::Config("multicall_chunk must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.quote_min_success_rate) {
            return Err(AppError::Config(format!(
                "quote_min_success_rate {} outside [0, 1]",
                self.quote_min_success_rate
            )));
        }
        Ok(())
    }
}
