// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, U256};
use clap::Parser;
use onquote::common::constants::CHAIN_ETHEREUM;
use onquote::common::error::AppError;
use onquote::common::logging::setup_logging;
use onquote::common::metrics::serve_metrics;
use onquote::config::{QuoteOptions, Settings};
use onquote::network::aggregator::OnChainAggregator;
use onquote::network::provider::ConnectionFactory;
use onquote::quote::provider::OnChainQuoteProvider;
use onquote::quote::types::{PoolEdge, QuoteDirection, RouteSpec, TokenAmount};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "One-shot on-chain quote probe")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Chain id (overrides config)
    #[arg(long)]
    chain: Option<u64>,

    /// Input token address
    #[arg(long)]
    token_in: String,

    /// Output token address
    #[arg(long)]
    token_out: String,

    /// Pool fee tier in hundredths of a bip
    #[arg(long, default_value_t = 3000)]
    fee: u32,

    /// Comma-separated raw amounts to quote
    #[arg(long)]
    amounts: String,

    /// Decimals of the amount-side token
    #[arg(long, default_value_t = 18)]
    decimals: u8,

    /// Quote exact output instead of exact input
    #[arg(long, default_value_t = false)]
    exact_out: bool,

    /// Pin the quotes to a specific block
    #[arg(long)]
    block: Option<u64>,

    /// Serve quote metrics on the configured port while running
    #[arg(long, default_value_t = false)]
    metrics: bool,

    /// Print the result as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = Settings::load_with_path(cli.config.as_deref())?;
    setup_logging(if settings.debug { "debug" } else { "info" }, false);

    let chain_id = cli
        .chain
        .or_else(|| settings.chains.first().copied())
        .unwrap_or(CHAIN_ETHEREUM);
    let rpc_url = settings.get_rpc_url(chain_id)?;
    let ws_url = settings.get_ws_url(chain_id);
    let provider = ConnectionFactory::preferred(ws_url.as_deref(), &rpc_url).await?;

    let aggregator = Arc::new(OnChainAggregator::new(provider, chain_id)?);
    let engine = OnChainQuoteProvider::new(aggregator, chain_id);

    if cli.metrics {
        serve_metrics(settings.metrics_port, engine.metrics()).await?;
    }

    let token_in = parse_address(&cli.token_in, "token_in")?;
    let token_out = parse_address(&cli.token_out, "token_out")?;
    let route = RouteSpec::try_new(vec![PoolEdge {
        token_in,
        token_out,
        fee: cli.fee,
    }])
    .ok_or_else(|| AppError::Config("Route must have at least one pool".into()))?;

    let amount_token = if cli.exact_out { token_out } else { token_in };
    let amounts = parse_amounts(&cli.amounts, amount_token, cli.decimals)?;

    let opts = QuoteOptions {
        block_number: cli.block,
        ..QuoteOptions::default()
    };
    let direction = if cli.exact_out {
        QuoteDirection::ExactOut
    } else {
        QuoteDirection::ExactIn
    };
    let response = match direction {
        QuoteDirection::ExactIn => {
            engine
                .get_quotes_many_exact_in(&amounts, std::slice::from_ref(&route), opts)
                .await?
        }
        QuoteDirection::ExactOut => {
            engine
                .get_quotes_many_exact_out(&amounts, std::slice::from_ref(&route), opts)
                .await?
        }
    };

    if cli.json {
        let quotes: Vec<serde_json::Value> = response
            .routes_with_quotes
            .iter()
            .flat_map(|(_, records)| records.iter())
            .map(|record| match &record.quote {
                Some(quote) => serde_json::json!({
                    "amount": record.amount.raw.to_string(),
                    "quoted": quote.amount.to_string(),
                    "gas_estimate": quote.gas_estimate.to_string(),
                    "ticks_crossed": quote.initialized_ticks_crossed,
                }),
                None => serde_json::json!({
                    "amount": record.amount.raw.to_string(),
                    "quoted": serde_json::Value::Null,
                }),
            })
            .collect();
        let body = serde_json::json!({
            "block_number": response.block_number,
            "quotes": quotes,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        println!("block {}", response.block_number);
        for (_, records) in &response.routes_with_quotes {
            for record in records {
                match &record.quote {
                    Some(quote) => println!(
                        "  {} -> {} (gas est {})",
                        record.amount.raw, quote.amount, quote.gas_estimate
                    ),
                    None => println!("  {} -> no quote", record.amount.raw),
                }
            }
        }
    }

    Ok(())
}

fn parse_address(raw: &str, field: &str) -> Result<Address, AppError> {
    Address::from_str(raw).map_err(|_| AppError::Config(format!("Invalid {field}: {raw}")))
}

fn parse_amounts(raw: &str, token: Address, decimals: u8) -> Result<Vec<TokenAmount>, AppError> {
    let mut amounts = Vec::new();
    for part in raw.split(',') {
        let p = part.trim();
        if p.is_empty() {
            continue;
        }
        let value = U256::from_str(p)
            .map_err(|_| AppError::Config(format!("Invalid amount '{p}'")))?;
        amounts.push(TokenAmount::new(token, decimals, value));
    }
    if amounts.is_empty() {
        return Err(AppError::Config("No amounts given".into()));
    }
    Ok(amounts)
}
