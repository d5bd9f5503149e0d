// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::constants::FAILED_QUOTE_LOG_CHUNK;
use crate::common::error::AppError;
use crate::quote::types::{
    CallOutcome, QuoteRecord, QuoteResponse, RouteQuotes, RouteSpec, TokenAmount,
};

/// Reconstructs per-(route, amount) quote records from the flat positional
/// outcome vector. The planner emitted inputs route-major and amount-minor,
/// so the flat vector slices into `|routes|` runs of `|amounts|`.
pub fn assemble(
    routes: &[RouteSpec],
    amounts: &[TokenAmount],
    outcomes: Vec<CallOutcome>,
    block_number: u64,
) -> Result<QuoteResponse, AppError> {
    let expected = routes.len() * amounts.len();
    if outcomes.len() != expected {
        return Err(AppError::Invariant(format!(
            "flat outcome vector has {} entries, expected {} ({} routes x {} amounts)",
            outcomes.len(),
            expected,
            routes.len(),
            amounts.len()
        )));
    }

    let mut routes_with_quotes: Vec<RouteQuotes> = Vec::with_capacity(routes.len());
    for (route, slice) in routes.iter().zip(outcomes.chunks(amounts.len())) {
        let mut records = Vec::with_capacity(amounts.len());
        let mut failed_labels: Vec<String> = Vec::new();

        for (idx, (amount, outcome)) in amounts.iter().zip(slice.iter()).enumerate() {
            if outcome.success && outcome.data.is_some() {
                records.push(QuoteRecord {
                    amount: *amount,
                    quote: outcome.data.clone(),
                });
            } else {
                let percent = (100.0 / amounts.len() as f64) * (idx + 1) as f64;
                failed_labels.push(format!("{percent}% ({})", amount.raw));
                records.push(QuoteRecord {
                    amount: *amount,
                    quote: None,
                });
            }
        }

        if !failed_labels.is_empty() {
            for group in failed_labels.chunks(FAILED_QUOTE_LOG_CHUNK) {
                tracing::debug!(
                    target: "quote",
                    route = %route_label(route),
                    failed = %group.join(", "),
                    "Quoter returned no quote for some amounts"
                );
            }
        }

        routes_with_quotes.push((route.clone(), records));
    }

    Ok(QuoteResponse {
        routes_with_quotes,
        block_number,
    })
}

fn route_label(route: &RouteSpec) -> String {
    format!(
        "{:#x} -> {:#x} ({} pools)",
        route.input_token(),
        route.output_token(),
        route.pools().len()
    )
}
