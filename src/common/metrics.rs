// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>


use crate::common::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

/// Counters for the quote engine. Retry counters are bumped at most once per
/// call per failure kind; totals accumulate across calls.
#[derive(Debug, Default)]
pub struct QuoteMetrics {
    block_conflict_error_retry: AtomicU64,
    block_header_not_found_retry: AtomicU64,
    timeout_retry: AtomicU64,
    out_of_gas_exception_retry: AtomicU64,
    success_rate_retry: AtomicU64,
    unknown_reason_retry: AtomicU64,
    approx_gas_used_per_successful_call: AtomicU64,
    num_retry_loops: AtomicU64,
    total_calls_to_provider: AtomicU64,
    expected_calls_to_provider: AtomicU64,
    num_retried_calls: AtomicU64,
}

impl QuoteMetrics {
    pub fn count_block_conflict_retry(&self) {
        self.block_conflict_error_retry.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_block_header_not_found_retry(&self) {
        self.block_header_not_found_retry
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_timeout_retry(&self) {
        self.timeout_retry.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_out_of_gas_retry(&self) {
        self.out_of_gas_exception_retry
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_success_rate_retry(&self) {
        self.success_rate_retry.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_unknown_retry(&self) {
        self.unknown_reason_retry.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_approx_gas_used_per_successful_call(&self, gas: u64) {
        self.approx_gas_used_per_successful_call
            .store(gas, Ordering::Relaxed);
    }

    pub fn add_retry_loops(&self, n: u64) {
        self.num_retry_loops.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_total_calls(&self, n: u64) {
        self.total_calls_to_provider.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_expected_calls(&self, n: u64) {
        self.expected_calls_to_provider
            .fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_retried_calls(&self, n: u64) {
        self.num_retried_calls.fetch_add(n, Ordering::Relaxed);
    }

    pub fn total_calls(&self) -> u64 {
        self.total_calls_to_provider.load(Ordering::Relaxed)
    }

    pub fn expected_calls(&self) -> u64 {
        self.expected_calls_to_provider.load(Ordering::Relaxed)
    }

    pub fn retry_count(&self, name: &str) -> u64 {
        match name {
            "block_conflict" => self.block_conflict_error_retry.load(Ordering::Relaxed),
            "block_header" => self.block_header_not_found_retry.load(Ordering::Relaxed),
            "timeout" => self.timeout_retry.load(Ordering::Relaxed),
            "out_of_gas" => self.out_of_gas_exception_retry.load(Ordering::Relaxed),
            "success_rate" => self.success_rate_retry.load(Ordering::Relaxed),
            "unknown" => self.unknown_reason_retry.load(Ordering::Relaxed),
            _ => 0,
        }
    }

    pub fn render(&self) -> String {
        format!(
            concat!(
                "# TYPE quote_block_conflict_error_retry counter\nquote_block_conflict_error_retry {}\n",
                "# TYPE quote_block_header_not_found_retry counter\nquote_block_header_not_found_retry {}\n",
                "# TYPE quote_timeout_retry counter\nquote_timeout_retry {}\n",
                "# TYPE quote_out_of_gas_exception_retry counter\nquote_out_of_gas_exception_retry {}\n",
                "# TYPE quote_success_rate_retry counter\nquote_success_rate_retry {}\n",
                "# TYPE quote_unknown_reason_retry counter\nquote_unknown_reason_retry {}\n",
                "# TYPE quote_approx_gas_used_per_successful_call gauge\nquote_approx_gas_used_per_successful_call {}\n",
                "# TYPE quote_num_retry_loops counter\nquote_num_retry_loops {}\n",
                "# TYPE quote_total_calls_to_provider counter\nquote_total_calls_to_provider {}\n",
                "# TYPE quote_expected_calls_to_provider counter\nquote_expected_calls_to_provider {}\n",
                "# TYPE quote_num_retried_calls counter\nquote_num_retried_calls {}\n"
            ),
            self.block_conflict_error_retry.load(Ordering::Relaxed),
            self.block_header_not_found_retry.load(Ordering::Relaxed),
            self.timeout_retry.load(Ordering::Relaxed),
            self.out_of_gas_exception_retry.load(Ordering::Relaxed),
            self.success_rate_retry.load(Ordering::Relaxed),
            self.unknown_reason_retry.load(Ordering::Relaxed),
            self.approx_gas_used_per_successful_call
                .load(Ordering::Relaxed),
            self.num_retry_loops.load(Ordering::Relaxed),
            self.total_calls_to_provider.load(Ordering::Relaxed),
            self.expected_calls_to_provider.load(Ordering::Relaxed),
            self.num_retried_calls.load(Ordering::Relaxed),
        )
    }
}

/// Serves the current counter values as plaintext, one snapshot per
/// connection. Binds before returning; the accept loop runs for the rest of
/// the process lifetime.
pub async fn serve_metrics(port: u16, metrics: Arc<QuoteMetrics>) -> Result<SocketAddr, AppError> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| AppError::Connection(format!("metrics bind on port {port}: {e}")))?;
    let bound = listener
        .local_addr()
        .map_err(|e| AppError::Connection(format!("metrics local addr: {e}")))?;
    tracing::info!(target: "metrics", %bound, "Serving quote metrics");

    tokio::spawn(async move {
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::debug!(target: "metrics", error = %e, "Metrics accept failed");
                    continue;
                }
            };
            let snapshot = metrics.render();
            tokio::spawn(async move {
                if let Err(e) = reply_plaintext(stream, &snapshot).await {
                    tracing::debug!(target: "metrics", %peer, error = %e, "Metrics reply dropped");
                }
            });
        }
    });

    Ok(bound)
}

async fn reply_plaintext(mut stream: TcpStream, body: &str) -> std::io::Result<()> {
    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; version=0.0.4\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(header.as_bytes()).await?;
    stream.write_all(body.as_bytes()).await?;
    stream.shutdown().await
}
