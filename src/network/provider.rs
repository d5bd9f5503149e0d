// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use alloy::network::Ethereum;
use alloy::providers::RootProvider;
use url::Url;

pub type HttpProvider = RootProvider<Ethereum>;
pub type WsProvider = RootProvider<Ethereum>;

pub struct ConnectionFactory;

impl ConnectionFactory {
    /// Try WS first and fall back to HTTP. Quotes are plain calls, so HTTP
    /// alone is fully functional.
    pub async fn preferred(ws_url: Option<&str>, rpc_url: &str) -> Result<HttpProvider, AppError> {
        if let Some(ws_url) = ws_url {
            match Self::ws(ws_url).await {
                Ok(ws_provider) => {
                    tracing::info!(target: "rpc", %ws_url, "Using WS provider (preferred)");
                    return Ok(ws_provider);
                }
                Err(e) => {
                    tracing::warn!(
                        target: "rpc",
                        %ws_url,
                        error = %e,
                        "WS connection failed; falling back to HTTP"
                    );
                }
            }
        }

        let http_provider = Self::http(rpc_url)?;
        tracing::debug!(target: "rpc", rpc_url, "Using HTTP provider");
        Ok(http_provider)
    }

    pub fn http(rpc_url: &str) -> Result<HttpProvider, AppError> {
        let url =
            Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;

        let provider = RootProvider::new_http(url);
        Ok(provider)
    }

    pub async fn ws(ws_url: &str) -> Result<WsProvider, AppError> {
        let provider = RootProvider::connect(ws_url)
            .await
            .map_err(|e| AppError::Connection(format!("WS Connection failed: {}", e)))?;

        Ok(provider)
    }
}
