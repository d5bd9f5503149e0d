// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed to endpoint: {0}")]
    Connection(String),

    #[error("Provider call failed: {0}")]
    Provider(String),

    #[error("No quoter contract known for chain {0}")]
    MissingQuoter(u64),

    #[error("Unable to fetch quotes after {attempts} attempts: [{kinds}]")]
    QuoteBatch { attempts: u32, kinds: String },

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Quote fetch cancelled")]
    Cancelled,

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
