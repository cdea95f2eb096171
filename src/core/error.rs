//! Error types for the alert engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dispatch failed after {delivered}/{total} chunks: {reason}")]
    Dispatch {
        delivered: usize,
        total: usize,
        reason: String,
    },

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type AlertResult<T> = Result<T, AlertError>;

impl AlertError {
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for failures raised while acquiring a snapshot
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(self, Self::Data(_) | Self::Network(_))
    }
}

impl From<serde_json::Error> for AlertError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<csv::Error> for AlertError {
    fn from(e: csv::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
