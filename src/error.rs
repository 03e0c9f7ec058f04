//! Error types for the wallet client

use std::path::PathBuf;

use ic_agent::AgentError;
use ic_utils::canister::CanisterBuilderError;
use thiserror::Error;

use crate::types::TransferError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Failed to persist identity to {}: {source}", path.display())]
    PersistIdentity {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Canister error: {0}")]
    Canister(#[from] CanisterBuilderError),

    #[error("Transfer rejected by ledger: {0}")]
    Transfer(TransferError),

    #[error("Index canister error: {0}")]
    Index(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
