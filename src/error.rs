//! Error types for the GIF portal client

use crate::portal::validate::LinkRejection;
use thiserror::Error;

/// Main error type for the portal client
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No wallet found at {location}")]
    WalletUnavailable { location: String },

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Another transaction is still in flight")]
    Busy,

    #[error("Invalid link: {0}")]
    InvalidLink(#[from] LinkRejection),

    #[error("Submission {id} not found")]
    SubmissionNotFound { id: u64 },

    #[error("RPC error on {endpoint}: {message}")]
    Rpc { endpoint: String, message: String },

    #[error("Board account {address} does not exist")]
    AccountNotFound { address: String },

    #[error("Failed to decode board account: {0}")]
    AccountDecode(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Timeout waiting for {operation}")]
    Timeout { operation: String },

    #[error("Transaction {signature} failed on chain: {reason}")]
    TransactionFailed { signature: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortalError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, PortalError::Rpc { .. } | PortalError::Timeout { .. })
    }

    /// Errors the user can fix on their side without anything having gone wrong
    /// on the network.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            PortalError::WalletUnavailable { .. }
                | PortalError::NotConnected
                | PortalError::Busy
                | PortalError::InvalidLink(_)
                | PortalError::SubmissionNotFound { .. }
        )
    }
}

/// Result type for portal operations
pub type PortalResult<T> = Result<T, PortalError>;
