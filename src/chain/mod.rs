//! Chain module - the portal's view of the Solana cluster
//!
//! This module provides:
//! - Multi-endpoint RPC access with automatic failover
//! - Board account queries
//! - Program instruction submission and signature confirmation

pub mod confirmation;
pub mod provider;
pub mod submitter;

pub use confirmation::ConfirmationTracker;
pub use provider::ChainProvider;
pub use submitter::ProgramSubmitter;

use crate::error::{PortalError, PortalResult};
use crate::program::BoardAccount;

use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use std::sync::Arc;
use tracing::debug;

/// Read access to the board account
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Fetch and decode the board. A missing account is `PortalError::AccountNotFound`.
    async fn fetch_board(&self, address: Pubkey) -> PortalResult<BoardAccount>;
}

/// A program instruction ready for submission
#[derive(Debug, Clone)]
pub struct InstructionRequest {
    /// Instruction with its named accounts
    pub instruction: Instruction,
    /// Connected wallet paying the fee
    pub fee_payer: Pubkey,
    /// Signers besides the wallet
    pub signers: Vec<Arc<Keypair>>,
}

/// Builds, broadcasts and confirms transactions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionSubmission: Send + Sync {
    /// Submit an instruction and return once the cluster acknowledged it
    async fn submit(&self, request: InstructionRequest) -> PortalResult<Signature>;

    /// Recent blockhash for building transactions elsewhere
    async fn latest_blockhash(&self) -> PortalResult<Hash>;

    /// Wait until a signature is confirmed
    async fn confirm_transaction(&self, signature: Signature) -> PortalResult<()>;
}

#[async_trait]
impl AccountQuery for ChainProvider {
    async fn fetch_board(&self, address: Pubkey) -> PortalResult<BoardAccount> {
        let account = self
            .get_account(&address)
            .await?
            .ok_or_else(|| PortalError::AccountNotFound {
                address: address.to_string(),
            })?;

        debug!(
            "Fetched board {} ({} bytes, owner {})",
            address,
            account.data.len(),
            account.owner
        );

        BoardAccount::decode(&account.data)
    }
}
