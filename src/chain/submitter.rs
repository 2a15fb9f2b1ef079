//! Program instruction submitter
//!
//! Wraps an instruction in a transaction, adds the extra signers, hands it to
//! the wallet for the fee payer's signature and broadcast, and waits for the
//! configured commitment.

use super::{ChainProvider, ConfirmationTracker, InstructionRequest, TransactionSubmission};
use crate::error::{PortalError, PortalResult};
use crate::wallet::WalletProvider;

use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use tracing::{debug, info};

/// Transaction submission through the connected wallet
pub struct ProgramSubmitter {
    /// Chain provider
    provider: Arc<ChainProvider>,
    /// Wallet for the fee payer signature
    wallet: Arc<dyn WalletProvider>,
    /// Confirmation tracker
    confirmations: ConfirmationTracker,
}

impl ProgramSubmitter {
    /// Create a new submitter
    pub fn new(
        provider: Arc<ChainProvider>,
        wallet: Arc<dyn WalletProvider>,
        confirmations: ConfirmationTracker,
    ) -> Self {
        Self {
            provider,
            wallet,
            confirmations,
        }
    }
}

/// Wrap the instruction in a transaction paid by `fee_payer` and sign it with
/// the extra signers. The fee payer's slot is left for the wallet.
pub fn build_transaction(
    request: &InstructionRequest,
    blockhash: Hash,
) -> PortalResult<Transaction> {
    let message = Message::new_with_blockhash(
        &[request.instruction.clone()],
        Some(&request.fee_payer),
        &blockhash,
    );
    let mut tx = Transaction::new_unsigned(message);

    for signer in &request.signers {
        tx.try_partial_sign(&[signer.as_ref()], blockhash)
            .map_err(|e| PortalError::Transaction(format!("Failed to co-sign: {}", e)))?;
    }
    debug!(
        "Built transaction with {} co-signer(s), blockhash {}",
        request.signers.len(),
        blockhash
    );

    Ok(tx)
}

#[async_trait]
impl TransactionSubmission for ProgramSubmitter {
    async fn submit(&self, request: InstructionRequest) -> PortalResult<Signature> {
        let blockhash = self.provider.latest_blockhash().await?;
        let tx = build_transaction(&request, blockhash)?;

        let signature = self.wallet.sign_and_send(tx).await?;
        info!("Submitted transaction {}, awaiting acknowledgement", signature);

        self.confirmations.wait_for(&signature).await?;
        Ok(signature)
    }

    async fn latest_blockhash(&self) -> PortalResult<Hash> {
        self.provider.latest_blockhash().await
    }

    async fn confirm_transaction(&self, signature: Signature) -> PortalResult<()> {
        self.confirmations.wait_for(&signature).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{PortalInstruction, ProgramContext};
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;

    #[test]
    fn test_initialize_is_cosigned_by_board_and_left_for_wallet() {
        let ctx = ProgramContext::new(Pubkey::new_unique(), Keypair::new());
        let user = Keypair::new();
        let request = InstructionRequest {
            instruction: PortalInstruction::StartStuffOff
                .to_instruction(&ctx, user.pubkey())
                .unwrap(),
            fee_payer: user.pubkey(),
            signers: vec![ctx.board.clone()],
        };
        let blockhash = Hash::new_unique();

        let mut tx = build_transaction(&request, blockhash).unwrap();

        let keys = &tx.message.account_keys;
        assert_eq!(tx.message.header.num_required_signatures, 2);
        assert_eq!(keys[0], user.pubkey());
        assert_eq!(tx.message.recent_blockhash, blockhash);

        let board_slot = keys
            .iter()
            .position(|k| *k == ctx.board_address())
            .unwrap();
        assert!(board_slot < 2);
        assert_ne!(tx.signatures[board_slot], Signature::default());
        assert_eq!(tx.signatures[0], Signature::default());
        assert!(!tx.is_signed());

        tx.try_partial_sign(&[&user], blockhash).unwrap();
        assert!(tx.is_signed());
        assert!(tx.verify().is_ok());
    }

    #[test]
    fn test_foreign_cosigner_is_rejected() {
        let ctx = ProgramContext::new(Pubkey::new_unique(), Keypair::new());
        let user = Pubkey::new_unique();
        let request = InstructionRequest {
            instruction: PortalInstruction::UpvoteGif { id: 1 }
                .to_instruction(&ctx, user)
                .unwrap(),
            fee_payer: user,
            signers: vec![std::sync::Arc::new(Keypair::new())],
        };

        assert!(matches!(
            build_transaction(&request, Hash::new_unique()),
            Err(PortalError::Transaction(_))
        ));
    }
}
