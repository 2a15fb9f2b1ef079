//! Board program interface
//!
//! Account layout and instruction encoding for the on-chain GIF portal program.
//! The program follows Anchor conventions: every account and instruction is
//! prefixed with an 8-byte discriminator derived from a sha256 of its name,
//! followed by the borsh-encoded body.

use crate::error::{PortalError, PortalResult};

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::system_program;
use std::sync::Arc;

const DISCRIMINATOR_LEN: usize = 8;

/// Fixed program configuration threaded through the client
#[derive(Clone)]
pub struct ProgramContext {
    /// Deployed program id
    pub program_id: Pubkey,
    /// Program-owned account holding the submission list
    pub board: Arc<Keypair>,
}

impl ProgramContext {
    pub fn new(program_id: Pubkey, board: Keypair) -> Self {
        Self {
            program_id,
            board: Arc::new(board),
        }
    }

    /// Address of the board account
    pub fn board_address(&self) -> Pubkey {
        self.board.pubkey()
    }
}

/// One submitted link as stored on chain
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ItemStruct {
    pub id: u64,
    pub gif_link: String,
    pub user_address: [u8; 32],
    pub votes: u64,
}

impl ItemStruct {
    pub fn submitter(&self) -> Pubkey {
        Pubkey::new_from_array(self.user_address)
    }
}

/// Board account state
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BoardAccount {
    pub total_gifs: u64,
    pub gif_list: Vec<ItemStruct>,
}

impl BoardAccount {
    /// Decode raw account data. Bytes past the encoded body are the unused
    /// tail of the allocated account space and are ignored.
    pub fn decode(data: &[u8]) -> PortalResult<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(PortalError::AccountDecode(format!(
                "account data too short: {} bytes",
                data.len()
            )));
        }

        let (discriminator, mut body) = data.split_at(DISCRIMINATOR_LEN);
        if discriminator != account_discriminator("BaseAccount") {
            return Err(PortalError::AccountDecode(
                "account discriminator mismatch".to_string(),
            ));
        }

        BoardAccount::deserialize(&mut body).map_err(|e| PortalError::AccountDecode(e.to_string()))
    }

    /// Encode as account data
    #[cfg(test)]
    pub fn encode(&self) -> PortalResult<Vec<u8>> {
        let mut data = account_discriminator("BaseAccount").to_vec();
        self.serialize(&mut data)
            .map_err(|e| PortalError::Internal(e.to_string()))?;
        Ok(data)
    }
}

/// Instructions understood by the board program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalInstruction {
    /// Create the board account (one-time)
    StartStuffOff,
    /// Append a link to the board
    AddGif { gif_link: String },
    /// Add one vote to a submission
    UpvoteGif { id: u64 },
}

impl PortalInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            PortalInstruction::StartStuffOff => "start_stuff_off",
            PortalInstruction::AddGif { .. } => "add_gif",
            PortalInstruction::UpvoteGif { .. } => "upvote_gif",
        }
    }

    /// Instruction data: discriminator followed by borsh args
    pub fn data(&self) -> PortalResult<Vec<u8>> {
        let mut data = instruction_discriminator(self.name()).to_vec();
        let encoded = match self {
            PortalInstruction::StartStuffOff => Ok(()),
            PortalInstruction::AddGif { gif_link } => gif_link.serialize(&mut data),
            PortalInstruction::UpvoteGif { id } => id.serialize(&mut data),
        };
        encoded.map_err(|e| PortalError::Internal(e.to_string()))?;
        Ok(data)
    }

    /// Build the instruction with its named accounts
    pub fn to_instruction(&self, ctx: &ProgramContext, user: Pubkey) -> PortalResult<Instruction> {
        let board = ctx.board_address();
        let accounts = match self {
            PortalInstruction::StartStuffOff => vec![
                AccountMeta::new(board, true),
                AccountMeta::new(user, true),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            PortalInstruction::AddGif { .. } => vec![
                AccountMeta::new(board, false),
                AccountMeta::new(user, true),
            ],
            PortalInstruction::UpvoteGif { .. } => vec![
                AccountMeta::new(board, false),
                AccountMeta::new_readonly(user, true),
            ],
        };

        Ok(Instruction::new_with_bytes(
            ctx.program_id,
            &self.data()?,
            accounts,
        ))
    }
}

fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    discriminator("account", name)
}

fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    discriminator("global", name)
}

fn discriminator(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let hash = Sha256::digest(format!("{}:{}", namespace, name).as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    out
}
