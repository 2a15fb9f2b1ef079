//! Wallet provider
//!
//! The portal never holds user key material itself; it asks a wallet to
//! connect and to sign-and-send. `KeypairWallet` is the local implementation
//! backed by a Solana CLI keypair file or an environment variable.

use crate::chain::ChainProvider;
use crate::config::WalletConfig;
use crate::error::{PortalError, PortalResult};

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Holder of user key material
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Connect and return the wallet's public key
    async fn connect(&self) -> PortalResult<Pubkey>;

    /// Add the wallet signature to a (possibly partially signed) transaction and broadcast it
    async fn sign_and_send(&self, tx: Transaction) -> PortalResult<Signature>;
}

/// Wallet backed by a local keypair
pub struct KeypairWallet {
    config: WalletConfig,
    provider: Arc<ChainProvider>,
    keypair: RwLock<Option<Arc<Keypair>>>,
}

impl KeypairWallet {
    pub fn new(config: WalletConfig, provider: Arc<ChainProvider>) -> Self {
        Self {
            config,
            provider,
            keypair: RwLock::new(None),
        }
    }

    /// Load wallet from environment or keypair file
    fn load_keypair(&self) -> PortalResult<Keypair> {
        // Environment variable first, as a JSON byte array like the CLI file format
        if let Some(var) = &self.config.keypair_env {
            if let Ok(raw) = std::env::var(var) {
                debug!("Loading wallet from ${}", var);
                return keypair_from_json(&raw);
            }
        }

        let path = Path::new(&self.config.keypair_path);
        if !path.exists() {
            return Err(PortalError::WalletUnavailable {
                location: self.config.keypair_path.clone(),
            });
        }

        read_keypair_file(path).map_err(|e| {
            PortalError::Wallet(format!(
                "Invalid keypair file {}: {}",
                self.config.keypair_path, e
            ))
        })
    }
}

#[async_trait]
impl WalletProvider for KeypairWallet {
    async fn connect(&self) -> PortalResult<Pubkey> {
        let keypair = Arc::new(self.load_keypair()?);
        let pubkey = keypair.pubkey();
        *self.keypair.write().await = Some(keypair);

        info!("Wallet connected: {}", pubkey);
        Ok(pubkey)
    }

    async fn sign_and_send(&self, mut tx: Transaction) -> PortalResult<Signature> {
        let keypair = self
            .keypair
            .read()
            .await
            .clone()
            .ok_or(PortalError::NotConnected)?;

        let blockhash = tx.message.recent_blockhash;
        tx.try_partial_sign(&[keypair.as_ref()], blockhash)
            .map_err(|e| PortalError::Wallet(format!("Failed to sign transaction: {}", e)))?;

        if !tx.is_signed() {
            return Err(PortalError::Wallet(
                "Transaction is missing required signatures".to_string(),
            ));
        }

        self.provider.send_transaction(&tx).await
    }
}

/// Parse a keypair from a JSON array of 64 bytes
pub fn keypair_from_json(raw: &str) -> PortalResult<Keypair> {
    let bytes: Vec<u8> = serde_json::from_str(raw.trim())
        .map_err(|e| PortalError::Wallet(format!("Invalid keypair JSON: {}", e)))?;

    Keypair::from_bytes(&bytes)
        .map_err(|e| PortalError::Wallet(format!("Invalid keypair bytes: {}", e)))
}
