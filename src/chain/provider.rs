//! Chain provider with multi-RPC support and automatic failover

use crate::config::NetworkConfig;
use crate::error::{PortalError, PortalResult};

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Signature status as seen by the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureState {
    /// Not yet seen, or seen below the requested commitment
    Pending,
    /// Reached the requested commitment
    Landed,
    /// Executed with an error
    Failed(String),
}

/// Multi-endpoint RPC wrapper with automatic failover
pub struct ChainProvider {
    /// Network configuration
    config: NetworkConfig,
    /// RPC clients (multiple for failover)
    clients: Vec<RpcClient>,
    /// Current active client index
    current: AtomicUsize,
    /// Commitment used for reads and acknowledgement
    commitment: CommitmentConfig,
}

impl ChainProvider {
    /// Create a new chain provider
    pub fn new(config: NetworkConfig) -> PortalResult<Self> {
        let commitment = config.commitment.to_config();

        let clients: Vec<RpcClient> = config
            .rpc_urls
            .iter()
            .map(|url| {
                debug!("Added RPC endpoint: {}", url);
                RpcClient::new_with_commitment(url.clone(), commitment)
            })
            .collect();

        if clients.is_empty() {
            return Err(PortalError::Config("No RPC endpoints configured".to_string()));
        }

        info!(
            "Chain provider ready with {} endpoint(s), commitment {:?}",
            clients.len(),
            commitment.commitment
        );

        Ok(Self {
            config,
            clients,
            current: AtomicUsize::new(0),
            commitment,
        })
    }

    /// Get the active RPC client
    pub fn rpc(&self) -> &RpcClient {
        let idx = self.current.load(Ordering::Relaxed);
        &self.clients[idx % self.clients.len()]
    }

    /// URL of the active endpoint
    pub fn endpoint(&self) -> String {
        self.rpc().url()
    }

    /// Switch to next available endpoint
    pub fn failover(&self) {
        let current = self.current.load(Ordering::Relaxed);
        let next = (current + 1) % self.clients.len();
        self.current.store(next, Ordering::Relaxed);
        crate::metrics::record_rpc_failover();
        warn!("RPC failover to endpoint {} ({})", next, self.endpoint());
    }

    /// Fetch an account with failover. `Ok(None)` means the account does not exist.
    pub async fn get_account(&self, address: &Pubkey) -> PortalResult<Option<Account>> {
        for _ in 0..self.clients.len() {
            match self
                .rpc()
                .get_account_with_commitment(address, self.commitment)
                .await
            {
                Ok(response) => return Ok(response.value),
                Err(e) => {
                    warn!("Failed to fetch account {} from {}: {}", address, self.endpoint(), e);
                    self.failover();
                }
            }
        }

        Err(self.all_failed("get account"))
    }

    /// Get a recent blockhash with failover
    pub async fn latest_blockhash(&self) -> PortalResult<Hash> {
        for _ in 0..self.clients.len() {
            match self.rpc().get_latest_blockhash().await {
                Ok(hash) => return Ok(hash),
                Err(e) => {
                    warn!("Failed to get blockhash from {}: {}", self.endpoint(), e);
                    self.failover();
                }
            }
        }

        Err(self.all_failed("get latest blockhash"))
    }

    /// Current state of a signature at the provider's commitment
    pub async fn signature_state(&self, signature: &Signature) -> PortalResult<SignatureState> {
        let response = self
            .rpc()
            .get_signature_statuses(&[*signature])
            .await
            .map_err(|e| PortalError::Rpc {
                endpoint: self.endpoint(),
                message: e.to_string(),
            })?;

        let state = match response.value.into_iter().next().flatten() {
            Some(status) => match status.err {
                Some(err) => SignatureState::Failed(err.to_string()),
                None if status.satisfies_commitment(self.commitment) => SignatureState::Landed,
                None => SignatureState::Pending,
            },
            None => SignatureState::Pending,
        };

        Ok(state)
    }

    /// Broadcast a fully signed transaction with retry
    pub async fn send_transaction(&self, tx: &Transaction) -> PortalResult<Signature> {
        let mut attempts = 0;
        let max_attempts = self.config.max_retries;
        let mut last_error = None;

        while attempts < max_attempts {
            attempts += 1;

            let send_timeout = Duration::from_secs(self.config.send_timeout_secs);
            let result = timeout(send_timeout, self.rpc().send_transaction(tx)).await;

            match result {
                Ok(Ok(signature)) => {
                    info!(
                        "Transaction sent: {} (attempt {}/{})",
                        signature, attempts, max_attempts
                    );
                    return Ok(signature);
                }
                Ok(Err(e)) => {
                    let error_msg = e.to_string();

                    // Preflight rejections are deterministic; resending the same bytes won't help
                    if error_msg.contains("simulation failed")
                        || error_msg.contains("insufficient funds")
                        || error_msg.contains("Blockhash not found")
                    {
                        error!("Transaction rejected by {}: {}", self.endpoint(), error_msg);
                        return Err(PortalError::Transaction(error_msg));
                    }

                    warn!(
                        "Transaction send failed on {} (attempt {}): {}",
                        self.endpoint(),
                        attempts,
                        error_msg
                    );
                    last_error = Some(PortalError::Rpc {
                        endpoint: self.endpoint(),
                        message: error_msg,
                    });
                    self.failover();
                }
                Err(_) => {
                    warn!("Transaction send timeout (attempt {})", attempts);
                    last_error = Some(PortalError::Timeout {
                        operation: "send transaction".to_string(),
                    });
                }
            }

            // Wait before retry
            if attempts < max_attempts {
                tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
            }
        }

        Err(last_error.unwrap_or(PortalError::Transaction("Unknown error".to_string())))
    }

    /// Health check
    pub async fn health_check(&self) -> bool {
        match self.rpc().get_version().await {
            Ok(_) => true,
            Err(e) => {
                error!("Health check failed for {}: {}", self.endpoint(), e);
                false
            }
        }
    }

    fn all_failed(&self, operation: &str) -> PortalError {
        PortalError::Rpc {
            endpoint: self.endpoint(),
            message: format!("All endpoints failed to {}", operation),
        }
    }
}
