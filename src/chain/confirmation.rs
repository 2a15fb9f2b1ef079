//! Confirmation tracking for submitted signatures
//!
//! A broadcast only means an RPC node accepted the transaction. Callers that
//! need to know it landed wait here until the signature reaches the configured
//! commitment, fails on chain, or the wait times out.

use super::provider::{ChainProvider, SignatureState};
use crate::error::{PortalError, PortalResult};

use solana_sdk::signature::Signature;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Waits for signatures to land
pub struct ConfirmationTracker {
    /// Chain provider
    provider: Arc<ChainProvider>,
    /// Upper bound on a single wait
    max_wait: Duration,
    /// Delay between status polls
    poll_every: Duration,
}

impl ConfirmationTracker {
    /// Create a new confirmation tracker
    pub fn new(provider: Arc<ChainProvider>, max_wait: Duration, poll_every: Duration) -> Self {
        Self {
            provider,
            max_wait,
            poll_every,
        }
    }

    /// Wait until the signature reaches the provider's commitment
    pub async fn wait_for(&self, signature: &Signature) -> PortalResult<()> {
        let started = std::time::Instant::now();

        let outcome = timeout(self.max_wait, self.poll(signature)).await;

        match outcome {
            Ok(Ok(())) => {
                info!(
                    "Transaction {} confirmed after {:?}",
                    signature,
                    started.elapsed()
                );
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!(
                    "Transaction {} not confirmed within {:?}",
                    signature, self.max_wait
                );
                Err(PortalError::Timeout {
                    operation: format!("confirmation of {}", signature),
                })
            }
        }
    }

    async fn poll(&self, signature: &Signature) -> PortalResult<()> {
        let mut ticker = interval(self.poll_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.provider.signature_state(signature).await {
                Ok(SignatureState::Landed) => return Ok(()),
                Ok(SignatureState::Failed(reason)) => {
                    return Err(PortalError::TransactionFailed {
                        signature: signature.to_string(),
                        reason,
                    })
                }
                Ok(SignatureState::Pending) => {
                    debug!("Transaction {} still pending", signature);
                }
                // Read-only lookup; keep polling on the next endpoint
                Err(e) => {
                    warn!("Status lookup for {} failed: {}", signature, e);
                    self.provider.failover();
                }
            }
        }
    }
}
