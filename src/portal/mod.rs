//! Portal client - turns user actions into wallet and program calls
//!
//! Every action catches its own failures and reports them through the
//! session status; nothing propagates past the action boundary. Mutating
//! actions share a single in-flight slot: while one is running, the others
//! are turned away instead of racing it.

pub mod state;
pub mod validate;
pub mod view;

use crate::chain::{AccountQuery, InstructionRequest, TransactionSubmission};
use crate::config::PortalConfig;
use crate::error::{PortalError, PortalResult};
use crate::program::{PortalInstruction, ProgramContext};
use crate::wallet::WalletProvider;

use state::{Action, InFlightOperation, SessionState, Severity, Status, SubmissionList};
use validate::{validate_link, LinkPolicy, LinkRejection};
use view::PortalView;

use chrono::Utc;
use serde::Serialize;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// How an action ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Succeeded,
    /// Turned away before any transaction was sent
    Rejected,
    Failed,
}

impl ActionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionOutcome::Succeeded => "succeeded",
            ActionOutcome::Rejected => "rejected",
            ActionOutcome::Failed => "failed",
        }
    }
}

/// Client orchestrator for one wallet session
pub struct PortalClient {
    /// Program id and board keypair
    program: ProgramContext,
    /// Allow-lists for submitted links
    policy: LinkPolicy,
    /// Substring a cached link must contain to be listed
    host_marker: String,
    /// Lamports sent per tip
    tip_lamports: u64,
    wallet: Arc<dyn WalletProvider>,
    query: Arc<dyn AccountQuery>,
    submitter: Arc<dyn TransactionSubmission>,
    /// Session state, observable by renderers
    state: watch::Sender<SessionState>,
    /// Single in-flight slot for mutating actions
    slot: Mutex<()>,
}

/// Holds the in-flight slot; clears the busy flag when dropped
struct InFlightGuard<'a> {
    state: &'a watch::Sender<SessionState>,
    operation: InFlightOperation,
    _slot: MutexGuard<'a, ()>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.in_flight = None);
        debug!(
            "Released in-flight slot {} ({})",
            self.operation.id,
            self.operation.action.as_str()
        );
    }
}

impl PortalClient {
    /// Create a new portal client
    pub fn new(
        program: ProgramContext,
        config: &PortalConfig,
        wallet: Arc<dyn WalletProvider>,
        query: Arc<dyn AccountQuery>,
        submitter: Arc<dyn TransactionSubmission>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());

        Self {
            program,
            policy: LinkPolicy::from_config(config),
            host_marker: config.list_host_marker.clone(),
            tip_lamports: config.tip_lamports,
            wallet,
            query,
            submitter,
            state,
            slot: Mutex::new(()),
        }
    }

    /// Current session state
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to session state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Rendered page for the current state
    pub fn view(&self) -> PortalView {
        view::render(&self.state.borrow())
    }

    /// Replace the pending input (the text field's change handler)
    pub fn update_input(&self, value: impl Into<String>) {
        let value = value.into();
        self.state.send_modify(|s| s.pending_input = value);
    }

    /// Connect the wallet, then load the board
    pub async fn connect(&self) -> ActionOutcome {
        self.track("connect", async {
            match self.wallet.connect().await {
                Ok(address) => {
                    info!("Connected with public key: {}", address);
                    self.state.send_modify(|s| s.wallet = Some(address));
                    self.refresh_list().await;
                    ActionOutcome::Succeeded
                }
                Err(PortalError::WalletUnavailable { location }) => {
                    warn!("No wallet found at {}", location);
                    self.set_status(
                        Severity::Warning,
                        format!(
                            "Wallet not found at {}! Create one with `solana-keygen new` to continue.",
                            location
                        ),
                    );
                    ActionOutcome::Rejected
                }
                Err(e) => {
                    error!("Failed to connect wallet: {}", e);
                    self.set_status(Severity::Danger, "Failed to connect wallet. Please try again.");
                    ActionOutcome::Failed
                }
            }
        })
        .await
    }

    /// Re-fetch the board and replace the cached list. Any failure leaves the
    /// list uninitialized so the page offers the one-time initialization.
    pub async fn refresh_list(&self) -> ActionOutcome {
        let board_address = self.program.board_address();

        match self.query.fetch_board(board_address).await {
            Ok(board) => {
                let fetched = board.gif_list.len();
                let list = SubmissionList::from_board(board.gif_list, &self.host_marker);
                if let SubmissionList::Loaded(items) = &list {
                    debug!("Board has {} entries, {} listed", fetched, items.len());
                    crate::metrics::record_submissions(items.len());
                }
                crate::metrics::record_refresh("loaded");

                self.state.send_modify(|s| s.submissions = list);
                ActionOutcome::Succeeded
            }
            Err(e) => {
                match &e {
                    PortalError::AccountNotFound { address } => {
                        info!("Board account {} has not been created yet", address);
                        crate::metrics::record_refresh("not_found");
                    }
                    other => {
                        warn!("Failed to fetch board {}: {}", board_address, other);
                        crate::metrics::record_refresh("error");
                    }
                }

                self.state
                    .send_modify(|s| s.submissions = SubmissionList::Uninitialized);
                ActionOutcome::Failed
            }
        }
    }

    /// Create the board account, signed by the user and the board keypair.
    /// Transaction failures are logged only.
    pub async fn initialize_account(&self) -> ActionOutcome {
        self.track(Action::InitializeBoard.as_str(), async {
            let user = match self.require_wallet() {
                Ok(user) => user,
                Err(e) => return self.reject(e),
            };
            let _guard = match self.begin(Action::InitializeBoard) {
                Ok(guard) => guard,
                Err(e) => return self.reject(e),
            };

            let board = self.program.board.clone();
            match self
                .send_instruction(PortalInstruction::StartStuffOff, user, vec![board])
                .await
            {
                Ok(signature) => {
                    info!(
                        "Created board account {} ({})",
                        self.program.board_address(),
                        signature
                    );
                    self.refresh_list().await;
                    ActionOutcome::Succeeded
                }
                Err(e) => {
                    error!("Error creating board account: {}", e);
                    ActionOutcome::Failed
                }
            }
        })
        .await
    }

    /// Submit a link to the board
    pub async fn submit_link(&self, link: impl Into<String>) -> ActionOutcome {
        let link = link.into();

        self.track(Action::SubmitLink.as_str(), async {
            self.update_input(link.clone());

            if let Err(rejection) = validate_link(&link, &self.policy) {
                debug!("Rejected link {:?}: {}", link, rejection);
                return self.reject(rejection.into());
            }
            let user = match self.require_wallet() {
                Ok(user) => user,
                Err(e) => return self.reject(e),
            };
            let _guard = match self.begin(Action::SubmitLink) {
                Ok(guard) => guard,
                Err(e) => return self.reject(e),
            };

            self.state.send_modify(|s| {
                s.pending_input.clear();
                s.status = None;
            });
            info!("Submitting link: {}", link);

            let instruction = PortalInstruction::AddGif {
                gif_link: link.clone(),
            };
            match self.send_instruction(instruction, user, Vec::new()).await {
                Ok(signature) => {
                    info!("Link submitted to program ({})", signature);
                    self.set_status(Severity::Success, "GIF submitted successfully!");
                    self.refresh_list().await;
                    ActionOutcome::Succeeded
                }
                Err(e) => {
                    warn!(retryable = e.is_retryable(), "Error submitting link {}: {}", link, e);
                    self.state.send_modify(|s| {
                        s.pending_input = link.clone();
                        s.status = Some(Status::new(
                            Severity::Danger,
                            "Failed to submit GIF. Please try again.",
                        ));
                    });
                    ActionOutcome::Failed
                }
            }
        })
        .await
    }

    /// Add a vote to a submission. Cached vote counts only change via refresh.
    pub async fn upvote(&self, id: u64) -> ActionOutcome {
        self.track(Action::Upvote.as_str(), async {
            let user = match self.require_wallet() {
                Ok(user) => user,
                Err(e) => return self.reject(e),
            };
            let _guard = match self.begin(Action::Upvote) {
                Ok(guard) => guard,
                Err(e) => return self.reject(e),
            };

            self.clear_status();
            info!(id, "Upvoting submission");

            match self
                .send_instruction(PortalInstruction::UpvoteGif { id }, user, Vec::new())
                .await
            {
                Ok(signature) => {
                    info!(id, %signature, "Vote recorded");
                    self.set_status(Severity::Success, "Vote recorded!");
                    self.refresh_list().await;
                    ActionOutcome::Succeeded
                }
                Err(e) => {
                    warn!(id, retryable = e.is_retryable(), "Error upvoting submission: {}", e);
                    self.set_status(Severity::Danger, "Failed to record vote. Please try again.");
                    ActionOutcome::Failed
                }
            }
        })
        .await
    }

    /// Send a fixed tip to a submission's submitter and wait for confirmation
    pub async fn tip(&self, id: u64) -> ActionOutcome {
        self.track(Action::Tip.as_str(), async {
            let from = match self.require_wallet() {
                Ok(from) => from,
                Err(e) => return self.reject(e),
            };
            let recipient = self.state.borrow().submissions.find(id).map(|s| s.submitter);
            let Some(to) = recipient else {
                return self.reject(PortalError::SubmissionNotFound { id });
            };
            let _guard = match self.begin(Action::Tip) {
                Ok(guard) => guard,
                Err(e) => return self.reject(e),
            };

            self.clear_status();
            info!(id, "Tipping {} lamports from {} to {}", self.tip_lamports, from, to);

            match self.send_tip(from, to).await {
                Ok(signature) => {
                    info!(id, %signature, "Tip confirmed");
                    crate::metrics::record_tip(self.tip_lamports);
                    self.set_status(Severity::Success, "Tip sent successfully!");
                    ActionOutcome::Succeeded
                }
                Err(e) => {
                    warn!(id, retryable = e.is_retryable(), "Error sending tip: {}", e);
                    self.set_status(Severity::Danger, "Failed to send tip. Please try again.");
                    ActionOutcome::Failed
                }
            }
        })
        .await
    }

    async fn send_instruction(
        &self,
        instruction: PortalInstruction,
        user: Pubkey,
        signers: Vec<Arc<Keypair>>,
    ) -> PortalResult<Signature> {
        let request = InstructionRequest {
            instruction: instruction.to_instruction(&self.program, user)?,
            fee_payer: user,
            signers,
        };
        self.submitter.submit(request).await
    }

    async fn send_tip(&self, from: Pubkey, to: Pubkey) -> PortalResult<Signature> {
        debug!("Getting recent blockhash");
        let blockhash = self.submitter.latest_blockhash().await?;

        let transfer = system_instruction::transfer(&from, &to, self.tip_lamports);
        let message = Message::new_with_blockhash(&[transfer], Some(&from), &blockhash);

        let signature = self
            .wallet
            .sign_and_send(Transaction::new_unsigned(message))
            .await?;
        info!("Submitted transaction {}, awaiting confirmation", signature);

        self.submitter.confirm_transaction(signature).await?;
        Ok(signature)
    }

    fn require_wallet(&self) -> PortalResult<Pubkey> {
        self.state.borrow().wallet.ok_or(PortalError::NotConnected)
    }

    /// Claim the in-flight slot and raise the busy flag
    fn begin(&self, action: Action) -> PortalResult<InFlightGuard<'_>> {
        let slot = self.slot.try_lock().map_err(|_| PortalError::Busy)?;

        let operation = InFlightOperation {
            id: Uuid::new_v4(),
            action,
            started_at: Utc::now(),
        };
        let published = operation.clone();
        self.state.send_modify(|s| s.in_flight = Some(published));
        debug!("Claimed in-flight slot {} ({})", operation.id, action.as_str());

        Ok(InFlightGuard {
            state: &self.state,
            operation,
            _slot: slot,
        })
    }

    /// Turn an action away with a warning
    fn reject(&self, error: PortalError) -> ActionOutcome {
        let message = match &error {
            PortalError::InvalidLink(LinkRejection::Empty) => "Please enter a GIF link.".to_string(),
            PortalError::InvalidLink(_) => format!(
                "Please enter a valid GIF URL from {} (e.g. https://media.giphy.com/media/.../giphy.gif).",
                self.policy.hosts().join(", ")
            ),
            PortalError::NotConnected => "Connect your wallet first.".to_string(),
            PortalError::Busy => "Another transaction is still processing.".to_string(),
            PortalError::SubmissionNotFound { .. } => {
                "That submission is not on the board. Refresh and try again.".to_string()
            }
            other => other.to_string(),
        };

        info!("Action rejected: {}", error);
        let severity = if error.is_user_correctable() {
            Severity::Warning
        } else {
            Severity::Danger
        };
        self.set_status(severity, message);
        ActionOutcome::Rejected
    }

    fn set_status(&self, severity: Severity, message: impl Into<String>) {
        let status = Status::new(severity, message);
        self.state.send_modify(|s| s.status = Some(status));
    }

    fn clear_status(&self) {
        self.state.send_modify(|s| s.status = None);
    }

    async fn track<F>(&self, action: &'static str, fut: F) -> ActionOutcome
    where
        F: Future<Output = ActionOutcome>,
    {
        let started = Instant::now();
        let outcome = fut.await;
        crate::metrics::record_action(action, outcome.as_str(), started.elapsed().as_secs_f64());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{MockAccountQuery, MockTransactionSubmission};
    use crate::program::{BoardAccount, ItemStruct};
    use crate::wallet::MockWalletProvider;
    use solana_sdk::hash::Hash;
    use std::sync::{Mutex as StdMutex, OnceLock};

    const GOOD_LINK: &str = "https://media.giphy.com/media/abc/giphy.gif";

    fn portal_config() -> PortalConfig {
        PortalConfig {
            allowed_hosts: vec!["giphy.com".to_string()],
            allowed_extensions: vec![".gif".to_string()],
            list_host_marker: "media".to_string(),
            tip_lamports: 100_000,
        }
    }

    fn client(
        wallet: MockWalletProvider,
        query: MockAccountQuery,
        submitter: MockTransactionSubmission,
    ) -> PortalClient {
        let program = ProgramContext::new(Pubkey::new_unique(), Keypair::new());
        PortalClient::new(
            program,
            &portal_config(),
            Arc::new(wallet),
            Arc::new(query),
            Arc::new(submitter),
        )
    }

    fn connected(client: &PortalClient) -> Pubkey {
        let user = Pubkey::new_unique();
        client.state.send_modify(|s| s.wallet = Some(user));
        user
    }

    fn item(id: u64, link: &str, votes: u64, submitter: Pubkey) -> ItemStruct {
        ItemStruct {
            id,
            gif_link: link.to_string(),
            user_address: submitter.to_bytes(),
            votes,
        }
    }

    fn board(items: Vec<ItemStruct>) -> BoardAccount {
        BoardAccount {
            total_gifs: items.len() as u64,
            gif_list: items,
        }
    }

    fn rpc_error() -> PortalError {
        PortalError::Rpc {
            endpoint: "http://127.0.0.1:8899".to_string(),
            message: "connection refused".to_string(),
        }
    }

    fn severity(client: &PortalClient) -> Option<Severity> {
        client.snapshot().status.map(|s| s.severity)
    }

    #[tokio::test]
    async fn test_submit_valid_link_refreshes_once() {
        let submitter_key = Pubkey::new_unique();
        let mut query = MockAccountQuery::new();
        query.expect_fetch_board().times(1).returning(move |_| {
            Ok(board(vec![item(0, GOOD_LINK, 0, submitter_key)]))
        });
        let mut submitter = MockTransactionSubmission::new();
        submitter
            .expect_submit()
            .times(1)
            .withf(|req: &InstructionRequest| req.signers.is_empty())
            .returning(|_| Ok(Signature::default()));

        let client = client(MockWalletProvider::new(), query, submitter);
        let user = connected(&client);

        assert_eq!(client.submit_link(GOOD_LINK).await, ActionOutcome::Succeeded);

        let state = client.snapshot();
        assert_eq!(state.wallet, Some(user));
        assert_eq!(state.pending_input, "");
        assert!(!state.is_busy());
        assert_eq!(severity(&client), Some(Severity::Success));
        assert_eq!(state.submissions.find(0).map(|s| s.link.as_str()), Some(GOOD_LINK));
    }

    #[tokio::test]
    async fn test_rejected_links_make_no_calls() {
        // Mocks without expectations panic if called
        let client = client(
            MockWalletProvider::new(),
            MockAccountQuery::new(),
            MockTransactionSubmission::new(),
        );
        connected(&client);
        let before = client.snapshot().submissions;

        assert_eq!(
            client.submit_link("https://example.com/x.gif").await,
            ActionOutcome::Rejected
        );
        let state = client.snapshot();
        assert_eq!(state.pending_input, "https://example.com/x.gif");
        assert_eq!(state.submissions, before);
        assert_eq!(severity(&client), Some(Severity::Warning));

        assert_eq!(client.submit_link("").await, ActionOutcome::Rejected);
        assert_eq!(
            client.snapshot().status.map(|s| s.message),
            Some("Please enter a GIF link.".to_string())
        );
    }

    #[tokio::test]
    async fn test_submit_failure_restores_input() {
        let mut submitter = MockTransactionSubmission::new();
        submitter
            .expect_submit()
            .times(1)
            .returning(|_| Err(rpc_error()));

        let client = client(MockWalletProvider::new(), MockAccountQuery::new(), submitter);
        connected(&client);

        assert_eq!(client.submit_link(GOOD_LINK).await, ActionOutcome::Failed);

        let state = client.snapshot();
        assert_eq!(state.pending_input, GOOD_LINK);
        assert!(!state.is_busy());
        assert_eq!(severity(&client), Some(Severity::Danger));
    }

    #[tokio::test]
    async fn test_busy_only_while_submitting() {
        let observer: Arc<OnceLock<watch::Receiver<SessionState>>> = Arc::new(OnceLock::new());
        let seen_busy = Arc::new(StdMutex::new(Vec::new()));

        let mut submitter = MockTransactionSubmission::new();
        {
            let observer = observer.clone();
            let seen_busy = seen_busy.clone();
            submitter.expect_submit().times(2).returning(move |_| {
                let busy = observer.get().map(|rx| rx.borrow().is_busy());
                seen_busy.lock().unwrap().push(busy);
                Ok(Signature::default())
            });
        }
        let mut query = MockAccountQuery::new();
        query
            .expect_fetch_board()
            .times(2)
            .returning(|_| Ok(BoardAccount::default()));

        let client = client(MockWalletProvider::new(), query, submitter);
        connected(&client);
        assert!(observer.set(client.subscribe()).is_ok());

        assert!(!client.snapshot().is_busy());
        client.submit_link(GOOD_LINK).await;
        assert!(!client.snapshot().is_busy());
        client.upvote(3).await;
        assert!(!client.snapshot().is_busy());

        assert_eq!(*seen_busy.lock().unwrap(), vec![Some(true), Some(true)]);
    }

    #[tokio::test]
    async fn test_overlapping_action_is_rejected() {
        let client = client(
            MockWalletProvider::new(),
            MockAccountQuery::new(),
            MockTransactionSubmission::new(),
        );
        connected(&client);

        let guard = client.begin(Action::Upvote).unwrap();
        assert!(client.snapshot().is_busy());

        assert_eq!(client.upvote(1).await, ActionOutcome::Rejected);
        assert_eq!(client.submit_link(GOOD_LINK).await, ActionOutcome::Rejected);
        assert_eq!(
            client.snapshot().status.map(|s| s.message),
            Some("Another transaction is still processing.".to_string())
        );
        // the rejected action must not release someone else's slot
        assert!(client.snapshot().is_busy());

        drop(guard);
        assert!(!client.snapshot().is_busy());
    }

    #[tokio::test]
    async fn test_actions_require_connected_wallet() {
        let client = client(
            MockWalletProvider::new(),
            MockAccountQuery::new(),
            MockTransactionSubmission::new(),
        );

        assert_eq!(client.submit_link(GOOD_LINK).await, ActionOutcome::Rejected);
        assert_eq!(client.upvote(0).await, ActionOutcome::Rejected);
        assert_eq!(client.tip(0).await, ActionOutcome::Rejected);
        assert_eq!(client.initialize_account().await, ActionOutcome::Rejected);
        assert_eq!(
            client.snapshot().status.map(|s| s.message),
            Some("Connect your wallet first.".to_string())
        );
    }

    #[tokio::test]
    async fn test_refresh_failure_sets_sentinel() {
        let mut query = MockAccountQuery::new();
        let mut calls = 0;
        query.expect_fetch_board().times(2).returning(move |address| {
            calls += 1;
            if calls == 1 {
                Err(PortalError::AccountNotFound {
                    address: address.to_string(),
                })
            } else {
                Err(rpc_error())
            }
        });

        let client = client(MockWalletProvider::new(), query, MockTransactionSubmission::new());
        connected(&client);

        assert_eq!(client.refresh_list().await, ActionOutcome::Failed);
        assert_eq!(client.snapshot().submissions, SubmissionList::Uninitialized);

        client
            .state
            .send_modify(|s| s.submissions = SubmissionList::default());
        assert_eq!(client.refresh_list().await, ActionOutcome::Failed);
        assert_eq!(client.snapshot().submissions, SubmissionList::Uninitialized);
        assert!(matches!(
            client.view().screen,
            view::Screen::NeedsInitialization
        ));
    }

    #[tokio::test]
    async fn test_refresh_replaces_list_filtered_and_sorted() {
        let who = Pubkey::new_unique();
        let mut query = MockAccountQuery::new();
        query.expect_fetch_board().times(1).returning(move |_| {
            Ok(board(vec![
                item(0, GOOD_LINK, 1, who),
                item(1, "https://example.com/spam.gif", 50, who),
                item(2, "https://media.giphy.com/media/x/giphy.gif", 4, who),
                item(3, "https://media.giphy.com/media/y/giphy.gif", 1, who),
            ]))
        });

        let client = client(MockWalletProvider::new(), query, MockTransactionSubmission::new());
        client.state.send_modify(|s| {
            s.submissions = SubmissionList::Loaded(vec![state::Submission {
                id: 99,
                link: GOOD_LINK.to_string(),
                submitter: who,
                votes: 100,
            }])
        });

        assert_eq!(client.refresh_list().await, ActionOutcome::Succeeded);
        let SubmissionList::Loaded(items) = client.snapshot().submissions else {
            panic!("expected a loaded list");
        };
        let ids: Vec<u64> = items.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 0, 3]);
    }

    #[tokio::test]
    async fn test_upvote_failure_keeps_cached_votes() {
        let who = Pubkey::new_unique();
        let mut submitter = MockTransactionSubmission::new();
        submitter
            .expect_submit()
            .times(1)
            .returning(|_| Err(PortalError::Transaction("blockhash expired".to_string())));

        let client = client(MockWalletProvider::new(), MockAccountQuery::new(), submitter);
        connected(&client);
        let cached = SubmissionList::from_board(vec![item(5, GOOD_LINK, 2, who)], "media");
        client
            .state
            .send_modify(|s| s.submissions = cached.clone());

        assert_eq!(client.upvote(5).await, ActionOutcome::Failed);
        assert_eq!(client.snapshot().submissions, cached);
        assert_eq!(severity(&client), Some(Severity::Danger));
        assert!(!client.snapshot().is_busy());
    }

    #[tokio::test]
    async fn test_tip_unknown_id_sends_nothing() {
        let client = client(
            MockWalletProvider::new(),
            MockAccountQuery::new(),
            MockTransactionSubmission::new(),
        );
        connected(&client);

        assert_eq!(client.tip(404).await, ActionOutcome::Rejected);
        assert_eq!(severity(&client), Some(Severity::Warning));

        client
            .state
            .send_modify(|s| s.submissions = SubmissionList::Uninitialized);
        assert_eq!(client.tip(404).await, ActionOutcome::Rejected);
    }

    #[tokio::test]
    async fn test_tip_transfers_and_confirms() {
        let recipient = Pubkey::new_unique();

        let mut submitter = MockTransactionSubmission::new();
        submitter
            .expect_latest_blockhash()
            .times(1)
            .returning(|| Ok(Hash::new_unique()));
        submitter
            .expect_confirm_transaction()
            .times(1)
            .returning(|_| Ok(()));
        let mut wallet = MockWalletProvider::new();
        wallet
            .expect_sign_and_send()
            .times(1)
            .withf(move |tx: &Transaction| tx.message.account_keys.contains(&recipient))
            .returning(|_| Ok(Signature::default()));

        let client = client(wallet, MockAccountQuery::new(), submitter);
        let user = connected(&client);
        client.state.send_modify(|s| {
            s.submissions =
                SubmissionList::from_board(vec![item(1, GOOD_LINK, 0, recipient)], "media")
        });

        assert_eq!(client.tip(1).await, ActionOutcome::Succeeded);
        assert_eq!(severity(&client), Some(Severity::Success));
        assert_eq!(client.snapshot().wallet, Some(user));
    }

    #[tokio::test]
    async fn test_tip_confirmation_failure_is_reported() {
        let mut submitter = MockTransactionSubmission::new();
        submitter
            .expect_latest_blockhash()
            .returning(|| Ok(Hash::new_unique()));
        submitter.expect_confirm_transaction().returning(|signature| {
            Err(PortalError::Timeout {
                operation: format!("confirmation of {}", signature),
            })
        });
        let mut wallet = MockWalletProvider::new();
        wallet
            .expect_sign_and_send()
            .returning(|_| Ok(Signature::default()));

        let client = client(wallet, MockAccountQuery::new(), submitter);
        connected(&client);
        client.state.send_modify(|s| {
            s.submissions = SubmissionList::from_board(
                vec![item(1, GOOD_LINK, 0, Pubkey::new_unique())],
                "media",
            )
        });

        assert_eq!(client.tip(1).await, ActionOutcome::Failed);
        assert_eq!(severity(&client), Some(Severity::Danger));
        assert!(!client.snapshot().is_busy());
    }

    #[tokio::test]
    async fn test_connect_stores_wallet_and_refreshes() {
        let user = Pubkey::new_unique();
        let mut wallet = MockWalletProvider::new();
        wallet.expect_connect().times(1).returning(move || Ok(user));
        let mut query = MockAccountQuery::new();
        query.expect_fetch_board().times(1).returning(|address| {
            Err(PortalError::AccountNotFound {
                address: address.to_string(),
            })
        });

        let client = client(wallet, query, MockTransactionSubmission::new());

        assert_eq!(client.connect().await, ActionOutcome::Succeeded);
        assert_eq!(client.snapshot().wallet, Some(user));
        assert_eq!(client.snapshot().submissions, SubmissionList::Uninitialized);
    }

    #[tokio::test]
    async fn test_connect_without_wallet_warns() {
        let mut wallet = MockWalletProvider::new();
        wallet.expect_connect().returning(|| {
            Err(PortalError::WalletUnavailable {
                location: "~/.config/solana/id.json".to_string(),
            })
        });

        let client = client(wallet, MockAccountQuery::new(), MockTransactionSubmission::new());

        assert_eq!(client.connect().await, ActionOutcome::Rejected);
        assert_eq!(client.snapshot().wallet, None);
        assert_eq!(severity(&client), Some(Severity::Warning));
    }

    #[tokio::test]
    async fn test_connect_failure_is_danger() {
        let mut wallet = MockWalletProvider::new();
        wallet
            .expect_connect()
            .returning(|| Err(PortalError::Wallet("user rejected".to_string())));

        let client = client(wallet, MockAccountQuery::new(), MockTransactionSubmission::new());

        assert_eq!(client.connect().await, ActionOutcome::Failed);
        assert_eq!(severity(&client), Some(Severity::Danger));
    }

    #[tokio::test]
    async fn test_initialize_cosigns_with_board_and_refreshes() {
        let mut submitter = MockTransactionSubmission::new();
        submitter
            .expect_submit()
            .times(1)
            .withf(|req: &InstructionRequest| req.signers.len() == 1)
            .returning(|_| Ok(Signature::default()));
        let mut query = MockAccountQuery::new();
        query
            .expect_fetch_board()
            .times(1)
            .returning(|_| Ok(BoardAccount::default()));

        let client = client(MockWalletProvider::new(), query, submitter);
        connected(&client);
        client
            .state
            .send_modify(|s| s.submissions = SubmissionList::Uninitialized);

        assert_eq!(client.initialize_account().await, ActionOutcome::Succeeded);
        assert_eq!(client.snapshot().submissions, SubmissionList::Loaded(vec![]));
    }

    #[tokio::test]
    async fn test_initialize_failure_is_logged_only() {
        let mut submitter = MockTransactionSubmission::new();
        submitter
            .expect_submit()
            .times(1)
            .returning(|_| Err(rpc_error()));

        let client = client(MockWalletProvider::new(), MockAccountQuery::new(), submitter);
        connected(&client);

        assert_eq!(client.initialize_account().await, ActionOutcome::Failed);
        assert_eq!(client.snapshot().status, None);
        assert!(!client.snapshot().is_busy());
    }
}
