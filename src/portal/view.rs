//! Card rendering for the board

use super::state::{InFlightOperation, SessionState, Status, SubmissionList};

use serde::Serialize;

/// What the page shows for a session
#[derive(Debug, Clone, Serialize)]
pub struct PortalView {
    pub wallet: Option<String>,
    pub input: String,
    pub busy: bool,
    pub in_flight: Option<InFlightOperation>,
    pub status: Option<Status>,
    pub screen: Screen,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Screen {
    /// Offer the wallet connect button
    NotConnected,
    /// Offer the one-time board initialization
    NeedsInitialization,
    /// Submission form plus ranked cards
    Board { cards: Vec<Card> },
}

#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub rank: usize,
    pub id: u64,
    pub link: String,
    pub votes: u64,
    pub submitter: String,
    pub tip_label: String,
}

pub fn render(state: &SessionState) -> PortalView {
    let screen = match (&state.wallet, &state.submissions) {
        (None, _) => Screen::NotConnected,
        (Some(_), SubmissionList::Uninitialized) => Screen::NeedsInitialization,
        (Some(_), SubmissionList::Loaded(items)) => Screen::Board {
            cards: items
                .iter()
                .enumerate()
                .map(|(rank, item)| {
                    let submitter = item.submitter.to_string();
                    let short: String = submitter.chars().take(6).collect();
                    Card {
                        rank,
                        id: item.id,
                        link: item.link.clone(),
                        votes: item.votes,
                        tip_label: format!("Send a Tip to {}", short),
                        submitter,
                    }
                })
                .collect(),
        },
    };

    PortalView {
        wallet: state.wallet.map(|w| w.to_string()),
        input: state.pending_input.clone(),
        busy: state.is_busy(),
        in_flight: state.in_flight.clone(),
        status: state.status.clone(),
        screen,
    }
}
