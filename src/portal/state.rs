//! Session state owned by the portal client

use crate::program::ItemStruct;

use chrono::{DateTime, Utc};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use uuid::Uuid;

/// Cached copy of one board entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: u64,
    pub link: String,
    pub submitter: Pubkey,
    pub votes: u64,
}

impl From<ItemStruct> for Submission {
    fn from(item: ItemStruct) -> Self {
        Self {
            id: item.id,
            submitter: item.submitter(),
            link: item.gif_link,
            votes: item.votes,
        }
    }
}

/// The cached board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionList {
    /// The last fetch failed; the board may need its one-time initialization
    Uninitialized,
    /// Entries sorted by votes, highest first
    Loaded(Vec<Submission>),
}

impl SubmissionList {
    /// Keep entries whose link carries `host_marker` and order them by votes,
    /// highest first. Equal votes keep their on-chain order.
    pub fn from_board(items: Vec<ItemStruct>, host_marker: &str) -> Self {
        let mut submissions: Vec<Submission> = items
            .into_iter()
            .filter(|item| item.gif_link.contains(host_marker))
            .map(Submission::from)
            .collect();
        submissions.sort_by(|a, b| b.votes.cmp(&a.votes));
        SubmissionList::Loaded(submissions)
    }

    pub fn find(&self, id: u64) -> Option<&Submission> {
        match self {
            SubmissionList::Loaded(items) => items.iter().find(|s| s.id == id),
            SubmissionList::Uninitialized => None,
        }
    }
}

impl Default for SubmissionList {
    fn default() -> Self {
        SubmissionList::Loaded(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

/// Last message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub severity: Severity,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Status {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    InitializeBoard,
    SubmitLink,
    Upvote,
    Tip,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::InitializeBoard => "initialize_board",
            Action::SubmitLink => "submit_link",
            Action::Upvote => "upvote",
            Action::Tip => "tip",
        }
    }
}

/// The mutating action currently holding the in-flight slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InFlightOperation {
    pub id: Uuid,
    pub action: Action,
    pub started_at: DateTime<Utc>,
}

/// UI-facing session state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub wallet: Option<Pubkey>,
    pub submissions: SubmissionList,
    pub pending_input: String,
    pub in_flight: Option<InFlightOperation>,
    pub status: Option<Status>,
}

impl SessionState {
    /// True while a mutating action is in flight
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, link: &str, votes: u64) -> ItemStruct {
        ItemStruct {
            id,
            gif_link: link.to_string(),
            user_address: [id as u8; 32],
            votes,
        }
    }

    #[test]
    fn test_from_board_filters_and_sorts_stably() {
        let items = vec![
            item(0, "https://media.giphy.com/media/a/giphy.gif", 1),
            item(1, "https://example.com/b.gif", 9),
            item(2, "https://media.giphy.com/media/c/giphy.gif", 5),
            item(3, "https://media.giphy.com/media/d/giphy.gif", 1),
            item(4, "https://media.giphy.com/media/e/giphy.gif", 5),
        ];

        let list = SubmissionList::from_board(items, "media");
        let SubmissionList::Loaded(submissions) = list else {
            panic!("expected a loaded list");
        };

        let ids: Vec<u64> = submissions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 4, 0, 3]);
        assert_eq!(submissions[0].submitter, Pubkey::new_from_array([2u8; 32]));
    }

    #[test]
    fn test_find_in_uninitialized_list() {
        assert!(SubmissionList::Uninitialized.find(0).is_none());
        let list = SubmissionList::from_board(vec![item(7, "media/x.gif", 0)], "media");
        assert_eq!(list.find(7).map(|s| s.votes), Some(0));
    }
}
