//! Transfer jobs and their lifecycle states.

use jetdrop_primitives::{Address, Entry, EntrySet, TokenAmount};
use serde::{Deserialize, Serialize};

/// Lifecycle of a single transfer job.
///
/// A job starts `Pending`, becomes `Sent` once its transaction has been
/// handed to the wallet bridge, and `Confirmed` once the submission was
/// accepted. `Failed` records an exhausted or rejected send; `Skipped`
/// marks jobs abandoned after the caller chose to abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobState {
    Pending,
    Sent,
    Confirmed,
    Failed,
    Skipped,
}

/// One recipient transfer tracked through dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferJob {
    pub recipient: Address,
    pub amount: TokenAmount,
    pub state: JobState,
    /// Submission attempts consumed so far, including retries.
    pub attempts: u32,
    pub last_error: Option<String>,
}

impl TransferJob {
    pub fn new(recipient: Address, amount: TokenAmount) -> Self {
        TransferJob {
            recipient,
            amount,
            state: JobState::Pending,
            attempts: 0,
            last_error: None,
        }
    }

    pub fn from_entry(entry: &Entry) -> Self {
        TransferJob::new(entry.address, entry.amount)
    }

    /// Builds one job per entry, preserving the entry order.
    pub fn from_entry_set(entries: &EntrySet) -> Vec<TransferJob> {
        entries.iter().map(TransferJob::from_entry).collect()
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == JobState::Confirmed
    }

    pub(crate) fn mark_sent(&mut self) {
        self.state = JobState::Sent;
    }

    pub(crate) fn mark_confirmed(&mut self) {
        self.state = JobState::Confirmed;
        self.last_error = None;
    }

    pub(crate) fn mark_failed(&mut self, error: String) {
        self.state = JobState::Failed;
        self.last_error = Some(error);
    }

    pub(crate) fn mark_skipped(&mut self) {
        self.state = JobState::Skipped;
    }
}
