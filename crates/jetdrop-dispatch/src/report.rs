//! Final accounting of a dispatch run.

use jetdrop_primitives::{Address, TokenAmount};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::job::{JobState, TransferJob};
use crate::session::DispatchSession;

/// How a dispatch run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DispatchOutcome {
    /// Every job confirmed.
    Completed,
    /// At least one job failed or was skipped, but the run went through
    /// the whole job list.
    PartialFailure,
    /// The caller stopped the run after a failure; unattempted jobs were
    /// abandoned.
    Aborted,
}

/// Terminal record for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub recipient: Address,
    pub amount: TokenAmount,
    pub state: JobState,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobReport {
    fn from_job(job: &TransferJob) -> Self {
        JobReport {
            recipient: job.recipient,
            amount: job.amount,
            state: job.state,
            attempts: job.attempts,
            error: job.last_error.clone(),
        }
    }
}

/// Per-job outcomes plus summary counters for a finished run.
///
/// Every job from the session appears here exactly once; nothing is
/// dropped silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub session_id: Uuid,
    pub outcome: DispatchOutcome,
    pub total: usize,
    pub confirmed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub jobs: Vec<JobReport>,
}

impl DispatchReport {
    pub(crate) fn compile(session: &DispatchSession, aborted: bool) -> Self {
        let jobs: Vec<JobReport> = session
            .batches()
            .iter()
            .flat_map(|batch| batch.jobs.iter().map(JobReport::from_job))
            .collect();
        let confirmed = jobs.iter().filter(|j| j.state == JobState::Confirmed).count();
        let failed = jobs.iter().filter(|j| j.state == JobState::Failed).count();
        let skipped = jobs.iter().filter(|j| j.state == JobState::Skipped).count();
        let outcome = if aborted {
            DispatchOutcome::Aborted
        } else if failed > 0 || skipped > 0 {
            DispatchOutcome::PartialFailure
        } else {
            DispatchOutcome::Completed
        };
        DispatchReport {
            session_id: session.id(),
            outcome,
            total: jobs.len(),
            confirmed,
            failed,
            skipped,
            jobs,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.outcome == DispatchOutcome::Completed
    }

    /// Recipients that did not confirm, in job order.
    pub fn unsettled(&self) -> impl Iterator<Item = &JobReport> {
        self.jobs
            .iter()
            .filter(|j| j.state != JobState::Confirmed)
    }
}
