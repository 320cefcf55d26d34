//! Dispatch sessions: partitioned jobs plus shared progress state.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use uuid::Uuid;

use crate::batch::{Batch, partition_jobs};
use crate::error::{DispatchError, Result};
use crate::job::TransferJob;

/// Confirmed-versus-total counters shared with observers of a running
/// dispatch.
///
/// The completed counter only moves when a submission was accepted, so a
/// progress reader never sees in-flight sends counted as done.
#[derive(Debug)]
pub struct DispatchProgress {
    completed: AtomicUsize,
    total: usize,
}

impl DispatchProgress {
    fn new(total: usize) -> Self {
        DispatchProgress {
            completed: AtomicUsize::new(0),
            total,
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Snapshot as a `(completed, total)` pair.
    pub fn snapshot(&self) -> (usize, usize) {
        (self.completed(), self.total)
    }

    pub(crate) fn record_confirmed(&self, count: usize) {
        self.completed.fetch_add(count, Ordering::SeqCst);
    }
}

/// One dispatch run over a fixed set of jobs.
///
/// A session owns the batch partition and the sender's sequence cursor.
/// It can be dispatched again after a partial failure; confirmed jobs are
/// left untouched on the second pass.
#[derive(Debug)]
pub struct DispatchSession {
    id: Uuid,
    batches: Vec<Batch>,
    sequence_cursor: Option<u32>,
    progress: Arc<DispatchProgress>,
}

impl DispatchSession {
    /// Partitions `jobs` into batches of at most `batch_size`.
    pub fn new(jobs: Vec<TransferJob>, batch_size: usize) -> Result<Self> {
        let total = jobs.len();
        let batches = partition_jobs(jobs, batch_size)?;
        Ok(DispatchSession {
            id: Uuid::new_v4(),
            batches,
            sequence_cursor: None,
            progress: Arc::new(DispatchProgress::new(total)),
        })
    }

    /// A session with one job per batch, for sequential dispatch.
    pub fn sequential(jobs: Vec<TransferJob>) -> Result<Self> {
        DispatchSession::new(jobs, 1)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn job_count(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }

    /// Shared handle to the confirmed-versus-total counters.
    pub fn progress(&self) -> Arc<DispatchProgress> {
        Arc::clone(&self.progress)
    }

    pub fn sequence_cursor(&self) -> Option<u32> {
        self.sequence_cursor
    }

    pub(crate) fn batch_mut(&mut self, index: usize) -> &mut Batch {
        &mut self.batches[index]
    }

    pub(crate) fn record_confirmed(&self, count: usize) {
        self.progress.record_confirmed(count);
    }

    /// Advances the sequence cursor to a freshly observed value.
    ///
    /// The cursor must never move backwards; a regression means another
    /// party is sending from the same wallet and continuing would reuse
    /// a sequence number.
    pub(crate) fn advance_sequence(&mut self, observed: u32) -> Result<()> {
        if let Some(previous) = self.sequence_cursor {
            if observed < previous {
                return Err(DispatchError::SequenceRegression { previous, observed });
            }
        }
        self.sequence_cursor = Some(observed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetdrop_primitives::{Address, TokenAmount};

    fn make_jobs(count: usize) -> Vec<TransferJob> {
        (0..count)
            .map(|i| {
                let address: Address = format!("0:{:064x}", i + 1).parse().unwrap();
                TransferJob::new(address, TokenAmount::from_nano(1_000))
            })
            .collect()
    }

    #[test]
    fn test_session_partitions_jobs() {
        let session = DispatchSession::new(make_jobs(9), 4).unwrap();
        assert_eq!(session.batch_count(), 3);
        assert_eq!(session.job_count(), 9);
        assert_eq!(session.progress().snapshot(), (0, 9));
    }

    #[test]
    fn test_sequential_session_is_one_job_per_batch() {
        let session = DispatchSession::sequential(make_jobs(3)).unwrap();
        assert_eq!(session.batch_count(), 3);
        assert!(session.batches().iter().all(|b| b.len() == 1));
    }

    #[test]
    fn test_progress_handle_sees_updates() {
        let session = DispatchSession::new(make_jobs(4), 2).unwrap();
        let progress = session.progress();
        session.record_confirmed(2);
        assert_eq!(progress.snapshot(), (2, 4));
        session.record_confirmed(2);
        assert_eq!(progress.snapshot(), (4, 4));
    }

    #[test]
    fn test_sequence_cursor_rejects_regression() {
        let mut session = DispatchSession::sequential(make_jobs(2)).unwrap();
        session.advance_sequence(7).unwrap();
        session.advance_sequence(7).unwrap();
        session.advance_sequence(8).unwrap();
        assert!(matches!(
            session.advance_sequence(5),
            Err(DispatchError::SequenceRegression {
                previous: 8,
                observed: 5
            })
        ));
        assert_eq!(session.sequence_cursor(), Some(8));
    }
}
