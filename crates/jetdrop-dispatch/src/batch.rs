//! Partitioning of transfer jobs into fixed-size batches.

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::job::TransferJob;

/// Default number of transfers bundled into one outgoing transaction.
///
/// Wallet contracts cap the number of internal messages a single
/// external transaction may carry, and four leaves headroom for the
/// gas attached to each message.
pub const DEFAULT_BATCH_SIZE: usize = 4;

/// A consecutive slice of the job list, submitted as one transaction
/// in batched mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// 1-based position of this batch within the dispatch run.
    pub number: usize,
    pub jobs: Vec<TransferJob>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Splits `jobs` into consecutive batches of at most `batch_size` jobs.
///
/// Produces exactly `ceil(jobs.len() / batch_size)` batches; every batch
/// except possibly the last is full, and the original job order is kept.
pub fn partition_jobs(jobs: Vec<TransferJob>, batch_size: usize) -> Result<Vec<Batch>> {
    if jobs.is_empty() {
        return Err(DispatchError::NoJobs);
    }
    if batch_size == 0 {
        return Err(DispatchError::InvalidBatchSize(batch_size));
    }

    let mut batches = Vec::with_capacity(jobs.len().div_ceil(batch_size));
    let mut current = Vec::with_capacity(batch_size.min(jobs.len()));
    for job in jobs {
        current.push(job);
        if current.len() == batch_size {
            batches.push(Batch {
                number: batches.len() + 1,
                jobs: std::mem::take(&mut current),
            });
        }
    }
    if !current.is_empty() {
        batches.push(Batch {
            number: batches.len() + 1,
            jobs: current,
        });
    }
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetdrop_primitives::{Address, TokenAmount};

    fn make_jobs(count: usize) -> Vec<TransferJob> {
        (0..count)
            .map(|i| {
                let hex: String = format!("{:064x}", i + 1);
                let address: Address = format!("0:{hex}").parse().unwrap();
                TransferJob::new(address, TokenAmount::from_nano((i as u128 + 1) * 1_000))
            })
            .collect()
    }

    #[test]
    fn test_nine_jobs_partition_into_4_4_1() {
        let batches = partition_jobs(make_jobs(9), 4).unwrap();
        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![4, 4, 1]);
        assert_eq!(batches[0].number, 1);
        assert_eq!(batches[2].number, 3);
    }

    #[test]
    fn test_partition_count_is_ceiling() {
        for total in 1..=20usize {
            for size in 1..=6usize {
                let batches = partition_jobs(make_jobs(total), size).unwrap();
                assert_eq!(batches.len(), total.div_ceil(size), "{total} jobs / {size}");
            }
        }
    }

    #[test]
    fn test_partition_preserves_job_order() {
        let jobs = make_jobs(7);
        let expected: Vec<TokenAmount> = jobs.iter().map(|j| j.amount).collect();
        let batches = partition_jobs(jobs, 3).unwrap();
        let flattened: Vec<TokenAmount> = batches
            .iter()
            .flat_map(|b| b.jobs.iter().map(|j| j.amount))
            .collect();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_exact_multiple_has_no_short_batch() {
        let batches = partition_jobs(make_jobs(8), 4).unwrap();
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 4));
    }

    #[test]
    fn test_empty_jobs_rejected() {
        assert!(matches!(
            partition_jobs(Vec::new(), 4),
            Err(DispatchError::NoJobs)
        ));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(matches!(
            partition_jobs(make_jobs(3), 0),
            Err(DispatchError::InvalidBatchSize(0))
        ));
    }
}
