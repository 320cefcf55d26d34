//! Batched transfer dispatch for the jetdrop airdrop engine.
//!
//! This crate turns a validated recipient list into transfer jobs,
//! partitions them into batches, and drives them through the network
//! collaborators from `jetdrop-client`. Transient failures are retried
//! with exponential backoff and endpoint rotation; permanent failures
//! are surfaced to the caller, who decides whether the run continues.

pub mod batch;
pub mod dispatcher;
pub mod error;
pub mod job;
pub mod payload;
pub mod report;
pub mod retry;
pub mod session;

pub use batch::{Batch, DEFAULT_BATCH_SIZE, partition_jobs};
pub use dispatcher::{
    BatchDispatcher, DispatchConfig, DispatchDecision, FORWARD_VALUE_NANO, JobFailure,
    SEQUENTIAL_FORWARD_NANO, SEQUENTIAL_GAS_NANO, TRANSFER_GAS_NANO, TRANSFER_VALIDITY_SECS,
};
pub use error::{DispatchError, Result};
pub use job::{JobState, TransferJob};
pub use payload::{TOKEN_TRANSFER_OP, TransferPayload};
pub use report::{DispatchOutcome, DispatchReport, JobReport};
pub use retry::{RetryPolicy, run_with_retry};
pub use session::{DispatchProgress, DispatchSession};
