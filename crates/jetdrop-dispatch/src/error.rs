//! Error types for transfer dispatch.

use jetdrop_client::ClientError;
use thiserror::Error;

/// Errors surfaced while partitioning, submitting, or retrying transfers.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The recipient list produced no transfer jobs.
    #[error("no transfer jobs to dispatch")]
    NoJobs,

    /// Batch size must be at least one job per batch.
    #[error("invalid batch size: {0}")]
    InvalidBatchSize(usize),

    /// A network operation kept hitting transient failures until the
    /// retry budget ran out.
    #[error("{operation} failed after {attempts} attempts")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        last_error: ClientError,
    },

    /// The sender's sequence number moved backwards between sends.
    #[error("sequence cursor regressed: {previous} -> {observed}")]
    SequenceRegression { previous: u32, observed: u32 },

    /// A serialized transfer payload could not be decoded.
    #[error("malformed transfer payload: {0}")]
    MalformedPayload(String),

    /// A non-transient client failure that retrying would not fix.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl DispatchError {
    pub(crate) fn malformed_payload<S: Into<String>>(message: S) -> Self {
        DispatchError::MalformedPayload(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
