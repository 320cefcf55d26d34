//! Error types for claim coordination.

use jetdrop_client::ClientError;
use jetdrop_commitment::CommitmentError;
use jetdrop_primitives::Address;
use thiserror::Error;

use crate::coordinator::ClaimState;

/// Errors surfaced while verifying eligibility or executing a claim.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The claimant does not appear in the commitment.
    #[error("address {claimant} is not eligible for this airdrop")]
    NotEligible { claimant: Address },

    /// The generated proof does not verify against the trusted root.
    ///
    /// Either the commitment structure is stale relative to the root the
    /// coordinator was given, or the structure was tampered with.
    #[error("inclusion proof does not match the commitment root")]
    ProofMismatch,

    /// The requested action is not legal in the current claim state.
    #[error("cannot {action} from state {from}")]
    InvalidTransition {
        from: ClaimState,
        action: &'static str,
    },

    #[error(transparent)]
    Commitment(#[from] CommitmentError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type Result<T> = std::result::Result<T, ClaimError>;
