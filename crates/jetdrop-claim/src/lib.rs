//! Claim coordination for the jetdrop airdrop engine.
//!
//! Individual recipients claim their allocation in three steps: prove
//! inclusion against the published commitment root, deploy a
//! single-purpose helper account bound to that proof, and send the claim
//! message carrying the serialized proof. [`ClaimCoordinator`] drives
//! these steps as a retryable state machine.

pub mod coordinator;
pub mod error;
pub mod helper;

pub use coordinator::{
    CLAIM_VALIDITY_SECS, CLAIM_VALUE_NANO, CONFIRMATION_DELAY_SECS, ClaimConfig, ClaimCoordinator,
    ClaimState, HELPER_VALUE_NANO,
};
pub use error::{ClaimError, Result};
pub use helper::{HELPER_VERSION, HelperStateInit};
