//! The claim state machine.
//!
//! A coordinator walks one claimant through
//! `Unverified -> Eligible -> HelperDeployed -> Claimed`, dropping to
//! `Rejected` when validation fails. Network failures never advance the
//! state, so every step can be retried from where it stopped.

use std::fmt;
use std::time::{Duration, Instant};

use jetdrop_client::{ExternalTransaction, OutgoingMessage, TransferSubmitter};
use jetdrop_commitment::{
    CommitmentRoot, CommitmentStructure, InclusionProof, generate_proof, verify_for_claimant,
};
use jetdrop_primitives::{Address, TokenAmount};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ClaimError, Result};
use crate::helper::HelperStateInit;

/// Value attached to the helper deployment, 0.15 units. The helper keeps
/// enough to pay for its own claim message and bounces the rest.
pub const HELPER_VALUE_NANO: u128 = 150_000_000;
/// Value attached to the claim-execution message, 0.01 units.
pub const CLAIM_VALUE_NANO: u128 = 10_000_000;
/// Pause between helper deployment and claim execution.
pub const CONFIRMATION_DELAY_SECS: u64 = 7;
/// Seconds a claim transaction stays valid for submission.
pub const CLAIM_VALIDITY_SECS: u64 = 60;

/// Where a claim currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClaimState {
    /// Nothing checked yet.
    Unverified,
    /// The claimant is in the commitment and holds a verified proof.
    Eligible,
    /// The helper account deployment was accepted.
    HelperDeployed,
    /// The claim transfer was accepted.
    Claimed,
    /// Validation failed; terminal.
    Rejected,
}

impl fmt::Display for ClaimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClaimState::Unverified => "unverified",
            ClaimState::Eligible => "eligible",
            ClaimState::HelperDeployed => "helperDeployed",
            ClaimState::Claimed => "claimed",
            ClaimState::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Tunable values of the claim flow.
#[derive(Debug, Clone)]
pub struct ClaimConfig {
    pub helper_value: TokenAmount,
    pub claim_value: TokenAmount,
    /// Blind wait between helper deployment and the claim message, giving
    /// the deployment time to finalize.
    pub confirmation_delay: Duration,
    pub validity_window_secs: u64,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        ClaimConfig {
            helper_value: TokenAmount::from_nano(HELPER_VALUE_NANO),
            claim_value: TokenAmount::from_nano(CLAIM_VALUE_NANO),
            confirmation_delay: Duration::from_secs(CONFIRMATION_DELAY_SECS),
            validity_window_secs: CLAIM_VALIDITY_SECS,
        }
    }
}

/// Drives a single claimant's claim against one airdrop.
pub struct ClaimCoordinator<'a, S> {
    submitter: &'a S,
    config: ClaimConfig,
    airdrop: Address,
    claimant: Address,
    root: CommitmentRoot,
    state: ClaimState,
    proof: Option<InclusionProof>,
    helper_deployed_at: Option<Instant>,
}

impl<'a, S> ClaimCoordinator<'a, S>
where
    S: TransferSubmitter,
{
    /// A fresh coordinator in the `Unverified` state.
    ///
    /// `root` is the trusted commitment root, obtained independently of
    /// the structure the proof will be generated from.
    pub fn new(
        submitter: &'a S,
        config: ClaimConfig,
        airdrop: Address,
        claimant: Address,
        root: CommitmentRoot,
    ) -> Self {
        ClaimCoordinator {
            submitter,
            config,
            airdrop,
            claimant,
            root,
            state: ClaimState::Unverified,
            proof: None,
            helper_deployed_at: None,
        }
    }

    pub fn state(&self) -> ClaimState {
        self.state
    }

    pub fn claimant(&self) -> &Address {
        &self.claimant
    }

    /// The proof held after successful verification.
    pub fn proof(&self) -> Option<&InclusionProof> {
        self.proof.as_ref()
    }

    /// Looks the claimant up in `structure`, generates its inclusion
    /// proof, and verifies the proof against the trusted root.
    ///
    /// On success the claim becomes `Eligible`. A claimant missing from
    /// the structure or a proof that fails against the root moves the
    /// claim to `Rejected`. May be called again while `Eligible`, for
    /// re-checking against a refreshed structure.
    pub fn verify_eligibility(&mut self, structure: &CommitmentStructure) -> Result<&InclusionProof> {
        match self.state {
            ClaimState::Unverified | ClaimState::Eligible => {}
            from => {
                return Err(ClaimError::InvalidTransition {
                    from,
                    action: "verify eligibility",
                })
            }
        }

        let Some((index, _entry)) = structure.find_entry_for(&self.claimant) else {
            warn!(claimant = %self.claimant, "claimant not present in commitment");
            self.state = ClaimState::Rejected;
            return Err(ClaimError::NotEligible {
                claimant: self.claimant,
            });
        };

        let proof = generate_proof(structure, index)?;
        if !verify_for_claimant(&self.root, &proof, &self.claimant) {
            warn!(
                claimant = %self.claimant,
                index,
                root = %self.root,
                "proof does not verify against trusted root"
            );
            self.state = ClaimState::Rejected;
            return Err(ClaimError::ProofMismatch);
        }

        info!(claimant = %self.claimant, index, amount = %proof.entry.amount, "claim eligible");
        self.state = ClaimState::Eligible;
        Ok(self.proof.insert(proof))
    }

    /// Deploys the claim-helper account for the verified proof.
    ///
    /// The helper address is derived from the airdrop address, the entry
    /// index, and the proof hash. A submission failure leaves the claim
    /// `Eligible` so the deployment can simply be retried.
    pub async fn deploy_helper(&mut self) -> Result<Address> {
        let proof = match (self.state, self.proof.as_ref()) {
            (ClaimState::Eligible, Some(proof)) => proof,
            (from, _) => {
                return Err(ClaimError::InvalidTransition {
                    from,
                    action: "deploy helper",
                })
            }
        };

        let init = HelperStateInit::for_proof(self.airdrop, proof);
        let helper_address = init.derive_address();
        let message = OutgoingMessage::transfer(helper_address, self.config.helper_value)
            .with_state_init(init.image());
        let transaction =
            ExternalTransaction::with_window(self.config.validity_window_secs, vec![message]);

        self.submitter.submit(&transaction).await?;

        self.state = ClaimState::HelperDeployed;
        self.helper_deployed_at = Some(Instant::now());
        info!(claimant = %self.claimant, helper = %helper_address, "helper deployment accepted");
        Ok(helper_address)
    }

    /// Sends the claim message carrying the serialized proof.
    ///
    /// Waits out whatever remains of the confirmation delay since helper
    /// deployment, then submits. A failure leaves the claim
    /// `HelperDeployed`; retrying resubmits only this step, without a
    /// second deployment or a second delay. Returns the claimed amount.
    pub async fn execute_claim(&mut self) -> Result<TokenAmount> {
        let proof = match (self.state, self.proof.as_ref()) {
            (ClaimState::HelperDeployed, Some(proof)) => proof,
            (from, _) => {
                return Err(ClaimError::InvalidTransition {
                    from,
                    action: "execute claim",
                })
            }
        };

        if let Some(deployed_at) = self.helper_deployed_at {
            let elapsed = deployed_at.elapsed();
            if elapsed < self.config.confirmation_delay {
                tokio::time::sleep(self.config.confirmation_delay - elapsed).await;
            }
        }

        let amount = proof.entry.amount;
        let message = OutgoingMessage::transfer(self.airdrop, self.config.claim_value)
            .with_payload(proof.to_bytes());
        let transaction =
            ExternalTransaction::with_window(self.config.validity_window_secs, vec![message]);

        self.submitter.submit(&transaction).await?;

        self.state = ClaimState::Claimed;
        info!(claimant = %self.claimant, amount = %amount, "claim accepted");
        Ok(amount)
    }

    /// Runs the whole flow: verify, deploy, wait, claim.
    pub async fn run(&mut self, structure: &CommitmentStructure) -> Result<TokenAmount> {
        self.verify_eligibility(structure)?;
        self.deploy_helper().await?;
        self.execute_claim().await
    }
}
