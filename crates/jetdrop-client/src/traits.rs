//! Interfaces between the engine and its network collaborators
//!
//! The dispatcher and the claim coordinator never talk to the network
//! directly; they go through these traits. Production wires them to
//! [`crate::RpcClient`] and [`crate::HttpWalletBridge`], tests wire them
//! to in-memory doubles.

use jetdrop_primitives::{Address, TokenAmount};

use crate::error::Result;
use crate::types::{DeploymentState, ExternalTransaction};

/// Read-only chain queries
#[allow(async_fn_in_trait)]
pub trait ChainReader {
    /// Current sequence number of a wallet account
    async fn sequence_number(&self, address: &Address) -> Result<u32>;

    /// Token sub-account of `owner` under `registry`, derived on-chain
    ///
    /// This must be the registry contract's own derivation get-method.
    /// Guessing the address locally produces wrong destinations whenever
    /// the registry's code differs from the guesser's assumption.
    async fn derived_wallet_address(&self, owner: &Address, registry: &Address) -> Result<Address>;

    /// Deployment state of an account
    async fn deployment_state(&self, address: &Address) -> Result<DeploymentState>;

    /// Balance of an account in minimal units
    async fn balance(&self, address: &Address) -> Result<TokenAmount>;
}

/// Submission of signed-or-to-be-signed transaction envelopes
///
/// Acceptance means the collaborator took responsibility for the envelope,
/// not that it is final on-chain. Refusals surface as
/// [`crate::ClientError::SubmissionRejected`].
#[allow(async_fn_in_trait)]
pub trait TransferSubmitter {
    /// Hand an envelope to the wallet or signing collaborator
    async fn submit(&self, transaction: &ExternalTransaction) -> Result<()>;
}

/// A shared handle whose active endpoint can be advanced
///
/// Rotation mutates the handle itself, so every holder of the same handle
/// observes the new active endpoint.
pub trait EndpointRotation {
    /// The endpoint requests currently target
    fn active_endpoint(&self) -> String;

    /// Advance to the next endpoint, wrapping at the end of the list
    fn rotate_endpoint(&self) -> String;
}
