//! Claim-helper account images and address derivation.
//!
//! Each claim goes through a single-purpose helper account whose address
//! commits to the airdrop it serves, the entry index it claims, and the
//! hash of the inclusion proof. Two different claims can never share a
//! helper, and a helper deployed for one proof cannot replay another.

use jetdrop_commitment::InclusionProof;
use jetdrop_primitives::{Address, Hash256};

/// Version byte of the helper image layout.
pub const HELPER_VERSION: u8 = 1;

/// Workchain helpers are deployed into.
const HELPER_WORKCHAIN: i8 = 0;

/// The initial state of a claim helper account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelperStateInit {
    pub airdrop: Address,
    pub index: u32,
    pub proof_hash: Hash256,
}

impl HelperStateInit {
    pub fn new(airdrop: Address, index: u32, proof_hash: Hash256) -> Self {
        HelperStateInit {
            airdrop,
            index,
            proof_hash,
        }
    }

    /// Binds a helper to a specific proof.
    pub fn for_proof(airdrop: Address, proof: &InclusionProof) -> Self {
        HelperStateInit::new(airdrop, proof.index, proof.proof_hash())
    }

    /// Serialized deployment image: version, airdrop address, entry
    /// index, proof hash. 70 bytes.
    pub fn image(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 33 + 4 + 32);
        bytes.push(HELPER_VERSION);
        bytes.push(self.airdrop.workchain() as u8);
        bytes.extend_from_slice(self.airdrop.account_id());
        bytes.extend_from_slice(&self.index.to_be_bytes());
        bytes.extend_from_slice(self.proof_hash.as_bytes());
        bytes
    }

    /// The helper's account address, derived from the image hash.
    ///
    /// The address is a pure function of the image, so deriving it twice
    /// for the same proof always lands on the same account.
    pub fn derive_address(&self) -> Address {
        let digest = Hash256::sha256(&self.image());
        Address::new(HELPER_WORKCHAIN, *digest.as_bytes())
    }
}
