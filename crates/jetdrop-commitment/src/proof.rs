//! Inclusion proof generation and verification
//!
//! A proof carries the claimed entry, its index, and the sibling-hash path
//! up to the root. Verification recomputes the root from those parts; the
//! claim-side variants additionally require the proof's entry (or address)
//! to match what the caller supplied, so a valid-looking proof for one
//! index can never be passed off as covering a different entry.

use base64::Engine;
use serde::{Deserialize, Serialize};

use jetdrop_primitives::{Address, Entry, Hash256, TokenAmount};

use crate::error::{CommitmentError, Result};
use crate::structure::{CommitmentRoot, CommitmentStructure};
use crate::tree;

/// Version byte of the proof serialization
pub const PROOF_VERSION: u8 = 1;

/// Deepest sibling path accepted by verification; indices are 32-bit
const MAX_PATH_DEPTH: usize = 32;

/// An inclusion proof for one entry against a commitment root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionProof {
    /// Index of the claimed entry
    pub index: u32,
    /// The claimed entry
    pub entry: Entry,
    /// Sibling hashes from the leaf level up to the root
    pub siblings: Vec<Hash256>,
}

impl InclusionProof {
    /// Binary serialization: version, index, entry, sibling path
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 4 + 49 + 2 + self.siblings.len() * 32);
        bytes.push(PROOF_VERSION);
        bytes.extend_from_slice(&self.index.to_be_bytes());
        bytes.push(self.entry.address.workchain() as u8);
        bytes.extend_from_slice(self.entry.address.account_id());
        bytes.extend_from_slice(&self.entry.amount.nano().to_be_bytes());
        bytes.extend_from_slice(&(self.siblings.len() as u16).to_be_bytes());
        for sibling in &self.siblings {
            bytes.extend_from_slice(sibling.as_bytes());
        }
        bytes
    }

    /// Parse the binary serialization
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        // version(1) index(4) workchain(1) account(32) amount(16) count(2)
        const FIXED: usize = 56;
        if bytes.len() < FIXED {
            return Err(CommitmentError::malformed_proof(format!(
                "blob too short: {} bytes",
                bytes.len()
            )));
        }
        let version = bytes[0];
        if version != PROOF_VERSION {
            return Err(CommitmentError::UnsupportedVersion(version));
        }
        let index = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let workchain = bytes[5] as i8;
        let mut account_id = [0u8; 32];
        account_id.copy_from_slice(&bytes[6..38]);
        let mut amount = [0u8; 16];
        amount.copy_from_slice(&bytes[38..54]);
        let count = u16::from_be_bytes([bytes[54], bytes[55]]) as usize;
        if count > MAX_PATH_DEPTH {
            return Err(CommitmentError::malformed_proof(format!(
                "sibling path depth {} exceeds limit",
                count
            )));
        }
        if bytes.len() != FIXED + count * 32 {
            return Err(CommitmentError::malformed_proof(format!(
                "expected {} bytes for {} siblings, got {}",
                FIXED + count * 32,
                count,
                bytes.len()
            )));
        }
        let mut siblings = Vec::with_capacity(count);
        for i in 0..count {
            let at = FIXED + i * 32;
            let mut hash = [0u8; 32];
            hash.copy_from_slice(&bytes[at..at + 32]);
            siblings.push(Hash256::from_bytes(hash));
        }
        Ok(Self {
            index,
            entry: Entry::new(
                Address::new(workchain, account_id),
                TokenAmount::from_nano(u128::from_be_bytes(amount)),
            ),
            siblings,
        })
    }

    /// Base64 rendering of the binary serialization
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.to_bytes())
    }

    /// Parse from the base64 rendering
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        Self::from_bytes(&bytes)
    }

    /// Digest of the canonical proof bytes
    ///
    /// Helper deployments are bound to this digest, so a helper accepts
    /// exactly one proof image.
    pub fn proof_hash(&self) -> Hash256 {
        Hash256::sha256(&self.to_bytes())
    }
}

/// Generate an inclusion proof for one index
pub fn generate_proof(structure: &CommitmentStructure, index: u32) -> Result<InclusionProof> {
    let entry = structure
        .entry(index)
        .copied()
        .ok_or(CommitmentError::IndexNotFound(index))?;
    let leaves = structure.leaf_hashes();
    let siblings = tree::sibling_path(&leaves, index as usize);
    Ok(InclusionProof {
        index,
        entry,
        siblings,
    })
}

/// Check a proof against a root
///
/// True iff the root recomputed from the proof's entry, index, and sibling
/// path equals `root`. A proof against a stale or wrong root is false,
/// never an error.
pub fn verify_proof(root: &CommitmentRoot, proof: &InclusionProof) -> bool {
    if proof.siblings.len() > MAX_PATH_DEPTH {
        return false;
    }
    let leaf = tree::leaf_hash(proof.index, &proof.entry);
    let recomputed = tree::fold_path(leaf, proof.index, &proof.siblings);
    &recomputed == root.as_hash()
}

/// Check a proof against a root and an expected entry
///
/// The double check: the recomputed root must match AND the proof's claimed
/// entry must equal, field for field, the entry the caller supplied.
pub fn verify_entry(root: &CommitmentRoot, proof: &InclusionProof, expected: &Entry) -> bool {
    proof.entry == *expected && verify_proof(root, proof)
}

/// Check a proof against a root for a specific claimant address
pub fn verify_for_claimant(
    root: &CommitmentRoot,
    proof: &InclusionProof,
    claimant: &Address,
) -> bool {
    proof.entry.address == *claimant && verify_proof(root, proof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::CommitmentBuilder;

    fn test_entry(seed: u8, amount: u128) -> Entry {
        let mut id = [0u8; 32];
        id[0] = seed;
        id[31] = seed.wrapping_add(7);
        Entry::new(Address::new(0, id), TokenAmount::from_nano(amount))
    }

    fn build_sample(n: u8) -> (CommitmentStructure, CommitmentRoot, Vec<Entry>) {
        let entries: Vec<Entry> = (0..n)
            .map(|i| test_entry(i + 1, (i as u128 + 1) * 100))
            .collect();
        let (structure, root) = CommitmentBuilder::build(&entries).unwrap();
        (structure, root, entries)
    }

    #[test]
    fn test_every_index_verifies() {
        for n in [1u8, 2, 3, 4, 7, 8, 9] {
            let (structure, root, _) = build_sample(n);
            for i in 0..n as u32 {
                let proof = generate_proof(&structure, i).unwrap();
                assert!(verify_proof(&root, &proof), "n={} i={}", n, i);
            }
        }
    }

    #[test]
    fn test_missing_index() {
        let (structure, _, _) = build_sample(3);
        assert!(matches!(
            generate_proof(&structure, 3).unwrap_err(),
            CommitmentError::IndexNotFound(3)
        ));
    }

    #[test]
    fn test_forged_amount_fails() {
        let (structure, root, _) = build_sample(4);
        let mut proof = generate_proof(&structure, 1).unwrap();
        proof.entry.amount = TokenAmount::from_nano(201);
        assert!(!verify_proof(&root, &proof));
    }

    #[test]
    fn test_forged_address_fails() {
        let (structure, root, _) = build_sample(4);
        let mut proof = generate_proof(&structure, 1).unwrap();
        proof.entry.address = test_entry(99, 0).address;
        assert!(!verify_proof(&root, &proof));
    }

    #[test]
    fn test_wrong_root_fails() {
        let (structure, _, _) = build_sample(4);
        let (_, other_root, _) = build_sample(5);
        let proof = generate_proof(&structure, 0).unwrap();
        assert!(!verify_proof(&other_root, &proof));
    }

    #[test]
    fn test_reused_proof_for_other_index_fails() {
        let (structure, root, _) = build_sample(4);
        let mut proof = generate_proof(&structure, 2).unwrap();
        proof.index = 1;
        assert!(!verify_proof(&root, &proof));
    }

    #[test]
    fn test_verify_entry_double_check() {
        let (structure, root, entries) = build_sample(3);
        let proof = generate_proof(&structure, 1).unwrap();
        assert!(verify_entry(&root, &proof, &entries[1]));
        // valid proof, but the caller expected a different amount
        let mut expected = entries[1];
        expected.amount = TokenAmount::from_nano(999);
        assert!(!verify_entry(&root, &proof, &expected));
    }

    #[test]
    fn test_verify_for_claimant() {
        let (structure, root, entries) = build_sample(3);
        let proof = generate_proof(&structure, 2).unwrap();
        assert!(verify_for_claimant(&root, &proof, &entries[2].address));
        assert!(!verify_for_claimant(&root, &proof, &entries[0].address));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let (structure, root, _) = build_sample(5);
        let proof = generate_proof(&structure, 3).unwrap();
        let recovered = InclusionProof::from_bytes(&proof.to_bytes()).unwrap();
        assert_eq!(recovered, proof);
        assert!(verify_proof(&root, &recovered));
    }

    #[test]
    fn test_base64_roundtrip() {
        let (structure, _, _) = build_sample(2);
        let proof = generate_proof(&structure, 0).unwrap();
        let recovered = InclusionProof::from_base64(&proof.to_base64()).unwrap();
        assert_eq!(recovered, proof);
    }

    #[test]
    fn test_truncated_blob_rejected() {
        let (structure, _, _) = build_sample(4);
        let mut bytes = generate_proof(&structure, 1).unwrap().to_bytes();
        bytes.truncate(bytes.len() - 5);
        assert!(InclusionProof::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_proof_hash_binds_index() {
        let (structure, _, _) = build_sample(4);
        let a = generate_proof(&structure, 1).unwrap();
        let b = generate_proof(&structure, 2).unwrap();
        assert_ne!(a.proof_hash(), b.proof_hash());
        assert_eq!(a.proof_hash(), generate_proof(&structure, 1).unwrap().proof_hash());
    }

    #[test]
    fn test_json_roundtrip() {
        let (structure, root, _) = build_sample(3);
        let proof = generate_proof(&structure, 1).unwrap();
        let json = serde_json::to_string(&proof).unwrap();
        let recovered: InclusionProof = serde_json::from_str(&json).unwrap();
        assert!(verify_proof(&root, &recovered));
    }
}
